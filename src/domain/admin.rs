use chrono::NaiveDateTime;

use crate::domain::types::{AdminId, AdminUsername};

/// Administrator account. The hash is only ever compared by the auth layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Admin {
    pub id: AdminId,
    pub username: AdminUsername,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}
