use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::admin::Admin as DomainAdmin;
use crate::domain::types::{AdminUsername, TypeConstraintError};

/// Diesel model representing the `admins` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::admins)]
pub struct Admin {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}

impl TryFrom<Admin> for DomainAdmin {
    type Error = TypeConstraintError;

    fn try_from(admin: Admin) -> Result<Self, Self::Error> {
        Ok(Self {
            id: admin.id.try_into()?,
            username: AdminUsername::new(admin.username)?,
            password_hash: admin.password_hash,
            created_at: admin.created_at,
        })
    }
}
