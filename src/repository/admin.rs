use diesel::prelude::*;

use crate::domain::admin::Admin;
use crate::domain::types::AdminUsername;
use crate::models::admin::Admin as DbAdmin;
use crate::repository::{AdminReader, DieselRepository, RepositoryResult};

impl AdminReader for DieselRepository {
    fn get_admin_by_username(&self, username: &AdminUsername) -> RepositoryResult<Option<Admin>> {
        use crate::schema::admins;

        let mut conn = self.conn()?;

        let admin = admins::table
            .filter(admins::username.eq(username.as_str()))
            .first::<DbAdmin>(&mut conn)
            .optional()?;

        let admin: Option<Admin> = admin.map(TryInto::try_into).transpose()?;
        Ok(admin)
    }
}
