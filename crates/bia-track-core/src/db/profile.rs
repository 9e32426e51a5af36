//! Patient profile operations (key/value table).

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::Profile;

const NAME_KEY: &str = "name";
const CONTACT_KEY: &str = "contact";

impl Database {
    /// Current profile; fields never set come back empty.
    pub fn get_profile(&self) -> DbResult<Profile> {
        Ok(Profile {
            name: self.get_profile_value(NAME_KEY)?.unwrap_or_default(),
            contact: self.get_profile_value(CONTACT_KEY)?.unwrap_or_default(),
        })
    }

    /// Replace both profile fields.
    pub fn set_profile(&self, profile: &Profile) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in [(NAME_KEY, &profile.name), (CONTACT_KEY, &profile.contact)] {
            tx.execute(
                r#"
                INSERT INTO profile_info (key, value, updated_at)
                VALUES (?1, ?2, datetime('now'))
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn get_profile_value(&self, key: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM profile_info WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }
}
