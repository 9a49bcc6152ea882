use crate::database::models::UserRecord;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(super) struct SqliteUserRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

const USER_COLUMNS: &str =
    "id, username, first_name, last_name, bio, avatar_url, cover_url, social_links, created_at";

pub(super) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<(UserRecord, String)> {
    let record = UserRecord {
        id: row.get(0)?,
        username: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        bio: row.get(4)?,
        avatar_url: row.get(5)?,
        cover_url: row.get(6)?,
        social_links: Vec::new(),
        created_at: row.get(8)?,
    };
    let social_links_json: String = row.get(7)?;
    Ok((record, social_links_json))
}

pub(super) fn finish_user((mut record, social_links_json): (UserRecord, String)) -> UserRecord {
    record.social_links = serde_json::from_str(&social_links_json).unwrap_or_default();
    record
}

impl<'conn> super::UserRepository for SqliteUserRepository<'conn> {
    fn upsert(&self, record: &UserRecord) -> Result<()> {
        let social_links = serde_json::to_string(&record.social_links)?;
        self.conn.execute(
            r#"
            INSERT INTO users (id, username, first_name, last_name, bio, avatar_url, cover_url, social_links, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                bio = excluded.bio,
                avatar_url = excluded.avatar_url,
                cover_url = excluded.cover_url,
                social_links = excluded.social_links
            "#,
            params![
                record.id,
                record.username,
                record.first_name,
                record.last_name,
                record.bio,
                record.avatar_url,
                record.cover_url,
                social_links,
                record.created_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<UserRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                user_from_row,
            )
            .optional()?;
        Ok(row.map(finish_user))
    }

    fn get_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                params![username],
                user_from_row,
            )
            .optional()?;
        Ok(row.map(finish_user))
    }
}
