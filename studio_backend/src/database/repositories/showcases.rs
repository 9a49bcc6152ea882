use crate::database::models::ShowcaseRecord;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(super) struct SqliteShowcaseRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

const SHOWCASE_COLUMNS: &str = "id, owner_id, url, storage_key, media_kind, caption, tags, \
                                privacy, comment_count, like_count, created_at";

fn showcase_from_row(row: &Row<'_>) -> rusqlite::Result<(ShowcaseRecord, String)> {
    let record = ShowcaseRecord {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        url: row.get(2)?,
        storage_key: row.get(3)?,
        media_kind: row.get(4)?,
        caption: row.get(5)?,
        tags: Vec::new(),
        privacy: row.get(7)?,
        comment_count: row.get(8)?,
        like_count: row.get(9)?,
        created_at: row.get(10)?,
    };
    let tags_json: String = row.get(6)?;
    Ok((record, tags_json))
}

fn finish_showcase((mut record, tags_json): (ShowcaseRecord, String)) -> ShowcaseRecord {
    record.tags = serde_json::from_str(&tags_json).unwrap_or_default();
    record
}

impl<'conn> super::ShowcaseRepository for SqliteShowcaseRepository<'conn> {
    fn create(&self, record: &ShowcaseRecord) -> Result<()> {
        let tags = serde_json::to_string(&record.tags)?;
        self.conn.execute(
            r#"
            INSERT INTO showcases (id, owner_id, url, storage_key, media_kind, caption, tags,
                                   privacy, comment_count, like_count, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                record.id,
                record.owner_id,
                record.url,
                record.storage_key,
                record.media_kind,
                record.caption,
                tags,
                record.privacy,
                record.comment_count,
                record.like_count,
                record.created_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<ShowcaseRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {SHOWCASE_COLUMNS} FROM showcases WHERE id = ?1"),
                params![id],
                showcase_from_row,
            )
            .optional()?;
        Ok(row.map(finish_showcase))
    }

    fn list_for_owner(&self, owner_id: &str, include_private: bool) -> Result<Vec<ShowcaseRecord>> {
        let sql = if include_private {
            format!(
                "SELECT {SHOWCASE_COLUMNS} FROM showcases \
                 WHERE owner_id = ?1 \
                 ORDER BY datetime(created_at) DESC"
            )
        } else {
            format!(
                "SELECT {SHOWCASE_COLUMNS} FROM showcases \
                 WHERE owner_id = ?1 AND privacy = 'public' \
                 ORDER BY datetime(created_at) DESC"
            )
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![owner_id], showcase_from_row)?;
        let mut showcases = Vec::new();
        for row in rows {
            showcases.push(finish_showcase(row?));
        }
        Ok(showcases)
    }

    fn update_details(&self, id: &str, caption: &str, tags: &[String], privacy: &str) -> Result<()> {
        let tags = serde_json::to_string(tags)?;
        self.conn.execute(
            r#"
            UPDATE showcases
            SET caption = ?1, tags = ?2, privacy = ?3
            WHERE id = ?4
            "#,
            params![caption, tags, privacy, id],
        )?;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        // Cascades to comments, comment_likes and showcase_likes.
        let removed = self
            .conn
            .execute("DELETE FROM showcases WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    fn count_for_owner(&self, owner_id: &str) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM showcases WHERE owner_id = ?1",
            params![owner_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
