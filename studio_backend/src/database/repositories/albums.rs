use crate::database::models::AlbumRecord;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(super) struct SqliteAlbumRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

fn album_from_row(row: &Row<'_>) -> rusqlite::Result<AlbumRecord> {
    Ok(AlbumRecord {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
    })
}

impl<'conn> super::AlbumRepository for SqliteAlbumRepository<'conn> {
    fn create(&self, record: &AlbumRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO albums (id, owner_id, name, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![record.id, record.owner_id, record.name, record.created_at],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<AlbumRecord>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, owner_id, name, created_at FROM albums WHERE id = ?1",
                params![id],
                album_from_row,
            )
            .optional()?)
    }

    fn get_by_name(&self, owner_id: &str, name: &str) -> Result<Option<AlbumRecord>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, owner_id, name, created_at FROM albums \
                 WHERE owner_id = ?1 AND name = ?2",
                params![owner_id, name],
                album_from_row,
            )
            .optional()?)
    }

    fn rename(&self, id: &str, name: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE albums SET name = ?1 WHERE id = ?2",
            params![name, id],
        )?;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM albums WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    fn list_for_owner(&self, owner_id: &str) -> Result<Vec<AlbumRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner_id, name, created_at FROM albums \
             WHERE owner_id = ?1 \
             ORDER BY name ASC",
        )?;
        let rows = stmt.query_map(params![owner_id], album_from_row)?;
        let mut albums = Vec::new();
        for row in rows {
            albums.push(row?);
        }
        Ok(albums)
    }

    fn add_showcase(&self, album_id: &str, showcase_id: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT OR IGNORE INTO album_showcases (album_id, showcase_id)
            VALUES (?1, ?2)
            "#,
            params![album_id, showcase_id],
        )?;
        Ok(())
    }

    fn remove_showcase(&self, album_id: &str, showcase_id: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM album_showcases WHERE album_id = ?1 AND showcase_id = ?2",
            params![album_id, showcase_id],
        )?;
        Ok(removed > 0)
    }

    fn showcase_ids(&self, album_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.id
            FROM album_showcases a
            JOIN showcases s ON s.id = a.showcase_id
            WHERE a.album_id = ?1
            ORDER BY datetime(s.created_at) DESC
            "#,
        )?;
        let rows = stmt.query_map(params![album_id], |row| row.get::<_, String>(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }
}
