use crate::database::models::CommentRecord;
use anyhow::Result;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

pub(super) struct SqliteCommentRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

const COMMENT_COLUMNS: &str =
    "id, showcase_id, author_id, content, parent_id, is_reply, like_count, created_at";

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<CommentRecord> {
    Ok(CommentRecord {
        id: row.get(0)?,
        showcase_id: row.get(1)?,
        author_id: row.get(2)?,
        content: row.get(3)?,
        parent_id: row.get(4)?,
        is_reply: row.get::<_, i64>(5)? != 0,
        like_count: row.get(6)?,
        created_at: row.get(7)?,
    })
}

impl<'conn> super::CommentRepository for SqliteCommentRepository<'conn> {
    fn insert(&self, record: &CommentRecord) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            r#"
            INSERT INTO comments (id, showcase_id, author_id, content, parent_id, is_reply,
                                  like_count, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                record.id,
                record.showcase_id,
                record.author_id,
                record.content,
                record.parent_id,
                if record.is_reply { 1 } else { 0 },
                record.like_count,
                record.created_at,
            ],
        )?;
        tx.execute(
            "UPDATE showcases SET comment_count = comment_count + 1 WHERE id = ?1",
            params![record.showcase_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<CommentRecord>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1"),
                params![id],
                comment_from_row,
            )
            .optional()?)
    }

    fn update_content(&self, id: &str, content: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE comments SET content = ?1 WHERE id = ?2",
            params![content, id],
        )?;
        Ok(())
    }

    fn delete_with_counter(&self, comment_id: &str, showcase_id: &str) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let removed: i64 = tx.query_row(
            r#"
            WITH RECURSIVE tree(id) AS (
                SELECT id FROM comments WHERE id = ?1
                UNION ALL
                SELECT c.id FROM comments c JOIN tree t ON c.parent_id = t.id
            )
            SELECT COUNT(*) FROM tree
            "#,
            params![comment_id],
            |row| row.get(0),
        )?;
        // The delete cascades to descendant replies via the parent_id FK.
        tx.execute("DELETE FROM comments WHERE id = ?1", params![comment_id])?;
        tx.execute(
            "UPDATE showcases SET comment_count = comment_count - ?1 WHERE id = ?2",
            params![removed, showcase_id],
        )?;
        tx.commit()?;
        Ok(removed as usize)
    }

    fn list_for_showcase(&self, showcase_id: &str) -> Result<Vec<CommentRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE showcase_id = ?1 \
             ORDER BY datetime(created_at) ASC"
        ))?;
        let rows = stmt.query_map(params![showcase_id], comment_from_row)?;
        let mut comments = Vec::new();
        for row in rows {
            comments.push(row?);
        }
        Ok(comments)
    }

    fn list_for_showcases(&self, showcase_ids: &[String]) -> Result<Vec<CommentRecord>> {
        if showcase_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; showcase_ids.len()].join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE showcase_id IN ({placeholders}) \
             ORDER BY datetime(created_at) ASC"
        ))?;
        let rows = stmt.query_map(params_from_iter(showcase_ids.iter()), comment_from_row)?;
        let mut comments = Vec::new();
        for row in rows {
            comments.push(row?);
        }
        Ok(comments)
    }
}
