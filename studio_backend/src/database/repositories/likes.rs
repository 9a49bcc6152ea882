use crate::database::models::LikeEntry;
use anyhow::Result;
use rusqlite::{params, Connection};

pub(super) struct SqliteLikeRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> SqliteLikeRepository<'conn> {
    /// Membership insert and counter bump as one atomic unit. The counter
    /// only moves when the INSERT actually changed membership, which keeps
    /// `count(rows) == like_count` and makes repeated likes no-ops.
    fn like(
        &self,
        like_table: &str,
        target_table: &str,
        target_column: &str,
        target_id: &str,
        user_id: &str,
        created_at: &str,
    ) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let inserted = tx.execute(
            &format!(
                "INSERT OR IGNORE INTO {like_table} ({target_column}, user_id, created_at) \
                 VALUES (?1, ?2, ?3)"
            ),
            params![target_id, user_id, created_at],
        )?;
        if inserted > 0 {
            tx.execute(
                &format!("UPDATE {target_table} SET like_count = like_count + 1 WHERE id = ?1"),
                params![target_id],
            )?;
        }
        tx.commit()?;
        Ok(inserted > 0)
    }

    fn unlike(
        &self,
        like_table: &str,
        target_table: &str,
        target_column: &str,
        target_id: &str,
        user_id: &str,
    ) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute(
            &format!("DELETE FROM {like_table} WHERE {target_column} = ?1 AND user_id = ?2"),
            params![target_id, user_id],
        )?;
        if removed > 0 {
            tx.execute(
                &format!("UPDATE {target_table} SET like_count = like_count - 1 WHERE id = ?1"),
                params![target_id],
            )?;
        }
        tx.commit()?;
        Ok(removed > 0)
    }

    fn likers(&self, like_table: &str, target_column: &str, target_id: &str) -> Result<Vec<LikeEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT user_id, created_at FROM {like_table} \
             WHERE {target_column} = ?1 \
             ORDER BY datetime(created_at) ASC"
        ))?;
        let rows = stmt.query_map(params![target_id], |row| {
            Ok(LikeEntry {
                user_id: row.get(0)?,
                created_at: row.get(1)?,
            })
        })?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}

impl<'conn> super::LikeRepository for SqliteLikeRepository<'conn> {
    fn like_showcase(&self, showcase_id: &str, user_id: &str, created_at: &str) -> Result<bool> {
        self.like(
            "showcase_likes",
            "showcases",
            "showcase_id",
            showcase_id,
            user_id,
            created_at,
        )
    }

    fn unlike_showcase(&self, showcase_id: &str, user_id: &str) -> Result<bool> {
        self.unlike("showcase_likes", "showcases", "showcase_id", showcase_id, user_id)
    }

    fn showcase_likers(&self, showcase_id: &str) -> Result<Vec<LikeEntry>> {
        self.likers("showcase_likes", "showcase_id", showcase_id)
    }

    fn like_comment(&self, comment_id: &str, user_id: &str, created_at: &str) -> Result<bool> {
        self.like(
            "comment_likes",
            "comments",
            "comment_id",
            comment_id,
            user_id,
            created_at,
        )
    }

    fn unlike_comment(&self, comment_id: &str, user_id: &str) -> Result<bool> {
        self.unlike("comment_likes", "comments", "comment_id", comment_id, user_id)
    }

    fn comment_likers(&self, comment_id: &str) -> Result<Vec<LikeEntry>> {
        self.likers("comment_likes", "comment_id", comment_id)
    }
}
