use crate::database::models::UserRecord;
use anyhow::Result;
use rusqlite::{params, Connection};

use super::users::{finish_user, user_from_row};

pub(super) struct SqliteFollowRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> super::FollowRepository for SqliteFollowRepository<'conn> {
    fn follow(&self, follower_id: &str, followed_id: &str, created_at: &str) -> Result<bool> {
        let inserted = self.conn.execute(
            r#"
            INSERT OR IGNORE INTO follows (follower_id, followed_id, created_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![follower_id, followed_id, created_at],
        )?;
        Ok(inserted > 0)
    }

    fn unfollow(&self, follower_id: &str, followed_id: &str) -> Result<bool> {
        let removed = self.conn.execute(
            r#"
            DELETE FROM follows
            WHERE follower_id = ?1 AND followed_id = ?2
            "#,
            params![follower_id, followed_id],
        )?;
        Ok(removed > 0)
    }

    fn follower_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT follower_id
            FROM follows
            WHERE followed_id = ?1
            ORDER BY datetime(created_at) ASC
            "#,
        )?;
        let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    fn following_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT followed_id
            FROM follows
            WHERE follower_id = ?1
            ORDER BY datetime(created_at) ASC
            "#,
        )?;
        let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    fn followings_of(&self, user_id: &str) -> Result<Vec<UserRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT u.id, u.username, u.first_name, u.last_name, u.bio,
                   u.avatar_url, u.cover_url, u.social_links, u.created_at
            FROM follows f
            JOIN users u ON u.id = f.followed_id
            WHERE f.follower_id = ?1
            ORDER BY u.username ASC
            "#,
        )?;
        let rows = stmt.query_map(params![user_id], user_from_row)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(finish_user(row?));
        }
        Ok(users)
    }

    fn is_following(&self, follower_id: &str, followed_id: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            r#"
            SELECT COUNT(*)
            FROM follows
            WHERE follower_id = ?1 AND followed_id = ?2
            "#,
            params![follower_id, followed_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
