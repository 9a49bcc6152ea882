use crate::database::models::{NotificationKind, NotificationListItem, NotificationRecord};
use anyhow::Result;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(super) struct SqliteNotificationRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

const NOTIFICATION_COLUMNS: &str = "id, recipient_id, sender_id, showcase_id, comment_id, kind, \
                                    is_read, sender_name, title, content, created_at";

fn notification_from_row(row: &Row<'_>) -> rusqlite::Result<NotificationRecord> {
    let kind_raw: String = row.get(5)?;
    let kind = NotificationKind::parse(&kind_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            Type::Text,
            format!("unknown notification kind: {kind_raw}").into(),
        )
    })?;
    Ok(NotificationRecord {
        id: row.get(0)?,
        recipient_id: row.get(1)?,
        sender_id: row.get(2)?,
        showcase_id: row.get(3)?,
        comment_id: row.get(4)?,
        kind,
        is_read: row.get::<_, i64>(6)? != 0,
        sender_name: row.get(7)?,
        title: row.get(8)?,
        content: row.get(9)?,
        created_at: row.get(10)?,
    })
}

impl<'conn> super::NotificationRepository for SqliteNotificationRepository<'conn> {
    fn create(&self, record: &NotificationRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO notifications (id, recipient_id, sender_id, showcase_id, comment_id,
                                       kind, is_read, sender_name, title, content, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                record.id,
                record.recipient_id,
                record.sender_id,
                record.showcase_id,
                record.comment_id,
                record.kind.as_str(),
                if record.is_read { 1 } else { 0 },
                record.sender_name,
                record.title,
                record.content,
                record.created_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<NotificationRecord>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?1"),
                params![id],
                notification_from_row,
            )
            .optional()?)
    }

    fn set_read(&self, id: &str, is_read: bool) -> Result<()> {
        self.conn.execute(
            "UPDATE notifications SET is_read = ?1 WHERE id = ?2",
            params![if is_read { 1 } else { 0 }, id],
        )?;
        Ok(())
    }

    fn list_for_recipient(&self, recipient_id: &str) -> Result<Vec<NotificationListItem>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT n.id, n.recipient_id, n.sender_id, n.showcase_id, n.comment_id, n.kind,
                   n.is_read, n.sender_name, n.title, n.content, n.created_at,
                   u.username, u.avatar_url
            FROM notifications n
            LEFT JOIN users u ON u.id = n.sender_id
            WHERE n.recipient_id = ?1
            ORDER BY datetime(n.created_at) DESC
            "#,
        )?;
        let rows = stmt.query_map(params![recipient_id], |row| {
            Ok(NotificationListItem {
                notification: notification_from_row(row)?,
                sender_username: row.get(11)?,
                sender_avatar_url: row.get(12)?,
            })
        })?;
        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    fn count_unread(&self, recipient_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = ?1 AND is_read = 0",
            params![recipient_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
