mod albums;
mod comments;
mod follows;
mod likes;
mod notifications;
mod showcases;
mod users;

use super::models::{
    AlbumRecord, CommentRecord, LikeEntry, NotificationListItem, NotificationRecord,
    ShowcaseRecord, UserRecord,
};
use anyhow::Result;
use rusqlite::Connection;

pub trait UserRepository {
    fn upsert(&self, record: &UserRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<UserRecord>>;
    fn get_by_username(&self, username: &str) -> Result<Option<UserRecord>>;
}

pub trait FollowRepository {
    /// Returns false when the edge already existed.
    fn follow(&self, follower_id: &str, followed_id: &str, created_at: &str) -> Result<bool>;
    /// Returns false when there was no edge to remove.
    fn unfollow(&self, follower_id: &str, followed_id: &str) -> Result<bool>;
    fn follower_ids(&self, user_id: &str) -> Result<Vec<String>>;
    fn following_ids(&self, user_id: &str) -> Result<Vec<String>>;
    /// The users `user_id` follows, joined with their profiles (mention
    /// suggestions filter on these).
    fn followings_of(&self, user_id: &str) -> Result<Vec<UserRecord>>;
    fn is_following(&self, follower_id: &str, followed_id: &str) -> Result<bool>;
}

pub trait ShowcaseRepository {
    fn create(&self, record: &ShowcaseRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<ShowcaseRecord>>;
    fn list_for_owner(&self, owner_id: &str, include_private: bool) -> Result<Vec<ShowcaseRecord>>;
    fn update_details(
        &self,
        id: &str,
        caption: &str,
        tags: &[String],
        privacy: &str,
    ) -> Result<()>;
    fn delete(&self, id: &str) -> Result<bool>;
    fn count_for_owner(&self, owner_id: &str) -> Result<i64>;
}

pub trait CommentRepository {
    /// Inserts the row and bumps the owning showcase's comment counter in a
    /// single transaction.
    fn insert(&self, record: &CommentRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<CommentRecord>>;
    fn update_content(&self, id: &str, content: &str) -> Result<()>;
    /// Deletes the comment (cascading to descendant replies) and decrements
    /// the showcase counter by the number of removed rows, atomically.
    /// Returns how many comment rows were removed.
    fn delete_with_counter(&self, comment_id: &str, showcase_id: &str) -> Result<usize>;
    fn list_for_showcase(&self, showcase_id: &str) -> Result<Vec<CommentRecord>>;
    fn list_for_showcases(&self, showcase_ids: &[String]) -> Result<Vec<CommentRecord>>;
}

pub trait LikeRepository {
    /// Returns true when membership actually changed; a repeated like from
    /// the same user is a no-op and leaves the counter untouched.
    fn like_showcase(&self, showcase_id: &str, user_id: &str, created_at: &str) -> Result<bool>;
    fn unlike_showcase(&self, showcase_id: &str, user_id: &str) -> Result<bool>;
    fn showcase_likers(&self, showcase_id: &str) -> Result<Vec<LikeEntry>>;
    fn like_comment(&self, comment_id: &str, user_id: &str, created_at: &str) -> Result<bool>;
    fn unlike_comment(&self, comment_id: &str, user_id: &str) -> Result<bool>;
    fn comment_likers(&self, comment_id: &str) -> Result<Vec<LikeEntry>>;
}

pub trait AlbumRepository {
    fn create(&self, record: &AlbumRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<AlbumRecord>>;
    fn get_by_name(&self, owner_id: &str, name: &str) -> Result<Option<AlbumRecord>>;
    fn rename(&self, id: &str, name: &str) -> Result<()>;
    fn delete(&self, id: &str) -> Result<bool>;
    fn list_for_owner(&self, owner_id: &str) -> Result<Vec<AlbumRecord>>;
    fn add_showcase(&self, album_id: &str, showcase_id: &str) -> Result<()>;
    fn remove_showcase(&self, album_id: &str, showcase_id: &str) -> Result<bool>;
    fn showcase_ids(&self, album_id: &str) -> Result<Vec<String>>;
}

pub trait NotificationRepository {
    fn create(&self, record: &NotificationRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<NotificationRecord>>;
    fn set_read(&self, id: &str, is_read: bool) -> Result<()>;
    /// Newest-first, joined with the sender's current username/avatar.
    fn list_for_recipient(&self, recipient_id: &str) -> Result<Vec<NotificationListItem>>;
    fn count_unread(&self, recipient_id: &str) -> Result<usize>;
}

pub struct SqliteRepositories<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepositories<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn users(&self) -> impl UserRepository + '_ {
        users::SqliteUserRepository { conn: self.conn }
    }

    pub fn follows(&self) -> impl FollowRepository + '_ {
        follows::SqliteFollowRepository { conn: self.conn }
    }

    pub fn showcases(&self) -> impl ShowcaseRepository + '_ {
        showcases::SqliteShowcaseRepository { conn: self.conn }
    }

    pub fn comments(&self) -> impl CommentRepository + '_ {
        comments::SqliteCommentRepository { conn: self.conn }
    }

    pub fn likes(&self) -> impl LikeRepository + '_ {
        likes::SqliteLikeRepository { conn: self.conn }
    }

    pub fn albums(&self) -> impl AlbumRepository + '_ {
        albums::SqliteAlbumRepository { conn: self.conn }
    }

    pub fn notifications(&self) -> impl NotificationRepository + '_ {
        notifications::SqliteNotificationRepository { conn: self.conn }
    }

    pub fn conn(&self) -> &'conn Connection {
        self.conn
    }
}
