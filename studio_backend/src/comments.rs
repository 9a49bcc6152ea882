use crate::database::models::CommentRecord;
use crate::database::repositories::{CommentRepository, ShowcaseRepository, UserRepository};
use crate::database::Database;
use crate::error::{StudioError, StudioResult};
use crate::mentions::MentionResolver;
use crate::notifications::{NotificationEvent, NotificationService};
use crate::utils::now_utc_iso;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A comment with its nested replies, ready for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentNode {
    pub id: String,
    pub showcase_id: String,
    pub author_id: String,
    pub content: String,
    pub parent_id: Option<String>,
    pub is_reply: bool,
    pub like_count: i64,
    pub created_at: String,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    fn from_record(record: CommentRecord, replies: Vec<CommentNode>) -> Self {
        Self {
            id: record.id,
            showcase_id: record.showcase_id,
            author_id: record.author_id,
            content: record.content,
            parent_id: record.parent_id,
            is_reply: record.is_reply,
            like_count: record.like_count,
            created_at: record.created_at,
            replies,
        }
    }
}

/// Builds the reply tree from a flat batch of comment rows.
///
/// Single grouping pass into a `parent_id -> children` map, then recursive
/// assembly: O(n) over the batch. Roots are rows with no parent; sibling
/// order is input order (sort by `created_at` beforehand for recency). The
/// result depends only on id equality, never on input ordering. Rows whose
/// parent is absent from the batch belong to data outside it and are
/// dropped.
pub fn build_hierarchy(comments: Vec<CommentRecord>) -> Vec<CommentNode> {
    let mut children: HashMap<String, Vec<CommentRecord>> = HashMap::new();
    let mut roots: Vec<CommentRecord> = Vec::new();
    for comment in comments {
        match comment.parent_id.clone() {
            Some(parent_id) => children.entry(parent_id).or_default().push(comment),
            None => roots.push(comment),
        }
    }
    roots
        .into_iter()
        .map(|record| attach_replies(record, &mut children))
        .collect()
}

fn attach_replies(
    record: CommentRecord,
    children: &mut HashMap<String, Vec<CommentRecord>>,
) -> CommentNode {
    let replies = children
        .remove(&record.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| attach_replies(child, children))
        .collect();
    CommentNode::from_record(record, replies)
}

/// Comments of one showcase out of a batch query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowcaseCommentGroup {
    pub showcase_id: String,
    pub comments: Vec<CommentNode>,
}

#[derive(Clone)]
pub struct CommentService {
    database: Database,
    notifications: NotificationService,
    mentions: MentionResolver,
}

impl CommentService {
    pub fn new(database: Database, notifications: NotificationService) -> Self {
        let mentions = MentionResolver::new(database.clone(), notifications.clone());
        Self {
            database,
            notifications,
            mentions,
        }
    }

    pub fn post_comment(
        &self,
        showcase_id: &str,
        content: &str,
        author_id: &str,
    ) -> StudioResult<CommentNode> {
        let content = content.trim();
        if content.is_empty() {
            return Err(StudioError::BadRequest(
                "comment content may not be empty".into(),
            ));
        }

        let record = CommentRecord {
            id: Uuid::new_v4().to_string(),
            showcase_id: showcase_id.to_string(),
            author_id: author_id.to_string(),
            content: content.to_string(),
            parent_id: None,
            is_reply: false,
            like_count: 0,
            created_at: now_utc_iso(),
        };

        let (author, showcase) = self.database.with_repositories(|repos| {
            let author = repos.users().get(author_id)?;
            let showcase = repos.showcases().get(showcase_id)?;
            if author.is_some() && showcase.is_some() {
                repos.comments().insert(&record)?;
            }
            Ok((author, showcase))
        })?;
        let author = author.ok_or(StudioError::Unauthorized)?;
        let showcase = showcase.ok_or(StudioError::NotFound("showcase"))?;

        self.notifications
            .notify(&NotificationEvent::comment(&author, &showcase, &record))?;
        self.mentions
            .notify_mentions(content, &author, Some(&showcase), Some(&record))?;

        Ok(CommentNode::from_record(record, Vec::new()))
    }

    pub fn post_reply(
        &self,
        parent_comment_id: &str,
        content: &str,
        author_id: &str,
    ) -> StudioResult<CommentNode> {
        let content = content.trim();
        if content.is_empty() {
            return Err(StudioError::BadRequest(
                "reply content may not be empty".into(),
            ));
        }

        let (author, parent) = self.database.with_repositories(|repos| {
            Ok((
                repos.users().get(author_id)?,
                repos.comments().get(parent_comment_id)?,
            ))
        })?;
        let author = author.ok_or(StudioError::Unauthorized)?;
        let parent = parent.ok_or(StudioError::NotFound("comment"))?;

        let record = CommentRecord {
            id: Uuid::new_v4().to_string(),
            showcase_id: parent.showcase_id.clone(),
            author_id: author_id.to_string(),
            content: content.to_string(),
            parent_id: Some(parent.id.clone()),
            is_reply: true,
            like_count: 0,
            created_at: now_utc_iso(),
        };
        self.database
            .with_repositories(|repos| repos.comments().insert(&record))?;

        self.notifications
            .notify(&NotificationEvent::reply(&author, &parent, &record))?;
        let showcase = self
            .database
            .with_repositories(|repos| repos.showcases().get(&record.showcase_id))?;
        self.mentions
            .notify_mentions(content, &author, showcase.as_ref(), Some(&record))?;

        Ok(CommentNode::from_record(record, Vec::new()))
    }

    /// Only the author may edit. Identical content is a no-op: no row write.
    pub fn update_comment(
        &self,
        comment_id: &str,
        new_content: &str,
        author_id: &str,
    ) -> StudioResult<CommentNode> {
        let new_content = new_content.trim();
        if new_content.is_empty() {
            return Err(StudioError::BadRequest(
                "comment content may not be empty".into(),
            ));
        }

        let mut comment = self
            .database
            .with_repositories(|repos| repos.comments().get(comment_id))?
            .ok_or(StudioError::NotFound("comment"))?;
        if comment.author_id != author_id {
            return Err(StudioError::Unauthorized);
        }
        if comment.content == new_content {
            return Ok(CommentNode::from_record(comment, Vec::new()));
        }

        self.database
            .with_repositories(|repos| repos.comments().update_content(comment_id, new_content))?;
        comment.content = new_content.to_string();
        Ok(CommentNode::from_record(comment, Vec::new()))
    }

    /// Removes the comment and its descendant replies, decrementing the
    /// showcase counter by the same amount in one transaction. Nothing is
    /// deleted when the parent showcase lookup fails.
    pub fn delete_comment(&self, comment_id: &str, author_id: &str) -> StudioResult<usize> {
        let comment = self
            .database
            .with_repositories(|repos| repos.comments().get(comment_id))?
            .ok_or(StudioError::NotFound("comment"))?;
        if comment.author_id != author_id {
            return Err(StudioError::Unauthorized);
        }
        let showcase = self
            .database
            .with_repositories(|repos| repos.showcases().get(&comment.showcase_id))?
            .ok_or(StudioError::NotFound("showcase"))?;

        let removed = self.database.with_repositories(|repos| {
            repos
                .comments()
                .delete_with_counter(comment_id, &showcase.id)
        })?;
        Ok(removed)
    }

    pub fn comments_for_showcase(&self, showcase_id: &str) -> StudioResult<Vec<CommentNode>> {
        let records = self.database.with_repositories(|repos| {
            if repos.showcases().get(showcase_id)?.is_none() {
                return Ok(None);
            }
            Ok(Some(repos.comments().list_for_showcase(showcase_id)?))
        })?;
        let records = records.ok_or(StudioError::NotFound("showcase"))?;
        Ok(build_hierarchy(records))
    }

    /// Batch form backing `getAllComments(fileIds[])`: one fetch, grouped by
    /// showcase, each group assembled independently. Groups keep the
    /// requested id order; unknown ids yield empty groups.
    pub fn comments_for_showcases(
        &self,
        showcase_ids: &[String],
    ) -> StudioResult<Vec<ShowcaseCommentGroup>> {
        let records = self
            .database
            .with_repositories(|repos| repos.comments().list_for_showcases(showcase_ids))?;

        let mut by_showcase: HashMap<String, Vec<CommentRecord>> = HashMap::new();
        for record in records {
            by_showcase
                .entry(record.showcase_id.clone())
                .or_default()
                .push(record);
        }

        Ok(showcase_ids
            .iter()
            .map(|showcase_id| ShowcaseCommentGroup {
                showcase_id: showcase_id.clone(),
                comments: build_hierarchy(by_showcase.remove(showcase_id).unwrap_or_default()),
            })
            .collect())
    }
}
