use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account. The username is the only identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub bio: String,
}

/// An image post. `likes` always mirrors `liked_by.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub username: String,
    pub image_url: String,
    pub caption: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub likes: usize,
    #[serde(default)]
    pub liked_by: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub post_id: u64,
    pub username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A directed follow edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub follower: String,
    pub following: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub username: String,
    pub post_id: u64,
}

/// What triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Follow,
    Like,
    Comment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: u64,
    /// Recipient.
    pub username: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub actor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<u64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

/// The full persisted state: every collection plus the id counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub next_post_id: u64,
    pub next_comment_id: u64,
    /// Zero means "not yet persisted"; derived from stored notifications on first use.
    #[serde(default)]
    pub next_notification_id: u64,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub follows: Vec<Follow>,
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

impl Snapshot {
    /// A snapshot with no entities and counters starting at 1.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            next_post_id: 1,
            next_comment_id: 1,
            next_notification_id: 1,
            users: Vec::new(),
            posts: Vec::new(),
            comments: Vec::new(),
            follows: Vec::new(),
            bookmarks: Vec::new(),
            notifications: Vec::new(),
        }
    }
}

// ========== Inputs ==========

/// Data for registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub avatar_url: String,
    pub bio: String,
}

/// Data for publishing a post. Tags are derived from the caption.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub username: String,
    pub image_url: String,
    pub caption: String,
}

// ========== Views ==========

/// A comment as returned alongside a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub avatar_url: String,
}

/// A post enriched with its owner's profile, its comments and viewer flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub name: String,
    pub avatar_url: String,
    pub bio: String,
    pub comments: Vec<CommentView>,
    pub is_liked_by_viewer: bool,
    pub is_saved_by_viewer: bool,
}

/// A user in the stories tray.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryUser {
    #[serde(flatten)]
    pub user: User,
    pub has_story: bool,
}

/// Result of a follow toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FollowState {
    pub following: bool,
}

/// Result of a bookmark toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveState {
    pub saved: bool,
}
