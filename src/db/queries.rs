//! Query and mutation operations over a loaded [`Snapshot`].
//!
//! Everything here is pure with respect to storage: callers load the snapshot,
//! run one of these functions, and persist the result if it was a mutation.
//! Mutations validate before touching anything, so an `Err` always leaves the
//! snapshot as it was.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use super::models::{
    Bookmark, Comment, CommentView, Follow, FollowState, NewPost, NewUser, Notification,
    NotificationKind, Post, PostView, SaveState, Snapshot, StoryUser, User,
};
use super::StoreError;
use crate::constants::{NOTIFICATION_QUERY_LIMIT, NOTIFICATION_STORAGE_CAP};
use crate::hashtags::{extract_tags, normalize_tag};

// ========== Enrichment ==========

/// How a post listing is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PostOrder {
    /// Highest id first.
    Newest,
    /// Most likes first, ties broken by highest id.
    MostLiked,
}

/// Resolves owner profiles, comments and viewer flags for posts of one snapshot.
struct Enricher<'a> {
    users: HashMap<&'a str, &'a User>,
    comments: HashMap<u64, Vec<&'a Comment>>,
    saved_by_viewer: HashSet<u64>,
    viewer: &'a str,
}

impl<'a> Enricher<'a> {
    fn new(snapshot: &'a Snapshot, viewer: &'a str) -> Self {
        let users = snapshot
            .users
            .iter()
            .map(|user| (user.username.as_str(), user))
            .collect();

        let mut comments: HashMap<u64, Vec<&Comment>> = HashMap::new();
        for comment in &snapshot.comments {
            comments.entry(comment.post_id).or_default().push(comment);
        }
        for list in comments.values_mut() {
            list.sort_by(|a, b| b.id.cmp(&a.id));
        }

        let saved_by_viewer = if viewer.is_empty() {
            HashSet::new()
        } else {
            snapshot
                .bookmarks
                .iter()
                .filter(|bookmark| bookmark.username == viewer)
                .map(|bookmark| bookmark.post_id)
                .collect()
        };

        Self {
            users,
            comments,
            saved_by_viewer,
            viewer,
        }
    }

    fn avatar_of(&self, username: &str) -> String {
        self.users
            .get(username)
            .map(|user| user.avatar_url.clone())
            .unwrap_or_default()
    }

    fn enrich(&self, post: &Post) -> PostView {
        let owner = self.users.get(post.username.as_str());

        let comments = self
            .comments
            .get(&post.id)
            .map(|list| {
                list.iter()
                    .map(|comment| CommentView {
                        comment: (*comment).clone(),
                        avatar_url: self.avatar_of(&comment.username),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let has_viewer = !self.viewer.is_empty();

        PostView {
            post: post.clone(),
            name: owner.map(|u| u.name.clone()).unwrap_or_default(),
            avatar_url: owner.map(|u| u.avatar_url.clone()).unwrap_or_default(),
            bio: owner.map(|u| u.bio.clone()).unwrap_or_default(),
            comments,
            is_liked_by_viewer: has_viewer && post.liked_by.iter().any(|u| u == self.viewer),
            is_saved_by_viewer: has_viewer && self.saved_by_viewer.contains(&post.id),
        }
    }
}

/// Select the posts matching `filter`, order them and enrich them for `viewer`.
fn select_posts<F>(snapshot: &Snapshot, viewer: &str, order: PostOrder, filter: F) -> Vec<PostView>
where
    F: Fn(&Post) -> bool,
{
    let mut posts: Vec<&Post> = snapshot.posts.iter().filter(|&post| filter(post)).collect();

    match order {
        PostOrder::Newest => posts.sort_by(|a, b| b.id.cmp(&a.id)),
        PostOrder::MostLiked => {
            posts.sort_by(|a, b| b.likes.cmp(&a.likes).then_with(|| b.id.cmp(&a.id)));
        }
    }

    let enricher = Enricher::new(snapshot, viewer);
    posts.into_iter().map(|post| enricher.enrich(post)).collect()
}

fn enrich_one(snapshot: &Snapshot, post: &Post, viewer: &str) -> PostView {
    Enricher::new(snapshot, viewer).enrich(post)
}

fn followed_by<'a>(snapshot: &'a Snapshot, username: &str) -> Vec<&'a str> {
    snapshot
        .follows
        .iter()
        .filter(|edge| edge.follower == username)
        .map(|edge| edge.following.as_str())
        .collect()
}

fn user_exists(snapshot: &Snapshot, username: &str) -> bool {
    snapshot.users.iter().any(|user| user.username == username)
}

fn require_user(snapshot: &Snapshot, username: &str) -> Result<(), StoreError> {
    if user_exists(snapshot, username) {
        Ok(())
    } else {
        Err(StoreError::UnknownUser(username.to_string()))
    }
}

// ========== Queries ==========

/// All users in registration order.
#[must_use]
pub fn list_users(snapshot: &Snapshot) -> Vec<User> {
    snapshot.users.clone()
}

/// Every post, newest first.
#[must_use]
pub fn list_posts(snapshot: &Snapshot, viewer: &str) -> Vec<PostView> {
    select_posts(snapshot, viewer, PostOrder::Newest, |_| true)
}

/// Posts by `username` and by the accounts they follow, newest first.
#[must_use]
pub fn feed(snapshot: &Snapshot, username: &str) -> Vec<PostView> {
    let authors: HashSet<&str> = followed_by(snapshot, username).into_iter().collect();
    select_posts(snapshot, username, PostOrder::Newest, |post| {
        post.username == username || authors.contains(post.username.as_str())
    })
}

/// Posts bookmarked by `username`, newest first.
#[must_use]
pub fn saved_posts(snapshot: &Snapshot, username: &str) -> Vec<PostView> {
    let saved: HashSet<u64> = snapshot
        .bookmarks
        .iter()
        .filter(|bookmark| bookmark.username == username)
        .map(|bookmark| bookmark.post_id)
        .collect();
    select_posts(snapshot, username, PostOrder::Newest, |post| {
        saved.contains(&post.id)
    })
}

/// Search posts by caption/author text and hashtag, most liked first.
///
/// An empty `query` or `tag` matches everything. `query` is matched as given,
/// whitespace included.
#[must_use]
pub fn explore(snapshot: &Snapshot, query: &str, tag: &str, viewer: &str) -> Vec<PostView> {
    let query = query.to_lowercase();
    let tag = normalize_tag(tag);

    select_posts(snapshot, viewer, PostOrder::MostLiked, |post| {
        let text_match = query.is_empty()
            || post.caption.to_lowercase().contains(&query)
            || post.username.to_lowercase().contains(&query);
        let tag_match = tag.is_empty() || post.tags.iter().any(|t| *t == tag);
        text_match && tag_match
    })
}

/// `username` followed by the accounts they follow, each flagged with whether
/// they have posted anything.
#[must_use]
pub fn stories(snapshot: &Snapshot, username: &str) -> Vec<StoryUser> {
    let authors: HashSet<&str> = snapshot.posts.iter().map(|p| p.username.as_str()).collect();

    let mut names = vec![username];
    for following in followed_by(snapshot, username) {
        if !names.contains(&following) {
            names.push(following);
        }
    }

    names
        .into_iter()
        .filter_map(|name| snapshot.users.iter().find(|user| user.username == name))
        .map(|user| StoryUser {
            user: user.clone(),
            has_story: authors.contains(user.username.as_str()),
        })
        .collect()
}

/// The most recent notifications addressed to `username`, newest first.
#[must_use]
pub fn notifications_for(snapshot: &Snapshot, username: &str) -> Vec<Notification> {
    let mut list: Vec<&Notification> = snapshot
        .notifications
        .iter()
        .filter(|n| n.username == username)
        .collect();
    list.sort_by(|a, b| b.id.cmp(&a.id));
    list.into_iter()
        .take(NOTIFICATION_QUERY_LIMIT)
        .cloned()
        .collect()
}

// ========== Mutations ==========

/// Record a notification unless the actor is the recipient.
fn notify(
    snapshot: &mut Snapshot,
    recipient: &str,
    kind: NotificationKind,
    actor: &str,
    post_id: Option<u64>,
    now: DateTime<Utc>,
) {
    if recipient == actor {
        return;
    }

    let highest = snapshot.notifications.iter().map(|n| n.id).max().unwrap_or(0);
    let id = snapshot.next_notification_id.max(highest + 1);
    snapshot.next_notification_id = id + 1;

    snapshot.notifications.push(Notification {
        id,
        username: recipient.to_string(),
        kind,
        actor: actor.to_string(),
        post_id,
        created_at: now,
        read: false,
    });

    if snapshot.notifications.len() > NOTIFICATION_STORAGE_CAP {
        let excess = snapshot.notifications.len() - NOTIFICATION_STORAGE_CAP;
        snapshot.notifications.drain(..excess);
    }
}

/// Register a new user.
///
/// # Errors
///
/// Returns [`StoreError::DuplicateUsername`] if the username is taken.
pub fn create_user(snapshot: &mut Snapshot, new_user: NewUser) -> Result<User, StoreError> {
    if user_exists(snapshot, &new_user.username) {
        return Err(StoreError::DuplicateUsername(new_user.username));
    }

    let user = User {
        username: new_user.username,
        name: new_user.name,
        avatar_url: new_user.avatar_url,
        bio: new_user.bio,
    };
    snapshot.users.push(user.clone());
    Ok(user)
}

/// Follow `following`, or unfollow if already following.
///
/// # Errors
///
/// Returns [`StoreError::SelfFollow`] when both names match and
/// [`StoreError::UnknownUser`] when either account does not exist.
pub fn follow_user(
    snapshot: &mut Snapshot,
    follower: &str,
    following: &str,
    now: DateTime<Utc>,
) -> Result<FollowState, StoreError> {
    if follower == following {
        return Err(StoreError::SelfFollow);
    }
    require_user(snapshot, follower)?;
    require_user(snapshot, following)?;

    if let Some(pos) = snapshot
        .follows
        .iter()
        .position(|edge| edge.follower == follower && edge.following == following)
    {
        snapshot.follows.remove(pos);
        return Ok(FollowState { following: false });
    }

    snapshot.follows.push(Follow {
        follower: follower.to_string(),
        following: following.to_string(),
    });
    notify(
        snapshot,
        following,
        NotificationKind::Follow,
        follower,
        None,
        now,
    );
    Ok(FollowState { following: true })
}

/// Publish a post. Tags come from the caption.
///
/// # Errors
///
/// Returns [`StoreError::UnknownUser`] if the owner does not exist.
pub fn create_post(
    snapshot: &mut Snapshot,
    new_post: NewPost,
    now: DateTime<Utc>,
) -> Result<PostView, StoreError> {
    require_user(snapshot, &new_post.username)?;

    let id = snapshot.next_post_id;
    snapshot.next_post_id += 1;

    let post = Post {
        id,
        tags: extract_tags(&new_post.caption),
        username: new_post.username,
        image_url: new_post.image_url,
        caption: new_post.caption,
        likes: 0,
        liked_by: Vec::new(),
        created_at: now,
    };
    snapshot.posts.push(post.clone());

    Ok(enrich_one(snapshot, &post, &post.username))
}

/// Like or unlike a post. `Ok(None)` when the post does not exist.
///
/// # Errors
///
/// Returns [`StoreError::UnknownUser`] if `username` does not exist.
pub fn toggle_like(
    snapshot: &mut Snapshot,
    post_id: u64,
    username: &str,
    now: DateTime<Utc>,
) -> Result<Option<PostView>, StoreError> {
    let Some(index) = snapshot.posts.iter().position(|p| p.id == post_id) else {
        return Ok(None);
    };
    require_user(snapshot, username)?;

    let post = &mut snapshot.posts[index];
    let added = if let Some(pos) = post.liked_by.iter().position(|u| u == username) {
        post.liked_by.remove(pos);
        false
    } else {
        post.liked_by.push(username.to_string());
        true
    };
    post.likes = post.liked_by.len();
    let owner = post.username.clone();

    if added {
        notify(
            snapshot,
            &owner,
            NotificationKind::Like,
            username,
            Some(post_id),
            now,
        );
    }

    let post = &snapshot.posts[index];
    Ok(Some(enrich_one(snapshot, post, username)))
}

/// Bookmark or un-bookmark a post. `Ok(None)` when the post does not exist.
///
/// # Errors
///
/// Returns [`StoreError::UnknownUser`] if `username` does not exist.
pub fn toggle_save(
    snapshot: &mut Snapshot,
    post_id: u64,
    username: &str,
) -> Result<Option<SaveState>, StoreError> {
    if !snapshot.posts.iter().any(|p| p.id == post_id) {
        return Ok(None);
    }
    require_user(snapshot, username)?;

    if let Some(pos) = snapshot
        .bookmarks
        .iter()
        .position(|b| b.username == username && b.post_id == post_id)
    {
        snapshot.bookmarks.remove(pos);
        return Ok(Some(SaveState { saved: false }));
    }

    snapshot.bookmarks.push(Bookmark {
        username: username.to_string(),
        post_id,
    });
    Ok(Some(SaveState { saved: true }))
}

/// Comment on a post. `Ok(None)` when the post does not exist.
///
/// # Errors
///
/// Returns [`StoreError::UnknownUser`] if `username` does not exist.
pub fn add_comment(
    snapshot: &mut Snapshot,
    post_id: u64,
    username: &str,
    text: &str,
    now: DateTime<Utc>,
) -> Result<Option<Comment>, StoreError> {
    let Some(owner) = snapshot
        .posts
        .iter()
        .find(|p| p.id == post_id)
        .map(|p| p.username.clone())
    else {
        return Ok(None);
    };
    require_user(snapshot, username)?;

    let comment = Comment {
        id: snapshot.next_comment_id,
        post_id,
        username: username.to_string(),
        text: text.to_string(),
        created_at: now,
    };
    snapshot.next_comment_id += 1;
    snapshot.comments.push(comment.clone());

    notify(
        snapshot,
        &owner,
        NotificationKind::Comment,
        username,
        Some(post_id),
        now,
    );

    Ok(Some(comment))
}
