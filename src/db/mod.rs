mod models;
mod queries;
mod seed;
mod snapshot;

pub use models::*;
pub use seed::seed_snapshot;
pub use snapshot::{SnapshotError, SnapshotFile};

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Failures of store operations. Missing posts are reported as `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User not found: {0}")]
    UnknownUser(String),
    #[error("Username already exists: {0}")]
    DuplicateUsername(String),
    #[error("Users cannot follow themselves")]
    SelfFollow,
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Handle to the persisted social graph.
///
/// Every operation loads the snapshot from disk; mutations save it back before
/// returning. Queries share a read lock and mutations take the write lock for
/// the whole load-mutate-save cycle, so writes never interleave. The raw
/// snapshot never leaves this type.
#[derive(Debug, Clone)]
pub struct Store {
    file: Arc<RwLock<SnapshotFile>>,
}

impl Store {
    /// Open the store at `path`, seeding it if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read, parsed or seeded.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let file = SnapshotFile::new(path);
        let snapshot = file.load().await?;
        info!(
            path = %path.display(),
            users = snapshot.users.len(),
            posts = snapshot.posts.len(),
            "Store opened"
        );
        Ok(Self {
            file: Arc::new(RwLock::new(file)),
        })
    }

    /// Run `query` against the current snapshot. A missing file is reseeded
    /// under the write lock so concurrent readers agree on one seed.
    async fn read<T>(&self, query: impl FnOnce(&Snapshot) -> T) -> Result<T, StoreError> {
        {
            let file = self.file.read().await;
            if let Some(snapshot) = file.read_existing().await? {
                return Ok(query(&snapshot));
            }
        }
        let file = self.file.write().await;
        let snapshot = file.load().await?;
        Ok(query(&snapshot))
    }

    /// Run `mutation` against a fresh copy of the snapshot and persist it on success.
    async fn write<T>(
        &self,
        mutation: impl FnOnce(&mut Snapshot) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let file = self.file.write().await;
        let mut snapshot = file.load().await?;
        let result = mutation(&mut snapshot)?;
        file.save(&snapshot).await?;
        Ok(result)
    }

    /// Like [`Store::write`] for operations that may find nothing to act on;
    /// `Ok(None)` skips the save.
    async fn write_if_found<T>(
        &self,
        mutation: impl FnOnce(&mut Snapshot) -> Result<Option<T>, StoreError>,
    ) -> Result<Option<T>, StoreError> {
        let file = self.file.write().await;
        let mut snapshot = file.load().await?;
        let Some(result) = mutation(&mut snapshot)? else {
            return Ok(None);
        };
        file.save(&snapshot).await?;
        Ok(Some(result))
    }

    // ========== Queries ==========

    /// All users in creation order.
    ///
    /// # Errors
    ///
    /// Fails only if the snapshot cannot be loaded.
    pub async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.read(queries::list_users).await
    }

    /// Every post, newest first, enriched for `viewer` (may be empty).
    ///
    /// # Errors
    ///
    /// Fails only if the snapshot cannot be loaded.
    pub async fn list_posts(&self, viewer: &str) -> Result<Vec<PostView>, StoreError> {
        self.read(|s| queries::list_posts(s, viewer)).await
    }

    /// Posts by `username` and the users they follow, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Snapshot`] if the snapshot cannot be loaded.
    pub async fn feed(&self, username: &str) -> Result<Vec<PostView>, StoreError> {
        self.read(|s| queries::feed(s, username)).await
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Snapshot`] if the snapshot cannot be loaded.
    pub async fn saved_posts(&self, username: &str) -> Result<Vec<PostView>, StoreError> {
        self.read(|s| queries::saved_posts(s, username)).await
    }

    /// Posts ranked by likes, filtered by free text and hashtag.
    ///
    /// # Errors
    ///
    /// Fails only if the snapshot cannot be loaded.
    pub async fn explore(
        &self,
        query: &str,
        tag: &str,
        viewer: &str,
    ) -> Result<Vec<PostView>, StoreError> {
        self.read(|s| queries::explore(s, query, tag, viewer)).await
    }

    /// # Errors
    ///
    /// Fails only if the snapshot cannot be loaded.
    pub async fn stories(&self, username: &str) -> Result<Vec<StoryUser>, StoreError> {
        self.read(|s| queries::stories(s, username)).await
    }

    /// The most recent notifications addressed to `username`.
    ///
    /// # Errors
    ///
    /// Fails only if the snapshot cannot be loaded.
    pub async fn notifications(&self, username: &str) -> Result<Vec<Notification>, StoreError> {
        self.read(|s| queries::notifications_for(s, username)).await
    }

    // ========== Mutations ==========

    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateUsername`] if the name is taken, or a
    /// snapshot error if loading or saving fails.
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let user = self.write(|s| queries::create_user(s, new_user)).await?;
        info!(username = %user.username, "User created");
        Ok(user)
    }

    /// Follow `following`, or unfollow if already following.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SelfFollow`] when both names match,
    /// [`StoreError::UnknownUser`] when either user does not exist, or a
    /// snapshot error.
    pub async fn follow_user(
        &self,
        follower: &str,
        following: &str,
    ) -> Result<FollowState, StoreError> {
        let state = self
            .write(|s| queries::follow_user(s, follower, following, Utc::now()))
            .await?;
        info!(follower, following, now_following = state.following, "Follow toggled");
        Ok(state)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::UnknownUser`] if the author does not exist, or a
    /// snapshot error.
    pub async fn create_post(&self, new_post: NewPost) -> Result<PostView, StoreError> {
        let view = self
            .write(|s| queries::create_post(s, new_post, Utc::now()))
            .await?;
        info!(post_id = view.post.id, username = %view.post.username, tags = ?view.post.tags, "Post created");
        Ok(view)
    }

    /// Like or unlike a post. `Ok(None)` if the post does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownUser`] for an unknown `username`, or a
    /// snapshot error.
    pub async fn toggle_like(
        &self,
        post_id: u64,
        username: &str,
    ) -> Result<Option<PostView>, StoreError> {
        let view = self
            .write_if_found(|s| queries::toggle_like(s, post_id, username, Utc::now()))
            .await?;
        match &view {
            Some(v) => info!(post_id, username, liked = v.is_liked_by_viewer, "Like toggled"),
            None => debug!(post_id, "Like on missing post"),
        }
        Ok(view)
    }

    /// Bookmark or unbookmark a post. `Ok(None)` if the post does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownUser`] for an unknown `username`, or a
    /// snapshot error.
    pub async fn toggle_save(
        &self,
        post_id: u64,
        username: &str,
    ) -> Result<Option<SaveState>, StoreError> {
        let state = self
            .write_if_found(|s| queries::toggle_save(s, post_id, username))
            .await?;
        match &state {
            Some(st) => info!(post_id, username, saved = st.saved, "Bookmark toggled"),
            None => debug!(post_id, "Bookmark on missing post"),
        }
        Ok(state)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::UnknownUser`] for an unknown `username`, or a
    /// snapshot error. A missing post is `Ok(None)`.
    pub async fn add_comment(
        &self,
        post_id: u64,
        username: &str,
        text: &str,
    ) -> Result<Option<Comment>, StoreError> {
        let comment = self
            .write_if_found(|s| queries::add_comment(s, post_id, username, text, Utc::now()))
            .await?;
        match &comment {
            Some(c) => info!(post_id, comment_id = c.id, username, "Comment added"),
            None => debug!(post_id, "Comment on missing post"),
        }
        Ok(comment)
    }
}
