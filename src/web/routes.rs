use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use super::error::{not_found, ApiError};
use super::payload::{
    CommentRequest, CreatePostRequest, CreateUserRequest, FollowRequest, Payload,
    UserActionRequest,
};
use super::AppState;

type ApiResult = Result<Response, ApiError>;

/// Routes mounted under `/api`. Unknown paths and methods answer 404.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user).fallback(not_found))
        .route("/follow", post(follow_user).fallback(not_found))
        .route("/posts", get(list_posts).post(create_post).fallback(not_found))
        .route("/posts/:id/like", post(toggle_like).fallback(not_found))
        .route("/posts/:id/save", post(toggle_save).fallback(not_found))
        .route("/posts/:id/comments", post(add_comment).fallback(not_found))
        .route("/feed/:username", get(feed).fallback(not_found))
        .route("/saved/:username", get(saved).fallback(not_found))
        .route("/explore", get(explore).fallback(not_found))
        .route("/stories/:username", get(stories).fallback(not_found))
        .route("/notifications/:username", get(notifications).fallback(not_found))
        .fallback(not_found)
}

/// Parse the `:id` segment. Anything that is not a post id cannot name a post.
fn post_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse().map_err(|_| ApiError::post_not_found())
}

// ========== Queries ==========

#[derive(Debug, Deserialize)]
pub struct ViewerParams {
    #[serde(default)]
    viewer: String,
}

#[derive(Debug, Deserialize)]
pub struct ExploreParams {
    #[serde(default)]
    q: String,
    #[serde(default)]
    tag: String,
    #[serde(default)]
    viewer: String,
}

async fn list_users(State(state): State<AppState>) -> ApiResult {
    let users = state.store.list_users().await?;
    Ok(Json(users).into_response())
}

async fn list_posts(
    State(state): State<AppState>,
    params: Result<Query<ViewerParams>, QueryRejection>,
) -> ApiResult {
    let Query(params) = params?;
    let posts = state.store.list_posts(params.viewer.trim()).await?;
    Ok(Json(posts).into_response())
}

async fn feed(
    State(state): State<AppState>,
    username: Result<Path<String>, PathRejection>,
) -> ApiResult {
    let Path(username) = username?;
    let posts = state.store.feed(&username).await?;
    Ok(Json(posts).into_response())
}

async fn saved(
    State(state): State<AppState>,
    username: Result<Path<String>, PathRejection>,
) -> ApiResult {
    let Path(username) = username?;
    let posts = state.store.saved_posts(&username).await?;
    Ok(Json(posts).into_response())
}

async fn explore(
    State(state): State<AppState>,
    params: Result<Query<ExploreParams>, QueryRejection>,
) -> ApiResult {
    let Query(params) = params?;
    let posts = state
        .store
        .explore(&params.q, &params.tag, params.viewer.trim())
        .await?;
    Ok(Json(posts).into_response())
}

async fn stories(
    State(state): State<AppState>,
    username: Result<Path<String>, PathRejection>,
) -> ApiResult {
    let Path(username) = username?;
    let users = state.store.stories(&username).await?;
    Ok(Json(users).into_response())
}

async fn notifications(
    State(state): State<AppState>,
    username: Result<Path<String>, PathRejection>,
) -> ApiResult {
    let Path(username) = username?;
    let list = state.store.notifications(&username).await?;
    Ok(Json(list).into_response())
}

// ========== Mutations ==========

async fn create_user(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult {
    let req = CreateUserRequest::try_from(Payload::from_body(body)?)?;
    let user = state.store.create_user(req.into()).await?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

async fn follow_user(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult {
    let req = FollowRequest::try_from(Payload::from_body(body)?)?;
    let result = state
        .store
        .follow_user(&req.follower, &req.following)
        .await?;
    Ok(Json(result).into_response())
}

async fn create_post(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult {
    let req = CreatePostRequest::try_from(Payload::from_body(body)?)?;
    let post = state.store.create_post(req.into()).await?;
    Ok((StatusCode::CREATED, Json(post)).into_response())
}

async fn toggle_like(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult {
    let Path(id) = id?;
    let id = post_id(&id)?;
    let req = UserActionRequest::try_from(Payload::from_body(body)?)?;
    let post = state
        .store
        .toggle_like(id, &req.username)
        .await?
        .ok_or_else(ApiError::post_not_found)?;
    Ok(Json(post).into_response())
}

async fn toggle_save(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult {
    let Path(id) = id?;
    let id = post_id(&id)?;
    let req = UserActionRequest::try_from(Payload::from_body(body)?)?;
    let result = state
        .store
        .toggle_save(id, &req.username)
        .await?
        .ok_or_else(ApiError::post_not_found)?;
    Ok(Json(result).into_response())
}

async fn add_comment(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult {
    let Path(id) = id?;
    let id = post_id(&id)?;
    let req = CommentRequest::try_from(Payload::from_body(body)?)?;
    let comment = state
        .store
        .add_comment(id, &req.username, &req.text)
        .await?
        .ok_or_else(ApiError::post_not_found)?;
    Ok((StatusCode::CREATED, Json(comment)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_id_parsing() {
        assert_eq!(post_id("12").unwrap(), 12);
        assert!(matches!(post_id("abc"), Err(ApiError::NotFound(_))));
        assert!(matches!(post_id("-1"), Err(ApiError::NotFound(_))));
    }
}
