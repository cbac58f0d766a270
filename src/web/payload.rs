//! Request body parsing and typed request validation.
//!
//! Bodies are parsed into a JSON object first and then into per-endpoint request
//! structs, so a missing field is reported as a validation error rather than a
//! deserialization failure.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use serde_json::{Map, Value};

use super::error::ApiError;
use crate::db::{NewPost, NewUser};

/// A parsed JSON object body.
#[derive(Debug, Default)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// Parse a request body. An empty body is treated as `{}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PayloadTooLarge`] when the body limit was hit and
    /// [`ApiError::MalformedInput`] when the body is not a JSON object.
    pub fn from_body(body: Result<Bytes, BytesRejection>) -> Result<Self, ApiError> {
        let bytes = body.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::PayloadTooLarge
            } else {
                ApiError::invalid_json()
            }
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        match serde_json::from_slice(&bytes) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            _ => Err(ApiError::invalid_json()),
        }
    }

    /// A trimmed, non-empty string field. Numbers are accepted and stringified.
    fn text(&self, field: &str) -> Option<String> {
        let value = match self.0.get(field)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!value.is_empty()).then_some(value)
    }
}

/// `POST /api/users`
#[derive(Debug)]
pub struct CreateUserRequest {
    pub username: String,
    pub name: String,
    pub avatar_url: String,
    pub bio: String,
}

impl TryFrom<Payload> for CreateUserRequest {
    type Error = ApiError;

    fn try_from(payload: Payload) -> Result<Self, Self::Error> {
        match (
            payload.text("username"),
            payload.text("name"),
            payload.text("avatarUrl"),
        ) {
            (Some(username), Some(name), Some(avatar_url)) => Ok(Self {
                username,
                name,
                avatar_url,
                bio: payload.text("bio").unwrap_or_default(),
            }),
            _ => Err(ApiError::Validation(
                "username, name and avatarUrl are required".to_string(),
            )),
        }
    }
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            username: req.username,
            name: req.name,
            avatar_url: req.avatar_url,
            bio: req.bio,
        }
    }
}

/// `POST /api/follow`
#[derive(Debug)]
pub struct FollowRequest {
    pub follower: String,
    pub following: String,
}

impl TryFrom<Payload> for FollowRequest {
    type Error = ApiError;

    fn try_from(payload: Payload) -> Result<Self, Self::Error> {
        match (payload.text("follower"), payload.text("following")) {
            (Some(follower), Some(following)) => Ok(Self {
                follower,
                following,
            }),
            _ => Err(ApiError::Validation(
                "follower and following are required".to_string(),
            )),
        }
    }
}

/// `POST /api/posts`
#[derive(Debug)]
pub struct CreatePostRequest {
    pub username: String,
    pub image_url: String,
    pub caption: String,
}

impl TryFrom<Payload> for CreatePostRequest {
    type Error = ApiError;

    fn try_from(payload: Payload) -> Result<Self, Self::Error> {
        match (
            payload.text("username"),
            payload.text("imageUrl"),
            payload.text("caption"),
        ) {
            (Some(username), Some(image_url), Some(caption)) => Ok(Self {
                username,
                image_url,
                caption,
            }),
            _ => Err(ApiError::Validation(
                "username, imageUrl and caption are required".to_string(),
            )),
        }
    }
}

impl From<CreatePostRequest> for NewPost {
    fn from(req: CreatePostRequest) -> Self {
        Self {
            username: req.username,
            image_url: req.image_url,
            caption: req.caption,
        }
    }
}

/// `POST /api/posts/:id/like` and `POST /api/posts/:id/save`
#[derive(Debug)]
pub struct UserActionRequest {
    pub username: String,
}

impl TryFrom<Payload> for UserActionRequest {
    type Error = ApiError;

    fn try_from(payload: Payload) -> Result<Self, Self::Error> {
        payload
            .text("username")
            .map(|username| Self { username })
            .ok_or_else(|| ApiError::Validation("username is required".to_string()))
    }
}

/// `POST /api/posts/:id/comments`
#[derive(Debug)]
pub struct CommentRequest {
    pub username: String,
    pub text: String,
}

impl TryFrom<Payload> for CommentRequest {
    type Error = ApiError;

    fn try_from(payload: Payload) -> Result<Self, Self::Error> {
        match (payload.text("username"), payload.text("text")) {
            (Some(username), Some(text)) => Ok(Self { username, text }),
            _ => Err(ApiError::Validation(
                "username and text are required".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> Result<Payload, ApiError> {
        Payload::from_body(Ok(Bytes::from(json.to_string())))
    }

    #[test]
    fn test_empty_body_is_empty_object() {
        let p = payload("").unwrap();
        assert!(p.0.is_empty());
        assert!(matches!(
            UserActionRequest::try_from(p),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(payload("{oops"), Err(ApiError::MalformedInput(_))));
        assert!(matches!(payload("[1, 2]"), Err(ApiError::MalformedInput(_))));
    }

    #[test]
    fn test_fields_are_trimmed_and_required() {
        let req = CreatePostRequest::try_from(
            payload(r#"{"username": " alex ", "imageUrl": "x.jpg", "caption": "hi #yo"}"#)
                .unwrap(),
        )
        .unwrap();
        assert_eq!(req.username, "alex");

        let missing = CreatePostRequest::try_from(
            payload(r#"{"username": "alex", "imageUrl": "   ", "caption": "hi"}"#).unwrap(),
        );
        assert!(matches!(missing, Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_bio_is_optional() {
        let req = CreateUserRequest::try_from(
            payload(r#"{"username": "sam", "name": "Sam", "avatarUrl": "a.png"}"#).unwrap(),
        )
        .unwrap();
        assert_eq!(req.bio, "");
    }

    #[test]
    fn test_numbers_are_stringified() {
        let req = CommentRequest::try_from(
            payload(r#"{"username": "alex", "text": 42}"#).unwrap(),
        )
        .unwrap();
        assert_eq!(req.text, "42");
    }
}
