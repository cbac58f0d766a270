//! picfeed library.
//!
//! A photo-sharing service: users publish captioned images, follow each other,
//! like, bookmark and comment on posts, and receive notifications. All state
//! lives in a single JSON snapshot managed by [`db::Store`]; [`web`] exposes it
//! as a JSON API alongside the static client.

pub mod config;
pub mod constants;
pub mod db;
pub mod fs_utils;
pub mod hashtags;
pub mod web;
