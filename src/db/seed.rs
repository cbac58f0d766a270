//! Deterministic starter content written on first launch.

use chrono::{DateTime, Utc};

use super::models::{Bookmark, Comment, Follow, Post, Snapshot, User};
use crate::hashtags::extract_tags;

struct SeedUser {
    username: &'static str,
    name: &'static str,
    avatar_url: &'static str,
    bio: &'static str,
}

struct SeedPost {
    username: &'static str,
    image_url: &'static str,
    caption: &'static str,
    liked_by: &'static [&'static str],
}

const USERS: &[SeedUser] = &[
    SeedUser {
        username: "travelwithmia",
        name: "Mia Torres",
        avatar_url: "https://images.unsplash.com/photo-1494790108377-be9c29b29330?w=120&h=120&fit=crop",
        bio: "Chasing sunsets and trailheads",
    },
    SeedUser {
        username: "codebyalex",
        name: "Alex Kim",
        avatar_url: "https://images.unsplash.com/photo-1500648767791-00dcc994a43e?w=120&h=120&fit=crop",
        bio: "Building things for the web",
    },
    SeedUser {
        username: "foodie_sam",
        name: "Sam Patel",
        avatar_url: "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=120&h=120&fit=crop",
        bio: "Eating my way around the city",
    },
];

const POSTS: &[SeedPost] = &[
    SeedPost {
        username: "travelwithmia",
        image_url: "https://images.unsplash.com/photo-1476514525535-07fb3b4ae5f1?w=1080",
        caption: "Golden hour and mountain air #travel #mountains",
        liked_by: &["codebyalex"],
    },
    SeedPost {
        username: "codebyalex",
        image_url: "https://images.unsplash.com/photo-1518770660439-4636190af475?w=1080",
        caption: "Shipping features from the coffee bar #coding #coffee",
        liked_by: &["travelwithmia"],
    },
    SeedPost {
        username: "foodie_sam",
        image_url: "https://images.unsplash.com/photo-1504674900247-0877df9cc836?w=1080",
        caption: "Sunday brunch done right #food #brunch",
        liked_by: &["travelwithmia", "codebyalex"],
    },
];

/// (post id, author, text)
const COMMENTS: &[(u64, &str, &str)] = &[
    (1, "codebyalex", "Love this vibe!"),
    (2, "travelwithmia", "Great setup"),
    (3, "codebyalex", "Need that recipe"),
];

/// (follower, following)
const FOLLOWS: &[(&str, &str)] = &[
    ("codebyalex", "travelwithmia"),
    ("travelwithmia", "codebyalex"),
];

/// (username, post id)
const BOOKMARKS: &[(&str, u64)] = &[("codebyalex", 1), ("travelwithmia", 3)];

/// Build the snapshot used when no data file exists yet.
#[must_use]
pub fn seed_snapshot(now: DateTime<Utc>) -> Snapshot {
    let users = USERS
        .iter()
        .map(|u| User {
            username: u.username.to_string(),
            name: u.name.to_string(),
            avatar_url: u.avatar_url.to_string(),
            bio: u.bio.to_string(),
        })
        .collect();

    let posts: Vec<Post> = POSTS
        .iter()
        .zip(1..)
        .map(|(p, id)| Post {
            id,
            username: p.username.to_string(),
            image_url: p.image_url.to_string(),
            caption: p.caption.to_string(),
            tags: extract_tags(p.caption),
            likes: p.liked_by.len(),
            liked_by: p.liked_by.iter().map(ToString::to_string).collect(),
            created_at: now,
        })
        .collect();

    let comments: Vec<Comment> = COMMENTS
        .iter()
        .zip(1..)
        .map(|(&(post_id, username, text), id)| Comment {
            id,
            post_id,
            username: username.to_string(),
            text: text.to_string(),
            created_at: now,
        })
        .collect();

    Snapshot {
        next_post_id: posts.len() as u64 + 1,
        next_comment_id: comments.len() as u64 + 1,
        next_notification_id: 1,
        users,
        posts,
        comments,
        follows: FOLLOWS
            .iter()
            .map(|&(follower, following)| Follow {
                follower: follower.to_string(),
                following: following.to_string(),
            })
            .collect(),
        bookmarks: BOOKMARKS
            .iter()
            .map(|&(username, post_id)| Bookmark {
                username: username.to_string(),
                post_id,
            })
            .collect(),
        notifications: Vec::new(),
    }
}
