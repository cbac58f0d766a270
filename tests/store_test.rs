//! Integration tests for the snapshot-backed store.

use picfeed::db::{NewPost, NewUser, NotificationKind, Store, StoreError};
use tempfile::TempDir;

async fn setup_store() -> (Store, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("data.json");
    let store = Store::open(&path).await.expect("Failed to open store");
    (store, temp_dir)
}

fn read_file(dir: &TempDir) -> String {
    std::fs::read_to_string(dir.path().join("data.json")).expect("Failed to read snapshot")
}

#[tokio::test]
async fn test_seed_scenario() {
    let (store, temp_dir) = setup_store().await;

    assert_eq!(store.list_users().await.unwrap().len(), 3);
    assert_eq!(store.list_posts("").await.unwrap().len(), 3);

    let raw: serde_json::Value = serde_json::from_str(&read_file(&temp_dir)).unwrap();
    assert_eq!(raw["users"].as_array().unwrap().len(), 3);
    assert_eq!(raw["posts"].as_array().unwrap().len(), 3);
    assert_eq!(raw["comments"].as_array().unwrap().len(), 3);
    assert_eq!(raw["follows"].as_array().unwrap().len(), 2);
    assert_eq!(raw["bookmarks"].as_array().unwrap().len(), 2);
    assert_eq!(raw["nextPostId"], 4);
    assert_eq!(raw["nextCommentId"], 4);
}

#[tokio::test]
async fn test_posts_newest_first_with_enrichment() {
    let (store, _temp_dir) = setup_store().await;

    let posts = store.list_posts("codebyalex").await.unwrap();
    let ids: Vec<u64> = posts.iter().map(|p| p.post.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);

    let mia_post = &posts[2];
    assert_eq!(mia_post.name, "Mia Torres");
    assert!(mia_post.is_liked_by_viewer);
    assert!(mia_post.is_saved_by_viewer);
    assert_eq!(mia_post.comments.len(), 1);
    assert!(!mia_post.comments[0].avatar_url.is_empty());

    let anonymous = store.list_posts("").await.unwrap();
    assert!(anonymous
        .iter()
        .all(|p| !p.is_liked_by_viewer && !p.is_saved_by_viewer));
}

#[tokio::test]
async fn test_mutations_persist_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data.json");

    {
        let store = Store::open(&path).await.unwrap();
        store
            .create_post(NewPost {
                username: "foodie_sam".to_string(),
                image_url: "https://img.example.com/tacos.jpg".to_string(),
                caption: "Taco night #Food".to_string(),
            })
            .await
            .unwrap();
        store.add_comment(4, "codebyalex", "Yum").await.unwrap();
    }

    let store = Store::open(&path).await.unwrap();
    let posts = store.list_posts("").await.unwrap();
    assert_eq!(posts[0].post.id, 4);
    assert_eq!(posts[0].post.tags, vec!["food"]);
    assert_eq!(posts[0].comments[0].comment.id, 4);
}

#[tokio::test]
async fn test_toggles_are_symmetric() {
    let (store, _temp_dir) = setup_store().await;

    let before = store.list_posts("foodie_sam").await.unwrap();

    store.toggle_like(2, "foodie_sam").await.unwrap().unwrap();
    store.toggle_like(2, "foodie_sam").await.unwrap().unwrap();
    store.toggle_save(1, "foodie_sam").await.unwrap().unwrap();
    store.toggle_save(1, "foodie_sam").await.unwrap().unwrap();

    let after = store.list_posts("foodie_sam").await.unwrap();
    for (a, b) in before.iter().zip(&after) {
        assert_eq!(a.post.liked_by, b.post.liked_by);
        assert_eq!(a.post.likes, b.post.likes);
        assert_eq!(a.is_saved_by_viewer, b.is_saved_by_viewer);
    }

    let first = store.follow_user("foodie_sam", "codebyalex").await.unwrap();
    let second = store.follow_user("foodie_sam", "codebyalex").await.unwrap();
    assert!(first.following);
    assert!(!second.following);
    assert_eq!(store.stories("foodie_sam").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_mutation_leaves_snapshot_unchanged() {
    let (store, temp_dir) = setup_store().await;
    let before = read_file(&temp_dir);

    let err = store
        .create_post(NewPost {
            username: "nobody".to_string(),
            image_url: "x".to_string(),
            caption: "y".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownUser(_)));

    assert!(matches!(
        store.toggle_like(1, "nobody").await,
        Err(StoreError::UnknownUser(_))
    ));
    assert!(matches!(
        store.follow_user("codebyalex", "codebyalex").await,
        Err(StoreError::SelfFollow)
    ));
    assert!(matches!(
        store
            .create_user(NewUser {
                username: "codebyalex".to_string(),
                name: "Impostor".to_string(),
                avatar_url: String::new(),
                bio: String::new(),
            })
            .await,
        Err(StoreError::DuplicateUsername(_))
    ));
    assert!(store.toggle_like(99, "codebyalex").await.unwrap().is_none());

    assert_eq!(read_file(&temp_dir), before);
}

#[tokio::test]
async fn test_feed_excludes_unfollowed_authors() {
    let (store, _temp_dir) = setup_store().await;

    let feed = store.feed("codebyalex").await.unwrap();
    assert!(!feed.is_empty());
    assert!(feed
        .iter()
        .all(|p| ["codebyalex", "travelwithmia"].contains(&p.post.username.as_str())));

    let sam_feed = store.feed("foodie_sam").await.unwrap();
    assert_eq!(sam_feed.len(), 1);
    assert_eq!(sam_feed[0].post.username, "foodie_sam");
}

#[tokio::test]
async fn test_saved_and_explore() {
    let (store, _temp_dir) = setup_store().await;

    let saved = store.saved_posts("travelwithmia").await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].post.id, 3);
    assert!(saved[0].is_saved_by_viewer);

    let explore = store.explore("", "", "").await.unwrap();
    assert_eq!(explore[0].post.id, 3);

    let coffee = store.explore("", "coffee", "").await.unwrap();
    assert_eq!(coffee.len(), 1);
    assert_eq!(coffee[0].post.username, "codebyalex");

    let by_author = store.explore("MIA", "", "").await.unwrap();
    assert_eq!(by_author.len(), 1);
}

#[tokio::test]
async fn test_notifications_flow() {
    let (store, _temp_dir) = setup_store().await;

    store.follow_user("foodie_sam", "travelwithmia").await.unwrap();
    store.toggle_like(1, "foodie_sam").await.unwrap();
    store.add_comment(1, "foodie_sam", "Wow").await.unwrap();
    store.add_comment(1, "travelwithmia", "Thanks!").await.unwrap();

    let list = store.notifications("travelwithmia").await.unwrap();
    let kinds: Vec<NotificationKind> = list.iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::Comment,
            NotificationKind::Like,
            NotificationKind::Follow
        ]
    );
    assert!(list.iter().all(|n| n.actor == "foodie_sam" && !n.read));
    assert!(store.notifications("foodie_sam").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_likes_are_serialized() {
    let (store, _temp_dir) = setup_store().await;

    for i in 0..10 {
        store
            .create_user(NewUser {
                username: format!("fan{i}"),
                name: format!("Fan {i}"),
                avatar_url: String::new(),
                bio: String::new(),
            })
            .await
            .unwrap();
    }

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.toggle_like(2, &format!("fan{i}")).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let posts = store.list_posts("").await.unwrap();
    let post = posts.iter().find(|p| p.post.id == 2).unwrap();
    assert_eq!(post.post.likes, 11);
    assert_eq!(post.post.liked_by.len(), 11);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reads_reseed_once() {
    let (store, temp_dir) = setup_store().await;
    std::fs::remove_file(temp_dir.path().join("data.json")).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.list_posts("").await })
        })
        .collect();
    let mut seen = Vec::new();
    for handle in handles {
        let posts = handle.await.unwrap().unwrap();
        seen.push(posts.iter().map(|p| p.post.created_at).collect::<Vec<_>>());
    }

    let on_disk: Vec<_> = store
        .list_posts("")
        .await
        .unwrap()
        .iter()
        .map(|p| p.post.created_at)
        .collect();
    assert_eq!(on_disk.len(), 3);
    for timestamps in seen {
        assert_eq!(timestamps, on_disk);
    }
}
