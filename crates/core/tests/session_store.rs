mod common;

use common::subtitles;
use videosum_core::{
    AudioType, MediaKind, Session, SessionStore, Transcript, VideosumError,
    types::{Article, ArticleType},
};

fn session(id: &str, updated_at: u64) -> Session {
    let mut session = Session::from_submission(
        &format!("https://host/{id}.mp3"),
        MediaKind::Audio(AudioType::Mpeg),
        None,
        Transcript {
            id: Some(id.to_string()),
            title: None,
            cover: None,
            subtitles: subtitles(&[0.0, 3.0]),
        },
        "en",
    );
    session.updated_at = updated_at;
    session
}

#[tokio::test]
async fn save_get_list_remove() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("sessions"));

    assert!(store.list().await.unwrap().is_empty());

    store.save(&session("old", 100)).await.unwrap();
    store.save(&session("new", 300)).await.unwrap();
    store.save(&session("mid", 200)).await.unwrap();

    let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["new", "mid", "old"]);

    let mut old = store.get("old").await.unwrap();
    assert_eq!(old.title, "old.mp3");
    old.brief = Some("# brief".into());
    old.set_article(
        ArticleType::Podcast,
        Article {
            merged_content: "episode".into(),
            ..Article::default()
        },
    );
    store.save(&old).await.unwrap();

    let listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].id, "old");
    let reloaded = store.get("old").await.unwrap();
    assert_eq!(reloaded, old);
    assert_eq!(reloaded.articles[&ArticleType::Podcast].merged_content, "episode");

    store.remove("mid").await.unwrap();
    assert!(matches!(
        store.remove("mid").await,
        Err(VideosumError::SessionNotFound { .. })
    ));
    assert!(matches!(
        store.get("mid").await,
        Err(VideosumError::SessionNotFound { .. })
    ));
    assert_eq!(store.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn unreadable_files_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path());
    store.save(&session("good", 1)).await.unwrap();
    tokio::fs::write(dir.path().join("broken.json"), b"{not json").await.unwrap();
    tokio::fs::write(dir.path().join("notes.txt"), b"ignored").await.unwrap();

    let listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "good");
}

#[tokio::test]
async fn resubmitted_sessions_keep_generated_content() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path());

    let first = store.resume(session("t-1", 1)).await.unwrap();
    assert_eq!(first.updated_at, 1);

    let mut stored = first.clone();
    stored.brief = Some("# brief".into());
    stored.language = "en".into();
    store.save(&stored).await.unwrap();

    let mut again = session("t-1", 1);
    again.language = "fr".into();
    again.real_video_url = Some("https://host/new.mp3".into());
    let resumed = store.resume(again).await.unwrap();
    assert_eq!(resumed.brief.as_deref(), Some("# brief"));
    assert_eq!(resumed.language, "fr");
    assert_eq!(resumed.real_video_url.as_deref(), Some("https://host/new.mp3"));
    assert!(resumed.updated_at > 1);
}

#[tokio::test]
async fn unparseable_sessions_are_not_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path());
    let body = br#"{"id":"t-1","articles":{"mindmap":{}}}"#;
    tokio::fs::write(store.path_for("t-1"), body).await.unwrap();

    let result = store.resume(session("t-1", 1)).await;
    assert!(matches!(result, Err(VideosumError::JsonError(_))), "{result:?}");
    assert_eq!(tokio::fs::read(store.path_for("t-1")).await.unwrap(), body);
}

#[tokio::test]
async fn ids_that_sanitize_alike_stay_apart() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path());
    store.save(&session("a/b", 1)).await.unwrap();
    store.save(&session("a_b", 2)).await.unwrap();

    assert_eq!(store.get("a/b").await.unwrap().id, "a/b");
    assert_eq!(store.get("a_b").await.unwrap().id, "a_b");
    assert_eq!(store.list().await.unwrap().len(), 2);
}
