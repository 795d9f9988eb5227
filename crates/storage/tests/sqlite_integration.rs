use exam_core::model::{
    ChoiceLetter, FontSize, Question, SectionId, SessionSnapshot, Settings, Theme,
};
use exam_core::time::fixed_now;
use storage::repository::{KeyValueStore, SettingsRepository, SnapshotRepository, Storage};
use storage::sqlite::SqliteRepository;

fn snapshot() -> SessionSnapshot {
    let section = SectionId::new("HPGE");
    let a = ChoiceLetter::from_index(0).unwrap();
    let b = ChoiceLetter::from_index(1).unwrap();
    let mut snapshot = SessionSnapshot {
        exam_questions: vec![
            Question::new(section.clone(), "Situation 1", vec!["x".into(), "y".into()], b)
                .with_group("g1"),
            Question::new(section.clone(), "Q2", vec!["x".into(), "y".into()], a).with_group("g1"),
        ]
        .into(),
        ..SessionSnapshot::default()
    };
    snapshot.answers.set(&section, 1, a);
    snapshot.bookmarks.toggle(&section, 0, fixed_now());
    snapshot
}

#[tokio::test]
async fn sqlite_persists_settings_and_snapshot() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert!(repo.get_settings().await.unwrap().is_none());
    let settings = Settings {
        theme: Theme::Dark,
        font_size: FontSize::Large,
        ..Settings::default()
    };
    repo.save_settings(&settings).await.unwrap();
    assert_eq!(repo.get_settings().await.unwrap(), Some(settings));

    let saved = snapshot();
    repo.save_snapshot(&saved).await.unwrap();
    let loaded = repo.load_snapshot().await.unwrap().expect("snapshot");
    assert_eq!(loaded, saved);

    repo.clear_snapshot().await.unwrap();
    assert!(repo.load_snapshot().await.unwrap().is_none());
    // settings survive a snapshot clear
    assert!(repo.get_settings().await.unwrap().is_some());
}

#[tokio::test]
async fn sqlite_put_replaces_existing_value() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_upsert?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.put("k", "one".into()).await.unwrap();
    repo.put("k", "two".into()).await.unwrap();
    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("two"));
    repo.remove("k").await.unwrap();
    repo.remove("k").await.unwrap();
    assert!(repo.get("k").await.unwrap().is_none());
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn storage_sqlite_wires_both_repositories() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage.settings.save_settings(&Settings::default()).await.unwrap();
    storage.snapshots.save_snapshot(&snapshot()).await.unwrap();
    assert!(storage.snapshots.load_snapshot().await.unwrap().unwrap().is_restorable());
    assert_eq!(
        storage.settings.get_settings().await.unwrap(),
        Some(Settings::default())
    );
}
