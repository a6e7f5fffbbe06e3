//! Loading replays into a controller through the bundled loaders.

use crate::common::{observed_controller, pong_document, setup, SAMPLE_REPLAY_JSON};
use arena_replay::telemetry::ViolationKind;
use arena_replay::{
    DirectoryLoader, FinalScore, InMemoryLoader, LoadFailureKind, LoadStatus, MatchId,
    PlaybackState, ReplayError, ReplayLoader,
};
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "arena-replay-it-{}-{}",
        name,
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn loads_sample_replay_from_directory() {
    let dir = scratch_dir("sample");
    std::fs::write(dir.join("match_1.json"), SAMPLE_REPLAY_JSON).unwrap();
    let loader = DirectoryLoader::new(&dir);
    let (_scheduler, controller) = setup();
    let id = MatchId::new("match_1").unwrap();

    controller.load_from(&loader, &id).unwrap();

    assert_eq!(controller.total_frames(), 3);
    assert_eq!(controller.state(), PlaybackState::Paused);
    assert_eq!(
        controller.load_status(),
        LoadStatus::Loaded {
            match_id: Some(id)
        }
    );
    let metadata = controller.metadata().unwrap();
    assert_eq!(metadata.final_score, Some(FinalScore::Text("1-0".to_owned())));
    assert_eq!(metadata.timestamp.as_deref(), Some("2024-05-01T12:00:00Z"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_file_is_not_found_and_keeps_document() {
    let dir = scratch_dir("missing");
    let loader = DirectoryLoader::new(&dir);
    let (_scheduler, controller, observer) = observed_controller();
    controller.load(pong_document(8));

    let err = controller
        .load_from(&loader, &MatchId::new("nope").unwrap())
        .unwrap_err();

    assert_eq!(err.load_failure_kind(), Some(LoadFailureKind::NotFound));
    assert_eq!(controller.total_frames(), 8);
    assert_eq!(controller.load_status().error(), Some(&err));
    assert_eq!(observer.violations_of_kind(ViolationKind::Loading).len(), 1);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn malformed_json_is_decode_failure() {
    let loader = InMemoryLoader::new();
    let id = MatchId::new("broken").unwrap();
    loader.insert_json(id.clone(), "{\"frames\": [");
    let (_scheduler, controller) = setup();

    let err = controller.load_from(&loader, &id).unwrap_err();
    assert_eq!(err.load_failure_kind(), Some(LoadFailureKind::Decode));
    assert_eq!(controller.state(), PlaybackState::Empty);
}

#[test]
fn in_memory_loader_through_trait_object() {
    let loader: Box<dyn ReplayLoader> = Box::new({
        let loader = InMemoryLoader::new();
        loader.insert(MatchId::new("a").unwrap(), pong_document(12));
        loader
    });
    let (_scheduler, controller) = setup();
    controller
        .load_from(loader.as_ref(), &MatchId::new("a").unwrap())
        .unwrap();
    assert_eq!(controller.total_frames(), 12);
}

#[test]
fn scripted_timeout_is_reported() {
    let loader = InMemoryLoader::new();
    let id = MatchId::new("slow").unwrap();
    loader.fail_with(id.clone(), LoadFailureKind::Timeout);
    let (_scheduler, controller) = setup();

    let err = controller.load_from(&loader, &id).unwrap_err();
    assert!(matches!(
        err,
        ReplayError::LoadFailure {
            kind: LoadFailureKind::Timeout,
            ..
        }
    ));
    assert!(matches!(controller.load_status(), LoadStatus::Failed { .. }));
}

#[test]
fn retry_after_failure_succeeds() {
    let loader = InMemoryLoader::new();
    let id = MatchId::new("flaky").unwrap();
    loader.fail_with(id.clone(), LoadFailureKind::Network);
    let (_scheduler, controller) = setup();
    assert!(controller.load_from(&loader, &id).is_err());

    loader.insert(id.clone(), pong_document(4));
    controller.load_from(&loader, &id).unwrap();
    assert_eq!(controller.total_frames(), 4);
    assert!(controller.load_status().error().is_none());
}

#[test]
fn match_ids_that_escape_the_directory_are_rejected() {
    for bad in ["", "  ", "../secret", "a/b", "a\\b"] {
        assert!(
            matches!(MatchId::new(bad), Err(ReplayError::InvalidRequest { .. })),
            "{:?} should be rejected",
            bad
        );
    }
}
