//! Controller behaviour observed through its public API.

use crate::common::{observed_controller, pong_document, setup};
use arena_replay::telemetry::ViolationKind;
use arena_replay::{LoadStatus, MatchId, PlaybackState, ReplayDocument, ReplayError};
use web_time::Duration;

// ============================================================================
// Loading
// ============================================================================

#[test]
fn load_rewinds_pauses_and_exposes_first_frame() {
    let (scheduler, controller) = setup();
    controller.load(pong_document(100));

    assert_eq!(controller.current_index(), 0);
    assert_eq!(controller.state(), PlaybackState::Paused);
    assert_eq!(controller.current_frame(), Some(crate::common::pong_frame(0)));
    assert_eq!(scheduler.active_timers(), 0);
    assert_eq!(controller.load_status(), LoadStatus::Loaded { match_id: None });
}

#[test]
fn empty_document_plays_nothing() {
    let (scheduler, controller) = setup();
    controller.load(ReplayDocument::default());

    assert_eq!(controller.state(), PlaybackState::Empty);
    controller.play();
    controller.seek(5);
    assert_eq!(scheduler.active_timers(), 0);
    assert_eq!(controller.current_index(), 0);
    assert_eq!(controller.current_frame(), None);
}

#[test]
fn load_while_playing_cancels_old_timer() {
    let (scheduler, controller) = setup();
    controller.load(pong_document(100));
    controller.play();
    scheduler.advance(Duration::from_millis(500));
    let advanced = controller.current_index();
    assert!(advanced > 0);

    controller.load(pong_document(10));
    assert_eq!(scheduler.active_timers(), 0);
    scheduler.advance(Duration::from_secs(1));
    assert_eq!(controller.current_index(), 0);
}

#[test]
fn metadata_is_available_after_load() {
    let (_scheduler, controller) = setup();
    assert_eq!(controller.metadata(), None);
    controller.load(pong_document(60));
    let metadata = controller.metadata().unwrap();
    assert_eq!(metadata.duration_seconds, Some(2.0));
    assert_eq!(metadata.summary().as_deref(), Some("2s"));
}

// ============================================================================
// Timed playback
// ============================================================================

#[test]
fn one_second_advances_thirty_frames_at_normal_speed() {
    let (scheduler, controller) = setup();
    controller.load(pong_document(100));
    controller.play();

    scheduler.advance(Duration::from_secs(1));
    assert_eq!(controller.current_index(), 30);
    assert!(controller.is_playing());
}

#[test]
fn double_speed_advances_twice_as_fast() {
    let (scheduler, controller) = setup();
    controller.load(pong_document(100));
    controller.set_speed(2.0).unwrap();
    controller.play();

    scheduler.advance(Duration::from_secs(1));
    assert_eq!(controller.current_index(), 60);
}

#[test]
fn half_speed_advances_half_as_fast() {
    let (scheduler, controller) = setup();
    controller.load(pong_document(100));
    controller.play();
    controller.set_speed(0.5).unwrap();

    scheduler.advance(Duration::from_secs(2));
    assert_eq!(controller.current_index(), 30);
}

#[test]
fn playback_stops_on_last_frame() {
    let (scheduler, controller) = setup();
    controller.load(pong_document(10));
    controller.play();

    scheduler.advance(Duration::from_secs(5));
    assert_eq!(controller.current_index(), 9);
    assert_eq!(controller.state(), PlaybackState::Paused);
    assert!(controller.is_at_end());
    assert_eq!(scheduler.active_timers(), 0);
}

#[test]
fn pause_freezes_position() {
    let (scheduler, controller) = setup();
    controller.load(pong_document(100));
    controller.play();
    scheduler.advance(Duration::from_millis(340));
    controller.pause();
    let frozen = controller.current_index();

    scheduler.advance(Duration::from_secs(3));
    assert_eq!(controller.current_index(), frozen);
    controller.pause();
    assert_eq!(controller.state(), PlaybackState::Paused);
}

#[test]
fn play_twice_keeps_one_timer() {
    let (scheduler, controller) = setup();
    controller.load(pong_document(100));
    controller.play();
    controller.play();
    assert_eq!(scheduler.active_timers(), 1);

    scheduler.advance(Duration::from_secs(1));
    assert_eq!(controller.current_index(), 30);
}

#[test]
fn seek_while_playing_continues_from_target() {
    let (scheduler, controller) = setup();
    controller.load(pong_document(100));
    controller.play();
    controller.seek(50);
    scheduler.tick_all();
    assert_eq!(controller.current_index(), 51);
    assert!(controller.is_playing());
}

#[test]
fn seek_clamps_out_of_range_targets() {
    let (_scheduler, controller) = setup();
    controller.load(pong_document(20));

    controller.seek(-1);
    assert_eq!(controller.current_index(), 0);
    assert!(controller.is_at_start());
    controller.seek(i64::MAX);
    assert_eq!(controller.current_index(), 19);
    controller.seek(i64::MIN);
    assert_eq!(controller.current_index(), 0);
}

#[test]
fn speed_change_mid_playback_keeps_playing() {
    let (scheduler, controller) = setup();
    controller.load(pong_document(200));
    controller.play();
    scheduler.advance(Duration::from_secs(1));
    controller.set_speed(2.0).unwrap();

    assert!(controller.is_playing());
    assert_eq!(scheduler.active_timers(), 1);
    scheduler.advance(Duration::from_secs(1));
    assert_eq!(controller.current_index(), 90);
}

#[test]
fn rejected_speed_keeps_everything() {
    let (scheduler, controller) = setup();
    controller.load(pong_document(100));
    controller.play();
    let snapshot = controller.snapshot();

    let err = controller.set_speed(1.5).unwrap_err();
    assert!(matches!(err, ReplayError::InvalidSpeed { .. }));
    assert_eq!(controller.snapshot(), snapshot);
    assert_eq!(scheduler.active_timers(), 1);
}

// ============================================================================
// Snapshots and tickets
// ============================================================================

#[test]
fn snapshot_reflects_state() {
    let (scheduler, controller) = setup();
    controller.load(pong_document(40));
    controller.play();
    scheduler.tick_all();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.state, PlaybackState::Playing);
    assert_eq!(snapshot.current_index, 1);
    assert_eq!(snapshot.total_frames, 40);
    assert_eq!(snapshot.speed, 1.0);
    assert_eq!(snapshot.revision, controller.revision());
}

#[test]
fn clones_share_playback() {
    let (scheduler, controller) = setup();
    let remote = controller.clone();
    controller.load(pong_document(10));
    remote.play();
    scheduler.tick_all();
    assert_eq!(controller.current_index(), 1);
    assert_eq!(remote.state(), controller.state());
}

#[test]
fn superseded_load_is_reported_once() {
    let (_scheduler, controller, observer) = observed_controller();
    let old = controller.begin_load(MatchId::new("old").unwrap());
    let new = controller.begin_load(MatchId::new("new").unwrap());

    controller.complete_load(new, Ok(pong_document(5))).unwrap();
    let err = controller.complete_load(old, Ok(pong_document(50))).unwrap_err();

    assert!(matches!(err, ReplayError::StaleLoad { .. }));
    assert_eq!(controller.total_frames(), 5);
    assert_eq!(observer.violations_of_kind(ViolationKind::Playback).len(), 1);
}
