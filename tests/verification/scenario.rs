//! Long-form playback walkthrough over a 300-frame replay.

use crate::common::{pong_document, setup};
use arena_replay::PlaybackState;
use web_time::Duration;

#[test]
fn three_hundred_frame_walkthrough() {
    let (scheduler, controller) = setup();
    controller.load(pong_document(300));
    assert_eq!(controller.total_frames(), 300);
    assert_eq!(controller.current_index(), 0);

    controller.play();
    for _ in 0..300 {
        scheduler.tick_all();
    }
    assert_eq!(controller.current_index(), 299);
    assert_eq!(controller.state(), PlaybackState::Paused);
    assert!(controller.is_at_end());

    controller.seek(50);
    assert_eq!(controller.current_index(), 50);
    assert_eq!(controller.state(), PlaybackState::Paused);

    controller.play();
    let base_period = controller.tick_period();
    assert!(controller.is_playing());
    controller.set_speed(2.0).unwrap();
    assert!(controller.is_playing());
    assert_eq!(controller.current_index(), 50);

    let ids = scheduler.timer_ids();
    assert_eq!(ids.len(), 1);
    let fast_period = scheduler.period_of(ids[0]).unwrap();
    assert!((base_period / 2).abs_diff(fast_period) <= Duration::from_nanos(1));

    scheduler.tick_all();
    assert_eq!(controller.current_index(), 51);
    assert!(controller.is_playing());
}

#[test]
fn walkthrough_on_the_clock() {
    let (scheduler, controller) = setup();
    controller.load(pong_document(300));
    controller.play();

    scheduler.advance(Duration::from_secs(10));
    assert_eq!(controller.current_index(), 299);
    assert!(!controller.is_playing());

    controller.seek(50);
    controller.play();
    controller.set_speed(2.0).unwrap();
    scheduler.advance(Duration::from_secs(1));
    assert_eq!(controller.current_index(), 110);
    assert!(controller.is_playing());
}

#[test]
fn pause_twice_equals_pause_once() {
    let (scheduler, controller) = setup();
    controller.load(pong_document(300));
    controller.play();
    scheduler.tick_all();

    controller.pause();
    let once = controller.snapshot();
    controller.pause();
    assert_eq!(controller.snapshot(), once);
    assert_eq!(scheduler.active_timers(), 0);
}
