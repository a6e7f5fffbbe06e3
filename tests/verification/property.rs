//! Property-based tests for the playback controller and the renderer.
//!
//! # Invariants Tested
//!
//! - At most one scheduler timer exists, and it exists exactly while playing
//! - The current index is always within the loaded frames
//! - `k` ticks from index `i` land on `min(i + k, n - 1)`
//! - `seek(x)` lands on `clamp(x, 0, n - 1)`
//! - A rejected speed leaves the controller untouched
//! - Rendering never panics, whatever the frame holds

use crate::common::{leaky_controller, pong_document, setup};
use arena_replay::{
    Frame, FrameInfo, FrameRenderer, PlaybackState, RecordingSurface, RenderOutcome,
};
use proptest::prelude::*;
use smallvec::SmallVec;

// ============================================================================
// Strategies
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Play,
    Pause,
    Toggle,
    Seek(i64),
    Tick,
    SetSpeed(f64),
    Reset,
    Reload(usize),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Play),
        2 => Just(Op::Pause),
        2 => Just(Op::Toggle),
        2 => any::<i64>().prop_map(Op::Seek),
        6 => Just(Op::Tick),
        2 => prop_oneof![Just(0.5), Just(1.0), Just(2.0), Just(3.0), Just(-1.0)]
            .prop_map(Op::SetSpeed),
        1 => Just(Op::Reset),
        1 => (0usize..30).prop_map(Op::Reload),
        1 => Just(Op::Clear),
    ]
}

fn values_strategy() -> impl Strategy<Value = Option<SmallVec<[f64; 2]>>> {
    proptest::option::of(
        proptest::collection::vec(
            prop_oneof![4 => 0.0f64..=1.0, 1 => Just(f64::NAN), 1 => any::<f64>()],
            0..4,
        )
        .prop_map(SmallVec::from_vec),
    )
}

fn frame_strategy() -> impl Strategy<Value = Frame> {
    proptest::option::of((
        values_strategy(),
        values_strategy(),
        proptest::option::of(proptest::collection::vec(any::<i64>(), 0..4)),
    ))
    .prop_map(|info| Frame {
        info: info.map(|(ball_pos, paddle_positions, score)| FrameInfo {
            ball_pos,
            paddle_positions,
            score: score.map(SmallVec::from_vec),
        }),
    })
}

// ============================================================================
// Controller properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    })]

    #[test]
    fn at_most_one_timer_under_any_sequence(
        frames in 0usize..30,
        ops in proptest::collection::vec(op_strategy(), 0..60),
    ) {
        let (scheduler, controller) = setup();
        controller.load(pong_document(frames));

        for op in ops {
            match op {
                Op::Play => controller.play(),
                Op::Pause => controller.pause(),
                Op::Toggle => {
                    controller.toggle();
                },
                Op::Seek(index) => controller.seek(index),
                Op::Tick => {
                    scheduler.tick_all();
                },
                Op::SetSpeed(speed) => {
                    let _ = controller.set_speed(speed);
                },
                Op::Reset => controller.reset(),
                Op::Reload(n) => controller.load(pong_document(n)),
                Op::Clear => controller.clear(),
            }

            let snapshot = controller.snapshot();
            prop_assert!(scheduler.active_timers() <= 1);
            prop_assert_eq!(
                scheduler.active_timers() == 1,
                snapshot.state == PlaybackState::Playing
            );
            if snapshot.total_frames == 0 {
                prop_assert_eq!(snapshot.current_index, 0);
                prop_assert_eq!(snapshot.state, PlaybackState::Empty);
            } else {
                prop_assert!(snapshot.current_index < snapshot.total_frames);
            }
            prop_assert!(controller.allowed_speeds().contains(&snapshot.speed));
        }
    }

    #[test]
    fn ticks_advance_to_min_of_target_and_last(
        frames in 1usize..80,
        start in 0usize..80,
        ticks in 0usize..120,
    ) {
        let (scheduler, controller) = setup();
        controller.load(pong_document(frames));
        controller.seek(start as i64);
        let from = controller.current_index();
        controller.play();

        for _ in 0..ticks {
            scheduler.tick_all();
        }

        let last = frames - 1;
        let expected = if ticks == 0 { from } else { (from + ticks).min(last) };
        prop_assert_eq!(controller.current_index(), expected);
        if ticks > 0 && from + ticks >= last {
            prop_assert!(!controller.is_playing());
        }
    }

    #[test]
    fn seek_clamps_any_integer(frames in 1usize..500, target in any::<i64>()) {
        let (_scheduler, controller) = setup();
        controller.load(pong_document(frames));
        controller.seek(target);
        prop_assert_eq!(
            controller.current_index() as i64,
            target.clamp(0, frames as i64 - 1)
        );
    }

    #[test]
    fn rejected_speed_changes_nothing(
        speed in any::<f64>().prop_filter("not an allowed speed", |s| ![0.5, 1.0, 2.0].contains(s)),
        playing in any::<bool>(),
    ) {
        let (scheduler, controller) = setup();
        controller.load(pong_document(10));
        if playing {
            controller.play();
        }
        let before = controller.snapshot();
        let timers = scheduler.timer_ids();

        prop_assert!(controller.set_speed(speed).is_err());
        prop_assert_eq!(controller.snapshot(), before);
        prop_assert_eq!(scheduler.timer_ids(), timers);
    }

    #[test]
    fn stale_callbacks_never_move_playback(
        frames in 2usize..50,
        stops in proptest::collection::vec(0u8..3, 1..10),
    ) {
        let (scheduler, controller) = leaky_controller();
        controller.load(pong_document(frames));

        for stop in stops {
            controller.play();
            match stop {
                0 => controller.pause(),
                1 => controller.reset(),
                _ => controller.load(pong_document(frames)),
            }
            let before = controller.snapshot();
            scheduler.fire_all();
            prop_assert_eq!(controller.snapshot(), before);
        }
    }

    // ========================================================================
    // Renderer properties
    // ========================================================================

    #[test]
    fn renderer_handles_arbitrary_frames(frame in frame_strategy()) {
        let mut surface = RecordingSurface::new(320, 180).unwrap();
        let outcome = FrameRenderer::default().render(Some(&frame), &mut surface);

        prop_assert_eq!(outcome.is_rendered(), frame.is_valid());
        if let RenderOutcome::InvalidStructure(missing) = outcome {
            prop_assert!(!missing.is_empty());
        }
        prop_assert!(!surface.commands().is_empty());
    }
}
