//! Metamorphic tests: relationships that must hold between related renders and
//! playbacks, without pinning exact outputs.
//!
//! 1. **Mirror symmetry**: swapping the players mirrors the paddles horizontally
//! 2. **Scale invariance**: doubling the surface doubles every coordinate
//! 3. **Split ticking**: advancing the clock in pieces equals advancing it at once

use crate::common::{pong_document, setup};
use arena_replay::{DrawCommand, Frame, FrameRenderer, RecordingSurface, RenderConfig};
use proptest::prelude::*;
use web_time::Duration;

fn commands(frame: &Frame, width: u32, height: u32) -> Vec<DrawCommand> {
    let mut surface = RecordingSurface::new(width, height).unwrap();
    FrameRenderer::default().render(Some(frame), &mut surface);
    surface.take_commands()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    #[test]
    fn swapping_players_swaps_paddle_heights(
        left in 0.0f64..=1.0,
        right in 0.0f64..=1.0,
    ) {
        let config = RenderConfig::default();
        let a = commands(&Frame::pong([0.5, 0.5], [left, right], [0, 0]), 800, 450);
        let b = commands(&Frame::pong([0.5, 0.5], [right, left], [0, 0]), 800, 450);

        let paddle_y = |cmds: &[DrawCommand], color| {
            cmds.iter()
                .find_map(|cmd| match cmd {
                    DrawCommand::Rect { rect, color: c } if *c == color => Some(rect.y),
                    _ => None,
                })
                .unwrap()
        };
        prop_assert_eq!(
            paddle_y(&a, config.left_player),
            paddle_y(&b, config.right_player)
        );
        prop_assert_eq!(
            paddle_y(&a, config.right_player),
            paddle_y(&b, config.left_player)
        );
    }

    #[test]
    fn ball_position_scales_with_surface(x in 0.0f64..=1.0, y in 0.0f64..=1.0) {
        let frame = Frame::pong([x, y], [0.5, 0.5], [0, 0]);
        let center = |cmds: Vec<DrawCommand>| {
            cmds.into_iter()
                .find_map(|cmd| match cmd {
                    DrawCommand::Circle { center, .. } => Some(center),
                    _ => None,
                })
                .unwrap()
        };
        let small = center(commands(&frame, 400, 200));
        let large = center(commands(&frame, 800, 400));
        prop_assert!((small.x * 2.0 - large.x).abs() < 1e-3);
        prop_assert!((small.y * 2.0 - large.y).abs() < 1e-3);
    }

    #[test]
    fn advancing_in_pieces_equals_advancing_at_once(
        pieces in proptest::collection::vec(1u64..200, 1..20),
    ) {
        let total: u64 = pieces.iter().sum();
        let (split_clock, split) = setup();
        let (whole_clock, whole) = setup();
        for controller in [&split, &whole] {
            controller.load(pong_document(200));
            controller.play();
        }

        for piece in &pieces {
            split_clock.advance(Duration::from_millis(*piece));
        }
        whole_clock.advance(Duration::from_millis(total));

        prop_assert_eq!(split.current_index(), whole.current_index());
        prop_assert_eq!(split.is_playing(), whole.is_playing());
    }
}
