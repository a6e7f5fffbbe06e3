//! Draw calls for each render path, checked against the court layout.

use arena_replay::render::{INVALID_STRUCTURE_TEXT, NO_DATA_TEXT};
use arena_replay::telemetry::{CollectingObserver, ViolationKind};
use arena_replay::{
    Color, DrawCommand, Frame, FrameField, FrameInfo, FrameRenderer, Point, RecordingSurface,
    Rect, RenderConfig, RenderOutcome, TextAlign,
};
use smallvec::smallvec;
use std::sync::Arc;

const COURT: Color = Color::from_hex(0x1a1a2e);
const LINES: Color = Color::from_hex(0x444466);
const LEFT: Color = Color::from_hex(0x00ff88);
const RIGHT: Color = Color::from_hex(0xff0088);
const PLACEHOLDER: Color = Color::from_hex(0x333333);

fn surface() -> RecordingSurface {
    RecordingSurface::new(800, 450).unwrap()
}

fn border(color: Color) -> Vec<DrawCommand> {
    [
        Rect::new(0.0, 0.0, 800.0, 3.0),
        Rect::new(0.0, 447.0, 800.0, 3.0),
        Rect::new(0.0, 0.0, 3.0, 450.0),
        Rect::new(797.0, 0.0, 3.0, 450.0),
    ]
    .into_iter()
    .map(|rect| DrawCommand::Rect { rect, color })
    .collect()
}

// ============================================================================
// Valid frames
// ============================================================================

#[test]
fn valid_frame_draws_court_in_order() {
    let mut surface = surface();
    let frame = Frame::pong([0.5, 0.5], [0.5, 0.25], [3, 2]);

    let outcome = FrameRenderer::default().render(Some(&frame), &mut surface);
    assert_eq!(outcome, RenderOutcome::Rendered);

    let mut expected = vec![DrawCommand::Background { color: COURT }];
    let mut y = 0.0;
    while y < 450.0 {
        expected.push(DrawCommand::Rect {
            rect: Rect::new(399.0, y, 2.0, 10.0),
            color: LINES,
        });
        y += 20.0;
    }
    expected.extend(border(LINES));
    expected.extend([
        DrawCommand::Rect {
            rect: Rect::new(20.0, 195.0, 10.0, 60.0),
            color: LEFT,
        },
        DrawCommand::Rect {
            rect: Rect::new(770.0, 82.5, 10.0, 60.0),
            color: RIGHT,
        },
        DrawCommand::Circle {
            center: Point::new(400.0, 225.0),
            radius: 8.0,
            color: Color::WHITE,
        },
        DrawCommand::Text {
            text: "3".to_owned(),
            anchor: Point::new(200.0, 60.0),
            size: 48.0,
            align: TextAlign::Center,
            color: LEFT,
        },
        DrawCommand::Text {
            text: "2".to_owned(),
            anchor: Point::new(600.0, 60.0),
            size: 48.0,
            align: TextAlign::Center,
            color: RIGHT,
        },
    ]);

    assert_eq!(surface.commands(), expected.as_slice());
}

#[test]
fn coordinates_scale_with_surface_size() {
    let mut surface = RecordingSurface::new(400, 200).unwrap();
    let frame = Frame::pong([0.25, 0.75], [0.0, 1.0], [0, 0]);
    FrameRenderer::default().render(Some(&frame), &mut surface);

    assert!(surface.commands().contains(&DrawCommand::Circle {
        center: Point::new(100.0, 150.0),
        radius: 8.0,
        color: Color::WHITE,
    }));
    assert_eq!(
        surface.rects_with_color(RIGHT),
        vec![Rect::new(370.0, 170.0, 10.0, 60.0)]
    );
}

#[test]
fn extra_entries_are_ignored() {
    let frame = Frame {
        info: Some(FrameInfo {
            ball_pos: Some(smallvec![0.5, 0.5, 9.0]),
            paddle_positions: Some(smallvec![0.5, 0.5, 0.1]),
            score: Some(smallvec![1, 2, 3]),
        }),
    };
    let mut surface = surface();
    assert!(FrameRenderer::default().render(Some(&frame), &mut surface).is_rendered());
    assert_eq!(surface.texts(), vec!["1", "2"]);
}

#[test]
fn custom_palette_is_used() {
    let config = RenderConfig::high_contrast();
    let renderer = FrameRenderer::new(config).unwrap();
    let mut surface = surface();
    renderer.render(Some(&Frame::pong([0.5, 0.5], [0.5, 0.5], [0, 0])), &mut surface);
    assert_eq!(
        surface.commands().first(),
        Some(&DrawCommand::Background {
            color: config.background
        })
    );
}

// ============================================================================
// Placeholders
// ============================================================================

#[test]
fn absent_frame_draws_no_data_placeholder() {
    let mut surface = surface();
    let outcome = FrameRenderer::default().render(None, &mut surface);

    assert_eq!(outcome, RenderOutcome::NoData);
    assert_eq!(
        surface.commands(),
        &[
            DrawCommand::Background { color: PLACEHOLDER },
            DrawCommand::Text {
                text: NO_DATA_TEXT.to_owned(),
                anchor: Point::new(400.0, 225.0),
                size: 20.0,
                align: TextAlign::Center,
                color: Color::WHITE,
            },
        ]
    );
}

#[test]
fn frame_without_score_draws_invalid_placeholder() {
    let mut frame = Frame::pong([0.5, 0.5], [0.5, 0.5], [0, 0]);
    if let Some(info) = frame.info.as_mut() {
        info.score = None;
    }
    let observer = Arc::new(CollectingObserver::new());
    let renderer = FrameRenderer::default().with_violation_observer(observer.clone());
    let mut surface = surface();

    let outcome = renderer.render_indexed(17, Some(&frame), &mut surface);

    assert_eq!(outcome, RenderOutcome::InvalidStructure(vec![FrameField::Score]));
    let accent = RenderConfig::default().invalid_accent;
    let mut expected = vec![DrawCommand::Background { color: PLACEHOLDER }];
    expected.extend(border(accent));
    expected.push(DrawCommand::Text {
        text: INVALID_STRUCTURE_TEXT.to_owned(),
        anchor: Point::new(400.0, 225.0),
        size: 16.0,
        align: TextAlign::Center,
        color: accent,
    });
    assert_eq!(surface.commands(), expected.as_slice());

    let violations = observer.violations_of_kind(ViolationKind::FrameStructure);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].frame_index, Some(17));
    assert_eq!(violations[0].context.get("missing").map(String::as_str), Some("score"));
}

#[test]
fn frame_without_info_is_invalid() {
    let mut surface = surface();
    let outcome = FrameRenderer::default().render(Some(&Frame::default()), &mut surface);
    assert_eq!(outcome, RenderOutcome::InvalidStructure(vec![FrameField::Info]));
    assert_eq!(surface.texts(), vec![INVALID_STRUCTURE_TEXT]);
}

#[test]
fn wrong_typed_fields_from_json_are_invalid() {
    let json = r#"{"frames":[{"info":{"ball_pos":"middle","paddle_positions":[0.5],"score":[1,1]}}]}"#;
    let document = arena_replay::ReplayDocument::from_json_str(json).unwrap();
    let mut surface = surface();
    let outcome = FrameRenderer::default().render(document.frame(0), &mut surface);
    assert_eq!(
        outcome,
        RenderOutcome::InvalidStructure(vec![FrameField::BallPos, FrameField::PaddlePositions])
    );
}

#[test]
fn repaint_replaces_previous_frame() {
    let mut surface = surface();
    let renderer = FrameRenderer::default();
    renderer.render(Some(&Frame::pong([0.1, 0.1], [0.5, 0.5], [1, 1])), &mut surface);
    renderer.render(None, &mut surface);
    assert_eq!(surface.commands().len(), 2);
}
