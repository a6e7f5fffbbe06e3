//! Pixels produced by the raster backend.

use arena_replay::{Color, Frame, FrameRenderer, RasterSurface, RenderConfig};

fn rendered(frame: Option<&Frame>) -> RasterSurface {
    let mut surface = RasterSurface::new(800, 450).unwrap();
    FrameRenderer::default().render(frame, &mut surface);
    surface
}

#[test]
fn same_frame_renders_bit_identical() {
    let frame = Frame::pong([0.37, 0.61], [0.2, 0.8], [12, 7]);
    let first = rendered(Some(&frame));
    let second = rendered(Some(&frame));
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn repaint_over_other_frame_matches_fresh_paint() {
    let frame = Frame::pong([0.5, 0.5], [0.5, 0.5], [1, 0]);
    let renderer = FrameRenderer::default();
    let mut reused = RasterSurface::new(800, 450).unwrap();
    renderer.render(Some(&Frame::pong([0.1, 0.9], [0.1, 0.9], [99, 99])), &mut reused);
    renderer.render(Some(&frame), &mut reused);

    assert_eq!(reused.as_bytes(), rendered(Some(&frame)).as_bytes());
}

#[test]
fn court_pixels_have_expected_colors() {
    let config = RenderConfig::default();
    let surface = rendered(Some(&Frame::pong([0.5, 0.5], [0.5, 0.5], [0, 0])));

    assert_eq!(surface.pixel(400, 225), Some(Color::WHITE));
    assert_eq!(surface.pixel(1, 1), Some(config.court_lines));
    assert_eq!(surface.pixel(100, 400), Some(config.background));
    assert_eq!(surface.pixel(25, 225), Some(config.left_player));
    assert_eq!(surface.pixel(775, 225), Some(config.right_player));
    assert_eq!(surface.pixel(800, 0), None);
}

#[test]
fn placeholders_fill_the_surface() {
    let config = RenderConfig::default();
    let no_data = rendered(None);
    assert_eq!(no_data.pixel(10, 10), Some(config.placeholder_background));

    let invalid = rendered(Some(&Frame::default()));
    assert_eq!(invalid.pixel(1, 1), Some(config.invalid_accent));
    assert_eq!(invalid.pixel(10, 10), Some(config.placeholder_background));
}

#[test]
fn png_decodes_back_to_the_same_pixels() {
    let surface = rendered(Some(&Frame::pong([0.3, 0.3], [0.5, 0.5], [2, 5])));
    let png = surface.encode_png().unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.as_raw(), surface.as_bytes());
}
