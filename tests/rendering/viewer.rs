//! A viewer following a controller through playback.

use crate::common::{pong_document, setup};
use arena_replay::{RecordingSurface, RenderOutcome, ReplayViewer};
use web_time::Duration;

#[test]
fn viewer_follows_playback() {
    let (scheduler, controller) = setup();
    let mut viewer = ReplayViewer::new(RecordingSurface::new(640, 360).unwrap());
    controller.load(pong_document(30));
    assert!(viewer.refresh(&controller));
    assert_eq!(viewer.surface().texts(), vec!["0", "0"]);

    controller.play();
    scheduler.advance(Duration::from_millis(100));
    assert!(viewer.refresh(&controller));
    assert_eq!(viewer.surface().texts(), vec!["3", "0"]);
    assert!(!viewer.refresh(&controller));
}

#[test]
fn viewer_shows_placeholder_after_clear() {
    let (_scheduler, controller) = setup();
    let mut viewer = ReplayViewer::new(RecordingSurface::new(640, 360).unwrap());
    controller.load(pong_document(5));
    viewer.refresh(&controller);

    controller.clear();
    assert!(viewer.refresh(&controller));
    assert_eq!(viewer.last_outcome(), Some(&RenderOutcome::NoData));
}
