//! Story Card Editor Integration Tests
//!
//! Tests the editor end to end through its public API:
//! - Tap / drag exclusivity and pinch clamping
//! - Single selection across fixed and custom elements
//! - Background tap spawning text
//! - Menu placement
//! - Capture freezing input and rejecting concurrent requests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use storycard_core::{
    CaptureError, CaptureExporter, CardSeed, CardSnapshot, EditorConfig, EditorSession,
    EditorState, ElementId, FixedKind, GestureIntent, ImageFormat, MenuPlacement, RasterImage,
    Rasterizer, TouchEvent, TouchPhase, Vec2, MAX_SCALE, MIN_SCALE,
};

fn seed() -> CardSeed {
    CardSeed {
        date: "Oct 18".to_string(),
        main_stat: "4h 20m".to_string(),
        session: "6 sessions".to_string(),
        avg_time: "43m avg".to_string(),
        message: "Deep work day".to_string(),
        ..CardSeed::default()
    }
}

fn editor() -> EditorState {
    EditorState::open(&EditorConfig::default(), seed()).expect("editor")
}

/// Feed a full gesture and collect every intent it produced.
fn run_gesture(state: &mut EditorState, id: ElementId, events: &[TouchEvent]) -> Vec<GestureIntent> {
    events
        .iter()
        .filter_map(|event| state.handle_touch(id, event))
        .collect()
}

fn tap_events(x: f32, y: f32) -> Vec<TouchEvent> {
    vec![
        TouchEvent::single(TouchPhase::Start, x, y),
        TouchEvent::single(TouchPhase::End, x, y),
    ]
}

// ============================================================================
// Gesture outcome tests
// ============================================================================

#[test]
fn test_each_gesture_yields_exactly_one_outcome() {
    let paths: Vec<Vec<(f32, f32)>> = vec![
        vec![(0.0, 0.0)],
        vec![(0.0, 0.0), (2.0, 3.0), (4.0, -4.0)],
        vec![(0.0, 0.0), (6.0, 0.0)],
        vec![(0.0, 0.0), (0.0, -30.0), (1.0, -1.0)],
        vec![(0.0, 0.0), (5.0, 5.0), (5.1, 0.0)],
    ];

    for path in paths {
        let mut state = editor();
        let id: ElementId = FixedKind::Session.into();
        let mut events: Vec<TouchEvent> = Vec::new();
        let (sx, sy) = path[0];
        events.push(TouchEvent::single(TouchPhase::Start, sx, sy));
        for &(x, y) in &path[1..] {
            events.push(TouchEvent::single(TouchPhase::Move, x, y));
        }
        let (ex, ey) = *path.last().expect("path");
        events.push(TouchEvent::single(TouchPhase::End, ex, ey));

        let intents = run_gesture(&mut state, id, &events);
        let taps = intents.iter().filter(|i| **i == GestureIntent::Tap).count();
        let commits = intents
            .iter()
            .filter(|i| **i == GestureIntent::GestureCommitted)
            .count();
        assert_eq!(taps + commits, 1, "path {path:?} gave {intents:?}");
    }
}

#[test]
fn test_scenario_a_pinch_scale_and_clamp() {
    let mut state = editor();
    let id: ElementId = FixedKind::MainStat.into();

    state.handle_touch(
        id,
        &TouchEvent::pair(TouchPhase::Start, (100.0, 300.0), (200.0, 300.0)),
    );
    state.handle_touch(
        id,
        &TouchEvent::pair(TouchPhase::Move, (100.0, 300.0), (300.0, 300.0)),
    );
    assert_eq!(state.registry().scale(id), Some(2.0));

    state.handle_touch(
        id,
        &TouchEvent::pair(TouchPhase::Move, (100.0, 300.0), (500.0, 300.0)),
    );
    assert_eq!(state.registry().scale(id), Some(MAX_SCALE));

    state.handle_touch(id, &TouchEvent::new(TouchPhase::End, vec![]));
    let committed = state.registry().get(id).expect("element").transform().scale;
    assert!((committed - MAX_SCALE).abs() < f32::EPSILON);
}

#[test]
fn test_scale_always_within_bounds() {
    let distances = [0.5_f32, 1.0, 7.0, 60.0, 99.0, 150.0, 333.0, 10_000.0];
    for &end in &distances {
        let mut state = editor();
        let id: ElementId = FixedKind::Message.into();
        state.handle_touch(
            id,
            &TouchEvent::pair(TouchPhase::Start, (0.0, 0.0), (100.0, 0.0)),
        );
        state.handle_touch(
            id,
            &TouchEvent::pair(TouchPhase::Move, (0.0, 0.0), (end, 0.0)),
        );
        let scale = state.registry().scale(id).expect("scale");
        assert!(
            (MIN_SCALE..=MAX_SCALE).contains(&scale),
            "distance {end} gave scale {scale}"
        );
    }
}

#[test]
fn test_interrupted_drag_restores_committed_position() {
    let mut state = editor();
    let id: ElementId = FixedKind::Date.into();
    let before = state.registry().position(id).expect("position");

    run_gesture(
        &mut state,
        id,
        &[
            TouchEvent::single(TouchPhase::Start, 50.0, 50.0),
            TouchEvent::single(TouchPhase::Move, 90.0, 120.0),
            TouchEvent::single(TouchPhase::Cancel, 90.0, 120.0),
        ],
    );
    assert_eq!(state.registry().position(id), Some(before));
}

#[test]
fn test_drag_moves_element_by_screen_delta() {
    let mut state = editor();
    let id: ElementId = FixedKind::AvgTime.into();
    let before = state.registry().position(id).expect("position");

    let intents = run_gesture(
        &mut state,
        id,
        &[
            TouchEvent::single(TouchPhase::Start, 10.0, 10.0),
            TouchEvent::single(TouchPhase::Move, 30.0, 10.0),
            TouchEvent::single(TouchPhase::Move, 40.0, -20.0),
            TouchEvent::single(TouchPhase::End, 40.0, -20.0),
        ],
    );
    assert_eq!(intents.last(), Some(&GestureIntent::GestureCommitted));
    assert_eq!(
        state.registry().position(id),
        Some(before + Vec2::new(30.0, -30.0))
    );
}

// ============================================================================
// Selection tests
// ============================================================================

#[test]
fn test_scenario_b_tap_toggles_custom_selection() {
    let mut state = editor();
    let custom = state.add_custom_text(Vec2::new(0.0, 0.0)).expect("custom");
    let id: ElementId = custom.into();

    run_gesture(&mut state, id, &tap_events(180.0, 320.0));
    assert_eq!(state.selected(), Some(id));

    run_gesture(&mut state, id, &tap_events(180.0, 320.0));
    assert_eq!(state.selected(), None);
}

#[test]
fn test_selection_never_holds_two_elements() {
    let mut state = editor();
    let custom: ElementId = state.add_custom_text(Vec2::ZERO).expect("custom").into();
    let order = [
        ElementId::from(FixedKind::Date),
        custom,
        ElementId::from(FixedKind::MainStat),
        custom,
        custom,
    ];
    for id in order {
        run_gesture(&mut state, id, &tap_events(0.0, 0.0));
        if let Some(selected) = state.selected() {
            assert_eq!(selected, id);
            assert!(state.registry().contains(selected));
        }
    }
    state.deselect();
    assert_eq!(state.selected(), None);
}

#[test]
fn test_scenario_c_background_tap_clears_and_spawns() {
    let config = EditorConfig {
        canvas_origin: Vec2::new(0.0, 80.0),
        ..EditorConfig::default()
    };
    let mut state = EditorState::open(&config, seed()).expect("editor");
    state.select(FixedKind::Message.into());
    let before = state.registry().custom_count();

    // Canvas center on screen is (180, 400); (220, 370) is local (40, -30).
    let id = state
        .on_background_tap(Vec2::new(220.0, 370.0))
        .expect("spawned");

    assert_eq!(state.selected(), None);
    assert_eq!(state.registry().custom_count(), before + 1);
    assert_eq!(state.registry().position(id.into()), Some(Vec2::new(40.0, -30.0)));
    assert_eq!(state.editing(), Some(id));
}

#[test]
fn test_custom_text_lifecycle() {
    let mut state = editor();
    let id = state.add_custom_text(Vec2::new(40.0, -30.0)).expect("custom");
    assert_eq!(state.registry().position(id.into()), Some(Vec2::new(40.0, -30.0)));

    assert!(state.update_content(id, "Finals week"));
    assert_eq!(
        state.registry().get(id.into()).expect("element").text(),
        "Finals week"
    );

    assert!(state.remove(id.into()));
    assert!(!state.remove(id.into()));
    assert!(!state.registry().contains(id.into()));
}

// ============================================================================
// Menu placement tests
// ============================================================================

#[test]
fn test_scenario_e_menu_placement() {
    let mut state = editor();
    let upper = state.add_custom_text(Vec2::new(0.0, -200.0)).expect("upper");
    let lower = state.add_custom_text(Vec2::new(0.0, 200.0)).expect("lower");

    assert_eq!(state.menu_placement(upper.into()), Some(MenuPlacement::Below));
    assert_eq!(state.menu_placement(lower.into()), Some(MenuPlacement::Above));
}

#[test]
fn test_menu_placement_tracks_live_drag() {
    let mut state = editor();
    let id: ElementId = FixedKind::Date.into();
    assert_eq!(state.menu_placement(id), Some(MenuPlacement::Below));

    state.handle_touch(id, &TouchEvent::single(TouchPhase::Start, 0.0, 0.0));
    state.handle_touch(id, &TouchEvent::single(TouchPhase::Move, 0.0, 400.0));
    assert_eq!(state.menu_placement(id), Some(MenuPlacement::Above));
}

// ============================================================================
// Capture tests
// ============================================================================

/// Rasterizer that counts calls and takes a while to finish.
struct SlowRasterizer {
    calls: Arc<AtomicUsize>,
    delay: Duration,
}

#[async_trait]
impl Rasterizer for SlowRasterizer {
    async fn rasterize(&self, snapshot: &CardSnapshot) -> Result<RasterImage, CaptureError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(RasterImage {
            width: 1080,
            height: 1920,
            format: ImageFormat::Png,
            bytes: vec![0x89, b'P', b'N', b'G', snapshot.elements.len() as u8],
        })
    }
}

/// Rasterizer that always refuses.
struct RefusingRasterizer;

#[async_trait]
impl Rasterizer for RefusingRasterizer {
    async fn rasterize(&self, _snapshot: &CardSnapshot) -> Result<RasterImage, CaptureError> {
        Err(CaptureError::Rasterize("permission denied".to_string()))
    }
}

#[tokio::test(start_paused = true)]
async fn test_scenario_d_concurrent_capture_rejected() {
    let session = EditorSession::new(editor());
    let calls = Arc::new(AtomicUsize::new(0));
    let exporter = CaptureExporter::new(
        session.clone(),
        SlowRasterizer {
            calls: Arc::clone(&calls),
            delay: Duration::from_millis(200),
        },
        Duration::from_millis(50),
    );

    let (first, second) = tokio::join!(exporter.capture(), exporter.capture());

    assert!(first.is_ok());
    assert!(matches!(second, Err(CaptureError::AlreadyCapturing)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!session.read(EditorState::is_capturing));
}

#[tokio::test(start_paused = true)]
async fn test_capture_excludes_chrome_and_hidden_elements() {
    let session = EditorSession::new(editor());
    let custom = session.write(|s| {
        s.set_visible(FixedKind::Session, false);
        s.on_background_tap(Vec2::new(180.0, 320.0))
    });
    let custom = custom.expect("custom");
    session.write(|s| s.select(FixedKind::MainStat.into()));

    let calls = Arc::new(AtomicUsize::new(0));
    let exporter = CaptureExporter::new(
        session.clone(),
        SlowRasterizer {
            calls: Arc::clone(&calls),
            delay: Duration::from_millis(10),
        },
        Duration::from_millis(50),
    );

    let capture = exporter.capture();
    tokio::pin!(capture);

    // Let the capture reach the render tick, then inspect the frozen editor.
    tokio::select! {
        _ = &mut capture => panic!("capture finished too early"),
        () = tokio::time::sleep(Duration::from_millis(1)) => {}
    }
    session.read(|s| {
        assert!(s.is_capturing());
        let chrome = s.chrome();
        assert_eq!(chrome.selected, None);
        assert_eq!(chrome.editing, None);
        assert_eq!(chrome.menu, None);
        assert!(!chrome.tap_overlay);
    });
    // Input during the capture is dropped.
    assert!(session
        .write(|s| s.on_background_tap(Vec2::new(10.0, 10.0)))
        .is_none());

    let image = capture.await.expect("capture");
    // Four visible fixed elements plus the custom text.
    assert_eq!(image.bytes[4], 5);

    session.read(|s| {
        assert_eq!(s.selected(), Some(FixedKind::MainStat.into()));
        assert!(s.registry().contains(custom.into()));
    });
}

#[tokio::test(start_paused = true)]
async fn test_failed_capture_restores_state() {
    let session = EditorSession::new(editor());
    let id = session
        .write(|s| s.on_background_tap(Vec2::new(100.0, 100.0)))
        .expect("custom");

    let exporter = CaptureExporter::new(
        session.clone(),
        RefusingRasterizer,
        Duration::from_millis(50),
    );
    let err = exporter.capture().await.unwrap_err();
    assert!(matches!(err, CaptureError::Rasterize(_)));

    session.read(|s| {
        assert!(!s.is_capturing());
        assert_eq!(s.editing(), Some(id));
    });
    // Editor is usable again.
    assert!(session.write(|s| s.update_content(id, "after")));
}
