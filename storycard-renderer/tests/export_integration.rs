//! Integration tests for card export (storycard-renderer).
//!
//! Drives a real editor session through the capture flow and checks the
//! rasterized output.

use std::time::Duration;

use storycard_core::{
    CaptureExporter, CardSeed, CardSnapshot, EditorConfig, EditorSession, EditorState, ElementId,
    FixedKind, ImageFormat, StylePatch, TouchEvent, TouchPhase, Vec2,
};
use storycard_renderer::{data_uri, CardExporter, ExportConfig};

fn small_config() -> EditorConfig {
    EditorConfig {
        canvas_width: 90.0,
        canvas_height: 160.0,
        ..EditorConfig::default()
    }
}

fn offline(format: ImageFormat) -> CardExporter {
    CardExporter::new(ExportConfig {
        pixel_ratio: 1.0,
        format,
        load_system_fonts: false,
        ..ExportConfig::default()
    })
}

fn seeded_state() -> EditorState {
    let seed = CardSeed {
        date: "Oct 18".to_string(),
        main_stat: "3h 05m".to_string(),
        session: "4 sessions".to_string(),
        avg_time: "46m avg".to_string(),
        message: "Keep going".to_string(),
        ..CardSeed::default()
    };
    EditorState::new(&small_config(), seed)
}

// ==========================================================================
// Capture pipeline
// ==========================================================================

#[tokio::test]
async fn test_capture_through_exporter_produces_png() {
    let session = EditorSession::new(seeded_state());
    let capture = CaptureExporter::new(
        session.clone(),
        offline(ImageFormat::Png),
        Duration::from_millis(1),
    );

    let image = capture.capture().await.expect("capture");
    assert_eq!(image.format, ImageFormat::Png);
    assert_eq!((image.width, image.height), (90, 160));
    assert_eq!(&image.bytes[0..4], &[137, 80, 78, 71]);
    assert!(!session.read(EditorState::is_capturing));
}

#[tokio::test]
async fn test_capture_restores_selection_after_export() {
    let session = EditorSession::new(seeded_state());
    let main_stat = ElementId::Fixed(FixedKind::MainStat);
    session.write(|state| state.select(main_stat));

    let capture = CaptureExporter::new(
        session.clone(),
        offline(ImageFormat::Jpeg),
        Duration::from_millis(1),
    );
    let image = capture.capture().await.expect("capture");

    assert_eq!(image.bytes[0], 0xFF);
    assert_eq!(image.bytes[1], 0xD8);
    assert_eq!(session.read(EditorState::selected), Some(main_stat));
}

// ==========================================================================
// Snapshot content
// ==========================================================================

#[test]
fn test_edited_card_svg_reflects_edits() {
    let mut state = seeded_state();
    let id = state
        .add_custom_text(Vec2::new(0.0, 40.0))
        .expect("custom text");
    state.update_content(id, "Exam week");
    state.update_style(
        ElementId::Custom(id),
        &StylePatch {
            color: Some("#FACC15".to_string()),
            ..StylePatch::default()
        },
    );
    state.set_visible(FixedKind::Session, false);

    let svg = offline(ImageFormat::Png).render_to_svg(&state.snapshot());
    assert!(svg.contains("Exam week"));
    assert!(svg.contains("#FACC15"));
    assert!(!svg.contains("4 sessions"));
    assert!(svg.contains("Keep going"));
}

#[test]
fn test_dragged_element_renders_at_committed_position() {
    let mut state = seeded_state();
    let date = ElementId::Fixed(FixedKind::Date);
    let start = state.registry().position(date).expect("date position");

    state.handle_touch(date, &TouchEvent::single(TouchPhase::Start, 0.0, 0.0));
    state.handle_touch(date, &TouchEvent::single(TouchPhase::Move, 20.0, 10.0));
    state.handle_touch(date, &TouchEvent::single(TouchPhase::End, 20.0, 10.0));

    let snapshot = state.snapshot();
    let element = snapshot
        .elements
        .iter()
        .find(|e| e.id == date)
        .expect("date in snapshot");
    assert_eq!(element.position, Vec2::new(start.x + 20.0, start.y + 10.0));
}

#[test]
fn test_snapshot_json_renders_identically() {
    let snapshot = seeded_state().snapshot();
    let json = snapshot.to_json().expect("serialize");
    let restored = CardSnapshot::from_json(&json).expect("deserialize");

    let exporter = offline(ImageFormat::Png);
    assert_eq!(
        exporter.render_to_svg(&snapshot),
        exporter.render_to_svg(&restored)
    );
}

// ==========================================================================
// Configuration
// ==========================================================================

#[test]
fn test_default_export_is_story_resolution() {
    let exporter = CardExporter::new(ExportConfig {
        load_system_fonts: false,
        ..ExportConfig::default()
    });
    let state = EditorState::new(&EditorConfig::default(), CardSeed::default());
    let svg = exporter.render_to_svg(&state.snapshot());
    assert!(svg.contains("width=\"1080\" height=\"1920\""));
}

#[test]
fn test_export_config_from_json() {
    let config: ExportConfig =
        serde_json::from_str(r#"{"format":"jpeg","jpeg_quality":70,"pixel_ratio":2.0}"#)
            .expect("parse export config");
    assert_eq!(config.format, ImageFormat::Jpeg);
    assert_eq!(config.jpeg_quality, 70);
    assert!((config.pixel_ratio - 2.0).abs() < f32::EPSILON);
    assert!(config.load_system_fonts);
}

#[test]
fn test_data_uri_of_real_export() {
    let image = offline(ImageFormat::Jpeg)
        .export(&seeded_state().snapshot())
        .expect("export");
    let uri = data_uri(&image);
    assert!(uri.starts_with("data:image/jpeg;base64,/9j/"));
}
