//! End-to-end sorting and annotation workflows against real folders.

use std::fs;
use std::path::Path;

use sortbox::format;
use sortbox::model::{BoundingBox, DisplaySize, to_display, to_normalized};
use sortbox::{Action, Effect, Session, SessionError, SessionState};

fn write_png(path: &Path, width: u32, height: u32) {
    image::RgbImage::new(width, height).save(path).unwrap();
}

fn folder_with(names: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in names {
        write_png(&dir.path().join(name), 200, 100);
    }
    dir
}

fn open(dir: &Path) -> Session {
    let mut session = Session::default();
    session.handle(Action::OpenFolder(dir.to_path_buf())).unwrap();
    session
}

fn pending(session: &Session) -> Vec<String> {
    session
        .project()
        .unwrap()
        .images()
        .iter()
        .map(|item| item.file_name())
        .collect()
}

fn count_files(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}

#[test]
fn classify_then_undo_restores_folder() {
    let dir = folder_with(&["1.png", "2.png", "3.png"]);
    let mut session = open(dir.path());

    session.handle(Action::Accept).unwrap();
    assert_eq!(pending(&session), vec!["2.png", "3.png"]);
    assert_eq!(count_files(&dir.path().join("OK")), 1);
    assert_eq!(session.history().len(), 1);

    session.handle(Action::Undo).unwrap();
    assert_eq!(pending(&session), vec!["1.png", "2.png", "3.png"]);
    assert_eq!(session.project().unwrap().current_index(), 0);
    assert_eq!(count_files(&dir.path().join("OK")), 0);
    assert!(dir.path().join("1.png").is_file());
}

#[test]
fn sidecar_travels_with_image() {
    let dir = folder_with(&["a.png"]);
    let sidecar = "0 0.5 0.5 0.2 0.2\n";
    fs::write(dir.path().join("a.txt"), sidecar).unwrap();

    let mut session = open(dir.path());
    session.handle(Action::SelectOutcome(1)).unwrap();
    let effects = session.handle(Action::Accept).unwrap();
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::Moved {
            sidecar_moved: true,
            ..
        }
    )));
    assert!(dir.path().join("NG/a.png").is_file());
    assert_eq!(fs::read_to_string(dir.path().join("NG/a.txt")).unwrap(), sidecar);
    assert_eq!(session.state(), &SessionState::Exhausted);

    session.handle(Action::Undo).unwrap();
    assert!(dir.path().join("a.png").is_file());
    assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), sidecar);
    assert!(!dir.path().join("NG/a.txt").exists());
    assert_eq!(session.store().len(), 1);
}

#[test]
fn drawn_box_is_saved_and_reloaded() {
    let dir = folder_with(&["a.png"]);
    let mut session = open(dir.path());
    let display = session.display().unwrap();
    assert_eq!(display, DisplaySize::new(200.0, 100.0));

    session.handle(Action::OpenEditor).unwrap();
    session.handle(Action::PointerPress { x: 150.0, y: 80.0 }).unwrap();
    session.handle(Action::PointerDrag { x: 100.0, y: 50.0 }).unwrap();
    session.handle(Action::PointerRelease { x: 50.0, y: 20.0 }).unwrap();
    session.handle(Action::SubmitLabel(Some("1".into()))).unwrap();
    let effects = session.handle(Action::SaveEditor).unwrap();
    assert!(effects.contains(&Effect::SidecarWritten(dir.path().join("a.txt"))));

    let text = fs::read_to_string(dir.path().join("a.txt")).unwrap();
    assert_eq!(text, "1 0.500000 0.500000 0.500000 0.600000\n");

    session.handle(Action::OpenEditor).unwrap();
    assert_eq!(session.store().len(), 1);
    let bbox = &session.store().boxes()[0];
    assert!((bbox.center_x - 0.5).abs() < 1e-6);
    assert!((bbox.height - 0.6).abs() < 1e-6);
}

#[test]
fn deleting_last_box_removes_sidecar() {
    let dir = folder_with(&["a.png"]);
    fs::write(dir.path().join("a.txt"), "0 0.5 0.5 0.2 0.2\n").unwrap();
    let mut session = open(dir.path());

    session.handle(Action::OpenEditor).unwrap();
    session.handle(Action::PointerPress { x: 100.0, y: 50.0 }).unwrap();
    assert_eq!(session.store().selected(), Some(0));
    session.handle(Action::DeleteSelected).unwrap();
    let effects = session.handle(Action::SaveEditor).unwrap();

    assert!(effects.contains(&Effect::SidecarRemoved(dir.path().join("a.txt"))));
    assert!(!dir.path().join("a.txt").exists());

    // Undo brings the box back on disk and in the store
    session.handle(Action::Undo).unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("a.txt")).unwrap(),
        "0 0.500000 0.500000 0.200000 0.200000\n"
    );
    assert_eq!(session.store().len(), 1);
}

#[test]
fn repeated_undo_walks_back_through_history() {
    let dir = folder_with(&["a.png", "b.png", "c.png"]);
    let mut session = open(dir.path());

    session.handle(Action::Accept).unwrap();
    session.handle(Action::OpenEditor).unwrap();
    session.handle(Action::PointerPress { x: 10.0, y: 10.0 }).unwrap();
    session.handle(Action::PointerRelease { x: 60.0, y: 60.0 }).unwrap();
    session.handle(Action::SubmitLabel(Some("4".into()))).unwrap();
    session.handle(Action::SaveEditor).unwrap();
    session.handle(Action::ToggleOutcome).unwrap();
    session.handle(Action::Accept).unwrap();
    assert_eq!(session.history().len(), 3);
    assert!(dir.path().join("NG/b.png").is_file());
    assert!(dir.path().join("NG/b.txt").is_file());

    session.handle(Action::Undo).unwrap();
    assert!(dir.path().join("b.txt").is_file());
    session.handle(Action::Undo).unwrap();
    assert!(!dir.path().join("b.txt").exists());
    session.handle(Action::Undo).unwrap();
    assert_eq!(pending(&session), vec!["a.png", "b.png", "c.png"]);

    let effects = session.handle(Action::Undo).unwrap();
    assert_eq!(effects, vec![Effect::Notice("Nothing to undo".into())]);
}

#[test]
fn skipped_images_leave_the_pending_list() {
    let dir = folder_with(&["a.png", "b.png"]);
    let mut session = open(dir.path());
    session.handle(Action::Skip).unwrap();
    assert_eq!(pending(&session), vec!["b.png"]);
    session.handle(Action::Skip).unwrap();
    assert_eq!(session.state(), &SessionState::Exhausted);
    assert!(pending(&session).is_empty());
    assert!(session.history().is_empty());
    assert!(dir.path().join("a.png").is_file());
    assert!(dir.path().join("b.png").is_file());
}

#[test]
fn skip_then_classify_then_undo() {
    let dir = folder_with(&["a.png", "b.png", "c.png"]);
    let mut session = open(dir.path());

    session.handle(Action::Skip).unwrap();
    session.handle(Action::Accept).unwrap();
    assert_eq!(pending(&session), vec!["c.png"]);
    assert!(dir.path().join("OK/b.png").is_file());
    assert_eq!(session.history().len(), 1);

    // Only the classification is reversed; the skipped image stays out
    session.handle(Action::Undo).unwrap();
    assert_eq!(pending(&session), vec!["b.png", "c.png"]);
    assert_eq!(session.project().unwrap().current().unwrap().file_name(), "b.png");
    assert!(dir.path().join("b.png").is_file());
    assert!(dir.path().join("a.png").is_file());
}

#[test]
fn undo_past_a_vanished_image() {
    let dir = folder_with(&["a.png", "b.png"]);
    let mut session = open(dir.path());
    session.handle(Action::Accept).unwrap();
    session.handle(Action::Accept).unwrap();
    fs::remove_file(dir.path().join("OK/b.png")).unwrap();

    let result = session.handle(Action::Undo);
    assert!(matches!(result, Err(SessionError::ImageMoveFailed { .. })));
    assert_eq!(session.history().len(), 1);

    session.handle(Action::Undo).unwrap();
    assert_eq!(pending(&session), vec!["a.png"]);
    assert!(session.history().is_empty());
}

#[test]
fn occupied_destination_blocks_classification() {
    let dir = folder_with(&["a.png"]);
    fs::create_dir(dir.path().join("OK")).unwrap();
    fs::write(dir.path().join("OK/a.png"), b"older").unwrap();
    let mut session = open(dir.path());

    let result = session.handle(Action::Accept);
    assert!(matches!(result, Err(SessionError::ImageMoveFailed { .. })));
    assert_eq!(pending(&session), vec!["a.png"]);
    assert!(session.history().is_empty());
    assert_eq!(fs::read(dir.path().join("OK/a.png")).unwrap(), b"older");
}

#[test]
fn reopening_clears_history() {
    let dir = folder_with(&["a.png", "b.png"]);
    let mut session = open(dir.path());
    session.handle(Action::Accept).unwrap();
    session.handle(Action::OpenFolder(dir.path().to_path_buf())).unwrap();
    assert!(session.history().is_empty());
    assert_eq!(pending(&session), vec!["b.png"]);
}

#[test]
fn codec_round_trip_within_precision() {
    let boxes = vec![
        BoundingBox::new("0", 0.123456, 0.5, 0.25, 0.75),
        BoundingBox::new("dent", 0.9, 0.1, 0.05, 0.02),
    ];
    let parsed = format::parse(&format::serialize(&boxes));
    assert_eq!(parsed.len(), boxes.len());
    for (a, b) in parsed.iter().zip(&boxes) {
        assert_eq!(a.label, b.label);
        assert!((a.center_x - b.center_x).abs() < 1e-6);
        assert!((a.height - b.height).abs() < 1e-6);
    }
}

#[test]
fn display_projection_inverts() {
    let display = DisplaySize::new(640.0, 360.0);
    let bbox = BoundingBox::new("0", 0.4, 0.6, 0.3, 0.2);
    let rect = to_display(&bbox, display);
    let back = to_normalized(rect.x2, rect.y2, rect.x1, rect.y1, display);
    assert!((back.center_x - 0.4).abs() < 1e-4);
    assert!((back.center_y - 0.6).abs() < 1e-4);
    assert!((back.width - 0.3).abs() < 1e-4);
    assert!((back.height - 0.2).abs() < 1e-4);
}
