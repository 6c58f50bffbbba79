//! Session controller: the state machine that drives a curation session.
//!
//! ```text
//! Idle --open--> Ready <--save/cancel-- Editing
//!                  |  \--edit---------->/
//!                  | accept/skip past the end
//!                  v
//!              Exhausted --undo--> Ready
//! ```
//!
//! Each [`Action`] is one transition. A transition either succeeds and
//! returns the [`Effect`]s it caused, or fails with a [`SessionError`] and
//! leaves the pending sequence consistent with the files on disk.

use std::fmt;
use std::mem;
use std::path::{Path, PathBuf};

use crate::annotation::BoxStore;
use crate::config::{AppConfig, LabelFont};
use crate::constants::{DEFAULT_BUCKETS, DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_DISPLAY_SIZE};
use crate::error::SessionError;
use crate::format::{self, SaveOutcome};
use crate::message::Action;
use crate::model::{AnnotationSet, BoundingBox, DisplaySize, DrawingState, NormalizedRect, to_normalized};
use crate::mover;
use crate::render::{DrawCommand, RenderStyle, render};
use crate::state::ProjectState;
use crate::undo::{HistoryConfig, HistoryEntry, HistoryStack, undo_last};

// ============================================================================
// States
// ============================================================================

/// A label the editor is waiting for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelPrompt {
    /// A freshly drawn box that becomes real once labeled
    NewBox(NormalizedRect),
    /// A new label for the box at this index
    Relabel(usize),
}

/// Annotation editor state for the current image.
#[derive(Debug, Clone, PartialEq)]
pub struct Editor {
    /// Boxes as they were when the editor opened
    prior: AnnotationSet,
    /// Box being drawn with the pointer
    drawing: DrawingState,
    /// Open label prompt, if any
    prompt: Option<LabelPrompt>,
}

impl Editor {
    pub fn prior(&self) -> &[BoundingBox] {
        &self.prior
    }

    pub fn drawing(&self) -> DrawingState {
        self.drawing
    }

    pub fn prompt(&self) -> Option<LabelPrompt> {
        self.prompt
    }
}

/// Session states.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// No folder open
    #[default]
    Idle,
    /// A folder is open and the cursor points at an image
    Ready,
    /// The annotation editor is open for the current image
    Editing(Editor),
    /// The cursor is past the last pending image
    Exhausted,
}

impl SessionState {
    /// Get the display name for this state.
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Ready => "ready",
            SessionState::Editing(_) => "editing",
            SessionState::Exhausted => "exhausted",
        }
    }
}

// ============================================================================
// Effects
// ============================================================================

/// Something a transition did that the operator should hear about.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// A working folder was opened
    FolderOpened { folder: PathBuf, images: usize },
    /// An image was classified into a bucket
    Moved {
        image: PathBuf,
        bucket: String,
        sidecar_moved: bool,
    },
    /// An image was passed over without moving it
    Skipped(PathBuf),
    /// A sidecar was written
    SidecarWritten(PathBuf),
    /// A sidecar was deleted because its image has no boxes left
    SidecarRemoved(PathBuf),
    /// A history entry was reversed
    Undone(String),
    /// The outcome bucket selected for the next accept
    OutcomeSelected(String),
    /// Overlay shown or hidden
    OverlayToggled(bool),
    /// New display surface for the current image
    Resized(DisplaySize),
    /// The annotation editor opened
    EditorOpened { boxes: usize },
    /// The annotation editor closed
    EditorClosed { saved: bool },
    /// Selection changed in the editor
    BoxSelected(Option<usize>),
    /// A box was added
    BoxAdded(usize),
    /// A box label changed
    BoxRelabeled(usize),
    /// A box was deleted
    BoxDeleted(usize),
    /// The editor waits for a label; `current` is set when relabeling
    PromptLabel { current: Option<String> },
    /// A drag too small to make a box was dropped
    DragDiscarded,
    /// The box being drawn was abandoned
    DragCancelled,
    /// No pending images remain
    Exhausted,
    /// Recovered problem worth showing
    Notice(String),
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::FolderOpened { folder, images } => {
                write!(f, "opened {} ({} images)", folder.display(), images)
            }
            Effect::Moved {
                image,
                bucket,
                sidecar_moved,
            } => write!(
                f,
                "moved {} to {}{}",
                file_name(image),
                bucket,
                if *sidecar_moved { " with its sidecar" } else { "" }
            ),
            Effect::Skipped(path) => write!(f, "skipped {}", file_name(path)),
            Effect::SidecarWritten(path) => write!(f, "wrote {}", file_name(path)),
            Effect::SidecarRemoved(path) => write!(f, "removed {}", file_name(path)),
            Effect::Undone(description) => write!(f, "undid: {description}"),
            Effect::OutcomeSelected(bucket) => write!(f, "outcome: {bucket}"),
            Effect::OverlayToggled(visible) => {
                write!(f, "overlay {}", if *visible { "shown" } else { "hidden" })
            }
            Effect::Resized(size) => write!(f, "display {:.0}x{:.0}", size.width, size.height),
            Effect::EditorOpened { boxes } => write!(f, "editor open ({boxes} boxes)"),
            Effect::EditorClosed { saved: true } => f.write_str("editor saved"),
            Effect::EditorClosed { saved: false } => f.write_str("editor closed, changes discarded"),
            Effect::BoxSelected(Some(index)) => write!(f, "selected box {index}"),
            Effect::BoxSelected(None) => f.write_str("selection cleared"),
            Effect::BoxAdded(index) => write!(f, "added box {index}"),
            Effect::BoxRelabeled(index) => write!(f, "relabeled box {index}"),
            Effect::BoxDeleted(index) => write!(f, "deleted box {index}"),
            Effect::PromptLabel { current: None } => f.write_str("label? (label TEXT)"),
            Effect::PromptLabel { current: Some(label) } => {
                write!(f, "new label for '{label}'? (label TEXT)")
            }
            Effect::DragDiscarded => f.write_str("box too small, discarded"),
            Effect::DragCancelled => f.write_str("drawing cancelled"),
            Effect::Exhausted => f.write_str("no images left"),
            Effect::Notice(message) => f.write_str(message),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Session
// ============================================================================

/// Settings a session is created with.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    /// The two outcome buckets; the first is selected when a folder opens
    pub buckets: [String; 2],
    /// Initial bounds of the display surface (square)
    pub max_display_size: u32,
    /// Undo entries kept
    pub history_limit: usize,
    /// Initial overlay visibility
    pub show_overlay: bool,
    /// Font for box labels
    pub font: LabelFont,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            buckets: DEFAULT_BUCKETS.map(String::from),
            max_display_size: DEFAULT_MAX_DISPLAY_SIZE,
            history_limit: DEFAULT_HISTORY_LIMIT,
            show_overlay: true,
            font: LabelFont::Builtin,
        }
    }
}

impl SessionOptions {
    /// Take options from the application config, resolving the label font.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            buckets: config.bucket_pair(),
            max_display_size: config.preferences.max_display_size,
            history_limit: config.preferences.history_limit,
            show_overlay: config.preferences.show_overlay,
            font: config.label_font(),
        }
    }
}

/// One operator's curation session.
#[derive(Debug)]
pub struct Session {
    buckets: [String; 2],
    /// Index into `buckets` of the selected outcome
    outcome: usize,
    /// Bounds the current image is fitted into
    viewport: DisplaySize,
    overlay_visible: bool,
    history_limit: usize,
    style: RenderStyle,

    project: Option<ProjectState>,
    history: HistoryStack,
    store: BoxStore,
    /// Pixel size of the current image
    image_size: Option<(u32, u32)>,
    state: SessionState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            buckets: options.buckets,
            outcome: 0,
            viewport: DisplaySize::square(options.max_display_size),
            overlay_visible: options.show_overlay,
            history_limit: options.history_limit,
            style: RenderStyle {
                font: options.font,
                ..RenderStyle::default()
            },
            project: None,
            history: HistoryStack::new(),
            store: BoxStore::new(),
            image_size: None,
            state: SessionState::Idle,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn project(&self) -> Option<&ProjectState> {
        self.project.as_ref()
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn store(&self) -> &BoxStore {
        &self.store
    }

    pub fn buckets(&self) -> &[String; 2] {
        &self.buckets
    }

    /// Bucket the next accept moves into.
    pub fn outcome_bucket(&self) -> &str {
        &self.buckets[self.outcome]
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn font(&self) -> &LabelFont {
        &self.style.font
    }

    /// Check if the editor is open.
    pub fn is_editing(&self) -> bool {
        matches!(self.state, SessionState::Editing(_))
    }

    /// Surface the current image is drawn on, once an image is loaded.
    pub fn display(&self) -> Option<DisplaySize> {
        self.image_size
            .map(|(w, h)| DisplaySize::fit(w, h, self.viewport))
    }

    fn display_or_viewport(&self) -> DisplaySize {
        self.display().unwrap_or(self.viewport)
    }

    /// Draw commands for the current frame.
    pub fn frame(&self) -> Vec<DrawCommand> {
        let Some(display) = self.display() else {
            return Vec::new();
        };
        let (selected, drag) = match &self.state {
            SessionState::Editing(editor) => (self.store.selected(), editor.drawing.corners()),
            _ => (None, None),
        };
        render(
            self.store.boxes(),
            display,
            selected,
            self.overlay_visible,
            drag,
            &self.style,
        )
    }

    /// One-line summary of where the session stands.
    pub fn status(&self) -> String {
        let Some(project) = &self.project else {
            return "no folder open".to_string();
        };
        let mut status = format!(
            "[{}] {}  {}  outcome={}  boxes={}",
            self.state.name(),
            project.progress(),
            project.current_name(),
            self.outcome_bucket(),
            self.store.len()
        );
        if let Some(description) = self.history.undo_description() {
            status.push_str(&format!("  undo: {description}"));
        }
        status
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    /// Apply one operator action.
    pub fn handle(&mut self, action: Action) -> Result<Vec<Effect>, SessionError> {
        log::debug!("{} <- {}", self.state.name(), action.name());
        match action {
            Action::OpenFolder(folder) => self.open_folder(folder),
            Action::ToggleOverlay => Ok(self.toggle_overlay()),
            Action::Resize { width, height } => Ok(self.resize(width, height)),
            Action::Undo => self.undo(),

            Action::Accept => self.accept(),
            Action::SelectOutcome(index) => self.select_outcome(index),
            Action::ToggleOutcome => self.select_outcome(1 - self.outcome),
            Action::Skip => self.skip(),
            Action::OpenEditor => self.open_editor(),

            Action::PointerPress { x, y } => self.pointer_press(x, y),
            Action::PointerDrag { x, y } => self.pointer_drag(x, y),
            Action::PointerRelease { x, y } => self.pointer_release(x, y),
            Action::CancelDrag => self.cancel_drag(),
            Action::DeleteSelected => self.delete_selected(),
            Action::EditSelectedLabel => self.edit_selected_label(),
            Action::SubmitLabel(label) => self.submit_label(label),
            Action::SaveEditor => self.save_editor(),
            Action::CancelEditor => self.cancel_editor(),
        }
    }

    fn require_ready(&self, action: &'static str) -> Result<(), SessionError> {
        match self.state {
            SessionState::Ready => Ok(()),
            SessionState::Idle => Err(SessionError::NoFolderOpen),
            _ => Err(SessionError::invalid_transition(action, self.state.name())),
        }
    }

    fn editor_mut(&mut self, action: &'static str) -> Result<&mut Editor, SessionError> {
        match &mut self.state {
            SessionState::Editing(editor) => Ok(editor),
            SessionState::Idle => Err(SessionError::NoFolderOpen),
            other => Err(SessionError::invalid_transition(action, other.name())),
        }
    }

    /// Editor that is not waiting for a label.
    fn free_editor_mut(&mut self, action: &'static str) -> Result<&mut Editor, SessionError> {
        let editor = self.editor_mut(action)?;
        if editor.prompt.is_some() {
            return Err(SessionError::invalid_transition(action, "waiting for a label"));
        }
        Ok(editor)
    }

    // ------------------------------------------------------------------------
    // Folder and cursor
    // ------------------------------------------------------------------------

    fn open_folder(&mut self, folder: PathBuf) -> Result<Vec<Effect>, SessionError> {
        if self.is_editing() {
            return Err(SessionError::invalid_transition("open folder", self.state.name()));
        }

        let project = ProjectState::from_folder(&folder).map_err(|source| {
            SessionError::FolderUnreadable {
                path: folder.clone(),
                source,
            }
        })?;
        mover::ensure_buckets(&folder, self.buckets.iter().map(String::as_str)).map_err(
            |source| SessionError::FolderUnreadable {
                path: folder.clone(),
                source,
            },
        )?;

        log::info!("Opened {:?} with {} images", folder, project.len());
        let mut effects = vec![Effect::FolderOpened {
            folder,
            images: project.len(),
        }];

        self.project = Some(project);
        self.history = HistoryStack::with_config(HistoryConfig {
            max_history: self.history_limit,
        });
        self.outcome = 0;
        effects.extend(self.load_current());
        Ok(effects)
    }

    /// Load the image under the cursor and settle into `Ready` or `Exhausted`.
    ///
    /// Images that cannot be decoded are skipped with a notice.
    fn load_current(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        let Some(project) = self.project.as_mut() else {
            return effects;
        };

        loop {
            let Some(item) = project.current() else {
                self.store = BoxStore::new();
                self.image_size = None;
                self.state = SessionState::Exhausted;
                log::info!("All images handled");
                effects.push(Effect::Exhausted);
                return effects;
            };

            // A full decode, so a truncated body is caught along with a bad header
            match image::open(item.path()).map(|img| (img.width(), img.height())) {
                Ok(size) => {
                    self.image_size = Some(size);
                    self.store = BoxStore::from_set(format::load(&item.sidecar_path()));
                    self.state = SessionState::Ready;
                    log::debug!(
                        "Loaded {:?} ({}x{}, {} boxes)",
                        item.path(),
                        size.0,
                        size.1,
                        self.store.len()
                    );
                    return effects;
                }
                Err(e) => {
                    let error = SessionError::ImageDecodeFailed {
                        path: item.path().to_path_buf(),
                        message: e.to_string(),
                    };
                    log::warn!("{}", error);
                    effects.push(Effect::Notice(error.to_string()));
                    effects.push(Effect::Skipped(item.path().to_path_buf()));
                    project.remove_current();
                }
            }
        }
    }

    fn accept(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.require_ready("accept")?;
        let project = self.project.as_mut().ok_or(SessionError::NoFolderOpen)?;
        let item = project
            .current()
            .cloned()
            .ok_or_else(|| SessionError::invalid_transition("accept", "exhausted"))?;
        let previous_cursor_index = project.current_index();
        let bucket = self.buckets[self.outcome].clone();

        let result = mover::move_pair(&item, &project.folder, &bucket)?;
        project.remove_current();

        let mut effects = vec![Effect::Moved {
            image: item.path().to_path_buf(),
            bucket,
            sidecar_moved: result.moved.sidecar_moved(),
        }];
        if let Some(warning) = result.sidecar_error {
            effects.push(Effect::Notice(warning.to_string()));
        }
        self.history.push(HistoryEntry::ClassifyMove {
            moved: result.moved,
            previous_cursor_index,
        });

        effects.extend(self.load_current());
        Ok(effects)
    }

    fn select_outcome(&mut self, index: usize) -> Result<Vec<Effect>, SessionError> {
        self.require_ready("select outcome")?;
        self.outcome = index.min(1);
        log::debug!("Outcome: {}", self.outcome_bucket());
        Ok(vec![Effect::OutcomeSelected(self.outcome_bucket().to_string())])
    }

    fn skip(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.require_ready("skip")?;
        let project = self.project.as_mut().ok_or(SessionError::NoFolderOpen)?;
        let mut effects = Vec::new();
        if let Some(item) = project.remove_current() {
            log::debug!("Skipped {:?}", item.path());
            effects.push(Effect::Skipped(item.path().to_path_buf()));
        }
        effects.extend(self.load_current());
        Ok(effects)
    }

    fn undo(&mut self) -> Result<Vec<Effect>, SessionError> {
        match self.state {
            SessionState::Ready | SessionState::Exhausted => {}
            SessionState::Idle => return Err(SessionError::NoFolderOpen),
            SessionState::Editing(_) => {
                return Err(SessionError::invalid_transition("undo", self.state.name()));
            }
        }
        let project = self.project.as_mut().ok_or(SessionError::NoFolderOpen)?;

        let Some(undone) = undo_last(&mut self.history, project, &mut self.store)? else {
            return Ok(vec![Effect::Notice("Nothing to undo".to_string())]);
        };

        let mut effects = vec![Effect::Undone(undone.entry.description())];
        if let Some(warning) = undone.warning {
            effects.push(Effect::Notice(warning.to_string()));
        }
        effects.extend(self.load_current());
        Ok(effects)
    }

    fn toggle_overlay(&mut self) -> Vec<Effect> {
        self.overlay_visible = !self.overlay_visible;
        vec![Effect::OverlayToggled(self.overlay_visible)]
    }

    fn resize(&mut self, width: u32, height: u32) -> Vec<Effect> {
        self.viewport = DisplaySize::new(width.max(1) as f32, height.max(1) as f32);
        if let SessionState::Editing(editor) = &mut self.state {
            // Drag corners are in the old display space
            if editor.drawing.is_drawing() {
                editor.drawing = DrawingState::Idle;
            }
        }
        vec![Effect::Resized(self.display_or_viewport())]
    }

    // ------------------------------------------------------------------------
    // Editor
    // ------------------------------------------------------------------------

    fn open_editor(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.require_ready("open editor")?;
        self.store.select(None);
        self.store.clear_dirty();
        let prior = self.store.all();
        let boxes = prior.len();
        self.state = SessionState::Editing(Editor {
            prior,
            drawing: DrawingState::Idle,
            prompt: None,
        });
        Ok(vec![Effect::EditorOpened { boxes }])
    }

    fn pointer_press(&mut self, x: f32, y: f32) -> Result<Vec<Effect>, SessionError> {
        let display = self.display_or_viewport();
        let hit = self.store.hit_test(x, y, display);
        let editor = self.free_editor_mut("press")?;

        editor.drawing = match hit {
            Some(_) => DrawingState::Idle,
            None => DrawingState::begin(x, y),
        };
        let before = self.store.selected();
        self.store.select(hit);
        if before == hit {
            Ok(Vec::new())
        } else {
            Ok(vec![Effect::BoxSelected(hit)])
        }
    }

    fn pointer_drag(&mut self, x: f32, y: f32) -> Result<Vec<Effect>, SessionError> {
        let editor = self.editor_mut("drag")?;
        editor.drawing.update(x, y);
        Ok(Vec::new())
    }

    fn pointer_release(&mut self, x: f32, y: f32) -> Result<Vec<Effect>, SessionError> {
        let display = self.display_or_viewport();
        let editor = self.editor_mut("release")?;
        if !editor.drawing.is_drawing() {
            return Ok(Vec::new());
        }

        editor.drawing.update(x, y);
        let drawing = mem::take(&mut editor.drawing);
        if !drawing.spans_minimum(display) {
            log::debug!("Drag below the minimum span discarded");
            return Ok(vec![Effect::DragDiscarded]);
        }
        let Some((x1, y1, x2, y2)) = drawing.corners() else {
            return Ok(Vec::new());
        };

        editor.prompt = Some(LabelPrompt::NewBox(to_normalized(x1, y1, x2, y2, display)));
        Ok(vec![Effect::PromptLabel { current: None }])
    }

    fn cancel_drag(&mut self) -> Result<Vec<Effect>, SessionError> {
        let editor = self.editor_mut("cancel drag")?;
        let pending_box = matches!(editor.prompt, Some(LabelPrompt::NewBox(_)));
        if !editor.drawing.is_drawing() && !pending_box {
            return Ok(Vec::new());
        }
        editor.drawing = DrawingState::Idle;
        if pending_box {
            editor.prompt = None;
        }
        Ok(vec![Effect::DragCancelled])
    }

    fn delete_selected(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.free_editor_mut("delete box")?;
        let index = self.store.selected();
        match (index, self.store.remove_selected()) {
            (Some(index), Some(_)) => Ok(vec![Effect::BoxDeleted(index)]),
            _ => Ok(Vec::new()),
        }
    }

    fn edit_selected_label(&mut self) -> Result<Vec<Effect>, SessionError> {
        let selected = self.store.selected();
        let current = self.store.selected_box().map(|b| b.label.clone());
        let editor = self.free_editor_mut("relabel box")?;
        let Some(index) = selected else {
            return Ok(vec![Effect::Notice("No box selected".to_string())]);
        };
        editor.prompt = Some(LabelPrompt::Relabel(index));
        Ok(vec![Effect::PromptLabel { current }])
    }

    /// Answer the label prompt. A blank or cancelled answer drops the pending
    /// edit and fails with [`SessionError::EmptyLabelInput`].
    fn submit_label(&mut self, label: Option<String>) -> Result<Vec<Effect>, SessionError> {
        let editor = self.editor_mut("label")?;
        let prompt = editor
            .prompt
            .take()
            .ok_or_else(|| SessionError::invalid_transition("label", "no label is asked for"))?;

        let Some(label) = label.as_deref().and_then(clean_label) else {
            log::debug!("Label prompt answered blank, edit discarded");
            return Err(SessionError::EmptyLabelInput);
        };

        match prompt {
            LabelPrompt::NewBox(rect) => {
                let index = self.store.add(BoundingBox::from_rect(label, rect));
                Ok(vec![Effect::BoxAdded(index)])
            }
            LabelPrompt::Relabel(index) => {
                if self.store.update_label(index, label) {
                    Ok(vec![Effect::BoxRelabeled(index)])
                } else {
                    Ok(Vec::new())
                }
            }
        }
    }

    fn save_editor(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.free_editor_mut("save editor")?;
        let image_path = self
            .project
            .as_ref()
            .and_then(ProjectState::current)
            .map(|item| item.path().to_path_buf())
            .ok_or(SessionError::NoFolderOpen)?;
        let sidecar = format::sidecar_path(&image_path);

        let outcome = format::save(&sidecar, self.store.boxes())?;

        let SessionState::Editing(editor) = mem::replace(&mut self.state, SessionState::Ready)
        else {
            return Err(SessionError::invalid_transition("save editor", "not editing"));
        };
        self.history.push(HistoryEntry::AnnotationCommit {
            image_path,
            prior_annotations: editor.prior,
        });
        self.store.select(None);
        self.store.clear_dirty();

        let mut effects = Vec::new();
        match outcome {
            SaveOutcome::Written => effects.push(Effect::SidecarWritten(sidecar)),
            SaveOutcome::Removed => effects.push(Effect::SidecarRemoved(sidecar)),
            SaveOutcome::Absent => {}
        }
        effects.push(Effect::EditorClosed { saved: true });
        Ok(effects)
    }

    fn cancel_editor(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.editor_mut("cancel editor")?;
        let SessionState::Editing(editor) = mem::replace(&mut self.state, SessionState::Ready)
        else {
            return Err(SessionError::invalid_transition("cancel editor", "not editing"));
        };
        if self.store.is_dirty() {
            log::debug!("Discarding unsaved box changes");
        }
        self.store = BoxStore::from_set(editor.prior);
        Ok(vec![Effect::EditorClosed { saved: false }])
    }
}

/// Trim a label and join inner whitespace with `_` so it stays one field on
/// a sidecar line. Blank labels yield `None`.
fn clean_label(label: &str) -> Option<String> {
    let parts: Vec<&str> = label.split_whitespace().collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("_"))
    }
}

// ============================================================================
// Tests
// ============================================================================
