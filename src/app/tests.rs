use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::command::Command;
use crate::editor::{Direction, Edit};
use crate::gateway::{MemoryGateway, SaveWorker};
use crate::pane::Pane;
use crate::session::SessionConfig;

use super::event_loop::ResizeDebouncer;
use super::input::byte_col_for_display;
use super::{App, Message, Model, Prompt, PromptKind, ToastLevel, update, update_at};

fn create_test_model() -> Model {
    Model::new(SessionConfig::default(), (80, 24))
}

fn model_with(text: &str) -> Model {
    let mut model = create_test_model();
    model.session.edit(text, Instant::now());
    model.session.buffer_mut().move_to_start();
    model.refresh_preview();
    model
}

fn create_long_test_model() -> Model {
    let text = (1..=100)
        .map(|i| format!("Paragraph {i} of content."))
        .collect::<Vec<_>>()
        .join("\n\n");
    model_with(&text)
}

fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent::new(code, modifiers)
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

fn app_with(gateway: &Arc<MemoryGateway>) -> App {
    App::new().with_gateway(gateway.clone())
}

fn wait_for_saves(model: &mut Model, worker: &mut SaveWorker) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while worker.in_flight() > 0 {
        App::drain_save_completions(model, worker);
        assert!(Instant::now() < deadline, "save worker did not answer");
        std::thread::sleep(Duration::from_millis(5));
    }
}

// Editing

#[test]
fn test_typing_marks_dirty_and_schedules_render() {
    let t0 = Instant::now();
    let model = update_at(create_test_model(), Message::Edit(Edit::InsertChar('#')), t0);

    assert!(model.session.is_dirty());
    assert_eq!(model.session.buffer().text(), "#");
    assert_eq!(model.session.next_deadline(), Some(t0 + SessionConfig::default().render_delay));
}

#[test]
fn test_render_due_refreshes_preview() {
    let mut model = create_test_model();
    model.session.edit("# Hello", Instant::now());
    assert!(model.preview.current().is_placeholder());

    let model = update(model, Message::RenderDue);

    assert!(!model.preview.current().is_placeholder());
    assert!(model.preview.current().html().contains("<h1>Hello</h1>"));
    assert!(!model.preview_rows.is_empty());
}

#[test]
fn test_cursor_moves_keep_cursor_visible() {
    let model = create_long_test_model();
    let model = update(model, Message::MoveToEnd);
    let line_count = model.session.buffer().line_count();
    assert_eq!(model.editor_offset, line_count - model.viewport_rows());

    let model = update(model, Message::MoveToStart);
    assert_eq!(model.editor_offset, 0);
}

#[test]
fn test_page_down_moves_cursor_one_screen() {
    let model = update(create_long_test_model(), Message::PageDown);
    assert_eq!(model.session.buffer().cursor().line, model.viewport_rows());
}

#[test]
fn test_move_cursor_up_at_top_is_noop() {
    let model = update(model_with("abc"), Message::MoveCursor(Direction::Up));
    assert_eq!(model.session.buffer().cursor().line, 0);
}

// Scroll sync

#[test]
fn test_editor_scroll_moves_preview_proportionally() {
    let t0 = Instant::now();
    let model = update_at(create_long_test_model(), Message::ScrollEditor(30), t0);

    assert_eq!(model.editor_offset, 30);
    let expected = model
        .metrics(Pane::Preview)
        .offset_for_ratio(model.metrics(Pane::Editor).ratio());
    assert!(expected > 0);
    assert_eq!(model.preview_offset, expected);
}

#[test]
fn test_preview_scroll_inside_window_does_not_move_editor() {
    let t0 = Instant::now();
    let model = update_at(create_long_test_model(), Message::ScrollEditor(30), t0);
    let preview_before = model.preview_offset;

    let model = update_at(model, Message::ScrollPreview(5), t0 + Duration::from_millis(10));

    assert_eq!(model.preview_offset, preview_before + 5);
    assert_eq!(model.editor_offset, 30);
}

#[test]
fn test_preview_scroll_after_window_drives_editor() {
    let t0 = Instant::now();
    let model = update_at(create_long_test_model(), Message::ScrollEditor(30), t0);

    let model = update_at(model, Message::ScrollPreview(10), t0 + Duration::from_millis(100));

    let expected = model
        .metrics(Pane::Editor)
        .offset_for_ratio(model.metrics(Pane::Preview).ratio());
    assert_eq!(model.editor_offset, expected);
}

#[test]
fn test_scroll_is_clamped_to_content() {
    let model = update(model_with("short"), Message::ScrollEditor(50));
    assert_eq!(model.editor_offset, 0);
    assert_eq!(model.preview_offset, 0);
}

// Pane split

#[test]
fn test_divider_drag_resizes_panes() {
    let model = create_long_test_model();
    let divider = model.layout().divider.unwrap().x;

    let model = update(model, Message::DividerDragStart(divider));
    assert!(model.split.is_dragging());
    let model = update(model, Message::DividerDrag(20));
    let model = update(model, Message::DividerDragEnd);

    assert!(!model.split.is_dragging());
    assert!((model.split.percent() - 25.0).abs() < f64::EPSILON);
    assert_eq!(model.layout().editor.width, 20);
}

#[test]
fn test_drag_without_grabbing_divider_is_ignored() {
    let model = update(create_test_model(), Message::DividerDragStart(3));
    let model = update(model, Message::DividerDrag(10));
    assert!((model.split.percent() - 50.0).abs() < f64::EPSILON);
}

#[test]
fn test_toggle_preview_reflows_to_full_width() {
    let model = model_with(&"word ".repeat(30));
    let rows_split = model.preview_rows.len();

    let model = update(model, Message::Command(Command::TogglePreview));

    assert!(model.split.is_preview_only());
    assert_eq!(model.layout().preview.width, 80);
    assert!(model.preview_rows.len() < rows_split);

    let model = update(model, Message::Command(Command::TogglePreview));
    assert!(!model.split.is_preview_only());
    assert_eq!(model.preview_rows.len(), rows_split);
}

#[test]
fn test_resize_rewraps_preview() {
    let model = model_with(&"word ".repeat(30));
    let rows_wide = model.preview_rows.len();
    let model = update(model, Message::Resize(40, 24));
    assert!(model.preview_rows.len() > rows_wide);
}

// Commands and prompts

#[test]
fn test_about_toggles() {
    let model = update(create_test_model(), Message::Command(Command::About));
    assert!(model.about_visible);
    let model = update(model, Message::HideAbout);
    assert!(!model.about_visible);
}

#[test]
fn test_save_as_opens_prompt_with_suggestion() {
    let model = update(create_test_model(), Message::Command(Command::SaveAs));
    assert_eq!(
        model.prompt,
        Some(Prompt::new(PromptKind::SaveAs, "untitled.md"))
    );
}

#[test]
fn test_prompt_editing_and_cancel() {
    let mut model = create_test_model();
    model.prompt = Some(Prompt::new(PromptKind::Open, "a"));

    let model = update(model, Message::PromptInput('b'));
    let model = update(model, Message::PromptInput('c'));
    let model = update(model, Message::PromptBackspace);
    assert_eq!(model.prompt.as_ref().map(|p| p.input.as_str()), Some("ab"));

    let model = update(model, Message::PromptCancel);
    assert!(model.prompt.is_none());
}

#[test]
fn test_rename_unsaved_document_shows_info() {
    let model = update(model_with("text"), Message::Command(Command::Rename));
    assert!(model.prompt.is_none());
    assert_eq!(
        model.active_toast(),
        Some(("Save the document before renaming it", ToastLevel::Info))
    );
}

#[test]
fn test_rename_saved_document_prompts_with_file_name() {
    let mut model = create_test_model();
    model
        .session
        .open(PathBuf::from("docs/notes.md"), "text", Instant::now());
    let model = update(model, Message::Command(Command::Rename));
    assert_eq!(model.prompt, Some(Prompt::new(PromptKind::Rename, "notes.md")));
}

#[test]
fn test_open_prompt_starts_in_current_directory() {
    let mut model = create_test_model();
    model
        .session
        .open(PathBuf::from("docs/notes.md"), "text", Instant::now());
    let model = update(model, Message::Command(Command::Open));
    let expected = format!("docs{}", std::path::MAIN_SEPARATOR);
    assert_eq!(model.prompt, Some(Prompt::new(PromptKind::Open, expected)));
}

// Quit

#[test]
fn test_quit_sets_should_quit() {
    let model = update(create_test_model(), Message::Command(Command::Quit));
    assert!(model.should_quit);
}

#[test]
fn test_quit_with_unsaved_changes_asks_again() {
    let model = update(model_with("draft"), Message::Command(Command::Quit));
    assert!(!model.should_quit);
    assert!(model.quit_confirmed);
    assert_eq!(model.active_toast().map(|(_, level)| level), Some(ToastLevel::Warning));

    let model = update(model, Message::Command(Command::Quit));
    assert!(model.should_quit);
}

#[test]
fn test_other_input_disarms_quit() {
    let model = update(model_with("draft"), Message::Command(Command::Quit));
    let model = update(model, Message::MoveCursor(Direction::Right));
    assert!(!model.quit_confirmed);
    let model = update(model, Message::Command(Command::Quit));
    assert!(!model.should_quit);
}

#[test]
fn test_save_keeps_quit_armed() {
    let model = update(model_with("draft"), Message::Command(Command::Quit));
    let model = update(model, Message::Command(Command::Save));
    assert!(model.quit_confirmed);
}

// Side effects

#[test]
fn test_save_writes_through_worker_and_clears_dirty() {
    let gateway = Arc::new(MemoryGateway::new().with_file("notes.md", "old"));
    let app = app_with(&gateway);
    let mut worker = SaveWorker::spawn(gateway.clone()).unwrap();
    let mut model = create_test_model();
    app.open_file(&mut model, PathBuf::from("notes.md"));

    app.dispatch(&mut model, &mut worker, Message::Edit(Edit::InsertChar('x')));
    assert!(model.session.is_dirty());
    app.dispatch(&mut model, &mut worker, Message::Command(Command::Save));
    wait_for_saves(&mut model, &mut worker);

    assert!(!model.session.is_dirty());
    assert_eq!(gateway.contents(Path::new("notes.md")).as_deref(), Some("xold"));
    assert_eq!(model.active_toast(), Some(("Saved notes.md", ToastLevel::Info)));
}

#[test]
fn test_save_unsaved_document_goes_through_save_as() {
    let gateway = Arc::new(MemoryGateway::new());
    let app = app_with(&gateway);
    let mut worker = SaveWorker::spawn(gateway.clone()).unwrap();
    let mut model = model_with("fresh");

    app.dispatch(&mut model, &mut worker, Message::Command(Command::Save));
    assert_eq!(model.prompt.as_ref().map(|p| p.kind), Some(PromptKind::SaveAs));
    assert_eq!(worker.in_flight(), 0);

    model.prompt = Some(Prompt::new(PromptKind::SaveAs, "draft.md"));
    app.dispatch(&mut model, &mut worker, Message::PromptSubmit);
    wait_for_saves(&mut model, &mut worker);

    assert!(model.prompt.is_none());
    assert_eq!(model.session.path(), Some(Path::new("draft.md")));
    assert!(!model.session.is_dirty());
    assert_eq!(gateway.contents(Path::new("draft.md")).as_deref(), Some("fresh"));
}

#[test]
fn test_canceled_save_as_writes_nothing() {
    let gateway = Arc::new(MemoryGateway::new());
    let app = app_with(&gateway);
    let mut worker = SaveWorker::spawn(gateway.clone()).unwrap();
    let mut model = model_with("fresh");

    app.dispatch(&mut model, &mut worker, Message::Command(Command::SaveAs));
    app.dispatch(&mut model, &mut worker, Message::PromptCancel);

    assert_eq!(worker.in_flight(), 0);
    assert!(model.session.is_dirty());
    assert!(model.session.path().is_none());
    assert!(model.active_toast().is_none());
}

#[test]
fn test_failed_save_keeps_dirty_and_shows_error() {
    let gateway = Arc::new(MemoryGateway::new().with_file("notes.md", "old"));
    gateway.fail_writes(true);
    let app = app_with(&gateway);
    let mut worker = SaveWorker::spawn(gateway.clone()).unwrap();
    let mut model = create_test_model();
    app.open_file(&mut model, PathBuf::from("notes.md"));

    app.dispatch(&mut model, &mut worker, Message::Edit(Edit::InsertChar('x')));
    app.dispatch(&mut model, &mut worker, Message::Command(Command::Save));
    wait_for_saves(&mut model, &mut worker);

    assert!(model.session.is_dirty());
    assert_eq!(model.session.buffer().text(), "xold");
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert!(message.starts_with("Failed to save file"), "got {message:?}");
}

#[test]
fn test_edit_during_save_keeps_dirty() {
    let gateway = Arc::new(MemoryGateway::new().with_file("notes.md", "old"));
    let app = app_with(&gateway);
    let mut worker = SaveWorker::spawn(gateway.clone()).unwrap();
    let mut model = create_test_model();
    app.open_file(&mut model, PathBuf::from("notes.md"));

    app.dispatch(&mut model, &mut worker, Message::Edit(Edit::InsertChar('a')));
    app.dispatch(&mut model, &mut worker, Message::Command(Command::Save));
    app.dispatch(&mut model, &mut worker, Message::Edit(Edit::InsertChar('b')));
    wait_for_saves(&mut model, &mut worker);

    assert!(model.session.is_dirty());
    assert_eq!(gateway.contents(Path::new("notes.md")).as_deref(), Some("aold"));
}

#[test]
fn test_autosave_writes_silently() {
    let gateway = Arc::new(MemoryGateway::new().with_file("notes.md", "old"));
    let app = app_with(&gateway);
    let mut worker = SaveWorker::spawn(gateway.clone()).unwrap();
    let mut model = create_test_model();
    app.open_file(&mut model, PathBuf::from("notes.md"));

    app.dispatch(&mut model, &mut worker, Message::Edit(Edit::InsertChar('x')));
    app.dispatch(&mut model, &mut worker, Message::AutoSaveDue);
    wait_for_saves(&mut model, &mut worker);

    assert!(!model.session.is_dirty());
    assert_eq!(gateway.write_count(), 1);
    assert!(model.active_toast().is_none());
}

#[test]
fn test_open_prompt_loads_file() {
    let gateway = Arc::new(MemoryGateway::new().with_file("other.md", "# Other"));
    let app = app_with(&gateway);
    let mut worker = SaveWorker::spawn(gateway.clone()).unwrap();
    let mut model = model_with("current");

    app.dispatch(&mut model, &mut worker, Message::Command(Command::Open));
    model.prompt = Some(Prompt::new(PromptKind::Open, "  other.md "));
    app.dispatch(&mut model, &mut worker, Message::PromptSubmit);

    assert_eq!(model.session.path(), Some(Path::new("other.md")));
    assert_eq!(model.session.buffer().text(), "# Other");
    assert!(!model.session.is_dirty());
    assert!(model.preview.current().html().contains("<h1>Other</h1>"));
}

#[test]
fn test_open_missing_file_shows_error_and_keeps_buffer() {
    let gateway = Arc::new(MemoryGateway::new());
    let app = app_with(&gateway);
    let mut worker = SaveWorker::spawn(gateway.clone()).unwrap();
    let mut model = model_with("current");

    model.prompt = Some(Prompt::new(PromptKind::Open, "missing.md"));
    app.dispatch(&mut model, &mut worker, Message::PromptSubmit);

    assert_eq!(model.session.buffer().text(), "current");
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert!(message.starts_with("Failed to open file"));
}

#[test]
fn test_rename_prompt_moves_file() {
    let gateway = Arc::new(MemoryGateway::new().with_file("notes.md", "text"));
    let app = app_with(&gateway);
    let mut worker = SaveWorker::spawn(gateway.clone()).unwrap();
    let mut model = create_test_model();
    app.open_file(&mut model, PathBuf::from("notes.md"));

    app.dispatch(&mut model, &mut worker, Message::Command(Command::Rename));
    model.prompt = Some(Prompt::new(PromptKind::Rename, "ideas"));
    app.dispatch(&mut model, &mut worker, Message::PromptSubmit);

    assert_eq!(model.session.path(), Some(Path::new("ideas.md")));
    assert_eq!(gateway.contents(Path::new("ideas.md")).as_deref(), Some("text"));
    assert_eq!(model.active_toast(), Some(("Renamed to ideas.md", ToastLevel::Info)));
}

#[test]
fn test_rename_to_existing_file_fails() {
    let gateway = Arc::new(
        MemoryGateway::new()
            .with_file("notes.md", "text")
            .with_file("taken.md", "other"),
    );
    let app = app_with(&gateway);
    let mut worker = SaveWorker::spawn(gateway.clone()).unwrap();
    let mut model = create_test_model();
    app.open_file(&mut model, PathBuf::from("notes.md"));

    model.prompt = Some(Prompt::new(PromptKind::Rename, "taken.md"));
    app.dispatch(&mut model, &mut worker, Message::PromptSubmit);

    assert_eq!(model.session.path(), Some(Path::new("notes.md")));
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert!(message.starts_with("Rename failed"));
}

#[test]
fn test_rename_waits_for_pending_save() {
    let gateway = Arc::new(MemoryGateway::new().with_file("notes.md", "text"));
    let app = app_with(&gateway);
    let mut worker = SaveWorker::spawn(gateway.clone()).unwrap();
    let mut model = create_test_model();
    app.open_file(&mut model, PathBuf::from("notes.md"));

    app.dispatch(&mut model, &mut worker, Message::Edit(Edit::InsertChar('a')));
    app.dispatch(&mut model, &mut worker, Message::Command(Command::Save));
    model.prompt = Some(Prompt::new(PromptKind::Rename, "ideas"));
    app.dispatch(&mut model, &mut worker, Message::PromptSubmit);

    assert_eq!(model.session.path(), Some(Path::new("notes.md")));
    assert_eq!(
        model.active_toast(),
        Some(("Wait for the save to finish before renaming", ToastLevel::Warning))
    );

    wait_for_saves(&mut model, &mut worker);
    assert!(!model.session.is_dirty());
    assert!(gateway.contents(Path::new("ideas.md")).is_none());
}

// Input mapping

#[test]
fn test_keys_map_to_commands_and_edits() {
    let model = create_test_model();
    assert_eq!(
        App::handle_key(key(KeyCode::Char('s'), KeyModifiers::CONTROL), &model),
        Some(Message::Command(Command::Save))
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Char('a'), KeyModifiers::NONE), &model),
        Some(Message::Edit(Edit::InsertChar('a')))
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Enter, KeyModifiers::NONE), &model),
        Some(Message::Edit(Edit::SplitLine))
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Left, KeyModifiers::CONTROL), &model),
        Some(Message::MoveWordLeft)
    );
}

#[test]
fn test_keys_go_to_prompt_when_open() {
    let mut model = create_test_model();
    model.prompt = Some(Prompt::new(PromptKind::SaveAs, ""));
    assert_eq!(
        App::handle_key(key(KeyCode::Char('a'), KeyModifiers::NONE), &model),
        Some(Message::PromptInput('a'))
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Esc, KeyModifiers::NONE), &model),
        Some(Message::PromptCancel)
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Char('s'), KeyModifiers::CONTROL), &model),
        None
    );
}

#[test]
fn test_keys_scroll_preview_when_editor_hidden() {
    let mut model = create_test_model();
    model.split.set_preview_only(true);
    assert_eq!(
        App::handle_key(key(KeyCode::Down, KeyModifiers::NONE), &model),
        Some(Message::ScrollPreview(1))
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Char('a'), KeyModifiers::NONE), &model),
        None
    );
}

#[test]
fn test_mouse_down_on_divider_starts_drag() {
    let model = create_test_model();
    let divider = model.layout().divider.unwrap().x;
    assert_eq!(
        App::handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), divider, 5), &model),
        Some(Message::DividerDragStart(divider))
    );
}

#[test]
fn test_mouse_drag_only_while_dragging() {
    let mut model = create_test_model();
    let drag = mouse(MouseEventKind::Drag(MouseButton::Left), 30, 5);
    assert_eq!(App::handle_mouse(drag, &model), None);

    let divider = model.layout().divider.unwrap().x;
    let area = model.pane_area();
    model.split.begin_drag(divider, area);
    assert_eq!(App::handle_mouse(drag, &model), Some(Message::DividerDrag(30)));
}

#[test]
fn test_mouse_wheel_targets_pane_under_pointer() {
    let model = create_test_model();
    let layout = model.layout();
    assert_eq!(
        App::handle_mouse(mouse(MouseEventKind::ScrollDown, 2, 3), &model),
        Some(Message::ScrollEditor(3))
    );
    assert_eq!(
        App::handle_mouse(mouse(MouseEventKind::ScrollUp, layout.preview.x + 2, 3), &model),
        Some(Message::ScrollPreview(-3))
    );
}

#[test]
fn test_click_in_editor_places_cursor() {
    let model = model_with("first\nsecond line");
    // Gutter is two columns wide, so column 5 lands on the 'o' of "second".
    assert_eq!(
        App::handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 5, 1), &model),
        Some(Message::MoveTo(1, 3))
    );
}

#[test]
fn test_byte_col_for_display_handles_wide_chars() {
    assert_eq!(byte_col_for_display("abc", 1), 1);
    assert_eq!(byte_col_for_display("abc", 10), 3);
    assert_eq!(byte_col_for_display("日本", 2), 3);
    assert_eq!(byte_col_for_display("日本", 1), 0);
}

#[test]
fn test_resize_debouncer_waits_for_quiet_period() {
    let t0 = Instant::now();
    let mut debouncer = ResizeDebouncer::new(Duration::from_millis(50));
    debouncer.queue(100, 40, t0);
    assert!(debouncer.is_pending());
    assert_eq!(debouncer.take_ready(t0 + Duration::from_millis(10)), None);
    debouncer.queue(120, 40, t0 + Duration::from_millis(20));
    assert_eq!(
        debouncer.take_ready(t0 + Duration::from_millis(80)),
        Some((120, 40))
    );
    assert!(!debouncer.is_pending());
}
