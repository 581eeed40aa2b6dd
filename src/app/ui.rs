use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{prelude::*, widgets::*};
use std::io;
use std::time::Duration;

use crate::app::api::{ApiClient, ApiError};
use crate::app::board::Board;
use crate::app::format::{clean_text, format_created_at};
use crate::app::models::{NewTask, Priority, Status, Task};
use crate::app::notify::{Notice, NoticeKind};
use crate::app::task_form::{get_task_form_ui, TaskFormState};

// A user intent waiting for its network round trip. Key handling only ever
// enqueues one of these; the event loop first draws a frame with the
// loading overlay, then executes the action, then clears the overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Refresh,
    Create(NewTask),
    SetStatus { id: i64, status: Status },
    Delete { id: i64 },
}

pub struct App {
    pub board: Board,
    pub form: TaskFormState,
    pub notice: Option<Notice>,
    pub pending: Option<Action>,
    pub loading: bool,
    // Delete asks for confirmation first; holds the target's id and title.
    confirm_delete: Option<(i64, String)>,
    selected_column: usize,
    selected_row: usize,
}

impl App {
    // The board starts empty with one queued Refresh, so the first frames
    // show the loading overlay while the initial list call runs.
    pub fn new() -> App {
        App {
            board: Board::new(),
            form: TaskFormState::default(),
            notice: None,
            pending: Some(Action::Refresh),
            loading: true,
            confirm_delete: None,
            selected_column: 0,
            selected_row: 0,
        }
    }

    fn selected_status(&self) -> Status {
        Status::ALL[self.selected_column]
    }

    fn selected_task(&self) -> Option<&Task> {
        self.board
            .column(self.selected_status())
            .get(self.selected_row)
            .copied()
    }

    // Keep the selection inside the current column after anything that can
    // shrink it (refresh, delete, status move, filter change).
    fn clamp_selection(&mut self) {
        let len = self.board.column(self.selected_status()).len();
        self.selected_row = self.selected_row.min(len.saturating_sub(1));
    }

    fn enqueue(&mut self, action: Action) {
        self.pending = Some(action);
        self.loading = true;
    }

    // Execute a queued action against the server and reconcile the board.
    // Only success paths touch the board; a failure raises a notice and
    // leaves the collection exactly as it was.
    pub fn perform(&mut self, api: &ApiClient, action: Action) {
        match action {
            Action::Refresh => {
                self.refresh(api);
            }
            Action::Create(input) => match api.create_task(&input) {
                Ok(()) => {
                    // Re-list for the authoritative collection with the
                    // server-assigned id and timestamp. When the re-list
                    // fails its error notice must stay visible, so the
                    // success notice is only raised after a clean refresh.
                    let refreshed = self.refresh(api);
                    self.apply_create_ok(refreshed);
                }
                Err(err) => self.apply_failure("Failed to create task", err),
            },
            Action::SetStatus { id, status } => match api.update_status(id, status) {
                Ok(()) => self.apply_set_status_ok(id, status),
                Err(err) => self.apply_failure("Failed to update status", err),
            },
            Action::Delete { id } => match api.delete_task(id) {
                Ok(()) => self.apply_delete_ok(id),
                Err(err) => self.apply_failure("Failed to delete task", err),
            },
        }
    }

    // Pull the full collection from the server. Reports whether it
    // succeeded so callers can tell a fresh board from a stale one.
    fn refresh(&mut self, api: &ApiClient) -> bool {
        match api.list_tasks() {
            Ok(tasks) => {
                self.apply_refresh(tasks);
                true
            }
            Err(err) => {
                self.apply_failure("Failed to load tasks", err);
                false
            }
        }
    }

    fn apply_refresh(&mut self, tasks: Vec<Task>) {
        tracing::info!(count = tasks.len(), "task list refreshed");
        self.board.replace_all(tasks);
        self.clamp_selection();
    }

    // The form is reset either way: the server accepted the task. The
    // success notice is skipped after a failed re-list so the load error
    // stays on screen.
    fn apply_create_ok(&mut self, refreshed: bool) {
        tracing::info!("task created");
        self.form.reset();
        if refreshed {
            self.notice = Some(Notice::success("Task created successfully!"));
        }
    }

    fn apply_set_status_ok(&mut self, id: i64, status: Status) {
        tracing::info!(id, status = status.label(), "task status updated");
        self.board.set_status(id, status);
        self.clamp_selection();
        self.notice = Some(Notice::success("Task status updated!"));
    }

    fn apply_delete_ok(&mut self, id: i64) {
        tracing::info!(id, "task deleted");
        self.board.remove(id);
        self.clamp_selection();
        self.notice = Some(Notice::success("Task deleted successfully!"));
    }

    fn apply_failure(&mut self, fallback: &str, err: ApiError) {
        tracing::error!(error = %err, "{fallback}");
        let message = match err {
            // Server already carries its own message or the fallback.
            ApiError::Server(message) => message,
            ApiError::Transport(_) => fallback.to_string(),
        };
        self.notice = Some(Notice::error(message));
    }

    // Handle one key press. Returns true when the app should exit.
    pub fn on_key(&mut self, code: KeyCode) -> bool {
        if self.form.active {
            self.on_form_key(code);
            return false;
        }
        if self.confirm_delete.is_some() {
            self.on_confirm_key(code);
            return false;
        }
        self.on_board_key(code)
    }

    fn on_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.form.reset(),
            KeyCode::Up => self.form.move_cursor_up(),
            KeyCode::Down => self.form.move_cursor_down(),
            KeyCode::Left => self.form.shift_priority(-1),
            KeyCode::Right => self.form.shift_priority(1),
            KeyCode::Backspace => self.form.delete_char(),
            KeyCode::Enter => match self.form.submit() {
                // The form stays open until the server accepts the task.
                Ok(input) => self.enqueue(Action::Create(input)),
                Err(message) => {
                    tracing::warn!(%message, "create form rejected locally");
                    self.notice = Some(Notice::error(message));
                }
            },
            KeyCode::Char(c) => self.form.input(c),
            _ => {}
        }
    }

    fn on_confirm_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some((id, _)) = self.confirm_delete.take() {
                    self.enqueue(Action::Delete { id });
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_delete = None;
            }
            _ => {}
        }
    }

    fn on_board_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('a') => self.form.open(),
            KeyCode::Char('r') => self.enqueue(Action::Refresh),
            KeyCode::Char('f') => {
                // Filter change is a pure re-render, no network call.
                self.board.cycle_filter();
                self.clamp_selection();
            }
            KeyCode::Char('x') => {
                if let Some(task) = self.selected_task() {
                    self.confirm_delete = Some((task.id, clean_text(&task.title)));
                }
            }
            KeyCode::Char('1') => self.move_selected_to(Status::Todo),
            KeyCode::Char('2') => self.move_selected_to(Status::InProgress),
            KeyCode::Char('3') => self.move_selected_to(Status::Done),
            KeyCode::Left => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Right => {
                if self.selected_column < Status::ALL.len() - 1 {
                    self.selected_column += 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Up => {
                self.selected_row = self.selected_row.saturating_sub(1);
            }
            KeyCode::Down => {
                let len = self.board.column(self.selected_status()).len();
                if self.selected_row + 1 < len {
                    self.selected_row += 1;
                }
            }
            _ => {}
        }
        false
    }

    // Move the selected task to the given status. A card only offers the
    // two statuses it is not in; asking for the current one does nothing.
    fn move_selected_to(&mut self, status: Status) {
        if let Some(task) = self.selected_task() {
            if task.status != status {
                let id = task.id;
                self.enqueue(Action::SetStatus { id, status });
            }
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    api: &ApiClient,
    tick_rate: Duration,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw_ui(f, &mut app))?;

        // The frame above was drawn with the loading overlay up, so the
        // overlay stays visible for the whole round trip. Clearing it here,
        // after perform returns on every path, is the guaranteed release.
        if let Some(action) = app.pending.take() {
            app.perform(api, action);
            app.loading = false;
            continue;
        }

        // Sweep expired notices on the tick.
        if app.notice.as_ref().is_some_and(|n| n.expired()) {
            app.notice = None;
        }

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.on_key(key.code) {
                    return Ok(());
                }
            }
        }
    }
}

// Draws the whole user interface.
fn draw_ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_columns(f, app, chunks[1]);
    draw_notice(f, app, chunks[2]);
    draw_footer(f, chunks[3]);

    if app.form.active {
        draw_form_dialog(f, app);
    }
    if let Some((_, title)) = &app.confirm_delete {
        draw_confirm_dialog(f, title);
    }
    if app.loading {
        draw_loading_overlay(f);
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let header = Line::from(vec![
        Span::styled(" Task Board ", Style::new().bold()),
        Span::raw("  filter: "),
        Span::styled(app.board.filter().label(), Style::new().fg(Color::Cyan)),
    ]);
    f.render_widget(Paragraph::new(header), area);
}

fn draw_columns(f: &mut Frame, app: &mut App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    for (i, status) in Status::ALL.iter().enumerate() {
        let selected_column = i == app.selected_column;
        let tasks = app.board.column(*status);
        let column_len = tasks.len();

        let items: Vec<ListItem> = if tasks.is_empty() {
            vec![ListItem::new(Line::styled(
                "No tasks",
                Style::new().fg(Color::DarkGray).italic(),
            ))]
        } else {
            tasks.into_iter().map(task_card).collect()
        };

        // Header count comes from the unfiltered collection on purpose:
        // the filter hides cards, never totals.
        let title = format!(" {} ({}) ", status.label(), app.board.count(*status));
        let list = List::new(items)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(if selected_column {
                        Style::new().fg(Color::Cyan)
                    } else {
                        Style::default()
                    }),
            )
            .highlight_style(Style::new().bg(Color::Rgb(40, 40, 40)).bold());

        let mut state = ListState::default();
        if selected_column && column_len > 0 {
            state.select(Some(app.selected_row));
        }
        f.render_stateful_widget(list, columns[i], &mut state);
    }
}

// Build the card for one task: title with priority badge, description when
// present, creation date, and the row of available actions.
fn task_card(task: &Task) -> ListItem<'static> {
    let priority_color = match task.priority {
        Priority::Low => Color::Green,
        Priority::Medium => Color::Yellow,
        Priority::High => Color::Red,
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(clean_text(&task.title), Style::new().bold()),
        Span::raw(" "),
        Span::styled(
            format!("[{}]", task.priority.label()),
            Style::new().fg(priority_color),
        ),
    ])];

    if !task.description.is_empty() {
        lines.push(Line::styled(
            clean_text(&task.description),
            Style::new().fg(Color::Gray),
        ));
    }

    lines.push(Line::styled(
        format!("Created: {}", format_created_at(task.created_at.as_deref())),
        Style::new().fg(Color::DarkGray),
    ));
    lines.push(Line::styled(
        action_hints(task.status),
        Style::new().fg(Color::DarkGray),
    ));
    lines.push(Line::raw(""));

    ListItem::new(lines)
}

// The action row lists exactly the two statuses the task is not in. The
// arrow direction just mirrors the board order; the key does the work.
fn action_hints(current: Status) -> String {
    let mut hints: Vec<String> = Status::ALL
        .iter()
        .filter(|target| **target != current)
        .map(|target| {
            let key = match target {
                Status::Todo => '1',
                Status::InProgress => '2',
                Status::Done => '3',
            };
            let glyph = if *target < current { '←' } else { '→' };
            format!("[{key}] {glyph} {}", target.label())
        })
        .collect();
    hints.push("[x] delete".to_string());
    hints.join("  ")
}

fn draw_notice(f: &mut Frame, app: &App, area: Rect) {
    if let Some(notice) = &app.notice {
        let style = match notice.kind {
            NoticeKind::Success => Style::new().fg(Color::Green),
            NoticeKind::Error => Style::new().fg(Color::Red),
        };
        f.render_widget(
            Paragraph::new(Line::styled(format!(" {}", notice.message), style)),
            area,
        );
    }
}

fn draw_footer(f: &mut Frame, area: Rect) {
    f.render_widget(
        Paragraph::new(Line::styled(
            " a add  x delete  1/2/3 move  f filter  r refresh  arrows select  q quit",
            Style::new().fg(Color::DarkGray),
        )),
        area,
    );
}

fn draw_form_dialog(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 9, f.area());
    f.render_widget(Clear, area);
    let dialog = Paragraph::new(get_task_form_ui(&app.form))
        .block(Block::default().title(" Add Task ").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(dialog, area);
}

fn draw_confirm_dialog(f: &mut Frame, title: &str) {
    let area = centered_rect(50, 5, f.area());
    f.render_widget(Clear, area);
    let dialog = Paragraph::new(vec![
        Line::raw(format!("Delete task \"{title}\"?")),
        Line::raw(""),
        Line::styled("y - delete, n - keep", Style::new().fg(Color::DarkGray)),
    ])
    .block(Block::default().title(" Confirm ").borders(Borders::ALL))
    .wrap(Wrap { trim: false });
    f.render_widget(dialog, area);
}

fn draw_loading_overlay(f: &mut Frame) {
    let area = centered_rect(20, 3, f.area());
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(Line::styled("Loading...", Style::new().bold()))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

// A fixed-height box centered in the given area, percentage-wide.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn task(id: i64, status: Status) -> Task {
        Task {
            id,
            title: format!("Task {id}"),
            description: String::new(),
            priority: Priority::Medium,
            status,
            created_at: None,
        }
    }

    fn app_with(tasks: Vec<Task>) -> App {
        let mut app = App::new();
        app.pending = None;
        app.loading = false;
        app.apply_refresh(tasks);
        app
    }

    #[test]
    fn a_new_app_queues_the_initial_load() {
        let app = App::new();
        assert_eq!(app.pending, Some(Action::Refresh));
        assert!(app.loading);

        let defaulted = App::default();
        assert_eq!(defaulted.pending, Some(Action::Refresh));
        assert!(defaulted.loading);
    }

    #[test]
    fn short_title_never_reaches_the_network() {
        let mut app = app_with(vec![]);
        app.on_key(KeyCode::Char('a'));
        app.on_key(KeyCode::Char('a'));
        app.on_key(KeyCode::Char('b'));
        app.on_key(KeyCode::Enter);

        assert_eq!(app.pending, None);
        assert!(!app.loading);
        let notice = app.notice.expect("local validation raises a notice");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "Task title must be at least 3 characters");
        assert!(app.form.active, "form stays open for a retry");
    }

    #[test]
    fn empty_title_raises_the_enter_a_title_notice() {
        let mut app = app_with(vec![]);
        app.on_key(KeyCode::Char('a'));
        app.on_key(KeyCode::Enter);

        assert_eq!(app.pending, None);
        assert_eq!(
            app.notice.unwrap().message,
            "Please enter a task title"
        );
    }

    #[test]
    fn valid_form_enqueues_a_create_action() {
        let mut app = app_with(vec![]);
        app.on_key(KeyCode::Char('a'));
        for c in "Fix the build".chars() {
            app.on_key(KeyCode::Char(c));
        }
        app.on_key(KeyCode::Enter);

        match app.pending {
            Some(Action::Create(ref input)) => assert_eq!(input.title, "Fix the build"),
            ref other => panic!("expected a queued create, got {other:?}"),
        }
        assert!(app.loading);
    }

    #[test]
    fn status_keys_target_the_two_other_columns_only() {
        let mut app = app_with(vec![task(1, Status::Todo)]);

        // Pressing the card's current status is a no-op.
        app.on_key(KeyCode::Char('1'));
        assert_eq!(app.pending, None);

        app.on_key(KeyCode::Char('2'));
        assert_eq!(
            app.pending,
            Some(Action::SetStatus {
                id: 1,
                status: Status::InProgress
            })
        );
    }

    #[test]
    fn delete_goes_through_the_confirmation_step() {
        let mut app = app_with(vec![task(1, Status::Todo)]);

        app.on_key(KeyCode::Char('x'));
        assert_eq!(app.pending, None, "no network call before confirmation");

        app.on_key(KeyCode::Char('y'));
        assert_eq!(app.pending, Some(Action::Delete { id: 1 }));
    }

    #[test]
    fn declining_the_confirmation_drops_the_delete() {
        let mut app = app_with(vec![task(1, Status::Todo)]);

        app.on_key(KeyCode::Char('x'));
        app.on_key(KeyCode::Char('n'));

        assert_eq!(app.pending, None);
        assert!(app.board.get(1).is_some());
    }

    #[test]
    fn filter_key_rerenders_without_a_network_call() {
        let mut app = app_with(vec![task(1, Status::Todo)]);
        app.on_key(KeyCode::Char('f'));

        assert_eq!(app.pending, None);
        assert_eq!(app.board.filter().label(), "To Do");
    }

    #[test]
    fn a_failure_leaves_the_collection_untouched() {
        let mut app = app_with(vec![task(1, Status::Todo), task(2, Status::Done)]);
        let before: Vec<Task> = app.board.tasks().to_vec();

        app.apply_failure(
            "Failed to update status",
            ApiError::Server("Task is locked".to_string()),
        );

        assert_eq!(app.board.tasks(), before.as_slice());
        let notice = app.notice.unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "Task is locked");
    }

    #[test]
    fn successful_status_update_patches_one_task_in_place() {
        let mut app = app_with(vec![task(1, Status::Todo), task(2, Status::Done)]);

        app.apply_set_status_ok(1, Status::InProgress);

        assert_eq!(app.board.get(1).unwrap().status, Status::InProgress);
        assert_eq!(app.board.get(2).unwrap().status, Status::Done);
        assert_eq!(app.board.tasks().len(), 2);
    }

    #[test]
    fn successful_delete_shrinks_the_collection_by_one() {
        let mut app = app_with(vec![task(1, Status::Todo), task(2, Status::Done)]);

        app.apply_delete_ok(1);

        assert_eq!(app.board.tasks().len(), 1);
        assert!(app.board.get(1).is_none());
    }

    #[test]
    fn create_success_resets_the_form() {
        let mut app = app_with(vec![]);
        app.on_key(KeyCode::Char('a'));
        for c in "abc".chars() {
            app.on_key(KeyCode::Char(c));
        }

        app.apply_create_ok(true);

        assert!(!app.form.active);
        assert_eq!(app.notice.unwrap().message, "Task created successfully!");
    }

    #[test]
    fn failed_relist_after_create_keeps_the_load_error_on_screen() {
        let mut app = app_with(vec![]);
        app.on_key(KeyCode::Char('a'));
        for c in "abc".chars() {
            app.on_key(KeyCode::Char(c));
        }

        // The sequence perform runs when the create round trip succeeds
        // but the follow-up list call does not.
        app.apply_failure(
            "Failed to load tasks",
            ApiError::Server("Failed to load tasks".to_string()),
        );
        app.apply_create_ok(false);

        assert!(!app.form.active, "the server accepted the task");
        let notice = app.notice.unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "Failed to load tasks");
    }

    #[test]
    fn selection_is_clamped_when_the_column_shrinks() {
        let mut app = app_with(vec![task(1, Status::Todo), task(2, Status::Todo)]);
        app.on_key(KeyCode::Down);
        assert_eq!(app.selected_row, 1);

        app.apply_delete_ok(2);
        assert_eq!(app.selected_row, 0);
    }

    #[test]
    fn action_hints_list_exactly_the_two_other_statuses() {
        assert_eq!(
            action_hints(Status::Todo),
            "[2] → In Progress  [3] → Done  [x] delete"
        );
        assert_eq!(
            action_hints(Status::InProgress),
            "[1] ← To Do  [3] → Done  [x] delete"
        );
        assert_eq!(
            action_hints(Status::Done),
            "[1] ← To Do  [2] ← In Progress  [x] delete"
        );
    }
}
