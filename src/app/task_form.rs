use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::app::models::{NewTask, Priority};

// Which input row of the form the cursor is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Field {
    #[default]
    Title,
    Description,
    Priority,
}

// State object for the create-task form dialog.
// Keeps the field contents while the dialog is open; the dialog is only
// reset after the server has accepted the task, so a failed create leaves
// the user's input intact for a retry.
#[derive(Debug, Default)]
pub struct TaskFormState {
    pub active: bool,
    title: String,
    description: String,
    priority: Priority,
    field: Field,
}

impl TaskFormState {
    // Opens the dialog with empty fields and MEDIUM priority.
    pub fn open(&mut self) {
        *self = Self::default();
        self.active = true;
    }

    // Closes the dialog and discards its contents.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn move_cursor_down(&mut self) {
        self.field = match self.field {
            Field::Title => Field::Description,
            Field::Description | Field::Priority => Field::Priority,
        };
    }

    pub fn move_cursor_up(&mut self) {
        self.field = match self.field {
            Field::Title | Field::Description => Field::Title,
            Field::Priority => Field::Description,
        };
    }

    // Handles a typed char by appending it to the active text field. On the
    // priority row the l/m/h shortcuts select a level directly.
    pub fn input(&mut self, to_insert: char) {
        match self.field {
            Field::Title => self.title.push(to_insert),
            Field::Description => self.description.push(to_insert),
            Field::Priority => match to_insert.to_ascii_lowercase() {
                'l' => self.priority = Priority::Low,
                'm' => self.priority = Priority::Medium,
                'h' => self.priority = Priority::High,
                _ => {}
            },
        }
    }

    pub fn delete_char(&mut self) {
        match self.field {
            Field::Title => {
                self.title.pop();
            }
            Field::Description => {
                self.description.pop();
            }
            Field::Priority => {}
        }
    }

    // Step the priority selector left or right, stopping at the ends.
    // Only acts while the cursor is on the priority row.
    pub fn shift_priority(&mut self, step: isize) {
        if self.field != Field::Priority {
            return;
        }
        let position = Priority::ALL
            .iter()
            .position(|p| *p == self.priority)
            .unwrap_or(1);
        let next = (position as isize + step).clamp(0, Priority::ALL.len() as isize - 1);
        self.priority = Priority::ALL[next as usize];
    }

    // Validate the form and build the create payload. Validation failures
    // are local: the caller surfaces the message as an error notice and no
    // network call is made.
    pub fn submit(&self) -> Result<NewTask, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Please enter a task title".to_string());
        }
        if title.chars().count() < 3 {
            return Err("Task title must be at least 3 characters".to_string());
        }

        Ok(NewTask {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            priority: self.priority,
        })
    }
}

// Returns the UI content for the create-task form dialog.
pub fn get_task_form_ui(form: &TaskFormState) -> Vec<Line<'_>> {
    const GRAY_TEXT: Style = Style::new().fg(Color::DarkGray);
    const WHITE_TEXT: Style = Style::new().fg(Color::White);
    const ACTIVE_TEXT: Style = Style::new().fg(Color::Black).bg(Color::White);

    let rows = [
        (Field::Title, "Title:       ", form.title.as_str(), "My task name"),
        (
            Field::Description,
            "Description: ",
            form.description.as_str(),
            "Optional details",
        ),
    ];

    let mut text = Vec::new();
    for (field, prefix, value, placeholder) in rows {
        let mut spans = vec![Span::styled(prefix, WHITE_TEXT)];
        if value.is_empty() {
            spans.push(Span::styled(placeholder, GRAY_TEXT));
        } else {
            spans.push(Span::styled(value, WHITE_TEXT));
        }
        if form.field == field {
            spans.push(Span::styled(" ", ACTIVE_TEXT));
        }
        text.push(Line::from(spans));
    }

    // The priority row is a selector, not a text field.
    let mut spans = vec![Span::styled("Priority:    ", WHITE_TEXT)];
    for priority in Priority::ALL {
        let style = if priority == form.priority && form.field == Field::Priority {
            ACTIVE_TEXT
        } else if priority == form.priority {
            WHITE_TEXT
        } else {
            GRAY_TEXT
        };
        spans.push(Span::styled(format!(" {} ", priority.label()), style));
    }
    text.push(Line::from(spans));

    text.push(Line::raw(""));
    text.push(Line::styled(
        "Enter - save, Esc - cancel, Up/Down - field, Left/Right - priority",
        GRAY_TEXT,
    ));

    text
}
