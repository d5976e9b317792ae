//! Task form validation.
//!
//! A [`TaskForm`] holds raw user input. [`validate`] either accepts it as a
//! [`TaskDraft`] or rejects it wholesale with one message per failing field.

use std::fmt;

use crate::task::{TaskDraft, TaskStatus};

pub const TITLE_MIN_LEN: usize = 3;
pub const DESC_MIN_LEN: usize = 10;

pub const TITLE_TOO_SHORT: &str = "Title must be at least 3 characters long";
pub const DESC_TOO_SHORT: &str = "Description must be at least 10 characters long";
pub const INVALID_STATUS: &str = "Please select a valid status";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

impl FormMode {
    /// Statuses offered by the status select. New tasks always start as To Do.
    pub fn allowed_statuses(self) -> &'static [TaskStatus] {
        match self {
            FormMode::Create => &[TaskStatus::Todo],
            FormMode::Edit => &[TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Desc,
    Status,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Title => "title",
            Field::Desc => "desc",
            Field::Status => "status",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub desc: String,
    pub status: String,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            desc: String::new(),
            status: TaskStatus::Todo.as_str().to_string(),
        }
    }
}

impl TaskForm {
    pub fn new(title: &str, desc: &str, status: TaskStatus) -> Self {
        Self {
            title: title.to_string(),
            desc: desc.to_string(),
            status: status.as_str().to_string(),
        }
    }
}

/// Field-level error messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{} field(s) invalid", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<(Field, &'static str)>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.errors.iter().find(|(f, _)| *f == field).map(|(_, m)| *m)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.errors.iter().copied()
    }

    fn push(&mut self, field: Field, message: &'static str) {
        self.errors.push((field, message));
    }
}

pub fn validate(form: &TaskForm, mode: FormMode) -> Result<TaskDraft, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let title = form.title.trim();
    if title.chars().count() < TITLE_MIN_LEN {
        errors.push(Field::Title, TITLE_TOO_SHORT);
    }

    let desc = form.desc.trim();
    if desc.chars().count() < DESC_MIN_LEN {
        errors.push(Field::Desc, DESC_TOO_SHORT);
    }

    let status = form
        .status
        .parse::<TaskStatus>()
        .ok()
        .filter(|s| mode.allowed_statuses().contains(s));
    if status.is_none() {
        errors.push(Field::Status, INVALID_STATUS);
    }

    match status {
        Some(status) if errors.is_empty() => Ok(TaskDraft {
            title: title.to_string(),
            desc: desc.to_string(),
            status,
        }),
        _ => Err(errors),
    }
}
