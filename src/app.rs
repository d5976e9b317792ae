//! Application state and key handling.
//!
//! [`App`] owns the [`TaskStore`] and everything the view needs to draw. Key
//! handling is kept free of terminal I/O so it can be driven from tests.

use std::io;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::filter::{filter, FilterCriteria, FilterKey};
use crate::route::Route;
use crate::storage::Storage;
use crate::task::{Task, TaskStatus};
use crate::task_store::TaskStore;
use crate::validation::{validate, FormMode, TaskForm, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListMode {
    Browse,
    Filtering(FilterKey),
    ConfirmDelete { id: String, title: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Desc,
    Status,
    Submit,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Desc,
            FormField::Desc => FormField::Status,
            FormField::Status => FormField::Submit,
            FormField::Submit => FormField::Title,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormField::Title => FormField::Submit,
            FormField::Desc => FormField::Title,
            FormField::Status => FormField::Desc,
            FormField::Submit => FormField::Status,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub mode: FormMode,
    /// Id of the task being edited; `None` when adding.
    pub task_id: Option<String>,
    pub form: TaskForm,
    pub focus: FormField,
    pub errors: ValidationErrors,
}

impl FormState {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            task_id: None,
            form: TaskForm::default(),
            focus: FormField::Title,
            errors: ValidationErrors::default(),
        }
    }

    pub fn edit(task: &Task) -> Self {
        Self {
            mode: FormMode::Edit,
            task_id: Some(task.id.clone()),
            form: TaskForm::new(&task.title, &task.desc, task.status),
            focus: FormField::Title,
            errors: ValidationErrors::default(),
        }
    }

    pub fn heading(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Add Task",
            FormMode::Edit => "Edit Task",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Add Task",
            FormMode::Edit => "Update Task",
        }
    }

    fn cycle_status(&mut self, direction: isize) {
        let allowed = self.mode.allowed_statuses();
        let current = self
            .form
            .status
            .parse::<TaskStatus>()
            .ok()
            .and_then(|s| allowed.iter().position(|a| *a == s))
            .unwrap_or(0) as isize;
        let len = allowed.len() as isize;
        let next = allowed[(current + direction).rem_euclid(len) as usize];
        self.form.status = next.as_str().to_string();
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Title => Some(&mut self.form.title),
            FormField::Desc => Some(&mut self.form.desc),
            FormField::Status | FormField::Submit => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

#[derive(Debug)]
pub struct App<S> {
    pub store: TaskStore<S>,
    pub route: Route,
    pub filters: FilterCriteria,
    pub list_mode: ListMode,
    /// Index into the filtered list.
    pub selected: usize,
    pub form: Option<FormState>,
    pub status: Option<StatusLine>,
}

impl<S: Storage> App<S> {
    pub fn new(store: TaskStore<S>) -> Self {
        Self {
            store,
            route: Route::List,
            filters: FilterCriteria::default(),
            list_mode: ListMode::Browse,
            selected: 0,
            form: None,
            status: None,
        }
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        filter(self.store.tasks(), &self.filters)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.visible_tasks().get(self.selected).copied()
    }

    pub fn navigate(&mut self, route: Route) {
        debug!(path = %route.path(), "Navigating");
        self.list_mode = ListMode::Browse;
        match &route {
            Route::List => self.form = None,
            Route::AddTask => self.form = Some(FormState::create()),
            Route::EditTask(id) => match self.store.get(id) {
                Some(task) => self.form = Some(FormState::edit(task)),
                None => {
                    warn!(%id, "Edit requested for unknown task");
                    self.form = None;
                    self.route = Route::List;
                    self.set_error(format!("Task {id} not found"));
                    return;
                }
            },
        }
        self.route = route;
        self.clamp_selection();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        if key.kind != KeyEventKind::Press {
            return Control::Continue;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Control::Quit;
        }
        match self.route {
            Route::List => match self.list_mode.clone() {
                ListMode::Browse => self.handle_list_key(key),
                ListMode::Filtering(field) => {
                    self.handle_filter_key(key, field);
                    Control::Continue
                }
                ListMode::ConfirmDelete { id, title } => {
                    self.handle_confirm_key(key, &id, &title);
                    Control::Continue
                }
            },
            Route::AddTask | Route::EditTask(_) => {
                self.handle_form_key(key);
                Control::Continue
            }
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Control {
        match key.code {
            KeyCode::Char('q') => return Control::Quit,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let max = self.visible_tasks().len();
                if self.selected + 1 < max {
                    self.selected += 1;
                }
            }
            KeyCode::Char('a') => self.navigate(Route::AddTask),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(id) = self.selected_task().map(|t| t.id.clone()) {
                    self.navigate(Route::EditTask(id));
                }
            }
            KeyCode::Char('s') => self.move_selected(1),
            KeyCode::Char('S') => self.move_selected(-1),
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(task) = self.selected_task() {
                    self.list_mode = ListMode::ConfirmDelete {
                        id: task.id.clone(),
                        title: task.title.clone(),
                    };
                }
            }
            KeyCode::Char('/') => self.list_mode = ListMode::Filtering(FilterKey::Title),
            KeyCode::Char('c') => {
                self.filters.clear();
                self.clamp_selection();
            }
            _ => {}
        }
        Control::Continue
    }

    fn handle_filter_key(&mut self, key: KeyEvent, field: FilterKey) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.list_mode = ListMode::Browse,
            KeyCode::Tab => self.list_mode = ListMode::Filtering(field.next()),
            KeyCode::BackTab => self.list_mode = ListMode::Filtering(field.prev()),
            KeyCode::Left if field == FilterKey::Status => self.filters.cycle_status(-1),
            KeyCode::Right if field == FilterKey::Status => self.filters.cycle_status(1),
            KeyCode::Backspace => {
                if let Some(text) = self.filters.text_mut(field) {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = self.filters.text_mut(field) {
                    text.push(c);
                }
            }
            _ => {}
        }
        self.clamp_selection();
    }

    fn handle_confirm_key(&mut self, key: KeyEvent, id: &str, title: &str) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.list_mode = ListMode::Browse;
                match self.store.delete(id) {
                    Ok(true) => self.set_saved(format!("Deleted \"{title}\"")),
                    Ok(false) => self.set_error(format!("Task {id} not found")),
                    Err(err) => self.set_error(err.to_string()),
                }
                self.clamp_selection();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.list_mode = ListMode::Browse;
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(state) = self.form.as_mut() else {
            self.navigate(Route::List);
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.navigate(Route::List);
                return;
            }
            KeyCode::Enter => {
                self.submit_form();
                return;
            }
            KeyCode::Tab | KeyCode::Down => state.focus = state.focus.next(),
            KeyCode::BackTab | KeyCode::Up => state.focus = state.focus.prev(),
            KeyCode::Left if state.focus == FormField::Status => state.cycle_status(-1),
            KeyCode::Right if state.focus == FormField::Status => state.cycle_status(1),
            KeyCode::Backspace => {
                if let Some(text) = state.focused_text() {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = state.focused_text() {
                    text.push(c);
                }
            }
            _ => {}
        }
    }

    /// Validates the open form and commits it to the store.
    pub fn submit_form(&mut self) {
        let Some(state) = self.form.as_mut() else {
            return;
        };
        let draft = match validate(&state.form, state.mode) {
            Ok(draft) => draft,
            Err(errors) => {
                debug!(count = errors.len(), "Form rejected");
                state.errors = errors;
                return;
            }
        };

        let outcome = match state.task_id.clone() {
            None => self.store.create(draft).map(|t| format!("Added \"{}\"", t.title)),
            Some(id) => match self.store.get(&id) {
                Some(existing) => {
                    let updated = existing.with_draft(draft);
                    let title = updated.title.clone();
                    self.store.update(updated).map(|()| format!("Updated \"{title}\""))
                }
                None => Err(StoreError::NotFound(id)),
            },
        };

        match outcome {
            Ok(message) => self.set_saved(message),
            Err(err) => self.set_error(err.to_string()),
        }
        self.navigate(Route::List);
    }

    /// Saves anything a failed commit left behind, then runs `restore`.
    /// The save is attempted whether or not `restore` succeeds.
    pub fn shutdown(
        &mut self,
        restore: impl FnOnce() -> io::Result<()>,
    ) -> (Result<(), StoreError>, io::Result<()>) {
        let saved = self.store.flush();
        if let Err(err) = &saved {
            warn!("Final save failed: {err}");
        }
        (saved, restore())
    }

    fn move_selected(&mut self, direction: isize) {
        let Some(id) = self.selected_task().map(|t| t.id.clone()) else {
            return;
        };
        match self.store.move_task(&id, direction) {
            Ok(status) => self.set_saved(format!("Moved to {}", status.label())),
            Err(err) => self.set_error(err.to_string()),
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_tasks().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    fn set_saved(&mut self, message: String) {
        let at = Local::now().format("%H:%M:%S");
        self.status = Some(StatusLine {
            text: format!("{message}. Saved at {at}"),
            is_error: false,
        });
    }

    fn set_error(&mut self, message: String) {
        self.status = Some(StatusLine {
            text: message,
            is_error: true,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, DEFAULT_KEY};
    use crate::task::TaskDraft;
    use crate::validation::{Field, TITLE_TOO_SHORT};

    fn app() -> App<MemoryStorage> {
        App::new(TaskStore::load(MemoryStorage::new(), DEFAULT_KEY))
    }

    fn press(app: &mut App<MemoryStorage>, code: KeyCode) -> Control {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App<MemoryStorage>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn seed(app: &mut App<MemoryStorage>, title: &str, desc: &str) -> Task {
        app.store
            .create(TaskDraft {
                title: title.into(),
                desc: desc.into(),
                status: TaskStatus::Todo,
            })
            .unwrap()
    }

    #[test]
    fn add_flow_creates_todo_task() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.route, Route::AddTask);

        type_text(&mut app, "Buy milk");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Get milk from the store");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.route, Route::List);
        assert_eq!(app.store.len(), 1);
        assert_eq!(app.store.tasks()[0].status, TaskStatus::Todo);
        let status = app.status.clone().unwrap();
        assert!(!status.is_error);
        assert!(status.text.starts_with("Added \"Buy milk\""));
    }

    #[test]
    fn add_form_cannot_pick_other_status() {
        let mut app = app();
        app.navigate(Route::AddTask);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.form.as_ref().unwrap().form.status, "todo");
    }

    #[test]
    fn invalid_form_stays_open_with_errors() {
        let mut app = app();
        app.navigate(Route::AddTask);
        type_text(&mut app, "ab");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.route, Route::AddTask);
        assert!(app.store.is_empty());
        let errors = &app.form.as_ref().unwrap().errors;
        assert_eq!(errors.get(Field::Title), Some(TITLE_TOO_SHORT));
        assert!(errors.get(Field::Desc).is_some());
    }

    #[test]
    fn edit_flow_updates_in_place() {
        let mut app = app();
        let task = seed(&mut app, "Draft", "draft the plan");
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.route, Route::EditTask(task.id.clone()));

        type_text(&mut app, " v2");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);

        let updated = app.store.get(&task.id).unwrap();
        assert_eq!(updated.title, "Draft v2");
        assert_eq!(updated.status, TaskStatus::Done);
        assert_eq!(app.store.len(), 1);
    }

    #[test]
    fn edit_of_unknown_id_returns_to_list() {
        let mut app = app();
        app.navigate(Route::EditTask("ghost".into()));
        assert_eq!(app.route, Route::List);
        assert!(app.form.is_none());
        assert!(app.status.unwrap().is_error);
    }

    #[test]
    fn edit_target_deleted_while_open_reports_not_found() {
        let mut app = app();
        let task = seed(&mut app, "Gone", "about to vanish");
        app.navigate(Route::EditTask(task.id.clone()));
        app.store.delete(&task.id).unwrap();
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.route, Route::List);
        assert!(app.store.is_empty());
        let status = app.status.unwrap();
        assert!(status.is_error);
        assert!(status.text.contains("not found"));
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut app = app();
        let task = seed(&mut app, "Remove", "remove this one");

        press(&mut app, KeyCode::Char('d'));
        assert!(matches!(app.list_mode, ListMode::ConfirmDelete { .. }));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.store.len(), 1);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.store.get(&task.id).is_none());
        assert_eq!(app.list_mode, ListMode::Browse);
    }

    #[test]
    fn status_keys_move_selected_task() {
        let mut app = app();
        let task = seed(&mut app, "Move", "move me along");
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.store.get(&task.id).unwrap().status, TaskStatus::InProgress);
        press(&mut app, KeyCode::Char('S'));
        assert_eq!(app.store.get(&task.id).unwrap().status, TaskStatus::Todo);
    }

    #[test]
    fn filter_typing_narrows_and_clamps_selection() {
        let mut app = app();
        seed(&mut app, "Buy milk", "Get milk from the store");
        seed(&mut app, "Write report", "quarterly numbers");
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected, 1);

        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "MILK");
        assert_eq!(app.filters.both, "MILK");
        assert_eq!(app.visible_tasks().len(), 1);
        assert_eq!(app.selected, 0);

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.filters.status, Some(TaskStatus::InProgress));
        assert!(app.visible_tasks().is_empty());

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('c'));
        assert!(app.filters.is_empty());
        assert_eq!(app.visible_tasks().len(), 2);
    }

    #[test]
    fn write_failure_is_surfaced() {
        let mut storage = MemoryStorage::new();
        storage.set_read_only(true);
        let mut app = App::new(TaskStore::load(storage, DEFAULT_KEY));
        app.navigate(Route::AddTask);
        type_text(&mut app, "Offline");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "cannot be written");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.store.len(), 1);
        assert!(app.store.is_dirty());
        assert!(app.status.unwrap().text.starts_with("could not save tasks"));
    }

    #[test]
    fn shutdown_saves_even_when_restore_fails() {
        let mut storage = MemoryStorage::new();
        storage.set_read_only(true);
        let mut app = App::new(TaskStore::load(storage, DEFAULT_KEY));
        seed_err(&mut app);
        assert!(app.store.is_dirty());

        app.store.storage_mut().set_read_only(false);
        let (saved, restored) = app.shutdown(|| Err(io::Error::new(io::ErrorKind::Other, "tty gone")));

        assert!(saved.is_ok());
        assert!(restored.is_err());
        assert!(!app.store.is_dirty());
        assert_eq!(app.store.storage().writes(), 1);
    }

    #[test]
    fn shutdown_reports_failed_save_and_still_restores() {
        let mut storage = MemoryStorage::new();
        storage.set_read_only(true);
        let mut app = App::new(TaskStore::load(storage, DEFAULT_KEY));
        seed_err(&mut app);

        let mut restored = false;
        let (saved, result) = app.shutdown(|| {
            restored = true;
            Ok(())
        });
        assert!(saved.unwrap_err().is_persist());
        assert!(result.is_ok());
        assert!(restored);
    }

    fn seed_err(app: &mut App<MemoryStorage>) {
        let err = app
            .store
            .create(TaskDraft {
                title: "Pending".into(),
                desc: "not yet written out".into(),
                status: TaskStatus::Todo,
            })
            .unwrap_err();
        assert!(err.is_persist());
    }

    #[test]
    fn quit_keys() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Char('q')), Control::Quit);

        app.navigate(Route::AddTask);
        assert_eq!(press(&mut app, KeyCode::Char('q')), Control::Continue);
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Control::Quit
        );
    }
}
