//! taskboard - a terminal task tracker.
//!
//! Tasks carry a title, a description and a status (To Do, In Progress,
//! Done). The collection lives in a [`task_store::TaskStore`] and is written to
//! local [`storage`] after every change.
//!
//! - [`task`] - the task model and status enum
//! - [`storage`] - key/value persistence (file-backed or in memory)
//! - [`task_store`] - the owned collection and its commit hook
//! - [`filter`] - criteria and the filter function for the list view
//! - [`validation`] - task form validation
//! - [`route`] - list, add and edit views
//! - [`app`] / [`ui`] - key handling and rendering
//! - [`config`] / [`error`] - configuration and error types

pub mod app;
pub mod config;
pub mod error;
pub mod filter;
pub mod route;
pub mod storage;
pub mod task;
pub mod task_store;
pub mod ui;
pub mod validation;

pub use error::{ConfigError, StorageError, StoreError};
pub use filter::{filter, FilterCriteria};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use task::{Task, TaskDraft, TaskStatus};
pub use task_store::TaskStore;
pub use validation::{validate, FormMode, TaskForm, ValidationErrors};
