/// The three views of the app, addressed by path like the web version's routes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    List,
    AddTask,
    EditTask(String),
}

impl Route {
    /// Parses `/`, `/add-task` and `/edit-task/:id`. A trailing slash is ignored.
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim();
        let trimmed = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        match trimmed {
            "" | "/" => Some(Route::List),
            "/add-task" => Some(Route::AddTask),
            other => other
                .strip_prefix("/edit-task/")
                .filter(|id| !id.is_empty() && !id.contains('/'))
                .map(|id| Route::EditTask(id.to_string())),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::List => "/".to_string(),
            Route::AddTask => "/add-task".to_string(),
            Route::EditTask(id) => format!("/edit-task/{id}"),
        }
    }
}
