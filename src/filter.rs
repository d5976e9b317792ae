use crate::task::{Task, TaskStatus};

/// Which filter input a piece of text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
    Title,
    Desc,
    Both,
    Status,
}

impl FilterKey {
    pub const ALL: [FilterKey; 4] = [FilterKey::Title, FilterKey::Desc, FilterKey::Both, FilterKey::Status];

    pub fn placeholder(self) -> &'static str {
        match self {
            FilterKey::Title => "Filter by Title",
            FilterKey::Desc => "Filter by Description",
            FilterKey::Both => "Filter by Title / Description",
            FilterKey::Status => "All Status",
        }
    }

    pub fn next(self) -> Self {
        match self {
            FilterKey::Title => FilterKey::Desc,
            FilterKey::Desc => FilterKey::Both,
            FilterKey::Both => FilterKey::Status,
            FilterKey::Status => FilterKey::Title,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FilterKey::Title => FilterKey::Status,
            FilterKey::Desc => FilterKey::Title,
            FilterKey::Both => FilterKey::Desc,
            FilterKey::Status => FilterKey::Both,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub title: String,
    pub desc: String,
    /// Matches title or description.
    pub both: String,
    pub status: Option<TaskStatus>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.desc.is_empty() && self.both.is_empty() && self.status.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Mutable text of a text filter; `None` for the status select.
    pub fn text_mut(&mut self, key: FilterKey) -> Option<&mut String> {
        match key {
            FilterKey::Title => Some(&mut self.title),
            FilterKey::Desc => Some(&mut self.desc),
            FilterKey::Both => Some(&mut self.both),
            FilterKey::Status => None,
        }
    }

    /// Steps the status select through "All Status", To Do, In Progress, Done.
    pub fn cycle_status(&mut self, direction: isize) {
        let options = [None, Some(TaskStatus::Todo), Some(TaskStatus::InProgress), Some(TaskStatus::Done)];
        let current = options.iter().position(|o| *o == self.status).unwrap_or(0) as isize;
        let len = options.len() as isize;
        self.status = options[(current + direction).rem_euclid(len) as usize];
    }

    /// Active criteria joined with `" & "`, e.g. `Title: milk & Status: done`.
    pub fn summary(&self) -> String {
        let mut applied = Vec::new();
        if !self.title.is_empty() {
            applied.push(format!("Title: {}", self.title));
        }
        if !self.desc.is_empty() {
            applied.push(format!("Description: {}", self.desc));
        }
        if !self.both.is_empty() {
            applied.push(format!("Title/Description: {}", self.both));
        }
        if let Some(status) = self.status {
            applied.push(format!("Status: {status}"));
        }
        applied.join(" & ")
    }

    /// Message shown when the filtered list is empty.
    pub fn empty_message(&self) -> String {
        if self.is_empty() {
            "No tasks found.".to_string()
        } else {
            format!("No tasks found based on {}", self.summary())
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        contains(&task.title, &self.title)
            && contains(&task.desc, &self.desc)
            && (self.both.is_empty() || contains(&task.title, &self.both) || contains(&task.desc, &self.both))
            && self.status.map_or(true, |s| task.status == s)
    }
}

/// Tasks matching every non-empty criterion, in their original order.
pub fn filter<'a>(tasks: &'a [Task], criteria: &FilterCriteria) -> Vec<&'a Task> {
    tasks.iter().filter(|t| criteria.matches(t)).collect()
}

fn contains(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, title: &str, desc: &str, status: TaskStatus) -> Task {
        Task {
            id: id.into(),
            title: title.into(),
            desc: desc.into(),
            status,
        }
    }

    fn sample() -> Vec<Task> {
        vec![
            task("1", "Buy milk", "Get milk from the store", TaskStatus::Todo),
            task("2", "Write report", "Quarterly numbers", TaskStatus::Done),
            task("3", "Groceries", "Eggs, bread and MILK", TaskStatus::InProgress),
            task("4", "Ship release", "Tag and publish", TaskStatus::Done),
        ]
    }

    fn ids(tasks: Vec<&Task>) -> Vec<&str> {
        tasks.into_iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn empty_criteria_returns_everything_in_order() {
        let tasks = sample();
        assert_eq!(ids(filter(&tasks, &FilterCriteria::default())), ["1", "2", "3", "4"]);
    }

    #[test]
    fn status_filter_keeps_order() {
        let tasks = sample();
        let criteria = FilterCriteria {
            status: Some(TaskStatus::Done),
            ..Default::default()
        };
        assert_eq!(ids(filter(&tasks, &criteria)), ["2", "4"]);
    }

    #[test]
    fn both_matches_title_or_desc_case_insensitively() {
        let tasks = sample();
        let criteria = FilterCriteria {
            both: "milk".into(),
            ..Default::default()
        };
        assert_eq!(ids(filter(&tasks, &criteria)), ["1", "3"]);
    }

    #[test]
    fn criteria_combine_with_and() {
        let tasks = sample();
        let criteria = FilterCriteria {
            both: "MILK".into(),
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };
        assert_eq!(ids(filter(&tasks, &criteria)), ["3"]);

        let criteria = FilterCriteria {
            title: "re".into(),
            desc: "publish".into(),
            ..Default::default()
        };
        assert_eq!(ids(filter(&tasks, &criteria)), ["4"]);
    }

    #[test]
    fn title_filter_ignores_description() {
        let tasks = sample();
        let criteria = FilterCriteria {
            title: "milk".into(),
            ..Default::default()
        };
        assert_eq!(ids(filter(&tasks, &criteria)), ["1"]);
    }

    #[test]
    fn cycle_status_wraps_through_all() {
        let mut criteria = FilterCriteria::default();
        criteria.cycle_status(1);
        assert_eq!(criteria.status, Some(TaskStatus::Todo));
        criteria.cycle_status(-1);
        criteria.cycle_status(-1);
        assert_eq!(criteria.status, Some(TaskStatus::Done));
        criteria.cycle_status(1);
        assert_eq!(criteria.status, None);
    }

    #[test]
    fn empty_message_lists_active_filters() {
        let mut criteria = FilterCriteria::default();
        assert_eq!(criteria.empty_message(), "No tasks found.");

        criteria.title = "milk".into();
        criteria.status = Some(TaskStatus::Done);
        assert_eq!(
            criteria.empty_message(),
            "No tasks found based on Title: milk & Status: done"
        );

        criteria.clear();
        assert!(criteria.is_empty());
    }
}
