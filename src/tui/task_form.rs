//! Task form handling for the terminal user interface.
//!
//! The form is the validation boundary: it turns raw text into a
//! `TaskDraft` and refuses submissions with a missing title or deadline
//! before anything reaches the store.

use chrono::NaiveDate;

use crate::{
    dates::parse_deadline_input,
    error::FormError,
    fields::{Priority, State},
    task::{Task, TaskDraft},
    tui::input::InputField,
};

/// Field order, top to bottom.
pub const TITLE_GLOBAL_ORDER: usize = 0;
pub const CATEGORY_GLOBAL_ORDER: usize = 1;
pub const DESCRIPTION_GLOBAL_ORDER: usize = 2;
pub const DEADLINE_GLOBAL_ORDER: usize = 3;
pub const PRIORITY_GLOBAL_ORDER: usize = 4;
pub const STATE_GLOBAL_ORDER: usize = 5;
pub const FIELD_COUNT: usize = 6;

/// Create/edit form state.
pub struct TaskForm {
    pub title: InputField,
    pub category: InputField,
    pub description: InputField,
    pub deadline: InputField,
    pub priority: usize,
    pub state: usize,
    pub current_field: usize,
    pub priorities: Vec<Priority>,
    pub states: Vec<State>,
    /// Id of the task being edited; `None` for a new task.
    pub editing: Option<u64>,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskForm {
    /// Blank form for a new task.
    pub fn new() -> Self {
        let priorities = Priority::ALL.to_vec();
        let states = State::ALL.to_vec();
        Self {
            title: InputField::new(),
            category: InputField::new(),
            description: InputField::new(),
            deadline: InputField::new(),
            priority: priorities.iter().position(|&p| p == Priority::default()).unwrap_or(0),
            state: 0,
            current_field: TITLE_GLOBAL_ORDER,
            priorities,
            states,
            editing: None,
        }
    }

    /// Form pre-populated from an existing task.
    pub fn from_task(task: &Task) -> Self {
        let mut form = Self::new();
        form.title = InputField::with_value(&task.title);
        form.category = InputField::with_value(&task.category.join(", "));
        form.description = InputField::with_value(&task.description);
        form.deadline = InputField::with_value(
            &task.deadline.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
        );
        form.priority = form.priorities.iter().position(|&p| p == task.priority).unwrap_or(0);
        form.state = form.states.iter().position(|&s| s == task.state).unwrap_or(0);
        form.editing = Some(task.id);
        form
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    pub fn selected_priority(&self) -> Priority {
        self.priorities.get(self.priority).copied().unwrap_or_default()
    }

    pub fn selected_state(&self) -> State {
        self.states.get(self.state).copied().unwrap_or_default()
    }

    /// Move to the next field in the form.
    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
    }

    /// Move to the previous field in the form.
    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + FIELD_COUNT - 1) % FIELD_COUNT;
    }

    /// The text input under focus, if the focused field is not a selector.
    pub fn active_input(&self) -> Option<&InputField> {
        match self.current_field {
            TITLE_GLOBAL_ORDER => Some(&self.title),
            CATEGORY_GLOBAL_ORDER => Some(&self.category),
            DESCRIPTION_GLOBAL_ORDER => Some(&self.description),
            DEADLINE_GLOBAL_ORDER => Some(&self.deadline),
            _ => None,
        }
    }

    fn active_input_mut(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            TITLE_GLOBAL_ORDER => Some(&mut self.title),
            CATEGORY_GLOBAL_ORDER => Some(&mut self.category),
            DESCRIPTION_GLOBAL_ORDER => Some(&mut self.description),
            DEADLINE_GLOBAL_ORDER => Some(&mut self.deadline),
            _ => None,
        }
    }

    pub fn handle_char(&mut self, c: char) {
        if let Some(field) = self.active_input_mut() {
            field.handle_char(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(field) = self.active_input_mut() {
            field.handle_backspace();
        }
    }

    pub fn handle_delete(&mut self) {
        if let Some(field) = self.active_input_mut() {
            field.handle_delete();
        }
    }

    pub fn handle_home_end(&mut self, end: bool) {
        if let Some(field) = self.active_input_mut() {
            if end {
                field.move_end()
            } else {
                field.move_home()
            }
        }
    }

    /// Left/right moves the cursor in text fields and cycles selectors.
    pub fn handle_left_right(&mut self, right: bool) {
        match self.current_field {
            PRIORITY_GLOBAL_ORDER => {
                self.priority = cycle(self.priority, self.priorities.len(), right)
            }
            STATE_GLOBAL_ORDER => self.state = cycle(self.state, self.states.len(), right),
            _ => {
                if let Some(field) = self.active_input_mut() {
                    if right {
                        field.move_cursor_right()
                    } else {
                        field.move_cursor_left()
                    }
                }
            }
        }
    }

    /// Validate the form and build a draft.
    pub fn to_draft(&self, today: NaiveDate) -> Result<TaskDraft, FormError> {
        let title = self.title.value.trim();
        if title.is_empty() {
            return Err(FormError::MissingTitle);
        }
        let raw_deadline = self.deadline.value.trim();
        if raw_deadline.is_empty() {
            return Err(FormError::MissingDeadline);
        }
        let deadline = parse_deadline_input(raw_deadline, today)
            .ok_or_else(|| FormError::InvalidDeadline(raw_deadline.to_string()))?;

        Ok(TaskDraft {
            title: title.to_string(),
            category: split_categories(&self.category.value),
            description: self.description.value.trim().to_string(),
            deadline: Some(deadline),
            priority: self.selected_priority(),
            state: self.selected_state(),
        })
    }
}

fn cycle(idx: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (idx + 1) % len
    } else {
        (idx + len - 1) % len
    }
}

/// Split comma-separated category input, keeping order and case, dropping
/// blanks and repeats.
pub fn split_categories(input: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in input.split(',') {
        let label = part.trim();
        if !label.is_empty() && !out.iter().any(|c| c == label) {
            out.push(label.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 20).unwrap()
    }

    fn type_into(form: &mut TaskForm, text: &str) {
        for c in text.chars() {
            form.handle_char(c);
        }
    }

    #[test]
    fn test_blank_form_defaults() {
        let form = TaskForm::new();
        assert!(!form.is_edit());
        assert_eq!(form.selected_priority(), Priority::Low);
        assert_eq!(form.selected_state(), State::Active);
        assert_eq!(form.current_field, TITLE_GLOBAL_ORDER);
    }

    #[test]
    fn test_requires_title_and_deadline() {
        let mut form = TaskForm::new();
        assert_eq!(form.to_draft(today()), Err(FormError::MissingTitle));

        type_into(&mut form, "   ");
        assert_eq!(form.to_draft(today()), Err(FormError::MissingTitle));

        type_into(&mut form, "Pay rent");
        assert_eq!(form.to_draft(today()), Err(FormError::MissingDeadline));

        form.current_field = DEADLINE_GLOBAL_ORDER;
        type_into(&mut form, "someday");
        assert_eq!(
            form.to_draft(today()),
            Err(FormError::InvalidDeadline("someday".to_string()))
        );
    }

    #[test]
    fn test_builds_draft() {
        let mut form = TaskForm::new();
        type_into(&mut form, " Pay rent ");
        form.next_field();
        type_into(&mut form, "home, bills, ,home");
        form.next_field();
        type_into(&mut form, "before the 1st");
        form.next_field();
        type_into(&mut form, "tomorrow");
        form.next_field();
        form.handle_left_right(true); // Low -> High
        form.next_field();
        form.handle_left_right(true); // Active -> Completed

        let draft = form.to_draft(today()).unwrap();
        assert_eq!(draft.title, "Pay rent");
        assert_eq!(draft.category, vec!["home".to_string(), "bills".to_string()]);
        assert_eq!(draft.description, "before the 1st");
        assert_eq!(draft.deadline, NaiveDate::from_ymd_opt(2024, 11, 21));
        assert_eq!(draft.priority, Priority::High);
        assert_eq!(draft.state, State::Completed);
    }

    #[test]
    fn test_from_task_prefills() {
        let task = Task {
            id: 9,
            title: "Call mum".into(),
            category: vec!["family".into(), "phone".into()],
            description: "Sunday".into(),
            deadline: NaiveDate::from_ymd_opt(2024, 11, 24),
            priority: Priority::Medium,
            state: State::Active,
        };
        let form = TaskForm::from_task(&task);
        assert_eq!(form.editing, Some(9));
        assert_eq!(form.category.value, "family, phone");
        assert_eq!(form.deadline.value, "2024-11-24");
        let draft = form.to_draft(today()).unwrap();
        assert_eq!(Task::from_draft(9, draft), task);
    }

    #[test]
    fn test_field_navigation_wraps() {
        let mut form = TaskForm::new();
        form.prev_field();
        assert_eq!(form.current_field, STATE_GLOBAL_ORDER);
        assert!(form.active_input().is_none());
        form.next_field();
        assert_eq!(form.current_field, TITLE_GLOBAL_ORDER);
        form.current_field = PRIORITY_GLOBAL_ORDER;
        form.handle_left_right(false);
        assert_eq!(form.selected_priority(), Priority::Medium);
        form.handle_char('x');
        assert!(form.title.value.is_empty());
    }
}
