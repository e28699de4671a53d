//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which owns the session's task store,
//! turns key presses into store operations and view changes, and renders the
//! board with its overlays (form, delete prompt, category chooser, help).

use std::io;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState,
        Wrap,
    },
    Frame, Terminal,
};
use tracing::{debug, warn};

use crate::fields::{Direction, SortField};
use crate::render::{format_categories, format_due, format_priority, format_state, truncate};
use crate::store::TaskStore;
use crate::task::Task;
use crate::tui::{
    colors::{priority_color, DARK_RED, SLATE},
    enums::AppState,
    task_form::{
        TaskForm, CATEGORY_GLOBAL_ORDER, DEADLINE_GLOBAL_ORDER, DESCRIPTION_GLOBAL_ORDER,
        PRIORITY_GLOBAL_ORDER, STATE_GLOBAL_ORDER, TITLE_GLOBAL_ORDER,
    },
    utils::centered_rect,
};
use crate::view::{derive_view, ViewSpec};

/// Sortable columns in key order: '1' sorts by the first entry, and so on.
const SORT_COLUMNS: [SortField; 7] = [
    SortField::Title,
    SortField::Category,
    SortField::Priority,
    SortField::Deadline,
    SortField::State,
    SortField::Id,
    SortField::Description,
];

/// Main application state for the terminal user interface.
pub struct App {
    state: AppState,
    store: TaskStore,
    view_spec: ViewSpec,
    visible: Vec<u64>,
    task_list_state: TableState,
    task_form: TaskForm,
    pending_delete: Option<u64>,
    category_choices: Vec<String>,
    picker_state: ListState,
    status_message: String,
    today: NaiveDate,
}

impl App {
    /// Create a board over `store`.
    pub fn new(store: TaskStore) -> Self {
        Self::with_today(store, Local::now().date_naive())
    }

    /// Create a board with a fixed "today" for deadline arithmetic.
    pub fn with_today(store: TaskStore, today: NaiveDate) -> Self {
        let mut app = App {
            state: AppState::TaskList,
            store,
            view_spec: ViewSpec::default(),
            visible: Vec::new(),
            task_list_state: TableState::default(),
            task_form: TaskForm::new(),
            pending_delete: None,
            category_choices: Vec::new(),
            picker_state: ListState::default(),
            status_message: String::new(),
            today,
        };
        app.update_visible();
        app
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn view_spec(&self) -> &ViewSpec {
        &self.view_spec
    }

    /// Ids of the tasks currently shown, in display order.
    pub fn visible_ids(&self) -> &[u64] {
        &self.visible
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Recompute filter and sort, keeping the selection on the same task
    /// when it is still visible.
    fn update_visible(&mut self) {
        let old_selected = self.selected_task_id();

        self.visible = derive_view(self.store.tasks(), &self.view_spec)
            .into_iter()
            .map(|t| t.id)
            .collect();

        let new_idx = match old_selected.and_then(|id| self.visible.iter().position(|&v| v == id)) {
            Some(idx) => Some(idx),
            None if self.visible.is_empty() => None,
            None => Some(
                self.task_list_state
                    .selected()
                    .unwrap_or(0)
                    .min(self.visible.len() - 1),
            ),
        };
        self.task_list_state.select(new_idx);
    }

    fn selected_task_id(&self) -> Option<u64> {
        self.task_list_state
            .selected()
            .and_then(|idx| self.visible.get(idx))
            .copied()
    }

    fn selected_task(&self) -> Option<&Task> {
        self.selected_task_id().and_then(|id| self.store.get(id))
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    fn select_by_id(&mut self, id: u64) {
        if let Some(idx) = self.visible.iter().position(|&v| v == id) {
            self.task_list_state.select(Some(idx));
        }
    }

    fn move_selection(&mut self, down: bool) {
        if self.visible.is_empty() {
            return;
        }
        let next = match self.task_list_state.selected() {
            Some(i) if down => (i + 1).min(self.visible.len() - 1),
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.task_list_state.select(Some(next));
    }

    fn open_add_form(&mut self) {
        self.task_form = TaskForm::new();
        self.state = AppState::AddTask;
    }

    fn open_edit_form(&mut self) {
        if let Some(task) = self.selected_task() {
            self.task_form = TaskForm::from_task(task);
            self.state = AppState::EditTask;
        } else {
            self.set_status_message("No task selected");
        }
    }

    fn close_form(&mut self) {
        self.state = AppState::TaskList;
        self.task_form = TaskForm::new();
    }

    /// Validate the form and hand the draft to the store. On a validation
    /// error the form stays open and the store is untouched.
    fn submit_form(&mut self) {
        let draft = match self.task_form.to_draft(self.today) {
            Ok(draft) => draft,
            Err(e) => {
                warn!(error = %e, "form submission rejected");
                self.set_status_message(e.to_string());
                return;
            }
        };

        match self.task_form.editing {
            Some(id) => {
                if self.store.update(Task::from_draft(id, draft)) {
                    self.set_status_message("Task updated");
                } else {
                    self.set_status_message(format!("Task #{id} no longer exists"));
                }
                self.close_form();
                self.update_visible();
            }
            None => {
                let id = self.store.add(draft);
                self.close_form();
                self.update_visible();
                self.select_by_id(id);
                self.set_status_message("Task created");
            }
        }
    }

    /// First half of a delete: remember the task and ask for confirmation.
    fn request_delete(&mut self) {
        if let Some(id) = self.selected_task_id() {
            self.pending_delete = Some(id);
            self.state = AppState::Confirm;
        } else {
            self.set_status_message("No task selected");
        }
    }

    /// Second half of a delete. Only a "yes" removes the pending task.
    fn confirm_delete(&mut self, confirmed: bool) {
        let pending = self.pending_delete.take();
        self.state = AppState::TaskList;
        match (pending, confirmed) {
            (Some(id), true) => {
                if self.store.remove(id) {
                    self.set_status_message(format!("Deleted task #{id}"));
                }
                self.update_visible();
            }
            (Some(_), false) => self.set_status_message("Delete cancelled"),
            (None, _) => {}
        }
    }

    fn toggle_selected_state(&mut self) {
        if let Some(id) = self.selected_task_id() {
            if let Some(new_state) = self.store.toggle_state(id) {
                self.update_visible();
                self.set_status_message(format!("Task #{id} is now {}", format_state(new_state)));
            }
        }
    }

    fn open_category_picker(&mut self) {
        self.category_choices = self.store.categories();
        let current = self
            .view_spec
            .category
            .as_ref()
            .and_then(|c| self.category_choices.iter().position(|x| x == c))
            .map(|i| i + 1)
            .unwrap_or(0);
        self.picker_state.select(Some(current));
        self.state = AppState::CategoryPicker;
    }

    /// Apply a chooser entry: index 0 is "All", the rest are categories.
    fn apply_category_choice(&mut self, choice: usize) {
        self.view_spec.category = choice
            .checked_sub(1)
            .and_then(|i| self.category_choices.get(i))
            .cloned();
        self.state = AppState::TaskList;
        self.update_visible();
        let msg = match &self.view_spec.category {
            Some(c) => format!("Showing category '{}' ({} tasks)", c, self.visible.len()),
            None => "Showing all categories".to_string(),
        };
        debug!(category = ?self.view_spec.category, visible = self.visible.len(), "filter changed");
        self.set_status_message(msg);
    }

    fn toggle_sort(&mut self, field: SortField) {
        let dir = self.view_spec.sort.toggle(field);
        self.update_visible();
        debug!(sort = %self.view_spec.sort, "sort changed");
        self.set_status_message(format!(
            "Sorted by {} {}",
            column_title(field),
            if dir == Direction::Asc { "ascending" } else { "descending" }
        ));
    }

    fn clear_sort(&mut self) {
        self.view_spec.sort.clear();
        self.update_visible();
        self.set_status_message("Sort cleared");
    }

    /// Handle keyboard input when in the task list view.
    ///
    /// Returns true if the application should quit.
    fn handle_task_list_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        match key {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Char('a') => self.open_add_form(),
            KeyCode::Char('e') | KeyCode::Enter => self.open_edit_form(),
            KeyCode::Char('d') | KeyCode::Delete => self.request_delete(),
            KeyCode::Char('c') | KeyCode::Char(' ') => self.toggle_selected_state(),
            KeyCode::Char('f') => self.open_category_picker(),
            KeyCode::Char('0') => self.clear_sort(),
            KeyCode::Char(c @ '1'..='7') => {
                let idx = c as usize - '1' as usize;
                self.toggle_sort(SORT_COLUMNS[idx]);
            }
            KeyCode::Char('h') | KeyCode::Char('?') | KeyCode::F(1) => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    /// Handle keyboard input in the create/edit form.
    fn handle_form_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        match key {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Esc => {
                self.close_form();
                self.set_status_message("Cancelled");
            }
            KeyCode::Tab | KeyCode::Down => self.task_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.task_form.prev_field(),
            KeyCode::Left => self.task_form.handle_left_right(false),
            KeyCode::Right => self.task_form.handle_left_right(true),
            KeyCode::Home => self.task_form.handle_home_end(false),
            KeyCode::End => self.task_form.handle_home_end(true),
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Delete => self.task_form.handle_delete(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Char(c) => self.task_form.handle_char(c),
            _ => {}
        }
        false
    }

    /// Handle keyboard input in the confirmation dialog.
    fn handle_confirm_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> bool {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => self.confirm_delete(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.confirm_delete(false),
            _ => {}
        }
        false
    }

    /// Handle keyboard input in the category chooser.
    fn handle_picker_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> bool {
        let len = self.category_choices.len() + 1;
        let current = self.picker_state.selected().unwrap_or(0);
        match key {
            KeyCode::Esc => self.state = AppState::TaskList,
            KeyCode::Up | KeyCode::Char('k') => {
                self.picker_state.select(Some(current.saturating_sub(1)))
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.picker_state.select(Some((current + 1).min(len - 1)))
            }
            KeyCode::Enter => self.apply_category_choice(current),
            _ => {}
        }
        false
    }

    fn handle_help_input(&mut self, _key: KeyCode, _modifiers: KeyModifiers) -> bool {
        self.state = AppState::TaskList;
        false
    }

    /// Dispatch one key press to the handler for the current state.
    ///
    /// Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        self.clear_status_message();
        match self.state {
            AppState::TaskList => self.handle_task_list_input(key, modifiers),
            AppState::AddTask | AppState::EditTask => self.handle_form_input(key, modifiers),
            AppState::Confirm => self.handle_confirm_input(key, modifiers),
            AppState::CategoryPicker => self.handle_picker_input(key, modifiers),
            AppState::Help => self.handle_help_input(key, modifiers),
        }
    }

    /// Poll for and handle keyboard events.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key.code, key.modifiers));
                }
            }
        }
        Ok(false)
    }

    fn header_label(&self, title: &str, field: SortField) -> String {
        let sort = &self.view_spec.sort;
        match (sort.direction_of(field), sort.precedence_of(field)) {
            (Some(dir), Some(rank)) => {
                let arrow = if dir == Direction::Asc { "▲" } else { "▼" };
                if sort.keys().len() > 1 {
                    format!("{title} {arrow}{rank}")
                } else {
                    format!("{title} {arrow}")
                }
            }
            _ => title.to_string(),
        }
    }

    /// Render the task table. `dimmed` de-emphasises it under an overlay.
    fn render_task_list(&mut self, f: &mut Frame, area: Rect, dimmed: bool) {
        let header_cells = [
            ("ID", SortField::Id),
            ("Title", SortField::Title),
            ("Categories", SortField::Category),
            ("Priority", SortField::Priority),
            ("Due", SortField::Deadline),
            ("State", SortField::State),
            ("Description", SortField::Description),
        ]
        .iter()
        .map(|(title, field)| {
            Cell::from(self.header_label(title, *field))
                .style(Style::default().add_modifier(Modifier::BOLD))
        })
        .collect::<Vec<_>>();
        let header = Row::new(header_cells)
            .style(Style::default().bg(SLATE).fg(Color::White))
            .height(1);

        let rows: Vec<Row> = self
            .visible
            .iter()
            .filter_map(|&id| self.store.get(id))
            .map(|task| {
                let style = if task.is_completed() {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default().fg(Color::White)
                };
                let priority_style = if task.is_completed() {
                    style
                } else {
                    Style::default().fg(priority_color(task.priority))
                };
                let marker = if task.is_completed() { "[x]" } else { "[ ]" };
                Row::new(vec![
                    Cell::from(task.id.to_string()),
                    Cell::from(task.title.clone()),
                    Cell::from(format_categories(&task.category)),
                    Cell::from(format_priority(task.priority)).style(priority_style),
                    Cell::from(format_due(task.deadline, self.today)),
                    Cell::from(format!("{} {}", marker, format_state(task.state))),
                    Cell::from(truncate(&task.description, 40)),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(14), // ID
            Constraint::Min(20),    // Title
            Constraint::Length(20), // Categories
            Constraint::Length(11), // Priority
            Constraint::Length(10), // Due
            Constraint::Length(15), // State
            Constraint::Min(20),    // Description
        ];

        let filter_label = self.view_spec.category.as_deref().unwrap_or("all");
        let mut table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Tasks ({}/{}) - category: {} - press 'h' for help",
                self.visible.len(),
                self.store.len(),
                filter_label
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");
        if dimmed {
            table = table.style(Style::default().add_modifier(Modifier::DIM));
        }

        f.render_stateful_widget(table, area, &mut self.task_list_state);
    }

    /// Render the create/edit form as an overlay.
    fn render_task_form(&mut self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 80, area);
        f.render_widget(Clear, area);

        let title = if self.task_form.is_edit() { "Edit Task" } else { "Add Task" };
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(3), // Categories
                Constraint::Length(4), // Description
                Constraint::Length(3), // Deadline
                Constraint::Length(3), // Priority
                Constraint::Length(3), // State
                Constraint::Min(1),    // Instructions
            ])
            .split(inner);

        let focus = |idx: usize| {
            if self.task_form.current_field == idx {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            }
        };

        let text_fields = [
            (TITLE_GLOBAL_ORDER, "Title *", &self.task_form.title, chunks[0]),
            (
                CATEGORY_GLOBAL_ORDER,
                "Categories (comma-separated)",
                &self.task_form.category,
                chunks[1],
            ),
            (DESCRIPTION_GLOBAL_ORDER, "Description", &self.task_form.description, chunks[2]),
            (
                DEADLINE_GLOBAL_ORDER,
                "Deadline * (YYYY-MM-DD, tomorrow, in 3d, fri)",
                &self.task_form.deadline,
                chunks[3],
            ),
        ];
        for (idx, label, field, chunk) in text_fields {
            let widget = Paragraph::new(field.value.as_str())
                .block(Block::default().borders(Borders::ALL).title(label).border_style(focus(idx)))
                .wrap(Wrap { trim: false });
            f.render_widget(widget, chunk);
        }

        let priority = self.task_form.selected_priority();
        let priority_widget = Paragraph::new(Line::from(vec![
            Span::raw("< "),
            Span::styled(format_priority(priority), Style::default().fg(priority_color(priority))),
            Span::raw(" >"),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Priority")
                .border_style(focus(PRIORITY_GLOBAL_ORDER)),
        );
        f.render_widget(priority_widget, chunks[4]);

        let state_label = format_state(self.task_form.selected_state());
        let state_widget = Paragraph::new(format!("< {state_label} >")).block(
            Block::default()
                .borders(Borders::ALL)
                .title("State")
                .border_style(focus(STATE_GLOBAL_ORDER)),
        );
        f.render_widget(state_widget, chunks[5]);

        let submit = if self.task_form.is_edit() { "save changes" } else { "add task" };
        let instructions = Paragraph::new(format!(
            "Tab/↑↓ move between fields  ←/→ change selectors  Enter {submit}  Esc cancel"
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        f.render_widget(instructions, chunks[6]);

        let cursor_chunk = match self.task_form.current_field {
            TITLE_GLOBAL_ORDER => Some(chunks[0]),
            CATEGORY_GLOBAL_ORDER => Some(chunks[1]),
            DESCRIPTION_GLOBAL_ORDER => Some(chunks[2]),
            DEADLINE_GLOBAL_ORDER => Some(chunks[3]),
            _ => None,
        };
        if let (Some(chunk), Some(field)) = (cursor_chunk, self.task_form.active_input()) {
            let max_x = chunk.width.saturating_sub(2) as usize;
            let x = field.cursor.min(max_x) as u16;
            f.set_cursor_position((chunk.x + 1 + x, chunk.y + 1));
        }
    }

    /// Render the yes/no prompt for a pending delete.
    fn render_confirm(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Delete")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 25, area);
        f.render_widget(Clear, area);

        let target = self
            .pending_delete
            .and_then(|id| self.store.get(id))
            .map(|t| format!("#{} - {}", t.id, t.title))
            .unwrap_or_default();

        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "Are you sure you want to delete this task?",
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(target),
            Line::from(""),
            Line::from("Press 'y' to delete, 'n' to keep it"),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    /// Render the single-select category chooser.
    fn render_category_picker(&mut self, f: &mut Frame, area: Rect) {
        let area = centered_rect(40, 50, area);
        f.render_widget(Clear, area);

        let mut items = vec![ListItem::new("All categories")];
        items.extend(self.category_choices.iter().map(|c| {
            let count = self.store.tasks().iter().filter(|t| t.has_category(c)).count();
            ListItem::new(format!("{c} ({count})"))
        }));

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Filter by category"))
            .highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");
        f.render_stateful_widget(list, area, &mut self.picker_state);
    }

    /// Render the help screen with keyboard shortcuts.
    fn render_help(&mut self, f: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(Span::styled("Task Board Help", bold)),
            Line::from(""),
            Line::from(Span::styled("Task List:", bold)),
            Line::from("  ↑/↓, k/j     Move selection"),
            Line::from("  a            Add new task"),
            Line::from("  e/Enter      Edit selected task"),
            Line::from("  d/Delete     Delete selected task (asks first)"),
            Line::from("  c/Space      Toggle active/completed"),
            Line::from("  f            Filter by category"),
            Line::from("  1-7          Sort by Title, Categories, Priority, Due, State,"),
            Line::from("               ID, Description (same key again flips direction,"),
            Line::from("               earlier sorts become tie-breakers)"),
            Line::from("  0            Clear sorting"),
            Line::from("  h/?/F1       Show this help"),
            Line::from("  q/Esc/Ctrl+C Quit (tasks are not saved)"),
            Line::from(""),
            Line::from(Span::styled("Form:", bold)),
            Line::from("  Tab/↑↓       Move between fields"),
            Line::from("  ←/→          Move cursor, change priority/state"),
            Line::from("  Enter        Save"),
            Line::from("  Esc          Cancel"),
            Line::from(""),
            Line::from(Span::styled("Deadline Formats:", bold)),
            Line::from("  YYYY-MM-DD   Specific date (e.g., 2024-12-25)"),
            Line::from("  today, tomorrow, in 3d, in 2w, fri, next monday, eow, eom"),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help - press any key to return"))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::TaskList => format!(
                    "Tasks: {}/{} | Category: {} | Sort: {} | 'h' for help",
                    self.visible.len(),
                    self.store.len(),
                    self.view_spec.category.as_deref().unwrap_or("all"),
                    self.view_spec.sort
                ),
                AppState::AddTask => "Add New Task".to_string(),
                AppState::EditTask => "Edit Task".to_string(),
                AppState::CategoryPicker => {
                    "Choose a category, Enter to apply, Esc to cancel".to_string()
                }
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Delete".to_string(),
            }
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(SLATE).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function. Overlays are drawn over the dimmed list.
    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        if self.state == AppState::Help {
            self.render_help(f, chunks[0]);
        } else {
            self.render_task_list(f, chunks[0], self.state.is_overlay());
            match self.state {
                AppState::AddTask | AppState::EditTask => self.render_task_form(f, chunks[0]),
                AppState::Confirm => self.render_confirm(f, chunks[0]),
                AppState::CategoryPicker => self.render_category_picker(f, chunks[0]),
                AppState::TaskList | AppState::Help => {}
            }
        }

        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop for the TUI application.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

fn column_title(field: SortField) -> &'static str {
    match field {
        SortField::Id => "ID",
        SortField::Title => "Title",
        SortField::Category => "Categories",
        SortField::Description => "Description",
        SortField::Priority => "Priority",
        SortField::Deadline => "Due",
        SortField::State => "State",
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::fields::{Priority, State};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 18).unwrap()
    }

    fn task(id: u64, title: &str, priority: Priority, day: u32, category: &[&str]) -> Task {
        Task {
            id,
            title: title.to_string(),
            category: category.iter().map(|c| c.to_string()).collect(),
            description: String::new(),
            deadline: NaiveDate::from_ymd_opt(2024, 11, day),
            priority,
            state: State::Active,
        }
    }

    fn app() -> App {
        let store = TaskStore::with_seed(vec![
            task(1, "A", Priority::High, 22, &["work"]),
            task(2, "B", Priority::Low, 20, &["home"]),
        ])
        .unwrap();
        App::with_today(store, today())
    }

    fn press(app: &mut App, key: KeyCode) -> bool {
        app.handle_key(key, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_add_task_through_form() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.state(), AppState::AddTask);
        type_text(&mut app, "Buy milk");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "errands");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "2024-11-25");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state(), AppState::TaskList);
        assert_eq!(app.store().len(), 3);
        let added = app.store().tasks().last().unwrap();
        assert_eq!(added.title, "Buy milk");
        assert_eq!(added.category, vec!["errands".to_string()]);
        assert_eq!(app.selected_task_id(), Some(added.id));
    }

    #[test]
    fn test_invalid_form_keeps_form_open() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state(), AppState::AddTask);
        assert_eq!(app.status_message(), "Title is required");

        type_text(&mut app, "No deadline");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state(), AppState::AddTask);
        assert_eq!(app.status_message(), "Deadline is required");
        assert_eq!(app.store().len(), 2);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state(), AppState::TaskList);
        assert_eq!(app.store().len(), 2);
    }

    #[test]
    fn test_out_of_range_deadline_keeps_form_open() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "x");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "in 1000000000d");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state(), AppState::AddTask);
        assert!(app.status_message().starts_with("Could not understand deadline"));
        assert_eq!(app.store().len(), 2);
    }

    #[test]
    fn test_edit_updates_selected_task() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.state(), AppState::EditTask);
        type_text(&mut app, "!");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.store().len(), 2);
        assert_eq!(app.store().get(1).unwrap().title, "A!");
        assert_eq!(app.store().get(2).unwrap().title, "B");
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.state(), AppState::Confirm);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.store().len(), 2);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.state(), AppState::TaskList);
        assert_eq!(app.store().tasks().iter().map(|t| t.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(app.visible_ids(), &[1]);
    }

    #[test]
    fn test_unrelated_keys_do_not_confirm_delete() {
        let mut app = app();
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.state(), AppState::Confirm);
        assert_eq!(app.store().len(), 2);
    }

    #[test]
    fn test_toggle_state_of_selected_only() {
        let mut app = app();
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.store().get(1).unwrap().state, State::Completed);
        assert_eq!(app.store().get(2).unwrap().state, State::Active);
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.store().get(1).unwrap().state, State::Active);
    }

    #[test]
    fn test_sort_toggles_reorder_view() {
        let mut app = app();
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.visible_ids(), &[2, 1]);
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.visible_ids(), &[1, 2]);
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.visible_ids(), &[2, 1]);
        assert_eq!(app.view_spec().sort.direction_of(SortField::Priority), Some(Direction::Desc));
        press(&mut app, KeyCode::Char('0'));
        assert_eq!(app.visible_ids(), &[1, 2]);
        // Store order never changes.
        assert_eq!(app.store().tasks().iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_category_picker_filters() {
        let mut app = app();
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.state(), AppState::CategoryPicker);
        press(&mut app, KeyCode::Down); // work
        press(&mut app, KeyCode::Down); // home
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.view_spec().category.as_deref(), Some("home"));
        assert_eq!(app.visible_ids(), &[2]);

        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.view_spec().category, None);
        assert_eq!(app.visible_ids(), &[1, 2]);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Char('q')));
        assert!(app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        press(&mut app, KeyCode::Char('a'));
        // Typing 'q' in the form is text, not quit.
        assert!(!press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn test_render_form_over_list() {
        let mut app = app();
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('a'));
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("Add Task"));
        assert!(screen.contains("Tasks (2/2)"));
        assert!(screen.contains("Categories ▲"));
    }
}
