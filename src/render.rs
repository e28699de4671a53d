//! Display formatting shared by the CLI table and the TUI.

use chrono::NaiveDate;

use crate::dates::days_until;
use crate::fields::*;
use crate::task::Task;

/// Format a priority for display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::High => "High",
        Priority::Medium => "Medium",
        Priority::Low => "Low",
    }
}

/// Format a task state for display.
pub fn format_state(s: State) -> &'static str {
    match s {
        State::Active => "active",
        State::Completed => "completed",
    }
}

/// Time left until the deadline: "N days", "overdue", or "-" when unknown.
pub fn format_due(deadline: Option<NaiveDate>, today: NaiveDate) -> String {
    match deadline {
        None => "-".into(),
        Some(d) => {
            let days = days_until(d, today);
            if days >= 0 {
                format!("{days} days")
            } else {
                "overdue".into()
            }
        }
    }
}

pub fn format_categories(category: &[String]) -> String {
    if category.is_empty() {
        "-".into()
    } else {
        category.join(", ")
    }
}

/// Truncate a string to a maximum width, adding an ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Render tasks as a plain-text table.
pub fn format_table(tasks: &[&Task], today: NaiveDate) -> String {
    let mut out = format!(
        "{:<14} {:<10} {:<7} {:<10} {:<20} {}\n",
        "ID", "State", "Pri", "Due", "Categories", "Title"
    );
    for t in tasks {
        out.push_str(&format!(
            "{:<14} {:<10} {:<7} {:<10} {:<20} {}\n",
            t.id,
            format_state(t.state),
            format_priority(t.priority),
            format_due(t.deadline, today),
            truncate(&format_categories(&t.category), 20),
            t.title,
        ));
    }
    out
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[&Task], today: NaiveDate) {
    print!("{}", format_table(tasks, today));
}
