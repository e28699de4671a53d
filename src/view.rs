//! View derivation: category filter and multi-key stable sort.
//!
//! Both stages are pure. They borrow the store's task slice and return a new
//! vector of references; the store's own order is never touched.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::fields::{Direction, SortField};
use crate::task::Task;

/// Keep the tasks whose category list contains `selector` exactly.
///
/// `None` or an empty selector returns every task in store order.
pub fn filter_by_category<'a>(tasks: &'a [Task], selector: Option<&str>) -> Vec<&'a Task> {
    match selector {
        Some(label) if !label.is_empty() => {
            tasks.iter().filter(|t| t.has_category(label)).collect()
        }
        _ => tasks.iter().collect(),
    }
}

/// One (field, direction) sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: Direction,
}

impl SortKey {
    pub fn new(field: SortField, direction: Direction) -> Self {
        SortKey { field, direction }
    }

    /// Compare two tasks on this key alone.
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let ord = compare_field(self.field, a, b);
        match self.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    /// `field` or `field:asc` / `field:desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(':') {
            Some((f, d)) => (f.parse()?, d.parse()?),
            None => (s.parse()?, Direction::Asc),
        };
        Ok(SortKey { field, direction })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        write!(f, "{}:{}", field_name(self.field), dir)
    }
}

pub fn field_name(field: SortField) -> &'static str {
    match field {
        SortField::Id => "id",
        SortField::Title => "title",
        SortField::Category => "category",
        SortField::Description => "description",
        SortField::Priority => "priority",
        SortField::Deadline => "deadline",
        SortField::State => "state",
    }
}

/// Ascending comparison of a single field.
///
/// Missing deadlines sort after every real date. State orders active before
/// completed and follows the requested direction like any other field.
fn compare_field(field: SortField, a: &Task, b: &Task) -> Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Title => a.title.cmp(&b.title),
        SortField::Category => a.category.cmp(&b.category),
        SortField::Description => a.description.cmp(&b.description),
        SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
        SortField::Deadline => match (a.deadline, b.deadline) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortField::State => a.state.cmp(&b.state),
    }
}

/// Sort `tasks` by `keys` in precedence order, in a single stable pass.
///
/// Ties on every key keep their input order. An empty key list returns the
/// input order unchanged.
pub fn sort_tasks<'a>(tasks: &[&'a Task], keys: &[SortKey]) -> Vec<&'a Task> {
    let mut out = tasks.to_vec();
    if keys.is_empty() {
        return out;
    }
    out.sort_by(|a, b| {
        keys.iter()
            .map(|k| k.compare(a, b))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    out
}

/// Ordered list of sort keys driven by per-column toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    pub fn new(keys: Vec<SortKey>) -> Self {
        let mut spec = SortSpec::default();
        for key in keys {
            if spec.position(key.field).is_none() {
                spec.keys.push(key);
            }
        }
        spec
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn position(&self, field: SortField) -> Option<usize> {
        self.keys.iter().position(|k| k.field == field)
    }

    /// Column toggle. The primary column flips direction; any other column
    /// becomes the primary key, keeping the direction it already had.
    /// Returns the direction now applied to `field`.
    pub fn toggle(&mut self, field: SortField) -> Direction {
        match self.position(field) {
            Some(0) => {
                let key = &mut self.keys[0];
                key.direction = key.direction.reversed();
                key.direction
            }
            Some(idx) => {
                let key = self.keys.remove(idx);
                self.keys.insert(0, key);
                key.direction
            }
            None => {
                self.keys.insert(0, SortKey::new(field, Direction::Asc));
                Direction::Asc
            }
        }
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn direction_of(&self, field: SortField) -> Option<Direction> {
        self.position(field).map(|i| self.keys[i].direction)
    }

    /// 1-based precedence of `field`, if it participates.
    pub fn precedence_of(&self, field: SortField) -> Option<usize> {
        self.position(field).map(|i| i + 1)
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.keys.is_empty() {
            return f.write_str("insertion order");
        }
        let parts: Vec<String> = self.keys.iter().map(|k| k.to_string()).collect();
        f.write_str(&parts.join(", "))
    }
}

/// Everything needed to derive the visible list from the store.
#[derive(Debug, Clone, Default)]
pub struct ViewSpec {
    pub category: Option<String>,
    pub sort: SortSpec,
}

/// Filter, then sort.
pub fn derive_view<'a>(tasks: &'a [Task], spec: &ViewSpec) -> Vec<&'a Task> {
    let filtered = filter_by_category(tasks, spec.category.as_deref());
    sort_tasks(&filtered, spec.sort.keys())
}
