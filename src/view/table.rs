use super::clipboard::ClipboardSink;
use crate::executor::QueryResult;
use crate::value::Value;
use std::cmp::Ordering;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Stateful view over one query outcome: either a result or a terminal
/// error string, plus client-side sort state. Independent of how the result
/// was obtained.
#[derive(Default)]
pub struct ResultView {
    result: Option<QueryResult>,
    error: Option<String>,
    sort: Option<(usize, SortDirection)>,
}

impl ResultView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fresh result, replacing any prior result or error. Sort
    /// state is kept; the parent coordinator calls `reset_sort` when it
    /// starts a new query.
    pub fn set_result(&mut self, result: QueryResult) {
        self.result = Some(result);
        self.error = None;
    }

    /// An error is terminal for the attempt: the message replaces the table.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.result = None;
    }

    pub fn result(&self) -> Option<&QueryResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Header click: same column flips direction, a new column starts
    /// ascending.
    pub fn toggle_sort(&mut self, column: usize) {
        self.sort = match self.sort {
            Some((current, SortDirection::Ascending)) if current == column => {
                Some((column, SortDirection::Descending))
            }
            Some((current, SortDirection::Descending)) if current == column => {
                Some((column, SortDirection::Ascending))
            }
            _ => Some((column, SortDirection::Ascending)),
        };
    }

    /// External reset hook for parent coordinators.
    pub fn reset_sort(&mut self) {
        self.sort = None;
    }

    pub fn sort_state(&self) -> Option<(usize, SortDirection)> {
        self.sort
    }

    /// Rows in display order: sorted when a valid sort column is set,
    /// original order otherwise.
    pub fn sorted_rows(&self) -> Vec<&Vec<Value>> {
        let Some(result) = &self.result else {
            return Vec::new();
        };
        let mut rows: Vec<&Vec<Value>> = result.rows.iter().collect();
        if let Some((column, direction)) = self.sort {
            if column < result.columns.len() {
                rows.sort_by(|a, b| compare_cells(&a[column], &b[column], direction));
            }
        }
        rows
    }

    /// CSV of the currently displayed order, or None when there is nothing
    /// to export.
    pub fn to_csv(&self) -> Option<String> {
        let result = self.result.as_ref()?;
        Some(super::csv::to_csv(&result.columns, self.sorted_rows()))
    }

    /// Write the CSV document to the sink. Returns true when the copy
    /// completed (the caller owns the user-facing notification); failures
    /// are logged and reported as false, never as an error.
    pub fn copy_to_clipboard(&self, sink: &mut dyn ClipboardSink) -> bool {
        let Some(document) = self.to_csv() else {
            return false;
        };
        match sink.set_text(document) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "clipboard write failed; CSV export dropped");
                false
            }
        }
    }
}

/// Nulls order after real values whichever direction is active; the
/// direction applies to the non-null ordering only. Numeric pairs compare
/// numerically, everything else by folded text.
fn compare_cells(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => compare_text(&a.render(), &b.render()),
            };
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        }
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    let folded = a.to_lowercase().cmp(&b.to_lowercase());
    if folded == Ordering::Equal {
        a.cmp(b)
    } else {
        folded
    }
}
