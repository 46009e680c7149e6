//! Derived views over the current case. Everything here is pure: no
//! storage and no service calls.

mod checklist;
mod deadline;
mod summary;

pub use checklist::{checklist_for, ChecklistKind};
pub use deadline::{calculate_deadline, deadline_for, DeadlineKind};
pub use summary::{case_summary, evidence_digest};

/// Render a number without a trailing `.0` when it is whole.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}
