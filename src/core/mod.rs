//! Core business logic - framework-agnostic ledger, cascade and synchronisation
//! operations. Every function takes a `SeaORM` connection (or transaction) and
//! returns the crate's [`Result`](crate::errors::Result).

/// Business-day due date arithmetic
pub mod calendar;
/// Competitions and races
pub mod competition;
/// Convocation groups and their cost allocation cascade
pub mod convocation;
/// Events
pub mod event;
/// Event type catalogue and seeding
pub mod event_type;
/// Bulk key-value reconciliation over the club tables
pub mod key_value;
/// Invoice and movement writers shared by the cascades
pub mod ledger;
/// Products and stock
pub mod product;
/// Competition registrations and their billing cascade
pub mod registration;
/// Sales and their billing cascade
pub mod sale;
/// Members and athletes
pub mod user;

/// Generates a fresh text identifier for a new row.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
