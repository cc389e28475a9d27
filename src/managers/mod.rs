// Extra bars state managers
// Managers own mutable state: the bar model and the in-progress drag session.

pub mod bar_manager;
pub mod drag_tracker;
