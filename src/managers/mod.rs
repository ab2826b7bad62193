// TabTrail state managers
// Managers own mutable recency state: the browser-side tracker and the launcher-side history cache.

pub mod history_manager;
pub mod recency_list;
pub mod tab_tracker;
