//! Risk rules, action recommendations and the caregiver summary.
//!
//! Everything here is a pure read over a [`RecordStore`](crate::db::RecordStore)
//! with an explicit `now`; nothing is written back.

pub mod actions;
pub mod detection;
pub mod helpers;
pub mod messages;
pub mod summary;
pub mod types;

pub use actions::recommend_actions;
pub use detection::evaluate_risk_flags;
pub use summary::compose_summary;
pub use types::*;
