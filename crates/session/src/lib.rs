//! Dashboard session (state machine).
//!
//! One explicit [`SessionState`] plus the two entities it owns (catalog and
//! classifier handle). Transitions are pure functions of `(state, event)`;
//! fetching, training and inference run elsewhere and report back through
//! [`SessionCommand`]s.

pub mod actions;
pub mod labeling;
pub mod session;
pub mod state;
pub mod status;

pub use actions::{Action, AllowedActions, allowed_actions};
pub use labeling::{label_catalog, scoring_inputs};
pub use session::{
    CommandKind, EventKind, HistoryEntry, Session, SessionCommand, SessionError, SessionEvent,
    transition,
};
pub use state::{SessionState, StatusTone};
pub use status::{ModelSummary, StatusSnapshot};
