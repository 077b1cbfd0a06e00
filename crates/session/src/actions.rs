use serde::{Deserialize, Serialize};

use crate::state::SessionState;

/// User-triggered commands exposed by the dashboard.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Train,
    Predict,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Train => "train",
            Action::Predict => "predict",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of actions enabled in a given state.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct AllowedActions {
    train: bool,
    predict: bool,
}

impl AllowedActions {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn contains(&self, action: Action) -> bool {
        match action {
            Action::Train => self.train,
            Action::Predict => self.predict,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.train && !self.predict
    }

    pub fn to_vec(&self) -> Vec<Action> {
        [Action::Train, Action::Predict]
            .into_iter()
            .filter(|a| self.contains(*a))
            .collect()
    }
}

/// Single source of truth for which controls are enabled.
///
/// Training is offered once, right after the catalog loads; once a model
/// exists only prediction is offered (and may be re-run).
pub fn allowed_actions(state: SessionState) -> AllowedActions {
    match state {
        SessionState::Loaded => AllowedActions {
            train: true,
            predict: false,
        },
        SessionState::Trained | SessionState::Predicted => AllowedActions {
            train: false,
            predict: true,
        },
        SessionState::Idle
        | SessionState::Loading
        | SessionState::LoadFailed
        | SessionState::Training
        | SessionState::TrainingFailed
        | SessionState::Predicting => AllowedActions::none(),
    }
}
