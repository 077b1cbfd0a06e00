use serde::{Deserialize, Serialize};

/// Where the session is in its load → train → predict lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Loading,
    Loaded,
    /// Terminal: the item source failed; a new session is required.
    LoadFailed,
    Training,
    Trained,
    /// Terminal: fitting the classifier failed; a new session is required.
    TrainingFailed,
    Predicting,
    Predicted,
}

/// Display colour class for the status badge.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Idle,
    Processing,
    Success,
    Error,
}

impl SessionState {
    pub const ALL: [SessionState; 9] = [
        SessionState::Idle,
        SessionState::Loading,
        SessionState::Loaded,
        SessionState::LoadFailed,
        SessionState::Training,
        SessionState::Trained,
        SessionState::TrainingFailed,
        SessionState::Predicting,
        SessionState::Predicted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Loading => "loading",
            SessionState::Loaded => "loaded",
            SessionState::LoadFailed => "load_failed",
            SessionState::Training => "training",
            SessionState::Trained => "trained",
            SessionState::TrainingFailed => "training_failed",
            SessionState::Predicting => "predicting",
            SessionState::Predicted => "predicted",
        }
    }

    /// Status line shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            SessionState::Idle => "Waiting for user action...",
            SessionState::Loading => "Fetching product data from API...",
            SessionState::Loaded => "Data loaded. Ready to train model.",
            SessionState::LoadFailed => "Error loading API data.",
            SessionState::Training => "Training Model... Please wait.",
            SessionState::Trained => "Model Trained! Ready to predict.",
            SessionState::TrainingFailed => "Error training model.",
            SessionState::Predicting => "Analyzing 100 products...",
            SessionState::Predicted => "Analysis Complete. Check Dashboard below.",
        }
    }

    pub fn tone(&self) -> StatusTone {
        match self {
            SessionState::Idle => StatusTone::Idle,
            SessionState::Loading | SessionState::Training | SessionState::Predicting => {
                StatusTone::Processing
            }
            SessionState::Loaded | SessionState::Trained | SessionState::Predicted => {
                StatusTone::Success
            }
            SessionState::LoadFailed | SessionState::TrainingFailed => StatusTone::Error,
        }
    }

    /// An operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.tone() == StatusTone::Processing
    }

    /// No transition leaves this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::LoadFailed | SessionState::TrainingFailed)
    }
}

impl core::fmt::Display for SessionState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_states_are_exactly_the_in_flight_ones() {
        let busy: Vec<_> = SessionState::ALL.iter().filter(|s| s.is_busy()).copied().collect();
        assert_eq!(
            busy,
            vec![
                SessionState::Loading,
                SessionState::Training,
                SessionState::Predicting
            ]
        );
    }

    #[test]
    fn failures_use_the_error_tone() {
        for s in SessionState::ALL {
            assert_eq!(s.is_terminal(), s.tone() == StatusTone::Error, "{s}");
        }
    }

    #[test]
    fn messages_are_distinct() {
        let mut msgs: Vec<_> = SessionState::ALL.iter().map(|s| s.message()).collect();
        msgs.sort();
        msgs.dedup();
        assert_eq!(msgs.len(), SessionState::ALL.len());
    }
}
