use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use restock_ai::ClassifierHandle;
use restock_core::{Aggregate, AggregateRoot, SessionId};
use restock_inventory::{CATALOG_SIZE, Catalog};

use crate::actions::{Action, allowed_actions};
use crate::state::SessionState;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("{action} is not allowed while the session is {state}")]
    ActionNotAllowed { action: Action, state: SessionState },

    #[error("{command} cannot be applied while the session is {state}")]
    InvalidTransition {
        command: &'static str,
        state: SessionState,
    },

    #[error("predict requested but no trained model exists")]
    MissingModel,

    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
}

/// What a command asks the session to do.
///
/// `Start`, `RequestTrain` and `RequestPredict` come from the user; the
/// `Complete*`/`Fail*` kinds report the outcome of work run off the session.
#[derive(Debug, Clone)]
pub enum CommandKind {
    Start,
    CompleteLoad(Catalog),
    FailLoad(String),
    RequestTrain,
    CompleteTraining(ClassifierHandle),
    FailTraining(String),
    RequestPredict,
    CompletePrediction(Catalog),
    FailPrediction(String),
}

impl CommandKind {
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Start => "start",
            CommandKind::CompleteLoad(_) => "complete_load",
            CommandKind::FailLoad(_) => "fail_load",
            CommandKind::RequestTrain => "request_train",
            CommandKind::CompleteTraining(_) => "complete_training",
            CommandKind::FailTraining(_) => "fail_training",
            CommandKind::RequestPredict => "request_predict",
            CommandKind::CompletePrediction(_) => "complete_prediction",
            CommandKind::FailPrediction(_) => "fail_prediction",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionCommand {
    pub kind: CommandKind,
    pub occurred_at: DateTime<Utc>,
}

impl SessionCommand {
    pub fn new(kind: CommandKind, occurred_at: DateTime<Utc>) -> Self {
        Self { kind, occurred_at }
    }

    pub fn now(kind: CommandKind) -> Self {
        Self::new(kind, Utc::now())
    }
}

/// What happened to the session.
#[derive(Debug, Clone)]
pub enum EventKind {
    LoadStarted,
    CatalogLoaded(Catalog),
    LoadFailed(String),
    TrainingStarted,
    ModelTrained(ClassifierHandle),
    TrainingFailed(String),
    PredictionStarted,
    CatalogLabeled(Catalog),
    /// Inference failed mid-pass; the model and previous catalog are kept.
    PredictionFailed(String),
}

impl EventKind {
    pub fn event_type(&self) -> &'static str {
        match self {
            EventKind::LoadStarted => "session.load_started",
            EventKind::CatalogLoaded(_) => "session.catalog_loaded",
            EventKind::LoadFailed(_) => "session.load_failed",
            EventKind::TrainingStarted => "session.training_started",
            EventKind::ModelTrained(_) => "session.model_trained",
            EventKind::TrainingFailed(_) => "session.training_failed",
            EventKind::PredictionStarted => "session.prediction_started",
            EventKind::CatalogLabeled(_) => "session.catalog_labeled",
            EventKind::PredictionFailed(_) => "session.prediction_failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub kind: EventKind,
    pub occurred_at: DateTime<Utc>,
}

/// One applied event, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub event_type: &'static str,
    pub state: SessionState,
    pub occurred_at: DateTime<Utc>,
}

/// The transition table: `(state, event) -> next state`, `None` if the event
/// is not valid in `state`.
pub fn transition(state: SessionState, event: &EventKind) -> Option<SessionState> {
    use SessionState as S;

    match (state, event) {
        (S::Idle, EventKind::LoadStarted) => Some(S::Loading),
        (S::Loading, EventKind::CatalogLoaded(_)) => Some(S::Loaded),
        (S::Loading, EventKind::LoadFailed(_)) => Some(S::LoadFailed),
        (S::Loaded, EventKind::TrainingStarted) => Some(S::Training),
        (S::Training, EventKind::ModelTrained(_)) => Some(S::Trained),
        (S::Training, EventKind::TrainingFailed(_)) => Some(S::TrainingFailed),
        (S::Trained | S::Predicted, EventKind::PredictionStarted) => Some(S::Predicting),
        (S::Predicting, EventKind::CatalogLabeled(_)) => Some(S::Predicted),
        (S::Predicting, EventKind::PredictionFailed(_)) => Some(S::Trained),
        _ => None,
    }
}

/// Aggregate root: one dashboard session.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    state: SessionState,
    catalog: Catalog,
    model: Option<ClassifierHandle>,
    since: DateTime<Utc>,
    history: Vec<HistoryEntry>,
    version: u64,
}

impl Session {
    pub fn new(id: SessionId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            state: SessionState::Idle,
            catalog: Catalog::empty(),
            model: None,
            since: created_at,
            history: Vec::new(),
            version: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn model(&self) -> Option<&ClassifierHandle> {
        self.model.as_ref()
    }

    /// When the current state was entered.
    pub fn since(&self) -> DateTime<Utc> {
        self.since
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Handle a command and apply the resulting events.
    pub fn execute(&mut self, command: &SessionCommand) -> Result<Vec<SessionEvent>, SessionError> {
        let events = self.handle(command).inspect_err(|e| {
            warn!(session = %self.id, command = command.kind.name(), error = %e, "command rejected");
        })?;
        for event in &events {
            self.apply(event);
        }
        Ok(events)
    }

    fn ensure_allowed(&self, action: Action) -> Result<(), SessionError> {
        if allowed_actions(self.state).contains(action) {
            Ok(())
        } else {
            Err(SessionError::ActionNotAllowed {
                action,
                state: self.state,
            })
        }
    }

    fn ensure_transition(&self, command: &'static str, event: &EventKind) -> Result<(), SessionError> {
        match transition(self.state, event) {
            Some(_) => Ok(()),
            None => Err(SessionError::InvalidTransition {
                command,
                state: self.state,
            }),
        }
    }

    fn decide(&self, kind: &CommandKind) -> Result<EventKind, SessionError> {
        let event = match kind {
            CommandKind::Start => EventKind::LoadStarted,
            CommandKind::CompleteLoad(catalog) => {
                check_full_catalog(catalog)?;
                if catalog.iter().any(|r| !r.prediction.is_pending()) {
                    return Err(SessionError::InvalidCatalog(
                        "freshly loaded records must be pending".to_string(),
                    ));
                }
                EventKind::CatalogLoaded(catalog.clone())
            }
            CommandKind::FailLoad(reason) => EventKind::LoadFailed(reason.clone()),
            CommandKind::RequestTrain => {
                self.ensure_allowed(Action::Train)?;
                EventKind::TrainingStarted
            }
            CommandKind::CompleteTraining(model) => EventKind::ModelTrained(model.clone()),
            CommandKind::FailTraining(reason) => EventKind::TrainingFailed(reason.clone()),
            CommandKind::RequestPredict => {
                self.ensure_allowed(Action::Predict)?;
                if self.model.is_none() {
                    return Err(SessionError::MissingModel);
                }
                EventKind::PredictionStarted
            }
            CommandKind::CompletePrediction(catalog) => {
                check_full_catalog(catalog)?;
                if !catalog.is_fully_labeled() {
                    return Err(SessionError::InvalidCatalog(
                        "every record must be labeled after a prediction pass".to_string(),
                    ));
                }
                let same_rows = catalog
                    .iter()
                    .zip(self.catalog.iter())
                    .all(|(new, old)| new.id == old.id && new.features == old.features);
                if !same_rows {
                    return Err(SessionError::InvalidCatalog(
                        "labeled catalog does not match the session's records".to_string(),
                    ));
                }
                EventKind::CatalogLabeled(catalog.clone())
            }
            CommandKind::FailPrediction(reason) => EventKind::PredictionFailed(reason.clone()),
        };

        self.ensure_transition(kind.name(), &event)?;
        Ok(event)
    }
}

fn check_full_catalog(catalog: &Catalog) -> Result<(), SessionError> {
    if catalog.len() != CATALOG_SIZE {
        return Err(SessionError::InvalidCatalog(format!(
            "expected {CATALOG_SIZE} records, got {}",
            catalog.len()
        )));
    }
    Ok(())
}

impl AggregateRoot for Session {
    type Id = SessionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Session {
    type Command = SessionCommand;
    type Event = SessionEvent;
    type Error = SessionError;

    fn apply(&mut self, event: &Self::Event) {
        let Some(next) = transition(self.state, &event.kind) else {
            warn!(session = %self.id, event = event.kind.event_type(), state = %self.state, "ignoring out-of-order event");
            return;
        };

        match &event.kind {
            EventKind::CatalogLoaded(catalog) | EventKind::CatalogLabeled(catalog) => {
                // Replaced wholesale.
                self.catalog = catalog.clone();
            }
            EventKind::LoadFailed(_) => {
                self.catalog = Catalog::empty();
            }
            EventKind::ModelTrained(model) => {
                self.model = Some(model.clone());
            }
            EventKind::LoadStarted
            | EventKind::TrainingStarted
            | EventKind::TrainingFailed(_)
            | EventKind::PredictionStarted
            | EventKind::PredictionFailed(_) => {}
        }

        debug!(session = %self.id, from = %self.state, to = %next, event = event.kind.event_type(), "session transition");

        self.state = next;
        self.since = event.occurred_at;
        self.history.push(HistoryEntry {
            event_type: event.kind.event_type(),
            state: next,
            occurred_at: event.occurred_at,
        });
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let kind = self.decide(&command.kind)?;
        Ok(vec![SessionEvent {
            kind,
            occurred_at: command.occurred_at,
        }])
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use restock_ai::{ReorderClassifier, TrainingConfig};
    use restock_inventory::{CatalogGenerator, Prediction};

    use super::*;
    use crate::labeling::{label_catalog, scoring_inputs};

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn cmd(kind: CommandKind) -> SessionCommand {
        SessionCommand::new(kind, test_time())
    }

    fn test_catalog(seed: u64) -> Catalog {
        let base: Vec<u8> = vec![0; 20];
        CatalogGenerator::default()
            .generate(base.as_slice(), &mut StdRng::seed_from_u64(seed))
            .unwrap()
    }

    fn test_model() -> ClassifierHandle {
        ReorderClassifier::new(TrainingConfig::default().with_epochs(5))
            .train(&mut StdRng::seed_from_u64(1))
            .unwrap()
            .into_handle()
    }

    fn loaded_session() -> Session {
        let mut s = Session::new(SessionId::new(), test_time());
        s.execute(&cmd(CommandKind::Start)).unwrap();
        s.execute(&cmd(CommandKind::CompleteLoad(test_catalog(1)))).unwrap();
        s
    }

    fn trained_session() -> Session {
        let mut s = loaded_session();
        s.execute(&cmd(CommandKind::RequestTrain)).unwrap();
        s.execute(&cmd(CommandKind::CompleteTraining(test_model()))).unwrap();
        s
    }

    fn predict_pass(s: &mut Session) {
        s.execute(&cmd(CommandKind::RequestPredict)).unwrap();
        let model = s.model().unwrap().clone();
        let scores: Vec<f64> = scoring_inputs(s.catalog())
            .into_iter()
            .map(|x| model.predict(x).unwrap())
            .collect();
        let labeled = label_catalog(s.catalog(), &scores).unwrap();
        s.execute(&cmd(CommandKind::CompletePrediction(labeled))).unwrap();
    }

    #[test]
    fn new_session_is_idle_and_empty() {
        let s = Session::new(SessionId::new(), test_time());
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.catalog().is_empty());
        assert!(s.model().is_none());
        assert_eq!(s.version(), 0);
    }

    #[test]
    fn happy_path_walks_every_state() {
        let mut s = trained_session();
        assert_eq!(s.state(), SessionState::Trained);
        assert_eq!(s.catalog().count(Prediction::Pending), 100);

        predict_pass(&mut s);
        assert_eq!(s.state(), SessionState::Predicted);
        assert!(s.catalog().is_fully_labeled());
        for r in s.catalog().iter() {
            let score = r.score.unwrap();
            assert!((0.0..=1.0).contains(&score));
            assert_eq!((score * 100.0).round() / 100.0, score);
        }

        let states: Vec<_> = s.history().iter().map(|h| h.state).collect();
        assert_eq!(
            states,
            vec![
                SessionState::Loading,
                SessionState::Loaded,
                SessionState::Training,
                SessionState::Trained,
                SessionState::Predicting,
                SessionState::Predicted,
            ]
        );
        assert_eq!(s.version(), 6);
    }

    #[test]
    fn prediction_can_be_rerun() {
        let mut s = trained_session();
        predict_pass(&mut s);
        predict_pass(&mut s);
        assert_eq!(s.state(), SessionState::Predicted);
    }

    #[test]
    fn load_failure_is_terminal_and_leaves_catalog_empty() {
        let mut s = Session::new(SessionId::new(), test_time());
        s.execute(&cmd(CommandKind::Start)).unwrap();
        s.execute(&cmd(CommandKind::FailLoad("connection refused".into())))
            .unwrap();

        assert_eq!(s.state(), SessionState::LoadFailed);
        assert!(s.catalog().is_empty());
        assert!(allowed_actions(s.state()).is_empty());

        let err = s.execute(&cmd(CommandKind::RequestTrain)).unwrap_err();
        assert_eq!(
            err,
            SessionError::ActionNotAllowed {
                action: Action::Train,
                state: SessionState::LoadFailed
            }
        );
        let err = s.execute(&cmd(CommandKind::RequestPredict)).unwrap_err();
        assert!(matches!(err, SessionError::ActionNotAllowed { action: Action::Predict, .. }));
        let err = s.execute(&cmd(CommandKind::Start)).unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { command: "start", .. }));
    }

    #[test]
    fn second_train_request_is_rejected_while_training() {
        let mut s = loaded_session();
        s.execute(&cmd(CommandKind::RequestTrain)).unwrap();
        let err = s.execute(&cmd(CommandKind::RequestTrain)).unwrap_err();
        assert_eq!(
            err,
            SessionError::ActionNotAllowed {
                action: Action::Train,
                state: SessionState::Training
            }
        );
        assert_eq!(s.state(), SessionState::Training);
    }

    #[test]
    fn retraining_is_disabled_once_a_model_exists() {
        let mut s = trained_session();
        let first = s.model().unwrap().id();
        assert!(s.execute(&cmd(CommandKind::RequestTrain)).is_err());
        predict_pass(&mut s);
        assert!(s.execute(&cmd(CommandKind::RequestTrain)).is_err());
        assert_eq!(s.model().unwrap().id(), first);
    }

    #[test]
    fn predict_is_blocked_before_training() {
        let mut s = loaded_session();
        let err = s.execute(&cmd(CommandKind::RequestPredict)).unwrap_err();
        assert!(matches!(err, SessionError::ActionNotAllowed { action: Action::Predict, .. }));
        assert!(s.catalog().iter().all(|r| r.prediction == Prediction::Pending));
    }

    #[test]
    fn training_failure_is_terminal() {
        let mut s = loaded_session();
        s.execute(&cmd(CommandKind::RequestTrain)).unwrap();
        s.execute(&cmd(CommandKind::FailTraining("diverged".into()))).unwrap();
        assert_eq!(s.state(), SessionState::TrainingFailed);
        assert!(s.model().is_none());
        assert!(allowed_actions(s.state()).is_empty());
        // The catalog that was loaded stays visible.
        assert_eq!(s.catalog().len(), 100);
    }

    #[test]
    fn completion_commands_require_the_matching_in_flight_state() {
        let mut s = loaded_session();
        let err = s
            .execute(&cmd(CommandKind::CompleteTraining(test_model())))
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { command: "complete_training", .. }));

        let err = s
            .execute(&cmd(CommandKind::CompleteLoad(test_catalog(2))))
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { .. }));
    }

    #[test]
    fn loaded_catalog_must_be_full_and_pending() {
        let mut s = Session::new(SessionId::new(), test_time());
        s.execute(&cmd(CommandKind::Start)).unwrap();

        let err = s
            .execute(&cmd(CommandKind::CompleteLoad(Catalog::empty())))
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidCatalog(_)));

        let labeled = label_catalog(&test_catalog(3), &[0.9; 100]).unwrap();
        let err = s.execute(&cmd(CommandKind::CompleteLoad(labeled))).unwrap_err();
        assert!(matches!(err, SessionError::InvalidCatalog(_)));
        assert_eq!(s.state(), SessionState::Loading);
    }

    #[test]
    fn labeled_catalog_must_match_session_records() {
        let mut s = trained_session();
        s.execute(&cmd(CommandKind::RequestPredict)).unwrap();

        let foreign = label_catalog(&test_catalog(77), &[0.2; 100]).unwrap();
        let err = s
            .execute(&cmd(CommandKind::CompletePrediction(foreign)))
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidCatalog(_)));
        assert_eq!(s.state(), SessionState::Predicting);
    }

    #[test]
    fn prediction_failure_returns_to_trained_with_model_kept() {
        let mut s = trained_session();
        s.execute(&cmd(CommandKind::RequestPredict)).unwrap();
        s.execute(&cmd(CommandKind::FailPrediction("bad row".into()))).unwrap();
        assert_eq!(s.state(), SessionState::Trained);
        assert!(s.model().is_some());
        assert_eq!(s.catalog().count(Prediction::Pending), 100);
        assert!(allowed_actions(s.state()).contains(Action::Predict));
    }

    #[test]
    fn apply_ignores_out_of_order_events() {
        let mut s = Session::new(SessionId::new(), test_time());
        s.apply(&SessionEvent {
            kind: EventKind::ModelTrained(test_model()),
            occurred_at: test_time(),
        });
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.model().is_none());
        assert_eq!(s.version(), 0);
    }

    fn arbitrary_event() -> impl Strategy<Value = u8> {
        0u8..9
    }

    fn event_for(tag: u8) -> EventKind {
        match tag {
            0 => EventKind::LoadStarted,
            1 => EventKind::CatalogLoaded(Catalog::empty()),
            2 => EventKind::LoadFailed(String::new()),
            3 => EventKind::TrainingStarted,
            4 => EventKind::TrainingFailed(String::new()),
            5 => EventKind::PredictionStarted,
            6 => EventKind::CatalogLabeled(Catalog::empty()),
            7 => EventKind::PredictionFailed(String::new()),
            _ => EventKind::LoadStarted,
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: for any event sequence, terminal states are never left,
        /// and Predicting/Predicted are unreachable without passing Trained.
        #[test]
        fn transition_table_respects_lifecycle(tags in prop::collection::vec(arbitrary_event(), 0..40)) {
            let mut state = SessionState::Idle;
            let mut seen_trained = false;
            for tag in tags {
                let event = event_for(tag);
                let before = state;
                if let Some(next) = transition(state, &event) {
                    prop_assert!(!before.is_terminal());
                    state = next;
                }
                // ModelTrained is never generated here, so Trained is unreachable.
                seen_trained |= state == SessionState::Trained;
                prop_assert!(!matches!(state, SessionState::Predicting | SessionState::Predicted) || seen_trained);
            }
        }
    }
}
