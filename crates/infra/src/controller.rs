//! Live session plus the background workers that drive it.
//!
//! User commands are validated synchronously against the session; the
//! expensive part (fetching, training, scoring) runs on a named worker thread
//! which reports back with a `Complete*`/`Fail*` command. Callers never wait
//! on a worker and observe progress only through later reads.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{error, info, warn};

use restock_ai::{AiJob, EpochMetrics, ReorderClassifier, ScoringJob, TrainingConfig, TrainingJob};
use restock_core::{AggregateRoot, SessionId};
use restock_inventory::{Catalog, CatalogGenerator, NamePool, Prediction};
use restock_session::{
    CommandKind, HistoryEntry, Session, SessionCommand, SessionError, SessionState,
    StatusSnapshot, label_catalog, scoring_inputs,
};

use crate::config::Config;
use crate::source::ProductSource;

#[derive(Debug, Clone, Default)]
pub struct ControllerSettings {
    /// Seeds catalog generation and training. `None` draws from OS entropy.
    pub seed: Option<u64>,
    pub training: TrainingConfig,
    pub names: NamePool,
}

impl ControllerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            seed: config.seed,
            training: TrainingConfig::default().with_epochs(config.epochs),
            names: NamePool::default(),
        }
    }
}

/// Cheap to clone; all clones drive the same session.
#[derive(Clone)]
pub struct SessionController {
    shared: Arc<Shared>,
}

struct Shared {
    session: Mutex<Session>,
    source: Arc<dyn ProductSource>,
    generator: CatalogGenerator,
    classifier: ReorderClassifier,
    seed: Option<u64>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl SessionController {
    pub fn new(source: Arc<dyn ProductSource>, settings: ControllerSettings) -> Self {
        let session = Session::new(SessionId::new(), Utc::now());
        info!(session = %session.id(), source = %source.describe(), "session created");

        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(session),
                source,
                generator: CatalogGenerator::new(settings.names),
                classifier: ReorderClassifier::new(settings.training),
                seed: settings.seed,
                workers: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn session_id(&self) -> SessionId {
        *self.shared.lock_session().id()
    }

    pub fn state(&self) -> SessionState {
        self.shared.lock_session().state()
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot::of(&self.shared.lock_session())
    }

    /// Snapshot of the current records.
    pub fn catalog(&self) -> Catalog {
        self.shared.lock_session().catalog().clone()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.shared.lock_session().history().to_vec()
    }

    /// Per-epoch metrics of the current model; empty until training completes.
    pub fn training_history(&self) -> Vec<EpochMetrics> {
        self.shared
            .lock_session()
            .model()
            .map(|m| m.report().history.clone())
            .unwrap_or_default()
    }

    /// Enter `Loading` and fetch the base item list in the background.
    pub fn start(&self) -> Result<(), SessionError> {
        self.shared.execute(CommandKind::Start)?;

        let shared = Arc::clone(&self.shared);
        self.spawn(
            "restock-load",
            move || {
                let kind = match shared.load_catalog() {
                    Ok(catalog) => {
                        info!(records = catalog.len(), "catalog loaded");
                        CommandKind::CompleteLoad(catalog)
                    }
                    Err(reason) => {
                        warn!(error = %reason, "catalog load failed");
                        CommandKind::FailLoad(reason)
                    }
                };
                shared.report(kind);
            },
            CommandKind::FailLoad,
        );
        Ok(())
    }

    /// Fire-and-forget training. `Err` only if training is not allowed now.
    pub fn request_train(&self) -> Result<(), SessionError> {
        self.shared.execute(CommandKind::RequestTrain)?;

        let job = TrainingJob::new(self.shared.classifier.clone()).with_seed(self.shared.seed);
        let shared = Arc::clone(&self.shared);
        self.spawn(
            "restock-train",
            move || {
                let name = job.name();
                let started = Instant::now();
                let kind = match job.run() {
                    Ok(model) => {
                        info!(
                            job = name,
                            model = %model.id(),
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "training finished"
                        );
                        CommandKind::CompleteTraining(model.into_handle())
                    }
                    Err(e) => {
                        warn!(job = name, error = %e, "training failed");
                        CommandKind::FailTraining(e.to_string())
                    }
                };
                shared.report(kind);
            },
            CommandKind::FailTraining,
        );
        Ok(())
    }

    /// Fire-and-forget prediction pass over every record.
    pub fn request_predict(&self) -> Result<(), SessionError> {
        let (model, catalog) = {
            let mut session = self.shared.lock_session();
            let model = session.model().cloned();
            session.execute(&SessionCommand::now(CommandKind::RequestPredict))?;
            // `RequestPredict` is only accepted when a model exists.
            let model = model.ok_or(SessionError::MissingModel)?;
            (model, session.catalog().clone())
        };

        let job = ScoringJob::new(model, scoring_inputs(&catalog));
        let shared = Arc::clone(&self.shared);
        self.spawn(
            "restock-predict",
            move || {
                let name = job.name();
                let labeled = job
                    .run()
                    .map_err(|e| e.to_string())
                    .and_then(|scores| label_catalog(&catalog, &scores).map_err(|e| e.to_string()));

                let outcome = match labeled {
                    Ok(labeled) => {
                        info!(
                            job = name,
                            reorder = labeled.count(Prediction::Reorder),
                            sufficient = labeled.count(Prediction::Sufficient),
                            "prediction pass finished"
                        );
                        shared
                            .execute(CommandKind::CompletePrediction(labeled))
                            .map_err(|e| e.to_string())
                    }
                    Err(reason) => Err(reason),
                };

                if let Err(reason) = outcome {
                    warn!(job = name, error = %reason, "prediction failed");
                    shared.report(CommandKind::FailPrediction(reason));
                }
            },
            CommandKind::FailPrediction,
        );
        Ok(())
    }

    /// Poll until no operation is in flight or `timeout` elapses.
    pub fn wait_until_settled(&self, timeout: Duration) -> SessionState {
        let deadline = Instant::now() + timeout;
        loop {
            let state = self.state();
            if !state.is_busy() || Instant::now() >= deadline {
                return state;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    /// Block until every spawned worker has exited.
    pub fn join_workers(&self) {
        let handles: Vec<_> = self.shared.lock_workers().drain(..).collect();
        for handle in handles {
            if handle.join().is_err() {
                error!("session worker panicked");
            }
        }
    }

    fn spawn<F>(&self, name: &'static str, work: F, on_spawn_error: fn(String) -> CommandKind)
    where
        F: FnOnce() + Send + 'static,
    {
        match thread::Builder::new().name(name.to_string()).spawn(work) {
            Ok(handle) => {
                let mut workers = self.shared.lock_workers();
                workers.retain(|h| !h.is_finished());
                workers.push(handle);
            }
            Err(e) => {
                error!(worker = name, error = %e, "failed to spawn worker");
                self.shared
                    .report(on_spawn_error(format!("failed to spawn {name}: {e}")));
            }
        }
    }
}

impl Shared {
    // A panicking worker must not wedge the dashboard; the session itself is
    // only mutated through `execute`, which leaves it consistent.
    fn lock_session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_workers(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn execute(&self, kind: CommandKind) -> Result<(), SessionError> {
        self.lock_session()
            .execute(&SessionCommand::now(kind))
            .map(|_| ())
    }

    /// Deliver a worker outcome. Rejection is logged, never propagated.
    fn report(&self, kind: CommandKind) {
        let command = kind.name();
        if let Err(e) = self.execute(kind) {
            error!(command, error = %e, "worker outcome rejected");
        }
    }

    fn load_catalog(&self) -> Result<Catalog, String> {
        let items = self.source.fetch().map_err(|e| e.to_string())?;
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.generator
            .generate(items.as_slice(), &mut rng)
            .map_err(|e| e.to_string())
    }
}
