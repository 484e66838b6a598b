use crate::remote::client::RemoteClient;
use crate::workflow::config::AnalyzerConfig;
use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use retinacore::inference::{ConfidenceSynthesizer, RulePredictor, UploadValidator};
use retinacore::interface::{HistoryEntry, PredictionResult, Upload};
use retinacore::prelude::{Predictor, RetinaError, RetinaResult};
use retinacore::report::{render_report, report_file_name};
use retinacore::storage::{FileStore, HistoryStore, KeyValueStore};
use retinacore::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

enum Backend {
    Local(Mutex<RulePredictor<StdRng>>),
    Remote(RemoteClient),
}

/// Marks a prediction as pending; released on drop.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> RetinaResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RetinaError::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A rendered report ready to be saved or served.
pub struct Report {
    pub file_name: String,
    pub text: String,
}

/// Drives one prediction at a time from upload to persisted history entry.
pub struct Runner<S = FileStore> {
    config: AnalyzerConfig,
    backend: Backend,
    validator: UploadValidator,
    history: Mutex<HistoryStore<S>>,
    metrics: MetricsRecorder,
    in_flight: AtomicBool,
    logger: LogManager,
}

impl Runner<FileStore> {
    /// Runner persisting to the configured history directory.
    pub fn from_config(config: AnalyzerConfig) -> RetinaResult<Self> {
        let storage = FileStore::new(&config.history_dir);
        Self::new(config, storage)
    }
}

impl<S: KeyValueStore> Runner<S> {
    pub fn new(config: AnalyzerConfig, storage: S) -> RetinaResult<Self> {
        let backend = match config.mode.resolve_mode() {
            Some(mode) => {
                let synthesizer = ConfidenceSynthesizer::new(config.synthesizer_config())?;
                let random = match config.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                Backend::Local(Mutex::new(RulePredictor::new(mode, synthesizer, random)))
            }
            None => {
                let client = RemoteClient::new(&config.backend_url)?;
                log::info!("forwarding predictions to {}", client.endpoint());
                Backend::Remote(client)
            }
        };

        Ok(Self {
            config,
            backend,
            validator: UploadValidator::new(),
            history: Mutex::new(HistoryStore::open(storage)),
            metrics: MetricsRecorder::new(),
            in_flight: AtomicBool::new(false),
            logger: LogManager::new(),
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Validates, predicts and records `upload`. This is the only place
    /// uploads are validated, for local and remote backends alike. A second
    /// call while one is pending fails with [`RetinaError::Busy`].
    pub async fn analyze(&self, upload: Upload) -> RetinaResult<HistoryEntry> {
        let _pending = InFlight::acquire(&self.in_flight)?;

        let meta = upload.meta();
        if let Err(err) = self.validator.validate(&meta) {
            self.logger.rejection(&meta.name, &err);
            self.metrics.record_rejection();
            return Err(err);
        }

        match self.predict(&upload).await {
            Ok(result) => Ok(self.record(&upload, &result)),
            Err(err) => {
                if err.is_validation() {
                    self.logger.rejection(&meta.name, &err);
                    self.metrics.record_rejection();
                } else {
                    self.metrics.record_failure();
                }
                Err(err)
            }
        }
    }

    async fn predict(&self, upload: &Upload) -> RetinaResult<PredictionResult> {
        match &self.backend {
            Backend::Local(predictor) => {
                if self.config.delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(self.config.delay_ms)).await;
                }
                Self::predict_local(predictor, upload)
            }
            Backend::Remote(client) => client.predict(upload).await,
        }
    }

    fn predict_local(
        predictor: &Mutex<RulePredictor<StdRng>>,
        upload: &Upload,
    ) -> RetinaResult<PredictionResult> {
        let mut predictor = predictor.lock().unwrap_or_else(PoisonError::into_inner);
        predictor.predict(upload)
    }

    fn record(&self, upload: &Upload, result: &PredictionResult) -> HistoryEntry {
        let created_at = Utc::now();
        let image = self.config.embed_image.then(|| upload.data_url());
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = HistoryEntry::new(
            history.next_id(created_at),
            upload.name.clone(),
            created_at,
            result,
            image,
        );
        if let Err(err) = history.append(entry.clone()) {
            log::warn!("history entry {} not persisted: {}", entry.id, err);
        }
        self.metrics.record_prediction(entry.label);
        self.logger.prediction(&entry);
        entry
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries()
            .to_vec()
    }

    pub fn clear_history(&self) -> RetinaResult<()> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear()
    }

    pub fn report(&self, id: &str) -> Option<Report> {
        let history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        history.get(id).map(|entry| Report {
            file_name: report_file_name(entry),
            text: render_report(entry),
        })
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}
