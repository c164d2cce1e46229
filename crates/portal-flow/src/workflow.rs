//! Form instances and the submit lifecycle

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::config::WorkflowConfig;
use crate::error::FlowError;
use crate::selection::{FormSelection, SelectionState, ValidationFailure};
use crate::sink::{self, ArtifactSink};
use crate::transport::{Artifact, HttpTransport};

static NEXT_FORM_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle state of a form.
///
/// `Succeeded` and `Failed` are passed through on the way back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormState {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

impl std::fmt::Display for FormState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormState::Idle => write!(f, "idle"),
            FormState::Validating => write!(f, "validating"),
            FormState::Submitting => write!(f, "submitting"),
            FormState::Succeeded => write!(f, "succeeded"),
            FormState::Failed => write!(f, "failed"),
        }
    }
}

/// How the latest finished attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LastResult {
    Succeeded,
    Failed,
    Invalid,
}

#[derive(Debug)]
struct FormStatus {
    state: FormState,
    last: Option<LastResult>,
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One rendered form: its config, current picks and lifecycle state
#[derive(Debug)]
pub struct FormHandle {
    id: u64,
    config: Arc<WorkflowConfig>,
    selection: Mutex<FormSelection>,
    status: Mutex<FormStatus>,
    in_flight: AtomicBool,
}

impl FormHandle {
    pub fn new(config: Arc<WorkflowConfig>) -> Self {
        Self {
            id: NEXT_FORM_ID.fetch_add(1, Ordering::Relaxed),
            config,
            selection: Mutex::new(FormSelection::default()),
            status: Mutex::new(FormStatus {
                state: FormState::Idle,
                last: None,
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn config(&self) -> &Arc<WorkflowConfig> {
        &self.config
    }

    pub fn state(&self) -> FormState {
        lock(&self.status).state
    }

    pub fn last_result(&self) -> Option<LastResult> {
        lock(&self.status).last
    }

    /// Whether a submission is currently running
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn select(&self, field: &str, path: PathBuf) -> Result<(), FlowError> {
        let previous = lock(&self.selection).set(&self.config, field, path)?;
        if let Some(previous) = previous {
            log::debug!("form {}: replaced {} pick {}", self.id, field, previous.display());
        }
        Ok(())
    }

    pub fn clear(&self, field: &str) -> Result<(), FlowError> {
        lock(&self.selection).clear(&self.config, field)?;
        Ok(())
    }

    pub fn picked(&self, field: &str) -> Option<PathBuf> {
        lock(&self.selection).get(field).map(|p| p.to_path_buf())
    }

    fn snapshot(&self) -> Result<SelectionState, ValidationFailure> {
        lock(&self.selection).snapshot(&self.config)
    }

    fn transition(&self, to: FormState) {
        let mut status = lock(&self.status);
        log::debug!("form {} ({}): {} -> {}", self.id, self.config.id, status.state, to);
        status.state = to;
    }

    /// Claim the form for one submission, unless one is already running
    fn begin(&self) -> Option<InFlight<'_>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }
        self.transition(FormState::Validating);
        Some(InFlight { form: self })
    }
}

/// Held for the duration of one submission; returns the form to `Idle`
struct InFlight<'a> {
    form: &'a FormHandle,
}

impl InFlight<'_> {
    fn finish(self, result: LastResult) {
        match result {
            LastResult::Succeeded => self.form.transition(FormState::Succeeded),
            LastResult::Failed => self.form.transition(FormState::Failed),
            LastResult::Invalid => {}
        }
        lock(&self.form.status).last = Some(result);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.form.transition(FormState::Idle);
        self.form.in_flight.store(false, Ordering::SeqCst);
    }
}

/// What a successful submission left on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveredArtifact {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub sha256: String,
    pub content_type: Option<String>,
}

/// Result of one submit call
#[derive(Debug)]
pub enum SubmitOutcome {
    Delivered(DeliveredArtifact),
    /// Refused locally, nothing was sent
    Invalid(ValidationFailure),
    Failed(FlowError),
    /// Another submission of the same form is still running
    Busy,
}

impl SubmitOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            SubmitOutcome::Delivered(_) => "succeeded",
            SubmitOutcome::Invalid(_) => "invalid",
            SubmitOutcome::Failed(_) => "failed",
            SubmitOutcome::Busy => "busy",
        }
    }

    pub fn delivered(&self) -> Option<&DeliveredArtifact> {
        match self {
            SubmitOutcome::Delivered(artifact) => Some(artifact),
            _ => None,
        }
    }
}

/// The upload-process-download pipeline shared by every process
#[derive(Debug)]
pub struct Workflow<S> {
    transport: HttpTransport,
    sink: Arc<S>,
}

impl<S: ArtifactSink + 'static> Workflow<S> {
    pub fn new(transport: HttpTransport, sink: S) -> Self {
        Self {
            transport,
            sink: Arc::new(sink),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Validate, post and deliver. Every failure is folded into the outcome;
    /// the form is back to `Idle` once this returns.
    pub async fn submit(&self, form: &FormHandle) -> SubmitOutcome {
        self.submit_observed(form, |_| {}).await
    }

    /// Like [`Workflow::submit`], calling `on_sending` once validation passed
    /// and right before the request goes out.
    pub async fn submit_observed<F>(&self, form: &FormHandle, on_sending: F) -> SubmitOutcome
    where
        F: FnOnce(&FormHandle),
    {
        let Some(flight) = form.begin() else {
            log::debug!("form {}: submission already in flight", form.id());
            return SubmitOutcome::Busy;
        };

        let selection = match form.snapshot() {
            Ok(selection) => selection,
            Err(failure) => {
                flight.finish(LastResult::Invalid);
                return SubmitOutcome::Invalid(failure);
            }
        };

        form.transition(FormState::Submitting);
        on_sending(form);

        match self.run(form.config(), selection).await {
            Ok(delivered) => {
                flight.finish(LastResult::Succeeded);
                SubmitOutcome::Delivered(delivered)
            }
            Err(e) => {
                flight.finish(LastResult::Failed);
                SubmitOutcome::Failed(e)
            }
        }
    }

    async fn run(
        &self,
        config: &WorkflowConfig,
        selection: SelectionState,
    ) -> Result<DeliveredArtifact, FlowError> {
        let url = self.transport.endpoint_url(&config.endpoint);
        let payload = selection.into_payload(url.as_str()).await?;

        log::info!("submit: {} -> POST {}", config.id, url);
        let artifact = self.transport.post_multipart(&url, payload).await?;

        self.save(config, artifact).await
    }

    /// Hash and deliver on the blocking pool so large artifacts do not stall
    /// the runtime.
    async fn save(
        &self,
        config: &WorkflowConfig,
        artifact: Artifact,
    ) -> Result<DeliveredArtifact, FlowError> {
        let target = Arc::clone(&self.sink);
        let file_name = config.output_filename.clone();

        let saved = tokio::task::spawn_blocking(move || {
            let path = sink::deliver(target.as_ref(), &artifact, &file_name)?;
            Ok::<_, io::Error>(DeliveredArtifact {
                path,
                size_bytes: artifact.len() as u64,
                sha256: artifact.sha256(),
                content_type: artifact.content_type,
            })
        })
        .await
        .unwrap_or_else(|e| Err(io::Error::other(format!("delivery task failed: {}", e))));

        saved.map_err(|source| FlowError::Save {
            file_name: config.output_filename.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{FormHandle, FormState, LastResult, SubmitOutcome, Workflow};
    use crate::catalog;
    use crate::sink::{ArtifactSink, DirectorySink};
    use crate::transport::{Artifact, HttpTransport};
    use std::io;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Directory sink with a slow disk
    struct SlowSink {
        inner: DirectorySink,
        delay: Duration,
    }

    impl ArtifactSink for SlowSink {
        type Ref = <DirectorySink as ArtifactSink>::Ref;

        fn create_ref(&self, artifact: &Artifact) -> io::Result<Self::Ref> {
            self.inner.create_ref(artifact)
        }

        fn trigger(&self, reference: &Self::Ref, file_name: &str) -> io::Result<PathBuf> {
            std::thread::sleep(self.delay);
            self.inner.trigger(reference, file_name)
        }

        fn revoke(&self, reference: &Self::Ref) {
            self.inner.revoke(reference)
        }
    }

    #[test]
    fn form_ids_are_unique() {
        let config = Arc::new(catalog::inventario());
        let a = FormHandle::new(config.clone());
        let b = FormHandle::new(config);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.state(), FormState::Idle);
        assert_eq!(a.last_result(), None);
    }

    #[test]
    fn form_state_display_matches_expected_strings() {
        assert_eq!(FormState::Idle.to_string(), "idle");
        assert_eq!(FormState::Validating.to_string(), "validating");
        assert_eq!(FormState::Submitting.to_string(), "submitting");
        assert_eq!(FormState::Succeeded.to_string(), "succeeded");
        assert_eq!(FormState::Failed.to_string(), "failed");
    }

    #[test]
    fn only_one_flight_at_a_time() {
        let form = FormHandle::new(Arc::new(catalog::inventario()));
        let first = form.begin().expect("first claim");
        assert!(form.is_busy());
        assert_eq!(form.state(), FormState::Validating);
        assert!(form.begin().is_none());

        drop(first);
        assert!(!form.is_busy());
        assert_eq!(form.state(), FormState::Idle);
        assert!(form.begin().is_some());
    }

    #[tokio::test]
    async fn missing_pick_is_invalid_and_form_returns_to_idle() {
        let dir = tempfile::tempdir().unwrap();
        // Port 9 (discard) is never contacted: validation fails first.
        let workflow = Workflow::new(
            HttpTransport::new("http://127.0.0.1:9").unwrap(),
            DirectorySink::new(dir.path()),
        );
        let form = FormHandle::new(Arc::new(catalog::liquidacion()));

        let outcome = workflow.submit(&form).await;

        assert!(matches!(outcome, SubmitOutcome::Invalid(_)));
        assert_eq!(outcome.status(), "invalid");
        assert_eq!(form.state(), FormState::Idle);
        assert_eq!(form.last_result(), Some(LastResult::Invalid));
        assert!(!form.is_busy());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn saving_leaves_the_runtime_free() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = Workflow::new(
            HttpTransport::new("http://127.0.0.1:9").unwrap(),
            SlowSink {
                inner: DirectorySink::new(dir.path()),
                delay: Duration::from_millis(100),
            },
        );
        let config = catalog::inventario();

        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = tokio::spawn({
            let ticks = ticks.clone();
            async move {
                let mut interval = tokio::time::interval(Duration::from_millis(1));
                loop {
                    interval.tick().await;
                    ticks.fetch_add(1, Ordering::SeqCst);
                }
            }
        });

        let artifact = Artifact {
            bytes: vec![7u8; 4 * 1024 * 1024],
            content_type: None,
        };
        let delivered = workflow.save(&config, artifact).await.unwrap();
        let during = ticks.load(Ordering::SeqCst);
        ticker.abort();

        // A save that blocked the only worker thread would leave this at zero
        assert!(during >= 5, "ticker advanced {} times during save", during);
        assert_eq!(delivered.path, dir.path().join("Inventario_Cajas.xlsx"));
        assert_eq!(delivered.size_bytes, 4 * 1024 * 1024);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn invalid_submission_is_never_reported_as_sending() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = Workflow::new(
            HttpTransport::new("http://127.0.0.1:9").unwrap(),
            DirectorySink::new(dir.path()),
        );
        let form = FormHandle::new(Arc::new(catalog::agendamiento_v2()));
        form.select("manager_file", PathBuf::from("/data/m.xlsx")).unwrap();

        let mut sent = 0;
        let outcome = workflow.submit_observed(&form, |_| sent += 1).await;

        assert!(matches!(outcome, SubmitOutcome::Invalid(_)));
        assert_eq!(sent, 0);
    }

    #[tokio::test]
    async fn busy_submission_is_never_reported_as_sending() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = Workflow::new(
            HttpTransport::new("http://127.0.0.1:9").unwrap(),
            DirectorySink::new(dir.path()),
        );
        let form = FormHandle::new(Arc::new(catalog::inventario()));
        let _flight = form.begin().unwrap();

        let mut sent = 0;
        let outcome = workflow.submit_observed(&form, |_| sent += 1).await;

        assert!(matches!(outcome, SubmitOutcome::Busy));
        assert_eq!(sent, 0);
    }

    #[test]
    fn picks_survive_between_attempts() {
        let form = FormHandle::new(Arc::new(catalog::agendamiento_v2()));
        form.select("manager_file", PathBuf::from("/data/m.xlsx")).unwrap();
        form.select("bitrix_file", PathBuf::from("/data/b.xlsx")).unwrap();
        form.clear("bitrix_file").unwrap();

        assert_eq!(form.picked("manager_file"), Some(PathBuf::from("/data/m.xlsx")));
        assert_eq!(form.picked("bitrix_file"), None);
        assert!(form.select("file", PathBuf::from("/data/x.xlsx")).is_err());
    }
}
