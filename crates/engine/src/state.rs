use api_client::AnalysisGateway;
use configuration::RefreshConfig;
use core_types::{
    CorrelationFinding, CorrelationMatrix, RefreshPhase, SessionState, StatusState, TimeSeries,
    VariableCatalog,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// An immutable snapshot of everything the presentation layer may read.
///
/// A fresh snapshot is published after every state transition; observers never
/// see a half-applied change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceView {
    pub status: StatusState,
    pub session: Option<SessionState>,
    pub catalog: VariableCatalog,
    pub findings: Vec<CorrelationFinding>,
    pub matrix: Option<CorrelationMatrix>,
    pub time_series: Option<TimeSeries>,
    pub refresh: RefreshPhase,
    /// Bumped on every session or selection change.
    pub generation: u64,
}

impl WorkspaceView {
    /// No pipeline run and no visualization refresh is outstanding.
    pub fn is_settled(&self) -> bool {
        !self.status.busy && self.refresh == RefreshPhase::Idle
    }
}

/// The mutable state behind a workspace. Only touched through [`Shared::update`].
#[derive(Default)]
pub(crate) struct Inner {
    pub status: StatusState,
    pub session: Option<SessionState>,
    pub catalog: VariableCatalog,
    pub findings: Vec<CorrelationFinding>,
    pub matrix: Option<CorrelationMatrix>,
    pub time_series: Option<TimeSeries>,
    pub phase: RefreshPhase,
    pub generation: u64,
    /// Identifies the pipeline run that currently owns the session slot.
    pub run: u64,
    /// The pending debounce timer, if one is still waiting out its quiet period.
    pub debounce: Option<JoinHandle<()>>,
}

impl Inner {
    fn view(&self) -> WorkspaceView {
        WorkspaceView {
            status: self.status.clone(),
            session: self.session.clone(),
            catalog: self.catalog.clone(),
            findings: self.findings.clone(),
            matrix: self.matrix.clone(),
            time_series: self.time_series.clone(),
            refresh: self.phase,
            generation: self.generation,
        }
    }

    pub fn cancel_debounce(&mut self) {
        if let Some(handle) = self.debounce.take() {
            handle.abort();
        }
    }

    pub fn clear_visualizations(&mut self) {
        self.matrix = None;
        self.time_series = None;
    }
}

/// State shared between the workspace handle and the tasks it spawns.
pub(crate) struct Shared {
    inner: Mutex<Inner>,
    view_tx: watch::Sender<WorkspaceView>,
    pub gateway: Arc<dyn AnalysisGateway>,
    pub refresh: RefreshConfig,
}

impl Shared {
    pub fn new(gateway: Arc<dyn AnalysisGateway>, refresh: RefreshConfig) -> Self {
        let (view_tx, _) = watch::channel(WorkspaceView::default());
        Self {
            inner: Mutex::new(Inner::default()),
            view_tx,
            gateway,
            refresh,
        }
    }

    // The lock is never held across an await, so a poisoned mutex can only
    // come from a panicking closure; the state itself is still consistent.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies a transition and publishes the resulting snapshot.
    pub fn update<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = self.lock();
        let out = f(&mut inner);
        self.view_tx.send_replace(inner.view());
        out
    }

    pub fn read<R>(&self, f: impl FnOnce(&Inner) -> R) -> R {
        f(&*self.lock())
    }

    pub fn view(&self) -> WorkspaceView {
        self.view_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkspaceView> {
        self.view_tx.subscribe()
    }
}
