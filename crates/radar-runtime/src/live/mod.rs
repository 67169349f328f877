//! Live observation of a job's status, telemetry and snapshot.

mod controller;
mod poller;
mod view;

pub use controller::{FinalFetch, LiveSessionController, Transition};
pub use view::{Phase, SessionView};

use std::sync::Arc;

use radar_types::JobId;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::PollingConfig;
use crate::store::JobStore;

/// Handle to one observed job.
///
/// Polling stops when the job settles, when [`LiveSession::cancel`] is
/// called, or when the handle is dropped. Observations of different jobs
/// share nothing.
#[derive(Debug)]
pub struct LiveSession {
    id: JobId,
    rx: watch::Receiver<SessionView>,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

/// Start observing `id`. Must be called from within a tokio runtime.
pub fn observe<S>(store: Arc<S>, id: JobId, polling: PollingConfig) -> LiveSession
where
    S: JobStore + ?Sized + 'static,
{
    let (tx, rx) = watch::channel(SessionView::new(id));
    let token = CancellationToken::new();
    let handle = tokio::spawn(poller::run(store, id, polling, tx, token.clone()));

    LiveSession {
        id,
        rx,
        token,
        handle: Some(handle),
    }
}

impl LiveSession {
    pub fn id(&self) -> JobId {
        self.id
    }

    /// The most recently published view.
    pub fn latest(&self) -> SessionView {
        self.rx.borrow().clone()
    }

    pub fn is_live(&self) -> bool {
        self.rx.borrow().is_live
    }

    /// Wait for the next published view. `None` once polling has stopped
    /// and the final view has been seen.
    pub async fn changed(&mut self) -> Option<SessionView> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// An independent receiver of the same views.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.rx.clone()
    }

    /// Stop polling. Responses still in flight are discarded.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for polling to stop and return the last view.
    pub async fn finished(mut self) -> SessionView {
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            tracing::warn!(job = %self.id, error = %e, "live session task ended abnormally");
        }
        self.latest()
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
