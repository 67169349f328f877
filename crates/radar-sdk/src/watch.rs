use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::Stream;
use radar_runtime::LiveSession;
use tokio_stream::wrappers::WatchStream;

pub use radar_runtime::{Phase, SessionView};

/// Stream of views of one observed job.
///
/// Yields the current view first, then every change. Ends after the
/// settled view once the job is finalized or not found. Intermediate views
/// may be skipped when the consumer is slower than the poller; the latest
/// view is never skipped.
pub struct LiveStream {
    session: LiveSession,
    views: WatchStream<SessionView>,
}

impl LiveStream {
    pub(crate) fn new(session: LiveSession) -> Self {
        let views = WatchStream::new(session.subscribe());
        Self { session, views }
    }

    /// The most recent view without waiting.
    pub fn latest(&self) -> SessionView {
        self.session.latest()
    }

    pub fn is_live(&self) -> bool {
        self.session.is_live()
    }

    /// Stop polling; the stream ends with the last published view.
    pub fn cancel(&self) {
        self.session.cancel();
    }

    /// Wait for polling to stop and return the final view.
    pub async fn finished(self) -> SessionView {
        self.session.finished().await
    }
}

impl Stream for LiveStream {
    type Item = SessionView;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.views).poll_next(cx)
    }
}
