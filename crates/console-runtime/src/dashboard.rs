//! View-scoped dashboard mount.
//!
//! A [`DashboardMount`] exists exactly while the dashboard view is shown. It
//! owns one [`StreamSession`] and one [`TelemetryPresenter`]; mounting opens
//! the session and [`DashboardMount::unmount`] consumes the mount, so the
//! session is closed exactly once per mount.

use url::Url;

use console_core::ConnectionState;

use crate::presentation::{DashboardSnapshot, TelemetryPresenter};
use crate::session::{SessionEvent, SessionOptions, StreamSession};

pub struct DashboardMount {
    session: StreamSession,
    presenter: TelemetryPresenter,
}

impl DashboardMount {
    /// Open a session to `endpoint` and start with fallback values.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(endpoint: Url, options: SessionOptions) -> Self {
        tracing::debug!(endpoint = %endpoint, "mounting dashboard");
        let mut session = StreamSession::new(options);
        session.open(endpoint);

        let mut presenter = TelemetryPresenter::new();
        presenter.on_state(session.state());

        Self { session, presenter }
    }

    /// Apply every buffered event without waiting. Returns how many were
    /// applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.session.try_next_event() {
            self.dispatch(event);
            applied += 1;
        }
        self.presenter.on_state(self.session.state());
        applied
    }

    /// Wait for one event and apply it. Returns `false` once the stream has
    /// ended.
    pub async fn next(&mut self) -> bool {
        match self.session.next_event().await {
            Some(event) => {
                self.dispatch(event);
                true
            }
            None => {
                self.presenter.on_state(self.session.state());
                false
            }
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.presenter.snapshot()
    }

    pub fn connection(&self) -> ConnectionState {
        self.session.state()
    }

    pub fn endpoint(&self) -> Option<&Url> {
        self.session.endpoint()
    }

    /// Close the session. Returns `true` if the connection was released by
    /// this call.
    pub fn unmount(mut self) -> bool {
        let released = self.session.close();
        tracing::debug!(released, "dashboard unmounted");
        released
    }

    /// The session is the authority on connection state; the presenter
    /// mirrors it after every state event.
    fn dispatch(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::State(_) => self.presenter.on_state(self.session.state()),
            SessionEvent::Frame(text) => {
                // Undecodable frames are logged and counted by the presenter.
                let _ = self.presenter.on_frame(&text);
            }
        }
    }
}
