use crate::client::{ClientEvent, ClientFactory, RealtimeClient};
use crate::proxy::ProxyClient;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use voxdemo_core::TranscriptEntry;

/// How long the status label stays on "Call ended" before returning to idle.
const STATUS_RESET_DELAY: Duration = Duration::from_secs(2);

/// Capacity of the client event channel. A call produces events at human
/// conversation pace, so a small buffer is plenty.
const EVENT_BUFFER: usize = 64;

/// Where the call session currently stands.
///
/// Normal path: `Ready → Connecting → FetchingToken → Starting → Active →
/// Ended → Ready`. A failure anywhere before `Active` lands on
/// `ConnectFailed`; a runtime error during the call lands on `Failed`. There
/// is no reconnect state — a failed call needs a fresh
/// [`CallCoordinator::start_call`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    /// No session; ready to start.
    Ready,
    /// `start_call` accepted, session being set up.
    Connecting,
    /// Waiting on the backend call proxy for an access token.
    FetchingToken,
    /// Token obtained, real-time client starting.
    Starting,
    /// Conversation is live.
    Active,
    /// The call ended normally.
    Ended,
    /// The client reported a runtime error mid-call.
    Failed,
    /// The call never connected.
    ConnectFailed,
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CallStatus::Ready => "Ready to start",
            CallStatus::Connecting => "Connecting to agent...",
            CallStatus::FetchingToken => "Getting access token...",
            CallStatus::Starting => "Starting call...",
            CallStatus::Active => "Connected - Speaking with agent",
            CallStatus::Ended => "Call ended",
            CallStatus::Failed => "Call failed",
            CallStatus::ConnectFailed => "Failed to connect",
        };
        write!(f, "{label}")
    }
}

type LifecycleHook = Box<dyn Fn() + Send + Sync>;
type ErrorHook = Box<dyn Fn(&str) + Send + Sync>;
type TranscriptHook = Box<dyn Fn(&TranscriptEntry) + Send + Sync>;

/// Caller-supplied callbacks for call lifecycle notifications.
///
/// Errors never propagate past the coordinator as `Err`; every failure is
/// converted into an `on_error` invocation so the caller never needs to
/// catch. Unset hooks are simply skipped.
#[derive(Default)]
pub struct CallHooks {
    /// Fired once per session when the conversation becomes live.
    pub on_call_start: Option<LifecycleHook>,
    /// Fired when the call ends, locally or remotely.
    pub on_call_end: Option<LifecycleHook>,
    /// Fired per transcript entry, in arrival order.
    pub on_transcript: Option<TranscriptHook>,
    /// Fired with a human-readable message on any failure.
    pub on_error: Option<ErrorHook>,
}

impl CallHooks {
    fn call_start(&self) {
        if let Some(hook) = &self.on_call_start {
            hook();
        }
    }

    fn call_end(&self) {
        if let Some(hook) = &self.on_call_end {
            hook();
        }
    }

    fn transcript(&self, entry: &TranscriptEntry) {
        if let Some(hook) = &self.on_transcript {
            hook(entry);
        }
    }

    fn error(&self, message: &str) {
        if let Some(hook) = &self.on_error {
            hook(message);
        }
    }
}

struct CallState {
    is_connected: bool,
    is_call_active: bool,
    status: CallStatus,
    /// Bumped by every `start_call` and `end_call`. A pending start whose
    /// generation has been superseded discards its own success.
    generation: u64,
    /// Whether `on_call_start` fired for the current session. The hook can be
    /// reached from both the start path and the client's `Started` event;
    /// whichever comes first wins.
    started_notified: bool,
    client: Option<Arc<dyn RealtimeClient>>,
}

impl CallState {
    fn new() -> Self {
        Self {
            is_connected: false,
            is_call_active: false,
            status: CallStatus::Ready,
            generation: 0,
            started_notified: false,
            client: None,
        }
    }

    fn start_in_flight(&self) -> bool {
        matches!(
            self.status,
            CallStatus::Connecting | CallStatus::FetchingToken | CallStatus::Starting
        )
    }
}

/// Owns a single active call's lifecycle.
///
/// `start_call` requests an access token from the backend call proxy, creates
/// a fresh [`RealtimeClient`] through the injected factory, starts it, and
/// pumps its events into the caller's [`CallHooks`]. `end_call` is
/// idempotent and tears everything down. At most one session is live at a
/// time; duplicate-start protection is the caller's job (see the demo
/// controller), not the coordinator's.
pub struct CallCoordinator {
    agent_id: String,
    proxy: ProxyClient,
    factory: Arc<dyn ClientFactory>,
    hooks: Arc<CallHooks>,
    state: Arc<Mutex<CallState>>,
}

impl CallCoordinator {
    /// Creates a coordinator for `agent_id`. The id is not validated here
    /// beyond non-emptiness at `start_call` time.
    pub fn new(
        agent_id: impl Into<String>,
        proxy: ProxyClient,
        factory: Arc<dyn ClientFactory>,
        hooks: CallHooks,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            proxy,
            factory,
            hooks: Arc::new(hooks),
            state: Arc::new(Mutex::new(CallState::new())),
        }
    }

    /// Whether the transport considers itself connected.
    pub fn is_connected(&self) -> bool {
        self.state.lock().is_connected
    }

    /// Whether a call session is currently live.
    pub fn is_call_active(&self) -> bool {
        self.state.lock().is_call_active
    }

    /// The current lifecycle state.
    pub fn status(&self) -> CallStatus {
        self.state.lock().status
    }

    /// Human-readable status label for display.
    pub fn status_text(&self) -> String {
        self.status().to_string()
    }

    /// Starts a call session.
    ///
    /// Never returns an error: every failure mode (empty agent id, proxy
    /// failure, malformed token response, client start error) resets the
    /// connection flags and surfaces through `on_error`. With an empty agent
    /// id the proxy is never contacted.
    pub async fn start_call(&self) {
        if self.agent_id.trim().is_empty() {
            self.hooks.error("No agent ID provided");
            return;
        }

        let (generation, stale) = {
            let mut st = self.state.lock();
            st.generation += 1;
            st.started_notified = false;
            st.status = CallStatus::Connecting;
            (st.generation, st.client.take())
        };
        // A well-behaved caller never starts over a live session, but if one
        // does, the orphaned client must still be stopped.
        if let Some(stale) = stale {
            warn!("start_call over a live session; stopping previous client");
            stale.stop().await;
        }

        info!(agent_id = %self.agent_id, "starting call");
        {
            let mut st = self.state.lock();
            if st.generation == generation {
                st.status = CallStatus::FetchingToken;
            }
        }

        let token = match self.proxy.start_call(&self.agent_id).await {
            Ok(token) => token,
            Err(e) => {
                self.fail(generation, &e.to_string());
                return;
            }
        };

        {
            let mut st = self.state.lock();
            if st.generation != generation {
                debug!("call ended while fetching token; discarding session");
                return;
            }
            st.status = CallStatus::Starting;
        }

        let client = self.factory.create();
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        if let Err(e) = client.start(&token.access_token, tx).await {
            self.fail(generation, &e.to_string());
            return;
        }

        let notify = {
            let mut st = self.state.lock();
            if st.generation != generation {
                None
            } else {
                st.client = Some(Arc::clone(&client));
                st.is_connected = true;
                st.is_call_active = true;
                st.status = CallStatus::Active;
                let first = !st.started_notified;
                st.started_notified = true;
                Some(first)
            }
        };
        match notify {
            None => {
                debug!("call ended while client was starting; stopping it");
                client.stop().await;
                return;
            }
            Some(first) => {
                info!(call_id = %token.call_id, "call started");
                if first {
                    self.hooks.call_start();
                }
            }
        }

        self.spawn_event_pump(rx, generation);
    }

    /// Ends the current call session.
    ///
    /// Idempotent: with no session live or in flight this is a no-op and
    /// fires nothing. Otherwise the client is stopped, flags reset,
    /// `on_call_end` fires, and after a short delay the status label returns
    /// to idle unless a newer session started meanwhile. The backend proxy is
    /// not notified; transport disconnect is the cleanup signal.
    pub async fn end_call(&self) {
        let (client, generation) = {
            let mut st = self.state.lock();
            if st.client.is_none() && !st.is_call_active && !st.start_in_flight() {
                debug!("end_call with no active session");
                return;
            }
            st.generation += 1;
            st.is_connected = false;
            st.is_call_active = false;
            st.status = CallStatus::Ended;
            (st.client.take(), st.generation)
        };

        if let Some(client) = client {
            client.stop().await;
        }
        info!("call ended");
        self.hooks.call_end();

        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            tokio::time::sleep(STATUS_RESET_DELAY).await;
            let mut st = state.lock();
            if st.generation == generation && st.status == CallStatus::Ended {
                st.status = CallStatus::Ready;
            }
        });
    }

    fn fail(&self, generation: u64, message: &str) {
        {
            let mut st = self.state.lock();
            // A newer session owns the state now; stay out of its way.
            if st.generation != generation {
                return;
            }
            st.is_connected = false;
            st.is_call_active = false;
            st.client = None;
            st.status = CallStatus::ConnectFailed;
        }
        warn!(error = %message, "failed to start call");
        self.hooks.error(message);
    }

    /// Drains client events into state updates and hook invocations until the
    /// call ends, errors, or a newer session supersedes this one.
    fn spawn_event_pump(&self, mut rx: mpsc::Receiver<ClientEvent>, generation: u64) {
        let state = Arc::clone(&self.state);
        let hooks = Arc::clone(&self.hooks);

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if state.lock().generation != generation {
                    break;
                }
                match event {
                    ClientEvent::Started => {
                        let first = {
                            let mut st = state.lock();
                            st.is_connected = true;
                            st.is_call_active = true;
                            st.status = CallStatus::Active;
                            let first = !st.started_notified;
                            st.started_notified = true;
                            first
                        };
                        info!("conversation started");
                        if first {
                            hooks.call_start();
                        }
                    }
                    ClientEvent::Ended { code, reason } => {
                        {
                            let mut st = state.lock();
                            st.is_connected = false;
                            st.is_call_active = false;
                            st.client = None;
                            st.status = CallStatus::Ended;
                        }
                        info!(code, reason = %reason, "conversation ended");
                        hooks.call_end();
                        break;
                    }
                    ClientEvent::Error { message } => {
                        {
                            let mut st = state.lock();
                            st.is_connected = false;
                            st.is_call_active = false;
                            st.client = None;
                            st.status = CallStatus::Failed;
                        }
                        warn!(error = %message, "client reported an error");
                        hooks.error(&message);
                        break;
                    }
                    ClientEvent::Transcript(batch) => {
                        for entry in &batch {
                            hooks.transcript(entry);
                        }
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_match_display_strings() {
        assert_eq!(CallStatus::Ready.to_string(), "Ready to start");
        assert_eq!(CallStatus::Connecting.to_string(), "Connecting to agent...");
        assert_eq!(
            CallStatus::Active.to_string(),
            "Connected - Speaking with agent"
        );
        assert_eq!(CallStatus::Ended.to_string(), "Call ended");
        assert_eq!(CallStatus::Failed.to_string(), "Call failed");
        assert_eq!(CallStatus::ConnectFailed.to_string(), "Failed to connect");
    }

    #[test]
    fn unset_hooks_are_skipped() {
        let hooks = CallHooks::default();
        hooks.call_start();
        hooks.call_end();
        hooks.error("boom");
        hooks.transcript(&TranscriptEntry::new(
            voxdemo_core::TranscriptRole::Agent,
            "hello",
        ));
    }
}
