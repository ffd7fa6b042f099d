use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use voxdemo_core::{TranscriptEntry, VoxdemoResult};

/// An asynchronous notification from the real-time voice client.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The conversation is live on both sides.
    Started,
    /// The conversation ended, with the transport's machine code and a
    /// human-readable reason.
    Ended { code: u16, reason: String },
    /// A runtime error reported by the client.
    Error { message: String },
    /// A batch of transcript turns, in arrival order.
    Transcript(Vec<TranscriptEntry>),
}

/// The real-time voice client as seen by the coordinator.
///
/// The provider's SDK is opaque here: it can be started with an access token,
/// stopped, and it delivers [`ClientEvent`]s through the sender handed to
/// [`start`](RealtimeClient::start). Audio transport, codecs, and token
/// validation are entirely its business.
#[async_trait::async_trait]
pub trait RealtimeClient: Send + Sync {
    /// Begin the call authorized by `access_token`, delivering events on
    /// `events` until the call ends or the client is stopped.
    async fn start(
        &self,
        access_token: &str,
        events: mpsc::Sender<ClientEvent>,
    ) -> VoxdemoResult<()>;

    /// Stop the call. Must be safe to invoke on a client that never started.
    async fn stop(&self);
}

/// Produces a fresh [`RealtimeClient`] for each call session.
///
/// The coordinator never reuses a client across calls, so the factory is the
/// seam where the concrete SDK adapter is injected.
pub trait ClientFactory: Send + Sync {
    /// Create a new, unstarted client.
    fn create(&self) -> Arc<dyn RealtimeClient>;
}

impl<F> ClientFactory for F
where
    F: Fn() -> Arc<dyn RealtimeClient> + Send + Sync,
{
    fn create(&self) -> Arc<dyn RealtimeClient> {
        self()
    }
}

/// A lifecycle-only client with no media transport.
///
/// Emits `Started` when started and `Ended` when stopped. Audio lives in the
/// provider's browser SDK; this adapter lets the CLI and tests exercise the
/// full token-fetch and teardown path without a microphone.
#[derive(Default)]
pub struct NullClient {
    events: Mutex<Option<mpsc::Sender<ClientEvent>>>,
}

impl NullClient {
    /// Creates an unstarted client.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RealtimeClient for NullClient {
    async fn start(
        &self,
        _access_token: &str,
        events: mpsc::Sender<ClientEvent>,
    ) -> VoxdemoResult<()> {
        let _ = events.send(ClientEvent::Started).await;
        *self.events.lock() = Some(events);
        Ok(())
    }

    async fn stop(&self) {
        let events = self.events.lock().take();
        if let Some(events) = events {
            let _ = events
                .send(ClientEvent::Ended {
                    code: 1000,
                    reason: "user hangup".into(),
                })
                .await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_client_emits_started_then_ended() {
        let client = NullClient::new();
        let (tx, mut rx) = mpsc::channel(8);

        client.start("tok", tx).await.unwrap();
        assert!(matches!(rx.recv().await.unwrap(), ClientEvent::Started));

        client.stop().await;
        match rx.recv().await.unwrap() {
            ClientEvent::Ended { code, reason } => {
                assert_eq!(code, 1000);
                assert_eq!(reason, "user hangup");
            }
            other => panic!("expected Ended, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn null_client_stop_without_start_is_safe() {
        let client = NullClient::new();
        client.stop().await;
        client.stop().await;
    }
}
