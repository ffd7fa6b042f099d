use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};
use voxdemo_call::{CallCoordinator, CallHooks, ClientFactory, ProxyClient};
use voxdemo_core::{VoxdemoError, VoxdemoResult};

/// Binds the call coordinator to interactive controls.
///
/// The controller, not the coordinator, is responsible for duplicate-start
/// protection: a `starting` guard is set before `start_call` and cleared in
/// the start, end, and error hooks, so a second start while one is in flight
/// or a call is live is a no-op. A missing agent id is a terminal
/// "invalid demo link" error before the coordinator is ever involved.
pub struct DemoController {
    coordinator: Arc<CallCoordinator>,
    starting: Arc<AtomicBool>,
    muted: AtomicBool,
}

impl DemoController {
    /// Creates a controller for `agent_id`, wrapping the caller's hooks with
    /// the guard-clearing behavior.
    pub fn new(
        agent_id: &str,
        proxy: ProxyClient,
        factory: Arc<dyn ClientFactory>,
        hooks: CallHooks,
    ) -> VoxdemoResult<Self> {
        let agent_id = agent_id.trim();
        if agent_id.is_empty() {
            return Err(VoxdemoError::Config(
                "Invalid demo link: missing agent id".into(),
            ));
        }

        let starting = Arc::new(AtomicBool::new(false));
        let hooks = guard_hooks(Arc::clone(&starting), hooks);
        let coordinator = Arc::new(CallCoordinator::new(agent_id, proxy, factory, hooks));

        Ok(Self {
            coordinator,
            starting,
            muted: AtomicBool::new(false),
        })
    }

    /// The wrapped coordinator, for state queries.
    pub fn coordinator(&self) -> &CallCoordinator {
        &self.coordinator
    }

    /// Requests a call start. Returns `false` without touching the
    /// coordinator when a start is already in flight or a call is live.
    pub async fn start(&self) -> bool {
        if self.coordinator.is_call_active() {
            debug!("start ignored: call already active");
            return false;
        }
        if self.starting.swap(true, Ordering::SeqCst) {
            debug!("start ignored: start already in flight");
            return false;
        }
        self.coordinator.start_call().await;
        true
    }

    /// Ends the call and clears the starting guard.
    pub async fn end(&self) {
        self.coordinator.end_call().await;
        self.starting.store(false, Ordering::SeqCst);
    }

    /// Flips local mute state and returns the new value. Display-only: the
    /// lifecycle-only client carries no audio to mute.
    pub fn toggle_mute(&self) -> bool {
        let muted = !self.muted.fetch_xor(true, Ordering::SeqCst);
        info!(muted, "mute toggled");
        muted
    }

    /// Current local mute state.
    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }
}

/// Clears the starting guard in every terminal hook, then runs the caller's
/// own hook. Transcript delivery passes through untouched.
fn guard_hooks(starting: Arc<AtomicBool>, user: CallHooks) -> CallHooks {
    let CallHooks {
        on_call_start,
        on_call_end,
        on_transcript,
        on_error,
    } = user;

    let start_guard = Arc::clone(&starting);
    let end_guard = Arc::clone(&starting);
    let error_guard = starting;

    CallHooks {
        on_call_start: Some(Box::new(move || {
            start_guard.store(false, Ordering::SeqCst);
            if let Some(hook) = &on_call_start {
                hook();
            }
        })),
        on_call_end: Some(Box::new(move || {
            end_guard.store(false, Ordering::SeqCst);
            if let Some(hook) = &on_call_end {
                hook();
            }
        })),
        on_transcript,
        on_error: Some(Box::new(move |message| {
            error_guard.store(false, Ordering::SeqCst);
            if let Some(hook) = &on_error {
                hook(message);
            }
        })),
    }
}
