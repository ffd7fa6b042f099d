//! Call-lifecycle coordination for voxdemo.
//!
//! This crate owns the "core" of the system: obtaining a short-lived access
//! token from the backend call proxy, driving a pluggable real-time voice
//! client, forwarding its events to caller hooks, and tearing the call down
//! cleanly. The concrete provider SDK binding is an adapter behind the
//! [`RealtimeClient`] trait; nothing here touches audio or WebRTC.

pub mod client;
pub mod coordinator;
pub mod provider;
pub mod proxy;

pub use client::{ClientEvent, ClientFactory, NullClient, RealtimeClient};
pub use coordinator::{CallCoordinator, CallHooks, CallStatus};
pub use provider::ProviderClient;
pub use proxy::{ProxyClient, WebCallResponse};
