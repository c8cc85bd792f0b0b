//! Registration lifecycle — endpoint connectivity state.
//!
//! The state machine only moves forward:
//!
//! ```text
//! Disconnected → NetworkConnected → ClientInitialized → Registering → Registered
//! ```
//!
//! Any bring-up or init failure is terminal for the process; reconnection
//! logic belongs to the transport collaborator, not this core.

use log::info;

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::ports::NetworkPort;

/// Connectivity / registration state. Declaration order is transition
/// order, which is what the derived `Ord` enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RegState {
    Disconnected,
    NetworkConnected,
    ClientInitialized,
    Registering,
    Registered,
}

/// Identity metadata delivered with the registration-complete callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointInfo {
    /// Name the endpoint registered under (find it in the server portal).
    pub endpoint_name: String,
    /// Server-assigned internal endpoint identifier.
    pub internal_id: String,
}

/// Tracks registration progress and holds the one-shot registered callback.
pub struct DeviceClient {
    state: RegState,
    on_registered: Option<Box<dyn FnOnce(&EndpointInfo) + Send>>,
}

impl DeviceClient {
    pub fn new() -> Self {
        Self {
            state: RegState::Disconnected,
            on_registered: None,
        }
    }

    pub fn state(&self) -> RegState {
        self.state
    }

    /// Register a callback invoked exactly once on the transition into
    /// `Registered`, carrying the endpoint identity.
    pub fn on_registered(&mut self, cb: impl FnOnce(&EndpointInfo) + Send + 'static) {
        self.on_registered = Some(Box::new(cb));
    }

    /// Bring up the network, initialize the management client, and
    /// register with the server. Any `Err` is fatal: the caller logs and
    /// exits, there is no retry loop in this core.
    pub fn register_and_connect(
        &mut self,
        net: &mut dyn NetworkPort,
        ep: &mut Endpoint,
        endpoint_name: &str,
    ) -> Result<EndpointInfo, Error> {
        let addr = net.bring_up()?;
        self.advance(RegState::NetworkConnected)?;
        info!("Connected to the network. Address: {addr}");

        ep.transport_mut().init(endpoint_name)?;
        self.advance(RegState::ClientInitialized)?;
        info!("Device management client initialized");

        self.advance(RegState::Registering)?;
        let endpoint_info = ep.transport_mut().register(endpoint_name)?;
        self.mark_registered(&endpoint_info)?;
        Ok(endpoint_info)
    }

    /// Complete registration. A transport that finishes asynchronously
    /// calls this from a task posted through the dispatcher handle.
    pub fn mark_registered(&mut self, endpoint_info: &EndpointInfo) -> Result<(), Error> {
        self.advance(RegState::Registered)?;
        if let Some(cb) = self.on_registered.take() {
            cb(endpoint_info);
        }
        Ok(())
    }

    fn advance(&mut self, next: RegState) -> Result<(), Error> {
        if next <= self.state {
            return Err(Error::Registration("state machine only moves forward"));
        }
        info!("registration: {:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
