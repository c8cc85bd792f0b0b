//! Port traits — the boundary between the endpoint core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Endpoint (domain)
//! ```
//!
//! Driven adapters (sensor drivers, the blink LED, the transport/session
//! layer, the network stack) implement these traits. The core consumes them
//! behind boxed trait objects, so everything is testable with recording
//! fakes instead of real hardware or a live device-management session.

use crate::client::EndpointInfo;
use crate::error::Error;
use crate::store::{ResourcePath, Value};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// A single hardware measurement channel.
pub trait SensorRead {
    /// Read the channel. A literal `0.0` is the "no hardware present"
    /// sentinel — indistinguishable from a genuine zero reading, an
    /// accepted limitation of the analog front end.
    fn read(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → blink LED)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the blink actuator. Toggles are the only operation
/// the pattern replay needs.
pub trait BlinkPort {
    fn toggle(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain ↔ device-management session)
// ───────────────────────────────────────────────────────────────

/// Outcome of a pushed observation notification, reported back through the
/// resource's notification callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// Handed to the session layer for transmission.
    Sent,
    /// Acknowledged by the server.
    Delivered,
    /// The session layer gave up on this notification.
    Failed,
}

impl core::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Sent => write!(f, "sent"),
            Self::Delivered => write!(f, "delivered"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// The device-management session layer. Byte-level encoding, security and
/// retransmission all live behind this trait.
pub trait TransportPort {
    /// Initialize the management client session.
    fn init(&mut self, endpoint_name: &str) -> Result<(), Error>;

    /// Register the endpoint with the remote server.
    fn register(&mut self, endpoint_name: &str) -> Result<EndpointInfo, Error>;

    /// Push a change notification for an observable resource. Delivery
    /// status arrives later through the resource's notification callback,
    /// posted onto the dispatcher by the transport's own context.
    fn notify(&mut self, path: &ResourcePath, value: &Value);

    /// Give the session layer a slice of loop time. Driven by the
    /// recurring idle-service tick.
    fn service(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Network port (driven adapter: domain → network bring-up)
// ───────────────────────────────────────────────────────────────

/// Network interface bring-up. Failure is fatal for the process; retry
/// policy, if any, belongs to the collaborator behind this trait.
pub trait NetworkPort {
    /// Connect and return the acquired address, for logging.
    fn bring_up(&mut self) -> Result<String, Error>;
}
