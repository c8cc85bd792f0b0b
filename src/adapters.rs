//! Host-side adapters for the port traits.
//!
//! Dual-target design, host half: on a real board these are replaced by
//! vendor-SDK wrappers (session stack, GPIO pin, network interface); here
//! they track state in memory and log, which is all the simulation and the
//! test rigs need. [`PinLed`] is the one board-facing adapter, generic over
//! any `embedded-hal` stateful output pin.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embedded_hal::digital::StatefulOutputPin;
use log::{info, warn};

use crate::client::EndpointInfo;
use crate::dispatch::QueueHandle;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::ports::{BlinkPort, DeliveryStatus, NetworkPort, SensorRead, TransportPort};
use crate::store::{ResourcePath, Value};

// ───────────────────────────────────────────────────────────────
// Sensor drivers
// ───────────────────────────────────────────────────────────────

/// Absent hardware: always returns the `0.0` sentinel, so the channel
/// falls back to its simulation walk.
pub struct NoHardware;

impl SensorRead for NoHardware {
    fn read(&mut self) -> f32 {
        0.0
    }
}

/// Fixed reading, for bench rigs and tests.
pub struct FixedLevel(pub f32);

impl SensorRead for FixedLevel {
    fn read(&mut self) -> f32 {
        self.0
    }
}

// ───────────────────────────────────────────────────────────────
// Blink LED
// ───────────────────────────────────────────────────────────────

/// In-memory LED with a shareable probe for assertions.
pub struct SimLed {
    on: Arc<AtomicBool>,
    toggles: Arc<AtomicU32>,
}

impl SimLed {
    pub fn new() -> Self {
        Self {
            on: Arc::new(AtomicBool::new(false)),
            toggles: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Probe that stays valid after the LED moves into the endpoint.
    pub fn probe(&self) -> SimLedProbe {
        SimLedProbe {
            on: self.on.clone(),
            toggles: self.toggles.clone(),
        }
    }
}

impl BlinkPort for SimLed {
    fn toggle(&mut self) {
        self.on.fetch_xor(true, Ordering::Relaxed);
        self.toggles.fetch_add(1, Ordering::Relaxed);
    }
}

/// Read-side view of a [`SimLed`].
#[derive(Clone)]
pub struct SimLedProbe {
    on: Arc<AtomicBool>,
    toggles: Arc<AtomicU32>,
}

impl SimLedProbe {
    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::Relaxed)
    }

    pub fn toggles(&self) -> u32 {
        self.toggles.load(Ordering::Relaxed)
    }
}

/// Board LED behind any `embedded-hal` stateful output pin.
pub struct PinLed<P: StatefulOutputPin> {
    pin: P,
}

impl<P: StatefulOutputPin> PinLed<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: StatefulOutputPin> BlinkPort for PinLed<P> {
    fn toggle(&mut self) {
        if self.pin.toggle().is_err() {
            warn!("blink LED: pin toggle failed");
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Network
// ───────────────────────────────────────────────────────────────

/// Always-up network for the host target.
pub struct SimNetwork;

impl NetworkPort for SimNetwork {
    fn bring_up(&mut self) -> Result<String, Error> {
        Ok("192.0.2.10".to_owned())
    }
}

// ───────────────────────────────────────────────────────────────
// Transport
// ───────────────────────────────────────────────────────────────

/// Logging stand-in for the device-management session layer.
///
/// Notifications are echoed to the log and every push is confirmed by
/// posting the delivery-status callback through the dispatcher handle —
/// the same debounced path a real session stack uses from its own thread,
/// so the callback runs on the dispatch thread like everything else.
pub struct SimTransport {
    queue: QueueHandle<Endpoint>,
}

impl SimTransport {
    pub fn new(queue: QueueHandle<Endpoint>) -> Self {
        Self { queue }
    }
}

impl TransportPort for SimTransport {
    fn init(&mut self, endpoint_name: &str) -> Result<(), Error> {
        info!("transport: session initialized for {endpoint_name}");
        Ok(())
    }

    fn register(&mut self, endpoint_name: &str) -> Result<EndpointInfo, Error> {
        info!("transport: registered {endpoint_name}");
        Ok(EndpointInfo {
            endpoint_name: endpoint_name.to_owned(),
            internal_id: format!("sim-{endpoint_name}"),
        })
    }

    fn notify(&mut self, path: &ResourcePath, value: &Value) {
        info!("transport: notify {path} = {value}");
        let path = *path;
        let posted = self.queue.post(move |ep, _| {
            if let Some(handle) = ep.store().lookup(&path) {
                ep.notify_delivery(handle, DeliveryStatus::Delivered);
            }
        });
        if !posted {
            warn!("transport: delivery report for {path} dropped");
        }
    }

    fn service(&mut self) {
        // The sim session has no retransmission queue to pump.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_hardware_returns_sentinel() {
        assert_eq!(NoHardware.read(), 0.0);
    }

    #[test]
    fn fixed_level_returns_reading() {
        assert_eq!(FixedLevel(0.47).read(), 0.47);
    }

    #[test]
    fn sim_led_tracks_state_through_probe() {
        let mut led = SimLed::new();
        let probe = led.probe();
        assert!(!probe.is_on());
        led.toggle();
        assert!(probe.is_on());
        led.toggle();
        assert!(!probe.is_on());
        assert_eq!(probe.toggles(), 2);
    }
}
