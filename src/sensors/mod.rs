//! Sensor subsystem — level channels, the button counter, and the
//! simulation fallback that keeps values plausible without hardware.
//!
//! The bank owns every channel and runs them all from one `refresh` call
//! per refresh tick, on the dispatcher's thread. A channel whose hardware
//! read returns the `0.0` sentinel synthesizes its next value with the
//! bounded random walk; a genuine reading is scaled into the resource's
//! integer range and written directly. Individual write failures are
//! logged and skipped — a single bad channel must not stall the refresh.

pub mod walk;

use log::{info, warn};
use rand::Rng;

use crate::endpoint::Endpoint;
use crate::ports::SensorRead;
use crate::store::{ResourceHandle, Value};
use walk::RandomWalk;

/// One managed level channel.
pub struct SensorChannel {
    label: &'static str,
    handle: ResourceHandle,
    driver: Box<dyn SensorRead + Send>,
    /// Multiplier applied to a genuine hardware reading before it is
    /// rounded into the resource's integer range (e.g. a 0.0–1.0
    /// fractional sensor ×100).
    scale: f64,
}

impl SensorChannel {
    pub fn new(
        label: &'static str,
        handle: ResourceHandle,
        driver: Box<dyn SensorRead + Send>,
        scale: f64,
    ) -> Self {
        Self {
            label,
            handle,
            driver,
            scale,
        }
    }
}

/// All sensor channels plus the simulated button.
pub struct SensorBank<R: Rng> {
    button: ResourceHandle,
    channels: Vec<SensorChannel>,
    walk: RandomWalk,
    rng: R,
}

impl<R: Rng> SensorBank<R> {
    pub fn new(button: ResourceHandle, walk: RandomWalk, rng: R) -> Self {
        Self {
            button,
            channels: Vec::new(),
            walk,
            rng,
        }
    }

    pub fn add_channel(&mut self, channel: SensorChannel) {
        self.channels.push(channel);
    }

    /// Run one refresh: increment the button counter, then read or
    /// synthesize every level channel.
    pub fn refresh(&mut self, ep: &mut Endpoint) {
        self.press_button(ep);

        for ch in &mut self.channels {
            let raw = ch.driver.read();
            let next = if raw == 0.0 {
                // No hardware: random walk from the stored value.
                self.walk.advance(ep.store().value_int(ch.handle), &mut self.rng)
            } else {
                let scaled = (f64::from(raw) * ch.scale).round() as i64;
                info!("{} read as: {scaled}", ch.label);
                scaled
            };
            if let Err(e) = ep.set_value(ch.handle, Value::Int(next)) {
                warn!("{}: reading dropped: {e}", ch.label);
            }
        }
    }

    // The button has no physical or synthetic read behind it; a timer-paced
    // increment stands in for a press, exactly one per refresh.
    fn press_button(&mut self, ep: &mut Endpoint) {
        let v = ep.store().value_int(self.button) + 1;
        match ep.set_value(self.button, Value::Int(v)) {
            Ok(()) => info!("Simulated button clicked {v} times"),
            Err(e) => warn!("button: increment dropped: {e}"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
