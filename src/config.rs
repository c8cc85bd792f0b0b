//! System configuration parameters
//!
//! All tunable parameters for the plantnode endpoint. The dispatcher tick is
//! the unit every period below is expressed in; the wall-clock length of a
//! tick is itself a parameter, not a hardwired constant.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Identity ---
    /// Endpoint name advertised to the device-management server
    pub endpoint_name: String,

    // --- Timing ---
    /// Wall-clock length of one dispatcher tick (milliseconds)
    pub tick_unit_ms: u32,
    /// Sensor refresh period (ticks)
    pub sensor_refresh_ticks: u64,
    /// Transport idle-service period (ticks)
    pub transport_service_ticks: u64,

    // --- Sensor simulation ---
    /// Largest per-tick random walk step
    pub walk_step_max: u8,
    /// Lower plausibility bound for synthesized levels
    pub walk_floor: i64,
    /// Upper plausibility bound for synthesized levels
    pub walk_ceiling: i64,
    /// Value a walk resets to when a step would leave the bounds
    pub walk_reset: i64,

    // --- Blink actuation ---
    /// Pattern stored in the blink-pattern resource at boot
    pub default_blink_pattern: String,

    // --- Dispatch ---
    /// Capacity of the bounded channel carrying externally posted tasks
    pub inbox_capacity: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            endpoint_name: "plantnode-endpoint".to_owned(),

            // Timing
            tick_unit_ms: 1,
            sensor_refresh_ticks: 5_000, // 5 s at the 1 ms tick
            transport_service_ticks: 1,

            // Simulation
            walk_step_max: 5,
            walk_floor: 0,
            walk_ceiling: 100,
            walk_reset: 50,

            // Blink
            default_blink_pattern: "500:500:500:500:500:500:500:500".to_owned(),

            // Dispatch
            inbox_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SystemConfig::default();
        assert!(c.tick_unit_ms > 0);
        assert!(c.sensor_refresh_ticks > 0);
        assert!(c.transport_service_ticks > 0);
        assert!(c.walk_step_max >= 1);
        assert!(c.walk_floor < c.walk_ceiling);
        assert!(c.walk_reset >= c.walk_floor && c.walk_reset <= c.walk_ceiling);
        assert!(c.inbox_capacity > 0);
        assert!(!c.endpoint_name.is_empty());
    }

    #[test]
    fn default_pattern_parses_cleanly() {
        let c = SystemConfig::default();
        for segment in c.default_blink_pattern.split(':') {
            assert!(segment.parse::<u64>().is_ok(), "segment {segment:?}");
        }
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SystemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.endpoint_name, c2.endpoint_name);
        assert_eq!(c.sensor_refresh_ticks, c2.sensor_refresh_ticks);
        assert_eq!(c.default_blink_pattern, c2.default_blink_pattern);
        assert_eq!(c.walk_reset, c2.walk_reset);
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = SystemConfig::default();
        assert!(
            c.transport_service_ticks < c.sensor_refresh_ticks,
            "transport servicing should run more often than sensor refresh"
        );
    }
}
