//! Plantnode — main entry point.
//!
//! Wires the resource table, sensor bank and blink handler onto the
//! cooperative dispatcher, registers with the device-management server,
//! and hands the thread to the dispatch loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimTransport      SimLed         SimNetwork    NoHardware     │
//! │  (TransportPort)   (BlinkPort)    (NetworkPort) (SensorRead)   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │          Endpoint (store · callbacks · blink)          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  EventQueue (single dispatch thread) · SensorBank · patterns   │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use anyhow::Result;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use plantnode::adapters::{NoHardware, SimLed, SimNetwork, SimTransport};
use plantnode::client::DeviceClient;
use plantnode::config::SystemConfig;
use plantnode::dispatch::EventQueue;
use plantnode::endpoint::Endpoint;
use plantnode::pattern;
use plantnode::sensors::walk::RandomWalk;
use plantnode::sensors::{SensorBank, SensorChannel};
use plantnode::store::{Access, Value};

fn main() -> Result<()> {
    // ── 1. Bootstrap ──────────────────────────────────────────
    env_logger::init();

    info!("╔══════════════════════════════════════╗");
    info!("║  PlantNode v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::default();

    // ── 2. Dispatcher + endpoint ──────────────────────────────
    let mut queue: EventQueue<Endpoint> = EventQueue::new(config.inbox_capacity);

    // The transport holds a queue handle: its session thread may only
    // enqueue onto the dispatcher, never touch resource state directly.
    let led = SimLed::new();
    let mut ep = Endpoint::new(
        Box::new(SimTransport::new(queue.handle())),
        Box::new(led),
    );

    // ── 3. Resource table ─────────────────────────────────────
    let button_res = ep.create_resource("3200/0/5501", "button_count", Access::READ, Value::Int(0))?;
    ep.set_observable(button_res, true);
    ep.attach_notification_callback(button_res, |_, _, status| {
        info!("Button notification, status {status}");
    })?;

    let pattern_res = ep.create_resource(
        "3201/0/5853",
        "blink_pattern",
        Access::READ | Access::WRITE,
        Value::Str(config.default_blink_pattern.clone()),
    )?;
    ep.attach_put_callback(pattern_res, |_, _, new_value| {
        info!("PUT received, new value: {new_value}");
    })?;

    let blink_res = ep.create_resource("3201/0/5850", "blink_action", Access::EXECUTE, Value::Int(0))?;
    ep.attach_post_callback(blink_res, pattern::blink_post_handler(pattern_res))?;

    let light_res = ep.create_resource("/3203/0/5510", "light_level", Access::READ, Value::Int(50))?;
    ep.set_observable(light_res, true);

    let soil_res = ep.create_resource("/3203/0/5511", "soil_level", Access::READ, Value::Int(50))?;
    ep.set_observable(soil_res, true);

    let temp_res = ep.create_resource("/3203/0/5512", "temp_level", Access::READ, Value::Int(50))?;
    ep.set_observable(temp_res, true);

    let pressure_res =
        ep.create_resource("/3203/0/5513", "pressure_level", Access::READ, Value::Int(1000))?;
    ep.set_observable(pressure_res, true);

    let humidity_res =
        ep.create_resource("/3203/0/5514", "humidity_level", Access::READ, Value::Int(1000))?;
    ep.set_observable(humidity_res, true);

    // ── 4. Register with the management server ────────────────
    let mut client = DeviceClient::new();
    client.on_registered(|endpoint_info| {
        info!(
            "Connected to device management. Endpoint name: {}",
            endpoint_info.endpoint_name
        );
    });

    let mut net = SimNetwork;
    client.register_and_connect(&mut net, &mut ep, &config.endpoint_name)?;

    // ── 5. Sensor bank ────────────────────────────────────────
    // No boards attached on the host target: every channel reads the 0.0
    // sentinel and synthesizes. Swap NoHardware for a real driver per
    // channel when one exists.
    let walk = RandomWalk::new(
        config.walk_floor,
        config.walk_ceiling,
        config.walk_reset,
        config.walk_step_max,
    );
    let mut bank = SensorBank::new(button_res, walk, StdRng::from_entropy());
    bank.add_channel(SensorChannel::new("light", light_res, Box::new(NoHardware), 100.0));
    bank.add_channel(SensorChannel::new("soil", soil_res, Box::new(NoHardware), 100.0));
    bank.add_channel(SensorChannel::new("temp", temp_res, Box::new(NoHardware), 1.0));
    bank.add_channel(SensorChannel::new("pressure", pressure_res, Box::new(NoHardware), 1.0));
    bank.add_channel(SensorChannel::new("humidity", humidity_res, Box::new(NoHardware), 100.0));

    // ── 6. Recurring work ─────────────────────────────────────
    queue.post_periodic(config.sensor_refresh_ticks, move |ep, _| bank.refresh(ep));
    queue.post_periodic(config.transport_service_ticks, |ep, _| ep.service_transport());

    info!("System ready. Entering dispatch loop.");

    // ── 7. Dispatch forever ───────────────────────────────────
    queue.run_forever(&mut ep, Duration::from_millis(u64::from(config.tick_unit_ms)));
}
