//! Plantnode firmware core library.
//!
//! Exposes the resource store, sensor simulation, pattern scheduler,
//! cooperative dispatcher and registration lifecycle for integration
//! testing and external inspection. Hardware, network and the
//! device-management session are port traits (see [`ports`]); the
//! shipped adapters are the host-side simulation half.

#![deny(unused_must_use)]

pub mod adapters;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod pattern;
pub mod ports;
pub mod sensors;
pub mod store;
