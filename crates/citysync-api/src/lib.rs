// citysync-api: Async Rust client for the smart-city device gateway REST API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::GatewayClient;
pub use error::Error;
pub use models::{ActivationAction, CommandAck, SwitchAction, WireDevice, WireDeviceData};
