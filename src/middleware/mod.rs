pub mod auth;

pub use auth::{ensure_device_key, OperatorSession, RequireDeviceKey, DEVICE_KEY_HEADER};
