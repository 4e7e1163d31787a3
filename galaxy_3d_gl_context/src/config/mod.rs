//! Surface format negotiation and device configuration
//!
//! `DesiredSurfaceFormat` is what the engine asks for, `ConfigCandidate` is
//! what the driver offers, and `ConfigSelector` picks the closest candidate.

mod surface_format;
mod config_selector;
mod device_config;

pub use surface_format::{DesiredSurfaceFormat, ConfigCandidate};
pub use config_selector::ConfigSelector;
pub use device_config::DeviceConfig;
