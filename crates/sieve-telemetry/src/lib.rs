pub mod error;
pub mod telemetry;

pub use telemetry::{flush_telemetry, init_telemetry};
