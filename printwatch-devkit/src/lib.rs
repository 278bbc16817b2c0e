//! Development kit for printwatch.
//!
//! Builders for vendor-shaped telemetry fragments so tests don't repeat
//! raw JSON literals for the common message shapes.

mod telemetry;

pub use telemetry::TelemetryBuilder;
