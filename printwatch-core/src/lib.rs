//! Telemetry state engine for BambuLab-class networked 3D printers.
//!
//! The printer reports over MQTT as a diff stream: each message carries
//! only the fields that changed since the previous one, and the nested
//! filament sub-system (AMS) may report a single unit or a single tray at
//! a time. Consumers want the opposite contract, a complete and
//! self-consistent snapshot. This crate reconciles the two:
//!
//! - [`StateAccumulator::merge`] folds fragments into an accumulated raw
//!   state without interpreting them;
//! - [`StateAccumulator::project`] derives a typed [`PrinterState`] from
//!   it (status flags, parsing, clamping, humidity bucketing);
//! - [`FlatSnapshot`] turns a snapshot into a single-level record for
//!   storage or transmission.
//!
//! The crate does no I/O; the transport feeding it lives in
//! `printwatch-monitor`.

mod accumulator;
mod error;
mod project;
mod raw;
mod snapshot;
mod state;

pub use accumulator::StateAccumulator;
pub use error::MergeError;
pub use snapshot::{FilamentSummary, FlatSnapshot};
pub use state::{AmsState, AmsUnit, GcodeState, PrinterState, Tray};
