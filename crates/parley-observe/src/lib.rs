//! Observability setup for Parley: structured logging via `tracing` and
//! optional OpenTelemetry span export.

pub mod tracing_setup;
