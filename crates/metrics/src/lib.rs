//! Metrics collection and export for netreg.
//!
//! This crate provides metric names for the channel registry and handshake
//! using the `metrics` crate facade. When the `prometheus` feature is enabled,
//! metrics are exported in Prometheus text format.
//!
//! # Usage
//!
//! ```rust,ignore
//! use netreg_metrics::{counter, gauge, handshake};
//!
//! counter!(handshake::VALIDATIONS_TOTAL, "side" => "server").increment(1);
//! gauge!(netreg_metrics::channels::REGISTERED).set(3.0);
//! ```
//!
//! # Features
//!
//! - `prometheus`: install a Prometheus recorder and render its output

mod definitions;
mod recorder;

pub use {
    definitions::*,
    recorder::{MetricsHandle, MetricsRecorderConfig, init_metrics},
};

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};
