//! CloudTrail-facing types and clients.
//!
//! Provides the selector model, the baseline selector builder, and the
//! `TrailControl` implementations used by the remediation dispatcher.

pub mod client;
pub mod model;
pub mod recording;
pub mod selectors;

pub use client::CloudTrailClient;
pub use model::{DataResource, EventSelector, ReadWriteType, ResourceType, UpdateTrailRequest};
pub use recording::{RecordingTrail, TrailCall, TrailOperation};
pub use selectors::build_baseline_selectors;
