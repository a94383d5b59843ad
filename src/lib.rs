//! Trailguard library crate.
//!
//! Reapplies a CloudTrail baseline when a change event reports that the trail
//! was stopped, reconfigured, or deleted.

pub mod cloudtrail;
pub mod core;
pub mod logging;
pub mod remediation;

pub use crate::core::config;
pub use crate::core::event;
pub use crate::core::traits;
pub use remediation::{remediate, Action, RemediationResult};
