//! In-memory trail control that records calls instead of issuing them.
//!
//! Backs the CLI plan mode and the dispatcher tests.

use crate::cloudtrail::model::{EventSelector, UpdateTrailRequest};
use crate::core::traits::{TrailApiError, TrailControl};
use serde::Serialize;
use std::sync::Mutex;

/// A call accepted by [`RecordingTrail`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "operation")]
pub enum TrailCall {
    #[serde(rename_all = "PascalCase")]
    StartLogging {
        name: String,
    },
    UpdateTrail(UpdateTrailRequest),
    #[serde(rename_all = "PascalCase")]
    PutEventSelectors {
        trail_name: String,
        event_selectors: Vec<EventSelector>,
    },
}

/// Operation names, used to pick which call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailOperation {
    StartLogging,
    UpdateTrail,
    PutEventSelectors,
}

impl TrailOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrailOperation::StartLogging => "StartLogging",
            TrailOperation::UpdateTrail => "UpdateTrail",
            TrailOperation::PutEventSelectors => "PutEventSelectors",
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingTrail {
    calls: Mutex<Vec<TrailCall>>,
    fail_on: Option<(TrailOperation, String)>,
}

impl RecordingTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call of `operation` fail with a provider error. Failed
    /// calls are not recorded.
    pub fn fail_on(mut self, operation: TrailOperation, message: impl Into<String>) -> Self {
        self.fail_on = Some((operation, message.into()));
        self
    }

    /// Calls accepted so far, in order.
    pub fn calls(&self) -> Vec<TrailCall> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, operation: TrailOperation, call: TrailCall) -> Result<(), TrailApiError> {
        if let Some((failing, message)) = &self.fail_on {
            if *failing == operation {
                return Err(TrailApiError::provider(operation.as_str(), message.clone()));
            }
        }
        let mut calls = self
            .calls
            .lock()
            .map_err(|_| TrailApiError::Runtime("recorded call log poisoned".to_string()))?;
        calls.push(call);
        Ok(())
    }
}

impl TrailControl for RecordingTrail {
    fn start_logging(&self, trail_name: &str) -> Result<(), TrailApiError> {
        self.record(
            TrailOperation::StartLogging,
            TrailCall::StartLogging {
                name: trail_name.to_string(),
            },
        )
    }

    fn update_trail(&self, request: &UpdateTrailRequest) -> Result<(), TrailApiError> {
        self.record(TrailOperation::UpdateTrail, TrailCall::UpdateTrail(request.clone()))
    }

    fn put_event_selectors(
        &self,
        trail_name: &str,
        selectors: &[EventSelector],
    ) -> Result<(), TrailApiError> {
        self.record(
            TrailOperation::PutEventSelectors,
            TrailCall::PutEventSelectors {
                trail_name: trail_name.to_string(),
                event_selectors: selectors.to_vec(),
            },
        )
    }
}
