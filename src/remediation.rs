//! Remediation dispatcher.
//!
//! Maps one CloudTrail change event to the corrective calls that restore the
//! trail baseline. Nothing is kept between invocations; the only shared input
//! is the read-only [`RemediationConfig`].

use crate::cloudtrail::model::UpdateTrailRequest;
use crate::cloudtrail::selectors::build_baseline_selectors;
use crate::core::config::RemediationConfig;
use crate::core::event::ChangeEvent;
use crate::core::traits::{TrailApiError, TrailControl};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

pub const STOP_LOGGING: &str = "StopLogging";
pub const DELETE_TRAIL: &str = "DeleteTrail";
/// Changes answered by reapplying flags and selectors, then restarting logging.
pub const BASELINE_REAPPLY_EVENTS: [&str; 3] =
    ["UpdateTrail", "PutEventSelectors", "PutInsightSelectors"];

/// Tag recorded for each completed corrective step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    StartLogging,
    UpdateTrail,
    PutEventSelectors,
    StartLoggingAfterUpdate,
    TrailDeletedNoAutoFix,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::StartLogging => "start_logging",
            Action::UpdateTrail => "update_trail",
            Action::PutEventSelectors => "put_event_selectors",
            Action::StartLoggingAfterUpdate => "start_logging_after_update",
            Action::TrailDeletedNoAutoFix => "trail_deleted_no_auto_fix",
        }
    }
}

/// Outcome of one remediation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemediationResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ignored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    /// Steps completed, in order. On failure this is the partial progress.
    pub actions: Vec<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RemediationResult {
    fn config_error(message: String) -> Self {
        Self {
            ok: false,
            error: Some(message),
            ..Self::default()
        }
    }

    fn ignored(reason: &str) -> Self {
        Self {
            ok: true,
            ignored: true,
            reason: Some(reason.to_string()),
            ..Self::default()
        }
    }

    fn completed(event_name: Option<&str>, actions: Vec<Action>) -> Self {
        Self {
            ok: true,
            event_name: event_name.map(str::to_string),
            actions,
            ..Self::default()
        }
    }

    fn failed(event_name: Option<&str>, actions: Vec<Action>, error: String) -> Self {
        Self {
            ok: false,
            event_name: event_name.map(str::to_string),
            actions,
            error: Some(error),
            ..Self::default()
        }
    }
}

/// Baseline trail flags: global service events and log file validation on,
/// multi-region, bucket, and KMS key from the config.
pub fn baseline_update_request(config: &RemediationConfig) -> UpdateTrailRequest {
    UpdateTrailRequest {
        name: config.trail_name.clone(),
        include_global_service_events: true,
        is_multi_region_trail: config.is_multi_region_trail,
        enable_log_file_validation: true,
        s3_bucket_name: config.log_bucket_name.clone(),
        kms_key_id: config.kms_key_id.clone(),
    }
}

/// Runs one remediation pass for `event`.
///
/// Never fails: configuration problems, filtered events, and API errors are
/// all reported through the returned [`RemediationResult`]. The first API
/// error stops the pass and the result keeps the steps completed before it.
pub fn remediate<T>(
    config: &RemediationConfig,
    event: &ChangeEvent,
    trail: &T,
) -> RemediationResult
where
    T: TrailControl + ?Sized,
{
    if let Err(err) = config.validate() {
        error!(error = %err, "remediation config invalid");
        return RemediationResult::config_error(err.to_string());
    }

    if !event.is_cloudtrail() {
        info!(
            event_source = event.event_source().unwrap_or_default(),
            "ignoring event from another service"
        );
        return RemediationResult::ignored("not cloudtrail");
    }

    let event_name = event.event_name();
    match event.occurred_at() {
        Some(occurred_at) => info!(
            event_name = event_name.unwrap_or_default(),
            lag_ms = (Utc::now() - occurred_at).num_milliseconds(),
            "received change event"
        ),
        None => info!(
            event_name = event_name.unwrap_or_default(),
            "received change event"
        ),
    }

    let mut actions = Vec::new();
    match apply(config, event_name, trail, &mut actions) {
        Ok(()) => {
            info!(
                event_name = event_name.unwrap_or_default(),
                trail_name = %config.trail_name,
                actions = ?actions,
                "remediation complete"
            );
            RemediationResult::completed(event_name, actions)
        }
        Err(err) => {
            error!(
                event_name = event_name.unwrap_or_default(),
                trail_name = %config.trail_name,
                actions = ?actions,
                error = %err,
                "remediation failed"
            );
            RemediationResult::failed(event_name, actions, err.to_string())
        }
    }
}

/// Each check is independent; an event name matching more than one would run
/// every matching branch in this order.
fn apply<T>(
    config: &RemediationConfig,
    event_name: Option<&str>,
    trail: &T,
    actions: &mut Vec<Action>,
) -> Result<(), TrailApiError>
where
    T: TrailControl + ?Sized,
{
    let Some(event_name) = event_name else {
        return Ok(());
    };
    let trail_name = config.trail_name.as_str();

    if event_name == STOP_LOGGING {
        trail.start_logging(trail_name)?;
        actions.push(Action::StartLogging);
    }

    if BASELINE_REAPPLY_EVENTS.contains(&event_name) {
        trail.update_trail(&baseline_update_request(config))?;
        actions.push(Action::UpdateTrail);

        let selectors = build_baseline_selectors(config);
        trail.put_event_selectors(trail_name, &selectors)?;
        actions.push(Action::PutEventSelectors);

        trail.start_logging(trail_name)?;
        actions.push(Action::StartLoggingAfterUpdate);
    }

    if event_name == DELETE_TRAIL {
        warn!(trail_name, "trail deleted; recreate it manually");
        actions.push(Action::TrailDeletedNoAutoFix);
    }

    Ok(())
}
