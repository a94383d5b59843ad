//! Baseline event selector synthesis.
//!
//! The baseline always captures every management event. Data events are
//! added only for the buckets and functions named in the config, in a single
//! extra selector.

use crate::cloudtrail::model::{DataResource, EventSelector, ResourceType};
use crate::core::config::RemediationConfig;

/// Builds the selector set reapplied on the trail.
///
/// The management selector is always first. A second, data-event selector is
/// present only when at least one non-empty S3 or Lambda ARN is configured.
pub fn build_baseline_selectors(config: &RemediationConfig) -> Vec<EventSelector> {
    let mut selectors = vec![EventSelector::management()];

    let s3_values = normalize_s3_arns(&config.s3_data_event_arns);
    let lambda_values = normalize_lambda_arns(&config.lambda_data_event_arns);
    if s3_values.is_empty() && lambda_values.is_empty() {
        return selectors;
    }

    let mut data_resources = Vec::with_capacity(2);
    if !s3_values.is_empty() {
        data_resources.push(DataResource {
            resource_type: ResourceType::S3Object,
            values: s3_values,
        });
    }
    if !lambda_values.is_empty() {
        data_resources.push(DataResource {
            resource_type: ResourceType::LambdaFunction,
            values: lambda_values,
        });
    }

    selectors.push(EventSelector {
        read_write_type: config.data_event_read_write_type,
        include_management_events: false,
        data_resources: Some(data_resources),
    });
    selectors
}

/// Bucket ARNs get a trailing `/` so every object in the bucket is captured.
pub fn normalize_s3_arns(arns: &[String]) -> Vec<String> {
    arns.iter()
        .map(|arn| arn.trim())
        .filter(|arn| !arn.is_empty())
        .map(|arn| {
            if arn.ends_with('/') {
                arn.to_string()
            } else {
                format!("{arn}/")
            }
        })
        .collect()
}

pub fn normalize_lambda_arns(arns: &[String]) -> Vec<String> {
    arns.iter()
        .map(|arn| arn.trim())
        .filter(|arn| !arn.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloudtrail::model::ReadWriteType;

    fn config_with(s3: &[&str], lambda: &[&str]) -> RemediationConfig {
        RemediationConfig {
            trail_name: "org-trail".to_string(),
            s3_data_event_arns: s3.iter().map(|arn| arn.to_string()).collect(),
            lambda_data_event_arns: lambda.iter().map(|arn| arn.to_string()).collect(),
            ..RemediationConfig::default()
        }
    }

    #[test]
    fn management_only_without_data_arns() {
        let selectors = build_baseline_selectors(&config_with(&[], &[]));
        assert_eq!(selectors, vec![EventSelector::management()]);

        let selectors = build_baseline_selectors(&config_with(&["", "  "], &[""]));
        assert_eq!(selectors, vec![EventSelector::management()]);
    }

    #[test]
    fn s3_arns_capture_all_objects() {
        let normalized = normalize_s3_arns(&[
            "arn:aws:s3:::payroll".to_string(),
            "arn:aws:s3:::audit/".to_string(),
        ]);
        assert_eq!(normalized, vec!["arn:aws:s3:::payroll/", "arn:aws:s3:::audit/"]);
        assert_eq!(normalize_s3_arns(&normalized), normalized);
    }

    #[test]
    fn kept_arns_are_trimmed() {
        let selectors = build_baseline_selectors(&config_with(
            &[" arn:aws:s3:::payroll "],
            &["\tarn:aws:lambda:us-east-1:123456789012:function:billing\n"],
        ));
        let resources = selectors[1].data_resources.as_ref().expect("data resources");
        assert_eq!(resources[0].values, vec!["arn:aws:s3:::payroll/"]);
        assert_eq!(
            resources[1].values,
            vec!["arn:aws:lambda:us-east-1:123456789012:function:billing"]
        );
    }

    #[test]
    fn data_selector_orders_s3_before_lambda() {
        let config = RemediationConfig {
            data_event_read_write_type: ReadWriteType::ReadOnly,
            ..config_with(
                &["arn:aws:s3:::payroll"],
                &["arn:aws:lambda:us-east-1:123456789012:function:billing"],
            )
        };

        let selectors = build_baseline_selectors(&config);
        assert_eq!(selectors.len(), 2);
        assert_eq!(selectors[0], EventSelector::management());

        let data = &selectors[1];
        assert!(data.is_data_event_selector());
        assert_eq!(data.read_write_type, ReadWriteType::ReadOnly);
        let resources = data.data_resources.as_ref().expect("data resources");
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].resource_type, ResourceType::S3Object);
        assert_eq!(resources[0].values, vec!["arn:aws:s3:::payroll/"]);
        assert_eq!(resources[1].resource_type, ResourceType::LambdaFunction);
        assert_eq!(
            resources[1].values,
            vec!["arn:aws:lambda:us-east-1:123456789012:function:billing"]
        );
    }

    #[test]
    fn lambda_only_selector() {
        let selectors = build_baseline_selectors(&config_with(
            &[],
            &["arn:aws:lambda:us-east-1:123456789012:function:billing", ""],
        ));
        assert_eq!(selectors.len(), 2);
        let resources = selectors[1].data_resources.as_ref().expect("data resources");
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].resource_type, ResourceType::LambdaFunction);
    }

    #[test]
    fn invalid_mode_falls_back_to_all() {
        let mut config = RemediationConfig::from_lookup(|key| match key {
            "TRAIL_NAME" => Some("org-trail".to_string()),
            "S3_DATA_EVENT_ARNS" => Some(r#"["arn:aws:s3:::payroll"]"#.to_string()),
            "DATA_EVENT_READ_WRITE_TYPE" => Some("Bogus".to_string()),
            _ => None,
        });
        let selectors = build_baseline_selectors(&config);
        assert_eq!(selectors[1].read_write_type, ReadWriteType::All);

        config.s3_data_event_arns.clear();
        assert_eq!(build_baseline_selectors(&config).len(), 1);
    }
}
