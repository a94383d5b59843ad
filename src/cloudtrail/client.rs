//! CloudTrail control backed by the AWS SDK.
//!
//! The SDK is async; each call is driven to completion on a private
//! current-thread runtime so callers see plain blocking calls.

use crate::cloudtrail::model::{EventSelector, UpdateTrailRequest};
use crate::core::config::RemediationConfig;
use crate::core::traits::{TrailApiError, TrailControl};
use aws_config::BehaviorVersion;
use aws_sdk_cloudtrail::config::Region;
use aws_sdk_cloudtrail::error::DisplayErrorContext;
use aws_sdk_cloudtrail::types as sdk;
use aws_sdk_cloudtrail::Client;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

pub struct CloudTrailClient {
    client: Client,
    runtime: Runtime,
}

impl CloudTrailClient {
    /// Builds a client for the trail's home region. An empty home region
    /// leaves region resolution to the SDK (e.g. `AWS_REGION`).
    pub fn from_config(config: &RemediationConfig) -> Result<Self, TrailApiError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| TrailApiError::Runtime(err.to_string()))?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        let home_region = config.home_region.trim();
        if !home_region.is_empty() {
            loader = loader.region(Region::new(home_region.to_string()));
        }
        let sdk_config = runtime.block_on(loader.load());
        debug!(region = ?sdk_config.region(), "cloudtrail client configured");

        Ok(Self {
            client: Client::new(&sdk_config),
            runtime,
        })
    }
}

impl TrailControl for CloudTrailClient {
    fn start_logging(&self, trail_name: &str) -> Result<(), TrailApiError> {
        debug!(trail_name, "StartLogging");
        self.runtime
            .block_on(self.client.start_logging().name(trail_name).send())
            .map_err(|err| provider_error("StartLogging", err))?;
        Ok(())
    }

    fn update_trail(&self, request: &UpdateTrailRequest) -> Result<(), TrailApiError> {
        debug!(
            trail_name = %request.name,
            multi_region = request.is_multi_region_trail,
            bucket = ?request.s3_bucket_name,
            kms_key = request.kms_key_id.is_some(),
            "UpdateTrail"
        );
        let call = self
            .client
            .update_trail()
            .name(&request.name)
            .include_global_service_events(request.include_global_service_events)
            .is_multi_region_trail(request.is_multi_region_trail)
            .enable_log_file_validation(request.enable_log_file_validation)
            .set_s3_bucket_name(request.s3_bucket_name.clone())
            .set_kms_key_id(request.kms_key_id.clone());
        self.runtime
            .block_on(call.send())
            .map_err(|err| provider_error("UpdateTrail", err))?;
        Ok(())
    }

    fn put_event_selectors(
        &self,
        trail_name: &str,
        selectors: &[EventSelector],
    ) -> Result<(), TrailApiError> {
        debug!(trail_name, selectors = selectors.len(), "PutEventSelectors");
        let selectors: Vec<sdk::EventSelector> = selectors.iter().map(to_sdk_selector).collect();
        let call = self
            .client
            .put_event_selectors()
            .trail_name(trail_name)
            .set_event_selectors(Some(selectors));
        self.runtime
            .block_on(call.send())
            .map_err(|err| provider_error("PutEventSelectors", err))?;
        Ok(())
    }
}

fn to_sdk_selector(selector: &EventSelector) -> sdk::EventSelector {
    let data_resources: Option<Vec<sdk::DataResource>> = selector.data_resources.as_ref().map(|resources| {
        resources
            .iter()
            .map(|resource| {
                sdk::DataResource::builder()
                    .r#type(resource.resource_type.as_str())
                    .set_values(Some(resource.values.clone()))
                    .build()
            })
            .collect()
    });

    sdk::EventSelector::builder()
        .read_write_type(sdk::ReadWriteType::from(selector.read_write_type.as_str()))
        .include_management_events(selector.include_management_events)
        .set_data_resources(data_resources)
        .build()
}

fn provider_error<E>(operation: &str, err: E) -> TrailApiError
where
    E: std::error::Error + 'static,
{
    TrailApiError::provider(operation, DisplayErrorContext(err).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloudtrail::model::{DataResource, ReadWriteType, ResourceType};

    #[test]
    fn converts_data_event_selector() {
        let selector = EventSelector {
            read_write_type: ReadWriteType::WriteOnly,
            include_management_events: false,
            data_resources: Some(vec![DataResource {
                resource_type: ResourceType::LambdaFunction,
                values: vec!["arn:aws:lambda:us-east-1:123456789012:function:billing".to_string()],
            }]),
        };

        let converted = to_sdk_selector(&selector);
        assert_eq!(converted.read_write_type(), Some(&sdk::ReadWriteType::WriteOnly));
        assert_eq!(converted.include_management_events(), Some(false));
        let resources = converted.data_resources();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].r#type(), Some("AWS::Lambda::Function"));
        assert_eq!(
            resources[0].values(),
            ["arn:aws:lambda:us-east-1:123456789012:function:billing".to_string()]
        );
    }

    #[test]
    fn management_selector_has_no_data_resources() {
        let converted = to_sdk_selector(&EventSelector::management());
        assert_eq!(converted.read_write_type(), Some(&sdk::ReadWriteType::All));
        assert_eq!(converted.include_management_events(), Some(true));
        assert!(converted.data_resources().is_empty());
    }
}
