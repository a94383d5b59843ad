use serde::{Deserialize, Serialize};

/// Read/write filter applied to a CloudTrail event selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReadWriteType {
    #[default]
    All,
    ReadOnly,
    WriteOnly,
}

impl ReadWriteType {
    /// Parses a configured mode, returning `None` for anything outside
    /// `All`, `ReadOnly`, `WriteOnly`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "All" => Some(ReadWriteType::All),
            "ReadOnly" => Some(ReadWriteType::ReadOnly),
            "WriteOnly" => Some(ReadWriteType::WriteOnly),
            _ => None,
        }
    }

    /// Parses an optional mode, falling back to `All` when unset or invalid.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadWriteType::All => "All",
            ReadWriteType::ReadOnly => "ReadOnly",
            ReadWriteType::WriteOnly => "WriteOnly",
        }
    }
}

/// Resource kinds that can be captured as data events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceType {
    #[serde(rename = "AWS::S3::Object")]
    S3Object,
    #[serde(rename = "AWS::Lambda::Function")]
    LambdaFunction,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::S3Object => "AWS::S3::Object",
            ResourceType::LambdaFunction => "AWS::Lambda::Function",
        }
    }
}

/// One data resource entry of an event selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataResource {
    #[serde(rename = "Type")]
    pub resource_type: ResourceType,
    pub values: Vec<String>,
}

/// A CloudTrail event selector as accepted by `PutEventSelectors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventSelector {
    pub read_write_type: ReadWriteType,
    pub include_management_events: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_resources: Option<Vec<DataResource>>,
}

impl EventSelector {
    /// Management-plane selector with no data events.
    pub fn management() -> Self {
        Self {
            read_write_type: ReadWriteType::All,
            include_management_events: true,
            data_resources: None,
        }
    }

    pub fn is_data_event_selector(&self) -> bool {
        !self.include_management_events
    }
}

/// Baseline trail flags reapplied through `UpdateTrail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateTrailRequest {
    pub name: String,
    pub include_global_service_events: bool,
    pub is_multi_region_trail: bool,
    pub enable_log_file_validation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_bucket_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn read_write_type_rejects_unknown_modes() {
        assert_eq!(ReadWriteType::parse("ReadOnly"), Some(ReadWriteType::ReadOnly));
        assert_eq!(ReadWriteType::parse(" WriteOnly "), Some(ReadWriteType::WriteOnly));
        assert_eq!(ReadWriteType::parse("readonly"), None);
        assert_eq!(ReadWriteType::parse_or_default(Some("Bogus")), ReadWriteType::All);
        assert_eq!(ReadWriteType::parse_or_default(None), ReadWriteType::All);
    }

    #[test]
    fn selector_uses_cloudtrail_field_names() {
        let selector = EventSelector {
            read_write_type: ReadWriteType::WriteOnly,
            include_management_events: false,
            data_resources: Some(vec![DataResource {
                resource_type: ResourceType::S3Object,
                values: vec!["arn:aws:s3:::audit-bucket/".to_string()],
            }]),
        };

        let value = serde_json::to_value(&selector).expect("serialize");
        assert_eq!(
            value,
            json!({
                "ReadWriteType": "WriteOnly",
                "IncludeManagementEvents": false,
                "DataResources": [
                    {"Type": "AWS::S3::Object", "Values": ["arn:aws:s3:::audit-bucket/"]}
                ]
            })
        );

        let management = serde_json::to_value(EventSelector::management()).expect("serialize");
        assert_eq!(
            management,
            json!({"ReadWriteType": "All", "IncludeManagementEvents": true})
        );
    }
}
