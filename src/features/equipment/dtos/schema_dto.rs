use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::equipment::services::{ColumnOutcome, SchemaStatus, SetupReport};
use crate::modules::storage::BucketProvision;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SchemaStatusDto {
    pub ready: bool,
    pub schema_version: u32,
    pub missing_fields: Vec<String>,
}

impl SchemaStatusDto {
    pub fn new(status: &SchemaStatus, schema_version: u32) -> Self {
        let missing_fields = match status {
            SchemaStatus::Ready => Vec::new(),
            SchemaStatus::NeedsSetup { missing_fields } => missing_fields.clone(),
        };
        Self {
            ready: status.is_ready(),
            schema_version,
            missing_fields,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColumnOutcomeDto {
    Added,
    AlreadyPresent,
    Failed,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ColumnSetupDto {
    pub name: String,
    pub outcome: ColumnOutcomeDto,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetupReportDto {
    pub columns: Vec<ColumnSetupDto>,
    /// created, already_exists, assumed or failed
    pub video_bucket: String,
    pub video_bucket_error: Option<String>,
    pub status: SchemaStatusDto,
}

impl From<SetupReport> for SetupReportDto {
    fn from(report: SetupReport) -> Self {
        let columns = report
            .columns
            .into_iter()
            .map(|(name, outcome)| {
                let (outcome, error) = match outcome {
                    ColumnOutcome::Added => (ColumnOutcomeDto::Added, None),
                    ColumnOutcome::AlreadyPresent => (ColumnOutcomeDto::AlreadyPresent, None),
                    ColumnOutcome::Failed(e) => (ColumnOutcomeDto::Failed, Some(e)),
                };
                ColumnSetupDto {
                    name,
                    outcome,
                    error,
                }
            })
            .collect();

        let (video_bucket, video_bucket_error) = match report.video_bucket {
            Ok(BucketProvision::Created) => ("created", None),
            Ok(BucketProvision::AlreadyExists) => ("already_exists", None),
            Ok(BucketProvision::Assumed) => ("assumed", None),
            Err(e) => ("failed", Some(e)),
        };

        Self {
            columns,
            video_bucket: video_bucket.to_string(),
            video_bucket_error,
            status: SchemaStatusDto::new(&report.status, report.schema_version),
        }
    }
}
