// stowage-core/src/infrastructure/adapters/bigquery.rs
//
// BigQuery through its REST API: dataset metadata and load jobs fed by a
// multipart upload, polled until DONE.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::domain::load::{LoadJobConfig, LoadSummary};
use crate::domain::resource::{DatasetRef, TableRef};
use crate::error::StowageError;
use crate::infrastructure::adapters::google_auth::TokenProvider;
use crate::infrastructure::adapters::http::{endpoint_url, ensure_success};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::require_file;
use crate::ports::warehouse::Warehouse;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Job {
    job_reference: JobReference,
    #[serde(default)]
    status: JobStatus,
    #[serde(default)]
    statistics: Option<JobStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct JobStatus {
    #[serde(default)]
    state: String,
    #[serde(default)]
    error_result: Option<ErrorProto>,
    #[serde(default)]
    errors: Vec<ErrorProto>,
}

#[derive(Debug, Deserialize)]
struct ErrorProto {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct JobStatistics {
    #[serde(default)]
    load: Option<LoadStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadStatistics {
    #[serde(default)]
    output_rows: Option<String>,
}

impl Job {
    fn is_done(&self) -> bool {
        self.status.state == "DONE"
    }

    fn failure(&self) -> Option<InfrastructureError> {
        let first = self.status.error_result.as_ref()?;
        let mut message = first.message.clone();
        let details: Vec<&str> = self
            .status
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .filter(|m| *m != first.message)
            .collect();
        if !details.is_empty() {
            message = format!("{} ({})", message, details.join("; "));
        }
        Some(InfrastructureError::LoadJobFailed {
            job_id: self.job_reference.job_id.clone(),
            message,
        })
    }

    fn output_rows(&self) -> Option<u64> {
        self.statistics
            .as_ref()?
            .load
            .as_ref()?
            .output_rows
            .as_deref()?
            .parse()
            .ok()
    }
}

pub struct BigQueryWarehouse {
    client: reqwest::Client,
    tokens: Arc<TokenProvider>,
    endpoint: String,
    dataset_location: Option<String>,
    poll_interval: Duration,
}

impl BigQueryWarehouse {
    pub fn new(
        client: reqwest::Client,
        tokens: Arc<TokenProvider>,
        endpoint: &str,
        dataset_location: Option<String>,
    ) -> Self {
        Self {
            client,
            tokens,
            endpoint: endpoint.to_string(),
            dataset_location,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    async fn get_job(&self, project: &str, reference: &JobReference) -> Result<Job, StowageError> {
        let mut url = endpoint_url(
            &self.endpoint,
            &["bigquery", "v2", "projects", project, "jobs", &reference.job_id],
        )?;
        if let Some(location) = &reference.location {
            url.query_pairs_mut().append_pair("location", location);
        }
        let response = self
            .client
            .get(url)
            .bearer_auth(self.tokens.access_token().await?)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }
}

/// Metadata part + file part of a `multipart/related` upload.
fn multipart_related(boundary: &str, metadata: &Value, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 512);
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{m}\r\n--{b}\r\nContent-Type: application/octet-stream\r\n\r\n",
            b = boundary,
            m = metadata
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

fn load_job_metadata(table: &TableRef, config: &LoadJobConfig) -> Value {
    json!({
        "configuration": {
            "load": {
                "destinationTable": {
                    "projectId": table.project,
                    "datasetId": table.dataset,
                    "tableId": table.table,
                },
                "sourceFormat": config.source_format.api_name(),
                "autodetect": config.autodetect,
                "writeDisposition": config.write_disposition.api_name(),
            }
        }
    })
}

#[async_trait]
impl Warehouse for BigQueryWarehouse {
    #[instrument(skip(self), fields(dataset = %dataset))]
    async fn dataset_exists(&self, dataset: &DatasetRef) -> Result<bool, StowageError> {
        let url = endpoint_url(
            &self.endpoint,
            &["bigquery", "v2", "projects", &dataset.project, "datasets", &dataset.dataset],
        )?;
        let response = self
            .client
            .get(url)
            .bearer_auth(self.tokens.access_token().await?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        ensure_success(response).await?;
        Ok(true)
    }

    #[instrument(skip(self), fields(dataset = %dataset))]
    async fn create_dataset(&self, dataset: &DatasetRef) -> Result<(), StowageError> {
        let url = endpoint_url(
            &self.endpoint,
            &["bigquery", "v2", "projects", &dataset.project, "datasets"],
        )?;
        let mut body = json!({
            "datasetReference": {
                "projectId": dataset.project,
                "datasetId": dataset.dataset,
            }
        });
        if let Some(location) = &self.dataset_location {
            body["location"] = json!(location);
        }

        let response = self
            .client
            .post(url)
            .bearer_auth(self.tokens.access_token().await?)
            .json(&body)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    #[instrument(skip(self, config), fields(table = %table, format = %config.source_format))]
    async fn load_file(
        &self,
        path: &Path,
        table: &TableRef,
        config: &LoadJobConfig,
    ) -> Result<LoadSummary, StowageError> {
        require_file(path)?;
        let data = tokio::fs::read(path).await?;

        let boundary = format!(
            "stowage_{}",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );
        let body = multipart_related(&boundary, &load_job_metadata(table, config), &data);

        let mut url = endpoint_url(
            &self.endpoint,
            &["upload", "bigquery", "v2", "projects", &table.project, "jobs"],
        )?;
        url.query_pairs_mut().append_pair("uploadType", "multipart");

        let response = self
            .client
            .post(url)
            .bearer_auth(self.tokens.access_token().await?)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await?;
        let mut job: Job = ensure_success(response).await?.json().await?;
        info!(job_id = %job.job_reference.job_id, "Load job submitted");

        while !job.is_done() {
            tokio::time::sleep(self.poll_interval).await;
            job = self.get_job(&table.project, &job.job_reference).await?;
            debug!(state = %job.status.state, "Polled load job");
        }

        if let Some(failure) = job.failure() {
            return Err(failure.into());
        }

        Ok(LoadSummary {
            table: table.clone(),
            output_rows: job.output_rows(),
            job_id: job.job_reference.job_id,
        })
    }
}
