// stowage-core/src/infrastructure/adapters/gcs.rs
//
// Cloud Storage through its JSON API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::resource::BucketName;
use crate::error::StowageError;
use crate::infrastructure::adapters::google_auth::TokenProvider;
use crate::infrastructure::adapters::http::{endpoint_url, ensure_success};
use crate::ports::object_store::ObjectStore;

pub struct GcsObjectStore {
    client: reqwest::Client,
    tokens: Arc<TokenProvider>,
    project_id: String,
    endpoint: String,
}

impl GcsObjectStore {
    pub fn new(
        client: reqwest::Client,
        tokens: Arc<TokenProvider>,
        project_id: &str,
        endpoint: &str,
    ) -> Self {
        Self {
            client,
            tokens,
            project_id: project_id.to_string(),
            endpoint: endpoint.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
    #[instrument(skip(self), fields(bucket = %bucket))]
    async fn bucket_exists(&self, bucket: &BucketName) -> Result<bool, StowageError> {
        let url = endpoint_url(&self.endpoint, &["storage", "v1", "b", bucket.as_str()])?;
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

    #[instrument(skip(self), fields(bucket = %bucket))]
    async fn create_bucket(&self, bucket: &BucketName, location: &str) -> Result<(), StowageError> {
        let mut url = endpoint_url(&self.endpoint, &["storage", "v1", "b"])?;
        url.query_pairs_mut().append_pair("project", &self.project_id);

        let response = self
            .client
            .post(url)
            .bearer_auth(self.tokens.access_token().await?)
            .json(&json!({ "name": bucket.as_str(), "location": location }))
            .send()
            .await?;
        ensure_success(response).await?;
        debug!("Bucket created");
        Ok(())
    }

    #[instrument(skip(self, data), fields(bucket = %bucket, bytes = data.len()))]
    async fn upload(
        &self,
        bucket: &BucketName,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StowageError> {
        let mut url = endpoint_url(
            &self.endpoint,
            &["upload", "storage", "v1", "b", bucket.as_str(), "o"],
        )?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", path);

        let response = self
            .client
            .post(url)
            .bearer_auth(self.tokens.access_token().await?)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}
