//! Amazon S3 adapter for the retention pipeline
//!
//! Implements [`retention::ObjectStore`] on top of `aws-sdk-s3`. Works with
//! any S3-compatible service:
//! - AWS S3
//! - MinIO
//! - Cloudflare R2
//! - LocalStack

pub mod config;
pub mod convert;

pub use config::S3Config;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::types::Delete;
use retention::{DeleteResponse, ListPage, ObjectStore, StoreError};
use tracing::{debug, error, info, instrument};

/// S3 client bound to one set of credentials and endpoint
#[derive(Debug, Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
}

impl S3Store {
    /// Resolve credentials and region, then build the client
    pub async fn connect(config: &S3Config) -> Self {
        info!(
            region = ?config.region,
            profile = ?config.profile,
            endpoint = ?config.endpoint,
            "Initializing S3 client"
        );

        let mut sdk_config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = &config.region {
            sdk_config_builder = sdk_config_builder.region(aws_config::Region::new(region.clone()));
        }
        if let Some(profile) = &config.profile {
            sdk_config_builder = sdk_config_builder.profile_name(profile);
        }

        let sdk_config = sdk_config_builder.load().await;

        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&sdk_config);

        if let Some(endpoint) = &config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        if config.force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        Self::from_client(aws_sdk_s3::Client::from_conf(s3_config_builder.build()))
    }

    pub fn from_client(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    #[instrument(skip(self))]
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        token: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .set_continuation_token(token.map(str::to_string))
            .send()
            .await
            .map_err(|e| {
                error!(error = %DisplayErrorContext(&e), "Failed to list objects");
                StoreError::list(bucket, prefix, DisplayErrorContext(&e).to_string())
            })?;

        let objects: Vec<_> = output
            .contents()
            .iter()
            .filter_map(convert::listed_object)
            .collect();
        let next_token =
            convert::next_token(output.is_truncated(), output.next_continuation_token())
                .map_err(|reason| {
                    error!(reason, "Incomplete listing page");
                    StoreError::list(bucket, prefix, reason)
                })?;
        debug!(objects = objects.len(), more = next_token.is_some(), "Listed page");

        Ok(ListPage {
            objects,
            next_token,
        })
    }

    #[instrument(skip(self, keys), fields(keys = keys.len()))]
    async fn delete_batch(
        &self,
        bucket: &str,
        keys: &[String],
        quiet: bool,
    ) -> Result<DeleteResponse, StoreError> {
        let request = convert::identifiers(keys)
            .and_then(|objects| Delete::builder().set_objects(Some(objects)).quiet(quiet).build())
            .map_err(|e| StoreError::delete(bucket, keys.len(), e))?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %DisplayErrorContext(&e), "Failed to delete objects");
                StoreError::delete(bucket, keys.len(), DisplayErrorContext(&e).to_string())
            })?;

        Ok(DeleteResponse {
            deleted: output
                .deleted()
                .iter()
                .filter_map(|d| d.key().map(str::to_string))
                .collect(),
            errors: output.errors().iter().map(convert::key_error).collect(),
            // DeleteObjects only produces an output for a 200 response
            status: Some(200),
        })
    }
}
