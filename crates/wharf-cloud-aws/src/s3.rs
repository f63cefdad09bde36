//! S3 bucket driver
//!
//! Unlike the RDS driver, `up` refuses to adopt a pre-existing bucket:
//! a successful head probe is a hard failure. Any probe failure is
//! treated as absence (the cause is surfaced as a debug event) and
//! creation is attempted. `down` deletes the bucket and treats an
//! absent bucket as success; a non-empty bucket is a failure.

use crate::client::{DEFAULT_REGION, load_aws_config};
use crate::driver::ResourceDriver;
use crate::error::{AwsError, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use wharf_core::{EventSink, Options, with_fallback};

const DEFAULT_PROJECT: &str = "compose";
const DEFAULT_NAME: &str = "s3";

/// Resolves the bucket name for both up and down flows.
///
/// An explicit `bucket_name` wins verbatim; otherwise the name is
/// composed from project, service name and region, lowercased with
/// underscores replaced by hyphens to stay within bucket naming rules.
/// Up and down must call this identically so teardown targets the
/// bucket creation produced.
pub fn derive_bucket_name(options: &Options, region: &str) -> String {
    if !options.bucket_name.is_empty() {
        return options.bucket_name.clone();
    }

    let project = with_fallback(&options.project, DEFAULT_PROJECT);
    let name = with_fallback(&options.name, DEFAULT_NAME);

    format!("{project}-{name}-{region}")
        .to_lowercase()
        .replace('_', "-")
}

/// us-east-1 is the one region where the create call must omit the
/// location constraint entirely.
fn location_constraint_for(region: &str) -> Option<BucketLocationConstraint> {
    (region != "us-east-1").then(|| BucketLocationConstraint::from(region))
}

/// S3 driver
#[derive(Debug, Default)]
pub struct S3Driver {
    client: Option<Client>,
}

impl S3Driver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Driver bound to a pre-built client, bypassing ambient region
    /// resolution. Used by embedding callers and tests.
    pub fn with_client(client: Client) -> Self {
        Self {
            client: Some(client),
        }
    }

    async fn client_for(&self, region: &str) -> Client {
        match &self.client {
            Some(client) => client.clone(),
            None => Client::new(&load_aws_config(region).await),
        }
    }
}

#[async_trait]
impl ResourceDriver for S3Driver {
    fn name(&self) -> &str {
        "s3"
    }

    async fn up(&self, options: &Options, events: &dyn EventSink) -> Result<()> {
        let region = with_fallback(&options.region, DEFAULT_REGION).to_string();
        let name = with_fallback(&options.name, DEFAULT_NAME).to_string();
        let bucket = derive_bucket_name(options, &region);

        let client = self.client_for(&region).await;

        match client.head_bucket().bucket(&bucket).send().await {
            Ok(_) => {
                // No adoption semantics for buckets: an existing,
                // accessible bucket aborts the flow.
                events.error(&format!("S3 bucket {bucket} already exists; aborting"));
                return Err(AwsError::ResourceAlreadyExists(bucket));
            }
            Err(err) => {
                // Any probe failure (not found, access denied, network)
                // is treated as absence; the cause is surfaced so
                // operators can tell them apart. If the bucket does
                // exist after all, creation fails below.
                events.debug(&format!("head bucket {bucket} failed: {err}"));
            }
        }

        events.info(&format!("creating S3 bucket {bucket} in region {region}"));

        let mut create = client.create_bucket().bucket(&bucket);
        if let Some(constraint) = location_constraint_for(&region) {
            create = create.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(constraint)
                    .build(),
            );
        }

        create.send().await.map_err(|err| {
            events.error(&format!("create S3 bucket failed: {err}"));
            AwsError::Api(format!("create S3 bucket failed: {err}"))
        })?;

        let url = format!("https://{bucket}.s3.{region}.amazonaws.com");

        // Legacy-style variable names
        events.setenv("BUCKET_NAME", &bucket);
        events.setenv("BUCKET_REGION", &region);
        events.setenv("BUCKET_URL", &url);

        // Prefixed variable names
        events.setenv("S3_BUCKET_NAME", &bucket);
        events.setenv("S3_BUCKET_REGION", &region);
        events.setenv("S3_BUCKET_URL", &url);

        events.info(&format!("service s3 ready for {name} (bucket={bucket})"));

        Ok(())
    }

    async fn down(&self, options: &Options, events: &dyn EventSink) -> Result<()> {
        let region = with_fallback(&options.region, DEFAULT_REGION).to_string();
        let bucket = derive_bucket_name(options, &region);

        let client = self.client_for(&region).await;

        events.info(&format!(
            "deleting S3 bucket {bucket} in region {region} (bucket must be empty)"
        ));

        if let Err(err) = client.delete_bucket().bucket(&bucket).send().await {
            // The delete-bucket error carries no modeled not-found
            // variant; match on the error code instead.
            if err.code() == Some("NoSuchBucket") {
                events.info(&format!(
                    "S3 bucket {bucket} does not exist, nothing to delete"
                ));
                return Ok(());
            }

            events.error(&format!("delete S3 bucket failed: {err}"));
            return Err(AwsError::Api(format!("delete S3 bucket failed: {err}")));
        }

        // Deletion may complete asynchronously on the provider side.
        events.info(&format!("S3 bucket {bucket} delete requested"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(project: &str, name: &str, bucket_name: &str) -> Options {
        Options {
            project: project.to_string(),
            name: name.to_string(),
            bucket_name: bucket_name.to_string(),
            ..Options::default()
        }
    }

    #[test]
    fn explicit_bucket_name_wins_verbatim() {
        let opt = options("p", "n", "custom");
        assert_eq!(derive_bucket_name(&opt, "us-east-1"), "custom");
    }

    #[test]
    fn derived_name_combines_project_name_region() {
        let opt = options("p", "n", "");
        assert_eq!(derive_bucket_name(&opt, "eu-west-1"), "p-n-eu-west-1");
    }

    #[test]
    fn derived_name_is_lowercased_and_dehyphenated() {
        let opt = options("My_Project", "Data_Store", "");
        assert_eq!(
            derive_bucket_name(&opt, "eu-west-1"),
            "my-project-data-store-eu-west-1"
        );
    }

    #[test]
    fn derived_name_falls_back_to_compose_defaults() {
        let opt = options("", "", "");
        assert_eq!(
            derive_bucket_name(&opt, "ap-southeast-1"),
            "compose-s3-ap-southeast-1"
        );
    }

    #[test]
    fn derivation_is_deterministic() {
        let opt = options("p", "n", "");
        assert_eq!(
            derive_bucket_name(&opt, "eu-west-1"),
            derive_bucket_name(&opt, "eu-west-1")
        );
    }

    #[test]
    fn us_east_1_omits_location_constraint() {
        assert!(location_constraint_for("us-east-1").is_none());
    }

    #[test]
    fn other_regions_carry_location_constraint() {
        let constraint = location_constraint_for("eu-west-1").unwrap();
        assert_eq!(constraint.as_str(), "eu-west-1");
    }
}

#[cfg(test)]
mod driver_tests {
    use super::*;
    use aws_sdk_s3::error::ErrorMetadata;
    use aws_sdk_s3::operation::create_bucket::CreateBucketOutput;
    use aws_sdk_s3::operation::delete_bucket::DeleteBucketError;
    use aws_sdk_s3::operation::head_bucket::{HeadBucketError, HeadBucketOutput};
    use aws_sdk_s3::types::error::NotFound;
    use aws_smithy_mocks::{RuleMode, mock, mock_client};
    use wharf_core::{EventKind, MemorySink};

    fn options(project: &str, name: &str) -> Options {
        Options {
            project: project.to_string(),
            name: name.to_string(),
            region: "eu-west-1".to_string(),
            ..Options::default()
        }
    }

    #[tokio::test]
    async fn up_refuses_an_existing_bucket() {
        let head = mock!(Client::head_bucket).then_output(|| HeadBucketOutput::builder().build());
        // No create rule is registered: a create call would fail the
        // test instead of being silently served.
        let client = mock_client!(aws_sdk_s3, RuleMode::MatchAny, [&head]);

        let sink = MemorySink::new();
        let result = S3Driver::with_client(client)
            .up(&options("shop", "assets"), &sink)
            .await;

        match result {
            Err(AwsError::ResourceAlreadyExists(bucket)) => {
                assert_eq!(bucket, "shop-assets-eu-west-1");
            }
            other => panic!("expected already-exists error, got {other:?}"),
        }
        assert_eq!(
            sink.messages_of(EventKind::Error),
            vec!["S3 bucket shop-assets-eu-west-1 already exists; aborting"]
        );
        assert!(sink.messages_of(EventKind::Setenv).is_empty());
    }

    #[tokio::test]
    async fn up_creates_the_bucket_when_absent() {
        let head = mock!(Client::head_bucket)
            .then_error(|| HeadBucketError::NotFound(NotFound::builder().build()));
        let create =
            mock!(Client::create_bucket).then_output(|| CreateBucketOutput::builder().build());
        let client = mock_client!(aws_sdk_s3, RuleMode::MatchAny, [&head, &create]);

        let sink = MemorySink::new();
        S3Driver::with_client(client)
            .up(&options("shop", "assets"), &sink)
            .await
            .unwrap();

        assert_eq!(create.num_calls(), 1);
        // The failed head probe is surfaced as a debug event.
        assert!(
            sink.messages_of(EventKind::Debug)
                .iter()
                .any(|m| m.starts_with("head bucket shop-assets-eu-west-1 failed"))
        );
        assert_eq!(
            sink.messages_of(EventKind::Setenv),
            vec![
                "BUCKET_NAME=shop-assets-eu-west-1",
                "BUCKET_REGION=eu-west-1",
                "BUCKET_URL=https://shop-assets-eu-west-1.s3.eu-west-1.amazonaws.com",
                "S3_BUCKET_NAME=shop-assets-eu-west-1",
                "S3_BUCKET_REGION=eu-west-1",
                "S3_BUCKET_URL=https://shop-assets-eu-west-1.s3.eu-west-1.amazonaws.com",
            ]
        );
    }

    #[tokio::test]
    async fn down_on_absent_bucket_is_a_success() {
        let delete = mock!(Client::delete_bucket).then_error(|| {
            DeleteBucketError::generic(ErrorMetadata::builder().code("NoSuchBucket").build())
        });
        let client = mock_client!(aws_sdk_s3, RuleMode::MatchAny, [&delete]);

        let sink = MemorySink::new();
        S3Driver::with_client(client)
            .down(&options("shop", "assets"), &sink)
            .await
            .unwrap();

        assert_eq!(delete.num_calls(), 1);
        assert!(
            sink.messages_of(EventKind::Info)
                .iter()
                .any(|m| m.contains("S3 bucket shop-assets-eu-west-1 does not exist, nothing to delete"))
        );
        assert!(sink.messages_of(EventKind::Error).is_empty());
    }

    #[tokio::test]
    async fn down_propagates_other_delete_failures() {
        let delete = mock!(Client::delete_bucket).then_error(|| {
            DeleteBucketError::generic(ErrorMetadata::builder().code("BucketNotEmpty").build())
        });
        let client = mock_client!(aws_sdk_s3, RuleMode::MatchAny, [&delete]);

        let sink = MemorySink::new();
        let result = S3Driver::with_client(client)
            .down(&options("shop", "assets"), &sink)
            .await;

        match result {
            Err(AwsError::Api(message)) => assert!(message.contains("delete S3 bucket failed")),
            other => panic!("expected API error, got {other:?}"),
        }
        assert_eq!(sink.messages_of(EventKind::Error).len(), 1);
    }
}
