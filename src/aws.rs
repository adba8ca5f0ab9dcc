use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::SdkConfig;
use aws_config::meta::region::RegionProviderChain;
use aws_credential_types::Credentials;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::models::{BucketInfo, ObjectInfo, ObjectListing, ObjectQuery};

const DEFAULT_REGION: &str = "us-east-1";
const DELIMITER: &str = "/";
const PROVIDER_NAME: &str = "s3-viewer";

/// An authenticated handle to the storage service.
#[derive(Clone, Debug)]
pub struct Session {
    client: Client,
    region: String,
}

impl Session {
    fn from_config(config: &SdkConfig) -> Self {
        let region = config
            .region()
            .map(|r| r.as_ref().to_string())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        Self {
            client: Client::new(config),
            region,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// A session that is never used to talk to the network.
    #[cfg(test)]
    pub fn offline() -> Self {
        use aws_sdk_s3::config::Region;

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(DEFAULT_REGION))
            .credentials_provider(Credentials::new("AKIDEXAMPLE", "secret", None, None, "test"))
            .build();
        Self {
            client: Client::from_conf(config),
            region: DEFAULT_REGION.to_string(),
        }
    }
}

/// The storage service and session provider as seen by the UI.
#[async_trait]
pub trait StorageGateway: Send + Sync {
    async fn list_buckets(&self, session: &Session) -> Result<Vec<BucketInfo>, GatewayError>;

    async fn list_objects(
        &self,
        session: &Session,
        query: &ObjectQuery,
    ) -> Result<ObjectListing, GatewayError>;

    /// Resolve a session from the ambient environment (variables, profiles,
    /// SSO cache, instance metadata).
    async fn resolve_session(&self) -> Result<Session, GatewayError>;

    /// Build a session from an explicit key pair and prove it works.
    async fn session_from_credentials(
        &self,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Session, GatewayError>;
}

pub struct S3Gateway;

#[async_trait]
impl StorageGateway for S3Gateway {
    async fn list_buckets(&self, session: &Session) -> Result<Vec<BucketInfo>, GatewayError> {
        let output = session
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|err| GatewayError::service("ListBuckets", describe_sdk_error(&err)))?;

        let mut buckets = Vec::new();
        for bucket in output.buckets() {
            if let Some(name) = bucket.name() {
                buckets.push(BucketInfo {
                    name: name.to_string(),
                    creation_date: bucket.creation_date().and_then(to_chrono),
                });
            }
        }
        buckets.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = buckets.len(), "listed buckets");
        Ok(buckets)
    }

    async fn list_objects(
        &self,
        session: &Session,
        query: &ObjectQuery,
    ) -> Result<ObjectListing, GatewayError> {
        let response = session
            .client
            .list_objects_v2()
            .bucket(&query.bucket)
            .delimiter(DELIMITER)
            .fetch_owner(true)
            .set_prefix(query.prefix())
            .set_continuation_token(query.continuation_token.clone())
            .send()
            .await
            .map_err(|err| GatewayError::service("ListObjectsV2", describe_sdk_error(&err)))?;

        let directories = response
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix())
            .map(str::to_string)
            .collect::<Vec<_>>();

        let mut files = Vec::new();
        for object in response.contents() {
            let Some(key) = object.key() else { continue };
            // The zero-byte "folder" placeholder for the listed path itself.
            if !query.path.is_empty() && key == query.path {
                continue;
            }
            files.push(ObjectInfo {
                key: key.to_string(),
                size: object.size().unwrap_or_default(),
                last_modified: object.last_modified().and_then(to_chrono),
                owner: object
                    .owner()
                    .and_then(|o| o.display_name())
                    .map(str::to_string),
            });
        }

        let next_token = if response.is_truncated().unwrap_or(false) {
            response.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        debug!(
            bucket = %query.bucket,
            path = %query.path,
            page = query.page,
            directories = directories.len(),
            files = files.len(),
            truncated = next_token.is_some(),
            "listed objects"
        );
        Ok(ObjectListing {
            directories,
            files,
            next_token,
        })
    }

    async fn resolve_session(&self) -> Result<Session, GatewayError> {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(RegionProviderChain::default_provider().or_else(DEFAULT_REGION))
            .load()
            .await;
        let provider = config
            .credentials_provider()
            .ok_or(GatewayError::MissingCredentials)?;
        if let Err(err) = provider.provide_credentials().await {
            warn!(error = %DisplayErrorContext(&err), "no ambient credentials");
            return Err(GatewayError::MissingCredentials);
        }
        let session = Session::from_config(&config);
        debug!(region = session.region(), "resolved session from environment");
        Ok(session)
    }

    async fn session_from_credentials(
        &self,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Session, GatewayError> {
        let access_key = access_key.trim();
        let secret_key = secret_key.trim();
        if access_key.is_empty() || secret_key.is_empty() {
            return Err(GatewayError::EmptyCredentials);
        }

        let credentials = Credentials::new(access_key, secret_key, None, None, PROVIDER_NAME);
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(RegionProviderChain::default_provider().or_else(DEFAULT_REGION))
            .credentials_provider(credentials)
            .load()
            .await;
        let session = Session::from_config(&config);

        session
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|err| GatewayError::service("Credential check", describe_sdk_error(&err)))?;
        debug!(region = session.region(), "validated interactive credentials");
        Ok(session)
    }
}

fn to_chrono(dt: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

fn describe_sdk_error<E, R>(err: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err {
        SdkError::ServiceError(ctx) => {
            let service = ctx.err();
            let code = service.code().unwrap_or("ServiceError");
            let message = service.message().unwrap_or("no message provided");
            let friendly = match code {
                "AccessDenied" => "access denied for these credentials",
                "InvalidAccessKeyId" => "the access key does not exist",
                "SignatureDoesNotMatch" => "the secret does not match the access key",
                "NoSuchBucket" => "the bucket no longer exists",
                _ => message,
            };
            format!("{code}: {friendly}")
        }
        SdkError::DispatchFailure(_) => "network/dispatch failure".into(),
        SdkError::TimeoutError(_) => "request timed out; please retry".into(),
        other => format!("{}", DisplayErrorContext(other)),
    }
}
