use anyhow::Context;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    presigning::PresigningConfig,
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use axum::async_trait;
use bytes::Bytes;
use uuid::Uuid;

/// Byte sink for profile images. All validation happens before anything
/// reaches this boundary; the store itself keeps no state beyond the object.
#[async_trait]
pub trait AvatarStore: Send + Sync {
    /// Write the avatar bytes and return the storage key.
    async fn put_avatar(
        &self,
        user_id: Uuid,
        body: Bytes,
        content_type: &str,
    ) -> anyhow::Result<String>;
    /// Remove a previously stored avatar, e.g. when it is replaced.
    async fn remove_avatar(&self, key: &str) -> anyhow::Result<()>;
    /// Short-lived URL a browser can fetch the avatar from.
    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String>;
}

fn ext_from_mime(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        // jpeg is the only other type allowed past validation
        _ => "jpg",
    }
}

#[derive(Clone)]
pub struct S3AvatarStore {
    client: Client,
    bucket: String,
}

impl S3AvatarStore {
    pub async fn new(
        endpoint: &str,
        bucket: &str,
        access_key: &str,
        secret_key: &str,
        region: &str,
    ) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(Credentials::new(
                access_key, secret_key, None, None, "static",
            ))
            .endpoint_url(endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: bucket.to_string(),
        })
    }
}

#[async_trait]
impl AvatarStore for S3AvatarStore {
    async fn put_avatar(
        &self,
        user_id: Uuid,
        body: Bytes,
        content_type: &str,
    ) -> anyhow::Result<String> {
        let key = format!(
            "avatars/{}/{}.{}",
            user_id,
            Uuid::new_v4(),
            ext_from_mime(content_type)
        );
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .with_context(|| format!("s3 put_object {}", key))?;
        Ok(key)
    }

    async fn remove_avatar(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .context("s3 delete_object")?;
        Ok(())
    }

    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String> {
        let req = self.client.get_object().bucket(&self.bucket).key(key);
        let presigned = req
            .presigned(PresigningConfig::expires_in(
                std::time::Duration::from_secs(seconds),
            )?)
            .await
            .context("s3 presign_get")?;
        Ok(presigned.uri().to_string())
    }
}
