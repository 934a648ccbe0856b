use super::sigv4::{self, Credentials, RequestToSign};
use super::{ObjectStore, StorageError};
use chrono::Utc;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Where the bucket lives and how to sign for it
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    /// Custom S3-compatible endpoint (path-style). `None` = AWS virtual-hosted.
    pub endpoint: Option<String>,
    pub credentials: Credentials,
    pub timeout: Duration,
}

/// S3 (or S3-compatible) bucket over signed HTTPS
pub struct S3Bucket {
    settings: S3Settings,
    client: Client,
}

/// Resolved request target
#[derive(Debug, Clone, PartialEq)]
struct Target {
    url: String,
    host: String,
    path: String,
}

impl S3Bucket {
    pub fn new(settings: S3Settings) -> Result<Self, StorageError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { settings, client })
    }

    fn target(&self, key: &str) -> Result<Target, StorageError> {
        let key = key.trim_start_matches('/');

        match &self.settings.endpoint {
            None => {
                let host = format!(
                    "{}.s3.{}.amazonaws.com",
                    self.settings.bucket, self.settings.region
                );
                let path = format!("/{}", key);
                Ok(Target {
                    url: format!("https://{}{}", host, sigv4::uri_encode_path(&path)),
                    host,
                    path,
                })
            }
            Some(endpoint) => {
                let parsed = Url::parse(endpoint)
                    .map_err(|e| StorageError::Endpoint(format!("{}: {}", endpoint, e)))?;
                let host_name = parsed
                    .host_str()
                    .ok_or_else(|| StorageError::Endpoint(format!("{}: missing host", endpoint)))?;
                let host = match parsed.port() {
                    Some(port) => format!("{}:{}", host_name, port),
                    None => host_name.to_string(),
                };
                let prefix = parsed.path().trim_end_matches('/');
                let path = format!("{}/{}/{}", prefix, self.settings.bucket, key);
                Ok(Target {
                    url: format!(
                        "{}://{}{}",
                        parsed.scheme(),
                        host,
                        sigv4::uri_encode_path(&path)
                    ),
                    host,
                    path,
                })
            }
        }
    }

    fn signed(
        &self,
        builder: reqwest::blocking::RequestBuilder,
        method: &str,
        target: &Target,
        payload: &[u8],
    ) -> reqwest::blocking::RequestBuilder {
        let request = RequestToSign {
            method,
            host: &target.host,
            path: &target.path,
            region: &self.settings.region,
            service: "s3",
            payload,
        };
        let signed = sigv4::sign(&request, &self.settings.credentials, Utc::now());

        let mut builder = builder
            .header("authorization", signed.authorization)
            .header("x-amz-date", signed.amz_date)
            .header("x-amz-content-sha256", signed.content_sha256);
        if let Some(token) = signed.security_token {
            builder = builder.header("x-amz-security-token", token);
        }
        builder
    }
}

impl ObjectStore for S3Bucket {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let target = self.target(key)?;
        debug!(url = %target.url, "GET object");

        let response = self
            .signed(self.client.get(&target.url), "GET", &target, b"")
            .send()?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StorageError::Status {
                status: status.as_u16(),
                key: key.to_string(),
                body: response.text().unwrap_or_default(),
            });
        }

        Ok(Some(response.bytes()?.to_vec()))
    }

    fn put(&self, key: &str, body: &[u8]) -> Result<(), StorageError> {
        let target = self.target(key)?;
        debug!(url = %target.url, bytes = body.len(), "PUT object");

        let response = self
            .signed(self.client.put(&target.url), "PUT", &target, body)
            .header("content-type", "text/csv")
            .body(body.to_vec())
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Status {
                status: status.as_u16(),
                key: key.to_string(),
                body: response.text().unwrap_or_default(),
            });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.settings.endpoint {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), self.settings.bucket),
            None => format!("s3://{}", self.settings.bucket),
        }
    }
}
