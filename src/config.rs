// ⚙️ Configuration - secrets file + environment
//
// Same shape as a Streamlit secrets.toml:
//
//   [aws]
//   aws_access_key_id = "..."
//   aws_secret_access_key = "..."
//   aws_default_region = "us-east-1"
//   s3_bucket_name = "..."
//
// plus optional [storage] and [merger] tables. Environment variables win.

use crate::editor::DEFAULT_OBJECT_KEY;
use crate::merger::DEFAULT_WORLD_BANK_URL;
use crate::storage::sigv4::Credentials;
use crate::storage::{LocalBucket, MemoryBucket, ObjectStore, S3Bucket, S3Settings};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_SECRETS_PATH: &str = ".streamlit/secrets.toml";

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_object_key() -> String {
    DEFAULT_OBJECT_KEY.to_string()
}

fn default_local_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_indicator_url() -> String {
    DEFAULT_WORLD_BANK_URL.to_string()
}

fn default_year_start() -> i32 {
    1960
}

fn default_year_end() -> i32 {
    2023
}

fn default_per_page() -> u32 {
    20_000
}

fn default_timeout_secs() -> u64 {
    30
}

// ============================================================================
// SECTIONS
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AwsSection {
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    #[serde(default)]
    pub aws_session_token: Option<String>,
    #[serde(default = "default_region")]
    pub aws_default_region: String,
    pub s3_bucket_name: String,
    /// S3-compatible endpoint (MinIO, R2, ...); unset for AWS
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            "memory" => Ok(StorageBackend::Memory),
            other => bail!("unknown storage backend '{}' (expected s3, local or memory)", other),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    #[serde(default)]
    pub backend: Option<StorageBackend>,
    #[serde(default = "default_object_key")]
    pub object_key: String,
    #[serde(default = "default_local_dir")]
    pub local_dir: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StorageSection {
    fn default() -> Self {
        StorageSection {
            backend: None,
            object_key: default_object_key(),
            local_dir: default_local_dir(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MergerSection {
    #[serde(default = "default_indicator_url")]
    pub indicator_base_url: String,
    #[serde(default = "default_year_start")]
    pub year_start: i32,
    #[serde(default = "default_year_end")]
    pub year_end: i32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MergerSection {
    fn default() -> Self {
        MergerSection {
            indicator_base_url: default_indicator_url(),
            year_start: default_year_start(),
            year_end: default_year_end(),
            per_page: default_per_page(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl MergerSection {
    pub fn years(&self) -> RangeInclusive<i32> {
        self.year_start..=self.year_end
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ============================================================================
// APP CONFIG
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub aws: Option<AwsSection>,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub merger: MergerSection,
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse secrets file")
    }

    /// Load `path` (or the default secrets path if it exists), then apply env overrides.
    ///
    /// An explicitly named file that does not exist is an error; a missing default is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let mut config = match path {
            Some(p) => {
                let text = fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config {}", p.display()))?;
                Self::from_toml_str(&text)?
            }
            None => {
                let default = Path::new(DEFAULT_SECRETS_PATH);
                if default.exists() {
                    let text = fs::read_to_string(default)
                        .with_context(|| format!("Failed to read config {}", default.display()))?;
                    Self::from_toml_str(&text)?
                } else {
                    debug!("no secrets file, using defaults + environment");
                    AppConfig::default()
                }
            }
        };

        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay environment values. `lookup` is injected for tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("HOS_STORAGE_BACKEND") {
            self.storage.backend = Some(backend.parse()?);
        }
        if let Some(key) = lookup("HOS_OBJECT_KEY") {
            self.storage.object_key = key;
        }
        if let Some(dir) = lookup("HOS_LOCAL_DIR") {
            self.storage.local_dir = PathBuf::from(dir);
        }

        let key_id = lookup("AWS_ACCESS_KEY_ID");
        let secret = lookup("AWS_SECRET_ACCESS_KEY");
        let bucket = lookup("S3_BUCKET_NAME");
        let region = lookup("AWS_DEFAULT_REGION");
        let token = lookup("AWS_SESSION_TOKEN");
        let endpoint = lookup("S3_ENDPOINT");

        match self.aws.as_mut() {
            Some(aws) => {
                if let Some(v) = key_id {
                    aws.aws_access_key_id = v;
                }
                if let Some(v) = secret {
                    aws.aws_secret_access_key = v;
                }
                if let Some(v) = bucket {
                    aws.s3_bucket_name = v;
                }
                if let Some(v) = region {
                    aws.aws_default_region = v;
                }
                if token.is_some() {
                    aws.aws_session_token = token;
                }
                if endpoint.is_some() {
                    aws.endpoint = endpoint;
                }
            }
            None => {
                if let (Some(key_id), Some(secret), Some(bucket)) = (key_id, secret, bucket) {
                    self.aws = Some(AwsSection {
                        aws_access_key_id: key_id,
                        aws_secret_access_key: secret,
                        aws_session_token: token,
                        aws_default_region: region.unwrap_or_else(default_region),
                        s3_bucket_name: bucket,
                        endpoint,
                    });
                }
            }
        }

        Ok(())
    }

    /// Explicit backend, else S3 when credentials exist, else a local directory
    pub fn backend(&self) -> StorageBackend {
        match (self.storage.backend, &self.aws) {
            (Some(backend), _) => backend,
            (None, Some(_)) => StorageBackend::S3,
            (None, None) => StorageBackend::Local,
        }
    }

    pub fn open_bucket(&self) -> Result<Box<dyn ObjectStore>> {
        match self.backend() {
            StorageBackend::S3 => {
                let aws = self
                    .aws
                    .as_ref()
                    .context("S3 backend selected but no [aws] credentials configured")?;
                let settings = S3Settings {
                    bucket: aws.s3_bucket_name.clone(),
                    region: aws.aws_default_region.clone(),
                    endpoint: aws.endpoint.clone(),
                    credentials: Credentials {
                        access_key_id: aws.aws_access_key_id.clone(),
                        secret_access_key: aws.aws_secret_access_key.clone(),
                        session_token: aws.aws_session_token.clone(),
                    },
                    timeout: Duration::from_secs(self.storage.timeout_secs),
                };
                Ok(Box::new(S3Bucket::new(settings).context("Failed to build S3 client")?))
            }
            StorageBackend::Local => Ok(Box::new(LocalBucket::new(&self.storage.local_dir))),
            StorageBackend::Memory => Ok(Box::new(MemoryBucket::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRETS: &str = r#"
        [aws]
        aws_access_key_id = "AKID"
        aws_secret_access_key = "SECRET"
        s3_bucket_name = "rankings"
    "#;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_streamlit_shaped_secrets() {
        let config = AppConfig::from_toml_str(SECRETS).unwrap();
        let aws = config.aws.as_ref().unwrap();

        assert_eq!(aws.aws_default_region, "us-east-1");
        assert_eq!(aws.s3_bucket_name, "rankings");
        assert_eq!(config.storage.object_key, "head_of_state_data.csv");
        assert_eq!(config.backend(), StorageBackend::S3);
        assert_eq!(config.merger.years(), 1960..=2023);
    }

    #[test]
    fn test_defaults_without_credentials_use_local_dir() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.backend(), StorageBackend::Local);
        assert_eq!(config.storage.local_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [storage]
            backend = "memory"
            object_key = "custom.csv"

            [merger]
            year_start = 1990
            year_end = 2000
            "#,
        )
        .unwrap();

        assert_eq!(config.backend(), StorageBackend::Memory);
        assert_eq!(config.storage.object_key, "custom.csv");
        assert_eq!(config.merger.years(), 1990..=2000);
        assert_eq!(config.merger.per_page, 20_000);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = AppConfig::from_toml_str(SECRETS).unwrap();
        config
            .apply_env(env_of(&[
                ("AWS_DEFAULT_REGION", "eu-west-1"),
                ("S3_BUCKET_NAME", "other"),
            ]))
            .unwrap();

        let aws = config.aws.unwrap();
        assert_eq!(aws.aws_default_region, "eu-west-1");
        assert_eq!(aws.s3_bucket_name, "other");
        assert_eq!(aws.aws_access_key_id, "AKID");
    }

    #[test]
    fn test_env_alone_builds_credentials() {
        let mut config = AppConfig::default();
        config
            .apply_env(env_of(&[
                ("AWS_ACCESS_KEY_ID", "A"),
                ("AWS_SECRET_ACCESS_KEY", "B"),
                ("S3_BUCKET_NAME", "C"),
            ]))
            .unwrap();

        assert_eq!(config.backend(), StorageBackend::S3);
        assert_eq!(config.aws.unwrap().aws_default_region, "us-east-1");
    }

    #[test]
    fn test_bad_backend_name_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_env(env_of(&[("HOS_STORAGE_BACKEND", "ftp")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_s3_without_credentials_fails_to_open() {
        let config = AppConfig::from_toml_str("[storage]\nbackend = \"s3\"\n").unwrap();
        assert!(config.open_bucket().is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        assert!(AppConfig::load(Some(Path::new("/no/such/secrets.toml"))).is_err());
    }
}
