//! Connection settings for S3 and S3-compatible services

use serde::{Deserialize, Serialize};

/// How to reach the store
///
/// Everything is optional: unset fields fall back to the AWS default chain
/// (environment, shared config files, instance metadata).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct S3Config {
    /// AWS region, e.g. "eu-west-1"
    pub region: Option<String>,

    /// Named profile from the shared AWS config files
    pub profile: Option<String>,

    /// Custom endpoint URL for MinIO, R2, LocalStack and the like
    pub endpoint: Option<String>,

    /// Use path-style URLs instead of virtual-hosted style.
    /// Required for MinIO and some S3-compatible services.
    pub force_path_style: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_table_empty() {
        let config: S3Config = toml::from_str("").unwrap();
        assert_eq!(config, S3Config::default());
        assert!(!config.force_path_style);
    }

    #[test]
    fn test_minio_table() {
        let config: S3Config = toml::from_str(
            r#"
            region = "us-east-1"
            endpoint = "http://localhost:9000"
            force_path_style = true
            "#,
        )
        .unwrap();

        assert_eq!(config.region.as_deref(), Some("us-east-1"));
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:9000"));
        assert!(config.force_path_style);
        assert!(config.profile.is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<S3Config, _> = toml::from_str(r#"access_key = "nope""#);
        assert!(result.is_err());
    }
}
