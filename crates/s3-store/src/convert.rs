//! Conversions between SDK shapes and the store port types

use aws_sdk_s3::error::BuildError;
use aws_sdk_s3::primitives::DateTime as SdkDateTime;
use aws_sdk_s3::types::{Error as SdkKeyError, Object, ObjectIdentifier};
use chrono::{DateTime, Utc};
use retention::{KeyError, ListedObject};

/// SDK timestamp to chrono, `None` when out of chrono's range
pub fn to_chrono(at: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(at.secs(), at.subsec_nanos())
}

/// Listing entry for an SDK object; objects without a key are dropped
pub fn listed_object(object: &Object) -> Option<ListedObject> {
    let key = object.key()?;
    Some(ListedObject {
        key: key.to_string(),
        last_modified: object.last_modified().and_then(to_chrono),
    })
}

/// Continuation token of a listing page
///
/// A truncated page must carry a token, otherwise the rest of the listing
/// would be silently lost.
pub fn next_token(
    truncated: Option<bool>,
    token: Option<&str>,
) -> Result<Option<String>, &'static str> {
    match (truncated, token) {
        (Some(true), Some(token)) => Ok(Some(token.to_string())),
        (Some(true), None) => Err("truncated listing page without a continuation token"),
        _ => Ok(None),
    }
}

pub fn identifiers(keys: &[String]) -> Result<Vec<ObjectIdentifier>, BuildError> {
    keys.iter()
        .map(|key| ObjectIdentifier::builder().key(key).build())
        .collect()
}

pub fn key_error(error: &SdkKeyError) -> KeyError {
    KeyError {
        key: error.key().unwrap_or_default().to_string(),
        code: error.code().map(str::to_string),
        message: error.message().map(str::to_string),
    }
}
