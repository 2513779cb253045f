use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{
    error::{DownloadError, Result},
    http::Http,
};

/// Fetches a release endpoint that answers with either one release object or a list.
pub fn fetch_releases<T>(url: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    let json: Value = Http::json(url)?;
    parse_releases(url, json)
}

/// The newest release of a feed: the object itself, or the first element of a list.
pub fn fetch_latest<T>(url: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let mut releases = fetch_releases(url)?;
    if releases.is_empty() {
        return Err(DownloadError::EmptyFeed {
            url: url.to_string(),
        });
    }
    debug!(url, count = releases.len(), "fetched release feed");
    Ok(releases.swap_remove(0))
}

fn parse_releases<T>(url: &str, json: Value) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    let invalid = |err: serde_json::Error| {
        DownloadError::InvalidResponse {
            url: url.to_string(),
            reason: err.to_string(),
        }
    };

    match json {
        Value::Array(_) => serde_json::from_value(json).map_err(invalid),
        Value::Object(_) => {
            let single: T = serde_json::from_value(json).map_err(invalid)?;
            Ok(vec![single])
        }
        other => {
            Err(DownloadError::InvalidResponse {
                url: url.to_string(),
                reason: format!("expected an object or array, got {other}"),
            })
        }
    }
}
