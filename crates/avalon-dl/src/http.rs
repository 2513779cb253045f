use serde::de::DeserializeOwned;
use tracing::trace;
use ureq::{http::Response, Body};

use crate::{
    error::{DownloadError, Result},
    http_client::SHARED_AGENT,
};

pub struct Http;

impl Http {
    /// Issues a GET and fails on any non-success status.
    pub fn fetch(url: &str) -> Result<Response<Body>> {
        trace!(url, "GET");
        let resp = SHARED_AGENT
            .get(url)
            .call()
            .map_err(|err| map_request_error(url, err))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DownloadError::HttpError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(resp)
    }

    pub fn json<T: DeserializeOwned>(url: &str) -> Result<T> {
        Http::fetch(url)?
            .body_mut()
            .read_json()
            .map_err(|err| {
                DownloadError::InvalidResponse {
                    url: url.to_string(),
                    reason: err.to_string(),
                }
            })
    }
}

fn map_request_error(url: &str, err: ureq::Error) -> DownloadError {
    match err {
        ureq::Error::BadUri(reason) => {
            DownloadError::InvalidUrl {
                url: url.to_string(),
                reason,
            }
        }
        ureq::Error::Http(err) => {
            DownloadError::InvalidUrl {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
        other => other.into(),
    }
}
