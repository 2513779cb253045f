use std::{
    fs::{self, File},
    io::{Read as _, Write as _},
    path::{Path, PathBuf},
};

use avalon_utils::fs::safe_remove;
use tracing::{debug, warn};
use ureq::{
    http::{
        header::{CONTENT_LENGTH, CONTENT_RANGE},
        Response,
    },
    Body,
};

use crate::{
    error::{DownloadError, Result},
    http::Http,
    types::Progress,
};

/// Streams one URL into one file.
///
/// On any failure the output file is removed, so a path that exists after
/// [`Download::execute`] returned `Ok` always holds the complete body.
pub struct Download {
    pub url: String,
    pub output: PathBuf,
    pub on_progress: Option<Box<dyn Fn(Progress) + Send + Sync>>,
}

impl Download {
    pub fn new(url: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            output: output.into(),
            on_progress: None,
        }
    }

    /// Registers a callback invoked with `Starting`, then one `Chunk` per read, then `Complete`.
    ///
    /// ```no_run
    /// use avalon_dl::{download::Download, types::Progress};
    ///
    /// let _dl = Download::new("https://example.com/tool", "/tmp/tool")
    ///     .progress(|event: Progress| {
    ///         let (completed, total) = event.sample();
    ///         eprintln!("{completed}/{total}");
    ///     });
    /// ```
    pub fn progress<F>(mut self, on_progress: F) -> Self
    where
        F: Fn(Progress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Box::new(on_progress));
        self
    }

    /// Downloads the body and returns the number of bytes written.
    pub fn execute(self) -> Result<u64> {
        let result = Http::fetch(&self.url).and_then(|resp| self.download_to_file(resp));

        if let Err(ref err) = result {
            debug!(url = %self.url, error = %err, "download failed");
            if let Err(cleanup) = safe_remove(&self.output) {
                warn!(
                    "Failed to remove partial download {}: {}",
                    self.output.display(),
                    cleanup
                );
            }
        }

        result
    }

    fn download_to_file(&self, resp: Response<Body>) -> Result<u64> {
        let total = Self::parse_content_length(&resp);
        self.emit(Progress::Starting {
            total,
        });

        if let Some(parent) = self.output.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(&self.output)?;

        let mut reader = resp.into_body().into_reader();
        let mut buffer = [0u8; 8192];
        let mut downloaded = 0u64;

        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }

            file.write_all(&buffer[..n])?;
            downloaded += n as u64;

            self.emit(Progress::Chunk {
                current: downloaded,
                total,
            });
        }

        file.sync_all()?;

        if let Some(expected) = total {
            if downloaded < expected {
                return Err(DownloadError::Incomplete {
                    expected,
                    received: downloaded,
                });
            }
        }

        self.emit(Progress::Complete {
            current: downloaded,
            total,
        });

        Ok(downloaded)
    }

    fn emit(&self, progress: Progress) {
        if let Some(ref cb) = self.on_progress {
            cb(progress);
        }
    }

    /// Total body size from `Content-Range` (the part after the final `/`) or `Content-Length`.
    fn parse_content_length(resp: &Response<Body>) -> Option<u64> {
        resp.headers()
            .get(CONTENT_RANGE)
            .and_then(|h| h.to_str().ok())
            .and_then(|range| range.rsplit_once('/').and_then(|(_, tot)| tot.parse().ok()))
            .or_else(|| {
                resp.headers()
                    .get(CONTENT_LENGTH)
                    .and_then(|h| h.to_str().ok())
                    .and_then(|len| len.parse::<u64>().ok())
            })
    }
}

/// Convenience wrapper for callers that only need the destination and samples.
pub fn fetch<F>(url: &str, destination: &Path, on_sample: F) -> Result<u64>
where
    F: Fn(u64, u64) + Send + Sync + 'static,
{
    Download::new(url, destination)
        .progress(move |event| {
            let (completed, total) = event.sample();
            on_sample(completed, total);
        })
        .execute()
}
