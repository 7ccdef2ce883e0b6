use crate::log::log_warning;
use std::path::Path;
use std::time::Duration;
use std::{fs, io, thread};

#[derive(thiserror::Error, Debug)]
pub enum DownloadError {
    // Boxed to prevent `large_enum_variant` errors since `ureq::Error` is massive.
    #[error("HTTP error while downloading file: {0}")]
    HttpError(#[from] Box<ureq::Error>),

    #[error("I/O error while downloading file: {0}")]
    IoError(#[from] std::io::Error),
}

/// Retry and timeout settings for [`download_file_with_options`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DownloadOptions {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(15),
        }
    }
}

/// Downloads a file via HTTP(S) to a local path.
///
/// Failed attempts are retried up to five times in total, two seconds apart, similar to the
/// `curl --retry` invocations of shell based buildpacks. Client errors (HTTP 4xx) are not retried.
///
/// # Examples
/// ```no_run
/// use libsupply::download::download_file;
/// use tempfile::tempdir;
///
/// let temp_dir = tempdir().unwrap();
/// let temp_file = temp_dir.path().join("result.bin");
///
/// download_file("https://example.com/", &temp_file).unwrap();
/// ```
pub fn download_file(
    uri: impl AsRef<str>,
    destination: impl AsRef<Path>,
) -> Result<(), DownloadError> {
    download_file_with_options(uri, destination, &DownloadOptions::default())
}

/// Like [`download_file`], with explicit retry and timeout settings.
pub fn download_file_with_options(
    uri: impl AsRef<str>,
    destination: impl AsRef<Path>,
    options: &DownloadOptions,
) -> Result<(), DownloadError> {
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(options.connect_timeout)
        .timeout_read(options.read_timeout)
        .build();

    let mut attempt = 1;
    loop {
        match attempt_download(&agent, uri.as_ref(), destination.as_ref()) {
            Err(error) if attempt < options.max_attempts && is_retryable(&error) => {
                log_warning(
                    "Download failed",
                    format!(
                        "Attempt {attempt}/{} for {} failed: {error}\nRetrying in {:?}...",
                        options.max_attempts,
                        uri.as_ref(),
                        options.retry_delay
                    ),
                );
                thread::sleep(options.retry_delay);
                attempt += 1;
            }
            result => return result,
        }
    }
}

fn is_retryable(error: &DownloadError) -> bool {
    match error {
        DownloadError::HttpError(http_error) => {
            !matches!(**http_error, ureq::Error::Status(400..=499, _))
        }
        DownloadError::IoError(_) => true,
    }
}

fn attempt_download(
    agent: &ureq::Agent,
    uri: &str,
    destination: &Path,
) -> Result<(), DownloadError> {
    let response = agent.get(uri).call().map_err(Box::new)?;
    let mut reader = response.into_reader();
    let mut file = fs::File::create(destination)?;
    io::copy(&mut reader, &mut file)?;

    Ok(())
}
