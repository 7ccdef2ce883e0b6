//! Fetching of the dependencies a supply buildpack installs.
//!
//! Dependencies are pinned in the `[[metadata.dependencies]]` tables of `buildpack.toml`, each
//! with a download URI and the SHA-256 checksum of the artifact:
//!
//! ```toml
//! [[metadata.dependencies]]
//! name = "apm"
//! version = "10.6.0"
//! uri = "https://example.com/apm-10.6.0.zip"
//! sha256 = "..."
//! ```

use crate::download::{download_file, DownloadError};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fmt::{self, Display, Formatter};
use std::fs::File;
use std::io;
use std::path::Path;

#[derive(Deserialize, Debug, Clone, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Dependency {
    pub name: String,
    pub version: String,
    pub uri: String,
    pub sha256: String,
}

/// Identifies a dependency by exact name and version.
#[derive(Deserialize, Debug, Clone, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DependencyRequest {
    pub name: String,
    pub version: String,
}

impl Display for DependencyRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum InstallError {
    #[error(
        "Dependency {0} is not listed in buildpack.toml. \
         Add a [[metadata.dependencies]] entry with its download uri and sha256 checksum."
    )]
    UnknownDependency(DependencyRequest),

    #[error("Could not download {0}: {1}")]
    Download(String, DownloadError),

    #[error("Checksum mismatch for {uri}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        uri: String,
        expected: String,
        actual: String,
    },

    #[error("I/O error while verifying download: {0}")]
    Io(#[from] std::io::Error),
}

/// Capability to fetch a dependency artifact to a local file.
pub trait Installer {
    /// Fetches the artifact of the requested dependency and stores it at `destination`.
    fn fetch_dependency(
        &self,
        request: &DependencyRequest,
        destination: &Path,
    ) -> Result<(), InstallError>;
}

/// An [`Installer`] that downloads dependencies from a fixed list and verifies their checksums.
#[derive(Debug, Clone)]
pub struct DependencyInstaller {
    dependencies: Vec<Dependency>,
}

impl DependencyInstaller {
    #[must_use]
    pub fn new(dependencies: Vec<Dependency>) -> Self {
        Self { dependencies }
    }

    /// Looks up the dependency with exactly the requested name and version.
    #[must_use]
    pub fn find(&self, request: &DependencyRequest) -> Option<&Dependency> {
        self.dependencies
            .iter()
            .find(|dependency| {
                dependency.name == request.name && dependency.version == request.version
            })
    }
}

impl Installer for DependencyInstaller {
    fn fetch_dependency(
        &self,
        request: &DependencyRequest,
        destination: &Path,
    ) -> Result<(), InstallError> {
        let dependency = self
            .find(request)
            .ok_or_else(|| InstallError::UnknownDependency(request.clone()))?;

        download_file(&dependency.uri, destination)
            .map_err(|error| InstallError::Download(dependency.uri.clone(), error))?;

        verify_checksum(destination, dependency)
    }
}

// Hex digits of the pinned checksum may be upper or lower case.
fn verify_checksum(path: &Path, dependency: &Dependency) -> Result<(), InstallError> {
    let mut hasher = Sha256::new();
    io::copy(&mut File::open(path)?, &mut hasher)?;
    let actual = format!("{:x}", hasher.finalize());

    if actual.eq_ignore_ascii_case(&dependency.sha256) {
        Ok(())
    } else {
        Err(InstallError::ChecksumMismatch {
            uri: dependency.uri.clone(),
            expected: dependency.sha256.clone(),
            actual,
        })
    }
}
