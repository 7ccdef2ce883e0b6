//! In-place editing of flat, line oriented `key=value` files such as agent profiles.
//!
//! Only the lines of the edited key are ever touched. Everything else in the file, including
//! comments, blank lines, line endings and non UTF-8 content, is kept byte for byte. This allows
//! patching vendor defined files without knowing their full schema.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The change [`upsert_property`] made to a file.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Upsert {
    /// The key was already present and its value has been replaced in place.
    Replaced,
    /// The key was absent and a new line has been appended.
    Appended,
}

#[derive(thiserror::Error, Debug)]
pub enum PropertiesError {
    #[error("Properties file {0} does not exist")]
    FileNotFound(PathBuf),

    #[error("Permission denied while accessing properties file {0}")]
    PermissionDenied(PathBuf),

    #[error("I/O error while patching properties file {0}: {1}")]
    Io(PathBuf, io::Error),

    #[error("Invalid property key {0:?}")]
    InvalidKey(String),

    #[error("Invalid value for property {0}: values must be a single line")]
    InvalidValue(String),
}

/// Sets `key` to `value` in the properties file at `path`.
///
/// If lines starting with `key=` exist, the first one gets its value replaced while keeping its
/// position and any further lines for the same key are removed. Otherwise `key=value` is appended
/// to the end of the file. Afterwards, the file contains exactly one line for `key`.
///
/// The key is matched literally and must be followed immediately by `=`: patching `url` never
/// touches a `urlSuffix=` line.
///
/// The file must already exist, it is never created by this function.
///
/// # Examples
/// ```
/// use libsupply::properties::{upsert_property, Upsert};
/// use std::fs;
///
/// let temp_dir = tempfile::tempdir().unwrap();
/// let path = temp_dir.path().join("agent.profile");
/// fs::write(&path, "agentName=default\nlogLevel=INFO\n").unwrap();
///
/// assert_eq!(upsert_property(&path, "agentName", "myapp").unwrap(), Upsert::Replaced);
/// assert_eq!(upsert_property(&path, "port", "8081").unwrap(), Upsert::Appended);
/// assert_eq!(
///     fs::read_to_string(&path).unwrap(),
///     "agentName=myapp\nlogLevel=INFO\nport=8081\n"
/// );
/// ```
pub fn upsert_property(
    path: impl AsRef<Path>,
    key: &str,
    value: &str,
) -> Result<Upsert, PropertiesError> {
    let path = path.as_ref();

    if key.is_empty() || key.contains(['=', '\n', '\r']) {
        return Err(PropertiesError::InvalidKey(key.to_string()));
    }

    if value.contains(['\n', '\r']) {
        return Err(PropertiesError::InvalidValue(key.to_string()));
    }

    let contents = fs::read(path).map_err(|error| map_io_error(path, error))?;

    if count_property_lines(&contents, key) > 0 {
        let patched = replace_property(&contents, key, value);
        rewrite_file(path, &patched).map_err(|error| map_io_error(path, error))?;
        Ok(Upsert::Replaced)
    } else {
        append_property(path, &contents, key, value).map_err(|error| map_io_error(path, error))?;
        Ok(Upsert::Appended)
    }
}

/// Counts the lines of `contents` that start with `key=`.
#[must_use]
pub fn count_property_lines(contents: &[u8], key: &str) -> usize {
    let prefix = property_prefix(key);

    contents
        .split(|byte| *byte == b'\n')
        .filter(|line| line.starts_with(&prefix))
        .count()
}

fn replace_property(contents: &[u8], key: &str, value: &str) -> Vec<u8> {
    let prefix = property_prefix(key);
    let mut replaced = false;
    let mut output = Vec::with_capacity(contents.len() + value.len());

    for line in contents.split_inclusive(|byte| *byte == b'\n') {
        if !line.starts_with(&prefix) {
            output.extend_from_slice(line);
        } else if !replaced {
            replaced = true;
            output.extend_from_slice(&prefix);
            output.extend_from_slice(value.as_bytes());
            output.extend_from_slice(line_ending(line));
        }
    }

    output
}

// The scratch file lives next to the target so that persisting it is a rename on the same file
// system. It is deleted on drop if anything fails before that.
fn rewrite_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let permissions = fs::metadata(path)?.permissions();
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut scratch_file = NamedTempFile::new_in(directory)?;
    scratch_file.write_all(contents)?;
    scratch_file.as_file().sync_all()?;
    fs::set_permissions(scratch_file.path(), permissions)?;
    scratch_file.persist(path).map_err(|error| error.error)?;

    Ok(())
}

fn append_property(path: &Path, contents: &[u8], key: &str, value: &str) -> io::Result<()> {
    let mut line = Vec::new();
    if !contents.is_empty() && !contents.ends_with(b"\n") {
        line.push(b'\n');
    }
    line.extend_from_slice(format!("{key}={value}\n").as_bytes());

    OpenOptions::new()
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(&line))
}

fn property_prefix(key: &str) -> Vec<u8> {
    format!("{key}=").into_bytes()
}

fn line_ending(line: &[u8]) -> &'static [u8] {
    if line.ends_with(b"\r\n") {
        &b"\r\n"[..]
    } else if line.ends_with(b"\n") {
        &b"\n"[..]
    } else {
        &[]
    }
}

fn map_io_error(path: &Path, error: io::Error) -> PropertiesError {
    match error.kind() {
        io::ErrorKind::NotFound => PropertiesError::FileNotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => PropertiesError::PermissionDenied(path.to_path_buf()),
        _ => PropertiesError::Io(path.to_path_buf(), error),
    }
}
