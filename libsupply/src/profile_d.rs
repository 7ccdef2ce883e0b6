//! Scripts sourced by the Cloud Foundry launcher before the application starts.

use std::fs;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ProfileScriptError {
    #[error("Cannot create profile.d directory {0}: {1}")]
    CannotCreateDirectory(PathBuf, std::io::Error),

    #[error("Cannot write profile.d script {0}: {1}")]
    CannotWriteScript(PathBuf, std::io::Error),
}

/// Writes a `profile.d` script, creating the directory if it doesn't exist yet.
///
/// An existing script with the same name is fully replaced. Returns the path of the written
/// script.
///
/// # Examples
/// ```
/// use libsupply::profile_d::write_profile_script;
///
/// let temp_dir = tempfile::tempdir().unwrap();
/// let profile_d_dir = temp_dir.path().join("profile.d");
///
/// let script = write_profile_script(&profile_d_dir, "foo.sh", "export FOO=bar\n").unwrap();
/// assert_eq!(script, profile_d_dir.join("foo.sh"));
/// ```
pub fn write_profile_script(
    profile_d_dir: impl AsRef<Path>,
    file_name: impl AsRef<Path>,
    content: impl AsRef<[u8]>,
) -> Result<PathBuf, ProfileScriptError> {
    let profile_d_dir = profile_d_dir.as_ref();

    fs::create_dir_all(profile_d_dir).map_err(|error| {
        ProfileScriptError::CannotCreateDirectory(profile_d_dir.to_path_buf(), error)
    })?;

    let script_path = profile_d_dir.join(file_name);
    fs::write(&script_path, content)
        .map_err(|error| ProfileScriptError::CannotWriteScript(script_path.clone(), error))?;

    Ok(script_path)
}
