use crate::errors::CaNcoreBuildpackError;
use libsupply::archive;
use libsupply::dependency::{DependencyRequest, InstallError, Installer};
use libsupply::profile_d::write_profile_script;
use std::path::{Path, PathBuf};

/// Directory within the dependency directory the agent is extracted to.
pub(crate) const AGENT_DIRECTORY: &str = "apm";
pub(crate) const PROFILE_SCRIPT_NAME: &str = "apm.sh";

const CORECLR_PROFILER_ID: &str = "{5F048FC6-251C-4684-8CCA-76047B02AC98}";

/// Downloads the requested agent archive and extracts it into `destination`.
///
/// The archive is stored in a temporary directory that is removed again on both success and
/// failure.
pub(crate) fn fetch_and_extract(
    installer: &impl Installer,
    request: &DependencyRequest,
    destination: &Path,
) -> Result<(), CaNcoreBuildpackError> {
    let download_dir = tempfile::tempdir()
        .map_err(|error| CaNcoreBuildpackError::FetchError(InstallError::Io(error)))?;
    let archive_path = download_dir.path().join(format!("{}.archive", request.name));

    installer
        .fetch_dependency(request, &archive_path)
        .map_err(CaNcoreBuildpackError::FetchError)?;

    archive::extract(&archive_path, destination).map_err(CaNcoreBuildpackError::ExtractError)?;

    Ok(())
}

/// Writes the `profile.d` script activating the .NET Core profiler of the agent at startup.
///
/// `runtime_agent_dir` is the location of the extracted agent inside the running container.
pub(crate) fn write_startup_script(
    profile_d_dir: &Path,
    runtime_agent_dir: &str,
) -> Result<PathBuf, CaNcoreBuildpackError> {
    write_profile_script(
        profile_d_dir,
        PROFILE_SCRIPT_NAME,
        startup_script(runtime_agent_dir),
    )
    .map_err(CaNcoreBuildpackError::DirectoryError)
}

pub(crate) fn startup_script(runtime_agent_dir: &str) -> String {
    format!(
        "export CORECLR_ENABLE_PROFILING=1\n\
         export CORECLR_PROFILER={CORECLR_PROFILER_ID}\n\
         export CORECLR_PROFILER_PATH={runtime_agent_dir}/wily/bin/wily.NativeProfiler.so\n\
         export APMENV_AGENT_PROFILE={runtime_agent_dir}/wily/IntroscopeAgent.profile\n"
    )
}

/// Location of the agent profile within an extracted agent.
pub(crate) fn agent_profile_path(agent_dir: &Path) -> PathBuf {
    agent_dir.join("wily").join("IntroscopeAgent.profile")
}
