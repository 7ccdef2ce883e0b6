use crate::credentials::ConfigurationError;
use libsupply::archive::ArchiveError;
use libsupply::dependency::InstallError;
use libsupply::log::log_error;
use libsupply::profile_d::ProfileScriptError;
use libsupply::properties::PropertiesError;
use libsupply::services::ServicesError;

#[derive(Debug)]
pub(crate) enum CaNcoreBuildpackError {
    FetchError(InstallError),
    ExtractError(ArchiveError),
    DirectoryError(ProfileScriptError),
    ConfigurationError(ConfigurationError),
    PatchError(PropertiesError),
}

impl From<CaNcoreBuildpackError> for libsupply::Error<CaNcoreBuildpackError> {
    fn from(error: CaNcoreBuildpackError) -> Self {
        Self::SupplierError(error)
    }
}

pub(crate) fn on_buildpack_error(error: CaNcoreBuildpackError) {
    match error {
        CaNcoreBuildpackError::FetchError(install_error) => log_error(
            "Failed to download the CA APM agent",
            format!("{install_error}"),
        ),
        CaNcoreBuildpackError::ExtractError(archive_error) => log_error(
            "Failed to extract the CA APM agent",
            format!("{archive_error}\n\nThe downloaded agent archive may be corrupt."),
        ),
        CaNcoreBuildpackError::DirectoryError(profile_script_error) => log_error(
            "Failed to write the agent startup script",
            format!("{profile_script_error}"),
        ),
        CaNcoreBuildpackError::ConfigurationError(configuration_error) => {
            on_configuration_error(&configuration_error);
        }
        CaNcoreBuildpackError::PatchError(properties_error) => log_error(
            "Failed to configure the CA APM agent profile",
            format!("{properties_error}"),
        ),
    }
}

fn on_configuration_error(error: &ConfigurationError) {
    let body = match error {
        ConfigurationError::MalformedServices(ServicesError::Malformed(json_error)) => {
            format!("VCAP_SERVICES could not be parsed: {json_error}")
        }
        ConfigurationError::ServiceNotBound => String::from(
            "No service named 'introscope' is bound to this application.\n\
             Bind a service that provides the Enterprise Manager 'url' credential, for example:\n\
             cf cups introscope -p '{\"url\":\"https://em.example.com:8081\"}'",
        ),
        ConfigurationError::MissingUrl => String::from(
            "The bound 'introscope' service does not provide a non-empty 'url' credential.",
        ),
    };

    log_error("Could not determine management endpoint URL", body);
}
