mod agent;
mod credentials;
mod errors;

use crate::agent::{agent_profile_path, fetch_and_extract, write_startup_script, AGENT_DIRECTORY};
use crate::credentials::{project_credentials, ConfigurationError, SkipReason};
use crate::errors::{on_buildpack_error, CaNcoreBuildpackError};
use libsupply::dependency::{Dependency, DependencyInstaller, DependencyRequest, Installer};
use libsupply::log::{log_header, log_info, log_warning};
use libsupply::properties::upsert_property;
use libsupply::{supply_main, Supplier, SupplyContext};
use serde::Deserialize;

// Suppress warnings due to the `unused_crate_dependencies` lint not handling integration tests well.
#[cfg(test)]
use sha2 as _;
#[cfg(test)]
use tokio as _;
#[cfg(test)]
use wiremock as _;

pub(crate) struct CaNcoreBuildpack;

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub(crate) struct CaNcoreBuildpackMetadata {
    agent: DependencyRequest,
    #[serde(default)]
    dependencies: Vec<Dependency>,
}

impl Supplier for CaNcoreBuildpack {
    type Metadata = CaNcoreBuildpackMetadata;
    type Error = CaNcoreBuildpackError;

    fn supply(&self, context: SupplyContext<Self>) -> libsupply::Result<(), Self::Error> {
        let installer =
            DependencyInstaller::new(context.buildpack_descriptor.metadata.dependencies.clone());

        run(&context, &installer)?;

        Ok(())
    }

    fn on_error(&self, error: libsupply::Error<Self::Error>) {
        libsupply::on_error(on_buildpack_error, error);
    }
}

fn run(
    context: &SupplyContext<CaNcoreBuildpack>,
    installer: &impl Installer,
) -> Result<(), CaNcoreBuildpackError> {
    log_header("Supplying ca-ncore");

    let agent_request = &context.buildpack_descriptor.metadata.agent;
    let agent_dir = context.dep_dir().join(AGENT_DIRECTORY);

    log_info(format!("Installing CA APM agent {agent_request}"));
    fetch_and_extract(installer, agent_request, &agent_dir)?;

    write_startup_script(
        &context.profile_d_dir(),
        &format!("{}/{AGENT_DIRECTORY}", context.runtime_dep_dir()),
    )?;

    let services = context
        .services()
        .map_err(ConfigurationError::MalformedServices)
        .map_err(CaNcoreBuildpackError::ConfigurationError)?;
    let projection =
        project_credentials(&services).map_err(CaNcoreBuildpackError::ConfigurationError)?;

    for (key, reason) in &projection.skipped {
        let detail = match reason {
            SkipReason::NotScalar => "is not a string, number or boolean",
            SkipReason::ReservedKey => "would override the value of the 'url' credential",
        };
        log_warning(
            "Ignoring credential",
            format!(
                "The introscope credential '{key}' {detail} and is not added to the agent profile."
            ),
        );
    }

    let profile_path = agent_profile_path(&agent_dir);
    for property in &projection.properties {
        log_info(format!("Setting profile property {}", property.key));
        upsert_property(&profile_path, &property.key, &property.value)
            .map_err(CaNcoreBuildpackError::PatchError)?;
    }

    Ok(())
}

supply_main!(CaNcoreBuildpack);
