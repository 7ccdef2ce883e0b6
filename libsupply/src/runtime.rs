use crate::error::Error;
use crate::exit_code;
use crate::services::VCAP_SERVICES;
use crate::supplier::Supplier;
use crate::toml_file::read_toml_file;
use crate::{Result, SupplyContext};
use std::env::{self, VarError};
use std::path::{Path, PathBuf};
use std::{io, process};

/// Main entry point for this framework.
///
/// Parses the arguments of the Cloud Foundry `bin/supply` contract, reads the buildpack
/// descriptor and `VCAP_SERVICES`, runs the supplier and exits the process. Errors are passed to
/// [`Supplier::on_error`] before exiting with a non-zero exit code.
pub fn libsupply_runtime<S: Supplier>(supplier: &S) {
    let args: Vec<String> = env::args().collect();

    let Some(supply_args) = parse_supply_args(&args) else {
        eprintln!("Usage: supply <build_dir> <cache_dir> <deps_dir> <deps_idx>");
        eprintln!("https://docs.cloudfoundry.org/buildpacks/understand-buildpacks.html");
        process::exit(exit_code::GENERIC_UNSPECIFIED_ERROR);
    };

    match libsupply_runtime_supply(supplier, supply_args) {
        Ok(()) => process::exit(exit_code::GENERIC_SUCCESS),
        Err(error) => {
            supplier.on_error(error);
            process::exit(exit_code::GENERIC_UNSPECIFIED_ERROR);
        }
    }
}

/// Runs the supply phase of the given supplier for already parsed arguments.
pub fn libsupply_runtime_supply<S: Supplier>(
    supplier: &S,
    args: SupplyArgs,
) -> Result<(), S::Error> {
    let buildpack_dir = read_buildpack_dir().map_err(Error::CannotDetermineBuildpackDirectory)?;

    let buildpack_descriptor = read_toml_file(buildpack_dir.join("buildpack.toml"))
        .map_err(Error::CannotReadBuildpackDescriptor)?;

    let vcap_services = match env::var(VCAP_SERVICES) {
        Ok(vcap_services) => vcap_services,
        Err(VarError::NotPresent) => String::new(),
        Err(error) => return Err(Error::CannotReadServices(error)),
    };

    supplier.supply(SupplyContext {
        build_dir: args.build_dir,
        cache_dir: args.cache_dir,
        deps_dir: args.deps_dir,
        deps_idx: args.deps_idx,
        buildpack_dir,
        buildpack_descriptor,
        vcap_services,
    })
}

#[derive(Debug, Eq, PartialEq)]
pub struct SupplyArgs {
    pub build_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub deps_dir: PathBuf,
    pub deps_idx: String,
}

/// Parses the full argument list (including the program name) of a `bin/supply` invocation.
#[must_use]
pub fn parse_supply_args(args: &[String]) -> Option<SupplyArgs> {
    if let [_, build_dir, cache_dir, deps_dir, deps_idx] = args {
        Some(SupplyArgs {
            build_dir: PathBuf::from(build_dir),
            cache_dir: PathBuf::from(cache_dir),
            deps_dir: PathBuf::from(deps_dir),
            deps_idx: deps_idx.clone(),
        })
    } else {
        None
    }
}

// Buildpacks are laid out as `<buildpack_dir>/bin/supply`. `BUILDPACK_DIR` takes precedence so
// that the binary can be run from elsewhere, for example from tests.
fn read_buildpack_dir() -> io::Result<PathBuf> {
    if let Some(buildpack_dir) = env::var_os("BUILDPACK_DIR") {
        return Ok(PathBuf::from(buildpack_dir));
    }

    env::current_exe()?
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .ok_or_else(|| io::Error::other("Executable is not located in a buildpack's bin directory"))
}
