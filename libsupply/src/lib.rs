//! This crate provides a library to implement Cloud Foundry supply buildpacks.
//!
//! A supply buildpack runs once during staging, before the final buildpack, and contributes
//! dependencies into its own dependency directory (`<deps_dir>/<deps_idx>`). Scripts placed in
//! that directory's `profile.d` are sourced when the application container starts.

// This lint triggers when both deps_dir and dep_dir are present which are quite common.
#![allow(clippy::similar_names)]

pub mod archive;
pub mod dependency;
pub mod download;
pub mod log;
pub mod profile_d;
pub mod properties;
pub mod services;

mod buildpack_toml;
mod context;
mod error;
mod exit_code;
mod runtime;
mod supplier;
mod toml_file;

pub use buildpack_toml::*;
pub use context::SupplyContext;
pub use error::*;
pub use runtime::{libsupply_runtime, libsupply_runtime_supply, parse_supply_args, SupplyArgs};
pub use supplier::Supplier;
pub use toml_file::*;

/// Generates a main function for the given supplier.
///
/// It will create the main function and wires up the supplier to the framework.
///
/// # Example:
/// ```
/// use libsupply::generic::GenericMetadata;
/// use libsupply::{supply_main, Supplier, SupplyContext};
///
/// struct MySupplier;
///
/// impl Supplier for MySupplier {
///     type Metadata = GenericMetadata;
///     type Error = std::io::Error;
///
///     fn supply(&self, context: SupplyContext<Self>) -> libsupply::Result<(), Self::Error> {
///         Ok(())
///     }
/// }
///
/// supply_main!(MySupplier);
/// ```
#[macro_export]
macro_rules! supply_main {
    ($supplier:expr) => {
        fn main() {
            ::libsupply::libsupply_runtime(&$supplier);
        }
    };
}

pub mod generic {
    //! Generic implementations for some libsupply types.

    /// Generic TOML metadata.
    pub type GenericMetadata = Option<toml::Table>;
}
