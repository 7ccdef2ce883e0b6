use crate::SupplyContext;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

/// Represents a supply buildpack written with the libsupply framework.
///
/// To implement a supply buildpack with this framework, start by implementing this trait. Besides
/// the supply method, it holds associated types for the type of its metadata and its custom error
/// type.
pub trait Supplier {
    /// The metadata type for this buildpack. This is the data within `[metadata]` of the
    /// buildpack's `buildpack.toml`. The framework will attempt to parse the data and will only
    /// continue if parsing succeeded. If you wish to use raw, untyped, TOML data instead, use
    /// [`GenericMetadata`](crate::generic::GenericMetadata).
    type Metadata: DeserializeOwned;

    /// The error type for buildpack specific errors, usually an enum. The framework itself has
    /// its [own error type](crate::Error) that contains more low-level errors that can occur
    /// during buildpack execution.
    type Error: Debug;

    /// Supply logic for this buildpack. Directly corresponds to `bin/supply` of the Cloud Foundry
    /// buildpack interface.
    fn supply(&self, context: SupplyContext<Self>) -> crate::Result<(), Self::Error>;

    /// If an unhandled error occurred within the framework or the buildpack, this method will be
    /// called by the framework to allow custom, buildpack specific, code to run before exiting.
    /// Usually, this method is implemented by logging the error in a user friendly manner.
    ///
    /// The default implementation will simply print the error
    /// (using its [`Debug`] implementation) to stderr.
    fn on_error(&self, error: crate::Error<Self::Error>) {
        eprintln!("Unhandled error:");
        eprintln!("> {error:?}");
        eprintln!("Buildpack will exit!");
    }
}
