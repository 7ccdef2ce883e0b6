use crate::log::log_error;
use crate::toml_file::TomlFileError;
use std::fmt::Debug;

/// A specialized Result type for libsupply.
///
/// This type is broadly used across libsupply for any operation which may produce an error.
pub type Result<T, E> = std::result::Result<T, Error<E>>;

/// An error that occurred during buildpack execution.
#[derive(thiserror::Error, Debug)]
pub enum Error<E> {
    #[error("Could not determine buildpack directory: {0}")]
    CannotDetermineBuildpackDirectory(std::io::Error),

    #[error("Cannot read buildpack descriptor (buildpack.toml): {0}")]
    CannotReadBuildpackDescriptor(TomlFileError),

    #[error("Cannot read VCAP_SERVICES: {0}")]
    CannotReadServices(std::env::VarError),

    #[error("Supplier error: {0:?}")]
    SupplierError(E),
}

/// Handles a given [`Error`] in a consistent style.
///
/// This function is intended to be used inside [`Supplier::on_error`](crate::Supplier::on_error).
/// Framework errors are rendered with [`log_error`], supplier specific errors are handled by the
/// passed custom handler.
///
/// # Example:
/// ```
/// use libsupply::generic::GenericMetadata;
/// use libsupply::log::log_error;
/// use libsupply::{on_error, Supplier, SupplyContext};
///
/// #[derive(Debug)]
/// enum FooSupplierError {
///     InvalidFooDescriptorToml,
/// }
///
/// fn on_foo_supplier_error(e: FooSupplierError) {
///     match e {
///         FooSupplierError::InvalidFooDescriptorToml => {
///             log_error("Invalid foo.toml", "Your app's foo.toml is invalid!");
///         }
///     }
/// }
///
/// struct FooSupplier;
///
/// impl Supplier for FooSupplier {
///     type Metadata = GenericMetadata;
///     type Error = FooSupplierError;
///
///     # fn supply(&self, context: SupplyContext<Self>) -> libsupply::Result<(), Self::Error> {
///     #     unimplemented!()
///     # }
///     fn on_error(&self, error: libsupply::Error<Self::Error>) {
///         on_error(on_foo_supplier_error, error);
///     }
/// }
/// ```
pub fn on_error<F, E>(f: F, error: Error<E>)
where
    E: Debug,
    F: Fn(E),
{
    match error {
        Error::SupplierError(supplier_error) => f(supplier_error),
        framework_error => {
            log_error("Internal Buildpack Error", framework_error.to_string());
        }
    }
}
