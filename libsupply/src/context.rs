use crate::services::{Services, ServicesError};
use crate::{BuildpackDescriptor, Supplier};
use std::path::PathBuf;

/// Context for the supply phase execution.
pub struct SupplyContext<S: Supplier + ?Sized> {
    /// The application directory being staged.
    pub build_dir: PathBuf,
    pub cache_dir: PathBuf,
    /// The directory holding the dependency directories of all buildpacks.
    pub deps_dir: PathBuf,
    /// The index of this buildpack, also the name of its dependency directory.
    pub deps_idx: String,
    pub buildpack_dir: PathBuf,
    pub buildpack_descriptor: BuildpackDescriptor<S::Metadata>,
    /// The raw `VCAP_SERVICES` document, empty if the variable was not set.
    pub vcap_services: String,
}

impl<S: Supplier + ?Sized> SupplyContext<S> {
    /// The dependency directory of this buildpack during staging.
    ///
    /// # Examples
    /// ```
    /// use libsupply::generic::GenericMetadata;
    /// use libsupply::{Buildpack, BuildpackDescriptor, Supplier, SupplyContext};
    /// use std::path::PathBuf;
    ///
    /// struct MySupplier;
    ///
    /// impl Supplier for MySupplier {
    ///     type Metadata = GenericMetadata;
    ///     type Error = std::io::Error;
    ///
    ///     # fn supply(&self, context: SupplyContext<Self>) -> libsupply::Result<(), Self::Error> {
    ///     #     unimplemented!()
    ///     # }
    /// }
    ///
    /// let context = SupplyContext::<MySupplier> {
    ///     build_dir: PathBuf::from("/tmp/app"),
    ///     cache_dir: PathBuf::from("/tmp/cache"),
    ///     deps_dir: PathBuf::from("/tmp/deps"),
    ///     deps_idx: String::from("2"),
    ///     buildpack_dir: PathBuf::from("/tmp/buildpacks/ca-ncore"),
    ///     buildpack_descriptor: BuildpackDescriptor {
    ///         buildpack: Buildpack {
    ///             id: String::from("ca-ncore"),
    ///             name: None,
    ///             version: String::from("0.1.0"),
    ///             homepage: None,
    ///             description: None,
    ///         },
    ///         metadata: None,
    ///     },
    ///     vcap_services: String::new(),
    /// };
    ///
    /// assert_eq!(context.dep_dir(), PathBuf::from("/tmp/deps/2"));
    /// assert_eq!(context.profile_d_dir(), PathBuf::from("/tmp/deps/2/profile.d"));
    /// assert_eq!(context.runtime_dep_dir(), "$DEPS_DIR/2");
    /// ```
    pub fn dep_dir(&self) -> PathBuf {
        self.deps_dir.join(&self.deps_idx)
    }

    /// The directory for scripts sourced before the application starts.
    pub fn profile_d_dir(&self) -> PathBuf {
        self.dep_dir().join("profile.d")
    }

    /// Shell expression for the dependency directory inside the running application container.
    ///
    /// Staging and runtime use different absolute paths, scripts written to `profile.d` have to
    /// use this instead of [`dep_dir`](Self::dep_dir).
    pub fn runtime_dep_dir(&self) -> String {
        format!("$DEPS_DIR/{}", self.deps_idx)
    }

    /// Decodes the service bindings of the application.
    pub fn services(&self) -> Result<Services, ServicesError> {
        Services::from_json(&self.vcap_services)
    }
}
