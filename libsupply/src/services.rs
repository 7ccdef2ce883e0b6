//! Typed access to the `VCAP_SERVICES` service bindings.
//!
//! Cloud Foundry exposes the services bound to an application as a JSON document that maps a
//! service type (the broker's label, `user-provided` for user-provided services) to the list of
//! bound instances of that type.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Name of the environment variable holding the service bindings.
pub const VCAP_SERVICES: &str = "VCAP_SERVICES";

/// The service bindings of an application, grouped by service type.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(transparent)]
pub struct Services {
    // Keyed by service type. A `BTreeMap` keeps the lookup order stable between runs.
    groups: BTreeMap<String, Vec<ServiceInstance>>,
}

/// A single bound service instance.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ServiceInstance {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub credentials: BTreeMap<String, serde_json::Value>,
}

// Brokers are inconsistent about omitting a field versus sending `null` for it.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(thiserror::Error, Debug)]
pub enum ServicesError {
    #[error("Malformed service bindings document: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl Services {
    /// Decodes the given `VCAP_SERVICES` document.
    ///
    /// An empty (or whitespace only) document is treated as "no services bound".
    ///
    /// # Examples
    /// ```
    /// use libsupply::services::Services;
    ///
    /// let services = Services::from_json(
    ///     r#"{"user-provided": [{"name": "Introscope", "credentials": {"url": "https://em"}}]}"#,
    /// )
    /// .unwrap();
    ///
    /// assert!(services.find_by_name("introscope").is_some());
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ServicesError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_json::from_str(json)?)
    }

    /// Finds the first service instance whose name equals the given name, ignoring ASCII case.
    ///
    /// Service types are searched in lexicographic order, instances of a type in the order the
    /// platform listed them.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&ServiceInstance> {
        self.instances()
            .find(|instance| instance.name.eq_ignore_ascii_case(name))
    }

    /// Iterates over all bound service instances.
    pub fn instances(&self) -> impl Iterator<Item = &ServiceInstance> {
        self.groups.values().flatten()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances().next().is_none()
    }
}
