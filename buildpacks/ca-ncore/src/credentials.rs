use libsupply::services::{ServiceInstance, Services, ServicesError};
use serde_json::Value;

/// Name of the service binding holding the Enterprise Manager credentials, matched ignoring case.
pub(crate) const SERVICE_NAME: &str = "introscope";

pub(crate) const URL_CREDENTIAL: &str = "url";
pub(crate) const AGENT_MANAGER_URL_PROPERTY: &str = "agentManager.url.1";

#[derive(Debug)]
pub(crate) enum ConfigurationError {
    MalformedServices(ServicesError),
    ServiceNotBound,
    MissingUrl,
}

/// A `key=value` line to be set in the agent profile.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct ProfileProperty {
    pub(crate) key: String,
    pub(crate) value: String,
}

/// Why a credential was left out of the agent profile.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum SkipReason {
    /// Arrays, objects and `null` have no `key=value` representation.
    NotScalar,
    /// The key is written from the `url` credential and must not be overridden.
    ReservedKey,
}

#[derive(Debug, Default, Eq, PartialEq)]
pub(crate) struct CredentialProjection {
    /// The agent manager URL comes first, the other credentials follow in key order.
    pub(crate) properties: Vec<ProfileProperty>,
    pub(crate) skipped: Vec<(String, SkipReason)>,
}

/// Maps the credentials of the `introscope` service binding to agent profile properties.
///
/// The `url` credential is required and becomes `agentManager.url.1`. Every other scalar
/// credential is passed through under its own key, except for `agentManager.url.1` itself.
pub(crate) fn project_credentials(
    services: &Services,
) -> Result<CredentialProjection, ConfigurationError> {
    let service = services
        .find_by_name(SERVICE_NAME)
        .ok_or(ConfigurationError::ServiceNotBound)?;

    let url = agent_manager_url(service).ok_or(ConfigurationError::MissingUrl)?;

    let mut projection = CredentialProjection {
        properties: vec![ProfileProperty {
            key: String::from(AGENT_MANAGER_URL_PROPERTY),
            value: url.to_string(),
        }],
        skipped: Vec::new(),
    };

    for (key, value) in &service.credentials {
        if key == URL_CREDENTIAL {
            continue;
        }

        if key == AGENT_MANAGER_URL_PROPERTY {
            projection
                .skipped
                .push((key.clone(), SkipReason::ReservedKey));
            continue;
        }

        match scalar_value(value) {
            Some(value) => projection.properties.push(ProfileProperty {
                key: key.clone(),
                value,
            }),
            None => projection
                .skipped
                .push((key.clone(), SkipReason::NotScalar)),
        }
    }

    Ok(projection)
}

fn agent_manager_url(service: &ServiceInstance) -> Option<&str> {
    match service.credentials.get(URL_CREDENTIAL) {
        Some(Value::String(url)) if !url.trim().is_empty() => Some(url),
        _ => None,
    }
}

fn scalar_value(value: &Value) -> Option<String> {
    match value {
        Value::String(string) => Some(string.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(boolean) => Some(boolean.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
