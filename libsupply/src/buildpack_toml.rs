use serde::Deserialize;

/// Data structure for the supply buildpack descriptor (`buildpack.toml`).
///
/// # Example:
/// ```
/// use libsupply::BuildpackDescriptor;
///
/// let toml_str = r#"
/// [buildpack]
/// id = "ca-ncore"
/// name = "CA APM .NET Core Agent Buildpack"
/// version = "0.1.0"
///
/// [metadata]
/// foo = "bar"
/// "#;
///
/// let descriptor =
///     toml::from_str::<BuildpackDescriptor<Option<toml::Table>>>(toml_str).unwrap();
/// assert_eq!(descriptor.buildpack.id, "ca-ncore");
/// ```
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct BuildpackDescriptor<BM> {
    pub buildpack: Buildpack,
    pub metadata: BM,
}

#[derive(Deserialize, Debug, Clone, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Buildpack {
    pub id: String,
    pub name: Option<String>,
    pub version: String,
    pub homepage: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, Eq, PartialEq)]
    struct AgentMetadata {
        agent: String,
    }

    #[test]
    fn deserialize_with_typed_metadata() {
        let toml_str = r#"
[buildpack]
id = "ca-ncore"
version = "1.2.3"

[metadata]
agent = "apm"
"#;

        let descriptor = toml::from_str::<BuildpackDescriptor<AgentMetadata>>(toml_str).unwrap();

        assert_eq!(
            descriptor.buildpack,
            Buildpack {
                id: String::from("ca-ncore"),
                name: None,
                version: String::from("1.2.3"),
                homepage: None,
                description: None,
            }
        );
        assert_eq!(
            descriptor.metadata,
            AgentMetadata {
                agent: String::from("apm")
            }
        );
    }

    #[test]
    fn deserialize_without_metadata_when_optional() {
        let toml_str = r#"
[buildpack]
id = "ca-ncore"
version = "1.2.3"
"#;

        let descriptor =
            toml::from_str::<BuildpackDescriptor<Option<toml::Table>>>(toml_str).unwrap();

        assert!(descriptor.metadata.is_none());
    }

    #[test]
    fn reject_unknown_buildpack_keys() {
        let toml_str = r#"
[buildpack]
id = "ca-ncore"
version = "1.2.3"
stack = "cflinuxfs4"
"#;

        assert!(toml::from_str::<BuildpackDescriptor<Option<toml::Table>>>(toml_str).is_err());
    }
}
