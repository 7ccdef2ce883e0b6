//! Runs the `supply` binary the way the Cloud Foundry stager invokes it, against temporary
//! staging directories and a mock HTTP server serving the agent archive.

// Required due to: https://github.com/rust-lang/rust/issues/95513
#![allow(unused_crate_dependencies)]

use flate2::write::GzEncoder;
use flate2::Compression;
use indoc::{formatdoc, indoc};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::LazyLock;
use tempfile::TempDir;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static ASYNC_RUNTIME: LazyLock<Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Should be able to construct the async runtime")
});

const AGENT_PATH: &str = "/apm-10.6.0.tgz";

const AGENT_PROFILE: &str = indoc! {"
    introscope.agent.agentName=DotNet Agent
    agentManager.url.1=localhost:5001
"};

const VCAP_SERVICES: &str = indoc! {r#"
    {
      "user-provided": [
        {
          "name": "Introscope",
          "credentials": {
            "url": "https://em.example.com:8444",
            "agentName": "myapp"
          }
        }
      ]
    }
"#};

struct Staging {
    _temp_dir: TempDir,
    buildpack_dir: PathBuf,
    build_dir: PathBuf,
    cache_dir: PathBuf,
    deps_dir: PathBuf,
}

impl Staging {
    fn new(agent_uri: &str, agent_sha256: &str) -> Self {
        Self::with_dependencies(&formatdoc! {r#"
            [[metadata.dependencies]]
            name = "apm"
            version = "10.6.0"
            uri = "{agent_uri}"
            sha256 = "{agent_sha256}"
        "#})
    }

    fn with_dependencies(dependencies: &str) -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let buildpack_dir = temp_dir.path().join("buildpack");
        let build_dir = temp_dir.path().join("app");
        let cache_dir = temp_dir.path().join("cache");
        let deps_dir = temp_dir.path().join("deps");

        for dir in [&buildpack_dir, &build_dir, &cache_dir, &deps_dir.join("0")] {
            fs::create_dir_all(dir).unwrap();
        }

        fs::write(
            buildpack_dir.join("buildpack.toml"),
            formatdoc! {r#"
                [buildpack]
                id = "ca-ncore"
                version = "0.0.0"

                [metadata.agent]
                name = "apm"
                version = "10.6.0"

                {dependencies}
            "#},
        )
        .unwrap();

        Self {
            _temp_dir: temp_dir,
            buildpack_dir,
            build_dir,
            cache_dir,
            deps_dir,
        }
    }

    fn supply(&self, vcap_services: &str) -> Output {
        Command::new(env!("CARGO_BIN_EXE_supply"))
            .arg(&self.build_dir)
            .arg(&self.cache_dir)
            .arg(&self.deps_dir)
            .arg("0")
            .env("BUILDPACK_DIR", &self.buildpack_dir)
            .env("VCAP_SERVICES", vcap_services)
            .output()
            .unwrap()
    }

    fn dep_dir(&self) -> PathBuf {
        self.deps_dir.join("0")
    }

    fn agent_profile(&self) -> PathBuf {
        self.dep_dir()
            .join("apm")
            .join("wily")
            .join("IntroscopeAgent.profile")
    }
}

fn agent_tarball() -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    for (path, contents) in [
        ("wily/IntroscopeAgent.profile", AGENT_PROFILE),
        ("wily/bin/wily.NativeProfiler.so", "ELF"),
    ] {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, path, contents.as_bytes())
            .unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

fn sha256(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

struct AgentServer {
    server: MockServer,
}

impl AgentServer {
    // Serves `response` for the agent archive and expects exactly `requests` downloads.
    fn start(response: ResponseTemplate, requests: u64) -> Self {
        let server = ASYNC_RUNTIME.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path(AGENT_PATH))
                .respond_with(response)
                .expect(requests)
                .mount(&server)
                .await;
            server
        });

        Self { server }
    }

    fn serving(body: Vec<u8>) -> Self {
        Self::start(ResponseTemplate::new(200).set_body_bytes(body), 1)
    }

    fn agent_uri(&self) -> String {
        format!("{}{AGENT_PATH}", self.server.uri())
    }
}

fn assert_file_contents(path: &Path, expected: &str) {
    assert_eq!(fs::read_to_string(path).unwrap(), expected, "{path:?}");
}

#[test]
fn supply_installs_and_configures_the_agent() {
    let tarball = agent_tarball();
    let server = AgentServer::serving(tarball.clone());
    let staging = Staging::new(&server.agent_uri(), &sha256(&tarball));

    let output = staging.supply(VCAP_SERVICES);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "{output:?}");
    assert!(stdout.contains("Supplying ca-ncore"), "{stdout}");
    assert!(
        stdout.contains("Setting profile property agentManager.url.1"),
        "{stdout}"
    );
    assert!(stdout.contains("Setting profile property agentName"), "{stdout}");

    assert_file_contents(
        &staging.agent_profile(),
        indoc! {"
            introscope.agent.agentName=DotNet Agent
            agentManager.url.1=https://em.example.com:8444
            agentName=myapp
        "},
    );
    assert_file_contents(
        &staging.dep_dir().join("profile.d").join("apm.sh"),
        indoc! {"
            export CORECLR_ENABLE_PROFILING=1
            export CORECLR_PROFILER={5F048FC6-251C-4684-8CCA-76047B02AC98}
            export CORECLR_PROFILER_PATH=$DEPS_DIR/0/apm/wily/bin/wily.NativeProfiler.so
            export APMENV_AGENT_PROFILE=$DEPS_DIR/0/apm/wily/IntroscopeAgent.profile
        "},
    );
}

#[test]
fn supply_without_introscope_binding_fails_staging() {
    let tarball = agent_tarball();
    let server = AgentServer::serving(tarball.clone());
    let staging = Staging::new(&server.agent_uri(), &sha256(&tarball));

    let output = staging.supply(r#"{"user-provided": [{"name": "db", "credentials": {}}]}"#);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "{output:?}");
    assert!(
        stderr.contains("Could not determine management endpoint URL"),
        "{stderr}"
    );
    assert_file_contents(&staging.agent_profile(), AGENT_PROFILE);
}

#[test]
fn supply_with_checksum_mismatch_fails_staging() {
    let server = AgentServer::serving(agent_tarball());
    let staging = Staging::new(&server.agent_uri(), &sha256(b"something else"));

    let output = staging.supply(VCAP_SERVICES);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "{output:?}");
    assert!(stderr.contains("Failed to download the CA APM agent"), "{stderr}");
    assert!(stderr.contains("Checksum mismatch"), "{stderr}");
    assert!(!staging.dep_dir().join("profile.d").exists());
}

#[test]
fn supply_does_not_retry_missing_agent_archive() {
    let server = AgentServer::start(ResponseTemplate::new(404), 1);
    let staging = Staging::new(&server.agent_uri(), &sha256(&agent_tarball()));

    let output = staging.supply(VCAP_SERVICES);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "{output:?}");
    assert!(stderr.contains("Failed to download the CA APM agent"), "{stderr}");
    assert!(stderr.contains("404"), "{stderr}");
    assert!(!stderr.contains("Retrying"), "{stderr}");
}

#[test]
fn supply_without_pinned_agent_names_the_missing_entry() {
    let staging = Staging::with_dependencies("");

    let output = staging.supply(VCAP_SERVICES);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "{output:?}");
    assert!(
        stderr.contains("Dependency apm 10.6.0 is not listed in buildpack.toml"),
        "{stderr}"
    );
    assert!(stderr.contains("[[metadata.dependencies]]"), "{stderr}");
}

#[test]
fn supply_with_missing_arguments_prints_usage() {
    let output = Command::new(env!("CARGO_BIN_EXE_supply"))
        .arg("/tmp/app")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage: supply"));
}
