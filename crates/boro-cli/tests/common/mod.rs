use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const XML_PATH: &str = "/xml/current/";

/// A configuration file in its own temporary directory.
pub struct TestConfig {
    _dir: TempDir,
    path: PathBuf,
}

impl TestConfig {
    /// Write a config pointing at `server`, with `email` appended verbatim.
    pub fn new(server: &MockServer, email: &str) -> Self {
        let yaml = format!(
            "qrz:\n  endpoint: {}{XML_PATH}\n  username: N0CALL\n  password: secret123\n  agent: boro/test\n{email}",
            server.uri()
        );
        Self::from_yaml(&yaml)
    }

    pub fn from_yaml(yaml: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("boro.yaml");
        std::fs::write(&path, yaml).expect("Failed to write config");
        Self { _dir: dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub const EMAIL: &str = "email:\n  userid: me@example.com\n  subjecttemplate: \"QSL Bureau cards for {{.callsign}}\"\n  bodytemplate: \"Hello {{ fname }}, 73\"\n";

/// Run the CLI binary off the async runtime so the mock server keeps serving.
pub async fn run_cli(config: &Path, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_boro"));
    cmd.arg("--config").arg(config).args(args);
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");

    tokio::task::spawn_blocking(move || cmd.output().expect("Failed to execute CLI"))
        .await
        .expect("CLI task panicked")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

pub fn xml(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<?xml version=\"1.0\" ?><QRZDatabase version=\"1.34\">{body}</QRZDatabase>"),
        "text/xml",
    )
}

pub async fn mount_login(server: &MockServer, key: &str) {
    Mock::given(method("GET"))
        .and(path(XML_PATH))
        .and(query_param("username", "N0CALL"))
        .and(query_param("password", "secret123"))
        .respond_with(xml(&format!("<Session><Key>{key}</Key></Session>")))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_record(server: &MockServer, asked: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(XML_PATH))
        .and(query_param("callsign", asked))
        .respond_with(xml(body))
        .expect(1)
        .mount(server)
        .await;
}
