//! YAML configuration file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::Deserialize;

use boro_core::{Credentials, EndpointUrl};

const CONFIG_FILE: &str = "boro.yaml";

/// Application configuration.
///
/// Sections this program does not use are ignored when parsing.
#[derive(Debug, Deserialize)]
pub struct Configuration {
    pub qrz: QrzConfig,

    #[serde(default)]
    pub email: Option<EmailConfig>,
}

impl Configuration {
    /// Parse from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Returns the email section, validated.
    pub fn email(&self) -> Result<&EmailConfig> {
        let email = self
            .email
            .as_ref()
            .context("required configuration missing Email")?;
        email.validate()?;
        Ok(email)
    }
}

/// QRZ XML interface settings.
#[derive(Deserialize)]
pub struct QrzConfig {
    /// Versioned XML endpoint URL
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Product name and version sent to the service
    #[serde(default)]
    pub agent: String,
}

impl QrzConfig {
    /// Check that every field is present.
    pub fn validate(&self) -> Result<()> {
        require(&self.endpoint, "QRZ Endpoint")?;
        require(&self.username, "QRZ Username")?;
        require(&self.password, "QRZ Password")?;
        require(&self.agent, "QRZ Agent")?;
        Ok(())
    }

    /// Build login credentials from the validated settings.
    pub fn credentials(&self) -> Result<Credentials> {
        self.validate()?;

        let endpoint = EndpointUrl::new(&self.endpoint).context("Invalid QRZ Endpoint")?;
        Ok(Credentials::new(
            endpoint,
            self.username.trim(),
            &self.password,
            self.agent.trim(),
        ))
    }
}

impl fmt::Debug for QrzConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QrzConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("agent", &self.agent)
            .finish()
    }
}

/// Message drafting settings.
#[derive(Debug, Deserialize)]
pub struct EmailConfig {
    /// Sender address shown on drafts
    #[serde(rename = "userid", default)]
    pub user_id: Option<String>,

    #[serde(rename = "subjecttemplate", default)]
    pub subject_template: String,

    #[serde(rename = "bodytemplate", default)]
    pub body_template: String,
}

impl EmailConfig {
    /// Check that both templates are present.
    pub fn validate(&self) -> Result<()> {
        require(&self.subject_template, "Email SubjectTemplate")?;
        require(&self.body_template, "Email BodyTemplate")?;
        Ok(())
    }
}

fn require(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("required configuration missing {name}");
    }
    Ok(())
}

/// Default configuration file path.
fn default_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "boro").context("Could not determine config directory")?;
    Ok(dirs.config_dir().join(CONFIG_FILE))
}

/// Load the configuration from `path`, or from the default location.
pub fn load(path: Option<&Path>) -> Result<Configuration> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_path()?,
    };

    tracing::debug!(path = %path.display(), "Loading configuration");

    let yaml = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
    let config = Configuration::from_yaml(&yaml)
        .with_context(|| format!("Failed to parse configuration file {}", path.display()))?;

    config.qrz.validate()?;
    Ok(config)
}
