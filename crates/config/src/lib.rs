//! Configuration loading, validation, and management for the Student Companion.
//!
//! Loads configuration from `~/.companion/config.toml` with environment
//! variable overrides. Validates all settings at startup. The resulting
//! `AppConfig` is built once and passed by reference to whatever needs it.

use companion_core::directory::{DirectoryEntry, StudentDirectory};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.companion/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote agent and knowledge base addressing
    #[serde(default)]
    pub bedrock: BedrockConfig,

    /// Fixed generation parameters sent with every agent invocation
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Knowledge base retrieval settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// HTTP gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Student roster source
    #[serde(default)]
    pub directory: DirectoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BedrockConfig {
    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub knowledge_base_id: String,

    #[serde(default)]
    pub agent_id: String,

    #[serde(default)]
    pub agent_alias_id: String,

    /// Named profile in the shared AWS config and credentials files. Its
    /// credentials sign every request.
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Override the service endpoint (VPC endpoint, local test server).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

fn default_region() -> String {
    "ap-south-1".into()
}
fn default_profile() -> String {
    "default".into()
}

impl BedrockConfig {
    /// The runtime endpoint: the override if set, otherwise the regional one.
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://bedrock-agent-runtime.{}.amazonaws.com", self.region),
        }
    }

    /// Names of the addressing fields that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.knowledge_base_id.trim().is_empty() {
            missing.push("bedrock.knowledge_base_id");
        }
        if self.agent_id.trim().is_empty() {
            missing.push("bedrock.agent_id");
        }
        if self.agent_alias_id.trim().is_empty() {
            missing.push("bedrock.agent_alias_id");
        }
        missing
    }
}

impl Default for BedrockConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            knowledge_base_id: String::new(),
            agent_id: String::new(),
            agent_alias_id: String::new(),
            profile: default_profile(),
            endpoint: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_max_tokens() -> u32 {
    300
}
fn default_temperature() -> f32 {
    0.9
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_number_of_results")]
    pub number_of_results: u32,

    /// Query used by the knowledge base connection probe.
    #[serde(default = "default_probe_query")]
    pub probe_query: String,
}

fn default_number_of_results() -> u32 {
    5
}
fn default_probe_query() -> String {
    "Module".into()
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            number_of_results: default_number_of_results(),
            probe_query: default_probe_query(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8501
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// TOML roster with `[[students]]` tables. The built-in roster is used
    /// when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub students_file: Option<PathBuf>,
}

/// On-disk roster format.
#[derive(Debug, Deserialize)]
struct RosterFile {
    #[serde(default)]
    students: Vec<DirectoryEntry>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.companion/config.toml).
    ///
    /// Environment variables override file values:
    /// - `COMPANION_REGION`, then `AWS_REGION`
    /// - `COMPANION_KNOWLEDGE_BASE_ID`, `COMPANION_AGENT_ID`, `COMPANION_AGENT_ALIAS_ID`
    /// - `AWS_PROFILE`
    /// - `COMPANION_ENDPOINT`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names
                .iter()
                .find_map(|n| lookup(n).filter(|v| !v.trim().is_empty()))
        };

        if let Some(region) = first(&["COMPANION_REGION", "AWS_REGION"]) {
            self.bedrock.region = region;
        }
        if let Some(id) = first(&["COMPANION_KNOWLEDGE_BASE_ID"]) {
            self.bedrock.knowledge_base_id = id;
        }
        if let Some(id) = first(&["COMPANION_AGENT_ID"]) {
            self.bedrock.agent_id = id;
        }
        if let Some(id) = first(&["COMPANION_AGENT_ALIAS_ID"]) {
            self.bedrock.agent_alias_id = id;
        }
        if let Some(profile) = first(&["AWS_PROFILE"]) {
            self.bedrock.profile = profile;
        }
        if let Some(endpoint) = first(&["COMPANION_ENDPOINT"]) {
            self.bedrock.endpoint = Some(endpoint);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".companion")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.generation.temperature) {
            return Err(ConfigError::ValidationError(
                "generation.temperature must be between 0.0 and 1.0".into(),
            ));
        }

        if self.generation.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "generation.max_tokens must be > 0".into(),
            ));
        }

        if !(1..=100).contains(&self.retrieval.number_of_results) {
            return Err(ConfigError::ValidationError(
                "retrieval.number_of_results must be between 1 and 100".into(),
            ));
        }

        if self.bedrock.region.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "bedrock.region must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Build the student directory: the configured roster file, or the
    /// built-in roster.
    pub fn load_directory(&self) -> Result<StudentDirectory, ConfigError> {
        let Some(path) = &self.directory.students_file else {
            return Ok(StudentDirectory::builtin());
        };

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let roster: RosterFile = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let directory =
            StudentDirectory::new(roster.students).map_err(|e| ConfigError::InvalidRoster {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        tracing::info!(
            path = %path.display(),
            students = directory.len(),
            "Loaded student roster"
        );
        Ok(directory)
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bedrock: BedrockConfig::default(),
            generation: GenerationConfig::default(),
            retrieval: RetrievalConfig::default(),
            gateway: GatewayConfig::default(),
            directory: DirectoryConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid student roster at {path}: {reason}")]
    InvalidRoster { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bedrock.region, "ap-south-1");
        assert_eq!(config.generation.max_tokens, 300);
        assert!((config.generation.temperature - 0.9).abs() < f32::EPSILON);
        assert_eq!(config.retrieval.number_of_results, 5);
        assert_eq!(config.retrieval.probe_query, "Module");
        assert_eq!(config.gateway.port, 8501);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.bedrock.region, config.bedrock.region);
        assert_eq!(parsed.gateway.port, config.gateway.port);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[bedrock]
knowledge_base_id = "KB123"
agent_id = "AG123"
agent_alias_id = "AL123"
"#,
        )
        .unwrap();
        assert_eq!(config.bedrock.region, "ap-south-1");
        assert_eq!(config.bedrock.profile, "default");
        assert!(config.bedrock.missing_fields().is_empty());
        assert_eq!(config.retrieval.number_of_results, 5);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.generation.temperature = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_results_rejected() {
        let mut config = AppConfig::default();
        config.retrieval.number_of_results = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        let config = result.unwrap();
        assert_eq!(config.bedrock.region, "ap-south-1");
    }

    #[test]
    fn load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[generation]\nmax_tokens = 0\n").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[bedrock\nregion = ").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides_apply_in_priority_order() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("COMPANION_REGION", "eu-west-1"),
            ("AWS_REGION", "us-east-1"),
            ("COMPANION_AGENT_ID", "AGENT"),
            ("COMPANION_AGENT_ALIAS_ID", "ALIAS"),
            ("COMPANION_KNOWLEDGE_BASE_ID", "KB"),
            ("AWS_PROFILE", "school"),
            ("COMPANION_ENDPOINT", "http://localhost:4566"),
        ]);

        let mut config = AppConfig::default();
        config.apply_env_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.bedrock.region, "eu-west-1");
        assert_eq!(config.bedrock.agent_id, "AGENT");
        assert_eq!(config.bedrock.agent_alias_id, "ALIAS");
        assert_eq!(config.bedrock.knowledge_base_id, "KB");
        assert_eq!(config.bedrock.profile, "school");
        assert_eq!(config.bedrock.endpoint.as_deref(), Some("http://localhost:4566"));
    }

    #[test]
    fn blank_env_values_ignored() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|name| (name == "COMPANION_REGION").then(|| "  ".to_string()));
        assert_eq!(config.bedrock.region, "ap-south-1");
    }

    #[test]
    fn endpoint_defaults_to_region() {
        let mut config = AppConfig::default();
        assert_eq!(
            config.bedrock.endpoint_url(),
            "https://bedrock-agent-runtime.ap-south-1.amazonaws.com"
        );

        config.bedrock.endpoint = Some("http://127.0.0.1:9000/".into());
        assert_eq!(config.bedrock.endpoint_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn missing_fields_lists_empty_ids() {
        let config = AppConfig::default();
        assert_eq!(
            config.bedrock.missing_fields(),
            vec![
                "bedrock.knowledge_base_id",
                "bedrock.agent_id",
                "bedrock.agent_alias_id"
            ]
        );
    }

    #[test]
    fn builtin_directory_without_roster_file() {
        let directory = AppConfig::default().load_directory().unwrap();
        assert_eq!(directory.list_keys(), vec!["emma", "michael"]);
    }

    #[test]
    fn roster_file_loads_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.toml");
        std::fs::write(
            &path,
            r#"
[[students]]
key = "zoe"
id = "STU010"
name = "Zoe"
strengths = ["Curious"]
academic_details = { class = "9th Grade", department = "Science", year = 2026 }
learning_style = { type = "Hands-on", description = "Learns by doing." }
subjects = [
    { name = "Biology", grade = 81 },
    { name = "Mathematics", grade = 47 },
]

[[students]]
key = "ali"
id = "STU011"
name = "Ali"
academic_details = { class = "9th Grade", department = "Arts", year = 2026 }
learning_style = { type = "Visual", description = "Likes diagrams." }
"#,
        )
        .unwrap();

        let config = AppConfig {
            directory: DirectoryConfig {
                students_file: Some(path),
            },
            ..AppConfig::default()
        };

        let directory = config.load_directory().unwrap();
        assert_eq!(directory.list_keys(), vec!["zoe", "ali"]);
        let zoe = directory.get("zoe").unwrap();
        assert_eq!(zoe.grade_lines(), vec!["Biology: 81/100", "Mathematics: 47/100"]);
        assert_eq!(zoe.academic_details.class_label, "9th Grade");
    }

    #[test]
    fn roster_file_with_bad_grade_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.toml");
        std::fs::write(
            &path,
            r#"
[[students]]
key = "zoe"
id = "STU010"
name = "Zoe"
academic_details = { class = "9th Grade", department = "Science", year = 2026 }
learning_style = { type = "Hands-on", description = "Learns by doing." }
subjects = [{ name = "Biology", grade = 181 }]
"#,
        )
        .unwrap();

        let config = AppConfig {
            directory: DirectoryConfig {
                students_file: Some(path),
            },
            ..AppConfig::default()
        };

        assert!(matches!(
            config.load_directory().unwrap_err(),
            ConfigError::InvalidRoster { .. }
        ));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("ap-south-1"));
        assert!(toml_str.contains("number_of_results = 5"));
        assert!(toml_str.contains("profile = \"default\""));
        assert!(!toml_str.contains("endpoint"));
    }
}
