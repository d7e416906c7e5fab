use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::model::snapshot::DEFAULT_SNAPSHOT_TYPE;
use crate::normalize::{FieldIds, DEFAULT_SPRINT_FIELD, DEFAULT_STORY_POINTS_FIELD};
use crate::providers::jira::{SearchQuery, DEFAULT_MAX_RESULTS};

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub jira: Option<JiraConfig>,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct JiraConfig {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub api_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Overrides the generated query entirely.
    pub jql: Option<String>,
    /// Restrict the fetch to one project key instead of the last year of everything.
    pub project: Option<String>,
    pub max_results: u32,
    pub snapshot_type: String,
    pub sprint_field: String,
    pub story_points_field: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            jql: None,
            project: None,
            max_results: DEFAULT_MAX_RESULTS,
            snapshot_type: DEFAULT_SNAPSHOT_TYPE.into(),
            sprint_field: DEFAULT_SPRINT_FIELD.into(),
            story_points_field: DEFAULT_STORY_POINTS_FIELD.into(),
        }
    }
}

impl FetchConfig {
    pub fn field_ids(&self) -> FieldIds {
        FieldIds {
            sprint: self.sprint_field.clone(),
            story_points: self.story_points_field.clone(),
        }
    }

    pub fn search_query(&self) -> SearchQuery {
        SearchQuery::new(
            self.jql.as_deref(),
            self.project.as_deref(),
            self.max_results,
            &self.field_ids(),
        )
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct StoreConfig {
    pub dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn snapshot_dir(&self) -> PathBuf {
        self.store
            .dir
            .clone()
            .unwrap_or_else(|| data_dir().join("snapshots"))
    }

    /// Jira credentials, or an error naming what is missing.
    pub fn jira_credentials(&self) -> Result<&JiraConfig> {
        let Some(jira) = &self.jira else {
            bail!(
                "Jira is not configured. Set JIRA_DOMAIN, JIRA_EMAIL and JIRA_API_TOKEN or add a [jira] table to {}",
                config_path().display()
            );
        };
        let missing: Vec<&str> = [
            ("domain", &jira.domain),
            ("email", &jira.email),
            ("api_token", &jira.api_token),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            bail!("Missing Jira settings: {}", missing.join(", "));
        }
        Ok(jira)
    }

    /// Apply overrides from environment-style lookups on top of the file.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(domain) = var("JIRA_DOMAIN") {
            self.jira_mut().domain = domain;
        }
        if let Some(email) = var("JIRA_EMAIL") {
            self.jira_mut().email = email;
        }
        if let Some(token) = var("JIRA_API_TOKEN") {
            self.jira_mut().api_token = token;
        }
        if let Some(project) = var("JIRA_PROJECT") {
            self.fetch.project = Some(project);
        }
        if let Some(dir) = var("SNAPSHOT_DIR") {
            self.store.dir = Some(PathBuf::from(dir));
        }
    }

    fn jira_mut(&mut self) -> &mut JiraConfig {
        self.jira.get_or_insert_with(JiraConfig::default)
    }
}

fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".jira-snapshot")
}

fn load_file(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load `~/.jira-snapshot/config.toml`, then let `.env` and the process
/// environment override it.
pub fn load_config() -> Result<AppConfig> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            return Err(err).context("Failed to load .env");
        }
    }
    let mut config = load_file(&config_path())?;
    config.apply_env(|var| std::env::var(var).ok());
    Ok(config)
}
