use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::IssueSource;
use crate::error::ProviderError;
use crate::normalize::FieldIds;

pub const DEFAULT_MAX_RESULTS: u32 = 100;

const GLOBAL_JQL: &str = "created >= -365d ORDER BY updated DESC";

const BASE_FIELDS: &[&str] = &[
    "summary",
    "status",
    "assignee",
    "description",
    "priority",
    "issuetype",
    "created",
    "duedate",
    "resolutiondate",
    "timeoriginalestimate",
    "timespent",
    "issuelinks",
    "comment",
    "project",
];

/// Body of `POST /rest/api/3/search/jql`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub jql: String,
    pub fields: Vec<String>,
    pub max_results: u32,
}

impl SearchQuery {
    /// An explicit JQL wins; otherwise scope to one project, or to
    /// everything created in the last year.
    pub fn new(
        jql: Option<&str>,
        project: Option<&str>,
        max_results: u32,
        ids: &FieldIds,
    ) -> Self {
        let jql = match (jql, project) {
            (Some(jql), _) => jql.to_string(),
            (None, Some(key)) => format!("project = \"{key}\" ORDER BY updated DESC"),
            (None, None) => GLOBAL_JQL.to_string(),
        };
        let mut fields: Vec<String> = BASE_FIELDS.iter().map(|f| f.to_string()).collect();
        fields.push(ids.sprint.clone());
        fields.push(ids.story_points.clone());
        Self {
            jql,
            fields,
            max_results,
        }
    }
}

pub struct JiraSource {
    base_url: String,
    auth_header: String,
    query: SearchQuery,
    client: reqwest::Client,
}

impl JiraSource {
    pub fn new(domain: &str, email: &str, api_token: &str, query: SearchQuery) -> Self {
        let creds = format!("{email}:{api_token}");
        let encoded = base64::engine::general_purpose::STANDARD.encode(creds);
        Self {
            base_url: base_url_for(domain),
            auth_header: format!("Basic {encoded}"),
            query,
            client: reqwest::Client::new(),
        }
    }

    pub fn search_url(&self) -> String {
        format!("{}/rest/api/3/search/jql", self.base_url)
    }
}

/// `acme` becomes `https://acme.atlassian.net`; full hosts and URLs are kept.
fn base_url_for(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.contains("://") {
        domain.to_string()
    } else if domain.contains('.') {
        format!("https://{domain}")
    } else {
        format!("https://{domain}.atlassian.net")
    }
}

/// A 2xx reply without an `issues` array is a decode failure, not an empty page.
#[derive(Deserialize)]
struct SearchResponse {
    issues: Vec<Value>,
}

#[async_trait]
impl IssueSource for JiraSource {
    fn name(&self) -> &str {
        "Jira"
    }

    async fn fetch_issues(&self) -> Result<Vec<Value>, ProviderError> {
        let url = self.search_url();
        tracing::info!(%url, jql = %self.query.jql, "fetching issues from Jira");

        let resp = self
            .client
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .json(&self.query)
            .send()
            .await
            .map_err(ProviderError::Request)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(%status, details = %body, "Jira API error");
            return Err(ProviderError::Status { status, body });
        }

        let search: SearchResponse = resp.json().await.map_err(ProviderError::Decode)?;
        tracing::info!(count = search.issues.len(), "fetched issues");
        Ok(search.issues)
    }
}
