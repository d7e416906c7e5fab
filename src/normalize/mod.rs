//! Turns raw Jira search results into flat `Issue` records.
//!
//! Everything here is pure: no network, no storage. A field that is missing
//! or malformed falls back to its default and the rest of the batch carries on.

pub mod comments;
pub mod fields;
pub mod links;
pub mod sprint;


use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::model::issue::{Issue, DEFAULT_PRIORITY, UNASSIGNED};
use crate::util::text::{render_description, truncate_chars};
use crate::util::time::parse_timestamp;
use fields::{FieldMap, UserField};

/// Maximum description length, in characters.
pub const DESCRIPTION_LIMIT: usize = 500;

pub const DEFAULT_SPRINT_FIELD: &str = "customfield_10020";
pub const DEFAULT_STORY_POINTS_FIELD: &str = "customfield_10016";

/// Custom field ids that differ between Jira sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIds {
    pub sprint: String,
    pub story_points: String,
}

impl Default for FieldIds {
    fn default() -> Self {
        Self {
            sprint: DEFAULT_SPRINT_FIELD.into(),
            story_points: DEFAULT_STORY_POINTS_FIELD.into(),
        }
    }
}

/// Normalize a page of raw issues, preserving provider order.
pub fn normalize_issues(raw: &[Value], ids: &FieldIds, now: DateTime<Utc>) -> Vec<Issue> {
    raw.iter().map(|issue| normalize_issue(issue, ids, now)).collect()
}

pub fn normalize_issue(raw: &Value, ids: &FieldIds, now: DateTime<Utc>) -> Issue {
    let key = raw
        .get("key")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let fields = FieldMap::new(raw.get("fields"));
    let mut issue = Issue::with_key(key);

    if let Some(title) = fields.string("summary") {
        issue.title = title;
    }
    if let Some(desc) = fields.raw("description").and_then(render_description) {
        issue.description = truncate_chars(&desc, DESCRIPTION_LIMIT);
    }
    if let Some(issue_type) = fields.name_of("issuetype") {
        issue.issue_type = issue_type;
    }
    issue.priority = fields
        .name_of("priority")
        .unwrap_or_else(|| DEFAULT_PRIORITY.into());

    let assignee = fields.get::<UserField>("assignee");
    issue.assignee = assignee
        .as_ref()
        .and_then(|a| a.display_name.clone())
        .unwrap_or_else(|| UNASSIGNED.into());
    issue.assignee_id = assignee.and_then(|a| a.account_id);

    if let Some(project) = fields.name_of("project") {
        issue.project_name = project;
    }
    if let Some(status) = fields.name_of("status") {
        issue.status = status;
    }
    issue.story_points = fields.number(&ids.story_points).unwrap_or(0.0);

    issue.created_at = timestamp(&fields, "created");
    issue.due_date = timestamp(&fields, "duedate");
    issue.resolution_date = timestamp(&fields, "resolutiondate");
    issue.time_estimate = fields.seconds("timeoriginalestimate").unwrap_or(0);
    issue.time_spent = fields.seconds("timespent").unwrap_or(0);

    issue.is_overdue = is_overdue(issue.due_date, issue.resolution_date.is_some(), now);

    let deps = links::extract_dependencies(fields.raw("issuelinks"));
    issue.blocked_by = deps.blocked_by;
    issue.depends_on = deps.depends_on;

    let sprint = sprint::resolve_sprint(fields.raw(&ids.sprint));
    issue.sprint_name = sprint.name;
    issue.sprint_state = sprint.state;

    issue.comments = comments::extract_comments(fields.raw("comment"));

    issue
}

/// Overdue means a due date in the past with no resolution recorded.
pub fn is_overdue(due: Option<DateTime<Utc>>, resolved: bool, now: DateTime<Utc>) -> bool {
    match due {
        Some(due) => !resolved && due < now,
        None => false,
    }
}

fn timestamp(fields: &FieldMap<'_>, name: &str) -> Option<DateTime<Utc>> {
    let raw = fields.string(name)?;
    let parsed = parse_timestamp(&raw);
    if parsed.is_none() {
        tracing::debug!(field = name, value = %raw, "unparseable timestamp");
    }
    parsed
}
