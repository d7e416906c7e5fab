use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PRIORITY: &str = "Medium";
pub const UNASSIGNED: &str = "Unassigned";
pub const BACKLOG_SPRINT: &str = "Backlog";
pub const FUTURE_SPRINT_STATE: &str = "future";

/// One normalized work item as stored inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub issue_type: String,
    pub priority: String,
    pub assignee: String,
    pub assignee_id: Option<String>,
    pub project_name: String,
    pub status: String,
    pub story_points: f64,
    pub created_at: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    /// None while the issue is still open.
    pub resolution_date: Option<DateTime<Utc>>,
    /// Seconds.
    pub time_estimate: i64,
    /// Seconds.
    pub time_spent: i64,
    /// Keys of issues that must complete before this one.
    #[serde(default)]
    pub blocked_by: BTreeSet<String>,
    /// Keys of issues this one blocks.
    #[serde(default)]
    pub depends_on: BTreeSet<String>,
    pub sprint_name: String,
    pub sprint_state: String,
    /// At most the three most recent comments, oldest first.
    #[serde(default)]
    pub comments: Vec<String>,
    pub is_overdue: bool,
}

impl Issue {
    /// An issue with every field at its documented default.
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: String::new(),
            description: String::new(),
            issue_type: String::new(),
            priority: DEFAULT_PRIORITY.into(),
            assignee: UNASSIGNED.into(),
            assignee_id: None,
            project_name: String::new(),
            status: String::new(),
            story_points: 0.0,
            created_at: None,
            due_date: None,
            resolution_date: None,
            time_estimate: 0,
            time_spent: 0,
            blocked_by: BTreeSet::new(),
            depends_on: BTreeSet::new(),
            sprint_name: BACKLOG_SPRINT.into(),
            sprint_state: FUTURE_SPRINT_STATE.into(),
            comments: Vec::new(),
            is_overdue: false,
        }
    }
}
