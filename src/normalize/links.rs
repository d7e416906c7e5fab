use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;

use super::fields::lenient;

const BLOCKED_BY: &str = "is blocked by";
const BLOCKS: &str = "blocks";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueLink {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    link_type: Option<LinkType>,
    #[serde(default, deserialize_with = "lenient")]
    inward_issue: Option<LinkedIssue>,
    #[serde(default, deserialize_with = "lenient")]
    outward_issue: Option<LinkedIssue>,
}

#[derive(Deserialize)]
struct LinkType {
    #[serde(default, deserialize_with = "lenient")]
    inward: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    outward: Option<String>,
}

#[derive(Deserialize)]
struct LinkedIssue {
    #[serde(default, deserialize_with = "lenient")]
    key: Option<String>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Dependencies {
    pub blocked_by: BTreeSet<String>,
    pub depends_on: BTreeSet<String>,
}

/// Split `issuelinks` into the keys blocking this issue and the keys it blocks.
///
/// Links are decoded one at a time; a malformed entry is skipped without
/// affecting its neighbours. Referenced keys are kept even when they point
/// outside the fetched set.
pub fn extract_dependencies(links: Option<&Value>) -> Dependencies {
    let mut deps = Dependencies::default();
    let Some(links) = links.and_then(Value::as_array) else {
        return deps;
    };

    for raw in links {
        let Ok(link) = IssueLink::deserialize(raw) else {
            tracing::debug!("skipping malformed issue link");
            continue;
        };
        let Some(link_type) = link.link_type else {
            continue;
        };

        if link_type.inward.as_deref() == Some(BLOCKED_BY) {
            if let Some(key) = link.inward_issue.and_then(|i| i.key) {
                deps.blocked_by.insert(key);
            }
        }
        if link_type.outward.as_deref() == Some(BLOCKS) {
            if let Some(key) = link.outward_issue.and_then(|i| i.key) {
                deps.depends_on.insert(key);
            }
        }
    }

    deps
}
