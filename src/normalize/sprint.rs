use serde_json::Value;

use crate::model::issue::{BACKLOG_SPRINT, FUTURE_SPRINT_STATE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintContext {
    pub name: String,
    pub state: String,
}

impl Default for SprintContext {
    fn default() -> Self {
        Self {
            name: BACKLOG_SPRINT.into(),
            state: FUTURE_SPRINT_STATE.into(),
        }
    }
}

/// Resolve the sprint an issue sits in from the sprint custom field.
///
/// Only the first entry is consulted. Cloud returns sprint objects; older
/// servers return `com.atlassian.greenhopper.service.sprint.Sprint@..[..]`
/// strings. Any other shape keeps the backlog defaults.
pub fn resolve_sprint(field: Option<&Value>) -> SprintContext {
    let mut ctx = SprintContext::default();
    let Some(first) = field.and_then(Value::as_array).and_then(|s| s.first()) else {
        return ctx;
    };

    let (name, state) = match first {
        Value::Object(obj) => (
            obj.get("name").and_then(Value::as_str).map(String::from),
            obj.get("state").and_then(Value::as_str).map(String::from),
        ),
        Value::String(legacy) => (
            legacy_attribute(legacy, "name"),
            legacy_attribute(legacy, "state").map(|s| s.to_lowercase()),
        ),
        _ => (None, None),
    };

    if let Some(name) = name.filter(|n| !n.is_empty()) {
        ctx.name = name;
    }
    if let Some(state) = state.filter(|s| !s.is_empty()) {
        ctx.state = state;
    }
    ctx
}

/// Pull `attr=value` out of a legacy `Sprint@hash[k=v,k=v]` string.
///
/// Values may contain commas; a pair only ends at the next `,ident=`.
fn legacy_attribute(raw: &str, attr: &str) -> Option<String> {
    let start = raw.find('[')? + 1;
    let end = raw.rfind(']').unwrap_or(raw.len());
    let body = raw.get(start..end)?;

    let mut pairs = Vec::new();
    let mut pair_start = 0;
    for (idx, _) in body.match_indices(',') {
        if starts_with_key(&body[idx + 1..]) {
            pairs.push(&body[pair_start..idx]);
            pair_start = idx + 1;
        }
    }
    pairs.push(&body[pair_start..]);

    let prefix = format!("{attr}=");
    pairs
        .into_iter()
        .find_map(|pair| pair.strip_prefix(&prefix))
        .filter(|v| *v != "<null>")
        .map(String::from)
}

/// Whether `s` begins with `identifier=`.
fn starts_with_key(s: &str) -> bool {
    let Some((key, _)) = s.split_once('=') else {
        return false;
    };
    let mut chars = key.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
