use serde::Deserialize;
use serde_json::Value;

use super::fields::{lenient, UserField};

/// Number of most recent comments kept per issue.
pub const KEPT_COMMENTS: usize = 3;

/// Stand-in for ADF comment bodies, which are not parsed.
pub const RICH_TEXT_PLACEHOLDER: &str = "Rich Text";

const UNKNOWN_AUTHOR: &str = "Unknown";

#[derive(Deserialize)]
struct CommentPage {
    #[serde(default)]
    comments: Vec<Value>,
}

#[derive(Deserialize)]
struct Comment {
    #[serde(default, deserialize_with = "lenient")]
    author: Option<UserField>,
    #[serde(default)]
    body: Option<Value>,
}

/// Render the last few comments as `author: body` lines, oldest first.
pub fn extract_comments(field: Option<&Value>) -> Vec<String> {
    let Some(page) = field.and_then(|f| CommentPage::deserialize(f).ok()) else {
        return Vec::new();
    };
    let skip = page.comments.len().saturating_sub(KEPT_COMMENTS);
    page.comments.iter().skip(skip).map(render_comment).collect()
}

fn render_comment(raw: &Value) -> String {
    let comment = Comment::deserialize(raw).unwrap_or(Comment {
        author: None,
        body: None,
    });
    let author = comment
        .author
        .and_then(|a| a.display_name)
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
    let body = match comment.body {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(_) => RICH_TEXT_PLACEHOLDER.to_string(),
    };
    format!("{author}: {body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn comment(author: &str, body: Value) -> Value {
        json!({ "author": { "displayName": author }, "body": body })
    }

    #[test]
    fn keeps_last_three_in_order() {
        let field = json!({
            "comments": [
                comment("Ana", json!("one")),
                comment("Ben", json!("two")),
                comment("Cy", json!("three")),
                comment("Di", json!("four")),
                comment("Ed", json!("five")),
            ]
        });
        assert_eq!(
            extract_comments(Some(&field)),
            vec!["Cy: three", "Di: four", "Ed: five"]
        );
    }

    #[test]
    fn fewer_than_three_are_all_kept() {
        let field = json!({ "comments": [comment("Ana", json!("only"))] });
        assert_eq!(extract_comments(Some(&field)), vec!["Ana: only"]);
    }

    #[test]
    fn rich_text_body_uses_placeholder() {
        let adf = json!({ "type": "doc", "version": 1, "content": [] });
        let field = json!({ "comments": [comment("Ana", adf)] });
        assert_eq!(extract_comments(Some(&field)), vec!["Ana: Rich Text"]);
    }

    #[test]
    fn missing_author_and_body() {
        let field = json!({ "comments": [{ "id": "1" }, "not an object"] });
        assert_eq!(extract_comments(Some(&field)), vec!["Unknown: ", "Unknown: "]);
    }

    #[test]
    fn malformed_author_keeps_body() {
        let field = json!({ "comments": [{ "author": "bob", "body": "hi" }] });
        assert_eq!(extract_comments(Some(&field)), vec!["Unknown: hi"]);
    }

    #[test]
    fn absent_or_malformed_page() {
        assert!(extract_comments(None).is_empty());
        assert!(extract_comments(Some(&json!({}))).is_empty());
        assert!(extract_comments(Some(&json!({ "comments": "nope" }))).is_empty());
    }
}
