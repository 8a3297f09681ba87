// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Post frontmatter validation.
//!
//! Every post in the content folder carries a leading YAML frontmatter block
//! that the static-site generator consumes. Publishing a post whose
//! frontmatter is broken produces a broken site build, so the publish flow
//! refuses to touch the repository until every post checks out.
//!
//! # Schema
//!
//! Required fields: `title` (string), `description` (string), `pubDate`
//! (date). Optional fields: `updatedDate` (date), `heroImage` (string),
//! `published` (boolean). Dates accept RFC 3339 timestamps, `YYYY-MM-DD`,
//! and `Mon DD YYYY`, which covers every format the site's posts use.
//!
//! Validation is one pass: every failing field is reported, not just the
//! first. Posts are never mutated.

use chrono::{DateTime, NaiveDate};
use serde_yaml::Value;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Frontmatter field the issue is about.
    pub field: String,

    /// What went wrong with it.
    pub message: String,
}

impl FieldIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Display for FieldIssue {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "{}: {}", self.field, self.message)
    }
}

/// Semantic type a frontmatter field must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Date,
    Flag,
}

const REQUIRED: [(&str, FieldKind); 3] = [
    ("title", FieldKind::Text),
    ("description", FieldKind::Text),
    ("pubDate", FieldKind::Date),
];

const OPTIONAL: [(&str, FieldKind); 3] = [
    ("updatedDate", FieldKind::Date),
    ("heroImage", FieldKind::Text),
    ("published", FieldKind::Flag),
];

/// Validate the frontmatter of one post.
///
/// An empty listing means the post is good to publish. A post without any
/// frontmatter, or with frontmatter that is not valid YAML, yields exactly
/// one issue rather than a parse failure.
pub fn validate(text: &str) -> Vec<FieldIssue> {
    let Some(raw) = split_frontmatter(text) else {
        return vec![FieldIssue::new(
            "frontmatter",
            "no leading frontmatter block found",
        )];
    };

    let value: Value = match serde_yaml::from_str(raw) {
        Ok(value) => value,
        Err(err) => return vec![FieldIssue::new("frontmatter", err.to_string())],
    };
    let Some(mapping) = value.as_mapping() else {
        return vec![FieldIssue::new(
            "frontmatter",
            "frontmatter is not a key/value mapping",
        )];
    };

    let mut issues = Vec::new();
    for (field, kind) in REQUIRED {
        match mapping.get(field) {
            Some(value) => check_kind(field, kind, value, &mut issues),
            None => issues.push(FieldIssue::new(field, "required field missing")),
        }
    }

    for (field, kind) in OPTIONAL {
        if let Some(value) = mapping.get(field) {
            check_kind(field, kind, value, &mut issues);
        }
    }

    issues
}

fn check_kind(field: &str, kind: FieldKind, value: &Value, issues: &mut Vec<FieldIssue>) {
    match kind {
        FieldKind::Text => {
            if !matches!(value, Value::String(_)) {
                issues.push(FieldIssue::new(field, "expected a string"));
            }
        }
        FieldKind::Flag => {
            if !matches!(value, Value::Bool(_)) {
                issues.push(FieldIssue::new(field, "expected true or false"));
            }
        }
        FieldKind::Date => match value {
            Value::String(raw) if parses_as_date(raw) => {}
            Value::String(raw) => {
                issues.push(FieldIssue::new(field, format!("{raw:?} is not a date")));
            }
            _ => issues.push(FieldIssue::new(field, "expected a date")),
        },
    }
}

fn parses_as_date(raw: &str) -> bool {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw).is_ok()
        || NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok()
        || NaiveDate::parse_from_str(raw, "%b %d %Y").is_ok()
}

/// Extract the raw YAML source of a leading frontmatter block.
///
/// The block must open with `---` on the very first line and close with a
/// matching `---` (or `...`) line. Returns `None` when no such block exists.
fn split_frontmatter(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("---")?;
    let rest = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if matches!(line.trim_end(), "---" | "...") {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    #[test]
    fn accept_complete_post() {
        let post = indoc! {r#"
            ---
            title: "First post"
            description: "Hello from the vault"
            pubDate: "Jul 08 2022"
            updatedDate: "2022-08-01"
            heroImage: "/placeholder-hero.jpg"
            published: true
            ---
            Body text goes here.
        "#};

        assert_eq!(validate(post), Vec::new());
    }

    #[test]
    fn report_every_missing_required_field() {
        let post = indoc! {r#"
            ---
            title: "First post"
            ---
            Body text.
        "#};

        let issues = validate(post);
        let fields: Vec<&str> = issues.iter().map(|issue| issue.field.as_str()).collect();
        assert_eq!(fields, ["description", "pubDate"]);
    }

    #[test]
    fn missing_frontmatter_is_one_issue() {
        let issues = validate("just a note without any frontmatter\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "frontmatter");
    }

    #[test]
    fn non_mapping_frontmatter_is_one_issue() {
        let post = indoc! {r#"
            ---
            - just
            - a list
            ---
        "#};

        let issues = validate(post);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "frontmatter");
        assert_eq!(issues[0].message, "frontmatter is not a key/value mapping");
    }

    #[test]
    fn unparseable_frontmatter_is_one_issue() {
        let post = indoc! {r#"
            ---
            title: [unclosed
            ---
        "#};

        let issues = validate(post);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "frontmatter");
    }

    #[test_case("2022-07-08"; "plain date")]
    #[test_case("Jul 08 2022"; "month name date")]
    #[test_case("2022-07-08T09:30:00Z"; "rfc3339 timestamp")]
    #[test]
    fn accept_date_formats(date: &str) {
        let post = format!(
            "---\ntitle: \"t\"\ndescription: \"d\"\npubDate: \"{date}\"\n---\n"
        );

        self::assert_eq!(validate(&post), Vec::new());
    }

    #[test_case("published", "\"yes\"", "expected true or false"; "flag must be boolean")]
    #[test_case("updatedDate", "\"soonish\"", "\"soonish\" is not a date"; "date must parse")]
    #[test_case("heroImage", "42", "expected a string"; "image path must be a string")]
    #[test]
    fn report_optional_field_type_errors(field: &str, value: &str, message: &str) {
        let post = format!(
            "---\ntitle: \"t\"\ndescription: \"d\"\npubDate: \"2022-07-08\"\n{field}: {value}\n---\n"
        );

        let issues = validate(&post);
        self::assert_eq!(issues.len(), 1);
        self::assert_eq!(issues[0].field, field);
        self::assert_eq!(issues[0].message, message);
    }

    #[test]
    fn windows_line_endings_still_split() {
        let post = "---\r\ntitle: \"t\"\r\ndescription: \"d\"\r\npubDate: \"2022-07-08\"\r\n---\r\nbody\r\n";
        assert_eq!(validate(post), Vec::new());
    }
}
