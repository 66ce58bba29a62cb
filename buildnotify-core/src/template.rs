//! `<%= expr %>` interpolation against a JSON context.
//!
//! An expression is a property path: `file.relative`, `options["build id"]`,
//! `options.targets[0]`. Strings are inserted verbatim, `null` renders empty,
//! numbers and booleans use their display form, and arrays/objects render as
//! compact JSON. A path that does not resolve is a [`TemplateError`]; an
//! unclosed `<%=` is copied out as text.

use serde_json::{Map, Value};

use crate::error::TemplateError;
use crate::item::{Artifact, BuildError, Subject};

pub const OPEN_TAG: &str = "<%=";
pub const CLOSE_TAG: &str = "%>";

/// Whether `text` contains at least one interpolation tag.
#[inline]
pub fn contains_template(text: &str) -> bool {
    text.contains(OPEN_TAG)
}

/// Interpolates every tag in `template` against `context`.
pub fn render(template: &str, context: &Value) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN_TAG) {
        let body = &rest[start + OPEN_TAG.len()..];
        // An open tag that is never closed is plain text.
        let Some(end) = body.find(CLOSE_TAG) else {
            break;
        };

        out.push_str(&rest[..start]);
        let value = lookup(context, &body[..end])?;
        push_value(&mut out, value);

        rest = &body[end + CLOSE_TAG.len()..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Context for artifact notifications: `{file, options}`.
pub fn artifact_context(file: &Artifact, options: &Map<String, Value>) -> Value {
    let mut ctx = Map::with_capacity(2);
    ctx.insert("file".into(), file.template_value());
    ctx.insert("options".into(), Value::Object(options.clone()));
    Value::Object(ctx)
}

/// Context for error notifications: `{error, options}`.
pub fn error_context(err: &BuildError, options: &Map<String, Value>) -> Value {
    let mut ctx = Map::with_capacity(2);
    ctx.insert("error".into(), err.template_value());
    ctx.insert("options".into(), Value::Object(options.clone()));
    Value::Object(ctx)
}

pub fn subject_context(subject: Subject<'_>, options: &Map<String, Value>) -> Value {
    match subject {
        Subject::Artifact(file) => artifact_context(file, options),
        Subject::Error(err) => error_context(err, options),
    }
}

#[derive(Debug, PartialEq)]
enum Segment {
    Key(String),
    Index(usize),
}

fn lookup<'v>(context: &'v Value, raw: &str) -> Result<&'v Value, TemplateError> {
    let expr = raw.trim();
    let segments = parse_path(expr)?;

    segments
        .iter()
        .try_fold(context, |value, segment| match (segment, value) {
            (Segment::Key(key), Value::Object(map)) => map.get(key),
            (Segment::Index(idx), Value::Array(items)) => items.get(*idx),
            (Segment::Key(key), Value::Array(items)) => {
                key.parse::<usize>().ok().and_then(|idx| items.get(idx))
            }
            _ => None,
        })
        .ok_or_else(|| TemplateError::UndefinedPath(expr.to_string()))
}

fn parse_path(expr: &str) -> Result<Vec<Segment>, TemplateError> {
    let invalid = || TemplateError::InvalidExpression(expr.to_string());
    let mut chars = expr.char_indices().peekable();
    let mut segments = Vec::new();

    segments.push(Segment::Key(take_ident(expr, &mut chars).ok_or_else(invalid)?));

    while let Some((_, c)) = chars.next() {
        match c {
            '.' => segments.push(Segment::Key(
                take_ident(expr, &mut chars).ok_or_else(invalid)?,
            )),
            '[' => {
                let (start, _) = *chars.peek().ok_or_else(invalid)?;
                let close = expr[start..].find(']').ok_or_else(invalid)? + start;
                segments.push(parse_bracket(expr[start..close].trim()).ok_or_else(invalid)?);
                while chars.peek().is_some_and(|(i, _)| *i <= close) {
                    chars.next();
                }
            }
            _ => return Err(invalid()),
        }
    }

    Ok(segments)
}

fn take_ident(
    expr: &str,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Option<String> {
    let (start, first) = *chars.peek()?;
    if !(first.is_alphabetic() || first == '_' || first == '$') {
        return None;
    }

    let mut end = expr.len();
    while let Some(&(i, c)) = chars.peek() {
        if c.is_alphanumeric() || c == '_' || c == '$' {
            chars.next();
        } else {
            end = i;
            break;
        }
    }
    Some(expr[start..end].to_string())
}

fn parse_bracket(inner: &str) -> Option<Segment> {
    let quoted = |q: char| {
        inner
            .strip_prefix(q)
            .and_then(|s| s.strip_suffix(q))
            .map(|s| Segment::Key(s.to_string()))
    };

    quoted('"')
        .or_else(|| quoted('\''))
        .or_else(|| inner.parse::<usize>().ok().map(Segment::Index))
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        other => out.push_str(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn file_ctx() -> Value {
        let file = Artifact::new("/work/test/fixtures/1.txt", "/work/test/fixtures")
            .with_contents("hello");
        let mut options = Map::new();
        options.insert("date".into(), json!("2024-01-01"));
        options.insert("targets".into(), json!(["web", "node"]));
        options.insert("build id".into(), json!(42));
        artifact_context(&file, &options)
    }

    #[test]
    fn renders_relative_path() {
        let out = render("Template: <%= file.relative %>", &file_ctx()).unwrap();
        assert_eq!(out, "Template: 1.txt");
    }

    #[test]
    fn renders_error_message() {
        let err = BuildError::new("test");
        let ctx = error_context(&err, &Map::new());
        assert_eq!(
            render("Template: <%= error.message %>", &ctx).unwrap(),
            "Template: test"
        );
    }

    #[test]
    fn renders_template_options_and_brackets() {
        let ctx = file_ctx();
        assert_eq!(
            render("<%= options.date %>|<%=options.targets[1]%>|<%= options[\"build id\"] %>", &ctx)
                .unwrap(),
            "2024-01-01|node|42"
        );
        assert_eq!(
            render("<%= options.targets %>", &ctx).unwrap(),
            r#"["web","node"]"#
        );
    }

    #[test]
    fn null_renders_empty() {
        let err = BuildError::new("boom");
        let ctx = error_context(&err, &Map::new());
        assert_eq!(render("[<%= error.plugin %>]", &ctx).unwrap(), "[]");
    }

    #[test]
    fn undefined_path_is_an_error() {
        let err = render("<%= file.nope %>", &file_ctx()).unwrap_err();
        assert_eq!(err, TemplateError::UndefinedPath("file.nope".into()));

        let err = render("<%= error.message %>", &file_ctx()).unwrap_err();
        assert_eq!(err, TemplateError::UndefinedPath("error.message".into()));
    }

    #[test]
    fn unclosed_tag_is_plain_text() {
        assert_eq!(
            render("ok <%= file.path", &file_ctx()).unwrap(),
            "ok <%= file.path"
        );
        assert_eq!(
            render("<%= file.basename %> then '<%=", &file_ctx()).unwrap(),
            "1.txt then '<%="
        );
    }

    #[test]
    fn malformed_expressions_are_rejected() {
        for template in ["<%= %>", "<%= file. %>", "<%= file[ %>", "<%= file + 1 %>"] {
            assert!(
                matches!(
                    render(template, &file_ctx()),
                    Err(TemplateError::InvalidExpression(_))
                ),
                "{template} should be rejected"
            );
        }
    }

    proptest! {
        #[test]
        fn text_without_tags_is_unchanged(text in "[^<]*") {
            prop_assert!(!contains_template(&text));
            prop_assert_eq!(render(&text, &file_ctx()).unwrap(), text);
        }
    }
}
