//! Environment interpolation applied to configuration files before parsing.
//!
//! `${NAME}` expands to the value of `NAME`, `${NAME:-fallback}` falls back
//! when `NAME` is unset or empty, and `$$` is a literal `$`. Any other `$`
//! is left alone.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct TemplateError {
    pub line: usize,
    pub message: String,
}

pub fn render(input: &str) -> Result<String, TemplateError> {
    render_with(input, |name| std::env::var(name).ok())
}

pub fn render_with<F>(input: &str, lookup: F) -> Result<String, TemplateError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut line = 1;
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        let (before, tail) = rest.split_at(pos);
        out.push_str(before);
        line += before.matches('\n').count();
        let after = &tail[1..];

        if let Some(stripped) = after.strip_prefix('$') {
            out.push('$');
            rest = stripped;
            continue;
        }

        let Some(body) = after.strip_prefix('{') else {
            out.push('$');
            rest = after;
            continue;
        };

        let end = match body.find(['}', '\n']) {
            Some(end) if body[end..].starts_with('}') => end,
            _ => {
                return Err(TemplateError {
                    line,
                    message: "unterminated `${`".to_string(),
                })
            }
        };

        out.push_str(&resolve(&body[..end], line, &lookup)?);
        rest = &body[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

fn resolve<F>(expr: &str, line: usize, lookup: &F) -> Result<String, TemplateError>
where
    F: Fn(&str) -> Option<String>,
{
    let (name, fallback) = match expr.split_once(":-") {
        Some((name, fallback)) => (name.trim(), Some(fallback)),
        None => (expr.trim(), None),
    };

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(TemplateError {
            line,
            message: format!("invalid variable name {name:?}"),
        });
    }

    match lookup(name).filter(|v| !v.is_empty()) {
        Some(value) => Ok(value),
        None => fallback.map(str::to_string).ok_or_else(|| TemplateError {
            line,
            message: format!("environment variable `{name}` is not set"),
        }),
    }
}
