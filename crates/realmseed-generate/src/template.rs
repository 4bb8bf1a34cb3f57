//! Single-pass placeholder substitution for quest and level content.
//!
//! Placeholders are `{enemy}`, `{location}`, `{item}` and `{count}`; `{{` and
//! `}}` produce literal braces. Substituted text is never re-scanned, so a
//! token value containing braces is emitted as-is.

use serde_json::{Map, Value};
use thiserror::Error;

/// Malformed template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unknown placeholder '{{{name}}}' in '{template}'")]
    UnknownPlaceholder { name: String, template: String },
    #[error("unterminated placeholder at byte {offset} in '{template}'")]
    Unterminated { offset: usize, template: String },
    #[error("unmatched '}}' at byte {offset} in '{template}'")]
    UnmatchedBrace { offset: usize, template: String },
}

/// Concrete values for one rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    pub enemy: String,
    pub location: String,
    pub item: String,
    pub count: u32,
}

impl TokenSet {
    fn text(&self, name: &str) -> Option<String> {
        match name {
            "enemy" => Some(self.enemy.clone()),
            "location" => Some(self.location.clone()),
            "item" => Some(self.item.clone()),
            "count" => Some(self.count.to_string()),
            _ => None,
        }
    }

    fn typed(&self, name: &str) -> Option<Value> {
        match name {
            "count" => Some(Value::from(self.count)),
            other => self.text(other).map(Value::String),
        }
    }
}

/// Substitute every placeholder in `template`.
pub fn render(template: &str, tokens: &TokenSet) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        match ch {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut name = String::new();
                let mut closed = false;
                for (_, inner) in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    name.push(inner);
                }
                if !closed {
                    return Err(TemplateError::Unterminated {
                        offset,
                        template: template.to_string(),
                    });
                }
                let value =
                    tokens
                        .text(&name)
                        .ok_or_else(|| TemplateError::UnknownPlaceholder {
                            name: name.clone(),
                            template: template.to_string(),
                        })?;
                out.push_str(&value);
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(TemplateError::UnmatchedBrace {
                        offset,
                        template: template.to_string(),
                    });
                }
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

/// Render a template field; a field that is exactly one placeholder keeps
/// the token's type, so `"{count}"` becomes a JSON number.
pub fn render_value(template: &str, tokens: &TokenSet) -> Result<Value, TemplateError> {
    if let Some(name) = whole_placeholder(template) {
        return tokens
            .typed(name)
            .ok_or_else(|| TemplateError::UnknownPlaceholder {
                name: name.to_string(),
                template: template.to_string(),
            });
    }
    render(template, tokens).map(Value::String)
}

/// Render every string leaf of a JSON document.
pub fn render_json(value: &Value, tokens: &TokenSet) -> Result<Value, TemplateError> {
    Ok(match value {
        Value::String(text) => render_value(text, tokens)?,
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| render_json(item, tokens))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(fields) => {
            let mut rendered = Map::new();
            for (key, field) in fields {
                rendered.insert(key.clone(), render_json(field, tokens)?);
            }
            Value::Object(rendered)
        }
        other => other.clone(),
    })
}

fn whole_placeholder(template: &str) -> Option<&str> {
    let inner = template.strip_prefix('{')?.strip_suffix('}')?;
    if inner.is_empty() || inner.contains(['{', '}']) {
        return None;
    }
    Some(inner)
}
