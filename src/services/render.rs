//! render.rs
//!
//! Сборка HTML-страниц из фрагментов.
//!
//! Каждая страница описывается упорядоченным списком фрагментов: сначала
//! общий каркас `_base`, затем вложенные фрагменты (например, `admin/overlay`),
//! в конце сама страница. Каждый следующий фрагмент подставляется в слот
//! `{{content}}` предыдущего.
//!
//! Внутри фрагментов поддерживаются только подстановки `{{path.to.field}}`
//! (с HTML-экранированием) и блоки `{{#each path}} ... {{/each}}` без вложенности.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Упорядоченный список фрагментов одной страницы.
pub type Layout = &'static [&'static str];

pub mod layouts {
    use super::Layout;

    pub const INDEX: Layout = &["_base", "index"];
    pub const ABOUT: Layout = &["_base", "about"];
    pub const COC: Layout = &["_base", "coc"];
    pub const EVENTS: Layout = &["_base", "events"];
    pub const VIEW_EVENT: Layout = &["_base", "view-event"];
    pub const LEARNING: Layout = &["_base", "learn"];
    pub const NOT_FOUND: Layout = &["_base", "404"];
    pub const INTERNAL_ERROR: Layout = &["_base", "500"];

    pub const ADMIN_INDEX: Layout = &["_base", "admin/overlay", "admin/index"];
    pub const ADD_EVENT: Layout = &["_base", "admin/overlay", "admin/add-event"];
    pub const LOCATIONS: Layout = &["_base", "admin/overlay", "admin/location"];
    pub const ADD_LOCATION: Layout = &["_base", "admin/overlay", "admin/add-location"];
    pub const ADD_LEARNING: Layout = &["_base", "admin/overlay", "admin/add-learn"];
}

const CONTENT_SLOT: &str = "{{content}}";

// Встроенные фрагменты; TEMPLATE_DIR может переопределить любой из них.
const BUILTIN: &[(&str, &str)] = &[
    ("_base", include_str!("../../templates/_base.html")),
    ("index", include_str!("../../templates/index.html")),
    ("about", include_str!("../../templates/about.html")),
    ("coc", include_str!("../../templates/coc.html")),
    ("events", include_str!("../../templates/events.html")),
    ("view-event", include_str!("../../templates/view-event.html")),
    ("learn", include_str!("../../templates/learn.html")),
    ("404", include_str!("../../templates/404.html")),
    ("500", include_str!("../../templates/500.html")),
    ("admin/overlay", include_str!("../../templates/admin/overlay.html")),
    ("admin/index", include_str!("../../templates/admin/index.html")),
    ("admin/add-event", include_str!("../../templates/admin/add-event.html")),
    ("admin/location", include_str!("../../templates/admin/location.html")),
    ("admin/add-location", include_str!("../../templates/admin/add-location.html")),
    ("admin/add-learn", include_str!("../../templates/admin/add-learn.html")),
];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown template fragment {0:?}")]
    UnknownFragment(String),

    #[error("fragment {0:?} has no {{{{content}}}} slot")]
    MissingSlot(String),

    #[error("fragment {fragment:?}: unterminated {what}")]
    Unterminated { fragment: String, what: &'static str },

    #[error("fragment {fragment:?}: unknown filter {filter:?}")]
    UnknownFilter { fragment: String, filter: String },

    #[error("failed to encode URL segment: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),

    #[error("empty layout")]
    EmptyLayout,

    #[error("page context could not be serialized: {0}")]
    Context(#[from] serde_json::Error),

    #[error("failed to read template directory: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug)]
pub struct PageRenderer {
    fragments: HashMap<String, String>,
}

impl PageRenderer {
    pub fn builtin() -> Self {
        Self::from_fragments(BUILTIN.iter().copied())
    }

    pub fn from_fragments<'a>(fragments: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            fragments: fragments
                .into_iter()
                .map(|(name, body)| (name.to_string(), body.to_string()))
                .collect(),
        }
    }

    /// Встроенные фрагменты плюс `.html` файлы из `dir` (включая `admin/`).
    pub fn with_overrides(dir: &Path) -> Result<Self, RenderError> {
        let mut renderer = Self::builtin();
        let overridden = renderer.load_dir(dir, "")?;
        info!("Loaded {} template overrides from {}", overridden, dir.display());
        Ok(renderer)
    }

    fn load_dir(&mut self, dir: &Path, prefix: &str) -> Result<usize, RenderError> {
        let mut loaded = 0;
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if path.is_dir() {
                loaded += self.load_dir(&path, &format!("{prefix}{stem}/"))?;
            } else if path.extension().is_some_and(|ext| ext == "html") {
                let body = std::fs::read_to_string(&path)?;
                self.fragments.insert(format!("{prefix}{stem}"), body);
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    /// Composes `layout` outermost first and fills placeholders from `context`.
    pub fn render<C: Serialize + ?Sized>(&self, layout: &[&str], context: &C) -> Result<String, RenderError> {
        let context = serde_json::to_value(context)?;

        let (leaf, parents) = layout.split_last().ok_or(RenderError::EmptyLayout)?;
        let mut page = self.fill(leaf, &context)?;

        for name in parents.iter().rev() {
            let shell = self.fill(name, &context)?;
            let Some((before, after)) = shell.split_once(CONTENT_SLOT) else {
                return Err(RenderError::MissingSlot(name.to_string()));
            };
            page = format!("{before}{page}{after}");
        }
        Ok(page)
    }

    fn fill(&self, name: &str, context: &Value) -> Result<String, RenderError> {
        let source = self
            .fragments
            .get(name)
            .ok_or_else(|| RenderError::UnknownFragment(name.to_string()))?;
        expand(name, source, &[context])
    }
}

/// Разворачивает `{{#each}}`-блоки и подстановки. `scopes` ищутся от
/// последнего (текущий элемент цикла) к первому (контекст страницы).
fn expand(fragment: &str, source: &str, scopes: &[&Value]) -> Result<String, RenderError> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let end = after_open.find("}}").ok_or_else(|| RenderError::Unterminated {
            fragment: fragment.to_string(),
            what: "tag",
        })?;
        let tag = after_open[..end].trim();
        rest = &after_open[end + 2..];

        if let Some(path) = tag.strip_prefix("#each ") {
            let close = rest.find("{{/each}}").ok_or_else(|| RenderError::Unterminated {
                fragment: fragment.to_string(),
                what: "#each block",
            })?;
            let body = &rest[..close];
            rest = &rest[close + "{{/each}}".len()..];

            if let Some(Value::Array(items)) = lookup(scopes, path.trim()) {
                for item in items {
                    let mut inner = scopes.to_vec();
                    inner.push(item);
                    out.push_str(&expand(fragment, body, &inner)?);
                }
            }
        } else if tag == "content" {
            // Слот заполняет render()
            out.push_str(CONTENT_SLOT);
        } else {
            // `{{path|url}}` для значений внутри ссылок
            let (path, filter) = match tag.split_once('|') {
                Some((path, filter)) => (path.trim(), Some(filter.trim())),
                None => (tag, None),
            };
            let value = display(lookup(scopes, path));
            let value = match filter {
                None => value,
                Some("url") => encode_path_segment(&value)?,
                Some(other) => {
                    return Err(RenderError::UnknownFilter {
                        fragment: fragment.to_string(),
                        filter: other.to_string(),
                    })
                }
            };
            out.push_str(&escape_html(&value));
        }
    }

    out.push_str(rest);
    Ok(out)
}

fn lookup<'a>(scopes: &[&'a Value], path: &str) -> Option<&'a Value> {
    scopes.iter().rev().find_map(|scope| {
        if path == "." {
            return Some(*scope);
        }
        path.split('.')
            .try_fold(*scope, |value, key| value.get(key))
    })
}

fn display(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Кодирует значение как один сегмент пути: `/`, `?`, `#` и прочее уходят в `%XX`.
pub fn encode_path_segment(raw: &str) -> Result<String, RenderError> {
    // Форма даёт "=значение", пробел в ней "+", а сам "+" уже "%2B"
    let encoded = serde_urlencoded::to_string([("", raw)])?;
    Ok(encoded.trim_start_matches('=').replace('+', "%20"))
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            // иначе значение "{{content}}" из формы перехватит слот каркаса
            '{' => escaped.push_str("&#123;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
