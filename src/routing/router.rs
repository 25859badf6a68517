//! Per-request route decision.
//!
//! # Responsibilities
//! - Store the compiled template and rewrite rule sets
//! - Decide, for one request, between render, rewrite and default mapping
//! - Produce the normalized effective target for the static layer
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - Priority is fixed: template rules, then rewrite rules, then default
//! - A template rule without a renderer is treated as no match
//! - Total: every GET/HEAD request yields a target, never an error
//! - Effective targets are percent-encoded, so configured paths with spaces
//!   or non-ASCII text still form a valid URI

use axum::http::Method;
use std::path::Path;

use path_clean::PathClean;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::{ConfigError, RouteAction, ServerConfig};
use crate::routing::matcher::RuleSet;

/// Bytes escaped in the path part. `%` is kept so existing escapes survive.
const PATH_ENCODE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'[')
    .add(b']')
    .add(b'^')
    .add(b'|')
    .add(b'\\');

/// Bytes escaped in the query part.
const QUERY_ENCODE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'^')
    .add(b'\\');

/// Result of routing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A template rule rendered the whole response body.
    Render(String),
    /// A rewrite rule produced the effective target.
    Rewrite(String),
    /// No rule applied; the target is mapped under the base directory.
    Default(String),
    /// Method is not GET/HEAD; the request goes on untouched.
    Untouched,
}

impl RouteOutcome {
    /// Target the static layer should serve, if any.
    pub fn effective_target(&self) -> Option<&str> {
        match self {
            RouteOutcome::Rewrite(target) | RouteOutcome::Default(target) => Some(target),
            RouteOutcome::Render(_) | RouteOutcome::Untouched => None,
        }
    }

    /// Short label used in logs and metrics.
    pub fn branch(&self) -> &'static str {
        match self {
            RouteOutcome::Render(_) => "render",
            RouteOutcome::Rewrite(_) => "rewrite",
            RouteOutcome::Default(_) => "default",
            RouteOutcome::Untouched => "untouched",
        }
    }
}

/// Applies template rules, rewrite rules and the default mapping.
#[derive(Debug, Clone)]
pub struct RequestRouter {
    templates: RuleSet<RouteAction>,
    rewrites: RuleSet<String>,
    base_dir: String,
}

impl RequestRouter {
    pub fn new(
        templates: RuleSet<RouteAction>,
        rewrites: RuleSet<String>,
        base_dir: impl Into<String>,
    ) -> Self {
        Self {
            templates,
            rewrites,
            base_dir: base_dir.into(),
        }
    }

    /// Compile both rule sets from configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let templates = RuleSet::compile(&config.template_rules)?;
        let rewrites = RuleSet::compile(&config.rewrite_rules)?;

        tracing::info!(
            template_rules = templates.len(),
            rewrite_rules = rewrites.len(),
            base_dir = %config.base_dir,
            "Routing rules compiled"
        );

        Ok(Self::new(templates, rewrites, config.base_dir.clone()))
    }

    /// Route a request target (path plus optional query).
    pub fn route(&self, method: &Method, target: &str) -> RouteOutcome {
        if method != Method::GET && method != Method::HEAD {
            return RouteOutcome::Untouched;
        }

        if let Some(found) = self.templates.find_first_match(target) {
            match found.value {
                RouteAction::Render(render) => return RouteOutcome::Render(render()),
                RouteAction::PassThrough => {
                    tracing::debug!(
                        pattern = found.pattern,
                        url = target,
                        "Template rule is not renderable, falling through"
                    );
                }
            }
        }

        if let Some(found) = self.rewrites.find_first_match(target) {
            let replacement = substitute(found.value, &found.captures);
            if !replacement.is_empty() {
                return RouteOutcome::Rewrite(normalize_target(&format!("/{}", replacement)));
            }
        }

        let (path, query) = split_query(target);
        RouteOutcome::Default(join_target(
            &normalize_path(&format!("/{}/{}", self.base_dir, path)),
            query,
        ))
    }
}

/// Replace every `$i` token with capture `i`, lowest index first.
pub fn substitute(template: &str, captures: &[&str]) -> String {
    captures
        .iter()
        .enumerate()
        .fold(template.to_string(), |acc, (index, text)| {
            acc.replace(&format!("${}", index), text)
        })
}

/// Normalize and encode the path part of a target, keeping its query.
pub fn normalize_target(target: &str) -> String {
    let (path, query) = split_query(target);
    join_target(&normalize_path(path), query)
}

fn join_target(path: &str, query: Option<&str>) -> String {
    let path = utf8_percent_encode(path, PATH_ENCODE);
    match query {
        Some(query) => format!("{}?{}", path, utf8_percent_encode(query, QUERY_ENCODE)),
        None => path.to_string(),
    }
}

/// Collapse duplicate slashes and resolve dot segments, keeping a trailing slash.
pub fn normalize_path(path: &str) -> String {
    let cleaned = Path::new(path).clean();
    let mut normalized = cleaned.to_string_lossy().replace('\\', "/");

    if !normalized.starts_with('/') {
        normalized.insert(0, '/');
    }
    if path.ends_with('/') && !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

fn split_query(target: &str) -> (&str, Option<&str>) {
    match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    }
}
