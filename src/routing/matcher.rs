//! Rule compilation and matching.
//!
//! # Responsibilities
//! - Anchor each declared pattern to the start of the request target
//! - Keep declaration order so first-match is deterministic
//! - Expose capture groups by index for replacement templates
//!
//! # Design Decisions
//! - Every pattern compiles to `^/` + pattern + `($|\?)`, so `doc` can never
//!   match `/docs` and a query string never blocks a match
//! - Patterns already written with `^`, `/` or a trailing `$` are accepted
//! - A pattern repeated under a different spelling keeps its first position
//!   and takes the last declared value

use indexmap::IndexMap;
use regex::Regex;

use crate::config::ConfigError;

/// One compiled rule: the key as declared, its matcher, and its value.
#[derive(Debug, Clone)]
pub struct CompiledRule<V> {
    pattern: String,
    regex: Regex,
    value: V,
}

impl<V> CompiledRule<V> {
    /// The pattern as it was declared.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The anchored regex.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn value(&self) -> &V {
        &self.value
    }
}

/// A successful lookup.
#[derive(Debug)]
pub struct RuleMatch<'r, 'u, V> {
    /// The pattern as it was declared.
    pub pattern: &'r str,
    /// The value the rule maps to.
    pub value: &'r V,
    /// Capture texts: index 0 is the whole match, then each group in order.
    /// Groups that did not participate are empty.
    pub captures: Vec<&'u str>,
}

/// Ordered, immutable list of compiled rules.
#[derive(Debug, Clone)]
pub struct RuleSet<V> {
    rules: Vec<CompiledRule<V>>,
}

impl<V> Default for RuleSet<V> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<V: Clone> RuleSet<V> {
    /// Compile a declared mapping, preserving its order.
    pub fn compile(rules: &IndexMap<String, V>) -> Result<Self, ConfigError> {
        let mut compiled: Vec<CompiledRule<V>> = Vec::with_capacity(rules.len());

        for (pattern, value) in rules {
            let source = anchored_source(pattern);

            if let Some(existing) = compiled.iter_mut().find(|r| r.regex.as_str() == source) {
                tracing::warn!(
                    pattern = %pattern,
                    shadowed = %existing.pattern,
                    "Duplicate rule pattern, later value wins"
                );
                existing.pattern = pattern.clone();
                existing.value = value.clone();
                continue;
            }

            let regex = Regex::new(&source).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;

            compiled.push(CompiledRule {
                pattern: pattern.clone(),
                regex,
                value: value.clone(),
            });
        }

        Ok(Self { rules: compiled })
    }
}

impl<V> RuleSet<V> {
    /// Find the first rule, in declaration order, matching `target`.
    pub fn find_first_match<'r, 'u>(&'r self, target: &'u str) -> Option<RuleMatch<'r, 'u, V>> {
        self.rules.iter().find_map(|rule| {
            let caps = rule.regex.captures(target)?;
            let captures = caps
                .iter()
                .map(|group| group.map_or("", |m| m.as_str()))
                .collect();

            Some(RuleMatch {
                pattern: &rule.pattern,
                value: &rule.value,
                captures,
            })
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledRule<V>> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Build the anchored regex source for a declared pattern.
fn anchored_source(pattern: &str) -> String {
    let body = pattern.strip_prefix('^').unwrap_or(pattern);
    let body = body.strip_prefix('/').unwrap_or(body);
    let body = match body.strip_suffix('$') {
        Some(stripped) if !stripped.ends_with('\\') => stripped,
        _ => body,
    };
    format!("^/{}($|\\?)", body)
}
