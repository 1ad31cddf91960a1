//! Path templates and their compiled matchers.
//!
//! A template is a path that may contain `{name}` placeholders, each
//! matching exactly one non-empty path segment:
//!
//! ```text
//! /items/{itemId}   ->   ^/items/(?P<itemId>[^/]+)$
//! ```
//!
//! Templates without placeholders are literal and match by string
//! equality. Compiled regexes are shared through a [`PatternCache`] keyed
//! by template text, so routes registered for several methods on the same
//! template compile it once.

use std::collections::HashMap;
use std::sync::Arc;

use itemgate_core::Params;
use regex::Regex;

use crate::error::{RouterError, RouterResult};

/// Regex fragment matching one path segment.
const SEGMENT: &str = "[^/]+";

/// A parsed path template.
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    Literal,
    Regex {
        regex: Arc<Regex>,
        names: Vec<String>,
    },
}

impl PathPattern {
    /// Parses `template`, compiling it through `cache` if it has
    /// placeholders.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] if the template does not
    /// start with `/`, has unbalanced braces, or declares an empty,
    /// non-identifier or repeated parameter name.
    pub fn parse(template: &str, cache: &mut PatternCache) -> RouterResult<Self> {
        let parsed = parse_template(template)?;
        let matcher = if parsed.names.is_empty() {
            Matcher::Literal
        } else {
            Matcher::Regex {
                regex: cache.get_or_compile(template, &parsed.source)?,
                names: parsed.names,
            }
        };
        Ok(Self {
            template: template.to_string(),
            matcher,
        })
    }

    /// Returns the template text.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns `true` if the template has no placeholders.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(self.matcher, Matcher::Literal)
    }

    /// Returns the placeholder names in template order.
    #[must_use]
    pub fn param_names(&self) -> &[String] {
        match &self.matcher {
            Matcher::Literal => &[],
            Matcher::Regex { names, .. } => names,
        }
    }

    /// Matches `path`, returning the bound parameters.
    ///
    /// Matching is case-sensitive and does not normalize trailing slashes.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<Params> {
        match &self.matcher {
            Matcher::Literal => (path == self.template).then(Params::new),
            Matcher::Regex { regex, names } => {
                let captures = regex.captures(path)?;
                names
                    .iter()
                    .map(|name| {
                        captures
                            .name(name)
                            .map(|m| (name.clone(), m.as_str().to_string()))
                    })
                    .collect::<Option<Vec<_>>>()
                    .map(Params::from_iter)
            }
        }
    }
}

/// Compiled template regexes keyed by template text.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: HashMap<String, Arc<Regex>>,
}

impl PatternCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of compiled templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    /// Returns `true` if nothing has been compiled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    fn get_or_compile(&mut self, template: &str, source: &str) -> RouterResult<Arc<Regex>> {
        if let Some(regex) = self.compiled.get(template) {
            return Ok(Arc::clone(regex));
        }
        let regex = Regex::new(source)
            .map(Arc::new)
            .map_err(|e| RouterError::invalid_pattern(template, e.to_string()))?;
        self.compiled
            .insert(template.to_string(), Arc::clone(&regex));
        Ok(regex)
    }
}

struct ParsedTemplate {
    source: String,
    names: Vec<String>,
}

fn parse_template(template: &str) -> RouterResult<ParsedTemplate> {
    if !template.starts_with('/') {
        return Err(RouterError::invalid_pattern(template, "must start with '/'"));
    }

    let mut source = String::from("^");
    let mut names: Vec<String> = Vec::new();
    let mut rest = template;

    while !rest.is_empty() {
        let Some(open) = rest.find(['{', '}']) else {
            source.push_str(&regex::escape(rest));
            break;
        };
        if rest[open..].starts_with('}') {
            return Err(RouterError::invalid_pattern(template, "unmatched '}'"));
        }
        source.push_str(&regex::escape(&rest[..open]));

        let after = &rest[open + 1..];
        let close = after
            .find(['{', '}'])
            .filter(|&i| after[i..].starts_with('}'))
            .ok_or_else(|| RouterError::invalid_pattern(template, "unclosed '{'"))?;
        let name = &after[..close];

        if !is_identifier(name) {
            return Err(RouterError::invalid_pattern(
                template,
                format!("invalid parameter name '{name}'"),
            ));
        }
        if names.iter().any(|n| n == name) {
            return Err(RouterError::invalid_pattern(
                template,
                format!("repeated parameter name '{name}'"),
            ));
        }

        source.push_str(&format!("(?P<{name}>{SEGMENT})"));
        names.push(name.to_string());
        rest = &after[close + 1..];
    }

    source.push('$');
    Ok(ParsedTemplate { source, names })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(template: &str) -> PathPattern {
        PathPattern::parse(template, &mut PatternCache::new()).unwrap()
    }

    #[test]
    fn test_literal_pattern() {
        let p = pattern("/items");
        assert!(p.is_literal());
        assert!(p.match_path("/items").is_some());
        assert!(p.match_path("/items/").is_none());
        assert!(p.match_path("/Items").is_none());
    }

    #[test]
    fn test_parameter_binds_segment() {
        let p = pattern("/items/{itemId}");
        assert!(!p.is_literal());
        assert_eq!(p.param_names(), ["itemId".to_string()]);

        let params = p.match_path("/items/abc-123").unwrap();
        assert_eq!(params.get("itemId"), Some("abc-123"));
    }

    #[test]
    fn test_parameter_requires_one_non_empty_segment() {
        let p = pattern("/items/{itemId}");
        assert!(p.match_path("/items/").is_none());
        assert!(p.match_path("/items").is_none());
        assert!(p.match_path("/items/a/b").is_none());
        assert!(p.match_path("/other/a").is_none());
    }

    #[test]
    fn test_multiple_parameters() {
        let p = pattern("/orgs/{orgId}/items/{itemId}");
        let params = p.match_path("/orgs/acme/items/7").unwrap();
        assert_eq!(params.get("orgId"), Some("acme"));
        assert_eq!(params.get("itemId"), Some("7"));
    }

    #[test]
    fn test_literal_text_is_escaped() {
        let p = pattern("/v1.0/items/{itemId}");
        assert!(p.match_path("/v1.0/items/a").is_some());
        assert!(p.match_path("/v1x0/items/a").is_none());
    }

    #[test]
    fn test_invalid_templates() {
        let mut cache = PatternCache::new();
        for template in [
            "items",
            "/items/{",
            "/items/}",
            "/items/{}",
            "/items/{item-id}",
            "/items/{1st}",
            "/items/{a{b}}",
            "/a/{id}/b/{id}",
        ] {
            let err = PathPattern::parse(template, &mut cache).unwrap_err();
            assert!(
                matches!(err, RouterError::InvalidPattern { .. }),
                "{template} should be rejected"
            );
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_shares_compiled_regex() {
        let mut cache = PatternCache::new();
        let a = PathPattern::parse("/items/{itemId}", &mut cache).unwrap();
        let b = PathPattern::parse("/items/{itemId}", &mut cache).unwrap();
        PathPattern::parse("/items", &mut cache).unwrap();
        assert_eq!(cache.len(), 1);

        match (&a.matcher, &b.matcher) {
            (Matcher::Regex { regex: ra, .. }, Matcher::Regex { regex: rb, .. }) => {
                assert!(Arc::ptr_eq(ra, rb));
            }
            _ => panic!("expected compiled matchers"),
        }
    }
}
