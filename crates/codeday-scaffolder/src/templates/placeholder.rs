//! `$TOKEN$` substitution over text content
//!
//! Pure string transform: no filesystem access, no reporting. Callers decide
//! what to do with the tokens that had no mapping.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// A maximal run of uppercase letters and underscores between two `$`
fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$([A-Z_]+)\$").expect("token pattern is valid"))
}

/// Token name to replacement text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    entries: BTreeMap<String, String>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.insert(token.into(), value.into());
        self
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    /// Add every entry of `other`, replacing existing tokens
    pub fn extend(&mut self, other: &PlaceholderMap) {
        for (token, value) in &other.entries {
            self.entries.insert(token.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PlaceholderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (token, value) in iter {
            map.insert(token, value);
        }
        map
    }
}

/// Result of substituting one piece of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub text: String,
    /// Tokens that matched the pattern, in order of appearance (with repeats)
    pub replaced: Vec<String>,
    /// Tokens without a mapping; each occurrence was replaced by ""
    pub missing: Vec<String>,
}

/// Replace every `$TOKEN$` in `content`.
///
/// Replacement text is inserted verbatim and never rescanned.
pub fn substitute(content: &str, placeholders: &PlaceholderMap) -> Substitution {
    let mut replaced = Vec::new();
    let mut missing = Vec::new();

    let text = token_pattern().replace_all(content, |caps: &Captures<'_>| {
        let token = &caps[1];
        match placeholders.get(token) {
            Some(value) => {
                replaced.push(token.to_string());
                value.to_string()
            }
            None => {
                missing.push(token.to_string());
                String::new()
            }
        }
    });

    Substitution {
        text: text.into_owned(),
        replaced,
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> PlaceholderMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_known_and_unknown_tokens() {
        let result = substitute("$KNOWN$text$UNKNOWN$", &map(&[("KNOWN", "X")]));
        assert_eq!(result.text, "Xtext");
        assert_eq!(result.replaced, vec!["KNOWN"]);
        assert_eq!(result.missing, vec!["UNKNOWN"]);
    }

    #[test]
    fn test_every_occurrence_replaced() {
        let result = substitute(
            "site_name: '$APP_NAME$', url: 'https://$APP_NAME$.codeday.org'",
            &map(&[("APP_NAME", "demo")]),
        );
        assert_eq!(
            result.text,
            "site_name: 'demo', url: 'https://demo.codeday.org'"
        );
        assert_eq!(result.replaced.len(), 2);
    }

    #[test]
    fn test_replacement_is_not_rescanned() {
        let result = substitute("$OUTER$", &map(&[("OUTER", "$INNER$"), ("INNER", "nope")]));
        assert_eq!(result.text, "$INNER$");
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_non_token_dollars_untouched() {
        let source = "canonical={`${DOMAIN}${slug}`} costs $5 and $lower$ or $$";
        let result = substitute(source, &map(&[("DOMAIN", "x")]));
        assert_eq!(result.text, source);
        assert!(result.replaced.is_empty());
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_adjacent_fragment_token() {
        let result = substitute(
            r#"<Theme $THEME_PROPS$brandColor="red">"#,
            &map(&[("THEME_PROPS", r#"analyticsId="abc" "#)]),
        );
        assert_eq!(result.text, r#"<Theme analyticsId="abc" brandColor="red">"#);
    }

    #[test]
    fn test_empty_fragment_token() {
        let result = substitute(
            r#"<Theme $THEME_PROPS$brandColor="red">"#,
            &map(&[("THEME_PROPS", "")]),
        );
        assert_eq!(result.text, r#"<Theme brandColor="red">"#);
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_placeholder_map_extend_overrides() {
        let mut base = map(&[("APP_NAME", "a"), ("THEME_PROPS", "")]);
        base.extend(&map(&[("APP_NAME", "b")]));
        assert_eq!(base.get("APP_NAME"), Some("b"));
        assert_eq!(base.len(), 2);
    }
}
