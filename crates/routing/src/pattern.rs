use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::Result;

/// What a trigger listens for.
#[derive(Clone)]
pub enum Pattern {
    /// Matches when the whole message equals `text`.
    Literal {
        text: String,
        case_sensitive: bool,
        /// Lowercased `text`, precomputed for case-insensitive comparison.
        folded: String,
    },
    /// Matches when the regex matches anywhere in the message. Anchor the
    /// expression (`^...$`) to require a full-text match.
    Regex(Regex),
}

/// Capture groups from a successful match. Group 0 is the matched text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub groups: Vec<Option<String>>,
}

impl PatternMatch {
    /// The full matched text.
    #[must_use]
    pub fn matched(&self) -> &str {
        self.group(0).unwrap_or_default()
    }

    #[must_use]
    pub fn group(&self, i: usize) -> Option<&str> {
        self.groups.get(i).and_then(|g| g.as_deref())
    }
}

impl Pattern {
    pub fn literal(text: impl Into<String>, case_sensitive: bool) -> Self {
        let text = text.into();
        Self::Literal {
            folded: text.to_lowercase(),
            text,
            case_sensitive,
        }
    }

    pub fn regex(pattern: &str) -> Result<Self> {
        Ok(Self::Regex(Regex::new(pattern)?))
    }

    /// Regex compiled with the `i` flag, like `/pattern/i`.
    pub fn regex_ignore_case(pattern: &str) -> Result<Self> {
        Ok(Self::Regex(
            RegexBuilder::new(pattern).case_insensitive(true).build()?,
        ))
    }

    /// Test `text` against this pattern.
    #[must_use]
    pub fn find(&self, text: &str) -> Option<PatternMatch> {
        match self {
            Self::Literal {
                text: literal,
                case_sensitive,
                folded,
            } => {
                let hit = if *case_sensitive {
                    text == literal
                } else {
                    text.to_lowercase() == *folded
                };
                hit.then(|| PatternMatch {
                    groups: vec![Some(text.to_string())],
                })
            },
            Self::Regex(re) => re.captures(text).map(|caps| PatternMatch {
                groups: caps
                    .iter()
                    .map(|g| g.map(|m| m.as_str().to_string()))
                    .collect(),
            }),
        }
    }

    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Regex(re) => re.is_match(text),
            Self::Literal { .. } => self.find(text).is_some(),
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal {
                text,
                case_sensitive,
                ..
            } => f
                .debug_struct("Literal")
                .field("text", text)
                .field("case_sensitive", case_sensitive)
                .finish(),
            Self::Regex(re) => f.debug_tuple("Regex").field(&re.as_str()).finish(),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("help", true)]
    #[case("HELP", true)]
    #[case("Help", true)]
    #[case("help me", false)]
    #[case(" help", false)]
    #[case("", false)]
    fn case_insensitive_literal(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(Pattern::literal("help", false).is_match(text), expected);
    }

    #[test]
    fn case_sensitive_literal() {
        let p = Pattern::literal("attachment", true);
        assert!(p.is_match("attachment"));
        assert!(!p.is_match("Attachment"));
    }

    #[test]
    fn regex_matches_substrings() {
        let p = Pattern::regex("color").unwrap();
        assert!(p.is_match("my favourite color is blue"));
    }

    #[test]
    fn anchored_regex_requires_full_text() {
        let p = Pattern::regex("^(hi|hello|hey)$").unwrap();
        assert!(p.is_match("hello"));
        assert!(!p.is_match("hello there"));
        assert_eq!(p.find("hey").unwrap().group(1), Some("hey"));
    }

    #[test]
    fn plain_regex_is_case_sensitive() {
        let sensitive = Pattern::regex("^(hi|hello|hey)$").unwrap();
        assert!(!sensitive.is_match("Hi"));

        let folded = Pattern::regex_ignore_case("^(hi|hello|hey)$").unwrap();
        assert_eq!(folded.find("Hi").unwrap().group(1), Some("Hi"));
        assert!(!folded.is_match("Hi there"));
    }

    #[test]
    fn ignore_case_regex_matches_shouting() {
        let p = Pattern::regex_ignore_case("^(thanks|thank you)").unwrap();
        let m = p.find("THANK YOU!").unwrap();
        assert_eq!(m.matched(), "THANK YOU");
        assert_eq!(m.group(1), Some("THANK YOU"));
        assert!(!p.is_match("no thanks"));
    }

    #[test]
    fn literal_match_reports_original_text() {
        let m = Pattern::literal("help", false).find("HeLp").unwrap();
        assert_eq!(m.matched(), "HeLp");
        assert_eq!(m.group(1), None);
    }

    #[test]
    fn invalid_regex_is_an_error() {
        assert!(Pattern::regex("(unclosed").is_err());
    }
}
