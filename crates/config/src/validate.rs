//! Configuration validation.
//!
//! Walks the loaded config tree for unknown (usually misspelled) fields, then
//! runs semantic checks on the typed config.

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use crate::schema::{PalaverConfig, StoreBackend};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. `routing.default_ttl_secs`. Empty for whole-file problems.
    pub path: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.severity, self.message)
        } else {
            write!(f, "{}: {}: {}", self.severity, self.path, self.message)
        }
    }
}

/// Result of validating a configuration file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

enum KnownKeys {
    Struct(HashMap<&'static str, KnownKeys>),
    Leaf,
}

fn build_schema_map() -> KnownKeys {
    use KnownKeys::{Leaf, Struct};

    Struct(HashMap::from([
        (
            "bot",
            Struct(HashMap::from([("user_id", Leaf), ("team_id", Leaf)])),
        ),
        (
            "routing",
            Struct(HashMap::from([
                ("default_ttl_secs", Leaf),
                ("literal_case_sensitive", Leaf),
            ])),
        ),
        (
            "ambient",
            Struct(HashMap::from([
                ("enabled", Leaf),
                ("reply_probability", Leaf),
            ])),
        ),
        (
            "store",
            Struct(HashMap::from([
                ("backend", Leaf),
                ("database_url", Leaf),
                ("sweep_interval_secs", Leaf),
            ])),
        ),
    ]))
}

/// Levenshtein edit distance, used for "did you mean" hints.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

fn suggest<'a>(needle: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (*c, levenshtein(needle, c)))
        .filter(|(_, d)| *d > 0 && *d <= 3)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}

/// Validate a config file at the given path, or the discovered one if `path` is `None`.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = path
        .map(Path::to_path_buf)
        .or_else(crate::loader::find_config_file);

    let Some(actual_path) = config_path else {
        return ValidationResult {
            diagnostics: vec![Diagnostic {
                severity: Severity::Info,
                path: String::new(),
                message: "no config file found; using defaults".into(),
            }],
            config_path: None,
        };
    };

    let mut result = match crate::loader::load_config_value(&actual_path) {
        Ok(value) => validate_value(&value),
        Err(e) => ValidationResult {
            diagnostics: vec![Diagnostic {
                severity: Severity::Error,
                path: String::new(),
                message: format!("failed to parse config file: {e}"),
            }],
            config_path: None,
        },
    };
    result.config_path = Some(actual_path);
    result
}

/// Validate an already-parsed config tree.
#[must_use]
pub fn validate_value(value: &serde_json::Value) -> ValidationResult {
    let mut diagnostics = Vec::new();

    check_unknown_fields(value, &build_schema_map(), "", &mut diagnostics);

    match serde_json::from_value::<PalaverConfig>(value.clone()) {
        Ok(config) => check_semantics(&config, &mut diagnostics),
        Err(e) => diagnostics.push(Diagnostic {
            severity: Severity::Error,
            path: String::new(),
            message: format!("type error: {e}"),
        }),
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

fn check_unknown_fields(
    value: &serde_json::Value,
    schema: &KnownKeys,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let (serde_json::Value::Object(map), KnownKeys::Struct(fields)) = (value, schema) else {
        return;
    };
    let known: Vec<&str> = fields.keys().copied().collect();
    for (key, child) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match fields.get(key.as_str()) {
            Some(child_schema) => check_unknown_fields(child, child_schema, &path, diagnostics),
            None => {
                let message = match suggest(key, &known) {
                    Some(s) => format!("unknown field (did you mean \"{s}\"?)"),
                    None => "unknown field".into(),
                };
                diagnostics.push(Diagnostic {
                    severity: Severity::Error,
                    path,
                    message,
                });
            },
        }
    }
}

fn check_semantics(config: &PalaverConfig, diagnostics: &mut Vec<Diagnostic>) {
    if config.routing.default_ttl_secs == 0 {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            path: "routing.default_ttl_secs".into(),
            message: "must be greater than zero; a zero TTL expires every route immediately"
                .into(),
        });
    }

    let p = config.ambient.reply_probability;
    if !(0.0..=1.0).contains(&p) {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            path: "ambient.reply_probability".into(),
            message: format!("must be between 0 and 1, got {p}"),
        });
    }

    if config.store.backend == StoreBackend::Sqlite && config.store.database_url.trim().is_empty() {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            path: "store.database_url".into(),
            message: "required when store.backend = \"sqlite\"".into(),
        });
    }

    if config
        .bot
        .user_id
        .as_deref()
        .is_none_or(|id| id.trim().is_empty())
    {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            path: "bot.user_id".into(),
            message: "not set; @-mentions of the bot cannot be detected".into(),
        });
    }
}
