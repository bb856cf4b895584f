use crate::core::candidate::CandidateCache;
use crate::core::search::ranker::{PostFilter, ScoredCandidate, SortBy};
use crate::core::search::scorer::{FuzzyScorer, ScoreStrategy, Scorer};
use crate::ui::placement::Position;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_WAIT_TIME: Duration = Duration::from_millis(150);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read options file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Loosely typed option bag as it arrives from a host or an options file.
/// Every field keeps whatever JSON shape the caller supplied; nothing is
/// rejected here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawOptions {
    pub data: Option<Value>,
    pub max_list_entries: Option<Value>,
    pub case_sensitive: Option<Value>,
    pub use_quicksilver: Option<Value>,
    pub show_all: Option<Value>,
    pub position: Option<Value>,
    pub sort_by: Option<Value>,
    pub wait_time: Option<Value>,
}

impl RawOptions {
    pub fn from_json(value: Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct FilterOptions {
    pub data: Vec<String>,
    pub max_list_entries: Option<usize>,
    pub case_sensitive: bool,
    pub use_quicksilver: bool,
    pub show_all: bool,
    pub position: Position,
    pub sort_by: SortBy,
    pub wait_time: Duration,
    pub post_filter: Option<PostFilter>,
    pub fuzzy_scorer: FuzzyScorer,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            max_list_entries: None,
            case_sensitive: false,
            use_quicksilver: true,
            show_all: false,
            position: Position::Variable,
            sort_by: SortBy::Score,
            wait_time: DEFAULT_WAIT_TIME,
            post_filter: None,
            fuzzy_scorer: FuzzyScorer::default(),
        }
    }
}

impl FilterOptions {
    pub fn new(data: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            data: data.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Resolves a raw option bag over the defaults. Any field that is
    /// missing, of the wrong kind, or out of range takes its default.
    pub fn normalize(raw: RawOptions) -> Self {
        let defaults = Self::default();
        Self {
            data: raw.data.as_ref().and_then(normalize_data).unwrap_or(defaults.data),
            max_list_entries: raw
                .max_list_entries
                .as_ref()
                .and_then(normalize_max_entries)
                .or(defaults.max_list_entries),
            case_sensitive: bool_or(raw.case_sensitive.as_ref(), defaults.case_sensitive),
            use_quicksilver: bool_or(raw.use_quicksilver.as_ref(), defaults.use_quicksilver),
            show_all: bool_or(raw.show_all.as_ref(), defaults.show_all),
            position: raw
                .position
                .as_ref()
                .and_then(|value| enum_choice(value, Position::from_index, Position::from_name))
                .unwrap_or(defaults.position),
            sort_by: raw
                .sort_by
                .as_ref()
                .and_then(|value| enum_choice(value, SortBy::from_index, SortBy::from_name))
                .unwrap_or(defaults.sort_by),
            wait_time: raw
                .wait_time
                .as_ref()
                .and_then(normalize_wait_time)
                .unwrap_or(defaults.wait_time),
            post_filter: None,
            fuzzy_scorer: defaults.fuzzy_scorer,
        }
    }

    pub fn from_json(value: Value) -> Self {
        Self::normalize(RawOptions::from_json(value))
    }

    /// Reads options from a YAML or JSON file. Only unreadable or
    /// syntactically broken files are errors; field values are normalized.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let value: Value = if is_json {
            serde_json::from_str(&text).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        };

        Ok(Self::from_json(value))
    }

    pub fn with_max_list_entries(mut self, max: usize) -> Self {
        self.max_list_entries = (max > 0).then_some(max);
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_quicksilver(mut self, use_quicksilver: bool) -> Self {
        self.use_quicksilver = use_quicksilver;
        self
    }

    pub fn with_show_all(mut self, show_all: bool) -> Self {
        self.show_all = show_all;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn with_wait_time(mut self, wait_time: Duration) -> Self {
        self.wait_time = wait_time;
        self
    }

    pub fn with_post_filter(
        mut self,
        hook: impl Fn(&str, &[ScoredCandidate<'_>]) + Send + Sync + 'static,
    ) -> Self {
        self.post_filter = Some(PostFilter::new(hook));
        self
    }

    pub fn with_fuzzy_scorer(mut self, scorer: impl Scorer + Send + Sync + 'static) -> Self {
        self.fuzzy_scorer = FuzzyScorer::new(scorer);
        self
    }

    pub fn strategy(&self) -> ScoreStrategy {
        ScoreStrategy::from_quicksilver_flag(self.use_quicksilver)
    }

    pub fn build_cache(&self) -> CandidateCache {
        CandidateCache::from_strings(self.data.iter().cloned())
    }
}

fn normalize_data(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    if items.is_empty() {
        return None;
    }
    Some(
        items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect(),
    )
}

fn normalize_max_entries(value: &Value) -> Option<usize> {
    let number = value.as_f64()?;
    if number.is_nan() || number < 1.0 {
        return None;
    }
    Some(number.trunc().min(usize::MAX as f64) as usize)
}

fn normalize_wait_time(value: &Value) -> Option<Duration> {
    let millis = value.as_f64()?;
    if !millis.is_finite() || millis < 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(millis / 1000.0).ok()
}

fn bool_or(value: Option<&Value>, default: bool) -> bool {
    value.and_then(Value::as_bool).unwrap_or(default)
}

fn enum_choice<T>(
    value: &Value,
    from_index: fn(u64) -> Option<T>,
    from_name: fn(&str) -> Option<T>,
) -> Option<T> {
    match value {
        Value::Number(number) => number.as_u64().and_then(from_index),
        Value::String(name) => from_name(name.as_str()),
        _ => None,
    }
}
