//! Viewer configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config and a
//! partial file only overrides what it names.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chart::ChartConfig;
use crate::controls::SliderState;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[cfg(feature = "std")]
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("default {field} {value:?} is not one of the configured choices")]
    UnknownDefault { field: &'static str, value: String },
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// DOM element identifiers the controller reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub editor: String,
    pub result_panel: String,
    pub log_panel: String,
    pub computing: String,
    pub log_text: String,
    pub dropdown: String,
    pub chart: String,
    pub slider: String,
    pub slider_label: String,
    pub user_text: String,
    pub snippet_select: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            editor: "textfield".into(),
            result_panel: "viewres".into(),
            log_panel: "viewlog".into(),
            computing: "computing".into(),
            log_text: "logtext".into(),
            dropdown: "choosedata".into(),
            chart: "chartdiv".into(),
            slider: "sampno".into(),
            slider_label: "demo".into(),
            user_text: "usrtext".into(),
            snippet_select: "sel_file".into(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Submission endpoint. Empty posts to the current page.
    pub submit_url: String,
    /// Snippet endpoint. Empty posts to the current page.
    pub snippet_url: String,
    pub ids: ElementIds,
    pub bases: Vec<String>,
    pub engines: Vec<String>,
    pub algorithms: Vec<String>,
    pub default_base: String,
    pub default_engine: String,
    pub default_algorithm: String,
    pub snippets: Vec<String>,
    pub slider_min: i64,
    pub chart: ChartConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            submit_url: String::new(),
            snippet_url: String::new(),
            ids: ElementIds::default(),
            bases: strings(&["1000", "10000", "100000"]),
            engines: strings(&["LWSampler", "MHSampler", "RejectionSampler", "ParticleFilter"]),
            algorithms: strings(&["default", "GenericProposer", "GibbsSampler"]),
            default_base: "1000".into(),
            default_engine: "LWSampler".into(),
            default_algorithm: "default".into(),
            snippets: strings(&["burglary.blog", "hurricane.blog", "poisson.blog", "hmm.dblog"]),
            slider_min: 0,
            chart: ChartConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(&'static str, &[String], &String); 3] = [
            ("base", &self.bases, &self.default_base),
            ("engine", &self.engines, &self.default_engine),
            ("algorithm", &self.algorithms, &self.default_algorithm),
        ];
        for (field, choices, value) in checks {
            if choices.is_empty() {
                return Err(ConfigError::Empty(field));
            }
            if !choices.contains(value) {
                return Err(ConfigError::UnknownDefault {
                    field,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }

    /// Point both endpoints at `url`.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.snippet_url = url.clone();
        self.submit_url = url;
        self
    }

    /// Slider for the default base: range `[slider_min, 2 * base]`, value `base`.
    pub fn initial_slider(&self) -> SliderState {
        let mut slider = SliderState::new(self.slider_min, 2000, 1000);
        slider.apply_base(&self.default_base);
        slider
    }

    #[cfg(feature = "std")]
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Load `path` if it exists, defaults otherwise.
    #[cfg(feature = "std")]
    pub fn load_or_default(path: &std::path::Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// `<config dir>/blogview/config.json`.
    #[cfg(feature = "cli")]
    pub fn default_path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|d| d.join("blogview").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_the_default_config() {
        let cfg = ViewerConfig::from_json("{}").expect("valid");
        assert_eq!(cfg, ViewerConfig::default());
        assert_eq!(cfg.ids.editor, "textfield");
        assert_eq!(cfg.ids.snippet_select, "sel_file");
        assert_eq!(cfg.chart.width, 600);
    }

    #[test]
    fn partial_file_overrides_only_what_it_names() {
        let cfg = ViewerConfig::from_json(
            r#"{"submit_url":"http://localhost:8000/","ids":{"chart":"plot"},"chart":{"animation_ms":250}}"#,
        )
        .expect("valid");
        assert_eq!(cfg.submit_url, "http://localhost:8000/");
        assert_eq!(cfg.ids.chart, "plot");
        assert_eq!(cfg.ids.dropdown, "choosedata");
        assert_eq!(cfg.chart.animation_ms, 250);
        assert_eq!(cfg.chart.height, 400);
    }

    #[test]
    fn default_must_be_one_of_the_choices() {
        let err = ViewerConfig::from_json(r#"{"default_engine":"Gibbs"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDefault { field: "engine", .. }));

        let err = ViewerConfig::from_json(r#"{"algorithms":[]}"#).unwrap_err();
        assert_eq!(err.to_string(), "algorithm must not be empty");
    }

    #[test]
    fn base_url_sets_both_endpoints() {
        let cfg = ViewerConfig::default().with_base_url("http://host/blog");
        assert_eq!(cfg.submit_url, "http://host/blog");
        assert_eq!(cfg.snippet_url, "http://host/blog");
    }

    #[test]
    fn initial_slider_follows_the_default_base() {
        let s = ViewerConfig::default().initial_slider();
        assert_eq!((s.min, s.max, s.value), (0, 2000, 1000));
    }

    #[test]
    fn config_survives_a_json_round_trip() {
        let cfg = ViewerConfig::default().with_base_url("http://x");
        let text = cfg.to_json_pretty().expect("serializes");
        assert_eq!(ViewerConfig::from_json(&text).expect("parses"), cfg);
    }
}
