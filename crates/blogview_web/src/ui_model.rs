//! UI models that should be available on both wasm and native.
//!
//! Keeping these out of the wasm-only `web` module allows us to unit-test the
//! radio inventories, persisted selections and highlight overlay on the host.

use blogview::config::ViewerConfig;
use blogview::controls::SliderState;
use blogview::syntax::{coalesce, tokenize};
use serde::{Deserialize, Serialize};

pub const STORAGE_KEY_SELECTIONS: &str = "blogview.selections.v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioGroup {
    Base,
    Engine,
    Algorithm,
}

impl RadioGroup {
    /// Form field / radio `name` attribute.
    pub fn field(self) -> &'static str {
        match self {
            RadioGroup::Base => blogview::submission::FIELD_BASE,
            RadioGroup::Engine => blogview::submission::FIELD_ENGINE,
            RadioGroup::Algorithm => blogview::submission::FIELD_ALGORITHM,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RadioGroup::Base => "Samples",
            RadioGroup::Engine => "Engine",
            RadioGroup::Algorithm => "Algorithm",
        }
    }

    pub fn all() -> &'static [RadioGroup] {
        &[RadioGroup::Base, RadioGroup::Engine, RadioGroup::Algorithm]
    }

    pub fn choices(self, cfg: &ViewerConfig) -> &[String] {
        match self {
            RadioGroup::Base => &cfg.bases,
            RadioGroup::Engine => &cfg.engines,
            RadioGroup::Algorithm => &cfg.algorithms,
        }
    }

    pub fn default_choice(self, cfg: &ViewerConfig) -> &str {
        match self {
            RadioGroup::Base => &cfg.default_base,
            RadioGroup::Engine => &cfg.default_engine,
            RadioGroup::Algorithm => &cfg.default_algorithm,
        }
    }
}

/// Last radio selections and slider value, kept in localStorage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedSelections {
    pub version: u32,
    pub base: String,
    pub engine: String,
    pub algorithm: String,
    pub samples: i64,
}

impl Default for PersistedSelections {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

impl PersistedSelections {
    pub const VERSION: u32 = 1;

    pub fn from_config(cfg: &ViewerConfig) -> Self {
        Self {
            version: Self::VERSION,
            base: cfg.default_base.clone(),
            engine: cfg.default_engine.clone(),
            algorithm: cfg.default_algorithm.clone(),
            samples: cfg.initial_slider().value,
        }
    }

    pub fn get(&self, group: RadioGroup) -> &str {
        match group {
            RadioGroup::Base => &self.base,
            RadioGroup::Engine => &self.engine,
            RadioGroup::Algorithm => &self.algorithm,
        }
    }

    pub fn set(&mut self, group: RadioGroup, value: impl Into<String>) {
        let value = value.into();
        match group {
            RadioGroup::Base => self.base = value,
            RadioGroup::Engine => self.engine = value,
            RadioGroup::Algorithm => self.algorithm = value,
        }
    }

    /// Replace choices the config no longer offers with the config defaults.
    pub fn sanitize(mut self, cfg: &ViewerConfig) -> Self {
        for &group in RadioGroup::all() {
            if !group.choices(cfg).iter().any(|c| c == self.get(group)) {
                self.set(group, group.default_choice(cfg));
            }
        }
        self.version = Self::VERSION;
        self
    }

    /// Parse stored JSON; anything unreadable or from another version falls back to defaults.
    pub fn from_stored(raw: Option<&str>, cfg: &ViewerConfig) -> Self {
        raw.and_then(|s| serde_json::from_str::<Self>(s).ok())
            .filter(|p| p.version == Self::VERSION)
            .map(|p| p.sanitize(cfg))
            .unwrap_or_else(|| Self::from_config(cfg))
    }

    /// Slider for the stored base with the stored value, clamped to the range.
    pub fn slider(&self, cfg: &ViewerConfig) -> SliderState {
        let mut slider = cfg.initial_slider();
        slider.apply_base(&self.base);
        slider.on_input(&self.samples.to_string());
        slider
    }
}

/// One styled run of text in the highlight overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayPiece {
    pub text: String,
    /// `cm-<style>` class, `None` for plain text.
    pub class: Option<&'static str>,
}

fn css_class(style: &'static str) -> &'static str {
    match style {
        "keyword" => "cm-keyword",
        "tag" => "cm-tag",
        "atom" => "cm-atom",
        _ => "",
    }
}

/// Highlight overlay for the editor text, one entry per line.
pub fn overlay_lines(text: &str) -> Vec<Vec<OverlayPiece>> {
    let lines = text.split('\n').map(|l| l.trim_end_matches('\r'));
    lines
        .zip(tokenize(text))
        .map(|(line, spans)| {
            coalesce(&spans)
                .iter()
                .map(|s| OverlayPiece {
                    text: s.text(line).to_string(),
                    class: s.class.map(|c| css_class(c.style())),
                })
                .collect()
        })
        .collect()
}
