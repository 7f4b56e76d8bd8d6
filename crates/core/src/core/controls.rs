//! Small UI helpers: visibility toggles, the sample slider and panel states.

use serde::{Deserialize, Serialize};

/// CSS `display` of a toggled element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    #[default]
    Block,
    None,
}

impl DisplayMode {
    pub fn css(self) -> &'static str {
        match self {
            DisplayMode::Block => "block",
            DisplayMode::None => "none",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            DisplayMode::Block => DisplayMode::None,
            DisplayMode::None => DisplayMode::Block,
        }
    }

    pub fn is_visible(self) -> bool {
        self == DisplayMode::Block
    }
}

/// Visibility of the result panel, the log panel and the "computing" indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelVisibility {
    pub result: DisplayMode,
    pub log: DisplayMode,
    pub computing: DisplayMode,
}

impl PanelVisibility {
    /// Page load: nothing shown yet.
    pub fn idle() -> Self {
        Self {
            result: DisplayMode::None,
            log: DisplayMode::None,
            computing: DisplayMode::None,
        }
    }

    /// Request in flight.
    pub fn computing() -> Self {
        Self {
            result: DisplayMode::None,
            log: DisplayMode::None,
            computing: DisplayMode::Block,
        }
    }

    /// First chart of a result set is ready.
    pub fn ready() -> Self {
        Self {
            result: DisplayMode::Block,
            log: DisplayMode::Block,
            computing: DisplayMode::None,
        }
    }

    /// Request failed: put the page back the way it was before submitting.
    pub fn failed(before: Self) -> Self {
        Self {
            computing: DisplayMode::None,
            ..before
        }
    }
}

impl Default for PanelVisibility {
    fn default() -> Self {
        Self::idle()
    }
}

/// Leading-integer parse: optional sign, then digits; the rest is ignored.
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (neg, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let n: i64 = digits[..end].parse().ok()?;
    Some(if neg { -n } else { n })
}

/// The sample-count range input and its mirrored label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderState {
    pub min: i64,
    pub max: i64,
    pub value: i64,
}

impl SliderState {
    pub fn new(min: i64, max: i64, value: i64) -> Self {
        let max = max.max(min);
        Self {
            min,
            max,
            value: value.clamp(min, max),
        }
    }

    /// Text shown in the label next to the slider.
    pub fn label(&self) -> String {
        self.value.to_string()
    }

    /// Input event. Returns false (and keeps the value) when `raw` is not a number.
    pub fn on_input(&mut self, raw: &str) -> bool {
        match parse_int_prefix(raw) {
            Some(v) => {
                self.value = v.clamp(self.min, self.max);
                true
            }
            None => false,
        }
    }

    /// Base radio changed to `raw`: range becomes `[min, 2v]`, value becomes `v`.
    pub fn apply_base(&mut self, raw: &str) -> bool {
        let Some(v) = parse_int_prefix(raw) else {
            return false;
        };
        self.max = v.saturating_mul(2).max(self.min);
        self.value = v.clamp(self.min, self.max);
        true
    }
}

impl Default for SliderState {
    fn default() -> Self {
        Self::new(0, 2000, 1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_between_block_and_none() {
        assert_eq!(DisplayMode::None.toggle().css(), "block");
        assert_eq!(DisplayMode::Block.toggle().css(), "none");
        assert_eq!(DisplayMode::Block.toggle().toggle(), DisplayMode::Block);
        assert!(!DisplayMode::None.is_visible());
    }

    #[test]
    fn panel_states_follow_the_request_lifecycle() {
        let idle = PanelVisibility::idle();
        assert!(!idle.result.is_visible());
        assert!(!idle.log.is_visible() && !idle.computing.is_visible());

        let busy = PanelVisibility::computing();
        assert!(busy.computing.is_visible());
        assert!(!busy.result.is_visible() && !busy.log.is_visible());

        let ready = PanelVisibility::ready();
        assert!(ready.result.is_visible() && ready.log.is_visible());
        assert!(!ready.computing.is_visible());

        assert_eq!(PanelVisibility::failed(busy), PanelVisibility::idle());
    }

    #[test]
    fn parse_int_prefix_reads_leading_digits() {
        assert_eq!(parse_int_prefix("1000"), Some(1000));
        assert_eq!(parse_int_prefix(" 250 samples"), Some(250));
        assert_eq!(parse_int_prefix("-3"), Some(-3));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix(""), None);
    }

    #[test]
    fn base_change_doubles_the_maximum_and_resets_the_value() {
        let mut s = SliderState::default();
        assert!(s.apply_base("5000"));
        assert_eq!((s.max, s.value), (10_000, 5000));
        assert_eq!(s.label(), "5000");

        assert!(!s.apply_base("lots"));
        assert_eq!((s.max, s.value), (10_000, 5000));
    }

    #[test]
    fn input_is_mirrored_and_clamped() {
        let mut s = SliderState::new(0, 100, 50);
        assert!(s.on_input("75"));
        assert_eq!(s.label(), "75");
        assert!(s.on_input("900"));
        assert_eq!(s.label(), "100");
        assert!(!s.on_input(""));
        assert_eq!(s.value, 100);
    }
}
