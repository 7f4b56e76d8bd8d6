//! Chart specification, transitions and frame layout.
//!
//! [`ChartSpec`] is the renderer-independent description of one chart (kind,
//! title, options, data). A [`Transition`] animates from whatever was drawn
//! before to the new spec, and [`Transition::frame`] lays one animation frame
//! out in pixel coordinates so a surface only has to paint rectangles, lines
//! and text.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response::{DistributionTable, QueryEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    Column,
    Line,
}

impl ChartKind {
    /// Kind chosen for a table: line over a numeric domain, columns otherwise.
    pub fn for_table(table: &DistributionTable) -> Self {
        if table.has_numeric_domain() {
            ChartKind::Line
        } else {
            ChartKind::Column
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Column => "ColumnChart",
            ChartKind::Line => "LineChart",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    In,
    Out,
    InAndOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::In => t * t,
            Easing::Out => t * (2.0 - t),
            Easing::InAndOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }
}

/// Chart options shared by every chart of the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    /// Value axis range. Data outside the range extend it; it never shrinks.
    pub axis_min: f64,
    pub axis_max: f64,
    pub animation_ms: u32,
    pub easing: Easing,
    /// Animate the very first draw from the baseline.
    pub animate_on_startup: bool,
    pub title_font_px: u32,
    pub show_legend: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
            axis_min: 0.0,
            axis_max: 100.0,
            animation_ms: 1000,
            easing: Easing::Linear,
            animate_on_startup: true,
            title_font_px: 15,
            show_legend: false,
        }
    }
}

pub fn chart_title(title: &str, samples: impl Display) -> String {
    format!("{title} w/ {samples} samples")
}

/// Display text of a table cell.
pub fn cell_label(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Plotted value of a table cell. Non-numeric cells plot as zero.
pub fn cell_value(v: &Value) -> f64 {
    v.as_f64().filter(|x| x.is_finite()).unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub table: DistributionTable,
    pub config: ChartConfig,
}

impl ChartSpec {
    pub fn new(
        samples: impl Display,
        title: &str,
        table: Option<&DistributionTable>,
        config: &ChartConfig,
    ) -> Self {
        let table = table.cloned().unwrap_or_default();
        Self {
            kind: ChartKind::for_table(&table),
            title: chart_title(title, samples),
            table,
            config: config.clone(),
        }
    }

    pub fn for_entry(entry: &QueryEntry, config: &ChartConfig) -> Self {
        Self::new(entry.samples_label(), &entry.title, Some(&entry.distribution), config)
    }

    pub fn series_names(&self) -> Vec<String> {
        let n = self.table.series_count();
        let header = self.table.header().unwrap_or(&[]);
        (0..n)
            .map(|j| header.get(j + 1).map(cell_label).unwrap_or_default())
            .collect()
    }

    /// Domain column labels, one per data row.
    pub fn categories(&self) -> Vec<String> {
        self.table
            .data_rows()
            .iter()
            .map(|row| row.first().map(cell_label).unwrap_or_default())
            .collect()
    }

    /// Numeric domain values; rows without a number fall back to their index.
    pub fn domain_values(&self) -> Vec<f64> {
        self.table
            .data_rows()
            .iter()
            .enumerate()
            .map(|(i, row)| row.first().and_then(Value::as_f64).unwrap_or(i as f64))
            .collect()
    }

    /// `series[j][i]` is the value of series `j` at data row `i`.
    pub fn series(&self) -> Vec<Vec<f64>> {
        let n = self.table.series_count();
        let rows = self.table.data_rows();
        (0..n)
            .map(|j| {
                rows.iter()
                    .map(|row| row.get(j + 1).map(cell_value).unwrap_or(0.0))
                    .collect()
            })
            .collect()
    }

    pub fn value_range(&self) -> (f64, f64) {
        let mut lo = self.config.axis_min;
        let mut hi = self.config.axis_max;
        for v in self.series().iter().flatten() {
            lo = lo.min(*v);
            hi = hi.max(*v);
        }
        if hi <= lo {
            hi = lo + 1.0;
        }
        (lo, hi)
    }

    fn baseline(&self) -> f64 {
        let (lo, hi) = self.value_range();
        0.0f64.clamp(lo, hi)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub label: String,
    /// Pixel coordinate along the tick's axis.
    pub pos: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub rect: Rect,
    pub series: usize,
    pub category: usize,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyline {
    pub series: usize,
    pub points: Vec<(f64, f64)>,
}

/// One laid-out animation frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartFrame {
    pub kind: ChartKind,
    pub width: f64,
    pub height: f64,
    pub title: String,
    pub title_font_px: f64,
    pub plot: Rect,
    pub y_ticks: Vec<Tick>,
    pub x_ticks: Vec<Tick>,
    pub bars: Vec<Bar>,
    pub lines: Vec<Polyline>,
    pub legend: Option<Vec<String>>,
}

const MARGIN_LEFT: f64 = 56.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 44.0;
const MARGIN_BOTTOM: f64 = 44.0;
const Y_TICKS: usize = 5;
const GROUP_FILL: f64 = 0.618;

/// Axis label for a value, at most `max_decimals` places, trailing zeros trimmed.
///
/// Goes through integer arithmetic instead of float `format!`.
pub fn format_axis_value(v: f64, max_decimals: u32) -> String {
    if !v.is_finite() {
        return if v.is_nan() { "NaN" } else if v > 0.0 { "Inf" } else { "-Inf" }.to_string();
    }
    let scale = 10_i64.pow(max_decimals.min(9));
    let scaled = (v * scale as f64).round();
    if scaled.abs() >= i64::MAX as f64 {
        return if v < 0.0 { "-Inf" } else { "Inf" }.to_string();
    }
    let scaled = scaled as i64;
    let neg = scaled < 0;
    let abs = scaled.unsigned_abs();
    let int_part = abs / scale as u64;
    let mut frac = abs % scale as u64;
    let mut digits = max_decimals.min(9) as usize;
    while digits > 0 && frac % 10 == 0 {
        frac /= 10;
        digits -= 1;
    }

    let mut out = String::new();
    if neg {
        out.push('-');
    }
    out.push_str(&int_part.to_string());
    if digits > 0 {
        let f = frac.to_string();
        out.push('.');
        for _ in f.len()..digits {
            out.push('0');
        }
        out.push_str(&f);
    }
    out
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Animation from the previously drawn chart (if any) to a new spec.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    spec: ChartSpec,
    from: Vec<Vec<f64>>,
    to: Vec<Vec<f64>>,
    duration_ms: f64,
}

impl Transition {
    /// Animate from `previous` when it has the same kind and shape, else from the baseline.
    pub fn new(previous: Option<&ChartSpec>, spec: ChartSpec) -> Self {
        let to = spec.series();
        let compatible = previous
            .filter(|p| p.kind == spec.kind)
            .map(ChartSpec::series)
            .filter(|prev| {
                prev.len() == to.len() && prev.iter().zip(&to).all(|(a, b)| a.len() == b.len())
            });

        let animate = previous.is_some() || spec.config.animate_on_startup;
        let from = match compatible {
            Some(prev) => prev,
            None => {
                let base = spec.baseline();
                to.iter().map(|s| vec![base; s.len()]).collect()
            }
        };

        Self {
            duration_ms: if animate {
                spec.config.animation_ms as f64
            } else {
                0.0
            },
            spec,
            from,
            to,
        }
    }

    pub fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    pub fn into_spec(self) -> ChartSpec {
        self.spec
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn progress_at(&self, elapsed_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, elapsed_ms: f64) -> bool {
        self.progress_at(elapsed_ms) >= 1.0
    }

    /// Series values at `progress` (0 = start, 1 = final data).
    pub fn values_at(&self, progress: f64) -> Vec<Vec<f64>> {
        let t = self.spec.config.easing.apply(progress);
        self.from
            .iter()
            .zip(&self.to)
            .map(|(a, b)| a.iter().zip(b).map(|(x, y)| lerp(*x, *y, t)).collect())
            .collect()
    }

    /// Lay out the frame at `progress`.
    pub fn frame(&self, progress: f64) -> ChartFrame {
        let spec = &self.spec;
        let cfg = &spec.config;
        let width = cfg.width as f64;
        let height = cfg.height as f64;
        let plot = Rect {
            x: MARGIN_LEFT,
            y: MARGIN_TOP,
            w: (width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0),
            h: (height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
        };

        let (lo, hi) = spec.value_range();
        let to_y = |v: f64| plot.y + plot.h * (1.0 - (v - lo) / (hi - lo));

        let y_ticks = (0..=Y_TICKS)
            .map(|k| {
                let v = lo + (hi - lo) * (k as f64) / (Y_TICKS as f64);
                Tick {
                    label: format_axis_value(v, 2),
                    pos: to_y(v),
                }
            })
            .collect();

        let values = self.values_at(progress);
        let mut frame = ChartFrame {
            kind: spec.kind,
            width,
            height,
            title: spec.title.clone(),
            title_font_px: cfg.title_font_px as f64,
            plot,
            y_ticks,
            x_ticks: Vec::new(),
            bars: Vec::new(),
            lines: Vec::new(),
            legend: cfg.show_legend.then(|| spec.series_names()),
        };

        match spec.kind {
            ChartKind::Column => self.layout_columns(&mut frame, &values, to_y),
            ChartKind::Line => self.layout_lines(&mut frame, &values, to_y),
        }
        frame
    }

    fn layout_columns(
        &self,
        frame: &mut ChartFrame,
        values: &[Vec<f64>],
        to_y: impl Fn(f64) -> f64,
    ) {
        let categories = self.spec.categories();
        let n = categories.len();
        if n == 0 {
            return;
        }
        let plot = frame.plot;
        let group_w = plot.w / n as f64;
        let fill_w = group_w * GROUP_FILL;
        let series_n = values.len().max(1);
        let bar_w = fill_w / series_n as f64;
        let y0 = to_y(self.spec.baseline());

        for (i, label) in categories.into_iter().enumerate() {
            let gx = plot.x + group_w * i as f64;
            frame.x_ticks.push(Tick {
                label,
                pos: gx + group_w / 2.0,
            });
            for (j, series) in values.iter().enumerate() {
                let v = series.get(i).copied().unwrap_or(0.0);
                let yv = to_y(v);
                frame.bars.push(Bar {
                    rect: Rect {
                        x: gx + (group_w - fill_w) / 2.0 + bar_w * j as f64,
                        y: yv.min(y0),
                        w: bar_w,
                        h: (yv - y0).abs(),
                    },
                    series: j,
                    category: i,
                    value: v,
                });
            }
        }
    }

    fn layout_lines(&self, frame: &mut ChartFrame, values: &[Vec<f64>], to_y: impl Fn(f64) -> f64) {
        let xs = self.spec.domain_values();
        if xs.is_empty() {
            return;
        }
        let plot = frame.plot;
        let mut x_lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let mut x_hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if x_hi <= x_lo {
            x_lo -= 1.0;
            x_hi += 1.0;
        }
        let to_x = |x: f64| plot.x + plot.w * (x - x_lo) / (x_hi - x_lo);

        frame.x_ticks = (0..=Y_TICKS)
            .map(|k| {
                let x = x_lo + (x_hi - x_lo) * (k as f64) / (Y_TICKS as f64);
                Tick {
                    label: format_axis_value(x, 2),
                    pos: to_x(x),
                }
            })
            .collect();

        frame.lines = values
            .iter()
            .enumerate()
            .map(|(j, series)| Polyline {
                series: j,
                points: xs
                    .iter()
                    .zip(series)
                    .map(|(x, v)| (to_x(*x), to_y(*v)))
                    .collect(),
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(rows: Value) -> DistributionTable {
        serde_json::from_value(rows).expect("table")
    }

    fn categorical() -> DistributionTable {
        table(json!([["A", "p"], ["true", 60], ["false", 40]]))
    }

    fn numeric() -> DistributionTable {
        table(json!([["x", "density"], [0.0, 10], [0.5, 30], [1.0, 20]]))
    }

    #[test]
    fn kind_follows_first_data_cell() {
        assert_eq!(ChartKind::for_table(&categorical()), ChartKind::Column);
        assert_eq!(ChartKind::for_table(&numeric()), ChartKind::Line);
        assert_eq!(ChartKind::for_table(&DistributionTable::default()), ChartKind::Column);
        assert_eq!(ChartKind::Line.label(), "LineChart");
    }

    #[test]
    fn spec_carries_title_and_fixed_options() {
        let spec = ChartSpec::new(100, "P(A)", Some(&categorical()), &ChartConfig::default());
        assert_eq!(spec.title, "P(A) w/ 100 samples");
        assert_eq!(spec.kind, ChartKind::Column);
        assert_eq!((spec.config.width, spec.config.height), (600, 400));
        assert_eq!(spec.config.animation_ms, 1000);
        assert_eq!(spec.config.easing, Easing::Linear);
        assert!(!spec.config.show_legend);
        assert_eq!(spec.value_range(), (0.0, 100.0));
    }

    #[test]
    fn float_sample_count_titles_like_an_integer() {
        let body = r#"[{"r":{"samples":1e3,"queries":{"q":{"query":"P(A)"}}}}, ""]"#;
        let results = crate::response::parse_response(body).expect("ok").results;
        let entry = results.entry(0).expect("entry 0");
        let spec = ChartSpec::for_entry(entry, &ChartConfig::default());
        assert_eq!(spec.title, "P(A) w/ 1000 samples");
    }

    #[test]
    fn missing_table_draws_an_empty_chart() {
        let spec = ChartSpec::new(5, "Q", None, &ChartConfig::default());
        let frame = Transition::new(None, spec).frame(1.0);
        assert!(frame.bars.is_empty());
        assert!(frame.lines.is_empty());
        assert_eq!(frame.title, "Q w/ 5 samples");
        assert_eq!(frame.y_ticks.len(), Y_TICKS + 1);
    }

    #[test]
    fn axis_extends_but_never_shrinks() {
        let t = table(json!([["k", "v"], ["a", 250], ["b", -5]]));
        let spec = ChartSpec::new(1, "Q", Some(&t), &ChartConfig::default());
        assert_eq!(spec.value_range(), (-5.0, 250.0));
    }

    #[test]
    fn column_layout_grows_from_baseline() {
        let spec = ChartSpec::new(100, "P(A)", Some(&categorical()), &ChartConfig::default());
        let tr = Transition::new(None, spec);

        let start = tr.frame(0.0);
        assert_eq!(start.bars.len(), 2);
        assert!(start.bars.iter().all(|b| b.rect.h.abs() < 1e-9));

        let end = tr.frame(1.0);
        let plot_h = end.plot.h;
        assert!((end.bars[0].rect.h - plot_h * 0.6).abs() < 1e-6);
        assert!((end.bars[1].rect.h - plot_h * 0.4).abs() < 1e-6);
        // Bars sit on the baseline at the bottom of the plot.
        let bottom = end.plot.y + end.plot.h;
        assert!((end.bars[0].rect.y + end.bars[0].rect.h - bottom).abs() < 1e-6);

        let labels: Vec<_> = end.x_ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["true", "false"]);

        let half = tr.frame(0.5);
        assert!((half.bars[0].value - 30.0).abs() < 1e-9);
    }

    #[test]
    fn line_layout_spans_the_domain() {
        let spec = ChartSpec::new(10, "X", Some(&numeric()), &ChartConfig::default());
        let frame = Transition::new(None, spec).frame(1.0);
        assert_eq!(frame.lines.len(), 1);
        let pts = &frame.lines[0].points;
        assert_eq!(pts.len(), 3);
        assert!((pts[0].0 - frame.plot.x).abs() < 1e-9);
        assert!((pts[2].0 - (frame.plot.x + frame.plot.w)).abs() < 1e-9);
        assert_eq!(frame.x_ticks.first().map(|t| t.label.as_str()), Some("0"));
        assert_eq!(frame.x_ticks.last().map(|t| t.label.as_str()), Some("1"));
    }

    #[test]
    fn transition_reuses_previous_values_when_shape_matches() {
        let cfg = ChartConfig::default();
        let first = ChartSpec::new(1, "A", Some(&categorical()), &cfg);
        let second_table = table(json!([["A", "p"], ["true", 20], ["false", 80]]));
        let second = ChartSpec::new(1, "B", Some(&second_table), &cfg);

        let tr = Transition::new(Some(&first), second);
        assert_eq!(tr.values_at(0.0), vec![vec![60.0, 40.0]]);
        assert_eq!(tr.values_at(1.0), vec![vec![20.0, 80.0]]);

        // Different kind: start from the baseline instead.
        let line = ChartSpec::new(1, "C", Some(&numeric()), &cfg);
        let tr = Transition::new(Some(&first), line);
        assert_eq!(tr.values_at(0.0), vec![vec![0.0, 0.0, 0.0]]);
    }

    #[test]
    fn progress_is_linear_over_the_duration() {
        let spec = ChartSpec::new(1, "A", Some(&categorical()), &ChartConfig::default());
        let tr = Transition::new(None, spec);
        assert_eq!(tr.duration_ms(), 1000.0);
        assert_eq!(tr.progress_at(250.0), 0.25);
        assert!(!tr.is_finished(999.0));
        assert!(tr.is_finished(1000.0));
        assert_eq!(tr.progress_at(5000.0), 1.0);
    }

    #[test]
    fn startup_animation_can_be_disabled() {
        let cfg = ChartConfig {
            animate_on_startup: false,
            ..ChartConfig::default()
        };
        let spec = ChartSpec::new(1, "A", Some(&categorical()), &cfg);
        let tr = Transition::new(None, spec);
        assert!(tr.is_finished(0.0));
    }

    #[test]
    fn non_numeric_value_cells_plot_as_zero() {
        let t = table(json!([["k", "v"], ["a", "n/a"], ["b", null]]));
        let spec = ChartSpec::new(1, "Q", Some(&t), &ChartConfig::default());
        assert_eq!(spec.series(), vec![vec![0.0, 0.0]]);
    }

    #[test]
    fn axis_values_are_trimmed() {
        assert_eq!(format_axis_value(20.0, 2), "20");
        assert_eq!(format_axis_value(0.5, 2), "0.5");
        assert_eq!(format_axis_value(-1.25, 2), "-1.25");
        assert_eq!(format_axis_value(0.333, 2), "0.33");
        assert_eq!(format_axis_value(f64::NAN, 2), "NaN");
    }

    #[test]
    fn easing_endpoints_are_fixed() {
        for e in [Easing::Linear, Easing::In, Easing::Out, Easing::InAndOut] {
            assert_eq!(e.apply(0.0), 0.0);
            assert_eq!(e.apply(1.0), 1.0);
        }
    }
}
