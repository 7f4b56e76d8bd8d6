//! The chart handle.
//!
//! [`ChartRenderer`] owns the drawing surface. The surface is bound lazily on
//! the first draw and reused afterwards; every draw re-binds container,
//! options and data and animates from the previous chart.

use std::fmt::Display;

use thiserror::Error;

use crate::chart::{ChartConfig, ChartSpec, Transition};
use crate::response::{DistributionTable, ResultSet};

/// Something that can paint chart transitions into a container.
pub trait ChartSurface: Sized {
    type Error: Display;
    /// Returned by each draw (e.g. ready / animation-finished signals).
    type Handle;

    fn bind(container_id: &str, config: &ChartConfig) -> Result<Self, Self::Error>;

    fn draw(
        &mut self,
        container_id: &str,
        transition: Transition,
    ) -> Result<Self::Handle, Self::Error>;
}

#[derive(Debug, Error)]
pub enum RenderError<E> {
    #[error("no query at index {index} (result set has {len})")]
    OutOfRange { index: usize, len: usize },
    #[error("chart surface: {0}")]
    Surface(E),
}

pub struct ChartRenderer<S: ChartSurface> {
    container_id: String,
    config: ChartConfig,
    surface: Option<S>,
    last: Option<ChartSpec>,
    draws: u64,
}

impl<S: ChartSurface> ChartRenderer<S> {
    pub fn new(container_id: impl Into<String>, config: ChartConfig) -> Self {
        Self {
            container_id: container_id.into(),
            config,
            surface: None,
            last: None,
            draws: 0,
        }
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn is_bound(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn last_spec(&self) -> Option<&ChartSpec> {
        self.last.as_ref()
    }

    /// Draw one chart from its parts. A missing table draws an empty chart.
    pub fn show(
        &mut self,
        samples: impl Display,
        title: &str,
        table: Option<&DistributionTable>,
    ) -> Result<S::Handle, RenderError<S::Error>> {
        let spec = ChartSpec::new(samples, title, table, &self.config);
        self.draw_spec(spec)
    }

    /// Draw the query at `index` of a result set.
    pub fn show_index(
        &mut self,
        results: &ResultSet,
        index: usize,
    ) -> Result<S::Handle, RenderError<S::Error>> {
        let entry = results.entry(index).ok_or(RenderError::OutOfRange {
            index,
            len: results.len(),
        })?;
        let spec = ChartSpec::for_entry(entry, &self.config);
        self.draw_spec(spec)
    }

    pub fn draw_spec(&mut self, spec: ChartSpec) -> Result<S::Handle, RenderError<S::Error>> {
        let surface = match self.surface.take() {
            Some(s) => s,
            None => {
                tracing::debug!(container = %self.container_id, "binding chart surface");
                S::bind(&self.container_id, &self.config).map_err(RenderError::Surface)?
            }
        };
        let surface = self.surface.insert(surface);

        let transition = Transition::new(self.last.as_ref(), spec.clone());
        let handle = surface
            .draw(&self.container_id, transition)
            .map_err(RenderError::Surface)?;

        self.last = Some(spec);
        self.draws += 1;
        Ok(handle)
    }
}
