//! # blogview
//!
//! Controller logic for a browser-based probabilistic model editor.
//!
//! A model written in the modeling language is posted to an inference backend;
//! the backend answers with a set of result groups (one per run) whose queries
//! carry distribution tables. This crate holds everything between the editor
//! and the chart that does not need a DOM, so it can be unit-tested on the
//! host and shared by the wasm app and the CLI.
//!
//! ## Quick Start
//!
//! ```
//! use blogview::prelude::*;
//!
//! let model = "random Boolean A ~ Bernoulli(0.6);\nquery A;";
//! let form = SubmissionForm::new(model, "1000", "LWSampler", "default");
//! let mut session = Session::new();
//! let pending = session.begin(form).expect("valid model");
//!
//! // ... POST `pending.fields()` to the backend, then:
//! let body = r#"[{"run1":{"samples":100,"queries":{"q1":{"query":"P(A)","distribution":[["A","p"],["true",0.6],["false",0.4]]}}}}, "log ok"]"#;
//! let outcome = session.complete(pending.ticket(), body).expect("well-formed");
//! let Completion::Applied(applied) = outcome else { unreachable!() };
//! assert_eq!(applied.log_text, "log ok");
//!
//! let spec = ChartSpec::for_entry(session.results().entry(0).unwrap(), &ChartConfig::default());
//! assert_eq!(spec.kind, ChartKind::Column);
//! assert_eq!(spec.title, "P(A) w/ 100 samples");
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): config file discovery on the filesystem
//! - `cli`: the `blogview-cli` binary (tokio + reqwest)
//!
//! ## Modules
//!
//! - [`syntax`]: line tokenizer for editor highlighting
//! - [`submission`]: request validation and form fields
//! - [`response`]: response parsing and flattening into a [`response::ResultSet`]
//! - [`chart`]: chart specification, transitions and frame layout
//! - [`renderer`]: the chart handle owning a drawing surface
//! - [`playback`]: slideshow sequencing over the result set
//! - [`controls`]: small UI helpers (visibility, slider, base bound)
//! - [`session`]: submission tickets and the current result set
//! - [`snippet`]: snippet loader request/response
//! - [`config`]: endpoints, element ids and chart constants

#[path = "core/syntax.rs"]
pub mod syntax;

#[path = "core/submission.rs"]
pub mod submission;

#[path = "core/response.rs"]
pub mod response;

#[path = "core/chart.rs"]
pub mod chart;

#[path = "core/renderer.rs"]
pub mod renderer;

#[path = "core/playback.rs"]
pub mod playback;

#[path = "core/controls.rs"]
pub mod controls;

#[path = "core/session.rs"]
pub mod session;

#[path = "core/snippet.rs"]
pub mod snippet;

#[path = "core/config.rs"]
pub mod config;

/// Prelude module for convenient imports.
///
/// ```
/// use blogview::prelude::*;
/// ```
pub mod prelude {
    pub use crate::chart::{ChartConfig, ChartFrame, ChartKind, ChartSpec, Transition};
    pub use crate::config::ViewerConfig;
    pub use crate::controls::{DisplayMode, PanelVisibility, SliderState};
    pub use crate::playback::{Playback, PlaybackRuns};
    pub use crate::renderer::{ChartRenderer, ChartSurface, RenderError};
    pub use crate::response::{
        DistributionTable, DropdownOption, QueryEntry, ResponseError, ResultSet,
    };
    pub use crate::session::{Applied, Completion, Session, Ticket};
    pub use crate::submission::{PendingSubmission, SubmissionForm, SubmitError};
    pub use crate::syntax::{tokenize_line, Span, TokenClass};
}
