//! Leptos front end for the BLOG model viewer.
//!
//! Only [`ui_model`] is compiled on native targets, so its tests run with the
//! rest of the workspace. The app itself needs `--features web` on `wasm32`.

pub mod ui_model;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
mod web;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub use web::start;
