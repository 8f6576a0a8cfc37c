#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hydrant resolution pipeline.
//!
//! Given a free-text address, [`ResolutionPipeline::resolve`] geocodes it,
//! selects the nearest hydrants from the shared catalog, and produces both
//! a [`hydrant_map_static_map::MapRenderRequest`] and a ranked list of
//! [`hydrant_map_hydrant_models::DisplayEntry`] values with deep links.
//!
//! The pipeline knows nothing about how the answer is delivered; the
//! server's REST and Telegram handlers and the CLI all call the same
//! `resolve`.

pub mod config;
pub mod format;
pub mod pipeline;

pub use config::{AppConfig, ResolverConfig};
pub use pipeline::{Resolution, ResolutionPipeline, ResolutionStage, ResolveError};
