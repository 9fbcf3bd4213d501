//! Per-kind logic for turning a generator's upstream graph into a request.
//!
//! Input collection runs in two phases: [`plan_inputs`] reads the graph
//! synchronously and decides what every incoming edge contributes, then
//! [`collect_inputs`] resolves remote image references into inline bytes.

mod fetch;
mod inputs;

pub use fetch::{DEFAULT_FETCH_TIMEOUT, HttpImageFetcher, ImageFetcher};
pub use inputs::{CollectedInputs, ImageInput, InputPlan, collect_inputs, plan_inputs};

/// Tracing target for input collection.
pub const TRACING_TARGET: &str = "weave_runtime::behavior";
