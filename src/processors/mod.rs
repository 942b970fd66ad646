//! This module contains the batch processors
//!
//! A batch is fanned out with one unit of work per record ([`fan_out`]), and the per-item results
//! are folded back into the partial batch failure response ([`outcome`]). The [`BatchProcessor`]
//! wires both around the [`ScreeningService`](crate::screening::ScreeningService) for every pipeline.
//!

mod fan_out;
mod outcome;
mod pipelines;

pub use outcome::BatchOutcome;
pub use pipelines::BatchProcessor;
