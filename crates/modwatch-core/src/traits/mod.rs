//! Capability traits consumed and produced by modwatch.

pub mod pipeline;

pub use pipeline::{Discovery, LoadPipeline, Unit, UnitCompleter, UnitResolver};
