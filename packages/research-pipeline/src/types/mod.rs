//! Data types for the research pipeline.

pub mod config;
pub mod insight;
pub mod metrics;
pub mod result;
pub mod source;
