//! Core trait abstractions for the research pipeline.
//!
//! These traits define the external capabilities that applications provide:
//! text generation and HTTP access.

pub mod ai;
pub mod http;
