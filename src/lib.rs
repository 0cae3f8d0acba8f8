//! Finding versioned artifacts in a maven style repository and narrowing the results down by
//!  release / snapshot status, packaging and semantic version.

pub mod config;
pub mod download;
pub mod error;
pub mod filter;
pub mod maven;
pub mod orchestrator;
pub mod query;
pub mod repository;
pub mod util;
