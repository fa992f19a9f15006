//! Diet chart client: dosha classification, resilient chart generation and a
//! deterministic template fallback.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod plan;
pub mod profile;
pub mod service;
pub mod session;
