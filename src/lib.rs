//! Context Explainer Library
//!
//! Capture a word and the passage around it, then ask a local or remote LLM
//! what the word means in that passage.

pub mod capture;
pub mod config;
pub mod core;
pub mod error;
pub mod history;
pub mod ipc;
pub mod presentation;
pub mod relay;
