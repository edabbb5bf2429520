//! Gemini Module
//!
//! Content generation backed by a Gemini-compatible `generateContent`
//! API: project scaffolding and store metadata as schema-constrained
//! JSON, icon and feature graphic as inline images. A scriptable mock
//! backs tests and offline runs.

pub mod client;
pub mod mock;
pub mod prompts;

pub use client::GeminiClient;
pub use mock::MockGenerator;
