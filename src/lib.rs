//! Web2App Studio -- AI-assisted web-to-Android packaging studio
//!
//! A step-by-step wizard that collects a web app's URL and branding,
//! generates Android project scaffolding and store-listing assets through
//! a generative AI backend, and simulates the cloud build that packages
//! them.

pub mod types;
pub mod wizard;
pub mod gemini;
pub mod build_sim;
pub mod artifact;
pub mod studio;
