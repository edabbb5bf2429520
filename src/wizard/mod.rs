//! Wizard Module
//!
//! The step/state progression model driving the studio: the wizard
//! controller, its state, and the change notifications any front-end
//! (or headless harness) observes it through.

pub mod controller;
pub mod events;

pub use controller::{derive_package_id, WizardController, WizardState};
pub use events::{Notice, WizardEvent};
