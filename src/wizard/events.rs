//! Wizard Events
//!
//! Change notifications emitted by the wizard controller over a broadcast
//! channel, so any UI layer can render progress without being coupled to
//! the controller's internals.

use uuid::Uuid;

use crate::types::{BuildLogLine, WizardStep};

/// A notification of a state change inside the wizard controller.
#[derive(Clone, Debug)]
pub enum WizardEvent {
    /// The current step changed.
    StepChanged(WizardStep),
    /// A generation request started or finished.
    BusyChanged(bool),
    /// One build status line was delivered.
    BuildLine {
        index: usize,
        total: usize,
        line: BuildLogLine,
    },
    /// Build progress recomputed, as a percentage.
    BuildProgress(f64),
    /// Project generation succeeded and the code bundle is stored.
    ProjectGenerated,
    /// Icon generation succeeded; carries the image data URI.
    IconReady(String),
    /// The store listing was committed in full.
    StoreListingReady,
    /// A dismissible user-visible notice, typically a failure surface.
    Notice(Notice),
}

/// A dismissible notice shown to the user.
#[derive(Clone, Debug)]
pub struct Notice {
    pub id: String,
    pub message: String,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            message: message.into(),
        }
    }
}
