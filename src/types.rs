//! Web2App Studio - Type Definitions
//!
//! All shared types for the studio: wizard configuration, generated
//! payloads, and the content-generation interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Wizard Steps ────────────────────────────────────────────────

/// One discrete stage of the configuration flow.
///
/// Declaration order is the forward order of the wizard. `Generating` and
/// `Building` are transient, system-driven steps: the user cannot navigate
/// into or out of them directly.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Initial,
    Branding,
    Features,
    Generating,
    Building,
    StoreListing,
    Complete,
}

impl WizardStep {
    /// Whether this step is entered and exited by the controller itself
    /// rather than by user navigation.
    pub fn is_transient(self) -> bool {
        matches!(self, WizardStep::Generating | WizardStep::Building)
    }
}

// ─── Configuration ───────────────────────────────────────────────

/// Runtime bridge permissions the packaged app may request.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub camera: bool,
    pub location: bool,
    pub microphone: bool,
    pub storage: bool,
}

/// A single named permission flag, for iteration and toggling from the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    Camera,
    Location,
    Microphone,
    Storage,
}

impl Permission {
    pub const ALL: [Permission; 4] = [
        Permission::Camera,
        Permission::Location,
        Permission::Microphone,
        Permission::Storage,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Permission::Camera => "camera",
            Permission::Location => "location",
            Permission::Microphone => "microphone",
            Permission::Storage => "storage",
        }
    }
}

impl Permissions {
    pub fn get(&self, permission: Permission) -> bool {
        match permission {
            Permission::Camera => self.camera,
            Permission::Location => self.location,
            Permission::Microphone => self.microphone,
            Permission::Storage => self.storage,
        }
    }

    pub fn set(&mut self, permission: Permission, enabled: bool) {
        match permission {
            Permission::Camera => self.camera = enabled,
            Permission::Location => self.location = enabled,
            Permission::Microphone => self.microphone = enabled,
            Permission::Storage => self.storage = enabled,
        }
    }

    /// Labels of the enabled permissions, in declaration order.
    pub fn enabled(&self) -> Vec<&'static str> {
        Permission::ALL
            .into_iter()
            .filter(|p| self.get(*p))
            .map(Permission::label)
            .collect()
    }
}

/// The accumulated app configuration the wizard collects.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub source_url: String,
    pub app_name: String,
    pub package_id: String,
    pub theme_color: String,
    pub category: String,
    pub permissions: Permissions,
    /// Generated app icon as a base64 image data URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_asset: Option<String>,
}

/// Package id used until the app is named.
pub const DEFAULT_PACKAGE_ID: &str = "com.webapp.studio";

/// Default primary brand color.
pub const DEFAULT_THEME_COLOR: &str = "#4f46e5";

/// Store categories offered by the branding step.
pub const CATEGORIES: [&str; 6] = [
    "E-commerce & Shopping",
    "Business & SaaS",
    "Portfolio & Personal",
    "Productivity Tool",
    "Health & Wellness",
    "Entertainment",
];

/// Returns the default `AppConfig` a fresh wizard session starts from.
pub fn default_config() -> AppConfig {
    AppConfig {
        source_url: String::new(),
        app_name: String::new(),
        package_id: DEFAULT_PACKAGE_ID.to_string(),
        theme_color: DEFAULT_THEME_COLOR.to_string(),
        category: "Business & SaaS".to_string(),
        permissions: Permissions {
            camera: false,
            location: true,
            microphone: false,
            storage: true,
        },
        icon_asset: None,
    }
}

// ─── Generated Payloads ──────────────────────────────────────────

/// The Android project scaffolding returned by project generation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedProject {
    pub main_activity: String,
    pub manifest: String,
    pub build_gradle: String,
    pub strings_xml: String,
    pub styles_xml: String,
}

/// Store metadata as returned on the wire by metadata generation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreMetadata {
    pub short_description: String,
    pub full_description: String,
    pub category: String,
    pub tags: Vec<String>,
}

/// The finished store listing: metadata merged with the feature graphic.
/// Committed atomically; never partially populated.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreListing {
    pub short_pitch: String,
    pub full_description: String,
    pub category: String,
    pub tags: Vec<String>,
    /// Feature graphic as a base64 image data URI.
    pub feature_graphic: String,
}

impl StoreListing {
    pub fn from_parts(metadata: StoreMetadata, feature_graphic: String) -> Self {
        Self {
            short_pitch: metadata.short_description,
            full_description: metadata.full_description,
            category: metadata.category,
            tags: metadata.tags,
            feature_graphic,
        }
    }
}

// ─── Build Log ───────────────────────────────────────────────────

/// A single build status line with its capture-time timestamp.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildLogLine {
    pub timestamp: String,
    pub message: String,
}

impl BuildLogLine {
    /// Capture a status line, stamping it with the local wall-clock time.
    pub fn capture(message: &str) -> Self {
        Self {
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for BuildLogLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.timestamp, self.message)
    }
}

// ─── Content Generation Interface ────────────────────────────────

/// How a generation call can fail. The controller maps every variant onto
/// the same user-visible failure path; nothing is retried automatically.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GenerateFailure {
    /// The request was rejected or the transport failed.
    #[error("generation request failed: {0}")]
    Request(String),
    /// The response arrived but could not be parsed into the expected
    /// shape. Partially parsed data is never propagated.
    #[error("malformed generation response: {0}")]
    Malformed(String),
    /// The request did not complete within the deadline.
    #[error("generation request timed out after {0}ms")]
    Timeout(u64),
}

/// Interface to the content-generation backend. Each operation is a single
/// asynchronous round trip with no retry built in.
///
/// Image-producing operations return base64 data URIs.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate_project(
        &self,
        config: &AppConfig,
    ) -> Result<GeneratedProject, GenerateFailure>;

    async fn generate_icon(&self, config: &AppConfig) -> Result<String, GenerateFailure>;

    async fn generate_store_metadata(
        &self,
        config: &AppConfig,
    ) -> Result<StoreMetadata, GenerateFailure>;

    async fn generate_feature_graphic(
        &self,
        config: &AppConfig,
    ) -> Result<String, GenerateFailure>;
}
