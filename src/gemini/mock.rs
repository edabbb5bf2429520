//! Mock Generator
//!
//! A scriptable stand-in for the generation backend. Tests queue canned
//! outcomes per operation and inspect call counts; with an empty queue
//! every operation succeeds with plausible sample content, which is also
//! what the `--offline` mode runs on.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::types::{AppConfig, ContentGenerator, GenerateFailure, GeneratedProject, StoreMetadata};

/// A 1x1 transparent PNG, the smallest payload that decodes as an image.
const PLACEHOLDER_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

/// Data URI of the placeholder image used for canned icon and feature
/// graphic responses.
pub fn placeholder_image() -> String {
    format!("data:image/png;base64,{}", PLACEHOLDER_PNG_BASE64)
}

/// Canned project scaffolding derived from the configuration.
pub fn sample_project(config: &AppConfig) -> GeneratedProject {
    GeneratedProject {
        main_activity: format!(
            "package {};\n\npublic class MainActivity extends AppCompatActivity {{\n    // WebView host for {}\n}}\n",
            config.package_id, config.source_url
        ),
        manifest: format!(
            "<manifest package=\"{}\">\n    <uses-permission android:name=\"android.permission.INTERNET\" />\n</manifest>\n",
            config.package_id
        ),
        build_gradle: format!(
            "android {{\n    namespace \"{}\"\n    defaultConfig {{ applicationId \"{}\" }}\n}}\n",
            config.package_id, config.package_id
        ),
        strings_xml: format!(
            "<resources>\n    <string name=\"app_name\">{}</string>\n</resources>\n",
            config.app_name
        ),
        styles_xml: format!(
            "<resources>\n    <style name=\"Theme.App\">\n        <item name=\"colorPrimary\">{}</item>\n    </style>\n</resources>\n",
            config.theme_color
        ),
    }
}

/// Canned store metadata derived from the configuration.
pub fn sample_metadata(config: &AppConfig) -> StoreMetadata {
    StoreMetadata {
        short_description: format!("{} for Android, straight from the web.", config.app_name),
        full_description: format!(
            "{} brings {} to your home screen.\n\n- Native WebView shell\n- Offline-friendly caching\n- Play Store ready",
            config.app_name, config.source_url
        ),
        category: config.category.clone(),
        tags: vec![
            "webview".to_string(),
            "android".to_string(),
            "app".to_string(),
            "mobile".to_string(),
            "studio".to_string(),
        ],
    }
}

type Scripted<T> = Mutex<VecDeque<Result<T, GenerateFailure>>>;

/// Scriptable generation backend.
pub struct MockGenerator {
    projects: Scripted<GeneratedProject>,
    icons: Scripted<String>,
    metadata: Scripted<StoreMetadata>,
    graphics: Scripted<String>,
    project_calls: AtomicUsize,
    icon_calls: AtomicUsize,
    metadata_calls: AtomicUsize,
    graphic_calls: AtomicUsize,
    latency: Option<Duration>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            projects: Mutex::new(VecDeque::new()),
            icons: Mutex::new(VecDeque::new()),
            metadata: Mutex::new(VecDeque::new()),
            graphics: Mutex::new(VecDeque::new()),
            project_calls: AtomicUsize::new(0),
            icon_calls: AtomicUsize::new(0),
            metadata_calls: AtomicUsize::new(0),
            graphic_calls: AtomicUsize::new(0),
            latency: None,
        }
    }

    /// Delay every call by the given duration, so tests can observe the
    /// busy window under virtual time.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn push_project(&self, outcome: Result<GeneratedProject, GenerateFailure>) {
        self.projects.lock().unwrap().push_back(outcome);
    }

    pub fn push_icon(&self, outcome: Result<String, GenerateFailure>) {
        self.icons.lock().unwrap().push_back(outcome);
    }

    pub fn push_metadata(&self, outcome: Result<StoreMetadata, GenerateFailure>) {
        self.metadata.lock().unwrap().push_back(outcome);
    }

    pub fn push_feature_graphic(&self, outcome: Result<String, GenerateFailure>) {
        self.graphics.lock().unwrap().push_back(outcome);
    }

    pub fn project_calls(&self) -> usize {
        self.project_calls.load(Ordering::SeqCst)
    }

    pub fn icon_calls(&self) -> usize {
        self.icon_calls.load(Ordering::SeqCst)
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn graphic_calls(&self) -> usize {
        self.graphic_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentGenerator for MockGenerator {
    async fn generate_project(
        &self,
        config: &AppConfig,
    ) -> Result<GeneratedProject, GenerateFailure> {
        self.project_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        let scripted = self.projects.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(sample_project(config)))
    }

    async fn generate_icon(&self, _config: &AppConfig) -> Result<String, GenerateFailure> {
        self.icon_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        let scripted = self.icons.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(placeholder_image()))
    }

    async fn generate_store_metadata(
        &self,
        config: &AppConfig,
    ) -> Result<StoreMetadata, GenerateFailure> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        let scripted = self.metadata.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(sample_metadata(config)))
    }

    async fn generate_feature_graphic(
        &self,
        _config: &AppConfig,
    ) -> Result<String, GenerateFailure> {
        self.graphic_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        let scripted = self.graphics.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(placeholder_image()))
    }
}
