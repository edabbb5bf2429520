//! Wizard Controller
//!
//! The state machine at the heart of the studio. Owns the wizard state,
//! guards forward/backward navigation, and orchestrates the asynchronous
//! generation calls and the simulated build against that state.
//!
//! All state mutation happens inside controller operations; the state
//! mutex is never held across an await point. A single atomic busy flag
//! provides mutual exclusion between generation requests: an overlapping
//! trigger is rejected, not queued.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::artifact;
use crate::build_sim;
use crate::types::{
    default_config, AppConfig, BuildLogLine, ContentGenerator, GenerateFailure, GeneratedProject,
    Permission, StoreListing, WizardStep, DEFAULT_PACKAGE_ID,
};

use super::events::{Notice, WizardEvent};

/// Deadline applied to every generation round trip. Expiry is mapped onto
/// the same failure path as a rejected request.
const REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Capacity of the event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The state owned by the controller. Snapshots are handed out by value;
/// only controller transitions mutate the live copy.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    pub step: WizardStep,
    pub config: AppConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<GeneratedProject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_listing: Option<StoreListing>,
    pub build_log: Vec<BuildLogLine>,
    pub build_progress: f64,
}

impl WizardState {
    fn new() -> Self {
        Self {
            step: WizardStep::Initial,
            config: default_config(),
            project: None,
            store_listing: None,
            build_log: Vec::new(),
            build_progress: 0.0,
        }
    }
}

/// Derive a reverse-domain package id from an app name: lower-cased,
/// whitespace runs joined with dots, wrapped as `com.<name>.app`.
pub fn derive_package_id(app_name: &str) -> String {
    let slug = app_name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".");
    if slug.is_empty() {
        DEFAULT_PACKAGE_ID.to_string()
    } else {
        format!("com.{}.app", slug)
    }
}

/// The wizard controller. Created once per session.
pub struct WizardController {
    state: Mutex<WizardState>,
    busy: AtomicBool,
    generator: Arc<dyn ContentGenerator>,
    events: broadcast::Sender<WizardEvent>,
    request_timeout: Duration,
}

impl WizardController {
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(WizardState::new()),
            busy: AtomicBool::new(false),
            generator,
            events,
            request_timeout: Duration::from_millis(REQUEST_TIMEOUT_MS),
        }
    }

    /// Override the generation deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    // ---- Observers ----------------------------------------------------------

    pub fn step(&self) -> WizardStep {
        self.state.lock().unwrap().step
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// A cloned copy of the full wizard state.
    pub fn snapshot(&self) -> WizardState {
        self.state.lock().unwrap().clone()
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.events.subscribe()
    }

    // ---- Configuration mutators ---------------------------------------------

    pub fn set_source_url(&self, url: &str) {
        self.state.lock().unwrap().config.source_url = url.trim().to_string();
    }

    /// Set the app name. While still on the initial step this also derives
    /// the package id; afterwards the package id is left alone so manual
    /// edits survive.
    pub fn set_app_name(&self, name: &str) {
        let mut state = self.state.lock().unwrap();
        state.config.app_name = name.trim().to_string();
        if state.step == WizardStep::Initial {
            state.config.package_id = derive_package_id(&state.config.app_name);
        }
    }

    pub fn set_package_id(&self, package_id: &str) {
        self.state.lock().unwrap().config.package_id = package_id.trim().to_string();
    }

    pub fn set_theme_color(&self, color: &str) {
        self.state.lock().unwrap().config.theme_color = color.trim().to_string();
    }

    pub fn set_category(&self, category: &str) {
        self.state.lock().unwrap().config.category = category.to_string();
    }

    pub fn set_permission(&self, permission: Permission, enabled: bool) {
        self.state
            .lock()
            .unwrap()
            .config
            .permissions
            .set(permission, enabled);
    }

    // ---- Navigation ---------------------------------------------------------

    /// Move one step forward. Unmet preconditions are a silent no-op: the
    /// front-end disables the action rather than receiving an error.
    pub async fn advance(&self) {
        match self.step() {
            WizardStep::Initial => {
                let has_url = !self.state.lock().unwrap().config.source_url.is_empty();
                if has_url {
                    self.set_step(WizardStep::Branding);
                } else {
                    debug!("advance ignored: source url is empty");
                }
            }
            WizardStep::Branding => self.set_step(WizardStep::Features),
            WizardStep::Features => self.begin_generation().await,
            WizardStep::StoreListing => {
                let listing_ready = self.state.lock().unwrap().store_listing.is_some();
                if listing_ready {
                    self.set_step(WizardStep::Complete);
                } else {
                    debug!("advance ignored: store listing not generated yet");
                }
            }
            other => debug!("advance ignored from {:?}", other),
        }
    }

    /// Move back to the immediately preceding stable step. No-op from the
    /// initial step and from the transient steps.
    pub fn retreat(&self) {
        match self.step() {
            WizardStep::Branding => self.set_step(WizardStep::Initial),
            WizardStep::Features => self.set_step(WizardStep::Branding),
            WizardStep::StoreListing => self.set_step(WizardStep::Features),
            WizardStep::Complete => self.set_step(WizardStep::StoreListing),
            other => debug!("retreat ignored from {:?}", other),
        }
    }

    // ---- Generation orchestration -------------------------------------------

    /// Generate the project code bundle, then hand off to the simulated
    /// build. On failure the wizard returns to the features step, the only
    /// one with a recovery path.
    pub async fn begin_generation(&self) {
        if self.step() != WizardStep::Features {
            debug!("generation ignored outside the features step");
            return;
        }
        if !self.try_acquire_busy() {
            debug!("generation rejected: another request is in flight");
            return;
        }

        self.set_step(WizardStep::Generating);
        let config = self.config();
        info!("generating project for {}", config.package_id);

        let result = self
            .with_deadline(self.generator.generate_project(&config))
            .await;

        match result {
            Ok(project) => {
                self.state.lock().unwrap().project = Some(project);
                self.emit(WizardEvent::ProjectGenerated);
                self.release_busy();
                self.begin_build_simulation().await;
            }
            Err(failure) => {
                self.release_busy();
                self.notify_failure("Project generation failed", &failure);
                self.set_step(WizardStep::Features);
            }
        }
    }

    /// Run one simulated build: reset the log and progress, deliver the
    /// fixed status lines at their cadence, then settle into the store
    /// listing step.
    async fn begin_build_simulation(&self) {
        self.set_step(WizardStep::Building);

        let package_id = {
            let mut state = self.state.lock().unwrap();
            state.build_log.clear();
            state.build_progress = 0.0;
            state.config.package_id.clone()
        };
        self.emit(WizardEvent::BuildProgress(0.0));

        let lines = build_sim::status_lines(&package_id);
        let total = lines.len();

        build_sim::run_sequence(
            &lines,
            Duration::from_millis(build_sim::LINE_INTERVAL_MS),
            |index, label| {
                let line = BuildLogLine::capture(label);
                let progress = ((index + 1) as f64 / total as f64) * 100.0;
                {
                    let mut state = self.state.lock().unwrap();
                    state.build_log.push(line.clone());
                    state.build_progress = progress;
                }
                self.emit(WizardEvent::BuildLine { index, total, line });
                self.emit(WizardEvent::BuildProgress(progress));
            },
        )
        .await;

        tokio::time::sleep(Duration::from_millis(build_sim::SETTLE_DELAY_MS)).await;
        self.set_step(WizardStep::StoreListing);
    }

    /// Generate store metadata and the feature graphic concurrently. Both
    /// must succeed for the listing to commit; a failure on either side
    /// commits nothing and leaves the step unchanged for retry.
    pub async fn request_store_listing(&self) {
        if self.step() != WizardStep::StoreListing {
            debug!("store listing ignored outside the store listing step");
            return;
        }
        if self.state.lock().unwrap().store_listing.is_some() {
            debug!("store listing already generated");
            return;
        }
        if !self.try_acquire_busy() {
            debug!("store listing rejected: another request is in flight");
            return;
        }

        let config = self.config();
        let (metadata, graphic) = tokio::join!(
            self.with_deadline(self.generator.generate_store_metadata(&config)),
            self.with_deadline(self.generator.generate_feature_graphic(&config)),
        );

        match (metadata, graphic) {
            (Ok(metadata), Ok(graphic)) => {
                let listing = StoreListing::from_parts(metadata, graphic);
                self.state.lock().unwrap().store_listing = Some(listing);
                self.release_busy();
                self.emit(WizardEvent::StoreListingReady);
                info!("store listing committed");
            }
            (Err(failure), _) | (_, Err(failure)) => {
                self.release_busy();
                self.notify_failure("Store listing generation failed", &failure);
            }
        }
    }

    /// Generate an app icon. Available from the branding step onward; a
    /// failure leaves any previously generated icon untouched.
    pub async fn request_icon(&self) {
        let step = self.step();
        if step < WizardStep::Branding || step.is_transient() {
            debug!("icon generation ignored from {:?}", step);
            return;
        }
        if !self.try_acquire_busy() {
            debug!("icon generation rejected: another request is in flight");
            return;
        }

        let config = self.config();
        let result = self
            .with_deadline(self.generator.generate_icon(&config))
            .await;

        match result {
            Ok(icon) => {
                self.state.lock().unwrap().config.icon_asset = Some(icon.clone());
                self.release_busy();
                self.emit(WizardEvent::IconReady(icon));
            }
            Err(failure) => {
                self.release_busy();
                self.notify_failure("Icon generation failed", &failure);
            }
        }
    }

    // ---- Export -------------------------------------------------------------

    /// Write the placeholder APK artifact. Only available once the wizard
    /// has completed.
    pub fn export_artifact(&self, dir: &Path) -> Result<PathBuf> {
        let (step, config) = {
            let state = self.state.lock().unwrap();
            (state.step, state.config.clone())
        };
        anyhow::ensure!(
            step == WizardStep::Complete,
            "artifact export is only available once the build is complete"
        );
        artifact::write_apk_stub(&config, dir)
    }

    /// Write the generated project files as a source kit directory. Only
    /// available once the wizard has completed.
    pub fn export_source_kit(&self, dir: &Path) -> Result<PathBuf> {
        let (step, config, project) = {
            let state = self.state.lock().unwrap();
            (state.step, state.config.clone(), state.project.clone())
        };
        anyhow::ensure!(
            step == WizardStep::Complete,
            "source kit export is only available once the build is complete"
        );
        let project = project.context("no generated project to export")?;
        artifact::write_source_kit(&config, &project, dir)
    }

    // ---- Internals ----------------------------------------------------------

    fn config(&self) -> AppConfig {
        self.state.lock().unwrap().config.clone()
    }

    fn set_step(&self, step: WizardStep) {
        let changed = {
            let mut state = self.state.lock().unwrap();
            if state.step == step {
                false
            } else {
                state.step = step;
                true
            }
        };
        if changed {
            debug!("step -> {:?}", step);
            self.emit(WizardEvent::StepChanged(step));
        }
    }

    fn try_acquire_busy(&self) -> bool {
        let acquired = self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if acquired {
            self.emit(WizardEvent::BusyChanged(true));
        }
        acquired
    }

    fn release_busy(&self) {
        self.busy.store(false, Ordering::SeqCst);
        self.emit(WizardEvent::BusyChanged(false));
    }

    async fn with_deadline<T, F>(&self, call: F) -> Result<T, GenerateFailure>
    where
        F: Future<Output = Result<T, GenerateFailure>>,
    {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(GenerateFailure::Timeout(
                self.request_timeout.as_millis() as u64
            )),
        }
    }

    fn notify_failure(&self, context: &str, failure: &GenerateFailure) {
        warn!("{}: {}", context, failure);
        self.emit(WizardEvent::Notice(Notice::new(format!(
            "{}: {}",
            context, failure
        ))));
    }

    fn emit(&self, event: WizardEvent) {
        // Delivery is best-effort; a front-end may not be subscribed.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::mock::MockGenerator;
    use tokio::sync::broadcast::error::TryRecvError;

    fn controller_with(mock: Arc<MockGenerator>) -> WizardController {
        WizardController::new(mock)
    }

    fn drain(rx: &mut broadcast::Receiver<WizardEvent>) -> Vec<WizardEvent> {
        let mut events = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(_)) => continue,
            }
        }
        events
    }

    fn has_notice(events: &[WizardEvent]) -> bool {
        events
            .iter()
            .any(|event| matches!(event, WizardEvent::Notice(_)))
    }

    async fn drive_to_features(controller: &WizardController) {
        controller.set_source_url("https://x.com");
        controller.set_app_name("Acme");
        controller.advance().await;
        controller.advance().await;
        assert_eq!(controller.step(), WizardStep::Features);
    }

    async fn drive_to_complete(controller: &WizardController) {
        drive_to_features(controller).await;
        controller.advance().await;
        assert_eq!(controller.step(), WizardStep::StoreListing);
        controller.request_store_listing().await;
        controller.advance().await;
        assert_eq!(controller.step(), WizardStep::Complete);
    }

    #[test]
    fn test_derive_package_id() {
        assert_eq!(derive_package_id("Acme"), "com.acme.app");
        assert_eq!(derive_package_id("Acme Commerce"), "com.acme.commerce.app");
        assert_eq!(derive_package_id("  Spaced   Out  "), "com.spaced.out.app");
        assert_eq!(derive_package_id(""), DEFAULT_PACKAGE_ID);
    }

    #[tokio::test(start_paused = true)]
    async fn test_advance_requires_source_url() {
        let controller = controller_with(Arc::new(MockGenerator::new()));
        controller.advance().await;
        assert_eq!(controller.step(), WizardStep::Initial);

        controller.set_source_url("https://x.com");
        controller.advance().await;
        assert_eq!(controller.step(), WizardStep::Branding);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retreat_walks_back_through_stable_steps() {
        let controller = controller_with(Arc::new(MockGenerator::new()));
        drive_to_complete(&controller).await;

        controller.retreat();
        assert_eq!(controller.step(), WizardStep::StoreListing);
        controller.retreat();
        assert_eq!(controller.step(), WizardStep::Features);
        controller.retreat();
        assert_eq!(controller.step(), WizardStep::Branding);
        controller.retreat();
        assert_eq!(controller.step(), WizardStep::Initial);
        controller.retreat();
        assert_eq!(controller.step(), WizardStep::Initial);
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_never_rests_on_transient_steps() {
        let controller = controller_with(Arc::new(MockGenerator::new()));
        controller.set_source_url("https://x.com");
        controller.set_app_name("Acme");

        // Arbitrary interleavings of forward/backward navigation only ever
        // come to rest on stable steps.
        for _ in 0..3 {
            controller.advance().await;
            assert!(!controller.step().is_transient());
            controller.retreat();
            assert!(!controller.step().is_transient());
            controller.advance().await;
            controller.advance().await;
            assert!(!controller.step().is_transient());
            controller.retreat();
            controller.retreat();
            controller.retreat();
            assert_eq!(controller.step(), WizardStep::Initial);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_package_id_derivation_only_on_initial_step() {
        let controller = controller_with(Arc::new(MockGenerator::new()));
        controller.set_app_name("Acme");
        assert_eq!(controller.snapshot().config.package_id, "com.acme.app");

        controller.set_source_url("https://x.com");
        controller.advance().await;

        // Off the initial step, renaming no longer touches the package id.
        controller.set_app_name("Globex");
        assert_eq!(controller.snapshot().config.package_id, "com.acme.app");

        controller.set_package_id("io.globex.shop");
        assert_eq!(controller.snapshot().config.package_id, "io.globex.shop");
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_success_runs_build_to_store_listing() {
        let controller = controller_with(Arc::new(MockGenerator::new()));
        drive_to_features(&controller).await;
        let mut rx = controller.subscribe();

        controller.advance().await;

        let state = controller.snapshot();
        assert_eq!(state.step, WizardStep::StoreListing);
        assert!(state.project.is_some());
        assert_eq!(state.build_log.len(), 10);
        assert_eq!(state.build_progress, 100.0);
        assert!(!controller.is_busy());

        // Progress is monotonically non-decreasing across the run.
        let mut last = 0.0;
        for event in drain(&mut rx) {
            if let WizardEvent::BuildProgress(progress) = event {
                assert!(progress >= last);
                last = progress;
            }
        }
        assert_eq!(last, 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_failure_returns_to_features() {
        let mock = Arc::new(MockGenerator::new());
        mock.push_project(Err(GenerateFailure::Request("backend down".to_string())));
        let controller = controller_with(Arc::clone(&mock));
        drive_to_features(&controller).await;
        let mut rx = controller.subscribe();

        controller.advance().await;

        let state = controller.snapshot();
        assert_eq!(state.step, WizardStep::Features);
        assert!(!controller.is_busy());
        assert!(state.project.is_none());
        // The failed run never reached the build, so the log was not reset.
        assert!(state.build_log.is_empty());
        assert!(has_notice(&drain(&mut rx)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_timeout_maps_to_failure_path() {
        let mock = Arc::new(MockGenerator::new().with_latency(Duration::from_secs(120)));
        let controller =
            controller_with(Arc::clone(&mock)).with_request_timeout(Duration::from_secs(1));
        drive_to_features(&controller).await;
        let mut rx = controller.subscribe();

        controller.advance().await;

        assert_eq!(controller.step(), WizardStep::Features);
        assert!(!controller.is_busy());
        assert!(has_notice(&drain(&mut rx)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_listing_is_all_or_nothing() {
        let mock = Arc::new(MockGenerator::new());
        mock.push_feature_graphic(Err(GenerateFailure::Request("image backend down".to_string())));
        let controller = controller_with(Arc::clone(&mock));
        drive_to_features(&controller).await;
        controller.advance().await;
        assert_eq!(controller.step(), WizardStep::StoreListing);
        let mut rx = controller.subscribe();

        // Metadata succeeds, graphic fails: nothing commits.
        controller.request_store_listing().await;
        let state = controller.snapshot();
        assert!(state.store_listing.is_none());
        assert_eq!(state.step, WizardStep::StoreListing);
        assert!(!controller.is_busy());
        assert!(has_notice(&drain(&mut rx)));

        // Advancing is still blocked until the listing exists.
        controller.advance().await;
        assert_eq!(controller.step(), WizardStep::StoreListing);

        // Retry with a healthy backend commits all fields at once.
        controller.request_store_listing().await;
        let listing = controller.snapshot().store_listing.expect("listing committed");
        assert!(!listing.short_pitch.is_empty());
        assert!(!listing.full_description.is_empty());
        assert!(!listing.category.is_empty());
        assert!(!listing.tags.is_empty());
        assert!(listing.feature_graphic.starts_with("data:image/png;base64,"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_icon_failure_preserves_prior_icon() {
        let mock = Arc::new(MockGenerator::new());
        let controller = controller_with(Arc::clone(&mock));
        controller.set_source_url("https://x.com");
        controller.advance().await;

        controller.request_icon().await;
        let first = controller.snapshot().config.icon_asset.expect("icon set");

        mock.push_icon(Err(GenerateFailure::Request("image backend down".to_string())));
        controller.request_icon().await;
        assert_eq!(controller.snapshot().config.icon_asset, Some(first));
    }

    #[tokio::test(start_paused = true)]
    async fn test_icon_not_available_on_initial_step() {
        let mock = Arc::new(MockGenerator::new());
        let controller = controller_with(Arc::clone(&mock));
        controller.request_icon().await;
        assert!(controller.snapshot().config.icon_asset.is_none());
        assert_eq!(mock.icon_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_guard_rejects_overlapping_requests() {
        let mock = Arc::new(MockGenerator::new().with_latency(Duration::from_millis(100)));
        let controller = Arc::new(controller_with(Arc::clone(&mock)));
        controller.set_source_url("https://x.com");
        controller.advance().await;

        let background = Arc::clone(&controller);
        let in_flight = tokio::spawn(async move { background.request_icon().await });

        // Let the first request reach the backend and hold the busy flag.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(controller.is_busy());

        // The overlapping trigger is rejected outright, not queued.
        controller.request_icon().await;

        in_flight.await.unwrap();
        assert_eq!(mock.icon_calls(), 1);
        assert!(controller.snapshot().config.icon_asset.is_some());
        assert!(!controller.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_artifact_only_from_complete() {
        let controller = controller_with(Arc::new(MockGenerator::new()));
        let dir = std::env::temp_dir().join(format!("web2app-test-{}", uuid::Uuid::new_v4()));

        assert!(controller.export_artifact(&dir).is_err());

        drive_to_complete(&controller).await;
        controller.set_app_name("Acme Commerce");

        let path = controller.export_artifact(&dir).expect("artifact written");
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "Acme_Commerce_v1.0.apk"
        );
        assert!(path.exists());

        let kit = controller.export_source_kit(&dir).expect("source kit written");
        assert!(kit.join("MainActivity.java").exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
