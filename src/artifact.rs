//! Artifact Export
//!
//! Writes the downloadable outputs of a finished session: the placeholder
//! APK blob and the generated source kit. The APK is a stand-in payload,
//! not a real package.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::types::{AppConfig, GeneratedProject};

/// Payload of the placeholder APK.
const APK_STUB_PAYLOAD: &[u8] = b"MOCK_APK_DATA";

/// File name for the exported artifact: the app name with whitespace
/// collapsed to underscores, versioned, `.apk` suffixed.
pub fn artifact_file_name(app_name: &str) -> String {
    let base = app_name.split_whitespace().collect::<Vec<_>>().join("_");
    let base = if base.is_empty() { "app".to_string() } else { base };
    format!("{}_v1.0.apk", base)
}

/// Resolve a path that may start with `~` to an absolute path.
pub fn resolve_out_dir(p: &str) -> PathBuf {
    if let Some(rest) = p.strip_prefix('~') {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/root"));
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        home.join(rest)
    } else {
        PathBuf::from(p)
    }
}

/// Write the placeholder APK into `dir`, creating it if needed.
/// Returns the path of the written file.
pub fn write_apk_stub(config: &AppConfig, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let path = dir.join(artifact_file_name(&config.app_name));
    fs::write(&path, APK_STUB_PAYLOAD)
        .with_context(|| format!("Failed to write artifact {}", path.display()))?;

    info!("artifact written: {}", path.display());
    Ok(path)
}

/// Write the generated project files as an Android Studio source kit under
/// `dir/<name>-src/`. Returns the kit directory.
pub fn write_source_kit(
    config: &AppConfig,
    project: &GeneratedProject,
    dir: &Path,
) -> Result<PathBuf> {
    let base = config
        .app_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase();
    let base = if base.is_empty() { "app".to_string() } else { base };
    let kit_dir = dir.join(format!("{}-src", base));

    fs::create_dir_all(&kit_dir)
        .with_context(|| format!("Failed to create source kit directory {}", kit_dir.display()))?;

    let files: [(&str, &str); 5] = [
        ("MainActivity.java", &project.main_activity),
        ("AndroidManifest.xml", &project.manifest),
        ("build.gradle", &project.build_gradle),
        ("strings.xml", &project.strings_xml),
        ("themes.xml", &project.styles_xml),
    ];
    for (name, content) in files {
        let path = kit_dir.join(name);
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    info!("source kit written: {}", kit_dir.display());
    Ok(kit_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::default_config;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("web2app-artifact-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_artifact_file_name_sanitizes_whitespace() {
        assert_eq!(artifact_file_name("Acme Commerce"), "Acme_Commerce_v1.0.apk");
        assert_eq!(artifact_file_name("Acme"), "Acme_v1.0.apk");
        assert_eq!(artifact_file_name("  "), "app_v1.0.apk");
    }

    #[test]
    fn test_resolve_out_dir_expands_tilde() {
        let resolved = resolve_out_dir("~/Downloads");
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("Downloads"));
        assert_eq!(resolve_out_dir("/tmp/out"), PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_write_apk_stub_writes_placeholder_payload() {
        let dir = temp_dir();
        let mut config = default_config();
        config.app_name = "Acme Commerce".to_string();

        let path = write_apk_stub(&config, &dir).unwrap();
        assert_eq!(fs::read(&path).unwrap(), APK_STUB_PAYLOAD);
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "Acme_Commerce_v1.0.apk"
        );

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_source_kit_writes_all_project_files() {
        let dir = temp_dir();
        let mut config = default_config();
        config.app_name = "Acme".to_string();
        let project = crate::gemini::mock::sample_project(&config);

        let kit = write_source_kit(&config, &project, &dir).unwrap();
        assert!(kit.ends_with("acme-src"));
        for name in [
            "MainActivity.java",
            "AndroidManifest.xml",
            "build.gradle",
            "strings.xml",
            "themes.xml",
        ] {
            assert!(kit.join(name).exists(), "missing {}", name);
        }

        fs::remove_dir_all(&dir).ok();
    }
}
