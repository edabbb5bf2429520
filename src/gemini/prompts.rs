//! Prompts
//!
//! Prompt templates and response schemas for the generation calls. The
//! text operations are constrained to JSON through a response schema so
//! the payload parses directly into the expected shape.

use serde_json::{json, Value};

use crate::types::AppConfig;

/// Prompt for the Android project scaffolding.
pub fn project_prompt(config: &AppConfig) -> String {
    format!(
        "Generate a professional Android WebView project configuration.\n\
         App Name: {}\n\
         Package Name: {}\n\
         URL: {}\n\
         Primary Color: {}\n\
         Permissions needed: {}\n\n\
         Return the following files in a JSON format:\n\
         1. MainActivity.java (Modern WebView implementation with ChromeClient, back button support, and permission handling)\n\
         2. AndroidManifest.xml (Properly configured with Internet permission and declared activities)\n\
         3. build.gradle (app level)\n\
         4. strings.xml\n\
         5. themes.xml\n\n\
         Use best practices for Android development.",
        config.app_name,
        config.package_id,
        config.source_url,
        config.theme_color,
        config.permissions.enabled().join(", "),
    )
}

/// Response schema for the project scaffolding call.
pub fn project_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "mainActivity": { "type": "STRING" },
            "manifest": { "type": "STRING" },
            "buildGradle": { "type": "STRING" },
            "stringsXml": { "type": "STRING" },
            "stylesXml": { "type": "STRING" },
        },
        "required": ["mainActivity", "manifest", "buildGradle", "stringsXml", "stylesXml"],
    })
}

/// Prompt for the app icon image.
pub fn icon_prompt(config: &AppConfig) -> String {
    format!(
        "A professional, minimalist, high-quality modern flat vector app icon for an Android application.\n\
         App Name: {}\n\
         Industry: {}\n\
         Primary Color: {}\n\
         The icon should be centered, on a solid background, suitable for a Google Play Store listing. No text.",
        config.app_name, config.category, config.theme_color,
    )
}

/// Prompt for the store listing metadata.
pub fn metadata_prompt(config: &AppConfig) -> String {
    format!(
        "Generate high-converting Google Play Store SEO metadata for an Android app.\n\
         App Name: {}\n\
         Website context: {}\n\
         Category: {}\n\n\
         Return JSON with:\n\
         1. shortDescription (max 80 chars)\n\
         2. fullDescription (max 4000 chars, use bullet points, feature highlights)\n\
         3. tags (at least 5 relevant keywords)\n\
         4. category (most relevant Play Store category)",
        config.app_name, config.source_url, config.category,
    )
}

/// Response schema for the store metadata call.
pub fn metadata_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "shortDescription": { "type": "STRING" },
            "fullDescription": { "type": "STRING" },
            "tags": { "type": "ARRAY", "items": { "type": "STRING" } },
            "category": { "type": "STRING" },
        },
        "required": ["shortDescription", "fullDescription", "tags", "category"],
    })
}

/// Prompt for the store feature graphic image.
pub fn feature_graphic_prompt(config: &AppConfig) -> String {
    format!(
        "A professional Google Play Store Feature Graphic. 1024x500 aspect.\n\
         App Name: {}\n\
         Style: Modern, tech, vibrant, marketing showcase.\n\
         Theme Color: {}\n\
         Abstract background with phone silhouettes or relevant symbols for {}. No small text. High quality marketing art.",
        config.app_name, config.theme_color, config.category,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::default_config;

    #[test]
    fn test_project_prompt_carries_config_fields() {
        let mut config = default_config();
        config.app_name = "Acme".to_string();
        config.package_id = "com.acme.app".to_string();
        config.source_url = "https://acme.example".to_string();

        let prompt = project_prompt(&config);
        assert!(prompt.contains("App Name: Acme"));
        assert!(prompt.contains("Package Name: com.acme.app"));
        assert!(prompt.contains("URL: https://acme.example"));
        // Default permissions enable location and storage only.
        assert!(prompt.contains("Permissions needed: location, storage"));
    }

    #[test]
    fn test_schemas_require_every_field() {
        let schema = project_schema();
        assert_eq!(schema["required"].as_array().unwrap().len(), 5);
        let schema = metadata_schema();
        assert_eq!(schema["required"].as_array().unwrap().len(), 4);
    }
}
