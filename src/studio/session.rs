//! Studio Session
//!
//! The interactive session loop. Drives the wizard controller exclusively
//! through its public operations and renders its event stream, so the
//! front-end stays as thin as any headless harness.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::types::{ContentGenerator, WizardStep, CATEGORIES};
use crate::wizard::{WizardController, WizardEvent};

use super::banner::show_banner;
use super::prompts::{
    confirm, prompt_hex_color, prompt_required, prompt_url, prompt_with_default, select,
    toggle_permissions,
};

/// Run one full studio session against the given generation backend.
pub async fn run_session(generator: Arc<dyn ContentGenerator>, out_dir: &Path) -> Result<()> {
    show_banner();

    let controller = Arc::new(WizardController::new(generator));
    let printer = spawn_event_printer(controller.subscribe());

    loop {
        match controller.step() {
            WizardStep::Initial => step_initial(&controller).await?,
            WizardStep::Branding => step_branding(&controller).await?,
            WizardStep::Features => step_features(&controller).await?,
            WizardStep::StoreListing => step_store_listing(&controller).await?,
            WizardStep::Complete => {
                step_complete(&controller, out_dir)?;
                break;
            }
            // advance() runs the transient steps to completion before
            // returning, so the loop never observes them.
            transient => anyhow::bail!("unexpected transient step {:?}", transient),
        }
    }

    printer.abort();
    Ok(())
}

// ---- Steps ------------------------------------------------------------------

async fn step_initial(controller: &WizardController) -> Result<()> {
    println!("{}", "  [1/5] Source web application\n".cyan());

    let url = prompt_url("Source web application URL")?;
    controller.set_source_url(&url);

    let name = prompt_required("Native app name")?;
    controller.set_app_name(&name);
    println!(
        "{}",
        format!(
            "  Package id: {}\n",
            controller.snapshot().config.package_id
        )
        .dimmed()
    );

    controller.advance().await;
    Ok(())
}

async fn step_branding(controller: &WizardController) -> Result<()> {
    println!("{}", "  [2/5] Branding\n".cyan());
    let config = controller.snapshot().config;

    let color = prompt_hex_color("Primary brand color", &config.theme_color)?;
    controller.set_theme_color(&color);

    let current = CATEGORIES
        .iter()
        .position(|c| *c == config.category)
        .unwrap_or(1);
    let category = select("App category", &CATEGORIES, current)?;
    controller.set_category(CATEGORIES[category]);

    if confirm("Generate an AI app icon?", config.icon_asset.is_none())? {
        controller.request_icon().await;
        if controller.snapshot().config.icon_asset.is_some() {
            println!("{}", "  Icon ready.\n".green());
        }
    }

    match select("Next", &["Proceed", "Go back"], 0)? {
        0 => controller.advance().await,
        _ => controller.retreat(),
    }
    Ok(())
}

async fn step_features(controller: &WizardController) -> Result<()> {
    println!("{}", "  [3/5] Code & permissions\n".cyan());
    let config = controller.snapshot().config;

    let package_id = prompt_with_default("Android package id", &config.package_id)?;
    controller.set_package_id(&package_id);

    let permissions = toggle_permissions(&config.permissions)?;
    for permission in crate::types::Permission::ALL {
        controller.set_permission(permission, permissions.get(permission));
    }

    match select("Next", &["Initiate cloud build", "Go back"], 0)? {
        0 => {
            println!();
            controller.advance().await;
            // On failure the controller lands back here; the notice has
            // already been rendered by the event printer.
        }
        _ => controller.retreat(),
    }
    Ok(())
}

async fn step_store_listing(controller: &WizardController) -> Result<()> {
    println!("{}", "\n  [4/5] Store listing\n".cyan());

    if controller.snapshot().store_listing.is_none() {
        match select("Next", &["Optimize store listing", "Go back"], 0)? {
            0 => controller.request_store_listing().await,
            _ => {
                controller.retreat();
                return Ok(());
            }
        }
    }

    let Some(listing) = controller.snapshot().store_listing else {
        // Generation failed; stay on this step for retry.
        return Ok(());
    };

    println!("{}", format!("  Pitch:    {}", listing.short_pitch).white());
    println!("{}", format!("  Category: {}", listing.category).white());
    println!(
        "{}",
        format!("  Tags:     {}\n", listing.tags.join(", ")).white()
    );

    match select("Next", &["Finalize bundle", "Go back"], 0)? {
        0 => controller.advance().await,
        _ => controller.retreat(),
    }
    Ok(())
}

fn step_complete(controller: &WizardController, out_dir: &Path) -> Result<()> {
    println!("{}", "\n  [5/5] Build ready\n".cyan());

    let artifact = controller.export_artifact(out_dir)?;
    println!(
        "{}",
        format!("  APK:        {}", artifact.display()).green()
    );

    let kit = controller.export_source_kit(out_dir)?;
    println!("{}", format!("  Source kit: {}\n", kit.display()).green());

    println!(
        "{}",
        "  Artifacts finalized. This is a simulated build output.".dimmed()
    );
    Ok(())
}

// ---- Event rendering --------------------------------------------------------

/// Render controller events in the background: build log lines as they
/// are delivered, progress on completion, and dismissible notices.
fn spawn_event_printer(mut rx: broadcast::Receiver<WizardEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(WizardEvent::StepChanged(WizardStep::Generating)) => {
                    println!("{}", "  Generating project architecture...".cyan());
                }
                Ok(WizardEvent::StepChanged(WizardStep::Building)) => {
                    println!("{}", "  Cloud engine output:".cyan());
                }
                Ok(WizardEvent::BuildLine { index, line, .. }) => {
                    let rendered = format!("  {:02}  {}", index + 1, line);
                    if line.message.contains("SUCCESSFUL") {
                        println!("{}", rendered.green());
                    } else {
                        println!("{}", rendered.dimmed());
                    }
                }
                Ok(WizardEvent::BuildProgress(progress)) if progress >= 100.0 => {
                    println!("{}", "  100% compiled".green());
                }
                Ok(WizardEvent::Notice(notice)) => {
                    println!("{}", format!("  {}", notice.message).yellow());
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
