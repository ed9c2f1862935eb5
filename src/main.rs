//! Campus - a tile-based campus game runtime
//!
//! This is the main entry point. It wires the world, the dialogue client and
//! the input sampler together and drives them at a fixed tick rate.

mod settings;

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use campus_core::TICKS_PER_SECOND;
use campus_game::{InputSampler, ModalView, RenderModel, WorldController};
use campus_integration::DialogueClient;
use campus_world::builtin_atlas;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::settings::Settings;

const DEFAULT_MAX_TICKS: u64 = 3600;
const SUMMARY_EVERY: u64 = 600;

fn main() -> Result<()> {
    // The log level lives in the settings, so their report waits for the subscriber
    let (settings, outcome) = Settings::load();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(settings.log_level())
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    info!("Starting Campus...");
    outcome.log();
    info!("Log level {}, portal cooldown {} ticks", settings.log_level(), settings.gameplay.portal_cooldown);

    let atlas = builtin_atlas().context("Built-in world failed validation")?;

    let mut client =
        DialogueClient::new(settings.llm.chat_options()).context("Failed to create dialogue client")?;
    match settings.llm.credentials() {
        Some(credentials) => client.configure(credentials),
        None => {
            info!("AI chat is off, NPCs use scripted lines");
            client.disable();
        }
    }

    let mut world = WorldController::new(atlas, settings.game_config(), Box::new(client));
    let mut input = InputSampler::new();

    let max_ticks = max_ticks();
    info!("Running {} ticks at {} ticks/s", max_ticks, TICKS_PER_SECOND);

    let step = Duration::from_secs(1) / TICKS_PER_SECOND;
    let mut next = Instant::now();
    for _ in 0..max_ticks {
        let model = world.tick(&input.sample());
        if model.tick % SUMMARY_EVERY == 0 {
            log_summary(&model);
        }

        next += step;
        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        } else {
            // Fell behind; don't try to catch up
            next = now;
        }
    }

    info!("Campus stopped after {} ticks", world.tick_count());
    Ok(())
}

fn max_ticks() -> u64 {
    match std::env::var("CAMPUS_MAX_TICKS") {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring CAMPUS_MAX_TICKS={:?}", value);
            DEFAULT_MAX_TICKS
        }),
        Err(_) => DEFAULT_MAX_TICKS,
    }
}

fn log_summary(model: &RenderModel) {
    let busy = model
        .npcs
        .iter()
        .filter(|npc| npc.state != campus_game::NpcState::Idle)
        .count();
    let modal = match &model.modal {
        ModalView::None => "none",
        ModalView::Menu => "menu",
        ModalView::AiConversation(_) => "ai conversation",
        ModalView::Scripted { .. } => "scripted",
        ModalView::Reading { .. } => "reading",
    };
    info!(
        "tick {} on {}: player at ({:.0}, {:.0}), {} NPCs ({} busy), score {:?}, modal {}, ai {}",
        model.tick,
        model.map.name(),
        model.player.position.x,
        model.player.position.y,
        model.npcs.len(),
        busy,
        model.score,
        modal,
        if model.ai_online { "online" } else { "offline" },
    );
}
