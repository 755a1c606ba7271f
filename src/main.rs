// Entry point of the Minecraft guild bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (config resolution, status, RCON, waypoints)
// - `infra/` = Implementations of core traits (JSON files, Minecraft protocols)
// - `discord/` = Discord-specific adapters (commands)
//
// This file loads settings, wires the services together and starts poise.

#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;
mod settings;

use crate::core::guild_config::GuildConfigService;
use crate::core::remote_console::RemoteConsoleService;
use crate::core::server_status::ServerStatusService;
use crate::core::waypoints::WaypointService;
use crate::discord::{Data, Error};
use crate::infra::minecraft::{JavaStatusClient, TcpRconClient};
use crate::infra::storage::JsonDocumentStore;
use crate::settings::BotSettings;
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    if let Err(e) = run().await {
        tracing::error!("Bot stopped: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let settings = BotSettings::from_env()?;
    let data = build_data(&settings).await?;

    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: discord::commands::all(),
            prefix_options: prefix_options(),
            pre_command: |ctx| {
                Box::pin(async move {
                    tracing::debug!(
                        command = %ctx.command().qualified_name,
                        user = %ctx.author().tag(),
                        guild_id = ?ctx.guild_id(),
                        "Command invoked"
                    );
                })
            },
            post_command: |ctx| {
                Box::pin(async move {
                    tracing::info!(
                        command = %ctx.command().qualified_name,
                        user = %ctx.author().tag(),
                        guild_id = ?ctx.guild_id(),
                        "Command completed"
                    );
                })
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                tracing::info!(user = %ready.user.name, guilds = ready.guilds.len(), "Connected to Discord");

                // Global registration can take a while to propagate.
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!(
                    count = framework.options().commands.len(),
                    "Commands registered"
                );

                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&settings.discord_token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;
    Ok(())
}

/// Prefixes are resolved per message only. A static `prefix` would keep
/// matching `!` after a guild switched to its own prefix.
fn prefix_options() -> poise::PrefixFrameworkOptions<Data, Error> {
    poise::PrefixFrameworkOptions {
        prefix: None,
        dynamic_prefix: Some(|ctx| {
            Box::pin(async move {
                let guild_id = ctx.guild_id.map(|id| id.get());
                Ok(Some(ctx.data.guild_config.command_prefix(guild_id).await))
            })
        }),
        ..Default::default()
    }
}

/// Composition root: load both documents and build the services around them.
async fn build_data(settings: &BotSettings) -> anyhow::Result<Data> {
    let config_store = JsonDocumentStore::new(&settings.server_config_path);
    let guild_config = GuildConfigService::new(config_store, settings.defaults.clone())
        .await
        .with_context(|| {
            format!(
                "Failed to load guild configs from {}",
                settings.server_config_path.display()
            )
        })?;

    let waypoint_store = JsonDocumentStore::new(&settings.waypoints_path);
    let waypoints = WaypointService::new(waypoint_store)
        .await
        .with_context(|| {
            format!(
                "Failed to load waypoints from {}",
                settings.waypoints_path.display()
            )
        })?;

    tracing::info!(
        default_address = %format!("{}:{}", settings.defaults.host, settings.defaults.port),
        timeout_secs = settings.network_timeout.as_secs(),
        "Services ready"
    );

    Ok(Data {
        guild_config: Arc::new(guild_config),
        status: Arc::new(ServerStatusService::new(JavaStatusClient::new(
            settings.network_timeout,
        ))),
        rcon: Arc::new(RemoteConsoleService::new(TcpRconClient::new(
            settings.network_timeout,
        ))),
        waypoints: Arc::new(waypoints),
    })
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!(
                command = %ctx.command().qualified_name,
                user = %ctx.author().tag(),
                guild_id = ?ctx.guild_id(),
                "Command failed: {:?}",
                error
            );
            let _ = ctx
                .send(
                    poise::CreateReply::default()
                        .content("⚠️ Something went wrong running that command.")
                        .ephemeral(true),
                )
                .await;
        }
        poise::FrameworkError::MissingUserPermissions { ctx, .. } => {
            let _ = ctx
                .send(
                    poise::CreateReply::default()
                        .content("🚫 You need the Administrator permission to use this command.")
                        .ephemeral(true),
                )
                .await;
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling error: {}", e);
            }
        }
    }
}
