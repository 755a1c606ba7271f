use super::replies::{guild_id, say_ephemeral, say_error};
use crate::core::guild_config::{parse_config_args, ConfigError, ConfigUpdate};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Set the Minecraft server IP, port and RCON password for this server (admin only).
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn config(
    ctx: Context<'_>,
    #[description = "Minecraft server IP or hostname"] ip: String,
    #[description = "Minecraft server port (default 25565)"] port: Option<u16>,
    #[description = "RCON password (optional)"] password: Option<String>,
) -> Result<(), Error> {
    let update = ConfigUpdate {
        host: Some(ip),
        port,
        password,
        prefix: None,
    };
    apply(ctx, update).await
}

/// Like `config`, but also accepts `ip=`, `port=` and `pw=` pairs (admin only).
#[poise::command(prefix_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn setserverinfo(
    ctx: Context<'_>,
    #[description = "<ip> [port] [password] or ip=<ip> port=<port> pw=<password>"]
    #[rest]
    args: Option<String>,
) -> Result<(), Error> {
    match parse_config_args(args.as_deref().unwrap_or_default()) {
        Ok(update) => apply(ctx, update).await,
        Err(e) => say_error(ctx, &e).await,
    }
}

/// Change the bot's command prefix for this server (admin only).
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn prefix(
    ctx: Context<'_>,
    #[description = "The new command prefix (e.g. !, $)"] new_prefix: String,
) -> Result<(), Error> {
    let guild_id = guild_id(ctx)?;
    match ctx.data().guild_config.set_prefix(guild_id, &new_prefix).await {
        Ok(()) => say_ephemeral(ctx, format!("✅ Prefix set to `{}`", new_prefix)).await,
        Err(e) => say_config_error(ctx, e).await,
    }
}

/// Show the Minecraft server this Discord server talks to (admin only).
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn configshow(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(ctx)?;
    let data = ctx.data();
    let profile = data.guild_config.resolve(guild_id).await;
    let record = data.guild_config.record(guild_id).await.unwrap_or_default();
    let prefix = data.guild_config.prefix_for(guild_id).await;

    let origin = |overridden: bool| if overridden { "" } else { " (default)" };
    let rcon = if profile.has_rcon() {
        "configured"
    } else {
        "not set"
    };

    let embed = serenity::CreateEmbed::new()
        .title("⚙️ Server configuration")
        .color(0x00ff00)
        .field(
            "Host",
            format!("`{}`{}", profile.host, origin(record.ip.is_some())),
            true,
        )
        .field(
            "Port",
            format!("`{}`{}", profile.port, origin(record.port.is_some())),
            true,
        )
        .field(
            "RCON password",
            format!("{}{}", rcon, origin(record.password.is_some())),
            true,
        )
        .field(
            "Prefix",
            format!("`{}`{}", prefix, origin(record.prefix.is_some())),
            true,
        );

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

async fn apply(ctx: Context<'_>, update: ConfigUpdate) -> Result<(), Error> {
    let guild_id = guild_id(ctx)?;
    let summary = update.describe().join(", ");

    match ctx.data().guild_config.apply_update(guild_id, update).await {
        Ok(_) => say_ephemeral(ctx, format!("✅ Config updated: {}", summary)).await,
        Err(e) => say_config_error(ctx, e).await,
    }
}

async fn say_config_error(ctx: Context<'_>, err: ConfigError) -> Result<(), Error> {
    match err {
        ConfigError::Invalid(reason) => say_ephemeral(ctx, format!("❌ Invalid value: {}", reason)).await,
        ConfigError::Store(e) => {
            tracing::error!(guild_id = ?ctx.guild_id(), error = %e, "Failed to persist guild config");
            say_ephemeral(
                ctx,
                "⚠️ Couldn't save the configuration, so nothing was changed. Please try again.",
            )
            .await
        }
    }
}
