use super::replies::{profile, say_error};
use crate::core::server_status::PlayerListSource;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Check whether the Minecraft server is online
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn mcstatus(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    let profile = profile(ctx).await?;

    match ctx.data().status.query_status(&profile).await {
        Ok(status) => {
            ctx.say(format!(
                "✅ **Online!** {}/{} players\nLatency: {} ms",
                status.players_online,
                status.players_max,
                status.latency.as_millis()
            ))
            .await?;
            Ok(())
        }
        Err(e) => say_error(ctx, &e).await,
    }
}

/// List the players currently online
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn mcplayers(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    let profile = profile(ctx).await?;

    let players = match ctx.data().status.query_players(&profile).await {
        Ok(players) => players,
        Err(e) => return say_error(ctx, &e).await,
    };

    let reply = if players.online == 0 {
        format!("No players online. (0/{})", players.max)
    } else if players.names.is_empty() {
        format!(
            "👥 {}/{} players online, but the server hides their names.",
            players.online, players.max
        )
    } else {
        let mut text = format!(
            "👥 **Players online ({}/{}):** {}",
            players.online,
            players.max,
            players.names.join(", ")
        );
        let hidden = (players.online as usize).saturating_sub(players.names.len());
        if players.source == PlayerListSource::StatusSample && hidden > 0 {
            text.push_str(&format!(" and {} more", hidden));
        }
        text
    };

    ctx.say(reply).await?;
    Ok(())
}

/// Show server address, version, players and latency
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn mcinfo(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    let profile = profile(ctx).await?;

    let status = match ctx.data().status.query_status(&profile).await {
        Ok(status) => status,
        Err(e) => return say_error(ctx, &e).await,
    };

    let mut embed = serenity::CreateEmbed::new()
        .title("Minecraft Server Info")
        .color(0x00ff00)
        .field("IP", format!("`{}`", profile.address()), false)
        .field("Version", &status.version, true)
        .field(
            "Players",
            format!("{}/{}", status.players_online, status.players_max),
            true,
        )
        .field("Latency", format!("{} ms", status.latency.as_millis()), true);
    if !status.motd.is_empty() {
        embed = embed.description(&status.motd);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Measure the round trip to the Minecraft server
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn mcping(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    let profile = profile(ctx).await?;

    match ctx.data().status.ping(&profile).await {
        Ok(latency) => {
            ctx.say(format!("🏓 Ping: {} ms", latency.as_millis())).await?;
            Ok(())
        }
        Err(e) => say_error(ctx, &e).await,
    }
}

/// Show the in-game time of day (RCON)
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn mctime(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    let profile = profile(ctx).await?;

    match ctx.data().rcon.time_of_day(&profile).await {
        Ok(reply) => {
            ctx.say(format!("🕒 In-game time: {}", reply.trim())).await?;
            Ok(())
        }
        Err(e) => say_error(ctx, &e).await,
    }
}

/// Show the world seed (RCON)
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn mcseed(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    let profile = profile(ctx).await?;

    match ctx.data().rcon.seed(&profile).await {
        Ok(reply) => {
            ctx.say(format!("🌱 World seed: {}", reply.trim())).await?;
            Ok(())
        }
        Err(e) => say_error(ctx, &e).await,
    }
}

/// Stop the Minecraft server (RCON, admin only)
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn mcstop(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    let profile = profile(ctx).await?;

    match ctx.data().rcon.stop(&profile).await {
        Ok(_) => {
            tracing::info!(
                guild_id = ?ctx.guild_id(),
                user_id = %ctx.author().id,
                address = %profile.address(),
                "Server stop requested"
            );
            ctx.say("🔌 Server stopping…").await?;
            Ok(())
        }
        Err(e) => say_error(ctx, &e).await,
    }
}
