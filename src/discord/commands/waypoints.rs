use super::replies::{author_is_admin, guild_id, say_ephemeral, say_error};
use crate::core::waypoints::{display_name, parse_waypoint_args, Coordinates, WaypointError};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;
use std::num::NonZeroU64;

const PER_PAGE: usize = 5;

/// Save a named location for this server
#[poise::command(slash_command, guild_only)]
pub async fn waypointadd(
    ctx: Context<'_>,
    #[description = "X coordinate"] x: i64,
    #[description = "Z coordinate"] z: i64,
    #[description = "Waypoint name"] name: String,
    #[description = "Y coordinate (height, optional)"] y: Option<i64>,
) -> Result<(), Error> {
    add_waypoint(ctx, Coordinates { x, y, z }, &name).await
}

/// Save a named location: `<x> [y] <z> <name>`
///
/// Only its prefix action is used; `command_catalog` grafts it onto the
/// slash `waypointadd` so both forms share one name.
#[poise::command(prefix_command, guild_only, rename = "waypointadd")]
pub async fn waypointadd_prefix(
    ctx: Context<'_>,
    #[description = "<x> [y] <z> <name>"]
    #[rest]
    args: Option<String>,
) -> Result<(), Error> {
    match parse_waypoint_args(args.as_deref().unwrap_or_default()) {
        Ok((coords, name)) => add_waypoint(ctx, coords, &name).await,
        Err(e) => say_error(ctx, &e).await,
    }
}

async fn add_waypoint(ctx: Context<'_>, coords: Coordinates, name: &str) -> Result<(), Error> {
    let guild_id = guild_id(ctx)?;
    let author = ctx.author().id.get();

    match ctx
        .data()
        .waypoints
        .add(guild_id, name, coords, author)
        .await
    {
        Ok((key, waypoint)) => {
            ctx.say(format!(
                "📍 Waypoint **{}** saved at {}",
                display_name(&key),
                waypoint.coordinates()
            ))
            .await?;
            Ok(())
        }
        Err(e) => say_waypoint_error(ctx, e).await,
    }
}

/// Remove a waypoint you created (admins can remove any)
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn waypointremove(
    ctx: Context<'_>,
    #[description = "Waypoint name"]
    #[rest]
    name: String,
) -> Result<(), Error> {
    let guild_id = guild_id(ctx)?;
    let is_admin = author_is_admin(ctx).await;

    match ctx
        .data()
        .waypoints
        .remove(guild_id, &name, ctx.author().id.get(), is_admin)
        .await
    {
        Ok(key) => {
            ctx.say(format!("🗑️ Waypoint **{}** removed.", display_name(&key)))
                .await?;
            Ok(())
        }
        Err(e) => say_waypoint_error(ctx, e).await,
    }
}

/// List this server's waypoints
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn waypoints(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(ctx)?;
    let entries = ctx.data().waypoints.list(guild_id).await;

    if entries.is_empty() {
        ctx.say("No waypoints saved yet. Add one with `waypointadd <x> <z> <name> [y]`.")
            .await?;
        return Ok(());
    }

    let total_pages = entries.len().div_ceil(PER_PAGE);
    let pages: Vec<String> = entries
        .chunks(PER_PAGE)
        .enumerate()
        .map(|(i, chunk)| {
            let lines = chunk
                .iter()
                .map(|(key, wp)| format!("**{}**: {}", display_name(key), wp.coordinates()))
                .collect::<Vec<_>>()
                .join("\n");
            format!("📍 **Waypoints**\n{}\n\nPage {}/{}", lines, i + 1, total_pages)
        })
        .collect();
    let pages: Vec<&str> = pages.iter().map(String::as_str).collect();

    poise::builtins::paginate(ctx, &pages).await?;
    Ok(())
}

/// Show details for one waypoint
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn waypointinfo(
    ctx: Context<'_>,
    #[description = "Waypoint name"]
    #[rest]
    name: String,
) -> Result<(), Error> {
    let guild_id = guild_id(ctx)?;

    let (key, waypoint) = match ctx.data().waypoints.info(guild_id, &name).await {
        Ok(found) => found,
        Err(e) => return say_waypoint_error(ctx, e).await,
    };

    let added_by = match (ctx.guild_id(), author_id(waypoint.added_by)) {
        (Some(gid), Some(user_id)) => match gid.member(ctx, user_id).await {
            Ok(member) => member.display_name().to_string(),
            Err(_) => "Unknown".to_string(),
        },
        _ => "Unknown".to_string(),
    };

    let embed = serenity::CreateEmbed::new()
        .title(format!("📍 {}", display_name(&key)))
        .color(0x3498db)
        .field("Coordinates", waypoint.coordinates(), false)
        .field("Added by", added_by, true)
        .field("Added on", &waypoint.added_at, true);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Discord ids are never zero; a hand-edited document might still hold one.
fn author_id(added_by: u64) -> Option<serenity::UserId> {
    NonZeroU64::new(added_by).map(serenity::UserId::from)
}

async fn say_waypoint_error(ctx: Context<'_>, err: WaypointError) -> Result<(), Error> {
    match err {
        WaypointError::Store(e) => {
            tracing::error!(guild_id = ?ctx.guild_id(), error = %e, "Failed to persist waypoints");
            say_ephemeral(
                ctx,
                "⚠️ Couldn't save waypoints, so nothing was changed. Please try again.",
            )
            .await
        }
        other => say_ephemeral(ctx, format!("❌ {}", other)).await,
    }
}
