// Small helpers shared by the command files.

use crate::core::guild_config::GuildConnectionProfile;
use crate::core::server_error::ServerError;
use crate::discord::{Context, Error};

pub fn guild_id(ctx: Context<'_>) -> Result<u64, Error> {
    Ok(ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get())
}

/// Effective connection profile for the invoking guild.
pub async fn profile(ctx: Context<'_>) -> Result<GuildConnectionProfile, Error> {
    let guild_id = guild_id(ctx)?;
    Ok(ctx.data().guild_config.resolve(guild_id).await)
}

/// Reply with the stable message for `err`. Slash replies are ephemeral.
pub async fn say_error(ctx: Context<'_>, err: &ServerError) -> Result<(), Error> {
    tracing::debug!(
        command = %ctx.command().qualified_name,
        guild_id = ?ctx.guild_id(),
        error = %err,
        "Command finished with a server error"
    );
    say_ephemeral(ctx, err.user_message()).await
}

pub async fn say_ephemeral(ctx: Context<'_>, text: impl Into<String>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(text.into())
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Whether the invoking member has the Administrator permission.
pub async fn author_is_admin(ctx: Context<'_>) -> bool {
    let Some(member) = ctx.author_member().await else {
        return false;
    };

    // Interactions carry resolved permissions; prefix commands go through the cache.
    if let Some(permissions) = member.permissions {
        return permissions.administrator();
    }

    ctx.guild()
        .map(|guild| guild.member_permissions(&member).administrator())
        .unwrap_or(false)
}
