use super::replies::{profile, say_error};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

const MAX_LEADERBOARD: usize = 25;

/// List the scoreboard objectives (RCON)
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn mcobjs(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    let profile = profile(ctx).await?;

    match ctx.data().rcon.objectives(&profile).await {
        Ok(objectives) if objectives.is_empty() => {
            ctx.say("📊 No scoreboard objectives found.").await?;
            Ok(())
        }
        Ok(objectives) => {
            ctx.say(format!("📊 Objectives: {}", objectives.join(", ")))
                .await?;
            Ok(())
        }
        Err(e) => say_error(ctx, &e).await,
    }
}

/// Show one player's score for an objective (RCON)
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn mcstat(
    ctx: Context<'_>,
    #[description = "Player name"] player: String,
    #[description = "Scoreboard objective"] objective: String,
) -> Result<(), Error> {
    ctx.defer().await?;
    let profile = profile(ctx).await?;

    match ctx
        .data()
        .rcon
        .player_score(&profile, &player, &objective)
        .await
    {
        Ok(score) => {
            ctx.say(format!("📈 **{}** has **{}** in `{}`", player, score, objective))
                .await?;
            Ok(())
        }
        Err(e) => say_error(ctx, &e).await,
    }
}

/// Top scores for an objective (RCON)
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn mcleaderboard(
    ctx: Context<'_>,
    #[description = "Scoreboard objective"] objective: String,
    #[description = "How many entries to show (default 5, max 25)"] count: Option<u32>,
) -> Result<(), Error> {
    ctx.defer().await?;
    let profile = profile(ctx).await?;
    let count = (count.unwrap_or(5) as usize).min(MAX_LEADERBOARD);

    let entries = match ctx
        .data()
        .rcon
        .leaderboard(&profile, &objective, count)
        .await
    {
        Ok(entries) => entries,
        Err(e) => return say_error(ctx, &e).await,
    };

    let description = if entries.is_empty() {
        "No scores recorded yet.".to_string()
    } else {
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("**{}.** {}: {}", i + 1, entry.player, entry.score))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let embed = serenity::CreateEmbed::new()
        .title(format!("🏆 Leaderboard: {}", objective))
        .color(0xf1c40f)
        .description(description);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
