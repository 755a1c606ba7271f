use crate::discord::{Context, Data, Error};
use poise::serenity_prelude as serenity;
use std::collections::HashMap;

const CATEGORY_ORDER: &[&str] = &[
    "Server Waypoints",
    "Configuration",
    "Server Info",
    "RCON",
    "Stats",
];

fn category_emoji(category: &str) -> &'static str {
    match category {
        "Server Waypoints" => "📍",
        "Configuration" => "⚙️",
        "Server Info" => "🖥️",
        "RCON" => "🔌",
        "Stats" => "📊",
        _ => "•",
    }
}

struct CommandMetadata {
    category: &'static str,
    priority: i32,
    usage: &'static str,
    needs_rcon: bool,
}

fn command_metadata(name: &str) -> CommandMetadata {
    let (category, priority, usage, needs_rcon) = match name {
        "waypointadd" => ("Server Waypoints", 50, "<x> [y] <z> <name>", false),
        "waypointremove" => ("Server Waypoints", 40, "<name>", false),
        "waypoints" => ("Server Waypoints", 45, "", false),
        "waypointinfo" => ("Server Waypoints", 42, "<name>", false),
        "config" => ("Configuration", 50, "<ip> [port] [password]", false),
        "setserverinfo" => ("Configuration", 45, "<ip> [port] [password] | ip= port= pw=", false),
        "prefix" => ("Configuration", 40, "<new_prefix>", false),
        "configshow" => ("Configuration", 35, "", false),
        "mcstatus" => ("Server Info", 50, "", false),
        "mcplayers" => ("Server Info", 45, "", false),
        "mcinfo" => ("Server Info", 40, "", false),
        "mcping" => ("Server Info", 35, "", false),
        "mctime" => ("RCON", 50, "", true),
        "mcseed" => ("RCON", 45, "", true),
        "mcstop" => ("RCON", 10, "", true),
        "mcobjs" => ("Stats", 50, "", true),
        "mcstat" => ("Stats", 45, "<player> <objective>", true),
        "mcleaderboard" => ("Stats", 40, "<objective> [count]", true),
        _ => ("Server Info", 0, "", false),
    };
    CommandMetadata {
        category,
        priority,
        usage,
        needs_rcon,
    }
}

const RCON_FOOTER: &str = "* requires RCON to be configured";

/// Show a categorized list of commands, or details for one
#[poise::command(slash_command, prefix_command)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Command to show details for"] command: Option<String>,
) -> Result<(), Error> {
    let prefix = ctx
        .data()
        .guild_config
        .command_prefix(ctx.guild_id().map(|id| id.get()))
        .await;
    let commands = &ctx.framework().options().commands;

    let embed = match command {
        Some(query) => match find_command(commands, &query) {
            Some(found) => detail_embed(&command_detail(&prefix, found)),
            None => {
                ctx.send(
                    poise::CreateReply::default()
                        .content(format!(
                            "❌ No command named `{}`. Try `{}help`.",
                            query.trim(),
                            prefix
                        ))
                        .ephemeral(true),
                )
                .await?;
                return Ok(());
            }
        },
        None => overview_embed(&prefix, commands),
    };

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Look a command up by name, ignoring case and a leading prefix or slash.
fn find_command<'a>(
    commands: &'a [poise::Command<Data, Error>],
    query: &str,
) -> Option<&'a poise::Command<Data, Error>> {
    let name = query
        .trim()
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    commands
        .iter()
        .filter(|c| !c.hide_in_help)
        .find(|c| c.name == name || c.aliases.iter().any(|a| *a == name))
}

struct CommandDetail {
    title: String,
    description: String,
    forms: &'static str,
    needs_rcon: bool,
}

fn command_detail(prefix: &str, command: &poise::Command<Data, Error>) -> CommandDetail {
    let metadata = command_metadata(&command.name);
    let mut title = format!("{}{}", prefix, command.name);
    if !metadata.usage.is_empty() {
        title.push(' ');
        title.push_str(metadata.usage);
    }

    let description = command
        .help_text
        .as_deref()
        .or(command.description.as_deref())
        .unwrap_or("No description provided.")
        .to_string();

    let forms = match (command.prefix_action.is_some(), command.slash_action.is_some()) {
        (true, true) => "Prefix and slash",
        (true, false) => "Prefix only",
        (false, true) => "Slash only",
        (false, false) => "Neither",
    };

    CommandDetail {
        title,
        description,
        forms,
        needs_rcon: metadata.needs_rcon,
    }
}

fn detail_embed(detail: &CommandDetail) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(&detail.title)
        .description(&detail.description)
        .color(0x00ff00)
        .field("Available as", detail.forms, true);
    if detail.needs_rcon {
        embed = embed.footer(serenity::CreateEmbedFooter::new(RCON_FOOTER));
    }
    embed
}

fn overview_embed(prefix: &str, commands: &[poise::Command<Data, Error>]) -> serenity::CreateEmbed {
    let mut categories: HashMap<&str, Vec<(i32, String)>> = HashMap::new();

    for command in commands {
        if command.hide_in_help || command.name == "help" {
            continue;
        }

        let metadata = command_metadata(&command.name);
        let description = command
            .description
            .as_deref()
            .unwrap_or("No description provided.");

        let mut entry = format!("• `{}{}", prefix, command.name);
        if !metadata.usage.is_empty() {
            entry.push(' ');
            entry.push_str(metadata.usage);
        }
        entry.push('`');
        if metadata.needs_rcon {
            entry.push('*');
        }
        entry.push_str(&format!(": {}", description));
        if command.slash_action.is_none() {
            entry.push_str(" (prefix only)");
        }

        categories
            .entry(metadata.category)
            .or_default()
            .push((metadata.priority, entry));
    }

    let mut embed = serenity::CreateEmbed::new()
        .title("Minecraft Bot Commands")
        .description(format!(
            "This server's prefix is `{}`. Commands also work as slash commands \
            unless marked (prefix only). Use `{}help <command>` for details.",
            prefix, prefix
        ))
        .color(0x00ff00);

    let mut sorted: Vec<&str> = categories.keys().copied().collect();
    sorted.sort_by_key(|c| {
        (
            CATEGORY_ORDER.iter().position(|x| x == c).unwrap_or(usize::MAX),
            *c,
        )
    });

    for category in sorted {
        if let Some(entries) = categories.get_mut(category) {
            entries.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
            let body = entries
                .iter()
                .map(|(_, line)| line.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            embed = embed.field(
                format!("{} {}", category_emoji(category), category),
                body,
                false,
            );
        }
    }

    embed.footer(serenity::CreateEmbedFooter::new(RCON_FOOTER))
}
