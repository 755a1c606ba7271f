// Parsers for vanilla scoreboard command replies. RCON replies are plain text,
// so these stay tolerant: anything unrecognised yields an empty result rather
// than an error.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub player: String,
    pub score: i64,
}

/// `scoreboard objectives list` →
/// `There are 2 objective(s): [deaths] (deaths), [kills] (kills)`
pub fn parse_objectives(reply: &str) -> Vec<String> {
    let Some((_, list)) = reply.split_once(':') else {
        return Vec::new();
    };

    list.split(',')
        .filter_map(|item| item.split_whitespace().next())
        .map(|name| name.trim_matches(|c| c == '[' || c == ']').to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// `scoreboard players get Steve deaths` → `Steve has 4 [deaths]`.
/// Missing scores come back as `0`, matching how the bot reports them.
pub fn parse_score(reply: &str) -> i64 {
    let tail = reply.split_once(" has ").map_or(reply, |(_, rest)| rest);
    first_integer(tail).unwrap_or(0)
}

/// `scoreboard players list <objective>` style replies of the form
/// `...: Steve has 4, Alex has 9`. Sorted by score, highest first.
pub fn parse_leaderboard(reply: &str) -> Vec<ScoreEntry> {
    let Some((_, list)) = reply.split_once(':') else {
        return Vec::new();
    };

    let mut entries: Vec<ScoreEntry> = list
        .split(',')
        .filter_map(|part| {
            let mut words = part.split_whitespace();
            let player = words.next()?;
            if words.next()? != "has" {
                return None;
            }
            let score = words.next()?.parse::<i64>().ok()?;
            Some(ScoreEntry {
                player: player.to_string(),
                score,
            })
        })
        .collect();

    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries
}

fn first_integer(text: &str) -> Option<i64> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let negative = bytes[i] == b'-' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
        if bytes[i].is_ascii_digit() || negative {
            let start = i;
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            return text[start..i].parse().ok();
        }
        i += 1;
    }
    None
}
