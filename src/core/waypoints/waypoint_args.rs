// Parsing for the prefix form of `waypointadd`:
//   <x> <z> <name...>
//   <x> <y> <z> <name...>
// Names may be several unquoted words.

use super::waypoint_models::Coordinates;
use crate::core::server_error::ServerError;

const USAGE: &str = "Usage: `waypointadd <x> [y] <z> <name>`";

pub fn parse_waypoint_args(raw: &str) -> Result<(Coordinates, String), ServerError> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();

    let numbers: Vec<i64> = tokens
        .iter()
        .take(3)
        .map_while(|t| t.parse::<i64>().ok())
        .collect();

    // Three leading numbers only mean x y z when a name follows them.
    let (coords, used) = match numbers.as_slice() {
        [x, y, z] if tokens.len() > 3 => (
            Coordinates {
                x: *x,
                y: Some(*y),
                z: *z,
            },
            3,
        ),
        [x, z, ..] => (Coordinates { x: *x, y: None, z: *z }, 2),
        _ => {
            return Err(ServerError::Validation(format!(
                "Coordinates must be whole numbers. {}",
                USAGE
            )))
        }
    };

    let name = tokens[used..].join(" ");
    if name.is_empty() {
        return Err(ServerError::Validation(format!(
            "You must provide a name. {}",
            USAGE
        )));
    }
    Ok((coords, name))
}
