// Parsing for the free-form `setserverinfo` arguments.
//
// Accepts positional `<ip> [port] [password]`, `key=value` pairs, or a mix.
// Keyed values win over positional ones.

use super::guild_config_models::ConfigUpdate;
use crate::core::server_error::ServerError;

pub fn parse_config_args(raw: &str) -> Result<ConfigUpdate, ServerError> {
    let mut update = ConfigUpdate::default();
    let mut positional = Vec::new();

    for arg in raw.split_whitespace() {
        match arg.split_once('=') {
            Some((key, value)) => match key.to_lowercase().as_str() {
                "ip" | "host" => update.host = Some(value.to_string()),
                "port" => update.port = Some(parse_port(value)?),
                "pw" | "password" | "rcon" => update.password = Some(value.to_string()),
                _ => {
                    return Err(ServerError::Validation(format!(
                        "Unknown parameter `{}`.",
                        key
                    )))
                }
            },
            None => positional.push(arg),
        }
    }

    if positional.len() > 3 {
        return Err(ServerError::Validation("Too many arguments.".to_string()));
    }

    let mut positional = positional.into_iter();
    if let Some(host) = positional.next() {
        update.host.get_or_insert_with(|| host.to_string());
    }
    if let Some(port) = positional.next() {
        if update.port.is_none() {
            update.port = Some(parse_port(port)?);
        }
    }
    if let Some(password) = positional.next() {
        update.password.get_or_insert_with(|| password.to_string());
    }

    match update.host.as_deref() {
        Some(host) if !host.is_empty() => Ok(update),
        _ => Err(ServerError::Validation(
            "You must specify at least an IP.".to_string(),
        )),
    }
}

pub fn parse_port(value: &str) -> Result<u16, ServerError> {
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ServerError::Validation(
            "`port` must be a number between 1 and 65535.".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_arguments() {
        let update = parse_config_args("mc.example.net 25566 secret").unwrap();
        assert_eq!(update.host.as_deref(), Some("mc.example.net"));
        assert_eq!(update.port, Some(25566));
        assert_eq!(update.password.as_deref(), Some("secret"));
    }

    #[test]
    fn host_only() {
        let update = parse_config_args("mc.example.net").unwrap();
        assert_eq!(update.host.as_deref(), Some("mc.example.net"));
        assert_eq!(update.port, None);
        assert_eq!(update.password, None);
    }

    #[test]
    fn keyed_arguments_with_aliases() {
        let update = parse_config_args("host=mc.example.net PORT=25570 rcon=hunter2").unwrap();
        assert_eq!(update.host.as_deref(), Some("mc.example.net"));
        assert_eq!(update.port, Some(25570));
        assert_eq!(update.password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn keyed_values_take_precedence_over_positional() {
        let update = parse_config_args("ip=a.example.net b.example.net 25570").unwrap();
        assert_eq!(update.host.as_deref(), Some("a.example.net"));
        assert_eq!(update.port, Some(25570));
    }

    #[test]
    fn password_may_contain_equals_sign() {
        let update = parse_config_args("ip=mc.example.net pw=a=b").unwrap();
        assert_eq!(update.password.as_deref(), Some("a=b"));
    }

    #[test]
    fn rejects_non_numeric_port() {
        assert!(matches!(
            parse_config_args("mc.example.net abc"),
            Err(ServerError::Validation(_))
        ));
        assert!(matches!(
            parse_config_args("ip=mc.example.net port=70000"),
            Err(ServerError::Validation(_))
        ));
    }

    #[test]
    fn rejects_unknown_key_and_extra_args() {
        assert_eq!(
            parse_config_args("ip=mc.example.net motd=hi"),
            Err(ServerError::Validation("Unknown parameter `motd`.".into()))
        );
        assert_eq!(
            parse_config_args("a 1 b c"),
            Err(ServerError::Validation("Too many arguments.".into()))
        );
    }

    #[test]
    fn requires_an_ip() {
        assert!(matches!(
            parse_config_args(""),
            Err(ServerError::Validation(_))
        ));
        assert!(matches!(
            parse_config_args("port=25565"),
            Err(ServerError::Validation(_))
        ));
    }
}
