use anyhow::{Context, bail};

pub const DEFAULT_ROOMS: [&str; 3] = ["General", "Random", "Tech"];

/// Process settings, read once at startup.
///
/// Every key can be set in the environment or in a `.env` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    pub rooms: Vec<String>,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: "0.0.0.0".to_owned(),
            port: 3000,
            rooms: DEFAULT_ROOMS.iter().map(|&room| room.to_owned()).collect(),
            log_json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Config::default();

        if let Some(bind) = lookup("ROOMRELAY_BIND") {
            config.bind = bind.trim().to_owned();
        }
        if let Some(port) = lookup("ROOMRELAY_PORT") {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("ROOMRELAY_PORT={port} is not a port"))?;
        }
        if let Some(rooms) = lookup("ROOMRELAY_ROOMS") {
            config.rooms = parse_rooms(&rooms)?;
        }
        if let Some(json) = lookup("ROOMRELAY_LOG_JSON") {
            config.log_json = matches!(json.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn parse_rooms(raw: &str) -> anyhow::Result<Vec<String>> {
    let mut rooms: Vec<String> = Vec::new();
    for room in raw.split(',').map(str::trim).filter(|room| !room.is_empty()) {
        if !rooms.iter().any(|seen| seen == room) {
            rooms.push(room.to_owned());
        }
    }
    if rooms.is_empty() {
        bail!("ROOMRELAY_ROOMS={raw:?} names no rooms");
    }
    Ok(rooms)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.rooms, ["General", "Random", "Tech"]);
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn overrides() {
        let config = Config::from_lookup(lookup(&[
            ("ROOMRELAY_BIND", "127.0.0.1"),
            ("ROOMRELAY_PORT", " 8080 "),
            ("ROOMRELAY_ROOMS", "Lobby, Rust ,,Lobby"),
            ("ROOMRELAY_LOG_JSON", "TRUE"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.rooms, ["Lobby", "Rust"]);
        assert!(config.log_json);
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(Config::from_lookup(lookup(&[("ROOMRELAY_PORT", "eighty")])).is_err());
        assert!(Config::from_lookup(lookup(&[("ROOMRELAY_PORT", "70000")])).is_err());
        assert!(Config::from_lookup(lookup(&[("ROOMRELAY_ROOMS", " , ,")])).is_err());
    }
}
