/// Multiplayer client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// JSON-lines file every game event is appended to
    pub event_log: Option<String>,
    /// Our name on the leaderboard
    pub player: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9700,
            event_log: None,
            player: None,
        }
    }
}

impl ClientConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("TETRECS_HOST").unwrap_or(defaults.host);
        let port = env::var("TETRECS_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        Self {
            host,
            port,
            event_log: non_empty(env::var("TETRECS_EVENT_LOG").ok()),
            player: non_empty(env::var("TETRECS_PLAYER").ok()),
        }
    }

    /// `host:port` as shown in logs and errors
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .and_then(|s| if s.is_empty() { None } else { Some(s) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_address() {
        assert_eq!(ClientConfig::default().address(), "127.0.0.1:9700");

        let config = ClientConfig {
            host: "localhost".to_string(),
            port: 1234,
            ..ClientConfig::default()
        };
        assert_eq!(config.address(), "localhost:1234");
    }

    #[test]
    fn test_blank_values_are_unset() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some(" log.jsonl ".to_string())), Some("log.jsonl".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
