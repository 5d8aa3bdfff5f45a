use serde::{Deserialize, Serialize};

/// The three mutually exclusive console panels
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum View {
    #[default]
    Home,
    Config,
    System,
}

impl View {
    /// Resolve a navigation token (the location fragment, with or without
    /// its leading `#`). Anything unrecognized selects `Home`.
    pub fn from_token(token: &str) -> Self {
        match token.strip_prefix('#').unwrap_or(token) {
            "config" => Self::Config,
            "system" => Self::System,
            _ => Self::Home,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Config => "config",
            Self::System => "system",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tokens() {
        assert_eq!(View::from_token("home"), View::Home);
        assert_eq!(View::from_token("config"), View::Config);
        assert_eq!(View::from_token("#config"), View::Config);
        assert_eq!(View::from_token("system"), View::System);
        assert_eq!(View::from_token("#system"), View::System);
    }

    #[test]
    fn unknown_tokens_fall_back_to_home() {
        for token in [
            "", "#", "firmware", "#firmware", "Config", "SYSTEM", "config/x", "##config", " home",
        ] {
            assert_eq!(View::from_token(token), View::Home, "token {token:?}");
        }
    }
}
