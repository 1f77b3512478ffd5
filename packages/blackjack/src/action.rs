use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Hit,
    Stand,
    Split,
    Double,
    Surrender,
}

impl Action {
    /// Menu order.
    pub const ALL: [Action; 5] = [
        Action::Hit,
        Action::Stand,
        Action::Split,
        Action::Double,
        Action::Surrender,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Hit => "hit",
            Action::Stand => "stand",
            Action::Split => "split",
            Action::Double => "double",
            Action::Surrender => "surrender",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseActionError(pub String);

impl fmt::Display for ParseActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action '{}'", self.0)
    }
}

impl std::error::Error for ParseActionError {}

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hit" => Ok(Action::Hit),
            "stand" => Ok(Action::Stand),
            "split" => Ok(Action::Split),
            "double" | "double down" => Ok(Action::Double),
            "surrender" => Ok(Action::Surrender),
            other => Err(ParseActionError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actions() {
        assert_eq!("hit".parse::<Action>(), Ok(Action::Hit));
        assert_eq!("  Stand ".parse::<Action>(), Ok(Action::Stand));
        assert_eq!("double down".parse::<Action>(), Ok(Action::Double));
        assert!("fold".parse::<Action>().is_err());
    }

    #[test]
    fn test_display_matches_parse() {
        for action in Action::ALL {
            assert_eq!(action.to_string().parse::<Action>(), Ok(action));
        }
    }
}
