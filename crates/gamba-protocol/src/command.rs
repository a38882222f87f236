//! Chat command parsing.
//!
//! A command line is whatever followed the leading `:` of an outgoing chat
//! message. By default the keywords are matched by *suffix* and
//! case-sensitively, so `:lets roll` starts poker just like `:roll` does.
//! Existing users type commands this way, so the loose form stays the
//! default; strict mode accepts exact tokens only.
//!
//! Checks run in a fixed order and the first hit wins. That order matters
//! for suffix matching: `:endsession` must be tried before the `session `
//! prefix, and both before the dice keywords, since `:session bob sofa 13`
//! ends in one.

use std::fmt;

/// A recognised chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Reset,
    Poker,
    Tri,
    Close,
    Blackjack,
    Thirteen,
    /// Poker round against a dealer hand.
    Dealer,
    /// `:@<amount>`; holds the text after the `@`.
    Amount(String),
    Verify,
    Help,
    ChatOn,
    ChatOff,
    StartSession {
        player: String,
        item: String,
        count: String,
    },
    EndSession,
}

impl Command {
    /// Parses a command line (without its leading colon).
    ///
    /// Returns `None` for anything unrecognised; callers let such lines
    /// through untouched.
    pub fn parse(line: &str, strict: bool) -> Option<Self> {
        let line = line.trim_end();
        let matches = |keyword: &str| {
            if strict {
                line.trim() == keyword
            } else {
                line.ends_with(keyword)
            }
        };

        if matches("reset") {
            return Some(Self::Reset);
        }
        // Session arguments are free text and may end in a keyword.
        if matches("endsession") {
            return Some(Self::EndSession);
        }
        if let Some(session) = parse_session(line) {
            return Some(session);
        }
        if matches("roll") || matches("pkr") {
            return Some(Self::Poker);
        }
        if matches("tri") {
            return Some(Self::Tri);
        }
        if matches("close") {
            return Some(Self::Close);
        }
        if matches("21") {
            return Some(Self::Blackjack);
        }
        if matches("13") {
            return Some(Self::Thirteen);
        }
        if matches("dealer") {
            return Some(Self::Dealer);
        }
        if let Some(amount) = line.trim_start().strip_prefix('@') {
            return Some(Self::Amount(amount.trim().to_string()));
        }
        if matches("verify") {
            return Some(Self::Verify);
        }
        if matches("commands") {
            return Some(Self::Help);
        }
        if matches("chaton") {
            return Some(Self::ChatOn);
        }
        if matches("chatoff") {
            return Some(Self::ChatOff);
        }
        None
    }
}

/// `session <player> <item> <count>`; the count is validated later.
fn parse_session(line: &str) -> Option<Command> {
    let rest = line.trim_start().strip_prefix("session ")?;
    let mut fields = rest.split_whitespace();
    let (Some(player), Some(item), Some(count)) = (fields.next(), fields.next(), fields.next())
    else {
        return None;
    };
    Some(Command::StartSession {
        player: player.to_string(),
        item: item.to_string(),
        count: count.to_string(),
    })
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => write!(f, "reset"),
            Self::Poker => write!(f, "roll"),
            Self::Tri => write!(f, "tri"),
            Self::Close => write!(f, "close"),
            Self::Blackjack => write!(f, "21"),
            Self::Thirteen => write!(f, "13"),
            Self::Dealer => write!(f, "dealer"),
            Self::Amount(amount) => write!(f, "@{amount}"),
            Self::Verify => write!(f, "verify"),
            Self::Help => write!(f, "commands"),
            Self::ChatOn => write!(f, "chaton"),
            Self::ChatOff => write!(f, "chatoff"),
            Self::StartSession { .. } => write!(f, "session"),
            Self::EndSession => write!(f, "endsession"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loose(line: &str) -> Option<Command> {
        Command::parse(line, false)
    }

    #[test]
    fn test_parse_exact_keywords() {
        assert_eq!(loose("reset"), Some(Command::Reset));
        assert_eq!(loose("roll"), Some(Command::Poker));
        assert_eq!(loose("pkr"), Some(Command::Poker));
        assert_eq!(loose("tri"), Some(Command::Tri));
        assert_eq!(loose("close"), Some(Command::Close));
        assert_eq!(loose("21"), Some(Command::Blackjack));
        assert_eq!(loose("13"), Some(Command::Thirteen));
        assert_eq!(loose("dealer"), Some(Command::Dealer));
        assert_eq!(loose("verify"), Some(Command::Verify));
        assert_eq!(loose("commands"), Some(Command::Help));
        assert_eq!(loose("chaton"), Some(Command::ChatOn));
        assert_eq!(loose("chatoff"), Some(Command::ChatOff));
        assert_eq!(loose("endsession"), Some(Command::EndSession));
    }

    #[test]
    fn test_parse_suffix_match_triggers() {
        assert_eq!(loose("lets roll"), Some(Command::Poker));
        assert_eq!(loose("x21"), Some(Command::Blackjack));
        assert_eq!(loose("patrol"), None);
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(loose("ROLL"), None);
        assert_eq!(loose("Reset"), None);
    }

    #[test]
    fn test_parse_strict_rejects_suffix() {
        assert_eq!(Command::parse("lets roll", true), None);
        assert_eq!(Command::parse("roll", true), Some(Command::Poker));
        assert_eq!(Command::parse("213", true), None);
        assert_eq!(loose("213"), Some(Command::Thirteen));
    }

    #[test]
    fn test_parse_amount_is_prefix_match() {
        assert_eq!(loose("@50c"), Some(Command::Amount("50c".into())));
        assert_eq!(loose("@ 50c "), Some(Command::Amount("50c".into())));
        assert_eq!(loose("pay @50"), None);
    }

    #[test]
    fn test_parse_session_with_three_fields() {
        assert_eq!(
            loose("session Bob throne 3"),
            Some(Command::StartSession {
                player: "Bob".into(),
                item: "throne".into(),
                count: "3".into(),
            })
        );
        assert_eq!(loose("session Bob throne"), None);
        assert!(matches!(
            loose("session Bob throne 13"),
            Some(Command::StartSession { .. })
        ));
    }

    #[test]
    fn test_parse_endsession_wins_over_session_prefix() {
        assert_eq!(loose("endsession"), Some(Command::EndSession));
    }

    #[test]
    fn test_parse_unknown_is_none() {
        assert_eq!(loose("hello"), None);
        assert_eq!(loose(""), None);
    }
}
