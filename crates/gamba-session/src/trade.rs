//! Trade capture: inferring a wager from the packets of one trade.
//!
//! Trade packets are scraped, not parsed. The tray listing is split on
//! control separators and the item class is taken to be the most frequent
//! lowercase word in it. That is a heuristic, so [`scan_trade_items`]
//! reports [`ItemScan::Undetermined`] rather than guessing when nothing
//! qualifies.

use std::collections::HashMap;

/// Prefixes some hotels put in front of item class names.
const LOCALE_PREFIXES: [&str; 12] = [
    "nl_", "de_", "fr_", "es_", "it_", "pt_", "br_", "fi_", "se_", "dk_", "no_", "tr_",
];

/// Words that show up in trade payloads but are never names or items.
const DENYLIST: [&str; 14] = [
    "true", "false", "null", "none", "trade", "trading", "items", "item", "accept", "confirm",
    "open", "close", "stuff", "poster",
];

const MIN_NAME_LEN: usize = 3;
const MAX_NAME_LEN: usize = 24;

/// What a tray listing revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemScan {
    /// `item` appeared `count` times across both sides of the trade.
    Found { item: String, count: u32 },
    /// No plausible item class in the payload.
    Undetermined,
}

/// Finds the dominant item class in a trade tray listing.
pub fn scan_trade_items(text: &str) -> ItemScan {
    let mut counts: HashMap<String, u32> = HashMap::new();
    // Insertion order breaks frequency ties deterministically.
    let mut order: Vec<String> = Vec::new();

    for token in tokens(text) {
        for run in item_runs(token) {
            let entry = counts.entry(run.clone()).or_insert_with(|| {
                order.push(run);
                0
            });
            *entry += 1;
        }
    }

    let mut best: Option<(&str, u32)> = None;
    for item in &order {
        let count = counts.get(item).copied().unwrap_or(0);
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((item.as_str(), count));
        }
    }

    match best {
        Some((item, count)) => ItemScan::Found {
            item: item.to_string(),
            count,
        },
        None => ItemScan::Undetermined,
    }
}

/// Picks the trade partner's name out of a trade-open payload.
///
/// Best effort: the first token that looks like a user name and is not a
/// protocol word.
pub fn extract_partner_name(text: &str) -> Option<String> {
    text.split(|c: char| c.is_control() || c.is_whitespace())
        .find(|token| is_name_shaped(token))
        .map(str::to_string)
}

fn is_name_shaped(token: &str) -> bool {
    let len = token.chars().count();
    (MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len)
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_=?!@:.,".contains(c))
        && token.chars().any(|c| c.is_ascii_alphabetic())
        && !is_denied(token)
}

fn is_denied(word: &str) -> bool {
    DENYLIST.iter().any(|d| d.eq_ignore_ascii_case(word))
}

/// Splits on the control characters the client uses as field separators.
pub(crate) fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c.is_control() || c == '/')
        .filter(|t| !t.is_empty())
}

/// Lowercase `[a-z_]` runs of at least two letters, locale prefix removed.
pub(crate) fn item_runs(token: &str) -> Vec<String> {
    token
        .split(|c: char| !(c.is_ascii_lowercase() || c == '_'))
        .map(|run| {
            let run = LOCALE_PREFIXES
                .iter()
                .find_map(|p| run.strip_prefix(p))
                .unwrap_or(run);
            run.trim_matches('_')
        })
        .filter(|run| run.chars().filter(char::is_ascii_lowercase).count() >= 2)
        .filter(|run| !is_denied(run))
        .map(str::to_string)
        .collect()
}

/// Accumulator for the trade currently on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeCapture {
    pub open: bool,
    pub partner: Option<String>,
    pub item: Option<String>,
    /// Items the partner put up, estimated.
    pub bet_count: u32,
    /// Items our own side added.
    pub own_added: u32,
    /// Whether auto-accept may act; decided against the inventory.
    pub eligible: bool,
    pub accept_sent: bool,
    pub confirm_sent: bool,
}

impl TradeCapture {
    /// Starts a fresh capture for a newly opened trade.
    pub fn open(&mut self, text: &str) {
        *self = Self {
            open: true,
            partner: extract_partner_name(text),
            ..Self::default()
        };
        tracing::debug!(partner = self.partner_name(), "trade opened");
    }

    /// Re-reads the tray listing and re-estimates the wager.
    ///
    /// Returns the wager when one could be determined. The listing counts
    /// both sides, so our own additions are taken off the total.
    pub fn observe_items(&mut self, text: &str) -> Option<(String, u32)> {
        match scan_trade_items(text) {
            ItemScan::Found { item, count } => {
                self.bet_count = count.saturating_sub(self.own_added);
                self.item = Some(item);
            }
            ItemScan::Undetermined => {
                self.item = None;
                self.bet_count = 0;
            }
        }
        self.eligible = false;
        tracing::debug!(item = ?self.item, bet = self.bet_count, "trade items scanned");
        self.wager()
    }

    /// Our side put another item in.
    pub fn record_own_offer(&mut self) {
        self.own_added += 1;
    }

    /// Known item with a positive count.
    pub fn wager(&self) -> Option<(String, u32)> {
        match &self.item {
            Some(item) if self.bet_count > 0 => Some((item.clone(), self.bet_count)),
            _ => None,
        }
    }

    pub fn partner_name(&self) -> &str {
        self.partner.as_deref().unwrap_or("unknown")
    }

    /// Forgets everything about the current trade.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_picks_most_frequent_class() {
        let tray = "Bob\tthrone\tthrone\tsofa\tthrone";
        assert_eq!(
            scan_trade_items(tray),
            ItemScan::Found {
                item: "throne".into(),
                count: 3
            }
        );
    }

    #[test]
    fn test_scan_strips_locale_prefix() {
        let tray = "nl_throne\u{1e}throne\u{2}de_throne";
        assert_eq!(
            scan_trade_items(tray),
            ItemScan::Found {
                item: "throne".into(),
                count: 3
            }
        );
    }

    #[test]
    fn test_scan_ignores_protocol_words_and_digits() {
        let tray = "true\t12\tfalse\t9";
        assert_eq!(scan_trade_items(tray), ItemScan::Undetermined);
    }

    #[test]
    fn test_scan_tie_goes_to_first_seen() {
        let tray = "sofa\tchair\tsofa\tchair";
        assert_eq!(
            scan_trade_items(tray),
            ItemScan::Found {
                item: "sofa".into(),
                count: 2
            }
        );
    }

    #[test]
    fn test_scan_empty_is_undetermined() {
        assert_eq!(scan_trade_items(""), ItemScan::Undetermined);
    }

    #[test]
    fn test_item_runs_keep_underscored_class_names() {
        assert_eq!(item_runs("a1chair_polyfon9"), vec!["chair_polyfon".to_string()]);
    }

    #[test]
    fn test_extract_partner_skips_denylist_and_numbers() {
        assert_eq!(
            extract_partner_name("true\t123\tBobby\tthrone"),
            Some("Bobby".into())
        );
        assert_eq!(extract_partner_name("1\t22\t"), None);
    }

    #[test]
    fn test_capture_open_resets_previous_trade() {
        let mut capture = TradeCapture {
            own_added: 4,
            eligible: true,
            accept_sent: true,
            ..TradeCapture::default()
        };
        capture.open("Alice");
        assert!(capture.open);
        assert_eq!(capture.partner_name(), "Alice");
        assert_eq!(capture.own_added, 0);
        assert!(!capture.eligible);
        assert!(!capture.accept_sent);
    }

    #[test]
    fn test_capture_partner_falls_back_to_unknown() {
        let mut capture = TradeCapture::default();
        capture.open("1 2");
        assert_eq!(capture.partner_name(), "unknown");
    }

    #[test]
    fn test_observe_items_subtracts_own_offers() {
        let mut capture = TradeCapture::default();
        capture.open("Bob");
        capture.record_own_offer();
        let wager = capture.observe_items("throne\tthrone\tthrone\tthrone");
        assert_eq!(wager, Some(("throne".into(), 3)));
    }

    #[test]
    fn test_observe_items_only_own_offers_is_no_wager() {
        let mut capture = TradeCapture::default();
        capture.record_own_offer();
        assert_eq!(capture.observe_items("throne"), None);
        assert_eq!(capture.item.as_deref(), Some("throne"));
        assert_eq!(capture.bet_count, 0);
    }

    #[test]
    fn test_observe_items_clears_eligibility() {
        let mut capture = TradeCapture {
            eligible: true,
            ..TradeCapture::default()
        };
        capture.observe_items("throne");
        assert!(!capture.eligible);
    }
}
