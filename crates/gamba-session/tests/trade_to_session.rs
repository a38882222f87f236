//! A trade observed end to end, down to the session decision.

use std::time::Duration;

use gamba_session::{InventoryCache, SessionError, SessionManager, TradeCapture};

const QUIET: Duration = Duration::from_millis(300);

/// What the engine decides on trade completion, minus the waiting.
fn settle(
    capture: &TradeCapture,
    inventory: &InventoryCache,
    sessions: &mut SessionManager,
) -> Result<(), String> {
    let (item, count) = capture.wager().ok_or("no wager")?;
    if !inventory.is_settled() || !inventory.covers(&item, count) {
        return Err("cannot cover".into());
    }
    sessions
        .start(capture.partner_name(), item, count)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

#[tokio::test(start_paused = true)]
async fn test_trade_with_enough_stock_starts_session() {
    let mut capture = TradeCapture::default();
    let mut inventory = InventoryCache::new(QUIET);
    let mut sessions = SessionManager::new();

    capture.open("Bob\ttrue");
    capture.observe_items("throne\tthrone\tthrone");
    inventory.apply_listing(&["throne"; 6].join("\t"));
    tokio::time::advance(QUIET).await;

    settle(&capture, &inventory, &mut sessions).expect("session");
    let session = sessions.active().expect("active");
    assert_eq!(session.player, "Bob");
    assert_eq!((session.item.as_str(), session.count), ("throne", 3));
}

#[tokio::test(start_paused = true)]
async fn test_trade_with_short_stock_is_denied() {
    let mut capture = TradeCapture::default();
    let mut inventory = InventoryCache::new(QUIET);
    let mut sessions = SessionManager::new();

    capture.open("Bob");
    capture.observe_items("throne\tthrone\tthrone");
    inventory.apply_listing(&["throne"; 5].join("\t"));
    tokio::time::advance(QUIET).await;

    assert!(settle(&capture, &inventory, &mut sessions).is_err());
    assert!(!sessions.is_active());
}

#[tokio::test(start_paused = true)]
async fn test_unsettled_inventory_is_denied() {
    let mut capture = TradeCapture::default();
    let mut inventory = InventoryCache::new(QUIET);
    let mut sessions = SessionManager::new();

    capture.open("Bob");
    capture.observe_items("throne");
    inventory.apply_listing(&["throne"; 10].join("\t"));

    assert!(settle(&capture, &inventory, &mut sessions).is_err());
}

#[tokio::test(start_paused = true)]
async fn test_second_trade_does_not_replace_session() {
    let mut sessions = SessionManager::new();
    sessions.start("Bob", "throne", 1).expect("first");
    assert_eq!(
        sessions.start("Eve", "sofa", 2).map(|_| ()),
        Err(SessionError::AlreadyActive("Bob".into()))
    );
}
