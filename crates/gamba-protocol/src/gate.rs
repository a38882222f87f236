//! One-shot variant detection shared between the handshake and decoders.

use tokio::sync::watch;

use crate::Variant;

/// Holds the detected [`Variant`] of a host link.
///
/// The variant is written once, from the handshake, and every decoder waits
/// on the gate before touching a payload. Later writes are ignored, so the
/// variant can never flip under a running decoder.
#[derive(Debug, Clone)]
pub struct VariantGate {
    tx: watch::Sender<Option<Variant>>,
}

impl VariantGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Records the variant. Returns `false` if one was already set.
    pub fn set(&self, variant: Variant) -> bool {
        let stored = self.tx.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(variant);
            true
        });
        if stored {
            tracing::info!(%variant, "client variant detected");
        }
        stored
    }

    /// Detects the variant from the client identifier and records it.
    pub fn detect(&self, client_identifier: &str) -> Variant {
        self.set(Variant::from_client_identifier(client_identifier));
        // A concurrent first write wins; report what is actually stored.
        self.get()
            .unwrap_or_else(|| Variant::from_client_identifier(client_identifier))
    }

    /// The variant, if detection already happened.
    pub fn get(&self) -> Option<Variant> {
        *self.tx.borrow()
    }

    /// Waits until the variant is known.
    pub async fn wait(&self) -> Variant {
        let mut rx = self.tx.subscribe();
        loop {
            if let Some(variant) = *rx.borrow_and_update() {
                return variant;
            }
            // The sender lives in `self`, so the channel cannot close while
            // we are borrowed.
            if rx.changed().await.is_err() {
                continue;
            }
        }
    }
}

impl Default for VariantGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_set_only_first_write_sticks() {
        let gate = VariantGate::new();
        assert!(gate.set(Variant::Binary));
        assert!(!gate.set(Variant::Text));
        assert_eq!(gate.get(), Some(Variant::Binary));
    }

    #[test]
    fn test_detect_uses_identifier() {
        let gate = VariantGate::new();
        assert_eq!(gate.detect("SHOCKWAVE"), Variant::Text);
        assert_eq!(gate.detect("FLASH"), Variant::Text);
    }

    #[tokio::test]
    async fn test_wait_returns_after_set() {
        let gate = VariantGate::new();
        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.wait().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        gate.set(Variant::Binary);
        assert_eq!(waiter.await.expect("join"), Variant::Binary);
    }

    #[tokio::test]
    async fn test_wait_after_set_is_immediate() {
        let gate = VariantGate::new();
        gate.set(Variant::Text);
        assert_eq!(gate.wait().await, Variant::Text);
    }
}
