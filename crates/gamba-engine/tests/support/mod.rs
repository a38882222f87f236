//! A scripted game server for engine tests.
//!
//! Every packet the engine sends is recorded. Rolls are answered with the
//! next scripted face after a short delay, closes with a zero face, and
//! inventory requests with the scripted listing. Run tests under
//! `start_paused` so the pacing costs nothing.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gamba_engine::{Engine, EngineConfig, TableSnapshot};
use gamba_hand::HandTemplates;
use gamba_protocol::{Adapter, ChannelSink, DiceId, GameEvent, Header, SinkItem, Variant};

const SERVER_LATENCY: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
pub struct Script {
    /// Faces handed out to rolls, in roll order.
    pub faces: Vec<u8>,
    /// Never answer rolls.
    pub silent: bool,
    /// Sent back for every inventory request.
    pub inventory: Option<String>,
}

pub struct Booth {
    pub engine: Engine,
    variant: Variant,
    sent: Arc<Mutex<Vec<SinkItem>>>,
}

impl Booth {
    pub fn open(variant: Variant, script: Script) -> Self {
        Self::with_config(variant, EngineConfig::default(), script)
    }

    pub fn with_config(variant: Variant, config: EngineConfig, script: Script) -> Self {
        let (sink, mut rx) = ChannelSink::new();
        let engine = Engine::new(
            variant,
            config,
            Arc::new(sink),
            Arc::new(HandTemplates::default()),
        );
        let sent = Arc::new(Mutex::new(Vec::new()));

        let server = engine.clone();
        let log = Arc::clone(&sent);
        tokio::spawn(async move {
            let adapter = Adapter::new(variant);
            let mut faces: VecDeque<u8> = script.faces.into();
            while let Some(item) = rx.recv().await {
                log.lock().expect("log").push(item.clone());
                let SinkItem::Packet(packet) = item else {
                    continue;
                };
                let reply = match adapter.decode(&packet) {
                    Some(GameEvent::DiceThrown { id }) if !script.silent => faces
                        .pop_front()
                        .map(|value| GameEvent::DiceResult { id, value }),
                    Some(GameEvent::DiceClosed { id }) => {
                        Some(GameEvent::DiceResult { id, value: 0 })
                    }
                    _ if packet.header == Header::InventoryRequest => script
                        .inventory
                        .clone()
                        .map(|text| GameEvent::InventoryUpdated { text }),
                    _ => None,
                };
                if let Some(reply) = reply {
                    let engine = server.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(SERVER_LATENCY).await;
                        engine.handle(reply).await;
                    });
                }
            }
        });

        Self {
            engine,
            variant,
            sent,
        }
    }

    /// Throws dice `1..=count` by hand so the engine tracks them.
    pub async fn setup(&self, count: u32) {
        for id in 1..=count {
            self.engine
                .handle(GameEvent::DiceThrown { id: DiceId(id) })
                .await;
        }
    }

    /// Types `:<line>` in chat.
    pub async fn command(&self, line: &str) -> gamba_engine::Verdict {
        self.engine
            .handle(GameEvent::ChatCommand { line: line.into() })
            .await
    }

    pub async fn snapshot(&self) -> TableSnapshot {
        self.engine.snapshot().await
    }

    /// Waits until the running flow is over.
    pub async fn wait_idle(&self) {
        for _ in 0..1200 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if self.snapshot().await.state.is_idle() {
                return;
            }
        }
        panic!("engine never went idle");
    }

    /// Lets spawned work run for `duration` of paused time.
    pub async fn idle_for(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    pub fn sent(&self) -> Vec<SinkItem> {
        self.sent.lock().expect("log").clone()
    }

    pub fn headers(&self) -> Vec<Header> {
        self.sent()
            .into_iter()
            .filter_map(|item| match item {
                SinkItem::Packet(packet) => Some(packet.header),
                SinkItem::ShowWindow => None,
            })
            .collect()
    }

    /// Ids of rolled dice, in send order.
    pub fn rolled(&self) -> Vec<DiceId> {
        let adapter = Adapter::new(self.variant);
        self.sent()
            .into_iter()
            .filter_map(|item| match item {
                SinkItem::Packet(packet) if packet.header == Header::ThrowDice => {
                    match adapter.decode(&packet) {
                        Some(GameEvent::DiceThrown { id }) => Some(id),
                        _ => None,
                    }
                }
                _ => None,
            })
            .collect()
    }

    /// Text of everything shouted (or broadcast, with `header`).
    pub fn texts(&self, header: Header) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|item| match item {
                SinkItem::Packet(packet) if packet.header == header => {
                    Some(self.string_of(&packet.payload))
                }
                _ => None,
            })
            .collect()
    }

    pub fn shouts(&self) -> Vec<String> {
        self.texts(Header::Shout)
    }

    pub fn journal_has(&self, message: &str) -> bool {
        self.engine
            .journal()
            .entries()
            .iter()
            .any(|entry| entry.ends_with(message))
    }

    fn string_of(&self, payload: &[u8]) -> String {
        match self.variant {
            Variant::Text => String::from_utf8_lossy(payload).into_owned(),
            Variant::Binary => {
                let len = usize::from(u16::from_be_bytes([payload[0], payload[1]]));
                String::from_utf8_lossy(&payload[2..2 + len]).into_owned()
            }
        }
    }
}
