//! Per-link handler: hello, then intercepted packets in and verdicts out.
//!
//! Each accepted host link gets its own Tokio task running this handler.
//! The flow is:
//!   1. Spawn the writer, parked on the link's variant gate
//!   2. Receive `Hello` → detect the client variant, opening the gate
//!   3. Create the link's engine from the gated variant
//!   4. Loop: receive `Intercept` → decode → engine → send `Verdict`

use std::sync::Arc;

use gamba_engine::Engine;
use gamba_protocol::{
    Adapter, ChannelSink, Codec, Header, HostFrame, RawPacket, SinkItem, VariantGate,
};
use gamba_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::server::ServerState;
use crate::GambaError;

/// Handles one host link from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), GambaError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new host link");

    // --- Step 1: Writer ---
    let gate = VariantGate::new();
    let (sink, outbox) = ChannelSink::new();
    let writer = tokio::spawn(write_outbox(
        Arc::clone(&conn),
        Arc::clone(&state),
        gate.clone(),
        outbox,
    ));

    // --- Step 2: Hello ---
    if let Err(e) = perform_handshake(&conn, &state, &gate).await {
        writer.abort();
        let _ = conn.close().await;
        return Err(e);
    }

    // --- Step 3: Engine ---
    let variant = gate.wait().await;
    tracing::info!(%conn_id, %variant, "host connected");
    let engine = Engine::new(
        variant,
        state.config.engine.clone(),
        Arc::new(sink),
        Arc::clone(&state.templates),
    );

    // --- Step 4: Intercept loop ---
    let adapter = Adapter::new(variant);
    let result = loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "host link closed cleanly");
                break Ok(());
            }
            Err(e) => break Err(GambaError::Transport(e)),
        };

        let frame: HostFrame = match state.codec.decode(&data) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode host frame");
                continue;
            }
        };

        match frame {
            HostFrame::Intercept {
                id,
                direction,
                header,
                payload,
            } => {
                let block = match Header::lookup(variant, direction, &header) {
                    Some(header) => {
                        let packet = RawPacket::new(header, payload);
                        match adapter.decode(&packet) {
                            Some(event) => engine.handle(event).await.is_block(),
                            None => false,
                        }
                    }
                    None => {
                        tracing::trace!(%conn_id, %header, "unregistered header passed through");
                        false
                    }
                };
                let bytes = match state.codec.encode(&HostFrame::Verdict { id, block }) {
                    Ok(bytes) => bytes,
                    Err(e) => break Err(GambaError::Protocol(e)),
                };
                if let Err(e) = conn.send(&bytes).await {
                    break Err(GambaError::Transport(e));
                }
            }
            other => {
                tracing::debug!(%conn_id, frame = ?other, "ignoring unexpected host frame");
            }
        }
    };

    writer.abort();
    result
}

/// Waits for the host's `Hello` and opens the gate with the client variant.
async fn perform_handshake<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    gate: &VariantGate,
) -> Result<(), GambaError> {
    let data = match tokio::time::timeout(state.config.handshake_timeout, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(GambaError::Handshake("link closed before hello".into()));
        }
        Ok(Err(e)) => return Err(GambaError::Transport(e)),
        Err(_) => return Err(GambaError::Handshake("hello timed out".into())),
    };

    let frame: HostFrame = state.codec.decode(&data)?;
    match frame {
        HostFrame::Hello { client, version } => {
            tracing::info!(%client, %version, "host said hello");
            gate.detect(&client);
            Ok(())
        }
        _ => Err(GambaError::Handshake("first frame must be Hello".into())),
    }
}

/// Turns everything the engine sends into `Inject`/`ShowWindow` frames.
///
/// Header names depend on the variant, so nothing is written before the
/// gate opens.
async fn write_outbox<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    gate: VariantGate,
    mut outbox: UnboundedReceiver<SinkItem>,
) {
    let variant = gate.wait().await;
    while let Some(item) = outbox.recv().await {
        let frame = match item {
            SinkItem::Packet(packet) => HostFrame::Inject {
                direction: packet.direction(),
                header: packet.header.name(variant).to_string(),
                payload: packet.payload,
            },
            SinkItem::ShowWindow => HostFrame::ShowWindow,
        };
        let bytes = match state.codec.encode(&frame) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode host frame");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(error = %e, "host link gone, writer stopping");
            break;
        }
    }
}
