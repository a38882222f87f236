//! The protocol adapter: raw packets in, abstract events out.
//!
//! All knowledge of the two wire encodings lives here.
//!
//! | field | binary variant | text variant |
//! |---|---|---|
//! | dice id | 4-byte big-endian | ASCII decimal |
//! | dice result | id + trailing face byte | `"<id> <raw>"`, face = raw − id·38 |
//! | string | 2-byte big-endian length + UTF-8 | whole payload |
//! | integer | 4-byte big-endian | ASCII decimal |
//!
//! Decoding never fails loudly: a malformed payload is logged and dropped,
//! and the caller simply sees no event.

use crate::{DiceId, GameEvent, Header, Outbound, ProtocolError, RawPacket, Variant};

/// Face bytes the binary client sends while the dice is still spinning.
const ROLLING_SENTINELS: [u8; 2] = [255, 100];

/// Per-id offset the text client adds to every face value.
const TEXT_FACE_OFFSET: i64 = 38;

/// Chat line that brings the extension window forward.
pub const WINDOW_KEYWORD: &str = "#gsuite";

/// Decodes and encodes packets for one detected [`Variant`].
#[derive(Debug, Clone, Copy)]
pub struct Adapter {
    variant: Variant,
}

impl Adapter {
    pub fn new(variant: Variant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Decodes a packet into at most one event, logging and dropping
    /// anything malformed.
    pub fn decode(&self, packet: &RawPacket) -> Option<GameEvent> {
        match self.try_decode(packet) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(variant = %self.variant, error = %e, "dropping packet");
                None
            }
        }
    }

    /// Decodes a packet, surfacing malformed payloads as errors.
    ///
    /// `Ok(None)` means the packet was well-formed but carries nothing the
    /// engine cares about (ordinary chat, a still-rolling dice).
    pub fn try_decode(&self, packet: &RawPacket) -> Result<Option<GameEvent>, ProtocolError> {
        let header = packet.header;
        let data = packet.payload.as_slice();

        let event = match header {
            Header::ThrowDice => Some(GameEvent::DiceThrown {
                id: self.thrown_dice_id(header, data)?,
            }),
            Header::DiceOff => Some(GameEvent::DiceClosed {
                id: self.closed_dice_id(header, data)?,
            }),
            Header::DiceValue => self.dice_result(header, data)?,
            Header::Chat | Header::Shout | Header::Whisper => {
                let text = self.read_string(header, data)?;
                chat_event(&text)
            }
            Header::MuteStarted => Some(GameEvent::MuteStarted {
                seconds: self.read_int(header, data)?,
            }),
            Header::MuteRemaining => Some(GameEvent::MuteRemaining {
                seconds: self.read_int(header, data)?,
            }),
            Header::TradeOpen => Some(GameEvent::TradeOpened {
                text: lossy_text(data),
            }),
            Header::TradeItems => Some(GameEvent::TradeItems {
                text: lossy_text(data),
            }),
            Header::TradeAddItem => Some(GameEvent::TradeItemOffered),
            Header::TradeAccept => Some(GameEvent::TradeAccepted {
                accepted: self.acceptance_flag(header, data)?,
            }),
            Header::TradeConfirm => Some(GameEvent::TradeConfirmed),
            Header::TradeCompleted => Some(GameEvent::TradeCompleted),
            Header::TradeClose => Some(GameEvent::TradeClosed),
            Header::InventoryList => Some(GameEvent::InventoryUpdated {
                text: lossy_text(data),
            }),
            // Packets we only ever write.
            Header::TradeAcceptOut
            | Header::TradeConfirmOut
            | Header::InventoryRequest
            | Header::Broadcast => None,
        };

        if let Some(event) = &event {
            tracing::trace!(?header, ?event, "decoded");
        }
        Ok(event)
    }

    /// Encodes an outbound intent as a packet for this variant.
    pub fn encode(&self, outbound: &Outbound) -> RawPacket {
        match outbound {
            Outbound::Roll(id) => RawPacket::new(Header::ThrowDice, self.dice_id_payload(*id)),
            Outbound::Close(id) => RawPacket::new(Header::DiceOff, self.dice_id_payload(*id)),
            Outbound::Shout(text) => {
                let mut payload = self.string_payload(text);
                if self.variant == Variant::Binary {
                    // Chat bubble style; 0 is the default bubble.
                    payload.extend_from_slice(&0u32.to_be_bytes());
                }
                RawPacket::new(Header::Shout, payload)
            }
            Outbound::Broadcast(text) => {
                RawPacket::new(Header::Broadcast, self.string_payload(text))
            }
            Outbound::AcceptTrade => RawPacket::new(Header::TradeAcceptOut, Vec::new()),
            Outbound::ConfirmTrade => RawPacket::new(Header::TradeConfirmOut, Vec::new()),
            Outbound::RequestInventory => match self.variant {
                Variant::Binary => RawPacket::new(Header::InventoryRequest, Vec::new()),
                Variant::Text => RawPacket::new(Header::InventoryRequest, b"new".to_vec()),
            },
        }
    }

    // -- field readers ----------------------------------------------------

    fn thrown_dice_id(&self, header: Header, data: &[u8]) -> Result<DiceId, ProtocolError> {
        match self.variant {
            // The binary throw packet may carry extra leading fields; the
            // dice id is always the trailing int.
            Variant::Binary => {
                let start = data
                    .len()
                    .checked_sub(4)
                    .ok_or_else(|| ProtocolError::malformed(header, "shorter than 4 bytes"))?;
                Ok(DiceId(be_u32(&data[start..])))
            }
            Variant::Text => {
                let text = lossy_text(data);
                let first = text
                    .split_whitespace()
                    .next()
                    .ok_or_else(|| ProtocolError::malformed(header, "empty payload"))?;
                parse_id(header, first)
            }
        }
    }

    fn closed_dice_id(&self, header: Header, data: &[u8]) -> Result<DiceId, ProtocolError> {
        match self.variant {
            Variant::Binary => {
                if data.len() < 4 {
                    return Err(ProtocolError::malformed(header, "shorter than 4 bytes"));
                }
                Ok(DiceId(be_u32(&data[..4])))
            }
            Variant::Text => parse_id(header, lossy_text(data).trim()),
        }
    }

    fn dice_result(&self, header: Header, data: &[u8]) -> Result<Option<GameEvent>, ProtocolError> {
        match self.variant {
            Variant::Binary => {
                if data.len() < 5 {
                    return Err(ProtocolError::malformed(header, "shorter than 5 bytes"));
                }
                let id = DiceId(be_u32(&data[..4]));
                let value = data[data.len() - 1];
                if ROLLING_SENTINELS.contains(&value) {
                    tracing::trace!(dice_id = %id, "dice still rolling");
                    return Ok(None);
                }
                Ok(Some(GameEvent::DiceResult { id, value }))
            }
            Variant::Text => {
                let text = lossy_text(data);
                let mut fields = text.split_whitespace();
                let (Some(id_field), Some(raw_field)) = (fields.next(), fields.next()) else {
                    return Err(ProtocolError::malformed(header, "expected \"<id> <value>\""));
                };
                let id = parse_id(header, id_field)?;
                let raw: i64 = raw_field.parse().map_err(|_| {
                    ProtocolError::malformed(header, format!("bad value {raw_field:?}"))
                })?;
                let corrected = raw - i64::from(id.0) * TEXT_FACE_OFFSET;
                let value = u8::try_from(corrected).map_err(|_| {
                    ProtocolError::malformed(header, format!("face {corrected} out of range"))
                })?;
                Ok(Some(GameEvent::DiceResult { id, value }))
            }
        }
    }

    fn read_string(&self, header: Header, data: &[u8]) -> Result<String, ProtocolError> {
        match self.variant {
            Variant::Binary => {
                if data.len() < 2 {
                    return Err(ProtocolError::malformed(header, "missing string length"));
                }
                let len = usize::from(u16::from_be_bytes([data[0], data[1]]));
                let body = data
                    .get(2..2 + len)
                    .ok_or_else(|| ProtocolError::malformed(header, "string runs past payload"))?;
                Ok(String::from_utf8_lossy(body).into_owned())
            }
            Variant::Text => Ok(lossy_text(data)
                .trim_end_matches(|c: char| c.is_control())
                .to_string()),
        }
    }

    fn read_int(&self, header: Header, data: &[u8]) -> Result<u32, ProtocolError> {
        match self.variant {
            Variant::Binary => {
                if data.len() < 4 {
                    return Err(ProtocolError::malformed(header, "shorter than 4 bytes"));
                }
                Ok(be_u32(&data[..4]))
            }
            Variant::Text => {
                let text = lossy_text(data);
                let field = text.split_whitespace().next().unwrap_or_default();
                field
                    .parse()
                    .map_err(|_| ProtocolError::malformed(header, format!("bad int {field:?}")))
            }
        }
    }

    fn acceptance_flag(&self, header: Header, data: &[u8]) -> Result<bool, ProtocolError> {
        match self.variant {
            // [user id][accepted] as two ints.
            Variant::Binary => {
                if data.len() < 8 {
                    return Err(ProtocolError::malformed(header, "shorter than 8 bytes"));
                }
                Ok(be_u32(&data[4..8]) != 0)
            }
            // "<name> <true|false>"
            Variant::Text => {
                let text = lossy_text(data);
                let last = text
                    .split_whitespace()
                    .last()
                    .ok_or_else(|| ProtocolError::malformed(header, "empty payload"))?;
                Ok(matches!(last.to_ascii_lowercase().as_str(), "true" | "1"))
            }
        }
    }

    // -- field writers ----------------------------------------------------

    fn dice_id_payload(&self, id: DiceId) -> Vec<u8> {
        match self.variant {
            Variant::Binary => id.0.to_be_bytes().to_vec(),
            Variant::Text => id.0.to_string().into_bytes(),
        }
    }

    fn string_payload(&self, text: &str) -> Vec<u8> {
        match self.variant {
            Variant::Binary => {
                let bytes = text.as_bytes();
                let len = u16::try_from(bytes.len()).unwrap_or(u16::MAX);
                let mut payload = Vec::with_capacity(2 + usize::from(len));
                payload.extend_from_slice(&len.to_be_bytes());
                payload.extend_from_slice(&bytes[..usize::from(len)]);
                payload
            }
            Variant::Text => text.as_bytes().to_vec(),
        }
    }
}

/// Classifies an outgoing chat line.
fn chat_event(text: &str) -> Option<GameEvent> {
    if text == WINDOW_KEYWORD {
        return Some(GameEvent::WindowRequested);
    }
    text.strip_prefix(':').map(|line| GameEvent::ChatCommand {
        line: line.to_string(),
    })
}

fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn parse_id(header: Header, field: &str) -> Result<DiceId, ProtocolError> {
    field
        .parse()
        .map(DiceId)
        .map_err(|_| ProtocolError::malformed(header, format!("bad dice id {field:?}")))
}

fn lossy_text(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary() -> Adapter {
        Adapter::new(Variant::Binary)
    }

    fn text() -> Adapter {
        Adapter::new(Variant::Text)
    }

    fn packet(header: Header, payload: &[u8]) -> RawPacket {
        RawPacket::new(header, payload.to_vec())
    }

    fn binary_string(s: &str) -> Vec<u8> {
        let mut v = (s.len() as u16).to_be_bytes().to_vec();
        v.extend_from_slice(s.as_bytes());
        v
    }

    // =====================================================================
    // Dice packets
    // =====================================================================

    #[test]
    fn test_decode_text_result_subtracts_id_offset() {
        let event = text().decode(&packet(Header::DiceValue, b"2 78"));
        assert_eq!(
            event,
            Some(GameEvent::DiceResult {
                id: DiceId(2),
                value: 2
            })
        );
    }

    #[test]
    fn test_decode_text_result_closed_dice_is_zero() {
        let event = text().decode(&packet(Header::DiceValue, b"41 1558"));
        assert_eq!(
            event,
            Some(GameEvent::DiceResult {
                id: DiceId(41),
                value: 0
            })
        );
    }

    #[test]
    fn test_decode_text_result_missing_value_is_dropped() {
        assert_eq!(text().decode(&packet(Header::DiceValue, b"2")), None);
        assert!(text().try_decode(&packet(Header::DiceValue, b"2")).is_err());
    }

    #[test]
    fn test_decode_text_result_negative_face_is_malformed() {
        let result = text().try_decode(&packet(Header::DiceValue, b"3 10"));
        assert!(matches!(result, Err(ProtocolError::Malformed { .. })));
    }

    #[test]
    fn test_decode_binary_result_reads_id_and_last_byte() {
        let payload = [0, 0, 1, 44, 9, 9, 4];
        let event = binary().decode(&packet(Header::DiceValue, &payload));
        assert_eq!(
            event,
            Some(GameEvent::DiceResult {
                id: DiceId(300),
                value: 4
            })
        );
    }

    #[test]
    fn test_decode_binary_result_rolling_sentinels_are_ignored() {
        for sentinel in [255u8, 100] {
            let payload = [0, 0, 0, 7, sentinel];
            let result = binary().try_decode(&packet(Header::DiceValue, &payload));
            assert_eq!(result.expect("well-formed"), None);
        }
    }

    #[test]
    fn test_decode_binary_result_short_payload_is_malformed() {
        let result = binary().try_decode(&packet(Header::DiceValue, &[0, 0, 7]));
        assert!(matches!(result, Err(ProtocolError::Malformed { .. })));
    }

    #[test]
    fn test_decode_binary_throw_uses_trailing_int() {
        let payload = [0, 0, 0, 1, 0, 0, 0, 9];
        let event = binary().decode(&packet(Header::ThrowDice, &payload));
        assert_eq!(event, Some(GameEvent::DiceThrown { id: DiceId(9) }));
    }

    #[test]
    fn test_decode_binary_close_uses_leading_int() {
        let payload = [0, 0, 0, 9, 0, 0, 0, 1];
        let event = binary().decode(&packet(Header::DiceOff, &payload));
        assert_eq!(event, Some(GameEvent::DiceClosed { id: DiceId(9) }));
    }

    #[test]
    fn test_decode_text_throw_uses_first_field() {
        let event = text().decode(&packet(Header::ThrowDice, b"1234 extra"));
        assert_eq!(event, Some(GameEvent::DiceThrown { id: DiceId(1234) }));
    }

    #[test]
    fn test_decode_text_close_bad_id_is_dropped() {
        assert_eq!(text().decode(&packet(Header::DiceOff, b"abc")), None);
    }

    // =====================================================================
    // Chat
    // =====================================================================

    #[test]
    fn test_decode_text_command_strips_colon() {
        let event = text().decode(&packet(Header::Shout, b":roll"));
        assert_eq!(
            event,
            Some(GameEvent::ChatCommand {
                line: "roll".into()
            })
        );
    }

    #[test]
    fn test_decode_binary_command_reads_length_prefixed_string() {
        let mut payload = binary_string(":21");
        payload.extend_from_slice(&[0, 0, 0, 0]); // bubble style
        let event = binary().decode(&packet(Header::Chat, &payload));
        assert_eq!(event, Some(GameEvent::ChatCommand { line: "21".into() }));
    }

    #[test]
    fn test_decode_plain_chat_is_not_an_event() {
        assert_eq!(text().decode(&packet(Header::Chat, b"hello there")), None);
    }

    #[test]
    fn test_decode_window_keyword() {
        let event = binary().decode(&packet(Header::Chat, &binary_string("#gsuite")));
        assert_eq!(event, Some(GameEvent::WindowRequested));
    }

    #[test]
    fn test_decode_binary_string_past_end_is_malformed() {
        let result = binary().try_decode(&packet(Header::Chat, &[0, 10, b':', b'r']));
        assert!(result.is_err());
    }

    // =====================================================================
    // Mute, trade, inventory
    // =====================================================================

    #[test]
    fn test_decode_mute_started_both_variants() {
        assert_eq!(
            binary().decode(&packet(Header::MuteStarted, &[0, 0, 0, 30])),
            Some(GameEvent::MuteStarted { seconds: 30 })
        );
        assert_eq!(
            text().decode(&packet(Header::MuteStarted, b"45")),
            Some(GameEvent::MuteStarted { seconds: 45 })
        );
    }

    #[test]
    fn test_decode_trade_accept_flag() {
        assert_eq!(
            binary().decode(&packet(Header::TradeAccept, &[0, 0, 0, 5, 0, 0, 0, 1])),
            Some(GameEvent::TradeAccepted { accepted: true })
        );
        assert_eq!(
            text().decode(&packet(Header::TradeAccept, b"Bob false")),
            Some(GameEvent::TradeAccepted { accepted: false })
        );
    }

    #[test]
    fn test_decode_trade_items_keeps_text() {
        let event = text().decode(&packet(Header::TradeItems, b"Bob\tthrone\tthrone"));
        assert_eq!(
            event,
            Some(GameEvent::TradeItems {
                text: "Bob\tthrone\tthrone".into()
            })
        );
    }

    #[test]
    fn test_decode_outbound_only_headers_yield_nothing() {
        assert_eq!(text().decode(&packet(Header::TradeAcceptOut, b"")), None);
        assert_eq!(text().decode(&packet(Header::Broadcast, b"hi")), None);
    }

    // =====================================================================
    // Encoding
    // =====================================================================

    #[test]
    fn test_encode_roll_binary_is_four_byte_id() {
        let packet = binary().encode(&Outbound::Roll(DiceId(258)));
        assert_eq!(packet.header, Header::ThrowDice);
        assert_eq!(packet.payload, vec![0, 0, 1, 2]);
    }

    #[test]
    fn test_encode_close_text_is_decimal() {
        let packet = text().encode(&Outbound::Close(DiceId(258)));
        assert_eq!(packet.header, Header::DiceOff);
        assert_eq!(packet.payload, b"258".to_vec());
    }

    #[test]
    fn test_encode_shout_binary_has_length_and_style() {
        let packet = binary().encode(&Outbound::Shout("17".into()));
        assert_eq!(packet.payload, vec![0, 2, b'1', b'7', 0, 0, 0, 0]);
    }

    #[test]
    fn test_encoded_roll_decodes_as_throw() {
        // What we inject, the host echoes back through interception.
        for adapter in [binary(), text()] {
            let packet = adapter.encode(&Outbound::Roll(DiceId(77)));
            assert_eq!(
                adapter.decode(&packet),
                Some(GameEvent::DiceThrown { id: DiceId(77) })
            );
        }
    }
}
