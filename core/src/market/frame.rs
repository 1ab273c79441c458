//! `~m~<len>~m~<payload>` framing used by the TradingView chart feed
//!
//! A single WebSocket text message may carry several frames back to back.
//! Heartbeats are frames whose payload starts with `~h~` and must be echoed
//! back unchanged to keep the session alive.

use crate::error::{Result, ScraperError};
use serde_json::Value;

const MARKER: &str = "~m~";
const HEARTBEAT: &str = "~h~";

/// One decoded frame
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Heartbeat payload, e.g. `~h~3`
    Heartbeat(String),
    /// A JSON payload
    Message(Value),
    /// A payload that is neither JSON nor a heartbeat
    Text(String),
}

impl Frame {
    /// The `m` field of a message frame, e.g. `timescale_update`
    pub fn method(&self) -> Option<&str> {
        match self {
            Frame::Message(value) => value.get("m").and_then(Value::as_str),
            _ => None,
        }
    }

    /// The `p` field of a message frame
    pub fn params(&self) -> Option<&Vec<Value>> {
        match self {
            Frame::Message(value) => value.get("p").and_then(Value::as_array),
            _ => None,
        }
    }
}

/// Frame an arbitrary payload
pub fn encode_raw(payload: &str) -> String {
    format!("{}{}{}{}", MARKER, payload.len(), MARKER, payload)
}

/// Frame a JSON value
pub fn encode(value: &Value) -> String {
    encode_raw(&value.to_string())
}

/// Frame a `{"m": method, "p": params}` call
pub fn encode_call(method: &str, params: Vec<Value>) -> String {
    encode(&serde_json::json!({ "m": method, "p": params }))
}

/// Split a WebSocket text message into frames
pub fn decode(message: &str) -> Result<Vec<Frame>> {
    let mut frames = Vec::new();
    let mut rest = message;

    while !rest.is_empty() {
        let after_marker = rest.strip_prefix(MARKER).ok_or_else(|| malformed(rest))?;
        let len_end = after_marker.find(MARKER).ok_or_else(|| malformed(rest))?;
        let len: usize = after_marker[..len_end]
            .parse()
            .map_err(|_| malformed(rest))?;

        let body = &after_marker[len_end + MARKER.len()..];
        let payload = body.get(..len).ok_or_else(|| ScraperError::MalformedFrame {
            message: format!("declared length {} exceeds {} available bytes", len, body.len()),
        })?;

        frames.push(classify(payload));
        rest = &body[len..];
    }

    Ok(frames)
}

fn classify(payload: &str) -> Frame {
    if payload.starts_with(HEARTBEAT) {
        return Frame::Heartbeat(payload.to_string());
    }
    match serde_json::from_str(payload) {
        Ok(value) => Frame::Message(value),
        Err(_) => Frame::Text(payload.to_string()),
    }
}

fn malformed(input: &str) -> ScraperError {
    let preview: String = input.chars().take(40).collect();
    ScraperError::MalformedFrame {
        message: format!("expected '~m~<len>~m~' at '{}'", preview),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_uses_byte_length() {
        assert_eq!(encode_raw("~h~1"), "~m~4~m~~h~1");
        assert_eq!(encode_raw("é"), "~m~2~m~é");
    }

    #[test]
    fn test_encode_call_shape() {
        let framed = encode_call("set_auth_token", vec![json!("unauthorized_user_token")]);
        let frames = decode(&framed).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].method(), Some("set_auth_token"));
        assert_eq!(
            frames[0].params().unwrap(),
            &vec![json!("unauthorized_user_token")]
        );
    }

    #[test]
    fn test_decode_multiple_frames() {
        let message = format!(
            "{}{}",
            encode_call("series_loading", vec![json!("cs_x")]),
            encode_raw("~h~7")
        );
        let frames = decode(&message).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].method(), Some("series_loading"));
        assert_eq!(frames[1], Frame::Heartbeat("~h~7".to_string()));
    }

    #[test]
    fn test_decode_plain_text_payload() {
        let frames = decode("~m~5~m~hello").unwrap();
        assert_eq!(frames, vec![Frame::Text("hello".to_string())]);
    }

    #[test]
    fn test_decode_rejects_truncated_frame() {
        assert!(decode("~m~10~m~short").is_err());
        assert!(decode("garbage").is_err());
        assert!(decode("~m~x~m~abc").is_err());
    }
}
