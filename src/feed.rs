// ==============================================================================
// feed.rs — INPUT FEED (STDIN -> TICK LOOP)
// ------------------------------------------------------------------------------
// One JSON input event per line, optionally addressed to a vehicle:
//
//   {"type":"gas","value":1.0}
//   {"vehicle":"player","type":"steer","x":-0.5}
//   {"type":"reset"}
//
// Lines are parsed on their own task and pushed into an unbounded channel; the
// tick loop drains it at tick start, so the newest value per channel wins.
// ==============================================================================

use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::state::InputEvent;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InputMessage {
    /// Target vehicle; `None` means every vehicle.
    #[serde(default)]
    pub vehicle: Option<String>,
    #[serde(flatten)]
    pub event: InputEvent,
}

impl InputMessage {
    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Forward every well-formed line of `reader` until EOF or the receiver closes.
pub async fn pump_lines<R>(reader: R, tx: mpsc::UnboundedSender<InputMessage>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                warn!(%err, "input read failed");
                break;
            }
        };

        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        match InputMessage::from_json(text) {
            Ok(msg) => {
                if tx.send(msg).is_err() {
                    break; // tick loop gone
                }
            }
            Err(err) => warn!(%err, line = text, "skipping malformed input"),
        }
    }

    debug!("input feed closed");
}

/// Spawn the stdin reader task and hand back the receiving end.
pub fn spawn_stdin_feed() -> mpsc::UnboundedReceiver<InputMessage> {
    let (tx, rx) = mpsc::unbounded_channel::<InputMessage>();
    tokio::spawn(pump_lines(BufReader::new(tokio::io::stdin()), tx));
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addressed_and_broadcast_messages_parse() {
        let m = InputMessage::from_json(r#"{"vehicle":"player","type":"brake","value":0.5}"#).expect("valid");
        assert_eq!(m.vehicle.as_deref(), Some("player"));
        assert_eq!(m.event, InputEvent::Brake { value: 0.5 });

        let m = InputMessage::from_json(r#"{"type":"reset"}"#).expect("valid");
        assert_eq!(m.vehicle, None);
        assert_eq!(m.event, InputEvent::Reset);
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        assert!(InputMessage::from_json(r#"{"type":"jump"}"#).is_err());
    }

    #[tokio::test]
    async fn pump_skips_garbage_and_keeps_order() {
        let input: &[u8] = b"{\"type\":\"gas\",\"value\":1.0}\nnot json\n\n{\"type\":\"steer\",\"x\":-1.0}\n";
        let (tx, mut rx) = mpsc::unbounded_channel();

        pump_lines(input, tx).await;

        assert_eq!(rx.recv().await.map(|m| m.event), Some(InputEvent::Gas { value: 1.0 }));
        assert_eq!(rx.recv().await.map(|m| m.event), Some(InputEvent::Steer { x: -1.0, y: 0.0 }));
        assert!(rx.recv().await.is_none());
    }
}
