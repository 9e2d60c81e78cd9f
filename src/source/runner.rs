//! Message source - reads line-encoded transport messages and forwards them

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::smartnet::{MessageType, TransportMessage};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("expected 3 or 4 fields, got {0}")]
    BadLine(usize),

    #[error("invalid {field}: {value}")]
    BadField { field: &'static str, value: String },

    #[error("invalid hex payload: {0}")]
    BadHex(String),
}

/// Reads transport messages from a file or stdin
pub struct MessageSource {
    path: Option<PathBuf>,
    messages_received: Arc<AtomicU64>,
    parse_errors: Arc<AtomicU64>,
}

impl MessageSource {
    /// `None` reads stdin
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            messages_received: Arc::new(AtomicU64::new(0)),
            parse_errors: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Read until end of input and send parsed messages to the channel
    pub async fn run(&self, tx: mpsc::Sender<TransportMessage>) -> Result<()> {
        match &self.path {
            Some(path) => {
                info!("Reading messages from {}", path.display());
                let file = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("Failed to open {}", path.display()))?;
                self.read_lines(BufReader::new(file), tx).await
            }
            None => {
                info!("Reading messages from stdin");
                self.read_lines(BufReader::new(tokio::io::stdin()), tx).await
            }
        }
    }

    /// Forward every message line from `reader`
    pub async fn read_lines<R>(&self, reader: R, tx: mpsc::Sender<TransportMessage>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match parse_message_line(&line) {
                    Ok(Some(msg)) => {
                        self.messages_received.fetch_add(1, Ordering::Relaxed);
                        if tx.send(msg).await.is_err() {
                            warn!("Channel closed, stopping message source");
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        self.parse_errors.fetch_add(1, Ordering::Relaxed);
                        debug!("Failed to parse line {:?}: {}", line, e);
                    }
                },
                Ok(None) => {
                    info!("End of message input");
                    break;
                }
                Err(e) => {
                    error!("Error reading message input: {}", e);
                    break;
                }
            }
        }

        info!(
            "Message source stopped. Messages: {}, Parse errors: {}",
            self.messages_received(),
            self.parse_errors()
        );

        Ok(())
    }

    pub fn messages_received(&self) -> u64 {
        self.messages_received.load(Ordering::Relaxed)
    }

    pub fn parse_errors(&self) -> u64 {
        self.parse_errors.load(Ordering::Relaxed)
    }
}

fn parse_int(field: &'static str, s: &str) -> Result<i64, SourceError> {
    let bad = || SourceError::BadField {
        field,
        value: s.to_string(),
    };
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16).map_err(|_| bad()),
        None => s.parse().map_err(|_| bad()),
    }
}

/// Parse `<type> <arg1> <arg2> [hex-payload]`.
///
/// Blank lines and `#` comments yield `Ok(None)`. `type` may be decimal or
/// `0x` hex and is reinterpreted as a signed 32-bit value. A payload of `-`
/// or a missing payload means no bytes.
pub fn parse_message_line(line: &str) -> Result<Option<TransportMessage>, SourceError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 && fields.len() != 4 {
        return Err(SourceError::BadLine(fields.len()));
    }

    let raw_type = parse_int("type", fields[0])?;
    if raw_type < i32::MIN as i64 || raw_type > u32::MAX as i64 {
        return Err(SourceError::BadField {
            field: "type",
            value: fields[0].to_string(),
        });
    }
    let msg_type = MessageType(raw_type as u32 as i32);

    let arg1 = parse_int("arg1", fields[1])?;
    let arg2: f64 = fields[2].parse().map_err(|_| SourceError::BadField {
        field: "arg2",
        value: fields[2].to_string(),
    })?;

    let payload = match fields.get(3) {
        None | Some(&"-") => Vec::new(),
        Some(hex_str) => {
            hex::decode(hex_str).map_err(|_| SourceError::BadHex(hex_str.to_string()))?
        }
    };

    Ok(Some(TransportMessage::new(msg_type, arg1, arg2, payload)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smartnet::message::{PROTOCOL_SMARTNET, SUBTYPE_OSW, SUBTYPE_TIMEOUT};

    #[test]
    fn test_parse_osw_line() {
        let msg = parse_message_line("0x00020000 2 1700000000.25 0064010100\r\n")
            .unwrap()
            .unwrap();
        assert_eq!(msg.msg_type.protocol(), PROTOCOL_SMARTNET);
        assert_eq!(msg.msg_type.subtype(), SUBTYPE_OSW);
        assert_eq!(msg.receiver_id(), 1);
        assert_eq!(msg.timestamp(), 1700000000.25);
        assert_eq!(msg.payload, vec![0x00, 0x64, 0x01, 0x01, 0x00]);
    }

    #[test]
    fn test_parse_timeout_line() {
        let msg = parse_message_line("0x0002ffff 0 3.5 -").unwrap().unwrap();
        assert_eq!(msg.msg_type.subtype(), SUBTYPE_TIMEOUT);
        assert!(msg.payload.is_empty());

        let msg = parse_message_line("196607 4 3.5").unwrap().unwrap();
        assert_eq!(msg.msg_type.subtype(), SUBTYPE_TIMEOUT);
        assert_eq!(msg.receiver_id(), 2);
    }

    #[test]
    fn test_parse_negative_type() {
        let msg = parse_message_line("-65536 0 0.0").unwrap().unwrap();
        assert_eq!(msg.msg_type.protocol(), -1);
    }

    #[test]
    fn test_skip_and_reject() {
        assert_eq!(parse_message_line(""), Ok(None));
        assert_eq!(parse_message_line("# capture start"), Ok(None));
        assert_eq!(parse_message_line("0x20000 2"), Err(SourceError::BadLine(2)));
        assert_eq!(
            parse_message_line("0x20000 2 1.0 zz"),
            Err(SourceError::BadHex("zz".to_string()))
        );
        assert!(matches!(
            parse_message_line("smartnet 2 1.0"),
            Err(SourceError::BadField { field: "type", .. })
        ));
        assert!(matches!(
            parse_message_line("0x1FFFFFFFF 2 1.0"),
            Err(SourceError::BadField { field: "type", .. })
        ));
    }

    #[tokio::test]
    async fn test_read_lines_forwards_messages() {
        let input: &[u8] = b"# header\n\
            0x00020000 0 1.0 0064000100\n\
            bogus line\n\
            0x0002ffff 0 2.0\n";
        let (tx, mut rx) = mpsc::channel(8);
        let source = MessageSource::new(None);

        source.read_lines(BufReader::new(input), tx).await.unwrap();

        assert_eq!(source.messages_received(), 2);
        assert_eq!(source.parse_errors(), 1);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.payload.len(), 5);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.msg_type.subtype(), -1);
        assert!(rx.recv().await.is_none());
    }
}
