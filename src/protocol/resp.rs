use std::str;

use thiserror::Error;

/// Malformed request framing. Any of these terminates the offending
/// connection; incomplete input is not an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("expected '*' at start of request, got {0:#04x}")]
    BadRequestHeader(u8),
    #[error("malformed argument count: {0:?}")]
    BadArgumentCount(String),
    #[error("expected '$' before argument, got {0:#04x}")]
    BadBulkHeader(u8),
    #[error("malformed bulk length: {0:?}")]
    BadBulkLength(String),
    #[error("missing CRLF after bulk payload")]
    MissingTerminator,
}

pub struct RespParser;

impl RespParser {
    /// Parse as many complete requests as the buffer holds.
    /// Returns (requests, bytes_consumed); a trailing incomplete request is
    /// left unconsumed for the next read.
    pub fn parse_requests(buffer: &[u8]) -> Result<(Vec<Vec<String>>, usize), ProtocolError> {
        let mut requests = Vec::new();
        let mut pos = 0;

        while pos < buffer.len() {
            match Self::parse_single_request(&buffer[pos..])? {
                Some((args, consumed)) => {
                    requests.push(args);
                    pos += consumed;
                }
                None => break, // Incomplete request, wait for more data
            }
        }

        Ok((requests, pos))
    }

    /// Parse one `*<N>` array of bulk strings.
    /// Returns `None` if the buffer does not yet hold the whole request.
    fn parse_single_request(buffer: &[u8]) -> Result<Option<(Vec<String>, usize)>, ProtocolError> {
        if buffer.is_empty() {
            return Ok(None);
        }
        if buffer[0] != b'*' {
            return Err(ProtocolError::BadRequestHeader(buffer[0]));
        }

        let mut pos = 1;
        let Some((raw, consumed)) = Self::read_line(&buffer[pos..]) else {
            return Ok(None);
        };
        pos += consumed;

        let line = str::from_utf8(raw)
            .map_err(|_| ProtocolError::BadArgumentCount(String::from_utf8_lossy(raw).into()))?;
        let count: usize = line
            .parse()
            .map_err(|_| ProtocolError::BadArgumentCount(line.to_string()))?;
        if count < 1 {
            return Err(ProtocolError::BadArgumentCount(line.to_string()));
        }

        // The count is attacker-controlled; cap the pre-allocation and let
        // the per-argument loop bound the real work.
        let mut args = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            match Self::parse_bulk_string(&buffer[pos..])? {
                Some((arg, consumed)) => {
                    args.push(arg);
                    pos += consumed;
                }
                None => return Ok(None), // Stream ends mid-request so far
            }
        }

        Ok(Some((args, pos)))
    }

    /// Parse a `$<M>` length line plus exactly M payload bytes and CRLF.
    fn parse_bulk_string(buffer: &[u8]) -> Result<Option<(String, usize)>, ProtocolError> {
        if buffer.is_empty() {
            return Ok(None);
        }
        if buffer[0] != b'$' {
            return Err(ProtocolError::BadBulkHeader(buffer[0]));
        }

        let mut pos = 1;
        let Some((raw, consumed)) = Self::read_line(&buffer[pos..]) else {
            return Ok(None);
        };
        pos += consumed;

        let length: usize = str::from_utf8(raw)
            .ok()
            .and_then(|line| line.parse().ok())
            .ok_or_else(|| ProtocolError::BadBulkLength(String::from_utf8_lossy(raw).into()))?;

        // Checked arithmetic: a length near usize::MAX must surface as a
        // framing error, not an overflow panic on the connection thread.
        let end = pos
            .checked_add(length)
            .and_then(|end| end.checked_add(2))
            .ok_or_else(|| ProtocolError::BadBulkLength(String::from_utf8_lossy(raw).into()))?;
        if end > buffer.len() {
            return Ok(None); // Payload not fully buffered yet
        }

        let payload = String::from_utf8_lossy(&buffer[pos..pos + length]).to_string();
        pos += length;

        if &buffer[pos..pos + 2] != b"\r\n" {
            return Err(ProtocolError::MissingTerminator);
        }
        pos += 2;

        Ok(Some((payload, pos)))
    }

    /// Next CRLF-terminated line, with bytes consumed including the
    /// terminator. `None` until the terminator has arrived.
    fn read_line(buffer: &[u8]) -> Option<(&[u8], usize)> {
        let end = buffer.windows(2).position(|window| window == b"\r\n")?;
        Some((&buffer[..end], end + 2))
    }
}
