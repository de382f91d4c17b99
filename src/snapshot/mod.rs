//! Decoder for the legacy on-disk snapshot format, narrowed to the
//! string-value, single-database, single-byte-length subset. The full format
//! supports multi-byte length encodings and expiry-annotated entries; those
//! are out of scope and any control opcode simply terminates the entry scan.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

/// Database selector; entry scanning starts after its header.
const OPCODE_SELECTDB: u8 = 0xFE;
/// Control opcodes that end entry scanning for the current database.
const OPCODE_EXPIRE_SECONDS: u8 = 0xF9;
const OPCODE_EXPIRE_MILLIS: u8 = 0xFA;
const OPCODE_FREQUENCY: u8 = 0xF7;
const OPCODE_RESIZEDB: u8 = 0xFB;
const OPCODE_EOF: u8 = 0xFF;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot truncated at offset {0}")]
    Truncated(usize),
    #[error("snapshot contains invalid UTF-8 at offset {0}")]
    InvalidUtf8(usize),
    #[error("failed to read snapshot file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Reads and decodes the snapshot at `<dir>/<dbfilename>`. A missing file is
/// not an error, just an empty mapping.
pub fn load(dir: &str, dbfilename: &str) -> Result<HashMap<String, String>, SnapshotError> {
    let path = Path::new(dir).join(dbfilename);
    if !path.is_file() {
        log::warn!("Snapshot file does not exist: {}", path.display());
        return Ok(HashMap::new());
    }

    let buffer = fs::read(&path).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })?;
    log::debug!(
        "Decoding snapshot {} ({} bytes)",
        path.display(),
        buffer.len()
    );
    Ok(decode(&buffer))
}

/// Decodes a snapshot buffer into key/value pairs. Best-effort, not
/// transactional: a malformed entry aborts the scan, the failure is logged,
/// and everything decoded before it is returned.
pub fn decode(buffer: &[u8]) -> HashMap<String, String> {
    let mut entries = HashMap::new();

    // No database section at all is a valid (empty) snapshot.
    let Some(marker) = buffer.iter().position(|&b| b == OPCODE_SELECTDB) else {
        log::debug!("No database selector found in snapshot");
        return entries;
    };

    // Header after the selector: database index, resize marker, hash-table
    // size hint, expire-table size hint. Only one database is supported and
    // the size hints are informational, so all four bytes are skipped.
    let mut pos = marker + 5;
    if pos > buffer.len() {
        log::error!(
            "Snapshot decode failed: {}",
            SnapshotError::Truncated(buffer.len())
        );
        return entries;
    }

    if let Err(e) = read_entries(buffer, &mut pos, &mut entries) {
        log::error!("Snapshot decode failed: {}", e);
    }
    log::debug!("Decoded {} entries from snapshot", entries.len());
    entries
}

fn read_entries(
    buffer: &[u8],
    pos: &mut usize,
    entries: &mut HashMap<String, String>,
) -> Result<(), SnapshotError> {
    while *pos < buffer.len() {
        match buffer[*pos] {
            OPCODE_EXPIRE_SECONDS | OPCODE_EXPIRE_MILLIS | OPCODE_FREQUENCY | OPCODE_RESIZEDB
            | OPCODE_EOF => {
                log::debug!(
                    "Control opcode {:#04x} at offset {}, ending entry scan",
                    buffer[*pos],
                    *pos
                );
                return Ok(());
            }
            _ => {
                let key = read_string(buffer, pos)?;
                let value = read_string(buffer, pos)?;
                entries.insert(key, value);
            }
        }
    }
    Ok(())
}

/// One length byte followed by that many bytes of UTF-8 text.
fn read_string(buffer: &[u8], pos: &mut usize) -> Result<String, SnapshotError> {
    let length = *buffer.get(*pos).ok_or(SnapshotError::Truncated(*pos))? as usize;
    *pos += 1;

    let raw = buffer
        .get(*pos..*pos + length)
        .ok_or(SnapshotError::Truncated(*pos))?;
    let text = std::str::from_utf8(raw)
        .map_err(|_| SnapshotError::InvalidUtf8(*pos))?
        .to_string();
    *pos += length;

    Ok(text)
}
