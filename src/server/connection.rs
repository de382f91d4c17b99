use std::io::{self, Read, Write};
use std::net::TcpStream;

use bytes::{Buf, BytesMut};

use crate::commands::{CommandExecutor, CommandParser};
use crate::protocol::RespParser;

const READ_CHUNK_SIZE: usize = 4096;

/// Per-connection loop: read bytes, peel off complete requests, dispatch,
/// write the replies back. Returns on clean EOF; a framing error tears this
/// connection down without touching anyone else's session or the store.
pub fn serve(mut socket: TcpStream, executor: CommandExecutor) -> io::Result<()> {
    let mut buffer = BytesMut::with_capacity(READ_CHUNK_SIZE);
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        let bytes_read = socket.read(&mut chunk)?;
        if bytes_read == 0 {
            log::debug!("Client closed connection");
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..bytes_read]);

        let (requests, consumed) = match RespParser::parse_requests(&buffer) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::error!("Protocol error, dropping connection: {}", e);
                return Ok(());
            }
        };
        buffer.advance(consumed);

        for args in requests {
            let replies = match CommandParser::parse(args) {
                Ok(Some(command)) => executor.execute(command),
                // Unknown command: deliberate silence, keep reading.
                Ok(None) => Vec::new(),
                Err(e) => {
                    log::warn!("Skipping command: {}", e);
                    Vec::new()
                }
            };

            for reply in replies {
                socket.write_all(reply.to_resp().as_bytes())?;
            }
        }
        socket.flush()?;
    }
}
