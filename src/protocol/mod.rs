pub mod resp;

pub use resp::{ProtocolError, RespParser};
