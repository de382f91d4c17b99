pub mod commands;
pub mod config;
pub mod protocol;
pub mod server;
pub mod snapshot;
pub mod storage;

pub use commands::{Command, CommandExecutor, Reply};
pub use config::Config;
pub use protocol::RespParser;
pub use server::Server;
pub use storage::Store;
