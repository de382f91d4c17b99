pub mod executor;
pub mod parser;
pub mod response;

pub use executor::CommandExecutor;
pub use parser::{CommandError, CommandParser};
pub use response::Reply;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ping,
    Echo(Vec<String>),
    Set {
        key: String,
        value: String,
        ttl_millis: Option<u64>,
    },
    Get(String),
    ConfigGet(String),
    /// The pattern is carried but ignored: legacy behavior is a full dump.
    Keys(String),
}
