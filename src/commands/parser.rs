use thiserror::Error;

use super::Command;

/// Wrong arity or argument format for a known command. Skips that single
/// command without a reply; the connection stays up.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("wrong number of arguments for {0}")]
    WrongArity(&'static str),
    #[error("unsupported SET option {0:?}, only the literal 'px' is accepted")]
    BadSetOption(String),
    #[error("invalid expiry value {0:?}")]
    BadExpiry(String),
}

pub struct CommandParser;

impl CommandParser {
    /// Maps decoded arguments to a command. Dispatch is case-sensitive on
    /// the name exactly as received; an unrecognized name yields `Ok(None)`
    /// and the caller stays silent, by legacy contract.
    pub fn parse(args: Vec<String>) -> Result<Option<Command>, CommandError> {
        let Some(name) = args.first() else {
            return Ok(None);
        };

        match name.as_str() {
            "PING" => Ok(Some(Command::Ping)),
            "ECHO" => Self::parse_echo(args).map(Some),
            "SET" => Self::parse_set(args).map(Some),
            "GET" => Self::parse_get(args).map(Some),
            "CONFIG" => Self::parse_config(args),
            "KEYS" => Self::parse_keys(args).map(Some),
            _ => {
                log::warn!("Unrecognized command: {}", name);
                Ok(None)
            }
        }
    }

    fn parse_echo(args: Vec<String>) -> Result<Command, CommandError> {
        if args.len() < 2 {
            return Err(CommandError::WrongArity("ECHO"));
        }
        Ok(Command::Echo(args.into_iter().skip(1).collect()))
    }

    fn parse_set(mut args: Vec<String>) -> Result<Command, CommandError> {
        match args.len() {
            3 => {
                let value = args.pop().unwrap_or_default();
                let key = args.pop().unwrap_or_default();
                Ok(Command::Set {
                    key,
                    value,
                    ttl_millis: None,
                })
            }
            5 => {
                // Only the exact literal 'px' selects an expiry; anything
                // else in that position is an argument error.
                if args[3] != "px" {
                    return Err(CommandError::BadSetOption(args[3].clone()));
                }
                let ttl: u64 = args[4]
                    .parse()
                    .map_err(|_| CommandError::BadExpiry(args[4].clone()))?;
                Ok(Command::Set {
                    key: args[1].clone(),
                    value: args[2].clone(),
                    ttl_millis: Some(ttl),
                })
            }
            4 if args[3] != "px" => Err(CommandError::BadSetOption(args[3].clone())),
            _ => Err(CommandError::WrongArity("SET")),
        }
    }

    fn parse_get(mut args: Vec<String>) -> Result<Command, CommandError> {
        if args.len() != 2 {
            return Err(CommandError::WrongArity("GET"));
        }
        Ok(Command::Get(args.pop().unwrap_or_default()))
    }

    fn parse_config(mut args: Vec<String>) -> Result<Option<Command>, CommandError> {
        if args.len() != 3 {
            return Err(CommandError::WrongArity("CONFIG"));
        }
        // Only the GET subcommand exists; anything else gets the same
        // silence as an unknown command.
        if args[1] != "GET" {
            log::warn!("Unrecognized CONFIG subcommand: {}", args[1]);
            return Ok(None);
        }
        Ok(Some(Command::ConfigGet(args.pop().unwrap_or_default())))
    }

    fn parse_keys(mut args: Vec<String>) -> Result<Command, CommandError> {
        if args.len() != 2 {
            return Err(CommandError::WrongArity("KEYS"));
        }
        Ok(Command::Keys(args.pop().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_ping() {
        assert_eq!(
            CommandParser::parse(args(&["PING"])).unwrap(),
            Some(Command::Ping)
        );
    }

    #[test]
    fn dispatch_is_case_sensitive() {
        assert_eq!(CommandParser::parse(args(&["ping"])).unwrap(), None);
        assert_eq!(CommandParser::parse(args(&["Get", "k"])).unwrap(), None);
    }

    #[test]
    fn unknown_command_is_silently_none() {
        assert_eq!(CommandParser::parse(args(&["FOO", "bar"])).unwrap(), None);
    }

    #[test]
    fn parses_echo_with_multiple_arguments() {
        assert_eq!(
            CommandParser::parse(args(&["ECHO", "a", "b"])).unwrap(),
            Some(Command::Echo(vec!["a".to_string(), "b".to_string()]))
        );
        assert_eq!(
            CommandParser::parse(args(&["ECHO"])).unwrap_err(),
            CommandError::WrongArity("ECHO")
        );
    }

    #[test]
    fn parses_set_without_ttl() {
        assert_eq!(
            CommandParser::parse(args(&["SET", "k", "v"])).unwrap(),
            Some(Command::Set {
                key: "k".to_string(),
                value: "v".to_string(),
                ttl_millis: None,
            })
        );
    }

    #[test]
    fn parses_set_with_px_ttl() {
        assert_eq!(
            CommandParser::parse(args(&["SET", "k", "v", "px", "100"])).unwrap(),
            Some(Command::Set {
                key: "k".to_string(),
                value: "v".to_string(),
                ttl_millis: Some(100),
            })
        );
    }

    #[test]
    fn set_option_must_be_lowercase_px_literal() {
        assert_eq!(
            CommandParser::parse(args(&["SET", "k", "v", "PX", "100"])).unwrap_err(),
            CommandError::BadSetOption("PX".to_string())
        );
        assert_eq!(
            CommandParser::parse(args(&["SET", "k", "v", "ex", "100"])).unwrap_err(),
            CommandError::BadSetOption("ex".to_string())
        );
    }

    #[test]
    fn set_with_non_numeric_expiry_fails() {
        assert_eq!(
            CommandParser::parse(args(&["SET", "k", "v", "px", "soon"])).unwrap_err(),
            CommandError::BadExpiry("soon".to_string())
        );
    }

    #[test]
    fn set_with_dangling_px_fails() {
        assert_eq!(
            CommandParser::parse(args(&["SET", "k", "v", "px"])).unwrap_err(),
            CommandError::WrongArity("SET")
        );
    }

    #[test]
    fn parses_config_get() {
        assert_eq!(
            CommandParser::parse(args(&["CONFIG", "GET", "dir"])).unwrap(),
            Some(Command::ConfigGet("dir".to_string()))
        );
        // Subcommand match is exact; anything else is silence.
        assert_eq!(
            CommandParser::parse(args(&["CONFIG", "SET", "dir"])).unwrap(),
            None
        );
    }

    #[test]
    fn parses_keys() {
        assert_eq!(
            CommandParser::parse(args(&["KEYS", "*"])).unwrap(),
            Some(Command::Keys("*".to_string()))
        );
    }
}
