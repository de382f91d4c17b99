use std::sync::Arc;
use std::time::Duration;

use super::{Command, Reply};
use crate::config::Config;
use crate::snapshot;
use crate::storage::Store;

/// Executes decoded commands against the shared store. One clone per
/// connection thread; the store and configuration handle their own sharing.
///
/// A handler returns zero or more replies, written to the client in order.
/// Zero replies is deliberate silence (unknown CONFIG parameter).
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    store: Store,
    config: Arc<Config>,
}

impl CommandExecutor {
    pub fn new(store: Store, config: Arc<Config>) -> Self {
        Self { store, config }
    }

    pub fn execute(&self, command: Command) -> Vec<Reply> {
        log::debug!("Executing command: {:?}", command);

        match command {
            Command::Ping => vec![Reply::pong()],
            Command::Echo(messages) => {
                // Legacy quirk, preserved: each argument gets its own
                // simple-string reply rather than one array.
                messages.into_iter().map(Reply::Simple).collect()
            }
            Command::Set {
                key,
                value,
                ttl_millis,
            } => {
                self.store
                    .set(key, value, ttl_millis.map(Duration::from_millis));
                vec![Reply::ok()]
            }
            Command::Get(key) => vec![Reply::Bulk(self.store.get(&key))],
            Command::ConfigGet(parameter) => match self.config.get(&parameter) {
                Some(value) => vec![Reply::Array(vec![
                    Reply::Bulk(Some(parameter)),
                    Reply::Bulk(Some(value)),
                ])],
                None => {
                    log::warn!("CONFIG GET: unrecognized parameter '{}'", parameter);
                    Vec::new()
                }
            },
            Command::Keys(pattern) => {
                log::debug!("KEYS ignores its pattern ({:?}), full dump", pattern);
                if let Some((dir, dbfilename)) = self.config.snapshot_location() {
                    match snapshot::load(dir, dbfilename) {
                        Ok(entries) => self.store.load_all(entries),
                        Err(e) => log::error!("Snapshot reload failed: {}", e),
                    }
                }
                let keys = self
                    .store
                    .keys()
                    .into_iter()
                    .map(|key| Reply::Bulk(Some(key)))
                    .collect();
                vec![Reply::Array(keys)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn executor_with(config: Config) -> CommandExecutor {
        CommandExecutor::new(Store::new(), Arc::new(config))
    }

    fn executor() -> CommandExecutor {
        executor_with(Config {
            dir: Some("/tmp/data".to_string()),
            dbfilename: None,
            port: 6379,
        })
    }

    #[test]
    fn ping_replies_pong() {
        assert_eq!(executor().execute(Command::Ping), vec![Reply::pong()]);
    }

    #[test]
    fn echo_replies_one_simple_string_per_argument() {
        let replies = executor().execute(Command::Echo(vec!["a".to_string(), "b".to_string()]));
        let wire: String = replies.iter().map(Reply::to_resp).collect();
        assert_eq!(wire, "+a\r\n+b\r\n");
    }

    #[test]
    fn set_then_get_roundtrip() {
        let executor = executor();
        let replies = executor.execute(Command::Set {
            key: "k".to_string(),
            value: "v".to_string(),
            ttl_millis: None,
        });
        assert_eq!(replies, vec![Reply::ok()]);
        assert_eq!(
            executor.execute(Command::Get("k".to_string())),
            vec![Reply::Bulk(Some("v".to_string()))]
        );
    }

    #[test]
    fn get_missing_key_is_null_bulk() {
        assert_eq!(
            executor().execute(Command::Get("nope".to_string())),
            vec![Reply::nil()]
        );
    }

    #[test]
    fn config_get_dir_exact_wire_bytes() {
        let replies = executor().execute(Command::ConfigGet("dir".to_string()));
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].to_resp(), "*2\r\n$3\r\ndir\r\n$9\r\n/tmp/data\r\n");
    }

    #[test]
    fn config_get_unknown_parameter_is_silent() {
        assert!(executor()
            .execute(Command::ConfigGet("maxmemory".to_string()))
            .is_empty());
    }

    #[test]
    fn keys_without_snapshot_config_lists_store() {
        let executor = executor();
        executor.execute(Command::Set {
            key: "k".to_string(),
            value: "v".to_string(),
            ttl_millis: None,
        });
        assert_eq!(
            executor.execute(Command::Keys("*".to_string())),
            vec![Reply::Array(vec![Reply::Bulk(Some("k".to_string()))])]
        );
    }

    #[test]
    fn keys_merges_snapshot_then_lists() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("dump.rdb")).unwrap();
        file.write_all(&[
            0xFE, 0x00, 0xFB, 0x02, 0x00, 3, b'a', b'b', b'c', 3, b'x', b'y', b'z',
        ])
        .unwrap();

        let executor = executor_with(Config {
            dir: Some(dir.path().to_str().unwrap().to_string()),
            dbfilename: Some("dump.rdb".to_string()),
            port: 6379,
        });

        let replies = executor.execute(Command::Keys("*".to_string()));
        assert_eq!(
            replies,
            vec![Reply::Array(vec![Reply::Bulk(Some("abc".to_string()))])]
        );
        // The merge is visible to GET afterwards.
        assert_eq!(
            executor.execute(Command::Get("abc".to_string())),
            vec![Reply::Bulk(Some("xyz".to_string()))]
        );
    }
}
