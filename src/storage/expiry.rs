use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use parking_lot::Mutex;

use super::store::Entry;

/// Delay queue feeding a dedicated sweep thread. Each `set` with a TTL
/// schedules one timer keyed by (key, deadline); the worker sleeps until the
/// soonest deadline and re-validates against the live entry before deleting,
/// so a timer left over from an overwritten entry never evicts anything.
#[derive(Debug, Clone)]
pub struct ExpiryQueue {
    sender: Sender<(String, Instant)>,
}

impl ExpiryQueue {
    /// Spawns the worker. It exits once every store handle, and with them
    /// every sender, has been dropped.
    pub fn start(entries: Arc<Mutex<HashMap<String, Entry>>>) -> Self {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || run(entries, receiver));
        Self { sender }
    }

    pub fn schedule(&self, key: String, deadline: Instant) {
        // Send only fails once the worker is gone, i.e. during shutdown;
        // the lazy read-time check covers the key from then on.
        let _ = self.sender.send((key, deadline));
    }
}

fn run(entries: Arc<Mutex<HashMap<String, Entry>>>, receiver: Receiver<(String, Instant)>) {
    let mut timers: BinaryHeap<Reverse<(Instant, String)>> = BinaryHeap::new();

    loop {
        let received = match timers.peek() {
            Some(Reverse((deadline, _))) => {
                let now = Instant::now();
                if *deadline <= now {
                    fire(&entries, &mut timers);
                    continue;
                }
                match receiver.recv_timeout(*deadline - now) {
                    Ok(message) => message,
                    Err(RecvTimeoutError::Timeout) => {
                        fire(&entries, &mut timers);
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            }
            None => match receiver.recv() {
                Ok(message) => message,
                Err(_) => return,
            },
        };

        let (key, deadline) = received;
        timers.push(Reverse((deadline, key)));
    }
}

/// Pops the soonest timer and evicts its key, but only while the live entry
/// still expires at the scheduled instant.
fn fire(entries: &Mutex<HashMap<String, Entry>>, timers: &mut BinaryHeap<Reverse<(Instant, String)>>) {
    let Some(Reverse((deadline, key))) = timers.pop() else {
        return;
    };

    let mut entries = entries.lock();
    if let Some(entry) = entries.get(&key) {
        if entry.expires_at == Some(deadline) {
            log::debug!("Sweeping expired key '{}'", key);
            entries.remove(&key);
        } else {
            log::debug!("Stale timer for key '{}', entry was re-set", key);
        }
    }
}
