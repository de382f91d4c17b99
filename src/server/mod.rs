pub mod connection;

use std::io;
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

use crate::commands::CommandExecutor;
use crate::config::Config;
use crate::storage::Store;

pub struct Server {
    listener: TcpListener,
    executor: CommandExecutor,
}

impl Server {
    /// Binds the listening socket. A failed bind is the only fatal startup
    /// error and is left to the caller.
    pub fn new(config: Arc<Config>, store: Store) -> io::Result<Self> {
        let addr = config.addr();
        let listener = TcpListener::bind(&addr)?;
        log::info!("Server listening on {}", addr);

        Ok(Self {
            listener,
            executor: CommandExecutor::new(store, config),
        })
    }

    /// Accept loop, one worker thread per connection. Runs until the process
    /// is terminated; a failed accept is logged and the loop keeps going.
    /// Connection errors stay on their own thread and never reach here.
    pub fn run(&self) -> io::Result<()> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(socket) => {
                    let executor = self.executor.clone();
                    thread::spawn(move || {
                        let peer = socket
                            .peer_addr()
                            .map(|addr| addr.to_string())
                            .unwrap_or_else(|_| "unknown".to_string());
                        log::info!("New client connection from {}", peer);

                        match connection::serve(socket, executor) {
                            Ok(()) => log::debug!("Client {} disconnected", peer),
                            Err(e) => log::error!("Client {} dropped: {}", peer, e),
                        }
                    });
                }
                Err(e) => log::error!("Error accepting connection: {}", e),
            }
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn local_addr(&self) -> io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }
}
