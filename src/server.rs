//! TCP front end. Each client becomes one line transport of a shared
//! dispatcher; a single task owns the dispatcher so commands from all
//! clients are serialized.

use crate::dispatcher::Dispatcher;
use crate::pin::PinDriver;
use crate::transport::ChannelTransport;
use log::{debug, error, info, warn};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub struct Server {
    listener: TcpListener,
}

impl Server {
    pub async fn bind(addr: &str) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Server { listener })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Drive `dispatcher` until `shutdown` resolves, then hand it back.
    ///
    /// `tick` is the cadence of the cooperative loop: client lines, button
    /// sampling and the periodic status line are all handled on it.
    pub async fn run<D, F>(
        self,
        mut dispatcher: Dispatcher<D>,
        tick: Duration,
        shutdown: F,
    ) -> Dispatcher<D>
    where
        D: PinDriver + Send + 'static,
        F: Future<Output = ()>,
    {
        match self.local_addr() {
            Ok(addr) => info!("Listening on {}", addr),
            Err(e) => warn!("Listening on unknown address: {}", e),
        }

        let (attach_tx, mut attach_rx) = mpsc::unbounded_channel();
        let acceptor = tokio::spawn(accept_loop(self.listener, attach_tx));

        let mut interval = tokio::time::interval(tick);
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                Some(transport) = attach_rx.recv() => {
                    dispatcher.attach_transport(Box::new(transport));
                }
                _ = interval.tick() => dispatcher.tick(Instant::now()),
            }
        }

        acceptor.abort();
        info!("Server stopped");
        dispatcher
    }
}

async fn accept_loop(listener: TcpListener, attach: UnboundedSender<ChannelTransport>) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Connection failed: {}", e);
                continue;
            }
        };
        info!("Client {} connected", peer);

        let (to_engine, from_client) = mpsc::unbounded_channel();
        let (to_client, from_engine) = mpsc::unbounded_channel();
        let transport = ChannelTransport::new(format!("tcp:{}", peer), from_client, to_client);
        if attach.send(transport).is_err() {
            break;
        }
        tokio::spawn(handle_client(stream, peer, to_engine, from_engine));
    }
}

async fn handle_client(
    stream: TcpStream,
    peer: SocketAddr,
    to_engine: UnboundedSender<String>,
    mut from_engine: UnboundedReceiver<String>,
) {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if to_engine.send(line).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Client {} read error: {}", peer, e);
                    break;
                }
            },
            outgoing = from_engine.recv() => match outgoing {
                Some(text) => {
                    let framed = format!("{}\n", text);
                    if let Err(e) = writer.write_all(framed.as_bytes()).await {
                        debug!("Client {} write error: {}", peer, e);
                        break;
                    }
                }
                None => break,
            },
        }
    }
    info!("Client {} disconnected", peer);
}
