//! TCP front end tests

use crate::mocks::test_config;
use rusty_ic::catalog::IcRegistry;
use rusty_ic::dispatcher::Dispatcher;
use rusty_ic::pin::SimulatedPinBank;
use rusty_ic::server::Server;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, writer) = stream.into_split();
        Client {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .unwrap();
    }

    async fn recv(&mut self) -> String {
        tokio::time::timeout(Duration::from_secs(5), self.lines.next_line())
            .await
            .expect("reply in time")
            .unwrap()
            .expect("connection open")
    }
}

#[tokio::test]
async fn test_commands_and_broadcast_over_tcp() {
    let dispatcher = Dispatcher::new(
        IcRegistry::builtin().unwrap(),
        SimulatedPinBank::new(),
        &test_config(),
    );
    let server = Server::bind("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.run(dispatcher, Duration::from_millis(2), async move {
        let _ = stop_rx.await;
    }));

    let mut panel = Client::connect(addr).await;
    let mut phone = Client::connect(addr).await;
    // A reply proves the client is attached.
    panel.send("SYNC").await;
    assert_eq!(panel.recv().await, "SYNC:OK");
    phone.send("SYNC").await;
    assert_eq!(phone.recv().await, "SYNC:OK");

    panel.send("IC:7400").await;
    assert_eq!(
        panel.recv().await,
        "OK:IC_SELECTED:7400,PINS=14,GATES=4,INPUTS=8"
    );
    assert_eq!(panel.recv().await, "PINS:00100101001001");
    assert_eq!(phone.recv().await, "PINS:00100101001001");

    phone.send("PINS:11000000000000").await;
    assert_eq!(phone.recv().await, "OK:PINS_SET");
    assert_eq!(phone.recv().await, "PINS:11000101001001");
    assert_eq!(panel.recv().await, "PINS:11000101001001");

    panel.send("FOO").await;
    assert_eq!(panel.recv().await, "ERR:INVALID_CMD");

    drop(phone);
    stop_tx.send(()).unwrap();
    let dispatcher = handle.await.unwrap();
    assert_eq!(
        dispatcher.session().profile().map(|p| p.name.as_str()),
        Some("7400")
    );
    assert_eq!(dispatcher.session().active_bits(), "11000101001001");
}
