// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use common::connection::ConnectionState;
use common::test_helper::positions::{MUNICH_GGA, MUNICH_RMC, munich_position};
use gnss::backoff::BackoffPolicy;
use gnss::connection::{GPSD_WATCH_NMEA, StreamConnection};
use gnss::{ConnectError, NmeaStreamModule, StreamConfig};
use module_core::{
    Event, EventBus, EventKind, EventKindType, Module, payload_ref,
    test_helper::{stop_module, wait_for_event},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::broadcast::Receiver,
    time::timeout,
};

const TIMEOUT_MS: u64 = 500;

struct NmeaServer {
    socket: TcpListener,
    client: Option<TcpStream>,
}

impl NmeaServer {
    async fn bind() -> NmeaServer {
        let socket = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind NMEA test server on localhost");
        NmeaServer {
            socket,
            client: None,
        }
    }

    fn port(&self) -> u16 {
        self.socket.local_addr().unwrap().port()
    }

    async fn accept_client(&mut self) {
        let (client, _) = timeout(Duration::from_millis(TIMEOUT_MS), self.socket.accept())
            .await
            .expect("No client connected within timeout")
            .expect("Client connection failed");
        self.client = Some(client);
    }

    async fn send(&mut self, buf: &[u8]) {
        match self.client {
            Some(ref mut client) => client.write_all(buf).await.expect("Failed to send"),
            None => panic!("NMEA server no client is connected"),
        }
    }

    async fn receive(&mut self, buf: &mut [u8]) -> std::io::Result<()> {
        match self.client {
            Some(ref mut client) => client.read_exact(buf).await.map(|_| ()),
            None => panic!("NMEA server no client is connected"),
        }
    }

    fn drop_client(&mut self) {
        self.client = None;
    }
}

fn test_config(port: u16, gpsd_handshake: bool) -> StreamConfig {
    let mut config = StreamConfig::new("127.0.0.1", &port.to_string(), gpsd_handshake);
    config.backoff = BackoffPolicy::new(Duration::from_millis(10), Duration::from_millis(50));
    config.connect_timeout = Duration::from_millis(TIMEOUT_MS);
    config
}

fn start_module(
    eb: &EventBus,
    config: StreamConfig,
) -> tokio::task::JoinHandle<Result<(), ()>> {
    let ctx = eb.context();
    tokio::spawn(async move {
        let mut module = NmeaStreamModule::new(ctx, config);
        module.run().await
    })
}

async fn wait_for_state(rx: &mut Receiver<Event>, state: ConnectionState) {
    loop {
        let event = wait_for_event(
            rx,
            Duration::from_millis(TIMEOUT_MS),
            EventKindType::ConnectionStateEvent,
        )
        .await;
        if payload_ref!(event.kind, EventKind::ConnectionStateEvent) == Some(&state) {
            return;
        }
    }
}

#[test_log::test(tokio::test)]
async fn send_watch_command_in_gpsd_mode() {
    let eb = EventBus::default();
    let mut server = NmeaServer::bind().await;
    let mut module = start_module(&eb, test_config(server.port(), true));

    server.accept_client().await;
    let mut buf = vec![0; GPSD_WATCH_NMEA.len()];
    timeout(Duration::from_millis(TIMEOUT_MS), server.receive(&mut buf))
        .await
        .expect("Watch command not received in time")
        .expect("Failed to read watch command");
    assert_eq!(std::str::from_utf8(&buf).unwrap(), GPSD_WATCH_NMEA);

    stop_module(&eb, &mut module).await;
}

#[test_log::test(tokio::test)]
async fn send_nothing_in_raw_nmea_mode() {
    let eb = EventBus::default();
    let mut server = NmeaServer::bind().await;
    let mut module = start_module(&eb, test_config(server.port(), false));

    server.accept_client().await;
    let mut buf = [0u8; 1];
    let received = timeout(Duration::from_millis(100), server.receive(&mut buf)).await;
    assert!(received.is_err(), "Raw NMEA sources must not receive a command");

    stop_module(&eb, &mut module).await;
}

#[test_log::test(tokio::test)]
async fn publish_parsed_position() {
    let eb = EventBus::default();
    let mut rx = eb.subscribe();
    let mut server = NmeaServer::bind().await;
    let mut module = start_module(&eb, test_config(server.port(), false));

    server.accept_client().await;
    server
        .send(format!("{MUNICH_GGA}\r\n{MUNICH_RMC}\r\n").as_bytes())
        .await;

    let event = wait_for_event(
        &mut rx,
        Duration::from_millis(TIMEOUT_MS),
        EventKindType::GnssPositionEvent,
    )
    .await;
    assert_eq!(
        **payload_ref!(event.kind, EventKind::GnssPositionEvent).unwrap(),
        munich_position()
    );

    stop_module(&eb, &mut module).await;
}

#[test_log::test(tokio::test)]
async fn sentence_split_across_writes_is_published_once() {
    let eb = EventBus::default();
    let mut rx = eb.subscribe();
    let mut server = NmeaServer::bind().await;
    let mut module = start_module(&eb, test_config(server.port(), false));

    server.accept_client().await;
    let (head, tail) = MUNICH_RMC.split_at(25);
    server.send(head.as_bytes()).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    server.send(format!("{tail}\r\n").as_bytes()).await;

    wait_for_event(
        &mut rx,
        Duration::from_millis(TIMEOUT_MS),
        EventKindType::GnssPositionEvent,
    )
    .await;
    let second = timeout(Duration::from_millis(100), async {
        loop {
            match rx.recv().await {
                Ok(event) if event.event_type() == EventKindType::GnssPositionEvent => {
                    return event;
                }
                _ => (),
            }
        }
    })
    .await;
    assert!(second.is_err(), "A split sentence must produce a single sample");

    stop_module(&eb, &mut module).await;
}

#[test_log::test(tokio::test)]
async fn reconnect_after_peer_hangup() {
    let eb = EventBus::default();
    let mut rx = eb.subscribe();
    let mut server = NmeaServer::bind().await;
    let mut module = start_module(&eb, test_config(server.port(), false));

    server.accept_client().await;
    wait_for_state(&mut rx, ConnectionState::Connected).await;

    server.drop_client();
    wait_for_state(&mut rx, ConnectionState::Closing).await;
    wait_for_state(&mut rx, ConnectionState::Disconnected).await;

    server.accept_client().await;
    wait_for_state(&mut rx, ConnectionState::Connected).await;

    server.send(format!("{MUNICH_RMC}\r\n").as_bytes()).await;
    wait_for_event(
        &mut rx,
        Duration::from_millis(TIMEOUT_MS),
        EventKindType::GnssPositionEvent,
    )
    .await;

    stop_module(&eb, &mut module).await;
}

#[test_log::test(tokio::test)]
async fn non_ascii_sentence_keeps_the_connection_manager_alive() {
    let eb = EventBus::default();
    let mut rx = eb.subscribe();
    let mut server = NmeaServer::bind().await;
    let mut module = start_module(&eb, test_config(server.port(), false));

    server.accept_client().await;
    server
        .send("$GPRMC,123519,A,é1.5,N,01131.000,E,022.4,084.4,230394,003.1,W\r\n".as_bytes())
        .await;
    server.send(format!("{MUNICH_RMC}\r\n").as_bytes()).await;
    wait_for_event(
        &mut rx,
        Duration::from_millis(TIMEOUT_MS),
        EventKindType::GnssPositionEvent,
    )
    .await;

    server.drop_client();
    wait_for_state(&mut rx, ConnectionState::Disconnected).await;
    server.accept_client().await;
    wait_for_state(&mut rx, ConnectionState::Connected).await;

    stop_module(&eb, &mut module).await;
}

#[test_log::test(tokio::test)]
async fn retry_until_source_becomes_available() {
    let eb = EventBus::default();
    let mut rx = eb.subscribe();
    let port = {
        let server = NmeaServer::bind().await;
        server.port()
    };
    let mut module = start_module(&eb, test_config(port, false));

    wait_for_state(&mut rx, ConnectionState::Connecting).await;
    wait_for_state(&mut rx, ConnectionState::Disconnected).await;

    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .expect("Failed to rebind NMEA test server port");
    let mut server = NmeaServer {
        socket: listener,
        client: None,
    };
    server.accept_client().await;
    wait_for_state(&mut rx, ConnectionState::Connected).await;

    stop_module(&eb, &mut module).await;
}

#[test_log::test(tokio::test)]
async fn failed_connect_falls_back_to_disconnected() {
    let eb = EventBus::default();
    let port = NmeaServer::bind().await.port();
    let mut connection =
        StreamConnection::new(Arc::new(test_config(port, false)), eb.context().sender);

    let result = connection.connect().await;
    assert!(matches!(result, Err(ConnectError::Unreachable { .. })));
    assert_eq!(connection.state(), ConnectionState::Disconnected);
}

#[test_log::test(tokio::test)]
async fn connect_is_refused_unless_disconnected() {
    let eb = EventBus::default();
    let server = NmeaServer::bind().await;
    let mut connection =
        StreamConnection::new(Arc::new(test_config(server.port(), false)), eb.context().sender);

    let _socket = connection.connect().await.expect("Failed to connect to test server");
    assert_eq!(connection.state(), ConnectionState::Connected);
    assert!(matches!(
        connection.connect().await,
        Err(ConnectError::Busy(ConnectionState::Connected))
    ));
}
