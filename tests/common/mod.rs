// Shared stubs for integration tests: a scripted mount and a one-shot HTTP
// responder, both on loopback listeners.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use tenmicron_sync::SessionConfig;

/// How the stub mount misbehaves.
#[derive(Debug, Clone, Default)]
pub struct MountBehaviour {
    /// Drop the connection (without replying) on this many commands first.
    pub drop_first: usize,
    /// Answer `0` to every set-command.
    pub reject_sets: bool,
    /// Answer get-commands with a non-numeric value.
    pub garbage_gets: bool,
    /// Never answer anything.
    pub silent: bool,
}

struct MountState {
    temperature: String,
    pressure: String,
    dropped: usize,
}

/// In-process mount speaking the refraction subset of the command protocol.
pub struct MountStub {
    pub port: u16,
    connections: Arc<AtomicUsize>,
    client_closes: Arc<AtomicUsize>,
    commands: Arc<Mutex<Vec<String>>>,
    received: mpsc::UnboundedReceiver<String>,
}

impl MountStub {
    pub async fn spawn(behaviour: MountBehaviour) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let connections = Arc::new(AtomicUsize::new(0));
        let client_closes = Arc::new(AtomicUsize::new(0));
        let commands = Arc::new(Mutex::new(Vec::new()));
        let (tx, received) = mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(MountState {
            temperature: "+00.0".to_string(),
            pressure: "1000.0".to_string(),
            dropped: 0,
        }));

        let conns = connections.clone();
        let closes = client_closes.clone();
        let log = commands.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                conns.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(serve(
                    socket,
                    behaviour.clone(),
                    state.clone(),
                    log.clone(),
                    tx.clone(),
                    closes.clone(),
                ));
            }
        });

        Self {
            port,
            connections,
            client_closes,
            commands,
            received,
        }
    }

    pub fn config(&self) -> SessionConfig {
        SessionConfig::builder()
            .host("127.0.0.1")
            .port(self.port)
            .connect_timeout_ms(1000)
            .io_timeout_ms(1000)
            .build()
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn client_closes(&self) -> usize {
        self.client_closes.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    /// Wait for the next command the mount receives.
    pub async fn next_command(&mut self) -> String {
        tokio::time::timeout(Duration::from_secs(5), self.received.recv())
            .await
            .expect("timed out waiting for a command")
            .expect("mount stub stopped")
    }

    /// Wait until the mount has accepted `n` connections.
    pub async fn wait_for_connections(&self, n: usize) {
        for _ in 0..100 {
            if self.connections() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("expected {n} connections, saw {}", self.connections());
    }

    /// Wait until the client has closed `n` connections.
    pub async fn wait_for_client_closes(&self, n: usize) {
        for _ in 0..100 {
            if self.client_closes() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("expected {n} client closes, saw {}", self.client_closes());
    }
}

async fn serve(
    mut socket: TcpStream,
    behaviour: MountBehaviour,
    state: Arc<Mutex<MountState>>,
    log: Arc<Mutex<Vec<String>>>,
    tx: mpsc::UnboundedSender<String>,
    client_closes: Arc<AtomicUsize>,
) {
    let mut buf = [0u8; 1024];
    loop {
        let n = match socket.read(&mut buf).await {
            Ok(0) => {
                client_closes.fetch_add(1, Ordering::SeqCst);
                return;
            }
            Ok(n) => n,
            Err(_) => return,
        };
        let command = String::from_utf8_lossy(&buf[..n]).to_string();
        log.lock().unwrap().push(command.clone());

        let reply = {
            let mut state = state.lock().unwrap();
            if state.dropped < behaviour.drop_first {
                state.dropped += 1;
                None
            } else if behaviour.silent {
                Some(String::new())
            } else {
                Some(respond(&command, &behaviour, &mut state))
            }
        };
        let _ = tx.send(command);

        match reply {
            None => return,
            Some(reply) if reply.is_empty() => {}
            Some(reply) => {
                if socket.write_all(reply.as_bytes()).await.is_err() {
                    return;
                }
            }
        }
    }
}

fn respond(command: &str, behaviour: &MountBehaviour, state: &mut MountState) -> String {
    let body = command.trim().trim_start_matches(':').trim_end_matches('#');
    if let Some(value) = body.strip_prefix("SRTMP") {
        if behaviour.reject_sets {
            return "0".to_string();
        }
        state.temperature = value.to_string();
        "1".to_string()
    } else if let Some(value) = body.strip_prefix("SRPRS") {
        if behaviour.reject_sets {
            return "0".to_string();
        }
        state.pressure = value.to_string();
        "1".to_string()
    } else if body == "GRTMP" {
        if behaviour.garbage_gets {
            "E#".to_string()
        } else {
            format!("{}#", state.temperature)
        }
    } else if body == "GRPRS" {
        if behaviour.garbage_gets {
            "E#".to_string()
        } else {
            format!("{}#", state.pressure)
        }
    } else {
        "0".to_string()
    }
}

/// A port with nothing listening on it.
pub async fn refused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Serve exactly one HTTP response, then return the request line that was
/// received.
pub async fn spawn_http_once(status: &str, body: String) -> (u16, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let status = status.to_string();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;

        let text = String::from_utf8_lossy(&request).to_string();
        text.lines().next().unwrap_or_default().to_string()
    });

    (port, handle)
}
