use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use importio_rs_protocol::{MessageType, Request, Response};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::net::tcp::OwnedWriteHalf;
use uuid::Uuid;

/// Frames the mock sends for one query, in order.
pub type Script = Vec<(MessageType, Value)>;

pub struct MockConfig {
    /// `None` accepts any key.
    pub api_key: Option<String>,
    /// Never answer the login request.
    pub silent_login: bool,
    /// Script for the n-th received query. Queries beyond the list get nothing.
    pub scripts: Vec<Script>,
    /// Hold all frames until every script has a query, then send them
    /// round-robin across queries.
    pub interleave: bool,
    /// Close the connection once all scripts have been sent.
    pub close_after_scripts: bool,
}

impl MockConfig {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self {
            api_key: None,
            silent_login: false,
            scripts,
            interleave: false,
            close_after_scripts: false,
        }
    }
}

/// `INIT`, one `MESSAGE` with `results`, `STOP`.
pub fn results_script(results: Value) -> Script {
    vec![
        (MessageType::Init, Value::Null),
        (MessageType::Message, json!({ "results": results })),
        (MessageType::Stop, Value::Null),
    ]
}

/// `INIT`, one `MESSAGE` carrying `errorType`, `STOP`.
pub fn error_script(error_type: &str) -> Script {
    vec![
        (MessageType::Init, Value::Null),
        (
            MessageType::Message,
            json!({ "errorType": error_type, "error": "mock failure" }),
        ),
        (MessageType::Stop, Value::Null),
    ]
}

#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<Request>>>);

impl Captured {
    fn push(&self, request: Request) {
        self.0.lock().unwrap().push(request);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.0.lock().unwrap().clone()
    }

    pub fn query_ids(&self) -> Vec<Uuid> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                Request::Query { request_id, .. } => Some(request_id),
                _ => None,
            })
            .collect()
    }
}

pub struct MockServer {
    addr: SocketAddr,
    captured: Captured,
}

impl MockServer {
    pub async fn start(config: MockConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let captured = Captured::default();

        let sink = captured.clone();
        tokio::spawn(async move {
            Self::handle_connection(listener, config, sink).await;
        });

        Self { addr, captured }
    }

    /// An address nothing listens on.
    pub async fn refused_addr() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn captured(&self) -> &Captured {
        &self.captured
    }

    async fn handle_connection(listener: TcpListener, config: MockConfig, captured: Captured) {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };

        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        let mut line = String::new();
        let mut claimed: Vec<(Uuid, Script)> = Vec::new();

        loop {
            line.clear();
            let n = match reader.read_line(&mut line).await {
                Ok(n) => n,
                Err(_) => break,
            };
            if n == 0 {
                break;
            }
            let Ok(request) = Request::parse_line(&line) else {
                continue;
            };
            captured.push(request.clone());

            match request {
                Request::Login { api_key, .. } => {
                    if config.silent_login {
                        continue;
                    }
                    let reply = match &config.api_key {
                        Some(expected) if *expected != api_key => Response::Rejected {
                            reason: "invalid api key".to_owned(),
                        },
                        _ => Response::Authenticated,
                    };
                    if send(&mut write_half, &reply).await.is_err() {
                        break;
                    }
                }
                Request::Query { request_id, .. } => {
                    let index = claimed.len();
                    let Some(script) = config.scripts.get(index) else {
                        continue;
                    };
                    claimed.push((request_id, script.clone()));

                    if config.interleave {
                        if claimed.len() < config.scripts.len() {
                            continue;
                        }
                        let longest = claimed.iter().map(|(_, s)| s.len()).max().unwrap_or(0);
                        for step in 0..longest {
                            for (id, script) in &claimed {
                                if let Some((t, data)) = script.get(step) {
                                    let frame = Response::message(*id, *t, data.clone());
                                    let _ = send(&mut write_half, &frame).await;
                                }
                            }
                        }
                    } else {
                        for (t, data) in script {
                            let frame = Response::message(request_id, *t, data.clone());
                            let _ = send(&mut write_half, &frame).await;
                        }
                    }

                    if config.close_after_scripts && claimed.len() == config.scripts.len() {
                        let _ = write_half.shutdown().await;
                        break;
                    }
                }
                Request::Disconnect => {
                    let _ = write_half.shutdown().await;
                    break;
                }
            }
        }
    }
}

async fn send(write_half: &mut OwnedWriteHalf, response: &Response) -> std::io::Result<()> {
    let bytes = response.to_bytes().unwrap();
    write_half.write_all(&bytes).await?;
    write_half.flush().await
}
