use shared::ipc::{Command, Response};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info};

use crate::state::DaemonState;

pub struct DaemonServer {
    socket_path: PathBuf,
    state: Arc<DaemonState>,
}

impl DaemonServer {
    pub fn new(socket_path: PathBuf, state: Arc<DaemonState>) -> Self {
        Self { socket_path, state }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let socket_path = self.socket_path.clone();

        if socket_path.exists() {
            std::fs::remove_file(&socket_path)?;
        }

        info!("Starting socket server at {}", socket_path.display());

        let listener = UnixListener::bind(&socket_path)?;
        debug!("Listener bound successfully");

        loop {
            let state = Arc::clone(&self.state);
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("Connection accepted");
                    tokio::spawn(async move {
                        if let Err(e) = Self::handle_connection(state, stream).await {
                            error!("Error handling connection: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }

    /// One JSON command per line, one JSON response per line, until EOF.
    async fn handle_connection(state: Arc<DaemonState>, stream: UnixStream) -> anyhow::Result<()> {
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<Command>(&line) {
                Ok(command) => {
                    info!("Received command: {:?}", command);
                    handle_command(&state, command).await
                }
                Err(e) => Response::Error(format!("Malformed command: {}", e)),
            };

            let mut response_json = serde_json::to_vec(&response)?;
            response_json.push(b'\n');
            writer.write_all(&response_json).await?;
            debug!("Sent response: {:?}", response);
        }

        Ok(())
    }
}

pub async fn handle_command(state: &DaemonState, command: Command) -> Response {
    match command {
        Command::SetMode(mode) => match state.voice.set_mode(mode).await {
            Ok(()) => Response::Ok,
            Err(e) => Response::Error(e.to_string()),
        },
        Command::Toggle => match state.voice.toggle().await {
            Ok(mode) => {
                info!("Toggled interaction mode to {}", mode);
                Response::Ok
            }
            Err(e) => Response::Error(e.to_string()),
        },
        Command::Retry => match state.voice.retry().await {
            Ok(()) => Response::Ok,
            Err(e) => Response::Error(e.to_string()),
        },
        Command::Status => match state.get_status().await {
            Ok(status) => Response::Status(status),
            Err(e) => Response::Error(e.to_string()),
        },
        Command::Navigate(page) => {
            state.navigate(page);
            Response::Ok
        }
        Command::Speak { text, is_final } => {
            if state.simulator.speak(&text, is_final) {
                Response::Ok
            } else {
                Response::Error("Recognizer is not listening".to_string())
            }
        }
        Command::EndSession => {
            if state.simulator.end_session() {
                Response::Ok
            } else {
                Response::Error("Recognizer is not listening".to_string())
            }
        }
        Command::ResetTranscript => match state.voice.reset_transcript().await {
            Ok(()) => Response::Ok,
            Err(e) => Response::Error(e.to_string()),
        },
        Command::InjectError(code) => {
            state.simulator.fail(&code);
            Response::Ok
        }
        Command::Commands => match state.voice.commands().await {
            Ok(commands) => Response::Commands(commands),
            Err(e) => Response::Error(e.to_string()),
        },
        Command::Chat(text) => Response::Chat(state.chat(&text).await),
        Command::CloseChat => {
            state.close_chat().await;
            Response::Ok
        }
    }
}

impl Drop for DaemonServer {
    fn drop(&mut self) {
        if self.socket_path.exists() {
            let _ = std::fs::remove_file(&self.socket_path);
        }
    }
}
