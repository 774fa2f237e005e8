use shared::ipc::{default_socket_path, Command, IpcError, Response};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::time::{timeout, Duration};
use tracing::warn;

/// Timeout for connecting and writing (5 seconds)
const SOCKET_TIMEOUT: Duration = Duration::from_secs(5);

/// Chat replies wait out the assistant's thinking delay, so reads get longer.
const READ_TIMEOUT: Duration = Duration::from_secs(15);

pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    pub fn new() -> Self {
        Self {
            socket_path: default_socket_path(),
        }
    }

    pub fn with_socket(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    pub async fn send_command(&self, cmd: Command) -> Result<Response, IpcError> {
        let stream = match timeout(SOCKET_TIMEOUT, UnixStream::connect(&self.socket_path)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(IpcError::ConnectionRefused);
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
                return Err(IpcError::ConnectionRefused);
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                warn!(
                    "Connection timeout: failed to connect to daemon at {} within {:?}",
                    self.socket_path.display(),
                    SOCKET_TIMEOUT
                );
                return Err(IpcError::Timeout);
            }
        };

        let (reader, mut writer) = stream.into_split();

        let mut command_json = serde_json::to_vec(&cmd)?;
        command_json.push(b'\n');

        match timeout(SOCKET_TIMEOUT, writer.write_all(&command_json)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("Write timeout: failed to send command to daemon within {:?}", SOCKET_TIMEOUT);
                return Err(IpcError::Timeout);
            }
        }

        let mut line = String::new();
        let mut reader = BufReader::new(reader);
        let n = match timeout(READ_TIMEOUT, reader.read_line(&mut line)).await {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                warn!("Read timeout: no response from daemon within {:?}", READ_TIMEOUT);
                return Err(IpcError::Timeout);
            }
        };

        if n == 0 {
            return Err(IpcError::Closed);
        }

        let response: Response = serde_json::from_str(line.trim_end())?;

        Ok(response)
    }
}
