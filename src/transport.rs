// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Request execution over plain TCP or TLS.
//!
//! Every exchange opens a fresh connection, writes the recreated request,
//! and reads until the peer closes or the read timeout fires. The fuzzer
//! is strictly sequential, so blocking sockets are all it needs.

use std::io::Read;
use std::io::Write;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};
use tracing::{debug, warn};

use crate::errors::FuzzError;
use crate::http::request::Request;
use crate::http::response::Response;

/// Seam between the fuzzing driver and the network.
pub trait RequestSender {
    /// Execute `request` and return the raw response.
    fn send(&mut self, request: &Request) -> Result<Response, FuzzError>;
}

/// The production sender: one TCP (or TLS) connection per request.
pub struct NetworkSender {
    connect_timeout: Duration,
    read_timeout: Duration,
    tls_config: Arc<ClientConfig>,
}

impl NetworkSender {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Self {
        let loaded = rustls_native_certs::load_native_certs();
        for error in &loaded.errors {
            warn!(%error, "skipping unreadable root certificate");
        }
        let mut roots = RootCertStore::empty();
        let (added, ignored) = roots.add_parsable_certificates(loaded.certs);
        debug!(added, ignored, "loaded root certificates");
        if roots.is_empty() {
            warn!("no usable root certificates found, HTTPS requests will fail");
        }
        let tls_config = ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        Self {
            connect_timeout,
            read_timeout,
            tls_config: Arc::new(tls_config),
        }
    }

    fn connect(&self, hostname: &str, port: u16) -> Result<TcpStream, FuzzError> {
        let addrs = (hostname, port)
            .to_socket_addrs()
            .map_err(|e| FuzzError::Connection(format!("cannot resolve {hostname}: {e}")))?;
        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.read_timeout))?;
                    return Ok(stream);
                }
                Err(e) => last_error = Some(e),
            }
        }
        Err(FuzzError::Connection(match last_error {
            Some(e) => format!("cannot connect to {hostname}:{port}: {e}"),
            None => format!("no addresses for {hostname}:{port}"),
        }))
    }
}

impl RequestSender for NetworkSender {
    fn send(&mut self, request: &Request) -> Result<Response, FuzzError> {
        let host = request
            .host()
            .ok_or_else(|| FuzzError::Connection("request has no Host header".into()))?;
        // The Host header may carry a port; the connection target never does.
        let hostname = host.split(':').next().unwrap_or(&host).to_string();
        let payload = request.recreate();

        let started = Instant::now();
        let stream = self.connect(&hostname, request.port)?;
        let raw = if request.disable_https {
            debug!(bytes = payload.len(), "sending plain HTTP request");
            exchange(stream, &payload)?
        } else {
            debug!(bytes = payload.len(), "sending HTTPS request");
            let name = ServerName::try_from(hostname.clone())
                .map_err(|e| FuzzError::Connection(format!("invalid server name: {e}")))?;
            let connection = ClientConnection::new(Arc::clone(&self.tls_config), name)
                .map_err(|e| FuzzError::Connection(format!("TLS setup failed: {e}")))?;
            exchange(StreamOwned::new(connection, stream), &payload)?
        };
        Ok(Response::new(raw, started.elapsed()))
    }
}

/// Write the request and read until close or the read timeout. A timeout
/// or a truncated TLS close after data arrived ends the read; before any
/// data it is a connection error.
fn exchange<S: Read + Write>(mut stream: S, payload: &[u8]) -> Result<Vec<u8>, FuzzError> {
    stream
        .write_all(payload)
        .map_err(|e| FuzzError::Connection(format!("write failed: {e}")))?;

    let mut raw = Vec::new();
    let mut buffer = [0u8; 4096];
    loop {
        match stream.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => raw.extend_from_slice(&buffer[..n]),
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                debug!("read timed out, treating response as complete");
                break;
            }
            // Servers regularly close without a TLS close_notify.
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof && !raw.is_empty() => {
                warn!(%e, "connection closed without close_notify");
                break;
            }
            Err(e) => return Err(FuzzError::Connection(format!("read failed: {e}"))),
        }
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read as _, Write as _};
    use std::net::TcpListener;

    #[test]
    fn plain_http_exchange_against_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = std::thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut buffer = [0u8; 1024];
            let n = socket.read(&mut buffer).unwrap();
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
                .unwrap();
            buffer[..n].to_vec()
        });

        let raw = format!("GET / HTTP/1.1\r\nHost: 127.0.0.1:{port}\r\n\r\n");
        let request = Request::parse(raw.as_bytes(), port, true, None).unwrap();
        let mut sender = NetworkSender::new(Duration::from_secs(2), Duration::from_secs(2));
        let response = sender.send(&request).unwrap();
        assert_eq!(response.status_code(), Some(200));
        let seen = server.join().unwrap();
        assert_eq!(seen, raw.as_bytes());
    }

    #[test]
    fn missing_host_header_is_a_connection_error() {
        let request = Request::parse(b"GET / HTTP/1.1\r\nX: 1\r\n\r\n", 443, true, None).unwrap();
        let mut sender = NetworkSender::new(Duration::from_secs(1), Duration::from_secs(1));
        assert!(matches!(
            sender.send(&request),
            Err(FuzzError::Connection(_))
        ));
    }
}
