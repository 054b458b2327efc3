use std::io::{Read, Write};
use std::net::TcpListener;
use std::time::Duration;

use wirefuzz::config::SectionToggles;
use wirefuzz::fuzzing::sink::OutputSink;
use wirefuzz::fuzzing::{Fuzzer, SkipToken};
use wirefuzz::http::request::Request;
use wirefuzz::transport::{NetworkSender, RequestSender};

/// Minimal HTTP server: one connection per exchange, fixed response,
/// closes after writing.
fn spawn_server() -> (u16, std::thread::JoinHandle<usize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = std::thread::spawn(move || {
        let mut served = 0usize;
        loop {
            let Ok((mut socket, _)) = listener.accept() else {
                return served;
            };
            let mut buffer = vec![0u8; 8192];
            let mut request = Vec::new();
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buffer) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buffer[..n]),
                }
            }
            let body = b"ok";
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-length: {}\r\n\r\n",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes());
            let _ = socket.write_all(body);
            served += 1;
            if request.starts_with(b"GET /stop") {
                return served;
            }
        }
    });
    (port, handle)
}

#[test]
fn full_sweep_against_a_loopback_server() {
    let (port, server) = spawn_server();
    let dir = tempfile::tempdir().unwrap();

    let raw = format!("GET /x?q=1 HTTP/1.1\r\nHost: 127.0.0.1:{port}\r\n\r\n");
    let request = Request::parse(raw.as_bytes(), port, true, None).unwrap();
    let mut fuzzer = Fuzzer::new(
        request,
        vec!["<original>".to_string(), "probe".to_string()],
        OutputSink::new(dir.path().to_path_buf()),
        SkipToken::new(),
        Duration::ZERO,
        SectionToggles {
            directories: true,
            parameters: true,
            cookies: false,
            form_fields: true,
            json_body: true,
        },
        0.1,
    );
    let mut sender = NetworkSender::new(Duration::from_secs(5), Duration::from_secs(5));
    fuzzer.run(&mut sender).unwrap();

    // baseline + parameter q (2) + directory "x" (2)
    assert!(dir.path().join("original_0000/fuzzstring_-001.txt").is_file());
    assert!(dir.path().join("parameter_0000/fuzzstring_0001.txt").is_file());
    assert!(dir.path().join("directory_0001/fuzzstring_0001.txt").is_file());

    let baseline =
        std::fs::read(dir.path().join("original_0000/fuzzstring_-001.txt")).unwrap();
    assert!(baseline.starts_with(raw.as_bytes()));
    assert!(baseline.ends_with(b"\nHTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\nok"));

    // Shut the server down and make sure it saw every exchange.
    let stop = format!("GET /stop HTTP/1.1\r\nHost: 127.0.0.1:{port}\r\n\r\n");
    let stop_request = Request::parse(stop.as_bytes(), port, true, None).unwrap();
    sender.send(&stop_request).unwrap();
    assert_eq!(server.join().unwrap(), 6);
}
