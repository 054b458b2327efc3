use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_the_input_formats() {
    Command::cargo_bin("wirefuzz")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--filename"))
        .stdout(predicate::str::contains("--export"))
        .stdout(predicate::str::contains("--fetch"))
        .stdout(predicate::str::contains("--wordlist"));
}

#[test]
fn refuses_to_run_without_an_input() {
    Command::cargo_bin("wirefuzz")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "either --filename, --export or --fetch",
        ));
}

#[test]
fn rejects_a_missing_wordlist_file() {
    let mut request_file = tempfile::NamedTempFile::new().unwrap();
    request_file
        .write_all(b"GET / HTTP/1.1\r\nHost: h\r\n\r\n")
        .unwrap();
    Command::cargo_bin("wirefuzz")
        .unwrap()
        .arg("--filename")
        .arg(request_file.path())
        .arg("--wordlist")
        .arg("/nonexistent/wordlist.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot load wordlist"));
}

#[test]
fn fuzzes_a_request_file_against_a_local_server() {
    use std::io::Read;
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    std::thread::spawn(move || {
        while let Ok((mut socket, _)) = listener.accept() {
            let mut buffer = [0u8; 4096];
            let _ = socket.read(&mut buffer);
            let _ = socket.write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n");
        }
    });

    let mut request_file = tempfile::NamedTempFile::new().unwrap();
    write!(request_file, "GET / HTTP/1.1\r\nHost: 127.0.0.1:{port}\r\n\r\n").unwrap();
    let mut wordlist = tempfile::NamedTempFile::new().unwrap();
    wordlist.write_all(b"probe\n").unwrap();
    let output = tempfile::tempdir().unwrap();

    Command::cargo_bin("wirefuzz")
        .unwrap()
        .arg("--filename")
        .arg(request_file.path())
        .arg("--port")
        .arg(port.to_string())
        .arg("--disable-https")
        .arg("--wordlist")
        .arg(wordlist.path())
        .arg("--output-directory")
        .arg(output.path())
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fuzzing request: /"));

    // One session directory holding the baseline record.
    let session: Vec<_> = std::fs::read_dir(output.path()).unwrap().collect();
    assert_eq!(session.len(), 1);
    let session_path = session[0].as_ref().unwrap().path();
    assert!(session_path.join("original_0000/fuzzstring_-001.txt").is_file());
}
