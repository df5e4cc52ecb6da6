use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use remote_exec::{ClientConfig, PreambleStyle, ReceiveMode, execute_with_config};
use tempfile::TempDir;

#[test]
fn load_reads_json_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("remote-exec.json");
    fs::write(
        &path,
        r#"{
            "hostname": "localhost",
            "port": 7001,
            "debug_port": 5678,
            "debug_enabled": true,
            "receive_mode": "until_close",
            "preamble_style": "balanced"
        }"#,
    )
    .unwrap();

    let cfg = ClientConfig::load(&path).unwrap();

    assert_eq!(cfg.hostname, "localhost");
    assert_eq!(cfg.port, 7001);
    assert!(cfg.debug_enabled);
    assert_eq!(cfg.receive_mode, ReceiveMode::UntilClose);
    assert_eq!(cfg.preamble_style, PreambleStyle::Balanced);
}

#[test]
fn load_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{ "hostname": "" }"#).unwrap();
    assert!(ClientConfig::load(&path).is_err());

    fs::write(&path, "not json").unwrap();
    assert!(ClientConfig::load(&path).is_err());
}

#[test]
fn missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = ClientConfig::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("failed to read config"));
}

#[test]
fn execute_with_config_round_trip() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 4096];
        let n = stream.read(&mut buf).unwrap();
        stream.write_all(b"OK").unwrap();
        buf[..n].to_vec()
    });
    let cfg = ClientConfig {
        port,
        ..Default::default()
    };

    let res = execute_with_config(&cfg, "print(1)").unwrap();

    assert_eq!(res.response_text, "OK");
    assert_eq!(server.join().unwrap(), b"print(1)");
}
