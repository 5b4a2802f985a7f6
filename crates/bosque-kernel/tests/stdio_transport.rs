//! Integration tests for the JSON-lines transport with a running toolchain.
//!
//! `sh` plays both the Bosque compiler and the JavaScript runtime.

#![cfg(unix)]

use std::time::{Duration, Instant};

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, BufReader};

use bosque_core::compile::BridgeConfig;
use bosque_kernel::{KernelSession, serve};

fn request_line(msg_id: &str, code: &str) -> String {
    let request = json!({
        "msg_id": msg_id,
        "msg_type": "execute_request",
        "code": code,
    });
    format!("{request}\n")
}

#[tokio::test]
async fn test_busy_status_arrives_while_cell_runs() {
    let config = BridgeConfig::default().with_compiler("sh").with_runtime("sh");
    let (mut session, rx) = KernelSession::new(config).expect("sh should be on PATH");

    let input = request_line("slow", "sleep 2\nprintf 'echo done\\n' > jsout/Main.mjs\n");
    let (client, kernel_side) = tokio::io::duplex(64 * 1024);
    let started = Instant::now();

    let serving = serve(&mut session, rx, input.as_bytes(), kernel_side);
    let reading = async {
        let mut lines = BufReader::new(client).lines();
        let first = lines.next_line().await.unwrap().expect("busy status");
        let first_at = started.elapsed();

        let mut rest = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            rest.push(line);
        }
        (first, first_at, rest)
    };

    let (served, (first, first_at, rest)) = tokio::join!(serving, reading);
    served.unwrap();

    let first: Value = serde_json::from_str(&first).unwrap();
    assert_eq!(first["channel"], "iopub");
    assert_eq!(first["msg_type"], "status");
    assert_eq!(first["execution_state"], "busy");
    assert_eq!(first["parent_msg_id"], "slow");
    assert!(
        first_at < Duration::from_secs(1),
        "busy status should not wait for the cell, took {first_at:?}"
    );
    assert!(started.elapsed() >= Duration::from_secs(2));

    let rest: Vec<Value> = rest.iter().map(|l| serde_json::from_str(l).unwrap()).collect();
    let kinds: Vec<&str> = rest.iter().filter_map(|m| m["msg_type"].as_str()).collect();
    assert_eq!(kinds, ["stream", "status", "execute_reply"]);
    assert_eq!(rest[0]["text"], "done\n");
    assert_eq!(rest[1]["execution_state"], "idle");
}

#[tokio::test]
async fn test_consecutive_cells_keep_message_order() {
    let config = BridgeConfig::default().with_compiler("sh").with_runtime("sh");
    let (mut session, rx) = KernelSession::new(config).expect("sh should be on PATH");

    let input = request_line("a", "printf 'echo one\\n' > jsout/Main.mjs\n")
        + &request_line("b", "exit 1\n");
    let mut output = Vec::new();

    serve(&mut session, rx, input.as_bytes(), &mut output)
        .await
        .unwrap();

    let messages: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let trace: Vec<(&str, &str)> = messages
        .iter()
        .map(|m| {
            (
                m["parent_msg_id"].as_str().unwrap_or_default(),
                m["msg_type"].as_str().unwrap_or_default(),
            )
        })
        .collect();

    assert_eq!(
        trace,
        [
            ("a", "status"),
            ("a", "stream"),
            ("a", "status"),
            ("a", "execute_reply"),
            ("b", "status"),
            ("b", "error"),
            ("b", "status"),
            ("b", "execute_reply"),
        ]
    );
    assert_eq!(messages[7]["status"], "error");
    assert_eq!(messages[7]["execution_count"], 2);
    assert!(session.scratch_path().is_none());
}
