//! API client behavior against canned responses served over a loopback
//! listener.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use harmony::api::ApiClient;
use harmony::error::Error;
use harmony::model::ScoreType;

/// Serve exactly one HTTP response on an ephemeral loopback port and
/// return the base URL pointing at it.
fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);

            let response = format!(
                "HTTP/1.1 {status_line}\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\
                 \r\n\
                 {body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    format!("http://{addr}/api")
}

const TASK_BODY: &str = r#"{
    "id": "task001",
    "description": "Realize the figured bass",
    "score": { "type": "musicxml", "data": "scores/fb.musicxml" },
    "answer": [ { "type": "musicxml", "data": "answers/fb.musicxml" } ],
    "difficulty": "hard",
    "tags": ["figured-bass"]
}"#;

#[test]
fn get_task_parses_and_validates() {
    let base_url = serve_once("200 OK", TASK_BODY);
    let client = ApiClient::new(base_url);

    let task = client.get_task("task001").unwrap();
    assert_eq!(task.id, "task001");
    assert_eq!(task.score.score_type, ScoreType::Musicxml);
}

#[test]
fn get_tasks_parses_a_list() {
    let base_url = serve_once(
        "200 OK",
        r#"[{
            "id": "task001",
            "description": "Realize the figured bass",
            "score": { "type": "json", "data": "{}" },
            "answer": [ { "type": "json", "data": "{}" } ]
        }]"#,
    );
    let client = ApiClient::new(base_url);

    let tasks = client.get_tasks().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "task001");
}

#[test]
fn non_success_status_is_reported() {
    let base_url = serve_once("404 Not Found", r#"{"detail": "Task not found"}"#);
    let client = ApiClient::new(base_url);

    assert!(matches!(
        client.get_task("missing"),
        Err(Error::RequestFailed(404))
    ));
}

#[test]
fn invalid_remote_record_fails_validation() {
    let base_url = serve_once(
        "200 OK",
        r#"[{ "id": "task001", "description": "" }]"#,
    );
    let client = ApiClient::new(base_url);

    assert!(matches!(client.get_tasks(), Err(Error::Validation(_))));
}
