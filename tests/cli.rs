//! End-to-end tests against the built binary

use mockito::Matcher;
use std::io::Write;
use std::process::{Command, Stdio};

struct Run {
    code: i32,
    stdout: String,
}

fn run_with_env(input: &str, env: &[(&str, String)]) -> Run {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ai-processor"));
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .env("RUST_LOG", "off")
        .env_remove("OPENAI_BASE_URL")
        .env_remove("ANTHROPIC_BASE_URL")
        .env_remove("GEMINI_BASE_URL");
    for (key, value) in env {
        cmd.env(key, value);
    }

    let mut child = cmd.spawn().expect("failed to spawn ai-processor");
    child
        .stdin
        .take()
        .expect("stdin not piped")
        .write_all(input.as_bytes())
        .expect("failed to write stdin");
    let output = child.wait_with_output().expect("failed to wait");

    Run {
        code: output.status.code().expect("terminated by signal"),
        stdout: String::from_utf8(output.stdout).expect("stdout not utf-8"),
    }
}

fn run(input: &str) -> Run {
    run_with_env(input, &[])
}

fn gemini_stream_path() -> Matcher {
    Matcher::Regex(
        r"^/v1beta/models/gemini-2\.5-flash-preview-05-20:streamGenerateContent".to_string(),
    )
}

#[test]
fn test_empty_stdin_is_fatal() {
    let out = run("  \n");
    assert_ne!(out.code, 0);
    assert_eq!(out.stdout, "Error: No input data received\n");
}

#[test]
fn test_invalid_json_is_fatal() {
    let out = run("{\"provider\": openai}");
    assert_ne!(out.code, 0);
    assert!(out.stdout.starts_with("Error: Invalid JSON input:"));
    assert_eq!(out.stdout.lines().count(), 1);
}

#[test]
fn test_missing_fields_in_order() {
    let out = run(r#"{"prompt": "p"}"#);
    assert_ne!(out.code, 0);
    assert_eq!(out.stdout, "Error: Missing required field: provider\n");

    let out = run(r#"{"provider": "gemini", "api_key": "k", "prompt": "p", "content": ""}"#);
    assert_ne!(out.code, 0);
    assert_eq!(out.stdout, "Error: Missing required field: content\n");
}

#[test]
fn test_unknown_provider_exits_zero() {
    let out = run(r#"{"provider":"Mistral","api_key":"k","prompt":"p","content":"c"}"#);
    assert_eq!(out.code, 0);
    assert_eq!(out.stdout, "Error: Unknown AI provider: mistral\n");
}

#[test]
fn test_openai_round_trip() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer k")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "model": "gpt-4o-mini",
            "messages": [{
                "role": "user",
                "content": "Summarize:\n\nContent to analyze:\nHello world"
            }]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"A greeting."}}]}"#)
        .create();

    let out = run_with_env(
        r#"{"provider":"openai","api_key":"k","prompt":"Summarize:","content":"Hello world"}"#,
        &[("OPENAI_BASE_URL", format!("{}/v1", server.url()))],
    );

    assert_eq!(out.code, 0);
    assert_eq!(out.stdout, "A greeting.\n");
    mock.assert();
}

#[test]
fn test_claude_auth_failure_exits_zero() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/v1/messages")
        .with_status(401)
        .with_body(r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#)
        .create();

    let out = run_with_env(
        r#"{"provider":"CLAUDE","api_key":"bad","prompt":"p","content":"c"}"#,
        &[("ANTHROPIC_BASE_URL", server.url())],
    );

    assert_eq!(out.code, 0);
    assert_eq!(out.stdout, "Claude Error: Authentication error: invalid x-api-key\n");
}

#[test]
fn test_gemini_stream_is_buffered() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", gemini_stream_path())
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(concat!(
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"\\n Two \"}]}}]}\n\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"parts. \"}]},\"finishReason\":\"STOP\"}]}\n\n",
        ))
        .create();

    let out = run_with_env(
        r#"{"provider":"gemini","api_key":"k","model":"","prompt":"p","content":"c"}"#,
        &[("GEMINI_BASE_URL", server.url())],
    );

    assert_eq!(out.code, 0);
    assert_eq!(out.stdout, "Two parts.\n");
}

#[test]
fn test_gemini_safety_stop_is_reported() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", gemini_stream_path())
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(concat!(
            r#"data: {"candidates":[{"finishReason":"SAFETY","safetyRatings":[]}]}"#,
            "\n\n"
        ))
        .create();

    let out = run_with_env(
        r#"{"provider":"gemini","api_key":"k","prompt":"p","content":"c"}"#,
        &[("GEMINI_BASE_URL", server.url())],
    );

    assert_eq!(out.code, 0);
    assert_eq!(
        out.stdout,
        "Gemini Error: Parse error: response contained no text (finishReason: SAFETY)\n"
    );
}

#[test]
fn test_unreachable_vendor_exits_zero() {
    let out = run_with_env(
        r#"{"provider":"openai","api_key":"k","prompt":"p","content":"c"}"#,
        &[("OPENAI_BASE_URL", "http://127.0.0.1:9/v1".to_string())],
    );
    assert_eq!(out.code, 0);
    assert!(out.stdout.starts_with("OpenAI Error: "));
}
