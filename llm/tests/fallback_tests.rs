use llm::{suggest_titles_or_offline, LlmConfig, TextGenerator};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Local endpoint that answers every request with the same status line and body.
async fn canned_endpoint(status: &'static str, body: &'static str) -> TextGenerator {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(respond(stream, status, body));
        }
    });
    let mut cfg = LlmConfig::new("sk-test");
    cfg.base_url = format!("http://{addr}/v1");
    cfg.timeout = Duration::from_secs(5);
    TextGenerator::from_config(Some(cfg))
}

async fn respond(mut stream: TcpStream, status: &str, body: &str) {
    // read the request head and its content-length body before answering
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match stream.read(&mut chunk).await { Ok(0) | Err(_) => return, Ok(n) => n };
        buf.extend_from_slice(&chunk[..n]);
        let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else { continue };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
        let len = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= head_end + 4 + len { break; }
    }
    let resp = format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(resp.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn assert_degrades_to_offline(generator: TextGenerator) {
    assert!(generator.is_available());
    assert!(generator.suggest_titles("a story").await.is_empty());
    assert_eq!(generator.chat_answer("what to read", "ctx").await, "");
    let titles = suggest_titles_or_offline(&generator, "").await;
    assert_eq!(titles, storycore::suggest::suggest_titles_offline(""));
    assert_eq!(titles.len(), 5);
}

fn unreachable_generator() -> TextGenerator {
    let mut cfg = LlmConfig::new("sk-test");
    // nothing listens on port 9 locally
    cfg.base_url = "http://127.0.0.1:9/v1".to_string();
    cfg.timeout = Duration::from_secs(2);
    TextGenerator::from_config(Some(cfg))
}

#[tokio::test]
async fn unavailable_returns_empty() {
    let generator = TextGenerator::Unavailable;
    assert!(generator.suggest_titles("a story").await.is_empty());
    assert_eq!(generator.chat_answer("what to read", "ctx").await, "");
}

#[tokio::test]
async fn network_failure_returns_empty() {
    let generator = unreachable_generator();
    assert!(generator.is_available());
    assert!(generator.suggest_titles("a story").await.is_empty());
    assert_eq!(generator.chat_answer("what to read", "ctx").await, "");
}

#[tokio::test]
async fn falls_back_to_offline_titles() {
    let titles = suggest_titles_or_offline(&TextGenerator::Unavailable, "").await;
    assert_eq!(titles.len(), 5);
    assert!(titles.iter().all(|t| !t.is_empty()));

    let titles = suggest_titles_or_offline(&unreachable_generator(), "Saved the renewal.").await;
    assert_eq!(titles[0], "Saved the renewal: From Roadblock to Win");
}

#[tokio::test]
async fn server_error_returns_empty() {
    assert_degrades_to_offline(canned_endpoint("500 Internal Server Error", "{\"error\":\"boom\"}").await).await;
}

#[tokio::test]
async fn unparseable_body_returns_empty() {
    assert_degrades_to_offline(canned_endpoint("200 OK", "not json").await).await;
}

#[tokio::test]
async fn empty_choices_return_empty() {
    assert_degrades_to_offline(canned_endpoint("200 OK", "{\"choices\":[]}").await).await;
    assert_degrades_to_offline(canned_endpoint("200 OK", "{\"choices\":[{\"message\":{\"content\":null}}]}").await).await;
}

#[tokio::test]
async fn successful_completion_is_parsed() {
    let body = "{\"choices\":[{\"message\":{\"role\":\"assistant\",\"content\":\"- Renewal Rescue\\n- Small Move, Big Impact\\n\"}}]}";
    let generator = canned_endpoint("200 OK", body).await;
    assert_eq!(generator.suggest_titles("a story").await, vec!["Renewal Rescue", "Small Move, Big Impact"]);
    assert_eq!(suggest_titles_or_offline(&generator, "").await.len(), 2);
    assert_eq!(generator.chat_answer("what to read", "ctx").await, "- Renewal Rescue\n- Small Move, Big Impact");
}
