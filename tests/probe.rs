use serde_json::json;
use std::net::TcpListener;
use vllm_chat::api::ApiClient;
use vllm_chat::probe::{Prober, GREETING_PROMPT, VLLM_SERVE_HINT, WEATHER_PROMPT};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "Qwen/Qwen3-8B";

fn prober(base_url: &str) -> Prober {
    colored::control::set_override(false);
    Prober::new(ApiClient::new(base_url, "EMPTY").unwrap(), MODEL)
}

fn output(buffer: Vec<u8>) -> String {
    String::from_utf8(buffer).unwrap()
}

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

/// An address nothing listens on.
fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

async fn mount_models(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .and(header("authorization", "Bearer EMPTY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [{"id": MODEL, "object": "model", "max_model_len": 32768}]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn listing_prints_each_model_once_and_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": "Qwen/Qwen3-8B", "max_model_len": 32768},
                {"id": "Qwen/Qwen3-0.6B", "max_model_len": 8192},
                {"id": "custom-model"}
            ]
        })))
        .mount(&server)
        .await;

    let mut out = Vec::new();
    assert!(prober(&server.uri()).check_connection(&mut out).await);

    let text = output(out);
    assert_eq!(text.matches("model: Qwen/Qwen3-8B\n").count(), 1);
    assert_eq!(text.matches("max length: 32768").count(), 1);
    assert!(text.contains("max length: unknown"));
    let first = text.find("Qwen/Qwen3-8B").unwrap();
    let second = text.find("Qwen/Qwen3-0.6B").unwrap();
    let third = text.find("custom-model").unwrap();
    assert!(first < second && second < third);
}

#[tokio::test]
async fn accepts_base_url_with_version_suffix() {
    let server = MockServer::start().await;
    mount_models(&server).await;

    let mut out = Vec::new();
    let base = format!("{}/v1", server.uri());
    assert!(prober(&base).check_connection(&mut out).await);
    assert!(output(out).contains("   - model: Qwen/Qwen3-8B\n   - max length: 32768\n"));
}

#[tokio::test]
async fn listing_error_status_fails_and_skips_chat_checks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(500).set_body_string("engine dead"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(chat_reply("unused"))
        .expect(0)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    assert!(!prober(&server.uri()).run_all(&mut out).await);

    let text = output(out);
    assert!(text.contains("❌ vLLM server connection failed"));
    assert!(text.contains("500"));
    assert!(text.contains(VLLM_SERVE_HINT));
    assert!(!text.contains("2. Testing chat completion"));
}

#[tokio::test]
async fn unreachable_server_reports_error_and_halts() {
    let mut out = Vec::new();
    assert!(!prober(&refused_url()).run_all(&mut out).await);

    let text = output(out);
    let failure = text
        .lines()
        .find(|line| line.starts_with("❌ vLLM server connection failed: "))
        .expect("failure line");
    assert!(failure.len() > "❌ vLLM server connection failed: ".len());
    assert!(!text.contains("Testing chat completion"));
    assert!(!text.contains("All tests passed"));
}

#[tokio::test]
async fn chat_check_echoes_content_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": MODEL,
            "messages": [{"role": "user", "content": GREETING_PROMPT}],
            "max_tokens": 100,
            "temperature": 0.7
        })))
        .respond_with(chat_reply("안녕하세요! 반갑습니다."))
        .expect(1)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    assert!(prober(&server.uri()).check_chat(&mut out).await);

    let text = output(out);
    assert!(text.contains("Response: 안녕하세요! 반갑습니다.\n"));
    assert!(!text.contains("Reasoning"));
}

#[tokio::test]
async fn chat_check_surfaces_reasoning_when_present() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {
                "role": "assistant",
                "content": "안녕하세요!",
                "reasoning_content": "The user greets me in Korean."
            }}]
        })))
        .mount(&server)
        .await;

    let mut out = Vec::new();
    assert!(prober(&server.uri()).check_chat(&mut out).await);

    let text = output(out);
    assert!(text.contains("✅ Reasoning enabled\n"));
    assert!(text.contains("Reasoning: The user greets me in Korean.\n"));
}

#[tokio::test]
async fn empty_completion_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(chat_reply(""))
        .mount(&server)
        .await;

    let mut out = Vec::new();
    assert!(!prober(&server.uri()).check_chat(&mut out).await);
    assert!(output(out).contains("❌ Chat test failed: empty response content"));
}

#[tokio::test]
async fn unparseable_body_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let mut out = Vec::new();
    assert!(!prober(&server.uri()).check_weather_query(&mut out).await);
    assert!(output(out).contains("❌ Weather query test failed: invalid JSON"));
}

#[tokio::test]
async fn full_run_passes_all_three_checks() {
    let server = MockServer::start().await;
    mount_models(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"max_tokens": 200})))
        .respond_with(chat_reply("서울은 맑습니다."))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"max_tokens": 100})))
        .respond_with(chat_reply("안녕하세요!"))
        .expect(1)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    assert!(prober(&server.uri()).run_all(&mut out).await);

    let text = output(out);
    assert!(text.contains("✅ Weather query test passed"));
    assert!(text.contains("Response: 서울은 맑습니다."));
    assert!(text.contains("All tests passed!"));

    let requests = server.received_requests().await.unwrap();
    let weather = requests
        .iter()
        .filter(|r| r.url.path() == "/v1/chat/completions")
        .map(|r| serde_json::from_slice::<serde_json::Value>(&r.body).unwrap())
        .find(|body| body["max_tokens"] == 200)
        .unwrap();
    assert_eq!(weather["messages"][0]["role"], "system");
    assert_eq!(weather["messages"][1]["content"], WEATHER_PROMPT);
    assert!(weather.get("tools").is_none());
    assert!(weather.get("stream").is_none());
}
