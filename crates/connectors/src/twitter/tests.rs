//! Filter stream tests against a local one-shot HTTP server

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tweetcast_config::{Credentials, StreamConfig};
use tweetcast_protocol::StreamMessage;

use super::*;

const TWEET: &str = r#"{"id":10,"id_str":"10","text":"hello","user":{"id":7,"screen_name":"ferris"}}"#;
const WARNING: &str = r#"{"warning":{"code":"FALLING_BEHIND","message":"slow down","percent_full":60}}"#;

fn credentials() -> Credentials {
    Credentials {
        consumer_key: "ck".into(),
        consumer_secret: "cs".into(),
        access_token: "at".into(),
        access_secret: "as".into(),
    }
}

/// What the fake server saw
struct Captured {
    head: String,
    body: String,
}

/// Accept one connection, capture the request, then run `respond`
async fn serve_once<F, Fut>(respond: F) -> (String, oneshot::Receiver<Captured>)
where
    F: FnOnce(TcpStream) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/1.1/statuses/filter.json", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let captured = read_request(&mut socket).await;
        let _ = tx.send(captured);
        respond(socket).await;
    });

    (url, rx)
}

async fn read_request(socket: &mut TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|l| {
            let (name, value) = l.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0);
        buf.extend_from_slice(&chunk[..n]);
    }

    Captured {
        head,
        body: String::from_utf8_lossy(&buf[head_end..head_end + content_length]).to_string(),
    }
}

async fn write_status(socket: &mut TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    socket.write_all(response.as_bytes()).await.unwrap();
    socket.shutdown().await.ok();
}

async fn write_stream_head(socket: &mut TcpStream) {
    socket
        .write_all(b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\nconnection: close\r\n\r\n")
        .await
        .unwrap();
}

fn client(url: String) -> TwitterStream {
    let config = StreamConfig {
        api_url: url,
        timeout: Duration::from_secs(5),
        ..Default::default()
    };
    TwitterStream::new(&credentials(), &config).unwrap()
}

// ============================================================================
// Request shape
// ============================================================================

#[tokio::test]
async fn test_request_is_signed_form_post() {
    let (url, captured) = serve_once(|mut socket| async move {
        write_stream_head(&mut socket).await;
    })
    .await;

    let twitter = client(url);
    let mut stream = twitter
        .filter(&FilterParams::track(["rust", "tokio"]))
        .await
        .unwrap();
    assert!(stream.next().await.is_none());

    let captured = captured.await.unwrap();
    assert!(captured.head.starts_with("POST /1.1/statuses/filter.json HTTP/1.1"));
    let head = captured.head.to_ascii_lowercase();
    assert!(head.contains("authorization: oauth oauth_consumer_key=\"ck\""));
    assert!(head.contains("content-type: application/x-www-form-urlencoded"));
    assert_eq!(captured.body, "track=rust%2Ctokio&stall_warnings=true");
}

// ============================================================================
// Status classification
// ============================================================================

#[tokio::test]
async fn test_unauthorized_is_fatal() {
    let (url, _captured) = serve_once(|mut socket| async move {
        write_status(&mut socket, "401 Unauthorized", "bad credentials").await;
    })
    .await;

    let err = client(url)
        .filter(&FilterParams::track(["rust"]))
        .await
        .unwrap_err();

    assert!(matches!(err, ConnectorError::AuthFailed(ref msg) if msg.contains("bad credentials")));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_enhance_your_calm_is_rate_limited() {
    let (url, _captured) = serve_once(|mut socket| async move {
        write_status(&mut socket, "420 Enhance Your Calm", "").await;
    })
    .await;

    let err = client(url)
        .filter(&FilterParams::track(["rust"]))
        .await
        .unwrap_err();

    assert!(matches!(err, ConnectorError::RateLimited { status: 420 }));
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_server_error_is_retryable_status() {
    let (url, _captured) = serve_once(|mut socket| async move {
        write_status(&mut socket, "503 Service Unavailable", "over capacity").await;
    })
    .await;

    let err = client(url)
        .filter(&FilterParams::track(["rust"]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ConnectorError::Status { status: 503, ref body } if body == "over capacity"
    ));
}

// ============================================================================
// Body decoding
// ============================================================================

#[tokio::test]
async fn test_stream_decodes_lines() {
    let (url, _captured) = serve_once(|mut socket| async move {
        write_stream_head(&mut socket).await;
        socket.write_all(b"\r\n").await.unwrap();
        socket.write_all(TWEET[..20].as_bytes()).await.unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        socket.write_all(TWEET[20..].as_bytes()).await.unwrap();
        socket.write_all(b"\r\nnot json\r\n").await.unwrap();
        socket.write_all(WARNING.as_bytes()).await.unwrap();
        socket.write_all(b"\r\n").await.unwrap();
        socket.shutdown().await.ok();
    })
    .await;

    let twitter = client(url);
    let mut stream = twitter.filter(&FilterParams::track(["rust"])).await.unwrap();

    match stream.next().await {
        Some(Ok(StreamMessage::Tweet(tweet))) => {
            assert_eq!(tweet.id, 10);
            assert_eq!(tweet.user.screen_name, "ferris");
        }
        other => panic!("expected tweet, got {:?}", other),
    }

    let err = stream.next().await.unwrap().unwrap_err();
    assert!(err.is_message_error());

    assert!(matches!(
        stream.next().await,
        Some(Ok(StreamMessage::Warning(w))) if w.percent_full == Some(60)
    ));
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_silent_stream_stalls() {
    let (url, _captured) = serve_once(|mut socket| async move {
        write_stream_head(&mut socket).await;
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(socket);
    })
    .await;

    let twitter = client(url).with_stall_timeout(Duration::from_millis(100));
    let mut stream = twitter.filter(&FilterParams::track(["rust"])).await.unwrap();

    assert!(matches!(
        stream.next().await,
        Some(Err(ConnectorError::Stalled { .. }))
    ));
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_stop_releases_stream() {
    let (url, _captured) = serve_once(|mut socket| async move {
        write_stream_head(&mut socket).await;
        socket.write_all(TWEET.as_bytes()).await.unwrap();
        socket.write_all(b"\r\n").await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    })
    .await;

    let twitter = client(url);
    let mut stream = twitter.filter(&FilterParams::track(["rust"])).await.unwrap();
    assert!(matches!(stream.next().await, Some(Ok(StreamMessage::Tweet(_)))));

    stream.stop();
    stream.stop();
    let next = tokio::time::timeout(Duration::from_millis(500), stream.next())
        .await
        .unwrap();
    assert!(next.is_none());
}

#[tokio::test]
async fn test_connect_refused_is_http_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(format!("http://{addr}/filter"))
        .filter(&FilterParams::track(["rust"]))
        .await
        .unwrap_err();

    assert!(matches!(err, ConnectorError::Http(_)));
    assert!(!err.is_fatal());
}
