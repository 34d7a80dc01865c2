//! HttpApi against a throwaway raw-TCP server.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use threadbench::api::{BenchmarkApi, HttpApi};
use threadbench::error::ClientError;
use threadbench::labels::{Endpoint, PLATFORM_LABEL};
use threadbench::model::{BenchmarkRequest, BenchmarkResponse, TestKind};

#[derive(Debug, Clone)]
struct Seen {
    method: String,
    path: String,
    body: String,
}

type Route = (&'static str, u16, &'static str);

/// Serve canned `(path, status, body)` routes; unknown paths get 404.
async fn serve(routes: Vec<Route>) -> (String, Arc<Mutex<Vec<Seen>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else { break };
            let routes = routes.clone();
            let log = Arc::clone(&log);
            tokio::spawn(async move { handle(stream, &routes, &log).await });
        }
    });
    (format!("http://{}", addr), seen)
}

async fn handle(mut stream: TcpStream, routes: &[Route], log: &Mutex<Vec<Seen>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|l| {
            let (k, v) = l.split_once(':')?;
            k.eq_ignore_ascii_case("content-length").then(|| v.trim().parse::<usize>().ok())?
        })
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let mut request_line = head.lines().next().unwrap_or("").split_whitespace();
    let method = request_line.next().unwrap_or("").to_string();
    let path = request_line.next().unwrap_or("").to_string();
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    let (status, reply) = routes
        .iter()
        .find(|(p, _, _)| *p == path)
        .map(|(_, s, b)| (*s, *b))
        .unwrap_or((404, "not found"));
    log.lock().unwrap().push(Seen { method, path, body });

    let response = format!(
        "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reply.len(),
        reply
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

const SINGLE: &str = r#"{"threadModel":"Platform Threads (1:1 OS-Mapping)","testType":"cpu","matrixSize":200,
"parallelTasks":10,"totalExecutionTimeMs":1250,"memoryBeforeMB":40.5,"memoryPeakMB":61.25,"memoryAfterMB":42.0,"memoryUsageMB":20.75}"#;

#[tokio::test]
async fn posts_request_and_parses_single_result() {
    let (base, seen) = serve(vec![("/api/matrix/platform-threads", 200, SINGLE)]).await;
    let api = HttpApi::new(&base).unwrap();
    let request = BenchmarkRequest::cpu(200, 10).unwrap();

    let response = api.run_benchmark(Endpoint::Platform, &request).await.unwrap();
    let BenchmarkResponse::Single(result) = response else { panic!("expected a single result") };
    assert_eq!(result.thread_model, PLATFORM_LABEL);
    assert_eq!(result.test_type, Some(TestKind::Cpu));
    assert_eq!(result.total_execution_time_ms, 1250.0);
    assert_eq!(result.memory_usage_mb, Some(20.75));
    assert_eq!(result.throughput(), Some(8.0));

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].method, "POST");
    let sent: serde_json::Value = serde_json::from_str(&seen[0].body).unwrap();
    assert_eq!(sent["testType"], "cpu");
    assert_eq!(sent["matrixSize"], 200);
    assert_eq!(sent["parallelTasks"], 10);
    assert_eq!(sent["fileSizeKB"], 100);
}

#[tokio::test]
async fn parses_array_for_compare_all() {
    let body = r#"[{"threadModel":"Virtual Threads (JVM-optimized)","parallelTasks":4,"totalExecutionTimeMs":100},
                   {"threadModel":"Kernel Threads (1:1)","parallelTasks":4,"totalExecutionTimeMs":0}]"#;
    let (base, _) = serve(vec![("/api/matrix/compare-all", 200, body)]).await;
    let api = HttpApi::new(&base).unwrap();

    let results = api
        .run_benchmark(Endpoint::CompareAll, &BenchmarkRequest::io(256, 4).unwrap())
        .await
        .unwrap()
        .into_results();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].memory_usage_mb, None);
    assert_eq!(results[1].throughput(), None);
}

#[tokio::test]
async fn server_error_maps_to_http_error() {
    let (base, _) = serve(vec![("/api/matrix/virtual-threads", 500, "internal")]).await;
    let api = HttpApi::new(&base).unwrap();

    let err = api
        .run_benchmark(Endpoint::Virtual, &BenchmarkRequest::cpu(100, 1).unwrap())
        .await
        .unwrap_err();
    assert_eq!(err, ClientError::Http { status: 500, body: "internal".into() });
    assert_eq!(err.to_string(), "HTTP error: 500");
}

#[tokio::test]
async fn unparsable_body_is_malformed() {
    let (base, _) = serve(vec![
        ("/api/matrix/limited-threads", 200, "<html>oops</html>"),
        ("/api/matrix/optimized-threads", 200, r#"{"threadModel":"x"}"#),
    ])
    .await;
    let api = HttpApi::new(&base).unwrap();
    let req = BenchmarkRequest::cpu(100, 1).unwrap();

    for endpoint in [Endpoint::Limited, Endpoint::Optimized] {
        let err = api.run_benchmark(endpoint, &req).await.unwrap_err();
        assert!(matches!(err, ClientError::Malformed(_)), "{:?}", err);
    }
}

#[tokio::test]
async fn refused_connection_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = HttpApi::new(&format!("http://{}", addr)).unwrap();
    let err = api.fetch_fragment("infobox.html").await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)), "{:?}", err);
}

#[tokio::test]
async fn fragment_heavy_load_and_thread_info() {
    let info = r#"{"totalStartedThreadCount":9,"currentThreadCount":5,"peakThreadCount":7,"daemonThreadCount":3,
                   "threadDetails":[],"threadGroupStats":{"Other":5}}"#;
    let (base, seen) = serve(vec![
        ("/demo/infobox.html", 200, "<div id=\"infoBox\"></div>"),
        ("/demo/api/system/heavy-load/start", 200, "Heavy load started."),
        ("/demo/api/threads/info", 200, info),
    ])
    .await;
    let api = HttpApi::new(&format!("{}/demo", base)).unwrap();

    assert_eq!(api.fetch_fragment("infobox.html").await.unwrap(), "<div id=\"infoBox\"></div>");
    assert_eq!(api.set_heavy_load(true).await.unwrap(), "Heavy load started.");
    assert_eq!(api.thread_info().await.unwrap().thread_group_stats["Other"], 5);

    let err = api.set_heavy_load(false).await.unwrap_err();
    assert!(matches!(err, ClientError::Http { status: 404, .. }));

    let methods: Vec<_> = seen.lock().unwrap().iter().map(|s| (s.method.clone(), s.path.clone())).collect();
    assert_eq!(methods[0], ("GET".to_string(), "/demo/infobox.html".to_string()));
    assert_eq!(methods[1], ("POST".to_string(), "/demo/api/system/heavy-load/start".to_string()));
}
