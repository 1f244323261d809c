//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed table of routes (path -> status, content type, body) and
//! records the body of every POST so webhook deliveries can be asserted.
//! Unknown paths get 404.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Route {
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.into().into_bytes(),
        }
    }

    pub fn pdf(body: &[u8]) -> Self {
        Self {
            status: 200,
            content_type: "application/pdf",
            body: body.to_vec(),
        }
    }

    pub fn json_ok() -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body: b"{}".to_vec(),
        }
    }
}

/// Handle to a running server. Runs until the process exits.
#[derive(Clone)]
pub struct SiteServer {
    base: String,
    routes: Arc<Mutex<HashMap<String, Route>>>,
    posts: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl SiteServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let server = Self {
            base: format!("http://127.0.0.1:{}", port),
            routes: Arc::new(Mutex::new(HashMap::new())),
            posts: Arc::new(Mutex::new(Vec::new())),
        };
        let routes = Arc::clone(&server.routes);
        let posts = Arc::clone(&server.posts);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let posts = Arc::clone(&posts);
                thread::spawn(move || handle(stream, &routes, &posts));
            }
        });
        server
    }

    /// Absolute URL for `path` (must start with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn route(&self, path: &str, route: Route) {
        self.routes.lock().unwrap().insert(path.to_string(), route);
    }

    /// Bodies of POST requests received so far, with their paths.
    pub fn posts(&self) -> Vec<(String, Vec<u8>)> {
        self.posts.lock().unwrap().clone()
    }
}

fn handle(
    mut stream: TcpStream,
    routes: &Mutex<HashMap<String, Route>>,
    posts: &Mutex<Vec<(String, Vec<u8>)>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));

    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    let header_end = loop {
        if let Some(pos) = find_header_end(&data) {
            break pos;
        }
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let (method, path, content_length) = parse_head(&head);
    let mut body = data[header_end + 4..].to_vec();
    while body.len() < content_length {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => body.extend_from_slice(&buf[..n]),
        }
    }

    if method.eq_ignore_ascii_case("POST") {
        posts.lock().unwrap().push((path.clone(), body));
    }

    let route = routes.lock().unwrap().get(&path).cloned();
    let route = route.unwrap_or(Route {
        status: 404,
        content_type: "text/html",
        body: b"<html><body>not found</body></html>".to_vec(),
    });
    let reason = if route.status == 200 { "OK" } else { "Not Found" };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        route.status,
        reason,
        route.content_type,
        route.body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    if !method.eq_ignore_ascii_case("HEAD") {
        let _ = stream.write_all(&route.body);
    }
}

fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Returns (method, path without query, Content-Length).
fn parse_head(head: &str) -> (String, String, usize) {
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or("");
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let target = parts.next().unwrap_or("/");
    let path = target.split('?').next().unwrap_or("/").to_string();
    let content_length = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse().ok())
        .unwrap_or(0);
    (method, path, content_length)
}
