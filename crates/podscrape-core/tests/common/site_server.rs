//! Minimal HTTP/1.1 server standing in for the podcast site in integration tests.
//!
//! Serves fixed responses keyed by request target (path plus query). Unknown
//! targets get 404. Every response closes the connection.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Route {
    Html(String),
    Audio(Vec<u8>),
    /// Announces `announced` bytes but sends only `body`, then hangs up.
    Truncated { body: Vec<u8>, announced: usize },
    Status(u16),
}

pub struct SiteServer {
    base: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl SiteServer {
    /// Binds a free port and serves the routes built by `routes`, which gets
    /// the base URL (e.g. "http://127.0.0.1:12345") so fixtures can link back.
    pub fn start<F>(routes: F) -> Self
    where
        F: FnOnce(&str) -> Vec<(String, Route)>,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let base = format!("http://127.0.0.1:{}", port);
        let routes: Arc<HashMap<String, Route>> = Arc::new(routes(&base).into_iter().collect());
        let hits = Arc::new(Mutex::new(HashMap::new()));
        let server_hits = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let hits = Arc::clone(&server_hits);
                thread::spawn(move || handle(stream, &routes, &hits));
            }
        });
        Self { base, hits }
    }

    pub fn url(&self, target: &str) -> String {
        format!("{}{}", self.base, target)
    }

    pub fn hits(&self, target: &str) -> usize {
        self.hits.lock().unwrap().get(target).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }
}

fn handle(mut stream: TcpStream, routes: &HashMap<String, Route>, hits: &Mutex<HashMap<String, usize>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let Ok(request) = std::str::from_utf8(&buf[..n]) else {
        return;
    };
    let target = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    *hits.lock().unwrap().entry(target.clone()).or_default() += 1;

    match routes.get(&target) {
        Some(Route::Html(html)) => respond(&mut stream, "200 OK", "text/html; charset=utf-8", html.as_bytes(), None),
        Some(Route::Audio(body)) => respond(&mut stream, "200 OK", "audio/mpeg", body, None),
        Some(Route::Truncated { body, announced }) => {
            respond(&mut stream, "200 OK", "audio/mpeg", body, Some(*announced))
        }
        Some(Route::Status(code)) => {
            let status = format!("{} Error", code);
            respond(&mut stream, &status, "text/plain", b"", None)
        }
        None => respond(&mut stream, "404 Not Found", "text/plain", b"", None),
    }
}

fn respond(stream: &mut TcpStream, status: &str, content_type: &str, body: &[u8], announced: Option<usize>) {
    let header = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        announced.unwrap_or(body.len())
    );
    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}
