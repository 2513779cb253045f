use std::{
    collections::HashMap,
    io::{Read, Write},
    net::TcpListener,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread,
};

/// Body served for one path, optionally advertising a different length.
#[derive(Clone)]
pub struct Route {
    pub body: Vec<u8>,
    pub advertised: Option<u64>,
}

impl Route {
    pub fn body(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            advertised: None,
        }
    }

    pub fn truncated(body: impl Into<Vec<u8>>, advertised: u64) -> Self {
        Self {
            body: body.into(),
            advertised: Some(advertised),
        }
    }
}

/// Minimal HTTP server answering GETs from a route table; unknown paths get 404.
pub struct Server {
    pub base: String,
    pub hits: Arc<AtomicUsize>,
    routes: Arc<Mutex<HashMap<String, Route>>>,
}

impl Server {
    pub fn start() -> Self {
        let routes: Arc<Mutex<HashMap<String, Route>>> = Arc::default();
        let table = routes.clone();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else {
                    continue;
                };
                counter.fetch_add(1, Ordering::SeqCst);

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&request);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                let route = table.lock().unwrap().get(&path).cloned();
                let (status, route) = match route {
                    Some(route) => (200, route.clone()),
                    None => (404, Route::body("")),
                };
                let length = route.advertised.unwrap_or(route.body.len() as u64);
                let head = format!(
                    "HTTP/1.1 {status} Test\r\nConnection: close\r\nContent-Length: {length}\r\n\r\n"
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(&route.body);
            }
        });

        Self {
            base,
            hits,
            routes,
        }
    }

    pub fn route(&self, path: &str, route: Route) {
        self.routes.lock().unwrap().insert(path.to_string(), route);
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}
