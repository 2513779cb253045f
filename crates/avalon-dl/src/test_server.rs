use std::{
    io::{Read, Write},
    net::TcpListener,
    thread,
};

/// Canned HTTP/1.1 response written by [`serve_once`].
pub struct Reply {
    status: u16,
    body: Vec<u8>,
    content_length: Option<u64>,
}

impl Reply {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        Self {
            status: 200,
            content_length: Some(body.len() as u64),
            body,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            content_length: Some(0),
        }
    }

    /// Body terminated by closing the connection, no `Content-Length`.
    pub fn unsized_body(mut self) -> Self {
        self.content_length = None;
        self
    }

    /// Advertises `length` but sends only the body given to [`Reply::ok`].
    pub fn advertise(mut self, length: u64) -> Self {
        self.content_length = Some(length);
        self
    }
}

/// Serves `reply` to a single connection on an ephemeral port and returns its URL.
pub fn serve_once(reply: Reply) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else {
            return;
        };

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }

        let mut head = format!("HTTP/1.1 {} Test\r\nConnection: close\r\n", reply.status);
        if let Some(length) = reply.content_length {
            head.push_str(&format!("Content-Length: {length}\r\n"));
        }
        head.push_str("\r\n");

        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(&reply.body);
        let _ = stream.flush();
    });

    format!("http://{addr}/asset")
}
