//! Loopback HTTP server serving canned responses to the blocking client in tests.

use std::{
    io::{BufRead, BufReader, Write},
    net::{TcpListener, TcpStream},
    thread,
};

/// One canned response: request path, status code and body.
pub(crate) struct Route {
    pub path: String,
    pub status: u16,
    pub body: Vec<u8>,
}

impl Route {
    pub(crate) fn ok(path: &str, body: impl Into<Vec<u8>>) -> Self {
        Self { path: path.into(), status: 200, body: body.into() }
    }

    pub(crate) fn status(path: &str, status: u16) -> Self {
        Self { path: path.into(), status, body: Vec::new() }
    }
}

/// Serve `routes` on an ephemeral port; unknown paths get 404. Returns the base URL.
pub(crate) fn serve(routes: Vec<Route>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            let _ = respond(stream, &routes);
        }
    });

    base
}

fn respond(mut stream: TcpStream, routes: &[Route]) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    // drain headers
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 || line == "\r\n" {
            break;
        }
    }

    let path = request_line.split_whitespace().nth(1).unwrap_or("/");
    let (status, body) = routes.iter()
        .find(|route| route.path == path)
        .map(|route| (route.status, route.body.as_slice()))
        .unwrap_or((404, b"".as_slice()));

    write!(
        stream,
        "HTTP/1.1 {status} Fixture\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len(),
    )?;
    stream.write_all(body)?;
    stream.flush()
}
