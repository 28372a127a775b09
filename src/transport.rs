use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Mutex;
use std::thread::JoinHandle;

/// A connection to the interpreter daemon carrying length-prefixed frames.
///
/// Frame layout: 4-byte big-endian payload length (header excluded), then
/// exactly that many bytes of UTF-8 text.
///
/// The socket's read side is owned exclusively by one spawned receive thread
/// for the connection's lifetime; the write side is shared by caller threads
/// and serialized by a mutex inside `send` so frames are never interleaved on
/// the wire. There is no reconnection: once the receive thread observes EOF
/// or an I/O error the connection is permanently dead and the close callback
/// fires exactly once.
pub struct Connection {
    writer: Mutex<TcpStream>,
    reader: Option<JoinHandle<()>>,
}

impl Connection {
    /// Connect to `host:port` and start the receive loop.
    ///
    /// `listener` is invoked on the receive thread with each decoded frame
    /// payload, one at a time; the next frame is not read until it returns.
    /// It must never block waiting for something only the receive thread can
    /// deliver. `on_close` is invoked once, with a reason, when the
    /// connection dies (EOF, short read, or I/O error).
    pub fn connect<F, C>(host: &str, port: u16, listener: F, on_close: C) -> io::Result<Connection>
    where
        F: Fn(&str) + Send + 'static,
        C: FnOnce(String) + Send + 'static,
    {
        let addr = (host, port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "host resolves to no address"))?;
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let writer = stream.try_clone()?;

        let reader = std::thread::spawn(move || {
            let reason = recv_loop(stream, &listener);
            on_close(reason);
        });

        Ok(Connection { writer: Mutex::new(writer), reader: Some(reader) })
    }

    /// Write one frame: 4-byte big-endian length, then the payload, as a
    /// single buffered write so concurrent senders cannot interleave.
    pub fn send(&self, payload: &[u8]) -> io::Result<()> {
        let mut buf = Vec::with_capacity(4 + payload.len());
        buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        buf.extend_from_slice(payload);

        let mut w = self
            .writer
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "send lock poisoned"))?;
        w.write_all(&buf)?;
        w.flush()
    }

    /// Shut down the socket and wait for the receive thread to finish.
    /// The close callback still fires (the receive loop sees the shutdown as
    /// EOF).
    pub fn close(mut self) {
        if let Ok(w) = self.writer.lock() {
            let _ = w.shutdown(std::net::Shutdown::Both);
        }
        if let Some(h) = self.reader.take() {
            let _ = h.join();
        }
    }
}

/// The receive loop. Returns the reason the connection died.
fn recv_loop<F: Fn(&str)>(mut stream: TcpStream, listener: &F) -> String {
    loop {
        let mut hdr = [0u8; 4];
        if let Err(e) = stream.read_exact(&mut hdr) {
            return close_reason(&e);
        }
        let n = u32::from_be_bytes(hdr) as usize;
        let mut payload = vec![0u8; n];
        if let Err(e) = stream.read_exact(&mut payload) {
            // A short read mid-frame is a protocol violation; the stream
            // framing is unrecoverable from here.
            return close_reason(&e);
        }
        match String::from_utf8(payload) {
            Ok(text) => listener(&text),
            Err(_) => {
                // Undecodable payload: skip this frame, keep reading.
                eprintln!("replink: dropped frame with invalid utf-8 payload");
            }
        }
    }
}

fn close_reason(e: &io::Error) -> String {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        "connection closed by daemon".to_string()
    } else {
        format!("connection error: {}", e)
    }
}
