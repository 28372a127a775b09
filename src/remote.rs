use std::io;
use std::sync::mpsc;
use std::sync::Arc;

use crate::codec::{self, Incoming};
use crate::pending::Gate;
use crate::transport::Connection;
use crate::types::{Backend, Completion, LogLv, Output};

/// The remote interpreter backend: one TCP connection to the daemon, a
/// dispatcher classifying incoming messages, and the autocomplete gate.
///
/// `PRINT`/`LOG` events are forwarded in receipt order to the output channel
/// handed to `connect`; they may arrive at any time, including interleaved
/// with an in-flight autocomplete exchange, and never touch the gate.
pub struct RemoteInterp {
    conn: Connection,
    gate: Arc<Gate>,
}

impl RemoteInterp {
    /// Connect to the daemon and start dispatching. Incoming output lands on
    /// `out`; a final `Output::Closed` marks the death of the connection.
    pub fn connect(host: &str, port: u16, out: mpsc::Sender<Output>) -> io::Result<RemoteInterp> {
        let gate = Arc::new(Gate::new());

        let listener = {
            let gate = Arc::clone(&gate);
            let out = out.clone();
            move |msg: &str| match codec::decode(msg) {
                Incoming::Print(text) => {
                    let _ = out.send(Output::Print(text));
                }
                Incoming::Log(text) => {
                    let _ = out.send(Output::Log(text));
                }
                // The reply's own text was already streamed as PRINT events;
                // only the outcome matters to the waiter.
                Incoming::AcPrint(_) => gate.resolve(Completion::Handled),
                Incoming::AcMore(text) => gate.resolve(Completion::MorePrefix(text)),
                Incoming::AcComp(text) => gate.resolve(Completion::Complete(text)),
                Incoming::Unknown => {}
            }
        };
        let on_close = {
            let gate = Arc::clone(&gate);
            move |reason: String| {
                gate.fail();
                let _ = out.send(Output::Closed(reason));
            }
        };

        let conn = Connection::connect(host, port, listener, on_close)?;
        Ok(RemoteInterp { conn, gate })
    }

    fn send(&self, tag: &str, data: &str) -> io::Result<()> {
        self.conn.send(codec::encode(tag, data).as_bytes())
    }

    pub fn close(self) {
        self.conn.close();
    }
}

impl Backend for RemoteInterp {
    fn interpret(&self, src: &str) -> io::Result<()> {
        self.send(codec::CMD_INTERP, src)
    }

    fn force_stop(&self) -> io::Result<()> {
        self.send(codec::CMD_FORCESTOP, "")
    }

    fn set_log_level(&self, lv: LogLv) -> io::Result<()> {
        self.send(codec::CMD_CHGLOGLV, &(lv as u8).to_string())
    }

    fn auto_complete(&self, prefix: &str) -> io::Result<Completion> {
        // Claim the slot before the request hits the wire, so the reply can
        // never race past an unclaimed gate.
        self.gate.begin()?;
        if let Err(e) = self.send(codec::CMD_AUTOCOMP, prefix) {
            self.gate.cancel();
            return Err(e);
        }
        Ok(self.gate.wait())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::time::Duration;

    /// A listener standing in for the daemon; tests accept the client and
    /// speak raw frames on the resulting stream.
    fn fake_daemon() -> (TcpListener, u16) {
        let l = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let port = l.local_addr().unwrap().port();
        (l, port)
    }

    fn send_msg(peer: &mut TcpStream, msg: &str) {
        let payload = msg.as_bytes();
        peer.write_all(&(payload.len() as u32).to_be_bytes()).unwrap();
        peer.write_all(payload).unwrap();
    }

    fn recv_msg(peer: &mut TcpStream) -> String {
        let mut hdr = [0u8; 4];
        peer.read_exact(&mut hdr).unwrap();
        let mut payload = vec![0u8; u32::from_be_bytes(hdr) as usize];
        peer.read_exact(&mut payload).unwrap();
        String::from_utf8(payload).unwrap()
    }

    #[test]
    fn test_interpret_is_fire_and_forget() {
        let (l, port) = fake_daemon();
        let (tx, _rx) = mpsc::channel();
        let remote = RemoteInterp::connect("127.0.0.1", port, tx).unwrap();
        let (mut peer, _) = l.accept().unwrap();

        remote.interpret("(car '(a b))").unwrap();
        assert_eq!(recv_msg(&mut peer), "INTERP:(car '(a b))");

        remote.force_stop().unwrap();
        assert_eq!(recv_msg(&mut peer), "FORCESTOP:");

        remote.set_log_level(LogLv::Verbose).unwrap();
        assert_eq!(recv_msg(&mut peer), "CHGLOGLV:0");
        remote.close();
    }

    #[test]
    fn test_print_and_log_reach_the_sink() {
        let (l, port) = fake_daemon();
        let (tx, rx) = mpsc::channel();
        let remote = RemoteInterp::connect("127.0.0.1", port, tx).unwrap();
        let (mut peer, _) = l.accept().unwrap();

        send_msg(&mut peer, "PRINT:result is 42");
        send_msg(&mut peer, "LOG:gc pass done");
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            Output::Print("result is 42".into())
        );
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            Output::Log("gc pass done".into())
        );
        remote.close();
    }

    #[test]
    fn test_autocomplete_correlation() {
        let (l, port) = fake_daemon();
        let (tx, rx) = mpsc::channel();
        let remote = Arc::new(RemoteInterp::connect("127.0.0.1", port, tx).unwrap());
        let (mut peer, _) = l.accept().unwrap();

        let waiter = {
            let remote = Arc::clone(&remote);
            std::thread::spawn(move || remote.auto_complete("fo").unwrap())
        };
        assert_eq!(recv_msg(&mut peer), "AUTOCOMP:fo");

        // An unrelated PRINT delivered first must not resolve the request.
        send_msg(&mut peer, "PRINT:hello");
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            Output::Print("hello".into())
        );
        send_msg(&mut peer, "AUTOCOMP_MORE:o");
        assert_eq!(waiter.join().unwrap(), Completion::MorePrefix("o".into()));
    }

    #[test]
    fn test_autocomplete_complete_and_print_outcomes() {
        let (l, port) = fake_daemon();
        let (tx, _rx) = mpsc::channel();
        let remote = Arc::new(RemoteInterp::connect("127.0.0.1", port, tx).unwrap());
        let (mut peer, _) = l.accept().unwrap();

        let waiter = {
            let remote = Arc::clone(&remote);
            std::thread::spawn(move || remote.auto_complete("def").unwrap())
        };
        assert_eq!(recv_msg(&mut peer), "AUTOCOMP:def");
        send_msg(&mut peer, "AUTOCOMP_COMP:un");
        assert_eq!(waiter.join().unwrap(), Completion::Complete("un".into()));

        let waiter = {
            let remote = Arc::clone(&remote);
            std::thread::spawn(move || remote.auto_complete("x").unwrap())
        };
        assert_eq!(recv_msg(&mut peer), "AUTOCOMP:x");
        send_msg(&mut peer, "AUTOCOMP_PRINT:");
        assert_eq!(waiter.join().unwrap(), Completion::Handled);
    }

    #[test]
    fn test_daemon_death_unblocks_autocomplete() {
        let (l, port) = fake_daemon();
        let (tx, rx) = mpsc::channel();
        let remote = Arc::new(RemoteInterp::connect("127.0.0.1", port, tx).unwrap());
        let (mut peer, _) = l.accept().unwrap();

        let waiter = {
            let remote = Arc::clone(&remote);
            std::thread::spawn(move || remote.auto_complete("fo").unwrap())
        };
        assert_eq!(recv_msg(&mut peer), "AUTOCOMP:fo");
        drop(peer);

        // The waiter resolves benignly and the sink reports the closure.
        assert_eq!(waiter.join().unwrap(), Completion::Handled);
        let closed = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(closed, Output::Closed(_)));
    }
}
