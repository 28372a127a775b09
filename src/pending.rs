use std::io;
use std::sync::{Condvar, Mutex};

use crate::types::Completion;

/// State of the single pending autocomplete request.
#[derive(PartialEq, Debug)]
enum Slot {
    /// No exchange in flight.
    Idle,
    /// A caller has sent a request and is (about to be) blocked in `wait`.
    Waiting,
    /// The receive thread deposited the result; the waiter has not yet
    /// consumed it.
    Resolved(Completion),
    /// The transport died. Every current and future wait resolves to the
    /// benign "no completion" outcome instead of hanging.
    Dead,
}

/// The autocomplete gate: gives one inherently asynchronous exchange
/// synchronous call semantics.
///
/// Exactly one caller thread may hold an exchange open at a time; `begin`
/// rejects a second concurrent request instead of reproducing the original
/// design's unspecified interleaving. The receive thread only ever calls
/// `resolve`/`fail` and never blocks here, otherwise nothing could deliver
/// the resolution.
pub struct Gate {
    slot: Mutex<Slot>,
    cv: Condvar,
}

impl Gate {
    pub fn new() -> Gate {
        Gate { slot: Mutex::new(Slot::Idle), cv: Condvar::new() }
    }

    /// Claim the slot before sending the request. Fails with `WouldBlock`
    /// when another exchange is already in flight.
    pub fn begin(&self) -> io::Result<()> {
        let mut slot = self.slot.lock().map_err(|_| poisoned())?;
        match *slot {
            Slot::Idle => {
                *slot = Slot::Waiting;
                Ok(())
            }
            Slot::Dead => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "connection is closed",
            )),
            _ => Err(io::Error::new(
                io::ErrorKind::WouldBlock,
                "an autocomplete request is already outstanding",
            )),
        }
    }

    /// Release a claimed slot without waiting (the send failed).
    pub fn cancel(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            if *slot == Slot::Waiting {
                *slot = Slot::Idle;
            }
        }
    }

    /// Block until the receive thread resolves the exchange. Consumes the
    /// result and clears the slot so a later exchange can never observe a
    /// stale resolution. A dead transport or a poisoned lock resolves to
    /// `Handled` with no text, the "no completion available" outcome.
    pub fn wait(&self) -> Completion {
        let mut slot = match self.slot.lock() {
            Ok(s) => s,
            Err(_) => return Completion::Handled,
        };
        loop {
            match *slot {
                Slot::Resolved(_) => {
                    let done = std::mem::replace(&mut *slot, Slot::Idle);
                    match done {
                        Slot::Resolved(c) => return c,
                        _ => unreachable!(),
                    }
                }
                Slot::Dead => return Completion::Handled,
                _ => {
                    slot = match self.cv.wait(slot) {
                        Ok(s) => s,
                        Err(_) => return Completion::Handled,
                    };
                }
            }
        }
    }

    /// Deposit the result and wake the waiter. A resolution arriving with no
    /// waiter is dropped: there is no one it could belong to, and storing it
    /// would hand a stale result to the next exchange.
    pub fn resolve(&self, c: Completion) {
        if let Ok(mut slot) = self.slot.lock() {
            if *slot == Slot::Waiting {
                *slot = Slot::Resolved(c);
                self.cv.notify_one();
            }
        }
    }

    /// The transport died: wake any waiter and refuse future exchanges.
    pub fn fail(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Slot::Dead;
            self.cv.notify_all();
        }
    }
}

fn poisoned() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "gate lock poisoned")
}
