use std::io;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default daemon port. The daemon listens on localhost only.
pub const DEFAULT_PORT: u16 = 9923;

/// Log levels of the interpreter daemon. The numeric values are part of the
/// wire contract (`CHGLOGLV:<digit>`) and must not be reordered.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum LogLv {
    Verbose = 0,
    Develop = 1,
    Information = 2,
    Warn = 3,
    Error = 4,
}

impl LogLv {
    pub fn name(self) -> &'static str {
        match self {
            LogLv::Verbose => "Verbose",
            LogLv::Develop => "Develop",
            LogLv::Information => "Information",
            LogLv::Warn => "Warn",
            LogLv::Error => "Error",
        }
    }

    pub fn from_u8(v: u8) -> Option<LogLv> {
        match v {
            0 => Some(LogLv::Verbose),
            1 => Some(LogLv::Develop),
            2 => Some(LogLv::Information),
            3 => Some(LogLv::Warn),
            4 => Some(LogLv::Error),
            _ => None,
        }
    }

    /// Parse the single-letter spelling used on the command line and in the
    /// config file: v/d/i/w/e.
    pub fn from_letter(s: &str) -> Option<LogLv> {
        match s {
            "v" => Some(LogLv::Verbose),
            "d" => Some(LogLv::Develop),
            "i" => Some(LogLv::Information),
            "w" => Some(LogLv::Warn),
            "e" => Some(LogLv::Error),
            _ => None,
        }
    }

    /// One step toward Verbose, clamped. Returns None when already there.
    pub fn more_verbose(self) -> Option<LogLv> {
        LogLv::from_u8((self as u8).checked_sub(1)?)
    }

    /// One step toward Error, clamped. Returns None when already there.
    pub fn less_verbose(self) -> Option<LogLv> {
        LogLv::from_u8(self as u8 + 1)
    }
}

/// Outcome of one autocomplete exchange.
///
/// `Handled` means the daemon dealt with the prefix itself (candidate list
/// already printed to the output stream, or nothing matched) and there is no
/// text to splice into the edit buffer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Completion {
    Handled,
    /// A longer common prefix exists; splice the text at the caret.
    MorePrefix(String),
    /// Exactly one candidate; splice the text plus a trailing space.
    Complete(String),
}

/// Events delivered asynchronously from the receive thread to whoever owns
/// the output side of the session (the console driver, a test, ...).
#[derive(Clone, PartialEq, Debug)]
pub enum Output {
    Print(String),
    Log(String),
    /// The connection is permanently dead. Reported exactly once; no
    /// reconnection is attempted.
    Closed(String),
}

/// The uniform local-or-remote interpreter seam. The remote implementation
/// lives in `remote.rs`; an in-process interpreter can stand behind the same
/// trait without the session layer noticing.
pub trait Backend: Send {
    /// Submit source text for evaluation. Fire-and-forget: resulting output
    /// arrives later on the output sink.
    fn interpret(&self, src: &str) -> io::Result<()>;

    /// Ask the interpreter to abort whatever it is currently evaluating.
    fn force_stop(&self) -> io::Result<()>;

    fn set_log_level(&self, lv: LogLv) -> io::Result<()>;

    /// Blocking autocomplete exchange for a token prefix. At most one may be
    /// outstanding; a concurrent second call fails with `WouldBlock`.
    fn auto_complete(&self, prefix: &str) -> io::Result<Completion>;
}
