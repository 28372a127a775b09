use std::io;

use crate::edit::{splice, token_prefix, BufferSwap};
use crate::history::History;
use crate::types::{Backend, Completion, LogLv};

/// What an autocomplete attempt did to the edit state.
#[derive(PartialEq, Debug)]
pub enum AcEdit {
    /// Nothing changed (candidates were printed, or no match).
    Unchanged,
    /// The completion was spliced in at the caret.
    Edited { text: String, caret: usize },
}

/// One front-end session: the interpreter backend plus the client-side state
/// the front-end relies on between round trips. Everything the original kept
/// as ambient window fields lives here explicitly.
pub struct Session {
    backend: Box<dyn Backend>,
    pub history: History,
    pub swap: BufferSwap,
    loglv: LogLv,
}

impl Session {
    pub fn new(backend: Box<dyn Backend>, history: History) -> Session {
        Session {
            backend,
            history,
            swap: BufferSwap::new(),
            // Matches the daemon's default.
            loglv: LogLv::Warn,
        }
    }

    pub fn log_level(&self) -> LogLv {
        self.loglv
    }

    /// Set the level outright (config/startup path; the interactive path
    /// steps one notch at a time).
    pub fn set_log_level(&mut self, lv: LogLv) -> io::Result<()> {
        self.backend.set_log_level(lv)?;
        self.loglv = lv;
        Ok(())
    }

    /// Submit source for evaluation and record it in the history (which also
    /// resets the navigation cursor).
    pub fn interpret(&mut self, src: &str) -> io::Result<()> {
        self.backend.interpret(src)?;
        self.history.record(src.to_string());
        Ok(())
    }

    pub fn force_stop(&self) -> io::Result<()> {
        self.backend.force_stop()
    }

    /// Step the log level one notch toward Verbose. Returns the new level,
    /// or None when already clamped at the end.
    pub fn raise_verbosity(&mut self) -> io::Result<Option<LogLv>> {
        match self.loglv.more_verbose() {
            Some(lv) => {
                self.backend.set_log_level(lv)?;
                self.loglv = lv;
                Ok(Some(lv))
            }
            None => Ok(None),
        }
    }

    /// Step the log level one notch toward Error.
    pub fn lower_verbosity(&mut self) -> io::Result<Option<LogLv>> {
        match self.loglv.less_verbose() {
            Some(lv) => {
                self.backend.set_log_level(lv)?;
                self.loglv = lv;
                Ok(Some(lv))
            }
            None => Ok(None),
        }
    }

    /// Run one autocomplete exchange for the token ending at `caret` and
    /// apply the returned edit: `more-prefix` splices the text, `complete`
    /// splices the text plus one trailing space, `handled` leaves the buffer
    /// alone.
    pub fn auto_complete(&mut self, text: &str, caret: usize) -> io::Result<AcEdit> {
        let prefix = token_prefix(text, caret);
        match self.backend.auto_complete(prefix)? {
            Completion::Handled => Ok(AcEdit::Unchanged),
            Completion::MorePrefix(more) => {
                let mut text = text.to_string();
                let mut caret = caret;
                splice(&mut text, &mut caret, &more);
                Ok(AcEdit::Edited { text, caret })
            }
            Completion::Complete(rest) => {
                let mut text = text.to_string();
                let mut caret = caret;
                let add = format!("{} ", rest);
                splice(&mut text, &mut caret, &add);
                Ok(AcEdit::Edited { text, caret })
            }
        }
    }
}
