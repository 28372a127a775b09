/// Edit-buffer helpers that feed the autocomplete exchange: token-prefix
/// extraction at a caret, splicing a returned completion back in, and the
/// single-cell alternate-buffer swap.

/// Token boundaries for completion-prefix extraction.
const DELIMITERS: [char; 7] = [' ', '\n', '\'', '"', '(', ')', '\t'];

/// Scan backward from the caret (a byte offset) to the nearest delimiter and
/// return the current token prefix. With no delimiter before the caret the
/// prefix is the entire text up to the caret.
pub fn token_prefix(text: &str, caret: usize) -> &str {
    let pre = &text[..caret];
    // All delimiters are single-byte, so the token starts one byte past the
    // match.
    match pre.rfind(&DELIMITERS[..]) {
        Some(i) => &pre[i + 1..],
        None => pre,
    }
}

/// Insert `add` at the caret and advance the caret past it.
pub fn splice(text: &mut String, caret: &mut usize, add: &str) {
    text.insert_str(*caret, add);
    *caret += add.len();
}

/// A single alternate-text holding cell, exchanged with the active edit
/// buffer on demand. No history, no stack.
pub struct BufferSwap {
    alt: String,
}

impl BufferSwap {
    pub fn new() -> BufferSwap {
        BufferSwap { alt: String::new() }
    }

    /// Store `current` and hand back whatever was stored before.
    pub fn swap(&mut self, current: String) -> String {
        std::mem::replace(&mut self.alt, current)
    }
}
