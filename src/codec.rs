/// Command message codec.
///
/// Wire messages are plain UTF-8 text of the form `TAG:data`, split at the
/// first colon. Tags never contain the delimiter; data may (everything after
/// the first colon belongs to the data, including further colons and
/// newlines). Incoming messages are decoded into a closed enum immediately so
/// raw tag strings never leak past this module.

// Requests the client sends.
pub const CMD_INTERP: &str = "INTERP";
pub const CMD_AUTOCOMP: &str = "AUTOCOMP";
pub const CMD_CHGLOGLV: &str = "CHGLOGLV";
pub const CMD_FORCESTOP: &str = "FORCESTOP";

// Events and responses the daemon sends.
pub const CMD_PRINT: &str = "PRINT";
pub const CMD_LOG: &str = "LOG";
pub const CMD_AUTOCOMP_PRINT: &str = "AUTOCOMP_PRINT";
pub const CMD_AUTOCOMP_MORE: &str = "AUTOCOMP_MORE";
pub const CMD_AUTOCOMP_COMP: &str = "AUTOCOMP_COMP";

const DELIMITER: char = ':';

/// A decoded incoming message.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Incoming {
    /// Interpreter output, forwarded verbatim to the output sink.
    Print(String),
    /// Interpreter log line, forwarded verbatim to the output sink.
    Log(String),
    /// Autocomplete reply: candidates were printed, nothing to splice.
    AcPrint(String),
    /// Autocomplete reply: a longer common prefix.
    AcMore(String),
    /// Autocomplete reply: the unique completion.
    AcComp(String),
    /// Unrecognized tag or missing delimiter. Dropped by the dispatcher so
    /// unknown commands from a newer daemon never crash the receive loop.
    Unknown,
}

/// Encode a request as `tag:data`. No escaping: data is free text and the
/// daemon splits at the first delimiter exactly as `decode` does.
pub fn encode(tag: &str, data: &str) -> String {
    debug_assert!(!tag.contains(DELIMITER));
    let mut s = String::with_capacity(tag.len() + 1 + data.len());
    s.push_str(tag);
    s.push(DELIMITER);
    s.push_str(data);
    s
}

/// Decode one received message. A message without a delimiter is malformed
/// (a protocol bug on the daemon side) and degrades to `Unknown`.
pub fn decode(text: &str) -> Incoming {
    let (tag, data) = match text.split_once(DELIMITER) {
        Some(parts) => parts,
        None => return Incoming::Unknown,
    };
    match tag {
        CMD_PRINT => Incoming::Print(data.to_string()),
        CMD_LOG => Incoming::Log(data.to_string()),
        CMD_AUTOCOMP_PRINT => Incoming::AcPrint(data.to_string()),
        CMD_AUTOCOMP_MORE => Incoming::AcMore(data.to_string()),
        CMD_AUTOCOMP_COMP => Incoming::AcComp(data.to_string()),
        _ => Incoming::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode(CMD_INTERP, "(car '(a b))"), "INTERP:(car '(a b))");
        assert_eq!(encode(CMD_AUTOCOMP, ""), "AUTOCOMP:");
    }

    #[test]
    fn test_decode_known_tags() {
        assert_eq!(decode("PRINT:hello"), Incoming::Print("hello".into()));
        assert_eq!(decode("LOG:warn: oops"), Incoming::Log("warn: oops".into()));
        assert_eq!(decode("AUTOCOMP_MORE:fix"), Incoming::AcMore("fix".into()));
        assert_eq!(decode("AUTOCOMP_COMP:defun"), Incoming::AcComp("defun".into()));
        assert_eq!(decode("AUTOCOMP_PRINT:"), Incoming::AcPrint(String::new()));
    }

    #[test]
    fn test_decode_splits_at_first_delimiter_only() {
        // Data may itself contain colons and newlines.
        assert_eq!(
            decode("PRINT:a:b:c\nd"),
            Incoming::Print("a:b:c\nd".into())
        );
    }

    #[test]
    fn test_decode_unknown_and_malformed() {
        assert_eq!(decode("WHATEVER:x"), Incoming::Unknown);
        assert_eq!(decode("no delimiter here"), Incoming::Unknown);
        assert_eq!(decode(""), Incoming::Unknown);
    }

    #[test]
    fn test_round_trip() {
        for data in ["", "x", "multi\nline (text) with : colon"] {
            match decode(&encode(CMD_PRINT, data)) {
                Incoming::Print(d) => assert_eq!(d, data),
                other => panic!("unexpected decode: {:?}", other),
            }
        }
    }
}
