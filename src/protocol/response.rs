//! RESP Response Framing
//!
//! Responses go out in RESP wire format with the usual type sigils:
//!
//! - `+OK\r\n` — success with no data
//! - `$<len>\r\n<bytes>\r\n` — one bulk string (lengths are byte lengths)
//! - `*<n>\r\n` followed by `n` bulk strings — an array
//! - `$-1\r\n` — null bulk, meaning "no value"
//! - `-WRONGTYPE ...\r\n` / `-ERR ...\r\n` — errors

use bytes::Bytes;

/// The CRLF terminator used in RESP framing.
const CRLF: &[u8] = b"\r\n";

const WRONGTYPE_MSG: &[u8] =
    b"-WRONGTYPE Operation against a key holding the wrong kind of value\r\n";

const INVALID_ARGS_MSG: &[u8] = b"-ERR wrong number of arguments\r\n";

/// A command outcome, one variant per wire framing.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Success with no data: `+OK`.
    Ok,
    /// Success with one string, framed as a bulk string.
    Value(Bytes),
    /// Success with an array of strings.
    Values(Vec<Bytes>),
    /// No value: null bulk string.
    NotFound,
    /// Operation against a key holding the wrong kind of value.
    WrongType,
    /// Arity mismatch.
    InvalidArgs,
    /// Any other error; framed as `-ERR <message>`.
    Error(String),
}

impl Response {
    /// Success with one string.
    pub fn value(data: impl Into<Bytes>) -> Self {
        Response::Value(data.into())
    }

    /// Success with an integer, framed as its decimal string.
    pub fn integer(n: i64) -> Self {
        Response::Value(Bytes::from(n.to_string()))
    }

    /// Success with a 0/1 flag.
    pub fn flag(set: bool) -> Self {
        Response::Value(Bytes::from_static(if set { b"1" } else { b"0" }))
    }

    /// Serializes this response to a fresh buffer.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf
    }

    /// Serializes this response into an existing buffer.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        match self {
            Response::Ok => buf.extend_from_slice(b"+OK\r\n"),
            Response::Value(data) => write_bulk(buf, data),
            Response::Values(items) => {
                buf.push(b'*');
                buf.extend_from_slice(items.len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                for item in items {
                    write_bulk(buf, item);
                }
            }
            Response::NotFound => buf.extend_from_slice(b"$-1\r\n"),
            Response::WrongType => buf.extend_from_slice(WRONGTYPE_MSG),
            Response::InvalidArgs => buf.extend_from_slice(INVALID_ARGS_MSG),
            Response::Error(message) => {
                buf.extend_from_slice(b"-ERR ");
                buf.extend_from_slice(message.as_bytes());
                buf.extend_from_slice(CRLF);
            }
        }
    }

    /// Returns true if this response is an error framing.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Response::WrongType | Response::InvalidArgs | Response::Error(_)
        )
    }
}

fn write_bulk(buf: &mut Vec<u8>, data: &[u8]) {
    buf.push(b'$');
    buf.extend_from_slice(data.len().to_string().as_bytes());
    buf.extend_from_slice(CRLF);
    buf.extend_from_slice(data);
    buf.extend_from_slice(CRLF);
}
