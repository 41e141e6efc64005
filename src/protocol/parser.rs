//! Request Line Parser
//!
//! Requests arrive as single text lines: `CMD [ARG ...]`, split on runs of
//! ASCII whitespace. The command token is uppercased and looked up in a
//! fixed table; everything after it becomes the argument list.
//!
//! This is deliberately not a full RESP request parser — values therefore
//! cannot contain whitespace. The response side (see
//! [`crate::protocol::response`]) emits proper RESP framing, so standard
//! clients can read replies.
//!
//! Arguments are kept as raw [`Bytes`]: keys and values are opaque byte
//! sequences and nothing here requires them to be valid UTF-8.

use bytes::Bytes;

/// The fixed command surface, one identifier per wire command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    Quit,
    Set,
    Get,
    Del,
    Exists,
    Expire,
    Ttl,
    Keys,
    DbSize,
    LPush,
    RPush,
    LPop,
    RPop,
    LRange,
    LLen,
    SAdd,
    SRem,
    SIsMember,
    SMembers,
    SCard,
}

impl Command {
    /// Looks up an already-uppercased command token.
    pub fn lookup(token: &str) -> Option<Command> {
        match token {
            "PING" => Some(Command::Ping),
            "QUIT" => Some(Command::Quit),
            "SET" => Some(Command::Set),
            "GET" => Some(Command::Get),
            "DEL" => Some(Command::Del),
            "EXISTS" => Some(Command::Exists),
            "EXPIRE" => Some(Command::Expire),
            "TTL" => Some(Command::Ttl),
            "KEYS" => Some(Command::Keys),
            "DBSIZE" => Some(Command::DbSize),
            "LPUSH" => Some(Command::LPush),
            "RPUSH" => Some(Command::RPush),
            "LPOP" => Some(Command::LPop),
            "RPOP" => Some(Command::RPop),
            "LRANGE" => Some(Command::LRange),
            "LLEN" => Some(Command::LLen),
            "SADD" => Some(Command::SAdd),
            "SREM" => Some(Command::SRem),
            "SISMEMBER" => Some(Command::SIsMember),
            "SMEMBERS" => Some(Command::SMembers),
            "SCARD" => Some(Command::SCard),
            _ => None,
        }
    }

    /// Exact number of arguments this command takes after the command
    /// token.
    pub fn arity(self) -> usize {
        match self {
            Command::Ping | Command::Quit | Command::Keys | Command::DbSize => 0,
            Command::Get
            | Command::Del
            | Command::Exists
            | Command::Ttl
            | Command::LPop
            | Command::RPop
            | Command::LLen
            | Command::SMembers
            | Command::SCard => 1,
            Command::Set
            | Command::Expire
            | Command::LPush
            | Command::RPush
            | Command::SAdd
            | Command::SRem
            | Command::SIsMember => 2,
            Command::LRange => 3,
        }
    }
}

/// A parsed request line.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// The recognized command, or `None` for an unknown token.
    pub command: Option<Command>,
    /// The uppercased command token, kept for error messages.
    pub name: String,
    /// Arguments in order of appearance.
    pub args: Vec<Bytes>,
}

/// Parses one request line (already stripped of its terminator).
///
/// Returns `None` for a line with no tokens; the connection loop skips
/// those without responding.
pub fn parse_request(line: &[u8]) -> Option<Request> {
    let mut tokens = line
        .split(|byte| byte.is_ascii_whitespace())
        .filter(|token| !token.is_empty());

    let first = tokens.next()?;
    let name = String::from_utf8_lossy(&first.to_ascii_uppercase()).into_owned();
    let command = Command::lookup(&name);
    let args = tokens.map(Bytes::copy_from_slice).collect();

    Some(Request { command, name, args })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(s: &str) -> Bytes {
        Bytes::copy_from_slice(s.as_bytes())
    }

    #[test]
    fn test_parse_simple_command() {
        let request = parse_request(b"SET foo bar").unwrap();
        assert_eq!(request.command, Some(Command::Set));
        assert_eq!(request.name, "SET");
        assert_eq!(request.args, vec![b("foo"), b("bar")]);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let request = parse_request(b"get foo").unwrap();
        assert_eq!(request.command, Some(Command::Get));

        let request = parse_request(b"LpUsH queue item").unwrap();
        assert_eq!(request.command, Some(Command::LPush));
    }

    #[test]
    fn test_parse_collapses_whitespace_runs() {
        let request = parse_request(b"  SET \t foo \t\t bar  ").unwrap();
        assert_eq!(request.command, Some(Command::Set));
        assert_eq!(request.args, vec![b("foo"), b("bar")]);
    }

    #[test]
    fn test_parse_no_args() {
        let request = parse_request(b"PING").unwrap();
        assert_eq!(request.command, Some(Command::Ping));
        assert!(request.args.is_empty());
    }

    #[test]
    fn test_parse_blank_line() {
        assert_eq!(parse_request(b""), None);
        assert_eq!(parse_request(b"   \t "), None);
    }

    #[test]
    fn test_parse_unknown_command() {
        let request = parse_request(b"frobnicate a b").unwrap();
        assert_eq!(request.command, None);
        assert_eq!(request.name, "FROBNICATE");
        assert_eq!(request.args.len(), 2);
    }

    #[test]
    fn test_args_preserve_case_and_bytes() {
        let request = parse_request(b"SET Key\xc3\xa9 VaLuE").unwrap();
        assert_eq!(request.args[0], Bytes::from_static(b"Key\xc3\xa9"));
        assert_eq!(request.args[1], b("VaLuE"));
    }

    #[test]
    fn test_arity_table() {
        assert_eq!(Command::Ping.arity(), 0);
        assert_eq!(Command::Quit.arity(), 0);
        assert_eq!(Command::Keys.arity(), 0);
        assert_eq!(Command::DbSize.arity(), 0);
        assert_eq!(Command::Get.arity(), 1);
        assert_eq!(Command::Set.arity(), 2);
        assert_eq!(Command::Expire.arity(), 2);
        assert_eq!(Command::LRange.arity(), 3);
        assert_eq!(Command::SIsMember.arity(), 2);
    }
}
