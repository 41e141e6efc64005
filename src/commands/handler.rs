//! Command Handler Module
//!
//! Receives parsed requests, validates arity against the fixed table,
//! executes them against the storage engine, and maps each outcome to a
//! wire [`Response`].
//!
//! Command execution never fails the connection: every request, valid or
//! not, produces exactly one response.

use crate::protocol::{Command, Request, Response};
use crate::storage::StorageEngine;
use bytes::Bytes;
use std::sync::Arc;

/// The result of executing one request: what to send back, and whether
/// the connection should close afterwards (QUIT).
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub response: Response,
    pub close: bool,
}

impl Outcome {
    fn reply(response: Response) -> Self {
        Self {
            response,
            close: false,
        }
    }
}

/// Executes commands against the shared storage engine.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    storage: Arc<StorageEngine>,
}

impl CommandHandler {
    /// Creates a new command handler with the given storage engine.
    pub fn new(storage: Arc<StorageEngine>) -> Self {
        Self { storage }
    }

    /// Executes a parsed request and returns the response.
    pub fn execute(&self, request: &Request) -> Outcome {
        let Some(command) = request.command else {
            return Outcome::reply(Response::Error(format!(
                "unknown command '{}'",
                request.name
            )));
        };

        if request.args.len() != command.arity() {
            return Outcome::reply(Response::InvalidArgs);
        }

        let args = &request.args;
        match command {
            Command::Ping => Outcome::reply(Response::value("PONG")),

            Command::Set => {
                self.storage.set(args[0].clone(), args[1].clone());
                Outcome::reply(Response::Ok)
            }
            Command::Get => Outcome::reply(match self.storage.get(&args[0]) {
                Some(data) => Response::Value(data),
                None => Response::NotFound,
            }),

            Command::Del => Outcome::reply(Response::flag(self.storage.del(&args[0]))),
            Command::Exists => Outcome::reply(Response::flag(self.storage.exists(&args[0]))),

            Command::Expire => match parse_int(&args[1]) {
                Some(seconds) => {
                    Outcome::reply(Response::flag(self.storage.expire(&args[0], seconds)))
                }
                None => Outcome::reply(Response::Error("invalid timeout value".to_string())),
            },
            Command::Ttl => Outcome::reply(Response::integer(self.storage.ttl(&args[0]))),

            Command::Keys => Outcome::reply(Response::Values(self.storage.keys())),
            Command::DbSize => Outcome::reply(Response::integer(self.storage.dbsize() as i64)),

            Command::LPush => Outcome::reply(
                match self.storage.lpush(args[0].clone(), args[1].clone()) {
                    Ok(len) => Response::integer(len as i64),
                    Err(_) => Response::WrongType,
                },
            ),
            Command::RPush => Outcome::reply(
                match self.storage.rpush(args[0].clone(), args[1].clone()) {
                    Ok(len) => Response::integer(len as i64),
                    Err(_) => Response::WrongType,
                },
            ),
            Command::LPop => Outcome::reply(match self.storage.lpop(&args[0]) {
                Some(data) => Response::Value(data),
                None => Response::NotFound,
            }),
            Command::RPop => Outcome::reply(match self.storage.rpop(&args[0]) {
                Some(data) => Response::Value(data),
                None => Response::NotFound,
            }),
            Command::LRange => {
                let (Some(start), Some(stop)) = (parse_int(&args[1]), parse_int(&args[2])) else {
                    return Outcome::reply(Response::Error("invalid index".to_string()));
                };
                Outcome::reply(match self.storage.lrange(&args[0], start, stop) {
                    Some(items) => Response::Values(items),
                    None => Response::NotFound,
                })
            }
            Command::LLen => Outcome::reply(Response::integer(self.storage.llen(&args[0]) as i64)),

            Command::SAdd => Outcome::reply(
                match self.storage.sadd(args[0].clone(), args[1].clone()) {
                    Ok(added) => Response::flag(added),
                    Err(_) => Response::WrongType,
                },
            ),
            Command::SRem => Outcome::reply(match self.storage.srem(&args[0], &args[1]) {
                Ok(removed) => Response::flag(removed),
                Err(_) => Response::WrongType,
            }),
            Command::SIsMember => {
                Outcome::reply(Response::flag(self.storage.sismember(&args[0], &args[1])))
            }
            Command::SMembers => Outcome::reply(match self.storage.smembers(&args[0]) {
                Some(members) => Response::Values(members),
                None => Response::NotFound,
            }),
            Command::SCard => {
                Outcome::reply(Response::integer(self.storage.scard(&args[0]) as i64))
            }

            Command::Quit => Outcome {
                response: Response::value("Goodbye"),
                close: true,
            },
        }
    }
}

/// Parses a decimal integer argument from its raw bytes.
fn parse_int(arg: &Bytes) -> Option<i64> {
    std::str::from_utf8(arg).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::parse_request;

    fn handler() -> CommandHandler {
        CommandHandler::new(Arc::new(StorageEngine::new()))
    }

    fn run(handler: &CommandHandler, line: &str) -> Outcome {
        let request = parse_request(line.as_bytes()).expect("non-empty line");
        handler.execute(&request)
    }

    fn b(s: &str) -> Bytes {
        Bytes::copy_from_slice(s.as_bytes())
    }

    #[test]
    fn test_ping() {
        let outcome = run(&handler(), "PING");
        assert_eq!(outcome.response, Response::value("PONG"));
        assert!(!outcome.close);
    }

    #[test]
    fn test_set_get_del_round_trip() {
        let handler = handler();

        assert_eq!(run(&handler, "SET foo bar").response, Response::Ok);
        assert_eq!(run(&handler, "GET foo").response, Response::value("bar"));
        assert_eq!(run(&handler, "GET missing").response, Response::NotFound);
        assert_eq!(run(&handler, "DEL foo").response, Response::flag(true));
        assert_eq!(run(&handler, "GET foo").response, Response::NotFound);
        assert_eq!(run(&handler, "DEL foo").response, Response::flag(false));
    }

    #[test]
    fn test_arity_mismatch() {
        let handler = handler();

        assert_eq!(run(&handler, "SET foo").response, Response::InvalidArgs);
        assert_eq!(run(&handler, "GET").response, Response::InvalidArgs);
        assert_eq!(run(&handler, "GET a b").response, Response::InvalidArgs);
        assert_eq!(run(&handler, "PING extra").response, Response::InvalidArgs);
        assert_eq!(run(&handler, "LRANGE l 0").response, Response::InvalidArgs);
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            run(&handler(), "frobnicate x").response,
            Response::Error("unknown command 'FROBNICATE'".to_string())
        );
    }

    #[test]
    fn test_expire_and_ttl() {
        let handler = handler();

        assert_eq!(
            run(&handler, "EXPIRE missing 10").response,
            Response::flag(false)
        );

        run(&handler, "SET k v");
        assert_eq!(run(&handler, "EXPIRE k 100").response, Response::flag(true));
        assert_eq!(
            run(&handler, "EXPIRE k nope").response,
            Response::Error("invalid timeout value".to_string())
        );

        run(&handler, "SET p v");
        assert_eq!(run(&handler, "TTL p").response, Response::value("-1"));
        assert_eq!(run(&handler, "TTL missing").response, Response::value("-2"));
    }

    #[test]
    fn test_expire_zero_hides_key() {
        let handler = handler();

        run(&handler, "SET t v");
        assert_eq!(run(&handler, "EXPIRE t 0").response, Response::flag(true));
        assert_eq!(run(&handler, "GET t").response, Response::NotFound);
        assert_eq!(run(&handler, "TTL t").response, Response::value("-2"));
        assert_eq!(run(&handler, "EXISTS t").response, Response::flag(false));
    }

    #[test]
    fn test_list_scenario() {
        let handler = handler();

        assert_eq!(run(&handler, "LPUSH L a").response, Response::value("1"));
        assert_eq!(run(&handler, "LPUSH L b").response, Response::value("2"));
        assert_eq!(run(&handler, "RPUSH L c").response, Response::value("3"));
        assert_eq!(
            run(&handler, "LRANGE L 0 -1").response,
            Response::Values(vec![b("b"), b("a"), b("c")])
        );
        assert_eq!(run(&handler, "LPOP L").response, Response::value("b"));
        assert_eq!(run(&handler, "LLEN L").response, Response::value("2"));
    }

    #[test]
    fn test_lrange_errors() {
        let handler = handler();

        assert_eq!(
            run(&handler, "LRANGE missing 0 -1").response,
            Response::NotFound
        );
        run(&handler, "RPUSH L a");
        assert_eq!(
            run(&handler, "LRANGE L zero -1").response,
            Response::Error("invalid index".to_string())
        );
    }

    #[test]
    fn test_pop_empty_or_missing_is_null() {
        let handler = handler();

        assert_eq!(run(&handler, "LPOP missing").response, Response::NotFound);
        assert_eq!(run(&handler, "RPOP missing").response, Response::NotFound);

        // Pops on a wrong-typed key are also "no value" at the wire.
        run(&handler, "SET s v");
        assert_eq!(run(&handler, "LPOP s").response, Response::NotFound);
    }

    #[test]
    fn test_wrong_type_on_push() {
        let handler = handler();

        run(&handler, "SET k v");
        assert_eq!(run(&handler, "LPUSH k z").response, Response::WrongType);
        assert_eq!(run(&handler, "RPUSH k z").response, Response::WrongType);
        // The string survives the failed push.
        assert_eq!(run(&handler, "GET k").response, Response::value("v"));
    }

    #[test]
    fn test_set_scenario() {
        let handler = handler();

        assert_eq!(run(&handler, "SADD S x").response, Response::flag(true));
        assert_eq!(run(&handler, "SADD S x").response, Response::flag(false));
        assert_eq!(run(&handler, "SADD S y").response, Response::flag(true));
        assert_eq!(run(&handler, "SCARD S").response, Response::value("2"));
        assert_eq!(run(&handler, "SISMEMBER S x").response, Response::flag(true));
        assert_eq!(
            run(&handler, "SISMEMBER S z").response,
            Response::flag(false)
        );
    }

    #[test]
    fn test_smembers() {
        let handler = handler();

        assert_eq!(
            run(&handler, "SMEMBERS missing").response,
            Response::NotFound
        );

        run(&handler, "SADD S only");
        assert_eq!(
            run(&handler, "SMEMBERS S").response,
            Response::Values(vec![b("only")])
        );
    }

    #[test]
    fn test_sadd_on_wrong_type() {
        let handler = handler();

        run(&handler, "SET k v");
        assert_eq!(run(&handler, "SADD k m").response, Response::WrongType);
        assert_eq!(run(&handler, "SREM k m").response, Response::WrongType);
    }

    #[test]
    fn test_keys_and_dbsize() {
        let handler = handler();

        assert_eq!(run(&handler, "DBSIZE").response, Response::value("0"));
        assert_eq!(
            run(&handler, "KEYS").response,
            Response::Values(Vec::new())
        );

        run(&handler, "SET a 1");
        run(&handler, "SET b 2");
        assert_eq!(run(&handler, "DBSIZE").response, Response::value("2"));

        if let Response::Values(mut keys) = run(&handler, "KEYS").response {
            keys.sort();
            assert_eq!(keys, vec![b("a"), b("b")]);
        } else {
            panic!("KEYS should return an array");
        }
    }

    #[test]
    fn test_quit_closes_connection() {
        let outcome = run(&handler(), "QUIT");
        assert_eq!(outcome.response, Response::value("Goodbye"));
        assert!(outcome.close);
    }
}
