//! In-memory stand-in for the gateway and the store behind it.
//!
//! `FakeGateway` implements `Transport`: it decodes the command path the same
//! way the real gateway does (POST body, GET URL, or PUT URL + body), runs a
//! small subset of store commands against a map, and answers with the
//! gateway's JSON envelope. Every request is recorded for inspection.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use percent_encoding::percent_decode_str;
use protocol::{GatewayRequest, GatewayResponse, HttpMethod, Transport, WebdisError};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
enum Entry {
    Str(String),
    Hash(Vec<(String, String)>),
    List(VecDeque<String>),
    Set(BTreeSet<String>),
}

impl Entry {
    fn type_name(&self) -> &'static str {
        match self {
            Entry::Str(_) => "string",
            Entry::Hash(_) => "hash",
            Entry::List(_) => "list",
            Entry::Set(_) => "set",
        }
    }
}

#[derive(Default)]
struct State {
    store: HashMap<String, Entry>,
    requests: Vec<GatewayRequest>,
    forced_status: Option<(u16, String)>,
    delay: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct FakeGateway {
    state: Arc<Mutex<State>>,
}

type Reply = Result<Value, String>;

const WRONGTYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

fn ok() -> Reply {
    Ok(json!([true, "OK"]))
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<GatewayRequest> {
        self.state.lock().requests.clone()
    }

    /// The decoded command tokens of every request received so far.
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.requests().iter().map(tokens_of).collect()
    }

    /// Answers every subsequent request with `status` and an HTML body.
    pub fn fail_with(&self, status: u16, text: &str) {
        self.state.lock().forced_status = Some((status, text.to_owned()));
    }

    /// Delays every subsequent response.
    pub fn delay(&self, by: Duration) {
        self.state.lock().delay = Some(by);
    }

    /// Stores a raw string value, bypassing the client.
    pub fn put_raw(&self, key: &str, value: &str) {
        self.state
            .lock()
            .store
            .insert(key.to_owned(), Entry::Str(value.to_owned()));
    }

    /// Reads a raw string value, bypassing the client.
    pub fn raw(&self, key: &str) -> Option<String> {
        match self.state.lock().store.get(key) {
            Some(Entry::Str(s)) => Some(s.clone()),
            _ => None,
        }
    }

    fn execute(&self, tokens: &[String]) -> Reply {
        let mut state = self.state.lock();
        let store = &mut state.store;
        let (cmd, args) = match tokens.split_first() {
            Some((cmd, args)) => (cmd.to_ascii_uppercase(), args),
            None => return Err("ERR empty command".to_owned()),
        };
        let arg = |i: usize| {
            args.get(i)
                .ok_or_else(|| format!("ERR wrong number of arguments for '{cmd}' command"))
        };
        let int = |i: usize| -> Result<i64, String> {
            arg(i)?
                .parse::<i64>()
                .map_err(|_| "ERR value is not an integer or out of range".to_owned())
        };

        match cmd.as_str() {
            "ECHO" => Ok(json!(arg(0)?)),
            "SET" => {
                store.insert(arg(0)?.clone(), Entry::Str(arg(1)?.clone()));
                ok()
            }
            "SETNX" => {
                if store.contains_key(arg(0)?) {
                    Ok(json!(0))
                } else {
                    store.insert(arg(0)?.clone(), Entry::Str(arg(1)?.clone()));
                    Ok(json!(1))
                }
            }
            "GET" => match store.get(arg(0)?) {
                None => Ok(Value::Null),
                Some(Entry::Str(s)) => Ok(json!(s)),
                Some(_) => Err(WRONGTYPE.to_owned()),
            },
            "APPEND" => {
                let entry = store
                    .entry(arg(0)?.clone())
                    .or_insert_with(|| Entry::Str(String::new()));
                match entry {
                    Entry::Str(s) => {
                        s.push_str(arg(1)?);
                        Ok(json!(s.len()))
                    }
                    _ => Err(WRONGTYPE.to_owned()),
                }
            }
            "STRLEN" => match store.get(arg(0)?) {
                None => Ok(json!(0)),
                Some(Entry::Str(s)) => Ok(json!(s.len())),
                Some(_) => Err(WRONGTYPE.to_owned()),
            },
            "INCR" | "DECR" | "INCRBY" | "DECRBY" => {
                let by = match cmd.as_str() {
                    "INCR" => 1,
                    "DECR" => -1,
                    "INCRBY" => int(1)?,
                    _ => -int(1)?,
                };
                let current = match store.get(arg(0)?) {
                    None => 0,
                    Some(Entry::Str(s)) => s
                        .parse::<i64>()
                        .map_err(|_| "ERR value is not an integer or out of range".to_owned())?,
                    Some(_) => return Err(WRONGTYPE.to_owned()),
                };
                let next = current + by;
                store.insert(arg(0)?.clone(), Entry::Str(next.to_string()));
                Ok(json!(next))
            }
            "DEL" => {
                let removed = args.iter().filter(|k| store.remove(*k).is_some()).count();
                Ok(json!(removed))
            }
            "EXISTS" => Ok(json!(args.iter().filter(|k| store.contains_key(*k)).count())),
            "TYPE" => Ok(json!([
                true,
                store.get(arg(0)?).map_or("none", Entry::type_name)
            ])),
            "RENAME" | "RENAMENX" => {
                let (from, to) = (arg(0)?.clone(), arg(1)?.clone());
                if !store.contains_key(&from) {
                    return Err("ERR no such key".to_owned());
                }
                if cmd == "RENAMENX" && store.contains_key(&to) {
                    return Ok(json!(0));
                }
                if let Some(entry) = store.remove(&from) {
                    store.insert(to, entry);
                }
                if cmd == "RENAMENX" { Ok(json!(1)) } else { ok() }
            }
            "MGET" => Ok(Value::Array(
                args.iter()
                    .map(|k| match store.get(k) {
                        Some(Entry::Str(s)) => json!(s),
                        _ => Value::Null,
                    })
                    .collect(),
            )),
            "MSET" => {
                for pair in args.chunks(2) {
                    if let [k, v] = pair {
                        store.insert(k.clone(), Entry::Str(v.clone()));
                    }
                }
                ok()
            }
            "KEYS" => {
                let pattern = arg(0)?;
                let mut keys: Vec<&String> =
                    store.keys().filter(|k| glob_match(pattern, k)).collect();
                keys.sort();
                Ok(json!(keys))
            }

            // -- hashes --
            "HMSET" => {
                if args.len() < 3 || args.len() % 2 == 0 {
                    return Err("ERR wrong number of arguments for 'hmset' command".to_owned());
                }
                let entry = store
                    .entry(args[0].clone())
                    .or_insert_with(|| Entry::Hash(Vec::new()));
                let Entry::Hash(fields) = entry else {
                    return Err(WRONGTYPE.to_owned());
                };
                for pair in args[1..].chunks(2) {
                    if let [f, v] = pair {
                        match fields.iter_mut().find(|(name, _)| name == f) {
                            Some(slot) => slot.1 = v.clone(),
                            None => fields.push((f.clone(), v.clone())),
                        }
                    }
                }
                ok()
            }
            "HGETALL" | "HKEYS" | "HVALS" | "HLEN" => {
                let fields = match store.get(arg(0)?) {
                    None => Vec::new(),
                    Some(Entry::Hash(fields)) => fields.clone(),
                    Some(_) => return Err(WRONGTYPE.to_owned()),
                };
                Ok(match cmd.as_str() {
                    "HGETALL" => Value::Object(
                        fields.into_iter().map(|(f, v)| (f, json!(v))).collect(),
                    ),
                    "HKEYS" => json!(fields.into_iter().map(|(f, _)| f).collect::<Vec<_>>()),
                    "HVALS" => json!(fields.into_iter().map(|(_, v)| v).collect::<Vec<_>>()),
                    _ => json!(fields.len()),
                })
            }
            "HGET" | "HEXISTS" => {
                let field = arg(1)?;
                let found = match store.get(arg(0)?) {
                    None => None,
                    Some(Entry::Hash(fields)) => fields
                        .iter()
                        .find(|(f, _)| f == field)
                        .map(|(_, v)| v.clone()),
                    Some(_) => return Err(WRONGTYPE.to_owned()),
                };
                Ok(match (cmd.as_str(), found) {
                    ("HGET", Some(v)) => json!(v),
                    ("HGET", None) => Value::Null,
                    (_, found) => json!(u8::from(found.is_some())),
                })
            }
            "HDEL" => match store.get_mut(arg(0)?) {
                None => Ok(json!(0)),
                Some(Entry::Hash(fields)) => {
                    let before = fields.len();
                    fields.retain(|(f, _)| !args[1..].contains(f));
                    Ok(json!(before - fields.len()))
                }
                Some(_) => Err(WRONGTYPE.to_owned()),
            },
            "HINCRBY" => {
                let by = int(2)?;
                let entry = store
                    .entry(arg(0)?.clone())
                    .or_insert_with(|| Entry::Hash(Vec::new()));
                let Entry::Hash(fields) = entry else {
                    return Err(WRONGTYPE.to_owned());
                };
                let field = arg(1)?;
                let next = match fields.iter_mut().find(|(f, _)| f == field) {
                    Some(slot) => {
                        let next = slot.1.parse::<i64>().map_err(|_| {
                            "ERR hash value is not an integer".to_owned()
                        })? + by;
                        slot.1 = next.to_string();
                        next
                    }
                    None => {
                        fields.push((field.clone(), by.to_string()));
                        by
                    }
                };
                Ok(json!(next))
            }

            // -- lists --
            "RPUSH" | "LPUSH" => {
                let entry = store
                    .entry(arg(0)?.clone())
                    .or_insert_with(|| Entry::List(VecDeque::new()));
                let Entry::List(items) = entry else {
                    return Err(WRONGTYPE.to_owned());
                };
                for v in &args[1..] {
                    if cmd == "RPUSH" {
                        items.push_back(v.clone());
                    } else {
                        items.push_front(v.clone());
                    }
                }
                Ok(json!(items.len()))
            }
            "LRANGE" => {
                let items = match store.get(arg(0)?) {
                    None => VecDeque::new(),
                    Some(Entry::List(items)) => items.clone(),
                    Some(_) => return Err(WRONGTYPE.to_owned()),
                };
                let len = items.len() as i64;
                let norm = |i: i64| if i < 0 { (len + i).max(0) } else { i };
                let (start, stop) = (norm(int(1)?), norm(int(2)?).min(len - 1));
                let slice: Vec<&String> = if start > stop {
                    Vec::new()
                } else {
                    items
                        .iter()
                        .skip(start as usize)
                        .take((stop - start + 1) as usize)
                        .collect()
                };
                Ok(json!(slice))
            }
            "LLEN" => match store.get(arg(0)?) {
                None => Ok(json!(0)),
                Some(Entry::List(items)) => Ok(json!(items.len())),
                Some(_) => Err(WRONGTYPE.to_owned()),
            },
            "LPOP" | "RPOP" => match store.get_mut(arg(0)?) {
                None => Ok(Value::Null),
                Some(Entry::List(items)) => {
                    let popped = if cmd == "LPOP" {
                        items.pop_front()
                    } else {
                        items.pop_back()
                    };
                    Ok(popped.map_or(Value::Null, Value::String))
                }
                Some(_) => Err(WRONGTYPE.to_owned()),
            },
            "LINDEX" => {
                let index = int(1)?;
                match store.get(arg(0)?) {
                    None => Ok(Value::Null),
                    Some(Entry::List(items)) => {
                        let len = items.len() as i64;
                        let i = if index < 0 { len + index } else { index };
                        Ok(usize::try_from(i)
                            .ok()
                            .and_then(|i| items.get(i))
                            .map_or(Value::Null, |v| json!(v)))
                    }
                    Some(_) => Err(WRONGTYPE.to_owned()),
                }
            }
            "LINSERT" => {
                let (place, pivot, value) = (arg(1)?, arg(2)?, arg(3)?.clone());
                match store.get_mut(arg(0)?) {
                    None => Ok(json!(0)),
                    Some(Entry::List(items)) => match items.iter().position(|v| v == pivot) {
                        None => Ok(json!(-1)),
                        Some(at) => {
                            let at = if place.eq_ignore_ascii_case("AFTER") { at + 1 } else { at };
                            items.insert(at, value);
                            Ok(json!(items.len()))
                        }
                    },
                    Some(_) => Err(WRONGTYPE.to_owned()),
                }
            }

            // -- sets --
            "SADD" | "SREM" => {
                let entry = store
                    .entry(arg(0)?.clone())
                    .or_insert_with(|| Entry::Set(BTreeSet::new()));
                let Entry::Set(members) = entry else {
                    return Err(WRONGTYPE.to_owned());
                };
                let changed = args[1..]
                    .iter()
                    .filter(|m| {
                        if cmd == "SADD" {
                            members.insert((*m).clone())
                        } else {
                            members.remove(*m)
                        }
                    })
                    .count();
                Ok(json!(changed))
            }
            "SMEMBERS" | "SCARD" | "SISMEMBER" => {
                let members = match store.get(arg(0)?) {
                    None => BTreeSet::new(),
                    Some(Entry::Set(members)) => members.clone(),
                    Some(_) => return Err(WRONGTYPE.to_owned()),
                };
                Ok(match cmd.as_str() {
                    "SMEMBERS" => json!(members),
                    "SCARD" => json!(members.len()),
                    _ => json!(u8::from(members.contains(arg(1)?))),
                })
            }
            "SINTER" | "SUNION" | "SDIFF" => {
                let mut sets = Vec::new();
                for key in args {
                    sets.push(match store.get(key) {
                        None => BTreeSet::new(),
                        Some(Entry::Set(members)) => members.clone(),
                        Some(_) => return Err(WRONGTYPE.to_owned()),
                    });
                }
                let mut iter = sets.into_iter();
                let first = iter.next().unwrap_or_default();
                let result = iter.fold(first, |acc, s| match cmd.as_str() {
                    "SINTER" => acc.intersection(&s).cloned().collect(),
                    "SUNION" => acc.union(&s).cloned().collect(),
                    _ => acc.difference(&s).cloned().collect(),
                });
                Ok(json!(result))
            }

            _ => Err(format!("ERR unknown command '{cmd}'")),
        }
    }
}

/// `KEYS` glob subset: `*` matches any run of characters.
fn glob_match(pattern: &str, key: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == key,
        Some((prefix, rest)) => {
            let Some(tail) = key.strip_prefix(prefix) else {
                return false;
            };
            (0..=tail.len())
                .filter(|i| tail.is_char_boundary(*i))
                .any(|i| glob_match(rest, &tail[i..]))
        }
    }
}

/// Recovers the command tokens from a request, as the gateway does.
pub fn tokens_of(request: &GatewayRequest) -> Vec<String> {
    let path = match request.method {
        HttpMethod::Post => String::from_utf8_lossy(request.body.as_deref().unwrap_or_default())
            .into_owned(),
        HttpMethod::Get | HttpMethod::Put => {
            let after_scheme = request
                .url
                .split_once("://")
                .map_or(request.url.as_str(), |(_, rest)| rest);
            after_scheme
                .split_once('/')
                .map_or("", |(_, path)| path)
                .to_owned()
        }
    };
    let mut tokens: Vec<String> = path
        .split('/')
        .map(|t| percent_decode_str(t).decode_utf8_lossy().into_owned())
        .collect();
    if request.method == HttpMethod::Put {
        if let Some(body) = &request.body {
            tokens.push(String::from_utf8_lossy(body).into_owned());
        }
    }
    tokens
}

#[async_trait]
impl Transport for FakeGateway {
    async fn send(&self, request: GatewayRequest) -> Result<GatewayResponse, WebdisError> {
        let (forced, delay) = {
            let mut state = self.state.lock();
            state.requests.push(request.clone());
            (state.forced_status.clone(), state.delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some((status, text)) = forced {
            return Ok(GatewayResponse {
                status,
                status_text: text,
                headers: BTreeMap::new(),
                body: b"<html>gateway unavailable</html>".to_vec(),
            });
        }

        let tokens = tokens_of(&request);
        let name = tokens.first().cloned().unwrap_or_default();
        let reply = match self.execute(&tokens) {
            Ok(value) => value,
            Err(message) => json!([false, message]),
        };
        let mut envelope = serde_json::Map::new();
        envelope.insert(name, reply);
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_owned(), "application/json".to_owned());
        Ok(GatewayResponse {
            status: 200,
            status_text: "OK".to_owned(),
            headers,
            body: Value::Object(envelope).to_string().into_bytes(),
        })
    }
}
