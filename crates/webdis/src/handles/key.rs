use protocol::reply::status_of;
use protocol::{is_truthy, Arg, ReplyStatus, WebdisError};
use serde_json::Value;
use tracing::debug;

use super::Binding;
use crate::ops::Op;

/// A handle on one key, typically holding a string value.
///
/// Values are sent through the codec, so structured values round-trip:
///
/// ```no_run
/// # async fn demo(client: webdis::Client) -> Result<(), protocol::WebdisError> {
/// use serde_json::json;
///
/// let key = client.key("t1");
/// key.set(json!([1, 2, [3, 4], {"x": 5}])).await?;
/// assert_eq!(key.get().await?, json!([1, 2, [3, 4], {"x": 5}]));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Key {
    binding: Binding,
}

handle_common!(Key);

impl Key {
    /// `APPEND`: the new length.
    pub async fn append(&self, value: impl Into<Arg>) -> Result<Value, WebdisError> {
        self.binding.call(Op::Append, vec![value.into()]).await
    }

    /// `DECR`
    pub async fn decr(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::Decr, Vec::new()).await
    }

    /// `DECRBY`
    pub async fn decr_by(&self, amount: i64) -> Result<Value, WebdisError> {
        self.binding.call(Op::DecrBy, vec![amount.into()]).await
    }

    /// `DEL`: `1` if the key existed, else `0`.
    pub async fn del(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::Delete, Vec::new()).await
    }

    /// `EXISTS`: `1` or `0`.
    pub async fn exists(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::Exists, Vec::new()).await
    }

    /// `EXPIRE` after `seconds`.
    pub async fn expire(&self, seconds: i64) -> Result<Value, WebdisError> {
        self.binding.call(Op::Expire, vec![seconds.into()]).await
    }

    /// `EXPIREAT` a Unix timestamp in seconds.
    pub async fn expire_at(&self, unix_seconds: i64) -> Result<Value, WebdisError> {
        self.binding.call(Op::ExpireAt, vec![unix_seconds.into()]).await
    }

    /// `GETRANGE`: substring between two inclusive offsets.
    pub async fn get_range(&self, start: i64, end: i64) -> Result<Value, WebdisError> {
        self.binding.call(Op::GetRange, vec![start.into(), end.into()]).await
    }

    /// `GETSET`: stores `value` and returns the previous one.
    pub async fn get_set(&self, value: impl Into<Arg>) -> Result<Value, WebdisError> {
        self.binding.call(Op::GetSet, vec![value.into()]).await
    }

    /// `GET`: the decoded value, or `null` if the key does not exist.
    pub async fn get(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::Get, Vec::new()).await
    }

    /// `INCR`
    pub async fn incr(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::Incr, Vec::new()).await
    }

    /// `INCRBY`
    pub async fn incr_by(&self, increment: i64) -> Result<Value, WebdisError> {
        self.binding.call(Op::IncrBy, vec![increment.into()]).await
    }

    /// `INCRBYFLOAT`
    pub async fn incr_by_float(&self, increment: f64) -> Result<Value, WebdisError> {
        self.binding.call(Op::IncrByFloat, vec![increment.into()]).await
    }

    /// `MOVE` to database `db`.
    pub async fn move_to_db(&self, db: i64) -> Result<Value, WebdisError> {
        self.binding.call(Op::MoveToDb, vec![db.into()]).await
    }

    /// `PERSIST`: removes any expiry.
    pub async fn persist(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::Persist, Vec::new()).await
    }

    /// `PEXPIRE` after `ms` milliseconds.
    pub async fn pexpire(&self, ms: i64) -> Result<Value, WebdisError> {
        self.binding.call(Op::PExpire, vec![ms.into()]).await
    }

    /// `PEXPIREAT` a Unix timestamp in milliseconds.
    pub async fn pexpire_at(&self, unix_ms: i64) -> Result<Value, WebdisError> {
        self.binding.call(Op::PExpireAt, vec![unix_ms.into()]).await
    }

    /// `PSETEX`: stores `value` with a millisecond expiry.
    pub async fn psetex(&self, ms: i64, value: impl Into<Arg>) -> Result<Value, WebdisError> {
        self.binding.call(Op::PSetEx, vec![ms.into(), value.into()]).await
    }

    /// `PTTL`
    pub async fn pttl(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::PTtl, Vec::new()).await
    }

    /// `RENAME` to `new_key`.
    ///
    /// The handle switches to `new_key` only once the gateway has confirmed
    /// the rename. On any error it keeps pointing at the old name, including
    /// a `[false, message]` reply passed through when error replies are not
    /// rejected.
    pub async fn rename(&mut self, new_key: impl Into<String>) -> Result<Value, WebdisError> {
        let new_key = new_key.into();
        let reply = self
            .binding
            .call(Op::Rename, vec![Arg::Text(new_key.clone())])
            .await?;
        if is_error_reply(&reply) {
            return Ok(reply);
        }
        debug!(from = %self.binding.key, to = %new_key, "key renamed");
        self.binding.key = new_key;
        Ok(reply)
    }

    /// `RENAMENX` to `new_key`, only if `new_key` does not exist.
    ///
    /// Returns whether the rename happened; the handle follows the key only
    /// when it did.
    pub async fn rename_nx(&mut self, new_key: impl Into<String>) -> Result<bool, WebdisError> {
        let new_key = new_key.into();
        let reply = self
            .binding
            .call(Op::RenameIfAbsent, vec![Arg::Text(new_key.clone())])
            .await?;
        let renamed = !is_error_reply(&reply) && is_truthy(&reply);
        if renamed {
            self.binding.key = new_key;
        }
        Ok(renamed)
    }

    /// `RESTORE` from a `DUMP` payload.
    pub async fn restore(&self, ttl_ms: i64, serialized: impl Into<Arg>) -> Result<Value, WebdisError> {
        self.binding
            .call(Op::Restore, vec![ttl_ms.into(), serialized.into()])
            .await
    }

    /// `SET`: `[true, "OK"]` on success.
    pub async fn set(&self, value: impl Into<Arg>) -> Result<Value, WebdisError> {
        self.binding.call(Op::Set, vec![value.into()]).await
    }

    /// `SETEX`: stores `value` with an expiry in seconds.
    pub async fn setex(&self, seconds: i64, value: impl Into<Arg>) -> Result<Value, WebdisError> {
        self.binding.call(Op::SetEx, vec![seconds.into(), value.into()]).await
    }

    /// `SETNX`: `1` if the value was stored, `0` if the key already existed.
    pub async fn setnx(&self, value: impl Into<Arg>) -> Result<Value, WebdisError> {
        self.binding.call(Op::SetIfAbsent, vec![value.into()]).await
    }

    /// `SETRANGE`: overwrites part of the value starting at `offset`.
    pub async fn set_range(&self, offset: i64, value: impl Into<Arg>) -> Result<Value, WebdisError> {
        self.binding.call(Op::SetRange, vec![offset.into(), value.into()]).await
    }

    /// `STRLEN`
    pub async fn strlen(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::Strlen, Vec::new()).await
    }

    /// `TTL`
    pub async fn ttl(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::Ttl, Vec::new()).await
    }

    /// `TYPE`: a status reply such as `[true, "string"]`, or `[true, "none"]`
    /// for a missing key.
    pub async fn key_type(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::Type, Vec::new()).await
    }
}

fn is_error_reply(reply: &Value) -> bool {
    matches!(status_of(reply), Some(ReplyStatus::Err(_)))
}
