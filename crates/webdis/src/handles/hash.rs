use protocol::{Arg, WebdisError};
use serde_json::Value;

use super::Binding;
use crate::client::pair_args;
use crate::ops::Op;

/// A handle on a hash.
///
/// Field/value maps are passed as iterators of pairs, so any ordered or
/// unordered map type works, as does a plain array of tuples.
#[derive(Debug, Clone)]
pub struct Hash {
    binding: Binding,
}

handle_common!(Hash);

impl Hash {
    /// `DEL`: removes the whole hash.
    pub async fn delete_all(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::Delete, Vec::new()).await
    }

    /// `HDEL`: removes one field.
    pub async fn del(&self, field: impl Into<String>) -> Result<Value, WebdisError> {
        self.binding.call(Op::HashDelete, vec![Arg::Text(field.into())]).await
    }

    /// `HGETALL`: every field as a JSON object; `{}` if the key does not exist.
    pub async fn get_all(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::HashGetAll, Vec::new()).await
    }

    /// `HGET`
    pub async fn get(&self, field: impl Into<String>) -> Result<Value, WebdisError> {
        self.binding.call(Op::HashGet, vec![Arg::Text(field.into())]).await
    }

    /// `HSETNX`: sets `field` only if it is absent.
    pub async fn setnx(
        &self,
        field: impl Into<String>,
        value: impl Into<Arg>,
    ) -> Result<Value, WebdisError> {
        self.binding
            .call(Op::HashSetIfAbsent, vec![Arg::Text(field.into()), value.into()])
            .await
    }

    /// Replace-all: deletes the hash, then stores exactly `fields`.
    ///
    /// Readers may see the hash missing between the two requests. With no
    /// fields the hash is only deleted and the `DEL` reply is returned.
    pub async fn set<I, K, V>(&self, fields: I) -> Result<Value, WebdisError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Arg>,
    {
        let params = pair_args(fields);
        let deleted = self.delete_all().await?;
        if params.is_empty() {
            return Ok(deleted);
        }
        self.binding.call(Op::HashSetMany, params).await
    }

    /// `HMSET`: stores `fields`, keeping any others.
    pub async fn update<I, K, V>(&self, fields: I) -> Result<Value, WebdisError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Arg>,
    {
        self.binding.call(Op::HashSetMany, pair_args(fields)).await
    }

    /// `HINCRBY`
    pub async fn incr_by(&self, field: impl Into<String>, increment: i64) -> Result<Value, WebdisError> {
        self.binding
            .call(Op::HashIncrBy, vec![Arg::Text(field.into()), increment.into()])
            .await
    }

    /// `HINCRBYFLOAT`
    pub async fn incr_by_float(
        &self,
        field: impl Into<String>,
        increment: f64,
    ) -> Result<Value, WebdisError> {
        self.binding
            .call(Op::HashIncrByFloat, vec![Arg::Text(field.into()), increment.into()])
            .await
    }

    /// `HKEYS`
    pub async fn keys(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::HashKeys, Vec::new()).await
    }

    /// `HVALS`
    pub async fn vals(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::HashValues, Vec::new()).await
    }

    /// `HLEN`
    pub async fn len(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::HashLen, Vec::new()).await
    }

    /// `HEXISTS`: `1` if `field` is present.
    pub async fn exists(&self, field: impl Into<String>) -> Result<Value, WebdisError> {
        self.binding.call(Op::HashExists, vec![Arg::Text(field.into())]).await
    }
}
