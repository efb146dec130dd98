use protocol::{Arg, WebdisError};
use serde_json::Value;

use super::Binding;
use crate::client::collect_args;
use crate::ops::Op;

/// A handle on a set.
#[derive(Debug, Clone)]
pub struct Set {
    binding: Binding,
}

handle_common!(Set);

impl Set {
    /// `SMEMBERS`: every member, in no particular order.
    pub async fn members(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::SetMembers, Vec::new()).await
    }

    /// Alias of [`Set::members`].
    pub async fn keys(&self) -> Result<Value, WebdisError> {
        self.members().await
    }

    /// Alias of [`Set::members`].
    pub async fn vals(&self) -> Result<Value, WebdisError> {
        self.members().await
    }

    /// Alias of [`Set::members`].
    pub async fn get_all(&self) -> Result<Value, WebdisError> {
        self.members().await
    }

    /// `SISMEMBER`: `1` if `member` is present.
    pub async fn has(&self, member: impl Into<Arg>) -> Result<Value, WebdisError> {
        self.binding.call(Op::SetIsMember, vec![member.into()]).await
    }

    /// Alias of [`Set::has`].
    pub async fn is_member(&self, member: impl Into<Arg>) -> Result<Value, WebdisError> {
        self.has(member).await
    }

    /// `DEL`: removes the whole set.
    pub async fn clear(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::Delete, Vec::new()).await
    }

    /// `SADD`: the number of members actually added.
    pub async fn add<I, A>(&self, members: I) -> Result<Value, WebdisError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        self.binding.call(Op::SetAdd, collect_args(members)).await
    }

    /// Replace-all: clears the set, then adds `members`.
    ///
    /// Readers may see the set missing between the two requests. With no
    /// members the set is only cleared and the `DEL` reply is returned.
    pub async fn set<I, A>(&self, members: I) -> Result<Value, WebdisError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        let params = collect_args(members);
        let cleared = self.clear().await?;
        if params.is_empty() {
            return Ok(cleared);
        }
        self.binding.call(Op::SetAdd, params).await
    }

    /// `SREM`: the number of members actually removed.
    pub async fn remove<I, A>(&self, members: I) -> Result<Value, WebdisError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        self.binding.call(Op::SetRemove, collect_args(members)).await
    }

    /// `SCARD`
    pub async fn len(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::SetCard, Vec::new()).await
    }

    /// `SDIFF`: members of this set that are in none of `others`.
    pub async fn without_sets<I, K>(&self, others: I) -> Result<Value, WebdisError>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.binding.call(Op::SetDiff, key_args(others)).await
    }

    /// `SDIFFSTORE`: replaces this set with the first of `sources` minus the rest.
    pub async fn from_diff<I, K>(&self, sources: I) -> Result<Value, WebdisError>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.binding.call(Op::SetDiffStore, key_args(sources)).await
    }

    /// `SINTER`: members common to this set and every one of `others`.
    pub async fn intersection<I, K>(&self, others: I) -> Result<Value, WebdisError>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.binding.call(Op::SetInter, key_args(others)).await
    }

    /// `SINTERSTORE`: replaces this set with the intersection of `sources`.
    pub async fn from_intersection<I, K>(&self, sources: I) -> Result<Value, WebdisError>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.binding.call(Op::SetInterStore, key_args(sources)).await
    }

    /// `SUNION`: members of this set or any of `others`.
    pub async fn union<I, K>(&self, others: I) -> Result<Value, WebdisError>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.binding.call(Op::SetUnion, key_args(others)).await
    }

    /// `SUNIONSTORE`: replaces this set with the union of `sources`.
    pub async fn from_union<I, K>(&self, sources: I) -> Result<Value, WebdisError>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.binding.call(Op::SetUnionStore, key_args(sources)).await
    }

    /// `SMOVE`: moves `member` into the set at `destination`.
    pub async fn move_to(
        &self,
        destination: impl Into<String>,
        member: impl Into<Arg>,
    ) -> Result<Value, WebdisError> {
        self.binding
            .call(Op::SetMove, vec![Arg::Text(destination.into()), member.into()])
            .await
    }

    /// `SPOP`: removes and returns a random member.
    pub async fn pop(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::SetPop, Vec::new()).await
    }

    /// `SRANDMEMBER -count`: `count` random members, possibly repeated.
    pub async fn sample_with_replacement(&self, count: i64) -> Result<Value, WebdisError> {
        let count = count.saturating_abs().saturating_neg();
        self.binding.call(Op::SetRandomMember, vec![count.into()]).await
    }

    /// `SRANDMEMBER count`: up to `count` distinct random members.
    pub async fn sample_subset(&self, count: i64) -> Result<Value, WebdisError> {
        self.binding
            .call(Op::SetRandomMember, vec![count.saturating_abs().into()])
            .await
    }
}

fn key_args<I, K>(keys: I) -> Vec<Arg>
where
    I: IntoIterator<Item = K>,
    K: Into<String>,
{
    keys.into_iter().map(|k| Arg::Text(k.into())).collect()
}
