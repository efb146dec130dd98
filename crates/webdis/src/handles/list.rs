use protocol::{Arg, WebdisError};
use serde_json::Value;

use super::Binding;
use crate::client::collect_args;
use crate::ops::Op;

/// A handle on a list.
///
/// Method names follow array conventions: `push`/`pop` work on the tail,
/// `unshift`/`shift` on the head.
#[derive(Debug, Clone)]
pub struct List {
    binding: Binding,
}

handle_common!(List);

impl List {
    /// `LINDEX`: the element at `index` (negative counts from the end).
    pub async fn get(&self, index: i64) -> Result<Value, WebdisError> {
        self.binding.call(Op::ListIndex, vec![index.into()]).await
    }

    /// `LRANGE 0 -1`: every element, in order.
    pub async fn get_all(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::ListAll, Vec::new()).await
    }

    /// `LINSERT BEFORE`: inserts `value` before the first `pivot`.
    pub async fn insert_before(
        &self,
        pivot: impl Into<Arg>,
        value: impl Into<Arg>,
    ) -> Result<Value, WebdisError> {
        self.binding
            .call(Op::ListInsertBefore, vec![pivot.into(), value.into()])
            .await
    }

    /// `LINSERT AFTER`: inserts `values` after the first `pivot`.
    ///
    /// Every value is forwarded as given; a stock store accepts exactly one.
    pub async fn insert_after<I, A>(&self, pivot: impl Into<Arg>, values: I) -> Result<Value, WebdisError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        let mut params = vec![pivot.into()];
        params.extend(collect_args(values));
        self.binding.call(Op::ListInsertAfter, params).await
    }

    /// `LLEN`
    pub async fn len(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::ListLen, Vec::new()).await
    }

    /// `LPOP`: removes and returns the first element.
    pub async fn shift(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::ListPopFront, Vec::new()).await
    }

    /// `LPUSH`: prepends `values`; each lands in front of the previous one.
    pub async fn unshift<I, A>(&self, values: I) -> Result<Value, WebdisError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        self.binding.call(Op::ListPushFront, collect_args(values)).await
    }

    /// `LRANGE from to`, both inclusive. Use `0, -1` for the whole list.
    pub async fn slice(&self, from: i64, to: i64) -> Result<Value, WebdisError> {
        self.binding.call(Op::ListRange, vec![from.into(), to.into()]).await
    }

    /// `LREM 0 value`: removes every occurrence of `value`.
    pub async fn remove(&self, value: impl Into<Arg>) -> Result<Value, WebdisError> {
        self.remove_n(value, 0).await
    }

    /// `LREM count value`: removes up to `count` occurrences, from the head
    /// when positive and from the tail when negative. `0` removes all.
    pub async fn remove_n(&self, value: impl Into<Arg>, count: i64) -> Result<Value, WebdisError> {
        self.binding
            .call(Op::ListRemove, vec![count.into(), value.into()])
            .await
    }

    /// `LSET`: replaces the element at `index`.
    pub async fn set(&self, index: i64, value: impl Into<Arg>) -> Result<Value, WebdisError> {
        self.binding.call(Op::ListSet, vec![index.into(), value.into()]).await
    }

    /// Replace-all: deletes the list, then pushes `values` in order.
    ///
    /// Readers may see the list missing between the two requests. With no
    /// values the list is only deleted and the `DEL` reply is returned.
    pub async fn set_all<I, A>(&self, values: I) -> Result<Value, WebdisError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        let params = collect_args(values);
        let deleted = self.binding.call(Op::Delete, Vec::new()).await?;
        if params.is_empty() {
            return Ok(deleted);
        }
        self.binding.call(Op::ListPushBack, params).await
    }

    /// `LTRIM from to`: keeps only the given inclusive range.
    pub async fn trim(&self, from: i64, to: i64) -> Result<Value, WebdisError> {
        self.binding.call(Op::ListTrim, vec![from.into(), to.into()]).await
    }

    /// `RPOP`: removes and returns the last element.
    pub async fn pop(&self) -> Result<Value, WebdisError> {
        self.binding.call(Op::ListPopBack, Vec::new()).await
    }

    /// `RPOPLPUSH`: moves the last element to the head of `destination`.
    pub async fn pop_to(&self, destination: impl Into<String>) -> Result<Value, WebdisError> {
        self.binding
            .call(Op::ListPopBackPushFront, vec![Arg::Text(destination.into())])
            .await
    }

    /// `RPUSH`: appends `values` in order; returns the new length.
    pub async fn push<I, A>(&self, values: I) -> Result<Value, WebdisError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        self.binding.call(Op::ListPushBack, collect_args(values)).await
    }
}
