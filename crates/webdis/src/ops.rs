//! The operation table.
//!
//! Every typed method on [`crate::Client`] and the key handles maps 1:1 to a
//! remote command. Rather than spell each mapping out in a method body, the
//! mapping lives here as data: an [`Op`] names the operation, and its template
//! gives the command token plus any fixed tokens that follow the key.
//!
//! A command is assembled as `[command, key?, fixed..., params...]`, e.g.
//! [`Op::ListInsertBefore`] with key `jobs` and params `pivot new` becomes
//! `LINSERT jobs BEFORE pivot new`.

use protocol::{Arg, Command, CommandName};

// ---------------------------------------------------------------------------
// Macro for the table.
// Generates: enum Op, Op::ALL, command(), fixed_args().
// ---------------------------------------------------------------------------
macro_rules! ops {
    (
        $(
            $(#[$attr:meta])*
            $variant:ident => $command:literal $([ $($fixed:literal),* ])?;
        )*
    ) => {
        /// A typed gateway operation.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Op {
            $(
                $(#[$attr])*
                $variant,
            )*
        }

        impl Op {
            /// Every operation in the table.
            pub const ALL: &'static [Op] = &[$(Op::$variant),*];

            /// The remote command token.
            pub fn command(self) -> &'static str {
                match self {
                    $(Op::$variant => $command,)*
                }
            }

            /// Tokens placed between the key and the caller's parameters.
            pub fn fixed_args(self) -> &'static [&'static str] {
                match self {
                    $(Op::$variant => &[$($($fixed),*)?],)*
                }
            }
        }
    };
}

ops! {
    // -- Server-wide ---------------------------------------------------------

    /// `ECHO message`
    Echo => "ECHO";
    /// `MGET key...`
    MultiGet => "MGET";
    /// `MSET key value...`
    MultiSet => "MSET";
    /// `MSETNX key value...`
    MultiSetIfAbsent => "MSETNX";
    /// `DEL key...`
    Delete => "DEL";
    /// `KEYS pattern`
    KeysMatching => "KEYS";
    /// `RANDOMKEY`
    RandomKey => "RANDOMKEY";
    /// `SELECT index`
    SelectDb => "SELECT";

    // -- Keys and string values ----------------------------------------------

    /// `APPEND key value`
    Append => "APPEND";
    /// `DECR key`
    Decr => "DECR";
    /// `DECRBY key amount`
    DecrBy => "DECRBY";
    /// `EXISTS key`
    Exists => "EXISTS";
    /// `EXPIRE key seconds`
    Expire => "EXPIRE";
    /// `EXPIREAT key unix-seconds`
    ExpireAt => "EXPIREAT";
    /// `GETRANGE key start end`
    GetRange => "GETRANGE";
    /// `GETSET key value`
    GetSet => "GETSET";
    /// `GET key`
    Get => "GET";
    /// `INCR key`
    Incr => "INCR";
    /// `INCRBY key increment`
    IncrBy => "INCRBY";
    /// `INCRBYFLOAT key increment`
    IncrByFloat => "INCRBYFLOAT";
    /// `MOVE key db`
    MoveToDb => "MOVE";
    /// `PERSIST key`
    Persist => "PERSIST";
    /// `PEXPIRE key milliseconds`
    PExpire => "PEXPIRE";
    /// `PEXPIREAT key unix-milliseconds`
    PExpireAt => "PEXPIREAT";
    /// `PSETEX key milliseconds value`
    PSetEx => "PSETEX";
    /// `PTTL key`
    PTtl => "PTTL";
    /// `RENAME key newkey`
    Rename => "RENAME";
    /// `RENAMENX key newkey`
    RenameIfAbsent => "RENAMENX";
    /// `RESTORE key ttl serialized-value`
    Restore => "RESTORE";
    /// `SET key value`
    Set => "SET";
    /// `SETEX key seconds value`
    SetEx => "SETEX";
    /// `SETNX key value`
    SetIfAbsent => "SETNX";
    /// `SETRANGE key offset value`
    SetRange => "SETRANGE";
    /// `STRLEN key`
    Strlen => "STRLEN";
    /// `TTL key`
    Ttl => "TTL";
    /// `TYPE key`
    Type => "TYPE";

    // -- Hashes --------------------------------------------------------------

    /// `HDEL key field`
    HashDelete => "HDEL";
    /// `HGETALL key`
    HashGetAll => "HGETALL";
    /// `HGET key field`
    HashGet => "HGET";
    /// `HSETNX key field value`
    HashSetIfAbsent => "HSETNX";
    /// `HMSET key field value...`
    HashSetMany => "HMSET";
    /// `HINCRBY key field increment`
    HashIncrBy => "HINCRBY";
    /// `HINCRBYFLOAT key field increment`
    HashIncrByFloat => "HINCRBYFLOAT";
    /// `HKEYS key`
    HashKeys => "HKEYS";
    /// `HVALS key`
    HashValues => "HVALS";
    /// `HLEN key`
    HashLen => "HLEN";
    /// `HEXISTS key field`
    HashExists => "HEXISTS";

    // -- Lists ---------------------------------------------------------------

    /// `LINDEX key index`
    ListIndex => "LINDEX";
    /// `LRANGE key 0 -1`
    ListAll => "LRANGE" ["0", "-1"];
    /// `LRANGE key start stop`
    ListRange => "LRANGE";
    /// `LINSERT key BEFORE pivot value`
    ListInsertBefore => "LINSERT" ["BEFORE"];
    /// `LINSERT key AFTER pivot value`
    ListInsertAfter => "LINSERT" ["AFTER"];
    /// `LLEN key`
    ListLen => "LLEN";
    /// `LPOP key`
    ListPopFront => "LPOP";
    /// `LPUSH key value...`
    ListPushFront => "LPUSH";
    /// `LREM key count value`
    ListRemove => "LREM";
    /// `LSET key index value`
    ListSet => "LSET";
    /// `LTRIM key start stop`
    ListTrim => "LTRIM";
    /// `RPOP key`
    ListPopBack => "RPOP";
    /// `RPOPLPUSH key destination`
    ListPopBackPushFront => "RPOPLPUSH";
    /// `RPUSH key value...`
    ListPushBack => "RPUSH";

    // -- Sets ----------------------------------------------------------------

    /// `SMEMBERS key`
    SetMembers => "SMEMBERS";
    /// `SISMEMBER key member`
    SetIsMember => "SISMEMBER";
    /// `SADD key member...`
    SetAdd => "SADD";
    /// `SREM key member...`
    SetRemove => "SREM";
    /// `SCARD key`
    SetCard => "SCARD";
    /// `SDIFF key other...`
    SetDiff => "SDIFF";
    /// `SDIFFSTORE key source...`
    SetDiffStore => "SDIFFSTORE";
    /// `SINTER key other...`
    SetInter => "SINTER";
    /// `SINTERSTORE key source...`
    SetInterStore => "SINTERSTORE";
    /// `SUNION key other...`
    SetUnion => "SUNION";
    /// `SUNIONSTORE key source...`
    SetUnionStore => "SUNIONSTORE";
    /// `SMOVE key destination member`
    SetMove => "SMOVE";
    /// `SPOP key`
    SetPop => "SPOP";
    /// `SRANDMEMBER key count`
    SetRandomMember => "SRANDMEMBER";
}

impl Op {
    /// Assembles the command for this operation.
    pub fn to_command(self, key: Option<&str>, params: Vec<Arg>) -> Command {
        let command = Command::new(CommandName::from_static(self.command()))
            .args(self.fixed_args().iter().copied())
            .args(params);
        match key {
            Some(key) => command.with_key_spliced(key),
            None => command,
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.command())
    }
}
