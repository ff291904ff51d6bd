//! Lua scripts behind the atomic queue operations.
//!
//! All scripts take `KEYS[1]` = index (ZSET) and `KEYS[2]` = store (HASH).

use redis::Script;

/// ARGV: repeated `id, score, payload` triples.
/// Returns the number of ids newly added to the index.
const PUSH: &str = r#"
local added = 0
for i = 1, #ARGV, 3 do
    added = added + redis.call('ZADD', KEYS[1], ARGV[i + 1], ARGV[i])
    redis.call('HSET', KEYS[2], ARGV[i], ARGV[i + 2])
end
return added
"#;

/// ARGV[1] = max score, ARGV[2] = limit.
/// Returns `{ids, values}`; a value missing from the store comes back as nil.
const POP: &str = r#"
local ids = redis.call('ZRANGEBYSCORE', KEYS[1], '-inf', ARGV[1], 'LIMIT', 0, ARGV[2])
local values = {}
for i, id in ipairs(ids) do
    values[i] = redis.call('HGET', KEYS[2], id)
    redis.call('ZREM', KEYS[1], id)
    redis.call('HDEL', KEYS[2], id)
end
return {ids, values}
"#;

/// ARGV: ids. Returns how many of them were in the index.
const REMOVE: &str = r#"
local removed = 0
for _, id in ipairs(ARGV) do
    removed = removed + redis.call('ZREM', KEYS[1], id)
    redis.call('HDEL', KEYS[2], id)
end
return removed
"#;

/// Loaded scripts; each is sent by SHA and reloaded if the server lost it.
pub(crate) struct Scripts {
    pub(crate) push: Script,
    pub(crate) pop: Script,
    pub(crate) remove: Script,
}

impl Scripts {
    pub(crate) fn new() -> Self {
        Self {
            push: Script::new(PUSH),
            pop: Script::new(POP),
            remove: Script::new(REMOVE),
        }
    }
}
