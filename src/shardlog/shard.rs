// src/shardlog/shard.rs

//! Per-thread shard identities.

use std::collections::HashMap;
use std::fmt;
use std::thread::ThreadId;

/// Stable log-attribution identity of one thread.
///
/// Shard 0 is the first thread that ever logged (normally the one driving
/// the run) and renders as `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Shard(u64);

impl Shard {
    pub const MAIN: Shard = Shard(0);

    pub fn id(self) -> u64 {
        self.0
    }

    pub fn is_main(self) -> bool {
        self == Self::MAIN
    }
}

impl fmt::Display for Shard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_main() {
            f.write_str("shard-main")
        } else {
            write!(f, "shard-{}", self.0)
        }
    }
}

/// Assignment table from threads to shards.
///
/// Ids are handed out in first-log order and never reused, even after the
/// owning thread has exited.
#[derive(Debug, Default)]
pub struct ShardTable {
    shards: HashMap<ThreadId, Shard>,
    next_id: u64,
}

impl ShardTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shard of `thread`, assigning the next id on first sight.
    pub fn shard_for(&mut self, thread: ThreadId) -> Shard {
        if let Some(shard) = self.shards.get(&thread) {
            return *shard;
        }

        let shard = Shard(self.next_id);
        self.next_id += 1;
        self.shards.insert(thread, shard);
        shard
    }

    /// Number of shards handed out so far.
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }
}
