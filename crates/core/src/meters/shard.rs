use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_SHARD: AtomicU32 = AtomicU32::new(0);

thread_local! {
    static THREAD_SHARD: ShardHandle = ShardHandle::next();
}

/// Identity of a writer within a histogram bin.
///
/// Each OS thread gets one handle on first use via [`ShardHandle::current`].
/// Async tasks that hop between worker threads can take a dedicated handle
/// with [`ShardHandle::next`] and pass it to the `*_to` push methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShardHandle(u32);

impl ShardHandle {
    /// Allocate a fresh handle.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_SHARD.fetch_add(1, Ordering::Relaxed))
    }

    /// Handle bound to the calling thread.
    #[must_use]
    pub fn current() -> Self {
        THREAD_SHARD.with(|shard| *shard)
    }

    /// Raw handle number.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}
