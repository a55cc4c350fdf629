mod collector;
mod machinery;
mod worker;

use std::num::{NonZeroU32, NonZeroUsize};

pub use collector::{ConcurrentCollector, HitCollector, SequentialCollector};
pub use machinery::{TraceProgress, trace_rays};

const DEFAULT_CHUNK_SIZE: NonZeroU32 = NonZeroU32::new(1024).unwrap();

#[derive(Copy, Clone, Debug)]
pub struct TraceSettings {
    /// Number of rays a worker takes at once.
    pub chunk_size: NonZeroU32,
    pub dispatch: Dispatch,
}

impl Default for TraceSettings {
    fn default() -> Self {
        TraceSettings {
            chunk_size: DEFAULT_CHUNK_SIZE,
            dispatch: Dispatch::Parallel(WorkerCount::Auto),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Everything runs on the calling thread.
    Sequential,
    Parallel(WorkerCount),
}

impl Dispatch {
    /// 0 threads means one per core, 1 runs sequentially.
    pub fn from_thread_count(threads: usize) -> Dispatch {
        match NonZeroUsize::new(threads) {
            None => Dispatch::Parallel(WorkerCount::Auto),
            Some(n) if n.get() == 1 => Dispatch::Sequential,
            Some(n) => Dispatch::Parallel(WorkerCount::Manual(n)),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WorkerCount {
    Auto,
    Manual(NonZeroUsize),
}
