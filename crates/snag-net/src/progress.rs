//! Observers for streamed byte counts.
//!
//! Transports report every chunk they forward to a [`Tracker`]. Trackers never
//! influence the transfer; rendering lives with the caller.

/// Receives byte counts as data arrives.
pub trait Tracker {
    fn step(&mut self, len: u64);
    fn finish(&mut self);
}

/// Creates a [`Tracker`] for one transfer.
///
/// `total` is the expected final size of the output (including any resumed
/// prefix), `position` the number of bytes already present.
pub trait TrackerFactory {
    fn start(&self, total: Option<u64>, position: u64) -> Box<dyn Tracker>;
}

/// Tracker that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Tracker for NoProgress {
    fn step(&mut self, _len: u64) {}
    fn finish(&mut self) {}
}

impl TrackerFactory for NoProgress {
    fn start(&self, _total: Option<u64>, _position: u64) -> Box<dyn Tracker> {
        Box::new(NoProgress)
    }
}

/// Tracker that only counts bytes. Useful for summaries and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteCounter {
    pub received: u64,
    pub finished: bool,
}

impl Tracker for ByteCounter {
    fn step(&mut self, len: u64) {
        self.received += len;
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}
