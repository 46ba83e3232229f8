//! Cross-Thread Log Collector
//!
//! An unbounded in-memory append log, read once per frame by the thread
//! that drives rendering.
//!
//! # Architecture
//!
//! ```text
//!   worker threads                       privileged (frame) thread
//!  ┌──────────┐ Logger::append          ┌──────────────────────────┐
//!  │ loader 1 ├──────┐                  │ LogCollector             │
//!  └──────────┘      │  lock            │   append() ──► entries   │
//!  ┌──────────┐      ▼                  │                  ▲       │
//!  │ loader 2 ├──► pending (Mutex) ─────┼── merge() ───────┘       │
//!  └──────────┘                         │   snapshot() ──► &[..]   │
//!                                       └──────────────────────────┘
//! ```
//!
//! The privileged thread owns the [`LogCollector`] itself. The type is
//! neither `Send` nor `Sync`, so its main buffer has exactly one writer and
//! needs no lock. Every other thread gets a [`Logger`] handle that appends
//! to the shared pending buffer under a mutex. [`LogCollector::merge`] is
//! the only point where pending entries become visible in the snapshot.
//!
//! # Ordering
//!
//! - Entries from the privileged thread keep their call order, whether
//!   they go through the collector or through a `Logger` handle (for
//!   example a tracing layer). A direct append merges first whenever the
//!   privileged thread itself has entries pending.
//! - Pending entries keep lock-acquisition order and land after every
//!   entry that was already merged.
//! - Relative order of another thread's pending entry and a privileged
//!   entry appended before the same merge is unspecified.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use crate::rich_text::{self, RichText};

// ============================================================================
// Entries
// ============================================================================

/// One immutable log line, possibly carrying color escapes
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LogEntry {
    text: Box<[u8]>,
}

impl LogEntry {
    /// Raw bytes, color escapes included
    pub fn as_bytes(&self) -> &[u8] {
        &self.text
    }

    /// Bytes as text; color escapes are kept, invalid UTF-8 replaced
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.text)
    }

    /// Visible text with color escapes removed
    pub fn plain_text(&self) -> String {
        rich_text::plain_text(&self.text)
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Debug for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogEntry({:?})", self.to_string_lossy())
    }
}

impl From<&str> for LogEntry {
    fn from(text: &str) -> Self {
        Self {
            text: text.as_bytes().into(),
        }
    }
}

impl From<String> for LogEntry {
    fn from(text: String) -> Self {
        Self {
            text: text.into_bytes().into_boxed_slice(),
        }
    }
}

impl From<Vec<u8>> for LogEntry {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            text: bytes.into_boxed_slice(),
        }
    }
}

impl From<RichText> for LogEntry {
    fn from(text: RichText) -> Self {
        Self::from(text.into_bytes())
    }
}

impl From<&RichText> for LogEntry {
    fn from(text: &RichText) -> Self {
        Self {
            text: text.as_bytes().into(),
        }
    }
}

// ============================================================================
// Shared pending buffer
// ============================================================================

#[derive(Debug)]
struct SharedLog {
    /// Entries appended through `Logger` handles, waiting for the next merge
    pending: Mutex<Vec<LogEntry>>,
    /// Length of `pending`, written under the lock; lets an idle merge
    /// skip locking
    pending_len: AtomicUsize,
    /// The privileged thread
    owner: ThreadId,
    /// `pending` holds an entry the privileged thread appended itself
    owner_pending: AtomicBool,
    /// Set at shutdown; later appends are dropped
    closed: AtomicBool,
}

impl SharedLog {
    fn new(owner: ThreadId) -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            pending_len: AtomicUsize::new(0),
            owner,
            owner_pending: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }
}

// ============================================================================
// Privileged owner
// ============================================================================

/// The privileged thread's end of the log
///
/// Created once by [`LogCollector::init`] on the thread that drives
/// frames. Pass [`Logger`] handles from [`logger`](Self::logger) to any
/// other thread that needs to log.
pub struct LogCollector {
    entries: Vec<LogEntry>,
    shared: Arc<SharedLog>,
    owner: ThreadId,
    // Pins the collector to the thread that created it
    _not_send: PhantomData<*const ()>,
}

impl LogCollector {
    /// Start collecting, making the calling thread the privileged writer
    pub fn init() -> Self {
        let owner = thread::current().id();
        Self {
            entries: Vec::new(),
            shared: Arc::new(SharedLog::new(owner)),
            owner,
            _not_send: PhantomData,
        }
    }

    /// The thread that created this collector
    pub fn privileged_thread(&self) -> ThreadId {
        self.owner
    }

    /// Handle for appending from other threads
    pub fn logger(&self) -> Logger {
        Logger {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Append from the privileged thread
    ///
    /// Locks only when this thread also logged through a [`Logger`] since
    /// the last merge; those entries are merged first to keep call order.
    pub fn append(&mut self, entry: impl Into<LogEntry>) {
        if self.shared.owner_pending.load(Ordering::Acquire) {
            self.merge();
        }
        self.entries.push(entry.into());
    }

    /// Move pending cross-thread entries onto the end of the snapshot
    ///
    /// Returns the number of entries moved. A merge with nothing pending
    /// does not take the lock.
    pub fn merge(&mut self) -> usize {
        if self.shared.pending_len.load(Ordering::Acquire) == 0 {
            return 0;
        }

        let mut pending = self.shared.pending.lock();
        let moved = pending.len();

        self.entries.append(&mut pending);
        self.shared.pending_len.store(0, Ordering::Release);
        self.shared.owner_pending.store(false, Ordering::Release);

        moved
    }

    /// All merged entries in order
    ///
    /// The borrow ends before the next `append`, `merge` or `clear`.
    pub fn snapshot(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries appended by other threads but not merged yet (a hint)
    pub fn pending_count(&self) -> usize {
        self.shared.pending_len.load(Ordering::Acquire)
    }

    /// Merge, then release every entry
    pub fn clear(&mut self) {
        self.merge();
        self.entries.clear();
    }

    /// Stop accepting cross-thread entries
    ///
    /// Entries still held by the collector are handed back rather than
    /// dropped; call [`clear`](Self::clear) first to release them.
    /// Appends through outstanding `Logger` handles are silently dropped
    /// from here on.
    pub fn shutdown(mut self) -> Vec<LogEntry> {
        self.shared.closed.store(true, Ordering::Release);

        let remaining = std::mem::take(&mut self.entries);
        tracing::debug!(remaining = remaining.len(), "Log collector shut down");
        remaining
    }
}

impl Drop for LogCollector {
    fn drop(&mut self) {
        self.shared.closed.store(true, Ordering::Release);
    }
}

impl fmt::Debug for LogCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogCollector")
            .field("entries", &self.entries.len())
            .field("pending", &self.pending_count())
            .field("owner", &self.owner)
            .finish()
    }
}

// ============================================================================
// Cross-thread handle
// ============================================================================

/// Cloneable handle for logging from any thread
#[derive(Clone, Debug)]
pub struct Logger {
    shared: Arc<SharedLog>,
}

impl Logger {
    /// Append under the lock; visible to the privileged thread after its
    /// next merge
    pub fn append(&self, entry: impl Into<LogEntry>) {
        if self.is_closed() {
            return;
        }

        let entry = entry.into();
        let from_owner = thread::current().id() == self.shared.owner;

        let mut pending = self.shared.pending.lock();
        pending.push(entry);
        if from_owner {
            self.shared.owner_pending.store(true, Ordering::Release);
        }
        self.shared.pending_len.store(pending.len(), Ordering::Release);
    }

    /// Whether the collector has shut down
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::color::Rgba;
    use crate::logf;

    fn texts(log: &LogCollector) -> Vec<String> {
        log.snapshot()
            .iter()
            .map(|e| e.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_privileged_append_is_immediately_visible() {
        let mut log = LogCollector::init();
        log.append("one");
        log.append(String::from("two"));

        assert_eq!(texts(&log), vec!["one", "two"]);
        assert_eq!(log.privileged_thread(), thread::current().id());
    }

    #[test]
    fn test_logger_entries_wait_for_merge() {
        let mut log = LogCollector::init();
        let logger = log.logger();

        logger.append("from worker");
        assert!(log.is_empty());
        assert_eq!(log.pending_count(), 1);

        assert_eq!(log.merge(), 1);
        assert_eq!(texts(&log), vec!["from worker"]);
        assert_eq!(log.pending_count(), 0);
    }

    #[test]
    fn test_second_merge_is_noop() {
        let mut log = LogCollector::init();
        log.logger().append("a");

        assert_eq!(log.merge(), 1);
        assert_eq!(log.merge(), 0);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_merge_appends_after_existing_entries() {
        let mut log = LogCollector::init();
        let logger = log.logger();

        log.append("main 1");
        logger.append("bg 1");
        logger.append("bg 2");
        log.merge();
        log.append("main 2");

        assert_eq!(texts(&log), vec!["main 1", "bg 1", "bg 2", "main 2"]);
    }

    #[test]
    fn test_privileged_logger_entries_keep_call_order() {
        let mut log = LogCollector::init();
        let logger = log.logger();

        logger.append("first");
        log.append("second");
        logger.append("third");
        log.append("fourth");
        logf!(logger, "fifth");
        log.merge();

        assert_eq!(texts(&log), vec!["first", "second", "third", "fourth", "fifth"]);
        assert_eq!(log.merge(), 0);
    }

    #[test]
    fn test_worker_entries_do_not_force_merge() {
        let mut log = LogCollector::init();
        let logger = log.logger();
        thread::spawn(move || logger.append("worker")).join().unwrap();

        log.append("main");
        assert_eq!(texts(&log), vec!["main"]);
        assert_eq!(log.pending_count(), 1);

        log.merge();
        assert_eq!(texts(&log), vec!["main", "worker"]);
    }

    #[test]
    fn test_clear_merges_first() {
        let mut log = LogCollector::init();
        log.logger().append("pending");
        log.append("merged");

        log.clear();
        assert!(log.is_empty());

        // The pending entry was consumed by clear, not left behind
        assert_eq!(log.merge(), 0);
    }

    #[test]
    fn test_shutdown_returns_entries_and_closes() {
        let mut log = LogCollector::init();
        let logger = log.logger();
        log.append("kept");

        let remaining = log.shutdown();
        assert_eq!(remaining.len(), 1);
        assert!(logger.is_closed());

        // Dropped silently
        logger.append("late");
    }

    #[test]
    fn test_drop_closes_loggers() {
        let log = LogCollector::init();
        let logger = log.logger();
        drop(log);
        assert!(logger.is_closed());
    }

    #[test]
    fn test_rich_entries_keep_escape_bytes() {
        let mut log = LogCollector::init();
        let mut text = RichText::from("status: ");
        text.push_colored(Rgba::new(0, 255, 0, 255), "ok");

        log.append(text.clone());

        assert_eq!(log.snapshot()[0].as_bytes(), text.as_bytes());
        assert_eq!(log.snapshot()[0].plain_text(), "status: ok");
    }

    #[test]
    fn test_logf_drops_failed_format() {
        struct Broken;
        impl fmt::Display for Broken {
            fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
                Err(fmt::Error)
            }
        }

        let mut log = LogCollector::init();
        logf!(log, "count = {}", 3);
        logf!(log, "broken = {}", Broken);

        let logger = log.logger();
        logf!(logger, "worker {}", 7);
        log.merge();

        assert_eq!(texts(&log), vec!["count = 3", "worker 7"]);
    }
}
