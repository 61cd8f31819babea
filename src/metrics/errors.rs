use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;

#[derive(Debug)]
struct ErrorEntry {
    count: AtomicU64,
    first_seen: u64,
}

/// Concurrent frequency table of error messages.
///
/// Repeated messages are counted under the read lock with an atomic
/// increment; the write lock is only taken the first time a message shows up.
#[derive(Debug, Default)]
pub struct ErrorMap {
    entries: RwLock<HashMap<String, ErrorEntry>>,
}

impl ErrorMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<E>(&self, err: &E)
    where
        E: fmt::Display + ?Sized,
    {
        self.add_message(&err.to_string());
    }

    pub fn add_message(&self, message: &str) {
        {
            let entries = self.entries.read();
            if let Some(entry) = entries.get(message) {
                entry.count.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }

        let mut entries = self.entries.write();
        let first_seen = u64::try_from(entries.len()).unwrap_or(u64::MAX);
        // Another writer may have inserted the message between the two locks.
        entries
            .entry(message.to_owned())
            .or_insert_with(|| ErrorEntry {
                count: AtomicU64::new(0),
                first_seen,
            })
            .count
            .fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn get<E>(&self, err: &E) -> u64
    where
        E: fmt::Display + ?Sized,
    {
        self.get_message(&err.to_string())
    }

    #[must_use]
    pub fn get_message(&self, message: &str) -> u64 {
        self.entries
            .read()
            .get(message)
            .map_or(0, |entry| entry.count.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn sum(&self) -> u64 {
        self.entries
            .read()
            .values()
            .map(|entry| entry.count.load(Ordering::Relaxed))
            .fold(0_u64, u64::saturating_add)
    }

    /// Messages ordered by descending count. Equal counts keep the order in
    /// which the messages were first seen.
    #[must_use]
    pub fn by_frequency(&self) -> Vec<ErrorCount> {
        let mut ranked: Vec<(u64, ErrorCount)> = self
            .entries
            .read()
            .iter()
            .map(|(message, entry)| {
                (
                    entry.first_seen,
                    ErrorCount {
                        description: message.clone(),
                        count: entry.count.load(Ordering::Relaxed),
                    },
                )
            })
            .collect();
        ranked.sort_by(|(left_seen, left), (right_seen, right)| {
            right
                .count
                .cmp(&left.count)
                .then_with(|| left_seen.cmp(right_seen))
        });
        ranked.into_iter().map(|(_, error)| error).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorCount {
    pub description: String,
    pub count: u64,
}

impl fmt::Display for ErrorCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}:{}>", self.description, self.count)
    }
}
