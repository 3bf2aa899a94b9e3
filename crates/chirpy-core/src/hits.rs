//! Page hit counter

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide count of file server hits
///
/// Increments are relaxed; the value is only ever read for display.
#[derive(Debug, Default)]
pub struct HitCounter {
    hits: AtomicU64,
}

impl HitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one hit
    pub fn increment(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Zero the counter, returning the count it held
    pub fn reset(&self) -> u64 {
        self.hits.swap(0, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_increment_and_reset() {
        let counter = HitCounter::new();
        assert_eq!(counter.get(), 0);

        counter.increment();
        counter.increment();
        assert_eq!(counter.get(), 2);

        assert_eq!(counter.reset(), 2);
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_concurrent_increments() {
        let counter = Arc::new(HitCounter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        counter.increment();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(counter.get(), 8000);
    }
}
