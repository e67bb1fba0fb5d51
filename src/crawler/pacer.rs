//! Minimum spacing between successive requests

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum interval between the starts of two requests
///
/// Every request of the run goes through one pacer, retries and robots.txt
/// fetches included.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Raises the interval to `delay` if it is longer (robots.txt `Crawl-delay`)
    ///
    /// Returns true if the interval changed.
    pub fn raise_to(&mut self, delay: Duration) -> bool {
        if delay > self.interval {
            self.interval = delay;
            true
        } else {
            false
        }
    }

    /// Waits until a request may be sent and records it as sent
    ///
    /// The first request of a run never waits.
    pub async fn wait_turn(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                let wait = self.interval - elapsed;
                tracing::trace!("Pacing: waiting {:?} before next request", wait);
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_request_does_not_wait() {
        let pacer = Pacer::new(Duration::from_secs(60));
        let start = Instant::now();
        pacer.wait_turn().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_successive_requests_are_spaced() {
        let pacer = Pacer::new(Duration::from_millis(50));
        let start = Instant::now();
        pacer.wait_turn().await;
        pacer.wait_turn().await;
        pacer.wait_turn().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[test]
    fn test_raise_to_only_increases() {
        let mut pacer = Pacer::new(Duration::from_secs(3));
        assert!(!pacer.raise_to(Duration::from_secs(1)));
        assert_eq!(pacer.interval(), Duration::from_secs(3));

        assert!(pacer.raise_to(Duration::from_secs(10)));
        assert_eq!(pacer.interval(), Duration::from_secs(10));
    }
}
