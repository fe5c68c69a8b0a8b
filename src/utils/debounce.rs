use std::{future::pending, time::Duration};

use tokio::time::{sleep_until, Instant};

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Debouncer {
        Debouncer {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn touch(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    pub fn reset(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Pending forever while idle. Does not clear the deadline, call `reset` once it fires.
    pub async fn elapsed(&self) {
        match self.deadline {
            Some(deadline) => sleep_until(deadline).await,
            None => pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use test_log::test;
    use tokio::time::{timeout, Instant};

    use super::Debouncer;

    #[test(tokio::test(start_paused = true))]
    async fn idle_never_fires() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        assert!(timeout(Duration::from_secs(60), debouncer.elapsed())
            .await
            .is_err());
    }

    #[test(tokio::test(start_paused = true))]
    async fn touch_pushes_deadline_back() {
        let mut debouncer = Debouncer::new(Duration::from_millis(1_000));
        debouncer.touch();
        tokio::time::sleep(Duration::from_millis(600)).await;
        debouncer.touch();

        let started = Instant::now();
        debouncer.elapsed().await;
        let waited = started.elapsed();

        assert!(waited >= Duration::from_millis(1_000), "waited {waited:?}");
        assert!(waited < Duration::from_millis(1_010), "waited {waited:?}");
    }

    #[test(tokio::test(start_paused = true))]
    async fn reset_disarms() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        debouncer.touch();
        assert!(debouncer.is_pending());
        debouncer.reset();
        assert!(!debouncer.is_pending());
        assert!(timeout(Duration::from_secs(1), debouncer.elapsed())
            .await
            .is_err());
    }
}
