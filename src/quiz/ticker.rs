// src/quiz/ticker.rs

use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, interval_at},
};

/// Fixed-period tick source for the exam clock.
///
/// Ticks arrive on the receiver returned by [`Ticker::start`]. Dropping the
/// `Ticker` aborts the task, so whichever way the exam view exits, nothing
/// keeps ticking into a dead session.
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    pub fn start(period: Duration) -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    tracing::debug!("tick receiver gone, stopping ticker");
                    break;
                }
            }
        });
        (Self { handle }, rx)
    }

    /// One tick per second.
    pub fn every_second() -> (Self, mpsc::Receiver<()>) {
        Self::start(Duration::from_secs(1))
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let (ticker, mut rx) = Ticker::every_second();
        let start = Instant::now();
        for _ in 0..3 {
            rx.recv().await.unwrap();
        }
        assert_eq!(start.elapsed(), Duration::from_secs(3));
        assert!(ticker.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_ticker_closes_the_stream() {
        let (ticker, mut rx) = Ticker::every_second();
        rx.recv().await.unwrap();
        drop(ticker);
        // the buffer may still hold a tick; after that the channel must close
        while rx.recv().await.is_some() {}
    }
}
