//! Sliding-window request throttle.
//!
//! At most `max_requests` calls per `window`. [`ThrottledMarketData`]
//! wraps any [`MarketDataPort`] so outbound data requests are throttled
//! without the accounting logic knowing.

use crate::domain::error::PapertraderError;
use crate::domain::market::MarketStatus;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::MarketDataPort;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};

const WAIT_STEP: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    requests: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            requests: VecDeque::new(),
        }
    }

    /// Claim a slot if one is free within the current window.
    pub fn try_acquire(&mut self) -> bool {
        let now = Instant::now();
        while let Some(&oldest) = self.requests.front() {
            if now.duration_since(oldest) > self.window {
                self.requests.pop_front();
            } else {
                break;
            }
        }

        if self.requests.len() < self.max_requests {
            self.requests.push_back(now);
            true
        } else {
            false
        }
    }

    /// Busy-wait in small increments until a slot frees.
    pub fn acquire(&mut self) {
        while !self.try_acquire() {
            thread::sleep(WAIT_STEP);
        }
    }
}

pub struct ThrottledMarketData<P> {
    inner: P,
    limiter: RefCell<RateLimiter>,
}

impl<P> ThrottledMarketData<P> {
    pub fn new(inner: P, max_requests: usize, window: Duration) -> Self {
        Self {
            inner,
            limiter: RefCell::new(RateLimiter::new(max_requests, window)),
        }
    }
}

impl<P: MarketDataPort> MarketDataPort for ThrottledMarketData<P> {
    fn fetch_history(
        &self,
        ticker: &str,
        period: &str,
        interval: &str,
    ) -> Result<Vec<OhlcvBar>, PapertraderError> {
        self.limiter.borrow_mut().acquire();
        self.inner.fetch_history(ticker, period, interval)
    }

    fn market_status(&self, ticker: &str) -> MarketStatus {
        self.limiter.borrow_mut().acquire();
        self.inner.market_status(ticker)
    }
}
