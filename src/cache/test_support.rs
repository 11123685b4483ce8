//! Scripted fetcher used by the unit and property tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::cache::Fetcher;
use crate::error::FetchError;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Outcome {
    Ok(&'static str),
    Fail,
    Panic,
}

/// Replays a fixed list of outcomes, then repeats `fallback` forever.
pub(crate) struct ScriptedFetcher {
    script: Mutex<VecDeque<Outcome>>,
    fallback: Outcome,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub(crate) fn new(script: Vec<Outcome>, fallback: Outcome) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn always(outcome: Outcome) -> Self {
        Self::new(Vec::new(), outcome)
    }

    /// Makes every fetch take `delay` before it resolves.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, _identifier: &str) -> Result<Bytes, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match outcome {
            Outcome::Ok(body) => Ok(Bytes::from_static(body.as_bytes())),
            Outcome::Fail => Err(FetchError::Other("scripted failure".to_string())),
            Outcome::Panic => panic!("scripted fetcher panic"),
        }
    }
}
