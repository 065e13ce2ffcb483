//! Shared test helpers: a scripted track provider and builders.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use blindbeat::provider::TrackProvider;
use blindbeat::round::Track;

/// Serves tracks from a queue: the head is "already playing", each skip
/// pops the next one. Counts skips and can be switched into failure mode.
pub struct MockProvider {
    queue: Mutex<VecDeque<Track>>,
    current: Mutex<Option<Track>>,
    pub skips: AtomicUsize,
    pub fail: AtomicBool,
}

impl MockProvider {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            queue: Mutex::new(tracks.into()),
            current: Mutex::new(None),
            skips: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl TrackProvider for MockProvider {
    async fn skip_to_next(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("provider offline");
        }
        self.skips.fetch_add(1, Ordering::SeqCst);
        *self.current.lock().unwrap() = self.queue.lock().unwrap().pop_front();
        Ok(())
    }

    async fn current_track(&self) -> Result<Option<Track>> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("provider offline");
        }
        let mut current = self.current.lock().unwrap();
        if current.is_none() {
            *current = self.queue.lock().unwrap().pop_front();
        }
        Ok(current.clone())
    }
}

pub fn track(title: &str, artists: &[&str]) -> Track {
    Track {
        title: title.to_string(),
        artists: artists.iter().map(|a| a.to_string()).collect(),
    }
}
