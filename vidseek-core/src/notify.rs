//! Post-search notification.
//!
//! Searching never has side effects. A caller that wants to act on a match
//! (open a viewer at the located timestamp, post a message, ...) does so
//! through a [`Notify`] implementation after receiving the result.

use std::path::Path;
use std::time::Duration;

use crate::error::Result;
use crate::search::MatchResult;

/// Side-effecting action taken on a located match.
pub trait Notify {
    fn notify(&self, location: &Path, start: Duration) -> Result<()>;
}

/// Does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotify;

impl Notify for NoopNotify {
    fn notify(&self, _location: &Path, _start: Duration) -> Result<()> {
        Ok(())
    }
}

/// Invoke `notifier` for `result` if the matched haystack has a known video.
///
/// Returns whether the notifier was called.
pub fn notify_match<N: Notify + ?Sized>(notifier: &N, result: &MatchResult, fps: f64) -> Result<bool> {
    match result.video.as_deref() {
        Some(video) => {
            notifier.notify(video, result.start_time(fps))?;
            Ok(true)
        }
        None => Ok(false),
    }
}
