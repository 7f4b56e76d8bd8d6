//! Slideshow over a result set.
//!
//! Playback counts down from `i` to 1 and shows dropdown index `total - i` at
//! each step, so a full run (`i = total`) walks the queries front to back and
//! ends on the last one. The driver awaits each render (which resolves when the
//! chart's animation finishes) before moving on.

use std::future::Future;

/// Index sequence of one playback run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playback {
    total: usize,
    remaining: usize,
}

impl Playback {
    /// Start a countdown at `countdown`, clamped to `total` so indexes stay in bounds.
    pub fn new(total: usize, countdown: usize) -> Self {
        Self {
            total,
            remaining: countdown.min(total),
        }
    }

    /// Every query, first to last.
    pub fn full(total: usize) -> Self {
        Self::new(total, total)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Current countdown value; 0 is the terminal state.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_done(&self) -> bool {
        self.remaining == 0
    }
}

impl Iterator for Playback {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.total - self.remaining;
        self.remaining -= 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Playback {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEnd {
    /// Every step rendered.
    Completed(usize),
    /// Stopped early; carries the number of charts rendered.
    Cancelled(usize),
}

impl PlaybackEnd {
    pub fn rendered(self) -> usize {
        match self {
            PlaybackEnd::Completed(n) | PlaybackEnd::Cancelled(n) => n,
        }
    }
}

/// Generation counter for playback runs.
///
/// Starting a run or cancelling invalidates every earlier run. The web app
/// cancels on a new submission and on a manual dropdown pick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackRuns {
    current: u64,
}

impl PlaybackRuns {
    /// Begin a new run and return its id.
    pub fn start(&mut self) -> u64 {
        self.current += 1;
        self.current
    }

    pub fn cancel(&mut self) {
        self.current += 1;
    }

    pub fn is_current(&self, run: u64) -> bool {
        self.current == run
    }
}

/// Render every step, awaiting each one before the next.
pub async fn drive<F, Fut, E>(playback: Playback, render: F) -> Result<usize, E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    drive_while(playback, || true, render)
        .await
        .map(PlaybackEnd::rendered)
}

/// Like [`drive`], but checks `keep_going` before every step.
pub async fn drive_while<F, Fut, E>(
    playback: Playback,
    keep_going: impl Fn() -> bool,
    mut render: F,
) -> Result<PlaybackEnd, E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let mut rendered = 0usize;
    for index in playback {
        if !keep_going() {
            tracing::debug!(rendered, "playback cancelled");
            return Ok(PlaybackEnd::Cancelled(rendered));
        }
        render(index).await?;
        rendered += 1;
    }
    Ok(PlaybackEnd::Completed(rendered))
}
