//! Log panel viewport with tail-following.
//!
//! The viewport jumps to the bottom only when the log sequence grows (or,
//! in a full window, when its final line changes). Re-rendering the same
//! logs leaves the position alone, so a reader who scrolled up is not
//! yanked back on every frame.

/// Visible window over the log lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogViewport {
    height: usize,
    top: usize,
    seen_len: usize,
    seen_last: Option<String>,
}

impl LogViewport {
    /// A viewport showing `height` lines (at least one).
    pub fn new(height: usize) -> Self {
        Self {
            height: height.max(1),
            top: 0,
            seen_len: 0,
            seen_last: None,
        }
    }

    /// Lines shown at once.
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Index of the first visible line.
    pub const fn top(&self) -> usize {
        self.top
    }

    /// Observe the rendered logs and follow the tail if they grew.
    ///
    /// Returns `true` when the viewport was moved to the bottom.
    pub fn sync<S: AsRef<str>>(&mut self, logs: &[S]) -> bool {
        let last = logs.last().map(AsRef::as_ref);
        let grew = logs.len() > self.seen_len;
        let slid = logs.len() == self.seen_len && last != self.seen_last.as_deref();

        self.seen_len = logs.len();
        self.seen_last = last.map(ToOwned::to_owned);

        if grew || slid {
            self.top = self.bottom(logs.len());
            true
        } else {
            self.top = self.top.min(self.bottom(logs.len()));
            false
        }
    }

    /// Move the viewport so `top` is the first visible line.
    pub fn scroll_to(&mut self, top: usize) {
        self.top = top.min(self.bottom(self.seen_len));
    }

    /// The slice of `logs` currently visible.
    pub fn visible<'a, T>(&self, logs: &'a [T]) -> &'a [T] {
        let end = self.top.saturating_add(self.height).min(logs.len());
        logs.get(self.top.min(end)..end).unwrap_or_default()
    }

    const fn bottom(&self, len: usize) -> usize {
        len.saturating_sub(self.height)
    }
}
