//! Bounded tail of captured tool output.

use std::collections::VecDeque;

/// Number of trailing lines kept for failure diagnostics.
pub const DEFAULT_HISTORY_LINES: usize = 5;

/// Keeps the last `capacity` output lines of a run.
#[derive(Debug, Clone)]
pub struct OutputHistory {
    lines: VecDeque<String>,
    capacity: usize,
    total: u64,
}

impl Default for OutputHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_LINES)
    }
}

impl OutputHistory {
    /// Creates a history holding at most `capacity` lines (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
            total: 0,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
        self.total += 1;
    }

    /// The retained lines, oldest first.
    pub fn tail(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines seen over the whole run, including evicted ones.
    pub fn total_lines(&self) -> u64 {
        self.total
    }

    pub fn into_tail(self) -> Vec<String> {
        self.lines.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_last_lines() {
        let mut history = OutputHistory::default();
        for i in 0..8 {
            history.push(format!("line {}", i));
        }
        assert_eq!(
            history.tail(),
            vec!["line 3", "line 4", "line 5", "line 6", "line 7"]
        );
        assert_eq!(history.total_lines(), 8);
    }

    #[test]
    fn test_short_history_is_kept_whole() {
        let mut history = OutputHistory::with_capacity(5);
        assert!(history.is_empty());
        history.push("only");
        assert_eq!(history.into_tail(), vec!["only"]);
    }

    #[test]
    fn test_zero_capacity_still_keeps_one_line() {
        let mut history = OutputHistory::with_capacity(0);
        history.push("a");
        history.push("b");
        assert_eq!(history.tail(), vec!["b"]);
    }
}
