//! Daily dark-window membership.
//!
//! A window is described by two times of day. When `end` is not after
//! `start` the window wraps past midnight; `start == end` is the degenerate
//! wrap that covers the whole day except the boundary instant itself.
//! Both boundaries are exclusive in every mode.

use chrono::NaiveTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    SameDay,
    CrossesMidnight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DarkWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl DarkWindow {
    pub const fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub const fn start(&self) -> NaiveTime {
        self.start
    }

    pub const fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn kind(&self) -> WindowKind {
        if self.end <= self.start {
            WindowKind::CrossesMidnight
        } else {
            WindowKind::SameDay
        }
    }

    pub fn contains(&self, now: NaiveTime) -> bool {
        match self.kind() {
            WindowKind::SameDay => self.start < now && now < self.end,
            WindowKind::CrossesMidnight => now > self.start || now < self.end,
        }
    }
}

/// Whether `now` falls strictly inside the dark window `start..end`.
pub fn is_dark(start: NaiveTime, end: NaiveTime, now: NaiveTime) -> bool {
    DarkWindow::new(start, end).contains(now)
}
