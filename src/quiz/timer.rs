// src/quiz/timer.rs

use std::fmt;

/// Remaining seconds at which the first warning fires.
pub const FIVE_MINUTE_MARK: i64 = 300;
/// Remaining seconds at which the urgent warning fires.
pub const ONE_MINUTE_MARK: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWarning {
    FiveMinutesLeft,
    OneMinuteLeft,
}

impl TimeWarning {
    pub fn severity(&self) -> Severity {
        match self {
            TimeWarning::FiveMinutesLeft => Severity::Warning,
            TimeWarning::OneMinuteLeft => Severity::Urgent,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            TimeWarning::FiveMinutesLeft => "5 minutes remaining!",
            TimeWarning::OneMinuteLeft => "Only 1 minute left!",
        }
    }
}

/// What a single tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Warning(TimeWarning),
    /// Time is up. Emitted once; the countdown is stopped afterwards.
    Expired,
}

/// Exam countdown advanced by one second per [`Countdown::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining: i64,
    stopped: bool,
}

impl Countdown {
    pub fn from_minutes(minutes: u32) -> Self {
        Self {
            remaining: i64::from(minutes) * 60,
            stopped: false,
        }
    }

    pub fn tick(&mut self) -> Option<TimerEvent> {
        if self.stopped {
            return None;
        }

        self.remaining -= 1;
        if self.remaining <= 0 {
            self.remaining = 0;
            self.stopped = true;
            return Some(TimerEvent::Expired);
        }

        match self.remaining {
            FIVE_MINUTE_MARK => Some(TimerEvent::Warning(TimeWarning::FiveMinutesLeft)),
            ONE_MINUTE_MARK => Some(TimerEvent::Warning(TimeWarning::OneMinuteLeft)),
            _ => None,
        }
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining.max(0) as u32
    }

    pub fn is_expired(&self) -> bool {
        self.stopped
    }

    pub fn has_time_left(&self) -> bool {
        !self.stopped && self.remaining > 0
    }
}

/// `M:SS`, never negative.
impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.remaining_seconds();
        write!(f, "{}:{:02}", secs / 60, secs % 60)
    }
}
