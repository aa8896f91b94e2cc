//! The single countdown a session may have running.
//!
//! The countdown is driven by whole-second ticks from the front end rather
//! than a background thread, so expiry always happens on the caller's
//! thread in between user actions.

/// What should happen when the countdown reaches zero
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerPurpose {
    /// End the current rest period
    Rest,
    /// Finish the current set of a timed exercise
    Exercise,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Countdown {
    purpose: TimerPurpose,
    duration: u32,
    remaining: u32,
}

impl Countdown {
    pub fn new(purpose: TimerPurpose, seconds: u32) -> Self {
        Self {
            purpose,
            duration: seconds,
            remaining: seconds,
        }
    }

    pub fn purpose(&self) -> TimerPurpose {
        self.purpose
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Count down one second. Returns true on the tick that reaches zero.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }
}
