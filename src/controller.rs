//! Envelope interaction state machine.
//!
//! Pure reducer over `(state, Command) -> Vec<Effect>`: every user gesture
//! and timer expiry comes in as a [`Command`], and everything with a side
//! effect (rendering, particle work, timer scheduling) goes back out as an
//! [`Effect`] for the adapter in `app.rs` to execute. This keeps the whole
//! open/reset/close choreography testable without a terminal or a clock.

use std::time::Duration;

/// Delay between the envelope opening and the letter overlay appearing.
pub const LETTER_REVEAL_DELAY: Duration = Duration::from_millis(700);

/// How long the close animation of the rendering layer takes. The replay
/// reopen must wait this long or the two animations visually desync, so
/// this constant has to match the surface's transition duration.
pub const ENVELOPE_CLOSE_DURATION: Duration = Duration::from_millis(520);

/// Backstop for particle cleanup when per-particle expiry never runs
/// (suspended process, interrupted animation).
pub const BURST_CLEAR_BACKSTOP: Duration = Duration::from_millis(6200);

/// One-shot timer kinds owned by the registry. At most one live instance
/// of each kind exists at any moment; scheduling replaces any pending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    BurstClear,
    LetterReveal,
    ReplayReopen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Closed,
    Open,
    /// Transient close-then-reopen window. Always resolves back to `Open`
    /// when the reopen timer fires; doubles as the re-entrancy guard for
    /// both `Open` and `Reset`.
    Replaying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Open { forced: bool },
    Reset,
    Close,
    TimerFired(TimerKind),
}

/// Side effects requested by the reducer, executed by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    SetEnvelopeOpen(bool),
    ShowLetter,
    HideLetter,
    EmitBurst,
    ClearBurst,
    Schedule(TimerKind, Duration),
    Cancel(TimerKind),
    SetReplayEnabled(bool),
}

pub struct EnvelopeController {
    state: EnvelopeState,
    /// Shared letters have no "randomize again" semantics, so a controller
    /// built for remote content rejects `Reset` outright.
    replay_suppressed: bool,
}

impl EnvelopeController {
    pub fn new(replay_suppressed: bool) -> Self {
        Self {
            state: EnvelopeState::Closed,
            replay_suppressed,
        }
    }

    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    pub fn is_replaying(&self) -> bool {
        self.state == EnvelopeState::Replaying
    }

    pub fn handle(&mut self, command: Command) -> Vec<Effect> {
        match command {
            Command::Open { forced } => self.open(forced),
            Command::Reset => self.reset(),
            Command::Close => self.close(),
            Command::TimerFired(kind) => self.timer_fired(kind),
        }
    }

    fn open(&mut self, forced: bool) -> Vec<Effect> {
        if !forced && self.state != EnvelopeState::Closed {
            // Mid-replay or already open; ignore the gesture.
            return Vec::new();
        }

        self.state = EnvelopeState::Open;
        vec![
            Effect::SetEnvelopeOpen(true),
            Effect::EmitBurst,
            Effect::Schedule(TimerKind::BurstClear, BURST_CLEAR_BACKSTOP),
            Effect::Schedule(TimerKind::LetterReveal, LETTER_REVEAL_DELAY),
        ]
    }

    fn reset(&mut self) -> Vec<Effect> {
        if self.state == EnvelopeState::Replaying || self.replay_suppressed {
            return Vec::new();
        }

        self.state = EnvelopeState::Replaying;
        vec![
            Effect::SetReplayEnabled(false),
            Effect::HideLetter,
            Effect::Cancel(TimerKind::LetterReveal),
            Effect::Cancel(TimerKind::ReplayReopen),
            Effect::SetEnvelopeOpen(false),
            Effect::ClearBurst,
            Effect::Cancel(TimerKind::BurstClear),
            Effect::Schedule(TimerKind::ReplayReopen, ENVELOPE_CLOSE_DURATION),
        ]
    }

    fn close(&mut self) -> Vec<Effect> {
        self.state = EnvelopeState::Closed;
        vec![
            Effect::HideLetter,
            Effect::Cancel(TimerKind::LetterReveal),
            Effect::Cancel(TimerKind::ReplayReopen),
            Effect::SetReplayEnabled(true),
            Effect::SetEnvelopeOpen(false),
            Effect::ClearBurst,
            Effect::Cancel(TimerKind::BurstClear),
        ]
    }

    fn timer_fired(&mut self, kind: TimerKind) -> Vec<Effect> {
        match kind {
            TimerKind::LetterReveal => vec![Effect::ShowLetter],
            TimerKind::BurstClear => vec![Effect::ClearBurst],
            TimerKind::ReplayReopen => {
                // Forced open resolves the replay window, then the reset
                // affordance comes back.
                let mut effects = self.open(true);
                effects.push(Effect::SetReplayEnabled(true));
                effects
            }
        }
    }
}
