//! Event-loop adapter around the envelope controller.
//!
//! Owns every piece of mutable state: the reducer, the timer registry,
//! both particle layers, and the surface. All mutation happens inside
//! `run`'s single-threaded loop; gestures and timer expiries arrive as
//! messages and leave as executed effects.

use crate::controller::{Command, Effect, EnvelopeController};
use crate::letters::LetterContent;
use crate::particles::{
    AmbientLayer, BurstLayer, AMBIENT_HEART_INTERVAL, AMBIENT_SEED_COUNT,
};
use crate::timers::{TimerEvent, TimerRegistry};
use crate::ui::CardSurface;
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// How often particle clocks advance and the frame redraws.
const FRAME_INTERVAL: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    Command(Command),
    Quit,
}

pub struct CardApp<S: CardSurface> {
    controller: EnvelopeController,
    timers: TimerRegistry,
    timer_rx: UnboundedReceiver<TimerEvent>,
    burst: BurstLayer,
    ambient: AmbientLayer,
    surface: S,
    letter: LetterContent,
    reduced_motion: bool,
}

impl<S: CardSurface> CardApp<S> {
    pub fn new(surface: S, letter: LetterContent, reduced_motion: bool) -> Self {
        let (timers, timer_rx) = TimerRegistry::new();
        // Shared letters have no replay semantics.
        let controller = EnvelopeController::new(letter.is_remote());

        Self {
            controller,
            timers,
            timer_rx,
            burst: BurstLayer::new(),
            ambient: AmbientLayer::new(),
            surface,
            letter,
            reduced_motion,
        }
    }

    pub fn controller(&self) -> &EnvelopeController {
        &self.controller
    }

    pub fn timers(&self) -> &TimerRegistry {
        &self.timers
    }

    pub fn burst(&self) -> &BurstLayer {
        &self.burst
    }

    pub fn ambient(&self) -> &AmbientLayer {
        &self.ambient
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Feeds one command through the reducer and executes its effects.
    pub fn handle_command(&mut self, command: Command) {
        let effects = self.controller.handle(command);
        self.apply_effects(effects);
    }

    pub fn handle_timer_event(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::Fired(kind) => {
                // The sending task is done; drop its stale registry entry
                // so `has_pending` reflects processed expiries.
                self.timers.cancel(kind);
                self.handle_command(Command::TimerFired(kind));
            }
            TimerEvent::AmbientTick => {
                self.ambient.spawn();
            }
        }
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SetEnvelopeOpen(open) => self.surface.set_envelope_open(open),
                Effect::ShowLetter => self.surface.show_letter(&self.letter),
                Effect::HideLetter => self.surface.hide_letter(),
                Effect::EmitBurst => self.burst.burst(),
                Effect::ClearBurst => self.burst.clear(),
                Effect::Schedule(kind, delay) => self.timers.schedule(kind, delay),
                Effect::Cancel(kind) => self.timers.cancel(kind),
                Effect::SetReplayEnabled(enabled) => self.surface.set_replay_enabled(enabled),
            }
        }
    }

    /// Seeds the backdrop hearts and starts the ambient ticker. Under
    /// reduced motion nothing ambient ever spawns, seeds included.
    pub fn start_backdrop(&mut self) {
        if self.reduced_motion {
            return;
        }
        for _ in 0..AMBIENT_SEED_COUNT {
            self.ambient.spawn();
        }
        self.timers
            .start_ambient(AMBIENT_HEART_INTERVAL, self.reduced_motion);
    }

    /// Runs the card until a quit gesture or the input channel closes.
    pub async fn run(mut self, mut input_rx: UnboundedReceiver<AppEvent>) -> Result<()> {
        self.start_backdrop();

        if self.letter.is_remote() {
            self.surface.set_replay_enabled(false);
        }

        let mut frames = tokio::time::interval(FRAME_INTERVAL);
        let mut last_frame = Instant::now();
        self.surface.render(&self.burst, &self.ambient)?;

        loop {
            tokio::select! {
                event = input_rx.recv() => match event {
                    Some(AppEvent::Command(command)) => {
                        self.handle_command(command);
                        self.surface.render(&self.burst, &self.ambient)?;
                    }
                    Some(AppEvent::Quit) | None => break,
                },
                event = self.timer_rx.recv() => {
                    // Registry holds a sender, so this channel never closes
                    // while the app lives.
                    if let Some(event) = event {
                        self.handle_timer_event(event);
                        self.surface.render(&self.burst, &self.ambient)?;
                    }
                },
                _ = frames.tick() => {
                    let dt = last_frame.elapsed().as_secs_f32();
                    last_frame = Instant::now();
                    self.burst.advance(dt);
                    self.ambient.advance(dt);
                    self.surface.render(&self.burst, &self.ambient)?;
                }
            }
        }

        Ok(())
    }
}

/// Translates raw terminal input into app events on a dedicated thread.
/// `crossterm::event::read` blocks, so it can't live on the async loop.
pub fn spawn_input_thread(tx: UnboundedSender<AppEvent>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || loop {
        let event = match crossterm::event::read() {
            Ok(event) => event,
            Err(_) => break,
        };

        let Event::Key(key) = event else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let app_event = match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                Some(AppEvent::Command(Command::Open { forced: false }))
            }
            KeyCode::Char('r') => Some(AppEvent::Command(Command::Reset)),
            KeyCode::Esc => Some(AppEvent::Command(Command::Close)),
            KeyCode::Char('q') => Some(AppEvent::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(AppEvent::Quit)
            }
            _ => None,
        };

        if let Some(app_event) = app_event {
            let quitting = app_event == AppEvent::Quit;
            if tx.send(app_event).is_err() || quitting {
                break;
            }
        }
    })
}

/// Channel pair for feeding the app; the write half goes to the input
/// thread (or a test driving gestures directly).
pub fn input_channel() -> (UnboundedSender<AppEvent>, UnboundedReceiver<AppEvent>) {
    mpsc::unbounded_channel()
}
