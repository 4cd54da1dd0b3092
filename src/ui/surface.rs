//! Card rendering behind a capability trait.
//!
//! The controller and app loop only know [`CardSurface`]; the terminal
//! implementation lives here and tests use a recording fake. Drawing is
//! best-effort: a render error aborts the run, but nothing in the
//! orchestration depends on what actually reached the screen.

use crate::letters::LetterContent;
use crate::particles::{AmbientLayer, BurstLayer, ParticleKind};
use crate::ui::art;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use std::io::{self, Write};

pub trait CardSurface {
    fn set_envelope_open(&mut self, open: bool);
    fn show_letter(&mut self, letter: &LetterContent);
    fn hide_letter(&mut self);
    fn set_replay_enabled(&mut self, enabled: bool);
    fn render(&mut self, burst: &BurstLayer, ambient: &AmbientLayer) -> io::Result<()>;
}

pub struct TerminalSurface {
    stdout: io::Stdout,
    envelope_open: bool,
    letter: Option<LetterContent>,
    replay_enabled: bool,
    /// Hides the replay hint entirely for shared letters.
    replay_visible: bool,
}

impl TerminalSurface {
    pub fn new(replay_visible: bool) -> Self {
        Self {
            stdout: io::stdout(),
            envelope_open: false,
            letter: None,
            replay_enabled: true,
            replay_visible,
        }
    }

    fn size(&self) -> (u16, u16) {
        terminal::size().unwrap_or((80, 24))
    }

    fn draw_ambient(&mut self, ambient: &AmbientLayer, width: u16, height: u16) -> io::Result<()> {
        for heart in ambient.hearts() {
            let col = ((heart.column / 100.0) * width as f32) as u16;
            // Ambient hearts rise from the bottom edge to the top.
            let row = ((1.0 - heart.progress()) * (height.saturating_sub(1)) as f32) as u16;
            let glyph = if heart.opacity > 0.4 { "♥" } else { "♡" };
            queue!(
                self.stdout,
                MoveTo(col.min(width.saturating_sub(1)), row),
                SetForegroundColor(Color::DarkMagenta),
                Print(glyph)
            )?;
        }
        Ok(())
    }

    fn draw_burst(&mut self, burst: &BurstLayer, width: u16, height: u16) -> io::Result<()> {
        let center_x = width as f32 / 2.0;
        let base_y = height as f32 * 0.75;

        for particle in burst.particles() {
            let progress = particle.progress();
            if progress <= 0.0 {
                continue;
            }

            // Terminal cells are coarser than pixels; scale the drifts down.
            let x = center_x + particle.drift_x * progress / 6.0;
            let y = base_y + particle.rise_y * progress / 24.0;
            if x < 0.0 || y < 0.0 || x >= width as f32 || y >= height as f32 {
                continue;
            }

            let (glyph, color) = match particle.kind {
                ParticleKind::Heart => {
                    let color = if particle.opacity > 0.6 {
                        Color::Red
                    } else {
                        Color::Magenta
                    };
                    ("♥", color)
                }
                ParticleKind::Sparkle => ("✦", Color::Yellow),
            };

            queue!(
                self.stdout,
                MoveTo(x as u16, y as u16),
                SetForegroundColor(color),
                Print(glyph)
            )?;
        }
        Ok(())
    }

    fn draw_envelope(&mut self, width: u16, height: u16) -> io::Result<()> {
        let frame = if self.envelope_open {
            art::envelope_open()
        } else {
            art::envelope_closed()
        };

        let frame_height = frame.lines().count() as u16;
        let frame_width = frame.lines().map(|l| l.chars().count()).max().unwrap_or(0) as u16;
        let left = width.saturating_sub(frame_width) / 2;
        let top = height.saturating_sub(frame_height) / 2;

        queue!(self.stdout, SetForegroundColor(Color::White))?;
        for (i, line) in frame.lines().enumerate() {
            queue!(self.stdout, MoveTo(left, top + i as u16), Print(line))?;
        }
        Ok(())
    }

    fn draw_letter(&mut self, width: u16) -> io::Result<()> {
        let Some(letter) = self.letter.clone() else {
            return Ok(());
        };

        let mut row = 1u16;
        let left = 4u16;
        let inner = width.saturating_sub(left * 2) as usize;

        queue!(
            self.stdout,
            MoveTo(left, row),
            SetForegroundColor(Color::Rgb {
                r: 255,
                g: 182,
                b: 193
            }),
            Print(&letter.title)
        )?;
        row += 2;

        for paragraph in &letter.paragraphs {
            for chunk in wrap_text(paragraph, inner.max(20)) {
                queue!(
                    self.stdout,
                    MoveTo(left, row),
                    SetForegroundColor(Color::White),
                    Print(chunk)
                )?;
                row += 1;
            }
            row += 1;
        }

        queue!(
            self.stdout,
            MoveTo(left, row),
            SetForegroundColor(Color::Grey),
            Print(&letter.signoff.0),
            MoveTo(left, row + 1),
            Print(&letter.signoff.1)
        )?;

        if let Some(sender) = letter.sender() {
            queue!(
                self.stdout,
                MoveTo(left, row + 3),
                SetForegroundColor(Color::DarkGrey),
                Print(format!("— shared with you by {}", sender))
            )?;
        }
        Ok(())
    }

    fn draw_hints(&mut self, height: u16) -> io::Result<()> {
        let mut hints = String::from("enter: open   esc: close   q: quit");
        if self.replay_visible && self.replay_enabled {
            hints.push_str("   r: replay");
        }
        queue!(
            self.stdout,
            MoveTo(2, height.saturating_sub(1)),
            SetForegroundColor(Color::DarkGrey),
            Print(hints)
        )
    }
}

impl CardSurface for TerminalSurface {
    fn set_envelope_open(&mut self, open: bool) {
        self.envelope_open = open;
    }

    fn show_letter(&mut self, letter: &LetterContent) {
        self.letter = Some(letter.clone());
    }

    fn hide_letter(&mut self) {
        self.letter = None;
    }

    fn set_replay_enabled(&mut self, enabled: bool) {
        self.replay_enabled = enabled;
    }

    fn render(&mut self, burst: &BurstLayer, ambient: &AmbientLayer) -> io::Result<()> {
        let (width, height) = self.size();

        queue!(self.stdout, Clear(ClearType::All))?;
        self.draw_ambient(ambient, width, height)?;
        self.draw_envelope(width, height)?;
        self.draw_burst(burst, width, height)?;
        if self.letter.is_some() {
            // The letter overlay covers everything, so draw it last.
            queue!(self.stdout, Clear(ClearType::All))?;
            self.draw_letter(width)?;
        }
        self.draw_hints(height)?;
        queue!(self.stdout, ResetColor)?;
        self.stdout.flush()
    }
}

fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > max_width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_respects_width() {
        let lines = wrap_text("a few words that need wrapping at some point", 12);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.chars().count() <= 12);
        }
    }

    #[test]
    fn test_wrap_text_empty() {
        assert!(wrap_text("", 10).is_empty());
    }

    #[test]
    fn test_wrap_text_single_long_word_kept_whole() {
        let lines = wrap_text("supercalifragilistic", 5);
        assert_eq!(lines, vec!["supercalifragilistic".to_string()]);
    }
}
