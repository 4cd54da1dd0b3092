//! Particle burst and ambient heart populations.
//!
//! Both layers are plain data: the adapter advances their clocks each frame
//! and the surface decides how to draw them. Every visual parameter is a
//! uniform draw over a fixed range, one draw per particle per property.

use std::time::Duration;

pub const HEART_COUNT: usize = 42;
pub const SPARKLE_COUNT: usize = 30;

pub const AMBIENT_HEART_CAP: usize = 20;
pub const AMBIENT_HEART_INTERVAL: Duration = Duration::from_millis(480);
/// Hearts seeded before the ambient ticker starts, so the backdrop isn't
/// empty for the first few ticks.
pub const AMBIENT_SEED_COUNT: usize = 6;

fn random_between(min: f32, max: f32) -> f32 {
    fastrand::f32() * (max - min) + min
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Heart,
    Sparkle,
}

/// One burst particle. `age` accumulates frame deltas; the particle is done
/// (and self-removes) once the age passes `delay + duration`.
#[derive(Debug, Clone)]
pub struct Particle {
    pub id: u64,
    pub kind: ParticleKind,
    pub size: f32,
    pub drift_x: f32,
    pub rise_y: f32,
    pub duration: f32,
    pub delay: f32,
    pub opacity: f32,
    pub spin: f32,
    age: f32,
}

impl Particle {
    fn heart(id: u64) -> Self {
        Self {
            id,
            kind: ParticleKind::Heart,
            size: random_between(8.0, 24.0),
            drift_x: random_between(-210.0, 210.0),
            rise_y: random_between(-620.0, -360.0),
            duration: random_between(2.8, 5.4),
            delay: random_between(0.0, 0.65),
            opacity: random_between(0.38, 0.9),
            spin: random_between(-45.0, 45.0),
            age: 0.0,
        }
    }

    fn sparkle(id: u64) -> Self {
        Self {
            id,
            kind: ParticleKind::Sparkle,
            size: random_between(3.0, 8.0),
            drift_x: random_between(-240.0, 240.0),
            rise_y: random_between(-460.0, -120.0),
            duration: random_between(1.6, 3.2),
            delay: random_between(0.0, 0.7),
            opacity: 1.0,
            spin: 0.0,
            age: 0.0,
        }
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    /// Fraction of the animation already played, 0.0 before the start
    /// delay elapses, 1.0 when finished.
    pub fn progress(&self) -> f32 {
        ((self.age - self.delay) / self.duration).clamp(0.0, 1.0)
    }

    fn expired(&self) -> bool {
        self.age >= self.delay + self.duration
    }
}

/// The one-shot burst batch. Cleared and refilled wholesale on each burst;
/// emptied either particle-by-particle as animations complete or all at
/// once by the safety-clear timer or a reset/close.
#[derive(Debug, Default)]
pub struct BurstLayer {
    particles: Vec<Particle>,
    next_id: u64,
}

impl BurstLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any live batch with a fresh one: exactly [`HEART_COUNT`]
    /// hearts and [`SPARKLE_COUNT`] sparkles.
    pub fn burst(&mut self) {
        self.particles.clear();
        self.particles.reserve(HEART_COUNT + SPARKLE_COUNT);

        for _ in 0..HEART_COUNT {
            let particle = Particle::heart(self.next_id);
            self.next_id += 1;
            self.particles.push(particle);
        }

        for _ in 0..SPARKLE_COUNT {
            let particle = Particle::sparkle(self.next_id);
            self.next_id += 1;
            self.particles.push(particle);
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Removes one particle by id. Safe to call for ids that are already
    /// gone; the backstop clear and self-expiry may race.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.particles.len();
        self.particles.retain(|p| p.id != id);
        self.particles.len() != before
    }

    /// Advances every particle's age, then removes the ones whose
    /// animation finished. This is the normal-path cleanup.
    pub fn advance(&mut self, dt: f32) {
        for particle in &mut self.particles {
            particle.age += dt;
        }
        let expired: Vec<u64> = self
            .particles
            .iter()
            .filter(|p| p.expired())
            .map(|p| p.id)
            .collect();
        for id in expired {
            self.remove(id);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn heart_count(&self) -> usize {
        self.particles
            .iter()
            .filter(|p| p.kind == ParticleKind::Heart)
            .count()
    }

    pub fn sparkle_count(&self) -> usize {
        self.particles
            .iter()
            .filter(|p| p.kind == ParticleKind::Sparkle)
            .count()
    }
}

/// A decorative heart drifting in the backdrop, independent of the
/// open/reset cycle.
#[derive(Debug, Clone)]
pub struct AmbientHeart {
    pub id: u64,
    pub size: f32,
    pub opacity: f32,
    pub duration: f32,
    pub drift: f32,
    pub spin: f32,
    /// Horizontal spawn position as a percentage of the surface width.
    pub column: f32,
    age: f32,
}

impl AmbientHeart {
    fn random(id: u64) -> Self {
        Self {
            id,
            size: random_between(10.0, 24.0),
            opacity: random_between(0.18, 0.58),
            duration: random_between(7.5, 13.5),
            drift: random_between(-55.0, 55.0),
            spin: random_between(-35.0, 35.0),
            column: random_between(2.0, 98.0),
            age: 0.0,
        }
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn progress(&self) -> f32 {
        (self.age / self.duration).clamp(0.0, 1.0)
    }

    fn expired(&self) -> bool {
        self.age >= self.duration
    }
}

/// Capped ambient population. The spawner only ever adds; the population
/// shrinks solely through each heart's own expiry.
#[derive(Debug, Default)]
pub struct AmbientLayer {
    hearts: Vec<AmbientHeart>,
    next_id: u64,
}

impl AmbientLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// No-op once the live population reaches [`AMBIENT_HEART_CAP`].
    pub fn spawn(&mut self) -> Option<u64> {
        if self.hearts.len() >= AMBIENT_HEART_CAP {
            return None;
        }

        let heart = AmbientHeart::random(self.next_id);
        self.next_id += 1;
        let id = heart.id;
        self.hearts.push(heart);
        Some(id)
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.hearts.len();
        self.hearts.retain(|h| h.id != id);
        self.hearts.len() != before
    }

    pub fn advance(&mut self, dt: f32) {
        for heart in &mut self.hearts {
            heart.age += dt;
        }
        let expired: Vec<u64> = self
            .hearts
            .iter()
            .filter(|h| h.expired())
            .map(|h| h.id)
            .collect();
        for id in expired {
            self.remove(id);
        }
    }

    pub fn hearts(&self) -> &[AmbientHeart] {
        &self.hearts
    }

    pub fn len(&self) -> usize {
        self.hearts.len()
    }
}
