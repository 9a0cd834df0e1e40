//! Rigid body simulation over a flat arena of [`Body`] values.
//!
//! # Architecture
//!
//! The physics pipeline runs in a fixed timestep loop:
//!
//! 1. Apply gravity impulses to dynamic bodies
//! 2. Broadphase collision detection (sweep and prune)
//! 3. Narrowphase collision detection (GJK/EPA, sphere sweeps, conservative advance)
//! 4. Resolve contacts in broadphase order, each pair advanced to its time of impact
//! 5. Integrate every body through the rest of the step
//!
//! Bodies refer to each other only by their index in the slice handed to
//! [`PhysicsWorld::step`].

pub mod bounds;
pub mod broadphase;
pub mod contact;
pub mod narrowphase;
pub mod rigid_body;
pub mod shape;
pub mod solver;

use glam::Vec3;

use crate::error::ConfigError;

use self::broadphase::{broad_phase_into, CollisionPair};
use self::contact::Contact;
use self::narrowphase::intersects;
use self::rigid_body::Body;

/// Contacts later than this into the step are kept even when not penetrating.
const FRESH_CONTACT_TOI: f32 = 1e-6;
/// Contacts at the start of the step are kept once they sink past this depth.
const RESTING_PENETRATION: f32 = 5e-4;

/// Configuration for the physics simulation.
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Gravity vector. Default: (0, -9.81, 0).
    pub gravity: Vec3,
    /// Fixed timestep for physics updates in seconds. Default: 1/60.
    pub fixed_timestep: f64,
    /// Maximum number of sub-steps per frame. Default: 4.
    pub max_substeps: u32,
    /// Largest frame delta accepted by [`PhysicsWorld::step`], in seconds.
    /// Longer frames are clamped. Default: 0.25.
    pub max_delta: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 4,
            max_delta: 0.25,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_timestep.is_finite() && self.fixed_timestep > 0.0) {
            return Err(ConfigError::InvalidTimestep(self.fixed_timestep));
        }
        if self.max_substeps == 0 {
            return Err(ConfigError::NoSubsteps);
        }
        if !(self.max_delta.is_finite() && self.max_delta > 0.0) {
            return Err(ConfigError::InvalidMaxDelta(self.max_delta));
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::NonFiniteGravity);
        }
        Ok(())
    }
}

/// The main physics world managing simulation state.
pub struct PhysicsWorld {
    config: PhysicsConfig,
    accumulator: f64,
    pairs: Vec<CollisionPair>,
    contacts: Vec<Contact>,
    /// Time each body has already been integrated within the current step.
    elapsed: Vec<f32>,
}

impl PhysicsWorld {
    /// Create a new physics world with the given configuration.
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            accumulator: 0.0,
            pairs: Vec::new(),
            contacts: Vec::new(),
            elapsed: Vec::new(),
        }
    }

    /// Create a world after checking the configuration.
    pub fn try_new(config: PhysicsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Contacts resolved during the most recent fixed step.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Step the physics simulation forward by `delta_time` seconds.
    ///
    /// Uses a fixed timestep accumulator to ensure deterministic simulation.
    /// Returns the number of fixed steps that ran.
    pub fn step(&mut self, bodies: &mut [Body], delta_time: f64) -> usize {
        self.accumulator += delta_time.clamp(0.0, self.config.max_delta);

        let mut substeps = 0u32;
        while self.accumulator >= self.config.fixed_timestep && substeps < self.config.max_substeps
        {
            self.fixed_step(bodies, self.config.fixed_timestep as f32);
            self.accumulator -= self.config.fixed_timestep;
            substeps += 1;
        }

        // Clamp accumulator to avoid spiral of death
        if self.accumulator > self.config.fixed_timestep * self.config.max_substeps as f64 {
            self.accumulator = 0.0;
        }
        substeps as usize
    }

    /// Advance the bodies by exactly `dt` seconds.
    pub fn fixed_step(&mut self, bodies: &mut [Body], dt: f32) {
        // 1. Apply forces (gravity)
        for body in bodies.iter_mut().filter(|b| !b.is_static()) {
            let mass = 1.0 / body.inv_mass;
            body.apply_linear_impulse(self.config.gravity * mass * dt);
        }

        // 2. Broadphase collision detection
        broad_phase_into(bodies, &mut self.pairs, dt);

        // 3. Narrowphase collision detection
        self.contacts.clear();
        for pair in &self.pairs {
            if bodies[pair.a].is_static() && bodies[pair.b].is_static() {
                continue;
            }
            if let Some(contact) = intersects(bodies, pair.a, pair.b, dt) {
                if contact.time_of_impact > FRESH_CONTACT_TOI
                    || contact.separation_distance < -RESTING_PENETRATION
                {
                    self.contacts.push(contact);
                }
            }
        }

        // 4. Resolve contacts at their time of impact
        self.elapsed.clear();
        self.elapsed.resize(bodies.len(), 0.0);
        for contact in &self.contacts {
            for index in [contact.body_a, contact.body_b] {
                let behind = contact.time_of_impact - self.elapsed[index];
                if behind > 0.0 {
                    bodies[index].update(behind);
                    self.elapsed[index] = contact.time_of_impact;
                }
            }
            solver::resolve_contact(bodies, contact);
        }

        // 5. Integrate positions over the rest of the step
        for (body, elapsed) in bodies.iter_mut().zip(&self.elapsed) {
            body.update((dt - elapsed).max(0.0));
        }

        tracing::debug!(
            bodies = bodies.len(),
            pairs = self.pairs.len(),
            contacts = self.contacts.len(),
            "physics step"
        );
    }
}
