//! The per-tick working frame and the replaceable motor stages.
//!
//! A tick runs a fixed sequence. Three steps of it are function values in
//! [`MotorStages`] so custom behaviour can be injected without subclassing:
//!
//! | Stage             | Default                                            |
//! |-------------------|----------------------------------------------------|
//! | `integrate`       | [`integrate`](super::integrate)                    |
//! | `resolve_contact` | [`respond_to_contact`](super::respond_to_contact)  |
//! | `finish`          | [`adhere`](super::adhere)                          |
//!
//! Pre-move (frame reset, jump readiness) and post-move (transition,
//! grounded bookkeeping) are not replaceable.

use glam::Vec3;

use crate::collision::ShapeQuery;

use super::adhesion::adhere;
use super::config::SolverConfig;
use super::contact::{Contact, ContactVolume};
use super::integrator::{integrate, IntegrateInput, Integration};
use super::resolver::respond_to_contact;
use super::state::Body;

/// Read-only inputs shared by every stage of a tick.
#[derive(Clone, Copy)]
pub struct StageContext<'a> {
    pub config: &'a SolverConfig,
    pub body: &'a Body,
    pub query: &'a dyn ShapeQuery,
}

impl StageContext<'_> {
    /// Padded query volumes for this body.
    pub fn volume(&self) -> ContactVolume {
        ContactVolume::new(self.body.shape(), self.config.contact_offset)
    }
}

/// Mutable state of the move being solved.
///
/// Built fresh every tick and committed to the body and its motion state at
/// the end; nothing in it survives the tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveFrame {
    /// Body position at the start of the tick.
    pub start: Vec3,

    /// Candidate position being resolved.
    pub position: Vec3,

    pub velocity: Vec3,

    /// Grounded at the start of the tick.
    pub was_grounded: bool,

    /// A jump impulse was applied this tick.
    pub jumped: bool,

    /// A floor contact, step or adhesion landed the body this tick.
    pub grounded: bool,

    /// Normal of the ground found this tick. Only meaningful when grounded.
    pub ground_normal: Vec3,

    pub stepped: bool,

    pub adhered: bool,
}

impl MoveFrame {
    pub fn new(start: Vec3, velocity: Vec3, was_grounded: bool, jumped: bool) -> Self {
        Self {
            start,
            position: start,
            velocity,
            was_grounded,
            jumped,
            grounded: false,
            ground_normal: Vec3::Y,
            stepped: false,
            adhered: false,
        }
    }

    /// Record ground under the body.
    #[inline]
    pub fn land(&mut self, normal: Vec3) {
        self.grounded = true;
        self.ground_normal = normal;
    }
}

/// Whether a contact was acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactResponse {
    /// Nothing significant changed; keep scanning this pass.
    Ignored,
    /// Position or velocity was corrected; the pass restarts.
    Resolved,
}

/// Velocity integration stage.
pub type IntegrateFn = fn(&SolverConfig, &IntegrateInput) -> Integration;

/// Per-contact response stage.
pub type ResolveContactFn = fn(&StageContext<'_>, &mut MoveFrame, &Contact) -> ContactResponse;

/// Runs once after contact resolution, before the move is committed.
pub type FinishFn = fn(&StageContext<'_>, &mut MoveFrame);

/// The replaceable stages of a tick.
#[derive(Clone, Copy)]
pub struct MotorStages {
    pub integrate: IntegrateFn,
    pub resolve_contact: ResolveContactFn,
    pub finish: FinishFn,
}

impl Default for MotorStages {
    fn default() -> Self {
        Self {
            integrate,
            resolve_contact: respond_to_contact,
            finish: adhere,
        }
    }
}

impl std::fmt::Debug for MotorStages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotorStages").finish_non_exhaustive()
    }
}

impl MotorStages {
    /// Default stages with a custom integrator.
    pub fn with_integrate(mut self, integrate: IntegrateFn) -> Self {
        self.integrate = integrate;
        self
    }

    /// Default stages with a custom contact response.
    pub fn with_resolve_contact(mut self, resolve_contact: ResolveContactFn) -> Self {
        self.resolve_contact = resolve_contact;
        self
    }

    /// Default stages with a custom finish step.
    pub fn with_finish(mut self, finish: FinishFn) -> Self {
        self.finish = finish;
        self
    }
}
