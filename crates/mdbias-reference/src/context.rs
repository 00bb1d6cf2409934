use mdbias_core::errors::{BiasError, ErrorInfo};
use mdbias_core::{Context, StepBuffers, System, Vec3};

use crate::system::ReferenceSystem;

/// Buffers the reference platform keeps per context.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformData {
    /// Particle positions in nm.
    pub positions: Vec<Vec3>,
    /// Accumulated forces in kJ/(mol nm).
    pub forces: Vec<Vec3>,
    /// Periodic box vectors.
    pub box_vectors: [Vec3; 3],
    /// Index of the current step.
    pub step_count: i64,
}

/// A context on the reference platform.
#[derive(Debug, Clone)]
pub struct ReferenceContext {
    data: PlatformData,
    step_size: f64,
}

impl ReferenceContext {
    /// Creates a context for `system` with zeroed positions and forces.
    pub fn new(system: &ReferenceSystem, step_size: f64) -> Self {
        let n = system.num_particles();
        Self {
            data: PlatformData {
                positions: vec![[0.0; 3]; n],
                forces: vec![[0.0; 3]; n],
                box_vectors: system.default_box_vectors(),
                step_count: 0,
            },
            step_size,
        }
    }

    /// Replaces all positions; the count must match the system.
    pub fn set_positions(&mut self, positions: Vec<Vec3>) -> Result<(), BiasError> {
        if positions.len() != self.data.positions.len() {
            return Err(BiasError::Config(
                ErrorInfo::new(
                    "mdbias_reference.position_count",
                    "position count does not match the particle count",
                )
                .with_context("positions", positions.len().to_string())
                .with_context("particles", self.data.positions.len().to_string()),
            ));
        }
        self.data.positions = positions;
        Ok(())
    }

    /// Replaces the periodic box vectors.
    pub fn set_box_vectors(&mut self, box_vectors: [Vec3; 3]) {
        self.data.box_vectors = box_vectors;
    }

    /// Jumps to an explicit step index.
    pub fn set_step_count(&mut self, step: i64) {
        self.data.step_count = step;
    }

    /// Moves to the next step.
    pub fn advance_step(&mut self) {
        self.data.step_count += 1;
    }

    /// Zeroes the force buffer before a new evaluation.
    pub fn clear_forces(&mut self) {
        self.data.forces.iter_mut().for_each(|force| *force = [0.0; 3]);
    }

    /// Current positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.data.positions
    }

    /// Current accumulated forces.
    pub fn forces(&self) -> &[Vec3] {
        &self.data.forces
    }

    /// Read access to all platform buffers.
    pub fn platform_data(&self) -> &PlatformData {
        &self.data
    }
}

impl Context for ReferenceContext {
    fn step_count(&self) -> i64 {
        self.data.step_count
    }

    fn step_size(&self) -> f64 {
        self.step_size
    }

    fn buffers(&mut self) -> StepBuffers<'_> {
        StepBuffers {
            positions: &self.data.positions,
            forces: &mut self.data.forces,
            box_vectors: &self.data.box_vectors,
        }
    }
}
