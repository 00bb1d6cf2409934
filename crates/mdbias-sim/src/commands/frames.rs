use std::error::Error;
use std::fs;
use std::path::Path;

use mdbias_core::Vec3;
use mdbias_reference::{ExternalForce, NonbondedForce, NonbondedMethod, ReferenceSystem};
use serde::Deserialize;

/// Input trajectory for `mdbias evaluate`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameFile {
    pub masses: Vec<f64>,
    #[serde(default)]
    pub charges: Option<Vec<f64>>,
    /// Periodic box; makes the system periodic when present.
    #[serde(default, rename = "box")]
    pub box_vectors: Option<[Vec3; 3]>,
    pub timestep: f64,
    pub frames: Vec<Vec<Vec3>>,
}

impl FrameFile {
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let frames: FrameFile = serde_json::from_str(&fs::read_to_string(path)?)?;
        if let Some(charges) = &frames.charges {
            if charges.len() != frames.masses.len() {
                return Err(format!(
                    "{}: {} charges for {} particles",
                    path.display(),
                    charges.len(),
                    frames.masses.len()
                )
                .into());
            }
        }
        Ok(frames)
    }

    /// Builds the system. Charges ride on a nonbonded force; a box without
    /// charges is carried by a charge-free external field.
    pub fn build_system(&self) -> ReferenceSystem {
        let mut system = ReferenceSystem::new();
        for &mass in &self.masses {
            system.add_particle(mass);
        }
        if let Some(box_vectors) = self.box_vectors {
            system.set_default_box_vectors(box_vectors);
        }
        let periodic = self.box_vectors.is_some();
        match &self.charges {
            Some(charges) => {
                let mut nonbonded = NonbondedForce::new();
                for &charge in charges {
                    nonbonded.add_particle(charge, 0.0, 0.0);
                }
                if periodic {
                    nonbonded.set_nonbonded_method(NonbondedMethod::CutoffPeriodic);
                }
                system.add_force(Box::new(nonbonded));
            }
            None if periodic => {
                system.add_force(Box::new(ExternalForce::new(true)));
            }
            None => {}
        }
        system
    }
}
