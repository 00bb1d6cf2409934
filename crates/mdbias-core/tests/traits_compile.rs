use mdbias_core::units::{thermal_energy, BOLTZ};
use mdbias_core::{ChargeProvider, Context, Force, StepBuffers, System, Vec3};

struct Charged(Vec<f64>);

impl ChargeProvider for Charged {
    fn particle_charge(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}

impl Force for Charged {
    fn uses_periodic_boundary_conditions(&self) -> bool {
        true
    }

    fn charge_parameters(&self) -> Option<&dyn ChargeProvider> {
        Some(self)
    }
}

struct Plain;

impl Force for Plain {
    fn uses_periodic_boundary_conditions(&self) -> bool {
        false
    }
}

struct DummySystem {
    forces: Vec<Box<dyn Force>>,
}

impl System for DummySystem {
    fn num_particles(&self) -> usize {
        2
    }

    fn particle_mass(&self, _index: usize) -> f64 {
        12.0
    }

    fn forces(&self) -> &[Box<dyn Force>] {
        &self.forces
    }
}

struct DummyContext {
    positions: Vec<Vec3>,
    forces: Vec<Vec3>,
    box_vectors: [Vec3; 3],
}

impl Context for DummyContext {
    fn step_count(&self) -> i64 {
        7
    }

    fn step_size(&self) -> f64 {
        0.002
    }

    fn buffers(&mut self) -> StepBuffers<'_> {
        StepBuffers {
            positions: &self.positions,
            forces: &mut self.forces,
            box_vectors: &self.box_vectors,
        }
    }
}

#[test]
fn system_periodicity_follows_forces() {
    let plain = DummySystem {
        forces: vec![Box::new(Plain)],
    };
    assert!(!plain.uses_periodic_boundary_conditions());

    let mixed = DummySystem {
        forces: vec![Box::new(Plain), Box::new(Charged(vec![0.5, -0.5]))],
    };
    assert!(mixed.uses_periodic_boundary_conditions());
    let provider = mixed.forces()[1].charge_parameters().expect("charges");
    assert_eq!(provider.particle_charge(1), Some(-0.5));
    assert!(mixed.forces()[0].charge_parameters().is_none());
}

#[test]
fn context_buffers_allow_in_place_forces() {
    let mut ctx = DummyContext {
        positions: vec![[0.0; 3]; 2],
        forces: vec![[0.0; 3]; 2],
        box_vectors: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };
    let buffers = ctx.buffers();
    buffers.forces[1][2] += 3.0;
    assert_eq!(buffers.positions.len(), 2);
    assert_eq!(ctx.forces[1], [0.0, 0.0, 3.0]);
}

#[test]
fn boltzmann_constant_in_kj_per_mol() {
    assert!((BOLTZ - 0.008_314_462_618).abs() < 1e-12);
    assert!((thermal_energy(300.0) - 2.494_338_785_4).abs() < 1e-9);
}
