use mdbias_core::{BiasError, Communicator, Context, Force, ParallelRuntime, System};
use mdbias_reference::{
    ExternalForce, LocalRuntime, NonbondedForce, NonbondedMethod, ReferenceContext, ReferenceSystem,
    SerialCommunicator, DEFAULT_BOX_VECTORS,
};

fn two_particle_system(method: NonbondedMethod) -> ReferenceSystem {
    let mut system = ReferenceSystem::new();
    system.add_particle(12.0);
    system.add_particle(1.008);
    let mut nonbonded = NonbondedForce::new();
    nonbonded.add_particle(0.4, 0.3, 0.5);
    nonbonded.add_particle(-0.4, 0.25, 0.1);
    nonbonded.set_nonbonded_method(method);
    system.add_force(Box::new(nonbonded));
    system
}

#[test]
fn periodicity_follows_nonbonded_method() {
    assert!(!two_particle_system(NonbondedMethod::NoCutoff).uses_periodic_boundary_conditions());
    assert!(!two_particle_system(NonbondedMethod::CutoffNonPeriodic)
        .uses_periodic_boundary_conditions());
    assert!(two_particle_system(NonbondedMethod::Pme).uses_periodic_boundary_conditions());
}

#[test]
fn nonbonded_force_exposes_charges() {
    let system = two_particle_system(NonbondedMethod::NoCutoff);
    let provider = system.forces()[0].charge_parameters().expect("charge provider");
    assert_eq!(provider.particle_charge(0), Some(0.4));
    assert_eq!(provider.particle_charge(1), Some(-0.4));
    assert_eq!(provider.particle_charge(2), None);
}

#[test]
fn external_force_sets_periodicity_without_charges() {
    let mut system = ReferenceSystem::new();
    system.add_particle(39.95);
    system.add_force(Box::new(ExternalForce::new(true)));
    assert!(system.uses_periodic_boundary_conditions());
    assert!(system.forces()[0].charge_parameters().is_none());
    assert!(!ExternalForce::new(false).uses_periodic_boundary_conditions());
}

#[test]
fn particle_parameters_reject_unknown_index() {
    let mut nonbonded = NonbondedForce::new();
    nonbonded.add_particle(1.0, 0.3, 0.2);
    assert_eq!(nonbonded.particle_parameters(0).unwrap().sigma, 0.3);
    let err = nonbonded.particle_parameters(3).expect_err("out of range");
    assert!(matches!(err, BiasError::Config(_)));
    assert_eq!(err.info().code, "mdbias_reference.particle_index");
}

#[test]
fn context_buffers_track_system_size() {
    let system = two_particle_system(NonbondedMethod::NoCutoff);
    let mut context = ReferenceContext::new(&system, 0.002);
    assert_eq!(context.step_size(), 0.002);
    assert_eq!(context.platform_data().box_vectors, DEFAULT_BOX_VECTORS);
    context
        .set_positions(vec![[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]])
        .expect("matching count");
    assert!(context.set_positions(vec![[0.0; 3]]).is_err());

    let buffers = context.buffers();
    buffers.forces[0][0] = 5.0;
    assert_eq!(buffers.positions[1], [0.4, 0.5, 0.6]);
    assert_eq!(context.forces()[0][0], 5.0);
    context.clear_forces();
    assert_eq!(context.forces()[0], [0.0; 3]);

    context.advance_step();
    context.advance_step();
    assert_eq!(context.step_count(), 2);
}

#[test]
fn serial_communicator_handle_is_stable() {
    let comm = SerialCommunicator::new();
    assert_eq!(comm.rank(), 0);
    assert_eq!(comm.as_raw(), comm.as_raw());
    assert!(!comm.as_raw().as_ptr().is_null());
    assert_eq!(SerialCommunicator::with_rank(3).rank(), 3);
}

#[test]
fn local_runtime_counts_starts() {
    let runtime = LocalRuntime::new();
    assert!(!runtime.is_initialized());
    runtime.initialize().unwrap();
    assert!(runtime.is_initialized());
    assert_eq!(runtime.start_count(), 1);
    assert!(LocalRuntime::already_initialized().is_initialized());
}
