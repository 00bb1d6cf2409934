//! Physical constants in the host's unit system (kJ/mol, nm, ps, K).

/// Boltzmann constant in J/K.
pub const BOLTZMANN: f64 = 1.380649e-23;

/// Avogadro constant in 1/mol.
pub const AVOGADRO: f64 = 6.02214076e23;

/// Molar gas constant in J/(mol K).
pub const RGAS: f64 = BOLTZMANN * AVOGADRO;

/// Boltzmann constant in kJ/(mol K); multiplies a temperature into a thermal energy.
pub const BOLTZ: f64 = RGAS / 1000.0;

/// Thermal energy `kT` in kJ/mol for a temperature in Kelvin.
pub fn thermal_energy(temperature: f64) -> f64 {
    temperature * BOLTZ
}
