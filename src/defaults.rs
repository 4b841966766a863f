// NUMERICAL CHECKS
// absolute tolerance for the debug-time symmetry verification of the
// overlap and Fock metric blocks
pub const METRIC_SYMMETRY_TOL: f64 = 1.0e-10;
// absolute tolerance used by the unit tests when comparing matrix elements
// against hand-evaluated closed forms
pub const TEST_EPSILON: f64 = 1.0e-12;
