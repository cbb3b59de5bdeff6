//! Scenario and property test suite for the BigBang wallet driver.
//!
//! The tests in `tests/` run the full build, sign, verify and submit
//! pipeline against an in-memory node, exercising coin selection under
//! pending-pool exclusion, the funding boundary conditions and
//! consolidation.

pub mod helpers;
