//! Verification of solver output

pub mod correctness;

pub use self::correctness::{check_assignment, verify_assignment, FlowReport, Violation};
