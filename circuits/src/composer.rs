//! Constraint backends and the soft-failure accumulator.
//!
//! ```text
//!   kernel / rollup code
//!          │  assert_true / assert_equal
//!          ▼
//!   ┌──────────────┐     ┌──────────────────────────────┐
//!   │NativeComposer│     │ R1csComposer                 │
//!   │ records only │     │ records + enforces in arkworks│
//!   └──────┬───────┘     └──────────────┬───────────────┘
//!          └──────────► Diagnostics ◄───┘
//! ```
//!
//! A failed assertion never aborts: it is recorded and computation carries
//! on with a well-typed (but meaningless) result, exactly as an unsatisfied
//! constraint would leave a prover with an unverifiable proof.

use std::panic::Location;

use ark_bn254::Fr;
use ark_r1cs_std::{alloc::AllocVar, boolean::Boolean, eq::EqGadget, fields::fp::FpVar};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};
use serde::Serialize;
use tessera_config::{DiagnosticsConfig, FailureModeToml};

use crate::abis::rollup::AppendOnlyTreeSnapshot;
use crate::error::{CircuitError, Result};
use crate::field::fr_to_hex;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailureMode {
    /// Only the first failure is kept
    #[default]
    FirstOnly,
    All,
}

impl From<FailureModeToml> for FailureMode {
    fn from(mode: FailureModeToml) -> Self {
        match mode {
            FailureModeToml::First => FailureMode::FirstOnly,
            FailureModeToml::All => FailureMode::All,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintFailure {
    pub message: String,
    /// `file:line` of the failing check
    pub location: String,
}

/// Soft constraint failures collected during one computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    mode: FailureMode,
    log_failures: bool,
    failures: Vec<ConstraintFailure>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(FailureMode::FirstOnly)
    }
}

impl Diagnostics {
    pub fn new(mode: FailureMode) -> Self {
        Self {
            mode,
            log_failures: true,
            failures: Vec::new(),
        }
    }

    pub fn from_config(config: &DiagnosticsConfig) -> Self {
        Self {
            mode: config.mode.into(),
            log_failures: config.log_failures,
            failures: Vec::new(),
        }
    }

    /// Settings from the process-wide config.
    pub fn configured() -> Self {
        let runtime = &*tessera_config::DIAGNOSTICS;
        Self {
            mode: runtime.mode.into(),
            log_failures: runtime.log_failures,
            failures: Vec::new(),
        }
    }

    /// Pure form: `(state, condition, message) -> state'`.
    #[track_caller]
    pub fn check(mut self, condition: bool, message: impl Into<String>) -> Self {
        self.record(condition, message);
        self
    }

    #[track_caller]
    pub fn record(&mut self, condition: bool, message: impl Into<String>) {
        if condition {
            return;
        }
        let caller = Location::caller();
        let failure = ConstraintFailure {
            message: message.into(),
            location: format!("{}:{}", caller.file(), caller.line()),
        };
        if self.log_failures {
            log::warn!("Constraint failed: {} ({})", failure.message, failure.location);
        }
        if self.mode == FailureMode::All || self.failures.is_empty() {
            self.failures.push(failure);
        }
    }

    pub fn has_failed(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn first_failure(&self) -> Option<&ConstraintFailure> {
        self.failures.first()
    }

    pub fn failures(&self) -> &[ConstraintFailure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<ConstraintFailure> {
        self.failures
    }
}

/// The "build a constraint and assert it" capability.
pub trait Composer {
    #[track_caller]
    fn assert_true(&mut self, condition: bool, message: &str);

    #[track_caller]
    fn assert_equal(&mut self, lhs: Fr, rhs: Fr, message: &str);

    fn diagnostics(&self) -> &Diagnostics;

    fn has_failed(&self) -> bool {
        self.diagnostics().has_failed()
    }

    /// Pairwise equality; a length mismatch is itself a failure.
    #[track_caller]
    fn assert_fields_equal(&mut self, lhs: &[Fr], rhs: &[Fr], message: &str) {
        self.assert_true(lhs.len() == rhs.len(), message);
        for (l, r) in lhs.iter().zip(rhs) {
            self.assert_equal(*l, *r, message);
        }
    }

    #[track_caller]
    fn assert_snapshot_equal(
        &mut self,
        lhs: &AppendOnlyTreeSnapshot,
        rhs: &AppendOnlyTreeSnapshot,
        message: &str,
    ) {
        self.assert_equal(lhs.root, rhs.root, message);
        self.assert_equal(
            Fr::from(lhs.next_available_leaf_index),
            Fr::from(rhs.next_available_leaf_index),
            message,
        );
    }
}

// ============================================================================
// Native (pure computation)
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct NativeComposer {
    diagnostics: Diagnostics,
}

impl NativeComposer {
    pub fn new(mode: FailureMode) -> Self {
        Self {
            diagnostics: Diagnostics::new(mode),
        }
    }

    pub fn from_config(config: &DiagnosticsConfig) -> Self {
        Self {
            diagnostics: Diagnostics::from_config(config),
        }
    }

    pub fn configured() -> Self {
        Self {
            diagnostics: Diagnostics::configured(),
        }
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }
}

impl Composer for NativeComposer {
    #[track_caller]
    fn assert_true(&mut self, condition: bool, message: &str) {
        self.diagnostics.record(condition, message);
    }

    #[track_caller]
    fn assert_equal(&mut self, lhs: Fr, rhs: Fr, message: &str) {
        if lhs != rhs {
            log::debug!("{}: {} != {}", message, fr_to_hex(&lhs), fr_to_hex(&rhs));
        }
        self.diagnostics.record(lhs == rhs, message);
    }

    fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

// ============================================================================
// R1CS (constraint-emitting)
// ============================================================================

/// Emits one equality constraint per assertion into an arkworks constraint
/// system, alongside the same bookkeeping as [`NativeComposer`].
pub struct R1csComposer {
    cs: ConstraintSystemRef<Fr>,
    diagnostics: Diagnostics,
    synthesis_error: Option<SynthesisError>,
}

impl R1csComposer {
    pub fn new(cs: ConstraintSystemRef<Fr>, mode: FailureMode) -> Self {
        Self {
            cs,
            diagnostics: Diagnostics::new(mode),
            synthesis_error: None,
        }
    }

    pub fn constraint_system(&self) -> ConstraintSystemRef<Fr> {
        self.cs.clone()
    }

    pub fn num_constraints(&self) -> usize {
        self.cs.num_constraints()
    }

    fn keep_first_error(&mut self, outcome: std::result::Result<(), SynthesisError>) {
        if let Err(e) = outcome {
            self.synthesis_error.get_or_insert(e);
        }
    }

    /// Hands back the diagnostics, or the first backend error if synthesis broke.
    pub fn finish(self) -> Result<Diagnostics> {
        match self.synthesis_error {
            Some(e) => Err(CircuitError::Synthesis(e.to_string())),
            None => Ok(self.diagnostics),
        }
    }

    /// Whether the emitted constraints are satisfied by the assigned witnesses.
    pub fn is_satisfied(&self) -> Result<bool> {
        self.cs
            .is_satisfied()
            .map_err(|e| CircuitError::Synthesis(e.to_string()))
    }
}

impl Composer for R1csComposer {
    #[track_caller]
    fn assert_true(&mut self, condition: bool, message: &str) {
        let cs = self.cs.clone();
        let outcome = (|| -> std::result::Result<(), SynthesisError> {
            let bit = Boolean::new_witness(cs, || Ok(condition))?;
            bit.enforce_equal(&Boolean::constant(true))
        })();
        self.keep_first_error(outcome);
        self.diagnostics.record(condition, message);
    }

    #[track_caller]
    fn assert_equal(&mut self, lhs: Fr, rhs: Fr, message: &str) {
        let cs = self.cs.clone();
        let outcome = (|| -> std::result::Result<(), SynthesisError> {
            let l = FpVar::new_witness(cs.clone(), || Ok(lhs))?;
            let r = FpVar::new_witness(cs, || Ok(rhs))?;
            l.enforce_equal(&r)
        })();
        self.keep_first_error(outcome);
        self.diagnostics.record(lhs == rhs, message);
    }

    fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}
