//! Top-level orchestration: Step 0 through Step 9, wired in order.

use crate::aggregate;
use crate::balance;
use crate::error::Result;
use crate::result::{assemble, WuxingResult};
use crate::state::{self, State};
use crate::steps;
use crate::types::WuxingInput;

/// Runs the full nine-stage pipeline (Step 0 init through Step 9
/// balance) and assembles the result.
pub fn compute(input: WuxingInput) -> Result<WuxingResult> {
    let mut state = state::init_state(input)?;
    steps::run_all(&mut state)?;

    let elements = aggregate::aggregate(&state);
    let gods = balance::simulate(&state);

    Ok(assemble(&state, elements, gods))
}

/// Test seam: initializes the chart and runs stages `1..=up_to` only,
/// skipping Step 8/9. `up_to` must be in `0..=7` (0 runs no stage,
/// returning the Step-0 state unchanged).
///
/// Not part of the stable public surface; exists so tests can assert
/// "run up to step k, then step k+1" equals "run up to step k+1" in one
/// pass.
pub fn run_up_to_step(input: WuxingInput, up_to: u8) -> Result<State> {
    let mut state = state::init_state(input)?;
    steps::run_up_to(&mut state, up_to)?;
    Ok(state)
}

/// Test seam: runs exactly one stage (`1..=7`) against an already-built
/// state. Lets tests assert "run up to step k, then step k+1" equals
/// "run up to step k+1" without recomputing from Step 0 each time.
pub fn run_single_step(state: &mut State, step: u8) -> Result<()> {
    steps::run_one(state, step)
}
