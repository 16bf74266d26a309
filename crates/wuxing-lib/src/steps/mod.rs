//! Component C3: the seven ordered, state-mutating stages that turn an
//! initialized chart into a fully interacted one.

mod step1;
mod step2;
mod step3;
mod step4;
mod step5;
mod step6;
mod step7;

use crate::error::Result;
use crate::state::State;

/// Runs stages `1..=up_to` in order. `up_to` must be in `1..=7`.
pub fn run_up_to(state: &mut State, up_to: u8) -> Result<()> {
    let stages: [fn(&mut State) -> Result<()>; 7] =
        [step1::run, step2::run, step3::run, step4::run, step5::run, step6::run, step7::run];

    for stage in stages.iter().take(up_to as usize) {
        stage(state)?;
    }
    Ok(())
}

pub fn run_all(state: &mut State) -> Result<()> {
    run_up_to(state, 7)
}

/// Runs exactly one stage (`1..=7`) against an already-initialized state.
/// Exists so callers can continue a partially-run chart one stage at a
/// time instead of only from Step 0.
pub fn run_one(state: &mut State, step: u8) -> Result<()> {
    let stages: [fn(&mut State) -> Result<()>; 7] =
        [step1::run, step2::run, step3::run, step4::run, step5::run, step6::run, step7::run];
    stages[(step - 1) as usize](state)
}
