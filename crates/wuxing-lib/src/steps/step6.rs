//! Step 6 — seasonal multiplier. Applies to every primary node (HS, EB
//! main, hidden stems h1/h2) and every BonusNode.

use tracing::instrument;

use crate::error::Result;
use crate::state::State;
use crate::tables;

#[instrument(level = "debug", skip(state))]
pub fn run(state: &mut State) -> Result<()> {
    let season = state.season;

    for node in state.nodes.values_mut() {
        let mult = tables::seasonal_state(season, node.element).multiplier();
        node.points *= mult;
        node.seasonal_multiplier = Some(mult);
    }

    for bonus in state.bonus_nodes.iter_mut() {
        let mult = tables::seasonal_state(season, bonus.element).multiplier();
        bonus.points *= mult;
    }

    Ok(())
}
