//! Step 1 — pillar-pair interaction between each pillar's own stem and its
//! branch's main qi.

use tracing::instrument;

use crate::error::Result;
use crate::state::{InteractionLogEntry, State};
use crate::types::{pillar_pair_relation, PillarPos, Relation};

#[instrument(level = "debug", skip(state))]
pub fn run(state: &mut State) -> Result<()> {
    for pos in PillarPos::ALL {
        run_pillar(state, pos)?;
    }
    Ok(())
}

fn run_pillar(state: &mut State, pos: PillarPos) -> Result<()> {
    let hs_id = State::hs_node_id(pos);
    let eb_id = State::eb_main_node_id(pos);

    let hs_element = state.node(hs_id)?.element;
    let eb_element = state.node(eb_id)?.element;
    let relation = pillar_pair_relation(hs_element, eb_element);

    if matches!(relation, Relation::Same) {
        return Ok(());
    }

    let hs_points = state.node(hs_id)?.points;
    let eb_points = state.node(eb_id)?.points;
    let basis = hs_points.min(eb_points);
    let loss20 = 0.20 * basis;
    let effect30 = 0.30 * basis;

    match relation {
        Relation::Same => unreachable!(),
        Relation::HS_Produces_EB => {
            state.node_mut(hs_id)?.apply_loss(loss20);
            state.node_mut(eb_id)?.apply_gain(effect30);
        }
        Relation::EB_Produces_HS => {
            state.node_mut(eb_id)?.apply_loss(loss20);
            state.node_mut(hs_id)?.apply_gain(effect30);
        }
        Relation::HS_Controls_EB => {
            state.node_mut(hs_id)?.apply_loss(loss20);
            state.node_mut(eb_id)?.apply_loss(effect30);
        }
        Relation::EB_Controls_HS => {
            state.node_mut(eb_id)?.apply_loss(loss20);
            state.node_mut(hs_id)?.apply_loss(effect30);
        }
    }

    let mut entry = InteractionLogEntry::new(1, "PILLAR_PAIR");
    entry.nodes = vec![hs_id, eb_id];
    entry.node_a = Some(hs_id);
    entry.node_b = Some(eb_id);
    entry.relationship = Some(format!("{relation:?}"));
    entry.basis = Some(basis);
    state.interactions.push(entry);

    Ok(())
}
