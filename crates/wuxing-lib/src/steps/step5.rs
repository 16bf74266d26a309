//! Step 5 — heavenly-stem clashes. No attention spread: each of the four
//! STEM_CLASHES entries is processed exactly once, across whichever
//! pillars carry those stems.

use tracing::instrument;

use crate::error::Result;
use crate::state::{InteractionLogEntry, State};
use crate::tables::{self, InteractionTag, STEM_CLASHES};
use crate::types::{PillarPos, Stem};

#[instrument(level = "debug", skip(state))]
pub fn run(state: &mut State) -> Result<()> {
    for (controller, controlled) in STEM_CLASHES {
        for pc in pillars_with_stem(state, controller) {
            for pv in pillars_with_stem(state, controlled) {
                if pc != pv {
                    apply_clash(state, pc, pv)?;
                }
            }
        }
    }
    Ok(())
}

fn pillars_with_stem(state: &State, stem: Stem) -> Vec<PillarPos> {
    PillarPos::ALL.into_iter().filter(|p| state.pillar(*p).stem == stem).collect()
}

fn apply_clash(state: &mut State, controller_pos: PillarPos, controlled_pos: PillarPos) -> Result<()> {
    let controller_id = State::hs_node_id(controller_pos);
    let controlled_id = State::hs_node_id(controlled_pos);

    let controller_points = state.node(controller_id)?.points;
    let controlled_points = state.node(controlled_id)?.points;
    let basis = controller_points.min(controlled_points);
    let gap_mult = tables::gap_multiplier(tables::pillar_gap(controller_pos, controlled_pos));

    state.node_mut(controller_id)?.apply_loss(0.25 * basis * gap_mult);
    state.node_mut(controlled_id)?.apply_loss(0.50 * basis * gap_mult);

    let mut entry = InteractionLogEntry::new(5, InteractionTag::StemClash.label());
    entry.nodes = vec![controller_id, controlled_id];
    entry.attacker = Some(controller_id);
    entry.victim = Some(controlled_id);
    entry.basis = Some(basis);
    entry.gap_multiplier = Some(gap_mult);
    state.interactions.push(entry);

    Ok(())
}
