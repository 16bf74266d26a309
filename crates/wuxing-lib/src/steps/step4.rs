//! Step 4 — earthly-branch negative interactions. Reads the attention map
//! Step 2 built; EBs are never consumed, so one branch can take damage
//! from more than one direction.

use tracing::instrument;

use crate::error::Result;
use crate::state::{InteractionLogEntry, State};
use crate::tables::{
    self, punishment_shi_pairs, DirectedBranchPair, InteractionTag, DESTRUCTIONS, PUNISHMENT_EN,
    PUNISHMENT_SELF, PUNISHMENT_WULI, SIX_CLASHES, SIX_HARMS,
};
use crate::types::{Branch, NodeId, PillarPos};

#[instrument(level = "debug", skip(state))]
pub fn run(state: &mut State) -> Result<()> {
    run_six_clash(state)?;
    run_punishment(state)?;
    run_six_harm(state)?;
    run_destruction(state)?;
    Ok(())
}

fn priority_index(state: &State, pos: PillarPos) -> usize {
    state.pillar_priority.iter().position(|p| *p == pos).unwrap_or(usize::MAX)
}

fn pillars_with_branch(state: &State, branch: Branch) -> Vec<PillarPos> {
    PillarPos::ALL
        .into_iter()
        .filter(|p| state.pillar(*p).branch == branch)
        .collect()
}

/// Every `(pa, pb)` pillar instance of the branch pair `(a, b)`, distinct
/// pillars only, sorted by `min(pillar_priority_index)`.
fn instances(state: &State, a: Branch, b: Branch) -> Vec<(PillarPos, PillarPos)> {
    let mut pairs = Vec::new();
    for pa in pillars_with_branch(state, a) {
        for pb in pillars_with_branch(state, b) {
            if pa != pb {
                pairs.push((pa, pb));
            }
        }
    }
    pairs.sort_by_key(|(pa, pb)| priority_index(state, *pa).min(priority_index(state, *pb)));
    pairs
}

fn log_only_entry(state: &mut State, step: u8, tag: InteractionTag, nodes: Vec<NodeId>) {
    let mut entry = InteractionLogEntry::new(step, tag.label());
    entry.nodes = nodes.clone();
    if nodes.len() == 2 {
        entry.node_a = Some(nodes[0]);
        entry.node_b = Some(nodes[1]);
    }
    entry.log_only = true;
    state.interactions.push(entry);
}

fn apply_directed(
    state: &mut State,
    attacker_pos: PillarPos,
    victim_pos: PillarPos,
    tag: InteractionTag,
) -> Result<()> {
    let attacker_id = State::eb_main_node_id(attacker_pos);
    let victim_id = State::eb_main_node_id(victim_pos);

    let (attacker_rate, victim_rate) =
        tag.negative_rates().expect("directed negative interactions always carry rates");
    let gap_mult = tables::gap_multiplier(tables::pillar_gap(attacker_pos, victim_pos));

    let attacker_points = state.node(attacker_id)?.points;
    let victim_points = state.node(victim_id)?.points;
    let basis = attacker_points.min(victim_points);

    let weight = tag.attention_weight().unwrap_or(0.0);
    let attacker_total = state.attention_total(attacker_id);
    let victim_total = state.attention_total(victim_id);
    let attacker_share = if attacker_total > 0.0 { weight / attacker_total } else { 1.0 };
    let victim_share = if victim_total > 0.0 { weight / victim_total } else { 1.0 };

    let attacker_loss = basis * attacker_rate * gap_mult * attacker_share;
    let victim_loss = basis * victim_rate * gap_mult * victim_share;

    state.node_mut(attacker_id)?.apply_loss(attacker_loss);
    state.node_mut(victim_id)?.apply_loss(victim_loss);

    let mut entry = InteractionLogEntry::new(4, tag.label());
    entry.nodes = vec![attacker_id, victim_id];
    entry.attacker = Some(attacker_id);
    entry.victim = Some(victim_id);
    entry.basis = Some(basis);
    entry.gap_multiplier = Some(gap_mult);
    state.interactions.push(entry);

    Ok(())
}

fn run_directed_or_log(state: &mut State, pair: &DirectedBranchPair, tag: InteractionTag) -> Result<()> {
    match pair {
        DirectedBranchPair::Directed { attacker, victim } => {
            for (pa, pb) in instances(state, *attacker, *victim) {
                apply_directed(state, pa, pb, tag)?;
            }
        }
        DirectedBranchPair::SameElementLogOnly { a, b } => {
            for (pa, pb) in instances(state, *a, *b) {
                log_only_entry(state, 4, tag, vec![State::eb_main_node_id(pa), State::eb_main_node_id(pb)]);
            }
        }
    }
    Ok(())
}

fn run_six_clash(state: &mut State) -> Result<()> {
    for pair in SIX_CLASHES.iter() {
        run_directed_or_log(state, pair, InteractionTag::SixClash)?;
    }
    Ok(())
}

fn run_destruction(state: &mut State) -> Result<()> {
    for pair in DESTRUCTIONS.iter() {
        run_directed_or_log(state, pair, InteractionTag::Destruction)?;
    }
    Ok(())
}

fn run_six_harm(state: &mut State) -> Result<()> {
    for (a, b) in SIX_HARMS {
        for (pa, pb) in instances(state, a, b) {
            if tables::pillar_gap(pa, pb) == 1 {
                apply_directed(state, pa, pb, InteractionTag::SixHarm)?;
            }
        }
    }
    Ok(())
}

fn run_punishment(state: &mut State) -> Result<()> {
    for (a, b) in punishment_shi_pairs() {
        for (pa, pb) in instances(state, a, b) {
            apply_directed(state, pa, pb, InteractionTag::Punishment)?;
        }
    }

    let wuli_lists: Vec<Vec<PillarPos>> =
        PUNISHMENT_WULI.iter().map(|b| pillars_with_branch(state, *b)).collect();
    if wuli_lists.iter().all(|l| !l.is_empty()) {
        for pa in &wuli_lists[0] {
            for pb in &wuli_lists[1] {
                for pc in &wuli_lists[2] {
                    let mut distinct = [*pa, *pb, *pc];
                    distinct.sort_by_key(|p| p.column());
                    if distinct.windows(2).any(|w| w[0] == w[1]) {
                        continue;
                    }
                    log_only_entry(
                        state,
                        4,
                        InteractionTag::Punishment,
                        vec![
                            State::eb_main_node_id(*pa),
                            State::eb_main_node_id(*pb),
                            State::eb_main_node_id(*pc),
                        ],
                    );
                }
            }
        }
    }

    let (en_a, en_b) = PUNISHMENT_EN;
    for (pa, pb) in instances(state, en_a, en_b) {
        apply_directed(state, pa, pb, InteractionTag::Punishment)?;
    }

    for branch in PUNISHMENT_SELF {
        let pillars = pillars_with_branch(state, branch);
        if pillars.len() >= 2 {
            log_only_entry(
                state,
                4,
                InteractionTag::Punishment,
                pillars.iter().map(|p| State::eb_main_node_id(*p)).collect(),
            );
        }
    }

    Ok(())
}
