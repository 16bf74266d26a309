//! Step 7 — natural cross-pillar flow between every visible node and
//! every bonus node, with same-grid-position same-element consolidation.

use tracing::instrument;

use crate::error::Result;
use crate::state::{InteractionLogEntry, State};
use crate::tables::{self, InteractionTag};
use crate::types::{element_flow, Element, ElementFlow, NodeId, PillarPos, Slot};

#[derive(Clone, Debug)]
enum FlowKind {
    Native(NodeId),
    Consolidated { native: NodeId, bonus_indices: Vec<usize> },
    Bonus(usize),
}

#[derive(Clone, Debug)]
struct FlowUnit {
    kind: FlowKind,
    element: Element,
    position: (usize, usize),
}

impl FlowUnit {
    fn native_pillar(&self) -> Option<PillarPos> {
        match &self.kind {
            FlowKind::Native(id) | FlowKind::Consolidated { native: id, .. } => Some(id.pillar),
            FlowKind::Bonus(_) => None,
        }
    }

    fn pillar(&self) -> PillarPos {
        PillarPos::from_column(self.position.0)
    }
}

fn get_value(state: &State, unit: &FlowUnit) -> Result<f64> {
    match &unit.kind {
        FlowKind::Native(id) => Ok(state.node(*id)?.points),
        FlowKind::Bonus(idx) => Ok(state.bonus_nodes[*idx].points),
        FlowKind::Consolidated { native, bonus_indices } => {
            let mut total = state.node(*native)?.points;
            for idx in bonus_indices {
                total += state.bonus_nodes[*idx].points;
            }
            Ok(total)
        }
    }
}

fn set_value(state: &mut State, unit: &FlowUnit, new_total: f64) -> Result<()> {
    match &unit.kind {
        FlowKind::Native(id) => {
            state.node_mut(*id)?.points = new_total.max(0.0);
        }
        FlowKind::Bonus(idx) => {
            state.bonus_nodes[*idx].points = new_total.max(0.0);
        }
        FlowKind::Consolidated { native, bonus_indices } => {
            let native_old = state.node(*native)?.points;
            let bonus_old: Vec<f64> = bonus_indices.iter().map(|i| state.bonus_nodes[*i].points).collect();
            let old_sum: f64 = native_old + bonus_old.iter().sum::<f64>();

            if old_sum <= 0.0 {
                state.node_mut(*native)?.points = new_total.max(0.0);
                for idx in bonus_indices {
                    state.bonus_nodes[*idx].points = 0.0;
                }
                return Ok(());
            }

            state.node_mut(*native)?.points = (new_total * native_old / old_sum).max(0.0);
            for (idx, old) in bonus_indices.iter().zip(bonus_old) {
                state.bonus_nodes[*idx].points = (new_total * old / old_sum).max(0.0);
            }
        }
    }
    Ok(())
}

fn build_flow_units(state: &State) -> Vec<FlowUnit> {
    let mut consolidated_bonus: Vec<Vec<usize>> = vec![Vec::new(); 8];
    let mut leftover_bonus: Vec<usize> = Vec::new();

    for (idx, bonus) in state.bonus_nodes.iter().enumerate() {
        let row = bonus.source_node.slot.row().expect("bonus nodes never sit on hidden-stem slots");
        let col = bonus.pillar.column();
        let native_id = NodeId::new(bonus.pillar, if row == 0 { Slot::HS } else { Slot::EB });
        let native_element = state.nodes.get(&native_id).map(|n| n.element);
        if native_element == Some(bonus.element) {
            consolidated_bonus[col * 2 + row].push(idx);
        } else {
            leftover_bonus.push(idx);
        }
    }

    let mut units = Vec::new();
    for pos in PillarPos::ALL {
        for (slot, row) in [(Slot::HS, 0usize), (Slot::EB, 1usize)] {
            let id = NodeId::new(pos, slot);
            let Some(node) = state.nodes.get(&id) else { continue };
            let bucket = &consolidated_bonus[pos.column() * 2 + row];
            if bucket.is_empty() {
                units.push(FlowUnit { kind: FlowKind::Native(id), element: node.element, position: (pos.column(), row) });
            } else {
                units.push(FlowUnit {
                    kind: FlowKind::Consolidated { native: id, bonus_indices: bucket.clone() },
                    element: node.element,
                    position: (pos.column(), row),
                });
            }
        }
    }

    for idx in leftover_bonus {
        let bonus = &state.bonus_nodes[idx];
        let row = bonus.source_node.slot.row().expect("bonus nodes never sit on hidden-stem slots");
        units.push(FlowUnit { kind: FlowKind::Bonus(idx), element: bonus.element, position: (bonus.pillar.column(), row) });
    }

    units
}

fn manhattan(a: (usize, usize), b: (usize, usize)) -> u32 {
    let dx = (a.0 as i32 - b.0 as i32).unsigned_abs();
    let dy = (a.1 as i32 - b.1 as i32).unsigned_abs();
    dx + dy
}

fn priority_index(state: &State, pos: PillarPos) -> usize {
    state.pillar_priority.iter().position(|p| *p == pos).unwrap_or(usize::MAX)
}

#[instrument(level = "debug", skip(state))]
pub fn run(state: &mut State) -> Result<()> {
    let units = build_flow_units(state);

    let mut pairs: Vec<(usize, usize, u32, usize, bool)> = Vec::new();
    for i in 0..units.len() {
        for j in (i + 1)..units.len() {
            let a = &units[i];
            let b = &units[j];
            if a.element == b.element {
                continue;
            }
            if let (Some(pa), Some(pb)) = (a.native_pillar(), b.native_pillar()) {
                if pa == pb {
                    continue;
                }
            }
            let gap = manhattan(a.position, b.position).saturating_sub(1);
            let anchor = priority_index(state, a.pillar()).min(priority_index(state, b.pillar()));
            let is_production = matches!(element_flow(a.element, b.element), ElementFlow::Produces | ElementFlow::ProducedBy);
            pairs.push((i, j, gap, anchor, is_production));
        }
    }

    pairs.sort_by(|x, y| {
        x.3.cmp(&y.3)
            .then(x.2.cmp(&y.2))
            .then(y.4.cmp(&x.4))
    });

    for (i, j, gap, _, _) in pairs {
        run_pair(state, &units, i, j, gap)?;
    }

    Ok(())
}

fn run_pair(state: &mut State, units: &[FlowUnit], i: usize, j: usize, gap: u32) -> Result<()> {
    let unit_a = units[i].clone();
    let unit_b = units[j].clone();

    let value_a = get_value(state, &unit_a)?;
    let value_b = get_value(state, &unit_b)?;
    let basis = value_a.min(value_b);
    if basis <= 0.0 {
        return Ok(());
    }

    let gap_mult = tables::gap_multiplier(gap);
    let flow = element_flow(unit_a.element, unit_b.element);

    let (producer, produced, controller, controlled) = match flow {
        ElementFlow::Produces => (Some(&unit_a), Some(&unit_b), None, None),
        ElementFlow::ProducedBy => (Some(&unit_b), Some(&unit_a), None, None),
        ElementFlow::Controls => (None, None, Some(&unit_a), Some(&unit_b)),
        ElementFlow::ControlledBy => (None, None, Some(&unit_b), Some(&unit_a)),
        ElementFlow::Same => unreachable!("same-element pairs are filtered out before this point"),
    };

    if let (Some(producer), Some(produced)) = (producer, produced) {
        let producer_val = get_value(state, producer)? - 0.10 * basis * gap_mult;
        let produced_val = get_value(state, produced)? + 0.15 * basis * gap_mult;
        set_value(state, producer, producer_val)?;
        set_value(state, produced, produced_val)?;
    } else if let (Some(controller), Some(controlled)) = (controller, controlled) {
        let controller_val = get_value(state, controller)? - 0.10 * basis * gap_mult;
        let controlled_val = get_value(state, controlled)? - 0.15 * basis * gap_mult;
        set_value(state, controller, controller_val)?;
        set_value(state, controlled, controlled_val)?;
    }

    let mut entry = InteractionLogEntry::new(7, InteractionTag::NaturalFlow.label());
    entry.basis = Some(basis);
    entry.gap_multiplier = Some(gap_mult);
    entry.relationship = Some(format!("{flow:?}"));
    state.interactions.push(entry);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::init_state;
    use crate::types::{Branch, Gender, Location, PillarInput, Stem, WuxingInput};

    fn chart(pillars: [(Stem, Branch); 4]) -> WuxingInput {
        WuxingInput {
            year_pillar: PillarInput::new(pillars[0].0, pillars[0].1),
            month_pillar: PillarInput::new(pillars[1].0, pillars[1].1),
            day_pillar: PillarInput::new(pillars[2].0, pillars[2].1),
            hour_pillar: Some(PillarInput::new(pillars[3].0, pillars[3].1)),
            age: 20,
            gender: Gender::M,
            location: Location::Hometown,
        }
    }

    #[test]
    fn producer_loses_ten_percent_and_produced_gains_fifteen_at_zero_gap() {
        // YP.HS (Jia, Wood) and MP.HS (Bing, Fire) sit one column apart on
        // the same row, so their grid gap reduces to 0 (mult 1.0).
        let mut state = init_state(chart([
            (Stem::Jia, Branch::Zi),
            (Stem::Bing, Branch::Chou),
            (Stem::Wu, Branch::Shen),
            (Stem::Ren, Branch::You),
        ]))
        .unwrap();
        let units = build_flow_units(&state);

        run_pair(&mut state, &units, 0, 2, 0).unwrap();

        let yp_hs = state.node(State::hs_node_id(PillarPos::YP)).unwrap();
        let mp_hs = state.node(State::hs_node_id(PillarPos::MP)).unwrap();
        assert_eq!(yp_hs.points, 9.0);
        assert_eq!(mp_hs.points, 11.5);
    }

    #[test]
    fn same_pillar_native_pair_never_flows() {
        // Every node shares Wood except YP's own branch (Fire main qi);
        // YP.HS's only differing-element partner is YP.EB, which sits at
        // its own native pillar and must be skipped, so YP.HS never
        // takes part in any flow and stays at its starting 10 points.
        let mut state = init_state(chart([
            (Stem::Jia, Branch::Si),
            (Stem::Yi, Branch::Mao),
            (Stem::Jia, Branch::Yin),
            (Stem::Yi, Branch::Mao),
        ]))
        .unwrap();
        run(&mut state).unwrap();

        assert_eq!(state.node(State::hs_node_id(PillarPos::YP)).unwrap().points, 10.0);
    }
}
