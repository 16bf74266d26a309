//! Component C5 (Step 9): the read-only balance simulator. Ten
//! independent hovering-stem simulations, one per heavenly stem, each
//! scored against the frozen post-Step-7 baseline and collapsed into a
//! sigma per element.

use std::collections::HashMap;

use serde::Serialize;

use crate::aggregate;
use crate::state::State;
use crate::types::{element_flow, Element, ElementFlow, NodeId, PillarPos, Role, Slot, Stem};

const HOVER_START: f64 = 10.0;
const HOVER_GAP_MULT: f64 = 0.75;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Gods {
    pub useful: Element,
    pub favorable: Element,
    pub unfavorable: Element,
    pub enemy: Element,
    pub idle: Element,
}

impl Gods {
    /// The element assigned to a given role.
    pub fn element_for(&self, role: Role) -> Element {
        match role {
            Role::Useful => self.useful,
            Role::Favorable => self.favorable,
            Role::Unfavorable => self.unfavorable,
            Role::Enemy => self.enemy,
            Role::Idle => self.idle,
        }
    }

    /// All five role/element pairs, in spec order.
    pub fn pairs(&self) -> [(Role, Element); 5] {
        [
            (Role::Useful, self.useful),
            (Role::Favorable, self.favorable),
            (Role::Unfavorable, self.unfavorable),
            (Role::Enemy, self.enemy),
            (Role::Idle, self.idle),
        ]
    }
}

fn visible_native_order() -> [NodeId; 8] {
    let mut ids = [NodeId::new(PillarPos::YP, Slot::HS); 8];
    let mut i = 0;
    for pos in PillarPos::ALL {
        for slot in [Slot::HS, Slot::EB] {
            ids[i] = NodeId::new(pos, slot);
            i += 1;
        }
    }
    ids
}

fn producer_of(target: Element) -> Element {
    Element::ALL.into_iter().find(|e| e.produces() == target).expect("production cycle covers every element")
}

/// Run one stem's hovering simulation against the frozen `base` totals
/// and per-node baseline points. Returns this stem's sigma.
fn simulate_stem(
    stem: Stem,
    base: &HashMap<Element, f64>,
    node_points: &HashMap<NodeId, f64>,
    node_elements: &HashMap<NodeId, Element>,
    dm_element: Element,
) -> f64 {
    let hovering_element = stem.element();
    let mut hovering_points = HOVER_START;
    let mut deltas: HashMap<Element, f64> = HashMap::new();

    for id in visible_native_order() {
        let native_element = node_elements[&id];
        if native_element == hovering_element {
            continue;
        }
        let native_points = node_points[&id];
        let basis = hovering_points.min(native_points);
        if basis <= 0.0 {
            continue;
        }

        match element_flow(hovering_element, native_element) {
            ElementFlow::Produces => {
                let hover_loss = 0.10 * basis * HOVER_GAP_MULT;
                let native_gain = 0.15 * basis * HOVER_GAP_MULT;
                hovering_points -= hover_loss;
                *deltas.entry(hovering_element).or_insert(0.0) -= hover_loss;
                *deltas.entry(native_element).or_insert(0.0) += native_gain;
            }
            ElementFlow::ProducedBy => {
                let native_loss = 0.10 * basis * HOVER_GAP_MULT;
                let hover_gain = 0.15 * basis * HOVER_GAP_MULT;
                hovering_points += hover_gain;
                *deltas.entry(native_element).or_insert(0.0) -= native_loss;
                *deltas.entry(hovering_element).or_insert(0.0) += hover_gain;
            }
            ElementFlow::Controls => {
                let hover_loss = 0.10 * basis * HOVER_GAP_MULT;
                let native_loss = 0.15 * basis * HOVER_GAP_MULT;
                hovering_points -= hover_loss;
                *deltas.entry(hovering_element).or_insert(0.0) -= hover_loss;
                *deltas.entry(native_element).or_insert(0.0) -= native_loss;
            }
            ElementFlow::ControlledBy => {
                let native_loss = 0.10 * basis * HOVER_GAP_MULT;
                let hover_loss = 0.15 * basis * HOVER_GAP_MULT;
                hovering_points -= hover_loss;
                *deltas.entry(native_element).or_insert(0.0) -= native_loss;
                *deltas.entry(hovering_element).or_insert(0.0) -= hover_loss;
            }
            ElementFlow::Same => unreachable!("same-element nodes are skipped above"),
        }
    }

    let totals: HashMap<Element, f64> = Element::ALL
        .iter()
        .map(|e| (*e, (base.get(e).copied().unwrap_or(0.0) + deltas.get(e).copied().unwrap_or(0.0)).max(0.0)))
        .collect();
    let grand: f64 = totals.values().sum();

    if grand <= 0.0 {
        return f64::INFINITY;
    }

    let percents: HashMap<Element, f64> = totals.iter().map(|(e, t)| (*e, t / grand * 100.0)).collect();

    let variance: f64 = percents.values().map(|p| (p - 20.0).powi(2)).sum::<f64>() / 5.0;
    let mut sigma = variance.sqrt();

    let dm_pct = percents[&dm_element];
    if dm_pct < 8.0 {
        sigma += 5.0;
    } else if dm_pct > 40.0 {
        sigma += 3.0;
    }

    sigma
}

pub fn simulate(state: &State) -> Gods {
    let base = aggregate::element_totals(state);
    let dm_element = state.input.day_pillar.stem.element();

    let node_points: HashMap<NodeId, f64> =
        visible_native_order().into_iter().map(|id| (id, state.node(id).map(|n| n.points).unwrap_or(0.0))).collect();
    let node_elements: HashMap<NodeId, Element> =
        visible_native_order().into_iter().map(|id| (id, state.node(id).map(|n| n.element).unwrap_or(dm_element))).collect();

    let mut per_stem_sigma: HashMap<Stem, f64> = HashMap::new();
    for stem in Stem::ALL {
        let sigma = simulate_stem(stem, &base, &node_points, &node_elements, dm_element);
        per_stem_sigma.insert(stem, sigma);
    }

    let mut per_element_sigma: Vec<(Element, f64)> = Element::ALL
        .iter()
        .map(|e| {
            let stems: Vec<Stem> = Stem::ALL.into_iter().filter(|s| s.element() == *e).collect();
            let avg = stems.iter().map(|s| per_stem_sigma[s]).sum::<f64>() / stems.len() as f64;
            (*e, avg)
        })
        .collect();

    per_element_sigma.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

    let useful = per_element_sigma[0].0;
    let unfavorable = per_element_sigma[4].0;
    let preferred_favorable = producer_of(useful);
    let preferred_enemy = producer_of(unfavorable);

    let candidates = [useful, preferred_favorable, preferred_enemy, unfavorable];
    let all_distinct = candidates.iter().enumerate().all(|(i, a)| candidates[(i + 1)..].iter().all(|b| a != b));

    if all_distinct {
        let idle = Element::ALL.into_iter().find(|e| !candidates.contains(e)).unwrap();
        Gods { useful, favorable: preferred_favorable, unfavorable, enemy: preferred_enemy, idle }
    } else {
        Gods {
            useful,
            favorable: per_element_sigma[1].0,
            idle: per_element_sigma[2].0,
            enemy: per_element_sigma[3].0,
            unfavorable,
        }
    }
}
