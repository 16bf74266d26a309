//! Component C4 (Step 8): sum every primary and bonus node into
//! per-element totals, percentages and ranks.

use std::collections::HashMap;

use serde::Serialize;

use crate::state::State;
use crate::types::Element;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct ElementSummary {
    pub total: f64,
    pub percent: f64,
    pub rank: u8,
}

/// Round-half-to-even at `decimals` places, per the numerical surface
/// contract (not the `round()` default of round-half-away-from-zero).
pub(crate) fn round_half_even(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = x * factor;
    let floor = scaled.floor();
    let diff = scaled - floor;

    let rounded = if (diff - 0.5).abs() < 1e-9 {
        if (floor as i64).rem_euclid(2) == 0 {
            floor
        } else {
            floor + 1.0
        }
    } else {
        scaled.round()
    };

    rounded / factor
}

/// Raw (unrounded) per-element totals, summing every primary node
/// (including hidden stems) and every bonus node. This is also the
/// baseline Step 9 simulates against.
pub fn element_totals(state: &State) -> HashMap<Element, f64> {
    let mut totals: HashMap<Element, f64> = Element::ALL.iter().map(|e| (*e, 0.0)).collect();

    for node in state.nodes.values() {
        *totals.entry(node.element).or_insert(0.0) += node.points;
    }
    for bonus in &state.bonus_nodes {
        *totals.entry(bonus.element).or_insert(0.0) += bonus.points;
    }

    totals
}

pub fn aggregate(state: &State) -> HashMap<Element, ElementSummary> {
    let totals = element_totals(state);
    let grand: f64 = totals.values().sum();

    let mut ranked: Vec<Element> = Element::ALL.to_vec();
    ranked.sort_by(|a, b| {
        totals[b]
            .partial_cmp(&totals[a])
            .unwrap()
            .then_with(|| a.index().cmp(&b.index()))
    });

    let mut ranks: HashMap<Element, u8> = HashMap::new();
    for (i, element) in ranked.into_iter().enumerate() {
        ranks.insert(element, (i + 1) as u8);
    }

    Element::ALL
        .iter()
        .map(|e| {
            let total = totals[e];
            let percent = if grand > 0.0 { round_half_even(total / grand * 100.0, 2) } else { 0.0 };
            (*e, ElementSummary { total, percent, rank: ranks[e] })
        })
        .collect()
}
