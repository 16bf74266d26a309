//! Step 3 — heavenly-stem combos: cross-pillar stem pairs that fuse into
//! a bonus element. Once a stem is consumed by a combo it is excluded
//! from further pairings.

use tracing::instrument;

use crate::error::Result;
use crate::state::{BonusNode, InteractionLogEntry, State};
use crate::tables::{self, InteractionTag, StemComboDef, STEM_COMBOS};
use crate::types::{PillarPos, Slot, Stem};

#[instrument(level = "debug", skip(state))]
pub fn run(state: &mut State) -> Result<()> {
    let order = state.pillar_priority;
    let mut consumed = [false; 4];

    for i in 0..order.len() {
        if consumed[i] {
            continue;
        }
        for j in (i + 1)..order.len() {
            if consumed[j] {
                continue;
            }
            let pa = order[i];
            let pb = order[j];
            if let Some(def) = matching_combo(state.pillar(pa).stem, state.pillar(pb).stem) {
                emit_pair(state, pa, pb, def)?;
                consumed[i] = true;
                consumed[j] = true;
                break;
            }
        }
    }

    Ok(())
}

fn matching_combo(a: Stem, b: Stem) -> Option<StemComboDef> {
    STEM_COMBOS
        .iter()
        .find(|def| (def.a == a && def.b == b) || (def.a == b && def.b == a))
        .copied()
}

fn emit_pair(state: &mut State, pa: PillarPos, pb: PillarPos, def: StemComboDef) -> Result<()> {
    let id_a = State::hs_node_id(pa);
    let id_b = State::hs_node_id(pb);

    let points_a = state.node(id_a)?.points;
    let points_b = state.node(id_b)?.points;
    let basis = points_a.min(points_b);

    let gap = tables::pillar_gap(pa, pb);
    let gap_mult = tables::gap_multiplier(gap);
    let rate = InteractionTag::StemCombos
        .combo_rate()
        .expect("stem combos always carry a combo rate");

    let mut pts_per_node = basis * rate * gap_mult;

    let transformed = PillarPos::ALL
        .into_iter()
        .any(|p| state.node(State::eb_main_node_id(p)).map(|n| n.element) == Ok(def.element));
    if transformed {
        pts_per_node *= tables::TRANSFORMATION_MULTIPLIER;
    }

    for (pos, id) in [(pa, id_a), (pb, id_b)] {
        let polarity = state.node(id)?.polarity;
        let bonus_id = format!(
            "{}.{}+{}_{}",
            pos,
            Slot::HS,
            def.element,
            InteractionTag::StemCombos.label()
        );
        state.bonus_nodes.push(BonusNode {
            id: bonus_id,
            source_node: id,
            pillar: pos,
            element: def.element,
            polarity,
            points: pts_per_node,
            source: InteractionTag::StemCombos.label(),
        });
    }

    let mut entry = InteractionLogEntry::new(3, InteractionTag::StemCombos.label());
    entry.nodes = vec![id_a, id_b];
    entry.node_a = Some(id_a);
    entry.node_b = Some(id_b);
    entry.basis = Some(basis);
    entry.result_element = Some(def.element);
    entry.transformed = transformed;
    entry.gap_multiplier = Some(gap_mult);
    state.interactions.push(entry);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::init_state;
    use crate::types::{Branch, Element, Gender, Location, PillarInput, WuxingInput};

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
    fn adjacent_jia_ji_combo_yields_basis_ten_times_rate_times_gap() {
        // Jia (YP) + Ji (MP), neither branch's main qi is Earth, so no
        // transformation: basis = 10, gap = 1 -> mult 0.75, rate 0.30.
        let mut state = init_state(chart([
            (Stem::Jia, Branch::Zi),
            (Stem::Ji, Branch::Hai),
            (Stem::Bing, Branch::Yin),
            (Stem::Ding, Branch::Mao),
        ]))
        .unwrap();
        run(&mut state).unwrap();

        let entry = state
            .interactions
            .iter()
            .find(|e| e.kind == InteractionTag::StemCombos.label())
            .expect("Jia-Ji stem combo should fire");
        assert_eq!(entry.basis, Some(10.0));
        assert_eq!(entry.gap_multiplier, Some(0.75));
        assert_eq!(entry.result_element, Some(Element::Earth));
        assert!(!entry.transformed);

        let bonus_total: f64 = state
            .bonus_nodes
            .iter()
            .filter(|b| b.source == InteractionTag::StemCombos.label())
            .map(|b| b.points)
            .sum();
        assert_eq!(bonus_total, 2.25 * 2.0);
    }

    #[test]
    fn visible_earth_branch_transforms_the_jia_ji_combo() {
        // Same Jia-Ji pair, but Chen's main qi (Wu, Earth) is now visible.
        let mut state = init_state(chart([
            (Stem::Jia, Branch::Zi),
            (Stem::Ji, Branch::Hai),
            (Stem::Bing, Branch::Chen),
            (Stem::Ding, Branch::Mao),
        ]))
        .unwrap();
        run(&mut state).unwrap();

        let entry = state
            .interactions
            .iter()
            .find(|e| e.kind == InteractionTag::StemCombos.label())
            .expect("Jia-Ji stem combo should fire");
        assert!(entry.transformed);

        let bonus_total: f64 = state
            .bonus_nodes
            .iter()
            .filter(|b| b.source == InteractionTag::StemCombos.label())
            .map(|b| b.points)
            .sum();
        assert_eq!(bonus_total, 5.625 * 2.0);
    }

    #[test]
    fn no_matching_stem_pair_emits_nothing() {
        let mut state = init_state(chart([
            (Stem::Bing, Branch::Zi),
            (Stem::Wu, Branch::Hai),
            (Stem::Geng, Branch::Yin),
            (Stem::Ren, Branch::Mao),
        ]))
        .unwrap();
        run(&mut state).unwrap();

        assert!(state.interactions.is_empty());
        assert!(state.bonus_nodes.is_empty());
    }
}
