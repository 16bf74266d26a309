//! Step 2 — earthly-branch positive interactions: three-phase detection
//! (pre-scan, nullification, attention map) followed by priority-ordered
//! emission of bonus nodes.

use std::collections::HashSet;

use tracing::instrument;

use crate::error::Result;
use crate::state::{BonusNode, InteractionLogEntry, State};
use crate::tables::{
    self, combo_key, ComboDef, DirectedBranchPair, InteractionTag, DESTRUCTIONS, PUNISHMENT_SHI,
    PUNISHMENT_WULI, SIX_CLASHES, SIX_HARMS, TRANSFORMATION_MULTIPLIER,
};
use crate::types::{Branch, Element, NodeId, PillarPos, Slot};

/// One way a `ComboDef`'s branches line up with distinct pillars in this
/// chart.
#[derive(Clone, Debug)]
struct ComboInstance {
    tag: InteractionTag,
    element: Element,
    assignment: Vec<(Branch, PillarPos)>,
    nullified: bool,
}

impl ComboInstance {
    fn pillars(&self) -> Vec<PillarPos> {
        self.assignment.iter().map(|(_, p)| *p).collect()
    }

    fn branches(&self) -> Vec<Branch> {
        self.assignment.iter().map(|(b, _)| *b).collect()
    }

    fn dedupe_key(&self) -> String {
        let mut pillars: Vec<&'static str> = self.pillars().iter().map(|p| p.label()).collect();
        pillars.sort_unstable();
        let mut branches: Vec<&'static str> = self.branches().iter().map(|b| b.label()).collect();
        branches.sort_unstable();
        format!("{:?}|{}|{}", self.tag, pillars.join(","), branches.join(","))
    }
}

fn pillars_with_branch(state: &State, branch: Branch) -> Vec<PillarPos> {
    PillarPos::ALL
        .into_iter()
        .filter(|p| state.pillar(*p).branch == branch)
        .collect()
}

fn cartesian(lists: &[Vec<PillarPos>]) -> Vec<Vec<PillarPos>> {
    lists.iter().fold(vec![Vec::new()], |acc, list| {
        acc.into_iter()
            .flat_map(|prefix| {
                list.iter().map(move |p| {
                    let mut next = prefix.clone();
                    next.push(*p);
                    next
                })
            })
            .collect()
    })
}

fn enumerate_combo(state: &State, def: &ComboDef) -> Vec<ComboInstance> {
    let candidate_lists: Vec<Vec<PillarPos>> =
        def.branches.iter().map(|b| pillars_with_branch(state, *b)).collect();
    if candidate_lists.iter().any(Vec::is_empty) {
        return Vec::new();
    }
    cartesian(&candidate_lists)
        .into_iter()
        .filter(|pillars| {
            let mut sorted = pillars.clone();
            sorted.sort_by_key(|p| p.column());
            sorted.windows(2).all(|w| w[0] != w[1])
        })
        .map(|pillars| ComboInstance {
            tag: def.tag,
            element: def.element,
            assignment: def.branches.iter().copied().zip(pillars).collect(),
            nullified: false,
        })
        .collect()
}

fn phase_a_positive(state: &State) -> Vec<ComboInstance> {
    tables::POSITIVE_COMBO_FAMILIES
        .iter()
        .flat_map(|family| family.iter().flat_map(|def| enumerate_combo(state, def)))
        .collect()
}

fn is_subset(small: &[Branch], big: &[Branch]) -> bool {
    small.iter().all(|b| big.contains(b))
}

/// Phase B: three-branch trios suppress the 2-branch subsets drawn from
/// the same branches.
fn phase_b_nullify(instances: &mut [ComboInstance]) {
    let trios: Vec<(InteractionTag, Vec<Branch>)> = instances
        .iter()
        .filter(|i| matches!(i.tag, InteractionTag::ThreeMeetings | InteractionTag::ThreeCombos))
        .map(|i| (i.tag, i.branches()))
        .collect();

    for instance in instances.iter_mut() {
        let suppressible = match instance.tag {
            InteractionTag::HalfMeetings | InteractionTag::SixHarmonies => {
                InteractionTag::ThreeMeetings
            }
            InteractionTag::ArchedCombos => InteractionTag::ThreeCombos,
            _ => continue,
        };
        let branches = instance.branches();
        if trios
            .iter()
            .any(|(tag, trio_branches)| *tag == suppressible && is_subset(&branches, trio_branches))
        {
            instance.nullified = true;
        }
    }
}

struct NegativeHit {
    tag: InteractionTag,
    nodes: Vec<NodeId>,
}

fn phase_a_negative(state: &State) -> Vec<NegativeHit> {
    let mut hits = Vec::new();

    for pair in SIX_CLASHES.iter() {
        let (a, b) = match pair {
            DirectedBranchPair::Directed { attacker, victim } => (*attacker, *victim),
            DirectedBranchPair::SameElementLogOnly { a, b } => (*a, *b),
        };
        for pa in pillars_with_branch(state, a) {
            for pb in pillars_with_branch(state, b) {
                if pa != pb {
                    hits.push(NegativeHit {
                        tag: InteractionTag::SixClash,
                        nodes: vec![State::eb_main_node_id(pa), State::eb_main_node_id(pb)],
                    });
                }
            }
        }
    }

    for pair in DESTRUCTIONS.iter() {
        let (a, b) = match pair {
            DirectedBranchPair::Directed { attacker, victim } => (*attacker, *victim),
            DirectedBranchPair::SameElementLogOnly { a, b } => (*a, *b),
        };
        for pa in pillars_with_branch(state, a) {
            for pb in pillars_with_branch(state, b) {
                if pa != pb {
                    hits.push(NegativeHit {
                        tag: InteractionTag::Destruction,
                        nodes: vec![State::eb_main_node_id(pa), State::eb_main_node_id(pb)],
                    });
                }
            }
        }
    }

    for trio in [PUNISHMENT_SHI, PUNISHMENT_WULI] {
        let candidate_lists: Vec<Vec<PillarPos>> =
            trio.iter().map(|b| pillars_with_branch(state, *b)).collect();
        if candidate_lists.iter().any(Vec::is_empty) {
            continue;
        }
        for pillars in cartesian(&candidate_lists) {
            let mut sorted = pillars.clone();
            sorted.sort_by_key(|p| p.column());
            if sorted.windows(2).any(|w| w[0] == w[1]) {
                continue;
            }
            hits.push(NegativeHit {
                tag: InteractionTag::Punishment,
                nodes: pillars.iter().map(|p| State::eb_main_node_id(*p)).collect(),
            });
        }
    }

    for (a, b) in SIX_HARMS {
        for pa in pillars_with_branch(state, a) {
            for pb in pillars_with_branch(state, b) {
                if pa != pb && tables::pillar_gap(pa, pb) == 1 {
                    hits.push(NegativeHit {
                        tag: InteractionTag::SixHarm,
                        nodes: vec![State::eb_main_node_id(pa), State::eb_main_node_id(pb)],
                    });
                }
            }
        }
    }

    hits
}

fn phase_c_attention(state: &mut State, positives: &[ComboInstance], negatives: &[NegativeHit]) {
    for instance in positives.iter().filter(|i| !i.nullified) {
        let Some(weight) = instance.tag.attention_weight() else {
            continue;
        };
        for (_, pillar) in &instance.assignment {
            state.push_attention(State::eb_main_node_id(*pillar), instance.tag, weight);
        }
    }
    for hit in negatives {
        let Some(weight) = hit.tag.attention_weight() else {
            continue;
        };
        for node in &hit.nodes {
            state.push_attention(*node, hit.tag, weight);
        }
    }
}

fn visible_hs_elements(state: &State) -> Vec<Element> {
    PillarPos::ALL
        .into_iter()
        .filter_map(|p| state.nodes.get(&State::hs_node_id(p)).map(|n| n.element))
        .collect()
}

fn three_branch_gap(pillars: &[PillarPos]) -> u32 {
    let cols: Vec<usize> = pillars.iter().map(|p| p.column()).collect();
    let span = cols.iter().max().unwrap() - cols.iter().min().unwrap() + 1;
    (span - pillars.len()) as u32
}

#[instrument(level = "debug", skip(state))]
pub fn run(state: &mut State) -> Result<()> {
    let mut positives = phase_a_positive(state);
    let negatives = phase_a_negative(state);
    phase_b_nullify(&mut positives);
    phase_c_attention(state, &positives, &negatives);

    let mut emitted: HashSet<String> = HashSet::new();
    let pillar_priority = state.pillar_priority;

    for pos in pillar_priority {
        let mut here: Vec<&ComboInstance> = positives
            .iter()
            .filter(|i| !i.nullified)
            .filter(|i| i.assignment.iter().any(|(_, p)| *p == pos))
            .filter(|i| !emitted.contains(&i.dedupe_key()))
            .collect();
        here.sort_by_key(|i| i.tag.positive_strength_rank().unwrap_or(255));

        for instance in here {
            emitted.insert(instance.dedupe_key());
            emit_combo(state, instance)?;
        }
    }

    Ok(())
}

fn emit_combo(state: &mut State, instance: &ComboInstance) -> Result<()> {
    let rate = instance
        .tag
        .combo_rate()
        .expect("positive combo families always carry a combo rate");

    let mut basis = f64::INFINITY;
    for (_, pillar) in &instance.assignment {
        let points = state.node(State::eb_main_node_id(*pillar))?.points;
        basis = basis.min(points);
    }

    let pillars = instance.pillars();
    let gap = if pillars.len() == 3 {
        three_branch_gap(&pillars)
    } else {
        tables::pillar_gap(pillars[0], pillars[1])
    };
    let gap_mult = tables::gap_multiplier(gap);

    let mut pts_per_node = basis * rate * gap_mult;

    let transformed = visible_hs_elements(state).contains(&instance.element);
    if transformed {
        pts_per_node *= TRANSFORMATION_MULTIPLIER;
    }

    let key = combo_key(&instance.branches());
    let weight = instance.tag.attention_weight().unwrap_or(0.0);

    let mut touched = Vec::new();
    for (_, pillar) in &instance.assignment {
        let node_id = State::eb_main_node_id(*pillar);
        let total_weight = state.attention_total(node_id);
        let share = if total_weight > 0.0 { weight / total_weight } else { 1.0 };
        let points = pts_per_node * share;
        let polarity = state.pillar(*pillar).branch.polarity();

        let bonus_id = format!("{}.{}+{}_{}", pillar, Slot::EB, instance.element, instance.tag.label());
        state.bonus_nodes.push(BonusNode {
            id: bonus_id,
            source_node: node_id,
            pillar: *pillar,
            element: instance.element,
            polarity,
            points,
            source: instance.tag.label(),
        });
        touched.push(node_id);
    }

    let mut entry = InteractionLogEntry::new(2, instance.tag.label());
    entry.nodes = touched;
    entry.branches = instance.branches();
    entry.basis = Some(basis);
    entry.result_element = Some(instance.element);
    entry.transformed = transformed;
    entry.gap_multiplier = Some(gap_mult);
    entry.details = Some(key);
    state.interactions.push(entry);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::init_state;
    use crate::types::{Gender, Location, PillarInput, Stem, WuxingInput};

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
    fn three_meeting_trio_nullifies_its_half_meeting_subsets() {
        // Si-Wu-Wei (THREE_MEETINGS -> Fire) is present; its three
        // HALF_MEETINGS subsets (Si-Wu, Wu-Wei, Si-Wei) must be suppressed.
        let mut state = init_state(chart([
            (Stem::Bing, Branch::Si),
            (Stem::Ding, Branch::Wu),
            (Stem::Ji, Branch::Wei),
            (Stem::Geng, Branch::Shen),
        ]))
        .unwrap();
        run(&mut state).unwrap();

        assert!(state.interactions.iter().any(|e| e.kind == InteractionTag::ThreeMeetings.label()
            && e.result_element == Some(Element::Fire)));
        assert!(
            !state.interactions.iter().any(|e| e.kind == InteractionTag::HalfMeetings.label()),
            "half-meetings should be nullified once the covering trio fires: {:?}",
            state.interactions
        );

        // Wu (month pillar) only ever pairs with Si/Wei inside the trio
        // itself, so once those subsets are nullified its attention total
        // is exactly the trio's own weight.
        let wu = State::eb_main_node_id(PillarPos::MP);
        assert_eq!(state.attention_total(wu), InteractionTag::ThreeMeetings.attention_weight().unwrap());
    }

    #[test]
    fn visible_matching_stem_transforms_the_combo_and_at_least_doubles_its_bonus() {
        // Yin-Wu-Xu (THREE_COMBOS -> Fire) with Bing/Ding (Fire) visible as
        // HS should transform; the same branch shape with no Fire HS
        // visible should not, and should yield a smaller bonus total.
        let mut transformed_state = init_state(chart([
            (Stem::Bing, Branch::Yin),
            (Stem::Ding, Branch::Wu),
            (Stem::Jia, Branch::Xu),
            (Stem::Geng, Branch::Shen),
        ]))
        .unwrap();
        run(&mut transformed_state).unwrap();

        let mut plain_state = init_state(chart([
            (Stem::Jia, Branch::Yin),
            (Stem::Wu, Branch::Wu),
            (Stem::Geng, Branch::Xu),
            (Stem::Ren, Branch::Shen),
        ]))
        .unwrap();
        run(&mut plain_state).unwrap();

        let combo_entry = transformed_state
            .interactions
            .iter()
            .find(|e| e.kind == InteractionTag::ThreeCombos.label() && e.result_element == Some(Element::Fire))
            .expect("Yin-Wu-Xu three-combo should fire");
        assert!(combo_entry.transformed);

        let plain_entry = plain_state
            .interactions
            .iter()
            .find(|e| e.kind == InteractionTag::ThreeCombos.label() && e.result_element == Some(Element::Fire))
            .expect("Yin-Wu-Xu three-combo should fire regardless of HS visibility");
        assert!(!plain_entry.transformed);

        let bonus_total = |state: &State| -> f64 {
            state
                .bonus_nodes
                .iter()
                .filter(|b| b.source == InteractionTag::ThreeCombos.label() && b.element == Element::Fire)
                .map(|b| b.points)
                .sum()
        };
        let transformed_total = bonus_total(&transformed_state);
        let plain_total = bonus_total(&plain_state);
        assert!(
            transformed_total >= 2.0 * plain_total,
            "transformed total {transformed_total} should be at least double the plain total {plain_total}"
        );
    }
}
