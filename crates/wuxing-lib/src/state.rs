//! The mutable node graph (component C2) and its Step-0 initializer.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Result, WuxingError};
use crate::tables;
use crate::types::{
    Branch, Element, NodeId, PillarPos, Polarity, Slot, Stem, WuxingInput,
};

/// A chart node: one heavenly stem or one hidden stem of a branch.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub stem: Stem,
    pub element: Element,
    pub polarity: Polarity,
    pub points: f64,
    pub initial_points: f64,
    pub seasonal_multiplier: Option<f64>,
}

impl Node {
    fn new(id: NodeId, stem: Stem, points: f64) -> Self {
        Node {
            id,
            stem,
            element: stem.element(),
            polarity: stem.polarity(),
            points,
            initial_points: points,
            seasonal_multiplier: None,
        }
    }

    /// Subtract `amount`, clamping at zero. Returns the amount actually
    /// removed.
    pub fn apply_loss(&mut self, amount: f64) -> f64 {
        let removed = amount.min(self.points);
        self.points -= removed;
        if self.points < 0.0 {
            self.points = 0.0;
        }
        removed
    }

    pub fn apply_gain(&mut self, amount: f64) {
        self.points += amount;
    }
}

/// A bonus node spawned by a branch or stem combo (Steps 2 and 3).
#[derive(Clone, Debug, Serialize)]
pub struct BonusNode {
    pub id: String,
    pub source_node: NodeId,
    pub pillar: PillarPos,
    pub element: Element,
    pub polarity: Polarity,
    pub points: f64,
    pub source: &'static str,
}

/// Append-only audit-trail entry. Every field beyond `step` and `kind` is
/// optional; stages only fill in what's relevant to that interaction.
#[derive(Clone, Debug, Default, Serialize)]
pub struct InteractionLogEntry {
    pub step: u8,
    pub kind: String,
    pub nodes: Vec<NodeId>,
    pub branches: Vec<Branch>,
    pub node_a: Option<NodeId>,
    pub node_b: Option<NodeId>,
    pub relationship: Option<String>,
    pub basis: Option<f64>,
    pub result_element: Option<Element>,
    pub transformed: bool,
    pub gap_multiplier: Option<f64>,
    pub attacker: Option<NodeId>,
    pub victim: Option<NodeId>,
    pub log_only: bool,
    pub details: Option<String>,
}

impl InteractionLogEntry {
    pub fn new(step: u8, kind: impl Into<String>) -> Self {
        InteractionLogEntry {
            step,
            kind: kind.into(),
            ..Default::default()
        }
    }
}

/// The full mutable chart under construction. Every stage function takes
/// `&mut State` and mutates it in place; only Step 9 is forbidden from
/// doing so (it reads a snapshot instead).
#[derive(Clone, Debug)]
pub struct State {
    pub input: WuxingInput,
    pub nodes: HashMap<NodeId, Node>,
    pub bonus_nodes: Vec<BonusNode>,
    pub interactions: Vec<InteractionLogEntry>,
    pub season: Element,
    pub pillar_priority: [PillarPos; 4],
    pub attention_map: HashMap<NodeId, Vec<(tables::InteractionTag, f64)>>,
}

impl State {
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or_else(|| {
            WuxingError::internal(format!("node {id} missing from chart"))
        })
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(&id).ok_or_else(|| {
            WuxingError::internal(format!("node {id} missing from chart"))
        })
    }

    pub fn push_attention(&mut self, id: NodeId, tag: tables::InteractionTag, weight: f64) {
        self.attention_map.entry(id).or_default().push((tag, weight));
    }

    /// Sum of attention weights recorded at `id`. Zero if nothing has
    /// attended that node yet (callers should treat a zero total as "no
    /// competition", i.e. a share of 1.0).
    pub fn attention_total(&self, id: NodeId) -> f64 {
        self.attention_map
            .get(&id)
            .map(|entries| entries.iter().map(|(_, w)| *w).sum())
            .unwrap_or(0.0)
    }

    pub fn pillar(&self, pos: PillarPos) -> crate::types::PillarInput {
        match pos {
            PillarPos::YP => self.input.year_pillar,
            PillarPos::MP => self.input.month_pillar,
            PillarPos::DP => self.input.day_pillar,
            PillarPos::HP => self.input.resolved_hour_pillar(),
        }
    }

    pub fn hs_node_id(pos: PillarPos) -> NodeId {
        NodeId::new(pos, Slot::HS)
    }

    pub fn eb_main_node_id(pos: PillarPos) -> NodeId {
        NodeId::new(pos, Slot::EB)
    }
}

/// Step 0: build the mutable node graph from the four input pillars.
pub fn init_state(input: WuxingInput) -> Result<State> {
    let mut nodes = HashMap::new();

    for pos in PillarPos::ALL {
        let pillar = match pos {
            PillarPos::YP => input.year_pillar,
            PillarPos::MP => input.month_pillar,
            PillarPos::DP => input.day_pillar,
            PillarPos::HP => input.resolved_hour_pillar(),
        };

        nodes.insert(
            NodeId::new(pos, Slot::HS),
            Node::new(NodeId::new(pos, Slot::HS), pillar.stem, tables::HS_START_POINTS),
        );

        let residents = tables::hidden_stems(pillar.branch);
        let slots = [Slot::EB, Slot::EbH1, Slot::EbH2];
        for (resident, slot) in residents.iter().zip(slots) {
            let (stem, points) = *resident;
            nodes.insert(NodeId::new(pos, slot), Node::new(NodeId::new(pos, slot), stem, points));
        }
    }

    let season = tables::month_branch_season(input.month_pillar.branch);
    let pillar_priority = pillar_priority(input.age);

    Ok(State {
        input,
        nodes,
        bonus_nodes: Vec::new(),
        interactions: Vec::new(),
        season,
        pillar_priority,
        attention_map: HashMap::new(),
    })
}

/// Step 0.4: pillar priority from age.
///
/// Brackets: YP `[0,16]`, MP `[17,32]`, DP `[33,48]`, HP `[49, +inf)`.
/// 1. The active pillar (the one whose bracket contains `age`) comes first.
/// 2. DP always comes second unless it was already first.
/// 3. The remaining two pillars are ordered by distance from `age` to the
///    nearest bracket boundary.
pub fn pillar_priority(age: u32) -> [PillarPos; 4] {
    let active = active_bracket(age);

    let mut rest: Vec<PillarPos> = PillarPos::ALL.into_iter().filter(|p| *p != active).collect();

    if active != PillarPos::DP {
        rest.retain(|p| *p != PillarPos::DP);
        rest.sort_by(|a, b| {
            boundary_distance(age, *a)
                .partial_cmp(&boundary_distance(age, *b))
                .unwrap()
        });
        let mut order = vec![active, PillarPos::DP];
        order.extend(rest);
        [order[0], order[1], order[2], order[3]]
    } else {
        rest.sort_by(|a, b| {
            boundary_distance(age, *a)
                .partial_cmp(&boundary_distance(age, *b))
                .unwrap()
        });
        [active, rest[0], rest[1], rest[2]]
    }
}

fn bracket(pos: PillarPos) -> (u32, Option<u32>) {
    match pos {
        PillarPos::YP => (0, Some(16)),
        PillarPos::MP => (17, Some(32)),
        PillarPos::DP => (33, Some(48)),
        PillarPos::HP => (49, None),
    }
}

fn active_bracket(age: u32) -> PillarPos {
    for pos in PillarPos::ALL {
        let (lo, hi) = bracket(pos);
        if age >= lo && hi.map_or(true, |hi| age <= hi) {
            return pos;
        }
    }
    PillarPos::HP
}

fn boundary_distance(age: u32, pos: PillarPos) -> f64 {
    let (lo, hi) = bracket(pos);
    let lo_dist = (age as i64 - lo as i64).unsigned_abs() as f64;
    let hi_dist = hi.map(|hi| (age as i64 - hi as i64).unsigned_abs() as f64);
    match hi_dist {
        Some(hi_dist) => lo_dist.min(hi_dist),
        None => lo_dist,
    }
}
