//! Component C6: assembles the final, serializable result from a fully
//! interacted state plus the Step 8/9 outputs.

use std::collections::HashMap;

use serde::Serialize;

use crate::aggregate::ElementSummary;
use crate::balance::Gods;
use crate::state::{BonusNode, InteractionLogEntry, State};
use crate::types::{Element, Polarity, Stem, Strength};

#[derive(Clone, Copy, Debug, Serialize)]
pub struct NodeOutput {
    pub stem: Stem,
    pub element: Element,
    pub polarity: Polarity,
    pub initial: f64,
    pub r#final: f64,
    pub delta: f64,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct DayMaster {
    pub stem: Stem,
    pub element: Element,
    pub percent: f64,
    pub strength: Strength,
}

#[derive(Clone, Debug, Serialize)]
pub struct WuxingResult {
    pub nodes: HashMap<String, NodeOutput>,
    pub bonus_nodes: Vec<BonusNode>,
    pub elements: HashMap<Element, ElementSummary>,
    pub day_master: DayMaster,
    pub gods: Gods,
    pub interactions: Vec<InteractionLogEntry>,
}

pub fn assemble(
    state: &State,
    elements: HashMap<Element, ElementSummary>,
    gods: Gods,
) -> WuxingResult {
    let nodes: HashMap<String, NodeOutput> = state
        .nodes
        .iter()
        .map(|(id, node)| {
            (
                id.to_string(),
                NodeOutput {
                    stem: node.stem,
                    element: node.element,
                    polarity: node.polarity,
                    initial: node.initial_points,
                    r#final: node.points,
                    delta: node.points - node.initial_points,
                },
            )
        })
        .collect();

    let dm_stem = state.input.day_pillar.stem;
    let dm_element = dm_stem.element();
    let dm_percent = elements[&dm_element].percent;
    let day_master = DayMaster {
        stem: dm_stem,
        element: dm_element,
        percent: dm_percent,
        strength: Strength::classify(dm_percent),
    };

    WuxingResult {
        nodes,
        bonus_nodes: state.bonus_nodes.clone(),
        elements,
        day_master,
        gods,
        interactions: state.interactions.clone(),
    }
}
