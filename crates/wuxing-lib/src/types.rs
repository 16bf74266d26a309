//! Closed enumerations and small value types shared by every stage.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    pub const ALL: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    /// Wood -> Fire -> Earth -> Metal -> Water -> Wood.
    pub fn produces(self) -> Element {
        match self {
            Element::Wood => Element::Fire,
            Element::Fire => Element::Earth,
            Element::Earth => Element::Metal,
            Element::Metal => Element::Water,
            Element::Water => Element::Wood,
        }
    }

    /// Wood -> Earth -> Water -> Fire -> Metal -> Wood.
    pub fn controls(self) -> Element {
        match self {
            Element::Wood => Element::Earth,
            Element::Earth => Element::Water,
            Element::Water => Element::Fire,
            Element::Fire => Element::Metal,
            Element::Metal => Element::Wood,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Element::Wood => 0,
            Element::Fire => 1,
            Element::Earth => 2,
            Element::Metal => 3,
            Element::Water => 4,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Element::Wood => "Wood",
            Element::Fire => "Fire",
            Element::Earth => "Earth",
            Element::Metal => "Metal",
            Element::Water => "Water",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    Yang,
    Yin,
}

/// How one element relates to another, from the first element's point of
/// view. Used internally to derive the slot-flavored `Relation` (Step 1)
/// and the direction of Step 7/9 production-control flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ElementFlow {
    Same,
    Produces,
    ProducedBy,
    Controls,
    ControlledBy,
}

pub(crate) fn element_flow(a: Element, b: Element) -> ElementFlow {
    if a == b {
        ElementFlow::Same
    } else if a.produces() == b {
        ElementFlow::Produces
    } else if b.produces() == a {
        ElementFlow::ProducedBy
    } else if a.controls() == b {
        ElementFlow::Controls
    } else {
        debug_assert_eq!(b.controls(), a, "every element pair is in exactly one flow relation");
        ElementFlow::ControlledBy
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum Stem {
    Jia,
    Yi,
    Bing,
    Ding,
    Wu,
    Ji,
    Geng,
    Xin,
    Ren,
    Gui,
}

impl Stem {
    /// Enumeration order used by Step 9's balance simulator.
    pub const ALL: [Stem; 10] = [
        Stem::Jia,
        Stem::Yi,
        Stem::Bing,
        Stem::Ding,
        Stem::Wu,
        Stem::Ji,
        Stem::Geng,
        Stem::Xin,
        Stem::Ren,
        Stem::Gui,
    ];

    pub fn element(self) -> Element {
        match self {
            Stem::Jia | Stem::Yi => Element::Wood,
            Stem::Bing | Stem::Ding => Element::Fire,
            Stem::Wu | Stem::Ji => Element::Earth,
            Stem::Geng | Stem::Xin => Element::Metal,
            Stem::Ren | Stem::Gui => Element::Water,
        }
    }

    pub fn polarity(self) -> Polarity {
        match self {
            Stem::Jia | Stem::Bing | Stem::Wu | Stem::Geng | Stem::Ren => Polarity::Yang,
            Stem::Yi | Stem::Ding | Stem::Ji | Stem::Xin | Stem::Gui => Polarity::Yin,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stem::Jia => "Jia",
            Stem::Yi => "Yi",
            Stem::Bing => "Bing",
            Stem::Ding => "Ding",
            Stem::Wu => "Wu",
            Stem::Ji => "Ji",
            Stem::Geng => "Geng",
            Stem::Xin => "Xin",
            Stem::Ren => "Ren",
            Stem::Gui => "Gui",
        }
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum Branch {
    Zi,
    Chou,
    Yin,
    Mao,
    Chen,
    Si,
    Wu,
    Wei,
    Shen,
    You,
    Xu,
    Hai,
}

impl Branch {
    pub const ALL: [Branch; 12] = [
        Branch::Zi,
        Branch::Chou,
        Branch::Yin,
        Branch::Mao,
        Branch::Chen,
        Branch::Si,
        Branch::Wu,
        Branch::Wei,
        Branch::Shen,
        Branch::You,
        Branch::Xu,
        Branch::Hai,
    ];

    pub fn element(self) -> Element {
        match self {
            Branch::Zi => Element::Water,
            Branch::Chou => Element::Earth,
            Branch::Yin => Element::Wood,
            Branch::Mao => Element::Wood,
            Branch::Chen => Element::Earth,
            Branch::Si => Element::Fire,
            Branch::Wu => Element::Fire,
            Branch::Wei => Element::Earth,
            Branch::Shen => Element::Metal,
            Branch::You => Element::Metal,
            Branch::Xu => Element::Earth,
            Branch::Hai => Element::Water,
        }
    }

    pub fn polarity(self) -> Polarity {
        match self {
            Branch::Zi | Branch::Yin | Branch::Chen | Branch::Wu | Branch::Shen | Branch::Xu => {
                Polarity::Yang
            }
            Branch::Chou
            | Branch::Mao
            | Branch::Si
            | Branch::Wei
            | Branch::You
            | Branch::Hai => Polarity::Yin,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Branch::Zi => "Zi",
            Branch::Chou => "Chou",
            Branch::Yin => "Yin",
            Branch::Mao => "Mao",
            Branch::Chen => "Chen",
            Branch::Si => "Si",
            Branch::Wu => "Wu",
            Branch::Wei => "Wei",
            Branch::Shen => "Shen",
            Branch::You => "You",
            Branch::Xu => "Xu",
            Branch::Hai => "Hai",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PillarPos {
    YP,
    MP,
    DP,
    HP,
}

impl PillarPos {
    pub const ALL: [PillarPos; 4] = [PillarPos::YP, PillarPos::MP, PillarPos::DP, PillarPos::HP];

    /// Grid column, also used as the pillar-gap basis (Steps 1-6).
    pub fn column(self) -> usize {
        match self {
            PillarPos::YP => 0,
            PillarPos::MP => 1,
            PillarPos::DP => 2,
            PillarPos::HP => 3,
        }
    }

    pub fn from_column(column: usize) -> PillarPos {
        PillarPos::ALL[column]
    }

    pub fn label(self) -> &'static str {
        match self {
            PillarPos::YP => "YP",
            PillarPos::MP => "MP",
            PillarPos::DP => "DP",
            PillarPos::HP => "HP",
        }
    }
}

impl fmt::Display for PillarPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    HS,
    EB,
    EbH1,
    EbH2,
}

impl Slot {
    /// Grid row (Step 7); hidden stems aren't on the grid.
    pub fn row(self) -> Option<usize> {
        match self {
            Slot::HS => Some(0),
            Slot::EB => Some(1),
            Slot::EbH1 | Slot::EbH2 => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Slot::HS => "HS",
            Slot::EB => "EB",
            Slot::EbH1 => "EB.h1",
            Slot::EbH2 => "EB.h2",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stable node identifier, e.g. `DP.EB.h1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    pub pillar: PillarPos,
    pub slot: Slot,
}

impl NodeId {
    pub fn new(pillar: PillarPos, slot: Slot) -> Self {
        NodeId { pillar, slot }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.pillar, self.slot)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeasonalState {
    Prosperous,
    Prime,
    Rest,
    Imprisoned,
    Dead,
}

impl SeasonalState {
    pub fn multiplier(self) -> f64 {
        match self {
            SeasonalState::Prosperous => 1.25,
            SeasonalState::Prime => 1.15,
            SeasonalState::Rest => 1.0,
            SeasonalState::Imprisoned => 0.85,
            SeasonalState::Dead => 0.75,
        }
    }
}

/// Pillar-pair relation used by Step 1 (and the Step-1-shaped part of the
/// data model). `HS_*_EB` names are relative to the pillar's own stem and
/// branch, not to any other pillar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum Relation {
    Same,
    HS_Produces_EB,
    EB_Produces_HS,
    HS_Controls_EB,
    EB_Controls_HS,
}

pub(crate) fn pillar_pair_relation(hs: Element, eb: Element) -> Relation {
    match element_flow(hs, eb) {
        ElementFlow::Same => Relation::Same,
        ElementFlow::Produces => Relation::HS_Produces_EB,
        ElementFlow::ProducedBy => Relation::EB_Produces_HS,
        ElementFlow::Controls => Relation::HS_Controls_EB,
        ElementFlow::ControlledBy => Relation::EB_Controls_HS,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Useful,
    Favorable,
    Unfavorable,
    Enemy,
    Idle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strength {
    Dominant,
    Strong,
    Balanced,
    Weak,
    VeryWeak,
}

impl Strength {
    pub fn classify(percent: f64) -> Strength {
        if percent > 40.0 {
            Strength::Dominant
        } else if percent >= 25.0 {
            Strength::Strong
        } else if percent >= 15.0 {
            Strength::Balanced
        } else if percent >= 8.0 {
            Strength::Weak
        } else {
            Strength::VeryWeak
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    M,
    F,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    Hometown,
    OutOfTown,
    Overseas,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PillarInput {
    pub stem: Stem,
    pub branch: Branch,
}

impl PillarInput {
    pub fn new(stem: Stem, branch: Branch) -> Self {
        PillarInput { stem, branch }
    }
}

/// Engine input: four pillars (hour optional, falls back to the day
/// pillar), age, gender and location. Age is the only one of the latter
/// three that carries rule weight in the core (it drives pillar priority).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WuxingInput {
    pub year_pillar: PillarInput,
    pub month_pillar: PillarInput,
    pub day_pillar: PillarInput,
    pub hour_pillar: Option<PillarInput>,
    pub age: u32,
    pub gender: Gender,
    pub location: Location,
}

impl WuxingInput {
    pub fn resolved_hour_pillar(&self) -> PillarInput {
        self.hour_pillar.unwrap_or(self.day_pillar)
    }
}
