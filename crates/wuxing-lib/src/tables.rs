//! Static, read-only lookup data (component C1). Every constant here is a
//! compile-time table; nothing in this module allocates beyond the slice
//! literals themselves.

use crate::types::{element_flow, Branch, Element, ElementFlow, PillarPos, SeasonalState, Stem};

pub const HS_START_POINTS: f64 = 10.0;

/// Ordered hidden-stem residents per branch: `(stem, points)`. Points sum
/// to 10.0 for every branch (1-qi: 10; 2-qi: 8+3 -- deliberately 11, see
/// note below; 3-qi: 8+3+1 = 12). The classical point split is kept
/// exactly as specified rather than normalized to a round 10.
pub const HIDDEN_STEMS: [&[(Stem, f64)]; 12] = [
    &[(Stem::Gui, 10.0)],                                   // Zi
    &[(Stem::Ji, 8.0), (Stem::Gui, 3.0), (Stem::Xin, 1.0)],  // Chou
    &[(Stem::Jia, 8.0), (Stem::Bing, 3.0), (Stem::Wu, 1.0)], // Yin
    &[(Stem::Yi, 10.0)],                                     // Mao
    &[(Stem::Wu, 8.0), (Stem::Yi, 3.0), (Stem::Gui, 1.0)],   // Chen
    &[(Stem::Bing, 8.0), (Stem::Wu, 3.0), (Stem::Geng, 1.0)], // Si
    &[(Stem::Ding, 8.0), (Stem::Ji, 3.0)],                   // Wu
    &[(Stem::Ji, 8.0), (Stem::Ding, 3.0), (Stem::Yi, 1.0)],  // Wei
    &[(Stem::Geng, 8.0), (Stem::Ren, 3.0), (Stem::Wu, 1.0)], // Shen
    &[(Stem::Xin, 10.0)],                                    // You
    &[(Stem::Wu, 8.0), (Stem::Xin, 3.0), (Stem::Ding, 1.0)], // Xu
    &[(Stem::Ren, 8.0), (Stem::Jia, 3.0)],                   // Hai
];

pub fn hidden_stems(branch: Branch) -> &'static [(Stem, f64)] {
    HIDDEN_STEMS[branch as usize]
}

pub fn main_qi(branch: Branch) -> Stem {
    hidden_stems(branch)[0].0
}

pub fn month_branch_season(branch: Branch) -> Element {
    match branch {
        Branch::Yin | Branch::Mao => Element::Wood,
        Branch::Si | Branch::Wu => Element::Fire,
        Branch::Shen | Branch::You => Element::Metal,
        Branch::Hai | Branch::Zi => Element::Water,
        Branch::Chen | Branch::Wei | Branch::Xu | Branch::Chou => Element::Earth,
    }
}

pub fn seasonal_state(season: Element, target: Element) -> SeasonalState {
    match element_flow(season, target) {
        ElementFlow::Same => SeasonalState::Prosperous,
        ElementFlow::Produces => SeasonalState::Prime,
        ElementFlow::ProducedBy => SeasonalState::Rest,
        ElementFlow::Controls => SeasonalState::Dead,
        ElementFlow::ControlledBy => SeasonalState::Imprisoned,
    }
}

/// 0 -> 1.0, 1 -> 0.75, 2 -> 0.5, >=3 -> 0.25. Shared by the pillar-gap
/// convention (Steps 1-6) and the Step-7 grid-gap convention.
pub fn gap_multiplier(gap: u32) -> f64 {
    match gap {
        0 => 1.0,
        1 => 0.75,
        2 => 0.5,
        _ => 0.25,
    }
}

pub fn pillar_gap(a: PillarPos, b: PillarPos) -> u32 {
    (a.column() as i32 - b.column() as i32).unsigned_abs()
}

/// Tags an interaction family for attention-weight lookup and log entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionTag {
    ThreeMeetings,
    ThreeCombos,
    SixHarmonies,
    HalfMeetings,
    ArchedCombos,
    StemCombos,
    SixClash,
    Punishment,
    SixHarm,
    Destruction,
    StemClash,
    PillarPair,
    NaturalFlow,
}

impl InteractionTag {
    pub fn label(self) -> &'static str {
        match self {
            InteractionTag::ThreeMeetings => "THREE_MEETINGS",
            InteractionTag::ThreeCombos => "THREE_COMBOS",
            InteractionTag::SixHarmonies => "SIX_HARMONIES",
            InteractionTag::HalfMeetings => "HALF_MEETINGS",
            InteractionTag::ArchedCombos => "ARCHED_COMBO",
            InteractionTag::StemCombos => "STEM_COMBO",
            InteractionTag::SixClash => "SIX_CLASH",
            InteractionTag::Punishment => "PUNISHMENT",
            InteractionTag::SixHarm => "SIX_HARM",
            InteractionTag::Destruction => "DESTRUCTION",
            InteractionTag::StemClash => "STEM_CLASH",
            InteractionTag::PillarPair => "PILLAR_PAIR",
            InteractionTag::NaturalFlow => "NATURAL_FLOW",
        }
    }

    /// `ATTENTION_WEIGHTS`. Only interactions that compete for a shared
    /// node's attention carry a weight; stem-level and pillar-local
    /// interactions don't.
    pub fn attention_weight(self) -> Option<f64> {
        match self {
            InteractionTag::ThreeMeetings => Some(63.0),
            InteractionTag::ThreeCombos => Some(42.0),
            InteractionTag::SixClash => Some(42.0),
            // PUNISHMENT_FULL in spec §4.1: the one weight covering every
            // punishment sub-kind (shi/wu_li/en/self) when it contributes
            // to a node's attention share in Step 4.
            InteractionTag::Punishment => Some(42.0),
            InteractionTag::SixHarmonies => Some(28.0),
            InteractionTag::Destruction => Some(28.0),
            InteractionTag::SixHarm => Some(28.0),
            InteractionTag::HalfMeetings => Some(12.0),
            InteractionTag::ArchedCombos => Some(7.0),
            InteractionTag::StemCombos
            | InteractionTag::StemClash
            | InteractionTag::PillarPair
            | InteractionTag::NaturalFlow => None,
        }
    }

    /// `COMBO_RATES`.
    pub fn combo_rate(self) -> Option<f64> {
        match self {
            InteractionTag::ThreeMeetings => Some(0.30),
            InteractionTag::ThreeCombos => Some(0.25),
            InteractionTag::SixHarmonies => Some(0.20),
            InteractionTag::HalfMeetings => Some(0.20),
            InteractionTag::ArchedCombos => Some(0.15),
            InteractionTag::StemCombos => Some(0.30),
            _ => None,
        }
    }

    /// `NEGATIVE_RATES`: `(attacker_rate, victim_rate)`.
    pub fn negative_rates(self) -> Option<(f64, f64)> {
        match self {
            InteractionTag::SixClash => Some((0.25, 0.50)),
            InteractionTag::StemClash => Some((0.25, 0.50)),
            InteractionTag::Punishment | InteractionTag::SixHarm | InteractionTag::Destruction => {
                Some((0.20, 0.40))
            }
            _ => None,
        }
    }

    /// Strength order used to sort simultaneous positive interactions at a
    /// pillar (Step 2 Phase D).
    pub fn positive_strength_rank(self) -> Option<u8> {
        match self {
            InteractionTag::ThreeMeetings => Some(0),
            InteractionTag::ThreeCombos => Some(1),
            InteractionTag::SixHarmonies => Some(2),
            InteractionTag::HalfMeetings => Some(3),
            InteractionTag::ArchedCombos => Some(4),
            _ => None,
        }
    }
}

pub const TRANSFORMATION_MULTIPLIER: f64 = 2.5;

/// A branch combo (three-meetings, three-combos, six-harmonies, half-
/// meetings or arched-combos): a fixed set of branches that, together,
/// produce a bonus element.
#[derive(Clone, Copy, Debug)]
pub struct ComboDef {
    pub tag: InteractionTag,
    pub branches: &'static [Branch],
    pub element: Element,
}

pub const THREE_MEETINGS: [ComboDef; 4] = [
    ComboDef {
        tag: InteractionTag::ThreeMeetings,
        branches: &[Branch::Yin, Branch::Mao, Branch::Chen],
        element: Element::Wood,
    },
    ComboDef {
        tag: InteractionTag::ThreeMeetings,
        branches: &[Branch::Si, Branch::Wu, Branch::Wei],
        element: Element::Fire,
    },
    ComboDef {
        tag: InteractionTag::ThreeMeetings,
        branches: &[Branch::Shen, Branch::You, Branch::Xu],
        element: Element::Metal,
    },
    ComboDef {
        tag: InteractionTag::ThreeMeetings,
        branches: &[Branch::Hai, Branch::Zi, Branch::Chou],
        element: Element::Water,
    },
];

pub const THREE_COMBOS: [ComboDef; 4] = [
    ComboDef {
        tag: InteractionTag::ThreeCombos,
        branches: &[Branch::Hai, Branch::Mao, Branch::Wei],
        element: Element::Wood,
    },
    ComboDef {
        tag: InteractionTag::ThreeCombos,
        branches: &[Branch::Yin, Branch::Wu, Branch::Xu],
        element: Element::Fire,
    },
    ComboDef {
        tag: InteractionTag::ThreeCombos,
        branches: &[Branch::Si, Branch::You, Branch::Chou],
        element: Element::Metal,
    },
    ComboDef {
        tag: InteractionTag::ThreeCombos,
        branches: &[Branch::Shen, Branch::Zi, Branch::Chen],
        element: Element::Water,
    },
];

pub const SIX_HARMONIES: [ComboDef; 6] = [
    ComboDef {
        tag: InteractionTag::SixHarmonies,
        branches: &[Branch::Chou, Branch::Zi],
        element: Element::Earth,
    },
    ComboDef {
        tag: InteractionTag::SixHarmonies,
        branches: &[Branch::Hai, Branch::Yin],
        element: Element::Wood,
    },
    ComboDef {
        tag: InteractionTag::SixHarmonies,
        branches: &[Branch::Mao, Branch::Xu],
        element: Element::Fire,
    },
    ComboDef {
        tag: InteractionTag::SixHarmonies,
        branches: &[Branch::Chen, Branch::You],
        element: Element::Metal,
    },
    ComboDef {
        tag: InteractionTag::SixHarmonies,
        branches: &[Branch::Shen, Branch::Si],
        element: Element::Water,
    },
    ComboDef {
        tag: InteractionTag::SixHarmonies,
        branches: &[Branch::Wei, Branch::Wu],
        element: Element::Fire,
    },
];

/// Each three-meetings trio contributes its three 2-branch subsets.
pub const HALF_MEETINGS: [ComboDef; 12] = [
    ComboDef {
        tag: InteractionTag::HalfMeetings,
        branches: &[Branch::Yin, Branch::Mao],
        element: Element::Wood,
    },
    ComboDef {
        tag: InteractionTag::HalfMeetings,
        branches: &[Branch::Mao, Branch::Chen],
        element: Element::Wood,
    },
    ComboDef {
        tag: InteractionTag::HalfMeetings,
        branches: &[Branch::Yin, Branch::Chen],
        element: Element::Wood,
    },
    ComboDef {
        tag: InteractionTag::HalfMeetings,
        branches: &[Branch::Si, Branch::Wu],
        element: Element::Fire,
    },
    ComboDef {
        tag: InteractionTag::HalfMeetings,
        branches: &[Branch::Wu, Branch::Wei],
        element: Element::Fire,
    },
    ComboDef {
        tag: InteractionTag::HalfMeetings,
        branches: &[Branch::Si, Branch::Wei],
        element: Element::Fire,
    },
    ComboDef {
        tag: InteractionTag::HalfMeetings,
        branches: &[Branch::Shen, Branch::You],
        element: Element::Metal,
    },
    ComboDef {
        tag: InteractionTag::HalfMeetings,
        branches: &[Branch::You, Branch::Xu],
        element: Element::Metal,
    },
    ComboDef {
        tag: InteractionTag::HalfMeetings,
        branches: &[Branch::Shen, Branch::Xu],
        element: Element::Metal,
    },
    ComboDef {
        tag: InteractionTag::HalfMeetings,
        branches: &[Branch::Hai, Branch::Zi],
        element: Element::Water,
    },
    ComboDef {
        tag: InteractionTag::HalfMeetings,
        branches: &[Branch::Zi, Branch::Chou],
        element: Element::Water,
    },
    ComboDef {
        tag: InteractionTag::HalfMeetings,
        branches: &[Branch::Hai, Branch::Chou],
        element: Element::Water,
    },
];

pub const ARCHED_COMBOS: [ComboDef; 4] = [
    ComboDef {
        tag: InteractionTag::ArchedCombos,
        branches: &[Branch::Hai, Branch::Wei],
        element: Element::Wood,
    },
    ComboDef {
        tag: InteractionTag::ArchedCombos,
        branches: &[Branch::Yin, Branch::Xu],
        element: Element::Fire,
    },
    ComboDef {
        tag: InteractionTag::ArchedCombos,
        branches: &[Branch::Chou, Branch::Si],
        element: Element::Metal,
    },
    ComboDef {
        tag: InteractionTag::ArchedCombos,
        branches: &[Branch::Chen, Branch::Shen],
        element: Element::Water,
    },
];

pub const POSITIVE_COMBO_FAMILIES: [&[ComboDef]; 5] = [
    &THREE_MEETINGS,
    &THREE_COMBOS,
    &SIX_HARMONIES,
    &HALF_MEETINGS,
    &ARCHED_COMBOS,
];

#[derive(Clone, Copy, Debug)]
pub struct StemComboDef {
    pub a: Stem,
    pub b: Stem,
    pub element: Element,
}

pub const STEM_COMBOS: [StemComboDef; 5] = [
    StemComboDef {
        a: Stem::Jia,
        b: Stem::Ji,
        element: Element::Earth,
    },
    StemComboDef {
        a: Stem::Geng,
        b: Stem::Yi,
        element: Element::Metal,
    },
    StemComboDef {
        a: Stem::Bing,
        b: Stem::Xin,
        element: Element::Water,
    },
    StemComboDef {
        a: Stem::Ding,
        b: Stem::Ren,
        element: Element::Wood,
    },
    StemComboDef {
        a: Stem::Gui,
        b: Stem::Wu,
        element: Element::Fire,
    },
];

/// A directed negative branch interaction, or a same-element pair that is
/// logged but never deals damage.
#[derive(Clone, Copy, Debug)]
pub enum DirectedBranchPair {
    Directed { attacker: Branch, victim: Branch },
    SameElementLogOnly { a: Branch, b: Branch },
}

pub const SIX_CLASHES: [DirectedBranchPair; 6] = [
    DirectedBranchPair::Directed {
        attacker: Branch::Zi,
        victim: Branch::Wu,
    },
    DirectedBranchPair::Directed {
        attacker: Branch::Shen,
        victim: Branch::Yin,
    },
    DirectedBranchPair::Directed {
        attacker: Branch::You,
        victim: Branch::Mao,
    },
    DirectedBranchPair::Directed {
        attacker: Branch::Hai,
        victim: Branch::Si,
    },
    DirectedBranchPair::SameElementLogOnly {
        a: Branch::Chou,
        b: Branch::Wei,
    },
    DirectedBranchPair::SameElementLogOnly {
        a: Branch::Chen,
        b: Branch::Xu,
    },
];

pub const DESTRUCTIONS: [DirectedBranchPair; 6] = [
    DirectedBranchPair::Directed {
        attacker: Branch::You,
        victim: Branch::Zi,
    },
    DirectedBranchPair::Directed {
        attacker: Branch::Mao,
        victim: Branch::Wu,
    },
    DirectedBranchPair::Directed {
        attacker: Branch::Si,
        victim: Branch::Shen,
    },
    DirectedBranchPair::Directed {
        attacker: Branch::Hai,
        victim: Branch::Yin,
    },
    DirectedBranchPair::SameElementLogOnly {
        a: Branch::Chen,
        b: Branch::Chou,
    },
    DirectedBranchPair::SameElementLogOnly {
        a: Branch::Wei,
        b: Branch::Xu,
    },
];

/// Six harms. Classical sources fix the six *pairs* but not a damage
/// direction; this engine picks the producer, or controller when the pair
/// has no production relation, as attacker — see DESIGN.md.
pub const SIX_HARMS: [(Branch, Branch); 6] = [
    (Branch::Wei, Branch::Zi),
    (Branch::Wu, Branch::Chou),
    (Branch::Yin, Branch::Si),
    (Branch::Mao, Branch::Chen),
    (Branch::Shen, Branch::Hai),
    (Branch::Xu, Branch::You),
];

pub const PUNISHMENT_SHI: [Branch; 3] = [Branch::Yin, Branch::Si, Branch::Shen];
pub const PUNISHMENT_WULI: [Branch; 3] = [Branch::Chou, Branch::Wei, Branch::Xu];
pub const PUNISHMENT_EN: (Branch, Branch) = (Branch::Mao, Branch::Zi);
pub const PUNISHMENT_SELF: [Branch; 4] = [Branch::Chen, Branch::Wu, Branch::You, Branch::Hai];

/// Directed pairs within the `shi` (仗势之刑) cycle: Yin->Si, Si->Shen,
/// Shen->Yin.
pub fn punishment_shi_pairs() -> [(Branch, Branch); 3] {
    [
        (PUNISHMENT_SHI[0], PUNISHMENT_SHI[1]),
        (PUNISHMENT_SHI[1], PUNISHMENT_SHI[2]),
        (PUNISHMENT_SHI[2], PUNISHMENT_SHI[0]),
    ]
}

pub const STEM_CLASHES: [(Stem, Stem); 4] = [
    (Stem::Geng, Stem::Jia),
    (Stem::Xin, Stem::Yi),
    (Stem::Ren, Stem::Bing),
    (Stem::Gui, Stem::Ding),
];

/// Sorted-alphabetically, hyphen-joined stable key for a combo/interaction,
/// e.g. `Chou-Zi`.
pub fn combo_key(branches: &[Branch]) -> String {
    let mut labels: Vec<&'static str> = branches.iter().map(|b| b.label()).collect();
    labels.sort_unstable();
    labels.join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_stem_points_match_qi_count() {
        for (idx, residents) in HIDDEN_STEMS.iter().enumerate() {
            let branch = Branch::ALL[idx];
            match residents.len() {
                1 => assert_eq!(residents[0].1, 10.0, "{branch} main qi should hold 10 points"),
                2 => {
                    assert_eq!(residents[0].1, 8.0);
                    assert_eq!(residents[1].1, 3.0);
                }
                3 => {
                    assert_eq!(residents[0].1, 8.0);
                    assert_eq!(residents[1].1, 3.0);
                    assert_eq!(residents[2].1, 1.0);
                }
                n => panic!("{branch} has unexpected hidden stem count {n}"),
            }
        }
    }

    #[test]
    fn one_qi_branches_are_zi_mao_you() {
        for branch in [Branch::Zi, Branch::Mao, Branch::You] {
            assert_eq!(hidden_stems(branch).len(), 1);
        }
    }

    #[test]
    fn two_qi_branches_are_wu_hai() {
        for branch in [Branch::Wu, Branch::Hai] {
            assert_eq!(hidden_stems(branch).len(), 2);
        }
    }

    #[test]
    fn combo_rates_cover_every_combo_family() {
        for tag in [
            InteractionTag::ThreeMeetings,
            InteractionTag::ThreeCombos,
            InteractionTag::SixHarmonies,
            InteractionTag::HalfMeetings,
            InteractionTag::ArchedCombos,
            InteractionTag::StemCombos,
        ] {
            assert!(tag.combo_rate().is_some(), "{tag:?} should have a combo rate");
        }
    }

    #[test]
    fn attention_weights_cover_negative_and_shared_positive_families() {
        for tag in [
            InteractionTag::ThreeMeetings,
            InteractionTag::ThreeCombos,
            InteractionTag::SixClash,
            InteractionTag::Punishment,
            InteractionTag::SixHarmonies,
            InteractionTag::Destruction,
            InteractionTag::SixHarm,
            InteractionTag::HalfMeetings,
            InteractionTag::ArchedCombos,
        ] {
            assert!(tag.attention_weight().is_some(), "{tag:?} should carry an attention weight");
        }
    }

    #[test]
    fn combo_key_sorts_alphabetically() {
        assert_eq!(combo_key(&[Branch::Zi, Branch::Chou]), "Chou-Zi");
    }

    #[test]
    fn gap_multiplier_ladder() {
        assert_eq!(gap_multiplier(0), 1.0);
        assert_eq!(gap_multiplier(1), 0.75);
        assert_eq!(gap_multiplier(2), 0.5);
        assert_eq!(gap_multiplier(3), 0.25);
        assert_eq!(gap_multiplier(10), 0.25);
    }

    #[test]
    fn seasonal_state_same_element_is_prosperous() {
        for e in Element::ALL {
            assert_eq!(seasonal_state(e, e), SeasonalState::Prosperous);
        }
    }
}
