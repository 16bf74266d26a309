use proptest::prelude::*;

use wuxing_lib::{
    engine, Branch, Element, Gender, Location, PillarInput, Polarity, Stem, Strength, WuxingInput,
};

fn input(
    year: (Stem, Branch),
    month: (Stem, Branch),
    day: (Stem, Branch),
    hour: Option<(Stem, Branch)>,
    age: u32,
) -> WuxingInput {
    WuxingInput {
        year_pillar: PillarInput::new(year.0, year.1),
        month_pillar: PillarInput::new(month.0, month.1),
        day_pillar: PillarInput::new(day.0, day.1),
        hour_pillar: hour.map(|(s, b)| PillarInput::new(s, b)),
        age,
        gender: Gender::M,
        location: Location::Hometown,
    }
}

#[test]
fn heavenly_stems_start_at_ten_points() {
    let chart = input(
        (Stem::Jia, Branch::Zi),
        (Stem::Bing, Branch::Yin),
        (Stem::Wu, Branch::Wu),
        Some((Stem::Geng, Branch::Shen)),
        30,
    );
    let result = engine::compute(chart).expect("well-formed chart computes");

    for pos in ["YP", "MP", "DP", "HP"] {
        let node = &result.nodes[&format!("{pos}.HS")];
        assert_eq!(node.initial, 10.0, "{pos} heavenly stem must start at 10 points");
    }
}

#[test]
fn element_percentages_sum_to_roughly_a_hundred() {
    let chart = input(
        (Stem::Yi, Branch::Chou),
        (Stem::Ding, Branch::Mao),
        (Stem::Ji, Branch::Si),
        Some((Stem::Xin, Branch::You)),
        8,
    );
    let result = engine::compute(chart).expect("well-formed chart computes");

    let total: f64 = Element::ALL.iter().map(|e| result.elements[e].percent).sum();
    assert!((total - 100.0).abs() < 0.05, "percentages summed to {total}");
}

#[test]
fn element_ranks_form_a_permutation_of_one_through_five() {
    let chart = input(
        (Stem::Ren, Branch::Xu),
        (Stem::Gui, Branch::Hai),
        (Stem::Jia, Branch::Zi),
        None,
        60,
    );
    let result = engine::compute(chart).expect("well-formed chart computes");

    let mut ranks: Vec<u8> = Element::ALL.iter().map(|e| result.elements[e].rank).collect();
    ranks.sort_unstable();
    assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
}

#[test]
fn gods_cover_five_distinct_roles() {
    let chart = input(
        (Stem::Bing, Branch::Chen),
        (Stem::Wu, Branch::Wu),
        (Stem::Geng, Branch::Shen),
        Some((Stem::Ren, Branch::Zi)),
        40,
    );
    let result = engine::compute(chart).expect("well-formed chart computes");

    let gods = result.gods;
    let roles = [gods.useful, gods.favorable, gods.unfavorable, gods.enemy, gods.idle];
    for (i, a) in roles.iter().enumerate() {
        for b in &roles[(i + 1)..] {
            assert_ne!(a, b, "{roles:?} must be five distinct elements");
        }
    }
}

#[test]
fn day_master_strength_matches_its_own_percent_bucket() {
    let chart = input(
        (Stem::Jia, Branch::Yin),
        (Stem::Yi, Branch::Mao),
        (Stem::Bing, Branch::Si),
        Some((Stem::Ding, Branch::Wu)),
        5,
    );
    let result = engine::compute(chart).expect("well-formed chart computes");

    let dm = result.day_master;
    assert_eq!(dm.percent, result.elements[&dm.element].percent);
    assert_eq!(dm.strength, Strength::classify(dm.percent));
}

#[test]
fn missing_hour_pillar_falls_back_to_day_pillar() {
    let chart = input(
        (Stem::Wu, Branch::Chen),
        (Stem::Ji, Branch::Wei),
        (Stem::Geng, Branch::Xu),
        None,
        49,
    );
    let result = engine::compute(chart).expect("well-formed chart computes");

    let day_hs = &result.nodes["DP.HS"];
    let hour_hs = &result.nodes["HP.HS"];
    assert_eq!(day_hs.stem, hour_hs.stem);
    assert_eq!(day_hs.polarity, hour_hs.polarity);
}

#[test]
fn same_chart_computes_bitwise_identical_finals_on_rerun() {
    let chart = input(
        (Stem::Xin, Branch::You),
        (Stem::Ren, Branch::Zi),
        (Stem::Gui, Branch::Chou),
        Some((Stem::Jia, Branch::Yin)),
        17,
    );

    let a = engine::compute(chart).unwrap();
    let b = engine::compute(chart).unwrap();

    for (id, node) in &a.nodes {
        assert_eq!(node.r#final, b.nodes[id].r#final, "node {id} diverged across identical runs");
    }
}

#[test]
fn running_stage_by_stage_matches_running_straight_through() {
    let chart = input(
        (Stem::Jia, Branch::Zi),
        (Stem::Bing, Branch::Mao),
        (Stem::Wu, Branch::Wu),
        Some((Stem::Geng, Branch::You)),
        33,
    );

    for k in 0..7u8 {
        let mut continued = engine::run_up_to_step(chart, k).unwrap();
        engine::run_single_step(&mut continued, k + 1).unwrap();

        let direct = engine::run_up_to_step(chart, k + 1).unwrap();

        for (id, node) in &direct.nodes {
            assert_eq!(
                node.points,
                continued.nodes[id].points,
                "node {id} diverged between step {k}->{} and direct run",
                k + 1
            );
        }
    }
}

#[test]
fn pillar_priority_has_four_distinct_pillars_at_every_age() {
    for age in [0u32, 10, 16, 17, 25, 32, 33, 40, 48, 49, 70] {
        let chart = input(
            (Stem::Jia, Branch::Zi),
            (Stem::Yi, Branch::Chou),
            (Stem::Bing, Branch::Yin),
            Some((Stem::Ding, Branch::Mao)),
            age,
        );
        let state = engine::run_up_to_step(chart, 0).unwrap();
        assert_eq!(state.pillar_priority.len(), 4);

        let mut unique = state.pillar_priority.to_vec();
        unique.sort_by_key(|p| format!("{p}"));
        unique.dedup();
        assert_eq!(unique.len(), 4, "pillar priority must not repeat a pillar, age {age}");
    }
}

fn arb_stem() -> impl Strategy<Value = Stem> {
    prop_oneof![
        Just(Stem::Jia),
        Just(Stem::Yi),
        Just(Stem::Bing),
        Just(Stem::Ding),
        Just(Stem::Wu),
        Just(Stem::Ji),
        Just(Stem::Geng),
        Just(Stem::Xin),
        Just(Stem::Ren),
        Just(Stem::Gui),
    ]
}

fn arb_branch() -> impl Strategy<Value = Branch> {
    prop_oneof![
        Just(Branch::Zi),
        Just(Branch::Chou),
        Just(Branch::Yin),
        Just(Branch::Mao),
        Just(Branch::Chen),
        Just(Branch::Si),
        Just(Branch::Wu),
        Just(Branch::Wei),
        Just(Branch::Shen),
        Just(Branch::You),
        Just(Branch::Xu),
        Just(Branch::Hai),
    ]
}

fn arb_input() -> impl Strategy<Value = WuxingInput> {
    (
        arb_stem(),
        arb_branch(),
        arb_stem(),
        arb_branch(),
        arb_stem(),
        arb_branch(),
        proptest::option::of((arb_stem(), arb_branch())),
        0u32..110,
    )
        .prop_map(|(ys, yb, ms, mb, ds, db, hour, age)| input((ys, yb), (ms, mb), (ds, db), hour, age))
}

proptest! {
    #[test]
    fn every_node_is_non_negative_and_delta_matches(chart in arb_input()) {
        let result = engine::compute(chart).unwrap();
        for node in result.nodes.values() {
            prop_assert!(node.r#final >= 0.0, "node went negative: {:?}", node);
            prop_assert!((node.delta - (node.r#final - node.initial)).abs() < 1e-9);
        }
    }

    #[test]
    fn element_percents_sum_near_a_hundred(chart in arb_input()) {
        let result = engine::compute(chart).unwrap();
        let total: f64 = Element::ALL.iter().map(|e| result.elements[e].percent).sum();
        prop_assert!((total - 100.0).abs() < 0.06, "percentages summed to {total}");
    }

    #[test]
    fn ranks_are_always_a_permutation(chart in arb_input()) {
        let result = engine::compute(chart).unwrap();
        let mut ranks: Vec<u8> = Element::ALL.iter().map(|e| result.elements[e].rank).collect();
        ranks.sort_unstable();
        prop_assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn gods_are_five_distinct_elements(chart in arb_input()) {
        let result = engine::compute(chart).unwrap();
        let gods = result.gods;
        let roles = [gods.useful, gods.favorable, gods.unfavorable, gods.enemy, gods.idle];
        for i in 0..roles.len() {
            for j in (i + 1)..roles.len() {
                prop_assert_ne!(roles[i], roles[j]);
            }
        }
    }

    #[test]
    fn heavenly_stem_nodes_always_start_at_ten(chart in arb_input()) {
        let result = engine::compute(chart).unwrap();
        for pos in ["YP", "MP", "DP", "HP"] {
            let node = &result.nodes[&format!("{pos}.HS")];
            prop_assert_eq!(node.initial, 10.0);
        }
    }

    #[test]
    fn rerunning_the_same_chart_is_deterministic(chart in arb_input()) {
        let a = engine::compute(chart).unwrap();
        let b = engine::compute(chart).unwrap();
        for (id, node) in &a.nodes {
            prop_assert_eq!(node.r#final, b.nodes[id].r#final);
        }
    }
}

#[test]
fn yang_stem_polarity_is_preserved_on_its_node() {
    let chart = input(
        (Stem::Jia, Branch::Zi),
        (Stem::Bing, Branch::Yin),
        (Stem::Wu, Branch::Wu),
        Some((Stem::Geng, Branch::Shen)),
        22,
    );
    let result = engine::compute(chart).unwrap();
    assert_eq!(result.nodes["YP.HS"].polarity, Polarity::Yang);
}

// Canonical seed scenarios — each must produce the stated Day-Master
// strength verdict and the listed role signatures.

#[test]
fn scenario_a_strong_dm_with_metal_useful_and_earth_unfavorable() {
    let chart = input(
        (Stem::Bing, Branch::Yin),
        (Stem::Ji, Branch::Hai),
        (Stem::Ding, Branch::Chou),
        Some((Stem::Ding, Branch::Wei)),
        40,
    );
    let result = engine::compute(chart).expect("well-formed chart computes");

    assert_eq!(result.day_master.strength, Strength::Strong);
    assert_eq!(result.gods.useful, Element::Metal);
    assert_eq!(result.gods.unfavorable, Element::Earth);
}

#[test]
fn scenario_b_balanced_dm_with_metal_useful_earth_favorable_water_enemy() {
    let chart = input(
        (Stem::Jia, Branch::Zi),
        (Stem::Bing, Branch::Wu),
        (Stem::Wu, Branch::Shen),
        Some((Stem::Ren, Branch::Mao)),
        25,
    );
    let result = engine::compute(chart).expect("well-formed chart computes");

    assert_eq!(result.day_master.strength, Strength::Balanced);
    assert_eq!(result.gods.useful, Element::Metal);
    assert_eq!(result.gods.favorable, Element::Earth);
    assert_eq!(result.gods.enemy, Element::Water);
}

#[test]
fn scenario_c_very_weak_dm_with_fire_useful_matching_day_master() {
    let chart = input(
        (Stem::Geng, Branch::Shen),
        (Stem::Geng, Branch::You),
        (Stem::Bing, Branch::Xu),
        Some((Stem::Xin, Branch::Chou)),
        30,
    );
    let result = engine::compute(chart).expect("well-formed chart computes");

    assert_eq!(result.day_master.strength, Strength::VeryWeak);
    assert_eq!(result.gods.useful, result.day_master.element);
    assert_eq!(result.gods.useful, Element::Fire);
    assert!(
        result.gods.unfavorable == Element::Metal || result.gods.enemy == Element::Metal,
        "Metal must be either unfavorable or enemy, got gods={:?}",
        result.gods
    );
}

#[test]
fn scenario_d_dominant_dm_with_earth_unfavorable_and_non_earth_useful() {
    let chart = input(
        (Stem::Wu, Branch::Xu),
        (Stem::Ji, Branch::Chou),
        (Stem::Wu, Branch::Chen),
        Some((Stem::Ji, Branch::Wei)),
        40,
    );
    let result = engine::compute(chart).expect("well-formed chart computes");

    assert_eq!(result.day_master.strength, Strength::Dominant);
    assert_eq!(result.gods.unfavorable, Element::Earth);
    assert_ne!(result.gods.useful, Element::Earth);
}

#[test]
fn scenario_e_weak_dm_bucket() {
    let chart = input(
        (Stem::Jia, Branch::Yin),
        (Stem::Bing, Branch::Wu),
        (Stem::Ren, Branch::Shen),
        Some((Stem::Wu, Branch::Xu)),
        30,
    );
    let result = engine::compute(chart).expect("well-formed chart computes");

    assert_eq!(result.day_master.strength, Strength::Weak);
}
