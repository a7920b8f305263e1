//! Property tests for the multiset algebra and pathway replay, checked
//! against straightforward counting reference implementations.

use proptest::prelude::*;

use crnbasis::{
    decompose, final_state, minimal_initial_state, next_state, width, Reaction, Species,
    SpeciesSet, State,
};

fn species_strategy() -> impl Strategy<Value = Species> {
    proptest::sample::select(vec!["A", "B", "C", "i", "j"]).prop_map(str::to_string)
}

fn bag_strategy() -> impl Strategy<Value = Vec<Species>> {
    proptest::collection::vec(species_strategy(), 0..8)
}

fn reaction_strategy() -> impl Strategy<Value = Reaction> {
    (
        proptest::collection::vec(species_strategy(), 0..3),
        proptest::collection::vec(species_strategy(), 0..3),
    )
        .prop_map(|(r, p)| Reaction::from_species(r, p))
}

fn pathway_strategy() -> impl Strategy<Value = Vec<Reaction>> {
    proptest::collection::vec(reaction_strategy(), 0..5)
}

fn count(bag: &[Species], species: &str) -> usize {
    bag.iter().filter(|s| s.as_str() == species).count()
}

proptest! {
    #[test]
    fn containment_matches_counting(a in bag_strategy(), b in bag_strategy()) {
        let expected = a.iter().all(|s| count(&a, s) <= count(&b, s));
        let got = State::new(b.clone()).contains(&State::new(a.clone()));
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn minus_matches_counting(a in bag_strategy(), b in bag_strategy()) {
        let result = State::new(a.clone()).minus(&State::new(b.clone()));
        for s in a.iter().chain(b.iter()) {
            let expected = count(&a, s).saturating_sub(count(&b, s));
            prop_assert_eq!(count(result.species(), s), expected);
        }
    }

    #[test]
    fn plus_matches_counting(a in bag_strategy(), b in bag_strategy()) {
        let result = State::new(a.clone()).plus(&State::new(b.clone()));
        prop_assert_eq!(result.len(), a.len() + b.len());
        for s in a.iter().chain(b.iter()) {
            prop_assert_eq!(count(result.species(), s), count(&a, s) + count(&b, s));
        }
    }

    #[test]
    fn replay_from_minimal_initial_is_consistent(pathway in pathway_strategy()) {
        let initial = minimal_initial_state(&pathway);
        let mut current = initial.clone();
        for rxn in &pathway {
            let next = next_state(&current, rxn);
            prop_assert!(next.is_ok(), "replay failed at {rxn}");
            current = next.unwrap();
        }
        prop_assert_eq!(final_state(&pathway, &initial), Some(current));
    }

    #[test]
    fn width_covers_initial_and_final(pathway in pathway_strategy()) {
        let initial = minimal_initial_state(&pathway);
        let end = final_state(&pathway, &initial).unwrap();
        let w = width(&pathway);
        prop_assert!(w >= initial.len());
        prop_assert!(w >= end.len());
    }

    #[test]
    fn initial_state_pays_only_reactant_deficits(pathway in pathway_strategy()) {
        let initial = minimal_initial_state(&pathway);
        for s in initial.iter() {
            let appears_as_reactant = pathway
                .iter()
                .any(|r| r.reactants().iter().any(|x| x == s));
            prop_assert!(appears_as_reactant);
        }
    }

    #[test]
    fn decompositions_come_in_mirrored_pairs(pathway in pathway_strategy()) {
        let fs: SpeciesSet = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let splits = decompose(&pathway, &fs);
        if !pathway.is_empty() {
            prop_assert!(splits.len() != 1 || splits[0].0 == splits[0].1);
        }
        for (left, right) in &splits {
            prop_assert!(splits.contains(&(right.clone(), left.clone())));
        }
    }

    #[test]
    fn short_pathways_do_not_decompose(rxn in reaction_strategy()) {
        let fs: SpeciesSet = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        prop_assert!(decompose(&[], &fs).is_empty());
        prop_assert!(decompose(&[rxn], &fs).is_empty());
    }
}
