//! Tidiness: can a final state always shed its intermediates?
//!
//! A final state is tidy when its intermediate content can reach the
//! empty multiset through reactions that consume no formal species. The
//! test is a breadth-first reachability search over intermediate-projected
//! states; projecting before the containment test automatically restricts
//! firing to reactions whose reactants are all intermediates, which is the
//! strong form of the closing-pathway condition.

use std::collections::{HashSet, VecDeque};

use crate::pathway::next_state;
use crate::reaction::Reaction;
use crate::state::{SpeciesSet, State};

/// True iff the intermediate content of `state` can reach empty using
/// reactions of `crn` that consume no formal species.
pub fn tidy(state: &State, crn: &[Reaction], fs: &SpeciesSet) -> bool {
    let start = state.intermediate_part(fs);
    let mut queue = VecDeque::new();
    let mut seen = HashSet::new();
    seen.insert(start.clone());
    queue.push_back(start);
    while let Some(current) = queue.pop_front() {
        if current.is_empty() {
            return true;
        }
        for rxn in crn {
            if rxn.reactants().is_empty() || !current.contains(rxn.reactants()) {
                continue;
            }
            let successor = next_state(&current, rxn)
                .expect("containment checked above")
                .intermediate_part(fs);
            if seen.insert(successor.clone()) {
                queue.push_back(successor);
            }
        }
    }
    false
}
