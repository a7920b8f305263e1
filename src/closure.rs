//! Formal closure and regular final states of a pathway.
//!
//! The *formal closure* is everything a formal observer could have seen
//! while the pathway ran. The *regular final states* are the final states
//! reachable by restarting the pathway's tail from a state that looks, to
//! formal observers, like a fresh start — a pathway whose actual final
//! state is not among them releases or consumes formal species in an
//! order no formal reaction could reproduce.

use crate::pathway::{minimal_initial_state, next_state};
use crate::reaction::Reaction;
use crate::state::{SpeciesSet, State};

/// Accumulate the formal content observed in any state of the replay,
/// the initial state included. Per-state multiplicity is kept: the
/// closure holds each species as often as the widest single observation.
pub fn formal_closure(pathway: &[Reaction], fs: &SpeciesSet) -> State {
    let mut current = minimal_initial_state(pathway);
    let mut closure = current.formal_part(fs);
    for rxn in pathway {
        current = next_state(&current, rxn)
            .expect("minimal initial state satisfies every reactant");
        let f = current.formal_part(fs);
        closure = closure.plus(&f.minus(&closure));
    }
    closure
}

/// The set of regular final states of a pathway.
///
/// A cut position is valid when (a) every state from the cut to the end
/// keeps its formal projection contained in the minimal initial state,
/// and (b) the state just before the cut, minus the reactants of the
/// first reaction after it, has no formal content. Each valid cut
/// contributes the formal content accumulated over the suffix behind it.
pub fn regular_final_state(pathway: &[Reaction], fs: &SpeciesSet) -> Vec<State> {
    let initial = minimal_initial_state(pathway);
    let n = pathway.len();

    let mut states = Vec::with_capacity(n + 1);
    states.push(initial.clone());
    let mut current = initial.clone();
    // longest prefix whose every successor state stays formally contained
    // in the initial state; monotone once violated
    let mut contained_prefix = 0;
    let mut flag = true;
    for rxn in pathway {
        current = next_state(&current, rxn)
            .expect("minimal initial state satisfies every reactant");
        states.push(current.clone());
        if !initial.contains(&current.formal_part(fs)) {
            flag = false;
        }
        if flag {
            contained_prefix += 1;
        }
    }

    let mut accumulated = State::empty();
    let mut result = Vec::new();
    for i in 1..=n {
        let rxn = &pathway[n - i];
        let f = states[n + 1 - i].formal_part(fs);
        accumulated = accumulated.plus(&f.minus(&accumulated));
        let no_formal_leftover = states[n - i]
            .minus(rxn.reactants())
            .formal(fs)
            .next()
            .is_none();
        if contained_prefix >= n - i && no_formal_leftover {
            result.push(accumulated.clone());
        }
    }
    result.sort();
    result.dedup();
    result
}
