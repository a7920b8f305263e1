//! Pathway replay and decomposition.
//!
//! A pathway is an ordered sequence of reactions: one possible firing
//! order. Its *minimal initial state* is the smallest multiset that lets
//! every reaction fire in sequence; it is reconstructed by replaying the
//! pathway against an empty pool and paying every reactant deficit into
//! the initial state. [`decompose`] enumerates the ways a pathway splits
//! into two interleaved sub-pathways that are each startable from formal
//! species alone — a pathway with no such split is *elementary*.

use std::fmt;

use crate::reaction::Reaction;
use crate::state::{Species, SpeciesSet, State};

/// An ordered sequence of reactions.
pub type Pathway = Vec<Reaction>;

/// Error returned when a reaction is applied to a state that does not
/// contain its reactants.
///
/// The search driver only ever replays pathways from their minimal
/// initial state, which satisfies every reactant by construction, so
/// seeing this error there indicates an internal bug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreconditionError {
    pub reaction: Reaction,
    pub state: State,
}

impl fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reaction {} cannot fire in state {}",
            self.reaction, self.state
        )
    }
}

impl std::error::Error for PreconditionError {}

/// Apply one reaction to a state.
pub fn next_state(state: &State, rxn: &Reaction) -> Result<State, PreconditionError> {
    if !state.contains(rxn.reactants()) {
        return Err(PreconditionError {
            reaction: rxn.clone(),
            state: state.clone(),
        });
    }
    Ok(state.minus(rxn.reactants()).plus(rxn.products()))
}

/// The smallest state from which the whole pathway can fire in order.
///
/// Replays the pathway against an initially empty pool; every reactant
/// missing from the pool at its firing time must have been present at
/// time zero and is recorded as part of the initial state.
pub fn minimal_initial_state(pathway: &[Reaction]) -> State {
    let mut initial: Vec<Species> = Vec::new();
    let mut pool: Vec<Species> = Vec::new();
    for rxn in pathway {
        for r in rxn.reactants().iter() {
            if let Some(pos) = pool.iter().position(|x| x == r) {
                pool.swap_remove(pos);
            } else {
                initial.push(r.clone());
            }
        }
        pool.extend(rxn.products().iter().cloned());
    }
    State::new(initial)
}

/// Replay the pathway from `initial`. Returns `None` if some reaction
/// cannot fire — possible for directly-supplied initial states, never for
/// the pathway's own minimal initial state.
pub fn final_state(pathway: &[Reaction], initial: &State) -> Option<State> {
    let mut current = initial.clone();
    for rxn in pathway {
        current = next_state(&current, rxn).ok()?;
    }
    Some(current)
}

/// The maximum state size over the replay from the minimal initial
/// state, the initial state included.
pub fn width(pathway: &[Reaction]) -> usize {
    let mut current = minimal_initial_state(pathway);
    let mut w = current.len();
    for rxn in pathway {
        current = next_state(&current, rxn)
            .expect("minimal initial state satisfies every reactant");
        w = w.max(current.len());
    }
    w
}

/// True if at most one member of `tracked` is present at any point of the
/// replay from `initial`, the last state included.
pub fn linear_throughout(pathway: &[Reaction], initial: &State, tracked: &SpeciesSet) -> bool {
    let mut current = initial.clone();
    for rxn in pathway {
        if current.count_in(tracked) > 1 {
            return false;
        }
        current = next_state(&current, rxn)
            .expect("initial state satisfies every reactant of the pathway");
    }
    current.count_in(tracked) <= 1
}

/// All decompositions of a pathway into two interleaved sub-pathways whose
/// minimal initial states are both formal and which are both non-empty.
///
/// Each reaction goes to one side or the other, preserving relative order,
/// so a pathway of n reactions has 2^n candidate splits — acceptable
/// because the search driver bounds pathway width and initial-state size
/// before decomposing. Splits are reported as the pair of final states of
/// the two sides, sorted and deduplicated.
pub fn decompose(pathway: &[Reaction], fs: &SpeciesSet) -> Vec<(State, State)> {
    let mut found = Vec::new();
    let mut left = Vec::new();
    let mut right = Vec::new();
    split(&mut left, &mut right, pathway, fs, &mut found);
    found.sort();
    found.dedup();
    found
}

fn split(
    left: &mut Pathway,
    right: &mut Pathway,
    remaining: &[Reaction],
    fs: &SpeciesSet,
    found: &mut Vec<(State, State)>,
) {
    let left_initial = minimal_initial_state(left);
    let right_initial = minimal_initial_state(right);
    // Deficits only grow as a side is extended, so a non-formal partial
    // initial state can never become formal again.
    if !left_initial.is_formal(fs) || !right_initial.is_formal(fs) {
        return;
    }
    match remaining.split_first() {
        None => {
            if !left.is_empty() && !right.is_empty() {
                let left_final = final_state(left, &left_initial)
                    .expect("minimal initial state satisfies every reactant");
                let right_final = final_state(right, &right_initial)
                    .expect("minimal initial state satisfies every reactant");
                found.push((left_final, right_final));
            }
        }
        Some((head, rest)) => {
            left.push(head.clone());
            split(left, right, rest, fs, found);
            left.pop();
            right.push(head.clone());
            split(left, right, rest, fs, found);
            right.pop();
        }
    }
}
