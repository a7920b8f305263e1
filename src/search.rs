//! Depth-first enumeration of reaction pathways with iterative bound
//! widening.
//!
//! One [`Pass`] explores every pathway whose width and initial-state size
//! stay within the current bounds, memoizing pathway signatures so that
//! interchangeable pathways are verified once. The outer loop rederives
//! the bounds from the branching statistics of the network and the
//! largest elementary signature discovered, and stops as soon as the
//! bounds no longer grow. A single non-tidy or irregular witness aborts
//! the whole search.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::basis::Interpretation;
use crate::closure::{formal_closure, regular_final_state};
use crate::pathway::{
    decompose, final_state, linear_throughout, minimal_initial_state, width, Pathway,
};
use crate::reaction::Reaction;
use crate::state::{SpeciesSet, State};
use crate::tidy::tidy;

/// Why a search pass stopped early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Rejection {
    /// A formal final state whose intermediates cannot be cleared.
    NotTidy(Pathway),
    /// An elementary pathway whose final state is not regular.
    NotRegular(Pathway),
    /// Another module's search already failed; this one stopped early.
    Cancelled,
}

/// Outcome of examining one partial pathway.
enum Step {
    /// Stop extending this pathway.
    Prune,
    /// Nothing recorded; keep extending.
    Continue,
    /// Elementary pathway appended to the basis accumulator; keep
    /// extending.
    Record,
}

/// Everything a pathway contributes to correctness checking. Two
/// pathways with equal signatures are interchangeable, so only the first
/// one is verified.
#[derive(Clone, PartialEq, Eq, Hash)]
struct Signature {
    initial: State,
    end: State,
    width: usize,
    closure: State,
    decompositions: Vec<(State, State)>,
    regular: Vec<State>,
}

/// Mutable state of one bound-widening pass. Owned by the pass, never
/// shared: concurrent module searches only share the cancellation flag.
struct Pass<'a> {
    crn: &'a [Reaction],
    fs: &'a SpeciesSet,
    nonwaste: Option<&'a SpeciesSet>,
    interpretation: Option<&'a Interpretation>,
    cancel: &'a AtomicBool,
    w_max: usize,
    i_max: usize,
    seen: HashSet<Signature>,
    tidy_checked: HashSet<State>,
    elementary: Vec<Pathway>,
}

impl Pass<'_> {
    fn explore(&mut self, pathway: &mut Pathway) -> Result<(), Rejection> {
        if self.cancel.load(Ordering::Relaxed) {
            return Err(Rejection::Cancelled);
        }
        match self.examine(pathway)? {
            Step::Prune => Ok(()),
            Step::Continue | Step::Record => {
                let crn = self.crn;
                for rxn in crn {
                    pathway.push(rxn.clone());
                    self.explore(pathway)?;
                    pathway.pop();
                }
                Ok(())
            }
        }
    }

    fn examine(&mut self, pathway: &[Reaction]) -> Result<Step, Rejection> {
        let w = width(pathway);
        if w > self.w_max {
            return Ok(Step::Prune);
        }

        let initial = minimal_initial_state(pathway);
        if !initial.is_formal(self.fs) {
            return Ok(Step::Prune);
        }
        if initial.len() > self.i_max {
            return Ok(Step::Prune);
        }

        if let Some(nonwaste) = self.nonwaste {
            if !linear_throughout(pathway, &initial, nonwaste) {
                return Ok(Step::Prune);
            }
        }

        let end = final_state(pathway, &initial)
            .expect("minimal initial state satisfies every reactant");
        let decompositions = decompose(pathway, self.fs);

        // A split with an all-formal side means every extension of this
        // pathway is redundant with a shorter decomposed form.
        for (left, right) in &decompositions {
            if left.is_formal(self.fs) || right.is_formal(self.fs) {
                debug!(initial = %initial, "pruning strongly decomposable pathway");
                return Ok(Step::Prune);
            }
        }

        let signature = Signature {
            initial: initial.clone(),
            end: end.clone(),
            width: w,
            closure: formal_closure(pathway, self.fs),
            decompositions: decompositions.clone(),
            regular: regular_final_state(pathway, self.fs),
        };
        let regular = signature.regular.clone();
        if !self.seen.insert(signature) {
            return Ok(Step::Prune);
        }

        if decompositions.is_empty() {
            if self.tidy_checked.insert(end.clone()) && !tidy(&end, self.crn, self.fs) {
                info!(initial = %initial, end = %end, "final state cannot shed its intermediates");
                return Err(Rejection::NotTidy(pathway.to_vec()));
            }
            if !pathway.is_empty() && end.is_formal(self.fs) {
                self.elementary.push(pathway.to_vec());
                if !self.final_state_regular(pathway, &end, &regular) {
                    info!(initial = %initial, end = %end, "final state is not regular");
                    return Err(Rejection::NotRegular(pathway.to_vec()));
                }
                return Ok(Step::Record);
            }
        }
        Ok(Step::Continue)
    }

    /// Under an interpretation, regularity is judged on the collapsed
    /// pathway against the collapsed formal-species set.
    fn final_state_regular(&self, pathway: &[Reaction], end: &State, regular: &[State]) -> bool {
        match self.interpretation {
            None => regular.contains(end),
            Some(map) => {
                let collapsed = map.collapse_pathway(pathway);
                let collapsed_fs = map.collapse_species_set(self.fs);
                let initial = minimal_initial_state(&collapsed);
                let end = final_state(&collapsed, &initial)
                    .expect("minimal initial state satisfies every reactant");
                regular_final_state(&collapsed, &collapsed_fs).contains(&end)
            }
        }
    }
}

/// Branching statistics of a module, used to widen the search bounds.
struct Branching {
    /// Largest reactant or product count of any reaction.
    b: usize,
    /// Largest intermediate reactant count of any reaction.
    bf: usize,
    /// Distinct (formal, intermediate) reactant-count pairs.
    br: Vec<(usize, usize)>,
}

fn branching(crn: &[Reaction], fs: &SpeciesSet) -> Branching {
    debug_assert!(!crn.is_empty());
    let b = crn.iter().map(Reaction::max_arity).max().unwrap_or(0);
    let bf = crn
        .iter()
        .map(|r| r.reactants().intermediate(fs).count())
        .max()
        .unwrap_or(0);
    let mut br: Vec<(usize, usize)> = crn
        .iter()
        .map(|r| {
            (
                r.reactants().formal(fs).count(),
                r.reactants().intermediate(fs).count(),
            )
        })
        .collect();
    br.sort_unstable();
    br.dedup();
    Branching { b, bf, br }
}

/// Bounds for the next pass, given the largest width and initial-state
/// size among the elementary signatures of the completed pass.
fn widen(stats: &Branching, current_w: usize, current_i: usize) -> (usize, usize) {
    let w = current_w * stats.bf + stats.b;
    let i = stats
        .br
        .iter()
        .map(|&(x, y)| current_i * y + x)
        .max()
        .unwrap_or(0);
    (w, i)
}

/// Enumerate the elementary pathways of one module, or reject it.
///
/// `nonwaste`, when supplied, enables the linear-structure pruning and
/// must only be passed for modules in which every reaction touches at
/// most one non-waste species on each side.
pub(crate) fn enumerate_basis(
    crn: &[Reaction],
    fs: &SpeciesSet,
    nonwaste: Option<&SpeciesSet>,
    interpretation: Option<&Interpretation>,
    cancel: &AtomicBool,
) -> Result<Vec<Pathway>, Rejection> {
    // a module without reactions realizes nothing
    if crn.is_empty() {
        return Ok(Vec::new());
    }
    let stats = branching(crn, fs);
    debug!(b = stats.b, bf = stats.bf, br = ?stats.br, "branching statistics");

    let mut w_max = 0;
    let mut i_max = 0;
    loop {
        debug!(w_max, i_max, "search pass");
        let mut pass = Pass {
            crn,
            fs,
            nonwaste,
            interpretation,
            cancel,
            w_max,
            i_max,
            seen: HashSet::new(),
            tidy_checked: HashSet::new(),
            elementary: Vec::new(),
        };
        pass.explore(&mut Vec::new())?;

        let mut current_w = 0;
        let mut current_i = 0;
        for signature in &pass.seen {
            if signature.decompositions.is_empty() {
                current_w = current_w.max(signature.width);
                current_i = current_i.max(signature.initial.len());
            }
        }
        let (w_next, i_next) = widen(&stats, current_w, current_i);
        if w_next <= w_max && i_next <= i_max {
            debug!(
                pathways = pass.elementary.len(),
                "bounds stable, enumeration complete"
            );
            return Ok(pass.elementary);
        }
        w_max = w_next;
        i_max = i_next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reaction::Reaction;

    fn set(names: &[&str]) -> SpeciesSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn rxn(reactants: &[&str], products: &[&str]) -> Reaction {
        Reaction::from_species(
            reactants.iter().map(|s| s.to_string()).collect(),
            products.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn run(crn: &[Reaction], fs: &SpeciesSet) -> Result<Vec<Pathway>, Rejection> {
        enumerate_basis(crn, fs, None, None, &AtomicBool::new(false))
    }

    #[test]
    fn single_conversion() {
        let crn = vec![rxn(&["A"], &["B"])];
        let elementary = run(&crn, &set(&["A", "B"])).unwrap();
        assert_eq!(elementary, vec![vec![crn[0].clone()]]);
    }

    #[test]
    fn intermediate_chain_collapses() {
        let crn = vec![rxn(&["A"], &["i"]), rxn(&["i"], &["B"])];
        let elementary = run(&crn, &set(&["A", "B"])).unwrap();
        assert_eq!(elementary, vec![vec![crn[0].clone(), crn[1].clone()]]);
    }

    #[test]
    fn self_feeding_intermediate_is_rejected() {
        let crn = vec![rxn(&["A"], &["i"]), rxn(&["i"], &["i"])];
        let err = run(&crn, &set(&["A"])).unwrap_err();
        match err {
            Rejection::NotTidy(witness) => assert_eq!(witness, vec![crn[0].clone()]),
            other => panic!("expected NotTidy, got {other:?}"),
        }
    }

    #[test]
    fn transient_formal_release_is_rejected() {
        let crn = vec![
            rxn(&["A"], &["B", "i"]),
            rxn(&["B", "i"], &["C"]),
            rxn(&["i"], &["D"]),
        ];
        let err = run(&crn, &set(&["A", "B", "C", "D"])).unwrap_err();
        match err {
            Rejection::NotRegular(witness) => {
                assert_eq!(witness, vec![crn[0].clone(), crn[1].clone()]);
            }
            other => panic!("expected NotRegular, got {other:?}"),
        }
    }

    #[test]
    fn empty_module_yields_nothing() {
        assert_eq!(run(&[], &set(&["A"])), Ok(Vec::new()));
    }

    #[test]
    fn cancellation_stops_the_search() {
        let crn = vec![rxn(&["A"], &["B"])];
        let cancel = AtomicBool::new(true);
        let err = enumerate_basis(&crn, &set(&["A", "B"]), None, None, &cancel).unwrap_err();
        assert_eq!(err, Rejection::Cancelled);
    }

    #[test]
    fn linear_pruning_preserves_the_result() {
        let crn = vec![rxn(&["A"], &["i"]), rxn(&["i"], &["B"])];
        let fs = set(&["A", "B"]);
        let nonwaste = set(&["i"]);
        let unpruned = run(&crn, &fs).unwrap();
        let pruned =
            enumerate_basis(&crn, &fs, Some(&nonwaste), None, &AtomicBool::new(false)).unwrap();
        assert_eq!(unpruned, pruned);
    }

    #[test]
    fn widen_is_monotone() {
        let stats = Branching {
            b: 2,
            bf: 1,
            br: vec![(1, 0), (1, 1)],
        };
        let mut previous = widen(&stats, 0, 0);
        for step in 1..5 {
            let next = widen(&stats, step, step);
            assert!(next.0 >= previous.0);
            assert!(next.1 >= previous.1);
            previous = next;
        }
    }

    #[test]
    fn widening_reaches_a_fixpoint() {
        // purely formal reactions: bf = 0, so bounds stabilize after one
        // widening step
        let stats = Branching {
            b: 1,
            bf: 0,
            br: vec![(1, 0)],
        };
        let first = widen(&stats, 0, 0);
        let second = widen(&stats, first.0, first.1);
        assert_eq!(first, (1, 1));
        assert_eq!(second, (1, 1));
    }
}
