//! Top-level basis assembly.
//!
//! [`find_basis`] partitions the network into modules, verifies each
//! module with the search driver, and merges the per-module results into
//! the formal basis. Modules share no intermediate species, so they are
//! verified in parallel; the first rejection cancels the others and is
//! reported with its module index and witness pathway.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::modules::find_modules;
use crate::pathway::{final_state, minimal_initial_state, Pathway};
use crate::reaction::{crn_intermediates, Reaction};
use crate::search::{enumerate_basis, Rejection};
use crate::state::{Species, SpeciesSet, State};

/// A species-to-species-list collapse mapping, applied before regularity
/// is judged under the integrated-hybrid correctness theory. Species
/// without an entry collapse to themselves.
#[derive(Debug, Clone, Default)]
pub struct Interpretation(HashMap<Species, Vec<Species>>);

impl Interpretation {
    pub fn new(map: HashMap<Species, Vec<Species>>) -> Self {
        Interpretation(map)
    }

    fn collapse_into(&self, out: &mut Vec<Species>, species: &Species) {
        match self.0.get(species) {
            Some(expansion) => out.extend(expansion.iter().cloned()),
            None => out.push(species.clone()),
        }
    }

    pub fn collapse_state(&self, state: &State) -> State {
        let mut out = Vec::with_capacity(state.len());
        for s in state.iter() {
            self.collapse_into(&mut out, s);
        }
        State::new(out)
    }

    pub fn collapse_reaction(&self, rxn: &Reaction) -> Reaction {
        Reaction::new(
            self.collapse_state(rxn.reactants()),
            self.collapse_state(rxn.products()),
        )
    }

    pub fn collapse_pathway(&self, pathway: &[Reaction]) -> Pathway {
        pathway.iter().map(|r| self.collapse_reaction(r)).collect()
    }

    pub fn collapse_species_set(&self, set: &SpeciesSet) -> SpeciesSet {
        let mut out = Vec::new();
        for s in set {
            self.collapse_into(&mut out, s);
        }
        out.into_iter().collect()
    }
}

/// Rejection of a network: some module is not tidy or not regular.
///
/// Carries the index of the rejected module and the first pathway that
/// witnessed the violation. No partial basis is returned — the formal
/// basis is only meaningful when every module passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BasisError {
    /// A formal final state of the module cannot clear its intermediates.
    NotTidy { module: usize, witness: Pathway },
    /// An elementary pathway's final state is not among its own regular
    /// final states.
    NotRegular { module: usize, witness: Pathway },
}

impl BasisError {
    fn from_rejection(module: usize, rejection: Rejection) -> Option<BasisError> {
        match rejection {
            Rejection::NotTidy(witness) => Some(BasisError::NotTidy { module, witness }),
            Rejection::NotRegular(witness) => Some(BasisError::NotRegular { module, witness }),
            Rejection::Cancelled => None,
        }
    }

    /// The pathway that triggered the rejection.
    pub fn witness(&self) -> &[Reaction] {
        match self {
            BasisError::NotTidy { witness, .. } | BasisError::NotRegular { witness, .. } => {
                witness
            }
        }
    }
}

impl fmt::Display for BasisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, module, witness) = match self {
            BasisError::NotTidy { module, witness } => ("not tidy", module, witness),
            BasisError::NotRegular { module, witness } => ("not regular", module, witness),
        };
        write!(f, "module {module} is {kind}; witness pathway: ")?;
        for (i, rxn) in witness.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{rxn}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BasisError {}

/// How [`find_basis`] runs.
#[derive(Debug, Clone)]
pub struct BasisOptions {
    /// Partition the network into modules and verify them independently.
    /// Disable to search the whole network as one module.
    pub modular: bool,
    /// Collapse mapping for the integrated-hybrid correctness theory.
    pub interpretation: Option<Interpretation>,
}

impl Default for BasisOptions {
    fn default() -> Self {
        BasisOptions {
            modular: true,
            interpretation: None,
        }
    }
}

/// The formal reactions an implementation network realizes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormalBasis {
    /// Sorted, deduplicated (initial, final) formal-state pairs, one per
    /// elementary pathway.
    pub reactions: Vec<(State, State)>,
    /// The same pairs after interpretation collapse; present exactly when
    /// an interpretation was supplied.
    pub collapsed: Option<Vec<(State, State)>>,
}

/// Compute the formal basis of an implementation network, or reject it.
///
/// The basis is the set of (initial state, final state) pairs of the
/// network's elementary pathways, observed at formal species only. A
/// rejection means some module is not tidy or not regular; the error
/// carries the witnessing pathway for diagnostics.
pub fn find_basis(
    crn: &[Reaction],
    fs: &SpeciesSet,
    options: &BasisOptions,
) -> Result<FormalBasis, BasisError> {
    let cancel = AtomicBool::new(false);
    let interpretation = options.interpretation.as_ref();

    if !options.modular {
        let elementary = enumerate_basis(crn, fs, None, interpretation, &cancel)
            .map_err(|r| BasisError::from_rejection(0, r).expect("search is never cancelled"))?;
        return Ok(assemble(&[elementary], interpretation));
    }

    let intermediates = crn_intermediates(crn, fs);
    let modules = find_modules(crn, &intermediates);
    info!(modules = modules.len(), "partitioned implementation network");

    let results: Vec<Result<Vec<Pathway>, Rejection>> = modules
        .par_iter()
        .map(|module| {
            if cancel.load(Ordering::Relaxed) {
                return Err(Rejection::Cancelled);
            }
            let nonwaste = nonwaste_species(module, &intermediates);
            let linear = has_linear_structure(module, &nonwaste);
            debug!(
                reactions = module.len(),
                linear, "verifying module"
            );
            let result = enumerate_basis(
                module,
                fs,
                linear.then_some(&nonwaste),
                interpretation,
                &cancel,
            );
            if result.is_err() {
                cancel.store(true, Ordering::Relaxed);
            }
            result
        })
        .collect();

    // report the first real rejection in module order; cancelled modules
    // only ever accompany one
    for (module, result) in results.iter().enumerate() {
        if let Err(rejection) = result {
            if let Some(error) = BasisError::from_rejection(module, rejection.clone()) {
                return Err(error);
            }
        }
    }
    let per_module: Vec<Vec<Pathway>> = results
        .into_iter()
        .map(|r| r.expect("no rejection recorded"))
        .collect();
    Ok(assemble(&per_module, interpretation))
}

/// Intermediates of the module that can be consumed again once produced,
/// i.e. appear as a reactant somewhere in the module.
fn nonwaste_species(module: &[Reaction], intermediates: &SpeciesSet) -> SpeciesSet {
    module
        .iter()
        .flat_map(|r| r.reactants().iter())
        .filter(|s| intermediates.contains(*s))
        .cloned()
        .collect()
}

/// True when every reaction touches at most one non-waste species among
/// its reactants and at most one among its products — the precondition
/// for the search driver's linear pruning.
fn has_linear_structure(module: &[Reaction], nonwaste: &SpeciesSet) -> bool {
    module
        .iter()
        .all(|r| r.reactants().count_in(nonwaste) <= 1 && r.products().count_in(nonwaste) <= 1)
}

fn assemble(per_module: &[Vec<Pathway>], interpretation: Option<&Interpretation>) -> FormalBasis {
    let mut reactions = Vec::new();
    let mut collapsed = interpretation.map(|_| Vec::new());
    for elementary in per_module {
        for pathway in elementary {
            let initial = minimal_initial_state(pathway);
            let end = final_state(pathway, &initial)
                .expect("minimal initial state satisfies every reactant");
            reactions.push((initial, end));
            if let (Some(pairs), Some(map)) = (collapsed.as_mut(), interpretation) {
                let collapsed_pathway = map.collapse_pathway(pathway);
                let initial = minimal_initial_state(&collapsed_pathway);
                let end = final_state(&collapsed_pathway, &initial)
                    .expect("minimal initial state satisfies every reactant");
                pairs.push((initial, end));
            }
        }
    }
    reactions.sort();
    reactions.dedup();
    if let Some(pairs) = collapsed.as_mut() {
        pairs.sort();
        pairs.dedup();
    }
    FormalBasis {
        reactions,
        collapsed,
    }
}
