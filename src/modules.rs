//! Partition a network into modules sharing no intermediate species.
//!
//! Two intermediates belong together when they co-occur in one reaction,
//! on either side. The union-find closure of that relation partitions the
//! intermediates, and every reaction follows the partition class of any
//! intermediate it touches. Reactions touching no intermediate at all form
//! singleton modules. Decomposability and tidiness are local to
//! intermediate species, so the modules can be verified independently.

use std::collections::HashMap;

use petgraph::unionfind::UnionFind;

use crate::reaction::{Crn, Reaction};
use crate::state::{Species, SpeciesSet};

/// Split `crn` into modules that are pairwise reaction-disjoint, share no
/// intermediate species, and together contain every reaction. Module
/// order follows first appearance in the network.
pub fn find_modules(crn: &[Reaction], intermediates: &SpeciesSet) -> Vec<Crn> {
    // deterministic index per intermediate, in order of first appearance
    let mut index: HashMap<&Species, usize> = HashMap::new();
    for rxn in crn {
        for s in rxn.reactants().iter().chain(rxn.products().iter()) {
            if intermediates.contains(s) && !index.contains_key(s) {
                let next = index.len();
                index.insert(s, next);
            }
        }
    }

    let mut sets: UnionFind<usize> = UnionFind::new(index.len());
    for rxn in crn {
        let mut first: Option<usize> = None;
        for s in rxn.reactants().iter().chain(rxn.products().iter()) {
            let i = match index.get(s) {
                Some(&i) => i,
                None => continue,
            };
            match first {
                None => first = Some(i),
                Some(f) => {
                    sets.union(f, i);
                }
            }
        }
    }

    let mut modules: Vec<Crn> = Vec::new();
    let mut module_of_root: HashMap<usize, usize> = HashMap::new();
    for rxn in crn {
        let touched = rxn
            .reactants()
            .iter()
            .chain(rxn.products().iter())
            .find_map(|s| index.get(s).copied());
        match touched {
            Some(i) => {
                let root = sets.find_mut(i);
                let at = *module_of_root.entry(root).or_insert_with(|| {
                    modules.push(Vec::new());
                    modules.len() - 1
                });
                modules[at].push(rxn.clone());
            }
            None => modules.push(vec![rxn.clone()]),
        }
    }
    modules
}
