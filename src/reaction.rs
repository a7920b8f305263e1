//! Reactions and reaction networks.
//!
//! A [`Reaction`] is an ordered pair of multisets: reactants and products.
//! Reactions are irreversible; reversible reactions must be split into two
//! irreversible ones before they enter this crate. Equality, ordering, and
//! hashing are structural over the sorted reactant and product lists, so
//! duplicates deduplicate the way the rest of the crate expects.

use std::collections::HashSet;
use std::fmt;

use crate::state::{Species, SpeciesSet, State};

/// An irreversible reaction between species multisets.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reaction {
    reactants: State,
    products: State,
}

/// An unordered collection of reactions. A module is a `Crn` that shares
/// no intermediate species with any other module of the same network.
pub type Crn = Vec<Reaction>;

impl Reaction {
    pub fn new(reactants: State, products: State) -> Self {
        Reaction {
            reactants,
            products,
        }
    }

    /// Build a reaction from species lists in any order.
    pub fn from_species(reactants: Vec<Species>, products: Vec<Species>) -> Self {
        Reaction {
            reactants: State::new(reactants),
            products: State::new(products),
        }
    }

    pub fn reactants(&self) -> &State {
        &self.reactants
    }

    pub fn products(&self) -> &State {
        &self.products
    }

    /// The larger of the reactant and product counts.
    pub fn max_arity(&self) -> usize {
        self.reactants.len().max(self.products.len())
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |s: &State| {
            s.iter()
                .map(|x| x.as_str())
                .collect::<Vec<_>>()
                .join(" + ")
        };
        write!(f, "{} -> {}", side(&self.reactants), side(&self.products))
    }
}

/// Every species occurring anywhere in the network.
pub fn crn_species(crn: &[Reaction]) -> SpeciesSet {
    let mut all = HashSet::new();
    for rxn in crn {
        all.extend(rxn.reactants().iter().cloned());
        all.extend(rxn.products().iter().cloned());
    }
    all
}

/// The species of the network that are not formal.
pub fn crn_intermediates(crn: &[Reaction], fs: &SpeciesSet) -> SpeciesSet {
    crn_species(crn)
        .into_iter()
        .filter(|s| !fs.contains(s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rxn(reactants: &[&str], products: &[&str]) -> Reaction {
        Reaction::from_species(
            reactants.iter().map(|s| s.to_string()).collect(),
            products.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn structural_equality_ignores_input_order() {
        assert_eq!(rxn(&["A", "B"], &["C"]), rxn(&["B", "A"], &["C"]));
        assert_ne!(rxn(&["A"], &["C"]), rxn(&["A"], &["B"]));
    }

    #[test]
    fn max_arity() {
        assert_eq!(rxn(&["A"], &["B", "C", "D"]).max_arity(), 3);
        assert_eq!(rxn(&["A", "B"], &["C"]).max_arity(), 2);
        assert_eq!(rxn(&[], &[]).max_arity(), 0);
    }

    #[test]
    fn display_arrow_notation() {
        assert_eq!(rxn(&["B", "A"], &["C"]).to_string(), "A + B -> C");
        assert_eq!(rxn(&["A"], &[]).to_string(), "A -> ");
    }

    #[test]
    fn species_and_intermediates() {
        let crn = vec![rxn(&["A"], &["i"]), rxn(&["i"], &["B"])];
        let fs: SpeciesSet = ["A", "B"].iter().map(|s| s.to_string()).collect();
        let all = crn_species(&crn);
        assert_eq!(all.len(), 3);
        let inter = crn_intermediates(&crn, &fs);
        assert_eq!(inter.len(), 1);
        assert!(inter.contains("i"));
    }
}
