//! Formal-basis enumeration for implementation reaction networks.
//!
//! An implementation network realizes an abstract network through
//! auxiliary *intermediate* species. This crate explores every pathway
//! the implementation can take, isolates the *elementary* (irreducible)
//! ones, verifies that the network is *tidy* (intermediates can always be
//! cleared) and *regular* (every elementary pathway could be restarted
//! from a formally indistinguishable state), and extracts the *formal
//! basis*: the set of initial/final formal-state pairs the network
//! actually realizes.
//!
//! The main entry point is [`find_basis`]. Reversible reactions must be
//! split into two irreversible [`Reaction`]s before they enter the crate;
//! parsing and the downstream equivalence decision live elsewhere.

pub mod basis;
pub mod closure;
pub mod modules;
pub mod pathway;
pub mod reaction;
mod search;
pub mod state;
pub mod tidy;

pub use basis::{find_basis, BasisError, BasisOptions, FormalBasis, Interpretation};
pub use closure::{formal_closure, regular_final_state};
pub use modules::find_modules;
pub use pathway::{
    decompose, final_state, linear_throughout, minimal_initial_state, next_state, width, Pathway,
    PreconditionError,
};
pub use reaction::{crn_intermediates, crn_species, Crn, Reaction};
pub use state::{Species, SpeciesSet, State};
pub use tidy::tidy;
