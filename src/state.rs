//! Multiset algebra over species collections.
//!
//! A [`State`] is an order-independent, duplicate-preserving collection of
//! species, stored sorted so that comparison, hashing, and the merge-scan
//! containment test are all canonical. Whether a species is *formal* or
//! *intermediate* is not a property of the species itself — it is decided
//! per network by membership in a formal-species set.
//!
//! All operations here are pure: a state can be reused after any query.

use std::collections::HashSet;
use std::fmt;

/// A species identifier.
pub type Species = String;

/// A set of species, e.g. the formal species of a network.
pub type SpeciesSet = HashSet<Species>;

/// A multiset of species in canonical (sorted) order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct State(Vec<Species>);

impl State {
    /// Build a state from species in any order.
    pub fn new(mut species: Vec<Species>) -> Self {
        species.sort();
        State(species)
    }

    /// The empty state.
    pub fn empty() -> Self {
        State(Vec::new())
    }

    /// Number of species, counted with multiplicity.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The species in sorted order.
    pub fn species(&self) -> &[Species] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Species> {
        self.0.iter()
    }

    /// The formal members, lazily.
    pub fn formal<'a>(&'a self, fs: &'a SpeciesSet) -> impl Iterator<Item = &'a Species> + 'a {
        self.0.iter().filter(|s| fs.contains(*s))
    }

    /// The intermediate (non-formal) members, lazily.
    pub fn intermediate<'a>(
        &'a self,
        fs: &'a SpeciesSet,
    ) -> impl Iterator<Item = &'a Species> + 'a {
        self.0.iter().filter(|s| !fs.contains(*s))
    }

    /// The sub-multiset of formal members.
    pub fn formal_part(&self, fs: &SpeciesSet) -> State {
        State(self.formal(fs).cloned().collect())
    }

    /// The sub-multiset of intermediate members.
    pub fn intermediate_part(&self, fs: &SpeciesSet) -> State {
        State(self.intermediate(fs).cloned().collect())
    }

    /// True if every member is formal. The empty state is formal.
    pub fn is_formal(&self, fs: &SpeciesSet) -> bool {
        self.0.iter().all(|s| fs.contains(s))
    }

    /// Number of members, with multiplicity, that belong to `set`.
    pub fn count_in(&self, set: &SpeciesSet) -> usize {
        self.0.iter().filter(|s| set.contains(*s)).count()
    }

    /// Multiset containment: true iff for every species, its count in
    /// `other` is at most its count in `self`.
    ///
    /// Implemented as a merge scan over the two sorted vectors, not as
    /// subsequence matching.
    pub fn contains(&self, other: &State) -> bool {
        let mut need = other.0.iter().peekable();
        for have in &self.0 {
            match need.peek() {
                None => return true,
                Some(n) if *n == have => {
                    need.next();
                }
                Some(n) if *n < have => return false,
                Some(_) => {}
            }
        }
        need.peek().is_none()
    }

    /// Multiset difference: remove one occurrence of each member of
    /// `other` from `self`. Members of `other` not present are ignored.
    pub fn minus(&self, other: &State) -> State {
        let b = &other.0;
        let mut i = 0;
        let mut left = Vec::with_capacity(self.0.len());
        for x in &self.0 {
            while i < b.len() && b[i] < *x {
                i += 1;
            }
            if i < b.len() && b[i] == *x {
                i += 1;
            } else {
                left.push(x.clone());
            }
        }
        State(left)
    }

    /// Multiset sum: all members of both states.
    pub fn plus(&self, other: &State) -> State {
        let mut merged = Vec::with_capacity(self.0.len() + other.0.len());
        let (mut a, mut b) = (self.0.iter().peekable(), other.0.iter().peekable());
        loop {
            match (a.peek(), b.peek()) {
                (Some(x), Some(y)) => {
                    if x <= y {
                        merged.push((*x).clone());
                        a.next();
                    } else {
                        merged.push((*y).clone());
                        b.next();
                    }
                }
                (Some(x), None) => {
                    merged.push((*x).clone());
                    a.next();
                }
                (None, Some(y)) => {
                    merged.push((*y).clone());
                    b.next();
                }
                (None, None) => break,
            }
        }
        State(merged)
    }
}

impl FromIterator<Species> for State {
    fn from_iter<I: IntoIterator<Item = Species>>(iter: I) -> Self {
        State::new(iter.into_iter().collect())
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, s) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{s}")?;
        }
        write!(f, "]")
    }
}
