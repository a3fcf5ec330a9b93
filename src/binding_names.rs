//! Placeholder names for predicate and assignment bindings.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Length of every generated name.
pub const NAME_LEN: usize = 5;

/// Produces `NAME_LEN`-letter lowercase names, unique within one generator.
///
/// Each builder owns exactly one generator, so a name is never handed out twice
/// for the same statement. A candidate that was already used is discarded and a
/// new one drawn.
#[derive(Debug, Clone)]
pub struct BindingNameGenerator {
    rng: StdRng,
    used: HashSet<String>,
}

impl Default for BindingNameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingNameGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            used: HashSet::new(),
        }
    }

    /// Deterministic generator, for reproducible statement text in tests.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            used: HashSet::new(),
        }
    }

    /// Mark `name` as taken so it is never generated.
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.used.insert(name.into());
    }

    #[must_use]
    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    #[must_use]
    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    /// Next unused name.
    pub fn next_name(&mut self) -> String {
        loop {
            let candidate = self.candidate();
            if !self.used.contains(&candidate) {
                self.used.insert(candidate.clone());
                return candidate;
            }
            tracing::trace!(name = %candidate, "binding name collision, regenerating");
        }
    }

    fn candidate(&mut self) -> String {
        (0..NAME_LEN)
            .map(|_| char::from(self.rng.gen_range(b'a'..=b'z')))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_five_lowercase_letters() {
        let mut names = BindingNameGenerator::new();
        for _ in 0..50 {
            let name = names.next_name();
            assert_eq!(name.len(), NAME_LEN);
            assert!(name.chars().all(|c| c.is_ascii_lowercase()), "{name}");
        }
    }

    #[test]
    fn names_never_repeat() {
        let mut names = BindingNameGenerator::with_seed(42);
        let mut seen = HashSet::new();
        for _ in 0..2_000 {
            assert!(seen.insert(names.next_name()));
        }
        assert_eq!(names.used_count(), 2_000);
    }

    #[test]
    fn collision_is_regenerated() {
        let first = BindingNameGenerator::with_seed(7).next_name();

        let mut names = BindingNameGenerator::with_seed(7);
        names.reserve(first.clone());
        let second = names.next_name();

        assert_ne!(first, second);
        assert!(names.is_used(&first));
        assert!(names.is_used(&second));
    }

    #[test]
    fn seeded_generators_agree() {
        let mut a = BindingNameGenerator::with_seed(1);
        let mut b = BindingNameGenerator::with_seed(1);
        assert_eq!(a.next_name(), b.next_name());
    }
}
