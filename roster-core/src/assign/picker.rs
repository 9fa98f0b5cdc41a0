//! Randomized reviewer selection
//!
//! The random source is owned by the picker and handed to the engine at
//! construction, so tests can fix the seed and get reproducible picks.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::models::User;

/// Uniform sampler over candidate reviewers
#[derive(Debug)]
pub struct ReviewerPicker {
    rng: Mutex<StdRng>,
}

impl Default for ReviewerPicker {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl ReviewerPicker {
    /// Picker seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Picker with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Seeded picker when a seed is given, entropy otherwise
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map(Self::seeded).unwrap_or_else(Self::from_entropy)
    }

    /// Select up to `max_count` distinct user ids from `candidates`.
    ///
    /// Sampling is uniform without replacement. If there are fewer candidates
    /// than `max_count` all of them are returned; an empty result is valid.
    pub fn select(&self, candidates: &[User], max_count: usize) -> Vec<String> {
        let mut ids: Vec<&str> = candidates.iter().map(|u| u.user_id.as_str()).collect();
        if ids.is_empty() || max_count == 0 {
            return Vec::new();
        }

        // A poisoned lock only means another selection panicked mid-shuffle;
        // the generator state is still usable.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        ids.shuffle(&mut *rng);
        ids.truncate(max_count);
        ids.into_iter().map(str::to_string).collect()
    }

    /// Select exactly one id, or None when there are no candidates
    pub fn select_one(&self, candidates: &[User]) -> Option<String> {
        self.select(candidates, 1).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    fn users(ids: &[&str]) -> Vec<User> {
        ids.iter().map(|id| User::new(*id, *id, "backend")).collect()
    }

    #[test]
    fn test_select_caps_at_max() {
        let picker = ReviewerPicker::seeded(7);
        let picked = picker.select(&users(&["u1", "u2", "u3", "u4"]), 2);
        assert_eq!(picked.len(), 2);
        let distinct: HashSet<_> = picked.iter().collect();
        assert_eq!(distinct.len(), 2);
    }

    #[test]
    fn test_select_returns_all_when_short() {
        let picker = ReviewerPicker::seeded(7);
        let mut picked = picker.select(&users(&["u2"]), 2);
        picked.sort();
        assert_eq!(picked, vec!["u2"]);
    }

    #[test]
    fn test_select_empty_is_not_an_error() {
        let picker = ReviewerPicker::seeded(7);
        assert!(picker.select(&[], 2).is_empty());
        assert!(picker.select_one(&[]).is_none());
    }

    #[test]
    fn test_same_seed_same_picks() {
        let pool = users(&["u1", "u2", "u3", "u4", "u5"]);
        let a = ReviewerPicker::seeded(42);
        let b = ReviewerPicker::seeded(42);
        for _ in 0..10 {
            assert_eq!(a.select(&pool, 2), b.select(&pool, 2));
        }
    }

    #[test]
    fn test_selection_is_not_prefix_biased() {
        let pool = users(&["u1", "u2", "u3", "u4"]);
        let picker = ReviewerPicker::seeded(1);
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..4000 {
            for id in picker.select(&pool, 1) {
                *counts.entry(id).or_default() += 1;
            }
        }
        // Each of four ids should land near 1000 picks
        for id in ["u1", "u2", "u3", "u4"] {
            let n = counts.get(id).copied().unwrap_or(0);
            assert!((800..1200).contains(&n), "{} picked {} times", id, n);
        }
    }
}
