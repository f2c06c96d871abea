//! Sources of randomness for handlers that vary their replies.

use rand::seq::IndexedRandom;

/// Chooses among canned replies and decides probabilistic behaviour.
pub trait ReplyPicker: Send + Sync {
    /// Pick one of `options`. `None` only when `options` is empty.
    fn pick<'a>(&self, options: &'a [&'a str]) -> Option<&'a str>;

    /// `true` with the given probability. Values outside `[0, 1]` clamp.
    fn chance(&self, probability: f64) -> bool;
}

/// Uniformly random picker backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl ReplyPicker for RandomPicker {
    fn pick<'a>(&self, options: &'a [&'a str]) -> Option<&'a str> {
        options.choose(&mut rand::rng()).copied()
    }

    fn chance(&self, probability: f64) -> bool {
        if probability.is_nan() {
            return false;
        }
        rand::random_bool(probability.clamp(0.0, 1.0))
    }
}

/// Deterministic picker: always the option at `index` (wrapping), and
/// `chance(p)` succeeds when `roll < p`.
#[derive(Debug, Clone, Copy)]
pub struct FixedPicker {
    pub index: usize,
    pub roll: f64,
}

impl FixedPicker {
    #[must_use]
    pub fn new(index: usize, roll: f64) -> Self {
        Self { index, roll }
    }

    /// Picks the first option and never passes a chance roll.
    #[must_use]
    pub fn never() -> Self {
        Self::new(0, 1.0)
    }
}

impl Default for FixedPicker {
    /// First option; every chance with nonzero probability succeeds.
    fn default() -> Self {
        Self::new(0, 0.0)
    }
}

impl ReplyPicker for FixedPicker {
    fn pick<'a>(&self, options: &'a [&'a str]) -> Option<&'a str> {
        if options.is_empty() {
            return None;
        }
        options.get(self.index % options.len()).copied()
    }

    fn chance(&self, probability: f64) -> bool {
        self.roll < probability.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPTIONS: &[&str] = &[":wave:", ":pray:", ":raised_hands:"];

    #[test]
    fn random_picker_stays_in_range() {
        let picker = RandomPicker;
        for _ in 0..50 {
            let picked = picker.pick(OPTIONS);
            assert!(picked.is_some_and(|p| OPTIONS.contains(&p)));
        }
        assert_eq!(picker.pick(&[]), None);
    }

    #[test]
    fn random_picker_extremes_are_certain() {
        let picker = RandomPicker;
        assert!(!picker.chance(0.0));
        assert!(picker.chance(1.0));
        assert!(picker.chance(7.0));
        assert!(!picker.chance(-1.0));
    }

    #[test]
    fn fixed_picker_wraps() {
        assert_eq!(FixedPicker::new(4, 0.0).pick(OPTIONS), Some(":pray:"));
        assert_eq!(FixedPicker::default().pick(OPTIONS), Some(":wave:"));
        assert_eq!(FixedPicker::default().pick(&[]), None);
    }

    #[test]
    fn fixed_picker_rolls() {
        let picker = FixedPicker::new(0, 0.5);
        assert!(picker.chance(0.6));
        assert!(!picker.chance(0.5));
        assert!(!FixedPicker::never().chance(1.0));
        assert!(FixedPicker::default().chance(0.01));
        assert!(!FixedPicker::default().chance(0.0));
    }
}
