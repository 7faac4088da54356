//! Fair and cheating flippers.

use rand::Rng;

use crate::constants::FAIR_HEADS_PROBABILITY;
use crate::types::GameParameters;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flipper {
    pub cheater: bool,
    pub heads_probability: f64,
}

impl Flipper {
    pub fn fair() -> Self {
        Self {
            cheater: false,
            heads_probability: FAIR_HEADS_PROBABILITY,
        }
    }

    pub fn cheater(bias: f64) -> Self {
        Self {
            cheater: true,
            heads_probability: bias,
        }
    }

    /// Fair or cheater according to the prior `cheater_rate`.
    pub fn sample<R: Rng + ?Sized>(params: &GameParameters, rng: &mut R) -> Self {
        if rng.random::<f64>() < params.cheater_rate() {
            Self::cheater(params.cheater_bias())
        } else {
            Self::fair()
        }
    }

    /// One flip: `true` for heads.
    #[inline(always)]
    pub fn flip<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.random::<f64>() < self.heads_probability
    }
}

/// A fixed roster of flippers. The first `round(size · cheater_rate)` cheat.
#[derive(Clone, Debug)]
pub struct FlipperPopulation {
    flippers: Vec<Flipper>,
}

impl FlipperPopulation {
    pub fn new(size: usize, params: &GameParameters) -> Self {
        let cheaters = (size as f64 * params.cheater_rate()).round() as usize;
        let flippers = (0..size)
            .map(|i| {
                if i < cheaters {
                    Flipper::cheater(params.cheater_bias())
                } else {
                    Flipper::fair()
                }
            })
            .collect();
        Self { flippers }
    }

    pub fn flippers(&self) -> &[Flipper] {
        &self.flippers
    }

    pub fn len(&self) -> usize {
        self.flippers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flippers.is_empty()
    }

    pub fn cheater_count(&self) -> usize {
        self.flippers.iter().filter(|f| f.cheater).count()
    }
}
