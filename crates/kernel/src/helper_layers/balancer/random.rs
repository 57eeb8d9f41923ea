use rand::seq::SliceRandom;

use super::BalancePolicy;

/// A policy that gives every instance the same chance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Random;

impl<S, R> BalancePolicy<S, R> for Random {
    fn pick<'s>(&self, instances: &'s [S], _req: &R) -> Option<&'s S> {
        match instances {
            [single] => Some(single),
            _ => instances.choose(&mut rand::thread_rng()),
        }
    }
}
