pub mod random;
pub use random::Random;

/// Instances of a backend together with the policy used to pick one of them.
#[derive(Debug, Clone, Default)]
pub struct Balancer<P, S> {
    pub policy: P,
    pub instances: Vec<S>,
}

impl<P, S> Balancer<P, S> {
    pub fn new(policy: P, instances: Vec<S>) -> Self {
        Self { policy, instances }
    }
    pub fn pick<R>(&self, req: &R) -> Option<&S>
    where
        P: BalancePolicy<S, R>,
    {
        self.policy.pick(&self.instances, req)
    }
}

pub trait BalancePolicy<S, R> {
    fn pick<'s>(&self, instances: &'s [S], req: &R) -> Option<&'s S>;
}
