use super::{Decision, Policy, PolicyContext};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use tracing::{Level, event};

/// Plays a uniformly random legal card, passing only when blocked.
pub struct RandomPolicy {
    rng: SmallRng,
}

impl RandomPolicy {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self { rng }
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn choose(&mut self, ctx: &PolicyContext) -> Decision {
        let decision = match ctx.legal.choose(&mut self.rng) {
            Some(&card) => Decision::Play(card),
            None => Decision::Pass,
        };
        event!(
            target: "sevens_bot::random",
            Level::TRACE,
            seat = %ctx.seat,
            options = ctx.legal.len(),
            %decision,
        );
        decision
    }
}
