use super::{Decision, Policy, PolicyContext};
use sevens_core::game::error::GameError;

/// Seat driven by an outside source such as a console prompt or a UI.
///
/// The closure receives the same context a bot would and is asked again
/// after every rejection, so it may return anything.
pub struct HumanPolicy<F>
where
    F: FnMut(&PolicyContext) -> Decision + Send,
{
    name: String,
    input: F,
    last_error: Option<GameError>,
}

impl<F> HumanPolicy<F>
where
    F: FnMut(&PolicyContext) -> Decision + Send,
{
    pub fn new(name: impl Into<String>, input: F) -> Self {
        Self {
            name: name.into(),
            input,
            last_error: None,
        }
    }

    /// The most recent refusal, for front ends that want to show it.
    pub fn last_error(&self) -> Option<&GameError> {
        self.last_error.as_ref()
    }
}

impl<F> Policy for HumanPolicy<F>
where
    F: FnMut(&PolicyContext) -> Decision + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn choose(&mut self, ctx: &PolicyContext) -> Decision {
        (self.input)(ctx)
    }

    fn on_rejected(&mut self, _ctx: &PolicyContext, error: &GameError) {
        self.last_error = Some(error.clone());
    }
}
