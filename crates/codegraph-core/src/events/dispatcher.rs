use super::handler::CodeGraphEventHandler;
use std::sync::Arc;

/// Fans events out to zero or more registered handlers. Cloning is cheap
/// (`Arc` to the handler list) so it can be shared across worker tasks.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    handlers: Arc<Vec<Arc<dyn CodeGraphEventHandler>>>,
}

impl EventDispatcher {
    pub fn new(handlers: Vec<Arc<dyn CodeGraphEventHandler>>) -> Self {
        Self {
            handlers: Arc::new(handlers),
        }
    }

    pub fn handlers(&self) -> &[Arc<dyn CodeGraphEventHandler>] {
        &self.handlers
    }
}
