/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 * - Cheap to clone (Arc inside)
 */
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct AppState {
    context_key: Arc<str>,
}

impl AppState {
    pub fn new(context_key: impl Into<Arc<str>>) -> Self {
        Self {
            context_key: context_key.into(),
        }
    }

    /// Key under which the JWT layer stores its record.
    pub fn context_key(&self) -> &str {
        &self.context_key
    }
}
