//! Shared state for the operational routes.

use crate::store::Backend;

#[derive(Clone)]
pub struct AppState {
    pub backend: Backend,
}
