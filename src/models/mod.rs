mod dataset;
mod orders;
mod style;
pub use dataset::*;
pub use orders::*;
pub use style::*;

use std::sync::Arc;

use crate::storage::{SessionStorage, StyleStorage};

/// Shared data for the handlers
#[derive(Clone)]
pub struct AppState {
    pub style_storage: Arc<StyleStorage>,
    pub session_storage: Arc<SessionStorage>,
}
impl AppState {
    pub fn new(style_storage: StyleStorage, session_storage: SessionStorage) -> Self {
        Self {
            style_storage: Arc::new(style_storage),
            session_storage: Arc::new(session_storage),
        }
    }
}
