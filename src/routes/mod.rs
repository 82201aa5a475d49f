use axum::Router;

use crate::RecordStore;

mod accuracy;
mod health;

// ---

pub fn router(store: RecordStore) -> Router {
    // ---
    Router::new()
        .merge(accuracy::router())
        .merge(health::router())
        .with_state(store)
}
