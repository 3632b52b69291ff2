//! Home page counters and per-session state

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Catalog-wide counts shown on the home page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CatalogCounts {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
    pub num_genres: i64,
    /// Books whose title contains the featured term
    pub num_books_with_term: i64,
}

/// State kept per browser session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub num_visits: i64,
}

impl SessionState {
    /// Count one visit: returns the number of earlier visits (what the page
    /// shows) and the state to store for the next request.
    pub fn visit(self) -> (i64, SessionState) {
        (
            self.num_visits,
            SessionState {
                num_visits: self.num_visits + 1,
            },
        )
    }
}
