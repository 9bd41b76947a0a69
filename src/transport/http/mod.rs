pub mod router;
pub mod types;
pub mod handlers {
    pub mod common;
    pub mod games;
    pub mod genres;
    pub mod health;
    pub mod platforms;
}

pub use router::{create_router, ApiDoc};
pub use types::AppState;
