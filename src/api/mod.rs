pub mod pagination;
pub mod state;

pub use pagination::PageQuery;
pub use state::AppState;
