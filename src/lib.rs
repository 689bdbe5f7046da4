pub mod config;
pub mod client;
pub mod models;
pub mod error;
pub mod api;
pub mod plan;
pub mod enrollment;
pub mod session;
pub mod users;
pub mod turmas;
pub mod cts;
pub mod presenca;
pub mod financeiro;
pub mod content;
// re-export items if you prefer a flat structure:
pub use client::ApiClient;
pub use error::Result as AppResult;
pub use session::SessionContext;
