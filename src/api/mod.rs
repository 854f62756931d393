pub mod routes;
mod server;
pub use server::{app, serve};
pub mod public;
mod session;
pub use session::AuthUser;
mod state;
pub use state::AppState;
