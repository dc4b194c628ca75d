pub mod auth;
pub mod authors;
pub mod books;
mod health_check;
pub mod publishers;

pub use auth::{login, logout, refresh, register};
pub use health_check::health_check;
