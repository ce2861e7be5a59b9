pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod state;
pub mod supabase;
pub mod todos;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;
