pub mod config;
pub mod error;
pub mod gallery;
pub mod library;
pub mod poem;
pub mod refresh;
pub mod state;
