//! Git operations behind a mockable backend trait.

pub mod backend;
pub mod cli;

pub use backend::GitBackend;
pub use cli::GitCli;
