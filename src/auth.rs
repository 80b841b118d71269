//! Credential models: the persisted GitHub credential, its redacting secret wrapper, and the
//! GitHub App JWT claims used to mint installation tokens.

pub mod app;
pub mod credential;
pub mod secret;

pub use app::*;
pub use credential::*;
pub use secret::*;
