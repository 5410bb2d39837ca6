//! Media references and their resolution into playable URIs

pub mod reference;
pub mod resolver;

pub use reference::{MediaReference, ResolvedSource};
pub use resolver::{Resolution, ResolveOutcome, ResolveTarget, SourceResolver};
