//! Style reference resolution.

mod reference;
mod resolver;

pub use reference::StyleRef;
pub use resolver::StyleResolver;
