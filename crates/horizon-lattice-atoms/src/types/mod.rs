//! Style description types.

mod block;
mod value;

pub use block::StyleBlock;
pub use value::{RefProducer, StyleValue};
