pub mod error;
pub mod message;
pub mod pattern;
pub mod record;
mod util;
pub mod weights;

pub use error::{Error, Result};
pub use message::*;
pub use pattern::*;
pub use record::*;
pub use util::*;
pub use weights::ScoreWeights;
