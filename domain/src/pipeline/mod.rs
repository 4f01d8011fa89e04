//! Pipeline stages reported to progress observers

mod phase;

pub use phase::Phase;
