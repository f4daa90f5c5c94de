//! The temporal value hierarchy and the engines that operate on it
//! (C3 storage, C4 segment arithmetic, C5 lifting, and onward).

pub mod aggregate;
pub mod instant;
pub mod lift;
pub mod modify;
pub mod restrict;
pub mod segment;
pub mod sequence;
pub mod sequence_set;
pub mod temporal;
pub mod tile;

pub use instant::TInstant;
pub use restrict::TBox;
pub use sequence::TSequence;
pub use sequence_set::TSequenceSet;
pub use temporal::Temporal;
