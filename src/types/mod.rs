//! Type definitions for the scoring pipeline

pub mod decision;
pub mod record;

pub use decision::Decision;
pub use record::RawRecord;
