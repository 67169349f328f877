pub mod aggregator;
pub mod normalize;

pub use aggregator::{SessionAccumulator, SessionAggregate, aggregate};
pub use normalize::{NormalizeOptions, TruncationLimits, normalize_lines, normalize_str, truncate};
