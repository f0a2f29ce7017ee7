//! Summary statistics for populations and per-agent histories.
//!
//! ```
//! use hurdle_stats::descriptive::DescriptiveStats;
//!
//! let times = [2.5, 4.0, 1.5];
//! let stats = DescriptiveStats::new(times).unwrap();
//! assert_eq!(stats.count, 3);
//! assert_eq!(stats.max, 4.0);
//! ```

pub mod descriptive;
