//! Find series and parallel resistor combinations that approximate a target
//! value from the parts you have on hand.
//!
//! ```
//! use rescalc_core::{series_search, parallel_search};
//!
//! let series = series_search(&[100.0, 220.0, 330.0], 320.0, 5.0, 2);
//! assert_eq!(series[0].members, vec![100.0, 220.0]);
//!
//! let parallel = parallel_search(&[100.0, 100.0], 50.0, 1.0, 2);
//! assert_eq!(parallel[0].members, vec![100.0, 100.0]);
//! ```

pub mod calculator;
pub mod config;
pub mod params;
pub mod search;
#[cfg(feature = "table")]
mod table;
pub mod value;

pub use calculator::{parse_resistor_list, Calculator};
pub use config::{Config, ConfigError};
pub use params::{ConnectionMode, SearchError, SearchParameters};
pub use search::{
    count_candidates, find_combinations, parallel_search, search, series_search, Combination,
    Connection, SearchResults,
};
pub use value::{format_ohms, ParseError, Resistance};
