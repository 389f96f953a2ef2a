//! Exhaustive search for resistor combinations close to a target value.
//!
//! Subsets of the available resistors are enumerated depth-first: each level
//! only considers positions at or after the one chosen by its parent, so every
//! combination is produced exactly once, as an index-ordered selection. Cost is
//! the sum of C(n, k) for k in 1..=max_size, which is fine for the handful of
//! values on a parts shelf and hopeless for thousands.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::params::{SearchError, SearchParameters};

/// How the members of a combination are wired together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connection {
    Series,
    Parallel,
}

impl Connection {
    pub const ALL: [Connection; 2] = [Connection::Series, Connection::Parallel];

    /// Fold one more member into the running accumulator.
    ///
    /// Series accumulates the sum of resistances, parallel the sum of conductances.
    #[inline]
    fn accumulate(self, acc: f64, resistance: f64) -> f64 {
        match self {
            Connection::Series => acc + resistance,
            Connection::Parallel => acc + 1.0 / resistance,
        }
    }

    #[inline]
    fn total(self, acc: f64) -> f64 {
        match self {
            Connection::Series => acc,
            Connection::Parallel => 1.0 / acc,
        }
    }

    /// Equivalent resistance of `members` wired this way.
    pub fn combine(self, members: &[f64]) -> f64 {
        self.total(
            members
                .iter()
                .fold(0.0, |acc, &r| self.accumulate(acc, r)),
        )
    }

    /// Separator used when printing the members of a combination.
    pub fn separator(self) -> &'static str {
        match self {
            Connection::Series => " + ",
            Connection::Parallel => " || ",
        }
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connection::Series => write!(f, "series"),
            Connection::Parallel => write!(f, "parallel"),
        }
    }
}

/// A selection of resistors together with its equivalent resistance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combination {
    /// Chosen values, in the order they appear in the input list
    pub members: Vec<f64>,
    pub total: f64,
    /// |total - target| / target, in percent
    pub error_percent: f64,
}

/// Relative error as a fraction of the target.
#[inline]
fn relative_error(total: f64, target: f64) -> f64 {
    (total - target).abs() / target
}

struct Enumeration<'a> {
    resistors: &'a [f64],
    connection: Connection,
    target: f64,
    max_error: f64,
    max_size: usize,
    allow_repeats: bool,
    current: Vec<f64>,
    found: Vec<Combination>,
}

impl Enumeration<'_> {
    fn visit(&mut self, acc: f64, start: usize) {
        if !self.current.is_empty() {
            let total = self.connection.total(acc);
            let error = relative_error(total, self.target);
            // Inclusive bound; NaN and infinite errors never pass
            if error <= self.max_error {
                self.found.push(Combination {
                    members: self.current.clone(),
                    total,
                    error_percent: error * 100.0,
                });
            }
        }

        if self.current.len() >= self.max_size {
            return;
        }

        for i in start..self.resistors.len() {
            let resistance = self.resistors[i];
            let next = if self.allow_repeats { i } else { i + 1 };
            self.current.push(resistance);
            self.visit(self.connection.accumulate(acc, resistance), next);
            self.current.pop();
        }
    }
}

fn enumerate(
    resistors: &[f64],
    connection: Connection,
    target: f64,
    tolerance: f64,
    max_size: usize,
    allow_repeats: bool,
) -> Vec<Combination> {
    let mut enumeration = Enumeration {
        resistors,
        connection,
        target,
        max_error: tolerance / 100.0,
        max_size,
        allow_repeats,
        current: Vec::with_capacity(max_size),
        found: Vec::new(),
    };
    enumeration.visit(0.0, 0);

    let mut found = enumeration.found;
    found.sort_by(|a, b| a.error_percent.total_cmp(&b.error_percent));
    found
}

/// All series combinations of at most `max_size` resistors whose sum lies
/// within `tolerance` percent of `target`, best match first.
pub fn series_search(
    resistors: &[f64],
    target: f64,
    tolerance: f64,
    max_size: usize,
) -> Vec<Combination> {
    enumerate(resistors, Connection::Series, target, tolerance, max_size, false)
}

/// All parallel combinations of at most `max_size` resistors whose
/// equivalent resistance lies within `tolerance` percent of `target`,
/// best match first.
///
/// Members must be non-zero; the caller is expected to have filtered them.
pub fn parallel_search(
    resistors: &[f64],
    target: f64,
    tolerance: f64,
    max_size: usize,
) -> Vec<Combination> {
    enumerate(
        resistors,
        Connection::Parallel,
        target,
        tolerance,
        max_size,
        false,
    )
}

/// Run a single search with the given parameters.
#[instrument(name = "search", skip_all, fields(connection = %connection, n = resistors.len()))]
pub fn search(
    resistors: &[f64],
    connection: Connection,
    params: &SearchParameters,
) -> Vec<Combination> {
    enumerate(
        resistors,
        connection,
        params.target,
        params.tolerance,
        params.max_size,
        params.allow_repeats,
    )
}

/// Number of selections the enumeration visits for `n` inputs.
///
/// Saturates at `u64::MAX`.
pub fn count_candidates(n: usize, max_size: usize, allow_repeats: bool) -> u64 {
    if allow_repeats && n == 1 {
        return max_size as u64;
    }

    let n = n as u128;
    let mut binomial: u128 = 1;
    let mut total: u128 = 0;

    for k in 1..=max_size as u128 {
        let factor = if allow_repeats { n + k - 1 } else { n + 1 - k.min(n + 1) };
        binomial = match binomial.checked_mul(factor) {
            Some(product) => product / k,
            None => return u64::MAX,
        };
        if binomial == 0 {
            break;
        }
        total = match total.checked_add(binomial) {
            Some(sum) => sum,
            None => return u64::MAX,
        };
    }

    u64::try_from(total).unwrap_or(u64::MAX)
}

/// Results of one calculation, one list per connection type.
///
/// A list is empty when its connection type was not requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub series: Vec<Combination>,
    pub parallel: Vec<Combination>,
}

impl SearchResults {
    pub fn get(&self, connection: Connection) -> &[Combination] {
        match connection {
            Connection::Series => &self.series,
            Connection::Parallel => &self.parallel,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty() && self.parallel.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Keep only the best `limit` entries of each list.
    pub fn truncated(&self, limit: usize) -> SearchResults {
        SearchResults {
            series: self.series.iter().take(limit).cloned().collect(),
            parallel: self.parallel.iter().take(limit).cloned().collect(),
        }
    }
}

/// Validate `params` and run every search its mode asks for.
pub fn find_combinations(
    resistors: &[f64],
    params: &SearchParameters,
) -> Result<SearchResults, SearchError> {
    params.validate()?;

    log::info!(
        "Searching {} candidate selections of {} resistors",
        count_candidates(resistors.len(), params.max_size, params.allow_repeats),
        resistors.len()
    );

    let mut results = SearchResults::default();
    if params.mode.includes_series() {
        results.series = search(resistors, Connection::Series, params);
    }
    if params.mode.includes_parallel() {
        results.parallel = search(resistors, Connection::Parallel, params);
    }

    log::debug!(
        "Found {} series and {} parallel combinations",
        results.series.len(),
        results.parallel.len()
    );
    Ok(results)
}
