use crate::config::Config;
use crate::params::{SearchError, SearchParameters};
use crate::search::{find_combinations, SearchResults};
use crate::value::Resistance;

/// Parse a comma separated list of resistances.
///
/// Tokens that do not parse, and values that are zero, negative or not
/// finite, are dropped; the rest keep their order and duplicates.
pub fn parse_resistor_list(text: &str) -> Vec<f64> {
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| match token.parse::<Resistance>() {
            Ok(r) if r.is_positive() => Some(r.to_f64()),
            Ok(_) => {
                log::warn!("Skipping non-positive resistance '{}'", token);
                None
            }
            Err(e) => {
                log::debug!("Skipping '{}': {}", token, e);
                None
            }
        })
        .collect()
}

/// Holds the inputs of a calculation and the last results it produced.
///
/// Each [`Calculator::calculate`] recomputes everything from the current
/// inputs. A failed run leaves the previous results in place.
#[derive(Debug, Clone, Default)]
pub struct Calculator {
    /// Resistor list as entered, e.g. `"100, 220, 4k7"`
    pub resistors: String,
    pub params: SearchParameters,
    results: SearchResults,
}

impl Calculator {
    pub fn new(resistors: impl Into<String>, params: SearchParameters) -> Self {
        Self {
            resistors: resistors.into(),
            params,
            results: SearchResults::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.resistors.clone(), config.search_parameters())
    }

    /// Results of the last successful calculation.
    pub fn results(&self) -> &SearchResults {
        &self.results
    }

    /// Run the searches and replace the stored results.
    ///
    /// On error the stored results are not touched.
    pub fn try_calculate(&mut self) -> Result<&SearchResults, SearchError> {
        let resistors = parse_resistor_list(&self.resistors);
        self.results = find_combinations(&resistors, &self.params)?;
        Ok(&self.results)
    }

    /// Like [`Calculator::try_calculate`], but errors are logged instead of
    /// returned. Returns whether the results were replaced.
    pub fn calculate(&mut self) -> bool {
        match self.try_calculate() {
            Ok(_) => true,
            Err(e) => {
                log::error!("Calculation failed: {}", e);
                false
            }
        }
    }
}
