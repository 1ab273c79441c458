//! Name matching for `get_specific_indicators`

use crate::market::IndicatorMap;

/// Keep every key that contains one of the requested names, ignoring case.
///
/// `RSI` therefore keeps `RSI`, `RSI[1]` and `Stoch.RSI.K`. Key order is
/// preserved. An empty request list keeps nothing.
pub fn filter_indicators(all: &IndicatorMap, requested: &[String]) -> IndicatorMap {
    let needles: Vec<String> = requested.iter().map(|r| r.to_lowercase()).collect();

    all.iter()
        .filter(|(key, _)| {
            let key = key.to_lowercase();
            needles.iter().any(|needle| key.contains(needle.as_str()))
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
