//! Built-in market data tools

pub mod history;
pub mod indicators;

pub use history::{get_historical_data, GetHistoricalDataTool, GetHistoricalDataToolFactory};
pub use indicators::{
    get_indicators, get_specific_indicators, GetIndicatorsTool, GetIndicatorsToolFactory,
    GetSpecificIndicatorsTool, GetSpecificIndicatorsToolFactory,
};
