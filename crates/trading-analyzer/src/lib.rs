//! Trading Analyzer
//!
//! Best single buy/sell window over analyst target prices. The same one-pass
//! scan backs three entry points: one ticker, a ranked list of tickers, and a
//! global timeline that mixes every stored ticker.

pub mod analyzer;
pub mod scan;
pub mod series;

#[cfg(test)]
mod testing;

pub use analyzer::{AnalyzerConfig, TradingAnalyzer};
pub use scan::{max_profit_scan, ScanResult};
pub use series::PriceSeries;
