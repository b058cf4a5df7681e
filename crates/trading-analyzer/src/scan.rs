use serde::{Deserialize, Serialize};

/// Buy/sell indices of the best single trade in a price sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub buy_index: usize,
    pub sell_index: usize,
    pub max_profit: f64,
}

/// One pass over chronologically ordered prices, tracking the running minimum.
///
/// The best pair only moves on a strictly larger profit, so ties keep the earliest
/// maximum. Returns `None` for fewer than two prices or when no pair makes a
/// strictly positive profit.
pub fn max_profit_scan(prices: &[f64]) -> Option<ScanResult> {
    if prices.len() < 2 {
        return None;
    }

    let mut min_price = prices[0];
    let mut min_index = 0;
    let mut best: Option<ScanResult> = None;

    for (i, &price) in prices.iter().enumerate().skip(1) {
        let profit = price - min_price;
        let current_best = best.map_or(0.0, |b| b.max_profit);

        if profit > current_best {
            best = Some(ScanResult {
                buy_index: min_index,
                sell_index: i,
                max_profit: profit,
            });
        }

        if price < min_price {
            min_price = price;
            min_index = i;
        }
    }

    best
}
