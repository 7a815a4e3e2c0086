/*!
 * Usage Analysis
 *
 * Trend classification and a leak heuristic over a usage series ordered
 * oldest first.
 *
 * The leak check is a heuristic, not a proof: sustained growth during warmup
 * reads as a leak, and a leak masked by periodic cache churn can go unseen.
 * Treat a positive result as a prompt to investigate.
 */

use super::types::Trend;
use crate::core::limits::{LEAK_INCREASE_RATIO, LEAK_WINDOW, TREND_THRESHOLD, TREND_WINDOW};

/// Classify the last five samples
///
/// Compares the mean of the two oldest samples in the window against the
/// mean of the two newest. Fewer than five samples is Stable.
pub fn classify_trend(series: &[u64]) -> Trend {
    if series.len() < TREND_WINDOW {
        return Trend::Stable;
    }

    let window = &series[series.len() - TREND_WINDOW..];
    let older = (window[0] as f64 + window[1] as f64) / 2.0;
    let newer = (window[TREND_WINDOW - 2] as f64 + window[TREND_WINDOW - 1] as f64) / 2.0;

    if older == 0.0 {
        return if newer > 0.0 {
            Trend::Increasing
        } else {
            Trend::Stable
        };
    }

    let change = (newer - older) / older;
    if change > TREND_THRESHOLD {
        Trend::Increasing
    } else if change < -TREND_THRESHOLD {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Flag sustained growth across the last ten samples
///
/// True when at least 70% of the nine consecutive pairs increase.
pub fn detect_leak(series: &[u64]) -> bool {
    if series.len() < LEAK_WINDOW {
        return false;
    }

    let window = &series[series.len() - LEAK_WINDOW..];
    let pairs = LEAK_WINDOW - 1;
    let increases = window.windows(2).filter(|pair| pair[1] > pair[0]).count();
    increases as f64 / pairs as f64 >= LEAK_INCREASE_RATIO
}
