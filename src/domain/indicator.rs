//! Signal primitives over aligned `f64` series.
//!
//! Smoothing functions return a series of the same length with NaN over the
//! warmup prefix. Comparison and crossover functions return fire/no-fire
//! flags; any comparison involving NaN does not fire, so alignment gaps in
//! the input stay signal-silent.

/// Simple moving average. NaN for the first `period - 1` rows and wherever
/// the window contains a NaN input.
pub fn ma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if i + 1 < period {
            out.push(f64::NAN);
        } else {
            let window = &values[i + 1 - period..=i];
            out.push(window.iter().sum::<f64>() / period as f64);
        }
    }
    out
}

/// Exponential moving average. k = 2/(n+1), seeded with the first SMA,
/// then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; values.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = f64::NAN;
    let mut sum = 0.0;

    for (i, &value) in values.iter().enumerate() {
        if i < period - 1 {
            sum += value;
            out.push(f64::NAN);
        } else if i == period - 1 {
            sum += value;
            prev = sum / period as f64;
            out.push(prev);
        } else {
            prev = value * k + prev * (1.0 - k);
            out.push(prev);
        }
    }
    out
}

/// Relative Strength Index with Wilder smoothing. First `period` rows are
/// NaN (a period's worth of price changes is needed for the seed average);
/// RSI = 100 when the average loss is zero.
pub fn rsi(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < 2 {
        return vec![f64::NAN; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    out.push(f64::NAN);

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 1..values.len() {
        let change = values[i] - values[i - 1];
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        if i < period {
            // accumulating the seed window
            avg_gain += gain;
            avg_loss += loss;
            out.push(f64::NAN);
        } else if i == period {
            avg_gain = (avg_gain + gain) / period as f64;
            avg_loss = (avg_loss + loss) / period as f64;
            out.push(rsi_value(avg_gain, avg_loss));
        } else {
            avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
            out.push(rsi_value(avg_gain, avg_loss));
        }
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

/// Fires where `left` crosses above `right`: left > right now and
/// left <= right on the previous row. Never fires on row 0.
pub fn cross_up(left: &[f64], right: &[f64]) -> Vec<bool> {
    let len = left.len().min(right.len());
    let mut out = vec![false; len];
    for i in 1..len {
        out[i] = left[i] > right[i] && left[i - 1] <= right[i - 1];
    }
    out
}

/// Fires where `left` crosses below `right`: mirror of [`cross_up`].
pub fn cross_down(left: &[f64], right: &[f64]) -> Vec<bool> {
    let len = left.len().min(right.len());
    let mut out = vec![false; len];
    for i in 1..len {
        out[i] = left[i] < right[i] && left[i - 1] >= right[i - 1];
    }
    out
}

/// Pointwise left > right.
pub fn gt(left: &[f64], right: &[f64]) -> Vec<bool> {
    left.iter()
        .zip(right)
        .map(|(&l, &r)| l > r)
        .collect()
}

/// Pointwise left < right.
pub fn lt(left: &[f64], right: &[f64]) -> Vec<bool> {
    left.iter()
        .zip(right)
        .map(|(&l, &r)| l < r)
        .collect()
}
