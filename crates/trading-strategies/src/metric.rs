//! Indicator access shared by the strategies.

use trading_core::error::StrategyError;

/// Read an optional indicator, rejecting non-finite values.
///
/// `Ok(None)` means the indicator is absent, which makes its signal false.
pub(crate) fn finite(field: &'static str, value: Option<f64>) -> Result<Option<f64>, StrategyError> {
    match value {
        Some(value) if !value.is_finite() => {
            Err(StrategyError::MalformedIndicator { field, value })
        }
        other => Ok(other),
    }
}

/// Signal that fires when the indicator is present and below `threshold`.
pub(crate) fn below(
    field: &'static str,
    value: Option<f64>,
    threshold: f64,
) -> Result<bool, StrategyError> {
    Ok(finite(field, value)?.is_some_and(|value| value < threshold))
}

/// Signal that fires when the indicator is present and above `threshold`.
pub(crate) fn above(
    field: &'static str,
    value: Option<f64>,
    threshold: f64,
) -> Result<bool, StrategyError> {
    Ok(finite(field, value)?.is_some_and(|value| value > threshold))
}
