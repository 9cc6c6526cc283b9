//! WASM bindings for the fit and zoom math.
//!
//! Lets a front end size zoom sliders before any upload finishes.

use gridpost_core::geometry::{self, FitPolicy, MAX_ZOOM};
use wasm_bindgen::prelude::*;

pub(crate) fn policy_from_str(name: &str) -> Option<FitPolicy> {
    match name {
        "cover" => Some(FitPolicy::Cover),
        "contain" => Some(FitPolicy::Contain),
        _ => None,
    }
}

/// Zoom at which a source exactly covers or fits a target.
///
/// # Arguments
///
/// * `policy` - `"cover"` or `"contain"`
///
/// # Errors
///
/// Returns an error for an unknown policy name.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const min = min_zoom_for(6000, 4000, 3240, 1920, "cover");
/// slider.min = String(min);
/// slider.max = String(Math.max(max_zoom(), min));
/// ```
#[wasm_bindgen]
pub fn min_zoom_for(
    source_width: u32,
    source_height: u32,
    target_width: u32,
    target_height: u32,
    policy: &str,
) -> Result<f64, JsValue> {
    let policy = policy_from_str(policy).ok_or_else(|| {
        JsValue::from_str(&format!("Unknown fit policy: {}", policy))
    })?;
    Ok(geometry::min_zoom_for(
        source_width,
        source_height,
        target_width,
        target_height,
        policy,
    ))
}

/// Fixed upper bound of the zoom range.
#[wasm_bindgen]
pub fn max_zoom() -> f64 {
    MAX_ZOOM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_str() {
        assert_eq!(policy_from_str("cover"), Some(FitPolicy::Cover));
        assert_eq!(policy_from_str("contain"), Some(FitPolicy::Contain));
        assert_eq!(policy_from_str("fill"), None);
    }

    #[test]
    fn test_max_zoom() {
        assert_eq!(max_zoom(), 3.0);
    }
}
