use crate::fix_interface::Fix;

/// Sum of great-circle hops between consecutive fixes, in meters.
pub fn path_length(fixes: &[Fix]) -> f64 {
    fixes
        .windows(2)
        .map(|pair| pair[0].distance_to(&pair[1]))
        .sum()
}

/// Cumulative distance over the whole track, `None` when it is empty.
pub fn total_distance(track: &[Fix]) -> Option<f64> {
    if track.is_empty() {
        return None;
    }
    Some(path_length(track))
}

/// Short natural-scale rendering: meters below one kilometer, kilometers above.
pub fn format_distance(distance_m: Option<f64>) -> String {
    let meters = distance_m.filter(|d| d.is_finite()).unwrap_or(0.0);
    if meters < 1000.0 {
        format!("{:.1} m", meters)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}
