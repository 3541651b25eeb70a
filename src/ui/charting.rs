use steelcore::analytics::WeekBucket;

/// Compute the Y ceiling for the 4-week load chart
pub fn compute_chart_params(buckets: &[WeekBucket]) -> f64 {
    let mut highest_load = 0.0;
    for bucket in buckets {
        if bucket.load > highest_load {
            highest_load = bucket.load;
        }
    }

    if highest_load < 1.0 {
        highest_load = 1.0;
    }
    highest_load.ceil()
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

/// Marker column for the ratio zone bar: the ratio clamped to 0..2
/// mapped across `width` cells.
pub fn zone_marker_col(ratio: f64, width: u16) -> u16 {
    let clamped = ratio.clamp(0.0, 2.0);
    let col = (clamped / 2.0 * f64::from(width.saturating_sub(1))).round() as u16;
    col.min(width.saturating_sub(1))
}

/// Proportional bar length for the daily breakdown rows.
pub fn bar_len(load: f64, max_load: f64, width: u16) -> u16 {
    if max_load <= 0.0 || load <= 0.0 {
        return 0;
    }
    let len = (load / max_load * f64::from(width)).round() as u16;
    len.clamp(1, width)
}
