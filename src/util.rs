/// Format whole seconds as a MM:SS clock string.
pub fn format_mmss(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Round elapsed seconds to whole minutes for the session log, never
/// suggesting less than one minute.
pub fn minutes_from_secs(secs: u32) -> u32 {
    let mins = (f64::from(secs) / 60.0).round() as u32;
    mins.max(1)
}
