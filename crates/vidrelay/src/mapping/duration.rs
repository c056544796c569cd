/// Renders a duration in seconds as `H:MM:SS`. Hours are not wrapped at 24
/// and negative inputs clamp to zero.
pub fn format_duration(seconds: i64) -> String {
    let total = seconds.max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours}:{minutes:02}:{secs:02}")
}
