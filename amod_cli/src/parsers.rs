use jiff::{SignedDuration, Span, SpanRelativeTo};

/// Accepts ISO 8601 or friendly durations ("PT1H30M", "2h 15m") and plain seconds.
pub fn parse_duration(input: &str) -> Result<SignedDuration, String> {
    let duration = if let Ok(seconds) = input.parse::<i64>() {
        SignedDuration::from_secs(seconds)
    } else if let Ok(duration) = input.parse::<SignedDuration>() {
        duration
    } else {
        input
            .parse::<Span>()
            .and_then(|span| span.to_duration(SpanRelativeTo::days_are_24_hours()))
            .map_err(|_| format!("Invalid duration {input}"))?
    };

    if duration.is_negative() {
        return Err(format!("Duration {input} must not be negative"));
    }
    Ok(duration)
}
