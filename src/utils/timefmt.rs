use std::time::Duration;

pub fn mmss(d: Duration) -> String {
    format_time(d.as_secs_f64())
}

/// `M:SS`, minutes unpadded. Negative or non-finite input renders as `0:00`.
pub fn format_time(seconds: f64) -> String {
    let secs = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let m = secs / 60;
    let s = secs % 60;
    format!("{}:{:02}", m, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(75.0), "1:15");
        assert_eq!(format_time(5.0), "0:05");
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(59.99), "0:59");
        assert_eq!(format_time(3600.0), "60:00");
    }

    #[test]
    fn bad_input_is_zero() {
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(-3.0), "0:00");
    }

    #[test]
    fn duration_wrapper() {
        assert_eq!(mmss(Duration::from_millis(125_900)), "2:05");
    }
}
