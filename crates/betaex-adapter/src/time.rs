/*
[INPUT]:  System wall clock
[OUTPUT]: Millisecond timestamps for nonces and query windows
[POS]:    Shared utilities - used by REST and stream layers
[UPDATE]: When changing clock source or timestamp resolution
*/

use chrono::Utc;

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn current_time_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_time_ms_is_after_2019() {
        // 2019-07-15T00:00:00Z
        assert!(current_time_ms() > 1_563_148_800_000);
    }
}
