use time::OffsetDateTime;

/// Current UTC time truncated to milliseconds, the precision stored in the data files.
pub(crate) fn now_utc() -> OffsetDateTime {
    truncate_to_millis(OffsetDateTime::now_utc())
}

pub(crate) fn truncate_to_millis(value: OffsetDateTime) -> OffsetDateTime {
    let nanos = u32::from(value.millisecond()) * 1_000_000;
    value.replace_nanosecond(nanos).unwrap_or(value)
}

pub(crate) fn unix_millis(value: OffsetDateTime) -> i128 {
    value.unix_timestamp_nanos() / 1_000_000
}
