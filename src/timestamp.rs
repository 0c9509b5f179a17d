use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Calendar year of a ticket `created_at` value.
///
/// Two layouts are accepted: fractional seconds with a literal `Z` suffix, or
/// fractional seconds with a numeric UTC offset (`+0200` or `+02:00`). The year is
/// taken as written; offsets are not normalized to UTC.
pub fn parse_created_year(raw: &str) -> Option<i32> {
    if let Ok(dt) = PrimitiveDateTime::parse(
        raw,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]Z"),
    ) {
        return Some(dt.year());
    }

    OffsetDateTime::parse(
        raw,
        format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory][offset_minute]"
        ),
    )
    .or_else(|_| {
        OffsetDateTime::parse(
            raw,
            format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]"
            ),
        )
    })
    .ok()
    .map(|dt| dt.year())
}
