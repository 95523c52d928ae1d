//! Literal decoding.
//!
//! [`decode`] classifies a literal the way the device does, trying each form
//! in a fixed order and falling back to plain text. Nothing is rejected.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::duration::Duration;
use crate::escape::unescape_text;
use crate::value::{Entry, Value};

/// The device's expression for an explicitly empty array.
pub const EMPTY_LIST_LITERAL: &str = "({})";

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)^
        (?P<sign>-)?
        (?:(?P<w>\d+)w)?
        (?:(?P<d>\d+)d)?
        (?:(?P<h>\d+)(?::|h))?
        (?:
            (?P<cm>\d+):(?P<cs>\d*(?:\.\d{1,9})?)
        |
            (?:(?P<m>\d+)m)?
            (?:(?P<s>\d+|\d*\.\d{1,9})s)?
            (?:(?P<ms>\d+|\d*\.\d{1,9})ms)?
            (?:(?P<us>\d+|\d*\.\d{1,9})us)?
            (?:(?P<ns>\d+|\d*\.\d{1,9})ns)?
        )
        $",
    )
    .expect("duration pattern is valid")
});

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?xi)^
        (?P<mon>jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)
        /(?P<day>\d\d?)
        /(?P<year>\d{4})
        (?:\s+(?P<hh>\d{2}):(?P<mm>\d{2}):(?P<ss>\d{2})(?:\.(?P<frac>\d{1,9}))?)?
        $",
    )
    .expect("date pattern is valid")
});

const NANOS_PER_SEC: u64 = 1_000_000_000;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Decode a scripting literal.
///
/// Forms are tried in this order, the first whole-input match winning:
/// nil, bool, number, time, date, quoted string, array, bareword.
pub fn decode(input: &str) -> Value {
    match input {
        "" | "nil" => return Value::Null,
        "true" | "yes" => return Value::Bool(true),
        "false" | "no" => return Value::Bool(false),
        EMPTY_LIST_LITERAL => return Value::List(Vec::new()),
        _ => {}
    }

    if let Some(number) = decode_number(input) {
        return number;
    }
    if let Some(duration) = decode_duration(input) {
        return Value::Duration(duration);
    }
    if let Some(date) = decode_date(input) {
        return date;
    }
    if input.len() >= 2 && input.starts_with('"') && input.ends_with('"') {
        return Value::Text(unescape_text(&input[1..input.len() - 1]));
    }
    if input.len() >= 2 && input.starts_with('{') && input.ends_with('}') {
        return decode_list(&input[1..input.len() - 1]);
    }

    Value::Text(input.as_bytes().to_vec())
}

/// A number is only recognized when formatting it back reproduces the input
/// exactly, so `007` or `+1` stay text.
fn decode_number(input: &str) -> Option<Value> {
    if let Ok(n) = input.parse::<i64>() {
        if n.to_string() == input {
            return Some(Value::Integer(n));
        }
    }
    let f = input.parse::<f64>().ok().filter(|f| f.is_finite())?;
    if format!("{}", f) == input || format!("{:?}", f) == input {
        return Some(Value::Real(f));
    }
    None
}

fn decode_duration(input: &str) -> Option<Duration> {
    let caps = DURATION_RE.captures(input)?;
    // Everything in the pattern is optional; a bare sign is not a time.
    let has_component = ["w", "d", "h", "cm", "m", "s", "ms", "us", "ns"]
        .iter()
        .any(|name| caps.name(name).is_some());
    if !has_component {
        return None;
    }

    // A component too large for its type makes the whole input text.
    let int = |name: &str| -> Option<u64> {
        caps.name(name).map_or(Some(0), |m| m.as_str().parse().ok())
    };

    let (minutes, seconds_text) = if caps.name("cm").is_some() {
        (int("cm")?, caps.name("cs").map(|m| m.as_str()))
    } else {
        (int("m")?, caps.name("s").map(|m| m.as_str()))
    };

    let mut seconds = 0u64;
    let mut nanos = 0u64;
    let parts = [
        (seconds_text, 0),
        (caps.name("ms").map(|m| m.as_str()), 3),
        (caps.name("us").map(|m| m.as_str()), 6),
        (caps.name("ns").map(|m| m.as_str()), 9),
    ];
    for (text, exponent) in parts {
        let Some(text) = text else { continue };
        let (whole, fraction) = split_seconds(text, exponent)?;
        seconds = seconds.checked_add(whole)?;
        nanos += fraction;
    }
    seconds = seconds.checked_add(nanos / NANOS_PER_SEC)?;

    let days = int("w")?.checked_mul(7)?.checked_add(int("d")?)?;
    let duration = Duration::new(days, int("h")?, minutes, seconds).with_nanos(nanos % NANOS_PER_SEC);
    Some(if caps.name("sign").is_some() {
        duration.negated()
    } else {
        duration
    })
}

/// Split a decimal `int[.frac]` counted in units of `10^-exponent` seconds
/// into whole seconds and nanoseconds, truncating below a nanosecond.
///
/// `None` when the integer part does not fit in a `u64`.
fn split_seconds(text: &str, exponent: u32) -> Option<(u64, u64)> {
    let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let per_second = 10u64.pow(exponent);
    let nanos_per_unit = 10u64.pow(9 - exponent);
    Some((
        whole / per_second,
        whole % per_second * nanos_per_unit + fraction_nanos(frac, nanos_per_unit),
    ))
}

/// The value of fractional digits `frac` of a unit lasting `unit`
/// nanoseconds, truncated to whole nanoseconds.
fn fraction_nanos(frac: &str, unit: u64) -> u64 {
    let mut value = 0;
    let mut place = unit;
    for digit in frac.bytes() {
        place /= 10;
        if place == 0 {
            break;
        }
        value += u64::from(digit - b'0') * place;
    }
    value
}

/// Returns `None` when the input is not date-shaped, and the input as text
/// when it is date-shaped but names no real calendar instant.
fn decode_date(input: &str) -> Option<Value> {
    let caps = DATE_RE.captures(input)?;
    let fallback = || Value::Text(input.as_bytes().to_vec());

    let mon = caps["mon"].to_ascii_lowercase();
    let month = MONTHS.iter().position(|m| *m == mon)? as u32 + 1;
    let day: u32 = caps["day"].parse().ok()?;
    let year: i32 = caps["year"].parse().ok()?;
    let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
        return Some(fallback());
    };

    let time = match caps.name("hh") {
        None => NaiveTime::MIN,
        Some(hh) => {
            let nanos = caps
                .name("frac")
                .map_or(0, |m| fraction_nanos(m.as_str(), NANOS_PER_SEC) as u32);
            match NaiveTime::from_hms_nano_opt(
                hh.as_str().parse().ok()?,
                caps["mm"].parse().ok()?,
                caps["ss"].parse().ok()?,
                nanos,
            ) {
                Some(time) => time,
                None => return Some(fallback()),
            }
        }
    };

    Some(Value::Timestamp(Utc.from_utc_datetime(&date.and_time(time))))
}

fn decode_list(body: &str) -> Value {
    if body.is_empty() {
        return Value::List(Vec::new());
    }
    let entries = split_top_level(body, b';')
        .into_iter()
        .map(|item| match split_top_level_once(item, b'=') {
            Some((key, value)) => Entry::keyed(decode(key), decode(value)),
            None => Entry::positional(decode(item)),
        })
        .collect();
    Value::List(entries)
}

/// Byte offsets of `delim` outside quoted strings and nested braces.
///
/// A single forward pass tracking quote state and brace depth; inside quotes
/// a backslash protects the following byte.
fn top_level_offsets(text: &str, delim: u8) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut escaped = false;

    for (i, &byte) in text.as_bytes().iter().enumerate() {
        if in_quote {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_quote = false;
            }
            continue;
        }
        match byte {
            b'"' => in_quote = true,
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            _ if byte == delim && depth == 0 => offsets.push(i),
            _ => {}
        }
    }
    offsets
}

fn split_top_level(text: &str, delim: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for offset in top_level_offsets(text, delim) {
        parts.push(&text[start..offset]);
        start = offset + 1;
    }
    parts.push(&text[start..]);
    parts
}

fn split_top_level_once(text: &str, delim: u8) -> Option<(&str, &str)> {
    let offset = *top_level_offsets(text, delim).first()?;
    Some((&text[..offset], &text[offset + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_decode_nil_and_bool() {
        assert_eq!(decode(""), Value::Null);
        assert_eq!(decode("nil"), Value::Null);
        assert_eq!(decode("yes"), Value::Bool(true));
        assert_eq!(decode("true"), Value::Bool(true));
        assert_eq!(decode("no"), Value::Bool(false));
        assert_eq!(decode("false"), Value::Bool(false));
        assert_eq!(decode("True"), Value::text("True"));
    }

    #[test]
    fn test_decode_numbers() {
        assert_eq!(decode("42"), Value::Integer(42));
        assert_eq!(decode("-7"), Value::Integer(-7));
        assert_eq!(decode("1.5"), Value::Real(1.5));
        assert_eq!(decode("2.0"), Value::Real(2.0));
        assert_eq!(decode("007"), Value::text("007"));
        assert_eq!(decode("+1"), Value::text("+1"));
        assert_eq!(decode("1e5"), Value::text("1e5"));
        assert_eq!(decode("inf"), Value::text("inf"));
    }

    #[test]
    fn test_decode_wide_integer_falls_back_to_real() {
        assert_eq!(
            decode("9223372036854775808"),
            Value::Real(9_223_372_036_854_775_808.0)
        );
    }

    #[test]
    fn test_decode_duration_forms() {
        assert_eq!(
            decode("4s500ms"),
            Value::Duration(Duration::from_secs(4).with_nanos(500_000_000))
        );
        assert_eq!(decode("1:30"), Value::Duration(Duration::new(0, 0, 1, 30)));
        assert_eq!(decode("1w2d3:04:05"), Value::Duration(Duration::new(9, 3, 4, 5)));
        assert_eq!(decode("5h"), Value::Duration(Duration::new(0, 5, 0, 0)));
        assert_eq!(decode("2m"), Value::Duration(Duration::new(0, 0, 2, 0)));
        assert_eq!(
            decode("5ms"),
            Value::Duration(Duration::default().with_nanos(5_000_000))
        );
        assert_eq!(
            decode("1h2m3.25s"),
            Value::Duration(Duration::new(0, 1, 2, 3).with_nanos(250_000_000))
        );
        assert_eq!(
            decode("00:00:01.000000001"),
            Value::Duration(Duration::from_secs(1).with_nanos(1))
        );
    }

    #[test]
    fn test_decode_duration_accumulates_sub_seconds() {
        assert_eq!(
            decode("1s1500ms2us3ns"),
            Value::Duration(Duration::from_secs(2).with_nanos(500_002_003))
        );
    }

    #[test]
    fn test_decode_oversized_duration_is_text() {
        for input in [
            "3000000000000000000w",
            "99999999999999999999d",
            "99999999999999999999h",
            "99999999999999999999:00",
            "18446744073709551615s1000ms",
        ] {
            assert_eq!(decode(input), Value::text(input), "{}", input);
        }
    }

    #[test]
    fn test_decode_large_fractional_seconds() {
        assert_eq!(
            decode("99999999999.5s"),
            Value::Duration(Duration::from_secs(99_999_999_999).with_nanos(500_000_000))
        );
        assert_eq!(
            decode("18446744073709551615ms"),
            Value::Duration(Duration::from_secs(18_446_744_073_709_551).with_nanos(615_000_000))
        );
        assert_eq!(
            decode("1.5ns"),
            Value::Duration(Duration::default().with_nanos(1))
        );
    }

    #[test]
    fn test_decode_negative_duration() {
        let d = Duration::new(1, 2, 3, 4).negated();
        assert_eq!(decode("-1d02:03:04"), Value::Duration(d));
    }

    #[test]
    fn test_decode_not_a_duration() {
        assert_eq!(decode("-"), Value::text("-"));
        assert_eq!(decode("ms"), Value::text("ms"));
        assert_eq!(decode("5x"), Value::text("5x"));
    }

    #[test]
    fn test_decode_date() {
        let value = decode("Feb/29/2024");
        let ts = value.as_timestamp().expect("timestamp");
        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 2, 29));
        assert_eq!(ts.time(), NaiveTime::MIN);

        let value = decode("JAN/02/2024 13:14:15");
        assert_eq!(
            value,
            Value::Timestamp(Utc.with_ymd_and_hms(2024, 1, 2, 13, 14, 15).unwrap())
        );

        let value = decode("jan/02/2024 13:14:15.000000007");
        let ts = value.as_timestamp().expect("timestamp");
        assert_eq!(ts.timestamp_subsec_nanos(), 7);
    }

    #[test]
    fn test_decode_invalid_date_is_text() {
        assert_eq!(decode("Feb/30/2020"), Value::text("Feb/30/2020"));
        assert_eq!(decode("jan/01/2020 25:00:00"), Value::text("jan/01/2020 25:00:00"));
    }

    #[test]
    fn test_decode_quoted() {
        assert_eq!(decode(r#""a \"b\"""#), Value::text("a \"b\""));
        assert_eq!(decode("\"\""), Value::text(""));
        assert_eq!(decode("\"line\\\nbreak\""), Value::text("linebreak"));
        // A lone quote is not a quoted string.
        assert_eq!(decode("\""), Value::text("\""));
    }

    #[test]
    fn test_decode_list() {
        assert_eq!(decode("{}"), Value::List(vec![]));
        assert_eq!(decode("({})"), Value::List(vec![]));
        assert_eq!(decode("{1;2}"), Value::list([1, 2]));
        assert_eq!(
            decode("{a=1;b=yes}"),
            Value::map([("a", Value::Integer(1)), ("b", Value::Bool(true))])
        );
    }

    #[test]
    fn test_decode_nested_list_with_delimiters_in_strings() {
        let value = decode(r#"{"x;y"={1;"}"};z={a={b=2}};"q\"=;"}"#);
        let expected = Value::List(vec![
            Entry::keyed("x;y", Value::list([Value::Integer(1), Value::text("}")])),
            Entry::keyed("z", Value::map([("a", Value::map([("b", 2)]))])),
            Entry::positional("q\"=;"),
        ]);
        assert_eq!(value, expected);
    }

    #[test]
    fn test_decode_list_empty_members() {
        assert_eq!(decode("{;}"), Value::list([Value::Null, Value::Null]));
        assert_eq!(
            decode("{=1}"),
            Value::List(vec![Entry::keyed(Value::Null, 1)])
        );
        assert_eq!(decode("{nil}"), Value::list([Value::Null]));
    }

    #[test]
    fn test_decode_bareword() {
        assert_eq!(decode("ether1"), Value::text("ether1"));
        assert_eq!(decode("{unclosed"), Value::text("{unclosed"));
    }
}
