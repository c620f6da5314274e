use serde_json::Value;

/// Where a logical field may live inside a raw record: a key, or a path of keys into
/// nested objects, e.g., `&["meta", "companyName"]`.
pub type Candidate = &'static [&'static str];

/// Follow `path` through nested objects.
pub fn lookup<'a>(record: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(record, |value, key| value.get(key))
}

/// Priority-ordered coalesce: the first candidate for which `extract` succeeds.
pub fn first<T, F>(record: &Value, candidates: &[Candidate], extract: F) -> Option<T>
where
    F: Fn(&Value) -> Option<T>,
{
    candidates
        .iter()
        .find_map(|path| lookup(record, path).and_then(&extract))
}

/// Non-blank strings, trimmed.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Finite numbers, whether sent as JSON numbers or as strings led by a number, e.g.,
///
/// ```text
/// 12.5        -> 12.5
/// "12.5"      -> 12.5
/// "1,234.50"  -> 1234.5
/// "4.27%"     -> 4.27
/// "12.5 Cr"   -> 12.5
/// "-"         -> None
/// ```
pub fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(&s.trim().replace(',', "")),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// The longest prefix of `s` that parses as a number; units & suffixes are ignored.
fn leading_number(s: &str) -> Option<f64> {
    let end = s
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E')))
        .unwrap_or(s.len());
    let prefix = &s[..end];
    (1..=prefix.len())
        .rev()
        .find_map(|end| prefix[..end].parse::<f64>().ok())
}

/// Display text for fields sent either as strings or as numbers, e.g., a lot size of `44`
/// or `"44"`.
pub fn as_label(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        _ => as_text(value),
    }
}

/// First non-blank string among `candidates`.
pub fn first_text(record: &Value, candidates: &[Candidate]) -> Option<String> {
    first(record, candidates, as_text)
}

/// First parseable, finite number among `candidates`.
pub fn first_number(record: &Value, candidates: &[Candidate]) -> Option<f64> {
    first(record, candidates, as_number)
}

/// First non-zero number among `candidates`; zero counts as "not reported".
pub fn first_nonzero(record: &Value, candidates: &[Candidate]) -> Option<f64> {
    first(record, candidates, |value| as_number(value).filter(|n| *n != 0.0))
}

/// First string or number among `candidates`, as text.
pub fn first_label(record: &Value, candidates: &[Candidate]) -> Option<String> {
    first(record, candidates, as_label)
}
