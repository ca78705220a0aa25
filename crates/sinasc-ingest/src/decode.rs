//! Field decoding and per-chunk dtype inference.

use std::collections::BTreeMap;

use encoding_rs::WINDOWS_1252;
use polars::prelude::Column;
use sinasc_common::{CellValue, build_column, parse_f64, parse_i64};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode raw field bytes as UTF-8, falling back to Windows-1252.
///
/// Windows-1252 is a superset of Latin-1 for printable characters, so legacy
/// registry exports decode without replacement characters.
pub(crate) fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            text.into_owned()
        }
    }
}

/// Decode a field, treating empty and whitespace-only values as missing.
pub(crate) fn decode_value(bytes: &[u8]) -> Option<String> {
    let text = decode_field(bytes);
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Decode header names: strip a leading BOM, trim, and suffix repeated names
/// with `.1`, `.2`, ... so every column name is unique.
pub(crate) fn decode_headers<'a>(fields: impl Iterator<Item = &'a [u8]>) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut headers = Vec::new();
    for (idx, raw) in fields.enumerate() {
        let raw = if idx == 0 {
            raw.strip_prefix(UTF8_BOM).unwrap_or(raw)
        } else {
            raw
        };
        let base = decode_field(raw).trim().to_string();
        let count = seen.entry(base.clone()).or_insert(0);
        let name = if *count == 0 {
            base
        } else {
            format!("{base}.{count}")
        };
        *count += 1;
        headers.push(name);
    }
    headers
}

/// Build a typed column from decoded text values.
///
/// Int64 if every present value parses as an integer, Float64 if every
/// present value parses as a number, String otherwise.
pub(crate) fn infer_column(name: &str, values: Vec<Option<String>>) -> Column {
    let present = || values.iter().flatten();
    let cells: Vec<CellValue> = if present().all(|v| parse_i64(v).is_some()) {
        values
            .iter()
            .map(|v| v.as_deref().and_then(parse_i64).map_or(CellValue::Missing, CellValue::Int))
            .collect()
    } else if present().all(|v| parse_f64(v).is_some()) {
        values
            .iter()
            .map(|v| {
                v.as_deref()
                    .and_then(parse_f64)
                    .map_or(CellValue::Missing, CellValue::Float)
            })
            .collect()
    } else {
        values
            .into_iter()
            .map(|v| v.map_or(CellValue::Missing, CellValue::Text))
            .collect()
    };
    build_column(name, cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::DataType;

    #[test]
    fn test_decode_latin1_fallback() {
        assert_eq!(decode_field(b"S\xe3o Paulo"), "São Paulo");
        assert_eq!(decode_field("Goiás".as_bytes()), "Goiás");
    }

    #[test]
    fn test_blank_values_are_missing() {
        assert_eq!(decode_value(b""), None);
        assert_eq!(decode_value(b"  "), None);
        assert_eq!(decode_value(b"1"), Some("1".to_string()));
    }

    #[test]
    fn test_headers_strip_bom_and_dedupe() {
        let raw: Vec<&[u8]> = vec![b"\xEF\xBB\xBFCONTADOR", b" SEXO ", b"SEXO"];
        let headers = decode_headers(raw.into_iter());
        assert_eq!(headers, vec!["CONTADOR", "SEXO", "SEXO.1"]);
    }

    #[test]
    fn test_infer_column_dtypes() {
        let ints = infer_column("A", vec![Some("1".into()), None, Some(" 3".into())]);
        assert_eq!(ints.dtype(), &DataType::Int64);
        assert_eq!(ints.null_count(), 1);

        let floats = infer_column("B", vec![Some("1".into()), Some("2.5".into())]);
        assert_eq!(floats.dtype(), &DataType::Float64);

        let text = infer_column("C", vec![Some("1".into()), Some("x".into())]);
        assert_eq!(text.dtype(), &DataType::String);

        let empty = infer_column("D", vec![None, None]);
        assert_eq!(empty.dtype(), &DataType::Float64);
    }
}
