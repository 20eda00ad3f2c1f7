// CSV/TSV import/export

use docalign_align::{Scalar, Table};

use crate::error::{ExportError, LoadError};
use crate::header::HeaderBuilder;
use crate::loader::LoadOptions;

/// Parse delimited text into a table. The first record is the header.
///
/// `delimiter` of `None` sniffs the delimiter from the content.
pub fn import_bytes(
    bytes: &[u8],
    delimiter: Option<u8>,
    source_name: &str,
    options: &LoadOptions,
) -> Result<Table, LoadError> {
    let content = decode_utf8(bytes, source_name);
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content));
    import_from_string(&content, delimiter, source_name, options)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: lines agreeing with line 1, weighted by its field count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Decode as UTF-8, falling back to Windows-1252 (common for Excel-exported CSVs).
fn decode_utf8(bytes: &[u8], source_name: &str) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            log::warn!("{source_name}: not valid UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

fn import_from_string(
    content: &str,
    delimiter: u8,
    source_name: &str,
    options: &LoadOptions,
) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let parse_err = |message: String| LoadError::Parse {
        source_name: source_name.to_string(),
        message,
    };

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record.map_err(|e| parse_err(e.to_string()))?,
        None => return Ok(Table::default()),
    };

    let mut headers = HeaderBuilder::new();
    for field in header.iter() {
        headers.push(field);
    }
    let columns = headers.finish();
    let width = columns.len();

    let mut rows = Vec::new();
    for result in records {
        let record = result.map_err(|e| parse_err(e.to_string()))?;
        if record.len() > width {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(parse_err(format!(
                "line {line}: expected {width} fields, saw {}",
                record.len()
            )));
        }
        let mut row: Vec<Scalar> = record.iter().map(|f| infer_scalar(f, options.infer_types)).collect();
        row.resize(width, Scalar::Null);
        rows.push(row);
    }

    Table::new(columns, rows).map_err(|e| parse_err(e.to_string()))
}

/// Type a raw field. Empty is always `Null`; with inference on, booleans and
/// plain decimal literals are recognized, everything else stays text.
pub fn infer_scalar(field: &str, infer_types: bool) -> Scalar {
    if field.is_empty() {
        return Scalar::Null;
    }
    if !infer_types {
        return Scalar::text(field);
    }
    if field.eq_ignore_ascii_case("true") {
        return Scalar::Bool(true);
    }
    if field.eq_ignore_ascii_case("false") {
        return Scalar::Bool(false);
    }
    match parse_number(field) {
        Some(n) => Scalar::Number(n),
        None => Scalar::text(field),
    }
}

/// Digits, sign, point and exponent only, so `inf`, `NaN` and padded values stay text.
fn parse_number(s: &str) -> Option<f64> {
    let plain = s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'));
    if !plain || !s.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Serialize a table as delimited text: header, then one record per row.
pub fn export_bytes(table: &Table, delimiter: u8) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer
        .write_record(table.columns())
        .map_err(|e| ExportError::Csv(e.to_string()))?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|v| v.to_string()))
            .map_err(|e| ExportError::Csv(e.to_string()))?;
    }

    writer.into_inner().map_err(|e| ExportError::Csv(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(content: &str) -> Table {
        import_bytes(content.as_bytes(), None, "test.csv", &LoadOptions::default()).unwrap()
    }

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Name;Age;City\nAlice;30;Paris\nBob;25;London\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "Name,Age,City\nAlice,30,Paris\nBob,25,London\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "Name\tAge\tCity\nAlice\t30\tParis\nBob\t25\tLondon\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        let content = "Name;Address;City\n\"Doe, Jane\";\"123 Main St, Apt 4\";Paris\nBob;\"456 Elm\";London\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_typed_import() {
        let t = load("id,name,active,score\n1,Alice,true,2.5\n002,Bob,FALSE,\n");
        assert_eq!(t.columns(), ["id", "name", "active", "score"]);
        assert_eq!(t.rows()[0], vec![Scalar::Number(1.0), "Alice".into(), Scalar::Bool(true), Scalar::Number(2.5)]);
        assert_eq!(t.rows()[1], vec![Scalar::Number(2.0), "Bob".into(), Scalar::Bool(false), Scalar::Null]);
    }

    #[test]
    fn test_raw_strings_import() {
        let opts = LoadOptions { infer_types: false };
        let t = import_bytes(b"id,n\n007,1.50\n", None, "raw.csv", &opts).unwrap();
        assert_eq!(t.rows()[0], vec![Scalar::text("007"), Scalar::text("1.50")]);
    }

    #[test]
    fn test_numbers_are_strict() {
        assert_eq!(infer_scalar("inf", true), Scalar::text("inf"));
        assert_eq!(infer_scalar(" 1", true), Scalar::text(" 1"));
        assert_eq!(infer_scalar("1,000", true), Scalar::text("1,000"));
        assert_eq!(infer_scalar("-", true), Scalar::text("-"));
        assert_eq!(infer_scalar("1e3", true), Scalar::Number(1000.0));
    }

    #[test]
    fn test_header_mangling_and_short_rows() {
        let t = load("id,id,,x\n1,2\n");
        assert_eq!(t.columns(), ["id", "id.1", "Unnamed: 2", "x"]);
        assert_eq!(t.rows()[0], vec![Scalar::Number(1.0), Scalar::Number(2.0), Scalar::Null, Scalar::Null]);
    }

    #[test]
    fn test_long_row_is_parse_error() {
        let err = import_bytes(b"a,b\n1,2,3\n", Some(b','), "long.csv", &LoadOptions::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("long.csv: parse error"), "{msg}");
        assert!(msg.contains("expected 2 fields, saw 3"), "{msg}");
    }

    #[test]
    fn test_empty_input_is_empty_table() {
        let t = load("");
        assert!(t.is_empty());
        assert!(t.columns().is_empty());
        let t = load("id,name\n");
        assert!(t.is_empty());
        assert_eq!(t.width(), 2);
    }

    #[test]
    fn test_delimiter_only_record_is_null_row() {
        let t = import_bytes(b"id,v\n,\n1,2\n", Some(b','), "blank.csv", &LoadOptions::default()).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.rows()[0], vec![Scalar::Null, Scalar::Null]);
        assert_eq!(t.rows()[1], vec![Scalar::Number(1.0), Scalar::Number(2.0)]);
    }

    #[test]
    fn test_windows_1252_fallback() {
        let bytes = b"id,name\n1,Caf\xE9\n";
        let t = import_bytes(bytes, None, "latin.csv", &LoadOptions::default()).unwrap();
        assert_eq!(t.rows()[0][1], Scalar::text("Café"));
    }

    #[test]
    fn test_bom_is_stripped() {
        let t = import_bytes(b"\xEF\xBB\xBFid\n1\n", None, "bom.csv", &LoadOptions::default()).unwrap();
        assert_eq!(t.columns(), ["id"]);
    }

    #[test]
    fn test_export_roundtrip_display() {
        let t = Table::new(
            vec!["id".into(), "note".into()],
            vec![vec![Scalar::Number(1.0), "a, b".into()], vec![Scalar::Bool(true), Scalar::Null]],
        )
        .unwrap();
        let bytes = export_bytes(&t, b',').unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "id,note\n1,\"a, b\"\nTRUE,\n");
    }
}
