use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::LoadError;

use super::model::{CellValue, Column, DType, Table};

/// Tokens read as a missing value, in addition to an empty cell.
const MISSING_MARKERS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a CSV file into a [`Table`].
///
/// The first record is the header. Column types are inferred from the
/// non-missing cells of each column (see [`infer_column`]).
pub fn load_file(path: &Path) -> Result<Table, LoadError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    if file.metadata().map(|m| m.is_dir()).unwrap_or(false) {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let table = read_csv(file).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.n_rows(),
        table.n_cols(),
        path.display()
    );
    Ok(table)
}

/// Parse CSV from any reader. A reader with no bytes yields an empty table.
pub fn read_csv<R: Read>(reader: R) -> Result<Table, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = dedupe_headers(reader.headers()?.iter());
    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for result in reader.records() {
        let record = result?;
        for (col, field) in raw.iter_mut().zip(record.iter()) {
            col.push(field.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| infer_column(name, &cells))
        .collect();

    // Column lengths are equal by construction: the reader rejects ragged rows.
    Ok(Table::new(columns).unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Header handling
// ---------------------------------------------------------------------------

/// Blank headers become `Unnamed: <i>`; repeated names get a `.1`, `.2`, …
/// suffix so every column can be addressed by name.
fn dedupe_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    raw.enumerate()
        .map(|(i, h)| {
            let base = if h.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                h.to_string()
            };
            let mut name = base.clone();
            let mut n = 1;
            while seen.contains(&name) {
                name = format!("{base}.{n}");
                n += 1;
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Type inference
// ---------------------------------------------------------------------------

/// Surrounding whitespace is ignored. Any spelling `f64` reads as NaN
/// (`NAN`, `nAn`, …) also counts as missing.
fn is_missing(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || MISSING_MARKERS.contains(&s) || s.parse::<f64>().is_ok_and(f64::is_nan)
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Pick one dtype for the whole column and convert every cell to it.
///
/// * all integers → `int64`, or `float64` when some cells are missing
/// * all numbers → `float64`
/// * all `true`/`false` → `bool`
/// * no values at all → `float64` (or `object` for a zero-row column)
/// * anything else → `object`
fn infer_column(name: String, cells: &[String]) -> Column {
    let present: Vec<&str> = cells
        .iter()
        .filter(|s| !is_missing(s))
        .map(|s| s.trim())
        .collect();
    let has_missing = present.len() < cells.len();

    let dtype = if cells.is_empty() {
        DType::Object
    } else if present.is_empty() {
        DType::Float64
    } else if present.iter().all(|s| s.parse::<i64>().is_ok()) {
        if has_missing {
            DType::Float64
        } else {
            DType::Int64
        }
    } else if present.iter().all(|s| s.parse::<f64>().is_ok()) {
        DType::Float64
    } else if present.iter().all(|s| parse_bool(s).is_some()) {
        DType::Bool
    } else {
        DType::Object
    };

    let values = cells
        .iter()
        .map(|s| convert_cell(s, dtype))
        .collect();

    Column {
        name,
        dtype,
        values,
    }
}

fn convert_cell(s: &str, dtype: DType) -> CellValue {
    if is_missing(s) {
        return CellValue::Missing;
    }
    let trimmed = s.trim();
    match dtype {
        DType::Int64 => trimmed
            .parse::<i64>()
            .map(CellValue::Integer)
            .unwrap_or(CellValue::Missing),
        DType::Float64 => trimmed
            .parse::<f64>()
            .map(CellValue::Float)
            .unwrap_or(CellValue::Missing),
        DType::Bool => parse_bool(trimmed).map_or(CellValue::Missing, CellValue::Bool),
        DType::Object => CellValue::Text(s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn parse(text: &str) -> Table {
        read_csv(text.as_bytes()).unwrap()
    }

    fn dtypes(table: &Table) -> Vec<DType> {
        table.columns.iter().map(|c| c.dtype).collect()
    }

    #[test]
    fn test_infers_pandas_like_dtypes() {
        let table = parse("id,score,flag,name\n1,2.5,true,ann\n2,3,False,bob\n");
        assert_eq!(
            dtypes(&table),
            vec![DType::Int64, DType::Float64, DType::Bool, DType::Object]
        );
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.n_cols(), 4);
    }

    #[test]
    fn test_integer_column_with_missing_becomes_float() {
        let table = parse("a,b\n1,x\n,y\nNA,z\n");
        let a = table.column("a").unwrap();
        assert_eq!(a.dtype, DType::Float64);
        assert_eq!(a.missing_count(), 2);
        assert_eq!(a.numeric_values(), vec![1.0]);
    }

    #[test]
    fn test_all_missing_column_is_numeric() {
        let table = parse("a,b\n,1\nNaN,2\n");
        let a = table.column("a").unwrap();
        assert_eq!(a.dtype, DType::Float64);
        assert_eq!(a.missing_count(), 2);
    }

    #[test]
    fn test_mixed_column_is_object() {
        let table = parse("a\n1\nhello\n");
        assert_eq!(dtypes(&table), vec![DType::Object]);
        assert_eq!(table.columns[0].values[0], CellValue::Text("1".into()));
    }

    #[test]
    fn test_nan_spellings_are_missing() {
        let table = parse("x\n1\nNAN\n3\n");
        let x = table.column("x").unwrap();
        assert_eq!(x.dtype, DType::Float64);
        assert_eq!(x.missing_count(), 1);
        assert_eq!(x.numeric_values(), vec![1.0, 3.0]);

        let summary = crate::data::summary::NumericSummary::describe(&table);
        let stats = &summary.columns[0];
        assert_eq!(stats.count, 2);
        assert_eq!((stats.mean, stats.max), (Some(2.0), Some(3.0)));
    }

    #[test]
    fn test_infinity_is_a_number() {
        let table = parse("x\n1\ninf\n");
        assert_eq!(table.column("x").unwrap().missing_count(), 0);
    }

    #[test]
    fn test_whitespace_kept_in_text_and_headers() {
        let table = parse("name, score \n ann ,  4 \n NA ,\n");
        assert_eq!(table.columns[1].name, " score ");
        let name = table.column("name").unwrap();
        assert_eq!(name.dtype, DType::Object);
        assert_eq!(name.values[0], CellValue::Text(" ann ".into()));
        assert_eq!(name.values[1], CellValue::Missing);
        let score = table.column(" score ").unwrap();
        assert_eq!(score.dtype, DType::Float64);
        assert_eq!(score.numeric_values(), vec![4.0]);
    }

    #[test]
    fn test_empty_input_is_empty_table() {
        let table = parse("");
        assert_eq!(table.n_rows(), 0);
        assert_eq!(table.n_cols(), 0);
    }

    #[test]
    fn test_header_only_input() {
        let table = parse("a,b\n");
        assert_eq!(table.n_rows(), 0);
        assert_eq!(table.n_cols(), 2);
        assert_eq!(table.numeric_columns().count(), 0);
    }

    #[test]
    fn test_duplicate_and_blank_headers() {
        let table = parse("a,a,\n1,2,3\n");
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "a.1", "Unnamed: 2"]);
    }

    #[test]
    fn test_ragged_rows_are_a_parse_error() {
        assert!(read_csv("a,b\n1,2\n3\n".as_bytes()).is_err());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn test_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"a,b\n\xff\xfe,1\n").unwrap();
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }
}
