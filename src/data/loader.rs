use std::path::Path;

use anyhow::{bail, Context, Result};
use ndarray::{Array1, Array2};
use serde::Deserialize;

use super::model::ResponseTable;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a (bands, 3) color matching function or camera response.  Dispatch by
/// extension.
///
/// Supported formats:
/// * `.csv`  – header row, optional `wavelength` column, three value columns
/// * `.json` – `{ "wavelengths": [...], "values": [[x, y, z], ...] }`
pub fn load_response_table(path: &Path) -> Result<ResponseTable> {
    match extension(path).as_str() {
        "csv" => load_response_csv(path),
        "json" => load_response_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Load an illuminant spectrum (one value per band).
///
/// Supported formats:
/// * `.csv`  – header row, optional `wavelength` column, one value column
/// * `.json` – `[v0, v1, ...]` or `{ "wavelengths": [...], "values": [...] }`
pub fn load_white_point(path: &Path) -> Result<Array1<f64>> {
    match extension(path).as_str() {
        "csv" => load_white_point_csv(path),
        "json" => load_white_point_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// CSV loaders
// ---------------------------------------------------------------------------

/// A parsed numeric CSV: the optional wavelength column split from the rest.
struct NumericCsv {
    wavelengths: Option<Vec<f64>>,
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

fn is_wavelength_header(h: &str) -> bool {
    matches!(
        h.trim().to_ascii_lowercase().as_str(),
        "wavelength" | "wavelengths" | "lambda" | "nm"
    )
}

fn read_numeric_csv(path: &Path) -> Result<NumericCsv> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let wl_idx = headers.iter().position(|h| is_wavelength_header(h));
    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != wl_idx)
        .map(|(_, h)| h.clone())
        .collect();

    let mut wavelengths = wl_idx.map(|_| Vec::new());
    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let mut values = Vec::with_capacity(columns.len());
        for (col_idx, field) in record.iter().enumerate() {
            let value: f64 = field.trim().parse().with_context(|| {
                format!("Row {row_no}, {}: '{field}' is not a number", headers[col_idx])
            })?;
            if Some(col_idx) == wl_idx {
                if let Some(wl) = wavelengths.as_mut() {
                    wl.push(value);
                }
            } else {
                values.push(value);
            }
        }
        if values.len() != columns.len() {
            bail!(
                "CSV row {row_no}: expected {} values but found {}",
                columns.len(),
                values.len()
            );
        }
        rows.push(values);
    }

    Ok(NumericCsv {
        wavelengths,
        columns,
        rows,
    })
}

fn load_response_csv(path: &Path) -> Result<ResponseTable> {
    let parsed = read_numeric_csv(path)?;
    if parsed.columns.len() != 3 {
        bail!(
            "Response table needs exactly 3 value columns, found {:?}",
            parsed.columns
        );
    }
    let bands = parsed.rows.len();
    let flat: Vec<f64> = parsed.rows.into_iter().flatten().collect();
    let values = Array2::from_shape_vec((bands, 3), flat).context("building response matrix")?;
    Ok(ResponseTable {
        wavelengths: parsed.wavelengths.map(Array1::from),
        values,
    })
}

fn load_white_point_csv(path: &Path) -> Result<Array1<f64>> {
    let parsed = read_numeric_csv(path)?;
    if parsed.columns.len() != 1 {
        bail!(
            "White point needs exactly 1 value column, found {:?}",
            parsed.columns
        );
    }
    Ok(parsed.rows.into_iter().flatten().collect())
}

// ---------------------------------------------------------------------------
// JSON loaders
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ResponseTableJson {
    #[serde(default)]
    wavelengths: Option<Vec<f64>>,
    values: Vec<[f64; 3]>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WhitePointJson {
    Plain(Vec<f64>),
    Tabulated {
        #[serde(default)]
        wavelengths: Option<Vec<f64>>,
        values: Vec<f64>,
    },
}

fn load_response_json(path: &Path) -> Result<ResponseTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let parsed: ResponseTableJson = serde_json::from_str(&text).context("parsing JSON")?;

    let bands = parsed.values.len();
    if let Some(wl) = &parsed.wavelengths {
        if wl.len() != bands {
            bail!("{} wavelengths but {bands} response rows", wl.len());
        }
    }
    let flat: Vec<f64> = parsed.values.into_iter().flatten().collect();
    let values = Array2::from_shape_vec((bands, 3), flat).context("building response matrix")?;
    Ok(ResponseTable {
        wavelengths: parsed.wavelengths.map(Array1::from),
        values,
    })
}

fn load_white_point_json(path: &Path) -> Result<Array1<f64>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let parsed: WhitePointJson = serde_json::from_str(&text).context("parsing JSON")?;
    match parsed {
        WhitePointJson::Plain(values) => Ok(Array1::from(values)),
        WhitePointJson::Tabulated {
            wavelengths,
            values,
        } => {
            if let Some(wl) = wavelengths {
                if wl.len() != values.len() {
                    bail!("{} wavelengths but {} values", wl.len(), values.len());
                }
            }
            Ok(Array1::from(values))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("spectral-metrics-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn reads_cmf_csv_with_wavelengths() {
        let path = scratch_file(
            "cmf.csv",
            "wavelength,x,y,z\n400,0.01,0.0004,0.07\n410,0.04,0.0012,0.2\n",
        );
        let table = load_response_table(&path).unwrap();
        assert_eq!(table.bands(), 2);
        assert_eq!(table.values[[1, 2]], 0.2);
        assert_eq!(table.wavelengths.unwrap().to_vec(), vec![400.0, 410.0]);
    }

    #[test]
    fn reads_crf_csv_without_wavelengths() {
        let path = scratch_file("crf.csv", "r,g,b\n0.1,0.2,0.3\n0.4,0.5,0.6\n0.7,0.8,0.9\n");
        let table = load_response_table(&path).unwrap();
        assert_eq!(table.values.dim(), (3, 3));
        assert!(table.wavelengths.is_none());
    }

    #[test]
    fn rejects_wrong_column_count() {
        let path = scratch_file("bad.csv", "wavelength,x,y\n400,0.1,0.2\n");
        assert!(load_response_table(&path).is_err());
    }

    #[test]
    fn reads_json_response() {
        let path = scratch_file(
            "cmf.json",
            r#"{ "wavelengths": [400, 410], "values": [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]] }"#,
        );
        let table = load_response_table(&path).unwrap();
        assert_eq!(table.values[[0, 1]], 0.2);
    }

    #[test]
    fn reads_white_points() {
        let csv = scratch_file("d65.csv", "wavelength,power\n400,82.75\n410,91.49\n");
        assert_eq!(load_white_point(&csv).unwrap().to_vec(), vec![82.75, 91.49]);

        let json = scratch_file("flat.json", "[1.0, 1.0, 1.0]");
        assert_eq!(load_white_point(&json).unwrap().len(), 3);
    }

    #[test]
    fn rejects_unknown_extension() {
        let path = scratch_file("cmf.txt", "");
        assert!(load_response_table(&path).is_err());
    }
}
