// Rendering and writing of the results.

use party_line::table::{Cell, Table};
use text_diff::print_diff;

use crate::chamber::*;

fn cell_to_json(cell: &Cell) -> JSValue {
    match cell {
        Cell::Int(x) => json!(x),
        Cell::Text(s) => json!(s),
        Cell::Empty => JSValue::Null,
    }
}

fn cell_to_string(cell: &Cell) -> String {
    match cell {
        Cell::Int(x) => x.to_string(),
        Cell::Text(s) => s.clone(),
        Cell::Empty => String::new(),
    }
}

/// One JSON object per row, with the fields in the order of the columns.
pub fn table_to_json(table: &Table) -> Vec<JSValue> {
    table
        .rows
        .iter()
        .map(|row| {
            let obj: JSMap<String, JSValue> = table
                .columns
                .iter()
                .zip(row.iter())
                .map(|(c, cell)| (c.clone(), cell_to_json(cell)))
                .collect();
            JSValue::Object(obj)
        })
        .collect()
}

/// A header line with the column names, then one line per row.
pub fn table_to_csv(table: &Table) -> CliResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(&table.columns).context(CsvWriteSnafu)?;
    for row in table.rows.iter() {
        wtr.write_record(row.iter().map(cell_to_string))
            .context(CsvWriteSnafu)?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| e.into_error())
        .context(WritingOutputSnafu { path: "<csv>" })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn is_stdout(path: Option<&str>) -> bool {
    matches!(path, None | Some("") | Some("stdout"))
}

pub fn emit(path: Option<&str>, contents: &str) -> CliResult<()> {
    match path {
        Some(p) if !is_stdout(path) => {
            info!("emit: writing {} bytes to {}", contents.len(), p);
            fs::write(p, contents).context(WritingOutputSnafu { path: p })?;
        }
        _ => {
            println!("{}", contents);
        }
    }
    Ok(())
}

/// Compares the output with a reference file, and fails if they differ.
///
/// JSON references are normalized before the comparison so that only the
/// content matters, not the indentation.
pub fn check_reference(reference_path: &str, computed: &str, format: OutputFormat) -> CliResult<()> {
    let contents = fs::read_to_string(reference_path).context(OpeningJsonSnafu {
        path: reference_path,
    })?;
    let reference = match format {
        OutputFormat::Json => {
            let js: JSValue = serde_json::from_str(&contents).context(ParsingJsonSnafu {
                path: reference_path,
            })?;
            serde_json::to_string_pretty(&js).context(RenderingJsonSnafu)?
        }
        OutputFormat::Csv => contents,
    };
    if reference.trim_end() != computed.trim_end() {
        warn!("Found differences with the reference output");
        print_diff(reference.trim_end(), computed.trim_end(), "\n");
        whatever!("Difference detected between the computed output and the reference output")
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table {
            columns: vec!["roll_id".to_string(), "vote".to_string(), "phone".to_string()],
            rows: vec![
                vec![
                    Cell::Int(2023001),
                    Cell::Text("Nay".to_string()),
                    Cell::Text("202-225-4".to_string()),
                ],
                vec![Cell::Int(2023002), Cell::Text("Not Voting".to_string()), Cell::Empty],
            ],
        }
    }

    #[test]
    fn json_rows_keep_column_order() {
        let rows = table_to_json(&sample());
        let keys: Vec<&String> = rows[0].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["roll_id", "vote", "phone"]);
        assert_eq!(rows[1]["phone"], JSValue::Null);
        assert_eq!(rows[1]["roll_id"], json!(2023002));
    }

    #[test]
    fn csv_has_header_and_empty_fields() {
        let s = table_to_csv(&sample()).unwrap();
        assert_eq!(
            s,
            "roll_id,vote,phone\n2023001,Nay,202-225-4\n2023002,Not Voting,\n"
        );
        let empty = Table {
            columns: vec!["state".to_string()],
            rows: vec![],
        };
        assert_eq!(table_to_csv(&empty).unwrap(), "state\n");
    }

    #[test]
    fn reference_comparison() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("partyline_reference_{}.json", std::process::id()));
        let path = path.to_str().unwrap().to_string();
        fs::write(&path, r#"{"rows": [{"state": "CA"}]}"#).unwrap();

        let good = serde_json::to_string_pretty(&json!({"rows": [{"state": "CA"}]})).unwrap();
        assert!(check_reference(&path, &good, OutputFormat::Json).is_ok());
        let bad = serde_json::to_string_pretty(&json!({"rows": [{"state": "TX"}]})).unwrap();
        assert!(check_reference(&path, &bad, OutputFormat::Json).is_err());
        fs::remove_file(&path).unwrap();

        assert!(check_reference("/nonexistent/reference.json", &good, OutputFormat::Json).is_err());
    }
}
