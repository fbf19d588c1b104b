use serde_json::Value;
use std::io;

use super::{cells, headers, scalar};

/// Write output as CSV to stdout. Row sets (schedule, graph) become one
/// record per row; result objects become field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Array(rows) => write_rows(&mut wtr, rows),
        Value::Object(map) => {
            let fields = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in fields {
                let _ = wtr.write_record([key.as_str(), &scalar(val, "")]);
            }
        }
        _ => {
            let _ = wtr.write_record([&scalar(value, "")]);
        }
    }

    let _ = wtr.flush();
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) {
    let Some(header) = headers(rows) else {
        for item in rows {
            let _ = wtr.write_record([&scalar(item, "")]);
        }
        return;
    };
    let _ = wtr.write_record(&header);
    for row in rows {
        let _ = wtr.write_record(cells(row, &header, ""));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_written_with_header() {
        let rows = vec![
            json!({"month": 0, "baseline_balance": "100", "strategy_balance": "100"}),
            json!({"month": 1, "baseline_balance": "90", "strategy_balance": "80"}),
        ];
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_rows(&mut wtr, &rows);
        let text = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("baseline_balance,month,strategy_balance"));
        assert_eq!(lines.next(), Some("100,0,100"));
        assert_eq!(lines.next(), Some("90,1,80"));
    }
}
