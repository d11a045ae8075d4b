use crate::value::Value;

/// Build a CSV document: a header row of raw column names, then one row per
/// data row. Textual cells are double-quoted with embedded quotes doubled;
/// numeric cells stay bare; null cells are empty unquoted fields.
pub fn to_csv<'a, I>(columns: &[String], rows: I) -> String
where
    I: IntoIterator<Item = &'a Vec<Value>>,
{
    let mut lines = vec![columns.join(",")];
    for row in rows {
        let cells: Vec<String> = row.iter().map(csv_cell).collect();
        lines.push(cells.join(","));
    }
    lines.join("\n")
}

fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(_) | Value::Real(_) => value.render(),
        Value::Text(_) | Value::Blob(_) => {
            format!("\"{}\"", value.render().replace('"', "\"\""))
        }
    }
}
