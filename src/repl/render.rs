use crate::executor::{QueryResult, TableSchema};
use crate::value::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Render a result grid with the given display-order rows.
pub fn render_table(result: &QueryResult, rows: &[&Vec<Value>]) -> String {
    let mut builder = Builder::default();
    builder.push_record(result.columns.iter().cloned());
    for row in rows {
        builder.push_record(row.iter().map(Value::render));
    }
    builder.build().with(Style::sharp()).to_string()
}

/// Render one table's column metadata.
pub fn render_schema(schema: &TableSchema) -> String {
    let mut builder = Builder::default();
    builder.push_record(["column", "type", "not null", "primary key"]);
    for column in &schema.columns {
        builder.push_record([
            column.name.clone(),
            column.column_type.clone(),
            flag(column.not_null),
            flag(column.primary_key),
        ]);
    }
    builder.build().with(Style::sharp()).to_string()
}

/// Render the table list with column counts.
pub fn render_table_list(schemas: &[TableSchema]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["table", "columns"]);
    for schema in schemas {
        builder.push_record([schema.name.clone(), schema.columns.len().to_string()]);
    }
    builder.build().with(Style::sharp()).to_string()
}

fn flag(value: bool) -> String {
    if value { "yes" } else { "" }.to_string()
}
