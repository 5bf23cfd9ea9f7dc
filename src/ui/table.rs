use crate::model::{Row, Table as StoreTable};
use tabled::{builder::Builder, settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

/// Render store rows with one column per table column, in schema order
pub fn rows_table(table: StoreTable, rows: &[Row]) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.columns().iter().map(|c| c.as_str().to_string()));
    for row in rows {
        builder.push_record(row.values.iter().map(ToString::to_string));
    }
    builder.build().with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldValue;

    #[test]
    fn test_rows_table_has_header_and_values() {
        let rows = vec![Row {
            table: StoreTable::Projects,
            values: vec![
                FieldValue::Integer(1),
                FieldValue::from("Czytanie książek"),
                FieldValue::Null,
                FieldValue::Null,
            ],
        }];
        let rendered = rows_table(StoreTable::Projects, &rows);
        assert!(rendered.contains("start_date"));
        assert!(rendered.contains("Czytanie książek"));
    }

    #[test]
    fn test_empty_stats_table() {
        assert!(TableBuilder::new().build().is_empty());
        assert!(stats_table(&[("Projects", "3")]).contains("Projects"));
    }
}
