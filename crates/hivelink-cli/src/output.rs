use clap::ValueEnum;
use comfy_table::{Cell, CellAlignment, ColumnConstraint, Table, Width};
use hivelink_client::{Row, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// A grid with one column per result column.
    Table,
    /// One JSON object per row.
    Json,
}

pub fn render_rows(rows: &[Row], format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Table => Ok(render_table(rows)),
        OutputFormat::Json => rows
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()
            .map(|lines| lines.join("\n")),
    }
}

fn render_table(rows: &[Row]) -> String {
    const MIN_COLUMN_WIDTH: u16 = 3;

    let footer = match rows.len() {
        1 => "1 row".to_string(),
        n => format!("{n} rows"),
    };
    let Some(first) = rows.first() else {
        return footer;
    };
    let mut table = Table::new();
    table.load_preset("||--+-++|    ++++++");
    table.set_header(
        first
            .keys()
            .map(|k| Cell::new(escape_meta_characters(k)))
            .collect::<Vec<_>>(),
    );
    table.column_iter_mut().for_each(|c| {
        c.set_padding((0, 0))
            .set_constraint(ColumnConstraint::LowerBoundary(Width::Fixed(
                MIN_COLUMN_WIDTH,
            )))
            .set_cell_alignment(CellAlignment::Right);
    });
    for row in rows {
        table.add_row(
            row.values()
                .map(|v| escape_meta_characters(&format_value(v)))
                .collect::<Vec<_>>(),
        );
    }
    format!("{table}\n{footer}")
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        v => v.to_string(),
    }
}

fn escape_meta_characters(s: &str) -> String {
    s.replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}
