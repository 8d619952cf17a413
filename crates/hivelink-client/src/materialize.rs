use hivelink_driver::api::{Cursor, Value};
use indexmap::IndexMap;

use crate::error::{ClientError, ClientResult};

/// A result row keyed by column label, in result column order.
///
/// Labels are used as the server reports them (e.g. `jt.dt`).
/// When two columns share a label, the later value wins and keeps the first position.
pub type Row = IndexMap<String, Value>;

/// Drains the cursor into one [`Row`] per result row.
///
/// Values are copied as they are. Rows are neither reordered nor deduplicated.
pub fn materialize(cursor: &mut dyn Cursor) -> ClientResult<Vec<Row>> {
    let labels = cursor
        .columns()
        .iter()
        .map(|c| c.name.clone())
        .collect::<Vec<_>>();
    let mut rows = vec![];
    while let Some(values) = cursor.next_row()? {
        if values.len() != labels.len() {
            return Err(ClientError::protocol(format!(
                "row {} has {} values for {} columns",
                rows.len() + 1,
                values.len(),
                labels.len()
            )));
        }
        rows.push(labels.iter().cloned().zip(values).collect());
    }
    Ok(rows)
}
