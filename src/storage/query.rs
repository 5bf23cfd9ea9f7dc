//! Statement builder
//!
//! Identifiers placed into SQL text come only from `Table` / `Column`, after
//! checking that each column belongs to the target table. Values are always
//! bound as numbered parameters.

use crate::model::{Column, FieldValue, Table};
use crate::{Error, Result};

/// SQL text plus the values bound to its `?N` placeholders, in order
#[derive(Debug)]
pub struct Statement<'a> {
    pub sql: String,
    pub params: Vec<&'a FieldValue>,
}

fn column_list(columns: &[Column]) -> String {
    columns.iter().map(Column::as_str).collect::<Vec<_>>().join(", ")
}

/// `col1 = ?N AND col2 = ?N+1 ...`, numbering placeholders from `first`
fn conjunction(columns: &[&Column], first: usize) -> String {
    columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ?{}", c.as_str(), first + i))
        .collect::<Vec<_>>()
        .join(" AND ")
}

pub fn insert(table: Table, values: &[FieldValue]) -> Result<Statement<'_>> {
    let columns = table.insertable_columns();
    if values.len() != columns.len() {
        return Err(Error::Arity {
            table,
            expected: columns.len(),
            got: values.len(),
        });
    }
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.as_str(),
            column_list(columns),
            placeholders
        ),
        params: values.iter().collect(),
    })
}

pub fn select_all(table: Table) -> Statement<'static> {
    Statement {
        sql: format!("SELECT {} FROM {}", column_list(table.columns()), table.as_str()),
        params: Vec::new(),
    }
}

pub fn select_where(table: Table, predicates: &[(Column, FieldValue)]) -> Result<Statement<'_>> {
    let (clause, params) = where_clause(table, predicates, "select_where")?;
    Ok(Statement {
        sql: format!(
            "SELECT {} FROM {} WHERE {}",
            column_list(table.columns()),
            table.as_str(),
            clause
        ),
        params,
    })
}

pub fn update<'a>(
    table: Table,
    id: &'a FieldValue,
    fields: &'a [(Column, FieldValue)],
) -> Result<Statement<'a>> {
    if fields.is_empty() {
        return Err(Error::EmptyUpdate);
    }
    let columns: Vec<&Column> = fields.iter().map(|(c, _)| c).collect();
    table.check_columns(columns.iter().copied())?;
    if let Some(column) = columns.iter().find(|c| ***c == Column::Id) {
        return Err(Error::ImmutableColumn(**column));
    }

    let assignments = columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ?{}", c.as_str(), i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let mut params: Vec<&FieldValue> = fields.iter().map(|(_, v)| v).collect();
    params.push(id);

    Ok(Statement {
        sql: format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table.as_str(),
            assignments,
            params.len()
        ),
        params,
    })
}

pub fn delete_where(table: Table, predicates: &[(Column, FieldValue)]) -> Result<Statement<'_>> {
    let (clause, params) = where_clause(table, predicates, "delete_where")?;
    Ok(Statement {
        sql: format!("DELETE FROM {} WHERE {}", table.as_str(), clause),
        params,
    })
}

pub fn delete_all(table: Table) -> Statement<'static> {
    Statement {
        sql: format!("DELETE FROM {}", table.as_str()),
        params: Vec::new(),
    }
}

fn where_clause<'a>(
    table: Table,
    predicates: &'a [(Column, FieldValue)],
    operation: &'static str,
) -> Result<(String, Vec<&'a FieldValue>)> {
    if predicates.is_empty() {
        return Err(Error::EmptyPredicate(operation));
    }
    let columns: Vec<&Column> = predicates.iter().map(|(c, _)| c).collect();
    table.check_columns(columns.iter().copied())?;
    let params = predicates.iter().map(|(_, v)| v).collect();
    Ok((conjunction(&columns, 1), params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_statement() {
        let values = vec![
            FieldValue::from("A"),
            FieldValue::Null,
            FieldValue::from("2020-05-13 00:00:00"),
        ];
        let stmt = insert(Table::Projects, &values).unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO projects (name, start_date, end_date) VALUES (?1, ?2, ?3)"
        );
        assert_eq!(stmt.params.len(), 3);
    }

    #[test]
    fn test_insert_arity() {
        let values = vec![FieldValue::from("only name")];
        assert!(matches!(
            insert(Table::Tasks, &values),
            Err(Error::Arity { expected: 6, got: 1, .. })
        ));
    }

    #[test]
    fn test_select_where_conjunction() {
        let predicates = vec![
            (Column::ProjectId, FieldValue::Integer(2)),
            (Column::Status, FieldValue::from("started")),
        ];
        let stmt = select_where(Table::Tasks, &predicates).unwrap();
        assert!(stmt.sql.ends_with("FROM tasks WHERE project_id = ?1 AND status = ?2"));
        assert_eq!(stmt.params, vec![&predicates[0].1, &predicates[1].1]);
    }

    #[test]
    fn test_empty_predicates_rejected() {
        assert!(matches!(
            select_where(Table::Tasks, &[]),
            Err(Error::EmptyPredicate("select_where"))
        ));
        assert!(matches!(
            delete_where(Table::Projects, &[]),
            Err(Error::EmptyPredicate("delete_where"))
        ));
    }

    #[test]
    fn test_foreign_column_rejected() {
        let predicates = vec![(Column::Status, FieldValue::from("started"))];
        assert!(matches!(
            select_where(Table::Projects, &predicates),
            Err(Error::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_update_statement() {
        let id = FieldValue::Integer(4);
        let fields = vec![
            (Column::Status, FieldValue::from("done")),
            (Column::EndDate, FieldValue::from("2020-05-12 00:00:00")),
        ];
        let stmt = update(Table::Tasks, &id, &fields).unwrap();
        assert_eq!(stmt.sql, "UPDATE tasks SET status = ?1, end_date = ?2 WHERE id = ?3");
        assert_eq!(stmt.params.last(), Some(&&id));
    }

    #[test]
    fn test_update_rejects_id_and_empty() {
        let id = FieldValue::Integer(1);
        assert!(matches!(update(Table::Tasks, &id, &[]), Err(Error::EmptyUpdate)));
        let fields = vec![(Column::Id, FieldValue::Integer(9))];
        assert!(matches!(
            update(Table::Tasks, &id, &fields),
            Err(Error::ImmutableColumn(Column::Id))
        ));
    }

    #[test]
    fn test_delete_all_statement() {
        assert_eq!(delete_all(Table::Tasks).sql, "DELETE FROM tasks");
        assert_eq!(
            select_all(Table::Projects).sql,
            "SELECT id, name, start_date, end_date FROM projects"
        );
    }
}
