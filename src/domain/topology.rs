//! Ordered, kinded view of one board's columns.
//!
//! A topology is validated once when built and is immutable afterwards, so
//! it can be shared between requests (see `services::TopologyCache`).

use std::collections::HashSet;

use crate::domain::{Column, ColumnKind, KanbanError};

#[derive(Debug, Clone)]
pub struct ColumnTopology {
    board_id: i64,
    /// All columns sorted by `order`.
    columns: Vec<Column>,
}

impl ColumnTopology {
    /// Validates and sorts a board's columns.
    ///
    /// Fails with `InvalidTopology` when orders repeat, when the INITIAL,
    /// FINAL or CANCEL column is missing or duplicated, when columns of
    /// several boards are mixed, or when INITIAL/FINAL do not bound the path.
    pub fn new(mut columns: Vec<Column>) -> Result<Self, KanbanError> {
        let board_id = columns
            .first()
            .map(|c| c.board_id)
            .ok_or_else(|| KanbanError::InvalidTopology("board has no columns".into()))?;

        if let Some(stray) = columns.iter().find(|c| c.board_id != board_id) {
            return Err(KanbanError::InvalidTopology(format!(
                "column {} belongs to board {}, expected board {}",
                stray.id, stray.board_id, board_id
            )));
        }

        let mut seen_orders = HashSet::new();
        for column in &columns {
            if column.order < 0 {
                return Err(KanbanError::InvalidTopology(format!(
                    "column '{}' has negative order {}",
                    column.name, column.order
                )));
            }
            if !seen_orders.insert(column.order) {
                return Err(KanbanError::InvalidTopology(format!(
                    "duplicate column order {} on board {}",
                    column.order, board_id
                )));
            }
        }

        for kind in [ColumnKind::Initial, ColumnKind::Final, ColumnKind::Cancel] {
            let count = columns.iter().filter(|c| c.kind == kind).count();
            if count != 1 {
                return Err(KanbanError::InvalidTopology(format!(
                    "board {} must have exactly one {} column, found {}",
                    board_id, kind, count
                )));
            }
        }

        columns.sort_by_key(|c| c.order);

        let path: Vec<&Column> = columns.iter().filter(|c| c.kind.is_on_path()).collect();
        if path.first().map(|c| c.kind) != Some(ColumnKind::Initial) {
            return Err(KanbanError::InvalidTopology(format!(
                "the {} column must come first on board {}",
                ColumnKind::Initial,
                board_id
            )));
        }
        if path.last().map(|c| c.kind) != Some(ColumnKind::Final) {
            return Err(KanbanError::InvalidTopology(format!(
                "the {} column must come last on board {}",
                ColumnKind::Final,
                board_id
            )));
        }

        Ok(Self { board_id, columns })
    }

    pub fn board_id(&self) -> i64 {
        self.board_id
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// INITIAL, PENDING*, FINAL in progression order.
    pub fn path(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.kind.is_on_path())
    }

    pub fn column(&self, id: i64) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.column(id).is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Pending)
            .count()
    }

    /// The path column right after `current`, or `None` once FINAL is reached.
    pub fn next_column(&self, current: &Column) -> Option<&Column> {
        if current.kind == ColumnKind::Final {
            return None;
        }
        self.path()
            .filter(|c| c.order > current.order)
            .min_by_key(|c| c.order)
    }

    pub fn initial_column(&self) -> &Column {
        self.single(ColumnKind::Initial)
    }

    pub fn final_column(&self) -> &Column {
        self.single(ColumnKind::Final)
    }

    pub fn cancel_column(&self) -> &Column {
        self.single(ColumnKind::Cancel)
    }

    fn single(&self, kind: ColumnKind) -> &Column {
        // `new` guarantees exactly one column of each singleton kind.
        self.columns
            .iter()
            .find(|c| c.kind == kind)
            .unwrap_or_else(|| unreachable!("validated topology lacks a {} column", kind))
    }
}
