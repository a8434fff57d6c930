use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnKind {
    Initial,
    Pending,
    Final,
    Cancel,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Initial => "INITIAL",
            ColumnKind::Pending => "PENDING",
            ColumnKind::Final => "FINAL",
            ColumnKind::Cancel => "CANCEL",
        }
    }

    pub fn all() -> &'static [ColumnKind] {
        &[
            ColumnKind::Initial,
            ColumnKind::Pending,
            ColumnKind::Final,
            ColumnKind::Cancel,
        ]
    }

    /// Whether a card in a column of this kind has left the lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ColumnKind::Final | ColumnKind::Cancel)
    }

    /// Whether columns of this kind take part in the linear progression.
    pub fn is_on_path(&self) -> bool {
        !matches!(self, ColumnKind::Cancel)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColumnKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INITIAL" => Ok(ColumnKind::Initial),
            "PENDING" => Ok(ColumnKind::Pending),
            "FINAL" => Ok(ColumnKind::Final),
            "CANCEL" => Ok(ColumnKind::Cancel),
            _ => Err(format!("Invalid column kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: i64,
    pub board_id: i64,
    pub name: String,
    pub kind: ColumnKind,
    pub order: i64,
}

/// Raw `board_columns` row; `kind` is validated on conversion.
#[derive(Debug, Clone, FromRow)]
pub struct ColumnRow {
    pub id: i64,
    pub board_id: i64,
    pub name: String,
    pub kind: String,
    pub position: i64,
}

impl TryFrom<ColumnRow> for Column {
    type Error = String;

    fn try_from(row: ColumnRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            board_id: row.board_id,
            name: row.name,
            kind: row.kind.parse()?,
            order: row.position,
        })
    }
}
