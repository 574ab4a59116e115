//! The diff table's columns.
//!
//! Stores and reports address columns by these names, so the table layout is
//! defined in one place.

/// Metadata of one diff table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Field name in serialized rows and store columns
    pub name: &'static str,
    /// Short header used by reports
    pub label: &'static str,
    /// What the column holds
    pub description: &'static str,
}

/// Columns of a [`DiffRow`](crate::DiffRow), in table order.
pub const DIFF_COLUMNS: &[ColumnInfo] = &[
    ColumnInfo {
        name: "security_code",
        label: "Code",
        description: "Securities code",
    },
    ColumnInfo {
        name: "revenue_yoy_pct",
        label: "Revenue YoY%",
        description: "Revenue change against the prior fiscal year",
    },
    ColumnInfo {
        name: "eps_yoy_pct",
        label: "EPS YoY%",
        description: "EPS change against the prior fiscal year",
    },
    ColumnInfo {
        name: "revenue_surprise_pct",
        label: "Revenue Surprise%",
        description: "Revenue over the analyst consensus",
    },
    ColumnInfo {
        name: "eps_surprise_pct",
        label: "EPS Surprise%",
        description: "EPS over the analyst consensus",
    },
];
