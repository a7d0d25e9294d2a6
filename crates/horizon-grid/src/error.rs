//! Warning types for the column model.
//!
//! Nothing in the column model fails hard on bad configuration. Problems are
//! described by a [`ColumnWarning`], recorded in the grid's warning log and
//! the operation falls back to the safest behaviour (usually: ignore the
//! offending setting and keep the prior state).

use thiserror::Error;

/// A non-fatal configuration or consistency problem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColumnWarning {
    /// A definition refers to a column type that does not exist.
    #[error("column type '{type_name}' not found, ignoring it")]
    UnknownColumnType { type_name: String },

    /// A user column type tried to replace a built-in one.
    #[error("the built-in column type '{type_name}' cannot be overridden")]
    DefaultColumnTypeOverride { type_name: String },

    /// A user column type itself names column types.
    #[error("column type '{type_name}' has a type itself; column types cannot refer to other types")]
    ColumnTypeWithType { type_name: String },

    /// Two group definitions asked for the same id.
    #[error("group id '{requested}' is used more than once, using '{assigned}' instead")]
    DuplicateGroupId { requested: String, assigned: String },

    /// Pivot mode was requested while tree data is on.
    #[error("pivot mode is not available with tree data")]
    PivotModeWithTreeData,

    /// Columns cannot be pinned in print layout.
    #[error("cannot pin columns while printing, ignoring")]
    PinningInPrintLayout,

    /// A reorder would split the children of a married group.
    #[error("column order would split married group children, ignoring reorder")]
    MarriedChildrenBroken,

    /// A reorder would move a locked column away from its end.
    #[error("column order would move a locked column, ignoring reorder")]
    LockedPositionsBroken,

    /// A move target is outside the column list.
    #[error("cannot move columns to index {to_index}, the last valid index is {max_index}")]
    MoveIndexOutOfRange { to_index: usize, max_index: usize },

    /// Auto row height needs a row model that measures rows.
    #[error("auto height is only supported by the client-side and server-side row models")]
    AutoHeightUnsupportedRowModel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let warning = ColumnWarning::UnknownColumnType {
            type_name: "money".into(),
        };
        assert_eq!(warning.to_string(), "column type 'money' not found, ignoring it");

        let warning = ColumnWarning::MoveIndexOutOfRange {
            to_index: 9,
            max_index: 3,
        };
        assert!(warning.to_string().contains("index 9"));
    }
}
