//! Text rendering of column trees for logs and tests.

use horizon_grid_core::TreeFormatOptions;

use crate::columns::provided::ProvidedColumn;

/// Renders a provided-column tree as indented text.
#[derive(Debug, Clone, Default)]
pub struct ColumnTreeDebug {
    options: TreeFormatOptions,
}

impl ColumnTreeDebug {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format every top-level node and its descendants.
    pub fn format(&self, tree: &[ProvidedColumn]) -> String {
        let mut output = String::new();
        if tree.is_empty() {
            output.push_str("(empty)\n");
            return output;
        }
        self.format_level(tree, 0, &mut output);
        output
    }

    fn format_level(&self, nodes: &[ProvidedColumn], depth: usize, output: &mut String) {
        if !self.options.includes(depth) {
            return;
        }
        let count = nodes.len();
        for (index, node) in nodes.iter().enumerate() {
            output.push_str(&self.options.prefix(depth, index + 1 == count));
            output.push_str(node.id());

            if self.options.bean_ids {
                output.push_str(&format!(" [{:?}]", node.bean_id()));
            }
            if !self.options.hide_kinds {
                let kind = match node {
                    ProvidedColumn::Column(_) => "column",
                    ProvidedColumn::Group(group) if group.is_padding() => "padding",
                    ProvidedColumn::Group(_) => "group",
                };
                output.push_str(&format!(" ({kind})"));
            }
            output.push('\n');

            if let ProvidedColumn::Group(group) = node {
                self.format_level(&group.children(), depth + 1, output);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::col_def::{ColDef, ColGroupDef};
    use crate::columns::factory::ColumnFactory;
    use crate::context::GridContext;
    use crate::options::GridOptions;
    use horizon_grid_core::TreeStyle;

    #[test]
    fn test_ascii_rendering_marks_padding() {
        let ctx = GridContext::new(GridOptions::default());
        let tree = ColumnFactory::new(ctx)
            .create_column_tree(
                &[
                    ColDef::field("a").into(),
                    ColGroupDef::new("g", vec![ColDef::field("b").into()]).into(),
                ],
                true,
                None,
            )
            .tree;
        let debug = ColumnTreeDebug::with_options(TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..Default::default()
        });

        assert_eq!(
            debug.format(&tree),
            "group (padding)\n`-- a (column)\ng (group)\n`-- b (column)\n"
        );
    }

    #[test]
    fn test_minimal_rendering_and_depth_limit() {
        let ctx = GridContext::new(GridOptions::default());
        let tree = ColumnFactory::new(ctx)
            .create_column_tree(
                &[ColGroupDef::new("g", vec![ColDef::field("b").into()]).into()],
                true,
                None,
            )
            .tree;
        let debug = ColumnTreeDebug::with_options(TreeFormatOptions {
            max_depth: Some(0),
            ..TreeFormatOptions::ids_only()
        });
        assert_eq!(debug.format(&tree), "g\n");
        assert_eq!(ColumnTreeDebug::new().format(&[]), "(empty)\n");
    }
}
