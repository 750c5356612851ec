/*
Conversion of tree nodes into termtree for display.

termtree is external, so the conversion lives in a local trait instead of an
inherent impl on `Tree<String>`.
 */
use termtree::Tree;
use tracing::instrument;

use crate::domain::{Node, TreeModel};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for Node {
    #[instrument(level = "trace")]
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self
            .children()
            .unwrap_or_default()
            .iter()
            .map(|c| c.to_tree_string())
            .collect();

        Tree::new(self.name()).with_leaves(leaves)
    }
}

impl TreeNodeConvert for TreeModel {
    fn to_tree_string(&self) -> Tree<String> {
        self.root().to_tree_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Collection, Group};

    #[test]
    fn given_model_when_converted_then_renders_both_levels() {
        let model = TreeModel::new(
            Collection::with_groups(vec![Group::new("dev").with_items(["a"]), Group::new("prod")])
                .into_ref(),
        );

        let rendered = model.to_tree_string().to_string();

        assert!(rendered.starts_with("<root>"));
        assert!(rendered.contains("dev"));
        assert!(rendered.contains("a"));
        assert!(rendered.contains("prod"));
    }
}
