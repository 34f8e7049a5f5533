//! Layout Types
//!
//! Output of the layout computation.

use crate::types::Rect;

/// Resolved geometry for one node, mirroring the node tree.
///
/// `x`/`y`/`width`/`height` are the absolute border box. `content` is that
/// box minus border and padding, which is where children and text go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LayoutNode {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub content: Rect,
    pub children: Vec<LayoutNode>,
}

impl LayoutNode {
    /// Border box as a rect.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Nodes in this subtree, including self.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(LayoutNode::count).sum::<usize>()
    }

    /// Follow a path of child indices.
    pub fn descendant(&self, path: &[usize]) -> Option<&LayoutNode> {
        path.iter().try_fold(self, |node, &i| node.children.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_and_descendant() {
        let leaf = LayoutNode { x: 3, width: 2, height: 1, ..Default::default() };
        let root = LayoutNode {
            width: 10,
            height: 5,
            children: vec![LayoutNode { children: vec![leaf.clone()], ..Default::default() }],
            ..Default::default()
        };
        assert_eq!(root.count(), 3);
        assert_eq!(root.descendant(&[0, 0]), Some(&leaf));
        assert_eq!(root.descendant(&[1]), None);
        assert_eq!(root.rect(), Rect::new(0, 0, 10, 5));
    }
}
