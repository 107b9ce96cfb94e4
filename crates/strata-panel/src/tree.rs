//! Presentation tree: containers holding panels in z-order.
//!
//! Children are ordered back to front; the last child is drawn on top.

use indexmap::IndexMap;
use strata_core::alloc::HashMap;

use crate::id::{ContainerId, PanelId};

#[derive(Debug)]
struct ContainerNode {
    name: String,
    children: Vec<PanelId>,
}

#[derive(Debug)]
pub struct PanelTree {
    containers: IndexMap<ContainerId, ContainerNode>,
    parents: HashMap<PanelId, ContainerId>,
    next_container: u32,
}

impl Default for PanelTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelTree {
    pub fn new() -> Self {
        let mut containers = IndexMap::new();
        containers.insert(
            ContainerId::ROOT,
            ContainerNode {
                name: "root".to_owned(),
                children: Vec::new(),
            },
        );
        Self {
            containers,
            parents: HashMap::new(),
            next_container: 1,
        }
    }

    pub fn create_container(&mut self, name: impl Into<String>) -> ContainerId {
        let id = ContainerId(self.next_container);
        self.next_container += 1;
        self.containers.insert(
            id,
            ContainerNode {
                name: name.into(),
                children: Vec::new(),
            },
        );
        id
    }

    pub fn contains_container(&self, container: ContainerId) -> bool {
        self.containers.contains_key(&container)
    }

    pub fn container_name(&self, container: ContainerId) -> Option<&str> {
        self.containers.get(&container).map(|c| c.name.as_str())
    }

    /// Parents `panel` under `container` as its front-most child.
    ///
    /// Returns false if the container does not exist.
    pub fn attach(&mut self, panel: PanelId, container: ContainerId) -> bool {
        if !self.containers.contains_key(&container) {
            return false;
        }
        self.detach(panel);
        if let Some(node) = self.containers.get_mut(&container) {
            node.children.push(panel);
        }
        self.parents.insert(panel, container);
        true
    }

    /// Moves `panel` to the front of its container.
    pub fn raise(&mut self, panel: PanelId) {
        let Some(container) = self.parents.get(&panel).copied() else {
            return;
        };
        if let Some(node) = self.containers.get_mut(&container) {
            node.children.retain(|child| *child != panel);
            node.children.push(panel);
        }
    }

    pub fn detach(&mut self, panel: PanelId) -> Option<ContainerId> {
        let container = self.parents.remove(&panel)?;
        if let Some(node) = self.containers.get_mut(&container) {
            node.children.retain(|child| *child != panel);
        }
        Some(container)
    }

    pub fn parent_of(&self, panel: PanelId) -> Option<ContainerId> {
        self.parents.get(&panel).copied()
    }

    /// Children of `container`, back to front.
    pub fn children(&self, container: ContainerId) -> &[PanelId] {
        self.containers
            .get(&container)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Reparents every child of `from` under `to`, keeping their order.
    pub fn move_children(&mut self, from: ContainerId, to: ContainerId) {
        if from == to || !self.containers.contains_key(&to) {
            return;
        }
        let moved = match self.containers.get_mut(&from) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for panel in &moved {
            self.parents.insert(*panel, to);
        }
        if let Some(node) = self.containers.get_mut(&to) {
            node.children.extend(moved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::alloc::IndexSlot;

    fn panel(i: u32) -> PanelId {
        PanelId(IndexSlot::new(0, i))
    }

    #[test]
    fn test_attach_and_raise() {
        let mut tree = PanelTree::new();
        tree.attach(panel(0), ContainerId::ROOT);
        tree.attach(panel(1), ContainerId::ROOT);
        assert_eq!(tree.children(ContainerId::ROOT), [panel(0), panel(1)]);

        tree.raise(panel(0));
        assert_eq!(tree.children(ContainerId::ROOT), [panel(1), panel(0)]);
    }

    #[test]
    fn test_reattach_moves_panel() {
        let mut tree = PanelTree::new();
        let hud = tree.create_container("hud");
        tree.attach(panel(0), ContainerId::ROOT);
        tree.attach(panel(0), hud);
        assert!(tree.children(ContainerId::ROOT).is_empty());
        assert_eq!(tree.parent_of(panel(0)), Some(hud));
    }

    #[test]
    fn test_move_children_keeps_order() {
        let mut tree = PanelTree::new();
        let hud = tree.create_container("hud");
        tree.attach(panel(9), ContainerId::ROOT);
        tree.attach(panel(0), hud);
        tree.attach(panel(1), hud);

        tree.move_children(hud, ContainerId::ROOT);
        assert_eq!(tree.children(ContainerId::ROOT), [panel(9), panel(0), panel(1)]);
        assert_eq!(tree.parent_of(panel(1)), Some(ContainerId::ROOT));
        assert!(tree.children(hud).is_empty());
    }

    #[test]
    fn test_attach_to_unknown_container() {
        let mut tree = PanelTree::new();
        assert!(!tree.attach(panel(0), ContainerId(42)));
        assert_eq!(tree.parent_of(panel(0)), None);
    }
}
