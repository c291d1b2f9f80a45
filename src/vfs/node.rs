//! The node tree backing the in-memory engine: a slab arena of files and
//! folders, root folder at index 0, drives as the root's children.

use std::time::SystemTime;

use slab::Slab;

pub(crate) type NodeId = usize;

pub(crate) const ROOT: NodeId = 0;

/// Why a tree mutation could not proceed. The engine maps these onto the
/// public error taxonomy together with the full path it was resolving.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum TreeConflict {
    /// The name is taken by a node of the wrong kind.
    WrongKind,
    /// The name is taken and the operation required it to be free.
    Occupied,
    /// The destination folder lies inside the subtree being moved.
    IntoDescendant,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Timestamps {
    pub(crate) created: SystemTime,
    pub(crate) modified: SystemTime,
    pub(crate) accessed: SystemTime,
}

impl Timestamps {
    fn now() -> Self {
        let now = SystemTime::now();
        Timestamps {
            created: now,
            modified: now,
            accessed: now,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Folder { children: Vec<NodeId> },
    File { content: Vec<u8> },
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
    pub(crate) times: Timestamps,
    /// Monotonic tag assigned at insertion. Open streams remember it and
    /// refuse to write back into a reused slab slot.
    pub(crate) generation: u64,
}

impl Node {
    pub(crate) fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }

    pub(crate) fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }

    pub(crate) fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Folder { children } => children,
            NodeKind::File { .. } => &[],
        }
    }

    pub(crate) fn content(&self) -> Option<&Vec<u8>> {
        match &self.kind {
            NodeKind::File { content } => Some(content),
            NodeKind::Folder { .. } => None,
        }
    }

    pub(crate) fn content_mut(&mut self) -> Option<&mut Vec<u8>> {
        match &mut self.kind {
            NodeKind::File { content } => Some(content),
            NodeKind::Folder { .. } => None,
        }
    }
}

/// Arena of nodes. Name lookups are ASCII case-insensitive; stored names
/// keep the case they were created with.
pub(crate) struct NodeTree {
    arena: Slab<Node>,
    next_generation: u64,
}

impl NodeTree {
    pub(crate) fn new() -> Self {
        let mut arena = Slab::new();
        let root = arena.insert(Node {
            name: String::new(),
            parent: None,
            kind: NodeKind::Folder {
                children: Vec::new(),
            },
            times: Timestamps::now(),
            generation: 0,
        });
        debug_assert_eq!(root, ROOT);
        NodeTree {
            arena,
            next_generation: 1,
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.arena.get_mut(id)
    }

    /// Child of `folder` with the given name, compared case-insensitively.
    pub(crate) fn find_child(&self, folder: NodeId, name: &str) -> Option<NodeId> {
        let parent = self.arena.get(folder)?;
        parent
            .children()
            .iter()
            .copied()
            .find(|&child| match self.arena.get(child) {
                Some(node) => node.name.eq_ignore_ascii_case(name),
                None => false,
            })
    }

    /// Returns the existing folder child with this name, or creates it.
    /// A file child with the same name is a conflict.
    pub(crate) fn create_or_reuse_folder(
        &mut self,
        parent: NodeId,
        name: &str,
    ) -> Result<NodeId, TreeConflict> {
        if let Some(existing) = self.find_child(parent, name) {
            return if self.arena[existing].is_folder() {
                Ok(existing)
            } else {
                Err(TreeConflict::WrongKind)
            };
        }
        Ok(self.insert(
            parent,
            name,
            NodeKind::Folder {
                children: Vec::new(),
            },
        ))
    }

    /// Creates a file child; any node with this name is a conflict.
    pub(crate) fn create_file(
        &mut self,
        parent: NodeId,
        name: &str,
    ) -> Result<NodeId, TreeConflict> {
        if self.find_child(parent, name).is_some() {
            return Err(TreeConflict::Occupied);
        }
        Ok(self.insert(parent, name, NodeKind::File { content: Vec::new() }))
    }

    /// Returns the existing file child with this name, or creates an empty
    /// one. A folder child with the same name is a conflict.
    pub(crate) fn create_or_reuse_file(
        &mut self,
        parent: NodeId,
        name: &str,
    ) -> Result<NodeId, TreeConflict> {
        if let Some(existing) = self.find_child(parent, name) {
            return if self.arena[existing].is_file() {
                Ok(existing)
            } else {
                Err(TreeConflict::WrongKind)
            };
        }
        Ok(self.insert(parent, name, NodeKind::File { content: Vec::new() }))
    }

    /// Detaches the node from its parent and removes its whole subtree
    /// from the arena.
    pub(crate) fn delete(&mut self, id: NodeId) {
        self.detach(id);
        for node in self.subtree(id) {
            self.arena.remove(node);
        }
    }

    /// Rewires a node under a new parent with a new name. The subtree is
    /// untouched: content and timestamps move as they are.
    pub(crate) fn move_node(
        &mut self,
        id: NodeId,
        new_parent: NodeId,
        new_name: &str,
    ) -> Result<(), TreeConflict> {
        if id == new_parent || self.is_ancestor(id, new_parent) {
            return Err(TreeConflict::IntoDescendant);
        }
        if self.find_child(new_parent, new_name).is_some() {
            return Err(TreeConflict::Occupied);
        }
        self.detach(id);
        self.arena[id].name = new_name.to_owned();
        self.attach(id, new_parent);
        Ok(())
    }

    /// Duplicates a node under a new parent: a file gets its bytes copied,
    /// a folder gets its subtree duplicated. Timestamps are copied verbatim
    /// from the source.
    pub(crate) fn copy_node(
        &mut self,
        id: NodeId,
        new_parent: NodeId,
        new_name: &str,
    ) -> Result<NodeId, TreeConflict> {
        if self.find_child(new_parent, new_name).is_some() {
            return Err(TreeConflict::Occupied);
        }
        Ok(self.duplicate(id, new_parent, new_name))
    }

    fn duplicate(&mut self, id: NodeId, new_parent: NodeId, new_name: &str) -> NodeId {
        let times = self.arena[id].times;
        let copy = match &self.arena[id].kind {
            NodeKind::File { content } => {
                let content = content.clone();
                self.insert(new_parent, new_name, NodeKind::File { content })
            }
            NodeKind::Folder { children } => {
                let children = children.clone();
                let copy = self.insert(
                    new_parent,
                    new_name,
                    NodeKind::Folder {
                        children: Vec::new(),
                    },
                );
                for child in children {
                    let name = self.arena[child].name.clone();
                    self.duplicate(child, copy, &name);
                }
                copy
            }
        };
        self.arena[copy].times = times;
        copy
    }

    /// True when `ancestor` lies on the parent chain of `id`.
    pub(crate) fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = self.arena.get(id).and_then(|node| node.parent);
        while let Some(node) = cursor {
            if node == ancestor {
                return true;
            }
            cursor = self.arena.get(node).and_then(|n| n.parent);
        }
        false
    }

    /// The node and all its descendants, preorder.
    fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut nodes = vec![id];
        let mut at = 0;
        while at < nodes.len() {
            if let Some(node) = self.arena.get(nodes[at]) {
                nodes.extend_from_slice(node.children());
            }
            at += 1;
        }
        nodes
    }

    fn insert(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> NodeId {
        let generation = self.next_generation;
        self.next_generation += 1;
        let id = self.arena.insert(Node {
            name: name.to_owned(),
            parent: Some(parent),
            kind,
            times: Timestamps::now(),
            generation,
        });
        self.attach(id, parent);
        id
    }

    fn attach(&mut self, id: NodeId, parent: NodeId) {
        self.arena[id].parent = Some(parent);
        if let NodeKind::Folder { children } = &mut self.arena[parent].kind {
            children.push(id);
        }
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.arena[id].parent.take() {
            if let NodeKind::Folder { children } = &mut self.arena[parent].kind {
                children.retain(|&child| child != id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_tree() -> (NodeTree, NodeId, NodeId) {
        let mut tree = NodeTree::new();
        let drive = tree.create_or_reuse_folder(ROOT, "c:").unwrap();
        let dir = tree.create_or_reuse_folder(drive, "dir").unwrap();
        (tree, drive, dir)
    }

    mod creation {
        use super::*;

        #[test]
        fn folders_are_reused_case_insensitively() {
            let (mut tree, drive, dir) = setup_tree();
            let again = tree.create_or_reuse_folder(drive, "DIR").unwrap();
            assert_eq!(again, dir);
            assert_eq!(tree.node(dir).unwrap().name, "dir");
        }

        #[test]
        fn strict_file_creation_rejects_any_collision() {
            let (mut tree, _, dir) = setup_tree();
            tree.create_file(dir, "f.txt").unwrap();
            assert_eq!(
                tree.create_file(dir, "F.TXT"),
                Err(TreeConflict::Occupied)
            );
            assert!(tree.create_file(dir, "other.txt").is_ok());
        }

        #[test]
        fn file_folder_name_clash_is_wrong_kind() {
            let (mut tree, _, dir) = setup_tree();
            tree.create_file(dir, "taken").unwrap();
            assert_eq!(
                tree.create_or_reuse_folder(dir, "taken"),
                Err(TreeConflict::WrongKind)
            );
            tree.create_or_reuse_folder(dir, "sub").unwrap();
            assert_eq!(
                tree.create_or_reuse_file(dir, "sub"),
                Err(TreeConflict::WrongKind)
            );
        }

        #[test]
        fn reused_file_keeps_its_content() {
            let (mut tree, _, dir) = setup_tree();
            let file = tree.create_or_reuse_file(dir, "f.txt").unwrap();
            tree.node_mut(file)
                .unwrap()
                .content_mut()
                .unwrap()
                .extend_from_slice(b"data");
            let again = tree.create_or_reuse_file(dir, "f.txt").unwrap();
            assert_eq!(again, file);
            assert_eq!(tree.node(file).unwrap().content().unwrap(), b"data");
        }
    }

    mod deletion {
        use super::*;

        #[test]
        fn delete_removes_the_whole_subtree() {
            let (mut tree, drive, dir) = setup_tree();
            let sub = tree.create_or_reuse_folder(dir, "sub").unwrap();
            let file = tree.create_file(sub, "f.txt").unwrap();

            tree.delete(dir);

            assert!(tree.node(dir).is_none());
            assert!(tree.node(sub).is_none());
            assert!(tree.node(file).is_none());
            assert!(tree.find_child(drive, "dir").is_none());
        }

        #[test]
        fn generation_distinguishes_a_reused_slot() {
            let (mut tree, _, dir) = setup_tree();
            let file = tree.create_file(dir, "f.txt").unwrap();
            let old_generation = tree.node(file).unwrap().generation;
            tree.delete(file);

            let replacement = tree.create_file(dir, "g.txt").unwrap();
            if replacement == file {
                assert_ne!(tree.node(replacement).unwrap().generation, old_generation);
            }
        }
    }

    mod moving {
        use super::*;

        #[test]
        fn move_rewires_without_touching_content() {
            let (mut tree, drive, dir) = setup_tree();
            let file = tree.create_file(dir, "f.txt").unwrap();
            tree.node_mut(file)
                .unwrap()
                .content_mut()
                .unwrap()
                .extend_from_slice(b"payload");
            let times = tree.node(file).unwrap().times;

            tree.move_node(file, drive, "moved.txt").unwrap();

            assert_eq!(tree.node(file).unwrap().name, "moved.txt");
            assert_eq!(tree.node(file).unwrap().parent, Some(drive));
            assert_eq!(tree.node(file).unwrap().content().unwrap(), b"payload");
            assert_eq!(tree.node(file).unwrap().times, times);
            assert!(tree.find_child(dir, "f.txt").is_none());
        }

        #[test]
        fn move_into_own_descendant_is_rejected() {
            let (mut tree, _, dir) = setup_tree();
            let sub = tree.create_or_reuse_folder(dir, "sub").unwrap();
            assert_eq!(
                tree.move_node(dir, sub, "dir"),
                Err(TreeConflict::IntoDescendant)
            );
            assert_eq!(
                tree.move_node(dir, dir, "dir"),
                Err(TreeConflict::IntoDescendant)
            );
        }

        #[test]
        fn move_onto_an_occupied_name_is_rejected() {
            let (mut tree, drive, dir) = setup_tree();
            let file = tree.create_file(dir, "f.txt").unwrap();
            tree.create_file(drive, "taken.txt").unwrap();
            assert_eq!(
                tree.move_node(file, drive, "TAKEN.TXT"),
                Err(TreeConflict::Occupied)
            );
            assert_eq!(tree.node(file).unwrap().parent, Some(dir));
        }
    }

    mod copying {
        use super::*;

        #[test]
        fn file_copy_duplicates_bytes_and_timestamps() {
            let (mut tree, drive, dir) = setup_tree();
            let file = tree.create_file(dir, "f.txt").unwrap();
            tree.node_mut(file)
                .unwrap()
                .content_mut()
                .unwrap()
                .extend_from_slice(b"abc");
            let times = tree.node(file).unwrap().times;

            let copy = tree.copy_node(file, drive, "copy.txt").unwrap();

            assert_ne!(copy, file);
            assert_eq!(tree.node(copy).unwrap().content().unwrap(), b"abc");
            assert_eq!(tree.node(copy).unwrap().times, times);
            assert_eq!(tree.node(file).unwrap().content().unwrap(), b"abc");
        }

        #[test]
        fn folder_copy_duplicates_the_subtree() {
            let (mut tree, drive, dir) = setup_tree();
            let sub = tree.create_or_reuse_folder(dir, "sub").unwrap();
            let file = tree.create_file(sub, "f.txt").unwrap();
            tree.node_mut(file)
                .unwrap()
                .content_mut()
                .unwrap()
                .extend_from_slice(b"deep");

            let copy = tree.copy_node(dir, drive, "dup").unwrap();

            let copied_sub = tree.find_child(copy, "sub").unwrap();
            let copied_file = tree.find_child(copied_sub, "f.txt").unwrap();
            assert_eq!(tree.node(copied_file).unwrap().content().unwrap(), b"deep");
            assert!(tree.node(file).is_some());
        }

        #[test]
        fn copy_onto_an_occupied_name_is_rejected() {
            let (mut tree, drive, dir) = setup_tree();
            let file = tree.create_file(dir, "f.txt").unwrap();
            tree.create_or_reuse_folder(drive, "dup").unwrap();
            assert_eq!(
                tree.copy_node(file, drive, "dup"),
                Err(TreeConflict::Occupied)
            );
        }
    }
}
