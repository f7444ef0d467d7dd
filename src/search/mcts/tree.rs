//! Search tree stored in an arena.
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeId`]: the
//! children are owned by the arena and the parent link is a plain index, so
//! the tree has no ownership cycles and walking up to the root is O(1) per
//! step.

use bitflags::bitflags;

use crate::environment::{GameState, Moves};

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    const fn index(self) -> usize {
        self.0 as usize
    }
}

bitflags! {
    /// Lifecycle of a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        /// Children were generated for every legal move.
        const EXPANDED = 1;
        /// The game is over in this node's position.
        const TERMINAL = 1 << 1;
    }
}

/// Position reached by a sequence of moves from the root, together with the
/// statistics of the playouts that went through it.
#[derive(Debug, Clone)]
pub struct Node<S: GameState> {
    parent: Option<NodeId>,
    action: Option<S::Move>,
    state: S,
    children: Vec<NodeId>,
    /// Number of playouts that went through this node (`N`).
    visits: u32,
    /// Sum of the playout rewards from the perspective of the player who
    /// made the move leading to this node (`W`).
    value: f64,
    flags: NodeFlags,
}

impl<S: GameState> Node<S> {
    fn new(parent: Option<NodeId>, action: Option<S::Move>, state: S) -> Self {
        let flags = if state.is_terminal() {
            NodeFlags::TERMINAL
        } else {
            NodeFlags::empty()
        };
        Self {
            parent,
            action,
            state,
            children: Vec::new(),
            visits: 0,
            value: 0.0,
            flags,
        }
    }

    /// `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The move that leads from the parent to this node, `None` for the root.
    #[must_use]
    pub const fn action(&self) -> Option<&S::Move> {
        self.action.as_ref()
    }

    /// Position of this node.
    #[must_use]
    pub const fn state(&self) -> &S {
        &self.state
    }

    /// Children in the order of the legal moves they were created from.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Number of playouts backpropagated through the node.
    #[must_use]
    pub const fn visits(&self) -> u32 {
        self.visits
    }

    /// Total reward accumulated by the node.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Whether the node is terminal and whether it was expanded.
    #[must_use]
    pub const fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Returns `true` if the game is over in this node's position.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.flags.contains(NodeFlags::TERMINAL)
    }

    /// A leaf of the search tree, not necessarily the end of the game.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Average reward, 0 for nodes that were never visited.
    #[must_use]
    pub fn exploitation(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.value / f64::from(self.visits)
        }
    }

    /// [UCB1] score of the node as a child of a parent visited
    /// `parent_visits` times. Unvisited nodes score infinity, so every child
    /// is tried once before any of its siblings is revisited.
    ///
    /// [UCB1]: https://www.chessprogramming.org/UCT
    #[must_use]
    pub fn ucb1(&self, parent_visits: u32, exploration: f64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let visits = f64::from(self.visits);
        exploration.mul_add(
            (f64::from(parent_visits).ln() / visits).sqrt(),
            self.exploitation(),
        )
    }
}

/// Arena holding every node of the search tree. The root is always the first
/// node.
#[derive(Debug, Clone)]
pub struct Tree<S: GameState> {
    nodes: Vec<Node<S>>,
}

impl<S: GameState> Tree<S> {
    pub(super) fn new(root: S) -> Self {
        Self {
            nodes: vec![Node::new(None, None, root)],
        }
    }

    /// Id of the root node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    #[must_use]
    pub fn get(&self, id: NodeId) -> &Node<S> {
        &self.nodes[id.index()]
    }

    fn get_mut(&mut self, id: NodeId) -> &mut Node<S> {
        &mut self.nodes[id.index()]
    }

    /// Total number of nodes in the tree. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the root is created with the tree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes with their ids, root first.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<S>)> {
        (0..).map(NodeId).zip(self.nodes.iter())
    }

    /// Creates a child of `parent` for every move in `moves`, which should be
    /// the legal moves of its position, keeping their order.
    pub(super) fn expand(&mut self, parent: NodeId, moves: Moves<S::Move>) {
        debug_assert!(self.get(parent).is_leaf());
        let position = self.get(parent).state.clone();
        for action in moves {
            let mut next = position.clone();
            next.apply(&action);
            let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
            self.nodes.push(Node::new(Some(parent), Some(action), next));
            self.get_mut(parent).children.push(id);
        }
        self.get_mut(parent).flags.insert(NodeFlags::EXPANDED);
    }

    /// Child of `parent` with the greatest UCB1 score. Ties are resolved in
    /// favor of the earliest child.
    #[must_use]
    pub fn select_child(&self, parent: NodeId, exploration: f64) -> Option<NodeId> {
        let node = self.get(parent);
        let mut best = None;
        let mut best_score = f64::NEG_INFINITY;
        for &child in &node.children {
            let score = self.get(child).ucb1(node.visits, exploration);
            if best.is_none() || score > best_score {
                best = Some(child);
                best_score = score;
            }
        }
        best
    }

    /// Most visited child of `parent` ("robust child"). Ties are resolved in
    /// favor of the earliest child.
    #[must_use]
    pub fn most_visited_child(&self, parent: NodeId) -> Option<NodeId> {
        let mut best: Option<NodeId> = None;
        for &child in &self.get(parent).children {
            if best.map_or(true, |best| self.get(child).visits > self.get(best).visits) {
                best = Some(child);
            }
        }
        best
    }

    /// Records a playout that ended with `reward` (from White's perspective)
    /// in `leaf` and every node on the path from it to the root.
    ///
    /// Each node accumulates the reward from the perspective of the player who
    /// moved into it, which is the opponent of the player to move there. This
    /// way a parent selecting the child with the greatest average picks the
    /// best move for itself.
    pub(super) fn backpropagate(&mut self, leaf: NodeId, reward: f64) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = self.get_mut(id);
            node.visits += 1;
            node.value += reward * (!node.state.side_to_move()).sign();
            current = node.parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use shakmaty::Chess;

    use super::*;
    use crate::chess::from_fen;

    fn expand(tree: &mut Tree<Chess>, id: NodeId) {
        let moves = GameState::legal_moves(tree.get(id).state());
        tree.expand(id, moves);
    }

    #[test]
    fn root() {
        let tree = Tree::new(Chess::default());
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        let root = tree.get(tree.root());
        assert_eq!(root.parent(), None);
        assert_eq!(root.action(), None);
        assert!(root.is_leaf());
        assert!(!root.is_terminal());
        assert_eq!(root.visits(), 0);
        assert_eq!(tree.select_child(tree.root(), 1.0), None);
        assert_eq!(tree.most_visited_child(tree.root()), None);
    }

    #[test]
    fn expansion() {
        let mut tree = Tree::new(Chess::default());
        let root = tree.root();
        expand(&mut tree, root);
        assert_eq!(tree.len(), 21);
        let root = tree.get(tree.root());
        assert!(root.flags().contains(NodeFlags::EXPANDED));
        assert_eq!(root.children().len(), 20);
        let moves = GameState::legal_moves(root.state());
        for (child, action) in root.children().iter().zip(&moves) {
            let child = tree.get(*child);
            assert_eq!(child.parent(), Some(tree.root()));
            assert_eq!(child.action(), Some(action));
            assert!(child.is_leaf());
        }
    }

    #[test]
    fn terminal_nodes() {
        let checkmate =
            from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        let tree = Tree::new(checkmate);
        assert!(tree.get(tree.root()).is_terminal());
    }

    #[test]
    fn unvisited_children_first() {
        let mut tree = Tree::new(Chess::default());
        let root = tree.root();
        expand(&mut tree, root);
        let children = tree.get(root).children().to_vec();

        // The first child collects a lot of wins for White.
        for _ in 0..10 {
            tree.backpropagate(children[0], 1.0);
        }
        assert_eq!(tree.get(root).visits(), 10);
        assert_eq!(tree.select_child(root, 1.0), Some(children[1]));

        for &child in &children[1..children.len() - 1] {
            tree.backpropagate(child, -1.0);
        }
        assert_eq!(
            tree.select_child(root, 1.0),
            Some(children[children.len() - 1])
        );
        tree.backpropagate(children[children.len() - 1], -1.0);
        // All children are visited: the winning one is preferred.
        assert_eq!(tree.select_child(root, 1.0), Some(children[0]));
        assert_eq!(tree.most_visited_child(root), Some(children[0]));
    }

    #[test]
    fn backpropagation_perspective() {
        let mut tree = Tree::new(Chess::default());
        let root = tree.root();
        expand(&mut tree, root);
        let child = tree.get(root).children()[0];
        expand(&mut tree, child);
        let grandchild = tree.get(child).children()[0];

        tree.backpropagate(grandchild, 1.0);
        // White moved into the child and won.
        assert!(tree.get(child).value() > 0.0);
        // Black moved into the grandchild and lost.
        assert!(tree.get(grandchild).value() < 0.0);
        for id in [root, child, grandchild] {
            assert_eq!(tree.get(id).visits(), 1);
        }
    }

    #[test]
    fn ucb1() {
        let mut tree = Tree::new(Chess::default());
        let root = tree.root();
        expand(&mut tree, root);
        let child = tree.get(root).children()[0];
        assert!(tree.get(child).ucb1(0, 1.0).is_infinite());
        tree.backpropagate(child, 1.0);
        tree.backpropagate(child, 0.0);
        let node = tree.get(child);
        assert!((node.exploitation() - 0.5).abs() < 1e-12);
        let expected = 0.5 + std::f64::consts::SQRT_2 * (2.0_f64.ln() / 2.0).sqrt();
        assert!((node.ucb1(2, std::f64::consts::SQRT_2) - expected).abs() < 1e-12);
    }
}
