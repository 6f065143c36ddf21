use std::fmt;
use std::sync::Arc;

use log::{debug, trace};

use crate::error::TreeError;
use crate::listeners::Listeners;
use crate::nag::Nag;
use crate::state::GameState;
use crate::tree::{Node, NodeId, PositionTree};
use crate::types::Move;

/// Observer of a [`MoveHistory`]. Content changes (new moves, deletions,
/// annotations) arrive as `history_changed`; pure navigation arrives as
/// `selection_changed`.
pub trait HistoryListener: Send + Sync {
    fn history_changed(&self, _history: &MoveHistory) {}

    fn selection_changed(&self, _history: &MoveHistory) {}
}

/// Names the opening reached by a main line. Sees each main-line snapshot in
/// order; the last name returned wins.
pub trait OpeningClassifier: Send + Sync {
    fn classify(&self, state: &GameState) -> Option<String>;
}

/// A game tree plus a cursor into it.
pub struct MoveHistory {
    tree: PositionTree,
    current: NodeId,
    listeners: Listeners<dyn HistoryListener>,
    classifier: Option<Box<dyn OpeningClassifier>>,
    classification: Option<String>,
    classify_enabled: bool,
}

impl MoveHistory {
    pub fn new(state: GameState) -> Self {
        Self::from_tree(PositionTree::new(state))
    }

    pub fn from_tree(tree: PositionTree) -> Self {
        let current = tree.root();
        Self {
            tree,
            current,
            listeners: Listeners::new(),
            classifier: None,
            classification: None,
            classify_enabled: true,
        }
    }

    pub fn tree(&self) -> &PositionTree {
        &self.tree
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn current_node(&self) -> &Node {
        &self.tree[self.current]
    }

    pub fn current_state(&self) -> &GameState {
        self.current_node().state()
    }

    pub fn initial_state(&self) -> &GameState {
        self.tree[self.tree.root()].state()
    }

    pub fn last_move(&self) -> Option<Move> {
        self.current_node().last_move()
    }

    pub fn add_listener(&self, listener: Arc<dyn HistoryListener>) {
        self.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn HistoryListener>) -> bool {
        self.listeners.remove(listener)
    }

    pub fn fire_history_changed(&self) {
        trace!("history changed, notifying {} listeners", self.listeners.len());
        self.listeners.notify(|l| l.history_changed(self));
    }

    pub fn fire_selection_changed(&self) {
        trace!("selection changed, notifying {} listeners", self.listeners.len());
        self.listeners.notify(|l| l.selection_changed(self));
    }

    /// Records `mv` from the current node. Replaying a move that already
    /// exists only moves the cursor.
    pub fn add_move(&mut self, mv: Move, state: GameState, description: impl Into<String>) -> NodeId {
        let parent = self.current;
        match self.child_for(parent, &mv) {
            Some(existing) => {
                let first = self.tree[parent].main_line_child() == Some(existing);
                self.set_visibility(parent, !first);
                self.current = existing;
                self.fire_selection_changed();
            }
            None => {
                self.show_variations(parent, true);
                let id = self.add_child(parent, mv, state, description.into());
                self.current = id;
                if self.tree[parent].variations().len() == 1 && self.on_main_line(id) {
                    self.classify();
                }
                self.fire_history_changed();
            }
        }
        self.current
    }

    /// Moves the cursor to `id`, opening up every collapsed line on the way
    /// so the node is visible.
    pub fn set_current(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.tree.node(id)?;
        self.current = id;
        let mut node = id;
        while let Some(parent) = self.tree[node].parent() {
            if self.tree[parent].main_line_child() != Some(node) {
                self.show_variations(parent, true);
            } else if !self.tree[parent].show_line() {
                self.show_line(parent, true);
            }
            node = parent;
        }
        self.fire_selection_changed();
        Ok(())
    }

    /// Installs a different tree with the cursor on `current`.
    pub fn replace_tree(&mut self, tree: PositionTree, current: NodeId) -> Result<(), TreeError> {
        tree.node(current)?;
        self.install(tree, current);
        Ok(())
    }

    /// Installs `tree` with the cursor on its root.
    pub fn start_over(&mut self, tree: PositionTree) {
        let root = tree.root();
        self.install(tree, root);
    }

    fn install(&mut self, tree: PositionTree, current: NodeId) {
        self.tree = tree;
        self.current = current;
        self.classify();
        self.fire_history_changed();
    }

    pub fn undo(&mut self) {
        if let Some(parent) = self.current_node().parent() {
            self.move_cursor(parent);
        }
    }

    pub fn redo(&mut self) {
        if let Some(next) = self.current_node().main_line_child() {
            self.move_cursor(next);
        }
    }

    pub fn reset(&mut self) {
        self.move_cursor(self.tree.root());
    }

    pub fn end_of_main_line(&self) -> NodeId {
        self.tree.end_of_main_line()
    }

    pub fn to_end_of_main_line(&mut self) {
        let end = self.end_of_main_line();
        if end != self.current {
            self.move_cursor(end);
        }
    }

    fn move_cursor(&mut self, id: NodeId) {
        if let Err(err) = self.set_current(id) {
            debug!("cursor move to {id} failed: {err}");
        }
    }

    /// Deletes the current node and moves to its parent; at the root,
    /// deletes every continuation instead.
    pub fn delete_current(&mut self) {
        match self.current_node().parent() {
            None => {
                debug!("clearing every line from the start position");
                self.clear_children(self.current);
            }
            Some(parent) => {
                debug!("deleting {} and its continuations", self.current_node());
                if let Err(err) = self.tree.delete_variation(parent, self.current) {
                    debug!("delete failed: {err}");
                }
                self.current = parent;
            }
        }
        if self.on_main_line(self.current) {
            self.classify();
        }
        self.fire_history_changed();
    }

    pub fn promote_variation(&mut self) {
        self.reorder_variation(true);
    }

    pub fn demote_variation(&mut self) {
        self.reorder_variation(false);
    }

    /// Moves the nearest branching line containing the cursor one place
    /// earlier or later among its siblings.
    fn reorder_variation(&mut self, promote: bool) {
        let mut child = self.current;
        let parent = loop {
            match self.tree[child].parent() {
                None => return,
                Some(parent) if self.tree[parent].variations().len() >= 2 => break parent,
                Some(parent) => child = parent,
            }
        };
        let result = if promote {
            self.tree.promote_variation(parent, child)
        } else {
            self.tree.demote_variation(parent, child)
        };
        debug!(
            "{} {} under {}",
            if promote { "promoted" } else { "demoted" },
            self.tree[child],
            self.tree[parent]
        );
        if let Err(err) = result {
            debug!("reorder failed: {err}");
        }
        self.classify();
        self.fire_history_changed();
    }

    pub fn clear_variations(&mut self) {
        if self.clear_children(self.current) > 0 {
            self.fire_history_changed();
        }
    }

    fn clear_children(&mut self, id: NodeId) -> usize {
        self.tree.clear_variations(id).unwrap_or_default()
    }

    pub fn toggle_variation_visibility(&mut self) {
        let node = self.current_node();
        if node.variations().len() > 1 {
            let show = !node.show_variations();
            self.show_variations(self.current, show);
            self.fire_selection_changed();
        }
    }

    pub fn toggle_line_visibility(&mut self) {
        let show = !self.current_node().show_line();
        self.show_line(self.current, show);
        self.fire_selection_changed();
    }

    pub fn comment(&self) -> Option<&str> {
        self.current_node().comment()
    }

    pub fn set_comment(&mut self, comment: &str) {
        self.edit(|tree, id| tree.set_comment(id, comment));
    }

    pub fn append_comment(&mut self, text: &str) {
        self.edit(|tree, id| tree.append_comment(id, text));
    }

    /// Puts `text` in front of the existing comment. A comment starting a
    /// sentence gets `text` as its own sentence; one continuing a sentence is
    /// joined with "and".
    pub fn prepend_comment(&mut self, text: &str) {
        let text = text.trim();
        let current = self.comment().map(str::trim).unwrap_or_default();
        if current.is_empty() {
            self.set_comment(text);
            return;
        }
        if current.contains(text) {
            return;
        }
        let starts_sentence = current
            .chars()
            .next()
            .is_some_and(|ch| ch.is_uppercase() || ch.is_ascii_digit());
        let merged = if starts_sentence {
            let separator = if text.ends_with('.') { " " } else { ". " };
            format!("{text}{separator}{current}")
        } else {
            match text.strip_suffix('.') {
                Some(stripped) => format!("{} and {current}.", stripped.trim()),
                None => format!("{text} and {current}"),
            }
        };
        self.set_comment(&merged);
    }

    pub fn delete_word(&mut self) {
        let id = self.current;
        if self.tree.delete_word(id).unwrap_or(false) {
            self.fire_history_changed();
        }
    }

    pub fn add_nag(&mut self, nag: Nag) {
        self.edit(|tree, id| tree.add_nag(id, nag).map(|_| ()));
    }

    pub fn toggle_nag(&mut self, nag: Nag) {
        self.edit(|tree, id| {
            if !tree.remove_nag(id, nag)? {
                tree.add_nag(id, nag)?;
            }
            Ok(())
        });
    }

    /// Removes every glyph in `remove` other than `add`, then adds `add`.
    /// Listeners hear about it only when something changed.
    pub fn replace_nags(&mut self, remove: &[Nag], add: Option<Nag>) {
        let id = self.current;
        let mut changed = false;
        for nag in remove.iter().filter(|nag| Some(**nag) != add) {
            changed |= self.tree.remove_nag(id, *nag).unwrap_or(false);
        }
        if let Some(nag) = add {
            changed |= self.tree.add_nag(id, nag).unwrap_or(false);
        }
        if changed {
            self.fire_history_changed();
        }
    }

    /// Steps `id`'s move-quality glyph through `!! ! !? ?! ? ??`.
    pub fn next_move_quality_nag(&mut self, id: NodeId, forward: bool) -> Result<(), TreeError> {
        let current = Nag::choose_move_quality(self.tree.node(id)?.nags());
        self.swap_nag(id, current, Nag::next_move_quality(current, forward))
    }

    /// Steps `id`'s evaluation glyph through `+- +/- +/= = =/+ -/+ -+`.
    pub fn next_position_evaluation_nag(&mut self, id: NodeId, forward: bool) -> Result<(), TreeError> {
        let current = Nag::choose_position_evaluation(self.tree.node(id)?.nags());
        self.swap_nag(id, current, Nag::next_position_evaluation(current, forward))
    }

    fn swap_nag(&mut self, id: NodeId, old: Option<Nag>, new: Option<Nag>) -> Result<(), TreeError> {
        if let Some(old) = old {
            self.tree.remove_nag(id, old)?;
        }
        if let Some(new) = new {
            self.tree.add_nag(id, new)?;
        }
        self.fire_history_changed();
        Ok(())
    }

    fn edit(&mut self, f: impl FnOnce(&mut PositionTree, NodeId) -> Result<(), TreeError>) {
        let id = self.current;
        match f(&mut self.tree, id) {
            Ok(()) => self.fire_history_changed(),
            Err(err) => debug!("edit of {id} failed: {err}"),
        }
    }

    /// True when the current snapshot occurs three or more times on the line
    /// leading to it, move counters ignored.
    pub fn is_threefold_repetition(&self) -> bool {
        let current = self.current_state();
        let count = self
            .current_line()
            .into_iter()
            .filter(|id| self.tree[*id].state().same_position(current))
            .count();
        count > 2
    }

    /// Root to current, both included.
    pub fn current_line(&self) -> Vec<NodeId> {
        self.tree.line_to(self.current).unwrap_or_default()
    }

    pub fn main_line(&self) -> Vec<Move> {
        self.tree
            .main_line()
            .into_iter()
            .filter_map(|id| self.tree[id].last_move())
            .collect()
    }

    pub fn iterate_main_line(&self, mut f: impl FnMut(&Node)) {
        for id in self.tree.main_line() {
            f(&self.tree[id]);
        }
    }

    /// Finds a node holding exactly `state`, searching only the depth its
    /// move counters imply.
    pub fn find_state(&self, state: &GameState) -> Option<NodeId> {
        let depth = self.initial_state().half_move_difference_to(state);
        let depth = usize::try_from(depth).ok()?;
        self.tree
            .descendants_at(self.tree.root(), depth)
            .ok()?
            .into_iter()
            .find(|id| self.tree[*id].state() == state)
    }

    pub fn set_classifier(&mut self, classifier: Box<dyn OpeningClassifier>) {
        self.classifier = Some(classifier);
        self.classify();
    }

    pub fn classification(&self) -> Option<&str> {
        self.classification.as_deref()
    }

    pub fn suspend_classification(&mut self) {
        self.classify_enabled = false;
    }

    pub fn resume_classification(&mut self) {
        self.classify_enabled = true;
        self.classify();
    }

    fn classify(&mut self) {
        if !self.classify_enabled {
            return;
        }
        let Some(classifier) = &self.classifier else {
            return;
        };
        let mut name = None;
        for id in self.tree.main_line() {
            if let Some(found) = classifier.classify(self.tree[id].state()) {
                name = Some(found);
            }
        }
        self.classification = name;
    }

    fn child_for(&self, parent: NodeId, mv: &Move) -> Option<NodeId> {
        self.tree.variation(parent, mv).ok().flatten()
    }

    fn add_child(&mut self, parent: NodeId, mv: Move, state: GameState, description: String) -> NodeId {
        match self.tree.add_variation(parent, mv, state, description) {
            Ok(id) => id,
            Err(err) => panic!("cursor {parent} is not in its own tree: {err}"),
        }
    }

    fn on_main_line(&self, id: NodeId) -> bool {
        self.tree.is_main_line(id).unwrap_or(false)
    }

    /// Replaying a sideline opens the parent's variations; replaying the main
    /// line re-shows the parent's line.
    fn set_visibility(&mut self, parent: NodeId, sideline: bool) {
        if sideline {
            self.show_variations(parent, true);
        } else {
            self.show_line(parent, true);
        }
    }

    fn show_variations(&mut self, id: NodeId, show: bool) {
        if let Err(err) = self.tree.set_show_variations(id, show) {
            debug!("cannot change variations of {id}: {err}");
        }
    }

    fn show_line(&mut self, id: NodeId, show: bool) {
        if let Err(err) = self.tree.set_show_line(id, show) {
            debug!("cannot change line of {id}: {err}");
        }
    }
}

impl Default for MoveHistory {
    fn default() -> Self {
        Self::new(GameState::starting())
    }
}

impl fmt::Debug for MoveHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveHistory")
            .field("tree", &self.tree)
            .field("current", &self.current)
            .field("listeners", &self.listeners)
            .field("classification", &self.classification)
            .finish()
    }
}

/// The first four main-line moves, e.g. `moves: e2-e4 e7-e5`.
impl fmt::Display for MoveHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("moves:")?;
        for mv in self.main_line().iter().take(4) {
            write!(f, " {mv}")?;
        }
        Ok(())
    }
}
