use engine::{GameState, Move, Nag, Path, PositionTree, Square, TreeError};

fn mv(text: &str) -> Move {
    text.parse().expect("valid move text")
}

/// root -> e4 -> e5 -> Nf3
///      \-> d4 -> d5
fn sample_tree() -> PositionTree {
    let state = GameState::starting();
    let mut tree = PositionTree::new(state);
    let root = tree.root();
    let e4 = tree.add_variation(root, mv("e2e4"), state, "1.e4").unwrap();
    let e5 = tree.add_variation(e4, mv("e7e5"), state, "e5").unwrap();
    tree.add_variation(e5, mv("g1f3"), state, "2.Nf3").unwrap();
    let d4 = tree.add_variation(root, mv("d2d4"), state, "1.d4").unwrap();
    tree.add_variation(d4, mv("d7d5"), state, "d5").unwrap();
    tree
}

#[test]
fn first_variation_is_the_main_line() {
    let tree = sample_tree();
    let root = tree.root();
    assert!(tree[root].is_root());
    assert_eq!(tree[root].to_string(), "start position");
    assert_eq!(tree.node_count(), 6);
    assert_eq!(tree.next_moves(root).unwrap(), vec![mv("e2e4"), mv("d2d4")]);

    let main: Vec<&str> = tree
        .main_line()
        .into_iter()
        .skip(1)
        .filter_map(|id| tree[id].description())
        .collect();
    assert_eq!(main, vec!["1.e4", "e5", "2.Nf3"]);
    assert_eq!(tree.ply(tree.end_of_main_line()).unwrap(), 3);

    let d4 = tree.variation(root, &mv("d2d4")).unwrap().unwrap();
    assert!(!tree.is_main_line(d4).unwrap());
    assert_eq!(tree.variation(root, &mv("c2c4")).unwrap(), None);
    assert_eq!(tree.descendants_at(root, 2).unwrap().len(), 2);
}

#[test]
fn promote_and_demote_swap_neighbours() {
    let mut tree = sample_tree();
    let root = tree.root();
    let e4 = tree.variation(root, &mv("e2e4")).unwrap().unwrap();
    let d4 = tree.variation(root, &mv("d2d4")).unwrap().unwrap();

    assert!(!tree.promote_variation(root, e4).unwrap());
    assert!(tree.promote_variation(root, d4).unwrap());
    assert_eq!(tree[root].main_line_child(), Some(d4));
    assert!(tree.is_main_line(d4).unwrap());
    assert_eq!(tree.ply(tree.end_of_main_line()).unwrap(), 2);

    assert!(tree.demote_variation(root, d4).unwrap());
    assert!(!tree.demote_variation(root, d4).unwrap());
    assert_eq!(tree[root].main_line_child(), Some(e4));
}

#[test]
fn deleted_ids_go_stale() {
    let mut tree = sample_tree();
    let root = tree.root();
    let e4 = tree.variation(root, &mv("e2e4")).unwrap().unwrap();
    let e5 = tree.variation(e4, &mv("e7e5")).unwrap().unwrap();

    assert!(tree.delete_variation(root, e4).unwrap());
    assert!(!tree.delete_variation(root, e4).unwrap());
    assert_eq!(tree.node_count(), 3);
    assert_eq!(tree.node(e5).unwrap_err(), TreeError::Detached(e5));
    assert!(!tree.contains(e4));

    // freed slots are reused under a new generation
    let slots = tree.capacity();
    let c4 = tree
        .add_variation(root, mv("c2c4"), GameState::starting(), "1.c4")
        .unwrap();
    assert_eq!(tree.capacity(), slots);
    assert_ne!(c4, e4);
    assert_ne!(c4, e5);
    assert!(!tree.contains(e4));
    assert!(!tree.contains(e5));
    assert_eq!(tree.node(e5).unwrap_err(), TreeError::Detached(e5));
    assert_eq!(tree.clear_variations(root).unwrap(), 2);
    assert_eq!(tree.node_count(), 1);
}

#[test]
fn arena_stays_flat_over_add_and_delete_cycles() {
    let mut tree = PositionTree::new(GameState::starting());
    let root = tree.root();
    let first = tree
        .add_variation(root, mv("e2e4"), GameState::starting(), "1.e4")
        .unwrap();
    assert!(tree.delete_variation(root, first).unwrap());
    let slots = tree.capacity();

    let mut previous = first;
    for _ in 0..1000 {
        let id = tree
            .add_variation(root, mv("e2e4"), GameState::starting(), "1.e4")
            .unwrap();
        assert_ne!(id, previous);
        assert!(!tree.contains(previous));
        assert!(tree.delete_variation(root, id).unwrap());
        previous = id;
    }
    assert_eq!(tree.capacity(), slots);
    assert_eq!(tree.node_count(), 1);
}

#[test]
fn ids_are_bound_to_their_tree() {
    let first = sample_tree();
    let second = sample_tree();
    assert_ne!(first.id(), second.id());
    assert_ne!(first.root(), second.root());
    assert_eq!(
        second.node(first.root()).unwrap_err(),
        TreeError::ForeignNode(first.root())
    );
}

#[test]
#[should_panic(expected = "no longer part of the tree")]
fn indexing_a_deleted_node_panics() {
    let mut tree = sample_tree();
    let root = tree.root();
    let d4 = tree.variation(root, &mv("d2d4")).unwrap().unwrap();
    tree.delete_variation(root, d4).unwrap();
    let _ = &tree[d4];
}

#[test]
fn comments_and_glyphs() {
    let mut tree = sample_tree();
    let id = tree.end_of_main_line();
    tree.set_comment(id, "Main").unwrap();
    tree.append_comment(id, "line here").unwrap();
    assert_eq!(tree[id].comment(), Some("Main line here"));
    assert!(tree.delete_word(id).unwrap());
    assert_eq!(tree[id].comment(), Some("Main line"));
    tree.delete_word(id).unwrap();
    tree.delete_word(id).unwrap();
    assert_eq!(tree[id].comment(), None);
    assert!(!tree.delete_word(id).unwrap());

    assert!(tree.add_nag(id, Nag::Good).unwrap());
    assert!(!tree.add_nag(id, Nag::Good).unwrap());
    assert!(tree.add_nag(id, Nag::SlightAdvantageWhite).unwrap());
    assert_eq!(tree[id].nags().len(), 2);
    assert!(tree.remove_nag(id, Nag::Good).unwrap());
    assert!(!tree.remove_nag(id, Nag::Good).unwrap());
}

#[test]
fn visibility_flags() {
    let mut tree = sample_tree();
    let root = tree.root();
    tree.set_show_line(root, false).unwrap();
    assert!(tree[root].show_line());

    tree.collapse_subtree(root).unwrap();
    for id in tree.main_line() {
        assert!(!tree[id].show_variations());
    }
    let e4 = tree.variation(root, &mv("e2e4")).unwrap().unwrap();
    tree.set_show_line(e4, false).unwrap();
    assert!(!tree[e4].show_line());
}

#[test]
fn path_resolves_and_detects_divergence() {
    let mut tree = sample_tree();
    let root = tree.root();
    let end = tree.end_of_main_line();
    let path = Path::between(&tree, root, end).unwrap();
    assert_eq!(path.moves(), &[mv("e2e4"), mv("e7e5"), mv("g1f3")][..]);
    assert_eq!(path.resolve(&tree).unwrap(), end);
    assert_eq!(path.walk(&tree).count(), 4);
    assert_eq!(
        path.to_string(),
        format!("{root}-[e2-e4, e7-e5, g1-f3]")
    );

    let e4 = tree.variation(root, &mv("e2e4")).unwrap().unwrap();
    let e5 = tree.variation(e4, &mv("e7e5")).unwrap().unwrap();
    tree.delete_variation(e4, e5).unwrap();
    let steps: Vec<_> = path.walk(&tree).collect();
    assert_eq!(steps.len(), 3);
    assert_eq!(
        steps[2],
        Err(TreeError::Diverged {
            parent: e4,
            mv: Move::new(Square::E7, Square::E5)
        })
    );
    assert!(path.resolve(&tree).is_err());
}

#[test]
fn path_between_unrelated_nodes_fails() {
    let tree = sample_tree();
    let root = tree.root();
    let e4 = tree.variation(root, &mv("e2e4")).unwrap().unwrap();
    let d4 = tree.variation(root, &mv("d2d4")).unwrap().unwrap();
    assert_eq!(
        Path::between(&tree, e4, d4).unwrap_err(),
        TreeError::NotAncestor { ancestor: e4, node: d4 }
    );
    let empty = Path::between(&tree, d4, d4).unwrap();
    assert!(empty.moves().is_empty());
    assert_eq!(empty.resolve(&tree).unwrap(), d4);
}
