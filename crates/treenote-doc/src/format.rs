//! On-disk parse/serialize (`spec.md` §4.9, component I): the tree-drawing
//! text format built from Unicode box-drawing glyphs, parsed with a
//! per-line column state machine and serialized by an inverse pre-order
//! walk.

use crate::tree::{Node, Tree};
use treenote_text::Arena;

const VERT_OPEN: &str = "│   ";
const VERT_BLANK: &str = "    ";
const BRANCH_MID: &str = "├── ";
const BRANCH_LAST: &str = "└── ";

fn is_blank_leaf(node: &Node) -> bool {
    node.children.is_empty() && node.content.line_count() == 1 && node.content.line_length(0) == 0
}

/// Appends `text` as a new line to `node`'s content, without recording an
/// undoable edit (content loaded from disk starts with empty history).
fn push_line(arena: &mut Arena, node: &mut Node, text: &str) {
    let line = node.content.line_count();
    if line > 0 {
        node.content.make_line_break(arena, line - 1, node.content.line_length(line - 1));
    }
    if !text.is_empty() {
        let entry = arena.append(text.as_bytes());
        node.content.insert_str(arena, line, 0, entry, false);
    }
    node.content.clear_history();
}

/// One line's prefix-parse result: indent depth reached, whether the line
/// ended on a branch marker (new node) or ran off into content
/// (continuation), and the node text that follows the prefix.
struct Prefix {
    depth: usize,
    is_branch: bool,
    text: String,
}

fn parse_prefix(line: &str) -> Prefix {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0usize;
    let mut depth = 0usize;
    while i < chars.len() {
        match chars[i] {
            '│' | '┃' | ' ' | '\u{00A0}' => {
                i += 1;
                for _ in 0..3 {
                    if i < chars.len() && (chars[i] == ' ' || chars[i] == '\u{00A0}') {
                        i += 1;
                    } else {
                        break;
                    }
                }
                depth += 1;
            }
            '├' | '└' => {
                i += 1;
                while i < chars.len() && chars[i] == '─' {
                    i += 1;
                }
                if i < chars.len() && chars[i] == ' ' {
                    i += 1;
                }
                return Prefix { depth, is_branch: true, text: chars[i..].iter().collect() };
            }
            _ => {
                return Prefix { depth, is_branch: false, text: chars[i..].iter().collect() };
            }
        }
    }
    Prefix { depth, is_branch: false, text: String::new() }
}

fn close_to_depth(path: &mut Vec<Node>, target_depth: usize, root_children: &mut Vec<Node>) {
    while path.len() > target_depth {
        let n = path.pop().unwrap();
        if let Some(parent) = path.last_mut() {
            parent.children.push(n);
        } else {
            root_children.push(n);
        }
    }
}

/// Parses `text` into a tree. `title`, when given, becomes the root node's
/// content line 0 (spec.md §4.9); it is not a line of the body. Every node
/// created is bounded by `piece_max_hist` (`treenote-config`'s
/// `history.piece_table_max`), so a loaded document's undo depth matches a
/// freshly-created one's rather than silently reverting to the crate default.
pub fn parse(arena: &mut Arena, text: &str, title: Option<&str>, piece_max_hist: usize) -> Tree {
    let mut path: Vec<Node> = Vec::new();
    let mut root_children: Vec<Node> = Vec::new();

    for line in text.lines() {
        let prefix = parse_prefix(line);
        if prefix.is_branch {
            let depth = prefix.depth.min(path.len());
            close_to_depth(&mut path, depth, &mut root_children);
            let mut node = Node::with_max_hist(piece_max_hist);
            push_line(arena, &mut node, &prefix.text);
            path.push(node);
        } else if let Some(open) = path.last_mut() {
            push_line(arena, open, &prefix.text);
        } else {
            let mut node = Node::with_max_hist(piece_max_hist);
            push_line(arena, &mut node, &prefix.text);
            path.push(node);
        }
    }
    close_to_depth(&mut path, 0, &mut root_children);

    while matches!(root_children.last(), Some(n) if is_blank_leaf(n)) {
        root_children.pop();
    }
    if root_children.is_empty() {
        root_children.push(Node::with_max_hist(piece_max_hist));
    }

    let mut tree = Tree::with_piece_max_hist(piece_max_hist);
    if let Some(t) = title {
        if !t.is_empty() {
            push_line(arena, &mut tree.root, t);
        }
    }
    tree.root.children = root_children;
    tree
}

/// The document title: the root node's content line 0.
pub fn title(arena: &Arena, tree: &Tree) -> String {
    tree.root.content.to_str(arena, 0)
}

fn serialize_node(arena: &Arena, node: &Node, is_last: bool, ancestors: &mut Vec<bool>, out: &mut String) {
    for &ancestor_last in ancestors.iter() {
        out.push_str(if ancestor_last { VERT_BLANK } else { VERT_OPEN });
    }
    out.push_str(if is_last { BRANCH_LAST } else { BRANCH_MID });
    out.push_str(&node.content.to_str(arena, 0));
    out.push('\n');
    for line in 1..node.content.line_count() {
        for &ancestor_last in ancestors.iter() {
            out.push_str(if ancestor_last { VERT_BLANK } else { VERT_OPEN });
        }
        out.push_str(if is_last { VERT_BLANK } else { VERT_OPEN });
        out.push_str(&node.content.to_str(arena, line));
        out.push('\n');
    }
    ancestors.push(is_last);
    serialize_children(arena, &node.children, ancestors, out);
    ancestors.pop();
}

fn serialize_children(arena: &Arena, children: &[Node], ancestors: &mut Vec<bool>, out: &mut String) {
    let n = children.len();
    for (i, node) in children.iter().enumerate() {
        serialize_node(arena, node, i + 1 == n, ancestors, out);
    }
}

/// Serializes the tree's body (everything but the root's own title line)
/// as tree-drawing text, the inverse of [`parse`].
pub fn serialize(arena: &Arena, tree: &Tree) -> String {
    let mut out = String::new();
    let mut ancestors = Vec::new();
    serialize_children(arena, &tree.root.children, &mut ancestors, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use treenote_text::DEFAULT_MAX_HIST;

    #[test]
    fn parses_flat_single_node() {
        let mut arena = Arena::new();
        let tree = parse(&mut arena, "└── hello\n", None, DEFAULT_MAX_HIST);
        assert_eq!(tree.root.children.len(), 1);
        assert_eq!(tree.root.children[0].content.to_str(&arena, 0), "hello");
    }

    #[test]
    fn parses_nested_children_and_continuation() {
        let mut arena = Arena::new();
        let text = "├── parent\n│   second line\n└── sibling\n    └── child\n";
        let tree = parse(&mut arena, text, None, DEFAULT_MAX_HIST);
        assert_eq!(tree.root.children.len(), 2);
        assert_eq!(tree.root.children[0].content.line_count(), 2);
        assert_eq!(tree.root.children[0].content.to_str(&arena, 1), "second line");
        assert_eq!(tree.root.children[1].children.len(), 1);
        assert_eq!(tree.root.children[1].children[0].content.to_str(&arena, 0), "child");
    }

    #[test]
    fn empty_text_normalizes_to_single_empty_child() {
        let mut arena = Arena::new();
        let tree = parse(&mut arena, "", None, DEFAULT_MAX_HIST);
        assert_eq!(tree.root.children.len(), 1);
        assert!(is_blank_leaf(&tree.root.children[0]));
    }

    #[test]
    fn trailing_blank_nodes_are_trimmed() {
        let mut arena = Arena::new();
        let text = "├── keep\n└── \n";
        let tree = parse(&mut arena, text, None, DEFAULT_MAX_HIST);
        assert_eq!(tree.root.children.len(), 1);
        assert_eq!(tree.root.children[0].content.to_str(&arena, 0), "keep");
    }

    #[test]
    fn title_is_stored_on_root_and_excluded_from_body() {
        let mut arena = Arena::new();
        let tree = parse(&mut arena, "└── a\n", Some("my note"), DEFAULT_MAX_HIST);
        assert_eq!(title(&arena, &tree), "my note");
        assert_eq!(serialize(&arena, &tree), "└── a\n");
    }

    #[test]
    fn serialize_round_trips_through_parse() {
        let mut arena = Arena::new();
        let text = "├── one\n│   continued\n└── two\n    ├── child-a\n    └── child-b\n";
        let tree = parse(&mut arena, text, None, DEFAULT_MAX_HIST);
        let out = serialize(&arena, &tree);
        assert_eq!(out, text);
        let tree2 = parse(&mut arena, &out, None, DEFAULT_MAX_HIST);
        assert_eq!(serialize(&arena, &tree2), out);
    }

    #[test]
    fn freshly_parsed_nodes_have_no_undo_history() {
        let mut arena = Arena::new();
        let tree = parse(&mut arena, "└── a\n", None, DEFAULT_MAX_HIST);
        assert_eq!(tree.root.children[0].content.history_len(), 0);
    }
}
