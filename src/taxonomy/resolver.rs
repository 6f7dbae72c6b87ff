//! Leaf-node resolution over the flat classification list
//!
//! The UNSPSC hierarchy arrives as a flat array of entries linked by
//! `ParentId`. Resolution indexes the array by parent and walks it
//! depth-first from the requested root, emitting every descendant that has
//! no children of its own.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument, warn};

use crate::taxonomy::entry::{ClassificationEntry, LeafNode};
use crate::taxonomy::error::TaxonomyError;

/// How to treat several entries sharing the requested root code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateCodePolicy {
    /// Use the first matching entry in input order
    #[default]
    FirstMatch,
    /// Fail with [`TaxonomyError::DuplicateCode`]
    Reject,
}

/// Mapping from parent id to its direct children, in input order
#[derive(Debug)]
pub struct ParentIndex<'a> {
    children: HashMap<&'a str, Vec<&'a ClassificationEntry>>,
}

impl<'a> ParentIndex<'a> {
    pub fn build(entries: &'a [ClassificationEntry]) -> Self {
        let mut children: HashMap<&str, Vec<&ClassificationEntry>> = HashMap::new();
        for entry in entries {
            if let Some(parent_id) = entry.parent_id.as_deref() {
                children.entry(parent_id).or_default().push(entry);
            }
        }
        Self { children }
    }

    /// Direct children of `id`; empty for leaves
    pub fn children(&self, id: &str) -> &[&'a ClassificationEntry] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_leaf(&self, id: &str) -> bool {
        self.children(id).is_empty()
    }
}

/// Resolves root codes to the leaf categories beneath them
#[derive(Debug, Clone, Copy, Default)]
pub struct LeafResolver {
    duplicate_policy: DuplicateCodePolicy,
}

impl LeafResolver {
    pub fn new(duplicate_policy: DuplicateCodePolicy) -> Self {
        Self { duplicate_policy }
    }

    /// Return every leaf entry reachable from the entry whose code is `root_code`
    ///
    /// Leaves come back in depth-first pre-order, children visited in the order
    /// they appear in `entries`. A root without children is its own leaf.
    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub fn resolve(
        &self,
        entries: &[ClassificationEntry],
        root_code: &str,
    ) -> Result<Vec<LeafNode>, TaxonomyError> {
        let root = self.find_root(entries, root_code)?;
        let index = ParentIndex::build(entries);
        let leaves = collect_leaves(&index, root)?;
        debug!(root_id = %root.id, leaves = leaves.len(), "Resolved leaf categories");
        Ok(leaves)
    }

    fn find_root<'a>(
        &self,
        entries: &'a [ClassificationEntry],
        root_code: &str,
    ) -> Result<&'a ClassificationEntry, TaxonomyError> {
        let mut matches = entries.iter().filter(|e| e.code == root_code);
        let root = matches
            .next()
            .ok_or_else(|| TaxonomyError::NotFound(root_code.to_string()))?;

        let extra = matches.count();
        if extra > 0 {
            match self.duplicate_policy {
                DuplicateCodePolicy::FirstMatch => {
                    warn!(
                        code = root_code,
                        count = extra + 1,
                        "Root code is ambiguous, using first entry"
                    );
                }
                DuplicateCodePolicy::Reject => {
                    return Err(TaxonomyError::DuplicateCode {
                        code: root_code.to_string(),
                        count: extra + 1,
                    });
                }
            }
        }
        Ok(root)
    }
}

/// Resolve leaves with the default first-match policy
pub fn resolve_leaves(
    entries: &[ClassificationEntry],
    root_code: &str,
) -> Result<Vec<LeafNode>, TaxonomyError> {
    LeafResolver::default().resolve(entries, root_code)
}

struct Frame<'a> {
    id: &'a str,
    next_child: usize,
}

/// Explicit-stack pre-order walk; `path` holds the ids currently on the stack
fn collect_leaves<'a>(
    index: &ParentIndex<'a>,
    root: &'a ClassificationEntry,
) -> Result<Vec<LeafNode>, TaxonomyError> {
    let mut leaves = Vec::new();

    if index.is_leaf(&root.id) {
        leaves.push(LeafNode::from(root));
        return Ok(leaves);
    }

    let mut path: HashSet<&str> = HashSet::new();
    path.insert(&root.id);
    let mut stack = vec![Frame {
        id: &root.id,
        next_child: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        let children = index.children(frame.id);
        let Some(child) = children.get(frame.next_child).copied() else {
            path.remove(frame.id);
            stack.pop();
            continue;
        };
        frame.next_child += 1;

        if path.contains(child.id.as_str()) {
            return Err(TaxonomyError::CyclicData {
                id: child.id.clone(),
            });
        }

        if index.is_leaf(&child.id) {
            leaves.push(LeafNode::from(child));
        } else {
            path.insert(&child.id);
            stack.push(Frame {
                id: &child.id,
                next_child: 0,
            });
        }
    }

    Ok(leaves)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, parent: Option<&str>, code: &str, title: &str) -> ClassificationEntry {
        ClassificationEntry::new(id, parent, code, title)
    }

    fn sample() -> Vec<ClassificationEntry> {
        vec![
            entry("1", None, "22", "Root"),
            entry("2", Some("1"), "2210", "Branch"),
            entry("3", Some("2"), "221015", "LeafA"),
            entry("4", Some("2"), "221016", "LeafB"),
        ]
    }

    /// Two segments, one with nested families, interleaved in input order
    fn wide() -> Vec<ClassificationEntry> {
        vec![
            entry("10", None, "22000000", "Building machinery"),
            entry("11", Some("10"), "22100000", "Heavy construction"),
            entry("12", Some("11"), "22101500", "Earth moving"),
            entry("20", None, "30000000", "Structures"),
            entry("13", Some("12"), "22101501", "Backhoes"),
            entry("14", Some("11"), "22101600", "Paving equipment"),
            entry("15", Some("12"), "22101502", "Bulldozers"),
            entry("16", Some("10"), "22110000", "Compactors"),
            entry("21", Some("20"), "30100000", "Structural components"),
            entry("17", Some("14"), "22101601", "Asphalt pavers"),
        ]
    }

    fn codes(leaves: &[LeafNode]) -> Vec<&str> {
        leaves.iter().map(|l| l.code.as_str()).collect()
    }

    #[test]
    fn test_example_scenario() {
        let leaves = resolve_leaves(&sample(), "22").unwrap();
        assert_eq!(
            leaves,
            vec![
                LeafNode {
                    code: "221015".to_string(),
                    title: "LeafA".to_string()
                },
                LeafNode {
                    code: "221016".to_string(),
                    title: "LeafB".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_missing_root_code() {
        let err = resolve_leaves(&sample(), "9999").unwrap_err();
        match err {
            TaxonomyError::NotFound(code) => assert_eq!(code, "9999"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_entries() {
        assert!(matches!(
            resolve_leaves(&[], "22"),
            Err(TaxonomyError::NotFound(_))
        ));
    }

    #[test]
    fn test_childless_root_is_its_own_leaf() {
        let leaves = resolve_leaves(&sample(), "221016").unwrap();
        assert_eq!(codes(&leaves), vec!["221016"]);
        assert_eq!(leaves[0].title, "LeafB");
    }

    #[test]
    fn test_preorder_follows_input_order() {
        let leaves = resolve_leaves(&wide(), "22000000").unwrap();
        assert_eq!(
            codes(&leaves),
            vec!["22101501", "22101502", "22101601", "22110000"]
        );
    }

    #[test]
    fn test_only_leaves_under_root() {
        let entries = wide();
        let index = ParentIndex::build(&entries);
        let leaves = resolve_leaves(&entries, "22000000").unwrap();

        for leaf in &leaves {
            let e = entries.iter().find(|e| e.code == leaf.code).unwrap();
            assert!(index.is_leaf(&e.id), "{} has children", leaf.code);

            // walk up to the root
            let mut current = e;
            while let Some(pid) = current.parent_id.as_deref() {
                current = entries.iter().find(|x| x.id == pid).unwrap();
            }
            assert_eq!(current.code, "22000000");
        }
        assert!(!codes(&leaves).contains(&"30100000"));
    }

    #[test]
    fn test_compositional_over_children() {
        let entries = wide();
        let index = ParentIndex::build(&entries);
        let whole = resolve_leaves(&entries, "22000000").unwrap();

        let mut concatenated = Vec::new();
        for child in index.children("10") {
            concatenated.extend(resolve_leaves(&entries, &child.code).unwrap());
        }
        assert_eq!(whole, concatenated);
    }

    #[test]
    fn test_deterministic() {
        let entries = wide();
        let first = resolve_leaves(&entries, "22000000").unwrap();
        let second = resolve_leaves(&entries, "22000000").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_two_node_cycle_under_root() {
        // root -> A -> B -> A, via a duplicated id
        let entries = vec![
            entry("r", None, "22", "Root"),
            entry("a", Some("r"), "2210", "A"),
            entry("b", Some("a"), "2211", "B"),
            entry("a", Some("b"), "2212", "A again"),
        ];
        match resolve_leaves(&entries, "22") {
            Err(TaxonomyError::CyclicData { id }) => assert_eq!(id, "a"),
            other => panic!("Expected CyclicData, got {:?}", other),
        }
    }

    #[test]
    fn test_root_in_cycle() {
        let entries = vec![
            entry("a", Some("b"), "22", "A"),
            entry("b", Some("a"), "23", "B"),
        ];
        assert!(matches!(
            resolve_leaves(&entries, "22"),
            Err(TaxonomyError::CyclicData { .. })
        ));
    }

    #[test]
    fn test_self_parent() {
        let entries = vec![entry("a", Some("a"), "22", "A")];
        assert!(matches!(
            resolve_leaves(&entries, "22"),
            Err(TaxonomyError::CyclicData { .. })
        ));
    }

    #[test]
    fn test_cycle_produces_no_partial_output() {
        let entries = vec![
            entry("r", None, "22", "Root"),
            entry("l", Some("r"), "2201", "Leaf first"),
            entry("a", Some("r"), "2210", "A"),
            entry("a", Some("a"), "2211", "A loop"),
        ];
        assert!(resolve_leaves(&entries, "22").is_err());
    }

    #[test]
    fn test_shared_subtree_is_not_a_cycle() {
        // the same id listed twice under the root is revisited, but never on one path
        let entries = vec![
            entry("r", None, "22", "Root"),
            entry("a", Some("r"), "2210", "A"),
            entry("a", Some("r"), "2210", "A copy"),
            entry("x", Some("a"), "221001", "X"),
        ];
        let leaves = resolve_leaves(&entries, "22").unwrap();
        assert_eq!(codes(&leaves), vec!["221001", "221001"]);
    }

    #[test]
    fn test_duplicate_code_first_match() {
        let mut entries = sample();
        entries.push(entry("9", None, "22", "Shadow root"));
        let leaves = resolve_leaves(&entries, "22").unwrap();
        assert_eq!(codes(&leaves), vec!["221015", "221016"]);
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let mut entries = sample();
        entries.push(entry("9", None, "22", "Shadow root"));
        let resolver = LeafResolver::new(DuplicateCodePolicy::Reject);
        match resolver.resolve(&entries, "22") {
            Err(TaxonomyError::DuplicateCode { code, count }) => {
                assert_eq!(code, "22");
                assert_eq!(count, 2);
            }
            other => panic!("Expected DuplicateCode, got {:?}", other),
        }
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let depth = 50_000;
        let mut entries = vec![entry("0", None, "c0", "n0")];
        for i in 1..=depth {
            let parent = (i - 1).to_string();
            entries.push(entry(
                &i.to_string(),
                Some(&parent),
                &format!("c{}", i),
                &format!("n{}", i),
            ));
        }
        let leaves = resolve_leaves(&entries, "c0").unwrap();
        assert_eq!(codes(&leaves), vec![format!("c{}", depth).as_str()]);
    }
}
