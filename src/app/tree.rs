use crate::git::ChangedFile;

/// One node of the derived file tree. Rebuilt from scratch whenever the
/// filtered list changes; never mutated incrementally.
#[derive(Debug, Clone, PartialEq)]
pub struct FileTreeNode {
    /// Path segment this node represents
    pub name: String,
    /// Full repo-relative path prefix up to and including this segment
    pub path: String,
    pub is_directory: bool,
    pub children: Vec<FileTreeNode>,
    /// Present iff this is a file leaf
    pub file: Option<ChangedFile>,
    pub expanded: bool,
}

/// Build a sorted hierarchy from a flat change list. Sibling directories
/// sort before files, then lexicographically by name; siblings are matched
/// by segment name, so files sharing a prefix land under the same node.
pub fn build_tree(files: &[ChangedFile]) -> Vec<FileTreeNode> {
    let mut root: Vec<FileTreeNode> = Vec::new();

    for file in files {
        let segments: Vec<&str> = file.path.split('/').collect();
        let mut level = &mut root;

        for (i, segment) in segments.iter().enumerate() {
            let is_last = i + 1 == segments.len();
            let pos = match level.iter().position(|n| n.name == *segment) {
                Some(pos) => pos,
                None => {
                    level.push(FileTreeNode {
                        name: segment.to_string(),
                        path: segments[..=i].join("/"),
                        is_directory: !is_last,
                        children: Vec::new(),
                        file: if is_last { Some(file.clone()) } else { None },
                        expanded: true,
                    });
                    level.len() - 1
                }
            };
            level = &mut level[pos].children;
        }
    }

    sort_nodes(&mut root);
    root
}

/// Sort every level bottom-up: child order is fixed before the parent
/// level is ordered. The sort is stable.
fn sort_nodes(nodes: &mut [FileTreeNode]) {
    for node in nodes.iter_mut() {
        sort_nodes(&mut node.children);
    }
    nodes.sort_by(|a, b| {
        b.is_directory
            .cmp(&a.is_directory)
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::FileStatus;

    fn make_file(path: &str) -> ChangedFile {
        ChangedFile {
            path: path.to_string(),
            status: FileStatus::Modified,
            additions: 1,
            deletions: 0,
            is_cosmetic: false,
        }
    }

    fn names(nodes: &[FileTreeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn builds_sorted_hierarchy() {
        let files = vec![
            make_file("b/x.ts"),
            make_file("a/y.ts"),
            make_file("a/z.ts"),
        ];
        let tree = build_tree(&files);
        assert_eq!(names(&tree), vec!["a", "b"]);
        assert_eq!(names(&tree[0].children), vec!["y.ts", "z.ts"]);
        assert_eq!(names(&tree[1].children), vec!["x.ts"]);
    }

    #[test]
    fn directories_sort_before_files() {
        let files = vec![make_file("aaa.ts"), make_file("zzz/inner.ts")];
        let tree = build_tree(&files);
        assert_eq!(names(&tree), vec!["zzz", "aaa.ts"]);
        assert!(tree[0].is_directory);
        assert!(!tree[1].is_directory);
    }

    #[test]
    fn root_level_file_is_a_single_leaf() {
        let tree = build_tree(&[make_file("README.md")]);
        assert_eq!(tree.len(), 1);
        assert!(!tree[0].is_directory);
        assert!(tree[0].children.is_empty());
        assert_eq!(tree[0].path, "README.md");
        assert_eq!(tree[0].file.as_ref().unwrap().path, "README.md");
    }

    #[test]
    fn shared_prefix_resolves_to_one_directory_node() {
        let files = vec![make_file("src/a.rs"), make_file("src/b.rs")];
        let tree = build_tree(&files);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].name, "src");
        assert_eq!(tree[0].children.len(), 2);
    }

    #[test]
    fn directory_nodes_carry_no_file() {
        let tree = build_tree(&[make_file("src/deep/a.rs")]);
        assert!(tree[0].file.is_none());
        assert!(tree[0].children[0].file.is_none());
        assert!(tree[0].children[0].children[0].file.is_some());
    }

    #[test]
    fn node_paths_are_full_prefixes() {
        let tree = build_tree(&[make_file("a/b/c.rs")]);
        assert_eq!(tree[0].path, "a");
        assert_eq!(tree[0].children[0].path, "a/b");
        assert_eq!(tree[0].children[0].children[0].path, "a/b/c.rs");
    }

    #[test]
    fn nodes_default_expanded() {
        let tree = build_tree(&[make_file("a/b.rs")]);
        assert!(tree[0].expanded);
        assert!(tree[0].children[0].expanded);
    }

    #[test]
    fn empty_input_builds_empty_tree() {
        assert!(build_tree(&[]).is_empty());
    }

    #[test]
    fn rebuild_of_sorted_input_is_stable() {
        let files = vec![
            make_file("a/y.ts"),
            make_file("a/z.ts"),
            make_file("b/x.ts"),
        ];
        let once = build_tree(&files);
        let twice = build_tree(&files);
        assert_eq!(once, twice);
    }

    #[test]
    fn mixed_depths_sort_within_each_level() {
        let files = vec![
            make_file("src/ui/widget.rs"),
            make_file("src/main.rs"),
            make_file("src/app.rs"),
        ];
        let tree = build_tree(&files);
        assert_eq!(names(&tree[0].children), vec!["ui", "app.rs", "main.rs"]);
    }
}
