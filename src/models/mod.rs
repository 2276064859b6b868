//! 数据模型层

pub mod file_tree;

pub use file_tree::{FileTree, FileTreeError, FileTreeRow, IgnoreRules, NodeId, NodeKind};
