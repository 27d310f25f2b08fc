use std::fmt;

/// Result alias for tree parsing and structural edits.
pub type TreeResult<T> = Result<T, NewickError>;

#[derive(Debug, Clone, PartialEq)]
pub enum NewickError {
    /// An opening parenthesis without a matching close, or the reverse.
    UnbalancedParentheses,
    /// A `:distance` suffix that does not parse as a number.
    InvalidDistance { text: String },
    /// No tree text before the first semicolon.
    EmptyTree,
    /// The parsed root carries one child or fewer.
    NotEnoughLeaves { found: usize },
    /// A named leaf lookup that matched no leaf in the tree.
    UnknownLeaf { name: String },
}

impl std::error::Error for NewickError {}

impl fmt::Display for NewickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewickError::UnbalancedParentheses => {
                write!(f, "Malformed Newick tree: unmatched parentheses")
            }
            NewickError::InvalidDistance { text } => {
                write!(f, "Malformed Newick tree: expected a number, found '{text}'")
            }
            NewickError::EmptyTree => {
                write!(f, "Malformed Newick tree: no tree text found")
            }
            NewickError::NotEnoughLeaves { found } => {
                write!(f, "Malformed Newick tree: not enough leaves found ({found})")
            }
            NewickError::UnknownLeaf { name } => {
                write!(f, "No leaf named '{name}' in the tree")
            }
        }
    }
}
