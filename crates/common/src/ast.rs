//! The typed program tree.
//!
//! The compiler parses the flat compiled-line form into this tree once, so
//! the engine never re-derives block ranges from indentation at run time.
//! Every node carries the index of the block it came from; that index is the
//! step tag used for highlighting and bounded replay.

use crate::command::Command;

/// One node of the program tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A single command line.
    Command { command: Command, block_index: usize },
    /// `break`: stops the innermost enclosing loop.
    Break { block_index: usize },
    /// `if <cond>:` with an optional `else:` body.
    If {
        condition: String,
        then_body: Vec<Node>,
        else_body: Vec<Node>,
        block_index: usize,
    },
    /// `while <cond>:` — condition re-evaluated before each iteration.
    While {
        condition: String,
        body: Vec<Node>,
        block_index: usize,
    },
    /// `for ... range(n):` — fixed iteration count.
    For {
        count: i64,
        body: Vec<Node>,
        block_index: usize,
    },
}

impl Node {
    /// The step tag: the originating block's index.
    pub fn block_index(&self) -> usize {
        match self {
            Node::Command { block_index, .. }
            | Node::Break { block_index }
            | Node::If { block_index, .. }
            | Node::While { block_index, .. }
            | Node::For { block_index, .. } => *block_index,
        }
    }
}

/// A parsed program, ready for the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    pub nodes: Vec<Node>,
}

impl Program {
    pub fn new(nodes: Vec<Node>) -> Self {
        Program { nodes }
    }

    /// True if there is nothing to run. Running an empty program is a no-op,
    /// not an error.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_index_of_each_variant() {
        let cases = [
            Node::Command {
                command: Command::PenUp,
                block_index: 1,
            },
            Node::Break { block_index: 2 },
            Node::If {
                condition: "1".to_string(),
                then_body: vec![],
                else_body: vec![],
                block_index: 3,
            },
            Node::While {
                condition: "1".to_string(),
                body: vec![],
                block_index: 4,
            },
            Node::For {
                count: 2,
                body: vec![],
                block_index: 5,
            },
        ];
        let indices: Vec<usize> = cases.iter().map(Node::block_index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn empty_program() {
        assert!(Program::default().is_empty());
        assert!(!Program::new(vec![Node::Break { block_index: 0 }]).is_empty());
    }
}
