use super::graph::ProtocolNodeId;
use crate::error::ProtocolError;
use ahash::AHashMap;

/// Variables driving a conditional block.
#[derive(Debug, Clone, PartialEq)]
pub struct IfBlock {
    /// One trigger per branch, set to the current time when the branch may start.
    pub branch_triggers: Vec<String>,
    /// Written by each branch when it finishes.
    pub end_variables: Vec<String>,
    /// Set to 1 once every branch has been explored.
    pub executed: String,
}

/// Variables driving a loop block.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileBlock {
    pub trigger: String,
    pub end_variables: Vec<String>,
    /// Written by the loop once its condition stops holding.
    pub executing: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogicBlock {
    If(IfBlock),
    While(WhileBlock),
}

/// Block metadata of the control nodes that start an `if` or a `while`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogicBlocks {
    blocks: AHashMap<ProtocolNodeId, LogicBlock>,
}

impl LogicBlocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_if(&mut self, node: ProtocolNodeId, block: IfBlock) {
        self.blocks.insert(node, LogicBlock::If(block));
    }

    pub fn register_while(&mut self, node: ProtocolNodeId, block: WhileBlock) {
        self.blocks.insert(node, LogicBlock::While(block));
    }

    pub fn get(&self, node: ProtocolNodeId) -> Option<&LogicBlock> {
        self.blocks.get(&node)
    }

    pub fn if_block(&self, node: ProtocolNodeId) -> Result<&IfBlock, ProtocolError> {
        match self.blocks.get(&node) {
            Some(LogicBlock::If(block)) => Ok(block),
            _ => Err(ProtocolError::MissingControlMetadata {
                node_id: node,
                what: "if block".to_string(),
            }),
        }
    }

    pub fn while_block(&self, node: ProtocolNodeId) -> Result<&WhileBlock, ProtocolError> {
        match self.blocks.get(&node) {
            Some(LogicBlock::While(block)) => Ok(block),
            _ => Err(ProtocolError::MissingControlMetadata {
                node_id: node,
                what: "while block".to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
