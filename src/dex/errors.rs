use thiserror::Error;

use super::Opcode;

/// A DEX section could not be decoded. Failures are per section: no class of a broken section is kept.
#[derive(Debug, Error)]
pub enum DexError {
    #[error("Malformed DEX section {section}: {reason}")]
    Malformed { section: String, reason: String },
    #[error("Bad bytecode in {section} at {class_name}->{method_name}: {source}")]
    Instruction {
        section: String,
        class_name: String,
        method_name: String,
        source: InstructionError,
    },
    #[error("Unresolved method reference {index} in {section} at {class_name}: {reason}")]
    UnresolvedMethod {
        section: String,
        class_name: String,
        index: u16,
        reason: String,
    },
}

impl DexError {
    pub(crate) fn malformed(section: &str, reason: impl std::fmt::Display) -> Self {
        DexError::Malformed {
            section: section.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InstructionError {
    #[error("Instruction is too short for {opcode:?} at {offset}, expected {expected} code units, found {actual}")]
    TooShort {
        offset: usize,
        opcode: Opcode,
        expected: usize,
        actual: usize,
    },
    #[error("Opcode {1:#04x} at index {0} does not exist")]
    BadOpcode(usize, u8),
}
