use num_traits::FromPrimitive;

use super::{errors::InstructionError, Opcode};

macro_rules! collect_tuple {
    ($u2:expr) => {
        ($u2[0], $u2[1])
    };
}

/// One decoded instruction: its opcode and, for calls, the raw method-id operand
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub opcode: Opcode,
    pub m_idx: Option<u16>,
}

impl Instruction {
    /// Decode the instruction starting at `offset` and return it with its length in code units.
    /// `Ok(None)` marks the end of the code.
    pub fn try_from_code(
        code: &[u16],
        offset: usize,
    ) -> Result<Option<(Self, usize)>, InstructionError> {
        let Some(raw_bytecode) = code.get(offset..).filter(|rest| !rest.is_empty()) else {
            return Ok(None);
        };
        let (opcode_byte, immediate_args) = collect_tuple!(raw_bytecode[0].to_le_bytes());
        if opcode_byte == 0x00 && (1..=3).contains(&immediate_args) {
            return Self::try_payload(raw_bytecode, offset);
        }
        let opcode: Opcode = FromPrimitive::from_u8(opcode_byte)
            .ok_or(InstructionError::BadOpcode(offset, opcode_byte))?;
        let length = match opcode_byte {
            0x00
            | 0x01
            | 0x04
            | 0x07
            | 0x0A..=0x12
            | 0x1D
            | 0x1E
            | 0x21
            | 0x27
            | 0x28
            | 0x7B..=0x8F
            | 0xB0..=0xCF => 1,
            0x02
            | 0x05
            | 0x08
            | 0x13
            | 0x15
            | 0x16
            | 0x19
            | 0x1A
            | 0x1C
            | 0x1F
            | 0x20
            | 0x22
            | 0x23
            | 0x29
            | 0x2D..=0x3D
            | 0x44..=0x6D
            | 0x90..=0xAF
            | 0xD0..=0xE2
            | 0xFE
            | 0xFF => 2,
            0x03
            | 0x06
            | 0x09
            | 0x14
            | 0x17
            | 0x1B
            | 0x24..=0x26
            | 0x2A..=0x2C
            | 0x6E..=0x72
            | 0x74..=0x78
            | 0xFC
            | 0xFD => 3,
            0xFA | 0xFB => 4,
            0x18 => 5,
            _ => return Err(InstructionError::BadOpcode(offset, opcode_byte)),
        };
        if length > raw_bytecode.len() {
            return Err(InstructionError::TooShort {
                offset,
                opcode,
                expected: length,
                actual: raw_bytecode.len(),
            });
        }
        let m_idx = opcode.references_method().then(|| raw_bytecode[1]);
        Ok(Some((Instruction { opcode, m_idx }, length)))
    }

    fn try_payload(
        raw_bytecode: &[u16],
        offset: usize,
    ) -> Result<Option<(Self, usize)>, InstructionError> {
        let opcode: Opcode = FromPrimitive::from_u16(raw_bytecode[0])
            .ok_or(InstructionError::BadOpcode(offset, 0x00))?;
        macro_rules! word {
            ($idx:expr, $expected:expr) => {
                (*raw_bytecode
                    .get($idx)
                    .ok_or(InstructionError::TooShort {
                        offset,
                        opcode,
                        expected: $expected,
                        actual: raw_bytecode.len(),
                    })? as usize)
            };
        }
        let length = match opcode {
            Opcode::PackedSwitchPayload => word!(1, 4) * 2 + 4,
            Opcode::SparseSwitchPayload => word!(1, 2) * 4 + 2,
            Opcode::FillArrayDataPayload => {
                let element_width = word!(1, 4);
                let size = word!(2, 4) | word!(3, 4) << 16;
                (size * element_width).div_ceil(2) + 4
            }
            _ => return Err(InstructionError::BadOpcode(offset, 0x00)),
        };
        if length > raw_bytecode.len() {
            return Err(InstructionError::TooShort {
                offset,
                opcode,
                expected: length,
                actual: raw_bytecode.len(),
            });
        }
        Ok(Some((Instruction { opcode, m_idx: None }, length)))
    }

    /// Decode every instruction of a method body
    pub fn decode_all(code: &[u16]) -> Result<Vec<Self>, InstructionError> {
        let mut offset = 0;
        let mut insns = Vec::new();
        while let Some((inst, len)) = Self::try_from_code(code, offset)? {
            insns.push(inst);
            offset += len;
        }
        Ok(insns)
    }
}
