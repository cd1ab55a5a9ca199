mod errors;
mod instruction;
mod opcode;

use std::collections::HashMap;

pub use self::{
    errors::{DexError, InstructionError},
    instruction::Instruction,
    opcode::Opcode,
};
use crate::apk::DexSection;
use ::dex::{Dex, DexReader};
use log::{debug, trace};
use serde::Serialize;

/// Descriptor used when a class declares no superclass
pub const ROOT_OBJECT: &str = "Ljava/lang/Object;";

/// A decoded class as handed to the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRecord {
    pub name: String,
    pub superclass: Option<String>,
    pub methods: Vec<MethodRecord>,
}

impl ClassRecord {
    pub fn superclass_name(&self) -> &str {
        self.superclass.as_deref().unwrap_or(ROOT_OBJECT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRecord {
    pub name: String,
    pub params: Vec<String>,
    pub return_type: String,
    /// `None` for abstract and native methods
    pub insns: Option<Vec<InstructionRecord>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionRecord {
    pub opcode: Opcode,
    pub reference: Option<Reference>,
}

/// Symbolic operand of an instruction. Only method references are modelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Method(MethodRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MethodRef {
    #[serde(rename = "cls")]
    pub defining_class: String,
    #[serde(rename = "mn")]
    pub name: String,
}

/// Turns the bytes of one DEX section into class records
pub trait ClassDecoder: Send + Sync {
    fn decode(&self, section: &DexSection) -> Result<Vec<ClassRecord>, DexError>;
}

/// Decoder backed by the `dex` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct DexParser;

impl ClassDecoder for DexParser {
    fn decode(&self, section: &DexSection) -> Result<Vec<ClassRecord>, DexError> {
        let dex = DexReader::from_vec(section.bytes.as_slice())
            .map_err(|e| DexError::malformed(&section.name, e))?;
        let mut resolved = HashMap::new();
        let mut classes = Vec::new();
        for class in dex.classes() {
            let class = class.map_err(|e| DexError::malformed(&section.name, e))?;
            let class_name = class.jtype().to_string();
            trace!("{class_name}");
            let superclass = match class.super_class() {
                Some(type_id) => Some(
                    dex.get_type(type_id as u32)
                        .map_err(|e| DexError::malformed(&section.name, e))?
                        .to_string(),
                ),
                None => None,
            };
            let mut methods = Vec::new();
            for method in class.methods() {
                let method_name = method.name().to_string();
                let insns = match method.code() {
                    Some(code) => {
                        let insns = Instruction::decode_all(code.insns()).map_err(|source| {
                            DexError::Instruction {
                                section: section.name.clone(),
                                class_name: class_name.clone(),
                                method_name: method_name.clone(),
                                source,
                            }
                        })?;
                        let mut records = Vec::with_capacity(insns.len());
                        for Instruction { opcode, m_idx } in insns {
                            let reference = match m_idx {
                                Some(index) => Some(Reference::Method(
                                    resolve_method(&dex, &mut resolved, index).map_err(
                                        |reason| DexError::UnresolvedMethod {
                                            section: section.name.clone(),
                                            class_name: class_name.clone(),
                                            index,
                                            reason,
                                        },
                                    )?,
                                )),
                                None => None,
                            };
                            records.push(InstructionRecord { opcode, reference });
                        }
                        Some(records)
                    }
                    None => {
                        debug!("{class_name}->{method_name} - missing code");
                        None
                    }
                };
                methods.push(MethodRecord {
                    name: method_name,
                    params: method.params().iter().map(|p| p.to_string()).collect(),
                    return_type: method.return_type().to_string(),
                    insns,
                });
            }
            classes.push(ClassRecord {
                name: class_name,
                superclass,
                methods,
            });
        }
        debug!("{} - {} classes", section.name, classes.len());
        Ok(classes)
    }
}

fn resolve_method(
    dex: &Dex<&[u8]>,
    resolved: &mut HashMap<u16, MethodRef>,
    index: u16,
) -> Result<MethodRef, String> {
    if let Some(method_ref) = resolved.get(&index) {
        return Ok(method_ref.clone());
    }
    let method_item = dex.get_method_item(index as u64).map_err(|e| e.to_string())?;
    match (
        dex.get_type(method_item.class_idx() as u32),
        dex.get_string(method_item.name_idx() as u32),
    ) {
        (Ok(t), Ok(n)) => {
            let method_ref = MethodRef {
                defining_class: t.to_string(),
                name: n.to_string(),
            };
            resolved.insert(index, method_ref.clone());
            Ok(method_ref)
        }
        (Err(e), _) | (_, Err(e)) => Err(e.to_string()),
    }
}
