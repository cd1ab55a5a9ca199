//! Smali-like text rendering of decoded classes.
//!
//! Layout of a rendered class:
//!
//! ```text
//! .class LB;
//! .super Ljava/lang/Object;
//!
//! .method run(I, Ljava/lang/String;)V
//!     invoke-static  # LA;->helper
//!     return-void
//! .end method
//! ```

use std::collections::BTreeSet;

use serde::Serialize;

use crate::dex::{ClassRecord, MethodRecord, MethodRef, Opcode, Reference};

pub const INDENT: &str = "    ";
pub const COMMENT: &str = "  # ";
pub const END_METHOD: &str = ".end method";
const VOID: &str = "V";

/// A call comment on a rendered line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineReference {
    /// Zero-based line in `body`
    pub line: usize,
    pub target: MethodRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedClass {
    #[serde(rename = "name")]
    pub class_name: String,
    #[serde(rename = "methods")]
    pub method_names: Vec<String>,
    pub body: String,
    #[serde(rename = "invokes")]
    pub invoke_targets: BTreeSet<String>,
    #[serde(rename = "refs")]
    pub references: Vec<LineReference>,
}

impl RenderedClass {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.body.split('\n')
    }

    /// The call target rendered on `line`, if that line carries one
    pub fn reference_at(&self, line: usize) -> Option<&MethodRef> {
        self.references
            .binary_search_by_key(&line, |r| r.line)
            .ok()
            .map(|i| &self.references[i].target)
    }
}

struct Renderer {
    lines: Vec<String>,
    invoke_targets: BTreeSet<String>,
    references: Vec<LineReference>,
}

impl Renderer {
    fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    fn method(&mut self, method: &MethodRecord) {
        let MethodRecord {
            name,
            params,
            return_type,
            insns,
        } = method;
        self.push(String::new());
        self.push(format!(".method {name}({}){return_type}", params.join(", ")));
        match insns {
            Some(insns) => {
                for insn in insns {
                    let mut line = format!("{INDENT}{}", insn.opcode.mnemonic());
                    if let Some(Reference::Method(target)) = &insn.reference {
                        line.push_str(COMMENT);
                        line.push_str(&target.defining_class);
                        line.push_str("->");
                        line.push_str(&target.name);
                        self.invoke_targets.insert(target.defining_class.clone());
                        self.references.push(LineReference {
                            line: self.lines.len(),
                            target: target.clone(),
                        });
                    }
                    self.push(line);
                }
            }
            // Bodiless methods only get a placeholder when they return nothing
            None if return_type == VOID => {
                self.push(format!("{INDENT}{}", Opcode::ReturnVoid.mnemonic()));
            }
            None => (),
        }
        self.push(END_METHOD.into());
    }
}

/// Render one class and collect the classes its methods call into
pub fn render(class: &ClassRecord) -> RenderedClass {
    let mut renderer = Renderer {
        lines: vec![
            format!(".class {}", class.name),
            format!(".super {}", class.superclass_name()),
        ],
        invoke_targets: BTreeSet::new(),
        references: Vec::new(),
    };
    for method in &class.methods {
        renderer.method(method);
    }
    RenderedClass {
        class_name: class.name.clone(),
        method_names: class.methods.iter().map(|m| m.name.clone()).collect(),
        body: renderer.lines.join("\n"),
        invoke_targets: renderer.invoke_targets,
        references: renderer.references,
    }
}
