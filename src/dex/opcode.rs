use num_derive::FromPrimitive;

macro_rules! opcodes {
    ($($name:ident = $value:literal => $mnemonic:literal,)*) => {
        /// Dalvik opcodes, plus the payload pseudo-instructions keyed by their full identifying word.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
        #[repr(u16)]
        pub enum Opcode {
            $($name = $value,)*
        }

        impl Opcode {
            /// Smali mnemonic, e.g. `invoke-virtual/range`
            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $(Opcode::$name => $mnemonic,)*
                }
            }
        }
    };
}

opcodes! {
    Nop = 0x00 => "nop",
    Move = 0x01 => "move",
    MoveFrom16 = 0x02 => "move/from16",
    Move16 = 0x03 => "move/16",
    MoveWide = 0x04 => "move-wide",
    MoveWideFrom16 = 0x05 => "move-wide/from16",
    MoveWide16 = 0x06 => "move-wide/16",
    MoveObject = 0x07 => "move-object",
    MoveObjectFrom16 = 0x08 => "move-object/from16",
    MoveObject16 = 0x09 => "move-object/16",
    MoveResult = 0x0A => "move-result",
    MoveResultWide = 0x0B => "move-result-wide",
    MoveResultObject = 0x0C => "move-result-object",
    MoveException = 0x0D => "move-exception",
    ReturnVoid = 0x0E => "return-void",
    Return = 0x0F => "return",
    ReturnWide = 0x10 => "return-wide",
    ReturnObject = 0x11 => "return-object",
    Const4 = 0x12 => "const/4",
    Const16 = 0x13 => "const/16",
    Const = 0x14 => "const",
    ConstHigh16 = 0x15 => "const/high16",
    ConstWide16 = 0x16 => "const-wide/16",
    ConstWide32 = 0x17 => "const-wide/32",
    ConstWide = 0x18 => "const-wide",
    ConstWideHigh16 = 0x19 => "const-wide/high16",
    ConstString = 0x1A => "const-string",
    ConstStringJumbo = 0x1B => "const-string/jumbo",
    ConstClass = 0x1C => "const-class",
    MonitorEnter = 0x1D => "monitor-enter",
    MonitorExit = 0x1E => "monitor-exit",
    CheckCast = 0x1F => "check-cast",
    InstanceOf = 0x20 => "instance-of",
    ArrayLength = 0x21 => "array-length",
    NewInstance = 0x22 => "new-instance",
    NewArray = 0x23 => "new-array",
    FilledNewArray = 0x24 => "filled-new-array",
    FilledNewArrayRange = 0x25 => "filled-new-array/range",
    FillArrayData = 0x26 => "fill-array-data",
    Throw = 0x27 => "throw",
    Goto = 0x28 => "goto",
    Goto16 = 0x29 => "goto/16",
    Goto32 = 0x2A => "goto/32",
    PackedSwitch = 0x2B => "packed-switch",
    SparseSwitch = 0x2C => "sparse-switch",
    CmplFloat = 0x2D => "cmpl-float",
    CmpgFloat = 0x2E => "cmpg-float",
    CmplDouble = 0x2F => "cmpl-double",
    CmpgDouble = 0x30 => "cmpg-double",
    CmpLong = 0x31 => "cmp-long",
    IfEq = 0x32 => "if-eq",
    IfNe = 0x33 => "if-ne",
    IfLt = 0x34 => "if-lt",
    IfGe = 0x35 => "if-ge",
    IfGt = 0x36 => "if-gt",
    IfLe = 0x37 => "if-le",
    IfEqz = 0x38 => "if-eqz",
    IfNez = 0x39 => "if-nez",
    IfLtz = 0x3A => "if-ltz",
    IfGez = 0x3B => "if-gez",
    IfGtz = 0x3C => "if-gtz",
    IfLez = 0x3D => "if-lez",
    Aget = 0x44 => "aget",
    AgetWide = 0x45 => "aget-wide",
    AgetObject = 0x46 => "aget-object",
    AgetBoolean = 0x47 => "aget-boolean",
    AgetByte = 0x48 => "aget-byte",
    AgetChar = 0x49 => "aget-char",
    AgetShort = 0x4A => "aget-short",
    Aput = 0x4B => "aput",
    AputWide = 0x4C => "aput-wide",
    AputObject = 0x4D => "aput-object",
    AputBoolean = 0x4E => "aput-boolean",
    AputByte = 0x4F => "aput-byte",
    AputChar = 0x50 => "aput-char",
    AputShort = 0x51 => "aput-short",
    Iget = 0x52 => "iget",
    IgetWide = 0x53 => "iget-wide",
    IgetObject = 0x54 => "iget-object",
    IgetBoolean = 0x55 => "iget-boolean",
    IgetByte = 0x56 => "iget-byte",
    IgetChar = 0x57 => "iget-char",
    IgetShort = 0x58 => "iget-short",
    Iput = 0x59 => "iput",
    IputWide = 0x5A => "iput-wide",
    IputObject = 0x5B => "iput-object",
    IputBoolean = 0x5C => "iput-boolean",
    IputByte = 0x5D => "iput-byte",
    IputChar = 0x5E => "iput-char",
    IputShort = 0x5F => "iput-short",
    Sget = 0x60 => "sget",
    SgetWide = 0x61 => "sget-wide",
    SgetObject = 0x62 => "sget-object",
    SgetBoolean = 0x63 => "sget-boolean",
    SgetByte = 0x64 => "sget-byte",
    SgetChar = 0x65 => "sget-char",
    SgetShort = 0x66 => "sget-short",
    Sput = 0x67 => "sput",
    SputWide = 0x68 => "sput-wide",
    SputObject = 0x69 => "sput-object",
    SputBoolean = 0x6A => "sput-boolean",
    SputByte = 0x6B => "sput-byte",
    SputChar = 0x6C => "sput-char",
    SputShort = 0x6D => "sput-short",
    InvokeVirtual = 0x6E => "invoke-virtual",
    InvokeSuper = 0x6F => "invoke-super",
    InvokeDirect = 0x70 => "invoke-direct",
    InvokeStatic = 0x71 => "invoke-static",
    InvokeInterface = 0x72 => "invoke-interface",
    InvokeVirtualRange = 0x74 => "invoke-virtual/range",
    InvokeSuperRange = 0x75 => "invoke-super/range",
    InvokeDirectRange = 0x76 => "invoke-direct/range",
    InvokeStaticRange = 0x77 => "invoke-static/range",
    InvokeInterfaceRange = 0x78 => "invoke-interface/range",
    NegInt = 0x7B => "neg-int",
    NotInt = 0x7C => "not-int",
    NegLong = 0x7D => "neg-long",
    NotLong = 0x7E => "not-long",
    NegFloat = 0x7F => "neg-float",
    NegDouble = 0x80 => "neg-double",
    IntToLong = 0x81 => "int-to-long",
    IntToFloat = 0x82 => "int-to-float",
    IntToDouble = 0x83 => "int-to-double",
    LongToInt = 0x84 => "long-to-int",
    LongToFloat = 0x85 => "long-to-float",
    LongToDouble = 0x86 => "long-to-double",
    FloatToInt = 0x87 => "float-to-int",
    FloatToLong = 0x88 => "float-to-long",
    FloatToDouble = 0x89 => "float-to-double",
    DoubleToInt = 0x8A => "double-to-int",
    DoubleToLong = 0x8B => "double-to-long",
    DoubleToFloat = 0x8C => "double-to-float",
    IntToByte = 0x8D => "int-to-byte",
    IntToChar = 0x8E => "int-to-char",
    IntToShort = 0x8F => "int-to-short",
    AddInt = 0x90 => "add-int",
    SubInt = 0x91 => "sub-int",
    MulInt = 0x92 => "mul-int",
    DivInt = 0x93 => "div-int",
    RemInt = 0x94 => "rem-int",
    AndInt = 0x95 => "and-int",
    OrInt = 0x96 => "or-int",
    XorInt = 0x97 => "xor-int",
    ShlInt = 0x98 => "shl-int",
    ShrInt = 0x99 => "shr-int",
    UshrInt = 0x9A => "ushr-int",
    AddLong = 0x9B => "add-long",
    SubLong = 0x9C => "sub-long",
    MulLong = 0x9D => "mul-long",
    DivLong = 0x9E => "div-long",
    RemLong = 0x9F => "rem-long",
    AndLong = 0xA0 => "and-long",
    OrLong = 0xA1 => "or-long",
    XorLong = 0xA2 => "xor-long",
    ShlLong = 0xA3 => "shl-long",
    ShrLong = 0xA4 => "shr-long",
    UshrLong = 0xA5 => "ushr-long",
    AddFloat = 0xA6 => "add-float",
    SubFloat = 0xA7 => "sub-float",
    MulFloat = 0xA8 => "mul-float",
    DivFloat = 0xA9 => "div-float",
    RemFloat = 0xAA => "rem-float",
    AddDouble = 0xAB => "add-double",
    SubDouble = 0xAC => "sub-double",
    MulDouble = 0xAD => "mul-double",
    DivDouble = 0xAE => "div-double",
    RemDouble = 0xAF => "rem-double",
    AddInt2Addr = 0xB0 => "add-int/2addr",
    SubInt2Addr = 0xB1 => "sub-int/2addr",
    MulInt2Addr = 0xB2 => "mul-int/2addr",
    DivInt2Addr = 0xB3 => "div-int/2addr",
    RemInt2Addr = 0xB4 => "rem-int/2addr",
    AndInt2Addr = 0xB5 => "and-int/2addr",
    OrInt2Addr = 0xB6 => "or-int/2addr",
    XorInt2Addr = 0xB7 => "xor-int/2addr",
    ShlInt2Addr = 0xB8 => "shl-int/2addr",
    ShrInt2Addr = 0xB9 => "shr-int/2addr",
    UshrInt2Addr = 0xBA => "ushr-int/2addr",
    AddLong2Addr = 0xBB => "add-long/2addr",
    SubLong2Addr = 0xBC => "sub-long/2addr",
    MulLong2Addr = 0xBD => "mul-long/2addr",
    DivLong2Addr = 0xBE => "div-long/2addr",
    RemLong2Addr = 0xBF => "rem-long/2addr",
    AndLong2Addr = 0xC0 => "and-long/2addr",
    OrLong2Addr = 0xC1 => "or-long/2addr",
    XorLong2Addr = 0xC2 => "xor-long/2addr",
    ShlLong2Addr = 0xC3 => "shl-long/2addr",
    ShrLong2Addr = 0xC4 => "shr-long/2addr",
    UshrLong2Addr = 0xC5 => "ushr-long/2addr",
    AddFloat2Addr = 0xC6 => "add-float/2addr",
    SubFloat2Addr = 0xC7 => "sub-float/2addr",
    MulFloat2Addr = 0xC8 => "mul-float/2addr",
    DivFloat2Addr = 0xC9 => "div-float/2addr",
    RemFloat2Addr = 0xCA => "rem-float/2addr",
    AddDouble2Addr = 0xCB => "add-double/2addr",
    SubDouble2Addr = 0xCC => "sub-double/2addr",
    MulDouble2Addr = 0xCD => "mul-double/2addr",
    DivDouble2Addr = 0xCE => "div-double/2addr",
    RemDouble2Addr = 0xCF => "rem-double/2addr",
    AddIntLit16 = 0xD0 => "add-int/lit16",
    RsubInt = 0xD1 => "rsub-int",
    MulIntLit16 = 0xD2 => "mul-int/lit16",
    DivIntLit16 = 0xD3 => "div-int/lit16",
    RemIntLit16 = 0xD4 => "rem-int/lit16",
    AndIntLit16 = 0xD5 => "and-int/lit16",
    OrIntLit16 = 0xD6 => "or-int/lit16",
    XorIntLit16 = 0xD7 => "xor-int/lit16",
    AddIntLit8 = 0xD8 => "add-int/lit8",
    RsubIntLit8 = 0xD9 => "rsub-int/lit8",
    MulIntLit8 = 0xDA => "mul-int/lit8",
    DivIntLit8 = 0xDB => "div-int/lit8",
    RemIntLit8 = 0xDC => "rem-int/lit8",
    AndIntLit8 = 0xDD => "and-int/lit8",
    OrIntLit8 = 0xDE => "or-int/lit8",
    XorIntLit8 = 0xDF => "xor-int/lit8",
    ShlIntLit8 = 0xE0 => "shl-int/lit8",
    ShrIntLit8 = 0xE1 => "shr-int/lit8",
    UshrIntLit8 = 0xE2 => "ushr-int/lit8",
    InvokePolymorphic = 0xFA => "invoke-polymorphic",
    InvokePolymorphicRange = 0xFB => "invoke-polymorphic/range",
    InvokeCustom = 0xFC => "invoke-custom",
    InvokeCustomRange = 0xFD => "invoke-custom/range",
    ConstMethodHandle = 0xFE => "const-method-handle",
    ConstMethodType = 0xFF => "const-method-type",
    PackedSwitchPayload = 0x0100 => "packed-switch-payload",
    SparseSwitchPayload = 0x0200 => "sparse-switch-payload",
    FillArrayDataPayload = 0x0300 => "array-payload",
}

impl Opcode {
    /// Whether the instruction's index operand points into the method-id table
    pub const fn references_method(self) -> bool {
        matches!(
            self,
            Opcode::InvokeVirtual
                | Opcode::InvokeSuper
                | Opcode::InvokeDirect
                | Opcode::InvokeStatic
                | Opcode::InvokeInterface
                | Opcode::InvokeVirtualRange
                | Opcode::InvokeSuperRange
                | Opcode::InvokeDirectRange
                | Opcode::InvokeStaticRange
                | Opcode::InvokeInterfaceRange
                | Opcode::InvokePolymorphic
                | Opcode::InvokePolymorphicRange
        )
    }
}

#[cfg(test)]
mod tests {
    use num_traits::FromPrimitive;

    use super::Opcode;

    #[test]
    fn test_unused_opcodes() {
        for byte in [0x3E, 0x43, 0x73, 0x79, 0x7A, 0xE3, 0xF9] {
            assert_eq!(Opcode::from_u8(byte), None, "{byte:#x}");
        }
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(Opcode::from_u8(0x0E).map(Opcode::mnemonic), Some("return-void"));
        assert_eq!(Opcode::from_u8(0x74).map(Opcode::mnemonic), Some("invoke-virtual/range"));
        assert_eq!(Opcode::from_u16(0x0300), Some(Opcode::FillArrayDataPayload));
        assert!(Opcode::InvokePolymorphic.references_method());
        assert!(!Opcode::InvokeCustom.references_method());
    }

    #[test]
    fn test_mnemonics_are_lower_case() {
        for opcode in (0..=0x0300u16).filter_map(Opcode::from_u16) {
            let mnemonic = opcode.mnemonic();
            assert_eq!(mnemonic, mnemonic.to_lowercase(), "{opcode:?}");
        }
    }
}
