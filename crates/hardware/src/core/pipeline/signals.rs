//! Pipeline control signals.
//!
//! This module defines the small enumerations Decode attaches to every
//! instruction and that travel down the pipeline in packed form. It performs:
//! 1. **Operation Classification:** `AluOp` selects the arithmetic performed in Execute.
//! 2. **Control Transfers:** `ControlKind` tags branches, jumps, and halts for branch resolution.
//! 3. **Memory Control:** `MemOp` and `AccessSize` drive the Memory stage.
//!
//! Each enum has a fixed bus code (`bits`) and a checked inverse (`from_bits`).

/// ALU operation selected by Decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AluOp {
    /// Addition; also the neutral operation of a bubble.
    #[default]
    Add,
    /// Subtraction.
    Sub,
    /// Shift left logical.
    Sll,
    /// Set less than (signed).
    Slt,
    /// Set less than unsigned.
    Sltu,
    /// Bitwise XOR.
    Xor,
    /// Shift right logical.
    Srl,
    /// Shift right arithmetic.
    Sra,
    /// Bitwise OR.
    Or,
    /// Bitwise AND.
    And,
}

impl AluOp {
    /// Width of the packed field in bits.
    pub const WIDTH: u32 = 4;

    const ALL: [Self; 10] = [
        Self::Add,
        Self::Sub,
        Self::Sll,
        Self::Slt,
        Self::Sltu,
        Self::Xor,
        Self::Srl,
        Self::Sra,
        Self::Or,
        Self::And,
    ];

    /// Returns the bus code.
    pub const fn bits(self) -> u64 {
        self as u64
    }

    /// Decodes a bus code.
    pub fn from_bits(bits: u64) -> Option<Self> {
        Self::ALL.get(usize::try_from(bits).ok()?).copied()
    }
}

/// Control-transfer class of an instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// Sequential instruction.
    #[default]
    None,
    /// Branch if equal.
    Beq,
    /// Branch if not equal.
    Bne,
    /// Branch if less than (signed).
    Blt,
    /// Branch if greater or equal (signed).
    Bge,
    /// Branch if less than (unsigned).
    Bltu,
    /// Branch if greater or equal (unsigned).
    Bgeu,
    /// Direct jump and link.
    Jal,
    /// Register-indirect jump and link.
    Jalr,
    /// Stops instruction fetch once decoded.
    Halt,
}

impl ControlKind {
    /// Width of the packed field in bits.
    pub const WIDTH: u32 = 4;

    const ALL: [Self; 10] = [
        Self::None,
        Self::Beq,
        Self::Bne,
        Self::Blt,
        Self::Bge,
        Self::Bltu,
        Self::Bgeu,
        Self::Jal,
        Self::Jalr,
        Self::Halt,
    ];

    /// Returns the bus code.
    pub const fn bits(self) -> u64 {
        self as u64
    }

    /// Decodes a bus code.
    pub fn from_bits(bits: u64) -> Option<Self> {
        Self::ALL.get(usize::try_from(bits).ok()?).copied()
    }

    /// Returns `true` for conditional branches.
    pub const fn is_branch(self) -> bool {
        matches!(
            self,
            Self::Beq | Self::Bne | Self::Blt | Self::Bge | Self::Bltu | Self::Bgeu
        )
    }

    /// Returns `true` for unconditional jumps, which also write the link register.
    pub const fn is_jump(self) -> bool {
        matches!(self, Self::Jal | Self::Jalr)
    }

    /// Returns `true` for anything that may change the next pc.
    pub const fn is_transfer(self) -> bool {
        self.is_branch() || self.is_jump()
    }
}

/// Memory operation performed by the Memory stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MemOp {
    /// No memory access.
    #[default]
    None,
    /// Sign-extending load.
    Load,
    /// Zero-extending load.
    LoadUnsigned,
    /// Store.
    Store,
}

impl MemOp {
    /// Width of the packed field in bits.
    pub const WIDTH: u32 = 2;

    const ALL: [Self; 4] = [Self::None, Self::Load, Self::LoadUnsigned, Self::Store];

    /// Returns the bus code.
    pub const fn bits(self) -> u64 {
        self as u64
    }

    /// Decodes a bus code.
    pub fn from_bits(bits: u64) -> Option<Self> {
        Self::ALL.get(usize::try_from(bits).ok()?).copied()
    }

    /// Returns `true` for either load flavour.
    pub const fn is_load(self) -> bool {
        matches!(self, Self::Load | Self::LoadUnsigned)
    }

    /// Returns `true` for stores.
    pub const fn is_store(self) -> bool {
        matches!(self, Self::Store)
    }

    /// Returns `true` when the Memory stage touches memory.
    pub const fn is_access(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Width of a memory access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AccessSize {
    /// 8-bit access; the bus code of a bubble.
    #[default]
    Byte,
    /// 16-bit access.
    Half,
    /// 32-bit access.
    Word,
}

impl AccessSize {
    /// Width of the packed field in bits.
    pub const WIDTH: u32 = crate::common::constants::DATA_SIZE_WIDTH;

    const ALL: [Self; 3] = [Self::Byte, Self::Half, Self::Word];

    /// Returns the bus code.
    pub const fn bits(self) -> u64 {
        self as u64
    }

    /// Decodes a bus code. Code 3 is reserved.
    pub fn from_bits(bits: u64) -> Option<Self> {
        Self::ALL.get(usize::try_from(bits).ok()?).copied()
    }

    /// Returns the access width in bytes.
    pub const fn bytes(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Half => 2,
            Self::Word => 4,
        }
    }
}
