//! Fixed-width pipeline buses.
//!
//! Every stage boundary carries a packet with an explicit bit layout, least
//! significant field first. This module provides the pieces every packet is
//! built from:
//! 1. **Bus Identity:** `BusKind` names each bus and knows its declared width.
//! 2. **Bus Word:** `BusWord`, a bit vector wide enough for the widest bus.
//! 3. **Codec:** `BusWriter` and `BusReader` pack and unpack fields in layout order,
//!    rejecting values that do not fit their field.
//! 4. **Packet Interface:** The `Packet` trait implemented by every bus payload.

use std::fmt;

use crate::common::constants::{
    BYPASS_BUS_WIDTH, EXE_TO_ID_BUS_WIDTH, EXE_TO_MEM_BUS_WIDTH, ID_TO_EXE_BUS_WIDTH,
    ID_TO_IF_BUS_WIDTH, IF_TO_ID_BUS_WIDTH, MEM_TO_ID_BUS_WIDTH, MEM_TO_WB_BUS_WIDTH,
    REG_ID_WIDTH, WB_TO_ID_BUS_WIDTH, XLEN,
};
use crate::common::error::PipelineError;
use crate::common::reg::RegId;

/// Number of 64-bit limbs backing a [`BusWord`].
const LIMBS: usize = 3;

/// Identifies one of the pipeline's buses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BusKind {
    /// Fetch → Decode.
    FetchToDecode,
    /// Decode → Execute.
    DecodeToExecute,
    /// Execute → Memory.
    ExecuteToMemory,
    /// Memory → Write-Back.
    MemoryToWriteBack,
    /// Execute → Decode forwarding.
    ExecuteToDecode,
    /// Memory → Decode forwarding.
    MemoryToDecode,
    /// Write-Back → Decode commit.
    WriteBackToDecode,
    /// Decode → Fetch redirect.
    DecodeToFetch,
    /// Bypass signal consumed by Decode's operand read.
    Bypass,
}

impl BusKind {
    /// Every bus, forward buses first.
    pub const ALL: [Self; 9] = [
        Self::FetchToDecode,
        Self::DecodeToExecute,
        Self::ExecuteToMemory,
        Self::MemoryToWriteBack,
        Self::ExecuteToDecode,
        Self::MemoryToDecode,
        Self::WriteBackToDecode,
        Self::DecodeToFetch,
        Self::Bypass,
    ];

    /// Returns the declared width of the bus in bits.
    pub const fn width(self) -> u32 {
        match self {
            Self::FetchToDecode => IF_TO_ID_BUS_WIDTH,
            Self::DecodeToExecute => ID_TO_EXE_BUS_WIDTH,
            Self::ExecuteToMemory => EXE_TO_MEM_BUS_WIDTH,
            Self::MemoryToWriteBack => MEM_TO_WB_BUS_WIDTH,
            Self::ExecuteToDecode => EXE_TO_ID_BUS_WIDTH,
            Self::MemoryToDecode => MEM_TO_ID_BUS_WIDTH,
            Self::WriteBackToDecode => WB_TO_ID_BUS_WIDTH,
            Self::DecodeToFetch => ID_TO_IF_BUS_WIDTH,
            Self::Bypass => BYPASS_BUS_WIDTH,
        }
    }
}

impl fmt::Display for BusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FetchToDecode => "IF->ID",
            Self::DecodeToExecute => "ID->EX",
            Self::ExecuteToMemory => "EX->MEM",
            Self::MemoryToWriteBack => "MEM->WB",
            Self::ExecuteToDecode => "EX->ID",
            Self::MemoryToDecode => "MEM->ID",
            Self::WriteBackToDecode => "WB->ID",
            Self::DecodeToFetch => "ID->IF",
            Self::Bypass => "BYPASS",
        };
        f.write_str(name)
    }
}

/// Returns a mask of the low `width` bits.
const fn low_mask(width: u32) -> u64 {
    if width >= 64 { u64::MAX } else { (1 << width) - 1 }
}

/// A raw bus word of up to 192 bits, bit 0 first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BusWord {
    limbs: [u64; LIMBS],
}

impl BusWord {
    /// Number of bits a bus word can hold.
    pub const CAPACITY: u32 = 64 * LIMBS as u32;

    /// Returns the all-zero word.
    pub const fn zero() -> Self {
        Self { limbs: [0; LIMBS] }
    }

    /// Builds a word from its little-endian 64-bit limbs.
    pub const fn from_limbs(limbs: [u64; LIMBS]) -> Self {
        Self { limbs }
    }

    /// Returns the little-endian 64-bit limbs.
    pub const fn limbs(&self) -> [u64; LIMBS] {
        self.limbs
    }

    /// Returns the number of significant bits (index of the highest set bit plus one).
    pub fn bit_len(&self) -> u32 {
        self.limbs
            .iter()
            .enumerate()
            .rev()
            .find(|(_, limb)| **limb != 0)
            .map_or(0, |(i, limb)| i as u32 * 64 + (64 - limb.leading_zeros()))
    }

    /// Reads `width` bits (at most 64) starting at bit `offset`.
    pub fn get(&self, offset: u32, width: u32) -> u64 {
        debug_assert!(width <= 64 && offset + width <= Self::CAPACITY);
        if width == 0 {
            return 0;
        }
        let limb = (offset / 64) as usize;
        let shift = offset % 64;
        let mut value = self.limbs[limb] >> shift;
        if shift != 0 && shift + width > 64 {
            value |= self.limbs[limb + 1] << (64 - shift);
        }
        value & low_mask(width)
    }

    /// Writes the low `width` bits (at most 64) of `value` starting at bit `offset`.
    pub fn set(&mut self, offset: u32, width: u32, value: u64) {
        debug_assert!(width <= 64 && offset + width <= Self::CAPACITY);
        if width == 0 {
            return;
        }
        let value = value & low_mask(width);
        let limb = (offset / 64) as usize;
        let shift = offset % 64;
        let mask = low_mask(width) << shift;
        self.limbs[limb] = (self.limbs[limb] & !mask) | (value << shift);
        if shift != 0 && shift + width > 64 {
            let spill = low_mask(shift + width - 64);
            self.limbs[limb + 1] = (self.limbs[limb + 1] & !spill) | (value >> (64 - shift));
        }
    }
}

impl fmt::Display for BusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:#018x}_{:016x}_{:016x}",
            self.limbs[2], self.limbs[1], self.limbs[0]
        )
    }
}

/// Packs fields into a [`BusWord`] in layout order, least significant first.
#[derive(Debug)]
pub struct BusWriter {
    bus: BusKind,
    word: BusWord,
    offset: u32,
}

impl BusWriter {
    /// Starts an empty word for `bus`.
    pub const fn new(bus: BusKind) -> Self {
        Self {
            bus,
            word: BusWord::zero(),
            offset: 0,
        }
    }

    /// Appends a `width`-bit field.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::FieldOverflow`] if `value` does not fit in
    /// `width` bits, and [`PipelineError::WidthOverflow`] if the field runs
    /// past the bus's declared width.
    pub fn field(mut self, field: &'static str, value: u64, width: u32) -> Result<Self, PipelineError> {
        if value & !low_mask(width) != 0 {
            return Err(PipelineError::FieldOverflow {
                bus: self.bus,
                field,
                value,
                width,
            });
        }
        let end = self.offset + width;
        if end > self.bus.width() {
            return Err(PipelineError::WidthOverflow {
                bus: self.bus,
                used: end,
                width: self.bus.width(),
            });
        }
        self.word.set(self.offset, width, value);
        self.offset = end;
        Ok(self)
    }

    /// Appends a single-bit flag.
    ///
    /// # Errors
    ///
    /// See [`BusWriter::field`].
    pub fn flag(self, field: &'static str, value: bool) -> Result<Self, PipelineError> {
        self.field(field, u64::from(value), 1)
    }

    /// Appends a datapath word.
    ///
    /// # Errors
    ///
    /// See [`BusWriter::field`].
    pub fn word(self, field: &'static str, value: u32) -> Result<Self, PipelineError> {
        self.field(field, u64::from(value), XLEN)
    }

    /// Appends a register identifier.
    ///
    /// # Errors
    ///
    /// See [`BusWriter::field`].
    pub fn reg(self, field: &'static str, reg: RegId) -> Result<Self, PipelineError> {
        self.field(field, reg.bits(), REG_ID_WIDTH)
    }

    /// Finishes the word.
    pub const fn finish(self) -> BusWord {
        self.word
    }
}

/// Unpacks fields from a [`BusWord`] in layout order.
#[derive(Debug)]
pub struct BusReader {
    bus: BusKind,
    word: BusWord,
    offset: u32,
}

impl BusReader {
    /// Starts reading `word` as a `bus` packet.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::WidthOverflow`] if the word has bits set at or
    /// above the bus's declared width.
    pub fn new(bus: BusKind, word: BusWord) -> Result<Self, PipelineError> {
        let used = word.bit_len();
        if used > bus.width() {
            return Err(PipelineError::WidthOverflow {
                bus,
                used,
                width: bus.width(),
            });
        }
        Ok(Self {
            bus,
            word,
            offset: 0,
        })
    }

    /// Reads the next `width`-bit field.
    pub fn field(&mut self, width: u32) -> u64 {
        let value = self.word.get(self.offset, width);
        self.offset += width;
        value
    }

    /// Reads the next single-bit flag.
    pub fn flag(&mut self) -> bool {
        self.field(1) != 0
    }

    /// Reads the next datapath word.
    pub fn word(&mut self) -> u32 {
        self.field(XLEN) as u32
    }

    /// Reads the next register identifier.
    pub fn reg(&mut self) -> RegId {
        RegId::from_field(self.field(REG_ID_WIDTH))
    }

    /// Reads the next `width`-bit field and maps it through `decode`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidEncoding`] when `decode` rejects the code.
    pub fn code<T>(
        &mut self,
        field: &'static str,
        width: u32,
        decode: impl FnOnce(u64) -> Option<T>,
    ) -> Result<T, PipelineError> {
        let value = self.field(width);
        decode(value).ok_or(PipelineError::InvalidEncoding {
            bus: self.bus,
            field,
            value,
        })
    }
}

/// A payload carried on one of the pipeline's fixed-width buses.
///
/// `pack` and `unpack` are exact inverses for every packet a stage can produce.
pub trait Packet: Copy + fmt::Debug + PartialEq {
    /// The bus this packet travels on.
    const BUS: BusKind;

    /// The empty slot: `valid == false` with every other field neutral.
    fn bubble() -> Self;

    /// Returns `true` unless the slot holds a bubble.
    fn is_valid(&self) -> bool;

    /// Encodes the packet into a word of exactly `Self::BUS.width()` bits.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] if any field exceeds its declared width.
    fn pack(&self) -> Result<BusWord, PipelineError>;

    /// Decodes a packet from a bus word.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] if the word is wider than the bus or holds
    /// an unknown enumeration code.
    fn unpack(word: BusWord) -> Result<Self, PipelineError>;
}

/// Packs and unpacks `packet`, failing unless it comes back unchanged.
///
/// # Errors
///
/// Returns the packing error, or [`PipelineError::BusMismatch`] when the
/// decoded packet differs from the original.
pub fn verify_round_trip<P: Packet>(packet: &P) -> Result<(), PipelineError> {
    let decoded = P::unpack(packet.pack()?)?;
    if decoded == *packet {
        Ok(())
    } else {
        Err(PipelineError::BusMismatch { bus: P::BUS })
    }
}
