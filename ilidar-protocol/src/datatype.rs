//! Packet content flags carried in the DATATYPE field
//!
//! Bit layout (LSB first):
//! - bits 0-1: distance block (off, 1-D, 2-D, 3-D)
//! - bits 2-3: intensity block (off, absolute, reflective)
//! - bit 4: precision block
//! - bit 5: housekeeping block
//! - bits 6-15: reserved
//!
//! Only the 3-D distance block is decoded; the other flags are reported so
//! consumers can tell what the sensor claims to have sent.

// Wire format masks
const DEPTH_MASK: u16 = 0b0000_0011;
const INTENSITY_SHIFT: u16 = 2;
const INTENSITY_MASK: u16 = 0b0000_1100;
const PRECISION_BIT: u16 = 1 << 4;
const HOUSEKEEPING_BIT: u16 = 1 << 5;

/// Distance block type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DistanceType {
    Off,
    OneD,
    TwoD,
    ThreeD,
}

impl DistanceType {
    /// Parse from the two-bit field value
    pub fn from_bits(bits: u16) -> Self {
        match bits & DEPTH_MASK {
            0 => DistanceType::Off,
            1 => DistanceType::OneD,
            2 => DistanceType::TwoD,
            _ => DistanceType::ThreeD,
        }
    }

    pub fn to_bits(self) -> u16 {
        match self {
            DistanceType::Off => 0,
            DistanceType::OneD => 1,
            DistanceType::TwoD => 2,
            DistanceType::ThreeD => 3,
        }
    }

    /// Axes per point, 0 when the block is off
    pub fn axes(self) -> usize {
        self.to_bits() as usize
    }
}

/// Intensity block type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntensityType {
    Off,
    Absolute,
    Reflective,
}

impl IntensityType {
    /// Parse from the two-bit field value
    ///
    /// Returns `None` for the unassigned value 3.
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits & 0b11 {
            0 => Some(IntensityType::Off),
            1 => Some(IntensityType::Absolute),
            2 => Some(IntensityType::Reflective),
            _ => None,
        }
    }

    pub fn to_bits(self) -> u16 {
        match self {
            IntensityType::Off => 0,
            IntensityType::Absolute => 1,
            IntensityType::Reflective => 2,
        }
    }
}

/// DATATYPE field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataType(u16);

impl DataType {
    /// What the evaluation units send: 3-D distance only
    pub const DISTANCE_3D: DataType = DataType(3);

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Compose a tag from its parts
    pub fn new(
        depth: DistanceType,
        intensity: IntensityType,
        precision: bool,
        housekeeping: bool,
    ) -> Self {
        let mut bits = depth.to_bits() | (intensity.to_bits() << INTENSITY_SHIFT);
        if precision {
            bits |= PRECISION_BIT;
        }
        if housekeeping {
            bits |= HOUSEKEEPING_BIT;
        }
        Self(bits)
    }

    pub fn depth(self) -> DistanceType {
        DistanceType::from_bits(self.0)
    }

    pub fn intensity(self) -> Option<IntensityType> {
        IntensityType::from_bits((self.0 & INTENSITY_MASK) >> INTENSITY_SHIFT)
    }

    pub fn precision(self) -> bool {
        self.0 & PRECISION_BIT != 0
    }

    pub fn housekeeping(self) -> bool {
        self.0 & HOUSEKEEPING_BIT != 0
    }

    /// Returns true if the payload matches the fixed 3-D-only layout
    pub fn is_distance_3d_only(self) -> bool {
        self == Self::DISTANCE_3D
    }
}
