//! Frame encoding and decoding for the iLidar sensor stream.
//!
//! Frame format:
//! - SYNC (4 bytes): 0x5A 0xA5 0x5A 0xA5
//! - SIZE (4 bytes): payload size, always [`PAYLOAD_SIZE`]
//! - SEQ (2 bytes): sensor-assigned sequence number, wraps silently
//! - DATATYPE (2 bytes): packet content flags, see [`DataType`]
//! - TIMEPEAK, TIMEIMU (8 bytes each): seconds + microseconds
//! - POINTS (2880 bytes): 480 points of x, y, z as i16
//! - CHECKSUM (4 bytes): wrapping sum of SEQ through POINTS

use core::fmt;

use crate::datatype::DataType;

/// Frame synchronization pattern
pub const SYNC_PATTERN: [u8; 4] = [0x5A, 0xA5, 0x5A, 0xA5];

/// Number of points in the 3-D distance block
pub const MAX_POINTS: usize = 480;

/// Axes per point
pub const AXES: usize = 3;

pub const SYNC_LEN: usize = 4;
pub const SIZE_LEN: usize = 4;
pub const SEQ_LEN: usize = 2;
pub const DATATYPE_LEN: usize = 2;
pub const TIMESTAMP_LEN: usize = 8;
pub const CHECKSUM_LEN: usize = 4;

/// Size of the point block in bytes
pub const POINTS_LEN: usize = MAX_POINTS * AXES * 2;

/// Checksummed bytes: SEQ through the last point
pub const BODY_LEN: usize = SEQ_LEN + DATATYPE_LEN + 2 * TIMESTAMP_LEN + POINTS_LEN;

/// Value the SIZE field must carry: SEQ through CHECKSUM
pub const PAYLOAD_SIZE: usize = BODY_LEN + CHECKSUM_LEN;

/// Bytes between SEQ and CHECKSUM
pub const DATA_LEN: usize = PAYLOAD_SIZE - SEQ_LEN - CHECKSUM_LEN;

/// Complete frame on the wire
pub const FRAME_SIZE: usize = SYNC_LEN + SIZE_LEN + PAYLOAD_SIZE;

// Offsets within the body
const DATATYPE_OFFSET: usize = SEQ_LEN;
const TIME_PEAK_OFFSET: usize = DATATYPE_OFFSET + DATATYPE_LEN;
const TIME_IMU_OFFSET: usize = TIME_PEAK_OFFSET + TIMESTAMP_LEN;
const POINTS_OFFSET: usize = TIME_IMU_OFFSET + TIMESTAMP_LEN;

/// Errors that can occur during frame encoding or one-shot decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Fewer than [`FRAME_SIZE`] bytes supplied
    Truncated,
    /// Frame does not start with the sync pattern
    BadSync,
    /// SIZE field does not match the fixed payload size
    SizeMismatch { declared: u32 },
    /// Stored checksum disagrees with the bytes
    ChecksumMismatch { expected: u32, computed: u32 },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::BufferTooSmall => {
                write!(f, "buffer too small for a {} byte frame", FRAME_SIZE)
            }
            FrameError::Truncated => write!(f, "frame truncated"),
            FrameError::BadSync => write!(f, "missing sync pattern"),
            FrameError::SizeMismatch { declared } => {
                write!(f, "declared size {} != {}", declared, PAYLOAD_SIZE)
            }
            FrameError::ChecksumMismatch { expected, computed } => {
                write!(f, "checksum {:08x} != computed {:08x}", expected, computed)
            }
        }
    }
}

/// Wrapping 32-bit byte sum used as the frame checksum
pub fn checksum(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |sum, &byte| sum.wrapping_add(u32::from(byte)))
}

/// Sensor timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timestamp {
    pub seconds: u32,
    pub micros: u32,
}

impl Timestamp {
    pub const fn new(seconds: u32, micros: u32) -> Self {
        Self { seconds, micros }
    }

    /// Total microseconds
    pub fn as_micros(&self) -> u64 {
        u64::from(self.seconds) * 1_000_000 + u64::from(self.micros)
    }

    fn read(bytes: &[u8]) -> Self {
        Self {
            seconds: read_u32(&bytes[0..4]),
            micros: read_u32(&bytes[4..8]),
        }
    }

    fn write(&self, out: &mut [u8]) {
        out[0..4].copy_from_slice(&self.seconds.to_le_bytes());
        out[4..8].copy_from_slice(&self.micros.to_le_bytes());
    }
}

/// One 3-D distance sample, sensor units (mm)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0, z: 0 };

    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    pub const fn as_array(&self) -> [i16; AXES] {
        [self.x, self.y, self.z]
    }
}

/// A validated sensor frame
///
/// The sync pattern and SIZE field are implied by the type and not stored.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Sensor-assigned sequence number
    pub sequence: u16,
    /// Packet content flags
    pub datatype: DataType,
    /// Peak detection time
    pub time_peak: Timestamp,
    /// Inertial measurement sample time
    pub time_imu: Timestamp,
    /// 3-D distance samples
    pub points: [Point; MAX_POINTS],
    /// Checksum as carried on the wire
    pub checksum: u32,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            sequence: 0,
            datatype: DataType::default(),
            time_peak: Timestamp::default(),
            time_imu: Timestamp::default(),
            points: [Point::ORIGIN; MAX_POINTS],
            checksum: 0,
        }
    }
}

impl Frame {
    /// Create an all-zero 3-D frame with a valid checksum
    pub fn new(sequence: u16) -> Self {
        let mut frame = Self {
            sequence,
            datatype: DataType::DISTANCE_3D,
            ..Self::default()
        };
        frame.seal();
        frame
    }

    /// Build a frame from the checksummed body bytes and the wire checksum
    pub fn from_body(body: &[u8; BODY_LEN], checksum: u32) -> Self {
        let mut points = [Point::ORIGIN; MAX_POINTS];
        for (point, raw) in points
            .iter_mut()
            .zip(body[POINTS_OFFSET..].chunks_exact(AXES * 2))
        {
            *point = Point {
                x: read_i16(&raw[0..2]),
                y: read_i16(&raw[2..4]),
                z: read_i16(&raw[4..6]),
            };
        }

        Self {
            sequence: read_u16(&body[0..SEQ_LEN]),
            datatype: DataType::from_bits(read_u16(&body[DATATYPE_OFFSET..TIME_PEAK_OFFSET])),
            time_peak: Timestamp::read(&body[TIME_PEAK_OFFSET..TIME_IMU_OFFSET]),
            time_imu: Timestamp::read(&body[TIME_IMU_OFFSET..POINTS_OFFSET]),
            points,
            checksum,
        }
    }

    /// Serialize SEQ through POINTS
    pub fn write_body(&self, out: &mut [u8; BODY_LEN]) {
        out[0..SEQ_LEN].copy_from_slice(&self.sequence.to_le_bytes());
        out[DATATYPE_OFFSET..TIME_PEAK_OFFSET].copy_from_slice(&self.datatype.bits().to_le_bytes());
        self.time_peak.write(&mut out[TIME_PEAK_OFFSET..TIME_IMU_OFFSET]);
        self.time_imu.write(&mut out[TIME_IMU_OFFSET..POINTS_OFFSET]);
        for (point, raw) in self
            .points
            .iter()
            .zip(out[POINTS_OFFSET..].chunks_exact_mut(AXES * 2))
        {
            raw[0..2].copy_from_slice(&point.x.to_le_bytes());
            raw[2..4].copy_from_slice(&point.y.to_le_bytes());
            raw[4..6].copy_from_slice(&point.z.to_le_bytes());
        }
    }

    /// Checksum of the current field values
    pub fn compute_checksum(&self) -> u32 {
        let mut body = [0u8; BODY_LEN];
        self.write_body(&mut body);
        checksum(&body)
    }

    /// Recompute the checksum after editing fields
    pub fn seal(&mut self) {
        self.checksum = self.compute_checksum();
    }

    /// Check the stored checksum against the field values
    pub fn is_sealed(&self) -> bool {
        self.checksum == self.compute_checksum()
    }

    /// Encode this frame, sync pattern included, into a byte buffer
    ///
    /// The stored checksum is written as-is. Returns the number of bytes
    /// written.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        if buffer.len() < FRAME_SIZE {
            return Err(FrameError::BufferTooSmall);
        }

        let (header, rest) = buffer.split_at_mut(SYNC_LEN + SIZE_LEN);
        header[..SYNC_LEN].copy_from_slice(&SYNC_PATTERN);
        header[SYNC_LEN..].copy_from_slice(&(PAYLOAD_SIZE as u32).to_le_bytes());

        let body: &mut [u8; BODY_LEN] = (&mut rest[..BODY_LEN])
            .try_into()
            .map_err(|_| FrameError::BufferTooSmall)?;
        self.write_body(body);
        rest[BODY_LEN..PAYLOAD_SIZE].copy_from_slice(&self.checksum.to_le_bytes());

        Ok(FRAME_SIZE)
    }

    /// Decode one complete frame from the start of `bytes`
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < FRAME_SIZE {
            return Err(FrameError::Truncated);
        }
        if bytes[..SYNC_LEN] != SYNC_PATTERN {
            return Err(FrameError::BadSync);
        }

        let declared = read_u32(&bytes[SYNC_LEN..SYNC_LEN + SIZE_LEN]);
        if declared as usize != PAYLOAD_SIZE {
            return Err(FrameError::SizeMismatch { declared });
        }

        let start = SYNC_LEN + SIZE_LEN;
        let body: &[u8; BODY_LEN] = bytes[start..start + BODY_LEN]
            .try_into()
            .map_err(|_| FrameError::Truncated)?;
        let expected = read_u32(&bytes[start + BODY_LEN..start + PAYLOAD_SIZE]);
        let computed = checksum(body);
        if expected != computed {
            return Err(FrameError::ChecksumMismatch { expected, computed });
        }

        Ok(Self::from_body(body, expected))
    }
}

fn read_u16(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

fn read_i16(bytes: &[u8]) -> i16 {
    i16::from_le_bytes([bytes[0], bytes[1]])
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
