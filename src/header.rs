//! Container header layout.
//!
//! The header is a fixed sequence of little-endian fields. Each [`Layout`]
//! declares that sequence once as a table of [`Field`]s; sizes and offsets
//! are always derived from the table.

/// Format identifier, null padded to 16 bytes.
pub const MAGIC: [u8; 16] = *b"xgcode 1.0\n\0\0\0\0\0";

/// Serialized header size of the default [`Layout::Compact`].
pub const HEADER_SIZE: usize = Layout::Compact.size();

/// A single header field, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Magic,
    Image1Offset,
    Image2Offset,
    PayloadOffset,
    PrintTime,
    FilamentLength,
    Reserved32,
    ShellCount,
    PrintSpeed,
    BedTemperature,
    Extruder1Temperature,
    Extruder2Temperature,
    Reserved16,
}

impl Field {
    /// Width of the field in bytes.
    pub const fn width(self) -> usize {
        match self {
            Self::Magic => 16,
            Self::Image1Offset
            | Self::Image2Offset
            | Self::PayloadOffset
            | Self::PrintTime
            | Self::FilamentLength
            | Self::Reserved32 => 4,
            Self::ShellCount
            | Self::PrintSpeed
            | Self::BedTemperature
            | Self::Extruder1Temperature
            | Self::Extruder2Temperature
            | Self::Reserved16 => 2,
        }
    }
}

const COMPACT_FIELDS: &[Field] = &[
    Field::Magic,
    Field::Image1Offset,
    Field::Image2Offset,
    Field::PayloadOffset,
    Field::PrintTime,
    Field::FilamentLength,
    Field::Reserved32,
    Field::Reserved32,
    Field::ShellCount,
    Field::PrintSpeed,
    Field::BedTemperature,
    Field::Extruder1Temperature,
    Field::Extruder2Temperature,
];

const PADDED_FIELDS: &[Field] = &[
    Field::Magic,
    Field::Image1Offset,
    Field::Image2Offset,
    Field::PayloadOffset,
    Field::PrintTime,
    Field::FilamentLength,
    Field::Reserved32,
    Field::Reserved32,
    Field::Reserved16,
    Field::ShellCount,
    Field::PrintSpeed,
    Field::BedTemperature,
    Field::Extruder1Temperature,
    Field::Extruder2Temperature,
    Field::Reserved16,
];

/// Header revision.
///
/// `Compact` is the 54 byte header. `Padded` is the 58 byte header written
/// by the Cura plug-in, which carries an extra reserved `u16` in front of
/// the shell count and another one at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Compact,
    Padded,
}

impl Default for Layout {
    fn default() -> Self {
        Self::Compact
    }
}

impl Layout {
    /// Fields of this layout in wire order.
    pub const fn fields(self) -> &'static [Field] {
        match self {
            Self::Compact => COMPACT_FIELDS,
            Self::Padded => PADDED_FIELDS,
        }
    }

    /// Serialized header size, the sum of all field widths.
    pub const fn size(self) -> usize {
        let fields = self.fields();
        let mut size = 0;
        let mut i = 0;
        while i < fields.len() {
            size += fields[i].width();
            i += 1;
        }
        size
    }

    /// Byte offset of the first occurrence of `field`.
    pub fn offset_of(self, field: Field) -> Option<usize> {
        let mut offset = 0;
        for f in self.fields() {
            if *f == field {
                return Some(offset);
            }
            offset += f.width();
        }
        None
    }
}

/// Header values for one container. Reserved fields are not stored; they
/// are always written as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub image1_offset: u32,
    pub image2_offset: u32,
    pub payload_offset: u32,
    pub print_time: u32,
    pub filament_length: u32,
    pub shell_count: u16,
    pub print_speed: u16,
    pub bed_temperature: u16,
    pub extruder1_temperature: u16,
    pub extruder2_temperature: u16,
}

impl Header {
    /// Pack the header in `layout` order, little-endian, without padding.
    pub fn to_bytes(&self, layout: Layout) -> Vec<u8> {
        let mut buf: Vec<u8> = Vec::with_capacity(layout.size());

        for field in layout.fields() {
            match field {
                Field::Magic => buf.extend_from_slice(&MAGIC),
                Field::Image1Offset => buf.extend_from_slice(&self.image1_offset.to_le_bytes()),
                Field::Image2Offset => buf.extend_from_slice(&self.image2_offset.to_le_bytes()),
                Field::PayloadOffset => buf.extend_from_slice(&self.payload_offset.to_le_bytes()),
                Field::PrintTime => buf.extend_from_slice(&self.print_time.to_le_bytes()),
                Field::FilamentLength => {
                    buf.extend_from_slice(&self.filament_length.to_le_bytes())
                }
                Field::Reserved32 => buf.extend_from_slice(&0u32.to_le_bytes()),
                Field::ShellCount => buf.extend_from_slice(&self.shell_count.to_le_bytes()),
                Field::PrintSpeed => buf.extend_from_slice(&self.print_speed.to_le_bytes()),
                Field::BedTemperature => {
                    buf.extend_from_slice(&self.bed_temperature.to_le_bytes())
                }
                Field::Extruder1Temperature => {
                    buf.extend_from_slice(&self.extruder1_temperature.to_le_bytes())
                }
                Field::Extruder2Temperature => {
                    buf.extend_from_slice(&self.extruder2_temperature.to_le_bytes())
                }
                Field::Reserved16 => buf.extend_from_slice(&0u16.to_le_bytes()),
            }
        }

        buf
    }
}
