//! Per-attribute value codecs used by the sequential attributes decoder.
//!
//! Every payload starts with a varint value count followed by
//! codec-specific data:
//!
//! ```text
//! generic      : count * stride raw little-endian bytes
//! integer      : u8 prediction (0 none, 1 delta), count * components zig-zag varints
//! quantization : u8 bits, components * f32 min, f32 range, count * components varints
//! ```

use crate::core::DecoderBuffer;
use crate::geometry::PointAttribute;
use crate::util::{DataType, Error, Result};

/// Value codec selected per attribute in the decoder descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SequentialDecoderType {
    Generic = 0,
    Integer = 1,
    Quantization = 2,
}

impl SequentialDecoderType {
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Generic),
            1 => Some(Self::Integer),
            2 => Some(Self::Quantization),
            _ => None,
        }
    }
}

/// Integer prediction applied before zig-zag coding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Prediction {
    None,
    /// Each component is stored as the difference to the previous value.
    Delta,
}

/// Decodes the values of one attribute and keeps its portable form.
///
/// The portable attribute holds the values as they were stored in the
/// stream before any transform back to the original format (for quantized
/// attributes: the integer codes).
#[derive(Clone, Debug)]
pub struct SequentialAttributeDecoder {
    decoder_type: SequentialDecoderType,
    portable: PointAttribute,
}

impl SequentialAttributeDecoder {
    /// Create the decoder for `attribute`, checking the codec fits its type.
    pub fn new(decoder_type: SequentialDecoderType, attribute: &PointAttribute) -> Result<Self> {
        let data_type = attribute.data_type();
        let portable = match decoder_type {
            SequentialDecoderType::Generic => PointAttribute::empty_like(attribute),
            SequentialDecoderType::Integer => {
                if !data_type.is_integral() {
                    return Err(Error::invalid(format!("integer codec cannot decode {data_type} values")));
                }
                PointAttribute::empty_like(attribute)
            }
            SequentialDecoderType::Quantization => {
                if data_type != DataType::Float32 {
                    return Err(Error::invalid(format!("quantization codec cannot decode {data_type} values")));
                }
                let mut portable = PointAttribute::empty_like(attribute);
                portable.reset_layout(DataType::Uint32, attribute.num_components());
                portable
            }
        };
        Ok(Self { decoder_type, portable })
    }

    pub fn decoder_type(&self) -> SequentialDecoderType {
        self.decoder_type
    }

    pub fn portable(&self) -> &PointAttribute {
        &self.portable
    }

    /// Decode one payload into `attribute`.
    ///
    /// With `skip_transform` the attribute receives the portable values
    /// instead of the values transformed back to the original format.
    pub fn decode_values(
        &mut self,
        buffer: &mut DecoderBuffer<'_>,
        attribute: &mut PointAttribute,
        skip_transform: bool,
    ) -> Result<()> {
        let num_values = buffer.decode_varint_u32()? as usize;
        let num_components = attribute.num_components() as usize;
        let num_entries = num_values
            .checked_mul(num_components)
            .filter(|&n| n <= buffer.remaining_size())
            .ok_or_else(|| {
                Error::invalid(format!("{num_values} values do not fit in the remaining payload"))
            })?;

        match self.decoder_type {
            SequentialDecoderType::Generic => {
                let bytes = buffer.decode_bytes(num_values * attribute.byte_stride())?;
                attribute.set_data(bytes.to_vec())?;
                self.portable.set_data(bytes.to_vec())?;
            }
            SequentialDecoderType::Integer => {
                let data = decode_integers(buffer, attribute.data_type(), num_entries, num_components)?;
                attribute.set_data(data.clone())?;
                self.portable.set_data(data)?;
            }
            SequentialDecoderType::Quantization => {
                self.decode_quantized(buffer, attribute, num_entries, skip_transform)?;
            }
        }
        tracing::trace!(
            codec = ?self.decoder_type,
            num_values,
            unique_id = attribute.unique_id(),
            "decoded attribute values"
        );
        Ok(())
    }

    fn decode_quantized(
        &mut self,
        buffer: &mut DecoderBuffer<'_>,
        attribute: &mut PointAttribute,
        num_entries: usize,
        skip_transform: bool,
    ) -> Result<()> {
        let num_components = attribute.num_components() as usize;
        let bits = buffer.decode_u8()?;
        if !(1..=30).contains(&bits) {
            return Err(Error::invalid(format!("invalid quantization bits {bits}")));
        }
        let mut min_values = Vec::with_capacity(num_components);
        for _ in 0..num_components {
            min_values.push(buffer.decode_f32()?);
        }
        let range = buffer.decode_f32()?;
        if !range.is_finite() || range < 0.0 {
            return Err(Error::invalid(format!("invalid quantization range {range}")));
        }

        let max_quantized = (1u32 << bits) - 1;
        let mut codes = Vec::with_capacity(num_entries);
        for _ in 0..num_entries {
            let code = buffer.decode_varint_u32()?;
            if code > max_quantized {
                return Err(Error::invalid(format!("quantized value {code} exceeds {bits} bits")));
            }
            codes.push(code);
        }
        self.portable.set_data(bytemuck::cast_slice(&codes).to_vec())?;

        if skip_transform {
            attribute.reset_layout(DataType::Uint32, attribute.num_components());
            return attribute.set_data(self.portable.data().to_vec());
        }
        let delta = range / max_quantized as f32;
        let values: Vec<f32> = codes
            .iter()
            .enumerate()
            .map(|(i, &q)| q as f32 * delta + min_values[i % num_components])
            .collect();
        attribute.set_data(bytemuck::cast_slice(&values).to_vec())
    }
}

fn decode_integers(
    buffer: &mut DecoderBuffer<'_>,
    data_type: DataType,
    num_entries: usize,
    num_components: usize,
) -> Result<Vec<u8>> {
    let prediction = match buffer.decode_u8()? {
        0 => Prediction::None,
        1 => Prediction::Delta,
        other => return Err(Error::invalid(format!("unknown integer prediction {other}"))),
    };
    let (lo, hi) = data_type
        .integral_range()
        .ok_or_else(|| Error::invalid(format!("{data_type} is not an integer type")))?;

    let mut previous = vec![0i128; num_components];
    let mut out = Vec::with_capacity(num_entries * data_type.num_bytes());
    for i in 0..num_entries {
        let symbol = i128::from(buffer.decode_signed_varint()?);
        let value = match prediction {
            Prediction::None => symbol,
            Prediction::Delta => previous[i % num_components] + symbol,
        };
        if value < lo || value > hi {
            return Err(Error::invalid(format!("value {value} out of range for {data_type}")));
        }
        previous[i % num_components] = value;
        push_integral(&mut out, data_type, value);
    }
    Ok(out)
}

/// Append `value` (already range checked) in the width of `data_type`.
fn push_integral(out: &mut Vec<u8>, data_type: DataType, value: i128) {
    match data_type {
        DataType::Int8 => out.extend_from_slice(&(value as i8).to_le_bytes()),
        DataType::Uint8 | DataType::Bool => out.push(value as u8),
        DataType::Int16 => out.extend_from_slice(&(value as i16).to_le_bytes()),
        DataType::Uint16 => out.extend_from_slice(&(value as u16).to_le_bytes()),
        DataType::Int32 => out.extend_from_slice(&(value as i32).to_le_bytes()),
        DataType::Uint32 => out.extend_from_slice(&(value as u32).to_le_bytes()),
        DataType::Int64 => out.extend_from_slice(&(value as i64).to_le_bytes()),
        DataType::Uint64 => out.extend_from_slice(&(value as u64).to_le_bytes()),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryAttributeType;

    fn attribute(data_type: DataType, num_components: u8) -> PointAttribute {
        PointAttribute::new(GeometryAttributeType::Generic, data_type, num_components, false)
    }

    #[test]
    fn test_generic_values() {
        let mut att = attribute(DataType::Uint8, 3);
        let mut dec = SequentialAttributeDecoder::new(SequentialDecoderType::Generic, &att).unwrap();
        let data = [2u8, 10, 20, 30, 40, 50, 60, 0xee];
        let mut buf = DecoderBuffer::new(&data);
        dec.decode_values(&mut buf, &mut att, false).unwrap();
        assert_eq!(att.data(), &[10, 20, 30, 40, 50, 60]);
        assert_eq!(dec.portable().data(), att.data());
        assert_eq!(buf.remaining_size(), 1);
    }

    #[test]
    fn test_integer_delta_values() {
        let mut att = attribute(DataType::Int16, 1);
        let mut dec = SequentialAttributeDecoder::new(SequentialDecoderType::Integer, &att).unwrap();
        // 3 values, delta prediction, symbols +5, -2 (3), +4 (8)
        let data = [3u8, 1, 10, 3, 8];
        dec.decode_values(&mut DecoderBuffer::new(&data), &mut att, false).unwrap();
        assert_eq!(att.values::<i16>().unwrap(), vec![5, 3, 7]);
    }

    #[test]
    fn test_integer_range_check() {
        let mut att = attribute(DataType::Uint8, 1);
        let mut dec = SequentialAttributeDecoder::new(SequentialDecoderType::Integer, &att).unwrap();
        // one value, no prediction, symbol -1
        let data = [1u8, 0, 1];
        assert!(dec.decode_values(&mut DecoderBuffer::new(&data), &mut att, false).is_err());
    }

    #[test]
    fn test_codec_type_compatibility() {
        assert!(SequentialAttributeDecoder::new(SequentialDecoderType::Integer, &attribute(DataType::Float32, 3)).is_err());
        assert!(SequentialAttributeDecoder::new(SequentialDecoderType::Quantization, &attribute(DataType::Int32, 3)).is_err());
        assert!(SequentialDecoderType::from_u8(3).is_none());
    }

    fn quantized_payload() -> Vec<u8> {
        let mut data = vec![2u8, 8];
        data.extend_from_slice(&1.0f32.to_le_bytes());
        data.extend_from_slice(&(-1.0f32).to_le_bytes());
        data.extend_from_slice(&255.0f32.to_le_bytes());
        // codes (0, 255), (0x7f, 1)
        data.extend_from_slice(&[0, 0xff, 0x01, 0x7f, 0x01]);
        data
    }

    #[test]
    fn test_quantized_values() {
        let mut att = attribute(DataType::Float32, 2);
        let mut dec = SequentialAttributeDecoder::new(SequentialDecoderType::Quantization, &att).unwrap();
        dec.decode_values(&mut DecoderBuffer::new(&quantized_payload()), &mut att, false).unwrap();
        assert_eq!(att.values::<f32>().unwrap(), vec![1.0, 254.0, 128.0, 0.0]);
        assert_eq!(dec.portable().data_type(), DataType::Uint32);
        assert_eq!(dec.portable().values::<u32>().unwrap(), vec![0, 255, 127, 1]);
    }

    #[test]
    fn test_quantized_skip_transform() {
        let mut att = attribute(DataType::Float32, 2);
        let mut dec = SequentialAttributeDecoder::new(SequentialDecoderType::Quantization, &att).unwrap();
        dec.decode_values(&mut DecoderBuffer::new(&quantized_payload()), &mut att, true).unwrap();
        assert_eq!(att.data_type(), DataType::Uint32);
        assert_eq!(att.values::<u32>().unwrap(), vec![0, 255, 127, 1]);
    }

    #[test]
    fn test_value_count_bounded_by_payload() {
        let mut att = attribute(DataType::Float32, 3);
        let mut dec = SequentialAttributeDecoder::new(SequentialDecoderType::Generic, &att).unwrap();
        let data = [0xffu8, 0xff, 0x03, 0, 0];
        assert!(dec.decode_values(&mut DecoderBuffer::new(&data), &mut att, false).is_err());
    }
}
