//! 原语、布尔、宽字符串、唯一指针、定长数组与一致数组的编解码实现。

use crate::{
    error::CodecError,
    reader::NdrReader,
    traits::{NdrDecode, NdrEncode},
    writer::NdrWriter,
};

macro_rules! impl_unsigned {
    ($($ty:ty => $write:ident, $read:ident;)*) => {
        $(
            impl NdrEncode for $ty {
                fn encode(&self, writer: &mut NdrWriter) -> Result<(), CodecError> {
                    writer.$write(*self);
                    Ok(())
                }
            }

            impl NdrDecode for $ty {
                const MIN_WIRE_SIZE: usize = core::mem::size_of::<$ty>();

                fn decode(reader: &mut NdrReader) -> Result<Self, CodecError> {
                    reader.$read()
                }
            }
        )*
    };
}

macro_rules! impl_signed {
    ($($ty:ty as $unsigned:ty;)*) => {
        $(
            impl NdrEncode for $ty {
                fn encode(&self, writer: &mut NdrWriter) -> Result<(), CodecError> {
                    (*self as $unsigned).encode(writer)
                }
            }

            impl NdrDecode for $ty {
                const MIN_WIRE_SIZE: usize = core::mem::size_of::<$ty>();

                fn decode(reader: &mut NdrReader) -> Result<Self, CodecError> {
                    Ok(<$unsigned>::decode(reader)? as $ty)
                }
            }
        )*
    };
}

impl_unsigned! {
    u8 => write_u8, read_u8;
    u16 => write_u16, read_u16;
    u32 => write_u32, read_u32;
    u64 => write_u64, read_u64;
}

impl_signed! {
    i8 as u8;
    i16 as u16;
    i32 as u32;
    i64 as u64;
}

/// NDR `boolean`：单字节，0 为假，非 0 为真。
impl NdrEncode for bool {
    fn encode(&self, writer: &mut NdrWriter) -> Result<(), CodecError> {
        writer.write_u8(u8::from(*self));
        Ok(())
    }
}

impl NdrDecode for bool {
    fn decode(reader: &mut NdrReader) -> Result<Self, CodecError> {
        Ok(reader.read_u8()? != 0)
    }
}

/// 一致数组：`u32` 最大计数后紧跟元素。
impl<T: NdrEncode> NdrEncode for Vec<T> {
    fn encode(&self, writer: &mut NdrWriter) -> Result<(), CodecError> {
        let count = u32::try_from(self.len()).map_err(|_| {
            CodecError::shape_violation("conformant array", "element count exceeds u32")
        })?;
        writer.write_u32(count);
        for item in self {
            item.encode(writer)?;
        }
        Ok(())
    }
}

impl<T: NdrDecode> NdrDecode for Vec<T> {
    const MIN_WIRE_SIZE: usize = 4;

    fn decode(reader: &mut NdrReader) -> Result<Self, CodecError> {
        let count = reader.read_u32()? as usize;
        reader.ensure_elements(count, T::MIN_WIRE_SIZE)?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(T::decode(reader)?);
        }
        Ok(items)
    }
}

/// 定长数组：元素依次编组，不带计数。
impl<T: NdrEncode, const N: usize> NdrEncode for [T; N] {
    fn encode(&self, writer: &mut NdrWriter) -> Result<(), CodecError> {
        for item in self {
            item.encode(writer)?;
        }
        Ok(())
    }
}

impl<T: NdrDecode, const N: usize> NdrDecode for [T; N] {
    const MIN_WIRE_SIZE: usize = N * T::MIN_WIRE_SIZE;

    fn decode(reader: &mut NdrReader) -> Result<Self, CodecError> {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(T::decode(reader)?);
        }
        items
            .try_into()
            .map_err(|_| CodecError::malformed(reader.position(), "fixed array length mismatch"))
    }
}

/// 唯一指针：非零引用 ID 后内联被引用值，0 表示空。
impl<T: NdrEncode> NdrEncode for Option<T> {
    fn encode(&self, writer: &mut NdrWriter) -> Result<(), CodecError> {
        match self {
            Some(value) => {
                let referent = writer.next_referent_id();
                writer.write_u32(referent);
                value.encode(writer)
            }
            None => {
                writer.write_u32(0);
                Ok(())
            }
        }
    }
}

impl<T: NdrDecode> NdrDecode for Option<T> {
    const MIN_WIRE_SIZE: usize = 4;

    fn decode(reader: &mut NdrReader) -> Result<Self, CodecError> {
        match reader.read_u32()? {
            0 => Ok(None),
            _ => T::decode(reader).map(Some),
        }
    }
}

/// 一致可变宽字符串：`max_count`、`offset`、`actual_count` 后跟 UTF-16 码元，包含结尾 NUL。
impl NdrEncode for String {
    fn encode(&self, writer: &mut NdrWriter) -> Result<(), CodecError> {
        encode_wide_buffer(self, self.encode_utf16().count() + 1, writer)
    }
}

/// 以 `capacity` 个码元写出宽字符串，文本之后以 NUL 补满。
///
/// 容量为 0 时只写出三个计数；容量不足以容纳文本与结尾 NUL 时返回形状违约。
pub(crate) fn encode_wide_buffer(
    text: &str,
    capacity: usize,
    writer: &mut NdrWriter,
) -> Result<(), CodecError> {
    let units: Vec<u16> = text.encode_utf16().collect();
    if capacity != 0 && capacity <= units.len() {
        return Err(CodecError::shape_violation(
            "wide string",
            "buffer capacity leaves no room for the terminator",
        ));
    }
    if capacity == 0 && !units.is_empty() {
        return Err(CodecError::shape_violation(
            "wide string",
            "non-empty text needs a non-zero buffer",
        ));
    }
    let count = u32::try_from(capacity)
        .map_err(|_| CodecError::shape_violation("wide string", "length exceeds u32"))?;
    writer.write_u32(count);
    writer.write_u32(0);
    writer.write_u32(count);
    for unit in units.iter().copied().chain(core::iter::repeat(0)).take(capacity) {
        writer.write_u16(unit);
    }
    Ok(())
}

impl NdrDecode for String {
    const MIN_WIRE_SIZE: usize = 12;

    fn decode(reader: &mut NdrReader) -> Result<Self, CodecError> {
        let max_count = reader.read_u32()?;
        let offset = reader.read_u32()?;
        let actual_count = reader.read_u32()?;
        if offset != 0 {
            return Err(CodecError::malformed(
                reader.position(),
                "varying string offset must be zero",
            ));
        }
        if actual_count > max_count {
            return Err(CodecError::malformed(
                reader.position(),
                "varying string actual count exceeds max count",
            ));
        }
        let start = reader.position();
        reader.ensure_elements(actual_count as usize, 2)?;
        let mut units = Vec::with_capacity(actual_count as usize);
        for _ in 0..actual_count {
            units.push(reader.read_u16()?);
        }
        while units.last() == Some(&0) {
            units.pop();
        }
        String::from_utf16(&units).map_err(|_| CodecError::InvalidString { offset: start })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn roundtrip<T: NdrEncode + NdrDecode + PartialEq + core::fmt::Debug>(value: T) {
        let mut writer = NdrWriter::new();
        value.encode(&mut writer).unwrap();
        let bytes = writer.into_bytes();
        let mut reader = NdrReader::new(bytes.clone());
        assert_eq!(T::decode(&mut reader).unwrap(), value);
        assert_eq!(reader.position(), bytes.len());
    }

    #[test]
    fn wide_string_carries_terminator() {
        let mut writer = NdrWriter::new();
        "C:".to_string().encode(&mut writer).unwrap();
        let bytes = writer.into_bytes();
        // max_count=3, offset=0, actual_count=3, 'C' ':' NUL
        assert_eq!(
            &bytes[..],
            &[3, 0, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0, b'C', 0, b':', 0, 0, 0]
        );
        roundtrip("C:".to_string());
        roundtrip(String::new());
    }

    #[test]
    fn padded_wide_buffer_trims_every_trailing_nul() {
        let mut writer = NdrWriter::new();
        encode_wide_buffer("C:", 5, &mut writer).unwrap();
        let bytes = writer.into_bytes();
        assert_eq!(&bytes[..4], &[5, 0, 0, 0]);
        assert_eq!(bytes.len(), 12 + 5 * 2);
        assert_eq!(String::decode(&mut NdrReader::new(bytes)).unwrap(), "C:");

        // L"" 只携带一个 NUL。
        let only_nul = Bytes::from_static(&[1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0]);
        assert_eq!(String::decode(&mut NdrReader::new(only_nul)).unwrap(), "");
    }

    #[test]
    fn wide_buffer_without_room_for_terminator_is_rejected() {
        let mut writer = NdrWriter::new();
        assert!(encode_wide_buffer("C:", 2, &mut writer).unwrap_err().is_encode_side());
        let mut writer = NdrWriter::new();
        encode_wide_buffer("", 0, &mut writer).unwrap();
        assert_eq!(writer.into_bytes().len(), 12);
    }

    #[test]
    fn nonzero_string_offset_is_malformed() {
        let stub = Bytes::from_static(&[1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 0, 0]);
        let err = String::decode(&mut NdrReader::new(stub)).unwrap_err();
        assert_eq!(err.code(), "ndr.malformed");
    }

    #[test]
    fn unique_pointer_null_and_present() {
        roundtrip::<Option<u32>>(None);
        roundtrip(Some(0xDEAD_BEEFu32));
        roundtrip(Some(vec![1i64, -2, 3]));
    }

    #[test]
    fn huge_array_count_is_truncated_not_allocated() {
        let stub = Bytes::from_static(&[0xFF, 0xFF, 0xFF, 0x7F, 0, 0, 0, 0]);
        let err = Vec::<u64>::decode(&mut NdrReader::new(stub)).unwrap_err();
        assert_eq!(err.code(), "ndr.truncated");
    }

    #[test]
    fn fixed_arrays_carry_no_count() {
        let mut writer = NdrWriter::new();
        [1u16, 2, 3].encode(&mut writer).unwrap();
        assert_eq!(writer.len(), 6);
        roundtrip([0x41u16; 8]);
    }

    #[test]
    fn signed_values_survive() {
        roundtrip(-1i32);
        roundtrip(i64::MIN);
        roundtrip(true);
        roundtrip(false);
    }
}
