use core::{fmt, str::FromStr};

use crate::{
    error::CodecError,
    reader::NdrReader,
    traits::{NdrDecode, NdrEncode},
    writer::NdrWriter,
};

/// 128 位全局唯一标识，按 `u32-u16-u16-[u8; 8]` 的 NDR 结构布局编码。
///
/// 接口身份、对象 ID 与因果 ID 都使用该类型；`const fn` 构造函数允许在静态描述符中直接书写。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl Guid {
    pub const NIL: Guid = Guid::from_fields(0, 0, 0, [0; 8]);

    pub const fn from_fields(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1,
            data2,
            data3,
            data4,
        }
    }

    pub fn is_nil(&self) -> bool {
        *self == Self::NIL
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}

/// GUID 文本解析失败。
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid guid literal `{0}`")]
pub struct ParseGuidError(pub String);

impl FromStr for Guid {
    type Err = ParseGuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseGuidError(s.to_owned());
        let trimmed = s.trim_matches(|c| c == '{' || c == '}');
        let groups: Vec<&str> = trimmed.split('-').collect();
        let lengths = [8, 4, 4, 4, 12];
        if groups.len() != lengths.len()
            || groups
                .iter()
                .zip(lengths)
                .any(|(group, len)| group.len() != len)
        {
            return Err(invalid());
        }
        let data1 = u32::from_str_radix(groups[0], 16).map_err(|_| invalid())?;
        let data2 = u16::from_str_radix(groups[1], 16).map_err(|_| invalid())?;
        let data3 = u16::from_str_radix(groups[2], 16).map_err(|_| invalid())?;
        let tail = format!("{}{}", groups[3], groups[4]);
        let mut data4 = [0u8; 8];
        for (index, byte) in data4.iter_mut().enumerate() {
            let pair = tail.get(index * 2..index * 2 + 2).ok_or_else(invalid)?;
            *byte = u8::from_str_radix(pair, 16).map_err(|_| invalid())?;
        }
        Ok(Guid::from_fields(data1, data2, data3, data4))
    }
}

impl NdrEncode for Guid {
    fn encode(&self, writer: &mut NdrWriter) -> Result<(), CodecError> {
        writer.write_u32(self.data1);
        writer.write_u16(self.data2);
        writer.write_u16(self.data3);
        writer.write_bytes(&self.data4);
        Ok(())
    }
}

impl NdrDecode for Guid {
    const MIN_WIRE_SIZE: usize = 16;

    fn decode(reader: &mut NdrReader) -> Result<Self, CodecError> {
        let data1 = reader.read_u32()?;
        let data2 = reader.read_u16()?;
        let data3 = reader.read_u16()?;
        let tail = reader.read_bytes(8)?;
        let mut data4 = [0u8; 8];
        data4.copy_from_slice(&tail);
        Ok(Guid::from_fields(data1, data2, data3, data4))
    }
}
