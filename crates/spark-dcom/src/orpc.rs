//! ORPC 调用扩展：每个 DCOM 请求以 [`OrpcThis`] 开头，每个响应以 [`OrpcThat`] 开头。
//!
//! # 契约说明（What）
//! - `OrpcThis`/`OrpcThat` 对分发层是普通字段，处理器可读可写，分发器不解释；
//! - 扩展数组的两处“对齐计数”由手写编解码维护：扩展数据按 8 字节补齐，
//!   扩展槽位数按 2 补齐，补齐槽位为空指针；
//! - 解码时补齐计数与声明计数不一致视为畸形存根。

use spark_ndr::{CodecError, Guid, Ndr, NdrDecode, NdrEncode, NdrReader, NdrWriter};

/// 调用未携带任何标志。
pub const ORPCF_NULL: u32 = 0x0000_0000;
/// 调用来自本机。
pub const ORPCF_LOCAL: u32 = 0x0000_0001;
pub const ORPCF_RESERVED1: u32 = 0x0000_0002;
pub const ORPCF_RESERVED2: u32 = 0x0000_0004;
pub const ORPCF_RESERVED3: u32 = 0x0000_0008;
pub const ORPCF_RESERVED4: u32 = 0x0000_0010;

/// DCOM 协议版本。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Ndr)]
pub struct ComVersion {
    pub major_version: u16,
    pub minor_version: u16,
}

impl ComVersion {
    /// 当前实现声明的协议版本 5.7。
    pub const CURRENT: ComVersion = ComVersion {
        major_version: 5,
        minor_version: 7,
    };
}

impl Default for ComVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

/// 请求侧调用扩展。
#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct OrpcThis {
    pub version: ComVersion,
    pub flags: u32,
    pub reserved1: u32,
    /// 因果标识，同一逻辑调用链上的调用共享。
    pub cid: Guid,
    pub extensions: Option<OrpcExtentArray>,
}

impl OrpcThis {
    pub fn with_cid(cid: Guid) -> Self {
        Self {
            cid,
            ..Self::default()
        }
    }
}

/// 响应侧调用扩展。
#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct OrpcThat {
    pub flags: u32,
    pub extensions: Option<OrpcExtentArray>,
}

/// 编组后的接口指针（OBJREF 字节流）。
#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct MInterfacePointer {
    pub data_count: u32,
    #[ndr(size_is = data_count)]
    pub data: Vec<u8>,
}

impl MInterfacePointer {
    /// 长度超出 `u32` 时计数饱和为 `u32::MAX`，编码期由 `size_is` 校验报告违约。
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data_count: saturating_count(data.len()),
            data,
        }
    }
}

fn saturating_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// 单个调用扩展：扩展标识与不透明数据。
///
/// 线上 `size` 为 `data` 的实际长度，数据数组按 8 字节补齐后编组。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrpcExtent {
    pub id: Guid,
    pub data: Vec<u8>,
}

fn round_up(value: u32, multiple: u32) -> Option<u32> {
    value
        .checked_add(multiple - 1)
        .map(|padded| padded & !(multiple - 1))
}

impl NdrEncode for OrpcExtent {
    fn encode(&self, writer: &mut NdrWriter) -> Result<(), CodecError> {
        let size = u32::try_from(self.data.len())
            .map_err(|_| CodecError::shape_violation("OrpcExtent.data", "length exceeds u32"))?;
        let padded = round_up(size, 8).ok_or_else(|| {
            CodecError::shape_violation("OrpcExtent.data", "padded length exceeds u32")
        })?;
        self.id.encode(writer)?;
        writer.write_u32(size);
        writer.write_u32(padded);
        writer.write_bytes(&self.data);
        for _ in size..padded {
            writer.write_u8(0);
        }
        Ok(())
    }
}

impl NdrDecode for OrpcExtent {
    const MIN_WIRE_SIZE: usize = 24;

    fn decode(reader: &mut NdrReader) -> Result<Self, CodecError> {
        let id = Guid::decode(reader)?;
        let size = reader.read_u32()?;
        let count = reader.read_u32()?;
        if round_up(size, 8) != Some(count) {
            return Err(CodecError::malformed(
                reader.position(),
                "extent array count must be size rounded up to 8",
            ));
        }
        reader.ensure_elements(count as usize, 1)?;
        let padded = reader.read_bytes(count as usize)?;
        Ok(Self {
            id,
            data: padded[..size as usize].to_vec(),
        })
    }
}

/// 调用扩展数组。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrpcExtentArray {
    pub extents: Vec<OrpcExtent>,
}

impl NdrEncode for OrpcExtentArray {
    fn encode(&self, writer: &mut NdrWriter) -> Result<(), CodecError> {
        let size = u32::try_from(self.extents.len()).map_err(|_| {
            CodecError::shape_violation("OrpcExtentArray.extents", "length exceeds u32")
        })?;
        let slots = round_up(size, 2).ok_or_else(|| {
            CodecError::shape_violation("OrpcExtentArray.extents", "slot count exceeds u32")
        })?;
        writer.write_u32(size);
        writer.write_u32(0);
        writer.write_u32(slots);
        for extent in &self.extents {
            let referent = writer.next_referent_id();
            writer.write_u32(referent);
            extent.encode(writer)?;
        }
        for _ in size..slots {
            writer.write_u32(0);
        }
        Ok(())
    }
}

impl NdrDecode for OrpcExtentArray {
    const MIN_WIRE_SIZE: usize = 12;

    fn decode(reader: &mut NdrReader) -> Result<Self, CodecError> {
        let size = reader.read_u32()?;
        let _reserved = reader.read_u32()?;
        let slots = reader.read_u32()?;
        if round_up(size, 2) != Some(slots) {
            return Err(CodecError::malformed(
                reader.position(),
                "extent slot count must be size rounded up to 2",
            ));
        }
        reader.ensure_elements(slots as usize, 4)?;
        // 每个非空槽位至少携带引用标识与一个最短扩展。
        reader.ensure_elements(size as usize, 4 + OrpcExtent::MIN_WIRE_SIZE)?;
        let mut extents = Vec::with_capacity(size as usize);
        for _ in 0..slots {
            if reader.read_u32()? == 0 {
                continue;
            }
            if extents.len() == size as usize {
                return Err(CodecError::malformed(
                    reader.position(),
                    "more extents than the declared size",
                ));
            }
            extents.push(OrpcExtent::decode(reader)?);
        }
        Ok(Self { extents })
    }
}
