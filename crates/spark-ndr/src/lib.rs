//! spark-ndr：DCE/RPC 存根的 NDR 风格编解码能力。
//!
//! # 设计意图（Why）
//! - 分发层把“类型化记录 ⇄ 字节存根”视为外部能力，本 crate 以最小接口提供该能力：
//!   [`encode`] 生成存根，[`decode`] 还原记录并报告消费的字节数；
//! - 记录通过 `#[derive(Ndr)]` 获得逐字段编解码与静态 [`RecordShape`]，
//!   操作描述符在编译期即可引用请求/响应形状。
//!
//! # 线格式约定（What）
//! - 小端序，原语按自身宽度相对存根起点对齐；
//! - `Vec<T>` 为一致数组（`u32` 计数 + 元素）；`Option<T>` 为唯一指针（引用 ID + 内联值）；
//! - `String` 为一致可变 UTF-16 字符串，包含结尾 NUL；
//! - 被引用值内联在指针之后，不做延迟编组。
//!
//! # 风险提示（Trade-offs）
//! - 内联被引用值使编码实现保持单趟，代价是与严格 NDR 的延迟指针布局不完全一致；
//!   与外部实现互通时需在传输适配层转换。

extern crate self as spark_ndr;

pub mod error;
mod guid;
mod primitives;
pub mod reader;
pub mod size_is;
pub mod traits;
pub mod writer;

pub use bytes::Bytes;
pub use error::CodecError;
pub use guid::{Guid, ParseGuidError};
pub use reader::NdrReader;
pub use spark_ndr_derive::Ndr;
pub use traits::{FieldShape, NdrDecode, NdrEncode, NdrRecord, RecordShape};
pub use writer::NdrWriter;

/// 将值编码为独立存根。
pub fn encode<T: NdrEncode + ?Sized>(value: &T) -> Result<Bytes, CodecError> {
    let mut writer = NdrWriter::new();
    value.encode(&mut writer)?;
    Ok(writer.into_bytes())
}

/// 从存根起点解码一个值，返回值与消费的字节数。
///
/// 存根末尾的多余字节不视为错误，调用方可根据消费长度自行决定是否拒绝。
pub fn decode<T: NdrDecode>(stub: Bytes) -> Result<(T, usize), CodecError> {
    let mut reader = NdrReader::new(stub);
    let value = T::decode(&mut reader)?;
    Ok((value, reader.position()))
}
