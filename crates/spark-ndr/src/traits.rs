//! 编解码能力的泛型契约。
//!
//! # 设计背景（Why）
//! - 分发层只关心“某个记录能否写成存根、能否从存根还原”，编解码细节被压缩为两个小 trait；
//! - 每个记录同时通过 [`NdrRecord`] 暴露静态形状，操作描述符据此声明请求/响应的字段布局，
//!   无需运行期反射。
//!
//! # 契约说明（What）
//! - `encode` 只追加字节，不回写已写出的内容；失败时写入器内容视为作废；
//! - `decode` 只消费自身所需字节；失败时游标位置不作保证；
//! - `MIN_WIRE_SIZE` 是该类型在线上至少占用的字节数，用于数组分配前的数量校验，
//!   允许保守低估但不得高估。

use crate::{error::CodecError, reader::NdrReader, writer::NdrWriter};

/// 可编码为 NDR 存根片段的类型。
pub trait NdrEncode {
    fn encode(&self, writer: &mut NdrWriter) -> Result<(), CodecError>;
}

/// 可从 NDR 存根片段还原的类型。
pub trait NdrDecode: Sized {
    /// 线上最小占用字节数。
    const MIN_WIRE_SIZE: usize = 1;

    fn decode(reader: &mut NdrReader) -> Result<Self, CodecError>;
}

/// 具备静态字段形状的记录。
pub trait NdrRecord {
    const SHAPE: RecordShape;
}

/// 记录形状：记录名与按线序排列的字段。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordShape {
    pub name: &'static str,
    pub fields: &'static [FieldShape],
}

impl RecordShape {
    /// 按名称查找字段。
    pub fn field(&self, name: &str) -> Option<&'static FieldShape> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// 单个字段的名称与线类型。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldShape {
    pub name: &'static str,
    pub wire_type: &'static str,
}
