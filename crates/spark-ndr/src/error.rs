//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 汇总 NDR 存根编解码过程中可能出现的全部失败形态，供分发层区分“客户端输入畸形”与“服务端产出违约”；
//! - 每个变体都映射到稳定错误码，日志与故障统计可以直接按码聚合。
//!
//! ## 设计要求（What）
//! - 解码失败只可能是 [`CodecError::Truncated`]、[`CodecError::Malformed`]、
//!   [`CodecError::UnsupportedVariant`] 或 [`CodecError::InvalidString`]；
//! - [`CodecError::ShapeViolation`] 只在编码期出现，表示待编码的值违反了记录声明的形状。

use std::borrow::Cow;

use thiserror::Error;

/// 稳定错误码集合，遵循 `<域>.<语义>` 命名约定。
pub mod codes {
    /// 输入在读取所需字节前耗尽。
    pub const TRUNCATED: &str = "ndr.truncated";
    /// 输入结构不合法（计数越界、偏移非零等）。
    pub const MALFORMED: &str = "ndr.malformed";
    /// 判别联合出现未定义的判别值。
    pub const UNSUPPORTED_VARIANT: &str = "ndr.unsupported_variant";
    /// 待编码的值违反声明形状。
    pub const SHAPE_VIOLATION: &str = "ndr.shape_violation";
    /// 宽字符串不是合法的 UTF-16。
    pub const INVALID_STRING: &str = "ndr.invalid_string";
}

/// NDR 编解码错误。
///
/// # 教案式说明
/// - **意图 (Why)**：让上层无需解析消息文本即可判定失败来源与责任方。
/// - **契约 (What)**：`offset` 均为相对存根起点的字节偏移；所有变体 `Send + Sync + 'static`。
/// - **设计权衡 (Trade-offs)**：`reason` 使用 `Cow<'static, str>`，常见路径零分配，
///   需要拼接上下文时才分配。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// 读取 `needed` 字节时只剩 `remaining` 字节。
    #[error("ndr stub truncated at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// 结构畸形。
    #[error("malformed ndr stub at offset {offset}: {reason}")]
    Malformed {
        offset: usize,
        reason: Cow<'static, str>,
    },

    /// 判别联合的判别值不在已知分支内。
    #[error("unsupported variant {discriminant} for {type_name}")]
    UnsupportedVariant {
        type_name: &'static str,
        discriminant: u32,
    },

    /// 编码期发现值与声明形状不符，属于服务端契约违规。
    #[error("value violates declared shape of `{field}`: {reason}")]
    ShapeViolation {
        field: &'static str,
        reason: Cow<'static, str>,
    },

    /// 宽字符串解码失败。
    #[error("invalid utf-16 string at offset {offset}")]
    InvalidString { offset: usize },
}

impl CodecError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::Truncated { .. } => codes::TRUNCATED,
            CodecError::Malformed { .. } => codes::MALFORMED,
            CodecError::UnsupportedVariant { .. } => codes::UNSUPPORTED_VARIANT,
            CodecError::ShapeViolation { .. } => codes::SHAPE_VIOLATION,
            CodecError::InvalidString { .. } => codes::INVALID_STRING,
        }
    }

    /// 构造畸形输入错误的便捷函数。
    pub fn malformed(offset: usize, reason: impl Into<Cow<'static, str>>) -> Self {
        CodecError::Malformed {
            offset,
            reason: reason.into(),
        }
    }

    /// 构造形状违规错误的便捷函数。
    pub fn shape_violation(field: &'static str, reason: impl Into<Cow<'static, str>>) -> Self {
        CodecError::ShapeViolation {
            field,
            reason: reason.into(),
        }
    }

    /// 是否属于编码期违规（服务端责任）。
    pub fn is_encode_side(&self) -> bool {
        matches!(self, CodecError::ShapeViolation { .. })
    }
}
