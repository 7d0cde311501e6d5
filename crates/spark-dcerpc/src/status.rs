//! 操作级状态：随响应载荷返回的 `HRESULT` 与处理器失败类型。
//!
//! # 设计背景（Why）
//! - 绝大多数操作失败以状态字段的形式写在响应记录里，传输层看到的是一次成功的调用；
//! - 处理器以 [`OperationError`] 表达失败，分发器把它转换为接口声明的携带错误的响应形状，
//!   与成功响应走完全相同的编码路径。

use core::fmt;

use spark_ndr::Ndr;
use thiserror::Error;

/// COM/RPC 状态码，高位为 1 表示失败。
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Ndr)]
pub struct Hresult(pub i32);

impl Hresult {
    pub const S_OK: Hresult = Hresult(0);
    pub const S_FALSE: Hresult = Hresult(1);
    /// 操作未实现，默认处理器集的规范返回值。
    pub const E_NOTIMPL: Hresult = Hresult::from_bits(0x8000_4001);
    pub const E_FAIL: Hresult = Hresult::from_bits(0x8000_4005);
    pub const E_ACCESSDENIED: Hresult = Hresult::from_bits(0x8007_0005);
    pub const E_OUTOFMEMORY: Hresult = Hresult::from_bits(0x8007_000E);
    pub const E_INVALIDARG: Hresult = Hresult::from_bits(0x8007_0057);

    /// 以无符号位模式构造，便于直接书写协议文档中的十六进制常量。
    pub const fn from_bits(bits: u32) -> Self {
        Hresult(bits as i32)
    }

    pub const fn bits(self) -> u32 {
        self.0 as u32
    }

    pub const fn is_success(self) -> bool {
        self.0 >= 0
    }

    pub const fn is_failure(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Debug for Hresult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hresult({:#010x})", self.bits())
    }
}

impl fmt::Display for Hresult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.bits())
    }
}

/// 处理器失败。
///
/// # 契约说明（What）
/// - `NotImplemented`：默认处理器返回值，编码为 [`Hresult::E_NOTIMPL`]；
/// - `Status`：领域失败，状态码原样写入响应；
/// - 两者都属于“传输成功、载荷失败”，分发器不重试也不解释。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("operation not implemented")]
    NotImplemented,
    #[error("operation failed with status {0}")]
    Status(Hresult),
}

impl OperationError {
    /// 写入响应状态字段的值。
    pub fn status(&self) -> Hresult {
        match self {
            OperationError::NotImplemented => Hresult::E_NOTIMPL,
            OperationError::Status(status) => *status,
        }
    }
}

impl From<Hresult> for OperationError {
    fn from(status: Hresult) -> Self {
        if status == Hresult::E_NOTIMPL {
            OperationError::NotImplemented
        } else {
            OperationError::Status(status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notimpl_bits_match_protocol_constant() {
        assert_eq!(Hresult::E_NOTIMPL.bits(), 0x8000_4001);
        assert!(Hresult::E_NOTIMPL.is_failure());
        assert!(Hresult::S_FALSE.is_success());
        assert_eq!(OperationError::NotImplemented.status(), Hresult::E_NOTIMPL);
        assert_eq!(
            OperationError::from(Hresult::E_NOTIMPL),
            OperationError::NotImplemented
        );
        assert_eq!(Hresult::E_FAIL.to_string(), "0x80004005");
    }
}
