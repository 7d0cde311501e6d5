//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 分发层只有三类传输级失败：路由失败（未知操作号）、解码失败、编码失败；
//!   其余一切操作失败都是响应载荷，不在这里出现；
//! - 每个错误同时给出稳定错误码、分类与传输层故障状态，日志、告警与 Fault PDU 各取所需。
//!
//! ## 设计要求（What）
//! - [`DispatchError`] 仅中止当前请求，不携带任何会影响后续请求的状态；
//! - [`ErrorCategory::ContractViolation`] 专指服务端产出了违反声明形状的响应，需要修复代码而非重试。

use core::fmt;

use spark_ndr::CodecError;
use thiserror::Error;

use crate::syntax::SyntaxId;

/// 稳定错误码，遵循 `<域>.<语义>` 命名。
pub mod codes {
    pub const ROUTING_UNKNOWN_OPERATION: &str = "dcerpc.routing.unknown_operation";
    pub const ROUTING_UNKNOWN_INTERFACE: &str = "dcerpc.routing.unknown_interface";
    pub const PROTOCOL_DECODE: &str = "dcerpc.protocol.decode";
    pub const PROTOCOL_STUB_TOO_LARGE: &str = "dcerpc.protocol.stub_too_large";
    pub const CONTRACT_ENCODE: &str = "dcerpc.contract.encode";
    pub const CALL_CANCELLED: &str = "dcerpc.call.cancelled";
    pub const CALL_TIMEOUT: &str = "dcerpc.call.timeout";
    pub const REGISTRATION_INVALID_INTERFACE: &str = "dcerpc.registration.invalid_interface";
    pub const REGISTRATION_DUPLICATE: &str = "dcerpc.registration.duplicate";
}

/// 传输层故障状态（Fault PDU 的 status 字段）。
pub mod fault {
    /// 操作号超出接口范围。
    pub const NCA_S_OP_RNG_ERROR: u32 = 0x1c01_0002;
    /// 未注册的接口。
    pub const NCA_S_UNK_IF: u32 = 0x1c01_0003;
    /// 协议错误，用于超限存根。
    pub const NCA_S_PROTO_ERROR: u32 = 0x1c01_000b;
    /// 调用被取消。
    pub const NCA_S_FAULT_CANCEL: u32 = 0x1c00_000d;
    /// 存根数据无法解组。
    pub const RPC_X_BAD_STUB_DATA: u32 = 0x0000_06f7;
    /// 服务端内部错误，用于响应编码失败。
    pub const RPC_S_INTERNAL_ERROR: u32 = 0x0000_06e6;
    /// 调用超过截止时间。
    pub const ERROR_TIMEOUT: u32 = 0x0000_05b4;
}

/// 错误分类，指导上层的处置策略。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// 对端违反协议（未知操作、畸形存根），不可重试。
    ProtocolViolation,
    /// 服务端违反自身声明的契约，属于缺陷。
    ContractViolation,
    /// 输入超出资源限制。
    ResourceExhausted,
    Cancelled,
    Timeout,
    /// 配置或注册期错误。
    NonRetryable,
}

/// 一次操作调用的定位信息，用于错误与日志。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationSite {
    pub interface: &'static str,
    pub operation: &'static str,
    pub opnum: u16,
}

impl fmt::Display for OperationSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}({})", self.interface, self.operation, self.opnum)
    }
}

/// 分发失败。
///
/// # 教案式说明
/// - **意图 (Why)**：区分“找不到操作”“客户端存根坏了”“服务端响应违约”三种传输级失败；
/// - **契约 (What)**：解码失败时处理器必然没有被调用；编码失败时处理器已经执行完毕，
///   其副作用不会回滚；
/// - **设计权衡 (Trade-offs)**：错误携带 `&'static str` 定位信息而不是描述符引用，
///   保持 `Clone + Eq`，便于测试断言与跨任务传递。
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("{interface}: opnum {opnum} is outside the operation range 0..{operation_count}")]
    UnknownOperation {
        interface: &'static str,
        opnum: u16,
        operation_count: u16,
    },

    #[error("{site}: request decode failed: {source}")]
    Decode {
        site: OperationSite,
        source: CodecError,
    },

    #[error("{site}: response encode failed: {source}")]
    Encode {
        site: OperationSite,
        source: CodecError,
    },
}

impl DispatchError {
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::UnknownOperation { .. } => codes::ROUTING_UNKNOWN_OPERATION,
            DispatchError::Decode { .. } => codes::PROTOCOL_DECODE,
            DispatchError::Encode { .. } => codes::CONTRACT_ENCODE,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DispatchError::UnknownOperation { .. } | DispatchError::Decode { .. } => {
                ErrorCategory::ProtocolViolation
            }
            DispatchError::Encode { .. } => ErrorCategory::ContractViolation,
        }
    }

    pub fn fault_status(&self) -> u32 {
        match self {
            DispatchError::UnknownOperation { .. } => fault::NCA_S_OP_RNG_ERROR,
            DispatchError::Decode { .. } => fault::RPC_X_BAD_STUB_DATA,
            DispatchError::Encode { .. } => fault::RPC_S_INTERNAL_ERROR,
        }
    }
}

/// 端点宿主失败：在分发之前或围绕分发发生的传输级失败。
///
/// # 契约说明（What）
/// - `UnknownInterface`/`StubTooLarge` 在分发前判定，处理器必然未被调用；
/// - `Cancelled`/`DeadlineExceeded` 表示宿主放弃等待，处理器可能已部分执行；
/// - `Dispatch` 原样包裹分发失败，错误码、分类与故障状态全部委托给内层。
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("no interface registered for syntax {syntax}")]
    UnknownInterface { syntax: SyntaxId },

    #[error("request stub of {size} bytes exceeds the {limit} byte limit")]
    StubTooLarge { size: usize, limit: usize },

    #[error("call cancelled before the response was produced")]
    Cancelled,

    #[error("call deadline exceeded")]
    DeadlineExceeded,

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl HostError {
    pub fn code(&self) -> &'static str {
        match self {
            HostError::UnknownInterface { .. } => codes::ROUTING_UNKNOWN_INTERFACE,
            HostError::StubTooLarge { .. } => codes::PROTOCOL_STUB_TOO_LARGE,
            HostError::Cancelled => codes::CALL_CANCELLED,
            HostError::DeadlineExceeded => codes::CALL_TIMEOUT,
            HostError::Dispatch(inner) => inner.code(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            HostError::UnknownInterface { .. } => ErrorCategory::ProtocolViolation,
            HostError::StubTooLarge { .. } => ErrorCategory::ResourceExhausted,
            HostError::Cancelled => ErrorCategory::Cancelled,
            HostError::DeadlineExceeded => ErrorCategory::Timeout,
            HostError::Dispatch(inner) => inner.category(),
        }
    }

    pub fn fault_status(&self) -> u32 {
        match self {
            HostError::UnknownInterface { .. } => fault::NCA_S_UNK_IF,
            HostError::StubTooLarge { .. } => fault::NCA_S_PROTO_ERROR,
            HostError::Cancelled => fault::NCA_S_FAULT_CANCEL,
            HostError::DeadlineExceeded => fault::ERROR_TIMEOUT,
            HostError::Dispatch(inner) => inner.fault_status(),
        }
    }
}

/// 接口表自检失败。
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InterfaceDefinitionError {
    #[error("interface name must not be empty")]
    EmptyName,

    #[error("{interface}: expected opnum {expected} but table declares {found}")]
    NonContiguousOpnum {
        interface: &'static str,
        expected: u16,
        found: u16,
    },

    #[error("{interface}: operation count exceeds the 16-bit opnum space")]
    OpnumOverflow { interface: &'static str },
}

/// 注册失败。
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("invalid interface definition: {0}")]
    InvalidInterface(#[from] InterfaceDefinitionError),

    #[error("syntax {syntax} is already bound to {interface}")]
    AlreadyRegistered {
        syntax: SyntaxId,
        interface: &'static str,
    },
}

impl RegistrationError {
    pub fn code(&self) -> &'static str {
        match self {
            RegistrationError::InvalidInterface(_) => codes::REGISTRATION_INVALID_INTERFACE,
            RegistrationError::AlreadyRegistered { .. } => codes::REGISTRATION_DUPLICATE,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::NonRetryable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: OperationSite = OperationSite {
        interface: "IExample",
        operation: "Sum",
        opnum: 5,
    };

    #[test]
    fn each_dispatch_failure_maps_to_distinct_fault() {
        let unknown = DispatchError::UnknownOperation {
            interface: "IExample",
            opnum: 9,
            operation_count: 6,
        };
        let decode = DispatchError::Decode {
            site: SITE,
            source: CodecError::Truncated {
                offset: 0,
                needed: 4,
                remaining: 0,
            },
        };
        let encode = DispatchError::Encode {
            site: SITE,
            source: CodecError::shape_violation("SumResponse.items", "mismatch"),
        };

        assert_eq!(unknown.fault_status(), fault::NCA_S_OP_RNG_ERROR);
        assert_eq!(decode.fault_status(), fault::RPC_X_BAD_STUB_DATA);
        assert_eq!(encode.fault_status(), fault::RPC_S_INTERNAL_ERROR);

        assert_eq!(unknown.category(), ErrorCategory::ProtocolViolation);
        assert_eq!(decode.category(), ErrorCategory::ProtocolViolation);
        assert_eq!(encode.category(), ErrorCategory::ContractViolation);

        assert_eq!(decode.code(), "dcerpc.protocol.decode");
        assert!(decode.to_string().starts_with("IExample::Sum(5)"));
    }

    #[test]
    fn host_error_delegates_to_wrapped_dispatch_failure() {
        let wrapped = HostError::from(DispatchError::UnknownOperation {
            interface: "IExample",
            opnum: 9,
            operation_count: 6,
        });
        assert_eq!(wrapped.code(), codes::ROUTING_UNKNOWN_OPERATION);
        assert_eq!(wrapped.fault_status(), fault::NCA_S_OP_RNG_ERROR);
        assert_eq!(
            HostError::StubTooLarge { size: 9, limit: 8 }.category(),
            ErrorCategory::ResourceExhausted
        );
        assert_eq!(HostError::DeadlineExceeded.fault_status(), fault::ERROR_TIMEOUT);
    }
}
