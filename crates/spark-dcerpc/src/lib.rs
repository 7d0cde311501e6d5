//! spark-dcerpc：面向操作号的 RPC 接口服务端分发层。
//!
//! # 设计意图（Why）
//! - 传输层交付 `(opnum, stub)`，服务端需要把它路由到类型化的处理器方法，
//!   并把结果重新编组为响应存根；
//! - 接口可以继承基接口，低位操作号原样委派；协议保留的槽位必须占住编号却永不触达应用代码；
//! - 所有路由信息在编译期确定，分发路径上没有反射与逐调用的表分配。
//!
//! # 模块导览（How）
//! - [`registry`]：静态操作表、操作描述符与接口描述视图；
//! - [`dispatch`]：分发流程、[`ServerHandle`] 与 [`Dispatcher`]；
//! - [`status`]：`HRESULT` 与处理器失败；
//! - [`error`]：传输级失败的错误码、分类与故障状态；
//! - [`host`]：注册面、端点多路复用与宿主配置；
//! - [`operation_table!`]/[`base_interface!`]：声明接口表的宏。
//!
//! # 契约说明（What）
//! - 只有路由、解码、编码失败是传输级错误；其余操作失败一律写入响应载荷；
//! - 分发器无状态，可被任意并发调用；共享状态由处理器自行同步。

pub mod contract;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod registry;
pub mod status;
pub mod syntax;

mod future;
mod macros;
mod sealed;
mod time;

pub use async_trait::async_trait;
pub use contract::{CallContext, CallContextBuilder, Cancellation, Deadline};
pub use dispatch::{
    DispatchOutcome, DispatchResult, Dispatcher, OperationResponse, ServerHandle,
    invoke_operation,
};
pub use error::{
    DispatchError, ErrorCategory, HostError, InterfaceDefinitionError, OperationSite,
    RegistrationError, codes, fault,
};
pub use future::BoxFuture;
pub use host::{EndpointMux, HostConfig, RpcRequest, RpcResponse, ServerRegistrar};
pub use registry::{
    BaseInterface, InterfaceDescriptor, InterfaceTable, OperationDescriptor, OperationEntry,
    OperationKind,
};
pub use status::{Hresult, OperationError};
pub use syntax::SyntaxId;
pub use time::{MonotonicTimePoint, monotonic_now};

#[doc(hidden)]
pub mod __private {
    pub use bytes::Bytes;
    pub use spark_ndr::NdrRecord;
}
