//! spark-dcom：DCOM 接口的公共基座。
//!
//! # 设计意图（Why）
//! - 每个 DCOM 接口都继承 `IUnknown`，并在每个请求/响应前携带 ORPC 扩展；
//!   这些共性集中在此，具体接口 crate 只声明自己的操作；
//! - [`orpc_records!`] 把“请求以 `OrpcThis` 开头、响应以 `OrpcThat` 开头并以 `HRESULT` 结尾”
//!   的机械约定收敛为一次声明。
//!
//! # 模块导览（How）
//! - [`orpc`]：`ORPCTHIS`/`ORPCTHAT` 及其扩展数组、编组接口指针；
//! - [`unknown`]：`IUnknown` 的记录、处理器集、操作表与注册函数。

mod macros;
pub mod orpc;
pub mod unknown;

pub use orpc::{ComVersion, MInterfacePointer, OrpcExtent, OrpcExtentArray, OrpcThat, OrpcThis};
pub use unknown::{
    AddRefRequest, AddRefResponse, QueryInterfaceRequest, QueryInterfaceResponse,
    ReleaseRequest, ReleaseResponse, UNKNOWN, UNKNOWN_SYNTAX, UnimplementedUnknownServer,
    UnknownServer, register_unknown_server,
};

#[doc(hidden)]
pub mod __private {
    pub use spark_dcerpc::{Hresult, OperationResponse};
    pub use spark_ndr::Ndr;
}
