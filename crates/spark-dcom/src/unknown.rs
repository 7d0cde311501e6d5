//! `IUnknown`：所有 DCOM 接口的基接口，占据操作号 0–2。
//!
//! 派生接口通过 [`spark_dcerpc::base_interface!`] 绑定 [`UNKNOWN`]，
//! 落在 0–2 的调用原样委派到这里的分发，派生接口自身不做任何特判。

use std::sync::Arc;

use async_trait::async_trait;
use spark_dcerpc::{
    CallContext, Dispatcher, Hresult, InterfaceTable, OperationError, OperationResponse,
    RegistrationError, ServerRegistrar, SyntaxId, operation_table,
};
use spark_ndr::{Guid, Ndr};

use crate::orpc::{MInterfacePointer, OrpcThat, OrpcThis};

/// `IUnknown` 的抽象语法：`00000000-0000-0000-c000-000000000046` v0.0。
pub const UNKNOWN_SYNTAX: SyntaxId = SyntaxId::new(
    Guid::from_fields(
        0x0000_0000,
        0x0000,
        0x0000,
        [0xc0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x46],
    ),
    0,
    0,
);

crate::orpc_records! {
    /// QueryInterface
    QueryInterfaceRequest { iid: Guid }
        => QueryInterfaceResponse { object: Option<MInterfacePointer> };
}

/// AddRef
#[derive(Clone, Debug, Default, PartialEq, Ndr)]
pub struct AddRefRequest {
    pub this: OrpcThis,
}

/// AddRef 返回新的引用计数而不是 `HRESULT`。
#[derive(Clone, Debug, Default, PartialEq, Ndr)]
pub struct AddRefResponse {
    pub that: OrpcThat,
    pub return_value: u32,
}

/// Release
#[derive(Clone, Debug, Default, PartialEq, Ndr)]
pub struct ReleaseRequest {
    pub this: OrpcThis,
}

/// Release 返回剩余的引用计数。
#[derive(Clone, Debug, Default, PartialEq, Ndr)]
pub struct ReleaseResponse {
    pub that: OrpcThat,
    pub return_value: u32,
}

// 引用计数返回值没有独立的状态字段，失败时直接写入状态码的位模式。
impl OperationResponse for AddRefResponse {
    fn from_failure(status: Hresult) -> Self {
        Self {
            that: OrpcThat::default(),
            return_value: status.bits(),
        }
    }
}

impl OperationResponse for ReleaseResponse {
    fn from_failure(status: Hresult) -> Self {
        Self {
            that: OrpcThat::default(),
            return_value: status.bits(),
        }
    }
}

/// `IUnknown` 处理器集。
#[async_trait]
pub trait UnknownServer: Send + Sync {
    async fn query_interface(
        &self,
        _ctx: CallContext,
        _request: QueryInterfaceRequest,
    ) -> Result<QueryInterfaceResponse, OperationError> {
        Err(OperationError::NotImplemented)
    }

    async fn add_ref(
        &self,
        _ctx: CallContext,
        _request: AddRefRequest,
    ) -> Result<AddRefResponse, OperationError> {
        Err(OperationError::NotImplemented)
    }

    async fn release(
        &self,
        _ctx: CallContext,
        _request: ReleaseRequest,
    ) -> Result<ReleaseResponse, OperationError> {
        Err(OperationError::NotImplemented)
    }
}

/// `IUnknown` 操作表。
pub static UNKNOWN: InterfaceTable<dyn UnknownServer> = InterfaceTable::root(
    "IUnknown",
    UNKNOWN_SYNTAX,
    operation_table! {
        interface: "IUnknown",
        server: UnknownServer,
        operations: [
            (0, "QueryInterface", query_interface, QueryInterfaceRequest => QueryInterfaceResponse),
            (1, "AddRef", add_ref, AddRefRequest => AddRefResponse),
            (2, "Release", release, ReleaseRequest => ReleaseResponse),
        ],
    },
);

/// 所有操作返回未实现的 `IUnknown` 处理器集。
#[derive(Clone, Copy, Debug, Default)]
pub struct UnimplementedUnknownServer;

impl UnknownServer for UnimplementedUnknownServer {}

/// 构造 `IUnknown` 分发器并注册到 `registrar`。
pub fn register_unknown_server<R>(
    registrar: &R,
    server: Arc<dyn UnknownServer>,
) -> Result<(), RegistrationError>
where
    R: ServerRegistrar + ?Sized,
{
    let dispatcher = Dispatcher::new(&UNKNOWN, server)?;
    registrar.register_server(Arc::new(dispatcher))
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use spark_dcerpc::{DispatchOutcome, InterfaceDescriptor};

    use super::*;

    #[test]
    fn table_occupies_opnums_zero_to_two() {
        UNKNOWN.validate().unwrap();
        assert_eq!(UNKNOWN.operation_count(), 3);
        let names: Vec<_> = UNKNOWN.operations().iter().map(|op| op.name).collect();
        assert_eq!(names, ["QueryInterface", "AddRef", "Release"]);
    }

    #[test]
    fn unimplemented_add_ref_reports_notimpl_bits() {
        let stub = spark_ndr::encode(&AddRefRequest::default()).unwrap();
        let outcome = block_on(UNKNOWN.dispatch(
            &UnimplementedUnknownServer,
            CallContext::default(),
            1,
            stub,
        ))
        .unwrap();
        let DispatchOutcome::Response(bytes) = outcome else {
            panic!("AddRef is active");
        };
        let (response, _) = spark_ndr::decode::<AddRefResponse>(bytes).unwrap();
        assert_eq!(response.return_value, Hresult::E_NOTIMPL.bits());
    }
}
