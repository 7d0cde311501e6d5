//! 集成测试共用的示例接口：`IBase`（操作号 0–2）与继承它的 `IExample`（操作号 3–5）。
//!
//! - `IBase`：`Hello`(0)、保留槽位(1)、`Echo`(2)；
//! - `IExample`：`Ping`(3)、保留槽位(4)、`Sum`(5)。
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use spark_dcerpc::{
    CallContext, Hresult, InterfaceTable, OperationEntry, OperationError, OperationResponse,
    SyntaxId, async_trait, base_interface, operation_table,
};
use spark_ndr::{Guid, Ndr};

pub const BASE_SYNTAX: SyntaxId = SyntaxId::new(
    Guid::from_fields(0x0b5e_0000, 0x1111, 0x2222, [0x33, 0x33, 0, 0, 0, 0, 0, 0x01]),
    1,
    0,
);

pub const EXAMPLE_SYNTAX: SyntaxId = SyntaxId::new(
    Guid::from_fields(0x0e5a_0000, 0x1111, 0x2222, [0x33, 0x33, 0, 0, 0, 0, 0, 0x02]),
    1,
    0,
);

#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct HelloRequest {
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct HelloResponse {
    pub greeting: String,
    pub status: Hresult,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct EchoRequest {
    pub count: u32,
    #[ndr(size_is = count)]
    pub payload: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct EchoResponse {
    pub count: u32,
    #[ndr(size_is = count)]
    pub payload: Vec<u8>,
    pub status: Hresult,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct PingRequest {
    pub token: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct PingResponse {
    pub token: u32,
    pub status: Hresult,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct SumRequest {
    pub count: u32,
    #[ndr(size_is = count)]
    pub values: Vec<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct SumResponse {
    pub total: i64,
    pub status: Hresult,
}

macro_rules! failure_response {
    ($($ty:ty),* $(,)?) => {
        $(
            impl OperationResponse for $ty {
                fn from_failure(status: Hresult) -> Self {
                    Self { status, ..Default::default() }
                }
            }
        )*
    };
}

failure_response!(HelloResponse, EchoResponse, PingResponse, SumResponse);

#[async_trait]
pub trait BaseServer: Send + Sync {
    async fn hello(
        &self,
        _ctx: CallContext,
        _request: HelloRequest,
    ) -> Result<HelloResponse, OperationError> {
        Err(OperationError::NotImplemented)
    }

    async fn echo(
        &self,
        _ctx: CallContext,
        _request: EchoRequest,
    ) -> Result<EchoResponse, OperationError> {
        Err(OperationError::NotImplemented)
    }
}

#[async_trait]
pub trait ExampleServer: BaseServer {
    async fn ping(
        &self,
        _ctx: CallContext,
        _request: PingRequest,
    ) -> Result<PingResponse, OperationError> {
        Err(OperationError::NotImplemented)
    }

    async fn sum(
        &self,
        _ctx: CallContext,
        _request: SumRequest,
    ) -> Result<SumResponse, OperationError> {
        Err(OperationError::NotImplemented)
    }
}

pub static BASE: InterfaceTable<dyn BaseServer> = InterfaceTable::root(
    "IBase",
    BASE_SYNTAX,
    BASE_OPERATIONS,
);

static BASE_OPERATIONS: &[OperationEntry<dyn BaseServer>] = operation_table! {
    interface: "IBase",
    server: BaseServer,
    operations: [
        (0, "Hello", hello, HelloRequest => HelloResponse),
        (1, reserved "Opnum1NotUsedOnWire"),
        (2, "Echo", echo, EchoRequest => EchoResponse),
    ],
};

pub static EXAMPLE: InterfaceTable<dyn ExampleServer> = InterfaceTable::derived(
    "IExample",
    EXAMPLE_SYNTAX,
    base_interface! { base: BASE, server: ExampleServer },
    EXAMPLE_OPERATIONS,
);

static EXAMPLE_OPERATIONS: &[OperationEntry<dyn ExampleServer>] = operation_table! {
    interface: "IExample",
    server: ExampleServer,
    operations: [
        (3, "Ping", ping, PingRequest => PingResponse),
        (4, reserved "Opnum4NotUsedOnWire"),
        (5, "Sum", sum, SumRequest => SumResponse),
    ],
};

/// 不覆盖任何方法的处理器集。
pub struct Unimplemented;

impl BaseServer for Unimplemented {}
impl ExampleServer for Unimplemented {}

/// 完整实现：记录收到的上下文，`Sum` 为空输入时返回领域失败。
#[derive(Default)]
pub struct Calculator {
    pub contexts: Mutex<Vec<CallContext>>,
}

#[async_trait]
impl BaseServer for Calculator {
    async fn hello(
        &self,
        _ctx: CallContext,
        request: HelloRequest,
    ) -> Result<HelloResponse, OperationError> {
        Ok(HelloResponse {
            greeting: format!("hello, {}", request.name),
            status: Hresult::S_OK,
        })
    }

    async fn echo(
        &self,
        _ctx: CallContext,
        request: EchoRequest,
    ) -> Result<EchoResponse, OperationError> {
        Ok(EchoResponse {
            count: request.count,
            payload: request.payload,
            status: Hresult::S_OK,
        })
    }
}

#[async_trait]
impl ExampleServer for Calculator {
    async fn ping(
        &self,
        ctx: CallContext,
        request: PingRequest,
    ) -> Result<PingResponse, OperationError> {
        self.contexts.lock().push(ctx);
        Ok(PingResponse {
            token: request.token,
            status: Hresult::S_OK,
        })
    }

    async fn sum(
        &self,
        _ctx: CallContext,
        request: SumRequest,
    ) -> Result<SumResponse, OperationError> {
        if request.values.is_empty() {
            return Err(OperationError::Status(Hresult::E_INVALIDARG));
        }
        Ok(SumResponse {
            total: request.values.iter().map(|v| i64::from(*v)).sum(),
            status: Hresult::S_OK,
        })
    }
}

/// 任何处理器被调用都会 panic，用于证明某条路径从未触达应用代码。
pub struct Untouchable;

#[async_trait]
impl BaseServer for Untouchable {
    async fn hello(
        &self,
        _ctx: CallContext,
        _request: HelloRequest,
    ) -> Result<HelloResponse, OperationError> {
        panic!("hello must not be reached")
    }

    async fn echo(
        &self,
        _ctx: CallContext,
        _request: EchoRequest,
    ) -> Result<EchoResponse, OperationError> {
        panic!("echo must not be reached")
    }
}

#[async_trait]
impl ExampleServer for Untouchable {
    async fn ping(
        &self,
        _ctx: CallContext,
        _request: PingRequest,
    ) -> Result<PingResponse, OperationError> {
        panic!("ping must not be reached")
    }

    async fn sum(
        &self,
        _ctx: CallContext,
        _request: SumRequest,
    ) -> Result<SumResponse, OperationError> {
        panic!("sum must not be reached")
    }
}

/// 只计数处理器调用次数。
#[derive(Default)]
pub struct Counting {
    pub calls: AtomicUsize,
}

impl Counting {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BaseServer for Counting {}

#[async_trait]
impl ExampleServer for Counting {
    async fn ping(
        &self,
        _ctx: CallContext,
        request: PingRequest,
    ) -> Result<PingResponse, OperationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PingResponse {
            token: request.token,
            status: Hresult::S_OK,
        })
    }

    async fn sum(
        &self,
        _ctx: CallContext,
        _request: SumRequest,
    ) -> Result<SumResponse, OperationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SumResponse::default())
    }
}

/// `Echo` 返回计数与载荷不一致的响应，触发编码期形状违规。
pub struct ShapeBreaker;

#[async_trait]
impl BaseServer for ShapeBreaker {
    async fn echo(
        &self,
        _ctx: CallContext,
        request: EchoRequest,
    ) -> Result<EchoResponse, OperationError> {
        Ok(EchoResponse {
            count: request.count + 1,
            payload: request.payload,
            status: Hresult::S_OK,
        })
    }
}

impl ExampleServer for ShapeBreaker {}

/// 在收到取消或截止前一直挂起的 `Ping`。
pub struct Stalled;

impl BaseServer for Stalled {}

#[async_trait]
impl ExampleServer for Stalled {
    async fn ping(
        &self,
        _ctx: CallContext,
        _request: PingRequest,
    ) -> Result<PingResponse, OperationError> {
        std::future::pending::<()>().await;
        Ok(PingResponse::default())
    }
}
