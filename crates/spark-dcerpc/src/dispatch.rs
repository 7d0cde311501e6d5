//! 分发器：解析 → 委派 / 无操作 / 解码 → 处理 → 编码。
//!
//! # 设计背景（Why）
//! - 每个接口有数十个操作，它们的差异只在请求/响应类型与处理器方法上；
//!   分发控制流因此只写一次，逐操作的部分收敛为 [`invoke_operation`] 的单态化实例；
//! - 派生接口的低位操作号原样转交基接口分发器，调用者通过派生绑定调用基接口操作时无需任何特判。
//!
//! # 契约说明（What）
//! - 保留槽位：不解码、不调用处理器、不编码，返回 [`DispatchOutcome::NoOp`]；
//! - 解码失败：处理器不会被调用，返回 [`DispatchError::Decode`]；
//! - 处理器失败：转换为响应记录的失败形态（[`OperationResponse::from_failure`]），按成功路径编码；
//! - 编码失败：返回 [`DispatchError::Encode`]，视为服务端缺陷；
//! - [`CallContext`] 原样交给处理器，分发器不读取也不改写取消与截止状态。
//!
//! # 并发（Concurrency）
//! - 分发器只持有静态表引用与 `Arc<S>`，每次调用独占自己的存根与记录，可被任意并发调用。

use std::{future::ready, sync::Arc};

use bytes::Bytes;
use spark_ndr::{NdrDecode, NdrEncode, NdrReader, NdrWriter};
use tracing::{debug, error, trace, warn};

use crate::{
    contract::CallContext,
    error::{DispatchError, InterfaceDefinitionError, OperationSite},
    future::BoxFuture,
    registry::{InterfaceDescriptor, InterfaceTable, Resolution},
    sealed::Sealed,
    status::{Hresult, OperationError},
    syntax::SyntaxId,
};

/// 单次分发的成功结果。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 已编码的响应存根。
    Response(Bytes),
    /// 保留槽位的无操作结果。
    NoOp,
}

impl DispatchOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, DispatchOutcome::NoOp)
    }

    /// 响应存根；无操作结果为空存根。
    pub fn into_stub(self) -> Bytes {
        match self {
            DispatchOutcome::Response(stub) => stub,
            DispatchOutcome::NoOp => Bytes::new(),
        }
    }
}

pub type DispatchResult = Result<DispatchOutcome, DispatchError>;

/// 携带失败状态的响应记录。
///
/// 接口的每个响应都声明了状态字段（通常是末尾的 `HRESULT`），
/// `from_failure` 构造“其余字段取默认值、状态字段为 `status`”的响应。
pub trait OperationResponse: NdrEncode + Send + Sized {
    fn from_failure(status: Hresult) -> Self;
}

/// 单个活动操作的分发步骤。
///
/// # 逻辑解析（How）
/// 1. 同步解码请求；失败立即返回就绪的 `Decode` 错误，`handler` 不会被调用；
/// 2. 以解码结果调用 `handler` 获得处理器 Future；
/// 3. 等待处理结果，失败时转换为 `Resp::from_failure`；
/// 4. 同步编码响应；失败返回 `Encode` 错误。
///
/// # 契约说明（What）
/// - `handler` 通常是 `move |request| server.method(ctx, request)`，由 [`crate::operation_table!`] 生成；
/// - 存根末尾多余字节被忽略，与常见实现的宽松解组保持一致。
pub fn invoke_operation<'a, Req, Resp>(
    site: OperationSite,
    stub: Bytes,
    handler: impl FnOnce(Req) -> BoxFuture<'a, Result<Resp, OperationError>>,
) -> BoxFuture<'a, DispatchResult>
where
    Req: NdrDecode,
    Resp: OperationResponse + 'a,
{
    let mut reader = NdrReader::new(stub);
    let request = match Req::decode(&mut reader) {
        Ok(request) => request,
        Err(source) => {
            warn!(
                interface = site.interface,
                operation = site.operation,
                opnum = site.opnum,
                code = source.code(),
                error = %source,
                "request stub rejected before reaching the handler"
            );
            return Box::pin(ready(Err(DispatchError::Decode { site, source })));
        }
    };
    trace!(
        interface = site.interface,
        operation = site.operation,
        opnum = site.opnum,
        consumed = reader.position(),
        "request decoded"
    );

    let pending = handler(request);
    Box::pin(async move {
        let response = match pending.await {
            Ok(response) => response,
            Err(failure) => {
                debug!(
                    interface = site.interface,
                    operation = site.operation,
                    opnum = site.opnum,
                    status = %failure.status(),
                    "handler reported an operation failure"
                );
                Resp::from_failure(failure.status())
            }
        };
        let mut writer = NdrWriter::new();
        match response.encode(&mut writer) {
            Ok(()) => Ok(DispatchOutcome::Response(writer.into_bytes())),
            Err(source) => {
                error!(
                    interface = site.interface,
                    operation = site.operation,
                    opnum = site.opnum,
                    code = source.code(),
                    error = %source,
                    "handler produced a response that violates its declared shape"
                );
                Err(DispatchError::Encode { site, source })
            }
        }
    })
}

impl<S: ?Sized + 'static> InterfaceTable<S> {
    /// 分发一次调用。
    pub fn dispatch<'a>(
        &'static self,
        server: &'a S,
        ctx: CallContext,
        opnum: u16,
        stub: Bytes,
    ) -> BoxFuture<'a, DispatchResult> {
        match self.resolve(opnum) {
            Ok(Resolution::Active { invoke, .. }) => invoke(server, ctx, stub),
            Ok(Resolution::Inherited(base)) => {
                debug!(
                    interface = self.name(),
                    base = base.descriptor().name(),
                    opnum,
                    "delegating to base interface"
                );
                (base.delegate)(server, ctx, opnum, stub)
            }
            Ok(Resolution::Reserved(descriptor)) => {
                trace!(
                    interface = self.name(),
                    operation = descriptor.name,
                    opnum,
                    "reserved operation slot, no-op"
                );
                Box::pin(ready(Ok(DispatchOutcome::NoOp)))
            }
            Err(err) => {
                warn!(
                    interface = self.name(),
                    opnum,
                    code = err.code(),
                    "unknown operation number"
                );
                Box::pin(ready(Err(err)))
            }
        }
    }
}

/// 传输层可见的分发入口：一个已绑定处理器集的接口。
pub trait ServerHandle: Send + Sync + Sealed + 'static {
    fn interface(&self) -> &'static dyn InterfaceDescriptor;

    fn syntax(&self) -> SyntaxId {
        self.interface().syntax()
    }

    fn dispatch(&self, ctx: CallContext, opnum: u16, stub: Bytes) -> BoxFuture<'_, DispatchResult>;
}

/// 将静态接口表与处理器集实例绑定的分发器。
pub struct Dispatcher<S: ?Sized + 'static> {
    table: &'static InterfaceTable<S>,
    server: Arc<S>,
}

impl<S: ?Sized + Send + Sync + 'static> Dispatcher<S> {
    /// 校验接口表后构造分发器。
    pub fn new(
        table: &'static InterfaceTable<S>,
        server: Arc<S>,
    ) -> Result<Self, InterfaceDefinitionError> {
        table.validate()?;
        Ok(Self { table, server })
    }

    pub fn server(&self) -> &Arc<S> {
        &self.server
    }
}

impl<S: ?Sized + Send + Sync + 'static> ServerHandle for Dispatcher<S> {
    fn interface(&self) -> &'static dyn InterfaceDescriptor {
        self.table
    }

    fn dispatch(&self, ctx: CallContext, opnum: u16, stub: Bytes) -> BoxFuture<'_, DispatchResult> {
        self.table.dispatch(&*self.server, ctx, opnum, stub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{base_interface, operation_table, registry::OperationEntry};
    use async_trait::async_trait;
    use futures::executor::block_on;
    use spark_ndr::{Guid, Ndr};
    use tracing_test::traced_test;

    #[derive(Debug, Default, Ndr)]
    struct Word(u32);

    #[derive(Debug, Default, PartialEq, Ndr)]
    struct Reply {
        value: u32,
        status: Hresult,
    }

    impl OperationResponse for Reply {
        fn from_failure(status: Hresult) -> Self {
            Reply { value: 0, status }
        }
    }

    #[async_trait]
    trait Echo: Send + Sync {
        async fn echo(&self, _ctx: CallContext, request: Word) -> Result<Reply, OperationError> {
            Ok(Reply {
                value: request.0,
                status: Hresult::S_OK,
            })
        }
    }

    #[async_trait]
    trait EchoChild: Echo {
        async fn fail(&self, _ctx: CallContext, _request: Word) -> Result<Reply, OperationError> {
            Err(OperationError::Status(Hresult::E_ACCESSDENIED))
        }
    }

    struct Server;
    impl Echo for Server {}
    impl EchoChild for Server {}

    const SYNTAX: SyntaxId = SyntaxId::new(Guid::NIL, 1, 0);

    static ECHO: InterfaceTable<dyn Echo> = InterfaceTable::root(
        "IEcho",
        SYNTAX,
        operation_table! {
            interface: "IEcho",
            server: Echo,
            operations: [
                (0, "Echo", echo, Word => Reply),
                (1, reserved "Reserved1"),
            ],
        },
    );

    static CHILD: InterfaceTable<dyn EchoChild> = InterfaceTable::derived(
        "IEchoChild",
        SYNTAX,
        base_interface! { base: ECHO, server: EchoChild },
        operation_table! {
            interface: "IEchoChild",
            server: EchoChild,
            operations: [(2, "Fail", fail, Word => Reply)],
        },
    );

    fn run(opnum: u16, stub: &'static [u8]) -> DispatchResult {
        block_on(CHILD.dispatch(
            &Server,
            CallContext::default(),
            opnum,
            Bytes::from_static(stub),
        ))
    }

    #[traced_test]
    #[test]
    fn reserved_slot_is_traced_through_delegation() {
        assert_eq!(run(1, b""), Ok(DispatchOutcome::NoOp));
        assert!(logs_contain("delegating to base interface"));
        assert!(logs_contain("reserved operation slot"));
    }

    #[traced_test]
    #[test]
    fn handler_failure_is_logged_and_encoded() {
        let result = run(2, &[5, 0, 0, 0]);
        let DispatchOutcome::Response(stub) = result.expect("failure is payload") else {
            panic!("active operation must respond");
        };
        let (reply, _) = spark_ndr::decode::<Reply>(stub).expect("reply decodes");
        assert_eq!(reply, Reply::from_failure(Hresult::E_ACCESSDENIED));
        assert!(logs_contain("handler reported an operation failure"));
    }

    #[traced_test]
    #[test]
    fn routing_and_decode_failures_are_warned() {
        assert!(matches!(
            run(3, b""),
            Err(DispatchError::UnknownOperation { opnum: 3, .. })
        ));
        assert!(logs_contain("unknown operation number"));

        assert!(matches!(run(0, &[1]), Err(DispatchError::Decode { .. })));
        assert!(logs_contain("request stub rejected before reaching the handler"));
    }

    #[test]
    fn outcome_helpers() {
        assert!(DispatchOutcome::NoOp.is_noop());
        assert!(DispatchOutcome::NoOp.into_stub().is_empty());
        let stub = Bytes::from_static(b"abc");
        assert_eq!(DispatchOutcome::Response(stub.clone()).into_stub(), stub);
    }
}
