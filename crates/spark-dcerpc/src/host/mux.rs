use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use arc_swap::ArcSwap;
use bytes::Bytes;
use tracing::{info, warn};

use crate::{
    contract::CallContext,
    dispatch::{DispatchOutcome, ServerHandle},
    error::{HostError, RegistrationError},
    syntax::SyntaxId,
};

use super::{
    config::HostConfig,
    deadline::{Interrupted, run_with_context},
    registrar::ServerRegistrar,
};

type RouteTable = HashMap<SyntaxId, Arc<dyn ServerHandle>>;

/// 传输层交付的一次调用。
#[derive(Clone, Debug)]
pub struct RpcRequest {
    pub syntax: SyntaxId,
    pub opnum: u16,
    pub stub: Bytes,
    pub ctx: CallContext,
}

impl RpcRequest {
    /// 以默认上下文构造请求。
    pub fn new(syntax: SyntaxId, opnum: u16, stub: Bytes) -> Self {
        Self {
            syntax,
            opnum,
            stub,
            ctx: CallContext::default(),
        }
    }

    pub fn with_context(mut self, ctx: CallContext) -> Self {
        self.ctx = ctx;
        self
    }
}

/// 交还传输层的结果：`status == 0` 时 `stub` 为响应存根，否则为故障状态且存根为空。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcResponse {
    pub status: u32,
    pub stub: Bytes,
}

impl RpcResponse {
    pub fn ok(stub: Bytes) -> Self {
        Self { status: 0, stub }
    }

    pub fn fault(status: u32) -> Self {
        Self {
            status,
            stub: Bytes::new(),
        }
    }

    pub fn is_fault(&self) -> bool {
        self.status != 0
    }
}

/// `EndpointMux` 按抽象语法把调用路由到已注册的分发器。
///
/// # 设计动机（Why）
/// - **热更新友好**：注册与注销整表替换，正在执行的调用继续持有旧快照中的 `Arc`，不受影响；
/// - **读路径零锁**：每次调用只做一次 `load` 与哈希查找。
///
/// # 行为概览（How）
/// 1. 按 `syntax` 查找分发器，未命中返回 `UnknownInterface`；
/// 2. 存根超过 [`HostConfig::max_stub_size`] 时在解码前拒绝；
/// 3. 启用截止约束时，以调用上下文的取消与截止竞争分发 Future；
/// 4. 任何失败都映射为单次调用的故障状态，不影响其他调用。
///
/// # 风险提示（Trade-offs）
/// - 写路径使用比较交换循环，并发注册在冲突时重试，适合低频的控制面操作。
pub struct EndpointMux {
    routes: ArcSwap<RouteTable>,
    revision: AtomicU64,
    config: HostConfig,
}

impl EndpointMux {
    pub fn new() -> Self {
        Self::with_config(HostConfig::default())
    }

    pub fn with_config(config: HostConfig) -> Self {
        Self {
            routes: ArcSwap::from_pointee(RouteTable::new()),
            revision: AtomicU64::new(0),
            config,
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// 路由表修订号，每次成功注册或注销递增。
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    pub fn lookup(&self, syntax: &SyntaxId) -> Option<Arc<dyn ServerHandle>> {
        self.routes.load().get(syntax).cloned()
    }

    /// 当前已注册的抽象语法，按字典序排列。
    pub fn syntaxes(&self) -> Vec<SyntaxId> {
        let mut syntaxes: Vec<SyntaxId> = self.routes.load().keys().copied().collect();
        syntaxes.sort();
        syntaxes
    }

    /// 移除绑定并返回被移除的分发器。
    pub fn deregister(&self, syntax: &SyntaxId) -> Option<Arc<dyn ServerHandle>> {
        loop {
            let current = self.routes.load_full();
            let removed = current.get(syntax).cloned()?;
            let mut next = (*current).clone();
            next.remove(syntax);
            let previous = self.routes.compare_and_swap(&current, Arc::new(next));
            if Arc::ptr_eq(&*previous, &current) {
                self.revision.fetch_add(1, Ordering::AcqRel);
                info!(
                    syntax = %syntax,
                    interface = removed.interface().name(),
                    "interface deregistered"
                );
                return Some(removed);
            }
        }
    }

    /// 处理一次调用，失败时返回结构化错误。
    pub async fn try_handle(&self, request: RpcRequest) -> Result<DispatchOutcome, HostError> {
        let RpcRequest {
            syntax,
            opnum,
            stub,
            ctx,
        } = request;
        let server = self
            .lookup(&syntax)
            .ok_or(HostError::UnknownInterface { syntax })?;
        let limit = self.config.max_stub_size;
        if stub.len() > limit {
            return Err(HostError::StubTooLarge {
                size: stub.len(),
                limit,
            });
        }

        let pending = server.dispatch(ctx.clone(), opnum, stub);
        if !self.config.enforce_deadlines {
            return Ok(pending.await?);
        }
        match run_with_context(&ctx, pending).await {
            Ok(result) => Ok(result?),
            Err(Interrupted::Cancelled) => Err(HostError::Cancelled),
            Err(Interrupted::DeadlineExceeded) => Err(HostError::DeadlineExceeded),
        }
    }

    /// 处理一次调用并映射为传输层响应；无操作结果以状态 0 与空存根返回。
    pub async fn handle(&self, request: RpcRequest) -> RpcResponse {
        let syntax = request.syntax;
        let opnum = request.opnum;
        let call_id = request.ctx.call_id();
        match self.try_handle(request).await {
            Ok(outcome) => RpcResponse::ok(outcome.into_stub()),
            Err(err) => {
                let status = err.fault_status();
                warn!(
                    syntax = %syntax,
                    opnum,
                    call_id = ?call_id,
                    code = err.code(),
                    fault_status = status,
                    error = %err,
                    "call faulted"
                );
                RpcResponse::fault(status)
            }
        }
    }
}

impl Default for EndpointMux {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EndpointMux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointMux")
            .field("syntaxes", &self.syntaxes())
            .field("revision", &self.revision())
            .field("config", &self.config)
            .finish()
    }
}

impl ServerRegistrar for EndpointMux {
    fn register_server(&self, server: Arc<dyn ServerHandle>) -> Result<(), RegistrationError> {
        let interface = server.interface();
        interface.validate()?;
        let syntax = server.syntax();
        loop {
            let current = self.routes.load_full();
            if let Some(existing) = current.get(&syntax) {
                return Err(RegistrationError::AlreadyRegistered {
                    syntax,
                    interface: existing.interface().name(),
                });
            }
            let mut next = (*current).clone();
            next.insert(syntax, Arc::clone(&server));
            let previous = self.routes.compare_and_swap(&current, Arc::new(next));
            if Arc::ptr_eq(&*previous, &current) {
                self.revision.fetch_add(1, Ordering::AcqRel);
                info!(
                    syntax = %syntax,
                    interface = interface.name(),
                    operations = interface.operation_count(),
                    "interface registered"
                );
                return Ok(());
            }
        }
    }
}
