use core::{future::Future, pin::Pin};

/// 分发路径上统一使用的装箱 Future。
///
/// # 契约说明（What）
/// - 约束 Future 为 `Send + 'a`，可在多线程运行时间迁移；
/// - 操作表中的调用函数指针、基接口委派与 [`crate::dispatch::ServerHandle::dispatch`]
///   都返回该类型，`#[async_trait]` 生成的处理器 Future 可直接兼容。
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
