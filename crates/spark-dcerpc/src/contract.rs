//! 调用上下文契约：取消、截止时间与调用标识。
//!
//! 分发器从不读取或改写这些字段，只把 [`CallContext`] 原样交给处理器；
//! 是否在截止到期后中止调用由传输边界（[`crate::host`]）与处理器自行决定。

use std::{fmt, sync::Arc, time::Duration};

// 模型检查构建下取消标志改用 Loom 的原子类型。
#[cfg(not(any(loom, spark_loom)))]
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(any(loom, spark_loom))]
use loom::sync::atomic::{AtomicBool, Ordering};

use crate::time::{MonotonicTimePoint, monotonic_now};

/// 调用级取消令牌。
///
/// 传输层收到取消 PDU 或连接断开时置位，处理器在长耗时步骤之间查询即可。
/// 克隆与 [`Cancellation::child`] 得到的令牌共用同一个标志位。
#[derive(Clone, Debug)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// 置位；只有把标志从未取消翻转为已取消的那一次调用返回 `true`。
    pub fn cancel(&self) -> bool {
        !self.flag.swap(true, Ordering::AcqRel)
    }

    /// 交给传输层持有的令牌，与当前令牌同步。
    pub fn child(&self) -> Self {
        self.clone()
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

/// 调用的最迟完成时刻，基于进程内单调时钟；缺省表示客户端未设超时。
///
/// 到期不会自动置位取消，由 [`crate::host`] 在启用上下文约束时据此中止调用。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Deadline(Option<MonotonicTimePoint>);

impl Deadline {
    pub fn at(instant: MonotonicTimePoint) -> Self {
        Self(Some(instant))
    }

    /// 从现在起 `timeout` 之后到期。
    pub fn after(timeout: Duration) -> Self {
        Self::at(monotonic_now().saturating_add(timeout))
    }

    pub fn instant(&self) -> Option<MonotonicTimePoint> {
        self.0
    }

    pub fn is_expired(&self, now: MonotonicTimePoint) -> bool {
        self.0.is_some_and(|deadline| now >= deadline)
    }
}

/// 单次 RPC 调用的执行上下文。
///
/// # 设计背景（Why）
/// - 取消与截止需要从传输层一路透传到处理器，分发器只做搬运；
/// - `call_id` 对应传输层 PDU 的调用标识，仅用于日志关联。
///
/// # 契约说明（What）
/// - 通过 [`CallContext::builder`] 构造；克隆共享同一份内部状态，成本为常数；
/// - 分发器保证交给处理器的上下文与传入时是同一实例（取消位共享）。
#[derive(Clone, Debug)]
pub struct CallContext {
    inner: Arc<CallContextInner>,
}

#[derive(Debug)]
struct CallContextInner {
    cancellation: Cancellation,
    deadline: Deadline,
    call_id: Option<u32>,
}

impl CallContext {
    pub fn builder() -> CallContextBuilder {
        CallContextBuilder::default()
    }

    pub fn cancellation(&self) -> &Cancellation {
        &self.inner.cancellation
    }

    pub fn deadline(&self) -> Deadline {
        self.inner.deadline
    }

    pub fn call_id(&self) -> Option<u32> {
        self.inner.call_id
    }

    /// 判断两个上下文是否为同一实例（共享内部状态）。
    pub fn same_call(&self, other: &CallContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for CallContext {
    fn default() -> Self {
        CallContext::builder().build()
    }
}

impl fmt::Display for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let deadline = match self.deadline().instant() {
            Some(instant) => format!("{:?}", instant.as_duration()),
            None => "none".to_string(),
        };
        write!(
            f,
            "CallContext{{call_id={:?}, cancelled={}, deadline={}}}",
            self.call_id(),
            self.cancellation().is_cancelled(),
            deadline
        )
    }
}

/// `CallContext` 构建器。
#[derive(Default)]
pub struct CallContextBuilder {
    cancellation: Cancellation,
    deadline: Deadline,
    call_id: Option<u32>,
}

impl CallContextBuilder {
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_call_id(mut self, call_id: u32) -> Self {
        self.call_id = Some(call_id);
        self
    }

    pub fn build(self) -> CallContext {
        CallContext {
            inner: Arc::new(CallContextInner {
                cancellation: self.cancellation,
                deadline: self.deadline,
                call_id: self.call_id,
            }),
        }
    }
}
