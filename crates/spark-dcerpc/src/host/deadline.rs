use std::{future::Future, time::Duration};

use tokio::{runtime::Handle, time::Instant as TokioInstant};
use tracing::trace;

use crate::{contract::CallContext, time::monotonic_now};

const CANCELLATION_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// 上下文竞争的中止原因。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Interrupted {
    Cancelled,
    DeadlineExceeded,
}

async fn wait_for_cancellation(ctx: &CallContext) {
    while !ctx.cancellation().is_cancelled() {
        tokio::time::sleep(CANCELLATION_POLL_INTERVAL).await;
    }
}

/// 在保留取消/截止语义的前提下驱动 Future。
///
/// # 逻辑解析（How）
/// - 进入前先检查已过期或已取消的上下文，直接返回中止原因；
/// - 否则以 `biased` 的 `select!` 依次竞争取消、截止与业务 Future；
/// - 当前线程不在 Tokio 运行时内时没有计时器可用，只保留进入前的检查，直接驱动业务 Future；
/// - 截止时间换算为 Tokio 时刻，无法表示的远期截止视为无截止。
///
/// # 风险提示（Trade-offs）
/// - 取消以固定间隔轮询，最坏延迟约为一个轮询周期；
/// - 中止只是丢弃 Future，处理器已产生的副作用不会回滚。
pub(crate) async fn run_with_context<F, T>(ctx: &CallContext, future: F) -> Result<T, Interrupted>
where
    F: Future<Output = T>,
{
    if ctx.deadline().is_expired(monotonic_now()) {
        return Err(Interrupted::DeadlineExceeded);
    }
    if ctx.cancellation().is_cancelled() {
        return Err(Interrupted::Cancelled);
    }
    if Handle::try_current().is_err() {
        trace!("no tokio runtime on this thread, context is checked only before dispatch");
        return Ok(future.await);
    }

    let cancel = wait_for_cancellation(ctx);
    tokio::pin!(cancel);
    tokio::pin!(future);

    let deadline = ctx
        .deadline()
        .instant()
        .and_then(|instant| instant.to_instant())
        .map(TokioInstant::from_std);

    match deadline {
        Some(deadline) => {
            let sleep = tokio::time::sleep_until(deadline);
            tokio::pin!(sleep);
            tokio::select! {
                biased;
                _ = &mut cancel => Err(Interrupted::Cancelled),
                _ = &mut sleep => Err(Interrupted::DeadlineExceeded),
                output = &mut future => Ok(output),
            }
        }
        None => {
            tokio::select! {
                biased;
                _ = &mut cancel => Err(Interrupted::Cancelled),
                output = &mut future => Ok(output),
            }
        }
    }
}
