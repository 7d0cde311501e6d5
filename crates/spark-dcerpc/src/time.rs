use std::{
    sync::OnceLock,
    time::{Duration, Instant},
};

/// `MonotonicTimePoint` 以进程内单调时钟的偏移量表达时间点。
///
/// # 设计背景（Why）
/// - 截止时间需要在传输层、分发层与处理器之间原样传递，偏移量表示可 `Copy` 且与壁钟无关；
/// - 所有时间点都来自 [`monotonic_now`] 的同一基准，比较语义稳定。
///
/// # 契约说明（What）
/// - **前置条件**：参与比较的时间点必须来自同一计时来源；
/// - **后置条件**：`saturating_*` 系列运算永不 panic，溢出时饱和。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonotonicTimePoint(Duration);

impl MonotonicTimePoint {
    /// 根据基准以来的偏移量构造时间点。
    pub fn from_offset(offset: Duration) -> Self {
        MonotonicTimePoint(offset)
    }

    /// 返回基准以来的偏移。
    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// 计算两个时间点的饱和差值。
    pub fn saturating_duration_since(&self, earlier: MonotonicTimePoint) -> Duration {
        self.0.saturating_sub(earlier.0)
    }

    pub fn saturating_add(&self, delta: Duration) -> MonotonicTimePoint {
        MonotonicTimePoint(self.0.saturating_add(delta))
    }

    /// 换算回标准库 `Instant`，供运行时定时器使用；超出平台可表示范围时返回 `None`。
    pub(crate) fn to_instant(self) -> Option<Instant> {
        monotonic_base().checked_add(self.0)
    }
}

/// 读取当前单调时间点。
pub fn monotonic_now() -> MonotonicTimePoint {
    MonotonicTimePoint(Instant::now().duration_since(monotonic_base()))
}

fn monotonic_base() -> Instant {
    static BASE: OnceLock<Instant> = OnceLock::new();
    *BASE.get_or_init(Instant::now)
}
