//! 端点宿主：注册面、按抽象语法路由的多路复用器与传输边界策略。
//!
//! # 设计背景（Why）
//! - 同一连接上可以承载多个接口，传输层只知道 `(syntax, opnum, stub)`；
//! - 存根上限、取消与截止属于传输边界的策略，放在这里而不是分发器中，
//!   分发器因此保持对上下文“只搬运不解释”。
//!
//! # 结构说明（How）
//! - [`ServerRegistrar`]：注册面抽象，接口的 `register_*_server` 只依赖它；
//! - [`EndpointMux`]：基于 `ArcSwap` 的写时复制路由表，读路径无锁；
//! - [`HostConfig`]：`serde` + `toml` 加载的宿主配置。

mod config;
mod deadline;
mod mux;
mod registrar;

pub use config::{ConfigError, DEFAULT_MAX_STUB_SIZE, HostConfig};
pub use mux::{EndpointMux, RpcRequest, RpcResponse};
pub use registrar::ServerRegistrar;
