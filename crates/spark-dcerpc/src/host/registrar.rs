use std::sync::Arc;

use crate::{dispatch::ServerHandle, error::RegistrationError};

/// 接受服务端注册的连接或端点。
///
/// # 契约说明（What）
/// - 每个抽象语法最多绑定一个 [`ServerHandle`]，重复注册返回
///   [`RegistrationError::AlreadyRegistered`]，已有绑定保持不变；
/// - 实现必须 `Send + Sync`，注册可与正在进行的分发并发发生。
///
/// 各接口的 `register_*_server` 函数负责构造并校验分发器，再调用本 trait 完成绑定。
pub trait ServerRegistrar: Send + Sync {
    fn register_server(&self, server: Arc<dyn ServerHandle>) -> Result<(), RegistrationError>;
}

impl<R: ServerRegistrar + ?Sized> ServerRegistrar for Arc<R> {
    fn register_server(&self, server: Arc<dyn ServerHandle>) -> Result<(), RegistrationError> {
        (**self).register_server(server)
    }
}
