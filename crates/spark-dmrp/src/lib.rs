//! spark-dmrp：磁盘管理远程协议（DMRP）接口的服务端分发表。
//!
//! # 设计意图（Why）
//! - 四个接口都继承 `IUnknown`，请求与响应都带 ORPC 扩展；这些共性由 `spark-dcom` 提供，
//!   本 crate 只声明协议结构、操作记录、处理器集与操作表；
//! - 操作号布局是协议的一部分，表在注册时整体校验，错位在启动期暴露而不是在调用时。
//!
//! # 模块导览（How）
//! - [`types`]：磁盘、区域、卷等协议结构与分区样式联合；
//! - [`volume_client`]：初版 `IVolumeClient`，操作号 3–81，保留槽位 12、27、42、46、48–50 与 59–66；
//! - [`volume_client3`]：`IVolumeClient3`，操作号 3–78，含保留槽位 12 与 56–63；
//! - [`volume_client4`]：`IVolumeClient4`，操作号 3–4；
//! - [`notify`]：`IDMNotify`，操作号 3。

use std::sync::Arc;

use spark_dcerpc::{RegistrationError, ServerHandle, ServerRegistrar};
use tracing::debug;

mod macros;
pub mod notify;
pub mod types;
pub mod volume_client;
pub mod volume_client3;
pub mod volume_client4;

pub use notify::{
    ChangeNotification, DM_NOTIFY, DM_NOTIFY_SYNTAX, DmNotifyServer, ObjectsChangedRequest,
    ObjectsChangedResponse, UnimplementedDmNotifyServer, register_dm_notify_server,
};
pub use types::*;
pub use volume_client::{
    UnimplementedVolumeClientServer, VOLUME_CLIENT, VOLUME_CLIENT_SYNTAX, VolumeClientServer,
    register_volume_client_server,
};
pub use volume_client3::{
    UnimplementedVolumeClient3Server, VOLUME_CLIENT3, VOLUME_CLIENT3_SYNTAX, VolumeClient3Server,
    register_volume_client3_server,
};
pub use volume_client4::{
    GetVolumeDeviceNameRequest, GetVolumeDeviceNameResponse, RefreshExRequest, RefreshExResponse,
    UnimplementedVolumeClient4Server, VOLUME_CLIENT4, VOLUME_CLIENT4_SYNTAX, VolumeClient4Server,
    register_volume_client4_server,
};

/// 各接口 `register_*_server` 的共同出口。
fn register<R>(registrar: &R, server: Arc<dyn ServerHandle>) -> Result<(), RegistrationError>
where
    R: ServerRegistrar + ?Sized,
{
    let interface = server.interface();
    debug!(
        interface = interface.name(),
        syntax = %server.syntax(),
        operations = interface.operation_count(),
        "binding disk management interface"
    );
    registrar.register_server(server)
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use tracing_test::traced_test;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        names: Mutex<Vec<&'static str>>,
    }

    impl ServerRegistrar for Recorder {
        fn register_server(&self, server: Arc<dyn ServerHandle>) -> Result<(), RegistrationError> {
            self.names.lock().push(server.interface().name());
            Ok(())
        }
    }

    #[test]
    #[traced_test]
    fn every_interface_binds_through_the_registrar() {
        let recorder = Recorder::default();
        register_volume_client_server(&recorder, Arc::new(UnimplementedVolumeClientServer))
            .unwrap();
        register_volume_client3_server(&recorder, Arc::new(UnimplementedVolumeClient3Server))
            .unwrap();
        register_volume_client4_server(&recorder, Arc::new(UnimplementedVolumeClient4Server))
            .unwrap();
        register_dm_notify_server(&recorder, Arc::new(UnimplementedDmNotifyServer)).unwrap();

        assert_eq!(
            *recorder.names.lock(),
            ["IVolumeClient", "IVolumeClient3", "IVolumeClient4", "IDMNotify"]
        );
        assert!(logs_contain("binding disk management interface"));
    }
}
