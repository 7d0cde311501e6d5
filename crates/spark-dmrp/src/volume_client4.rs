//! `IVolumeClient4`：对 `IVolumeClient3` 的补充，自有操作号 3–4。
//!
//! 与 `IVolumeClient3` 并列继承 `IUnknown`，两者是同一服务对象上的独立接口。

use std::sync::Arc;

use spark_dcerpc::{
    Dispatcher, InterfaceTable, OperationEntry, RegistrationError, ServerRegistrar, SyntaxId,
    base_interface, operation_table,
};
use spark_dcom::{UNKNOWN, orpc_records};
use spark_ndr::Guid;

use crate::{macros::handler_set, types::LdmObjectId};

/// `IVolumeClient4` 的抽象语法：`deb01010-3a37-4d26-99df-e2bb6ae3ac61` v0.0。
pub const VOLUME_CLIENT4_SYNTAX: SyntaxId = SyntaxId::new(
    Guid::from_fields(
        0xdeb0_1010,
        0x3a37,
        0x4d26,
        [0x99, 0xdf, 0xe2, 0xbb, 0x6a, 0xe3, 0xac, 0x61],
    ),
    0,
    0,
);

orpc_records! {
    /// RefreshEx
    RefreshExRequest {} => RefreshExResponse {};

    /// GetVolumeDeviceName
    GetVolumeDeviceNameRequest { volume_id: LdmObjectId }
        => GetVolumeDeviceNameResponse {
            volume_device_length: u32,
            #[ndr(size_is = volume_device_length)]
            volume_device: String,
        };
}

handler_set! {
    /// `IVolumeClient4` 处理器集。
    pub trait VolumeClient4Server {
        /// 重新扫描全部磁盘与文件系统。
        fn refresh_ex(RefreshExRequest) -> RefreshExResponse;
        /// 返回卷的设备路径，例如 `\Device\HarddiskVolume1`。
        fn get_volume_device_name(GetVolumeDeviceNameRequest) -> GetVolumeDeviceNameResponse;
    }
}

pub static VOLUME_CLIENT4: InterfaceTable<dyn VolumeClient4Server> = InterfaceTable::derived(
    "IVolumeClient4",
    VOLUME_CLIENT4_SYNTAX,
    base_interface! { base: UNKNOWN, server: VolumeClient4Server },
    VOLUME_CLIENT4_OPERATIONS,
);

static VOLUME_CLIENT4_OPERATIONS: &[OperationEntry<dyn VolumeClient4Server>] = operation_table! {
    interface: "IVolumeClient4",
    server: VolumeClient4Server,
    operations: [
        (3, "RefreshEx", refresh_ex, RefreshExRequest => RefreshExResponse),
        (4, "GetVolumeDeviceName", get_volume_device_name,
            GetVolumeDeviceNameRequest => GetVolumeDeviceNameResponse),
    ],
};

#[derive(Clone, Copy, Debug, Default)]
pub struct UnimplementedVolumeClient4Server;

impl spark_dcom::UnknownServer for UnimplementedVolumeClient4Server {}

impl VolumeClient4Server for UnimplementedVolumeClient4Server {}

pub fn register_volume_client4_server<R>(
    registrar: &R,
    server: Arc<dyn VolumeClient4Server>,
) -> Result<(), RegistrationError>
where
    R: ServerRegistrar + ?Sized,
{
    let dispatcher = Dispatcher::new(&VOLUME_CLIENT4, server)?;
    crate::register(registrar, Arc::new(dispatcher))
}
