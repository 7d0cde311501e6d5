//! `IDMNotify`：服务端向客户端推送对象变更的回调接口，自有操作号 3。
//!
//! # 契约说明（What）
//! - 线上只有一个以 `size_is` 约束的字节流，分发层不解释其内容；
//! - 字节流由连续的 [`ChangeNotification`] 记录组成，对齐相对字节流起点，
//!   [`ObjectsChangedRequest::from_notifications`] 与 [`ObjectsChangedRequest::notifications`]
//!   负责两侧的转换。

use std::sync::Arc;

use spark_dcerpc::{
    Dispatcher, InterfaceTable, OperationEntry, RegistrationError, ServerRegistrar, SyntaxId,
    base_interface, operation_table,
};
use spark_dcom::{UNKNOWN, orpc_records};
use spark_ndr::{CodecError, Guid, Ndr, NdrDecode, NdrEncode, NdrReader, NdrWriter};

use crate::{
    macros::handler_set,
    types::{Action, LdmObjectId, NotifyInfoType},
};

/// `IDMNotify` 的抽象语法：`d2d79df7-3400-11d0-b40b-00aa005ff586` v0.0。
pub const DM_NOTIFY_SYNTAX: SyntaxId = SyntaxId::new(
    Guid::from_fields(
        0xd2d7_9df7,
        0x3400,
        0x11d0,
        [0xb4, 0x0b, 0x00, 0xaa, 0x00, 0x5f, 0xf5, 0x86],
    ),
    0,
    0,
);

/// 单条对象变更。
#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct ChangeNotification {
    pub info_type: NotifyInfoType,
    pub action: Action,
    pub object_id: LdmObjectId,
}

orpc_records! {
    /// ObjectsChanged
    ObjectsChangedRequest {
        byte_count: u32,
        #[ndr(size_is = byte_count)]
        byte_stream: Vec<u8>,
    } => ObjectsChangedResponse {};
}

impl ObjectsChangedRequest {
    /// 把变更序列编组为字节流。
    pub fn from_notifications(notifications: &[ChangeNotification]) -> Result<Self, CodecError> {
        let mut writer = NdrWriter::new();
        for notification in notifications {
            notification.encode(&mut writer)?;
        }
        let byte_stream = writer.into_bytes().to_vec();
        let byte_count = u32::try_from(byte_stream.len()).map_err(|_| {
            CodecError::shape_violation("ObjectsChangedRequest.byte_stream", "length exceeds u32")
        })?;
        Ok(Self {
            byte_count,
            byte_stream,
            ..Self::default()
        })
    }

    /// 还原字节流中的变更序列；流尾出现不完整记录时返回解码错误。
    pub fn notifications(&self) -> Result<Vec<ChangeNotification>, CodecError> {
        let mut reader = NdrReader::new(spark_ndr::Bytes::copy_from_slice(&self.byte_stream));
        let mut notifications = Vec::new();
        while reader.remaining() > 0 {
            notifications.push(ChangeNotification::decode(&mut reader)?);
        }
        Ok(notifications)
    }
}

handler_set! {
    /// `IDMNotify` 处理器集，由接收通知的一方实现。
    pub trait DmNotifyServer {
        fn objects_changed(ObjectsChangedRequest) -> ObjectsChangedResponse;
    }
}

pub static DM_NOTIFY: InterfaceTable<dyn DmNotifyServer> = InterfaceTable::derived(
    "IDMNotify",
    DM_NOTIFY_SYNTAX,
    base_interface! { base: UNKNOWN, server: DmNotifyServer },
    DM_NOTIFY_OPERATIONS,
);

static DM_NOTIFY_OPERATIONS: &[OperationEntry<dyn DmNotifyServer>] = operation_table! {
    interface: "IDMNotify",
    server: DmNotifyServer,
    operations: [
        (3, "ObjectsChanged", objects_changed, ObjectsChangedRequest => ObjectsChangedResponse),
    ],
};

#[derive(Clone, Copy, Debug, Default)]
pub struct UnimplementedDmNotifyServer;

impl spark_dcom::UnknownServer for UnimplementedDmNotifyServer {}

impl DmNotifyServer for UnimplementedDmNotifyServer {}

pub fn register_dm_notify_server<R>(
    registrar: &R,
    server: Arc<dyn DmNotifyServer>,
) -> Result<(), RegistrationError>
where
    R: ServerRegistrar + ?Sized,
{
    let dispatcher = Dispatcher::new(&DM_NOTIFY, server)?;
    crate::register(registrar, Arc::new(dispatcher))
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use spark_dcerpc::{CallContext, DispatchOutcome, Hresult};

    use super::*;

    #[test]
    fn notifications_travel_through_the_byte_stream() {
        let changes = [
            ChangeNotification {
                info_type: NotifyInfoType::VOLUME,
                action: Action::CREATED,
                object_id: 0x10,
            },
            ChangeNotification {
                info_type: NotifyInfoType::DL,
                action: Action::DELETED,
                object_id: -1,
            },
        ];
        let request = ObjectsChangedRequest::from_notifications(&changes).unwrap();
        // 2 + 2 + 补齐 4 + 8，每条 16 字节。
        assert_eq!(request.byte_count, 32);
        assert_eq!(request.notifications().unwrap(), changes);
    }

    #[test]
    fn truncated_stream_is_reported() {
        let mut request =
            ObjectsChangedRequest::from_notifications(&[ChangeNotification::default()]).unwrap();
        request.byte_stream.truncate(10);
        request.byte_count = 10;
        assert!(matches!(
            request.notifications(),
            Err(CodecError::Truncated { .. })
        ));
    }

    #[test]
    fn unimplemented_listener_answers_notimpl() {
        let request = ObjectsChangedRequest::from_notifications(&[ChangeNotification::default()])
            .unwrap();
        let outcome = block_on(DM_NOTIFY.dispatch(
            &UnimplementedDmNotifyServer,
            CallContext::default(),
            3,
            spark_ndr::encode(&request).unwrap(),
        ))
        .unwrap();
        let DispatchOutcome::Response(bytes) = outcome else {
            panic!("ObjectsChanged is active");
        };
        let (response, _) = spark_ndr::decode::<ObjectsChangedResponse>(bytes).unwrap();
        assert_eq!(response.return_value, Hresult::E_NOTIMPL);
    }
}
