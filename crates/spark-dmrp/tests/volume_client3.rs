//! `IVolumeClient3` 的表布局与端到端调用。

use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};

use parking_lot::Mutex;
use proptest::prelude::*;
use spark_dcerpc::{
    CallContext, EndpointMux, Hresult, InterfaceDescriptor, OperationError, RpcRequest,
    RpcResponse, async_trait, fault,
};
use spark_dcom::{AddRefRequest, AddRefResponse, OrpcThat, UnknownServer};
use spark_dmrp::{
    DiskInfoEx, DiskPartitionInfo, RegionPartitionInfo, UnimplementedVolumeClient3Server,
    VOLUME_CLIENT3, VOLUME_CLIENT3_SYNTAX, VolumeClient3Server, register_volume_client3_server,
    volume_client3::{
        AddAccessPathRequest, AddAccessPathResponse, AssignDriveLetterRequest,
        AssignDriveLetterResponse, DeleteAccessPathRequest, DeleteAccessPathResponse,
        EncapsulateDiskExRequest,
        EncapsulateDiskExResponse, EnumDisksExRequest, EnumDisksExResponse, FormatRequest,
        FormatResponse, GetDontShowRequest, GetDontShowResponse, SetDontShowRequest,
        SetDontShowResponse,
    },
    wide_len,
};
use spark_ndr::{Bytes, Guid};

const SENTINEL_SIGNATURE: u32 = 0x5A5A_A5A5;

/// 内存中的磁盘目录。
#[derive(Default)]
struct DiskStore {
    refs: AtomicU32,
    disks: Vec<DiskInfoEx>,
    letters: Mutex<Vec<(u16, i64)>>,
    dont_show: Mutex<bool>,
    encapsulated: Mutex<Vec<DiskPartitionInfo>>,
    access_paths: Mutex<Vec<(i32, String)>>,
}

impl DiskStore {
    fn with_two_disks() -> Self {
        let mbr = DiskInfoEx {
            id: 1,
            length: 500 << 30,
            bytes_per_sector: 512,
            partition: DiskPartitionInfo::Mbr {
                signature: 0x1234_5678,
            },
            name_length: wide_len("Disk 0"),
            name: "Disk 0".to_owned(),
            ..DiskInfoEx::default()
        };
        let gpt = DiskInfoEx {
            id: 2,
            length: 2 << 40,
            bytes_per_sector: 4096,
            partition: DiskPartitionInfo::Gpt {
                disk_guid: Guid::from_fields(0xaa, 0xbb, 0xcc, [0xdd; 8]),
            },
            vendor_length: wide_len("ACME"),
            vendor: "ACME".to_owned(),
            ..DiskInfoEx::default()
        };
        Self {
            disks: vec![mbr, gpt],
            ..Self::default()
        }
    }
}

#[async_trait]
impl UnknownServer for DiskStore {
    async fn add_ref(
        &self,
        _ctx: CallContext,
        _request: AddRefRequest,
    ) -> Result<AddRefResponse, OperationError> {
        Ok(AddRefResponse {
            that: OrpcThat::default(),
            return_value: self.refs.fetch_add(1, Ordering::SeqCst) + 1,
        })
    }
}

#[async_trait]
impl VolumeClient3Server for DiskStore {
    async fn enum_disks_ex(
        &self,
        _ctx: CallContext,
        _request: EnumDisksExRequest,
    ) -> Result<EnumDisksExResponse, OperationError> {
        Ok(EnumDisksExResponse {
            disk_count: self.disks.len() as u32,
            disk_list: self.disks.clone(),
            ..EnumDisksExResponse::default()
        })
    }

    async fn assign_drive_letter(
        &self,
        _ctx: CallContext,
        request: AssignDriveLetterRequest,
    ) -> Result<AssignDriveLetterResponse, OperationError> {
        let mut letters = self.letters.lock();
        if letters.iter().any(|(letter, _)| *letter == request.letter) {
            return Err(OperationError::Status(Hresult::E_INVALIDARG));
        }
        letters.push((request.letter, request.storage_id));
        Ok(AssignDriveLetterResponse::default())
    }

    async fn encapsulate_disk_ex(
        &self,
        _ctx: CallContext,
        request: EncapsulateDiskExRequest,
    ) -> Result<EncapsulateDiskExResponse, OperationError> {
        self.encapsulated
            .lock()
            .extend(request.disk_list.iter().map(|disk| disk.partition));
        Ok(EncapsulateDiskExResponse::default())
    }

    async fn set_dont_show(
        &self,
        _ctx: CallContext,
        request: SetDontShowRequest,
    ) -> Result<SetDontShowResponse, OperationError> {
        *self.dont_show.lock() = request.set_no_show;
        Ok(SetDontShowResponse::default())
    }

    async fn get_dont_show(
        &self,
        _ctx: CallContext,
        _request: GetDontShowRequest,
    ) -> Result<GetDontShowResponse, OperationError> {
        Ok(GetDontShowResponse {
            get_no_show: *self.dont_show.lock(),
            ..GetDontShowResponse::default()
        })
    }

    async fn add_access_path(
        &self,
        _ctx: CallContext,
        request: AddAccessPathRequest,
    ) -> Result<AddAccessPathResponse, OperationError> {
        self.access_paths
            .lock()
            .push((request.path_length, request.path));
        Ok(AddAccessPathResponse::default())
    }

    async fn delete_access_path(
        &self,
        _ctx: CallContext,
        request: DeleteAccessPathRequest,
    ) -> Result<DeleteAccessPathResponse, OperationError> {
        let mut paths = self.access_paths.lock();
        let before = paths.len();
        paths.retain(|(_, path)| *path != request.path);
        if paths.len() == before {
            return Err(OperationError::Status(Hresult::E_INVALIDARG));
        }
        Ok(DeleteAccessPathResponse::default())
    }
}

fn mux_with(store: Arc<DiskStore>) -> EndpointMux {
    let mux = EndpointMux::new();
    register_volume_client3_server(&mux, store).unwrap();
    mux
}

async fn call<T: spark_ndr::NdrEncode>(mux: &EndpointMux, opnum: u16, request: &T) -> RpcResponse {
    let stub = spark_ndr::encode(request).unwrap();
    mux.handle(RpcRequest::new(VOLUME_CLIENT3_SYNTAX, opnum, stub))
        .await
}

#[test]
fn table_places_reserved_slots_at_protocol_positions() {
    VOLUME_CLIENT3.validate().unwrap();
    assert_eq!(VOLUME_CLIENT3.operation_count(), 79);

    let operations = VOLUME_CLIENT3.operations();
    let reserved: Vec<u16> = operations
        .iter()
        .filter(|op| op.is_reserved())
        .map(|op| op.opnum)
        .collect();
    assert_eq!(reserved, [12, 56, 57, 58, 59, 60, 61, 62, 63]);

    let names: Vec<&str> = operations.iter().map(|op| op.name).collect();
    assert_eq!(&names[..4], ["QueryInterface", "AddRef", "Release", "EnumDisksEx"]);
    assert_eq!(names[26], "Format");
    assert_eq!(names[64], "EnumTasks");
    assert_eq!(names[78], "DeleteAccessPath");
    for (index, op) in operations.iter().enumerate() {
        assert_eq!(usize::from(op.opnum), index);
    }
}

#[tokio::test]
async fn enumerates_disks_of_both_partition_styles() {
    let store = Arc::new(DiskStore::with_two_disks());
    let mux = mux_with(Arc::clone(&store));

    let response = call(&mux, 3, &EnumDisksExRequest::default()).await;
    assert!(!response.is_fault());
    let (disks, _) = spark_ndr::decode::<EnumDisksExResponse>(response.stub).unwrap();
    assert_eq!(disks.return_value, Hresult::S_OK);
    assert_eq!(disks.disk_list, store.disks);
    assert!(matches!(
        disks.disk_list[1].partition,
        DiskPartitionInfo::Gpt { .. }
    ));
}

#[tokio::test]
async fn unknown_base_operations_reach_the_same_object() {
    let store = Arc::new(DiskStore::default());
    let mux = mux_with(Arc::clone(&store));

    for expected in 1..=3u32 {
        let response = call(&mux, 1, &AddRefRequest::default()).await;
        let (add_ref, _) = spark_ndr::decode::<AddRefResponse>(response.stub).unwrap();
        assert_eq!(add_ref.return_value, expected);
    }
    assert_eq!(store.refs.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn domain_failures_and_defaults_travel_as_payload() {
    let mux = mux_with(Arc::new(DiskStore::default()));
    let assign = AssignDriveLetterRequest {
        letter: u16::from(b'E'),
        storage_id: 7,
        ..AssignDriveLetterRequest::default()
    };

    let first = call(&mux, 22, &assign).await;
    let (first, _) = spark_ndr::decode::<AssignDriveLetterResponse>(first.stub).unwrap();
    assert_eq!(first.return_value, Hresult::S_OK);

    let second = call(&mux, 22, &assign).await;
    assert!(!second.is_fault());
    let (second, _) = spark_ndr::decode::<AssignDriveLetterResponse>(second.stub).unwrap();
    assert_eq!(second.return_value, Hresult::E_INVALIDARG);

    let format = call(&mux, 26, &FormatRequest::default()).await;
    let (format, _) = spark_ndr::decode::<FormatResponse>(format.stub).unwrap();
    assert_eq!(format.return_value, Hresult::E_NOTIMPL);
}

#[tokio::test]
async fn handler_state_is_shared_across_calls() {
    let mux = mux_with(Arc::new(DiskStore::default()));
    let set = SetDontShowRequest {
        set_no_show: true,
        ..SetDontShowRequest::default()
    };
    assert!(!call(&mux, 54, &set).await.is_fault());

    let response = call(&mux, 55, &GetDontShowRequest::default()).await;
    let (response, _) = spark_ndr::decode::<GetDontShowResponse>(response.stub).unwrap();
    assert!(response.get_no_show);
}

#[tokio::test]
async fn partition_style_outside_the_enumeration_is_rejected_before_the_handler() {
    let store = Arc::new(DiskStore::default());
    let mux = mux_with(Arc::clone(&store));
    let request = EncapsulateDiskExRequest {
        disk_count: 2,
        disk_list: vec![
            DiskInfoEx {
                id: 9,
                partition: DiskPartitionInfo::Unknown,
                ..DiskInfoEx::default()
            },
            DiskInfoEx {
                partition: DiskPartitionInfo::Mbr {
                    signature: SENTINEL_SIGNATURE,
                },
                ..DiskInfoEx::default()
            },
        ],
        ..EncapsulateDiskExRequest::default()
    };
    let mut stub = spark_ndr::encode(&request).unwrap().to_vec();
    let signature = stub
        .windows(4)
        .position(|window| window == SENTINEL_SIGNATURE.to_le_bytes())
        .unwrap();
    // 判别值紧贴签名之前。
    stub[signature - 2..signature].copy_from_slice(&7u16.to_le_bytes());

    let response = mux
        .handle(RpcRequest::new(VOLUME_CLIENT3_SYNTAX, 51, Bytes::from(stub)))
        .await;
    assert_eq!(response, RpcResponse::fault(fault::RPC_X_BAD_STUB_DATA));
    assert!(store.encapsulated.lock().is_empty());

    // 裸盘（UNKNOWN 样式）与 MBR 磁盘一起到达处理器。
    let accepted = call(&mux, 51, &request).await;
    assert!(!accepted.is_fault());
    assert_eq!(
        *store.encapsulated.lock(),
        [
            DiskPartitionInfo::Unknown,
            DiskPartitionInfo::Mbr {
                signature: SENTINEL_SIGNATURE,
            },
        ]
    );
}

#[tokio::test]
async fn raw_disks_enumerate_with_an_empty_partition_arm() {
    let mut store = DiskStore::with_two_disks();
    store.disks.push(DiskInfoEx {
        id: 3,
        partition: DiskPartitionInfo::Unknown,
        name_length: wide_len("Disk 2"),
        name: "Disk 2".to_owned(),
        ..DiskInfoEx::default()
    });
    let store = Arc::new(store);
    let mux = mux_with(Arc::clone(&store));

    let response = call(&mux, 3, &EnumDisksExRequest::default()).await;
    let (disks, _) = spark_ndr::decode::<EnumDisksExResponse>(response.stub).unwrap();
    assert_eq!(disks.disk_list, store.disks);
    assert_eq!(disks.disk_list[2].partition, DiskPartitionInfo::Unknown);
}

#[tokio::test]
async fn access_paths_accept_empty_and_padded_buffers() {
    let store = Arc::new(DiskStore::default());
    let mux = mux_with(Arc::clone(&store));

    // L"" 以一个 NUL 码元传输。
    let empty = AddAccessPathRequest {
        path_length: 1,
        path: String::new(),
        target_id: 4,
        ..AddAccessPathRequest::default()
    };
    let stub = spark_ndr::encode(&empty).unwrap();
    assert!(
        stub.windows(14)
            .any(|window| window == [1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0])
    );
    let response = call(&mux, 77, &empty).await;
    assert!(!response.is_fault());

    // 缓冲区大于文本时以 NUL 补齐，处理器只看到文本。
    let padded = AddAccessPathRequest {
        path_length: 5,
        path: "C:".to_owned(),
        target_id: 4,
        ..AddAccessPathRequest::default()
    };
    let response = call(&mux, 77, &padded).await;
    assert!(!response.is_fault());
    assert_eq!(
        *store.access_paths.lock(),
        [(1, String::new()), (5, "C:".to_owned())]
    );

    let delete = DeleteAccessPathRequest {
        volume_id: 4,
        path_length: 8,
        path: "C:".to_owned(),
        ..DeleteAccessPathRequest::default()
    };
    let response = call(&mux, 78, &delete).await;
    let (deleted, _) = spark_ndr::decode::<DeleteAccessPathResponse>(response.stub).unwrap();
    assert_eq!(deleted.return_value, Hresult::S_OK);
    assert_eq!(*store.access_paths.lock(), [(1, String::new())]);

    // 容量容不下结尾 NUL 的路径在解码期被拒绝。
    let mut short = spark_ndr::encode(&padded).unwrap().to_vec();
    let length_at = short
        .windows(4)
        .position(|window| window == 5i32.to_le_bytes())
        .unwrap();
    short[length_at..length_at + 4].copy_from_slice(&2i32.to_le_bytes());
    let response = mux
        .handle(RpcRequest::new(VOLUME_CLIENT3_SYNTAX, 77, Bytes::from(short)))
        .await;
    assert_eq!(response, RpcResponse::fault(fault::RPC_X_BAD_STUB_DATA));
}

#[test]
fn region_union_arms_roundtrip_inside_records() {
    let region = spark_dmrp::RegionInfoEx {
        partition: RegionPartitionInfo::Mbr {
            partition_type: 0x07,
            is_active: true,
        },
        name_length: wide_len("System Reserved"),
        name: "System Reserved".to_owned(),
        ..spark_dmrp::RegionInfoEx::default()
    };
    let stub = spark_ndr::encode(&region).unwrap();
    let (decoded, consumed) = spark_ndr::decode::<spark_dmrp::RegionInfoEx>(stub.clone()).unwrap();
    assert_eq!(decoded, region);
    assert_eq!(consumed, stub.len());
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn reserved_slots_ignore_any_stub(
        opnum in prop::sample::select(vec![12u16, 56, 57, 58, 59, 60, 61, 62, 63]),
        stub in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let mux = EndpointMux::new();
        register_volume_client3_server(&mux, Arc::new(UnimplementedVolumeClient3Server)).unwrap();
        let response = runtime().block_on(
            mux.handle(RpcRequest::new(VOLUME_CLIENT3_SYNTAX, opnum, Bytes::from(stub))),
        );
        prop_assert_eq!(response, RpcResponse::ok(Bytes::new()));
    }

    #[test]
    fn opnums_past_the_table_are_range_faults(opnum in 79u16..=u16::MAX) {
        let mux = EndpointMux::new();
        register_volume_client3_server(&mux, Arc::new(UnimplementedVolumeClient3Server)).unwrap();
        let response = runtime().block_on(
            mux.handle(RpcRequest::new(VOLUME_CLIENT3_SYNTAX, opnum, Bytes::new())),
        );
        prop_assert_eq!(response, RpcResponse::fault(fault::NCA_S_OP_RNG_ERROR));
    }
}
