//! `IVolumeClient`：磁盘管理的初版接口，自有操作号 3–81。
//!
//! # 设计背景（Why）
//! - 旧客户端只认识该接口；它与 `IVolumeClient3` 的大部分操作签名相同，
//!   差别集中在磁盘与区域描述不带分区样式联合，以及几个被后续版本改名或删除的操作；
//! - 保留槽位比 `IVolumeClient3` 多：12、27、42、46、48–50 与 59–66。
//!
//! # 契约说明（What）
//! - 只有 `EnumDisks`、`EnumDiskRegions`、`WriteSignature`、`InitializeDisk`、
//!   `GetEncapsulateDiskInfo` 与 `EncapsulateDisk` 在本模块声明记录，
//!   其余操作直接复用 [`crate::volume_client3`] 的请求与响应类型；
//! - 所有处理器默认返回 `E_NOTIMPL`。

use std::sync::Arc;

use spark_dcerpc::{
    Dispatcher, InterfaceTable, OperationEntry, RegistrationError, ServerRegistrar, SyntaxId,
    base_interface, operation_table,
};
use spark_dcom::{UNKNOWN, orpc_records};
use spark_ndr::Guid;

use crate::{
    macros::handler_set,
    types::{DiskInfo, DiskSpec, LdmObjectId, RegionInfo, TaskInfo, VolumeInfo},
    volume_client3::{
        AbortTaskRequest, AbortTaskResponse, AddAccessPathRequest, AddAccessPathResponse,
        AddMirrorRequest, AddMirrorResponse, AssignDriveLetterRequest, AssignDriveLetterResponse,
        CreatePartitionAssignAndFormatExRequest, CreatePartitionAssignAndFormatExResponse,
        CreatePartitionAssignAndFormatRequest, CreatePartitionAssignAndFormatResponse,
        CreatePartitionRequest, CreatePartitionResponse, CreateVolumeAssignAndFormatExRequest,
        CreateVolumeAssignAndFormatExResponse, CreateVolumeAssignAndFormatRequest,
        CreateVolumeAssignAndFormatResponse, CreateVolumeRequest, CreateVolumeResponse,
        DeleteAccessPathRequest, DeleteAccessPathResponse,
        DeletePartitionNumberInfoFromRegistryRequest,
        DeletePartitionNumberInfoFromRegistryResponse, DeletePartitionRequest,
        DeletePartitionResponse, DeleteVolumeRequest, DeleteVolumeResponse, DiskMergeQueryRequest,
        DiskMergeQueryResponse, DiskMergeRequest, DiskMergeResponse, EjectRequest, EjectResponse,
        EnumAccessPathForVolumeRequest, EnumAccessPathForVolumeResponse, EnumAccessPathRequest,
        EnumAccessPathResponse, EnumDriveLettersRequest, EnumDriveLettersResponse,
        EnumLocalFileSystemsRequest, EnumLocalFileSystemsResponse, EnumTasksRequest,
        EnumTasksResponse, EnumVolumeMembersRequest, EnumVolumeMembersResponse,
        EnumVolumesRequest, EnumVolumesResponse, FormatRequest, FormatResponse,
        FreeDriveLetterRequest, FreeDriveLetterResponse, FtBreakMirrorRequest,
        FtBreakMirrorResponse, FtDeleteVolumeRequest, FtDeleteVolumeResponse,
        FtEnumLogicalDiskMembersRequest, FtEnumLogicalDiskMembersResponse, FtEnumVolumesRequest,
        FtEnumVolumesResponse, FtRegenerateParityStripeRequest, FtRegenerateParityStripeResponse,
        FtReplaceMirrorPartitionRequest, FtReplaceMirrorPartitionResponse,
        FtReplaceParityStripePartitionRequest, FtReplaceParityStripePartitionResponse,
        FtResyncMirrorRequest, FtResyncMirrorResponse, GetDontShowRequest, GetDontShowResponse,
        GetInstalledFileSystemsRequest, GetInstalledFileSystemsResponse, GetTaskDetailRequest,
        GetTaskDetailResponse, GetVolumeMountNameRequest, GetVolumeMountNameResponse,
        GrowVolumeRequest, GrowVolumeResponse, HrGetErrorDataRequest, HrGetErrorDataResponse,
        ImportDiskGroupRequest, ImportDiskGroupResponse, InitializeRequest, InitializeResponse,
        MarkActivePartitionRequest, MarkActivePartitionResponse, QueryChangePartitionNumbersRequest,
        QueryChangePartitionNumbersResponse, ReAttachDiskRequest, ReAttachDiskResponse,
        ReConnectDiskRequest, ReConnectDiskResponse, RefreshFileSysRequest,
        RefreshFileSysResponse, RefreshRequest, RefreshResponse, RemoveMirrorRequest,
        RemoveMirrorResponse, ReplaceRaid5ColumnRequest, ReplaceRaid5ColumnResponse,
        RescanDisksRequest, RescanDisksResponse, RestartVolumeRequest, RestartVolumeResponse,
        SecureSystemPartitionRequest, SecureSystemPartitionResponse, SetDontShowRequest,
        SetDontShowResponse, ShutDownSystemRequest, ShutDownSystemResponse, SplitMirrorRequest,
        SplitMirrorResponse, UninitializeDiskRequest, UninitializeDiskResponse,
        UninitializeRequest, UninitializeResponse,
    },
};

/// `IVolumeClient` 的抽象语法：`d2d79df5-3400-11d0-b40b-00aa005ff586` v0.0。
pub const VOLUME_CLIENT_SYNTAX: SyntaxId = SyntaxId::new(
    Guid::from_fields(
        0xd2d7_9df5,
        0x3400,
        0x11d0,
        [0xb4, 0x0b, 0x00, 0xaa, 0x00, 0x5f, 0xf5, 0x86],
    ),
    0,
    0,
);

orpc_records! {
    /// EnumDisks
    EnumDisksRequest {}
        => EnumDisksResponse {
            disk_count: u32,
            #[ndr(size_is = disk_count)]
            disk_list: Vec<DiskInfo>,
        };

    /// EnumDiskRegions
    EnumDiskRegionsRequest { disk_id: LdmObjectId, region_count: u32 }
        => EnumDiskRegionsResponse {
            region_count: u32,
            #[ndr(size_is = region_count)]
            region_list: Vec<RegionInfo>,
        };

    /// WriteSignature
    WriteSignatureRequest { disk_id: LdmObjectId, disk_last_known_state: i64 }
        => WriteSignatureResponse { tinfo: TaskInfo };

    /// InitializeDisk
    InitializeDiskRequest { disk_id: LdmObjectId, disk_last_known_state: i64 }
        => InitializeDiskResponse { tinfo: TaskInfo };

    /// GetEncapsulateDiskInfo
    GetEncapsulateDiskInfoRequest {
        disk_count: u32,
        #[ndr(size_is = disk_count)]
        disk_spec_list: Vec<DiskSpec>,
    } => GetEncapsulateDiskInfoResponse {
        encap_info_flags: u32,
        affected_disk_count: u32,
        #[ndr(size_is = affected_disk_count)]
        affected_disk_list: Vec<DiskInfo>,
        #[ndr(size_is = affected_disk_count)]
        affected_disk_flags: Vec<u32>,
        affected_volume_count: u32,
        #[ndr(size_is = affected_volume_count)]
        affected_volume_list: Vec<VolumeInfo>,
        affected_region_count: u32,
        #[ndr(size_is = affected_region_count)]
        affected_region_list: Vec<RegionInfo>,
    };

    /// EncapsulateDisk
    EncapsulateDiskRequest {
        disk_count: u32,
        #[ndr(size_is = disk_count)]
        disk_list: Vec<DiskInfo>,
        volume_count: u32,
        #[ndr(size_is = volume_count)]
        volume_list: Vec<VolumeInfo>,
        region_count: u32,
        #[ndr(size_is = region_count)]
        region_list: Vec<RegionInfo>,
    } => EncapsulateDiskResponse { encap_info_flags: u32, tinfo: TaskInfo };
}

handler_set! {
    /// `IVolumeClient` 处理器集，同样继承 [`spark_dcom::UnknownServer`]。
    pub trait VolumeClientServer {
        fn enum_disks(EnumDisksRequest) -> EnumDisksResponse;
        fn enum_disk_regions(EnumDiskRegionsRequest) -> EnumDiskRegionsResponse;
        fn create_partition(CreatePartitionRequest) -> CreatePartitionResponse;
        fn create_partition_assign_and_format(
            CreatePartitionAssignAndFormatRequest
        ) -> CreatePartitionAssignAndFormatResponse;
        fn create_partition_assign_and_format_ex(
            CreatePartitionAssignAndFormatExRequest
        ) -> CreatePartitionAssignAndFormatExResponse;
        fn delete_partition(DeletePartitionRequest) -> DeletePartitionResponse;
        fn write_signature(WriteSignatureRequest) -> WriteSignatureResponse;
        fn mark_active_partition(MarkActivePartitionRequest) -> MarkActivePartitionResponse;
        fn eject(EjectRequest) -> EjectResponse;
        fn ft_enum_volumes(FtEnumVolumesRequest) -> FtEnumVolumesResponse;
        fn ft_enum_logical_disk_members(
            FtEnumLogicalDiskMembersRequest
        ) -> FtEnumLogicalDiskMembersResponse;
        fn ft_delete_volume(FtDeleteVolumeRequest) -> FtDeleteVolumeResponse;
        fn ft_break_mirror(FtBreakMirrorRequest) -> FtBreakMirrorResponse;
        fn ft_resync_mirror(FtResyncMirrorRequest) -> FtResyncMirrorResponse;
        fn ft_regenerate_parity_stripe(
            FtRegenerateParityStripeRequest
        ) -> FtRegenerateParityStripeResponse;
        fn ft_replace_mirror_partition(
            FtReplaceMirrorPartitionRequest
        ) -> FtReplaceMirrorPartitionResponse;
        fn ft_replace_parity_stripe_partition(
            FtReplaceParityStripePartitionRequest
        ) -> FtReplaceParityStripePartitionResponse;
        fn enum_drive_letters(EnumDriveLettersRequest) -> EnumDriveLettersResponse;
        fn assign_drive_letter(AssignDriveLetterRequest) -> AssignDriveLetterResponse;
        fn free_drive_letter(FreeDriveLetterRequest) -> FreeDriveLetterResponse;
        fn enum_local_file_systems(EnumLocalFileSystemsRequest) -> EnumLocalFileSystemsResponse;
        fn get_installed_file_systems(
            GetInstalledFileSystemsRequest
        ) -> GetInstalledFileSystemsResponse;
        fn format(FormatRequest) -> FormatResponse;
        fn enum_volumes(EnumVolumesRequest) -> EnumVolumesResponse;
        fn enum_volume_members(EnumVolumeMembersRequest) -> EnumVolumeMembersResponse;
        fn create_volume(CreateVolumeRequest) -> CreateVolumeResponse;
        fn create_volume_assign_and_format(
            CreateVolumeAssignAndFormatRequest
        ) -> CreateVolumeAssignAndFormatResponse;
        fn create_volume_assign_and_format_ex(
            CreateVolumeAssignAndFormatExRequest
        ) -> CreateVolumeAssignAndFormatExResponse;
        fn get_volume_mount_name(GetVolumeMountNameRequest) -> GetVolumeMountNameResponse;
        fn grow_volume(GrowVolumeRequest) -> GrowVolumeResponse;
        fn delete_volume(DeleteVolumeRequest) -> DeleteVolumeResponse;
        fn add_mirror(AddMirrorRequest) -> AddMirrorResponse;
        fn remove_mirror(RemoveMirrorRequest) -> RemoveMirrorResponse;
        fn split_mirror(SplitMirrorRequest) -> SplitMirrorResponse;
        fn initialize_disk(InitializeDiskRequest) -> InitializeDiskResponse;
        fn uninitialize_disk(UninitializeDiskRequest) -> UninitializeDiskResponse;
        fn re_connect_disk(ReConnectDiskRequest) -> ReConnectDiskResponse;
        fn import_disk_group(ImportDiskGroupRequest) -> ImportDiskGroupResponse;
        fn disk_merge_query(DiskMergeQueryRequest) -> DiskMergeQueryResponse;
        fn disk_merge(DiskMergeRequest) -> DiskMergeResponse;
        fn re_attach_disk(ReAttachDiskRequest) -> ReAttachDiskResponse;
        fn replace_raid5_column(ReplaceRaid5ColumnRequest) -> ReplaceRaid5ColumnResponse;
        fn restart_volume(RestartVolumeRequest) -> RestartVolumeResponse;
        fn get_encapsulate_disk_info(
            GetEncapsulateDiskInfoRequest
        ) -> GetEncapsulateDiskInfoResponse;
        fn encapsulate_disk(EncapsulateDiskRequest) -> EncapsulateDiskResponse;
        fn query_change_partition_numbers(
            QueryChangePartitionNumbersRequest
        ) -> QueryChangePartitionNumbersResponse;
        fn delete_partition_number_info_from_registry(
            DeletePartitionNumberInfoFromRegistryRequest
        ) -> DeletePartitionNumberInfoFromRegistryResponse;
        fn set_dont_show(SetDontShowRequest) -> SetDontShowResponse;
        fn get_dont_show(GetDontShowRequest) -> GetDontShowResponse;
        fn enum_tasks(EnumTasksRequest) -> EnumTasksResponse;
        fn get_task_detail(GetTaskDetailRequest) -> GetTaskDetailResponse;
        fn abort_task(AbortTaskRequest) -> AbortTaskResponse;
        fn hr_get_error_data(HrGetErrorDataRequest) -> HrGetErrorDataResponse;
        fn initialize(InitializeRequest) -> InitializeResponse;
        fn uninitialize(UninitializeRequest) -> UninitializeResponse;
        fn refresh(RefreshRequest) -> RefreshResponse;
        fn rescan_disks(RescanDisksRequest) -> RescanDisksResponse;
        fn refresh_file_sys(RefreshFileSysRequest) -> RefreshFileSysResponse;
        fn secure_system_partition(
            SecureSystemPartitionRequest
        ) -> SecureSystemPartitionResponse;
        fn shut_down_system(ShutDownSystemRequest) -> ShutDownSystemResponse;
        fn enum_access_path(EnumAccessPathRequest) -> EnumAccessPathResponse;
        fn enum_access_path_for_volume(
            EnumAccessPathForVolumeRequest
        ) -> EnumAccessPathForVolumeResponse;
        fn add_access_path(AddAccessPathRequest) -> AddAccessPathResponse;
        fn delete_access_path(DeleteAccessPathRequest) -> DeleteAccessPathResponse;
    }
}

/// `IVolumeClient` 操作表，0–2 委派给 [`UNKNOWN`]。
pub static VOLUME_CLIENT: InterfaceTable<dyn VolumeClientServer> = InterfaceTable::derived(
    "IVolumeClient",
    VOLUME_CLIENT_SYNTAX,
    base_interface! { base: UNKNOWN, server: VolumeClientServer },
    VOLUME_CLIENT_OPERATIONS,
);

static VOLUME_CLIENT_OPERATIONS: &[OperationEntry<dyn VolumeClientServer>] = operation_table! {
    interface: "IVolumeClient",
    server: VolumeClientServer,
    operations: [
        (3, "EnumDisks", enum_disks, EnumDisksRequest => EnumDisksResponse),
        (4, "EnumDiskRegions", enum_disk_regions,
            EnumDiskRegionsRequest => EnumDiskRegionsResponse),
        (5, "CreatePartition", create_partition,
            CreatePartitionRequest => CreatePartitionResponse),
        (6, "CreatePartitionAssignAndFormat", create_partition_assign_and_format,
            CreatePartitionAssignAndFormatRequest => CreatePartitionAssignAndFormatResponse),
        (7, "CreatePartitionAssignAndFormatEx", create_partition_assign_and_format_ex,
            CreatePartitionAssignAndFormatExRequest => CreatePartitionAssignAndFormatExResponse),
        (8, "DeletePartition", delete_partition,
            DeletePartitionRequest => DeletePartitionResponse),
        (9, "WriteSignature", write_signature, WriteSignatureRequest => WriteSignatureResponse),
        (10, "MarkActivePartition", mark_active_partition,
            MarkActivePartitionRequest => MarkActivePartitionResponse),
        (11, "Eject", eject, EjectRequest => EjectResponse),
        (12, reserved "Reserved_Opnum12"),
        (13, "FTEnumVolumes", ft_enum_volumes, FtEnumVolumesRequest => FtEnumVolumesResponse),
        (14, "FTEnumLogicalDiskMembers", ft_enum_logical_disk_members,
            FtEnumLogicalDiskMembersRequest => FtEnumLogicalDiskMembersResponse),
        (15, "FTDeleteVolume", ft_delete_volume,
            FtDeleteVolumeRequest => FtDeleteVolumeResponse),
        (16, "FTBreakMirror", ft_break_mirror, FtBreakMirrorRequest => FtBreakMirrorResponse),
        (17, "FTResyncMirror", ft_resync_mirror,
            FtResyncMirrorRequest => FtResyncMirrorResponse),
        (18, "FTRegenerateParityStripe", ft_regenerate_parity_stripe,
            FtRegenerateParityStripeRequest => FtRegenerateParityStripeResponse),
        (19, "FTReplaceMirrorPartition", ft_replace_mirror_partition,
            FtReplaceMirrorPartitionRequest => FtReplaceMirrorPartitionResponse),
        (20, "FTReplaceParityStripePartition", ft_replace_parity_stripe_partition,
            FtReplaceParityStripePartitionRequest => FtReplaceParityStripePartitionResponse),
        (21, "EnumDriveLetters", enum_drive_letters,
            EnumDriveLettersRequest => EnumDriveLettersResponse),
        (22, "AssignDriveLetter", assign_drive_letter,
            AssignDriveLetterRequest => AssignDriveLetterResponse),
        (23, "FreeDriveLetter", free_drive_letter,
            FreeDriveLetterRequest => FreeDriveLetterResponse),
        (24, "EnumLocalFileSystems", enum_local_file_systems,
            EnumLocalFileSystemsRequest => EnumLocalFileSystemsResponse),
        (25, "GetInstalledFileSystems", get_installed_file_systems,
            GetInstalledFileSystemsRequest => GetInstalledFileSystemsResponse),
        (26, "Format", format, FormatRequest => FormatResponse),
        (27, reserved "Reserved27"),
        (28, "EnumVolumes", enum_volumes, EnumVolumesRequest => EnumVolumesResponse),
        (29, "EnumVolumeMembers", enum_volume_members,
            EnumVolumeMembersRequest => EnumVolumeMembersResponse),
        (30, "CreateVolume", create_volume, CreateVolumeRequest => CreateVolumeResponse),
        (31, "CreateVolumeAssignAndFormat", create_volume_assign_and_format,
            CreateVolumeAssignAndFormatRequest => CreateVolumeAssignAndFormatResponse),
        (32, "CreateVolumeAssignAndFormatEx", create_volume_assign_and_format_ex,
            CreateVolumeAssignAndFormatExRequest => CreateVolumeAssignAndFormatExResponse),
        (33, "GetVolumeMountName", get_volume_mount_name,
            GetVolumeMountNameRequest => GetVolumeMountNameResponse),
        (34, "GrowVolume", grow_volume, GrowVolumeRequest => GrowVolumeResponse),
        (35, "DeleteVolume", delete_volume, DeleteVolumeRequest => DeleteVolumeResponse),
        (36, "AddMirror", add_mirror, AddMirrorRequest => AddMirrorResponse),
        (37, "RemoveMirror", remove_mirror, RemoveMirrorRequest => RemoveMirrorResponse),
        (38, "SplitMirror", split_mirror, SplitMirrorRequest => SplitMirrorResponse),
        (39, "InitializeDisk", initialize_disk,
            InitializeDiskRequest => InitializeDiskResponse),
        (40, "UninitializeDisk", uninitialize_disk,
            UninitializeDiskRequest => UninitializeDiskResponse),
        (41, "ReConnectDisk", re_connect_disk, ReConnectDiskRequest => ReConnectDiskResponse),
        (42, reserved "Reserved_Opnum42"),
        (43, "ImportDiskGroup", import_disk_group,
            ImportDiskGroupRequest => ImportDiskGroupResponse),
        (44, "DiskMergeQuery", disk_merge_query,
            DiskMergeQueryRequest => DiskMergeQueryResponse),
        (45, "DiskMerge", disk_merge, DiskMergeRequest => DiskMergeResponse),
        (46, reserved "Reserved_Opnum46"),
        (47, "ReAttachDisk", re_attach_disk, ReAttachDiskRequest => ReAttachDiskResponse),
        (48, reserved "Reserved_Opnum48"),
        (49, reserved "Reserved_Opnum49"),
        (50, reserved "Reserved_Opnum50"),
        (51, "ReplaceRaid5Column", replace_raid5_column,
            ReplaceRaid5ColumnRequest => ReplaceRaid5ColumnResponse),
        (52, "RestartVolume", restart_volume, RestartVolumeRequest => RestartVolumeResponse),
        (53, "GetEncapsulateDiskInfo", get_encapsulate_disk_info,
            GetEncapsulateDiskInfoRequest => GetEncapsulateDiskInfoResponse),
        (54, "EncapsulateDisk", encapsulate_disk,
            EncapsulateDiskRequest => EncapsulateDiskResponse),
        (55, "QueryChangePartitionNumbers", query_change_partition_numbers,
            QueryChangePartitionNumbersRequest => QueryChangePartitionNumbersResponse),
        (56, "DeletePartitionNumberInfoFromRegistry", delete_partition_number_info_from_registry,
            DeletePartitionNumberInfoFromRegistryRequest
                => DeletePartitionNumberInfoFromRegistryResponse),
        (57, "SetDontShow", set_dont_show, SetDontShowRequest => SetDontShowResponse),
        (58, "GetDontShow", get_dont_show, GetDontShowRequest => GetDontShowResponse),
        (59, reserved "Reserved0"),
        (60, reserved "Reserved1"),
        (61, reserved "Reserved2"),
        (62, reserved "Reserved3"),
        (63, reserved "Reserved4"),
        (64, reserved "Reserved5"),
        (65, reserved "Reserved6"),
        (66, reserved "Reserved7"),
        (67, "EnumTasks", enum_tasks, EnumTasksRequest => EnumTasksResponse),
        (68, "GetTaskDetail", get_task_detail, GetTaskDetailRequest => GetTaskDetailResponse),
        (69, "AbortTask", abort_task, AbortTaskRequest => AbortTaskResponse),
        (70, "HrGetErrorData", hr_get_error_data,
            HrGetErrorDataRequest => HrGetErrorDataResponse),
        (71, "Initialize", initialize, InitializeRequest => InitializeResponse),
        (72, "Uninitialize", uninitialize, UninitializeRequest => UninitializeResponse),
        (73, "Refresh", refresh, RefreshRequest => RefreshResponse),
        (74, "RescanDisks", rescan_disks, RescanDisksRequest => RescanDisksResponse),
        (75, "RefreshFileSys", refresh_file_sys,
            RefreshFileSysRequest => RefreshFileSysResponse),
        (76, "SecureSystemPartition", secure_system_partition,
            SecureSystemPartitionRequest => SecureSystemPartitionResponse),
        (77, "ShutDownSystem", shut_down_system,
            ShutDownSystemRequest => ShutDownSystemResponse),
        (78, "EnumAccessPath", enum_access_path,
            EnumAccessPathRequest => EnumAccessPathResponse),
        (79, "EnumAccessPathForVolume", enum_access_path_for_volume,
            EnumAccessPathForVolumeRequest => EnumAccessPathForVolumeResponse),
        (80, "AddAccessPath", add_access_path, AddAccessPathRequest => AddAccessPathResponse),
        (81, "DeleteAccessPath", delete_access_path,
            DeleteAccessPathRequest => DeleteAccessPathResponse),
    ],
};

/// 所有操作返回未实现的处理器集。
#[derive(Clone, Copy, Debug, Default)]
pub struct UnimplementedVolumeClientServer;

impl spark_dcom::UnknownServer for UnimplementedVolumeClientServer {}

impl VolumeClientServer for UnimplementedVolumeClientServer {}

/// 构造 `IVolumeClient` 分发器并注册到 `registrar`。
pub fn register_volume_client_server<R>(
    registrar: &R,
    server: Arc<dyn VolumeClientServer>,
) -> Result<(), RegistrationError>
where
    R: ServerRegistrar + ?Sized,
{
    let dispatcher = Dispatcher::new(&VOLUME_CLIENT, server)?;
    crate::register(registrar, Arc::new(dispatcher))
}

