//! `IVolumeClient3`：磁盘管理的主接口，自有操作号 3–78。
//!
//! # 设计背景（Why）
//! - 该接口的操作号是协议的一部分，旧版本遗留的编号（12 与 56–63）必须继续占位，
//!   否则其后的所有操作都会错位；
//! - 0–2 由 `IUnknown` 承担，这里只声明自有操作，委派由表的基接口绑定完成。
//!
//! # 契约说明（What）
//! - 枚举类输出统一为“计数 + 以计数约束的数组”；
//! - 变更类操作返回 [`TaskInfo`]，调用方据此轮询长时任务；
//! - 所有处理器默认返回 `E_NOTIMPL`，实现方只覆盖自己支持的操作。

use std::sync::Arc;

use spark_dcerpc::{
    Dispatcher, Hresult, InterfaceTable, OperationEntry, RegistrationError, ServerRegistrar,
    SyntaxId, base_interface, operation_table,
};
use spark_dcom::{MInterfacePointer, UNKNOWN, orpc_records};
use spark_ndr::Guid;

use crate::{
    macros::handler_set,
    types::{
        CountedString, DiskInfoEx, DiskSpec, DriveLetterInfo, FileSystemInfo,
        InstalledFileSystemInfo, LdmObjectId, MergeObjectInfo, PartitionStyle, RegionInfoEx,
        RegionSpec, TaskInfo, VolumeInfo, VolumeSpec,
    },
};

/// `IVolumeClient3` 的抽象语法：`135698d2-3a37-4d26-99df-e2bb6ae3ac61` v0.0。
pub const VOLUME_CLIENT3_SYNTAX: SyntaxId = SyntaxId::new(
    Guid::from_fields(
        0x1356_98d2,
        0x3a37,
        0x4d26,
        [0x99, 0xdf, 0xe2, 0xbb, 0x6a, 0xe3, 0xac, 0x61],
    ),
    0,
    0,
);

orpc_records! {
    /// EnumDisksEx
    EnumDisksExRequest {}
        => EnumDisksExResponse {
            disk_count: u32,
            #[ndr(size_is = disk_count)]
            disk_list: Vec<DiskInfoEx>,
        };

    /// EnumDiskRegionsEx
    EnumDiskRegionsExRequest { disk_id: LdmObjectId, region_count: u32 }
        => EnumDiskRegionsExResponse {
            region_count: u32,
            #[ndr(size_is = region_count)]
            region_list: Vec<RegionInfoEx>,
        };

    /// CreatePartition
    CreatePartitionRequest { partition_spec: RegionSpec }
        => CreatePartitionResponse { tinfo: TaskInfo };

    /// CreatePartitionAssignAndFormat
    CreatePartitionAssignAndFormatRequest {
        partition_spec: RegionSpec,
        letter: u16,
        letter_last_known_state: i64,
        fs_spec: FileSystemInfo,
        quick_format: bool,
    } => CreatePartitionAssignAndFormatResponse { tinfo: TaskInfo };

    /// CreatePartitionAssignAndFormatEx
    CreatePartitionAssignAndFormatExRequest {
        partition_spec: RegionSpec,
        letter: u16,
        letter_last_known_state: i64,
        fs_spec: FileSystemInfo,
        quick_format: bool,
        options: u32,
    } => CreatePartitionAssignAndFormatExResponse { tinfo: TaskInfo };

    /// DeletePartition
    DeletePartitionRequest { partition_spec: RegionSpec, force: bool }
        => DeletePartitionResponse { tinfo: TaskInfo };

    /// InitializeDiskStyle
    InitializeDiskStyleRequest {
        disk_id: LdmObjectId,
        style: PartitionStyle,
        disk_last_known_state: i64,
    } => InitializeDiskStyleResponse { tinfo: TaskInfo };

    /// MarkActivePartition
    MarkActivePartitionRequest { region_id: LdmObjectId, region_last_known_state: i64 }
        => MarkActivePartitionResponse { tinfo: TaskInfo };

    /// Eject
    EjectRequest { disk_id: LdmObjectId, disk_last_known_state: i64 }
        => EjectResponse { tinfo: TaskInfo };

    /// FTEnumVolumes
    FtEnumVolumesRequest {}
        => FtEnumVolumesResponse {
            volume_count: u32,
            #[ndr(size_is = volume_count)]
            volume_list: Vec<VolumeInfo>,
        };

    /// FTEnumLogicalDiskMembers
    FtEnumLogicalDiskMembersRequest { volume_id: LdmObjectId }
        => FtEnumLogicalDiskMembersResponse {
            member_count: u32,
            #[ndr(size_is = member_count)]
            member_list: Vec<LdmObjectId>,
        };

    /// FTDeleteVolume
    FtDeleteVolumeRequest { volume_id: LdmObjectId, force: bool, volume_last_known_state: i64 }
        => FtDeleteVolumeResponse { tinfo: TaskInfo };

    /// FTBreakMirror
    FtBreakMirrorRequest { volume_id: LdmObjectId, volume_last_known_state: i64, force: bool }
        => FtBreakMirrorResponse { tinfo: TaskInfo };

    /// FTResyncMirror
    FtResyncMirrorRequest { volume_id: LdmObjectId, volume_last_known_state: i64 }
        => FtResyncMirrorResponse { tinfo: TaskInfo };

    /// FTRegenerateParityStripe
    FtRegenerateParityStripeRequest { volume_id: LdmObjectId, volume_last_known_state: i64 }
        => FtRegenerateParityStripeResponse { tinfo: TaskInfo };

    /// FTReplaceMirrorPartition
    FtReplaceMirrorPartitionRequest {
        volume_id: LdmObjectId,
        volume_last_known_state: i64,
        old_member_id: LdmObjectId,
        old_member_last_known_state: i64,
        new_region_id: LdmObjectId,
        new_region_last_known_state: i64,
        flags: u32,
    } => FtReplaceMirrorPartitionResponse { tinfo: TaskInfo };

    /// FTReplaceParityStripePartition
    FtReplaceParityStripePartitionRequest {
        volume_id: LdmObjectId,
        volume_last_known_state: i64,
        old_member_id: LdmObjectId,
        old_member_last_known_state: i64,
        new_region_id: LdmObjectId,
        new_region_last_known_state: i64,
        flags: u32,
    } => FtReplaceParityStripePartitionResponse { tinfo: TaskInfo };

    /// EnumDriveLetters
    EnumDriveLettersRequest {}
        => EnumDriveLettersResponse {
            drive_letter_count: u32,
            #[ndr(size_is = drive_letter_count)]
            drive_letter_list: Vec<DriveLetterInfo>,
        };

    /// AssignDriveLetter
    AssignDriveLetterRequest {
        letter: u16,
        force_option: u32,
        letter_last_known_state: i64,
        storage_id: LdmObjectId,
        storage_last_known_state: i64,
    } => AssignDriveLetterResponse { tinfo: TaskInfo };

    /// FreeDriveLetter
    FreeDriveLetterRequest {
        letter: u16,
        letter_last_known_state: i64,
        storage_id: LdmObjectId,
        storage_last_known_state: i64,
        force_option: u32,
    } => FreeDriveLetterResponse { tinfo: TaskInfo };

    /// EnumLocalFileSystems
    EnumLocalFileSystemsRequest {}
        => EnumLocalFileSystemsResponse {
            file_system_count: u32,
            #[ndr(size_is = file_system_count)]
            file_system_list: Vec<FileSystemInfo>,
        };

    /// GetInstalledFileSystems
    GetInstalledFileSystemsRequest {}
        => GetInstalledFileSystemsResponse {
            fs_count: u32,
            #[ndr(size_is = fs_count)]
            fs_list: Vec<InstalledFileSystemInfo>,
        };

    /// Format
    FormatRequest {
        storage_id: LdmObjectId,
        fs_spec: FileSystemInfo,
        quick_format: bool,
        force: bool,
        storage_length: i64,
        storage_last_known_state: i64,
        options: u32,
    } => FormatResponse { tinfo: TaskInfo };

    /// EnumVolumes
    EnumVolumesRequest {}
        => EnumVolumesResponse {
            volume_count: u32,
            #[ndr(size_is = volume_count)]
            volume_list: Vec<VolumeInfo>,
        };

    /// EnumVolumeMembers
    EnumVolumeMembersRequest { volume_id: LdmObjectId }
        => EnumVolumeMembersResponse {
            member_count: u32,
            #[ndr(size_is = member_count)]
            member_list: Vec<LdmObjectId>,
        };

    /// CreateVolume
    CreateVolumeRequest {
        volume_spec: VolumeSpec,
        disk_count: u32,
        #[ndr(size_is = disk_count)]
        disk_list: Vec<DiskSpec>,
    } => CreateVolumeResponse { tinfo: TaskInfo };

    /// CreateVolumeAssignAndFormat
    CreateVolumeAssignAndFormatRequest {
        volume_spec: VolumeSpec,
        disk_count: u32,
        #[ndr(size_is = disk_count)]
        disk_list: Vec<DiskSpec>,
        letter: u16,
        letter_last_known_state: i64,
        fs_spec: FileSystemInfo,
        quick_format: bool,
    } => CreateVolumeAssignAndFormatResponse { tinfo: TaskInfo };

    /// CreateVolumeAssignAndFormatEx
    CreateVolumeAssignAndFormatExRequest {
        volume_spec: VolumeSpec,
        disk_count: u32,
        #[ndr(size_is = disk_count)]
        disk_list: Vec<DiskSpec>,
        letter: u16,
        letter_last_known_state: i64,
        fs_spec: FileSystemInfo,
        quick_format: bool,
        options: u32,
    } => CreateVolumeAssignAndFormatExResponse { tinfo: TaskInfo };

    /// GetVolumeMountName
    GetVolumeMountNameRequest { volume_id: LdmObjectId }
        => GetVolumeMountNameResponse {
            mount_name_length: u32,
            #[ndr(size_is = mount_name_length)]
            mount_name: String,
        };

    /// GrowVolume
    GrowVolumeRequest {
        volume_id: LdmObjectId,
        volume_spec: VolumeSpec,
        disk_count: u32,
        #[ndr(size_is = disk_count)]
        disk_list: Vec<DiskSpec>,
        force: bool,
    } => GrowVolumeResponse { tinfo: TaskInfo };

    /// DeleteVolume
    DeleteVolumeRequest { volume_id: LdmObjectId, force: bool, volume_last_known_state: i64 }
        => DeleteVolumeResponse { tinfo: TaskInfo };

    /// CreatePartitionsForVolume
    CreatePartitionsForVolumeRequest { volume_id: LdmObjectId, volume_last_known_state: i64 }
        => CreatePartitionsForVolumeResponse { tinfo: TaskInfo };

    /// DeletePartitionsForVolume
    DeletePartitionsForVolumeRequest { volume_id: LdmObjectId, volume_last_known_state: i64 }
        => DeletePartitionsForVolumeResponse { tinfo: TaskInfo };

    /// GetMaxAdjustedFreeSpace
    GetMaxAdjustedFreeSpaceRequest { disk_id: LdmObjectId }
        => GetMaxAdjustedFreeSpaceResponse { max_adjusted_free_space: i64 };

    /// AddMirror
    AddMirrorRequest {
        volume_id: LdmObjectId,
        volume_last_known_state: i64,
        disk_spec: DiskSpec,
    } => AddMirrorResponse {
        disk_number: i32,
        partition_number: i32,
        tinfo: TaskInfo,
    };

    /// RemoveMirror
    RemoveMirrorRequest {
        volume_id: LdmObjectId,
        volume_last_known_state: i64,
        disk_id: LdmObjectId,
        disk_last_known_state: i64,
    } => RemoveMirrorResponse { tinfo: TaskInfo };

    /// SplitMirror
    SplitMirrorRequest {
        volume_id: LdmObjectId,
        volume_last_known_state: i64,
        disk_id: LdmObjectId,
        disk_last_known_state: i64,
        letter: u16,
        letter_last_known_state: i64,
    } => SplitMirrorResponse { tinfo: TaskInfo };

    /// InitializeDiskEx
    InitializeDiskExRequest {
        disk_id: LdmObjectId,
        style: PartitionStyle,
        disk_last_known_state: i64,
    } => InitializeDiskExResponse { tinfo: TaskInfo };

    /// UninitializeDisk
    UninitializeDiskRequest { disk_id: LdmObjectId, disk_last_known_state: i64 }
        => UninitializeDiskResponse { tinfo: TaskInfo };

    /// ReConnectDisk
    ReConnectDiskRequest { disk_id: LdmObjectId }
        => ReConnectDiskResponse { tinfo: TaskInfo };

    /// ImportDiskGroup
    ImportDiskGroupRequest {
        dgid_length: i32,
        #[ndr(size_is = dgid_length)]
        dgid: Vec<u8>,
    } => ImportDiskGroupResponse { tinfo: TaskInfo };

    /// DiskMergeQuery
    DiskMergeQueryRequest {
        dgid_length: i32,
        #[ndr(size_is = dgid_length)]
        dgid: Vec<u8>,
        disk_count: u32,
        #[ndr(size_is = disk_count)]
        disk_list: Vec<LdmObjectId>,
    } => DiskMergeQueryResponse {
        merge_dg_id: LdmObjectId,
        merge_object_count: u32,
        #[ndr(size_is = merge_object_count)]
        merge_objects: Vec<MergeObjectInfo>,
    };

    /// DiskMerge
    DiskMergeRequest {
        dgid_length: i32,
        #[ndr(size_is = dgid_length)]
        dgid: Vec<u8>,
        disk_count: u32,
        #[ndr(size_is = disk_count)]
        disk_list: Vec<LdmObjectId>,
        merge_dg_id: LdmObjectId,
    } => DiskMergeResponse { tinfo: TaskInfo };

    /// ReAttachDisk
    ReAttachDiskRequest { disk_id: LdmObjectId, disk_last_known_state: i64 }
        => ReAttachDiskResponse { tinfo: TaskInfo };

    /// ReplaceRaid5Column
    ReplaceRaid5ColumnRequest {
        volume_id: LdmObjectId,
        volume_last_known_state: i64,
        new_disk_id: LdmObjectId,
        disk_last_known_state: i64,
    } => ReplaceRaid5ColumnResponse { tinfo: TaskInfo };

    /// RestartVolume
    RestartVolumeRequest { volume_id: LdmObjectId, volume_last_known_state: i64 }
        => RestartVolumeResponse { tinfo: TaskInfo };

    /// GetEncapsulateDiskInfoEx
    GetEncapsulateDiskInfoExRequest {
        disk_count: u32,
        #[ndr(size_is = disk_count)]
        disk_spec_list: Vec<DiskSpec>,
    } => GetEncapsulateDiskInfoExResponse {
        encap_info_flags: u32,
        affected_disk_count: u32,
        #[ndr(size_is = affected_disk_count)]
        affected_disk_list: Vec<DiskInfoEx>,
        #[ndr(size_is = affected_disk_count)]
        affected_disk_flags: Vec<u32>,
        affected_volume_count: u32,
        #[ndr(size_is = affected_volume_count)]
        affected_volume_list: Vec<VolumeInfo>,
        affected_region_count: u32,
        #[ndr(size_is = affected_region_count)]
        affected_region_list: Vec<RegionInfoEx>,
    };

    /// EncapsulateDiskEx
    EncapsulateDiskExRequest {
        disk_count: u32,
        #[ndr(size_is = disk_count)]
        disk_list: Vec<DiskInfoEx>,
        volume_count: u32,
        #[ndr(size_is = volume_count)]
        volume_list: Vec<VolumeInfo>,
        region_count: u32,
        #[ndr(size_is = region_count)]
        region_list: Vec<RegionInfoEx>,
    } => EncapsulateDiskExResponse { encap_info_flags: u32, tinfo: TaskInfo };

    /// QueryChangePartitionNumbers
    QueryChangePartitionNumbersRequest {}
        => QueryChangePartitionNumbersResponse {
            old_partition_number: i32,
            new_partition_number: i32,
        };

    /// DeletePartitionNumberInfoFromRegistry
    DeletePartitionNumberInfoFromRegistryRequest {}
        => DeletePartitionNumberInfoFromRegistryResponse {};

    /// SetDontShow
    SetDontShowRequest { set_no_show: bool } => SetDontShowResponse {};

    /// GetDontShow
    GetDontShowRequest {} => GetDontShowResponse { get_no_show: bool };

    /// EnumTasks
    EnumTasksRequest {}
        => EnumTasksResponse {
            task_count: u32,
            #[ndr(size_is = task_count)]
            task_list: Vec<TaskInfo>,
        };

    /// GetTaskDetail
    GetTaskDetailRequest { id: LdmObjectId } => GetTaskDetailResponse { tinfo: TaskInfo };

    /// AbortTask
    AbortTaskRequest { id: LdmObjectId } => AbortTaskResponse {};

    /// HrGetErrorData
    HrGetErrorDataRequest { hr: Hresult, flags: u32 }
        => HrGetErrorDataResponse {
            stored_flags: u32,
            error_text_count: i32,
            #[ndr(size_is = error_text_count)]
            error_texts: Vec<String>,
        };

    /// Initialize
    InitializeRequest { notification_interface: Option<MInterfacePointer> }
        => InitializeResponse { installed: bool };

    /// Uninitialize
    UninitializeRequest {} => UninitializeResponse {};

    /// Refresh
    RefreshRequest {} => RefreshResponse {};

    /// RescanDisks
    RescanDisksRequest {} => RescanDisksResponse {};

    /// RefreshFileSys
    RefreshFileSysRequest {} => RefreshFileSysResponse {};

    /// SecureSystemPartition
    SecureSystemPartitionRequest {} => SecureSystemPartitionResponse {};

    /// ShutDownSystem
    ShutDownSystemRequest {} => ShutDownSystemResponse {};

    /// EnumAccessPath
    EnumAccessPathRequest { storage_id: LdmObjectId }
        => EnumAccessPathResponse {
            path_count: i32,
            #[ndr(size_is = path_count)]
            paths: Vec<CountedString>,
        };

    /// EnumAccessPathForVolume
    EnumAccessPathForVolumeRequest { volume_id: LdmObjectId }
        => EnumAccessPathForVolumeResponse {
            path_count: i32,
            #[ndr(size_is = path_count)]
            paths: Vec<CountedString>,
        };

    /// AddAccessPath
    AddAccessPathRequest {
        path_length: i32,
        #[ndr(size_is = path_length)]
        path: String,
        target_id: LdmObjectId,
    } => AddAccessPathResponse {};

    /// DeleteAccessPath
    DeleteAccessPathRequest {
        volume_id: LdmObjectId,
        path_length: i32,
        #[ndr(size_is = path_length)]
        path: String,
    } => DeleteAccessPathResponse {};
}

handler_set! {
    /// `IVolumeClient3` 处理器集。
    ///
    /// 继承 [`spark_dcom::UnknownServer`]，因此同一个对象同时服务 0–2 的 `IUnknown` 调用。
    pub trait VolumeClient3Server {
        fn enum_disks_ex(EnumDisksExRequest) -> EnumDisksExResponse;
        fn enum_disk_regions_ex(EnumDiskRegionsExRequest) -> EnumDiskRegionsExResponse;
        fn create_partition(CreatePartitionRequest) -> CreatePartitionResponse;
        fn create_partition_assign_and_format(
            CreatePartitionAssignAndFormatRequest
        ) -> CreatePartitionAssignAndFormatResponse;
        fn create_partition_assign_and_format_ex(
            CreatePartitionAssignAndFormatExRequest
        ) -> CreatePartitionAssignAndFormatExResponse;
        fn delete_partition(DeletePartitionRequest) -> DeletePartitionResponse;
        fn initialize_disk_style(InitializeDiskStyleRequest) -> InitializeDiskStyleResponse;
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
        fn create_partitions_for_volume(
            CreatePartitionsForVolumeRequest
        ) -> CreatePartitionsForVolumeResponse;
        fn delete_partitions_for_volume(
            DeletePartitionsForVolumeRequest
        ) -> DeletePartitionsForVolumeResponse;
        fn get_max_adjusted_free_space(
            GetMaxAdjustedFreeSpaceRequest
        ) -> GetMaxAdjustedFreeSpaceResponse;
        fn add_mirror(AddMirrorRequest) -> AddMirrorResponse;
        fn remove_mirror(RemoveMirrorRequest) -> RemoveMirrorResponse;
        fn split_mirror(SplitMirrorRequest) -> SplitMirrorResponse;
        fn initialize_disk_ex(InitializeDiskExRequest) -> InitializeDiskExResponse;
        fn uninitialize_disk(UninitializeDiskRequest) -> UninitializeDiskResponse;
        fn re_connect_disk(ReConnectDiskRequest) -> ReConnectDiskResponse;
        fn import_disk_group(ImportDiskGroupRequest) -> ImportDiskGroupResponse;
        fn disk_merge_query(DiskMergeQueryRequest) -> DiskMergeQueryResponse;
        fn disk_merge(DiskMergeRequest) -> DiskMergeResponse;
        fn re_attach_disk(ReAttachDiskRequest) -> ReAttachDiskResponse;
        fn replace_raid5_column(ReplaceRaid5ColumnRequest) -> ReplaceRaid5ColumnResponse;
        fn restart_volume(RestartVolumeRequest) -> RestartVolumeResponse;
        fn get_encapsulate_disk_info_ex(
            GetEncapsulateDiskInfoExRequest
        ) -> GetEncapsulateDiskInfoExResponse;
        fn encapsulate_disk_ex(EncapsulateDiskExRequest) -> EncapsulateDiskExResponse;
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
        /// 客户端登记通知回调接口；之后的变更通过 `IDMNotify` 推送。
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

/// `IVolumeClient3` 操作表，0–2 委派给 [`UNKNOWN`]。
pub static VOLUME_CLIENT3: InterfaceTable<dyn VolumeClient3Server> = InterfaceTable::derived(
    "IVolumeClient3",
    VOLUME_CLIENT3_SYNTAX,
    base_interface! { base: UNKNOWN, server: VolumeClient3Server },
    VOLUME_CLIENT3_OPERATIONS,
);

static VOLUME_CLIENT3_OPERATIONS: &[OperationEntry<dyn VolumeClient3Server>] = operation_table! {
    interface: "IVolumeClient3",
    server: VolumeClient3Server,
    operations: [
        (3, "EnumDisksEx", enum_disks_ex, EnumDisksExRequest => EnumDisksExResponse),
        (4, "EnumDiskRegionsEx", enum_disk_regions_ex,
            EnumDiskRegionsExRequest => EnumDiskRegionsExResponse),
        (5, "CreatePartition", create_partition,
            CreatePartitionRequest => CreatePartitionResponse),
        (6, "CreatePartitionAssignAndFormat", create_partition_assign_and_format,
            CreatePartitionAssignAndFormatRequest => CreatePartitionAssignAndFormatResponse),
        (7, "CreatePartitionAssignAndFormatEx", create_partition_assign_and_format_ex,
            CreatePartitionAssignAndFormatExRequest => CreatePartitionAssignAndFormatExResponse),
        (8, "DeletePartition", delete_partition,
            DeletePartitionRequest => DeletePartitionResponse),
        (9, "InitializeDiskStyle", initialize_disk_style,
            InitializeDiskStyleRequest => InitializeDiskStyleResponse),
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
        (27, "EnumVolumes", enum_volumes, EnumVolumesRequest => EnumVolumesResponse),
        (28, "EnumVolumeMembers", enum_volume_members,
            EnumVolumeMembersRequest => EnumVolumeMembersResponse),
        (29, "CreateVolume", create_volume, CreateVolumeRequest => CreateVolumeResponse),
        (30, "CreateVolumeAssignAndFormat", create_volume_assign_and_format,
            CreateVolumeAssignAndFormatRequest => CreateVolumeAssignAndFormatResponse),
        (31, "CreateVolumeAssignAndFormatEx", create_volume_assign_and_format_ex,
            CreateVolumeAssignAndFormatExRequest => CreateVolumeAssignAndFormatExResponse),
        (32, "GetVolumeMountName", get_volume_mount_name,
            GetVolumeMountNameRequest => GetVolumeMountNameResponse),
        (33, "GrowVolume", grow_volume, GrowVolumeRequest => GrowVolumeResponse),
        (34, "DeleteVolume", delete_volume, DeleteVolumeRequest => DeleteVolumeResponse),
        (35, "CreatePartitionsForVolume", create_partitions_for_volume,
            CreatePartitionsForVolumeRequest => CreatePartitionsForVolumeResponse),
        (36, "DeletePartitionsForVolume", delete_partitions_for_volume,
            DeletePartitionsForVolumeRequest => DeletePartitionsForVolumeResponse),
        (37, "GetMaxAdjustedFreeSpace", get_max_adjusted_free_space,
            GetMaxAdjustedFreeSpaceRequest => GetMaxAdjustedFreeSpaceResponse),
        (38, "AddMirror", add_mirror, AddMirrorRequest => AddMirrorResponse),
        (39, "RemoveMirror", remove_mirror, RemoveMirrorRequest => RemoveMirrorResponse),
        (40, "SplitMirror", split_mirror, SplitMirrorRequest => SplitMirrorResponse),
        (41, "InitializeDiskEx", initialize_disk_ex,
            InitializeDiskExRequest => InitializeDiskExResponse),
        (42, "UninitializeDisk", uninitialize_disk,
            UninitializeDiskRequest => UninitializeDiskResponse),
        (43, "ReConnectDisk", re_connect_disk, ReConnectDiskRequest => ReConnectDiskResponse),
        (44, "ImportDiskGroup", import_disk_group,
            ImportDiskGroupRequest => ImportDiskGroupResponse),
        (45, "DiskMergeQuery", disk_merge_query,
            DiskMergeQueryRequest => DiskMergeQueryResponse),
        (46, "DiskMerge", disk_merge, DiskMergeRequest => DiskMergeResponse),
        (47, "ReAttachDisk", re_attach_disk, ReAttachDiskRequest => ReAttachDiskResponse),
        (48, "ReplaceRaid5Column", replace_raid5_column,
            ReplaceRaid5ColumnRequest => ReplaceRaid5ColumnResponse),
        (49, "RestartVolume", restart_volume, RestartVolumeRequest => RestartVolumeResponse),
        (50, "GetEncapsulateDiskInfoEx", get_encapsulate_disk_info_ex,
            GetEncapsulateDiskInfoExRequest => GetEncapsulateDiskInfoExResponse),
        (51, "EncapsulateDiskEx", encapsulate_disk_ex,
            EncapsulateDiskExRequest => EncapsulateDiskExResponse),
        (52, "QueryChangePartitionNumbers", query_change_partition_numbers,
            QueryChangePartitionNumbersRequest => QueryChangePartitionNumbersResponse),
        (53, "DeletePartitionNumberInfoFromRegistry", delete_partition_number_info_from_registry,
            DeletePartitionNumberInfoFromRegistryRequest
                => DeletePartitionNumberInfoFromRegistryResponse),
        (54, "SetDontShow", set_dont_show, SetDontShowRequest => SetDontShowResponse),
        (55, "GetDontShow", get_dont_show, GetDontShowRequest => GetDontShowResponse),
        (56, reserved "Reserved0"),
        (57, reserved "Reserved1"),
        (58, reserved "Reserved2"),
        (59, reserved "Reserved3"),
        (60, reserved "Reserved4"),
        (61, reserved "Reserved5"),
        (62, reserved "Reserved6"),
        (63, reserved "Reserved7"),
        (64, "EnumTasks", enum_tasks, EnumTasksRequest => EnumTasksResponse),
        (65, "GetTaskDetail", get_task_detail, GetTaskDetailRequest => GetTaskDetailResponse),
        (66, "AbortTask", abort_task, AbortTaskRequest => AbortTaskResponse),
        (67, "HrGetErrorData", hr_get_error_data,
            HrGetErrorDataRequest => HrGetErrorDataResponse),
        (68, "Initialize", initialize, InitializeRequest => InitializeResponse),
        (69, "Uninitialize", uninitialize, UninitializeRequest => UninitializeResponse),
        (70, "Refresh", refresh, RefreshRequest => RefreshResponse),
        (71, "RescanDisks", rescan_disks, RescanDisksRequest => RescanDisksResponse),
        (72, "RefreshFileSys", refresh_file_sys,
            RefreshFileSysRequest => RefreshFileSysResponse),
        (73, "SecureSystemPartition", secure_system_partition,
            SecureSystemPartitionRequest => SecureSystemPartitionResponse),
        (74, "ShutDownSystem", shut_down_system,
            ShutDownSystemRequest => ShutDownSystemResponse),
        (75, "EnumAccessPath", enum_access_path,
            EnumAccessPathRequest => EnumAccessPathResponse),
        (76, "EnumAccessPathForVolume", enum_access_path_for_volume,
            EnumAccessPathForVolumeRequest => EnumAccessPathForVolumeResponse),
        (77, "AddAccessPath", add_access_path, AddAccessPathRequest => AddAccessPathResponse),
        (78, "DeleteAccessPath", delete_access_path,
            DeleteAccessPathRequest => DeleteAccessPathResponse),
    ],
};

/// 所有操作返回未实现的处理器集。
#[derive(Clone, Copy, Debug, Default)]
pub struct UnimplementedVolumeClient3Server;

impl spark_dcom::UnknownServer for UnimplementedVolumeClient3Server {}

impl VolumeClient3Server for UnimplementedVolumeClient3Server {}

/// 构造 `IVolumeClient3` 分发器并注册到 `registrar`。
pub fn register_volume_client3_server<R>(
    registrar: &R,
    server: Arc<dyn VolumeClient3Server>,
) -> Result<(), RegistrationError>
where
    R: ServerRegistrar + ?Sized,
{
    let dispatcher = Dispatcher::new(&VOLUME_CLIENT3, server)?;
    crate::register(registrar, Arc::new(dispatcher))
}
