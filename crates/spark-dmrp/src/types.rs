//! 磁盘管理协议的公共结构：磁盘、区域、卷、盘符、文件系统、任务与合并对象。
//!
//! # 契约说明（What）
//! - 协议枚举在线上是 16 位整数，这里用 `u16` 新类型承载，未知取值原样保留，
//!   由处理器自行决定是否拒绝；
//! - 宽字符串与其长度字段成对出现，长度是以 UTF-16 码元计的缓冲区容量，至少容纳结尾 NUL，
//!   二者通过 `#[ndr(size_is)]` 绑定，可用 [`wide_len`] 计算最小值；空串接受任意长度，
//!   因此全默认的记录总能编码；解码时缓冲区尾部的 NUL 全部去除；
//! - `DiskInfoEx`/`RegionInfoEx` 的分区样式联合有 UNKNOWN（空分支）、MBR、GPT 三个分支，
//!   枚举之外的判别值在解码期报告 [`CodecError::UnsupportedVariant`]。

use spark_dcerpc::Hresult;
use spark_ndr::{CodecError, Guid, Ndr, NdrDecode, NdrEncode, NdrReader, NdrWriter};

/// 磁盘管理对象标识。
pub type LdmObjectId = i64;

/// 协议枚举的新类型声明。
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $( $variant:ident = $value:literal ),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Ndr)]
        pub struct $name(pub u16);

        impl $name {
            $( pub const $variant: $name = $name($value); )*

            /// 已知取值的名称；协议未定义的取值返回 `None`。
            pub fn name(self) -> Option<&'static str> {
                match self.0 {
                    $( $value => Some(stringify!($variant)), )*
                    _ => None,
                }
            }
        }
    };
}

wire_enum! {
    /// 区域类型。
    RegionType {
        UNKNOWN = 0,
        FREE = 1,
        EXTENDED_FREE = 2,
        PRIMARY = 3,
        LOGICAL = 4,
        EXTENDED = 5,
        SUBDISK = 6,
        CDROM = 7,
        REMOVABLE = 8,
    }
}

wire_enum! {
    VolumeType {
        UNKNOWN = 0,
        PRIMARY_PARTITION = 1,
        LOGICAL_DRIVE = 2,
        FT = 3,
        VM = 4,
        CDROM = 5,
        REMOVABLE = 6,
    }
}

wire_enum! {
    VolumeLayout {
        UNKNOWN = 0,
        PARTITION = 1,
        SIMPLE = 2,
        SPANNED = 3,
        MIRROR = 4,
        STRIPE = 5,
        RAID5 = 6,
    }
}

wire_enum! {
    /// 异步任务状态。
    RequestStatus {
        UNKNOWN = 0,
        STARTED = 1,
        IN_PROGRESS = 2,
        COMPLETED = 3,
        ABORTED = 4,
        FAILED = 5,
    }
}

wire_enum! {
    RegionStatus {
        UNKNOWN = 0,
        OK = 1,
        FAILED = 2,
        FAILING = 3,
        REGENERATING = 4,
        NEEDS_RESYNC = 5,
    }
}

wire_enum! {
    VolumeStatus {
        UNKNOWN = 0,
        HEALTHY = 1,
        FAILED = 2,
        FAILED_REDUNDANCY = 3,
        FAILING = 4,
        FAILING_REDUNDANCY = 5,
        FAILED_REDUNDANCY_FAILING = 6,
        SYNCHING = 7,
        REGENERATING = 8,
        INITIALIZING = 9,
        FORMATTING = 10,
    }
}

wire_enum! {
    /// 变更通知中的动作。
    Action {
        UNKNOWN = 0,
        CREATED = 1,
        DELETED = 2,
        MODIFIED = 3,
        FAILED = 4,
    }
}

wire_enum! {
    /// 变更通知涉及的对象种类。
    NotifyInfoType {
        UNKNOWN = 0,
        DISK = 1,
        VOLUME = 2,
        REGION = 3,
        TASK = 4,
        DL = 5,
        FS = 6,
        SYSTEM = 7,
    }
}

wire_enum! {
    ProgressType {
        UNKNOWN = 0,
        FORMAT = 1,
        SYNCHING = 2,
    }
}

wire_enum! {
    /// 磁盘分区样式，同时是分区样式联合的判别值。
    PartitionStyle {
        UNKNOWN = 0,
        MBR = 1,
        GPT = 2,
    }
}

/// 宽字符串在线上的码元数（含结尾 NUL），用于填写与之成对的长度字段；空串为 0。
pub fn wide_len(value: &str) -> i32 {
    if value.is_empty() {
        return 0;
    }
    i32::try_from(value.encode_utf16().count() + 1).unwrap_or(i32::MAX)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct VolumeSpec {
    pub volume_type: VolumeType,
    pub layout: VolumeLayout,
    pub partition_type: RegionType,
    pub length: i64,
    pub last_known_state: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct VolumeInfo {
    pub id: LdmObjectId,
    pub volume_type: VolumeType,
    pub layout: VolumeLayout,
    pub length: i64,
    pub fs_id: LdmObjectId,
    pub member_count: u32,
    pub status: VolumeStatus,
    pub last_known_state: i64,
    pub task_id: LdmObjectId,
    pub volume_flags: u32,
}

/// 卷创建、扩展与镜像操作选定的磁盘及其容量。
#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct DiskSpec {
    pub disk_id: LdmObjectId,
    pub length: i64,
    pub need_contiguous: bool,
    pub last_known_state: i64,
}

/// 磁盘描述。
///
/// 五个变长字段各自由前面的 `*_length` 字段声明元素数，`dgid` 为原始字节，
/// 其余为宽字符串。
#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct DiskInfo {
    pub id: LdmObjectId,
    pub length: i64,
    pub free_bytes: i64,
    pub bytes_per_track: u32,
    pub bytes_per_cylinder: u32,
    pub bytes_per_sector: u32,
    pub region_count: u32,
    pub disk_flags: u32,
    pub device_type: u32,
    pub device_state: u32,
    pub bus_type: u32,
    pub attributes: u32,
    pub is_upgradeable: bool,
    pub port_number: i32,
    pub target_number: i32,
    pub lun_number: i32,
    pub last_known_state: i64,
    pub task_id: LdmObjectId,
    pub name_length: i32,
    pub vendor_length: i32,
    pub dgid_length: i32,
    pub adapter_name_length: i32,
    pub dg_name_length: i32,
    #[ndr(size_is = name_length)]
    pub name: String,
    #[ndr(size_is = vendor_length)]
    pub vendor: String,
    #[ndr(size_is = dgid_length)]
    pub dgid: Vec<u8>,
    #[ndr(size_is = adapter_name_length)]
    pub adapter_name: String,
    #[ndr(size_is = dg_name_length)]
    pub dg_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct RegionSpec {
    pub region_id: LdmObjectId,
    pub region_type: RegionType,
    pub disk_id: LdmObjectId,
    pub start: i64,
    pub length: i64,
    pub last_known_state: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct RegionInfo {
    pub id: LdmObjectId,
    pub disk_id: LdmObjectId,
    pub vol_id: LdmObjectId,
    pub fs_id: LdmObjectId,
    pub start: i64,
    pub length: i64,
    pub region_type: RegionType,
    pub partition_type: u32,
    pub is_active: bool,
    pub status: RegionStatus,
    pub last_known_state: i64,
    pub task_id: LdmObjectId,
    pub region_flags: u32,
    pub current_partition_number: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct DriveLetterInfo {
    /// 盘符，单个 UTF-16 码元。
    pub letter: u16,
    pub storage_id: LdmObjectId,
    pub is_used: bool,
    pub last_known_state: i64,
    pub task_id: LdmObjectId,
    pub drive_letter_flags: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct FileSystemInfo {
    pub id: LdmObjectId,
    pub storage_id: LdmObjectId,
    pub total_allocation_units: i64,
    pub available_allocation_units: i64,
    pub allocation_unit_size: u32,
    pub fs_flags: u32,
    pub last_known_state: i64,
    pub task_id: LdmObjectId,
    pub fs_type: i32,
    pub label_length: i32,
    #[ndr(size_is = label_length)]
    pub label: String,
}

/// 已安装文件系统的能力描述，`fs_name` 为定长 8 码元的宽字符缓冲。
#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct InstalledFileSystemInfo {
    pub fs_type: i32,
    pub fs_name: [u16; 8],
    pub fs_flags: u32,
    pub fs_compression_flags: u32,
    pub label_limit_length: i32,
    pub label_length: i32,
    #[ndr(size_is = label_length)]
    pub label_char_set: String,
}

/// 异步任务快照；大多数变更类操作以它作为返回值。
#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct TaskInfo {
    pub id: LdmObjectId,
    pub storage_id: LdmObjectId,
    pub create_time: i64,
    pub client_id: LdmObjectId,
    pub percent_complete: u32,
    pub status: RequestStatus,
    pub progress_type: ProgressType,
    pub error: Hresult,
    pub task_flags: u32,
}

/// 访问路径枚举的条目。
#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct CountedString {
    pub source_id: LdmObjectId,
    pub target_id: LdmObjectId,
    pub string_length: i32,
    #[ndr(size_is = string_length)]
    pub string: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct MergeObjectInfo {
    pub merge_type: u32,
    pub flags: u32,
    pub layout: VolumeLayout,
    pub length: i64,
}

/// 磁盘的分区样式联合。`Unknown` 对应尚未初始化的裸盘，分支为空。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiskPartitionInfo {
    Unknown,
    Mbr { signature: u32 },
    Gpt { disk_guid: Guid },
}

impl DiskPartitionInfo {
    pub fn style(&self) -> PartitionStyle {
        match self {
            DiskPartitionInfo::Unknown => PartitionStyle::UNKNOWN,
            DiskPartitionInfo::Mbr { .. } => PartitionStyle::MBR,
            DiskPartitionInfo::Gpt { .. } => PartitionStyle::GPT,
        }
    }
}

impl Default for DiskPartitionInfo {
    fn default() -> Self {
        DiskPartitionInfo::Mbr { signature: 0 }
    }
}

impl NdrEncode for DiskPartitionInfo {
    fn encode(&self, writer: &mut NdrWriter) -> Result<(), CodecError> {
        self.style().encode(writer)?;
        writer.align(4);
        match self {
            DiskPartitionInfo::Unknown => Ok(()),
            DiskPartitionInfo::Mbr { signature } => signature.encode(writer),
            DiskPartitionInfo::Gpt { disk_guid } => disk_guid.encode(writer),
        }
    }
}

impl NdrDecode for DiskPartitionInfo {
    // 判别值 2 字节，空分支不占空间。
    const MIN_WIRE_SIZE: usize = 2;

    fn decode(reader: &mut NdrReader) -> Result<Self, CodecError> {
        let style = PartitionStyle::decode(reader)?;
        reader.align(4)?;
        match style {
            PartitionStyle::UNKNOWN => Ok(DiskPartitionInfo::Unknown),
            PartitionStyle::MBR => Ok(DiskPartitionInfo::Mbr {
                signature: u32::decode(reader)?,
            }),
            PartitionStyle::GPT => Ok(DiskPartitionInfo::Gpt {
                disk_guid: Guid::decode(reader)?,
            }),
            other => Err(unsupported_style(other)),
        }
    }
}

/// 区域的分区样式联合。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionPartitionInfo {
    Unknown,
    Mbr {
        partition_type: u32,
        is_active: bool,
    },
    Gpt {
        partition_type: Guid,
        partition_id: Guid,
        attributes: u64,
    },
}

impl RegionPartitionInfo {
    pub fn style(&self) -> PartitionStyle {
        match self {
            RegionPartitionInfo::Unknown => PartitionStyle::UNKNOWN,
            RegionPartitionInfo::Mbr { .. } => PartitionStyle::MBR,
            RegionPartitionInfo::Gpt { .. } => PartitionStyle::GPT,
        }
    }
}

impl Default for RegionPartitionInfo {
    fn default() -> Self {
        RegionPartitionInfo::Mbr {
            partition_type: 0,
            is_active: false,
        }
    }
}

impl NdrEncode for RegionPartitionInfo {
    fn encode(&self, writer: &mut NdrWriter) -> Result<(), CodecError> {
        self.style().encode(writer)?;
        writer.align(4);
        match self {
            RegionPartitionInfo::Unknown => Ok(()),
            RegionPartitionInfo::Mbr {
                partition_type,
                is_active,
            } => {
                partition_type.encode(writer)?;
                is_active.encode(writer)
            }
            RegionPartitionInfo::Gpt {
                partition_type,
                partition_id,
                attributes,
            } => {
                partition_type.encode(writer)?;
                partition_id.encode(writer)?;
                attributes.encode(writer)
            }
        }
    }
}

impl NdrDecode for RegionPartitionInfo {
    const MIN_WIRE_SIZE: usize = 2;

    fn decode(reader: &mut NdrReader) -> Result<Self, CodecError> {
        let style = PartitionStyle::decode(reader)?;
        reader.align(4)?;
        match style {
            PartitionStyle::UNKNOWN => Ok(RegionPartitionInfo::Unknown),
            PartitionStyle::MBR => Ok(RegionPartitionInfo::Mbr {
                partition_type: u32::decode(reader)?,
                is_active: bool::decode(reader)?,
            }),
            PartitionStyle::GPT => Ok(RegionPartitionInfo::Gpt {
                partition_type: Guid::decode(reader)?,
                partition_id: Guid::decode(reader)?,
                attributes: u64::decode(reader)?,
            }),
            other => Err(unsupported_style(other)),
        }
    }
}

fn unsupported_style(style: PartitionStyle) -> CodecError {
    CodecError::UnsupportedVariant {
        type_name: "PartitionStyle",
        discriminant: u32::from(style.0),
    }
}

/// 带分区样式的磁盘描述。
#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct DiskInfoEx {
    pub id: LdmObjectId,
    pub length: i64,
    pub free_bytes: i64,
    pub bytes_per_track: u32,
    pub bytes_per_cylinder: u32,
    pub bytes_per_sector: u32,
    pub region_count: u32,
    pub disk_flags: u32,
    pub device_type: u32,
    pub device_state: u32,
    pub bus_type: u32,
    pub attributes: u32,
    pub max_partition_count: u32,
    pub is_upgradeable: bool,
    pub may_switch_style: bool,
    pub partition: DiskPartitionInfo,
    pub port_number: i32,
    pub target_number: i32,
    pub lun_number: i32,
    pub last_known_state: i64,
    pub task_id: LdmObjectId,
    pub name_length: i32,
    pub vendor_length: i32,
    pub adapter_name_length: i32,
    pub dg_name_length: i32,
    pub dev_instance_id_length: i32,
    #[ndr(size_is = name_length)]
    pub name: String,
    #[ndr(size_is = vendor_length)]
    pub vendor: String,
    #[ndr(size_is = adapter_name_length)]
    pub adapter_name: String,
    #[ndr(size_is = dg_name_length)]
    pub dg_name: String,
    #[ndr(size_is = dev_instance_id_length)]
    pub dev_instance_id: String,
}

/// 带分区样式的区域描述。
#[derive(Clone, Debug, Default, PartialEq, Eq, Ndr)]
pub struct RegionInfoEx {
    pub id: LdmObjectId,
    pub disk_id: LdmObjectId,
    pub vol_id: LdmObjectId,
    pub fs_id: LdmObjectId,
    pub start: i64,
    pub length: i64,
    pub region_type: RegionType,
    pub partition: RegionPartitionInfo,
    pub status: RegionStatus,
    pub last_known_state: i64,
    pub task_id: LdmObjectId,
    pub region_flags: u32,
    pub current_partition_number: u32,
    pub name_length: i32,
    #[ndr(size_is = name_length)]
    pub name: String,
}
