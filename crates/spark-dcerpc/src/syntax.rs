use core::fmt;

use spark_ndr::{Guid, Ndr};

/// 抽象语法标识：接口 UUID 与 `major.minor` 版本对。
///
/// 多路复用传输以它区分同一连接上的不同接口；静态描述符通过 `const fn` 直接声明。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Ndr)]
pub struct SyntaxId {
    pub uuid: Guid,
    pub version_major: u16,
    pub version_minor: u16,
}

impl SyntaxId {
    pub const fn new(uuid: Guid, version_major: u16, version_minor: u16) -> Self {
        Self {
            uuid,
            version_major,
            version_minor,
        }
    }
}

impl fmt::Display for SyntaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} v{}.{}",
            self.uuid, self.version_major, self.version_minor
        )
    }
}
