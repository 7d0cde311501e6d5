//! `size_is` 绑定的运行期校验，由 `#[derive(Ndr)]` 生成的代码调用。
//!
//! 计数字段与可变长字段在线上各自独立编码，二者不一致时：
//! - 编码期视为服务端产出违约，返回 [`CodecError::ShapeViolation`]；
//! - 解码期视为输入畸形，返回 [`CodecError::Malformed`]。

use crate::{NdrEncode, NdrWriter, error::CodecError};

/// 可作为 `size_is` 计数的字段类型。负数或超出 `usize` 的值返回 `None`。
pub trait CountField {
    fn as_count(&self) -> Option<usize>;
}

macro_rules! impl_count_field {
    ($($ty:ty),*) => {
        $(
            impl CountField for $ty {
                fn as_count(&self) -> Option<usize> {
                    usize::try_from(*self).ok()
                }
            }
        )*
    };
}

impl_count_field!(u8, u16, u32, u64, i16, i32, i64);

/// 由计数字段约束元素数量的字段类型。
///
/// # 契约说明（What）
/// - `element_count`：值本身至少需要的元素数，用于诊断；
/// - `admits`：声明计数能否承载该值。数组要求严格相等，宽字符串把声明计数视为缓冲区容量；
/// - `encode_sized`：按声明计数写出，默认与无约束编码一致。
pub trait SizedField: NdrEncode {
    fn element_count(&self) -> usize;

    fn admits(&self, declared: usize) -> bool {
        declared == self.element_count()
    }

    fn encode_sized(&self, _declared: usize, writer: &mut NdrWriter) -> Result<(), CodecError> {
        self.encode(writer)
    }
}

impl<T: NdrEncode> SizedField for Vec<T> {
    fn element_count(&self) -> usize {
        self.len()
    }
}

/// 宽字符串按 UTF-16 码元计数，包含结尾 NUL；空串视为缺省字符串，计数为 0。
///
/// 声明计数可以大于文本长度，多出的码元以 NUL 填充；空串接受任意声明计数。
impl SizedField for String {
    fn element_count(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        self.encode_utf16().count() + 1
    }

    fn admits(&self, declared: usize) -> bool {
        self.is_empty() || declared >= self.element_count()
    }

    fn encode_sized(&self, declared: usize, writer: &mut NdrWriter) -> Result<(), CodecError> {
        crate::primitives::encode_wide_buffer(self, declared, writer)
    }
}

/// 编码前校验绑定，返回写出时使用的声明计数。
pub fn ensure_encoded<F: SizedField + ?Sized>(
    field: &'static str,
    declared: Option<usize>,
    value: &F,
) -> Result<usize, CodecError> {
    match declared {
        Some(count) if value.admits(count) => Ok(count),
        _ => Err(CodecError::shape_violation(
            field,
            format!(
                "size_is declares {declared:?} elements but value needs {}",
                value.element_count()
            ),
        )),
    }
}

pub fn ensure_decoded<F: SizedField + ?Sized>(
    field: &'static str,
    declared: Option<usize>,
    value: &F,
    offset: usize,
) -> Result<(), CodecError> {
    match declared {
        Some(count) if value.admits(count) => Ok(()),
        _ => Err(CodecError::malformed(
            offset,
            format!(
                "{field}: size_is declares {declared:?} elements but stub carries {}",
                value.element_count()
            ),
        )),
    }
}
