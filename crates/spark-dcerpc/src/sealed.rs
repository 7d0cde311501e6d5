//! 内部 sealed 标记，约束公开 trait 的演进边界。
//!
//! # 逻辑解析（How）
//! - `Sealed` 为私有 trait，并对所有类型提供 blanket 实现；
//! - [`crate::registry::InterfaceDescriptor`] 与 [`crate::dispatch::ServerHandle`] 以它为超 trait，
//!   后续可以在不破坏签名的前提下收紧实现者集合或追加默认方法。
pub(crate) trait Sealed {}

impl<T: ?Sized> Sealed for T {}
