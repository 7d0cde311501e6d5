use bytes::{BufMut, Bytes, BytesMut};

use crate::reader::padding_for;

/// 唯一指针引用 ID 的起始值，与常见 MS-RPC 实现保持一致，便于抓包对照。
const FIRST_REFERENT_ID: u32 = 0x0002_0000;

/// 存根写入器。
///
/// # 契约说明（What）
/// - 小端序写出，多字节原语在写出前按自身宽度补零对齐；
/// - 引用 ID 在单个写入器内单调递增且永不为 0（0 表示空指针）；
/// - [`NdrWriter::into_bytes`] 冻结缓冲区，结果可在线程间零拷贝共享。
#[derive(Debug)]
pub struct NdrWriter {
    buf: BytesMut,
    next_referent: u32,
}

impl NdrWriter {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            next_referent: FIRST_REFERENT_ID,
        }
    }

    /// 已写出的字节数。
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// 补零直到偏移对齐到 `alignment`。
    pub fn align(&mut self, alignment: usize) {
        let padding = padding_for(self.buf.len(), alignment);
        self.buf.put_bytes(0, padding);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.align(2);
        self.buf.put_u16_le(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.align(4);
        self.buf.put_u32_le(value);
    }

    pub fn write_u64(&mut self, value: u64) {
        self.align(8);
        self.buf.put_u64_le(value);
    }

    /// 原样写出字节，不做对齐。
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// 分配下一个非零引用 ID。
    pub fn next_referent_id(&mut self) -> u32 {
        let id = self.next_referent;
        self.next_referent = self.next_referent.wrapping_add(4).max(FIRST_REFERENT_ID);
        id
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

impl Default for NdrWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_is_relative_to_stub_start() {
        let mut writer = NdrWriter::new();
        writer.write_u8(7);
        writer.write_u64(1);
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[1..8], &[0; 7]);
    }

    #[test]
    fn referent_ids_are_never_null() {
        let mut writer = NdrWriter::new();
        let first = writer.next_referent_id();
        let second = writer.next_referent_id();
        assert_ne!(first, 0);
        assert_ne!(second, 0);
        assert_ne!(first, second);
    }
}
