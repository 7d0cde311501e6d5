use bytes::Bytes;

use crate::error::CodecError;

/// 存根读取游标。
///
/// # 设计背景（Why）
/// - 存根以 [`Bytes`] 交付，读取游标只推进偏移，字节切片可零拷贝地从原缓冲区共享；
/// - NDR 的对齐以存根起点为基准，游标因此必须记住绝对偏移而非剩余切片。
///
/// # 契约说明（What）
/// - 所有读取均为小端序；多字节原语在读取前按自身宽度对齐；
/// - 任意读取越界都返回 [`CodecError::Truncated`]，游标保持在失败前的位置；
/// - [`NdrReader::ensure_elements`] 用于在分配前拒绝声明数量超过剩余字节的数组，防止恶意计数放大内存。
#[derive(Clone, Debug)]
pub struct NdrReader {
    buf: Bytes,
    pos: usize,
}

impl NdrReader {
    /// 基于完整存根构造游标。
    pub fn new(buf: Bytes) -> Self {
        Self { buf, pos: 0 }
    }

    /// 当前绝对偏移，即已消费的字节数。
    pub fn position(&self) -> usize {
        self.pos
    }

    /// 剩余未读字节数。
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// 跳过填充字节，使偏移对齐到 `alignment`。
    pub fn align(&mut self, alignment: usize) -> Result<(), CodecError> {
        let padding = padding_for(self.pos, alignment);
        if padding > 0 {
            self.advance(padding)?;
        }
        Ok(())
    }

    fn advance(&mut self, len: usize) -> Result<usize, CodecError> {
        if self.remaining() < len {
            return Err(CodecError::Truncated {
                offset: self.pos,
                needed: len,
                remaining: self.remaining(),
            });
        }
        let start = self.pos;
        self.pos += len;
        Ok(start)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let start = self.advance(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[start..start + N]);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        self.align(2)?;
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        self.align(4)?;
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        self.align(8)?;
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    /// 零拷贝读取 `len` 个原始字节，不做对齐。
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes, CodecError> {
        let start = self.advance(len)?;
        Ok(self.buf.slice(start..start + len))
    }

    /// 确认剩余字节足以容纳 `count` 个最小宽度为 `min_size` 的元素。
    pub fn ensure_elements(&self, count: usize, min_size: usize) -> Result<(), CodecError> {
        let needed = count.saturating_mul(min_size.max(1));
        if needed > self.remaining() {
            return Err(CodecError::Truncated {
                offset: self.pos,
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }
}

pub(crate) fn padding_for(pos: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        return 0;
    }
    (alignment - pos % alignment) % alignment
}
