//! Write Counter module provides a wrapper for Writer implementations that counts
//! bytes written during write operations.
//!
//! READDIR uses it to measure encoded entries so that a reply stays within
//! the byte limit requested by the client.

use std::io::Write;

use crate::protocol::xdr::Serialize;

/// A wrapper around a Writer that counts the number of bytes written
pub struct WriteCounter<W> {
    inner: W,
    count: usize,
}

impl<W> WriteCounter<W>
where
    W: Write,
{
    pub fn new(inner: W) -> Self {
        WriteCounter { inner, count: 0 }
    }

    /// Total number of bytes successfully written so far
    pub fn bytes_written(&self) -> usize {
        self.count
    }
}

impl<W> Write for WriteCounter<W>
where
    W: Write,
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let res = self.inner.write(buf);
        if let Ok(size) = res {
            self.count += size
        }
        res
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Size of the XDR encoding of `value`, without keeping the bytes.
pub fn encoded_len<T: Serialize + ?Sized>(value: &T) -> std::io::Result<usize> {
    let mut counter = WriteCounter::new(std::io::sink());
    value.serialize(&mut counter)?;
    Ok(counter.bytes_written())
}
