//! Positioned byte streams over in-memory file nodes.

use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use crate::core::FileStream;
use crate::vfs::mem_fs::FsInner;
use crate::vfs::node::NodeId;

/// A stream over one file node. Reads and writes operate on a private
/// buffer; modified bytes land back in the node on flush, and dropping the
/// stream flushes.
///
/// The node is remembered by slab index plus generation tag, so a write
/// back into a slot that was deleted and reused fails instead of
/// corrupting an unrelated node.
pub(crate) struct MemoryStream {
    fs: Arc<RwLock<FsInner>>,
    node: NodeId,
    generation: u64,
    buffer: Vec<u8>,
    position: u64,
    readable: bool,
    writable: bool,
    dirty: bool,
}

impl MemoryStream {
    pub(crate) fn new(
        fs: Arc<RwLock<FsInner>>,
        node: NodeId,
        generation: u64,
        buffer: Vec<u8>,
        readable: bool,
        writable: bool,
        position: u64,
    ) -> Self {
        MemoryStream {
            fs,
            node,
            generation,
            buffer,
            position,
            readable,
            writable,
            dirty: false,
        }
    }

    fn write_back(&mut self) -> io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let mut inner = self
            .fs
            .write()
            .map_err(|_| io::Error::other("the filesystem lock is poisoned"))?;
        let node = match inner.tree.node_mut(self.node) {
            Some(node) if node.generation == self.generation => node,
            _ => {
                return Err(io::Error::new(
                    ErrorKind::NotFound,
                    "the file was removed while the stream was open",
                ));
            }
        };
        match node.content_mut() {
            Some(content) => {
                content.clear();
                content.extend_from_slice(&self.buffer);
                node.times.modified = SystemTime::now();
                self.dirty = false;
                Ok(())
            }
            None => Err(io::Error::other("the node is no longer a file")),
        }
    }

    fn cursor(&self) -> io::Result<usize> {
        usize::try_from(self.position)
            .map_err(|_| io::Error::new(ErrorKind::InvalidInput, "stream position overflow"))
    }
}

impl Read for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.readable {
            return Err(io::Error::new(
                ErrorKind::PermissionDenied,
                "the stream is not open for reading",
            ));
        }
        let at = self.cursor()?;
        if at >= self.buffer.len() {
            return Ok(0);
        }
        let available = &self.buffer[at..];
        let amount = available.len().min(buf.len());
        buf[..amount].copy_from_slice(&available[..amount]);
        self.position += amount as u64;
        Ok(amount)
    }
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.writable {
            return Err(io::Error::new(
                ErrorKind::PermissionDenied,
                "the stream is not open for writing",
            ));
        }
        let at = self.cursor()?;
        if at > self.buffer.len() {
            self.buffer.resize(at, 0);
        }
        let overlap = (self.buffer.len() - at).min(buf.len());
        self.buffer[at..at + overlap].copy_from_slice(&buf[..overlap]);
        self.buffer.extend_from_slice(&buf[overlap..]);
        self.position += buf.len() as u64;
        self.dirty = true;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.write_back()
    }
}

impl Seek for MemoryStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(at) => Some(at),
            SeekFrom::End(delta) => (self.buffer.len() as u64).checked_add_signed(delta),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
        };
        match target {
            Some(at) => {
                self.position = at;
                Ok(at)
            }
            None => Err(io::Error::new(
                ErrorKind::InvalidInput,
                "seek before the start of the stream",
            )),
        }
    }
}

impl FileStream for MemoryStream {}

impl Drop for MemoryStream {
    fn drop(&mut self) {
        let _ = self.write_back();
    }
}
