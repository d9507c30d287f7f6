//! Virtual File System (VFS) module defines the interface between the NFSv4
//! operation handlers and the underlying file system implementations.
//!
//! This module provides:
//! - The core `NFSFileSystem` trait that must be implemented to export a file system
//! - `Metadata` and `SetAttributes`, the file system side view of NFSv4 attributes
//! - File handle management with generation numbers for stale handle detection
//!
//! The VFS layer is deliberately unaware of NFSv4 state: opens, share
//! reservations and byte-range locks are kept by [`crate::state`]. File
//! systems only deal with objects addressed by a 64-bit file id.

use std::cmp::Ordering;

use async_trait::async_trait;

use crate::protocol::xdr::nfs4::{
    self, nfs_fh4, nfs_ftype4, nfsstat4, nfstime4, settime4, specdata4, verifier4,
};

/// Unique file identifier within the file system (similar to an inode number)
pub type fileid = u64;

/// Attributes of a file system object, as far as a file system tracks them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    pub file_type: nfs_ftype4,
    /// Permission bits
    pub mode: u32,
    pub nlink: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    /// Bytes of storage in use
    pub used: u64,
    pub rawdev: specdata4,
    pub fileid: fileid,
    /// Changes every time the object's data or metadata changes
    pub change: u64,
    pub atime: nfstime4,
    pub mtime: nfstime4,
    pub ctime: nfstime4,
}

impl Metadata {
    pub fn is_dir(&self) -> bool {
        self.file_type == nfs_ftype4::NF4DIR
    }
}

/// Attribute changes requested through SETATTR, OPEN or CREATE.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SetAttributes {
    pub mode: Option<u32>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub size: Option<u64>,
    pub atime: Option<settime4>,
    pub mtime: Option<settime4>,
}

impl SetAttributes {
    pub fn is_empty(&self) -> bool {
        *self == SetAttributes::default()
    }
}

/// Directory entry with its attributes
#[derive(Clone, Debug, Default)]
pub struct DirEntry {
    pub fileid: fileid,
    /// File name (without path components)
    pub name: String,
    pub attr: Metadata,
}

/// Result returned by readdir operations
#[derive(Clone, Debug, Default)]
pub struct ReadDirResult {
    pub entries: Vec<DirEntry>,
    /// Indicates if the end of directory has been reached
    pub end: bool,
}

/// Static file system limits reported through the `maxread`, `maxname`
/// and related attributes.
#[derive(Clone, Debug)]
pub struct FsInfo {
    pub maxfilesize: u64,
    pub maxlink: u32,
    pub maxname: u32,
    pub time_delta: nfstime4,
    pub files_total: u64,
    pub files_free: u64,
    pub space_total: u64,
    pub space_free: u64,
}

impl Default for FsInfo {
    fn default() -> Self {
        FsInfo {
            maxfilesize: 128 * 1024 * 1024 * 1024,
            maxlink: 1024,
            maxname: 255,
            time_delta: nfstime4 { seconds: 0, nseconds: 1_000_000 },
            files_total: 1 << 20,
            files_free: 1 << 20,
            space_total: 1 << 40,
            space_free: 1 << 40,
        }
    }
}

/// Defines the access capabilities supported by a file system implementation
pub enum Capabilities {
    /// File system supports read operations only
    ReadOnly,
    /// File system supports both read and write operations
    ReadWrite,
}

/// The basic API to implement to provide an NFSv4 file system
///
/// Opaque FH
/// ---------
/// Files are only uniquely identified by a 64-bit file id. (basically an inode number)
/// We automatically produce internally the opaque filehandle which is comprised of
///  - A 64-bit generation number derived from the server startup time
///   (i.e. so the opaque file handle expires when the NFS server restarts)
///  - The 64-bit file id
///
/// readdir pagination
/// ------------------
/// Directory entries are addressed by their zero-based position. The
/// operation handlers turn positions into READDIR cookies, so entries must be
/// returned in a stable order as long as the directory does not change.
///
/// Other requirements
/// ------------------
///  getattr needs to be fast. NFS uses that a lot
///
///  The 0 fileid is reserved and should not be used
#[async_trait]
pub trait NFSFileSystem: Sync {
    /// Server generation number, embedded into every file handle
    fn generation(&self) -> u64;

    /// Returns the set of capabilities supported by this file system implementation
    fn capabilities(&self) -> Capabilities;

    /// Returns the file ID of the root directory "/"
    fn root_dir(&self) -> fileid;

    /// Looks up `filename` inside directory `dirid`.
    ///
    /// Returns NFS4ERR_NOTDIR if `dirid` is not a directory and
    /// NFS4ERR_NOENT if the name does not exist.
    async fn lookup(&self, dirid: fileid, filename: &str) -> Result<fileid, nfsstat4>;

    /// Returns the parent directory of directory `dirid`.
    ///
    /// The root directory has no parent and yields NFS4ERR_NOENT.
    async fn lookup_parent(&self, dirid: fileid) -> Result<fileid, nfsstat4>;

    /// Returns the attributes of a file or directory
    async fn getattr(&self, id: fileid) -> Result<Metadata, nfsstat4>;

    /// Applies attribute changes and returns the updated attributes.
    /// Read-only file systems should return NFS4ERR_ROFS.
    async fn setattr(&self, id: fileid, setattr: SetAttributes) -> Result<Metadata, nfsstat4>;

    /// Reads up to `count` bytes at `offset`; the flag reports end of file.
    async fn read(&self, id: fileid, offset: u64, count: u32)
        -> Result<(Vec<u8>, bool), nfsstat4>;

    /// Writes `data` at `offset`, extending the file when needed.
    ///
    /// Returns the number of bytes written and the stability actually achieved.
    async fn write(
        &self,
        id: fileid,
        offset: u64,
        data: &[u8],
        stable: nfs4::file::stable_how4,
    ) -> Result<(u32, nfs4::file::stable_how4), nfsstat4>;

    /// Creates a regular file, NFS4ERR_EXIST if the name is taken.
    async fn create(
        &self,
        dirid: fileid,
        filename: &str,
        attr: SetAttributes,
    ) -> Result<fileid, nfsstat4>;

    /// Creates a regular file exclusively.
    ///
    /// If the name exists and was created with the same verifier the existing
    /// file id is returned, so retransmitted requests succeed. Any other
    /// existing object yields NFS4ERR_EXIST.
    async fn create_exclusive(
        &self,
        dirid: fileid,
        filename: &str,
        verifier: verifier4,
    ) -> Result<fileid, nfsstat4>;

    /// Creates a new directory
    async fn mkdir(
        &self,
        dirid: fileid,
        dirname: &str,
        attr: SetAttributes,
    ) -> Result<fileid, nfsstat4>;

    /// Creates a symbolic link named `linkname` pointing to `target`
    async fn symlink(
        &self,
        dirid: fileid,
        linkname: &str,
        target: &str,
        attr: SetAttributes,
    ) -> Result<fileid, nfsstat4>;

    /// Creates a special node (character device, block device, socket, or FIFO)
    async fn mknod(
        &self,
        dirid: fileid,
        name: &str,
        ftype: nfs_ftype4,
        specdata: specdata4,
        attr: SetAttributes,
    ) -> Result<fileid, nfsstat4>;

    /// Removes a file or an empty directory (NFS4ERR_NOTEMPTY otherwise)
    async fn remove(&self, dirid: fileid, filename: &str) -> Result<(), nfsstat4>;

    /// Renames and/or moves an object, replacing a compatible target
    async fn rename(
        &self,
        from_dirid: fileid,
        from_filename: &str,
        to_dirid: fileid,
        to_filename: &str,
    ) -> Result<(), nfsstat4>;

    /// Creates a hard link to `file_id` named `link_name` in `link_dir_id`
    async fn link(
        &self,
        file_id: fileid,
        link_dir_id: fileid,
        link_name: &str,
    ) -> Result<(), nfsstat4>;

    /// Reads up to `max_entries` directory entries starting at position `start_index`.
    ///
    /// A start position past the end of the directory yields NFS4ERR_BAD_COOKIE.
    async fn readdir(
        &self,
        dirid: fileid,
        start_index: usize,
        max_entries: usize,
    ) -> Result<ReadDirResult, nfsstat4>;

    /// Reads the target of a symbolic link
    async fn readlink(&self, id: fileid) -> Result<String, nfsstat4>;

    /// Commits data written to a file to stable storage
    async fn commit(&self, file_id: fileid, offset: u64, count: u32) -> Result<(), nfsstat4>;

    /// Static file system limits. The defaults suit most implementations.
    async fn fsinfo(&self) -> Result<FsInfo, nfsstat4> {
        Ok(FsInfo::default())
    }

    /// Verifier returned by WRITE and COMMIT; it must change whenever
    /// unstable writes may have been lost, so by default it follows the
    /// server generation.
    fn write_verifier(&self) -> verifier4 {
        self.generation().to_be_bytes()
    }

    /// Converts a file ID to an opaque NFS file handle
    ///
    /// The handle combines the server's generation number with the file ID,
    /// so that handles from previous server instances can be detected.
    fn id_to_fh(&self, id: fileid) -> nfs_fh4 {
        let gennum = self.generation();
        let mut ret: Vec<u8> = Vec::with_capacity(16);
        ret.extend_from_slice(&gennum.to_le_bytes());
        ret.extend_from_slice(&id.to_le_bytes());
        nfs_fh4 { data: ret }
    }

    /// Converts an opaque NFS file handle to a file ID
    ///
    /// Returns NFS4ERR_STALE if the file handle is from a previous server
    /// instance and NFS4ERR_BADHANDLE if the file handle is malformed.
    fn fh_to_id(&self, fh: &nfs_fh4) -> Result<fileid, nfsstat4> {
        let (Some(gen), Some(id)) = (le_u64(&fh.data, 0), le_u64(&fh.data, 8)) else {
            return Err(nfsstat4::NFS4ERR_BADHANDLE);
        };
        if fh.data.len() != 16 {
            return Err(nfsstat4::NFS4ERR_BADHANDLE);
        }
        match gen.cmp(&self.generation()) {
            Ordering::Less => Err(nfsstat4::NFS4ERR_STALE),
            Ordering::Greater => Err(nfsstat4::NFS4ERR_BADHANDLE),
            Ordering::Equal => Ok(id),
        }
    }

    /// Resolves a slash separated path from the root directory.
    async fn path_to_id(&self, path: &str) -> Result<fileid, nfsstat4> {
        let mut fid = self.root_dir();
        for component in path.split('/').filter(|c| !c.is_empty()) {
            fid = self.lookup(fid, component).await?;
        }
        Ok(fid)
    }
}

fn le_u64(data: &[u8], start: usize) -> Option<u64> {
    let bytes: [u8; 8] = data.get(start..start + 8)?.try_into().ok()?;
    Some(u64::from_le_bytes(bytes))
}
