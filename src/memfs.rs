//! In-memory implementation of [`NFSFileSystem`].
//!
//! `MemFs` keeps every object in a table indexed by file id. Directories
//! hold their children in insertion order, which gives READDIR stable
//! positions. Hard links are real: a name maps to a file id and the object
//! counts its links, so data written through one name is visible through
//! every other.

use std::collections::HashMap;
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::protocol::xdr::nfs4::file::stable_how4;
use crate::protocol::xdr::nfs4::{nfs_ftype4, nfsstat4, nfstime4, settime4, specdata4, verifier4};
use crate::vfs::{
    fileid, Capabilities, DirEntry, FsInfo, Metadata, NFSFileSystem, ReadDirResult,
    SetAttributes,
};

const ROOT_ID: fileid = 1;

/// Largest file kept in memory unless configured otherwise.
const DEFAULT_MAX_FILE_SIZE: u64 = 1 << 30;

#[derive(Debug, Clone)]
enum Contents {
    File { data: Vec<u8>, verifier: Option<verifier4> },
    Directory { parent: fileid, children: Vec<(String, fileid)> },
    Symlink(String),
    Special,
}

#[derive(Debug, Clone)]
struct Node {
    attr: Metadata,
    contents: Contents,
}

#[derive(Debug)]
struct Table {
    nodes: HashMap<fileid, Node>,
    next_id: fileid,
    max_file_size: u64,
}

impl Table {
    fn node(&self, id: fileid) -> Result<&Node, nfsstat4> {
        self.nodes.get(&id).ok_or(nfsstat4::NFS4ERR_STALE)
    }

    fn node_mut(&mut self, id: fileid) -> Result<&mut Node, nfsstat4> {
        self.nodes.get_mut(&id).ok_or(nfsstat4::NFS4ERR_STALE)
    }

    fn children(&self, dirid: fileid) -> Result<&Vec<(String, fileid)>, nfsstat4> {
        match &self.node(dirid)?.contents {
            Contents::Directory { children, .. } => Ok(children),
            _ => Err(nfsstat4::NFS4ERR_NOTDIR),
        }
    }

    fn children_mut(&mut self, dirid: fileid) -> Result<&mut Vec<(String, fileid)>, nfsstat4> {
        match &mut self.node_mut(dirid)?.contents {
            Contents::Directory { children, .. } => Ok(children),
            _ => Err(nfsstat4::NFS4ERR_NOTDIR),
        }
    }

    fn find(&self, dirid: fileid, name: &str) -> Result<Option<fileid>, nfsstat4> {
        Ok(self.children(dirid)?.iter().find(|(n, _)| n == name).map(|(_, id)| *id))
    }

    /// Marks `id` as modified now.
    fn touch(&mut self, id: fileid) {
        if let Some(node) = self.nodes.get_mut(&id) {
            let now = nfstime4::now();
            node.attr.change += 1;
            node.attr.mtime = now;
            node.attr.ctime = now;
        }
    }

    fn insert(
        &mut self,
        dirid: fileid,
        name: &str,
        file_type: nfs_ftype4,
        contents: Contents,
    ) -> Result<fileid, nfsstat4> {
        if self.find(dirid, name)?.is_some() {
            return Err(nfsstat4::NFS4ERR_EXIST);
        }
        let id = self.next_id;
        self.next_id += 1;
        let size = match &contents {
            Contents::Symlink(target) => target.len() as u64,
            _ => 0,
        };
        let mode = match file_type {
            nfs_ftype4::NF4DIR => 0o755,
            nfs_ftype4::NF4LNK => 0o777,
            _ => 0o644,
        };
        let nlink = if file_type == nfs_ftype4::NF4DIR { 2 } else { 1 };
        let now = nfstime4::now();
        let attr = Metadata {
            file_type,
            mode,
            nlink,
            size,
            used: size,
            fileid: id,
            change: 1,
            atime: now,
            mtime: now,
            ctime: now,
            ..Metadata::default()
        };
        self.nodes.insert(id, Node { attr, contents });
        self.children_mut(dirid)?.push((name.to_string(), id));
        self.touch(dirid);
        Ok(id)
    }

    /// Drops one link to `id`, deleting the object with its last link.
    fn unlink(&mut self, id: fileid) {
        let remove = match self.nodes.get_mut(&id) {
            Some(node) if node.attr.file_type != nfs_ftype4::NF4DIR && node.attr.nlink > 1 => {
                node.attr.nlink -= 1;
                node.attr.ctime = nfstime4::now();
                node.attr.change += 1;
                false
            }
            Some(_) => true,
            None => false,
        };
        if remove {
            self.nodes.remove(&id);
        }
    }

    fn apply(&mut self, id: fileid, setattr: &SetAttributes) -> Result<Metadata, nfsstat4> {
        let max_file_size = self.max_file_size;
        let node = self.node_mut(id)?;
        if let Some(size) = setattr.size {
            match &mut node.contents {
                Contents::File { data, .. } => {
                    if size > max_file_size {
                        return Err(nfsstat4::NFS4ERR_FBIG);
                    }
                    let len = usize::try_from(size).map_err(|_| nfsstat4::NFS4ERR_FBIG)?;
                    data.resize(len, 0);
                    node.attr.size = size;
                    node.attr.used = size;
                }
                Contents::Directory { .. } => return Err(nfsstat4::NFS4ERR_ISDIR),
                _ => return Err(nfsstat4::NFS4ERR_INVAL),
            }
        }
        if let Some(mode) = setattr.mode {
            node.attr.mode = mode & 0o7777;
        }
        if let Some(uid) = setattr.uid {
            node.attr.uid = uid;
        }
        if let Some(gid) = setattr.gid {
            node.attr.gid = gid;
        }
        let now = nfstime4::now();
        match setattr.atime {
            Some(settime4::SET_TO_CLIENT_TIME4(t)) => node.attr.atime = t,
            Some(settime4::SET_TO_SERVER_TIME4) => node.attr.atime = now,
            None => {}
        }
        match setattr.mtime {
            Some(settime4::SET_TO_CLIENT_TIME4(t)) => node.attr.mtime = t,
            Some(settime4::SET_TO_SERVER_TIME4) => node.attr.mtime = now,
            None => {}
        }
        if !setattr.is_empty() {
            node.attr.ctime = now;
            node.attr.change += 1;
        }
        Ok(node.attr.clone())
    }

    fn is_ancestor(&self, ancestor: fileid, mut id: fileid) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.nodes.get(&id).map(|n| &n.contents) {
                Some(Contents::Directory { parent, .. }) if *parent != id => id = *parent,
                _ => return false,
            }
        }
    }
}

/// Simple in-memory file system.
#[derive(Debug)]
pub struct MemFs {
    table: RwLock<Table>,
    generation: u64,
}

impl Default for MemFs {
    /// Creates a file system holding just the root directory.
    fn default() -> MemFs {
        let now = nfstime4::now();
        let root = Node {
            attr: Metadata {
                file_type: nfs_ftype4::NF4DIR,
                mode: 0o777,
                nlink: 2,
                fileid: ROOT_ID,
                change: 1,
                atime: now,
                mtime: now,
                ctime: now,
                ..Metadata::default()
            },
            contents: Contents::Directory { parent: ROOT_ID, children: Vec::new() },
        };
        let generation = SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(1);
        MemFs {
            table: RwLock::new(Table {
                nodes: HashMap::from([(ROOT_ID, root)]),
                next_id: 2,
                max_file_size: DEFAULT_MAX_FILE_SIZE,
            }),
            generation,
        }
    }
}

impl MemFs {
    pub fn new() -> MemFs {
        MemFs::default()
    }

    /// Limits the size files may grow to; larger sizes fail with
    /// NFS4ERR_FBIG.
    pub fn with_max_file_size(mut self, max_file_size: u64) -> MemFs {
        self.table.get_mut().max_file_size = max_file_size;
        self
    }

    /// Creates (or replaces the contents of) the regular file at `path`,
    /// creating missing parent directories.
    pub async fn add_file(&self, path: &str, contents: &[u8]) -> Result<fileid, nfsstat4> {
        let (dir, name) = self.make_parents(path).await?;
        let mut table = self.table.write().await;
        let id = match table.find(dir, &name)? {
            Some(id) => id,
            None => table.insert(
                dir,
                &name,
                nfs_ftype4::NF4REG,
                Contents::File { data: Vec::new(), verifier: None },
            )?,
        };
        let node = table.node_mut(id)?;
        match &mut node.contents {
            Contents::File { data, .. } => *data = contents.to_vec(),
            _ => return Err(nfsstat4::NFS4ERR_ISDIR),
        }
        node.attr.size = contents.len() as u64;
        node.attr.used = contents.len() as u64;
        table.touch(id);
        Ok(id)
    }

    /// Creates the directory at `path` and its missing parents.
    pub async fn add_dir(&self, path: &str) -> Result<fileid, nfsstat4> {
        let (dir, name) = self.make_parents(path).await?;
        let mut table = self.table.write().await;
        match table.find(dir, &name)? {
            Some(id) => Ok(id),
            None => table.insert(
                dir,
                &name,
                nfs_ftype4::NF4DIR,
                Contents::Directory { parent: dir, children: Vec::new() },
            ),
        }
    }

    async fn make_parents(&self, path: &str) -> Result<(fileid, String), nfsstat4> {
        let mut components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
        let name = components.pop().ok_or(nfsstat4::NFS4ERR_INVAL)?;
        let mut dir = ROOT_ID;
        for component in components {
            let mut table = self.table.write().await;
            dir = match table.find(dir, component)? {
                Some(id) => id,
                None => table.insert(
                    dir,
                    component,
                    nfs_ftype4::NF4DIR,
                    Contents::Directory { parent: dir, children: Vec::new() },
                )?,
            };
        }
        Ok((dir, name.to_string()))
    }
}

#[async_trait]
impl NFSFileSystem for MemFs {
    fn generation(&self) -> u64 {
        self.generation
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::ReadWrite
    }

    fn root_dir(&self) -> fileid {
        ROOT_ID
    }

    async fn lookup(&self, dirid: fileid, filename: &str) -> Result<fileid, nfsstat4> {
        let table = self.table.read().await;
        table.find(dirid, filename)?.ok_or(nfsstat4::NFS4ERR_NOENT)
    }

    async fn lookup_parent(&self, dirid: fileid) -> Result<fileid, nfsstat4> {
        let table = self.table.read().await;
        match &table.node(dirid)?.contents {
            Contents::Directory { parent, .. } if *parent == dirid => Err(nfsstat4::NFS4ERR_NOENT),
            Contents::Directory { parent, .. } => Ok(*parent),
            _ => Err(nfsstat4::NFS4ERR_NOTDIR),
        }
    }

    async fn getattr(&self, id: fileid) -> Result<Metadata, nfsstat4> {
        let table = self.table.read().await;
        Ok(table.node(id)?.attr.clone())
    }

    async fn setattr(&self, id: fileid, setattr: SetAttributes) -> Result<Metadata, nfsstat4> {
        self.table.write().await.apply(id, &setattr)
    }

    async fn fsinfo(&self) -> Result<FsInfo, nfsstat4> {
        let maxfilesize = self.table.read().await.max_file_size;
        Ok(FsInfo { maxfilesize, ..FsInfo::default() })
    }

    async fn read(
        &self,
        id: fileid,
        offset: u64,
        count: u32,
    ) -> Result<(Vec<u8>, bool), nfsstat4> {
        let table = self.table.read().await;
        let node = table.node(id)?;
        let data = match &node.contents {
            Contents::File { data, .. } => data,
            Contents::Directory { .. } => return Err(nfsstat4::NFS4ERR_ISDIR),
            _ => return Err(nfsstat4::NFS4ERR_INVAL),
        };
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(data.len());
        let end = start.saturating_add(count as usize).min(data.len());
        Ok((data[start..end].to_vec(), end >= data.len()))
    }

    async fn write(
        &self,
        id: fileid,
        offset: u64,
        data: &[u8],
        _stable: stable_how4,
    ) -> Result<(u32, stable_how4), nfsstat4> {
        let mut table = self.table.write().await;
        let max_file_size = table.max_file_size;
        let node = table.node_mut(id)?;
        let bytes = match &mut node.contents {
            Contents::File { data, .. } => data,
            Contents::Directory { .. } => return Err(nfsstat4::NFS4ERR_ISDIR),
            _ => return Err(nfsstat4::NFS4ERR_INVAL),
        };
        match offset.checked_add(data.len() as u64) {
            Some(end) if end <= max_file_size => {}
            _ => return Err(nfsstat4::NFS4ERR_FBIG),
        }
        let start = usize::try_from(offset).map_err(|_| nfsstat4::NFS4ERR_FBIG)?;
        let end = start.checked_add(data.len()).ok_or(nfsstat4::NFS4ERR_FBIG)?;
        if end > bytes.len() {
            bytes.resize(end, 0);
        }
        bytes[start..end].copy_from_slice(data);
        let size = bytes.len() as u64;
        node.attr.size = size;
        node.attr.used = size;
        table.touch(id);
        Ok((data.len() as u32, stable_how4::FILE_SYNC4))
    }

    async fn create(
        &self,
        dirid: fileid,
        filename: &str,
        attr: SetAttributes,
    ) -> Result<fileid, nfsstat4> {
        let mut table = self.table.write().await;
        let id = table.insert(
            dirid,
            filename,
            nfs_ftype4::NF4REG,
            Contents::File { data: Vec::new(), verifier: None },
        )?;
        table.apply(id, &attr)?;
        Ok(id)
    }

    async fn create_exclusive(
        &self,
        dirid: fileid,
        filename: &str,
        verifier: verifier4,
    ) -> Result<fileid, nfsstat4> {
        let mut table = self.table.write().await;
        if let Some(id) = table.find(dirid, filename)? {
            return match &table.node(id)?.contents {
                Contents::File { verifier: Some(v), .. } if *v == verifier => Ok(id),
                _ => Err(nfsstat4::NFS4ERR_EXIST),
            };
        }
        table.insert(
            dirid,
            filename,
            nfs_ftype4::NF4REG,
            Contents::File { data: Vec::new(), verifier: Some(verifier) },
        )
    }

    async fn mkdir(
        &self,
        dirid: fileid,
        dirname: &str,
        attr: SetAttributes,
    ) -> Result<fileid, nfsstat4> {
        let mut table = self.table.write().await;
        let id = table.insert(
            dirid,
            dirname,
            nfs_ftype4::NF4DIR,
            Contents::Directory { parent: dirid, children: Vec::new() },
        )?;
        table.node_mut(dirid)?.attr.nlink += 1;
        table.apply(id, &attr)?;
        Ok(id)
    }

    async fn symlink(
        &self,
        dirid: fileid,
        linkname: &str,
        target: &str,
        attr: SetAttributes,
    ) -> Result<fileid, nfsstat4> {
        let mut table = self.table.write().await;
        let id = table.insert(
            dirid,
            linkname,
            nfs_ftype4::NF4LNK,
            Contents::Symlink(target.to_string()),
        )?;
        table.apply(id, &SetAttributes { size: None, ..attr })?;
        Ok(id)
    }

    async fn mknod(
        &self,
        dirid: fileid,
        name: &str,
        ftype: nfs_ftype4,
        specdata: specdata4,
        attr: SetAttributes,
    ) -> Result<fileid, nfsstat4> {
        let mut table = self.table.write().await;
        let id = table.insert(dirid, name, ftype, Contents::Special)?;
        table.node_mut(id)?.attr.rawdev = specdata;
        table.apply(id, &SetAttributes { size: None, ..attr })?;
        Ok(id)
    }

    async fn remove(&self, dirid: fileid, filename: &str) -> Result<(), nfsstat4> {
        let mut table = self.table.write().await;
        let id = table.find(dirid, filename)?.ok_or(nfsstat4::NFS4ERR_NOENT)?;
        let is_dir = match &table.node(id)?.contents {
            Contents::Directory { children, .. } if !children.is_empty() => {
                return Err(nfsstat4::NFS4ERR_NOTEMPTY)
            }
            Contents::Directory { .. } => true,
            _ => false,
        };
        table.children_mut(dirid)?.retain(|(n, _)| n != filename);
        if is_dir {
            table.node_mut(dirid)?.attr.nlink -= 1;
        }
        table.unlink(id);
        table.touch(dirid);
        Ok(())
    }

    async fn rename(
        &self,
        from_dirid: fileid,
        from_filename: &str,
        to_dirid: fileid,
        to_filename: &str,
    ) -> Result<(), nfsstat4> {
        let mut table = self.table.write().await;
        let id = table.find(from_dirid, from_filename)?.ok_or(nfsstat4::NFS4ERR_NOENT)?;
        table.children(to_dirid)?;
        if from_dirid == to_dirid && from_filename == to_filename {
            return Ok(());
        }
        let moving_dir = table.node(id)?.attr.is_dir();
        if moving_dir && table.is_ancestor(id, to_dirid) {
            return Err(nfsstat4::NFS4ERR_INVAL);
        }
        if let Some(existing) = table.find(to_dirid, to_filename)? {
            if existing == id {
                // Two names of the same file: drop the source name.
                table.children_mut(from_dirid)?.retain(|(n, _)| n != from_filename);
                table.unlink(id);
                table.touch(from_dirid);
                return Ok(());
            }
            let target = table.node(existing)?;
            match (&target.contents, moving_dir) {
                (Contents::Directory { children, .. }, true) if !children.is_empty() => {
                    return Err(nfsstat4::NFS4ERR_EXIST)
                }
                (Contents::Directory { .. }, true) => {}
                (Contents::Directory { .. }, false) | (_, true) => {
                    return Err(nfsstat4::NFS4ERR_EXIST)
                }
                _ => {}
            }
            table.children_mut(to_dirid)?.retain(|(n, _)| n != to_filename);
            if moving_dir {
                table.node_mut(to_dirid)?.attr.nlink -= 1;
            }
            table.unlink(existing);
        }
        table.children_mut(from_dirid)?.retain(|(n, _)| n != from_filename);
        table.children_mut(to_dirid)?.push((to_filename.to_string(), id));
        if moving_dir && from_dirid != to_dirid {
            if let Contents::Directory { parent, .. } = &mut table.node_mut(id)?.contents {
                *parent = to_dirid;
            }
            table.node_mut(from_dirid)?.attr.nlink -= 1;
            table.node_mut(to_dirid)?.attr.nlink += 1;
        }
        table.touch(from_dirid);
        table.touch(to_dirid);
        Ok(())
    }

    async fn link(
        &self,
        file_id: fileid,
        link_dir_id: fileid,
        link_name: &str,
    ) -> Result<(), nfsstat4> {
        let mut table = self.table.write().await;
        if table.node(file_id)?.attr.is_dir() {
            return Err(nfsstat4::NFS4ERR_ISDIR);
        }
        if table.find(link_dir_id, link_name)?.is_some() {
            return Err(nfsstat4::NFS4ERR_EXIST);
        }
        table.children_mut(link_dir_id)?.push((link_name.to_string(), file_id));
        let node = table.node_mut(file_id)?;
        node.attr.nlink += 1;
        node.attr.ctime = nfstime4::now();
        node.attr.change += 1;
        table.touch(link_dir_id);
        Ok(())
    }

    async fn readdir(
        &self,
        dirid: fileid,
        start_index: usize,
        max_entries: usize,
    ) -> Result<ReadDirResult, nfsstat4> {
        let table = self.table.read().await;
        let children = table.children(dirid)?;
        if start_index > children.len() {
            return Err(nfsstat4::NFS4ERR_BAD_COOKIE);
        }
        let mut ret = ReadDirResult::default();
        for (name, id) in children.iter().skip(start_index).take(max_entries) {
            let attr = table.node(*id)?.attr.clone();
            ret.entries.push(DirEntry { fileid: *id, name: name.clone(), attr });
        }
        ret.end = start_index + ret.entries.len() >= children.len();
        Ok(ret)
    }

    async fn readlink(&self, id: fileid) -> Result<String, nfsstat4> {
        let table = self.table.read().await;
        match &table.node(id)?.contents {
            Contents::Symlink(target) => Ok(target.clone()),
            Contents::Directory { .. } => Err(nfsstat4::NFS4ERR_ISDIR),
            _ => Err(nfsstat4::NFS4ERR_INVAL),
        }
    }

    async fn commit(&self, file_id: fileid, _offset: u64, _count: u32) -> Result<(), nfsstat4> {
        let table = self.table.read().await;
        match table.node(file_id)?.contents {
            Contents::Directory { .. } => Err(nfsstat4::NFS4ERR_ISDIR),
            _ => Ok(()),
        }
    }
}
