//! Server side NFSv4 state: open owners, lock owners, stateids, share
//! reservations and byte-range locks.
//!
//! The [`StateManager`] is shared by every connection of a server. Each
//! open owner, lock owner and file has its own async mutex; requests of one
//! owner are therefore serialized while unrelated owners proceed in
//! parallel. When an operation needs several of them it locks in this order:
//!
//! 1. open owner
//! 2. lock owner
//! 3. file
//! 4. stateid index
//!
//! The stateid index is also locked briefly on its own to find out which
//! owner a presented stateid belongs to before locking that owner.
//!
//! Stateids carry the server boot instance in the first four bytes of
//! `other`, followed by a counter, so they are never all zeros or all ones.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::protocol::xdr::nfs4::lock::{
    exist_lock_owner4, locker4, open_to_lock_owner4, LOCK4args, LOCK4denied, LOCKT4args,
    LOCKU4args,
};
use crate::protocol::xdr::nfs4::{
    lock_owner4, nfs_fh4, nfsstat4, open_owner4, seqid4, stateid4, NFS4_OTHER_SIZE,
    OPEN4_SHARE_ACCESS_READ, OPEN4_SHARE_ACCESS_WRITE,
};

pub mod client;
pub mod lock;
pub mod seqid;
pub mod share;

pub use client::{ClientRecord, ClientTable};
pub use lock::{FileLocks, HeldLock, LockRange};
pub use seqid::{next_seqid, SequenceState};
pub use share::{FileShares, Share};

/// The server-chosen part of a stateid.
pub type StateOther = [u8; NFS4_OTHER_SIZE];

/// Per owner state, for open owners as well as lock owners.
#[derive(Debug)]
pub struct OwnerState {
    key: open_owner4,
    pub sequence: SequenceState,
    /// Set by the first OPEN_CONFIRM; opens of a confirmed owner need no
    /// confirmation. Unused for lock owners.
    confirmed: bool,
    /// Stateids issued to the owner and the file each one refers to
    stateids: Vec<(StateOther, nfs_fh4)>,
}

impl OwnerState {
    fn new(key: open_owner4) -> OwnerState {
        OwnerState { key, sequence: SequenceState::default(), confirmed: false, stateids: Vec::new() }
    }

    pub fn owner(&self) -> &open_owner4 {
        &self.key
    }

    /// An owner that never had a request accepted and holds no stateids.
    fn is_unused(&self) -> bool {
        self.sequence.last().is_none() && self.stateids.is_empty()
    }
}

/// Exclusive access to one open owner, held across a whole OPEN.
pub type OwnerGuard = OwnedMutexGuard<OwnerState>;

#[derive(Debug, Default)]
struct FileState {
    shares: FileShares,
    locks: FileLocks,
}

impl FileState {
    fn is_empty(&self) -> bool {
        self.shares.is_empty() && self.locks.is_empty()
    }
}

#[derive(Clone, Debug)]
struct OpenRecord {
    seqid: seqid4,
    owner: open_owner4,
    file: nfs_fh4,
    confirmed: bool,
    /// The most recently closed open of an owner and file stays known so
    /// that a repeated CLOSE succeeds.
    closed: bool,
    /// Lock stateids derived from this open
    locks: Vec<StateOther>,
}

#[derive(Clone, Debug)]
struct LockRecord {
    seqid: seqid4,
    owner: lock_owner4,
    file: nfs_fh4,
    /// The open this lock stateid was derived from
    open: StateOther,
}

#[derive(Clone, Debug)]
enum StateRecord {
    Open(OpenRecord),
    Lock(LockRecord),
}

type Index = HashMap<StateOther, StateRecord>;
type Table<K, V> = Mutex<HashMap<K, Arc<Mutex<V>>>>;

/// Outcome of a successful OPEN.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OpenGrant {
    pub stateid: stateid4,
    /// The owner is not confirmed yet and the client must send OPEN_CONFIRM.
    pub confirm: bool,
    /// Share mode and seqid an upgraded stateid had before this OPEN
    replaced: Option<(Share, seqid4)>,
}

/// Number of entries in each state table.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StateStats {
    pub open_owners: usize,
    pub lock_owners: usize,
    pub files: usize,
    pub stateids: usize,
}

/// Why a LOCK or LOCKT was refused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockFailure {
    /// NFS4ERR_DENIED: another owner holds a conflicting lock
    Denied(LOCK4denied),
    Status(nfsstat4),
}

impl From<nfsstat4> for LockFailure {
    fn from(stat: nfsstat4) -> Self {
        LockFailure::Status(stat)
    }
}

pub struct StateManager {
    boot: u32,
    counter: AtomicU64,
    open_owners: Table<open_owner4, OwnerState>,
    lock_owners: Table<lock_owner4, OwnerState>,
    files: Table<nfs_fh4, FileState>,
    index: Mutex<Index>,
    clients: ClientTable,
}

impl std::fmt::Debug for StateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("StateManager").field("boot", &self.boot).finish()
    }
}

impl StateManager {
    /// Creates an empty state table for a server instance identified by
    /// `generation`.
    pub fn new(generation: u64) -> StateManager {
        let boot = match (generation ^ (generation >> 32)) as u32 {
            0 | u32::MAX => 1,
            boot => boot,
        };
        StateManager {
            boot,
            counter: AtomicU64::new(1),
            open_owners: Mutex::new(HashMap::new()),
            lock_owners: Mutex::new(HashMap::new()),
            files: Mutex::new(HashMap::new()),
            index: Mutex::new(HashMap::new()),
            clients: ClientTable::new(boot),
        }
    }

    pub fn clients(&self) -> &ClientTable {
        &self.clients
    }

    /// Locks the state of `owner`, creating it unseen on first use.
    pub async fn lock_open_owner(&self, owner: &open_owner4) -> OwnerGuard {
        entry(&self.open_owners, owner, || OwnerState::new(owner.clone())).await.lock_owned().await
    }

    /// Forgets `owner` if no request of it was ever accepted, as after a
    /// failed first OPEN. The caller must have released the owner.
    pub async fn forget_open_owner(&self, owner: &open_owner4) {
        remove_idle(&self.open_owners, owner, OwnerState::is_unused).await;
    }

    /// Records an open of `fh` for `owner` after checking it against the
    /// reservations of every other open of the file.
    ///
    /// A second open of the same file by the same owner upgrades the
    /// existing stateid to the union of both share modes. On success the
    /// owner's sequence id moves to `seqid`.
    pub async fn grant_open(
        &self,
        owner: &mut OwnerState,
        seqid: seqid4,
        fh: &nfs_fh4,
        share: Share,
    ) -> Result<OpenGrant, nfsstat4> {
        let res = self.record_open(owner, seqid, fh, share).await;
        if res.is_err() {
            self.prune_file(fh).await;
        }
        res
    }

    async fn record_open(
        &self,
        owner: &mut OwnerState,
        seqid: seqid4,
        fh: &nfs_fh4,
        share: Share,
    ) -> Result<OpenGrant, nfsstat4> {
        let file = entry(&self.files, fh, FileState::default).await;
        let mut file = file.lock().await;
        let mut index = self.index.lock().await;

        let existing = owner.stateids.iter().map(|(other, _)| *other).find(|other| {
            matches!(index.get(other), Some(StateRecord::Open(r)) if r.file == *fh && !r.closed)
        });
        let (stateid, replaced) = match existing {
            Some(other) => {
                let current = file.shares.get(&other).unwrap_or_default();
                let merged = current.union(&share);
                file.shares.check(Some(&other), &merged)?;
                let Some(StateRecord::Open(record)) = index.get(&other) else {
                    return Err(nfsstat4::NFS4ERR_BAD_STATEID);
                };
                let before = record.seqid;
                file.shares.insert(other, merged);
                (bump(&mut index, &other)?, Some((current, before)))
            }
            None => {
                file.shares.check(None, &share)?;
                // a new open of the file supersedes the owner's closed one
                owner.stateids.retain(|(other, _)| {
                    let stale = match index.get(other) {
                        Some(StateRecord::Open(r)) => r.closed && r.file == *fh,
                        _ => true,
                    };
                    if stale {
                        index.remove(other);
                    }
                    !stale
                });
                let other = self.new_other();
                file.shares.insert(other, share);
                index.insert(
                    other,
                    StateRecord::Open(OpenRecord {
                        seqid: 1,
                        owner: owner.key.clone(),
                        file: fh.clone(),
                        confirmed: owner.confirmed,
                        closed: false,
                        locks: Vec::new(),
                    }),
                );
                owner.stateids.push((other, fh.clone()));
                (stateid4 { seqid: 1, other }, None)
            }
        };
        owner.sequence.advance(seqid);
        debug!("open granted {:?} on {:?}", stateid, fh);
        Ok(OpenGrant { stateid, confirm: !owner.confirmed, replaced })
    }

    /// Takes back `grant` when the OPEN fails after it was recorded, and
    /// puts the owner's sequence back to `sequence`.
    pub async fn withdraw_open(
        &self,
        owner: &mut OwnerState,
        sequence: SequenceState,
        fh: &nfs_fh4,
        grant: &OpenGrant,
    ) {
        let other = grant.stateid.other;
        if let Some(file) = existing(&self.files, fh).await {
            let mut file = file.lock().await;
            let mut index = self.index.lock().await;
            match grant.replaced {
                Some((share, seqid)) => {
                    file.shares.insert(other, share);
                    if let Some(StateRecord::Open(record)) = index.get_mut(&other) {
                        record.seqid = seqid;
                    }
                }
                None => {
                    file.shares.remove(&other);
                    index.remove(&other);
                    owner.stateids.retain(|(o, _)| *o != other);
                }
            }
        }
        owner.sequence = sequence;
        debug!("open withdrawn {:?} on {:?}", grant.stateid, fh);
        self.prune_file(fh).await;
    }

    /// OPEN_CONFIRM: confirms a fresh open and with it the open owner.
    pub async fn open_confirm(
        &self,
        fh: &nfs_fh4,
        stateid: &stateid4,
        seqid: seqid4,
    ) -> Result<stateid4, nfsstat4> {
        let record = self.open_record(&stateid.other).await?;
        let owner = existing(&self.open_owners, &record.owner).await.ok_or(nfsstat4::NFS4ERR_BAD_STATEID)?;
        let mut owner = owner.lock().await;
        let accepted = owner.sequence.check(seqid)?;
        let mut index = self.index.lock().await;
        let Some(StateRecord::Open(record)) = index.get_mut(&stateid.other) else {
            return Err(nfsstat4::NFS4ERR_BAD_STATEID);
        };
        if record.closed || record.confirmed || record.file != *fh {
            return Err(nfsstat4::NFS4ERR_BAD_STATEID);
        }
        check_fresh(record.seqid, stateid)?;
        record.confirmed = true;
        record.seqid = next_seqid(record.seqid);
        let confirmed = stateid4 { seqid: record.seqid, other: stateid.other };
        owner.confirmed = true;
        owner.sequence.advance(accepted);
        Ok(confirmed)
    }

    /// OPEN_DOWNGRADE: narrows the share mode of an open. The new access and
    /// deny bits must be subsets of the current ones.
    pub async fn open_downgrade(
        &self,
        fh: &nfs_fh4,
        stateid: &stateid4,
        seqid: seqid4,
        access: u32,
        deny: u32,
    ) -> Result<stateid4, nfsstat4> {
        let record = self.open_record(&stateid.other).await?;
        let owner = existing(&self.open_owners, &record.owner).await.ok_or(nfsstat4::NFS4ERR_BAD_STATEID)?;
        let mut owner = owner.lock().await;
        let accepted = owner.sequence.check(seqid)?;
        let file = entry(&self.files, &record.file, FileState::default).await;
        let mut file = file.lock().await;
        let mut index = self.index.lock().await;

        let current = usable_open(&index, &file, fh, stateid)?;
        let requested = Share::new(access, deny)?;
        if !requested.is_subset_of(&current) {
            return Err(nfsstat4::NFS4ERR_INVAL);
        }
        file.shares.insert(stateid.other, requested);
        let downgraded = bump(&mut index, &stateid.other)?;
        owner.sequence.advance(accepted);
        Ok(downgraded)
    }

    /// CLOSE: releases the share reservation of an open.
    ///
    /// Closing an already closed stateid succeeds again. An open whose
    /// lock owners still hold locks on the file cannot be closed.
    pub async fn close(
        &self,
        fh: &nfs_fh4,
        stateid: &stateid4,
        seqid: seqid4,
    ) -> Result<stateid4, nfsstat4> {
        let res = self.close_open(fh, stateid, seqid).await;
        self.prune_file(fh).await;
        res
    }

    async fn close_open(
        &self,
        fh: &nfs_fh4,
        stateid: &stateid4,
        seqid: seqid4,
    ) -> Result<stateid4, nfsstat4> {
        let record = self.open_record(&stateid.other).await?;
        let owner = existing(&self.open_owners, &record.owner).await.ok_or(nfsstat4::NFS4ERR_BAD_STATEID)?;
        let mut owner = owner.lock().await;
        let accepted = owner.sequence.check(seqid)?;
        let file = entry(&self.files, &record.file, FileState::default).await;
        let mut file = file.lock().await;
        let mut index = self.index.lock().await;

        let record = match index.get(&stateid.other) {
            Some(StateRecord::Open(record)) if record.file == *fh => record.clone(),
            _ => return Err(nfsstat4::NFS4ERR_BAD_STATEID),
        };
        if record.closed {
            owner.sequence.advance(accepted);
            return Ok(stateid4 { seqid: record.seqid, other: stateid.other });
        }
        check_fresh(record.seqid, stateid)?;
        let locks_held = record.locks.iter().any(|lock| {
            matches!(index.get(lock), Some(StateRecord::Lock(l)) if file.locks.holds_any(&l.owner))
        });
        if locks_held {
            return Err(nfsstat4::NFS4ERR_LOCKS_HELD);
        }

        for lock in &record.locks {
            index.remove(lock);
        }
        file.shares.remove(&stateid.other);
        let closed = bump(&mut index, &stateid.other)?;
        if let Some(StateRecord::Open(record)) = index.get_mut(&stateid.other) {
            record.closed = true;
            record.locks.clear();
        }
        owner.sequence.advance(accepted);
        debug!("closed {:?}", closed);
        Ok(closed)
    }

    /// LOCK: acquires a byte-range lock on `fh`.
    pub async fn lock(&self, fh: &nfs_fh4, args: &LOCK4args) -> Result<stateid4, LockFailure> {
        let range = LockRange::new(args.offset, args.length)?;
        let write = args.locktype.is_write();
        let res = match &args.locker {
            locker4::OpenOwner(locker) => {
                let res = self.lock_new_owner(fh, range, write, locker).await;
                if res.is_err() {
                    remove_idle(&self.lock_owners, &locker.lock_owner, OwnerState::is_unused).await;
                }
                res
            }
            locker4::LockOwner(locker) => self.lock_existing_owner(fh, range, write, locker).await,
        };
        if res.is_err() {
            self.prune_file(fh).await;
        }
        res
    }

    /// First lock of a lock owner on a file, derived from an open stateid.
    async fn lock_new_owner(
        &self,
        fh: &nfs_fh4,
        range: LockRange,
        write: bool,
        locker: &open_to_lock_owner4,
    ) -> Result<stateid4, LockFailure> {
        let open = self.open_record(&locker.open_stateid.other).await?;
        let open_owner =
            existing(&self.open_owners, &open.owner).await.ok_or(nfsstat4::NFS4ERR_BAD_STATEID)?;
        let mut open_owner = open_owner.lock().await;
        let open_seqid = open_owner.sequence.check(locker.open_seqid)?;
        let lock_owner =
            entry(&self.lock_owners, &locker.lock_owner, || OwnerState::new(locker.lock_owner.clone()))
                .await;
        let mut lock_owner = lock_owner.lock().await;
        let lock_seqid = lock_owner.sequence.check(locker.lock_seqid)?;
        let file = entry(&self.files, fh, FileState::default).await;
        let mut file = file.lock().await;
        let mut index = self.index.lock().await;

        let share = usable_open(&index, &file, fh, &locker.open_stateid)?;
        check_lock_mode(&share, write)?;
        if let Some(held) = file.locks.conflict(&locker.lock_owner, &range, write) {
            return Err(LockFailure::Denied(held.denied()));
        }

        // lock stateids go away with the open they were derived from
        lock_owner.stateids.retain(|(other, _)| index.contains_key(other));
        let current = lock_owner.stateids.iter().map(|(other, _)| *other).find(|other| {
            matches!(index.get(other), Some(StateRecord::Lock(l)) if l.file == *fh)
        });
        let stateid = match current {
            Some(other) => bump(&mut index, &other)?,
            None => {
                let other = self.new_other();
                index.insert(
                    other,
                    StateRecord::Lock(LockRecord {
                        seqid: 1,
                        owner: locker.lock_owner.clone(),
                        file: fh.clone(),
                        open: locker.open_stateid.other,
                    }),
                );
                if let Some(StateRecord::Open(open)) = index.get_mut(&locker.open_stateid.other) {
                    open.locks.push(other);
                }
                lock_owner.stateids.push((other, fh.clone()));
                stateid4 { seqid: 1, other }
            }
        };
        file.locks.add(&locker.lock_owner, range, write);
        open_owner.sequence.advance(open_seqid);
        lock_owner.sequence.advance(lock_seqid);
        Ok(stateid)
    }

    async fn lock_existing_owner(
        &self,
        fh: &nfs_fh4,
        range: LockRange,
        write: bool,
        locker: &exist_lock_owner4,
    ) -> Result<stateid4, LockFailure> {
        let record = self.lock_record(&locker.lock_stateid.other).await?;
        let owner =
            existing(&self.lock_owners, &record.owner).await.ok_or(nfsstat4::NFS4ERR_BAD_STATEID)?;
        let mut owner = owner.lock().await;
        let accepted = owner.sequence.check(locker.lock_seqid)?;
        let file = entry(&self.files, fh, FileState::default).await;
        let mut file = file.lock().await;
        let mut index = self.index.lock().await;

        let record = usable_lock(&index, fh, &locker.lock_stateid)?;
        let share = file.shares.get(&record.open).ok_or(nfsstat4::NFS4ERR_BAD_STATEID)?;
        check_lock_mode(&share, write)?;
        if let Some(held) = file.locks.conflict(&record.owner, &range, write) {
            return Err(LockFailure::Denied(held.denied()));
        }
        file.locks.add(&record.owner, range, write);
        let stateid = bump(&mut index, &locker.lock_stateid.other)?;
        owner.sequence.advance(accepted);
        Ok(stateid)
    }

    /// LOCKT: reports whether a lock could be granted, without taking it.
    pub async fn lockt(&self, fh: &nfs_fh4, args: &LOCKT4args) -> Result<(), LockFailure> {
        let range = LockRange::new(args.offset, args.length)?;
        let Some(file) = existing(&self.files, fh).await else {
            return Ok(());
        };
        let file = file.lock().await;
        match file.locks.conflict(&args.owner, &range, args.locktype.is_write()) {
            Some(held) => Err(LockFailure::Denied(held.denied())),
            None => Ok(()),
        }
    }

    /// LOCKU: releases a byte range, splitting locks that extend past it.
    pub async fn locku(&self, fh: &nfs_fh4, args: &LOCKU4args) -> Result<stateid4, nfsstat4> {
        let res = self.unlock(fh, args).await;
        self.prune_file(fh).await;
        res
    }

    async fn unlock(&self, fh: &nfs_fh4, args: &LOCKU4args) -> Result<stateid4, nfsstat4> {
        let range = LockRange::new(args.offset, args.length)?;
        let record = self.lock_record(&args.lock_stateid.other).await?;
        let owner =
            existing(&self.lock_owners, &record.owner).await.ok_or(nfsstat4::NFS4ERR_BAD_STATEID)?;
        let mut owner = owner.lock().await;
        let accepted = owner.sequence.check(args.seqid)?;
        let file = entry(&self.files, fh, FileState::default).await;
        let mut file = file.lock().await;
        let mut index = self.index.lock().await;

        let record = usable_lock(&index, fh, &args.lock_stateid)?;
        file.locks.remove(&record.owner, &range);
        let stateid = bump(&mut index, &args.lock_stateid.other)?;
        owner.sequence.advance(accepted);
        Ok(stateid)
    }

    /// RELEASE_LOCKOWNER: forgets a lock owner that holds no locks.
    pub async fn release_lockowner(&self, owner: &lock_owner4) -> Result<(), nfsstat4> {
        self.release_locks_of(owner).await?;
        remove_idle(&self.lock_owners, owner, |state| state.stateids.is_empty()).await;
        Ok(())
    }

    async fn release_locks_of(&self, owner: &lock_owner4) -> Result<(), nfsstat4> {
        let Some(state) = existing(&self.lock_owners, owner).await else {
            return Ok(());
        };
        let mut state = state.lock().await;
        let mut files: Vec<nfs_fh4> = state.stateids.iter().map(|(_, fh)| fh.clone()).collect();
        files.sort();
        files.dedup();
        for fh in &files {
            if let Some(file) = existing(&self.files, fh).await {
                if file.lock().await.locks.holds_any(owner) {
                    return Err(nfsstat4::NFS4ERR_LOCKS_HELD);
                }
            }
        }
        let mut index = self.index.lock().await;
        for (other, _) in state.stateids.drain(..) {
            index.remove(&other);
        }
        state.sequence.reset();
        Ok(())
    }

    /// Checks that `stateid` allows I/O of kind `access`
    /// (`OPEN4_SHARE_ACCESS_READ` or `OPEN4_SHARE_ACCESS_WRITE`) on `fh`.
    ///
    /// The special stateids need no open but fail with NFS4ERR_LOCKED when
    /// some open denies the access. WRITE through an open or lock stateid
    /// requires an open with write access.
    pub async fn check_io(
        &self,
        fh: &nfs_fh4,
        stateid: &stateid4,
        access: u32,
    ) -> Result<(), nfsstat4> {
        if stateid.is_special() {
            if let Some(file) = existing(&self.files, fh).await {
                if file.lock().await.shares.denies(access) {
                    return Err(nfsstat4::NFS4ERR_LOCKED);
                }
            }
            return Ok(());
        }
        let open = {
            let index = self.index.lock().await;
            match index.get(&stateid.other) {
                Some(StateRecord::Open(r)) if !r.closed && r.confirmed && r.file == *fh => {
                    check_fresh(r.seqid, stateid)?;
                    stateid.other
                }
                Some(StateRecord::Lock(l)) if l.file == *fh => {
                    check_fresh(l.seqid, stateid)?;
                    l.open
                }
                _ => return Err(nfsstat4::NFS4ERR_BAD_STATEID),
            }
        };
        let file = existing(&self.files, fh).await.ok_or(nfsstat4::NFS4ERR_BAD_STATEID)?;
        let share = file.lock().await.shares.get(&open).ok_or(nfsstat4::NFS4ERR_BAD_STATEID)?;
        if access & OPEN4_SHARE_ACCESS_WRITE != 0 && share.access & OPEN4_SHARE_ACCESS_WRITE == 0 {
            return Err(nfsstat4::NFS4ERR_OPENMODE);
        }
        Ok(())
    }

    /// Sizes of the state tables.
    pub async fn stats(&self) -> StateStats {
        StateStats {
            open_owners: self.open_owners.lock().await.len(),
            lock_owners: self.lock_owners.lock().await.len(),
            files: self.files.lock().await.len(),
            stateids: self.index.lock().await.len(),
        }
    }

    /// Drops the entry of `fh` once no open or lock refers to it.
    async fn prune_file(&self, fh: &nfs_fh4) {
        remove_idle(&self.files, fh, FileState::is_empty).await;
    }

    /// Number of opens currently holding a share reservation on `fh`.
    pub async fn open_count(&self, fh: &nfs_fh4) -> usize {
        let Some(file) = existing(&self.files, fh).await else {
            return 0;
        };
        let count = file.lock().await.shares.len();
        count
    }

    fn new_other(&self) -> StateOther {
        let mut other = [0; NFS4_OTHER_SIZE];
        other[..4].copy_from_slice(&self.boot.to_be_bytes());
        other[4..].copy_from_slice(&self.counter.fetch_add(1, Ordering::Relaxed).to_be_bytes());
        other
    }

    async fn open_record(&self, other: &StateOther) -> Result<OpenRecord, nfsstat4> {
        match self.index.lock().await.get(other) {
            Some(StateRecord::Open(record)) => Ok(record.clone()),
            _ => Err(nfsstat4::NFS4ERR_BAD_STATEID),
        }
    }

    async fn lock_record(&self, other: &StateOther) -> Result<LockRecord, nfsstat4> {
        match self.index.lock().await.get(other) {
            Some(StateRecord::Lock(record)) => Ok(record.clone()),
            _ => Err(nfsstat4::NFS4ERR_BAD_STATEID),
        }
    }
}

async fn entry<K: Clone + Eq + Hash, V>(
    table: &Table<K, V>,
    key: &K,
    make: impl FnOnce() -> V,
) -> Arc<Mutex<V>> {
    let mut table = table.lock().await;
    table.entry(key.clone()).or_insert_with(|| Arc::new(Mutex::new(make()))).clone()
}

/// Removes the entry of `key` when `idle` holds for it and no request is
/// using it. Callers must not hold the entry themselves.
async fn remove_idle<K: Eq + Hash, V>(table: &Table<K, V>, key: &K, idle: impl FnOnce(&V) -> bool) {
    let mut table = table.lock().await;
    let Some(value) = table.get(key) else {
        return;
    };
    if Arc::strong_count(value) > 1 {
        return;
    }
    let remove = match value.try_lock() {
        Ok(value) => idle(&value),
        Err(_) => false,
    };
    if remove {
        table.remove(key);
    }
}

async fn existing<K: Eq + Hash, V>(table: &Table<K, V>, key: &K) -> Option<Arc<Mutex<V>>> {
    table.lock().await.get(key).cloned()
}

/// A presented stateid must carry the current seqid: newer ones were never
/// issued and older ones have been superseded.
fn check_fresh(current: seqid4, presented: &stateid4) -> Result<(), nfsstat4> {
    match presented.seqid.cmp(&current) {
        std::cmp::Ordering::Equal => Ok(()),
        std::cmp::Ordering::Greater => Err(nfsstat4::NFS4ERR_BAD_STATEID),
        std::cmp::Ordering::Less => Err(nfsstat4::NFS4ERR_OLD_STATEID),
    }
}

/// Advances the seqid of an issued stateid and returns the new value.
fn bump(index: &mut Index, other: &StateOther) -> Result<stateid4, nfsstat4> {
    let seqid = match index.get_mut(other) {
        Some(StateRecord::Open(record)) => {
            record.seqid = next_seqid(record.seqid);
            record.seqid
        }
        Some(StateRecord::Lock(record)) => {
            record.seqid = next_seqid(record.seqid);
            record.seqid
        }
        None => return Err(nfsstat4::NFS4ERR_BAD_STATEID),
    };
    Ok(stateid4 { seqid, other: *other })
}

/// Share mode of a confirmed, open and current open stateid for `fh`.
fn usable_open(
    index: &Index,
    file: &FileState,
    fh: &nfs_fh4,
    stateid: &stateid4,
) -> Result<Share, nfsstat4> {
    match index.get(&stateid.other) {
        Some(StateRecord::Open(r)) if !r.closed && r.confirmed && r.file == *fh => {
            check_fresh(r.seqid, stateid)?;
            file.shares.get(&stateid.other).ok_or(nfsstat4::NFS4ERR_BAD_STATEID)
        }
        _ => Err(nfsstat4::NFS4ERR_BAD_STATEID),
    }
}

fn usable_lock(index: &Index, fh: &nfs_fh4, stateid: &stateid4) -> Result<LockRecord, nfsstat4> {
    match index.get(&stateid.other) {
        Some(StateRecord::Lock(r)) if r.file == *fh => {
            check_fresh(r.seqid, stateid)?;
            Ok(r.clone())
        }
        _ => Err(nfsstat4::NFS4ERR_BAD_STATEID),
    }
}

fn check_lock_mode(share: &Share, write: bool) -> Result<(), nfsstat4> {
    let needed = if write { OPEN4_SHARE_ACCESS_WRITE } else { OPEN4_SHARE_ACCESS_READ };
    if share.access & needed == 0 {
        return Err(nfsstat4::NFS4ERR_OPENMODE);
    }
    Ok(())
}
