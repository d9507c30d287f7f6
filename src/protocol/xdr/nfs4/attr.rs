//! File attributes (RFC 7530 section 5).
//!
//! On the wire attributes travel as a [`fattr4`]: a [`bitmap4`] naming the
//! attributes present, followed by an opaque blob holding their values in
//! ascending attribute number order. [`FileAttributes`] is the typed view of
//! that blob; converting between the two walks the mask bit by bit.

use std::io::{Read, Write};

use super::{
    bitmap4, changeid4, deserialize, fattr4, fsid4, nfs_fh4, nfs_ftype4, nfsace4, nfsstat4,
    nfstime4, settime4, specdata4, utf8str_cs, utf8str_mixed, utils, Serialize,
};

macro_rules! file_attributes {
    ($($bit:literal => $konst:ident, $field:ident : $ty:ty;)*) => {
        $(
            pub const $konst: u32 = $bit;
        )*

        /// Decoded attribute values; `None` means the attribute is absent.
        #[derive(Clone, Debug, Default, PartialEq, Eq)]
        pub struct FileAttributes {
            $(pub $field: Option<$ty>,)*
        }

        impl FileAttributes {
            /// Every attribute number this implementation can encode and decode.
            pub fn known_attrs() -> bitmap4 {
                bitmap4::from_attrs(&[$($konst),*])
            }

            /// Mask of the attributes that carry a value.
            pub fn mask(&self) -> bitmap4 {
                let mut mask = bitmap4::new();
                $(
                    if self.$field.is_some() {
                        mask.set($konst);
                    }
                )*
                mask
            }

            /// Keeps only the attributes selected by `mask`.
            pub fn retain(&mut self, mask: &bitmap4) {
                $(
                    if !mask.is_set($konst) {
                        self.$field = None;
                    }
                )*
            }

            fn encode_values<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
                // fields are declared in ascending attribute order
                $(
                    if let Some(val) = &self.$field {
                        val.serialize(dest)?;
                    }
                )*
                Ok(())
            }

            fn decode_value<R: Read>(&mut self, attr: u32, src: &mut R) -> std::io::Result<()> {
                match attr {
                    $($konst => self.$field = Some(deserialize(src)?),)*
                    unknown => {
                        return Err(utils::invalid_data(&format!(
                            "unsupported attribute number {unknown}"
                        )))
                    }
                }
                Ok(())
            }
        }
    };
}

file_attributes! {
    0 => FATTR4_SUPPORTED_ATTRS, supported_attrs: bitmap4;
    1 => FATTR4_TYPE, file_type: nfs_ftype4;
    2 => FATTR4_FH_EXPIRE_TYPE, fh_expire_type: u32;
    3 => FATTR4_CHANGE, change: changeid4;
    4 => FATTR4_SIZE, size: u64;
    5 => FATTR4_LINK_SUPPORT, link_support: bool;
    6 => FATTR4_SYMLINK_SUPPORT, symlink_support: bool;
    7 => FATTR4_NAMED_ATTR, named_attr: bool;
    8 => FATTR4_FSID, fsid: fsid4;
    9 => FATTR4_UNIQUE_HANDLES, unique_handles: bool;
    10 => FATTR4_LEASE_TIME, lease_time: u32;
    11 => FATTR4_RDATTR_ERROR, rdattr_error: nfsstat4;
    12 => FATTR4_ACL, acl: Vec<nfsace4>;
    13 => FATTR4_ACLSUPPORT, aclsupport: u32;
    14 => FATTR4_ARCHIVE, archive: bool;
    15 => FATTR4_CANSETTIME, cansettime: bool;
    16 => FATTR4_CASE_INSENSITIVE, case_insensitive: bool;
    17 => FATTR4_CASE_PRESERVING, case_preserving: bool;
    18 => FATTR4_CHOWN_RESTRICTED, chown_restricted: bool;
    19 => FATTR4_FILEHANDLE, filehandle: nfs_fh4;
    20 => FATTR4_FILEID, fileid: u64;
    21 => FATTR4_FILES_AVAIL, files_avail: u64;
    22 => FATTR4_FILES_FREE, files_free: u64;
    23 => FATTR4_FILES_TOTAL, files_total: u64;
    25 => FATTR4_HIDDEN, hidden: bool;
    26 => FATTR4_HOMOGENEOUS, homogeneous: bool;
    27 => FATTR4_MAXFILESIZE, maxfilesize: u64;
    28 => FATTR4_MAXLINK, maxlink: u32;
    29 => FATTR4_MAXNAME, maxname: u32;
    30 => FATTR4_MAXREAD, maxread: u64;
    31 => FATTR4_MAXWRITE, maxwrite: u64;
    32 => FATTR4_MIMETYPE, mimetype: utf8str_cs;
    33 => FATTR4_MODE, mode: u32;
    34 => FATTR4_NO_TRUNC, no_trunc: bool;
    35 => FATTR4_NUMLINKS, numlinks: u32;
    36 => FATTR4_OWNER, owner: utf8str_mixed;
    37 => FATTR4_OWNER_GROUP, owner_group: utf8str_mixed;
    38 => FATTR4_QUOTA_AVAIL_HARD, quota_avail_hard: u64;
    39 => FATTR4_QUOTA_AVAIL_SOFT, quota_avail_soft: u64;
    40 => FATTR4_QUOTA_USED, quota_used: u64;
    41 => FATTR4_RAWDEV, rawdev: specdata4;
    42 => FATTR4_SPACE_AVAIL, space_avail: u64;
    43 => FATTR4_SPACE_FREE, space_free: u64;
    44 => FATTR4_SPACE_TOTAL, space_total: u64;
    45 => FATTR4_SPACE_USED, space_used: u64;
    46 => FATTR4_SYSTEM, system: bool;
    47 => FATTR4_TIME_ACCESS, time_access: nfstime4;
    48 => FATTR4_TIME_ACCESS_SET, time_access_set: settime4;
    49 => FATTR4_TIME_BACKUP, time_backup: nfstime4;
    50 => FATTR4_TIME_CREATE, time_create: nfstime4;
    51 => FATTR4_TIME_DELTA, time_delta: nfstime4;
    52 => FATTR4_TIME_METADATA, time_metadata: nfstime4;
    53 => FATTR4_TIME_MODIFY, time_modify: nfstime4;
    54 => FATTR4_TIME_MODIFY_SET, time_modify_set: settime4;
    55 => FATTR4_MOUNTED_ON_FILEID, mounted_on_fileid: u64;
}

/// `fs_locations` (24) is a recommended attribute this implementation never
/// supports; it is listed so that requests for it can be recognised.
pub const FATTR4_FS_LOCATIONS: u32 = 24;

/// Attributes that may be set through SETATTR, OPEN and CREATE.
pub fn settable_attrs() -> bitmap4 {
    bitmap4::from_attrs(&[
        FATTR4_SIZE,
        FATTR4_ACL,
        FATTR4_ARCHIVE,
        FATTR4_HIDDEN,
        FATTR4_MIMETYPE,
        FATTR4_MODE,
        FATTR4_OWNER,
        FATTR4_OWNER_GROUP,
        FATTR4_SYSTEM,
        FATTR4_TIME_ACCESS_SET,
        FATTR4_TIME_BACKUP,
        FATTR4_TIME_CREATE,
        FATTR4_TIME_MODIFY_SET,
    ])
}

impl FileAttributes {
    /// Encodes the present attributes into their wire form.
    pub fn to_fattr(&self) -> std::io::Result<fattr4> {
        let mut attr_vals = Vec::new();
        self.encode_values(&mut attr_vals)?;
        Ok(fattr4 { attrmask: self.mask(), attr_vals })
    }

    /// Decodes `fattr.attr_vals` by walking `fattr.attrmask` in ascending order.
    ///
    /// Unknown attribute numbers, truncated values and bytes left over after
    /// the last attribute are all rejected.
    pub fn from_fattr(fattr: &fattr4) -> std::io::Result<FileAttributes> {
        let mut attrs = FileAttributes::default();
        let mut src = fattr.attr_vals.as_slice();
        for attr in fattr.attrmask.iter() {
            attrs.decode_value(attr, &mut src)?;
        }
        if !src.is_empty() {
            return Err(utils::invalid_data("trailing bytes in attribute values"));
        }
        Ok(attrs)
    }
}

impl TryFrom<&fattr4> for FileAttributes {
    type Error = std::io::Error;

    fn try_from(fattr: &fattr4) -> Result<Self, Self::Error> {
        FileAttributes::from_fattr(fattr)
    }
}
