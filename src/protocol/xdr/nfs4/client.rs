//! Client id establishment and lease renewal: SETCLIENTID,
//! SETCLIENTID_CONFIRM and RENEW, plus the delegation operations that are
//! recognised but not served.

use std::io::{Read, Write};

use super::{
    clientid4, deserialize, nfsstat4, stateid4, verifier4, Deserialize, NfsResult, OpStatus,
    Serialize,
};
use crate::{DeserializeStruct, SerializeStruct};

/// Long-lived client identity plus a verifier that changes on client reboot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct nfs_client_id4 {
    pub verifier: verifier4,
    pub id: Vec<u8>,
}
SerializeStruct!(nfs_client_id4, verifier, id);
DeserializeStruct!(nfs_client_id4, verifier, id);

/// Universal network address (`netaddr4`, also called `clientaddr4`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct clientaddr4 {
    /// Network id, e.g. "tcp"
    pub r_netid: String,
    /// Universal address, e.g. "127.0.0.1.8.1"
    pub r_addr: String,
}
SerializeStruct!(clientaddr4, r_netid, r_addr);
DeserializeStruct!(clientaddr4, r_netid, r_addr);

/// Callback program the client offers for delegation recalls.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct cb_client4 {
    pub cb_program: u32,
    pub cb_location: clientaddr4,
}
SerializeStruct!(cb_client4, cb_program, cb_location);
DeserializeStruct!(cb_client4, cb_program, cb_location);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SETCLIENTID4args {
    pub client: nfs_client_id4,
    pub callback: cb_client4,
    pub callback_ident: u32,
}
SerializeStruct!(SETCLIENTID4args, client, callback, callback_ident);
DeserializeStruct!(SETCLIENTID4args, client, callback, callback_ident);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SETCLIENTID4resok {
    pub clientid: clientid4,
    pub setclientid_confirm: verifier4,
}
SerializeStruct!(SETCLIENTID4resok, clientid, setclientid_confirm);
DeserializeStruct!(SETCLIENTID4resok, clientid, setclientid_confirm);

/// SETCLIENTID result: NFS4ERR_CLID_INUSE carries the address of the
/// client that holds the id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SETCLIENTID4res {
    Ok(SETCLIENTID4resok),
    ClidInUse(clientaddr4),
    Err(nfsstat4),
}

impl Default for SETCLIENTID4res {
    fn default() -> Self {
        SETCLIENTID4res::Err(nfsstat4::NFS4ERR_SERVERFAULT)
    }
}

impl OpStatus for SETCLIENTID4res {
    fn status(&self) -> nfsstat4 {
        match self {
            SETCLIENTID4res::Ok(_) => nfsstat4::NFS4_OK,
            SETCLIENTID4res::ClidInUse(_) => nfsstat4::NFS4ERR_CLID_INUSE,
            SETCLIENTID4res::Err(stat) => *stat,
        }
    }
}

impl Serialize for SETCLIENTID4res {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.status().serialize(dest)?;
        match self {
            SETCLIENTID4res::Ok(resok) => resok.serialize(dest),
            SETCLIENTID4res::ClidInUse(client_using) => client_using.serialize(dest),
            SETCLIENTID4res::Err(_) => Ok(()),
        }
    }
}

impl Deserialize for SETCLIENTID4res {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = match deserialize::<nfsstat4>(src)? {
            nfsstat4::NFS4_OK => SETCLIENTID4res::Ok(deserialize(src)?),
            nfsstat4::NFS4ERR_CLID_INUSE => SETCLIENTID4res::ClidInUse(deserialize(src)?),
            stat => SETCLIENTID4res::Err(stat),
        };
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SETCLIENTID_CONFIRM4args {
    pub clientid: clientid4,
    pub setclientid_confirm: verifier4,
}
SerializeStruct!(SETCLIENTID_CONFIRM4args, clientid, setclientid_confirm);
DeserializeStruct!(SETCLIENTID_CONFIRM4args, clientid, setclientid_confirm);

pub type SETCLIENTID_CONFIRM4res = NfsResult<()>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RENEW4args {
    pub clientid: clientid4,
}
SerializeStruct!(RENEW4args, clientid);
DeserializeStruct!(RENEW4args, clientid);

pub type RENEW4res = NfsResult<()>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DELEGPURGE4args {
    pub clientid: clientid4,
}
SerializeStruct!(DELEGPURGE4args, clientid);
DeserializeStruct!(DELEGPURGE4args, clientid);

pub type DELEGPURGE4res = NfsResult<()>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DELEGRETURN4args {
    pub deleg_stateid: stateid4,
}
SerializeStruct!(DELEGRETURN4args, deleg_stateid);
DeserializeStruct!(DELEGRETURN4args, deleg_stateid);

pub type DELEGRETURN4res = NfsResult<()>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OPENATTR4args {
    pub createdir: bool,
}
SerializeStruct!(OPENATTR4args, createdir);
DeserializeStruct!(OPENATTR4args, createdir);

pub type OPENATTR4res = NfsResult<()>;
