use std::fmt::Debug;
use std::io::ErrorKind;

use nfs4_mamont::client::ops;
use nfs4_mamont::xdr::nfs4::attr::{FileAttributes, FATTR4_MODE, FATTR4_SIZE, FATTR4_TYPE};
use nfs4_mamont::xdr::nfs4::dir::{createtype4, secinfo4, SECINFO4res, SECINFO4resok};
use nfs4_mamont::xdr::nfs4::file::stable_how4;
use nfs4_mamont::xdr::nfs4::lock::{nfs_lock_type4, LOCK4denied, LOCK4res};
use nfs4_mamont::xdr::nfs4::open::{open_delegation4, OPEN4res, OPEN4resok};
use nfs4_mamont::xdr::nfs4::{
    bitmap4, change_info4, fattr4, nfs_argop4, nfs_ftype4, nfs_resop4, nfsstat4, specdata4,
    stateid4, NfsResult, COMPOUND4args, COMPOUND4res, OPEN4_RESULT_LOCKTYPE_POSIX,
};
use nfs4_mamont::xdr::{deserialize, from_bytes, to_bytes, Deserialize, Serialize};

#[derive(Default)]
struct Context {
    buf: Vec<u8>,
}

trait TestValue: Deserialize + Serialize + Eq + Default + Debug + Clone {}
impl<T: Deserialize + Serialize + Eq + Default + Debug + Clone> TestValue for T {}

impl Context {
    fn check<T: TestValue>(&mut self, src_value: &T) {
        for capacity in 0..32 {
            for exsist in 0..capacity {
                self.buf = Vec::with_capacity(capacity);
                self.buf.resize(exsist, Default::default());

                src_value.serialize(&mut self.buf).expect("cannot serialize");
                assert_eq!((self.buf.len() - exsist) % 4, 0);

                let result_value =
                    deserialize::<T>(&mut &self.buf[exsist..]).expect("cannot deserialize");

                assert_eq!(src_value, &result_value);
            }
        }
    }

    fn check_multi<T: TestValue>(&mut self, src_values: &[T]) {
        src_values.iter().for_each(|i| self.check(i));
    }
}

#[derive(Default, PartialEq, Eq, Debug, Clone)]
struct TestForVecU8(Vec<u8>);

impl Serialize for TestForVecU8 {
    fn serialize<W: std::io::Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.0.serialize(dest)
    }
}

impl Deserialize for TestForVecU8 {
    fn deserialize<R: std::io::Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.0.deserialize(src)
    }
}

#[derive(Default, PartialEq, Eq, Debug, Clone)]
struct TestForVec<T>(Vec<T>);

impl<T: TestValue> Serialize for TestForVec<T> {
    fn serialize<W: std::io::Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.0.serialize(dest)
    }
}

impl<T: TestValue> Deserialize for TestForVec<T> {
    fn deserialize<R: std::io::Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.0.deserialize(src)
    }
}

#[derive(Default, PartialEq, Eq, Debug, Clone)]
struct TestForString(String);

impl Serialize for TestForString {
    fn serialize<W: std::io::Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.0.serialize(dest)
    }
}

impl Deserialize for TestForString {
    fn deserialize<R: std::io::Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.0.deserialize(src)
    }
}

#[test]
fn test_scalar_bijection() {
    let mut ctx = Context::default();

    ctx.check_multi(&[true, false]);

    ctx.check_multi(&[i32::MIN, -1i32, 0i32, 1i32, i32::MAX]);
    ctx.check_multi(&[i64::MIN, -1i64, 0i64, 1i64, i64::MAX]);

    ctx.check_multi(&[u32::MIN, 0u32, 1u32, 2u32, u32::MAX]);
    ctx.check_multi(&[u64::MIN, 0u64, 1u64, 2u64, u64::MAX]);
}

#[test]
fn test_array_bijection() {
    let mut ctx = Context::default();

    ctx.check(&[1u8]);
    ctx.check(&[1u8, 2u8, 3u8]);
    ctx.check(&[1u8, 2u8, 3u8, 4u8, 5u8, 6u8]);

    ctx.check(&[0u32]);
    ctx.check(&[1u32, 2u32, 3u32]);
    ctx.check(&[1u64, 2u64, 3u64]);
    ctx.check(&[1u64, 2u64, 3u64, 4u64]);
    ctx.check(&[1u64, 2u64, 3u64, 4u64, 5u64]);
}

#[test]
fn test_str_bijection() {
    let mut ctx = Context::default();

    ctx.check_multi(&[
        TestForString(String::from("")),
        TestForString(String::from("abc1234+-")),
        TestForString(String::from("abc")),
    ]);
}

#[test]
fn test_vec_bijection() {
    let mut ctx = Context::default();

    ctx.check_multi(&[
        TestForVecU8(vec![]),
        TestForVecU8(vec![1u8]),
        TestForVecU8(vec![1u8, 2u8, 3u8]),
        TestForVecU8(vec![1u8, 2u8, 3u8, 4u8]),
    ]);
    ctx.check_multi(&[
        TestForVec(vec![]),
        TestForVec(vec![1u32]),
        TestForVec(vec![1u32, 2u32, 3u32]),
        TestForVec(vec![1u32, 2u32, 3u32, 4u32]),
    ]);
    ctx.check_multi(&[
        TestForVec(vec![]),
        TestForVec(vec![1u64]),
        TestForVec(vec![1u64, 2u64, 3u64]),
        TestForVec(vec![1u64, 2u64, 3u64, 4u64]),
    ]);
}

#[test]
fn test_nfs4_message_bijection() {
    let mut ctx = Context::default();
    let owner = ops::state_owner(0x1122334455667788, b"owner");

    ctx.check_multi(&[stateid4::ANONYMOUS, stateid4::READ_BYPASS, stateid4 { seqid: 7, other: [9; 12] }]);
    ctx.check_multi(&[
        ops::putrootfh(),
        ops::lookup("a file"),
        ops::open(
            u32::MAX,
            3,
            0,
            owner.clone(),
            ops::create_exclusive([1, 2, 3, 4, 5, 6, 7, 8]),
            ops::claim_null("new"),
        ),
        ops::lock(
            nfs_lock_type4::WRITEW_LT,
            false,
            0,
            u64::MAX,
            ops::new_lock_owner(1, stateid4::ANONYMOUS, 0, owner.clone()),
        ),
        ops::create(createtype4::NF4CHR(specdata4 { specdata1: 1, specdata2: 2 }), "dev", fattr4::default()),
        ops::create(createtype4::NF4LNK("target".to_string()), "link", fattr4::default()),
        ops::write(stateid4::READ_BYPASS, u64::MAX, stable_how4::FILE_SYNC4, vec![1, 2, 3]),
    ]);
    ctx.check_multi(&[
        LOCK4res::Denied(LOCK4denied {
            offset: 10,
            length: 20,
            locktype: nfs_lock_type4::READ_LT,
            owner,
        }),
        LOCK4res::Err(nfsstat4::NFS4ERR_BAD_SEQID),
    ]);
    ctx.check(&OPEN4res::Ok(OPEN4resok {
        stateid: stateid4 { seqid: 1, other: [4; 12] },
        cinfo: change_info4 { atomic: false, before: 1, after: 2 },
        rflags: OPEN4_RESULT_LOCKTYPE_POSIX,
        attrset: bitmap4::from_attrs(&[FATTR4_SIZE]),
        delegation: open_delegation4::OPEN_DELEGATE_NONE,
    }));
    ctx.check::<SECINFO4res>(&NfsResult::Ok(SECINFO4resok(vec![
        secinfo4::AUTH_SYS,
        secinfo4::AUTH_NONE,
    ])));
}

#[test]
fn test_special_stateids_keep_their_bytes() {
    let bytes = to_bytes(&stateid4::READ_BYPASS).expect("encode");
    assert_eq!(bytes, [0xff; 16]);
    let decoded = from_bytes::<stateid4>(&bytes).expect("decode");
    assert!(decoded.is_special());
    assert_eq!(decoded, stateid4::READ_BYPASS);

    let bytes = to_bytes(&stateid4::ANONYMOUS).expect("encode");
    assert_eq!(bytes, [0; 16]);
}

#[test]
fn test_bitmap_ignores_trailing_zero_words() {
    let padded = bitmap4([1u32 << FATTR4_TYPE, 0, 0].into_iter().collect());
    let compact = bitmap4::from_attrs(&[FATTR4_TYPE]);
    assert_eq!(padded, compact);

    let decoded = from_bytes::<bitmap4>(&to_bytes(&padded).expect("encode")).expect("decode");
    assert_eq!(decoded.0.len(), 3);
    assert_eq!(decoded, compact);
    assert_eq!(decoded.iter().collect::<Vec<_>>(), vec![FATTR4_TYPE]);
}

#[test]
fn test_fattr_values_follow_attribute_order() {
    let attrs = FileAttributes {
        file_type: Some(nfs_ftype4::NF4REG),
        size: Some(0x0102030405060708),
        mode: Some(0o644),
        ..FileAttributes::default()
    };
    let fattr = attrs.to_fattr().expect("encode");
    assert_eq!(fattr.attrmask, bitmap4::from_attrs(&[FATTR4_TYPE, FATTR4_SIZE, FATTR4_MODE]));

    let mut expected = Vec::new();
    expected.extend_from_slice(&1u32.to_be_bytes());
    expected.extend_from_slice(&0x0102030405060708u64.to_be_bytes());
    expected.extend_from_slice(&0o644u32.to_be_bytes());
    assert_eq!(fattr.attr_vals, expected);

    assert_eq!(FileAttributes::from_fattr(&fattr).expect("decode"), attrs);
}

#[test]
fn test_fattr_rejects_trailing_values() {
    let mut fattr = FileAttributes { mode: Some(0o600), ..FileAttributes::default() }
        .to_fattr()
        .expect("encode");
    fattr.attr_vals.extend_from_slice(&[0, 0, 0, 1]);
    assert!(FileAttributes::from_fattr(&fattr).is_err());
}

#[test]
fn test_compound_decoding_stops_at_unknown_opcode() {
    let mut bytes = Vec::new();
    "tag".serialize(&mut bytes).expect("tag");
    0u32.serialize(&mut bytes).expect("minor version");
    3u32.serialize(&mut bytes).expect("count");
    ops::putrootfh().serialize(&mut bytes).expect("putrootfh");
    9999u32.serialize(&mut bytes).expect("unknown opcode");
    // undecodable remainder
    bytes.extend_from_slice(&[0xde, 0xad]);

    let args = deserialize::<COMPOUND4args>(&mut &bytes[..]).expect("decode");
    assert_eq!(args.tag, "tag");
    assert_eq!(args.argarray, vec![nfs_argop4::OP_PUTROOTFH(()), nfs_argop4::OP_ILLEGAL]);
}

#[test]
fn test_compound_reply_bijection() {
    let mut ctx = Context::default();
    ctx.check(&COMPOUND4res {
        status: nfsstat4::NFS4ERR_NOENT,
        tag: "reply".to_string(),
        resarray: vec![
            nfs_resop4::OP_PUTROOTFH(NfsResult::Ok(())),
            nfs_resop4::OP_LOOKUP(NfsResult::Err(nfsstat4::NFS4ERR_NOENT)),
        ],
    });
    ctx.check(&COMPOUND4res {
        status: nfsstat4::NFS4ERR_OP_ILLEGAL,
        tag: String::new(),
        resarray: vec![nfs_resop4::illegal()],
    });
}

#[test]
fn test_truncated_input_is_unexpected_eof() {
    let bytes = to_bytes(&ops::lookup("some name")).expect("encode");
    for len in 0..bytes.len() {
        let err = deserialize::<nfs_argop4>(&mut &bytes[..len]).expect_err("truncated");
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof, "prefix of {len} bytes");
    }
}

#[test]
fn test_malformed_input_is_invalid_data() {
    let err = deserialize::<bool>(&mut &2u32.to_be_bytes()[..]).expect_err("bool 2");
    assert_eq!(err.kind(), ErrorKind::InvalidData);

    let mut bytes = Vec::new();
    [0xffu8, 0xfe].as_slice().serialize(&mut bytes).expect("encode");
    let err = deserialize::<String>(&mut &bytes[..]).expect_err("invalid utf-8");
    assert_eq!(err.kind(), ErrorKind::InvalidData);

    let err = deserialize::<nfsstat4>(&mut &1234567u32.to_be_bytes()[..]).expect_err("status");
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[test]
fn test_huge_length_prefix_does_not_allocate() {
    let bytes = u32::MAX.to_be_bytes();
    let err = deserialize::<Vec<u8>>(&mut &bytes[..]).expect_err("short opaque");
    assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    let err = deserialize::<Vec<u64>>(&mut &bytes[..]).expect_err("short array");
    assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
}
