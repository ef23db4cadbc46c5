//! Extended-attribute walks and creates driven through read_at / write_at.

mod common;

use common::{attach, walk};
use p9share_core::{Error, OpenFlags};
use p9share_local::xattr::{self, XATTR_CREATE};
use p9share_local::{LocalFile, PendingXattr};
use std::fs;

fn pending(file: &dyn p9share_core::File) -> Option<PendingXattr> {
    file.as_any()
        .downcast_ref::<LocalFile>()
        .unwrap()
        .pending()
        .cloned()
}

macro_rules! require_xattrs {
    ($dir:expr) => {
        if !xattr::supported($dir) {
            eprintln!("Skipping: user xattrs not supported on temp filesystem");
            return;
        }
    };
}

#[test]
fn create_then_write_sets_value() {
    let (tmp, root) = attach();
    require_xattrs!(tmp.path());
    let path = tmp.path().join("f");
    fs::write(&path, "x").unwrap();
    let mut file = walk(&*root, &["f"]);

    file.xattr_create("user.color", 4, 0).unwrap();
    let n = file.write_at(b"blue", 0).unwrap();

    assert_eq!(n, 4);
    assert!(pending(&*file).is_none());
    let mut value = [0u8; 8];
    let len = xattr::get(&path, "user.color", &mut value).unwrap();
    assert_eq!(&value[..len], b"blue");
}

#[test]
fn write_reports_declared_size() {
    let (tmp, root) = attach();
    require_xattrs!(tmp.path());
    fs::write(tmp.path().join("f"), "x").unwrap();
    let mut file = walk(&*root, &["f"]);

    file.xattr_create("user.tag", 10, 0).unwrap();
    assert_eq!(file.write_at(b"abc", 0).unwrap(), 10);
}

#[test]
fn create_flag_conflict_keeps_stage() {
    let (tmp, root) = attach();
    require_xattrs!(tmp.path());
    let path = tmp.path().join("f");
    fs::write(&path, "x").unwrap();
    xattr::set(&path, "user.once", b"1", 0).unwrap();
    let mut file = walk(&*root, &["f"]);

    file.xattr_create("user.once", 1, XATTR_CREATE).unwrap();
    let err = file.write_at(b"2", 0).unwrap_err();

    assert_eq!(err.errno(), nix::libc::EEXIST);
    assert!(pending(&*file).is_some());
}

#[test]
fn create_write_at_non_zero_offset() {
    let (tmp, root) = attach();
    fs::write(tmp.path().join("f"), "x").unwrap();
    let mut file = walk(&*root, &["f"]);

    file.xattr_create("user.a", 1, 0).unwrap();
    let err = file.write_at(b"x", 1).unwrap_err();

    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(err.errno(), nix::libc::EINVAL);
}

#[test]
fn create_does_not_touch_open_data() {
    let (tmp, root) = attach();
    require_xattrs!(tmp.path());
    let path = tmp.path().join("f");
    fs::write(&path, "data").unwrap();
    let mut file = walk(&*root, &["f"]);
    file.open(OpenFlags::READ_WRITE).unwrap();

    file.xattr_create("user.k", 1, 0).unwrap();
    file.write_at(b"v", 0).unwrap();

    assert_eq!(fs::read(&path).unwrap(), b"data");
    file.write_at(b"D", 0).unwrap();
    assert_eq!(fs::read(&path).unwrap(), b"Data");
}

#[test]
fn walk_named_reads_value() {
    let (tmp, root) = attach();
    require_xattrs!(tmp.path());
    let path = tmp.path().join("f");
    fs::write(&path, "x").unwrap();
    xattr::set(&path, "user.color", b"green", 0).unwrap();
    let file = walk(&*root, &["f"]);

    let (mut attr, size) = file.xattr_walk("user.color").unwrap();
    assert_eq!(size, 5);
    assert!(pending(&*file).is_none());
    assert!(matches!(
        pending(&*attr),
        Some(PendingXattr::Walk { ref name, size: 5 }) if name == "user.color"
    ));

    let mut buf = [0u8; 16];
    let n = attr.read_at(&mut buf, 0).unwrap();
    assert_eq!(&buf[..n], b"green");
    assert!(pending(&*attr).is_none());
}

#[test]
fn walk_empty_name_lists_names() {
    let (tmp, root) = attach();
    require_xattrs!(tmp.path());
    let path = tmp.path().join("f");
    fs::write(&path, "x").unwrap();
    xattr::set(&path, "user.a", b"1", 0).unwrap();
    xattr::set(&path, "user.b", b"2", 0).unwrap();
    let file = walk(&*root, &["f"]);

    let (mut attr, size) = file.xattr_walk("").unwrap();
    let mut buf = vec![0u8; size as usize];
    let n = attr.read_at(&mut buf, 0).unwrap();

    let names: Vec<&[u8]> = buf[..n].split(|&b| b == 0).filter(|n| !n.is_empty()).collect();
    assert!(names.contains(&&b"user.a"[..]));
    assert!(names.contains(&&b"user.b"[..]));
}

#[test]
fn walk_empty_buffer_keeps_stage() {
    let (tmp, root) = attach();
    require_xattrs!(tmp.path());
    let path = tmp.path().join("f");
    fs::write(&path, "x").unwrap();
    xattr::set(&path, "user.k", b"value", 0).unwrap();
    let file = walk(&*root, &["f"]);

    let (mut attr, _) = file.xattr_walk("user.k").unwrap();
    assert_eq!(attr.read_at(&mut [], 0).unwrap(), 0);
    assert!(pending(&*attr).is_some());

    let mut buf = [0u8; 8];
    let n = attr.read_at(&mut buf, 0).unwrap();
    assert_eq!(&buf[..n], b"value");
}

#[test]
fn walk_read_at_non_zero_offset() {
    let (tmp, root) = attach();
    require_xattrs!(tmp.path());
    let path = tmp.path().join("f");
    fs::write(&path, "x").unwrap();
    xattr::set(&path, "user.k", b"value", 0).unwrap();
    let file = walk(&*root, &["f"]);

    let (mut attr, _) = file.xattr_walk("user.k").unwrap();
    let err = attr.read_at(&mut [0u8; 8], 2).unwrap_err();

    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(pending(&*attr).is_some());
}

#[test]
fn walk_missing_attribute_fails() {
    let (tmp, root) = attach();
    fs::write(tmp.path().join("f"), "x").unwrap();
    let file = walk(&*root, &["f"]);

    assert!(file.xattr_walk("user.absent").is_err());
}

#[test]
fn write_on_walk_handle_is_rejected() {
    let (tmp, root) = attach();
    require_xattrs!(tmp.path());
    fs::write(tmp.path().join("f"), "x").unwrap();
    let file = walk(&*root, &["f"]);

    let (mut attr, _) = file.xattr_walk("").unwrap();
    let err = attr.write_at(b"x", 0).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn read_while_create_staged_is_rejected() {
    let (tmp, root) = attach();
    fs::write(tmp.path().join("f"), "x").unwrap();
    let mut file = walk(&*root, &["f"]);

    file.xattr_create("user.a", 1, 0).unwrap();
    let err = file.read_at(&mut [0u8; 4], 0).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}
