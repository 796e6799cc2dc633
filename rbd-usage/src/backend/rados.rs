// SPDX-License-Identifier: GPL-3.0-only

//! librados/librbd backend
//!
//! Thin unsafe bindings over the native client libraries, wrapped into the
//! [`ClusterBackend`] seam. All calls return negative errno values on
//! failure; the mapping to [`RbdError`] variants happens per call site
//! because the same errno means different things at different steps
//! (`-ENOENT` from `rados_ioctx_create` is a missing pool, from `rbd_open`
//! a missing image).
//!
//! Handles are released in reverse acquisition order: the image closes when
//! its [`RadosImage`] drops, the pool context and session are torn down by
//! [`ClusterSession::disconnect`], which is idempotent and also runs from
//! `Drop`.

use std::ffi::{CStr, CString};
use std::mem;
use std::ptr;

use libc::{c_char, c_int, c_void, size_t};
use tracing::debug;

use rbd_types::{ExtentRecord, ImageStat};

use crate::cluster::{ClusterBackend, ClusterSession, ImageHandle};
use crate::config::ClusterCredentials;
use crate::error::{RbdError, Result};

type RadosT = *mut c_void;
type RadosIoctxT = *mut c_void;
type RbdImageT = *mut c_void;

/// Mirror of librbd's `rbd_image_info_t`
#[repr(C)]
struct RbdImageInfo {
    size: u64,
    obj_size: u64,
    num_objs: u64,
    order: c_int,
    block_name_prefix: [c_char; 24],
    parent_pool: i64,
    parent_name: [c_char; 96],
}

type DiffIterateCb =
    unsafe extern "C" fn(offset: u64, length: size_t, exists: c_int, arg: *mut c_void) -> c_int;

#[link(name = "rados")]
unsafe extern "C" {
    fn rados_create2(
        pcluster: *mut RadosT,
        clustername: *const c_char,
        name: *const c_char,
        flags: u64,
    ) -> c_int;
    fn rados_conf_set(cluster: RadosT, option: *const c_char, value: *const c_char) -> c_int;
    fn rados_connect(cluster: RadosT) -> c_int;
    fn rados_shutdown(cluster: RadosT);
    fn rados_ioctx_create(
        cluster: RadosT,
        pool_name: *const c_char,
        ioctx: *mut RadosIoctxT,
    ) -> c_int;
    fn rados_ioctx_destroy(ioctx: RadosIoctxT);
}

#[link(name = "rbd")]
unsafe extern "C" {
    fn rbd_open_read_only(
        ioctx: RadosIoctxT,
        name: *const c_char,
        image: *mut RbdImageT,
        snap_name: *const c_char,
    ) -> c_int;
    fn rbd_close(image: RbdImageT) -> c_int;
    fn rbd_stat(image: RbdImageT, info: *mut RbdImageInfo, infosize: size_t) -> c_int;
    fn rbd_get_id(image: RbdImageT, id: *mut c_char, id_len: size_t) -> c_int;
    fn rbd_diff_iterate2(
        image: RbdImageT,
        fromsnapname: *const c_char,
        ofs: u64,
        len: u64,
        include_parent: u8,
        whole_object: u8,
        cb: DiffIterateCb,
        arg: *mut c_void,
    ) -> c_int;
}

fn os_error(code: c_int) -> String {
    std::io::Error::from_raw_os_error(-code).to_string()
}

fn c_string(value: &str, what: &str) -> Result<CString> {
    CString::new(value)
        .map_err(|_| RbdError::Operation(format!("{what} contains an interior NUL byte")))
}

/// Backend speaking the native cluster protocol through librados/librbd
pub struct RadosBackend;

impl RadosBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RadosBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterBackend for RadosBackend {
    fn connect(
        &self,
        credentials: &ClusterCredentials,
        pool_name: &str,
    ) -> Result<Box<dyn ClusterSession>> {
        let client_name = c_string(&credentials.client_name, "client name")?;
        let cluster_name = c_string("ceph", "cluster name")?;

        let mut cluster: RadosT = ptr::null_mut();
        let ret =
            unsafe { rados_create2(&mut cluster, cluster_name.as_ptr(), client_name.as_ptr(), 0) };
        if ret < 0 {
            return Err(RbdError::Connection(format!(
                "failed to create cluster handle: {}",
                os_error(ret)
            )));
        }

        // From here on the session owns the handle; any early return tears
        // it down through Drop.
        let mut session = RadosSession {
            cluster,
            ioctx: ptr::null_mut(),
        };

        session.conf_set("mon_host", &credentials.mon_host())?;
        session.conf_set("key", &credentials.key)?;

        let ret = unsafe { rados_connect(session.cluster) };
        if ret < 0 {
            return Err(match -ret {
                libc::EPERM | libc::EACCES => RbdError::Authentication(os_error(ret)),
                _ => RbdError::Connection(os_error(ret)),
            });
        }
        debug!(client = %credentials.client_name, "cluster session established");

        let pool = c_string(pool_name, "pool name")?;
        let mut ioctx: RadosIoctxT = ptr::null_mut();
        let ret = unsafe { rados_ioctx_create(session.cluster, pool.as_ptr(), &mut ioctx) };
        if ret < 0 {
            return Err(match -ret {
                libc::ENOENT => RbdError::PoolNotFound(pool_name.to_string()),
                _ => RbdError::Operation(format!(
                    "failed to open pool {pool_name}: {}",
                    os_error(ret)
                )),
            });
        }
        session.ioctx = ioctx;

        Ok(Box::new(session))
    }
}

struct RadosSession {
    cluster: RadosT,
    ioctx: RadosIoctxT,
}

impl RadosSession {
    fn conf_set(&self, option: &str, value: &str) -> Result<()> {
        let option_c = c_string(option, "configuration option")?;
        let value_c = c_string(value, "configuration value")?;

        let ret = unsafe { rados_conf_set(self.cluster, option_c.as_ptr(), value_c.as_ptr()) };
        if ret < 0 {
            return Err(RbdError::Configuration(format!(
                "failed to set {option}: {}",
                os_error(ret)
            )));
        }
        Ok(())
    }
}

impl ClusterSession for RadosSession {
    fn open_image(&mut self, image_name: &str) -> Result<Box<dyn ImageHandle + '_>> {
        if self.ioctx.is_null() {
            return Err(RbdError::Operation("pool context already released".into()));
        }

        let name = c_string(image_name, "image name")?;
        let mut image: RbdImageT = ptr::null_mut();
        let ret = unsafe { rbd_open_read_only(self.ioctx, name.as_ptr(), &mut image, ptr::null()) };
        if ret < 0 {
            return Err(match -ret {
                libc::ENOENT => RbdError::ImageNotFound(image_name.to_string()),
                _ => RbdError::Operation(format!(
                    "failed to open image {image_name}: {}",
                    os_error(ret)
                )),
            });
        }

        Ok(Box::new(RadosImage { image }))
    }

    fn disconnect(&mut self) {
        if !self.ioctx.is_null() {
            unsafe { rados_ioctx_destroy(self.ioctx) };
            self.ioctx = ptr::null_mut();
        }
        if !self.cluster.is_null() {
            unsafe { rados_shutdown(self.cluster) };
            self.cluster = ptr::null_mut();
        }
    }
}

impl Drop for RadosSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}

struct RadosImage {
    image: RbdImageT,
}

unsafe extern "C" fn visit_extent(
    offset: u64,
    length: size_t,
    exists: c_int,
    arg: *mut c_void,
) -> c_int {
    let visit = unsafe { &mut *arg.cast::<&mut dyn FnMut(ExtentRecord)>() };
    visit(ExtentRecord {
        offset,
        length: length as u64,
        exists: exists != 0,
    });
    0
}

impl ImageHandle for RadosImage {
    fn stat(&self) -> Result<ImageStat> {
        let mut info = unsafe { mem::zeroed::<RbdImageInfo>() };
        let ret = unsafe { rbd_stat(self.image, &mut info, mem::size_of::<RbdImageInfo>()) };
        if ret < 0 {
            return Err(RbdError::Operation(format!(
                "failed to stat image: {}",
                os_error(ret)
            )));
        }

        let mut id_buf = [0 as c_char; 64];
        let ret = unsafe { rbd_get_id(self.image, id_buf.as_mut_ptr(), id_buf.len()) };
        if ret < 0 {
            return Err(RbdError::Operation(format!(
                "failed to read image id: {}",
                os_error(ret)
            )));
        }
        let id = unsafe { CStr::from_ptr(id_buf.as_ptr()) }
            .to_string_lossy()
            .into_owned();

        Ok(ImageStat {
            size: info.size,
            id,
        })
    }

    fn diff_iterate(
        &self,
        offset: u64,
        length: u64,
        visit: &mut dyn FnMut(ExtentRecord),
    ) -> Result<()> {
        let mut visit = visit;
        let arg = (&mut visit as *mut &mut dyn FnMut(ExtentRecord)).cast::<c_void>();

        let ret = unsafe {
            rbd_diff_iterate2(self.image, ptr::null(), offset, length, 1, 0, visit_extent, arg)
        };
        if ret < 0 {
            return Err(RbdError::Operation(format!(
                "extent iteration failed: {}",
                os_error(ret)
            )));
        }
        Ok(())
    }
}

impl Drop for RadosImage {
    fn drop(&mut self) {
        if !self.image.is_null() {
            unsafe { rbd_close(self.image) };
            self.image = ptr::null_mut();
        }
    }
}
