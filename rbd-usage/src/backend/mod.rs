// SPDX-License-Identifier: GPL-3.0-only

//! Production cluster backends

pub mod rados;

pub use rados::RadosBackend;
