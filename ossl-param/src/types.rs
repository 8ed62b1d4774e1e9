// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0

pub type VOID_PTR = *mut std::os::raw::c_void;
pub type VOID_PTR_PTR = *mut VOID_PTR;
pub type CONST_VOID_PTR = *const std::os::raw::c_void;
