// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
#![no_main]
use libfuzzer_sys::fuzz_target;
use raster_core::RenderConfig;

fuzz_target!(|data: &[u8]| {
    let _ = RenderConfig::from_slice(data);
});
