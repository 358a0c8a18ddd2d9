// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

mod algo;
mod capability;
mod version;
pub use algo::*;
pub use capability::*;
pub use version::*;
