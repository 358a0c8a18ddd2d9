// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use codec::enum_builder;
use codec::{Codec, Reader, Writer};

pub const MAX_SPDM_VERSION_COUNT: usize = 2;

enum_builder! {
    @U8
    EnumName: SpdmVersion;
    EnumVal{
        SpdmVersion10 => 0x10,
        SpdmVersion11 => 0x11
    }
}
impl Default for SpdmVersion {
    fn default() -> SpdmVersion {
        SpdmVersion::SpdmVersion10
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_codec() {
        let buf = &mut [0u8; 1];
        SpdmVersion::SpdmVersion11
            .encode(&mut Writer::init(buf))
            .unwrap();
        assert_eq!(buf[0], 0x11);
        assert_eq!(
            SpdmVersion::read_bytes(buf),
            Some(SpdmVersion::SpdmVersion11)
        );
    }
}
