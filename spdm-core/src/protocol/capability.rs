// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use codec::{Codec, Reader, Writer};

bitflags! {
    /// One merged capability word. The request- and response-only bits do
    /// not overlap, so the local and peer capability fields share this
    /// type and the configuration API installs it as a single u32.
    #[derive(Default)]
    pub struct SpdmCapabilityFlags: u32 {
        const CACHE_CAP = 0b0000_0001;
        const CERT_CAP = 0b0000_0010;
        const CHAL_CAP = 0b0000_0100;
        const MEAS_CAP_NO_SIG = 0b0000_1000;
        const MEAS_CAP_SIG = 0b0001_0000;
        const MEAS_FRESH_CAP = 0b0010_0000;
        const ENCRYPT_CAP = 0b0100_0000;
        const MAC_CAP = 0b1000_0000;
        const MUT_AUTH_CAP = 0b0000_0001_0000_0000;
        const KEY_EX_CAP = 0b0000_0010_0000_0000;
        const PSK_CAP = 0b0000_0100_0000_0000;
        const PSK_CAP_WITH_CONTEXT = 0b0000_1000_0000_0000;
        const ENCAP_CAP = 0b0001_0000_0000_0000;
        const HBEAT_CAP = 0b0010_0000_0000_0000;
        const KEY_UPD_CAP = 0b0100_0000_0000_0000;
        const HANDSHAKE_IN_THE_CLEAR_CAP = 0b1000_0000_0000_0000;
        const PUB_KEY_ID_CAP = 0b0000_0001_0000_0000_0000_0000;
        const VALID_MASK = Self::CACHE_CAP.bits
            | Self::CERT_CAP.bits
            | Self::CHAL_CAP.bits
            | Self::MEAS_CAP_NO_SIG.bits
            | Self::MEAS_CAP_SIG.bits
            | Self::MEAS_FRESH_CAP.bits
            | Self::ENCRYPT_CAP.bits
            | Self::MAC_CAP.bits
            | Self::MUT_AUTH_CAP.bits
            | Self::KEY_EX_CAP.bits
            | Self::PSK_CAP.bits
            | Self::PSK_CAP_WITH_CONTEXT.bits
            | Self::ENCAP_CAP.bits
            | Self::HBEAT_CAP.bits
            | Self::KEY_UPD_CAP.bits
            | Self::HANDSHAKE_IN_THE_CLEAR_CAP.bits
            | Self::PUB_KEY_ID_CAP.bits;
    }
}

impl Codec for SpdmCapabilityFlags {
    fn encode(&self, bytes: &mut Writer) -> Result<usize, codec::EncodeErr> {
        self.bits().encode(bytes)
    }

    fn read(r: &mut Reader) -> Option<SpdmCapabilityFlags> {
        let bits = u32::read(r)?;

        SpdmCapabilityFlags::from_bits(bits & SpdmCapabilityFlags::VALID_MASK.bits)
    }
}

/// Capability fields negotiated per device: the CT exponent and the flag
/// word above.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmDeviceCapability {
    pub ct_exponent: u8,
    pub flags: SpdmCapabilityFlags,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_flags_codec() {
        let flags = SpdmCapabilityFlags::CERT_CAP
            | SpdmCapabilityFlags::CHAL_CAP
            | SpdmCapabilityFlags::MAC_CAP;
        let buf = &mut [0u8; 4];
        flags.encode(&mut Writer::init(buf)).unwrap();
        assert_eq!(SpdmCapabilityFlags::read_bytes(buf), Some(flags));
    }

    #[test]
    fn test_capability_flags_reserved_bits_dropped() {
        let buf = 0xFF00_0000u32.to_le_bytes();
        assert_eq!(
            SpdmCapabilityFlags::read_bytes(&buf),
            Some(SpdmCapabilityFlags::empty())
        );
    }
}
