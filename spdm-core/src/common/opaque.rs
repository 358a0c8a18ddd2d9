// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use codec::{Codec, Reader, Writer};

pub const MAX_SPDM_OPAQUE_SIZE: usize = 256;

/// Opaque data blob carried in CHALLENGE_AUTH and MEASUREMENTS
/// responses; the content is host policy, the engine only frames it.
#[derive(Debug, Clone)]
pub struct SpdmOpaqueStruct {
    pub data_size: u16,
    pub data: [u8; MAX_SPDM_OPAQUE_SIZE],
}

impl Default for SpdmOpaqueStruct {
    fn default() -> SpdmOpaqueStruct {
        SpdmOpaqueStruct {
            data_size: 0,
            data: [0u8; MAX_SPDM_OPAQUE_SIZE],
        }
    }
}

impl AsRef<[u8]> for SpdmOpaqueStruct {
    fn as_ref(&self) -> &[u8] {
        &self.data[0..(self.data_size as usize)]
    }
}

impl Codec for SpdmOpaqueStruct {
    fn encode(&self, bytes: &mut Writer) -> Result<usize, codec::EncodeErr> {
        let mut cnt = 0usize;
        cnt += self.data_size.encode(bytes)?;
        bytes
            .extend_from_slice(self.as_ref())
            .ok_or(codec::EncodeErr)?;
        Ok(cnt + self.data_size as usize)
    }

    fn read(r: &mut Reader) -> Option<SpdmOpaqueStruct> {
        let data_size = u16::read(r)?;
        if data_size as usize > MAX_SPDM_OPAQUE_SIZE {
            return None;
        }
        let mut opaque = SpdmOpaqueStruct {
            data_size,
            ..Default::default()
        };
        opaque.data[0..(data_size as usize)].copy_from_slice(r.take(data_size as usize)?);
        Some(opaque)
    }
}
