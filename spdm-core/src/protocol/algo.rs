// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

extern crate alloc;
use alloc::boxed::Box;

use crate::config;
use codec::enum_builder;
use codec::{Codec, Reader, Writer};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const SHA256_DIGEST_SIZE: usize = 32;
pub const SHA384_DIGEST_SIZE: usize = 48;
pub const SHA512_DIGEST_SIZE: usize = 64;

pub const RSASSA_2048_KEY_SIZE: usize = 256;
pub const RSASSA_3072_KEY_SIZE: usize = 384;
pub const RSASSA_4096_KEY_SIZE: usize = 512;

pub const ECDSA_ECC_NIST_P256_KEY_SIZE: usize = 32 * 2;
pub const ECDSA_ECC_NIST_P384_KEY_SIZE: usize = 48 * 2;

pub const SECP_256_R1_KEY_SIZE: usize = 32 * 2;
pub const SECP_384_R1_KEY_SIZE: usize = 48 * 2;
pub const FFDHE_2048_KEY_SIZE: usize = 256;
pub const FFDHE_3072_KEY_SIZE: usize = 384;

pub const SPDM_NONCE_SIZE: usize = 32;
pub const SPDM_RANDOM_SIZE: usize = 32;
pub const SPDM_MAX_HASH_SIZE: usize = 64;
pub const SPDM_MAX_ASYM_KEY_SIZE: usize = 512;
pub const SPDM_MAX_DHE_KEY_SIZE: usize = FFDHE_3072_KEY_SIZE;

pub const SPDM_MAX_SLOT_NUMBER: usize = 8;

/// Offset of the root hash inside a formatted certificate chain: the
/// chain header is `{length: u16, reserved: u16}`.
pub const SPDM_CERT_CHAIN_HEADER_SIZE: usize = 4;

bitflags! {
    #[derive(Default)]
    pub struct SpdmMeasurementSpecification: u8 {
        const DMTF = 0b0000_0001;
    }
}

impl Codec for SpdmMeasurementSpecification {
    fn encode(&self, bytes: &mut Writer) -> Result<usize, codec::EncodeErr> {
        self.bits().encode(bytes)
    }
    fn read(r: &mut Reader) -> Option<SpdmMeasurementSpecification> {
        let bits = u8::read(r)?;
        SpdmMeasurementSpecification::from_bits(bits)
    }
}

bitflags! {
    #[derive(Default)]
    pub struct SpdmMeasurementHashAlgo: u32 {
        const RAW_BIT_STREAM = 0b0000_0001;
        const TPM_ALG_SHA_256 = 0b0000_0010;
        const TPM_ALG_SHA_384 = 0b0000_0100;
        const TPM_ALG_SHA_512 = 0b0000_1000;
    }
}

impl SpdmMeasurementHashAlgo {
    pub fn get_size(&self) -> u16 {
        match *self {
            SpdmMeasurementHashAlgo::RAW_BIT_STREAM => 0u16,
            SpdmMeasurementHashAlgo::TPM_ALG_SHA_256 => SHA256_DIGEST_SIZE as u16,
            SpdmMeasurementHashAlgo::TPM_ALG_SHA_384 => SHA384_DIGEST_SIZE as u16,
            SpdmMeasurementHashAlgo::TPM_ALG_SHA_512 => SHA512_DIGEST_SIZE as u16,
            _ => {
                panic!("invalid MeasurementHashAlgo");
            }
        }
    }
}

impl Codec for SpdmMeasurementHashAlgo {
    fn encode(&self, bytes: &mut Writer) -> Result<usize, codec::EncodeErr> {
        self.bits().encode(bytes)
    }

    fn read(r: &mut Reader) -> Option<SpdmMeasurementHashAlgo> {
        let bits = u32::read(r)?;

        SpdmMeasurementHashAlgo::from_bits(bits)
    }
}

bitflags! {
    #[derive(Default)]
    pub struct SpdmBaseAsymAlgo: u32 {
        const TPM_ALG_RSASSA_2048 = 0b0000_0001;
        const TPM_ALG_RSASSA_3072 = 0b0000_0100;
        const TPM_ALG_ECDSA_ECC_NIST_P256 = 0b0001_0000;
        const TPM_ALG_RSASSA_4096 = 0b0010_0000;
        const TPM_ALG_ECDSA_ECC_NIST_P384 = 0b1000_0000;
    }
}

impl SpdmBaseAsymAlgo {
    pub fn get_size(&self) -> u16 {
        match *self {
            SpdmBaseAsymAlgo::TPM_ALG_RSASSA_2048 => RSASSA_2048_KEY_SIZE as u16,
            SpdmBaseAsymAlgo::TPM_ALG_RSASSA_3072 => RSASSA_3072_KEY_SIZE as u16,
            SpdmBaseAsymAlgo::TPM_ALG_RSASSA_4096 => RSASSA_4096_KEY_SIZE as u16,
            SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P256 => ECDSA_ECC_NIST_P256_KEY_SIZE as u16,
            SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P384 => ECDSA_ECC_NIST_P384_KEY_SIZE as u16,
            _ => {
                panic!("invalid BaseAsymAlgo");
            }
        }
    }
}

impl Codec for SpdmBaseAsymAlgo {
    fn encode(&self, bytes: &mut Writer) -> Result<usize, codec::EncodeErr> {
        self.bits().encode(bytes)
    }

    fn read(r: &mut Reader) -> Option<SpdmBaseAsymAlgo> {
        let bits = u32::read(r)?;

        SpdmBaseAsymAlgo::from_bits(bits)
    }
}

bitflags! {
    #[derive(Default)]
    pub struct SpdmBaseHashAlgo: u32 {
        const TPM_ALG_SHA_256 = 0b0000_0001;
        const TPM_ALG_SHA_384 = 0b0000_0010;
        const TPM_ALG_SHA_512 = 0b0000_0100;
    }
}

impl SpdmBaseHashAlgo {
    pub fn get_size(&self) -> u16 {
        match *self {
            SpdmBaseHashAlgo::TPM_ALG_SHA_256 => SHA256_DIGEST_SIZE as u16,
            SpdmBaseHashAlgo::TPM_ALG_SHA_384 => SHA384_DIGEST_SIZE as u16,
            SpdmBaseHashAlgo::TPM_ALG_SHA_512 => SHA512_DIGEST_SIZE as u16,
            _ => {
                panic!("invalid BaseHashAlgo");
            }
        }
    }
}

impl Codec for SpdmBaseHashAlgo {
    fn encode(&self, bytes: &mut Writer) -> Result<usize, codec::EncodeErr> {
        self.bits().encode(bytes)
    }

    fn read(r: &mut Reader) -> Option<SpdmBaseHashAlgo> {
        let bits = u32::read(r)?;

        SpdmBaseHashAlgo::from_bits(bits)
    }
}

bitflags! {
    #[derive(Default)]
    pub struct SpdmDheAlgo: u16 {
        const FFDHE_2048 = 0b0000_0001;
        const FFDHE_3072 = 0b0000_0010;
        const SECP_256_R1 = 0b0000_1000;
        const SECP_384_R1 = 0b0001_0000;
    }
}

impl SpdmDheAlgo {
    pub fn get_size(&self) -> u16 {
        match *self {
            SpdmDheAlgo::FFDHE_2048 => FFDHE_2048_KEY_SIZE as u16,
            SpdmDheAlgo::FFDHE_3072 => FFDHE_3072_KEY_SIZE as u16,
            SpdmDheAlgo::SECP_256_R1 => SECP_256_R1_KEY_SIZE as u16,
            SpdmDheAlgo::SECP_384_R1 => SECP_384_R1_KEY_SIZE as u16,
            _ => {
                panic!("invalid DheAlgo");
            }
        }
    }
}

impl Codec for SpdmDheAlgo {
    fn encode(&self, bytes: &mut Writer) -> Result<usize, codec::EncodeErr> {
        self.bits().encode(bytes)
    }

    fn read(r: &mut Reader) -> Option<SpdmDheAlgo> {
        let bits = u16::read(r)?;

        SpdmDheAlgo::from_bits(bits)
    }
}

bitflags! {
    #[derive(Default)]
    pub struct SpdmAeadAlgo: u16 {
        const AES_128_GCM = 0b0000_0001;
        const AES_256_GCM = 0b0000_0010;
        const CHACHA20_POLY1305 = 0b0000_0100;
    }
}

impl SpdmAeadAlgo {
    pub fn get_key_size(&self) -> u16 {
        match *self {
            SpdmAeadAlgo::AES_128_GCM => 16u16,
            SpdmAeadAlgo::AES_256_GCM => 32u16,
            SpdmAeadAlgo::CHACHA20_POLY1305 => 32u16,
            _ => {
                panic!("invalid AeadAlgo");
            }
        }
    }

    pub fn get_tag_size(&self) -> u16 {
        match *self {
            SpdmAeadAlgo::AES_128_GCM => 16u16,
            SpdmAeadAlgo::AES_256_GCM => 16u16,
            SpdmAeadAlgo::CHACHA20_POLY1305 => 16u16,
            _ => {
                panic!("invalid AeadAlgo");
            }
        }
    }
}

impl Codec for SpdmAeadAlgo {
    fn encode(&self, bytes: &mut Writer) -> Result<usize, codec::EncodeErr> {
        self.bits().encode(bytes)
    }

    fn read(r: &mut Reader) -> Option<SpdmAeadAlgo> {
        let bits = u16::read(r)?;

        SpdmAeadAlgo::from_bits(bits)
    }
}

bitflags! {
    #[derive(Default)]
    pub struct SpdmReqAsymAlgo: u16 {
        const TPM_ALG_RSASSA_2048 = 0b0000_0001;
        const TPM_ALG_RSASSA_3072 = 0b0000_0100;
        const TPM_ALG_ECDSA_ECC_NIST_P256 = 0b0001_0000;
        const TPM_ALG_RSASSA_4096 = 0b0010_0000;
        const TPM_ALG_ECDSA_ECC_NIST_P384 = 0b1000_0000;
    }
}

impl SpdmReqAsymAlgo {
    pub fn get_size(&self) -> u16 {
        self.as_base_asym_algo().get_size()
    }

    /// The requester algorithm field reuses the base-asym bit layout, so
    /// the verifier path can share one verify callback.
    pub fn as_base_asym_algo(&self) -> SpdmBaseAsymAlgo {
        SpdmBaseAsymAlgo::from_bits_truncate(self.bits() as u32)
    }
}

impl Codec for SpdmReqAsymAlgo {
    fn encode(&self, bytes: &mut Writer) -> Result<usize, codec::EncodeErr> {
        self.bits().encode(bytes)
    }

    fn read(r: &mut Reader) -> Option<SpdmReqAsymAlgo> {
        let bits = u16::read(r)?;

        SpdmReqAsymAlgo::from_bits(bits)
    }
}

bitflags! {
    #[derive(Default)]
    pub struct SpdmKeyScheduleAlgo: u16 {
        const SPDM_KEY_SCHEDULE = 0b0000_0001;
    }
}

impl Codec for SpdmKeyScheduleAlgo {
    fn encode(&self, bytes: &mut Writer) -> Result<usize, codec::EncodeErr> {
        self.bits().encode(bytes)
    }

    fn read(r: &mut Reader) -> Option<SpdmKeyScheduleAlgo> {
        let bits = u16::read(r)?;

        SpdmKeyScheduleAlgo::from_bits(bits)
    }
}

/// The algorithm selection of one device side, local preference or the
/// negotiated connection result.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmDeviceAlgorithm {
    pub measurement_spec: SpdmMeasurementSpecification,
    pub measurement_hash_algo: SpdmMeasurementHashAlgo,
    pub base_asym_algo: SpdmBaseAsymAlgo,
    pub base_hash_algo: SpdmBaseHashAlgo,
    pub dhe_named_group: SpdmDheAlgo,
    pub aead_cipher_suite: SpdmAeadAlgo,
    pub req_base_asym_alg: SpdmReqAsymAlgo,
    pub key_schedule: SpdmKeyScheduleAlgo,
}

enum_builder! {
    @U8
    EnumName: SpdmMeasurementSummaryHashType;
    EnumVal{
        SpdmMeasurementSummaryHashTypeNone => 0x0,
        SpdmMeasurementSummaryHashTypeTcb => 0x1,
        SpdmMeasurementSummaryHashTypeAll => 0xFF
    }
}
impl Default for SpdmMeasurementSummaryHashType {
    fn default() -> SpdmMeasurementSummaryHashType {
        SpdmMeasurementSummaryHashType::SpdmMeasurementSummaryHashTypeNone
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpdmNonceStruct {
    pub data: [u8; SPDM_NONCE_SIZE],
}

impl Codec for SpdmNonceStruct {
    fn encode(&self, bytes: &mut Writer) -> Result<usize, codec::EncodeErr> {
        bytes.extend_from_slice(&self.data).ok_or(codec::EncodeErr)?;
        Ok(SPDM_NONCE_SIZE)
    }
    fn read(r: &mut Reader) -> Option<SpdmNonceStruct> {
        let mut data = [0u8; SPDM_NONCE_SIZE];
        data.copy_from_slice(r.take(SPDM_NONCE_SIZE)?);
        Some(SpdmNonceStruct { data })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpdmRandomStruct {
    pub data: [u8; SPDM_RANDOM_SIZE],
}

impl Codec for SpdmRandomStruct {
    fn encode(&self, bytes: &mut Writer) -> Result<usize, codec::EncodeErr> {
        bytes.extend_from_slice(&self.data).ok_or(codec::EncodeErr)?;
        Ok(SPDM_RANDOM_SIZE)
    }
    fn read(r: &mut Reader) -> Option<SpdmRandomStruct> {
        let mut data = [0u8; SPDM_RANDOM_SIZE];
        data.copy_from_slice(r.take(SPDM_RANDOM_SIZE)?);
        Some(SpdmRandomStruct { data })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpdmDigestStruct {
    pub data_size: u16,
    pub data: Box<[u8; SPDM_MAX_HASH_SIZE]>,
}

impl Default for SpdmDigestStruct {
    fn default() -> SpdmDigestStruct {
        SpdmDigestStruct {
            data_size: 0,
            data: Box::new([0u8; SPDM_MAX_HASH_SIZE]),
        }
    }
}

impl AsRef<[u8]> for SpdmDigestStruct {
    fn as_ref(&self) -> &[u8] {
        &self.data[0..(self.data_size as usize)]
    }
}

impl From<&[u8]> for SpdmDigestStruct {
    fn from(value: &[u8]) -> Self {
        assert!(value.len() <= SPDM_MAX_HASH_SIZE);
        let mut digest = SpdmDigestStruct {
            data_size: value.len() as u16,
            ..Default::default()
        };
        digest.data[0..value.len()].copy_from_slice(value);
        digest
    }
}

#[derive(Debug, Clone)]
pub struct SpdmSignatureStruct {
    pub data_size: u16,
    pub data: [u8; SPDM_MAX_ASYM_KEY_SIZE],
}

impl Default for SpdmSignatureStruct {
    fn default() -> SpdmSignatureStruct {
        SpdmSignatureStruct {
            data_size: 0,
            data: [0u8; SPDM_MAX_ASYM_KEY_SIZE],
        }
    }
}

impl AsRef<[u8]> for SpdmSignatureStruct {
    fn as_ref(&self) -> &[u8] {
        &self.data[0..(self.data_size as usize)]
    }
}

impl From<&[u8]> for SpdmSignatureStruct {
    fn from(value: &[u8]) -> Self {
        assert!(value.len() <= SPDM_MAX_ASYM_KEY_SIZE);
        let mut sig = SpdmSignatureStruct {
            data_size: value.len() as u16,
            ..Default::default()
        };
        sig.data[0..value.len()].copy_from_slice(value);
        sig
    }
}

/// A formatted certificate chain: `{length: u16, reserved: u16}` header,
/// root certificate hash sized to the base hash, then the DER
/// certificates from root to leaf.
#[derive(Debug, Clone)]
pub struct SpdmCertChainBuffer {
    pub data_size: u16,
    pub data: [u8; SPDM_CERT_CHAIN_HEADER_SIZE + SPDM_MAX_HASH_SIZE + config::MAX_SPDM_CERT_CHAIN_DATA_SIZE],
}

impl Default for SpdmCertChainBuffer {
    fn default() -> Self {
        SpdmCertChainBuffer {
            data_size: 0u16,
            data: [0u8;
                SPDM_CERT_CHAIN_HEADER_SIZE + SPDM_MAX_HASH_SIZE + config::MAX_SPDM_CERT_CHAIN_DATA_SIZE],
        }
    }
}

impl AsRef<[u8]> for SpdmCertChainBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data[0..(self.data_size as usize)]
    }
}

impl SpdmCertChainBuffer {
    /// Build a formatted chain from the DER certificates and the hash of
    /// the root certificate.
    pub fn new(cert_chain: &[u8], root_cert_hash: &[u8]) -> Option<Self> {
        let total_len = SPDM_CERT_CHAIN_HEADER_SIZE + root_cert_hash.len() + cert_chain.len();
        if total_len > u16::MAX as usize
            || cert_chain.len() > config::MAX_SPDM_CERT_CHAIN_DATA_SIZE
            || root_cert_hash.len() > SPDM_MAX_HASH_SIZE
        {
            return None;
        }

        let mut buff = Self::default();
        let mut pos = 0;

        buff.data[pos..(pos + 2)].copy_from_slice(&(total_len as u16).to_le_bytes());
        pos += 2;

        // reserved
        buff.data[pos] = 0;
        buff.data[pos + 1] = 0;
        pos += 2;

        buff.data[pos..(pos + root_cert_hash.len())].copy_from_slice(root_cert_hash);
        pos += root_cert_hash.len();

        buff.data[pos..(pos + cert_chain.len())].copy_from_slice(cert_chain);
        pos += cert_chain.len();

        buff.data_size = pos as u16;
        Some(buff)
    }

    /// The root certificate hash embedded after the chain header.
    pub fn root_hash(&self, hash_size: usize) -> Option<&[u8]> {
        let end = SPDM_CERT_CHAIN_HEADER_SIZE + hash_size;
        if end > self.data_size as usize {
            return None;
        }
        Some(&self.data[SPDM_CERT_CHAIN_HEADER_SIZE..end])
    }

    /// The DER certificates after the header and the root hash. This is
    /// the slice TH and signature verification operate on.
    pub fn certs(&self, hash_size: usize) -> Option<&[u8]> {
        let begin = SPDM_CERT_CHAIN_HEADER_SIZE + hash_size;
        if begin > self.data_size as usize {
            return None;
        }
        Some(&self.data[begin..(self.data_size as usize)])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SpdmPskHintStruct {
    pub data_size: u16,
    pub data: [u8; config::MAX_SPDM_PSK_HINT_SIZE],
}

impl AsRef<[u8]> for SpdmPskHintStruct {
    fn as_ref(&self) -> &[u8] {
        &self.data[0..(self.data_size as usize)]
    }
}

impl From<&[u8]> for SpdmPskHintStruct {
    fn from(value: &[u8]) -> Self {
        assert!(value.len() <= config::MAX_SPDM_PSK_HINT_SIZE);
        let mut hint = SpdmPskHintStruct {
            data_size: value.len() as u16,
            ..Default::default()
        };
        hint.data[0..value.len()].copy_from_slice(value);
        hint
    }
}

pub const SPDM_MEASUREMENT_BLOCK_COMMON_HEADER_SIZE: usize = 4;
pub const SPDM_MEASUREMENT_BLOCK_DMTF_HEADER_SIZE: usize = 3;

/// DMTF measurement value types live in the low bits of the value-type
/// byte; bit 7 marks a raw bit stream.
pub const SPDM_MEASUREMENT_BLOCK_MEASUREMENT_TYPE_MASK: u8 = 0x7F;
pub const SPDM_MEASUREMENT_BLOCK_MEASUREMENT_TYPE_IMMUTABLE_ROM: u8 = 0x00;
pub const SPDM_MEASUREMENT_BLOCK_MEASUREMENT_TYPE_FIRMWARE: u8 = 0x01;
pub const SPDM_MEASUREMENT_BLOCK_MEASUREMENT_TYPE_HARDWARE_CONFIG: u8 = 0x02;
pub const SPDM_MEASUREMENT_BLOCK_MEASUREMENT_TYPE_FIRMWARE_CONFIG: u8 = 0x03;
pub const SPDM_MEASUREMENT_BLOCK_MEASUREMENT_TYPE_RAW_BIT_STREAM: u8 = 0x80;

/// `{index, measurement_specification, measurement_size}` ahead of every
/// measurement block.
#[derive(Debug, Clone, Default)]
pub struct SpdmMeasurementBlockCommonHeader {
    pub index: u8,
    pub measurement_specification: SpdmMeasurementSpecification,
    pub measurement_size: u16,
}

impl Codec for SpdmMeasurementBlockCommonHeader {
    fn encode(&self, bytes: &mut Writer) -> Result<usize, codec::EncodeErr> {
        let mut cnt = 0usize;
        cnt += self.index.encode(bytes)?;
        cnt += self.measurement_specification.encode(bytes)?;
        cnt += self.measurement_size.encode(bytes)?;
        Ok(cnt)
    }

    fn read(r: &mut Reader) -> Option<SpdmMeasurementBlockCommonHeader> {
        let index = u8::read(r)?;
        let measurement_specification = SpdmMeasurementSpecification::read(r)?;
        let measurement_size = u16::read(r)?;
        Some(SpdmMeasurementBlockCommonHeader {
            index,
            measurement_specification,
            measurement_size,
        })
    }
}

/// `{value_type, value_size}` ahead of the DMTF measurement value. A
/// block is internally consistent when `measurement_size` equals this
/// header plus `value_size`.
#[derive(Debug, Clone, Default)]
pub struct SpdmMeasurementBlockDmtfHeader {
    pub dmtf_spec_measurement_value_type: u8,
    pub dmtf_spec_measurement_value_size: u16,
}

impl Codec for SpdmMeasurementBlockDmtfHeader {
    fn encode(&self, bytes: &mut Writer) -> Result<usize, codec::EncodeErr> {
        let mut cnt = 0usize;
        cnt += self.dmtf_spec_measurement_value_type.encode(bytes)?;
        cnt += self.dmtf_spec_measurement_value_size.encode(bytes)?;
        Ok(cnt)
    }

    fn read(r: &mut Reader) -> Option<SpdmMeasurementBlockDmtfHeader> {
        let dmtf_spec_measurement_value_type = u8::read(r)?;
        let dmtf_spec_measurement_value_size = u16::read(r)?;
        Some(SpdmMeasurementBlockDmtfHeader {
            dmtf_spec_measurement_value_type,
            dmtf_spec_measurement_value_size,
        })
    }
}

/// A raw measurement-block sequence as delivered by the collector
/// callback.
#[derive(Debug, Clone)]
pub struct SpdmMeasurementRecordStructure {
    pub number_of_blocks: u8,
    pub record_size: u16,
    pub record: [u8; config::MAX_SPDM_MEASUREMENT_RECORD_SIZE],
}

impl Default for SpdmMeasurementRecordStructure {
    fn default() -> Self {
        SpdmMeasurementRecordStructure {
            number_of_blocks: 0,
            record_size: 0,
            record: [0u8; config::MAX_SPDM_MEASUREMENT_RECORD_SIZE],
        }
    }
}

impl AsRef<[u8]> for SpdmMeasurementRecordStructure {
    fn as_ref(&self) -> &[u8] {
        &self.record[0..(self.record_size as usize)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_algo_sizes() {
        assert_eq!(SpdmBaseHashAlgo::TPM_ALG_SHA_256.get_size(), 32);
        assert_eq!(SpdmBaseHashAlgo::TPM_ALG_SHA_384.get_size(), 48);
        assert_eq!(SpdmBaseHashAlgo::TPM_ALG_SHA_512.get_size(), 64);
    }

    #[test]
    fn test_asym_algo_sizes() {
        assert_eq!(SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P256.get_size(), 64);
        assert_eq!(SpdmBaseAsymAlgo::TPM_ALG_RSASSA_3072.get_size(), 384);
        assert_eq!(
            SpdmReqAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P384.get_size(),
            SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P384.get_size()
        );
    }

    #[test]
    fn test_req_asym_maps_onto_base_asym() {
        assert_eq!(
            SpdmReqAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P256.as_base_asym_algo(),
            SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P256
        );
    }

    #[test]
    fn test_cert_chain_buffer_layout() {
        let certs = [0xAAu8; 16];
        let root_hash = [0x55u8; 32];
        let chain = SpdmCertChainBuffer::new(&certs, &root_hash).unwrap();
        assert_eq!(chain.data_size as usize, 4 + 32 + 16);
        assert_eq!(u16::from_le_bytes([chain.data[0], chain.data[1]]), 4 + 32 + 16);
        assert_eq!(chain.root_hash(32).unwrap(), &root_hash);
        assert_eq!(chain.certs(32).unwrap(), &certs);
    }

    #[test]
    fn test_cert_chain_buffer_oversize() {
        let certs = [0u8; 16];
        let root_hash = [0u8; SPDM_MAX_HASH_SIZE + 1];
        assert!(SpdmCertChainBuffer::new(&certs, &root_hash).is_none());
    }

    #[test]
    fn test_measurement_block_header_codec() {
        let header = SpdmMeasurementBlockCommonHeader {
            index: 2,
            measurement_specification: SpdmMeasurementSpecification::DMTF,
            measurement_size: 0x1234,
        };
        let buf = &mut [0u8; 4];
        header.encode(&mut Writer::init(buf)).unwrap();
        assert_eq!(buf, &[2, 1, 0x34, 0x12]);
        let decoded = SpdmMeasurementBlockCommonHeader::read_bytes(buf).unwrap();
        assert_eq!(decoded.measurement_size, 0x1234);
    }

    #[test]
    fn test_digest_from_slice() {
        let digest = SpdmDigestStruct::from(&[7u8; 48][..]);
        assert_eq!(digest.data_size, 48);
        assert_eq!(digest.as_ref(), &[7u8; 48]);
    }
}
