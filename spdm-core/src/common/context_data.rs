// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::{SpdmContext, SpdmResponseState};
use crate::error::{
    SpdmResult, SPDM_STATUS_BUFFER_TOO_SMALL, SPDM_STATUS_INVALID_PARAMETER,
    SPDM_STATUS_UNSUPPORTED,
};
use crate::message::SpdmKeyExchangeMutAuthAttributes;
use crate::protocol::*;

use codec::Codec;

/// Kinds addressable through `set_data`/`get_data`. The discriminants
/// form the stable kind space; the high-bit range is reserved for
/// debug-only kinds.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpdmDataType {
    CapabilityFlags = 0x00,
    CapabilityCtExponent = 0x01,
    MeasurementHashAlgo = 0x02,
    BaseAsymAlgo = 0x03,
    BaseHashAlgo = 0x04,
    DheNamedGroup = 0x05,
    AeadCipherSuite = 0x06,
    ReqBaseAsymAlg = 0x07,
    KeySchedule = 0x08,
    ConnectionState = 0x09,
    ResponseState = 0x0A,
    PeerPublicRootCertHash = 0x0B,
    PeerPublicCertChains = 0x0C,
    SlotCount = 0x0D,
    PublicCertChains = 0x0E,
    BasicMutAuthRequested = 0x0F,
    MutAuthRequested = 0x10,
    PskHint = 0x11,
}

impl SpdmDataType {
    pub fn get_u32(&self) -> u32 {
        *self as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpdmDataLocation {
    Local,
    Connection,
    Session,
}

/// Type-specific addressing of a data kind: where it lives plus a few
/// raw parameter bytes (slot number, session id, ...).
#[derive(Debug, Clone, Copy)]
pub struct SpdmDataParameter {
    pub location: SpdmDataLocation,
    pub additional_data: [u8; 4],
}

impl SpdmDataParameter {
    pub fn new(location: SpdmDataLocation) -> Self {
        SpdmDataParameter {
            location,
            additional_data: [0u8; 4],
        }
    }
}

/// Debug-only kinds occupy the high-bit range. None are defined today;
/// the gate runs first in both the set and get path.
fn is_debug_only_data(data_type: SpdmDataType) -> bool {
    data_type.get_u32() & 0x8000_0000 != 0
}

/// Hook for kinds that address one session. No current kind does; the
/// switch is kept so a future kind only has to flip its arm.
fn need_session_info_for_data(_data_type: SpdmDataType) -> bool {
    false
}

fn read_exact_u8(data: &[u8]) -> SpdmResult<u8> {
    if data.len() != 1 {
        return Err(SPDM_STATUS_INVALID_PARAMETER);
    }
    Ok(data[0])
}

fn read_exact_u16(data: &[u8]) -> SpdmResult<u16> {
    if data.len() != 2 {
        return Err(SPDM_STATUS_INVALID_PARAMETER);
    }
    u16::read_bytes(data).ok_or(SPDM_STATUS_INVALID_PARAMETER)
}

fn read_exact_u32(data: &[u8]) -> SpdmResult<u32> {
    if data.len() != 4 {
        return Err(SPDM_STATUS_INVALID_PARAMETER);
    }
    u32::read_bytes(data).ok_or(SPDM_STATUS_INVALID_PARAMETER)
}

fn write_out(out: &mut [u8], value: &[u8]) -> SpdmResult<usize> {
    if out.len() < value.len() {
        return Err(SPDM_STATUS_BUFFER_TOO_SMALL);
    }
    out[..value.len()].copy_from_slice(value);
    Ok(value.len())
}

impl SpdmContext {
    /// Install one piece of context configuration. All multi-byte
    /// values are little-endian; sizes are validated per kind.
    pub fn set_data(
        &mut self,
        data_type: SpdmDataType,
        parameter: &SpdmDataParameter,
        data: &[u8],
    ) -> SpdmResult {
        if is_debug_only_data(data_type) {
            return Err(SPDM_STATUS_UNSUPPORTED);
        }

        if need_session_info_for_data(data_type) {
            if parameter.location != SpdmDataLocation::Session {
                return Err(SPDM_STATUS_INVALID_PARAMETER);
            }
            let session_id = u32::from_le_bytes(parameter.additional_data);
            if self.get_immutable_session_via_id(session_id).is_none() {
                return Err(SPDM_STATUS_INVALID_PARAMETER);
            }
        }

        match data_type {
            SpdmDataType::CapabilityFlags => {
                let bits = read_exact_u32(data)?;
                self.local_context.capability.flags =
                    SpdmCapabilityFlags::from_bits(bits).ok_or(SPDM_STATUS_INVALID_PARAMETER)?;
            }
            SpdmDataType::CapabilityCtExponent => {
                self.local_context.capability.ct_exponent = read_exact_u8(data)?;
            }
            SpdmDataType::MeasurementHashAlgo => {
                let bits = read_exact_u32(data)?;
                self.local_context.algorithm.measurement_hash_algo =
                    SpdmMeasurementHashAlgo::from_bits(bits)
                        .ok_or(SPDM_STATUS_INVALID_PARAMETER)?;
            }
            SpdmDataType::BaseAsymAlgo => {
                let bits = read_exact_u32(data)?;
                self.local_context.algorithm.base_asym_algo =
                    SpdmBaseAsymAlgo::from_bits(bits).ok_or(SPDM_STATUS_INVALID_PARAMETER)?;
            }
            SpdmDataType::BaseHashAlgo => {
                let bits = read_exact_u32(data)?;
                self.local_context.algorithm.base_hash_algo =
                    SpdmBaseHashAlgo::from_bits(bits).ok_or(SPDM_STATUS_INVALID_PARAMETER)?;
            }
            SpdmDataType::DheNamedGroup => {
                let bits = read_exact_u16(data)?;
                self.local_context.algorithm.dhe_named_group =
                    SpdmDheAlgo::from_bits(bits).ok_or(SPDM_STATUS_INVALID_PARAMETER)?;
            }
            SpdmDataType::AeadCipherSuite => {
                let bits = read_exact_u16(data)?;
                self.local_context.algorithm.aead_cipher_suite =
                    SpdmAeadAlgo::from_bits(bits).ok_or(SPDM_STATUS_INVALID_PARAMETER)?;
            }
            SpdmDataType::ReqBaseAsymAlg => {
                let bits = read_exact_u16(data)?;
                self.local_context.algorithm.req_base_asym_alg =
                    SpdmReqAsymAlgo::from_bits(bits).ok_or(SPDM_STATUS_INVALID_PARAMETER)?;
            }
            SpdmDataType::KeySchedule => {
                let bits = read_exact_u16(data)?;
                self.local_context.algorithm.key_schedule =
                    SpdmKeyScheduleAlgo::from_bits(bits).ok_or(SPDM_STATUS_INVALID_PARAMETER)?;
            }
            SpdmDataType::ResponseState => {
                let value = read_exact_u32(data)?;
                self.response_state =
                    SpdmResponseState::read_bytes(&value.to_le_bytes())
                        .ok_or(SPDM_STATUS_INVALID_PARAMETER)?;
            }
            SpdmDataType::PeerPublicRootCertHash => {
                if data.is_empty() || data.len() > SPDM_MAX_HASH_SIZE {
                    return Err(SPDM_STATUS_INVALID_PARAMETER);
                }
                self.local_context.peer_root_cert_hash_provision =
                    Some(SpdmDigestStruct::from(data));
            }
            SpdmDataType::PeerPublicCertChains => {
                let mut chain = SpdmCertChainBuffer::default();
                if data.is_empty() || data.len() > chain.data.len() {
                    return Err(SPDM_STATUS_BUFFER_TOO_SMALL);
                }
                chain.data[..data.len()].copy_from_slice(data);
                chain.data_size = data.len() as u16;
                self.local_context.peer_cert_chain_provision = Some(chain);
            }
            SpdmDataType::SlotCount => {
                let slot_count = read_exact_u8(data)?;
                if slot_count as usize > SPDM_MAX_SLOT_NUMBER {
                    return Err(SPDM_STATUS_INVALID_PARAMETER);
                }
                self.local_context.slot_count = slot_count;
            }
            SpdmDataType::PublicCertChains => {
                let slot_id = parameter.additional_data[0];
                if slot_id >= self.local_context.slot_count {
                    return Err(SPDM_STATUS_INVALID_PARAMETER);
                }
                let mut chain = SpdmCertChainBuffer::default();
                if data.is_empty() || data.len() > chain.data.len() {
                    return Err(SPDM_STATUS_BUFFER_TOO_SMALL);
                }
                chain.data[..data.len()].copy_from_slice(data);
                chain.data_size = data.len() as u16;
                self.local_context.my_cert_chain[slot_id as usize] = Some(chain);
            }
            SpdmDataType::BasicMutAuthRequested => {
                // canonical: zero is false, any nonzero byte is true
                self.local_context.basic_mut_auth_requested = read_exact_u8(data)? != 0;
            }
            SpdmDataType::MutAuthRequested => {
                let bits = read_exact_u8(data)?;
                let requested = SpdmKeyExchangeMutAuthAttributes::from_bits(bits)
                    .ok_or(SPDM_STATUS_INVALID_PARAMETER)?;
                if !requested.is_valid_policy() {
                    return Err(SPDM_STATUS_INVALID_PARAMETER);
                }
                self.local_context.mut_auth_requested = requested;
                let measurement_hash_type = SpdmMeasurementSummaryHashType::read_bytes(
                    &parameter.additional_data[1..2],
                )
                .ok_or(SPDM_STATUS_INVALID_PARAMETER)?;
                self.encap_context
                    .init(parameter.additional_data[0], measurement_hash_type);
            }
            SpdmDataType::PskHint => {
                if data.is_empty() || data.len() > crate::config::MAX_SPDM_PSK_HINT_SIZE {
                    return Err(SPDM_STATUS_INVALID_PARAMETER);
                }
                self.local_context.psk_hint = Some(SpdmPskHintStruct::from(data));
            }
            SpdmDataType::ConnectionState => return Err(SPDM_STATUS_UNSUPPORTED),
        }

        Ok(())
    }

    /// Read one piece of context data back. Connection-side kinds must
    /// be addressed with the `Connection` location; the written size is
    /// returned.
    pub fn get_data(
        &self,
        data_type: SpdmDataType,
        parameter: &SpdmDataParameter,
        data: &mut [u8],
    ) -> SpdmResult<usize> {
        if is_debug_only_data(data_type) {
            return Err(SPDM_STATUS_UNSUPPORTED);
        }

        if need_session_info_for_data(data_type) {
            if parameter.location != SpdmDataLocation::Session {
                return Err(SPDM_STATUS_INVALID_PARAMETER);
            }
            let session_id = u32::from_le_bytes(parameter.additional_data);
            if self.get_immutable_session_via_id(session_id).is_none() {
                return Err(SPDM_STATUS_INVALID_PARAMETER);
            }
        }

        let connection_only = |parameter: &SpdmDataParameter| -> SpdmResult {
            if parameter.location != SpdmDataLocation::Connection {
                return Err(SPDM_STATUS_INVALID_PARAMETER);
            }
            Ok(())
        };

        match data_type {
            SpdmDataType::CapabilityFlags => {
                connection_only(parameter)?;
                write_out(
                    data,
                    &self.connection_info.capability.flags.bits().to_le_bytes(),
                )
            }
            SpdmDataType::CapabilityCtExponent => {
                connection_only(parameter)?;
                write_out(data, &[self.connection_info.capability.ct_exponent])
            }
            SpdmDataType::MeasurementHashAlgo => {
                connection_only(parameter)?;
                write_out(
                    data,
                    &self
                        .connection_info
                        .algorithm
                        .measurement_hash_algo
                        .bits()
                        .to_le_bytes(),
                )
            }
            SpdmDataType::BaseAsymAlgo => {
                connection_only(parameter)?;
                write_out(
                    data,
                    &self
                        .connection_info
                        .algorithm
                        .base_asym_algo
                        .bits()
                        .to_le_bytes(),
                )
            }
            SpdmDataType::BaseHashAlgo => {
                connection_only(parameter)?;
                write_out(
                    data,
                    &self
                        .connection_info
                        .algorithm
                        .base_hash_algo
                        .bits()
                        .to_le_bytes(),
                )
            }
            SpdmDataType::DheNamedGroup => {
                connection_only(parameter)?;
                write_out(
                    data,
                    &self
                        .connection_info
                        .algorithm
                        .dhe_named_group
                        .bits()
                        .to_le_bytes(),
                )
            }
            SpdmDataType::AeadCipherSuite => {
                connection_only(parameter)?;
                write_out(
                    data,
                    &self
                        .connection_info
                        .algorithm
                        .aead_cipher_suite
                        .bits()
                        .to_le_bytes(),
                )
            }
            SpdmDataType::ReqBaseAsymAlg => {
                connection_only(parameter)?;
                write_out(
                    data,
                    &self
                        .connection_info
                        .algorithm
                        .req_base_asym_alg
                        .bits()
                        .to_le_bytes(),
                )
            }
            SpdmDataType::KeySchedule => {
                connection_only(parameter)?;
                write_out(
                    data,
                    &self
                        .connection_info
                        .algorithm
                        .key_schedule
                        .bits()
                        .to_le_bytes(),
                )
            }
            SpdmDataType::ConnectionState => {
                connection_only(parameter)?;
                write_out(
                    data,
                    &(self.get_connection_state().get_u8() as u32).to_le_bytes(),
                )
            }
            SpdmDataType::ResponseState => {
                write_out(data, &self.response_state.get_u32().to_le_bytes())
            }
            _ => Err(SPDM_STATUS_UNSUPPORTED),
        }
    }
}
