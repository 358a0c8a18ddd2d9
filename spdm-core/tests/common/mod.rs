// Copyright (c) 2021 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Shared collaborators for the integration tests: a ring-backed
//! primitive provider, a keyed test signer whose "leaf certificate"
//! carries the verification key, and a secured-message context that
//! derives its finished keys from TH1 the way the production layer
//! does, minus the AEAD machinery.

#![allow(dead_code)]

use ring::{digest, hmac, rand::SecureRandom};

use spdm_core::common::{
    SpdmConnectionState, SpdmContext, SpdmDeviceIo, SpdmTransportEncap,
};
use spdm_core::crypto::{
    SpdmAsymVerify, SpdmCertOperation, SpdmCryptoProvider, SpdmCryptoRandom, SpdmHash, SpdmHmac,
};
use spdm_core::error::{
    SpdmResult, SPDM_STATUS_DEVICE_ERROR, SPDM_STATUS_INVALID_PARAMETER,
    SPDM_STATUS_SECURITY_VIOLATION,
};
use spdm_core::protocol::*;
use spdm_core::secret::{SpdmSecretAsymSign, SpdmSecretMeasurement, SpdmSecretProvider};
use spdm_core::secured_message::{SpdmSecuredMessage, SpdmSessionType};

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// ----------------------------------------------------------------------
// ring-backed primitives
// ----------------------------------------------------------------------

fn digest_algorithm(base_hash_algo: SpdmBaseHashAlgo) -> Option<&'static digest::Algorithm> {
    match base_hash_algo {
        SpdmBaseHashAlgo::TPM_ALG_SHA_256 => Some(&digest::SHA256),
        SpdmBaseHashAlgo::TPM_ALG_SHA_384 => Some(&digest::SHA384),
        SpdmBaseHashAlgo::TPM_ALG_SHA_512 => Some(&digest::SHA512),
        _ => None,
    }
}

fn hmac_algorithm(base_hash_algo: SpdmBaseHashAlgo) -> Option<hmac::Algorithm> {
    match base_hash_algo {
        SpdmBaseHashAlgo::TPM_ALG_SHA_256 => Some(hmac::HMAC_SHA256),
        SpdmBaseHashAlgo::TPM_ALG_SHA_384 => Some(hmac::HMAC_SHA384),
        SpdmBaseHashAlgo::TPM_ALG_SHA_512 => Some(hmac::HMAC_SHA512),
        _ => None,
    }
}

fn hash_all(base_hash_algo: SpdmBaseHashAlgo, data: &[u8]) -> Option<SpdmDigestStruct> {
    let algorithm = digest_algorithm(base_hash_algo)?;
    Some(SpdmDigestStruct::from(
        digest::digest(algorithm, data).as_ref(),
    ))
}

fn hmac_all(base_hash_algo: SpdmBaseHashAlgo, key: &[u8], data: &[u8]) -> Option<SpdmDigestStruct> {
    let algorithm = hmac_algorithm(base_hash_algo)?;
    let key = hmac::Key::new(algorithm, key);
    Some(SpdmDigestStruct::from(hmac::sign(&key, data).as_ref()))
}

fn hmac_verify(
    base_hash_algo: SpdmBaseHashAlgo,
    key: &[u8],
    data: &[u8],
    tag: &SpdmDigestStruct,
) -> SpdmResult {
    let algorithm = hmac_algorithm(base_hash_algo).ok_or(SPDM_STATUS_SECURITY_VIOLATION)?;
    let key = hmac::Key::new(algorithm, key);
    hmac::verify(&key, data, tag.as_ref()).map_err(|_| SPDM_STATUS_SECURITY_VIOLATION)
}

// Keyed test signer. A "leaf certificate" is the raw verification key;
// a signature is the HMAC of the message hash under that key, expanded
// to the algorithm's signature width. The private-key side lives here
// the way a host data-signing callback would hold it.

pub const RESPONDER_SIGNING_KEY: &[u8] = b"integration responder signing key";
pub const REQUESTER_SIGNING_KEY: &[u8] = b"integration requester signing key";

fn keyed_signature(key: &[u8], message_hash: &[u8], size: usize) -> SpdmSignatureStruct {
    let tag = hmac::sign(&hmac::Key::new(hmac::HMAC_SHA256, key), message_hash);
    let mut signature = SpdmSignatureStruct {
        data_size: size as u16,
        ..Default::default()
    };
    for (i, b) in signature.data[..size].iter_mut().enumerate() {
        *b = tag.as_ref()[i % tag.as_ref().len()];
    }
    signature
}

fn requester_data_sign(
    req_base_asym_alg: SpdmReqAsymAlgo,
    message_hash: &[u8],
) -> Option<SpdmSignatureStruct> {
    Some(keyed_signature(
        REQUESTER_SIGNING_KEY,
        message_hash,
        req_base_asym_alg.get_size() as usize,
    ))
}

fn responder_data_sign(
    base_asym_algo: SpdmBaseAsymAlgo,
    message_hash: &[u8],
) -> Option<SpdmSignatureStruct> {
    Some(keyed_signature(
        RESPONDER_SIGNING_KEY,
        message_hash,
        base_asym_algo.get_size() as usize,
    ))
}

fn asym_verify(
    _base_hash_algo: SpdmBaseHashAlgo,
    base_asym_algo: SpdmBaseAsymAlgo,
    public_cert_der: &[u8],
    data: &[u8],
    signature: &SpdmSignatureStruct,
) -> SpdmResult {
    let expected = keyed_signature(public_cert_der, data, base_asym_algo.get_size() as usize);
    if expected.as_ref() == signature.as_ref() {
        Ok(())
    } else {
        Err(SPDM_STATUS_SECURITY_VIOLATION)
    }
}

fn get_cert_from_cert_chain(cert_chain: &[u8], _index: isize) -> SpdmResult<(usize, usize)> {
    // test chains carry exactly one certificate
    if cert_chain.is_empty() {
        return Err(SPDM_STATUS_INVALID_PARAMETER);
    }
    Ok((0, cert_chain.len()))
}

fn verify_cert_chain(cert_chain: &[u8]) -> SpdmResult {
    if cert_chain.len() < SPDM_CERT_CHAIN_HEADER_SIZE {
        return Err(SPDM_STATUS_SECURITY_VIOLATION);
    }
    let length = u16::from_le_bytes([cert_chain[0], cert_chain[1]]) as usize;
    if length != cert_chain.len() {
        return Err(SPDM_STATUS_SECURITY_VIOLATION);
    }
    Ok(())
}

fn get_random(data: &mut [u8]) -> SpdmResult<usize> {
    let rng = ring::rand::SystemRandom::new();
    rng.fill(data).map_err(|_| SPDM_STATUS_DEVICE_ERROR)?;
    Ok(data.len())
}

pub fn crypto_provider() -> SpdmCryptoProvider {
    SpdmCryptoProvider {
        hash: SpdmHash { hash_all_cb: hash_all },
        hmac: SpdmHmac {
            hmac_cb: hmac_all,
            hmac_verify_cb: hmac_verify,
        },
        asym_verify: SpdmAsymVerify {
            verify_cb: asym_verify,
        },
        cert_operation: SpdmCertOperation {
            get_cert_from_cert_chain_cb: get_cert_from_cert_chain,
            verify_cert_chain_cb: verify_cert_chain,
        },
        rand: SpdmCryptoRandom {
            get_random_cb: get_random,
        },
    }
}

// ----------------------------------------------------------------------
// measurement collector
// ----------------------------------------------------------------------

pub fn measurement_blocks() -> Vec<(u8, Vec<u8>)> {
    vec![
        (
            SPDM_MEASUREMENT_BLOCK_MEASUREMENT_TYPE_IMMUTABLE_ROM,
            vec![0xA1; 32],
        ),
        (SPDM_MEASUREMENT_BLOCK_MEASUREMENT_TYPE_FIRMWARE, vec![0xB2; 32]),
        (
            SPDM_MEASUREMENT_BLOCK_MEASUREMENT_TYPE_HARDWARE_CONFIG,
            vec![0xC3; 16],
        ),
    ]
}

fn measurement_collection(
    _measurement_specification: SpdmMeasurementSpecification,
    _measurement_hash_algo: SpdmMeasurementHashAlgo,
) -> Option<SpdmMeasurementRecordStructure> {
    let mut record = SpdmMeasurementRecordStructure::default();
    let mut offset = 0usize;
    for (index, (value_type, value)) in measurement_blocks().iter().enumerate() {
        let measurement_size = (SPDM_MEASUREMENT_BLOCK_DMTF_HEADER_SIZE + value.len()) as u16;
        record.record[offset] = index as u8 + 1;
        record.record[offset + 1] = SpdmMeasurementSpecification::DMTF.bits();
        record.record[offset + 2..offset + 4].copy_from_slice(&measurement_size.to_le_bytes());
        offset += SPDM_MEASUREMENT_BLOCK_COMMON_HEADER_SIZE;
        record.record[offset] = *value_type;
        record.record[offset + 1..offset + 3].copy_from_slice(&(value.len() as u16).to_le_bytes());
        offset += SPDM_MEASUREMENT_BLOCK_DMTF_HEADER_SIZE;
        record.record[offset..offset + value.len()].copy_from_slice(value);
        offset += value.len();
    }
    record.number_of_blocks = measurement_blocks().len() as u8;
    record.record_size = offset as u16;
    Some(record)
}

pub fn secret_provider() -> SpdmSecretProvider {
    SpdmSecretProvider {
        asym_sign: SpdmSecretAsymSign {
            requester_data_sign_cb: requester_data_sign,
            responder_data_sign_cb: responder_data_sign,
        },
        measurement: SpdmSecretMeasurement {
            measurement_collection_cb: measurement_collection,
        },
    }
}

// ----------------------------------------------------------------------
// secured-message context
// ----------------------------------------------------------------------

/// The shared secret both ends of a DHE handshake would have agreed on.
/// The real collaborator owns the exchange; the tests pin the result.
const TEST_DHE_SECRET: &[u8] = b"test dhe shared secret";

#[derive(Default)]
pub struct TestSecuredMessage {
    base_hash_algo: SpdmBaseHashAlgo,
    session_type: SpdmSessionType,
    use_psk: bool,
    psk_hint: Option<SpdmPskHintStruct>,
    request_finished_key: Option<Vec<u8>>,
    response_finished_key: Option<Vec<u8>>,
    data_key_ready: bool,
}

impl TestSecuredMessage {
    fn ikm(&self) -> Vec<u8> {
        if self.use_psk {
            let mut ikm = b"psk:".to_vec();
            if let Some(hint) = &self.psk_hint {
                ikm.extend_from_slice(hint.as_ref());
            }
            ikm
        } else {
            TEST_DHE_SECRET.to_vec()
        }
    }

    pub fn is_data_key_ready(&self) -> bool {
        self.data_key_ready
    }
}

impl SpdmSecuredMessage for TestSecuredMessage {
    fn init_context(&mut self) {
        *self = TestSecuredMessage::default();
    }

    fn set_use_psk(&mut self, use_psk: bool) {
        self.use_psk = use_psk;
    }

    fn set_session_type(&mut self, session_type: SpdmSessionType) {
        self.session_type = session_type;
    }

    fn set_algorithms(
        &mut self,
        base_hash_algo: SpdmBaseHashAlgo,
        _dhe_named_group: SpdmDheAlgo,
        _aead_cipher_suite: SpdmAeadAlgo,
        _key_schedule: SpdmKeyScheduleAlgo,
    ) {
        self.base_hash_algo = base_hash_algo;
    }

    fn set_psk_hint(&mut self, psk_hint: &SpdmPskHintStruct) {
        self.psk_hint = Some(psk_hint.clone());
    }

    fn hmac_with_request_finished_key(&self, message: &[u8]) -> SpdmResult<SpdmDigestStruct> {
        let key = self
            .request_finished_key
            .as_ref()
            .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
        hmac_all(self.base_hash_algo, key, message).ok_or(SPDM_STATUS_DEVICE_ERROR)
    }

    fn hmac_with_response_finished_key(&self, message: &[u8]) -> SpdmResult<SpdmDigestStruct> {
        let key = self
            .response_finished_key
            .as_ref()
            .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
        hmac_all(self.base_hash_algo, key, message).ok_or(SPDM_STATUS_DEVICE_ERROR)
    }

    fn generate_handshake_key(&mut self, th1: &SpdmDigestStruct) -> SpdmResult {
        let ikm = self.ikm();
        let request = hmac_all(
            self.base_hash_algo,
            &ikm,
            &[&b"req finished "[..], th1.as_ref()].concat(),
        )
        .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
        let response = hmac_all(
            self.base_hash_algo,
            &ikm,
            &[&b"rsp finished "[..], th1.as_ref()].concat(),
        )
        .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
        self.request_finished_key = Some(request.as_ref().to_vec());
        self.response_finished_key = Some(response.as_ref().to_vec());
        Ok(())
    }

    fn generate_data_key(&mut self, _th2: &SpdmDigestStruct) -> SpdmResult {
        if self.request_finished_key.is_none() {
            return Err(SPDM_STATUS_DEVICE_ERROR);
        }
        self.data_key_ready = true;
        Ok(())
    }

    fn encode_message(
        &mut self,
        _session_id: u32,
        app_buffer: &[u8],
        secured_buffer: &mut [u8],
        _is_requester: bool,
    ) -> SpdmResult<usize> {
        // MAC-less copy; the AEAD layer is out of engine scope
        secured_buffer[..app_buffer.len()].copy_from_slice(app_buffer);
        Ok(app_buffer.len())
    }

    fn decode_message(
        &mut self,
        _session_id: u32,
        secured_buffer: &[u8],
        app_buffer: &mut [u8],
        _is_requester: bool,
    ) -> SpdmResult<usize> {
        app_buffer[..secured_buffer.len()].copy_from_slice(secured_buffer);
        Ok(secured_buffer.len())
    }
}

// ----------------------------------------------------------------------
// loopback transport
// ----------------------------------------------------------------------

pub type MessageQueue = Arc<Mutex<VecDeque<Vec<u8>>>>;

pub struct LoopbackDeviceIo {
    pub tx: MessageQueue,
    pub rx: MessageQueue,
}

impl SpdmDeviceIo for LoopbackDeviceIo {
    fn send(&mut self, _session_id: Option<u32>, buffer: &[u8]) -> SpdmResult {
        self.tx.lock().unwrap().push_back(buffer.to_vec());
        Ok(())
    }

    fn receive(&mut self, _session_id: Option<u32>, buffer: &mut [u8]) -> SpdmResult<usize> {
        let message = self
            .rx
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
        if buffer.len() < message.len() {
            return Err(SPDM_STATUS_DEVICE_ERROR);
        }
        buffer[..message.len()].copy_from_slice(&message);
        Ok(message.len())
    }
}

/// Five-byte frame header: secured flag plus the session id.
pub struct TestTransportEncap;

impl SpdmTransportEncap for TestTransportEncap {
    fn encode(
        &mut self,
        session_id: Option<u32>,
        spdm_buffer: &[u8],
        transport_buffer: &mut [u8],
    ) -> SpdmResult<usize> {
        let total = 5 + spdm_buffer.len();
        if transport_buffer.len() < total {
            return Err(SPDM_STATUS_DEVICE_ERROR);
        }
        transport_buffer[0] = session_id.is_some() as u8;
        transport_buffer[1..5].copy_from_slice(&session_id.unwrap_or(0).to_le_bytes());
        transport_buffer[5..total].copy_from_slice(spdm_buffer);
        Ok(total)
    }

    fn decode(
        &mut self,
        transport_buffer: &[u8],
        spdm_buffer: &mut [u8],
    ) -> SpdmResult<(Option<u32>, usize)> {
        if transport_buffer.len() < 5 {
            return Err(SPDM_STATUS_DEVICE_ERROR);
        }
        let session_id = if transport_buffer[0] != 0 {
            Some(u32::from_le_bytes(
                transport_buffer[1..5].try_into().unwrap(),
            ))
        } else {
            None
        };
        let payload = &transport_buffer[5..];
        if spdm_buffer.len() < payload.len() {
            return Err(SPDM_STATUS_DEVICE_ERROR);
        }
        spdm_buffer[..payload.len()].copy_from_slice(payload);
        Ok((session_id, payload.len()))
    }
}

// ----------------------------------------------------------------------
// context setup
// ----------------------------------------------------------------------

pub fn new_context() -> SpdmContext {
    let _ = env_logger::builder().is_test(true).try_init();
    SpdmContext::new(crypto_provider(), secret_provider(), || {
        Box::new(TestSecuredMessage::default())
    })
}

pub fn negotiated_algorithms() -> SpdmDeviceAlgorithm {
    SpdmDeviceAlgorithm {
        measurement_spec: SpdmMeasurementSpecification::DMTF,
        measurement_hash_algo: SpdmMeasurementHashAlgo::TPM_ALG_SHA_256,
        base_asym_algo: SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P256,
        base_hash_algo: SpdmBaseHashAlgo::TPM_ALG_SHA_256,
        dhe_named_group: SpdmDheAlgo::SECP_256_R1,
        aead_cipher_suite: SpdmAeadAlgo::AES_128_GCM,
        req_base_asym_alg: SpdmReqAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P256,
        key_schedule: SpdmKeyScheduleAlgo::SPDM_KEY_SCHEDULE,
    }
}

pub fn negotiate(context: &mut SpdmContext, capability_flags: SpdmCapabilityFlags) {
    context.connection_info.algorithm = negotiated_algorithms();
    context.connection_info.capability.flags = capability_flags;
    context
        .set_negotiated_versions(&[SpdmVersion::SpdmVersion10, SpdmVersion::SpdmVersion11])
        .unwrap();
    context
        .set_connection_state(SpdmConnectionState::SpdmConnectionAfterNegotiateAlgorithms)
        .unwrap();
}

pub fn responder_cert_chain() -> SpdmCertChainBuffer {
    let root_hash = digest::digest(&digest::SHA256, RESPONDER_SIGNING_KEY);
    SpdmCertChainBuffer::new(RESPONDER_SIGNING_KEY, root_hash.as_ref()).unwrap()
}

pub fn requester_cert_chain() -> SpdmCertChainBuffer {
    let root_hash = digest::digest(&digest::SHA256, REQUESTER_SIGNING_KEY);
    SpdmCertChainBuffer::new(REQUESTER_SIGNING_KEY, root_hash.as_ref()).unwrap()
}

/// A requester/responder pair that finished negotiation with identical
/// MessageA transcripts and exchanged certificate chains.
pub fn authenticated_pair(capability_flags: SpdmCapabilityFlags) -> (SpdmContext, SpdmContext) {
    let mut requester = new_context();
    let mut responder = new_context();
    negotiate(&mut requester, capability_flags);
    negotiate(&mut responder, capability_flags);

    let message_a = b"\x11\x84\x00\x00\x11\x04\x00\x00\x11\xE1\x00\x00\x11\x61\x00\x00";
    requester.append_message_a(message_a).unwrap();
    responder.append_message_a(message_a).unwrap();

    let responder_chain = responder_cert_chain();
    responder.local_context.my_cert_chain[0] = Some(responder_chain.clone());
    responder.local_context.slot_count = 1;
    responder.connection_info.local_used_cert_chain_slot = Some(0);
    requester.connection_info.peer_used_cert_chain_buffer = Some(responder_chain);

    (requester, responder)
}
