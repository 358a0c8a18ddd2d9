// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

pub mod crypto_service;
pub mod encap;
pub mod managed_buffer;
pub mod opaque;
pub mod session;
pub mod transcript;

mod context_data;

pub use context_data::{SpdmDataLocation, SpdmDataParameter, SpdmDataType};
pub use encap::SpdmEncapContext;
pub use managed_buffer::{LargeManagedBuffer, ManagedBuffer, SmallManagedBuffer};
pub use opaque::{SpdmOpaqueStruct, MAX_SPDM_OPAQUE_SIZE};
pub use session::{SpdmSessionInfo, SpdmSessionState};
pub use transcript::{SpdmSessionTranscript, SpdmTranscript};

extern crate alloc;
use alloc::boxed::Box;

use crate::config;
use crate::crypto::SpdmCryptoProvider;
use crate::error::{
    SpdmResult, SpdmStatus, SPDM_STATUS_BUFFER_TOO_SMALL, SPDM_STATUS_DEVICE_ERROR,
    SPDM_STATUS_INVALID_PARAMETER, SPDM_STATUS_SECURITY_VIOLATION,
};
use crate::message::{
    SpdmErrorCode, SpdmErrorResponseNotReadyExtData, SpdmKeyExchangeMutAuthAttributes,
    SpdmRequestResponseCode,
};
use crate::protocol::*;
use crate::secret::SpdmSecretProvider;
use crate::secured_message::{SpdmSecuredMessageFactory, SpdmSessionType};

use codec::enum_builder;
use codec::{Codec, Reader, Writer};

/// 0 marks a free session-table row and is never a valid session id.
pub const INVALID_SESSION_ID: u32 = 0;
pub const INVALID_HALF_SESSION_ID: u16 = 0;

enum_builder! {
    @U8
    EnumName: SpdmConnectionState;
    EnumVal{
        // Before GET_VERSION/VERSION
        SpdmConnectionNotStarted => 0x0,
        // After GET_VERSION/VERSION
        SpdmConnectionAfterVersion => 0x1,
        // After GET_CAPABILITIES/CAPABILITIES
        SpdmConnectionAfterCapabilities => 0x2,
        // After NEGOTIATE_ALGORITHMS/ALGORITHMS
        SpdmConnectionAfterNegotiateAlgorithms => 0x3,
        // After GET_DIGESTS/DIGESTS
        SpdmConnectionAfterDigests => 0x4,
        // After GET_CERTIFICATE/CERTIFICATE
        SpdmConnectionAfterCertificate => 0x5,
        // After CHALLENGE/CHALLENGE_AUTH
        SpdmConnectionAuthenticated => 0x6
    }
}
impl Default for SpdmConnectionState {
    fn default() -> SpdmConnectionState {
        SpdmConnectionState::SpdmConnectionNotStarted
    }
}

enum_builder! {
    @U32
    EnumName: SpdmResponseState;
    EnumVal{
        SpdmResponseStateNormal => 0x0,
        SpdmResponseStateBusy => 0x1,
        SpdmResponseStateNotReady => 0x2,
        SpdmResponseStateNeedResync => 0x3
    }
}
impl Default for SpdmResponseState {
    fn default() -> SpdmResponseState {
        SpdmResponseState::SpdmResponseStateNormal
    }
}

/// Raw message transport. The two calls are the engine's only
/// suspension points; the engine treats them as atomic.
pub trait SpdmDeviceIo {
    fn send(&mut self, session_id: Option<u32>, buffer: &[u8]) -> SpdmResult;

    fn receive(&mut self, session_id: Option<u32>, buffer: &mut [u8]) -> SpdmResult<usize>;
}

/// Transport framing (MCTP, PCIe DOE, ...).
pub trait SpdmTransportEncap {
    fn encode(
        &mut self,
        session_id: Option<u32>,
        spdm_buffer: &[u8],
        transport_buffer: &mut [u8],
    ) -> SpdmResult<usize>;

    /// Returns the session id carried by the frame (None for plain
    /// messages) and the decoded payload size.
    fn decode(
        &mut self,
        transport_buffer: &[u8],
        spdm_buffer: &mut [u8],
    ) -> SpdmResult<(Option<u32>, usize)>;
}

/// Locally provisioned state: own capabilities and algorithm
/// preferences, certificate slots, peer trust anchors and the PSK hint.
#[derive(Default)]
pub struct SpdmLocalContext {
    pub capability: SpdmDeviceCapability,
    pub algorithm: SpdmDeviceAlgorithm,
    pub my_cert_chain: [Option<SpdmCertChainBuffer>; SPDM_MAX_SLOT_NUMBER],
    pub slot_count: u8,
    pub peer_root_cert_hash_provision: Option<SpdmDigestStruct>,
    pub peer_cert_chain_provision: Option<SpdmCertChainBuffer>,
    pub psk_hint: Option<SpdmPskHintStruct>,
    pub opaque_challenge_auth_rsp: SpdmOpaqueStruct,
    pub opaque_measurement_rsp: SpdmOpaqueStruct,
    pub basic_mut_auth_requested: bool,
    pub mut_auth_requested: SpdmKeyExchangeMutAuthAttributes,
}

/// State of the current dialog with one peer. Algorithm fields are
/// valid only after NEGOTIATE_ALGORITHMS; the peer chain buffer only
/// after GET_CERTIFICATE.
#[derive(Default)]
pub struct SpdmConnectionInfo {
    connection_state: SpdmConnectionState,
    pub spdm_version_sel: SpdmVersion,
    pub version_list: [Option<SpdmVersion>; MAX_SPDM_VERSION_COUNT],
    pub capability: SpdmDeviceCapability,
    pub algorithm: SpdmDeviceAlgorithm,
    pub peer_used_cert_chain_buffer: Option<SpdmCertChainBuffer>,
    /// Slot of the local chain used on this connection: the responder's
    /// answering chain, or the requester's mutual-auth chain.
    pub local_used_cert_chain_slot: Option<u8>,
}

impl SpdmConnectionInfo {
    pub fn get_connection_state(&self) -> SpdmConnectionState {
        self.connection_state
    }
}

/// Last machine-readable error of the context, kept alongside the peer
/// ERROR subcode when the error class is `ErrorPeer`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpdmErrorState {
    last_status: Option<SpdmStatus>,
    peer_error_code: Option<SpdmErrorCode>,
}

pub struct SpdmContext {
    device_io: Option<Box<dyn SpdmDeviceIo + Send>>,
    transport_encap: Option<Box<dyn SpdmTransportEncap + Send>>,

    pub crypto: SpdmCryptoProvider,
    pub secret: SpdmSecretProvider,

    pub local_context: SpdmLocalContext,
    pub connection_info: SpdmConnectionInfo,
    pub transcript: SpdmTranscript,
    pub encap_context: SpdmEncapContext,

    session: [SpdmSessionInfo; config::MAX_SPDM_SESSION_COUNT],
    latest_session_id: Option<u32>,

    pub response_state: SpdmResponseState,
    error_state: SpdmErrorState,
    /// Extended-error payload of the last ERROR(ResponseNotReady),
    /// kept for the RESPOND_IF_READY retry.
    pub not_ready_error_data: Option<SpdmErrorResponseNotReadyExtData>,
    pub retry_times: u8,
}

impl SpdmContext {
    pub fn new(
        crypto: SpdmCryptoProvider,
        secret: SpdmSecretProvider,
        secured_message_factory: SpdmSecuredMessageFactory,
    ) -> Self {
        SpdmContext {
            device_io: None,
            transport_encap: None,
            crypto,
            secret,
            local_context: SpdmLocalContext::default(),
            connection_info: SpdmConnectionInfo::default(),
            transcript: SpdmTranscript::default(),
            encap_context: SpdmEncapContext::default(),
            session: core::array::from_fn(|_| SpdmSessionInfo::new(secured_message_factory())),
            latest_session_id: None,
            response_state: SpdmResponseState::default(),
            error_state: SpdmErrorState::default(),
            not_ready_error_data: None,
            retry_times: config::MAX_SPDM_REQUEST_RETRY_TIMES,
        }
    }

    /// Register the raw message transport. Must happen before any
    /// message exchange.
    pub fn register_device_io(&mut self, device_io: Box<dyn SpdmDeviceIo + Send>) {
        self.device_io = Some(device_io);
    }

    /// Register the transport framing layer. Must happen before any
    /// message exchange.
    pub fn register_transport(&mut self, transport_encap: Box<dyn SpdmTransportEncap + Send>) {
        self.transport_encap = Some(transport_encap);
    }

    pub fn get_hash_size(&self) -> u16 {
        self.connection_info.algorithm.base_hash_algo.get_size()
    }

    pub fn get_asym_key_size(&self) -> u16 {
        self.connection_info.algorithm.base_asym_algo.get_size()
    }

    pub fn get_req_asym_key_size(&self) -> u16 {
        self.connection_info.algorithm.req_base_asym_alg.get_size()
    }

    pub fn get_dhe_key_size(&self) -> u16 {
        self.connection_info.algorithm.dhe_named_group.get_size()
    }

    /// Drop all dialog state and every session, keeping the provisioned
    /// local context and the registered collaborators.
    pub fn reset_context(&mut self) {
        self.connection_info = SpdmConnectionInfo::default();
        self.transcript.reset();
        self.encap_context = SpdmEncapContext::default();
        for s in &mut self.session {
            s.set_default();
        }
        self.latest_session_id = None;
        self.response_state = SpdmResponseState::default();
        self.error_state = SpdmErrorState::default();
    }

    /// Connection state only moves forward; a regression is a caller
    /// bug and is rejected.
    pub fn set_connection_state(&mut self, connection_state: SpdmConnectionState) -> SpdmResult {
        if connection_state.get_u8() < self.connection_info.connection_state.get_u8() {
            return Err(SPDM_STATUS_INVALID_PARAMETER);
        }
        self.connection_info.connection_state = connection_state;
        Ok(())
    }

    pub fn get_connection_state(&self) -> SpdmConnectionState {
        self.connection_info.connection_state
    }

    /// Record the common version set after GET_VERSION/VERSION.
    pub fn set_negotiated_versions(&mut self, versions: &[SpdmVersion]) -> SpdmResult {
        if versions.len() > MAX_SPDM_VERSION_COUNT {
            return Err(SPDM_STATUS_INVALID_PARAMETER);
        }
        self.connection_info.version_list = [None; MAX_SPDM_VERSION_COUNT];
        for (slot, version) in self.connection_info.version_list.iter_mut().zip(versions) {
            *slot = Some(*version);
        }
        Ok(())
    }

    pub fn is_version_supported(&self, version: SpdmVersion) -> bool {
        self.connection_info
            .version_list
            .iter()
            .any(|v| *v == Some(version))
    }

    pub fn get_last_error(&self) -> Option<SpdmStatus> {
        self.error_state.last_status
    }

    pub fn get_last_peer_error_code(&self) -> Option<SpdmErrorCode> {
        self.error_state.peer_error_code
    }

    pub fn record_error(&mut self, status: SpdmStatus) {
        self.error_state.last_status = Some(status);
        if status != SpdmStatus::ErrorPeer {
            self.error_state.peer_error_code = None;
        }
    }

    pub fn record_peer_error(&mut self, error_code: SpdmErrorCode) {
        self.error_state.last_status = Some(SpdmStatus::ErrorPeer);
        self.error_state.peer_error_code = Some(error_code);
    }

    /// Map a received SPDM ERROR onto the engine error model:
    /// ResponseNotReady asks the caller to retry per `retry_times` and
    /// carries the extended data for RESPOND_IF_READY; any other code
    /// surfaces as `ErrorPeer` with the subcode recorded.
    pub fn handle_peer_error(
        &mut self,
        error_code: SpdmErrorCode,
        not_ready_data: Option<SpdmErrorResponseNotReadyExtData>,
    ) -> SpdmStatus {
        if error_code == SpdmErrorCode::SpdmErrorResponseNotReady {
            self.not_ready_error_data = not_ready_data;
            self.record_error(SpdmStatus::NoResponse);
            SpdmStatus::NoResponse
        } else {
            self.record_peer_error(error_code);
            SpdmStatus::ErrorPeer
        }
    }

    /// The local chain selected for this connection, if one was
    /// selected and is provisioned.
    pub fn local_used_cert_chain(&self) -> Option<&SpdmCertChainBuffer> {
        let slot = self.connection_info.local_used_cert_chain_slot?;
        self.local_context.my_cert_chain[slot as usize].as_ref()
    }

    /// Build and install the formatted chain for `slot_id` from raw DER
    /// certificates: chain header, hash of the root certificate, then
    /// the certificates. Requires the base hash to be selected.
    pub fn construct_local_cert_chain(&mut self, slot_id: u8, cert_chain: &[u8]) -> SpdmResult {
        if slot_id as usize >= SPDM_MAX_SLOT_NUMBER {
            return Err(SPDM_STATUS_INVALID_PARAMETER);
        }
        let (root_begin, root_end) = self.crypto.get_cert_from_cert_chain(cert_chain, 0)?;
        let root_hash = self
            .crypto
            .hash_all(
                self.connection_info.algorithm.base_hash_algo,
                &cert_chain[root_begin..root_end],
            )
            .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
        let chain = SpdmCertChainBuffer::new(cert_chain, root_hash.as_ref())
            .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
        debug!("my_cert_chain - {:02x?}\n", chain.as_ref());
        self.local_context.my_cert_chain[slot_id as usize] = Some(chain);
        Ok(())
    }

    // ------------------------------------------------------------------
    // session table
    // ------------------------------------------------------------------

    pub fn get_immutable_session_via_id(&self, session_id: u32) -> Option<&SpdmSessionInfo> {
        self.session
            .iter()
            .find(|session| session.get_session_id() == session_id)
    }

    pub fn get_session_via_id(&mut self, session_id: u32) -> Option<&mut SpdmSessionInfo> {
        self.session
            .iter_mut()
            .find(|session| session.get_session_id() == session_id)
    }

    pub fn get_session_status(&self) -> [(u32, SpdmSessionState); config::MAX_SPDM_SESSION_COUNT] {
        let mut status =
            [(0u32, SpdmSessionState::SpdmSessionNotStarted); config::MAX_SPDM_SESSION_COUNT];
        for (it, session) in status.iter_mut().zip(self.session.iter()) {
            it.0 = session.get_session_id();
            it.1 = session.get_session_state();
        }
        status
    }

    /// Latest assigned session id, kept for handshake-in-the-clear
    /// continuation.
    pub fn get_latest_session_id(&self) -> Option<u32> {
        self.latest_session_id
    }

    /// Claim a free row for a new session and push the negotiated
    /// algorithms, session type and PSK hint down to its
    /// secured-message context.
    pub fn assign_session_id(
        &mut self,
        session_id: u32,
        use_psk: bool,
    ) -> SpdmResult<&mut SpdmSessionInfo> {
        if session_id == INVALID_SESSION_ID {
            error!("assign_session_id - invalid session id\n");
            return Err(SPDM_STATUS_INVALID_PARAMETER);
        }
        if self
            .session
            .iter()
            .any(|session| session.get_session_id() == session_id)
        {
            error!("assign_session_id - duplicated session id\n");
            return Err(SPDM_STATUS_INVALID_PARAMETER);
        }

        let secure_caps = self.connection_info.capability.flags
            & (SpdmCapabilityFlags::ENCRYPT_CAP | SpdmCapabilityFlags::MAC_CAP);
        let session_type = if secure_caps
            == SpdmCapabilityFlags::ENCRYPT_CAP | SpdmCapabilityFlags::MAC_CAP
        {
            SpdmSessionType::SpdmSessionTypeEncMac
        } else if secure_caps == SpdmCapabilityFlags::MAC_CAP {
            SpdmSessionType::SpdmSessionTypeMacOnly
        } else if secure_caps.is_empty() {
            SpdmSessionType::SpdmSessionTypeNone
        } else {
            // ENCRYPT without MAC is not a negotiable session type
            return Err(SPDM_STATUS_INVALID_PARAMETER);
        };
        let algorithm = self.connection_info.algorithm;
        let psk_hint = self.local_context.psk_hint.clone();

        let index = self
            .session
            .iter()
            .position(|session| session.get_session_id() == INVALID_SESSION_ID)
            .ok_or(SPDM_STATUS_DEVICE_ERROR)?;

        self.latest_session_id = Some(session_id);

        let session = &mut self.session[index];
        session.setup(session_id)?;
        session.set_use_psk(use_psk);
        session.secured_message.set_use_psk(use_psk);
        session.secured_message.set_session_type(session_type);
        session.secured_message.set_algorithms(
            algorithm.base_hash_algo,
            algorithm.dhe_named_group,
            algorithm.aead_cipher_suite,
            algorithm.key_schedule,
        );
        if let Some(psk_hint) = &psk_hint {
            session.secured_message.set_psk_hint(psk_hint);
        }
        Ok(session)
    }

    /// Release the row holding `session_id` and hand it back for any
    /// caller-side cleanup.
    pub fn free_session_id(&mut self, session_id: u32) -> SpdmResult<&mut SpdmSessionInfo> {
        if session_id == INVALID_SESSION_ID {
            error!("free_session_id - invalid session id\n");
            return Err(SPDM_STATUS_INVALID_PARAMETER);
        }
        let session = self
            .session
            .iter_mut()
            .find(|session| session.get_session_id() == session_id)
            .ok_or(SPDM_STATUS_INVALID_PARAMETER)?;
        session.set_default();
        Ok(session)
    }

    /// Allocate the requester half (high 16 bits) of a new session id.
    /// `0xFFFF - index` of the first row without a requester half gives
    /// a deterministic, collision-free half until the table fills.
    pub fn allocate_req_session_id(&self) -> SpdmResult<u16> {
        for (index, session) in self.session.iter().enumerate() {
            if (session.get_session_id() >> 16) as u16 == INVALID_HALF_SESSION_ID {
                return Ok(0xFFFF - index as u16);
            }
        }

        error!("allocate_req_session_id - table full\n");
        Err(SPDM_STATUS_DEVICE_ERROR)
    }

    /// Allocate the responder half (low 16 bits) of a new session id.
    pub fn allocate_rsp_session_id(&self) -> SpdmResult<u16> {
        for (index, session) in self.session.iter().enumerate() {
            if (session.get_session_id() & 0xFFFF) as u16 == INVALID_HALF_SESSION_ID {
                return Ok(0xFFFF - index as u16);
            }
        }

        error!("allocate_rsp_session_id - table full\n");
        Err(SPDM_STATUS_DEVICE_ERROR)
    }

    // ------------------------------------------------------------------
    // transcript bookkeeping
    // ------------------------------------------------------------------

    pub fn append_message_a(&mut self, new_message: &[u8]) -> SpdmResult {
        self.transcript
            .message_a
            .append_message(new_message)
            .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
        Ok(())
    }
    pub fn reset_message_a(&mut self) {
        self.transcript.message_a.reset_message();
    }

    pub fn append_message_b(&mut self, new_message: &[u8]) -> SpdmResult {
        self.transcript
            .message_b
            .append_message(new_message)
            .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
        Ok(())
    }
    pub fn reset_message_b(&mut self) {
        self.transcript.message_b.reset_message();
    }

    pub fn append_message_c(&mut self, new_message: &[u8]) -> SpdmResult {
        self.transcript
            .message_c
            .append_message(new_message)
            .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
        Ok(())
    }
    pub fn reset_message_c(&mut self) {
        self.transcript.message_c.reset_message();
    }

    pub fn append_message_mut_b(&mut self, new_message: &[u8]) -> SpdmResult {
        self.transcript
            .message_mut_b
            .append_message(new_message)
            .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
        Ok(())
    }
    pub fn reset_message_mut_b(&mut self) {
        self.transcript.message_mut_b.reset_message();
    }

    pub fn append_message_mut_c(&mut self, new_message: &[u8]) -> SpdmResult {
        self.transcript
            .message_mut_c
            .append_message(new_message)
            .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
        Ok(())
    }
    pub fn reset_message_mut_c(&mut self) {
        self.transcript.message_mut_c.reset_message();
    }

    pub fn append_message_l1l2(&mut self, new_message: &[u8]) -> SpdmResult {
        self.transcript
            .l1l2
            .append_message(new_message)
            .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
        Ok(())
    }
    pub fn reset_message_l1l2(&mut self) {
        self.transcript.l1l2.reset_message();
    }

    pub fn reset_message_m1m2(&mut self) {
        self.transcript.m1m2.reset_message();
    }

    pub fn append_message_k(&mut self, session_id: u32, new_message: &[u8]) -> SpdmResult {
        let session = self
            .get_session_via_id(session_id)
            .ok_or(SPDM_STATUS_INVALID_PARAMETER)?;
        session
            .session_transcript
            .message_k
            .append_message(new_message)
            .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
        Ok(())
    }
    pub fn reset_message_k(&mut self, session_id: u32) {
        if let Some(session) = self.get_session_via_id(session_id) {
            session.session_transcript.message_k.reset_message();
        }
    }

    pub fn append_message_f(&mut self, session_id: u32, new_message: &[u8]) -> SpdmResult {
        let session = self
            .get_session_via_id(session_id)
            .ok_or(SPDM_STATUS_INVALID_PARAMETER)?;
        session
            .session_transcript
            .message_f
            .append_message(new_message)
            .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
        Ok(())
    }
    pub fn reset_message_f(&mut self, session_id: u32) {
        if let Some(session) = self.get_session_via_id(session_id) {
            session.session_transcript.message_f.reset_message();
        }
    }

    /// Transcript housekeeping when a new request category starts:
    /// anything but GET_MEASUREMENTS cuts an L1L2 accumulation short,
    /// and the challenge transcripts are dropped when a session flow
    /// begins before the connection ever authenticated.
    pub fn reset_buffer_via_request_code(&mut self, opcode: SpdmRequestResponseCode) {
        if opcode != SpdmRequestResponseCode::SpdmRequestGetMeasurements {
            self.reset_message_l1l2()
        }
        match opcode {
            SpdmRequestResponseCode::SpdmRequestGetMeasurements
            | SpdmRequestResponseCode::SpdmRequestKeyExchange
            | SpdmRequestResponseCode::SpdmRequestFinish
            | SpdmRequestResponseCode::SpdmRequestPskExchange
            | SpdmRequestResponseCode::SpdmRequestPskFinish
            | SpdmRequestResponseCode::SpdmRequestKeyUpdate
            | SpdmRequestResponseCode::SpdmRequestHeartbeat
            | SpdmRequestResponseCode::SpdmRequestEndSession => {
                if self.connection_info.connection_state.get_u8()
                    < SpdmConnectionState::SpdmConnectionAuthenticated.get_u8()
                {
                    self.reset_message_b();
                    self.reset_message_c();
                    self.reset_message_mut_b();
                    self.reset_message_mut_c();
                }
            }
            SpdmRequestResponseCode::SpdmRequestGetDigests => {
                self.reset_message_b();
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // message plumbing
    // ------------------------------------------------------------------

    /// Frame and send one SPDM message. With a session id the message
    /// is first protected by the session's secured-message context.
    pub fn send_message(
        &mut self,
        session_id: Option<u32>,
        send_buffer: &[u8],
        is_requester: bool,
    ) -> SpdmResult {
        let mut transport_buffer = [0u8; config::SENDER_BUFFER_SIZE];
        let used = match session_id {
            None => {
                let transport = self
                    .transport_encap
                    .as_mut()
                    .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
                transport
                    .encode(None, send_buffer, &mut transport_buffer)
                    .map_err(|_| SPDM_STATUS_DEVICE_ERROR)?
            }
            Some(session_id) => {
                let mut secured_buffer = [0u8; config::SENDER_BUFFER_SIZE];
                let session = self
                    .get_session_via_id(session_id)
                    .ok_or(SPDM_STATUS_INVALID_PARAMETER)?;
                let secured_size = session.secured_message.encode_message(
                    session_id,
                    send_buffer,
                    &mut secured_buffer,
                    is_requester,
                )?;
                let transport = self
                    .transport_encap
                    .as_mut()
                    .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
                transport
                    .encode(
                        Some(session_id),
                        &secured_buffer[..secured_size],
                        &mut transport_buffer,
                    )
                    .map_err(|_| SPDM_STATUS_DEVICE_ERROR)?
            }
        };

        let device_io = self.device_io.as_mut().ok_or(SPDM_STATUS_DEVICE_ERROR)?;
        device_io
            .send(session_id, &transport_buffer[..used])
            .map_err(|_| SPDM_STATUS_DEVICE_ERROR)
    }

    /// Receive and unframe one SPDM message. With a session id the
    /// payload is unprotected by the session's secured-message context;
    /// a frame carrying the wrong session id is a device error.
    pub fn receive_message(
        &mut self,
        session_id: Option<u32>,
        receive_buffer: &mut [u8],
        is_requester: bool,
    ) -> SpdmResult<usize> {
        let mut transport_buffer = [0u8; config::RECEIVER_BUFFER_SIZE];
        let device_io = self.device_io.as_mut().ok_or(SPDM_STATUS_DEVICE_ERROR)?;
        let used = device_io
            .receive(session_id, &mut transport_buffer)
            .map_err(|_| SPDM_STATUS_DEVICE_ERROR)?;

        match session_id {
            None => {
                let transport = self
                    .transport_encap
                    .as_mut()
                    .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
                let (decoded_session_id, size) = transport
                    .decode(&transport_buffer[..used], receive_buffer)
                    .map_err(|_| SPDM_STATUS_DEVICE_ERROR)?;
                if decoded_session_id.is_some() {
                    return Err(SPDM_STATUS_DEVICE_ERROR);
                }
                Ok(size)
            }
            Some(session_id) => {
                let mut secured_buffer = [0u8; config::RECEIVER_BUFFER_SIZE];
                let transport = self
                    .transport_encap
                    .as_mut()
                    .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
                let (decoded_session_id, size) = transport
                    .decode(&transport_buffer[..used], &mut secured_buffer)
                    .map_err(|_| SPDM_STATUS_DEVICE_ERROR)?;
                if decoded_session_id != Some(session_id) {
                    error!("receive_message - session id mismatch\n");
                    return Err(SPDM_STATUS_DEVICE_ERROR);
                }
                let session = self
                    .get_session_via_id(session_id)
                    .ok_or(SPDM_STATUS_INVALID_PARAMETER)?;
                session
                    .secured_message
                    .decode_message(session_id, &secured_buffer[..size], receive_buffer, is_requester)
                    .map_err(|_| SPDM_STATUS_SECURITY_VIOLATION)
            }
        }
    }
}
