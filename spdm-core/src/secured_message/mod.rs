// Copyright (c) 2021 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Seam to the secured-message layer. The engine feeds it the negotiated
//! algorithms and the TH1/TH2 transcript hashes; the layer owns the key
//! schedule, the finished keys and the traffic keys. Each session row
//! holds one boxed context created by the factory registered on the
//! device context.

extern crate alloc;
use alloc::boxed::Box;

use crate::error::SpdmResult;
use crate::protocol::{
    SpdmAeadAlgo, SpdmBaseHashAlgo, SpdmDheAlgo, SpdmDigestStruct, SpdmKeyScheduleAlgo,
    SpdmPskHintStruct,
};
use codec::enum_builder;
use codec::{Codec, Reader, Writer};

enum_builder! {
    @U8
    EnumName: SpdmSessionType;
    EnumVal{
        SpdmSessionTypeNone => 0x0,
        SpdmSessionTypeMacOnly => 0x1,
        SpdmSessionTypeEncMac => 0x2
    }
}
impl Default for SpdmSessionType {
    fn default() -> SpdmSessionType {
        SpdmSessionType::SpdmSessionTypeNone
    }
}

pub trait SpdmSecuredMessage {
    /// Reset the context to its freshly-created state. Called when a
    /// session row is initialized or freed.
    fn init_context(&mut self);

    fn set_use_psk(&mut self, use_psk: bool);

    fn set_session_type(&mut self, session_type: SpdmSessionType);

    fn set_algorithms(
        &mut self,
        base_hash_algo: SpdmBaseHashAlgo,
        dhe_named_group: SpdmDheAlgo,
        aead_cipher_suite: SpdmAeadAlgo,
        key_schedule: SpdmKeyScheduleAlgo,
    );

    fn set_psk_hint(&mut self, psk_hint: &SpdmPskHintStruct);

    /// HMAC over `message` with the request-direction finished key.
    /// Valid only after `generate_handshake_key`.
    fn hmac_with_request_finished_key(&self, message: &[u8]) -> SpdmResult<SpdmDigestStruct>;

    /// HMAC over `message` with the response-direction finished key.
    /// Valid only after `generate_handshake_key`.
    fn hmac_with_response_finished_key(&self, message: &[u8]) -> SpdmResult<SpdmDigestStruct>;

    /// Derive the handshake secrets (and thereby the finished keys)
    /// from TH1.
    fn generate_handshake_key(&mut self, th1: &SpdmDigestStruct) -> SpdmResult;

    /// Derive the application traffic secrets from TH2.
    fn generate_data_key(&mut self, th2: &SpdmDigestStruct) -> SpdmResult;

    /// AEAD-protect one application message for the wire.
    fn encode_message(
        &mut self,
        session_id: u32,
        app_buffer: &[u8],
        secured_buffer: &mut [u8],
        is_requester: bool,
    ) -> SpdmResult<usize>;

    /// Unprotect one secured message from the wire.
    fn decode_message(
        &mut self,
        session_id: u32,
        secured_buffer: &[u8],
        app_buffer: &mut [u8],
        is_requester: bool,
    ) -> SpdmResult<usize>;
}

/// Creates the secured-message context embedded in one session row.
pub type SpdmSecuredMessageFactory = fn() -> Box<dyn SpdmSecuredMessage + Send>;
