// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

extern crate alloc;
use alloc::boxed::Box;

use super::transcript::SpdmSessionTranscript;
use super::INVALID_SESSION_ID;
use crate::error::{SpdmResult, SPDM_STATUS_INVALID_PARAMETER};
use crate::message::SpdmKeyExchangeMutAuthAttributes;
use crate::secured_message::SpdmSecuredMessage;

use codec::enum_builder;
use codec::{Codec, Reader, Writer};

enum_builder! {
    @U8
    EnumName: SpdmSessionState;
    EnumVal{
        // Before KEY_EXCHANGE/PSK_EXCHANGE, or after END_SESSION
        SpdmSessionNotStarted => 0x0,
        // After KEY_EXCHANGE, before FINISH
        SpdmSessionHandshaking => 0x1,
        // After FINISH, before END_SESSION
        SpdmSessionEstablished => 0x2
    }
}
impl Default for SpdmSessionState {
    fn default() -> SpdmSessionState {
        SpdmSessionState::SpdmSessionNotStarted
    }
}

/// One row of the session table. A row with `INVALID_SESSION_ID` is
/// free. The secured-message context is owned by the row and handed
/// back to its created state when the row is freed.
pub struct SpdmSessionInfo {
    session_id: u32,
    use_psk: bool,
    mut_auth_requested: SpdmKeyExchangeMutAuthAttributes,
    session_state: SpdmSessionState,
    pub session_transcript: SpdmSessionTranscript,
    pub secured_message: Box<dyn SpdmSecuredMessage + Send>,
}

impl SpdmSessionInfo {
    pub fn new(secured_message: Box<dyn SpdmSecuredMessage + Send>) -> Self {
        SpdmSessionInfo {
            session_id: INVALID_SESSION_ID,
            use_psk: false,
            mut_auth_requested: SpdmKeyExchangeMutAuthAttributes::default(),
            session_state: SpdmSessionState::default(),
            session_transcript: SpdmSessionTranscript::default(),
            secured_message,
        }
    }

    pub fn set_default(&mut self) {
        self.session_id = INVALID_SESSION_ID;
        self.use_psk = false;
        self.mut_auth_requested = SpdmKeyExchangeMutAuthAttributes::empty();
        self.session_state = SpdmSessionState::default();
        self.session_transcript.reset();
        self.secured_message.init_context();
    }

    /// Claim a free row for `session_id`.
    pub fn setup(&mut self, session_id: u32) -> SpdmResult {
        if self.session_id != INVALID_SESSION_ID {
            error!("setup on an occupied session row!\n");
            return Err(SPDM_STATUS_INVALID_PARAMETER);
        }
        self.set_default();
        self.session_id = session_id;
        Ok(())
    }

    pub fn teardown(&mut self) {
        self.set_default()
    }

    pub fn get_session_id(&self) -> u32 {
        self.session_id
    }

    pub fn set_use_psk(&mut self, use_psk: bool) {
        self.use_psk = use_psk;
    }

    pub fn get_use_psk(&self) -> bool {
        self.use_psk
    }

    pub fn set_mut_auth_requested(&mut self, mut_auth_requested: SpdmKeyExchangeMutAuthAttributes) {
        self.mut_auth_requested = mut_auth_requested;
    }

    pub fn get_mut_auth_requested(&self) -> SpdmKeyExchangeMutAuthAttributes {
        self.mut_auth_requested
    }

    pub fn set_session_state(&mut self, session_state: SpdmSessionState) {
        self.session_state = session_state;
    }

    pub fn get_session_state(&self) -> SpdmSessionState {
        self.session_state
    }
}
