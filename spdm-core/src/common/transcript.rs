// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::managed_buffer::{LargeManagedBuffer, SmallManagedBuffer};

/// The named transcripts of one authentication dialog.
///
/// Signature = Sign(SK, Hash(M1)), Verify(PK, Hash(M2), Signature)
///
/// M1/M2 = Concatenate (A, B, C)
/// A = Concatenate (GET_VERSION, VERSION, GET_CAPABILITIES, CAPABILITIES,
///     NEGOTIATE_ALGORITHMS, ALGORITHMS)
/// B = Concatenate (GET_DIGESTS, DIGESTS, GET_CERTIFICATE, CERTIFICATE)
/// C = Concatenate (CHALLENGE, CHALLENGE_AUTH\Signature)
///
/// Mut M1/M2 = Concatenate (MutB, MutC), the encapsulated direction.
///
/// L1/L2 = Concatenate (GET_MEASUREMENTS, MEASUREMENTS\Signature), and
/// grows across successive GET_MEASUREMENTS exchanges.
///
/// M1M2 itself is scratch: assembled inside a signature or verification
/// call and reset once the call succeeds.
#[derive(Debug, Clone, Default)]
pub struct SpdmTranscript {
    pub message_a: SmallManagedBuffer,
    pub message_b: LargeManagedBuffer,
    pub message_c: SmallManagedBuffer,
    pub message_mut_b: LargeManagedBuffer,
    pub message_mut_c: SmallManagedBuffer,
    pub m1m2: LargeManagedBuffer,
    pub l1l2: LargeManagedBuffer,
}

impl SpdmTranscript {
    pub fn reset(&mut self) {
        self.message_a.reset_message();
        self.message_b.reset_message();
        self.message_c.reset_message();
        self.message_mut_b.reset_message();
        self.message_mut_c.reset_message();
        self.m1m2.reset_message();
        self.l1l2.reset_message();
    }
}

/// Per-session transcripts.
///
/// K = Concatenate (KEY_EXCHANGE request, KEY_EXCHANGE response) resp.
///     the PSK_EXCHANGE pair; F = the FINISH resp. PSK_FINISH pair.
///
/// The engine appends the pre-signature/MAC prefix of a message first
/// and the signature/MAC bytes once computed, so that each HMAC in the
/// handshake covers exactly the slice the peer covers
/// ("response\Signature+VerifyData" vs "response\VerifyData").
#[derive(Debug, Clone, Default)]
pub struct SpdmSessionTranscript {
    pub message_k: LargeManagedBuffer,
    pub message_f: LargeManagedBuffer,
}

impl SpdmSessionTranscript {
    pub fn reset(&mut self) {
        self.message_k.reset_message();
        self.message_f.reset_message();
    }
}
