// Copyright (c) 2021 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

mod common;

use common::*;
use spdm_core::common::SpdmConnectionState;
use spdm_core::error::SPDM_STATUS_SECURITY_VIOLATION;
use spdm_core::protocol::*;

const GET_DIGESTS: &[u8] = b"\x11\x81\x00\x00";
const GET_CERTIFICATE: &[u8] = b"\x11\x82\x00\x00\x00\x00\x00\x02";
const CHALLENGE_REQUEST: &[u8] = b"\x11\x83\x00\x00this-is-the-challenge-nonce!!";
const CHALLENGE_AUTH_BODY: &[u8] = b"\x11\x03\x00\x01challenge-auth-minus-signature";

fn basic_caps() -> SpdmCapabilityFlags {
    SpdmCapabilityFlags::CERT_CAP | SpdmCapabilityFlags::CHAL_CAP
}

/// Drive GET_DIGESTS through CERTIFICATE on both peers so that the B
/// transcripts match, the way the message flows would.
fn feed_identity_transcripts(
    requester: &mut spdm_core::common::SpdmContext,
    responder: &mut spdm_core::common::SpdmContext,
) {
    let digests_response = {
        let digest = responder.generate_cert_chain_hash(0).unwrap();
        let mut response = b"\x11\x01\x00\x01".to_vec();
        response.extend_from_slice(digest.as_ref());
        response
    };
    let certificate_response = {
        let mut response = b"\x11\x02\x00\x00".to_vec();
        response.extend_from_slice(responder_cert_chain().as_ref());
        response
    };

    for context in [&mut *requester, &mut *responder] {
        context.append_message_b(GET_DIGESTS).unwrap();
        context.append_message_b(&digests_response).unwrap();
        context.append_message_b(GET_CERTIFICATE).unwrap();
        context.append_message_b(&certificate_response).unwrap();
    }
}

#[test]
fn test_plain_challenge_success() {
    let (mut requester, mut responder) = authenticated_pair(basic_caps());
    feed_identity_transcripts(&mut requester, &mut responder);

    requester.append_message_c(CHALLENGE_REQUEST).unwrap();
    responder.append_message_c(CHALLENGE_REQUEST).unwrap();

    let signature = responder
        .generate_challenge_auth_signature(false, CHALLENGE_AUTH_BODY)
        .unwrap();
    requester.append_message_c(CHALLENGE_AUTH_BODY).unwrap();

    // transcript symmetry at the signing step
    assert_eq!(
        requester.transcript.message_a.as_ref(),
        responder.transcript.message_a.as_ref()
    );
    assert_eq!(
        requester.transcript.message_b.as_ref(),
        responder.transcript.message_b.as_ref()
    );
    assert_eq!(
        requester.transcript.message_c.as_ref(),
        responder.transcript.message_c.as_ref()
    );

    requester
        .verify_challenge_auth_signature(true, &signature)
        .unwrap();

    // M1M2 is scratch and ends the exchange empty on both sides
    assert_eq!(requester.transcript.m1m2.size(), 0);
    assert_eq!(responder.transcript.m1m2.size(), 0);

    for context in [&mut requester, &mut responder] {
        context
            .set_connection_state(SpdmConnectionState::SpdmConnectionAuthenticated)
            .unwrap();
        assert_eq!(
            context.get_connection_state(),
            SpdmConnectionState::SpdmConnectionAuthenticated
        );
    }
}

#[test]
fn test_challenge_signature_bit_flip_rejected() {
    let (mut requester, mut responder) = authenticated_pair(basic_caps());
    feed_identity_transcripts(&mut requester, &mut responder);

    requester.append_message_c(CHALLENGE_REQUEST).unwrap();
    responder.append_message_c(CHALLENGE_REQUEST).unwrap();

    let signature = responder
        .generate_challenge_auth_signature(false, CHALLENGE_AUTH_BODY)
        .unwrap();
    requester.append_message_c(CHALLENGE_AUTH_BODY).unwrap();

    for bit in [0usize, 7, 200] {
        let mut tampered = signature.clone();
        tampered.data[bit / 8] ^= 1 << (bit % 8);
        assert_eq!(
            requester.verify_challenge_auth_signature(true, &tampered),
            Err(SPDM_STATUS_SECURITY_VIOLATION)
        );
    }

    // untouched signature still verifies afterwards
    requester
        .verify_challenge_auth_signature(true, &signature)
        .unwrap();
}

#[test]
fn test_challenge_leaf_certificate_bit_flip_rejected() {
    let (mut requester, mut responder) = authenticated_pair(basic_caps());
    feed_identity_transcripts(&mut requester, &mut responder);

    requester.append_message_c(CHALLENGE_REQUEST).unwrap();
    responder.append_message_c(CHALLENGE_REQUEST).unwrap();

    let signature = responder
        .generate_challenge_auth_signature(false, CHALLENGE_AUTH_BODY)
        .unwrap();
    requester.append_message_c(CHALLENGE_AUTH_BODY).unwrap();

    let mut tampered_chain = responder_cert_chain();
    let hash_size = requester.get_hash_size() as usize;
    // flip one bit inside the certificate portion of the chain
    tampered_chain.data[SPDM_CERT_CHAIN_HEADER_SIZE + hash_size] ^= 0x01;
    requester.connection_info.peer_used_cert_chain_buffer = Some(tampered_chain);

    assert_eq!(
        requester.verify_challenge_auth_signature(true, &signature),
        Err(SPDM_STATUS_SECURITY_VIOLATION)
    );
}

#[test]
fn test_provisioned_digest_mismatch_rejected() {
    let (mut requester, _) = authenticated_pair(basic_caps());

    // the host pinned a peer chain; the DIGESTS answer hashes another
    requester.local_context.peer_cert_chain_provision = Some(requester_cert_chain());

    let wrong_digest = {
        use ring::digest;
        digest::digest(&digest::SHA256, responder_cert_chain().as_ref())
    };
    assert_eq!(
        requester.verify_peer_digest(wrong_digest.as_ref()),
        Err(SPDM_STATUS_SECURITY_VIOLATION)
    );
    // the failing response never entered the challenge transcript
    assert_eq!(requester.transcript.message_c.size(), 0);

    let right_digest = {
        use ring::digest;
        digest::digest(&digest::SHA256, requester_cert_chain().as_ref())
    };
    requester.verify_peer_digest(right_digest.as_ref()).unwrap();
}

#[test]
fn test_provisioned_root_hash_gates_certificate() {
    let (mut requester, _) = authenticated_pair(basic_caps());

    // pin a root hash that does not match the responder chain
    requester.local_context.peer_root_cert_hash_provision =
        Some(SpdmDigestStruct::from(&[0x42u8; 32][..]));
    requester.connection_info.peer_used_cert_chain_buffer = None;

    assert_eq!(
        requester.verify_peer_cert_chain(responder_cert_chain().as_ref()),
        Err(SPDM_STATUS_SECURITY_VIOLATION)
    );
    assert!(requester
        .connection_info
        .peer_used_cert_chain_buffer
        .is_none());

    // with the right root hash the chain installs
    let root_hash = {
        use ring::digest;
        digest::digest(&digest::SHA256, RESPONDER_SIGNING_KEY)
    };
    requester.local_context.peer_root_cert_hash_provision =
        Some(SpdmDigestStruct::from(root_hash.as_ref()));
    requester
        .verify_peer_cert_chain(responder_cert_chain().as_ref())
        .unwrap();
    assert!(requester
        .connection_info
        .peer_used_cert_chain_buffer
        .is_some());
}

#[test]
fn test_challenge_auth_cert_chain_hash_check() {
    let (requester, responder) = authenticated_pair(basic_caps());

    let digest = responder.generate_cert_chain_hash(0).unwrap();
    requester.verify_peer_cert_chain_hash(digest.as_ref()).unwrap();

    let mut wrong = digest.clone();
    wrong.data[0] ^= 0xFF;
    assert_eq!(
        requester.verify_peer_cert_chain_hash(wrong.as_ref()),
        Err(SPDM_STATUS_SECURITY_VIOLATION)
    );
}
