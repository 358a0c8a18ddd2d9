// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! The cryptographic bindings over the transcripts: M1/M2 challenge
//! signatures, L1/L2 measurement signatures, the TH_curr concatenations
//! behind the session-establishing signatures and HMACs, and the
//! TH1/TH2 hashes handed to the secured-message key schedule.
//!
//! Every operation reads a concatenation of named transcript buffers
//! that both peers can assemble from their locally observed traffic. A
//! signature made with the key of chain X is only ever checked against
//! the leaf certificate of the same chain X: the signer side reads the
//! local-used chain, the verifier side the peer chain buffer (or the
//! provisioned peer chain before GET_CERTIFICATE ran).

use super::managed_buffer::LargeManagedBuffer;
use super::session::SpdmSessionInfo;
use super::transcript::SpdmTranscript;
use super::SpdmContext;
use crate::error::{
    SpdmResult, SPDM_STATUS_BUFFER_TOO_SMALL, SPDM_STATUS_DEVICE_ERROR,
    SPDM_STATUS_INVALID_PARAMETER, SPDM_STATUS_SECURITY_VIOLATION,
};
use crate::protocol::*;

use codec::{Codec, Reader};

impl SpdmContext {
    /// Hash of the formatted local chain in `slot_id`, as sent in a
    /// DIGESTS response or a CHALLENGE_AUTH body.
    pub fn generate_cert_chain_hash(&self, slot_id: usize) -> SpdmResult<SpdmDigestStruct> {
        if slot_id >= SPDM_MAX_SLOT_NUMBER {
            return Err(SPDM_STATUS_INVALID_PARAMETER);
        }
        let chain = self.local_context.my_cert_chain[slot_id]
            .as_ref()
            .ok_or(SPDM_STATUS_INVALID_PARAMETER)?;
        self.crypto
            .hash_all(self.connection_info.algorithm.base_hash_algo, chain.as_ref())
            .ok_or(SPDM_STATUS_DEVICE_ERROR)
    }

    /// Check a DIGESTS entry against the provisioned peer chain, when
    /// one is provisioned. Without a provisioned chain there is nothing
    /// to check yet; GET_CERTIFICATE will.
    pub fn verify_peer_digest(&self, digest: &[u8]) -> SpdmResult {
        if let Some(provision) = &self.local_context.peer_cert_chain_provision {
            let hash = self
                .crypto
                .hash_all(self.connection_info.algorithm.base_hash_algo, provision.as_ref())
                .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
            if hash.as_ref() != digest {
                error!("!!! verify_peer_digest - FAIL !!!\n");
                return Err(SPDM_STATUS_SECURITY_VIOLATION);
            }
        }
        info!("!!! verify_peer_digest - PASS !!!\n");
        Ok(())
    }

    /// Verify a received certificate chain against the provisioned
    /// trust anchor (root hash or full chain) and install it as the
    /// peer chain of this connection.
    pub fn verify_peer_cert_chain(&mut self, cert_chain: &[u8]) -> SpdmResult {
        self.crypto.verify_cert_chain(cert_chain)?;

        let hash_size = self.get_hash_size() as usize;
        if let Some(root_hash) = &self.local_context.peer_root_cert_hash_provision {
            if root_hash.data_size as usize != hash_size {
                error!("!!! verify_peer_cert_chain - FAIL (hash size mismatch) !!!\n");
                return Err(SPDM_STATUS_SECURITY_VIOLATION);
            }
            if cert_chain.len() < SPDM_CERT_CHAIN_HEADER_SIZE + hash_size {
                return Err(SPDM_STATUS_SECURITY_VIOLATION);
            }
            if &cert_chain[SPDM_CERT_CHAIN_HEADER_SIZE..SPDM_CERT_CHAIN_HEADER_SIZE + hash_size]
                != root_hash.as_ref()
            {
                error!("!!! verify_peer_cert_chain - FAIL (root hash mismatch) !!!\n");
                return Err(SPDM_STATUS_SECURITY_VIOLATION);
            }
        } else if let Some(provision) = &self.local_context.peer_cert_chain_provision {
            if provision.as_ref() != cert_chain {
                error!("!!! verify_peer_cert_chain - FAIL !!!\n");
                return Err(SPDM_STATUS_SECURITY_VIOLATION);
            }
        }

        let mut buffer = SpdmCertChainBuffer::default();
        if cert_chain.len() > buffer.data.len() {
            return Err(SPDM_STATUS_BUFFER_TOO_SMALL);
        }
        buffer.data[..cert_chain.len()].copy_from_slice(cert_chain);
        buffer.data_size = cert_chain.len() as u16;
        self.connection_info.peer_used_cert_chain_buffer = Some(buffer);

        info!("!!! verify_peer_cert_chain - PASS !!!\n");
        Ok(())
    }

    /// Check a CHALLENGE_AUTH cert-chain hash against the chain this
    /// connection actually trusts.
    pub fn verify_peer_cert_chain_hash(&self, cert_chain_hash: &[u8]) -> SpdmResult {
        let chain: &[u8] = if let Some(chain) = &self.connection_info.peer_used_cert_chain_buffer {
            chain.as_ref()
        } else if let Some(chain) = &self.local_context.peer_cert_chain_provision {
            chain.as_ref()
        } else {
            error!("peer cert chain is not populated!\n");
            return Err(SPDM_STATUS_INVALID_PARAMETER);
        };

        let hash = self
            .crypto
            .hash_all(self.connection_info.algorithm.base_hash_algo, chain)
            .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
        if hash.as_ref() != cert_chain_hash {
            error!("!!! verify_peer_cert_chain_hash - FAIL !!!\n");
            return Err(SPDM_STATUS_SECURITY_VIOLATION);
        }
        info!("!!! verify_peer_cert_chain_hash - PASS !!!\n");
        Ok(())
    }

    // ------------------------------------------------------------------
    // chain slice selection
    // ------------------------------------------------------------------

    /// The certificate portion of the peer chain this connection
    /// trusts: the chain received via GET_CERTIFICATE when present,
    /// otherwise the provisioned one.
    fn peer_used_cert_chain_slice(&self) -> SpdmResult<&[u8]> {
        let hash_size = self.get_hash_size() as usize;
        if let Some(chain) = &self.connection_info.peer_used_cert_chain_buffer {
            chain.certs(hash_size).ok_or(SPDM_STATUS_INVALID_PARAMETER)
        } else if let Some(chain) = &self.local_context.peer_cert_chain_provision {
            chain.certs(hash_size).ok_or(SPDM_STATUS_INVALID_PARAMETER)
        } else {
            error!("peer cert chain is not populated!\n");
            Err(SPDM_STATUS_INVALID_PARAMETER)
        }
    }

    /// The certificate portion of the local chain selected for this
    /// connection.
    fn local_used_cert_chain_slice(&self) -> SpdmResult<&[u8]> {
        let hash_size = self.get_hash_size() as usize;
        let chain = self.local_used_cert_chain().ok_or_else(|| {
            error!("local used cert chain is not selected!\n");
            SPDM_STATUS_INVALID_PARAMETER
        })?;
        chain.certs(hash_size).ok_or(SPDM_STATUS_INVALID_PARAMETER)
    }

    fn leaf_cert<'a>(&self, cert_chain: &'a [u8]) -> SpdmResult<&'a [u8]> {
        let (leaf_begin, leaf_end) = self
            .crypto
            .get_cert_from_cert_chain(cert_chain, -1)
            .map_err(|_| SPDM_STATUS_SECURITY_VIOLATION)?;
        cert_chain
            .get(leaf_begin..leaf_end)
            .ok_or(SPDM_STATUS_SECURITY_VIOLATION)
    }

    // ------------------------------------------------------------------
    // CHALLENGE (M1/M2)
    // ------------------------------------------------------------------

    /// Sign the authentication transcript. The responder appends the
    /// CHALLENGE_AUTH body (signature excluded) to C and signs
    /// Hash(A || B || C); a requester answering encapsulated mutual
    /// auth appends to MutC and signs Hash(MutB || MutC).
    pub fn generate_challenge_auth_signature(
        &mut self,
        is_requester: bool,
        response_prefix: &[u8],
    ) -> SpdmResult<SpdmSignatureStruct> {
        let base_hash_algo = self.connection_info.algorithm.base_hash_algo;

        if is_requester {
            self.append_message_mut_c(response_prefix)?;
        } else {
            self.append_message_c(response_prefix)?;
        }

        self.reset_message_m1m2();
        {
            let SpdmTranscript {
                message_a,
                message_b,
                message_c,
                message_mut_b,
                message_mut_c,
                m1m2,
                ..
            } = &mut self.transcript;
            if is_requester {
                m1m2.append_message(message_mut_b.as_ref())
                    .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
                m1m2.append_message(message_mut_c.as_ref())
                    .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
            } else {
                m1m2.append_message(message_a.as_ref())
                    .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
                m1m2.append_message(message_b.as_ref())
                    .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
                m1m2.append_message(message_c.as_ref())
                    .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
            }
        }

        let message_hash = self
            .crypto
            .hash_all(base_hash_algo, self.transcript.m1m2.as_ref())
            .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
        debug!("m1m2 hash - {:02x?}\n", message_hash.as_ref());

        let signature = if is_requester {
            self.secret.requester_data_sign(
                self.connection_info.algorithm.req_base_asym_alg,
                message_hash.as_ref(),
            )
        } else {
            self.secret.responder_data_sign(
                self.connection_info.algorithm.base_asym_algo,
                message_hash.as_ref(),
            )
        }
        .ok_or(SPDM_STATUS_DEVICE_ERROR)?;

        self.reset_message_m1m2();
        Ok(signature)
    }

    /// Verify the peer's CHALLENGE_AUTH signature over the transcript
    /// the verifier observed. `is_requester` names the verifier: a
    /// requester checks the responder signature over A || B || C with
    /// the base asym algorithm; a responder checks the mutual-auth
    /// signature over MutB || MutC with the requester asym algorithm.
    pub fn verify_challenge_auth_signature(
        &mut self,
        is_requester: bool,
        signature: &SpdmSignatureStruct,
    ) -> SpdmResult {
        let base_hash_algo = self.connection_info.algorithm.base_hash_algo;
        let asym_algo = if is_requester {
            self.connection_info.algorithm.base_asym_algo
        } else {
            self.connection_info
                .algorithm
                .req_base_asym_alg
                .as_base_asym_algo()
        };
        if signature.data_size != asym_algo.get_size() {
            return Err(SPDM_STATUS_SECURITY_VIOLATION);
        }

        self.reset_message_m1m2();
        {
            let SpdmTranscript {
                message_a,
                message_b,
                message_c,
                message_mut_b,
                message_mut_c,
                m1m2,
                ..
            } = &mut self.transcript;
            if is_requester {
                m1m2.append_message(message_a.as_ref())
                    .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
                m1m2.append_message(message_b.as_ref())
                    .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
                m1m2.append_message(message_c.as_ref())
                    .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
            } else {
                m1m2.append_message(message_mut_b.as_ref())
                    .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
                m1m2.append_message(message_mut_c.as_ref())
                    .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
            }
        }

        let message_hash = self
            .crypto
            .hash_all(base_hash_algo, self.transcript.m1m2.as_ref())
            .ok_or(SPDM_STATUS_SECURITY_VIOLATION)?;
        debug!("m1m2 hash - {:02x?}\n", message_hash.as_ref());

        let cert_chain = self.peer_used_cert_chain_slice()?;
        let leaf = self.leaf_cert(cert_chain)?;
        if self
            .crypto
            .asym_verify(base_hash_algo, asym_algo, leaf, message_hash.as_ref(), signature)
            .is_err()
        {
            error!("!!! verify_challenge_auth_signature - FAIL !!!\n");
            return Err(SPDM_STATUS_SECURITY_VIOLATION);
        }
        info!("!!! verify_challenge_auth_signature - PASS !!!\n");

        self.reset_message_m1m2();
        Ok(())
    }

    // ------------------------------------------------------------------
    // measurement summary / L1L2
    // ------------------------------------------------------------------

    /// Summary hash over the collected measurement blocks: zero-filled
    /// for the None type, the IMMUTABLE_ROM subset for Tcb, every block
    /// for All. A block whose common-header size disagrees with its
    /// DMTF header is a fatal protocol error.
    pub fn generate_measurement_summary_hash(
        &self,
        measurement_summary_hash_type: SpdmMeasurementSummaryHashType,
    ) -> SpdmResult<SpdmDigestStruct> {
        let base_hash_algo = self.connection_info.algorithm.base_hash_algo;
        match measurement_summary_hash_type {
            SpdmMeasurementSummaryHashType::SpdmMeasurementSummaryHashTypeNone => {
                let mut digest = SpdmDigestStruct::default();
                digest.data_size = base_hash_algo.get_size();
                Ok(digest)
            }
            SpdmMeasurementSummaryHashType::SpdmMeasurementSummaryHashTypeTcb
            | SpdmMeasurementSummaryHashType::SpdmMeasurementSummaryHashTypeAll => {
                let record = self
                    .secret
                    .measurement_collection(
                        self.connection_info.algorithm.measurement_spec,
                        self.connection_info.algorithm.measurement_hash_algo,
                    )
                    .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
                let all = measurement_summary_hash_type
                    == SpdmMeasurementSummaryHashType::SpdmMeasurementSummaryHashTypeAll;

                let mut measurement_data = [0u8; crate::config::MAX_SPDM_MEASUREMENT_RECORD_SIZE];
                let mut measurement_data_size = 0usize;

                let mut reader = Reader::init(record.as_ref());
                for _ in 0..record.number_of_blocks {
                    let common_header = SpdmMeasurementBlockCommonHeader::read(&mut reader)
                        .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
                    let measurement_size = common_header.measurement_size as usize;
                    let measurement = reader
                        .take(measurement_size)
                        .ok_or(SPDM_STATUS_DEVICE_ERROR)?;

                    let dmtf_header = SpdmMeasurementBlockDmtfHeader::read_bytes(measurement)
                        .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
                    if measurement_size
                        != SPDM_MEASUREMENT_BLOCK_DMTF_HEADER_SIZE
                            + dmtf_header.dmtf_spec_measurement_value_size as usize
                    {
                        error!("inconsistent measurement block size!\n");
                        return Err(SPDM_STATUS_DEVICE_ERROR);
                    }

                    let value_type = dmtf_header.dmtf_spec_measurement_value_type
                        & SPDM_MEASUREMENT_BLOCK_MEASUREMENT_TYPE_MASK;
                    if all || value_type == SPDM_MEASUREMENT_BLOCK_MEASUREMENT_TYPE_IMMUTABLE_ROM {
                        measurement_data
                            [measurement_data_size..measurement_data_size + measurement_size]
                            .copy_from_slice(measurement);
                        measurement_data_size += measurement_size;
                    }
                }

                self.crypto
                    .hash_all(base_hash_algo, &measurement_data[..measurement_data_size])
                    .ok_or(SPDM_STATUS_DEVICE_ERROR)
            }
            SpdmMeasurementSummaryHashType::Unknown(_) => Err(SPDM_STATUS_INVALID_PARAMETER),
        }
    }

    /// Complete a MEASUREMENTS response in place: fill in nonce and
    /// opaque data, extend L1L2 with everything up to the signature
    /// field, and sign Hash(L1L2) into the tail. L1L2 is reset once the
    /// signature lands.
    pub fn generate_measurement_signature(&mut self, response: &mut [u8]) -> SpdmResult {
        let signature_size = self.get_asym_key_size() as usize;
        let opaque = self.local_context.opaque_measurement_rsp.clone();
        let measurement_sig_size =
            SPDM_NONCE_SIZE + 2 + opaque.data_size as usize + signature_size;
        if response.len() <= measurement_sig_size {
            return Err(SPDM_STATUS_INVALID_PARAMETER);
        }

        let mut cursor = response.len() - measurement_sig_size;
        let mut nonce = [0u8; SPDM_NONCE_SIZE];
        self.crypto
            .get_random(&mut nonce)
            .map_err(|_| SPDM_STATUS_DEVICE_ERROR)?;
        response[cursor..cursor + SPDM_NONCE_SIZE].copy_from_slice(&nonce);
        cursor += SPDM_NONCE_SIZE;

        response[cursor..cursor + 2].copy_from_slice(&opaque.data_size.to_le_bytes());
        cursor += 2;
        response[cursor..cursor + opaque.data_size as usize].copy_from_slice(opaque.as_ref());

        let prefix_size = response.len() - signature_size;
        self.append_message_l1l2(&response[..prefix_size])?;
        debug!("l1l2 - {:02x?}\n", self.transcript.l1l2.as_ref());

        let message_hash = self
            .crypto
            .hash_all(
                self.connection_info.algorithm.base_hash_algo,
                self.transcript.l1l2.as_ref(),
            )
            .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
        debug!("l1l2 hash - {:02x?}\n", message_hash.as_ref());

        let signature = self
            .secret
            .responder_data_sign(
                self.connection_info.algorithm.base_asym_algo,
                message_hash.as_ref(),
            )
            .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
        if signature.data_size as usize != signature_size {
            return Err(SPDM_STATUS_DEVICE_ERROR);
        }
        response[prefix_size..].copy_from_slice(signature.as_ref());

        self.reset_message_l1l2();
        Ok(())
    }

    /// Verify a MEASUREMENTS signature over the L1L2 the caller
    /// accumulated across the GET_MEASUREMENTS exchanges.
    pub fn verify_measurement_signature(&mut self, signature: &SpdmSignatureStruct) -> SpdmResult {
        let base_hash_algo = self.connection_info.algorithm.base_hash_algo;
        let base_asym_algo = self.connection_info.algorithm.base_asym_algo;
        if signature.data_size != base_asym_algo.get_size() {
            return Err(SPDM_STATUS_SECURITY_VIOLATION);
        }

        debug!("l1l2 - {:02x?}\n", self.transcript.l1l2.as_ref());
        let message_hash = self
            .crypto
            .hash_all(base_hash_algo, self.transcript.l1l2.as_ref())
            .ok_or(SPDM_STATUS_SECURITY_VIOLATION)?;
        debug!("l1l2 hash - {:02x?}\n", message_hash.as_ref());

        let cert_chain = self.peer_used_cert_chain_slice()?;
        let leaf = self.leaf_cert(cert_chain)?;
        if self
            .crypto
            .asym_verify(
                base_hash_algo,
                base_asym_algo,
                leaf,
                message_hash.as_ref(),
                signature,
            )
            .is_err()
        {
            error!("!!! verify_measurement_signature - FAIL !!!\n");
            return Err(SPDM_STATUS_SECURITY_VIOLATION);
        }
        info!("!!! verify_measurement_signature - PASS !!!\n");

        self.reset_message_l1l2();
        Ok(())
    }

    // ------------------------------------------------------------------
    // TH_curr assembly
    // ------------------------------------------------------------------

    /// TH_curr for KEY_EXCHANGE signature/HMAC and TH1:
    /// A || Hash(Ct) || K, the chain hash omitted on PSK sessions.
    fn calc_th_curr_ak(
        &self,
        session: &SpdmSessionInfo,
        cert_chain: Option<&[u8]>,
    ) -> SpdmResult<LargeManagedBuffer> {
        let base_hash_algo = self.connection_info.algorithm.base_hash_algo;
        let mut th_curr = LargeManagedBuffer::default();

        debug!("message_a - {:02x?}\n", self.transcript.message_a.as_ref());
        th_curr
            .append_message(self.transcript.message_a.as_ref())
            .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;

        if let Some(cert_chain) = cert_chain {
            let cert_chain_hash = self
                .crypto
                .hash_all(base_hash_algo, cert_chain)
                .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
            th_curr
                .append_message(cert_chain_hash.as_ref())
                .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
        }

        debug!(
            "message_k - {:02x?}\n",
            session.session_transcript.message_k.as_ref()
        );
        th_curr
            .append_message(session.session_transcript.message_k.as_ref())
            .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;

        Ok(th_curr)
    }

    /// TH_curr for FINISH signature/HMACs and TH2:
    /// A || Hash(Ct) || K || Hash(CM) || F. The mutual chain hash is
    /// present only under mutual auth, neither hash on PSK sessions.
    fn calc_th_curr_akf(
        &self,
        session: &SpdmSessionInfo,
        cert_chain: Option<&[u8]>,
        mut_cert_chain: Option<&[u8]>,
    ) -> SpdmResult<LargeManagedBuffer> {
        let base_hash_algo = self.connection_info.algorithm.base_hash_algo;
        let mut th_curr = self.calc_th_curr_ak(session, cert_chain)?;

        if let Some(mut_cert_chain) = mut_cert_chain {
            let mut_cert_chain_hash = self
                .crypto
                .hash_all(base_hash_algo, mut_cert_chain)
                .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
            th_curr
                .append_message(mut_cert_chain_hash.as_ref())
                .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;
        }

        debug!(
            "message_f - {:02x?}\n",
            session.session_transcript.message_f.as_ref()
        );
        th_curr
            .append_message(session.session_transcript.message_f.as_ref())
            .ok_or(SPDM_STATUS_BUFFER_TOO_SMALL)?;

        Ok(th_curr)
    }

    fn session_ref(&self, session_id: u32) -> SpdmResult<&SpdmSessionInfo> {
        self.get_immutable_session_via_id(session_id)
            .ok_or(SPDM_STATUS_INVALID_PARAMETER)
    }

    // ------------------------------------------------------------------
    // KEY_EXCHANGE
    // ------------------------------------------------------------------

    /// Responder signature over TH_curr(A, Ct, K); Ct is the local
    /// chain selected for this connection.
    pub fn generate_key_exchange_rsp_signature(
        &self,
        session_id: u32,
    ) -> SpdmResult<SpdmSignatureStruct> {
        let session = self.session_ref(session_id)?;
        let cert_chain = self.local_used_cert_chain_slice()?;
        let th_curr = self.calc_th_curr_ak(session, Some(cert_chain))?;

        let message_hash = self
            .crypto
            .hash_all(self.connection_info.algorithm.base_hash_algo, th_curr.as_ref())
            .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
        debug!("th_curr hash - {:02x?}\n", message_hash.as_ref());

        self.secret
            .responder_data_sign(
                self.connection_info.algorithm.base_asym_algo,
                message_hash.as_ref(),
            )
            .ok_or(SPDM_STATUS_DEVICE_ERROR)
    }

    /// Requester check of the KEY_EXCHANGE_RSP signature; Ct is the
    /// peer chain.
    pub fn verify_key_exchange_rsp_signature(
        &self,
        session_id: u32,
        signature: &SpdmSignatureStruct,
    ) -> SpdmResult {
        let base_hash_algo = self.connection_info.algorithm.base_hash_algo;
        let base_asym_algo = self.connection_info.algorithm.base_asym_algo;
        if signature.data_size != base_asym_algo.get_size() {
            return Err(SPDM_STATUS_SECURITY_VIOLATION);
        }

        let session = self.session_ref(session_id)?;
        let cert_chain = self.peer_used_cert_chain_slice()?;
        let th_curr = self.calc_th_curr_ak(session, Some(cert_chain))?;

        let message_hash = self
            .crypto
            .hash_all(base_hash_algo, th_curr.as_ref())
            .ok_or(SPDM_STATUS_SECURITY_VIOLATION)?;
        debug!("th_curr hash - {:02x?}\n", message_hash.as_ref());

        let leaf = self.leaf_cert(cert_chain)?;
        if self
            .crypto
            .asym_verify(
                base_hash_algo,
                base_asym_algo,
                leaf,
                message_hash.as_ref(),
                signature,
            )
            .is_err()
        {
            error!("!!! verify_key_exchange_rsp_signature - FAIL !!!\n");
            return Err(SPDM_STATUS_SECURITY_VIOLATION);
        }
        info!("!!! verify_key_exchange_rsp_signature - PASS !!!\n");
        Ok(())
    }

    /// Responder HMAC over TH_curr(A, Ct, K) with the response
    /// finished key.
    pub fn generate_key_exchange_rsp_hmac(&self, session_id: u32) -> SpdmResult<SpdmDigestStruct> {
        let session = self.session_ref(session_id)?;
        let cert_chain = self.local_used_cert_chain_slice()?;
        let th_curr = self.calc_th_curr_ak(session, Some(cert_chain))?;

        session
            .secured_message
            .hmac_with_response_finished_key(th_curr.as_ref())
            .map_err(|_| SPDM_STATUS_DEVICE_ERROR)
    }

    pub fn verify_key_exchange_rsp_hmac(&self, session_id: u32, hmac: &[u8]) -> SpdmResult {
        if hmac.len() != self.get_hash_size() as usize {
            return Err(SPDM_STATUS_SECURITY_VIOLATION);
        }
        let session = self.session_ref(session_id)?;
        let cert_chain = self.peer_used_cert_chain_slice()?;
        let th_curr = self.calc_th_curr_ak(session, Some(cert_chain))?;

        let calc_hmac = session
            .secured_message
            .hmac_with_response_finished_key(th_curr.as_ref())
            .map_err(|_| SPDM_STATUS_SECURITY_VIOLATION)?;
        if calc_hmac.as_ref() != hmac {
            error!("!!! verify_key_exchange_rsp_hmac - FAIL !!!\n");
            return Err(SPDM_STATUS_SECURITY_VIOLATION);
        }
        info!("!!! verify_key_exchange_rsp_hmac - PASS !!!\n");
        Ok(())
    }

    // ------------------------------------------------------------------
    // FINISH
    // ------------------------------------------------------------------

    /// Requester mutual-auth signature over TH_curr(A, Ct, K, CM, F);
    /// Ct is the responder chain, CM the requester's own chain.
    pub fn generate_finish_req_signature(
        &self,
        session_id: u32,
    ) -> SpdmResult<SpdmSignatureStruct> {
        let session = self.session_ref(session_id)?;
        let cert_chain = self.peer_used_cert_chain_slice()?;
        let mut_cert_chain = self.local_used_cert_chain_slice()?;
        let th_curr = self.calc_th_curr_akf(session, Some(cert_chain), Some(mut_cert_chain))?;

        let message_hash = self
            .crypto
            .hash_all(self.connection_info.algorithm.base_hash_algo, th_curr.as_ref())
            .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
        debug!("th_curr hash - {:02x?}\n", message_hash.as_ref());

        self.secret
            .requester_data_sign(
                self.connection_info.algorithm.req_base_asym_alg,
                message_hash.as_ref(),
            )
            .ok_or(SPDM_STATUS_DEVICE_ERROR)
    }

    /// Responder check of the FINISH request signature; the leaf comes
    /// from the requester's (mutual) chain.
    pub fn verify_finish_req_signature(
        &self,
        session_id: u32,
        signature: &SpdmSignatureStruct,
    ) -> SpdmResult {
        let base_hash_algo = self.connection_info.algorithm.base_hash_algo;
        let req_asym_algo = self
            .connection_info
            .algorithm
            .req_base_asym_alg
            .as_base_asym_algo();
        if signature.data_size != req_asym_algo.get_size() {
            return Err(SPDM_STATUS_SECURITY_VIOLATION);
        }

        let session = self.session_ref(session_id)?;
        let cert_chain = self.local_used_cert_chain_slice()?;
        let mut_cert_chain = self.peer_used_cert_chain_slice()?;
        let th_curr = self.calc_th_curr_akf(session, Some(cert_chain), Some(mut_cert_chain))?;

        let message_hash = self
            .crypto
            .hash_all(base_hash_algo, th_curr.as_ref())
            .ok_or(SPDM_STATUS_SECURITY_VIOLATION)?;
        debug!("th_curr hash - {:02x?}\n", message_hash.as_ref());

        let leaf = self.leaf_cert(mut_cert_chain)?;
        if self
            .crypto
            .asym_verify(
                base_hash_algo,
                req_asym_algo,
                leaf,
                message_hash.as_ref(),
                signature,
            )
            .is_err()
        {
            error!("!!! verify_finish_req_signature - FAIL !!!\n");
            return Err(SPDM_STATUS_SECURITY_VIOLATION);
        }
        info!("!!! verify_finish_req_signature - PASS !!!\n");
        Ok(())
    }

    fn finish_chains(
        &self,
        session: &SpdmSessionInfo,
        local_is_ct: bool,
    ) -> SpdmResult<(&[u8], Option<&[u8]>)> {
        let cert_chain = if local_is_ct {
            self.local_used_cert_chain_slice()?
        } else {
            self.peer_used_cert_chain_slice()?
        };
        let mut_cert_chain = if session.get_mut_auth_requested().is_empty() {
            None
        } else if local_is_ct {
            Some(self.peer_used_cert_chain_slice()?)
        } else {
            Some(self.local_used_cert_chain_slice()?)
        };
        Ok((cert_chain, mut_cert_chain))
    }

    /// Requester HMAC over TH_curr(A, Ct, K, CM?, F) with the request
    /// finished key.
    pub fn generate_finish_req_hmac(&self, session_id: u32) -> SpdmResult<SpdmDigestStruct> {
        let session = self.session_ref(session_id)?;
        let (cert_chain, mut_cert_chain) = self.finish_chains(session, false)?;
        let th_curr = self.calc_th_curr_akf(session, Some(cert_chain), mut_cert_chain)?;

        session
            .secured_message
            .hmac_with_request_finished_key(th_curr.as_ref())
            .map_err(|_| SPDM_STATUS_DEVICE_ERROR)
    }

    pub fn verify_finish_req_hmac(&self, session_id: u32, hmac: &[u8]) -> SpdmResult {
        if hmac.len() != self.get_hash_size() as usize {
            return Err(SPDM_STATUS_SECURITY_VIOLATION);
        }
        let session = self.session_ref(session_id)?;
        let (cert_chain, mut_cert_chain) = self.finish_chains(session, true)?;
        let th_curr = self.calc_th_curr_akf(session, Some(cert_chain), mut_cert_chain)?;

        let calc_hmac = session
            .secured_message
            .hmac_with_request_finished_key(th_curr.as_ref())
            .map_err(|_| SPDM_STATUS_SECURITY_VIOLATION)?;
        if calc_hmac.as_ref() != hmac {
            error!("!!! verify_finish_req_hmac - FAIL !!!\n");
            return Err(SPDM_STATUS_SECURITY_VIOLATION);
        }
        info!("!!! verify_finish_req_hmac - PASS !!!\n");
        Ok(())
    }

    /// Responder HMAC over TH_curr(A, Ct, K, CM?, F) with the response
    /// finished key.
    pub fn generate_finish_rsp_hmac(&self, session_id: u32) -> SpdmResult<SpdmDigestStruct> {
        let session = self.session_ref(session_id)?;
        let (cert_chain, mut_cert_chain) = self.finish_chains(session, true)?;
        let th_curr = self.calc_th_curr_akf(session, Some(cert_chain), mut_cert_chain)?;

        session
            .secured_message
            .hmac_with_response_finished_key(th_curr.as_ref())
            .map_err(|_| SPDM_STATUS_DEVICE_ERROR)
    }

    pub fn verify_finish_rsp_hmac(&self, session_id: u32, hmac: &[u8]) -> SpdmResult {
        if hmac.len() != self.get_hash_size() as usize {
            return Err(SPDM_STATUS_SECURITY_VIOLATION);
        }
        let session = self.session_ref(session_id)?;
        let (cert_chain, mut_cert_chain) = self.finish_chains(session, false)?;
        let th_curr = self.calc_th_curr_akf(session, Some(cert_chain), mut_cert_chain)?;

        let calc_hmac = session
            .secured_message
            .hmac_with_response_finished_key(th_curr.as_ref())
            .map_err(|_| SPDM_STATUS_SECURITY_VIOLATION)?;
        if calc_hmac.as_ref() != hmac {
            error!("!!! verify_finish_rsp_hmac - FAIL !!!\n");
            return Err(SPDM_STATUS_SECURITY_VIOLATION);
        }
        info!("!!! verify_finish_rsp_hmac - PASS !!!\n");
        Ok(())
    }

    // ------------------------------------------------------------------
    // PSK_EXCHANGE / PSK_FINISH
    // ------------------------------------------------------------------

    /// Responder HMAC over TH_curr(A, K) — no chain hashes on PSK
    /// sessions.
    pub fn generate_psk_exchange_rsp_hmac(&self, session_id: u32) -> SpdmResult<SpdmDigestStruct> {
        let session = self.session_ref(session_id)?;
        let th_curr = self.calc_th_curr_ak(session, None)?;

        session
            .secured_message
            .hmac_with_response_finished_key(th_curr.as_ref())
            .map_err(|_| SPDM_STATUS_DEVICE_ERROR)
    }

    pub fn verify_psk_exchange_rsp_hmac(&self, session_id: u32, hmac: &[u8]) -> SpdmResult {
        if hmac.len() != self.get_hash_size() as usize {
            return Err(SPDM_STATUS_SECURITY_VIOLATION);
        }
        let session = self.session_ref(session_id)?;
        let th_curr = self.calc_th_curr_ak(session, None)?;

        let calc_hmac = session
            .secured_message
            .hmac_with_response_finished_key(th_curr.as_ref())
            .map_err(|_| SPDM_STATUS_SECURITY_VIOLATION)?;
        if calc_hmac.as_ref() != hmac {
            error!("!!! verify_psk_exchange_rsp_hmac - FAIL !!!\n");
            return Err(SPDM_STATUS_SECURITY_VIOLATION);
        }
        info!("!!! verify_psk_exchange_rsp_hmac - PASS !!!\n");
        Ok(())
    }

    /// Requester HMAC over TH_curr(A, K, F) with the request finished
    /// key.
    pub fn generate_psk_finish_req_hmac(&self, session_id: u32) -> SpdmResult<SpdmDigestStruct> {
        let session = self.session_ref(session_id)?;
        let th_curr = self.calc_th_curr_akf(session, None, None)?;

        session
            .secured_message
            .hmac_with_request_finished_key(th_curr.as_ref())
            .map_err(|_| SPDM_STATUS_DEVICE_ERROR)
    }

    pub fn verify_psk_finish_req_hmac(&self, session_id: u32, hmac: &[u8]) -> SpdmResult {
        if hmac.len() != self.get_hash_size() as usize {
            return Err(SPDM_STATUS_SECURITY_VIOLATION);
        }
        let session = self.session_ref(session_id)?;
        let th_curr = self.calc_th_curr_akf(session, None, None)?;

        let calc_hmac = session
            .secured_message
            .hmac_with_request_finished_key(th_curr.as_ref())
            .map_err(|_| SPDM_STATUS_SECURITY_VIOLATION)?;
        if calc_hmac.as_ref() != hmac {
            error!("!!! verify_psk_finish_req_hmac - FAIL !!!\n");
            return Err(SPDM_STATUS_SECURITY_VIOLATION);
        }
        info!("!!! verify_psk_finish_req_hmac - PASS !!!\n");
        Ok(())
    }

    // ------------------------------------------------------------------
    // TH1 / TH2
    // ------------------------------------------------------------------

    /// TH1 = Hash(A || Hash(Ct) || K), the PSK shape omitting the chain
    /// hash. Feeds the handshake-secret derivation after
    /// KEY_EXCHANGE/PSK_EXCHANGE.
    pub fn calculate_th1(&self, session_id: u32, is_requester: bool) -> SpdmResult<SpdmDigestStruct> {
        let session = self.session_ref(session_id)?;
        let cert_chain = if session.get_use_psk() {
            None
        } else if is_requester {
            Some(self.peer_used_cert_chain_slice()?)
        } else {
            Some(self.local_used_cert_chain_slice()?)
        };
        let th_curr = self.calc_th_curr_ak(session, cert_chain)?;

        let th1 = self
            .crypto
            .hash_all(self.connection_info.algorithm.base_hash_algo, th_curr.as_ref())
            .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
        debug!("th1 - {:02x?}\n", th1.as_ref());
        Ok(th1)
    }

    /// TH2 = Hash(A || Hash(Ct) || K || Hash(CM) || F) with the same
    /// PSK/mutual-auth presence rules. Feeds the data-secret derivation
    /// after FINISH/PSK_FINISH.
    pub fn calculate_th2(&self, session_id: u32, is_requester: bool) -> SpdmResult<SpdmDigestStruct> {
        let session = self.session_ref(session_id)?;
        let cert_chain = if session.get_use_psk() {
            None
        } else if is_requester {
            Some(self.peer_used_cert_chain_slice()?)
        } else {
            Some(self.local_used_cert_chain_slice()?)
        };
        let mut_cert_chain = if session.get_use_psk()
            || session.get_mut_auth_requested().is_empty()
        {
            None
        } else if is_requester {
            Some(self.local_used_cert_chain_slice()?)
        } else {
            Some(self.peer_used_cert_chain_slice()?)
        };
        let th_curr = self.calc_th_curr_akf(session, cert_chain, mut_cert_chain)?;

        let th2 = self
            .crypto
            .hash_all(self.connection_info.algorithm.base_hash_algo, th_curr.as_ref())
            .ok_or(SPDM_STATUS_DEVICE_ERROR)?;
        debug!("th2 - {:02x?}\n", th2.as_ref());
        Ok(th2)
    }
}
