// Copyright (c) 2021 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

mod crypto_callbacks;

pub use crypto_callbacks::{
    SpdmAsymVerify, SpdmCertOperation, SpdmCryptoRandom, SpdmHash, SpdmHmac,
};

use crate::error::{SpdmResult, SPDM_STATUS_SECURITY_VIOLATION};
use crate::protocol::{SpdmBaseAsymAlgo, SpdmBaseHashAlgo, SpdmDigestStruct, SpdmSignatureStruct};

/// The cryptographic primitive provider. One value per context; the
/// engine never keeps primitive state in globals, and the provider owns
/// whatever key contexts it creates around a single call.
#[derive(Clone)]
pub struct SpdmCryptoProvider {
    pub hash: SpdmHash,
    pub hmac: SpdmHmac,
    pub asym_verify: SpdmAsymVerify,
    pub cert_operation: SpdmCertOperation,
    pub rand: SpdmCryptoRandom,
}

impl SpdmCryptoProvider {
    pub fn hash_all(&self, base_hash_algo: SpdmBaseHashAlgo, data: &[u8]) -> Option<SpdmDigestStruct> {
        (self.hash.hash_all_cb)(base_hash_algo, data)
    }

    pub fn hmac(
        &self,
        base_hash_algo: SpdmBaseHashAlgo,
        key: &[u8],
        data: &[u8],
    ) -> Option<SpdmDigestStruct> {
        (self.hmac.hmac_cb)(base_hash_algo, key, data)
    }

    pub fn hmac_verify(
        &self,
        base_hash_algo: SpdmBaseHashAlgo,
        key: &[u8],
        data: &[u8],
        hmac: &SpdmDigestStruct,
    ) -> SpdmResult {
        (self.hmac.hmac_verify_cb)(base_hash_algo, key, data, hmac)
            .map_err(|_| SPDM_STATUS_SECURITY_VIOLATION)
    }

    pub fn asym_verify(
        &self,
        base_hash_algo: SpdmBaseHashAlgo,
        base_asym_algo: SpdmBaseAsymAlgo,
        public_cert_der: &[u8],
        data: &[u8],
        signature: &SpdmSignatureStruct,
    ) -> SpdmResult {
        (self.asym_verify.verify_cb)(base_hash_algo, base_asym_algo, public_cert_der, data, signature)
            .map_err(|_| SPDM_STATUS_SECURITY_VIOLATION)
    }

    /// Locate one certificate inside a DER certificate sequence.
    /// `index` counts from the root; `-1` addresses the leaf.
    pub fn get_cert_from_cert_chain(&self, cert_chain: &[u8], index: isize) -> SpdmResult<(usize, usize)> {
        (self.cert_operation.get_cert_from_cert_chain_cb)(cert_chain, index)
    }

    pub fn verify_cert_chain(&self, cert_chain: &[u8]) -> SpdmResult {
        (self.cert_operation.verify_cert_chain_cb)(cert_chain)
            .map_err(|_| SPDM_STATUS_SECURITY_VIOLATION)
    }

    pub fn get_random(&self, data: &mut [u8]) -> SpdmResult<usize> {
        (self.rand.get_random_cb)(data)
    }
}
