// Copyright (c) 2021 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use crate::error::SpdmResult;
use crate::protocol::{SpdmBaseAsymAlgo, SpdmBaseHashAlgo, SpdmDigestStruct, SpdmSignatureStruct};

#[derive(Clone)]
pub struct SpdmHash {
    pub hash_all_cb: fn(base_hash_algo: SpdmBaseHashAlgo, data: &[u8]) -> Option<SpdmDigestStruct>,
}

#[derive(Clone)]
pub struct SpdmHmac {
    pub hmac_cb:
        fn(base_hash_algo: SpdmBaseHashAlgo, key: &[u8], data: &[u8]) -> Option<SpdmDigestStruct>,

    pub hmac_verify_cb: fn(
        base_hash_algo: SpdmBaseHashAlgo,
        key: &[u8],
        data: &[u8],
        hmac: &SpdmDigestStruct,
    ) -> SpdmResult,
}

#[derive(Clone)]
pub struct SpdmAsymVerify {
    pub verify_cb: fn(
        base_hash_algo: SpdmBaseHashAlgo,
        base_asym_algo: SpdmBaseAsymAlgo,
        public_cert_der: &[u8],
        data: &[u8],
        signature: &SpdmSignatureStruct,
    ) -> SpdmResult,
}

#[derive(Clone)]
pub struct SpdmCertOperation {
    /// Returns the `[begin, end)` byte range of the certificate at
    /// `index` inside a DER certificate sequence; `-1` means the leaf.
    pub get_cert_from_cert_chain_cb: fn(cert_chain: &[u8], index: isize) -> SpdmResult<(usize, usize)>,

    pub verify_cert_chain_cb: fn(cert_chain: &[u8]) -> SpdmResult,
}

#[derive(Clone)]
pub struct SpdmCryptoRandom {
    pub get_random_cb: fn(data: &mut [u8]) -> SpdmResult<usize>,
}
