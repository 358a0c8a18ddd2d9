// Copyright (c) 2021 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Host policy callbacks. The private keys behind the two data-signing
//! callbacks and the measurement source never enter the engine; the
//! engine only hands over the hash to sign or receives the raw
//! measurement record.

mod secret_callback;

pub use secret_callback::{SpdmSecretAsymSign, SpdmSecretMeasurement};

use crate::protocol::{
    SpdmBaseAsymAlgo, SpdmMeasurementHashAlgo, SpdmMeasurementRecordStructure,
    SpdmMeasurementSpecification, SpdmReqAsymAlgo, SpdmSignatureStruct,
};

/// The per-context bundle of host policy callbacks.
#[derive(Clone)]
pub struct SpdmSecretProvider {
    pub asym_sign: SpdmSecretAsymSign,
    pub measurement: SpdmSecretMeasurement,
}

impl SpdmSecretProvider {
    pub fn requester_data_sign(
        &self,
        req_base_asym_alg: SpdmReqAsymAlgo,
        message_hash: &[u8],
    ) -> Option<SpdmSignatureStruct> {
        (self.asym_sign.requester_data_sign_cb)(req_base_asym_alg, message_hash)
    }

    pub fn responder_data_sign(
        &self,
        base_asym_algo: SpdmBaseAsymAlgo,
        message_hash: &[u8],
    ) -> Option<SpdmSignatureStruct> {
        (self.asym_sign.responder_data_sign_cb)(base_asym_algo, message_hash)
    }

    pub fn measurement_collection(
        &self,
        measurement_specification: SpdmMeasurementSpecification,
        measurement_hash_algo: SpdmMeasurementHashAlgo,
    ) -> Option<SpdmMeasurementRecordStructure> {
        (self.measurement.measurement_collection_cb)(measurement_specification, measurement_hash_algo)
    }
}
