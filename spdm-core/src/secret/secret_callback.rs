// Copyright (c) 2021 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use crate::protocol::{
    SpdmBaseAsymAlgo, SpdmMeasurementHashAlgo, SpdmMeasurementRecordStructure,
    SpdmMeasurementSpecification, SpdmReqAsymAlgo, SpdmSignatureStruct,
};

#[derive(Clone)]
pub struct SpdmSecretAsymSign {
    /// Sign `message_hash` with the requester private key. Used for
    /// mutual-auth CHALLENGE_AUTH and FINISH request signatures.
    pub requester_data_sign_cb:
        fn(req_base_asym_alg: SpdmReqAsymAlgo, message_hash: &[u8]) -> Option<SpdmSignatureStruct>,

    /// Sign `message_hash` with the responder private key. Used for
    /// CHALLENGE_AUTH, MEASUREMENTS and KEY_EXCHANGE_RSP signatures.
    pub responder_data_sign_cb:
        fn(base_asym_algo: SpdmBaseAsymAlgo, message_hash: &[u8]) -> Option<SpdmSignatureStruct>,
}

#[derive(Clone)]
pub struct SpdmSecretMeasurement {
    /// Collect the raw measurement-block sequence of the device.
    pub measurement_collection_cb: fn(
        measurement_specification: SpdmMeasurementSpecification,
        measurement_hash_algo: SpdmMeasurementHashAlgo,
    ) -> Option<SpdmMeasurementRecordStructure>,
}
