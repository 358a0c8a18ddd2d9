// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::managed_buffer::LargeManagedBuffer;
use crate::protocol::SpdmMeasurementSummaryHashType;

/// State of the encapsulated (responder-to-requester) flow a requester
/// runs for mutual authentication: the responder asks for the
/// requester's DIGESTS/CERTIFICATE through this side channel.
#[derive(Default)]
pub struct SpdmEncapContext {
    pub error_state: u32,
    pub encap_state: u32,
    pub request_id: u8,
    pub req_slot_id: u8,
    pub measurement_hash_type: SpdmMeasurementSummaryHashType,
    pub certificate_chain_buffer: LargeManagedBuffer,
}

impl SpdmEncapContext {
    /// Seed the encapsulated flow when the responder policy requests
    /// mutual authentication.
    pub fn init(&mut self, req_slot_id: u8, measurement_hash_type: SpdmMeasurementSummaryHashType) {
        self.error_state = 0;
        self.encap_state = 0;
        self.request_id = 0;
        self.req_slot_id = req_slot_id;
        self.measurement_hash_type = measurement_hash_type;
        self.certificate_chain_buffer.reset_message();
    }
}
