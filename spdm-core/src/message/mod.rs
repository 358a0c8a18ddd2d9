// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! The wire framing the engine itself parses: message headers, opcodes,
//! error codes, and the attribute bytes that steer authentication. Full
//! request/response payload handling belongs to the requester/responder
//! layer driving this engine.

use codec::enum_builder;
use codec::{Codec, Reader, Writer};

enum_builder! {
    @U8
    EnumName: SpdmRequestResponseCode;
    EnumVal{
        // 1.0 response
        SpdmResponseDigests => 0x01,
        SpdmResponseCertificate => 0x02,
        SpdmResponseChallengeAuth => 0x03,
        SpdmResponseVersion => 0x04,
        SpdmResponseMeasurements => 0x60,
        SpdmResponseCapabilities => 0x61,
        SpdmResponseAlgorithms => 0x63,
        SpdmResponseVendorDefinedResponse => 0x7E,
        SpdmResponseError => 0x7F,
        // 1.1 response
        SpdmResponseKeyExchangeRsp => 0x64,
        SpdmResponseFinishRsp => 0x65,
        SpdmResponsePskExchangeRsp => 0x66,
        SpdmResponsePskFinishRsp => 0x67,
        SpdmResponseHeartbeatAck => 0x68,
        SpdmResponseKeyUpdateAck => 0x69,
        SpdmResponseEncapsulatedRequest => 0x6A,
        SpdmResponseEncapsulatedResponseAck => 0x6B,
        SpdmResponseEndSessionAck => 0x6C,

        // 1.0 request
        SpdmRequestGetDigests => 0x81,
        SpdmRequestGetCertificate => 0x82,
        SpdmRequestChallenge => 0x83,
        SpdmRequestGetVersion => 0x84,
        SpdmRequestGetMeasurements => 0xE0,
        SpdmRequestGetCapabilities => 0xE1,
        SpdmRequestNegotiateAlgorithms => 0xE3,
        SpdmRequestVendorDefinedRequest => 0xFE,
        SpdmRequestResponseIfReady => 0xFF,
        // 1.1 request
        SpdmRequestKeyExchange => 0xE4,
        SpdmRequestFinish => 0xE5,
        SpdmRequestPskExchange => 0xE6,
        SpdmRequestPskFinish => 0xE7,
        SpdmRequestHeartbeat => 0xE8,
        SpdmRequestKeyUpdate => 0xE9,
        SpdmRequestGetEncapsulatedRequest => 0xEA,
        SpdmRequestDeliverEncapsulatedResponse => 0xEB,
        SpdmRequestEndSession => 0xEC
    }
}
impl Default for SpdmRequestResponseCode {
    fn default() -> SpdmRequestResponseCode {
        SpdmRequestResponseCode::Unknown(0)
    }
}

use crate::protocol::SpdmVersion;

#[derive(Debug, Clone, Default)]
pub struct SpdmMessageHeader {
    pub version: SpdmVersion,
    pub request_response_code: SpdmRequestResponseCode,
}

impl Codec for SpdmMessageHeader {
    fn encode(&self, bytes: &mut Writer) -> Result<usize, codec::EncodeErr> {
        let mut cnt = 0usize;
        cnt += self.version.encode(bytes)?;
        cnt += self.request_response_code.encode(bytes)?;
        Ok(cnt)
    }

    fn read(r: &mut Reader) -> Option<SpdmMessageHeader> {
        let version = SpdmVersion::read(r)?;
        let request_response_code = SpdmRequestResponseCode::read(r)?;
        Some(SpdmMessageHeader {
            version,
            request_response_code,
        })
    }
}

enum_builder! {
    @U8
    EnumName: SpdmErrorCode;
    EnumVal{
        SpdmErrorInvalidRequest => 0x01,
        SpdmErrorBusy => 0x03,
        SpdmErrorUnexpectedRequest => 0x04,
        SpdmErrorUnspecified => 0x05,
        SpdmErrorDecryptError => 0x06,
        SpdmErrorUnsupportedRequest => 0x07,
        SpdmErrorRequestInFlight => 0x08,
        SpdmErrorInvalidResponseCode => 0x09,
        SpdmErrorSessionLimitExceeded => 0x0A,
        SpdmErrorVersionMismatch => 0x41,
        SpdmErrorResponseNotReady => 0x42,
        SpdmErrorRequestResynch => 0x43
    }
}
impl Default for SpdmErrorCode {
    fn default() -> SpdmErrorCode {
        SpdmErrorCode::Unknown(0)
    }
}

/// Extended-error payload carried by an ERROR(ResponseNotReady).
#[derive(Debug, Clone, Default)]
pub struct SpdmErrorResponseNotReadyExtData {
    pub rd_exponent: u8,
    pub request_code: SpdmRequestResponseCode,
    pub token: u8,
    pub rd_tm: u8,
}

impl Codec for SpdmErrorResponseNotReadyExtData {
    fn encode(&self, bytes: &mut Writer) -> Result<usize, codec::EncodeErr> {
        let mut cnt = 0usize;
        cnt += self.rd_exponent.encode(bytes)?;
        cnt += self.request_code.encode(bytes)?;
        cnt += self.token.encode(bytes)?;
        cnt += self.rd_tm.encode(bytes)?;
        Ok(cnt)
    }

    fn read(r: &mut Reader) -> Option<SpdmErrorResponseNotReadyExtData> {
        let rd_exponent = u8::read(r)?;
        let request_code = SpdmRequestResponseCode::read(r)?;
        let token = u8::read(r)?;
        let rd_tm = u8::read(r)?;
        Some(SpdmErrorResponseNotReadyExtData {
            rd_exponent,
            request_code,
            token,
            rd_tm,
        })
    }
}

bitflags! {
    /// Attribute byte of CHALLENGE_AUTH Param1: the slot number occupies
    /// the low nibble, bit 7 requests basic mutual authentication.
    #[derive(Default)]
    pub struct SpdmChallengeAuthAttribute: u8 {
        const BASIC_MUT_AUTH_REQ = 0b1000_0000;
    }
}

impl Codec for SpdmChallengeAuthAttribute {
    fn encode(&self, bytes: &mut Writer) -> Result<usize, codec::EncodeErr> {
        self.bits().encode(bytes)
    }

    fn read(r: &mut Reader) -> Option<SpdmChallengeAuthAttribute> {
        let bits = u8::read(r)?;
        SpdmChallengeAuthAttribute::from_bits(bits & 0xF0)
    }
}

bitflags! {
    #[derive(Default)]
    pub struct SpdmKeyExchangeMutAuthAttributes: u8 {
        const MUT_AUTH_REQUESTED = 0b0000_0001;
        const MUT_AUTH_REQUESTED_WITH_ENCAP_REQUEST = 0b0000_0010;
        const MUT_AUTH_REQUESTED_WITH_GET_DIGESTS = 0b0000_0100;
    }
}

impl Codec for SpdmKeyExchangeMutAuthAttributes {
    fn encode(&self, bytes: &mut Writer) -> Result<usize, codec::EncodeErr> {
        self.bits().encode(bytes)
    }

    fn read(r: &mut Reader) -> Option<SpdmKeyExchangeMutAuthAttributes> {
        let bits = u8::read(r)?;
        SpdmKeyExchangeMutAuthAttributes::from_bits(bits)
    }
}

impl SpdmKeyExchangeMutAuthAttributes {
    /// Only three combinations are legal: no mutual auth, encapsulated
    /// request flow, or the optimized GET_DIGESTS flow.
    pub fn is_valid_policy(&self) -> bool {
        *self == SpdmKeyExchangeMutAuthAttributes::empty()
            || *self
                == (SpdmKeyExchangeMutAuthAttributes::MUT_AUTH_REQUESTED
                    | SpdmKeyExchangeMutAuthAttributes::MUT_AUTH_REQUESTED_WITH_ENCAP_REQUEST)
            || *self
                == (SpdmKeyExchangeMutAuthAttributes::MUT_AUTH_REQUESTED
                    | SpdmKeyExchangeMutAuthAttributes::MUT_AUTH_REQUESTED_WITH_GET_DIGESTS)
    }
}
