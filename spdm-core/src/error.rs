// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use core::fmt;

/// The error kinds the engine surfaces to its caller.
///
/// Primitive-provider failures never pass through raw: a failed sign
/// becomes `DeviceError`, a failed verification `SecurityViolation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpdmStatus {
    /// Malformed argument, duplicate session id, out-of-range slot.
    InvalidParameter,
    /// Unknown data kind, or a version not in the negotiated set.
    Unsupported,
    /// A managed buffer or output buffer is too small.
    BufferTooSmall,
    /// Transport send/receive failed, a collaborator call failed, or the
    /// peer answered with an unexpected code for the current state.
    DeviceError,
    /// A signature, HMAC or certificate-hash verification failed, or a
    /// length mismatched during verification.
    SecurityViolation,
    /// The peer answered ResponseNotReady; retry per the retry budget.
    NoResponse,
    /// The peer returned an SPDM ERROR with any other code. The subcode is
    /// recorded in the context error state.
    ErrorPeer,
}

impl fmt::Display for SpdmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpdmStatus::InvalidParameter => "invalid parameter",
            SpdmStatus::Unsupported => "unsupported",
            SpdmStatus::BufferTooSmall => "buffer too small",
            SpdmStatus::DeviceError => "device error",
            SpdmStatus::SecurityViolation => "security violation",
            SpdmStatus::NoResponse => "no response",
            SpdmStatus::ErrorPeer => "error reported by peer",
        };
        write!(f, "{}", name)
    }
}

pub type SpdmResult<T = ()> = core::result::Result<T, SpdmStatus>;

pub const SPDM_STATUS_INVALID_PARAMETER: SpdmStatus = SpdmStatus::InvalidParameter;
pub const SPDM_STATUS_UNSUPPORTED: SpdmStatus = SpdmStatus::Unsupported;
pub const SPDM_STATUS_BUFFER_TOO_SMALL: SpdmStatus = SpdmStatus::BufferTooSmall;
pub const SPDM_STATUS_DEVICE_ERROR: SpdmStatus = SpdmStatus::DeviceError;
pub const SPDM_STATUS_SECURITY_VIOLATION: SpdmStatus = SpdmStatus::SecurityViolation;
pub const SPDM_STATUS_NO_RESPONSE: SpdmStatus = SpdmStatus::NoResponse;
pub const SPDM_STATUS_ERROR_PEER: SpdmStatus = SpdmStatus::ErrorPeer;
