// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Build-time sizing of the engine. Every buffer the context owns is
//! embedded; nothing here allocates after context creation.

/// Capacity of the small managed-buffer class (MessageA, MessageC,
/// MessageMutC). These transcripts only ever hold the short negotiation
/// and challenge messages.
pub const MAX_SPDM_MESSAGE_SMALL_BUFFER_SIZE: usize = 0x300;

/// Capacity of the large managed-buffer class (MessageB, MessageMutB,
/// M1M2, L1L2, MessageK, MessageF and the TH scratch buffer). Sized to
/// hold a full certificate chain plus headers.
pub const MAX_SPDM_MESSAGE_BUFFER_SIZE: usize = 0x2000;

/// Number of rows in the session table.
pub const MAX_SPDM_SESSION_COUNT: usize = 4;

/// Upper bound for one formatted certificate chain (DER certificates,
/// without the chain header and root hash).
pub const MAX_SPDM_CERT_CHAIN_DATA_SIZE: usize = 0x1000;

/// Upper bound for a raw measurement record returned by the collector.
pub const MAX_SPDM_MEASUREMENT_RECORD_SIZE: usize = 0x800;

/// Upper bound for a provisioned PSK hint.
pub const MAX_SPDM_PSK_HINT_SIZE: usize = 32;

/// Retry budget honored by the caller when the peer answers Busy.
pub const MAX_SPDM_REQUEST_RETRY_TIMES: u8 = 3;

/// Scratch space for one outbound transport frame.
pub const SENDER_BUFFER_SIZE: usize = 0x2100;

/// Scratch space for one inbound transport frame.
pub const RECEIVER_BUFFER_SIZE: usize = 0x2100;
