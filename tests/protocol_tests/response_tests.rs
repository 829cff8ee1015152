//! Response Builder Tests
//!
//! Tests for body shapes produced per request type and their client-side
//! decoding.

use logwire::protocol::{
    build_api_versions, build_error, build_fetch, parse_header, ApiDescriptor, ApiTable,
    ApiVersionsBody, ErrorCode, FetchBody, RequestHeader, FETCH_BODY_SIZE, MAX_API_DESCRIPTORS,
};
use logwire::WireError;

fn header(request_type: u16, version: u16) -> RequestHeader {
    let mut raw = Vec::new();
    raw.extend_from_slice(&request_type.to_be_bytes());
    raw.extend_from_slice(&version.to_be_bytes());
    raw.extend_from_slice(&0x6f7fc661i32.to_be_bytes());
    raw.extend_from_slice(&[0, 0, 0, 0]);
    parse_header(&raw, &ApiTable::standard()).unwrap()
}

// =============================================================================
// ApiVersions Tests
// =============================================================================

#[test]
fn test_api_versions_exact_bytes() {
    let body = build_api_versions(&header(18, 4), &ApiTable::standard());

    let expected: &[u8] = &[
        0x00, 0x00, // error_code
        0x03, // api keys count + 1
        0x00, 0x12, 0x00, 0x00, 0x00, 0x04, 0x00, // ApiVersions 0..=4
        0x00, 0x01, 0x00, 0x00, 0x00, 0x10, 0x00, // Fetch 0..=16
        0x00, 0x00, 0x00, 0x00, // throttle_time_ms
        0x00, // tag buffer
    ];
    assert_eq!(&body[..], expected);
}

#[test]
fn test_api_versions_unsupported_still_lists_table() {
    let apis = ApiTable::standard();
    let good = build_api_versions(&header(18, 4), &apis);
    let bad = build_api_versions(&header(18, 0x674a), &apis);

    assert_eq!(&bad[..2], &[0x00, 0x23]);
    assert_eq!(good.len(), bad.len());
    assert_eq!(&good[2..], &bad[2..]);
}

#[test]
fn test_api_versions_length_tracks_table_size() {
    let apis = ApiTable::new([ApiDescriptor::new(18, 0, 4)]).unwrap();
    let body = build_api_versions(&header(18, 1), &apis);
    assert_eq!(body.len(), 2 + 1 + 7 + 4 + 1);
    assert_eq!(body[2], 2);
}

#[test]
fn test_api_versions_largest_table_fits_count_byte() {
    let apis = ApiTable::new((0..MAX_API_DESCRIPTORS as u16).map(|t| ApiDescriptor::new(t, 0, 1)))
        .unwrap();
    let body = build_api_versions(&header(18, 4), &apis);

    assert_eq!(body[2], 255);
    assert_eq!(body.len(), 2 + 1 + MAX_API_DESCRIPTORS * 7 + 4 + 1);

    let decoded = ApiVersionsBody::decode(&body).unwrap();
    assert_eq!(decoded.api_keys.len(), MAX_API_DESCRIPTORS);
}

#[test]
fn test_oversized_api_table_is_rejected() {
    let result = ApiTable::new((0..=MAX_API_DESCRIPTORS as u16).map(|t| ApiDescriptor::new(t, 0, 1)));
    assert!(matches!(result, Err(WireError::Config(_))));
}

#[test]
fn test_api_versions_decode() {
    let body = build_api_versions(&header(18, 9), &ApiTable::standard());
    let decoded = ApiVersionsBody::decode(&body).unwrap();

    assert_eq!(decoded.error(), Some(ErrorCode::UnsupportedVersion));
    assert_eq!(decoded.throttle_time_ms, 0);
    assert_eq!(
        decoded.api_keys,
        vec![ApiDescriptor::new(18, 0, 4), ApiDescriptor::new(1, 0, 16)]
    );
}

#[test]
fn test_api_versions_decode_truncated() {
    let body = build_api_versions(&header(18, 4), &ApiTable::standard());
    for cut in [0, 1, 2, 5, body.len() - 1] {
        assert!(
            matches!(ApiVersionsBody::decode(&body[..cut]), Err(WireError::Protocol(_))),
            "cut at {}",
            cut
        );
    }
}

// =============================================================================
// Fetch Tests
// =============================================================================

#[test]
fn test_fetch_body_shape() {
    let body = build_fetch(&header(1, 16));
    assert_eq!(body.len(), FETCH_BODY_SIZE);
    assert_eq!(body.len(), 13);
    assert_eq!(
        &body[..],
        &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x00, 0x01, 0x00]
    );
}

#[test]
fn test_fetch_body_carries_version_error() {
    let body = build_fetch(&header(1, 17));
    assert_eq!(body.len(), FETCH_BODY_SIZE);
    assert_eq!(&body[4..6], &[0x00, 0x23]);
}

#[test]
fn test_fetch_decode() {
    let decoded = FetchBody::decode(&build_fetch(&header(1, 0))).unwrap();
    assert_eq!(decoded.error(), Some(ErrorCode::None));
    assert_eq!(decoded.session_id, 0);
    assert_eq!(decoded.throttle_time_ms, 0);
    assert_eq!(decoded.response_count, 0);
}

#[test]
fn test_fetch_decode_rejects_short_body() {
    let body = build_fetch(&header(1, 0));
    assert!(FetchBody::decode(&body[..12]).is_err());
}

// =============================================================================
// Error Body Tests
// =============================================================================

#[test]
fn test_error_body() {
    assert_eq!(&build_error(ErrorCode::InvalidRequest)[..], &[0x00, 0x25]);
    assert_eq!(&build_error(ErrorCode::None)[..], &[0x00, 0x00]);
}
