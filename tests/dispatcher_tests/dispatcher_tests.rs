//! Tests for Dispatcher
//!
//! These tests verify:
//! - Routing by request type
//! - Unknown types fail with InvalidRequest
//! - Correlation id passthrough
//! - Determinism across repeated calls and threads

use std::sync::Arc;
use std::thread;

use logwire::protocol::{ApiDescriptor, ApiTable, ErrorCode, FETCH_BODY_SIZE};
use logwire::{Dispatcher, WireError};

fn raw(request_type: u16, version: u16, correlation_id: i32) -> Vec<u8> {
    let mut raw = Vec::new();
    raw.extend_from_slice(&request_type.to_be_bytes());
    raw.extend_from_slice(&version.to_be_bytes());
    raw.extend_from_slice(&correlation_id.to_be_bytes());
    raw.extend_from_slice(&[0, 9, 0x6b, 0x61]);
    raw
}

#[test]
fn test_dispatch_api_versions() {
    let dispatcher = Dispatcher::standard();
    let header = dispatcher.parse_header(&raw(18, 4, 1)).unwrap();
    let body = dispatcher.dispatch(&header).unwrap();

    assert_eq!(&body[..3], &[0x00, 0x00, 0x03]);
}

#[test]
fn test_dispatch_fetch() {
    let dispatcher = Dispatcher::standard();
    let header = dispatcher.parse_header(&raw(1, 11, 1)).unwrap();
    let body = dispatcher.dispatch(&header).unwrap();

    assert_eq!(body.len(), FETCH_BODY_SIZE);
}

#[test]
fn test_dispatch_unknown_type() {
    let dispatcher = Dispatcher::standard();
    let header = dispatcher.parse_header(&raw(75, 0, 1)).unwrap();
    assert_eq!(header.error_code, ErrorCode::InvalidRequest);

    match dispatcher.dispatch(&header) {
        Err(WireError::InvalidRequest { request_type }) => assert_eq!(request_type, 75),
        other => panic!("Expected InvalidRequest, got {:?}", other),
    }
}

#[test]
fn test_dispatch_type_missing_from_table() {
    let apis = ApiTable::new([ApiDescriptor::new(18, 0, 4)]).unwrap();
    let dispatcher = Dispatcher::new(Arc::new(apis));
    let header = dispatcher.parse_header(&raw(1, 0, 1)).unwrap();

    assert!(matches!(
        dispatcher.dispatch(&header),
        Err(WireError::InvalidRequest { request_type: 1 })
    ));
}

#[test]
fn test_respond_echoes_correlation_id() {
    let dispatcher = Dispatcher::standard();
    for correlation_id in [0, 1, -1, i32::MIN, i32::MAX, 0x6f7fc661] {
        for request_type in [1u16, 18] {
            let header = dispatcher
                .parse_header(&raw(request_type, 0, correlation_id))
                .unwrap();
            let response = dispatcher.respond(&header).unwrap();
            assert_eq!(response.correlation_id, correlation_id);
        }
    }
}

#[test]
fn test_dispatch_is_deterministic() {
    let dispatcher = Dispatcher::standard();
    let header = dispatcher.parse_header(&raw(18, 2, 77)).unwrap();

    let first = dispatcher.dispatch(&header).unwrap();
    let second = dispatcher.dispatch(&header).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_dispatch_shared_across_threads() {
    let dispatcher = Arc::new(Dispatcher::standard());
    let expected = {
        let header = dispatcher.parse_header(&raw(18, 3, 5)).unwrap();
        dispatcher.dispatch(&header).unwrap()
    };

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let dispatcher = Arc::clone(&dispatcher);
            thread::spawn(move || {
                let header = dispatcher.parse_header(&raw(18, 3, 5)).unwrap();
                dispatcher.dispatch(&header).unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
