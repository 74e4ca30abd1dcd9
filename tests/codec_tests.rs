//! Codec Tests
//!
//! Frame layout, byte accounting and the error taxonomy of the envelope
//! codec.

mod common;

use std::io;
use std::sync::Arc;
use std::thread;

use common::{ab_types, FailingReader, FailingWriter, RefusingMarshaller, Sample, TypeA, TypeB, TypeC};
use typewire::error::ERROR_PREFIX;
use typewire::{new_codec, BincodeMarshaller, Codec, CodecError, JsonMarshaller, Marker};

fn bincode_codec() -> Codec<Sample, Sample, BincodeMarshaller> {
    new_codec(BincodeMarshaller, ab_types(), ab_types()).unwrap()
}

fn json_codec() -> Codec<Sample, Sample, JsonMarshaller> {
    new_codec(JsonMarshaller, ab_types(), ab_types()).unwrap()
}

/// Hand-built frame with single-byte marker and length
fn frame(marker: u8, payload: &[u8]) -> Vec<u8> {
    assert!(payload.len() < 128);
    let mut bytes = vec![marker, payload.len() as u8];
    bytes.extend_from_slice(payload);
    bytes
}

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_encode_writes_marker_length_payload() {
    let codec = bincode_codec();
    let payload = bincode::serialize(&TypeA { x: 10 }).unwrap();

    let mut buf = Vec::new();
    let n = codec.encode(&Sample::A(TypeA { x: 10 }), &mut buf).unwrap();

    assert_eq!(n, 1 + 1 + payload.len());
    assert_eq!(buf, frame(0, &payload));
}

#[test]
fn test_encode_json_payload() {
    let codec = json_codec();
    let payload = serde_json::to_vec(&TypeA { x: 10 }).unwrap();
    assert_eq!(payload, br#"{"x":10}"#);

    let mut buf = Vec::new();
    let n = codec.encode(&Sample::A(TypeA { x: 10 }), &mut buf).unwrap();

    assert_eq!(n, 2 + payload.len());
    assert_eq!(buf, frame(0, &payload));
}

#[test]
fn test_encode_second_type_gets_marker_one() {
    let codec = json_codec();
    let bytes = codec
        .encode_to_vec(&Sample::B(TypeB { y: "hello".into() }))
        .unwrap();

    assert_eq!(bytes[0], 1);
    assert_eq!(&bytes[2..], br#"{"y":"hello"}"#);
}

#[test]
fn test_encode_unrecognized_type_writes_nothing() {
    let codec = bincode_codec();
    let mut buf = Vec::new();

    let err = codec
        .encode(&Sample::C(TypeC { z: 3.14 }), &mut buf)
        .unwrap_err();

    match err.error {
        CodecError::UnrecognizedType(name) => assert!(name.ends_with("TypeC")),
        other => panic!("Expected UnrecognizedType, got {:?}", other),
    }
    assert_eq!(err.bytes, 0);
    assert!(buf.is_empty());
    assert!(!err.stream_desynchronized());
}

#[test]
fn test_encode_marker_write_failure() {
    let codec = bincode_codec();
    let mut writer = FailingWriter::new(0);

    let err = codec.encode(&Sample::A(TypeA { x: 1 }), &mut writer).unwrap_err();

    assert!(matches!(err.error, CodecError::FailedToMarshalMarker(_)));
    assert_eq!(err.bytes, 0);
    assert!(!err.stream_desynchronized());
}

#[test]
fn test_encode_length_write_failure_reports_marker_bytes() {
    let codec = bincode_codec();
    let mut writer = FailingWriter::new(1);

    let err = codec.encode(&Sample::A(TypeA { x: 1 }), &mut writer).unwrap_err();

    assert!(matches!(err.error, CodecError::FailedToMarshalPayloadFrame(_)));
    assert_eq!(err.bytes, 1);
    assert_eq!(writer.written, vec![0]);
    assert!(err.stream_desynchronized());
}

#[test]
fn test_encode_payload_write_failure_counts_partial_payload() {
    let codec = bincode_codec();
    let mut writer = FailingWriter::new(4);

    let err = codec.encode(&Sample::A(TypeA { x: 1 }), &mut writer).unwrap_err();

    assert!(matches!(err.error, CodecError::FailedToMarshalPayloadFrame(_)));
    assert_eq!(err.bytes, 4);
    assert_eq!(writer.written.len(), 4);
}

#[test]
fn test_encode_marshaller_failure_after_marker() {
    let codec: Codec<Sample, Sample, RefusingMarshaller> =
        new_codec(RefusingMarshaller, ab_types(), ab_types()).unwrap();
    let mut buf = Vec::new();

    let err = codec.encode(&Sample::A(TypeA { x: 1 }), &mut buf).unwrap_err();

    assert!(matches!(err.error, CodecError::FailedToMarshalPayload(_)));
    assert_eq!(err.bytes, 1);
    assert_eq!(buf, vec![0]);
    assert!(err.stream_desynchronized());
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_decode_known_marker() {
    let codec = json_codec();
    let payload = serde_json::to_vec(&TypeB { y: "hello".into() }).unwrap();
    let bytes = frame(1, &payload);

    let (value, n) = codec.decode_from_slice(&bytes).unwrap();

    assert_eq!(value, Sample::B(TypeB { y: "hello".into() }));
    assert_eq!(n, 1 + 1 + payload.len());
}

#[test]
fn test_decode_unrecognized_marker_consumes_only_marker() {
    let codec = bincode_codec();
    let data = [99u8, 3, 1, 2, 3];
    let mut reader: &[u8] = &data;

    let err = codec.decode(&mut reader).unwrap_err();

    match err.error {
        CodecError::UnrecognizedMarker(marker) => assert_eq!(marker, Marker(99)),
        other => panic!("Expected UnrecognizedMarker, got {:?}", other),
    }
    assert_eq!(err.bytes, 1);
    assert_eq!(reader.len(), 4);
    assert!(err.stream_desynchronized());
}

#[test]
fn test_decode_marker_read_failure() {
    let codec = bincode_codec();
    let mut reader = FailingReader::new(vec![0, 4, 1, 0, 0, 0], 0);

    let err = codec.decode(&mut reader).unwrap_err();

    assert!(matches!(err.error, CodecError::FailedToUnmarshalMarker(_)));
    assert_eq!(err.bytes, 0);
    assert!(!err.is_clean_eof());
}

#[test]
fn test_decode_empty_stream_is_clean_eof() {
    let codec = bincode_codec();
    let mut reader: &[u8] = &[];

    let err = codec.decode(&mut reader).unwrap_err();

    assert!(err.is_clean_eof());
    assert!(!err.stream_desynchronized());
}

#[test]
fn test_decode_length_read_failure() {
    let codec = bincode_codec();
    let mut reader = FailingReader::new(vec![0, 4, 1, 0, 0, 0], 1);

    let err = codec.decode(&mut reader).unwrap_err();

    assert!(matches!(err.error, CodecError::FailedToUnmarshalPayloadFrame(_)));
    assert_eq!(err.bytes, 1);
    assert_eq!(reader.consumed(), 1);
}

#[test]
fn test_decode_truncated_payload() {
    let codec = bincode_codec();
    let mut bytes = codec.encode_to_vec(&Sample::B(TypeB { y: "truncated".into() })).unwrap();
    bytes.truncate(bytes.len() - 2);

    let err = codec.decode_from_slice(&bytes).unwrap_err();

    match &err.error {
        CodecError::FailedToUnmarshalPayloadFrame(e) => {
            assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof)
        }
        other => panic!("Expected FailedToUnmarshalPayloadFrame, got {:?}", other),
    }
    assert_eq!(err.bytes, bytes.len());
    assert!(!err.is_clean_eof());
}

#[test]
fn test_decode_rejects_oversized_payload_before_reading_it() {
    let codec = json_codec().with_max_payload_len(4);
    let payload = serde_json::to_vec(&TypeB { y: "hello".into() }).unwrap();
    let bytes = frame(1, &payload);
    let mut reader: &[u8] = &bytes;

    let err = codec.decode(&mut reader).unwrap_err();

    match &err.error {
        CodecError::FailedToUnmarshalPayloadFrame(e) => {
            assert_eq!(e.kind(), io::ErrorKind::InvalidData)
        }
        other => panic!("Expected FailedToUnmarshalPayloadFrame, got {:?}", other),
    }
    assert_eq!(err.bytes, 2);
    assert_eq!(reader.len(), payload.len());
}

#[test]
fn test_decode_malformed_payload_keeps_stream_aligned() {
    let codec = json_codec();
    let mut bytes = frame(0, b"xyz");
    bytes.extend(codec.encode_to_vec(&Sample::A(TypeA { x: 7 })).unwrap());
    let mut reader: &[u8] = &bytes;

    let err = codec.decode(&mut reader).unwrap_err();
    assert!(matches!(err.error, CodecError::FailedToUnmarshalPayload(_)));
    assert_eq!(err.bytes, 5);
    assert!(!err.stream_desynchronized());

    let (value, _) = codec.decode(&mut reader).unwrap();
    assert_eq!(value, Sample::A(TypeA { x: 7 }));
}

#[test]
fn test_decode_payload_of_wrong_type() {
    let codec = json_codec();
    let payload = serde_json::to_vec(&TypeB { y: "not an int".into() }).unwrap();

    let err = codec.decode_from_slice(&frame(0, &payload)).unwrap_err();

    assert!(matches!(err.error, CodecError::FailedToUnmarshalPayload(_)));
}

#[test]
fn test_decode_marker_overflowing_u32() {
    let codec = bincode_codec();
    let bytes = [0xff, 0xff, 0xff, 0xff, 0x7f, 0x00];

    let err = codec.decode_from_slice(&bytes).unwrap_err();

    match &err.error {
        CodecError::FailedToUnmarshalMarker(e) => assert_eq!(e.kind(), io::ErrorKind::InvalidData),
        other => panic!("Expected FailedToUnmarshalMarker, got {:?}", other),
    }
    assert_eq!(err.bytes, 5);
}

#[test]
fn test_decode_leaves_trailing_bytes() {
    let codec = bincode_codec();
    let mut bytes = codec.encode_to_vec(&Sample::A(TypeA { x: 3 })).unwrap();
    let frame_len = bytes.len();
    bytes.extend_from_slice(&[0xAA, 0xBB]);

    let (_, n) = codec.decode_from_slice(&bytes).unwrap();

    assert_eq!(n, frame_len);
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

#[test]
fn test_stream_of_frames_roundtrip() {
    let codec = bincode_codec();
    let values = vec![
        Sample::A(TypeA { x: i32::MIN }),
        Sample::B(TypeB { y: String::new() }),
        Sample::B(TypeB { y: "x".repeat(300) }),
        Sample::A(TypeA { x: 0 }),
    ];

    let mut stream = Vec::new();
    let mut sizes = Vec::new();
    for value in &values {
        sizes.push(codec.encode(value, &mut stream).unwrap());
    }
    assert_eq!(sizes.iter().sum::<usize>(), stream.len());

    let mut reader: &[u8] = &stream;
    for (expected, size) in values.iter().zip(&sizes) {
        let (value, n) = codec.decode(&mut reader).unwrap();
        assert_eq!(&value, expected);
        assert_eq!(n, *size);
    }
    assert!(reader.is_empty());
}

#[test]
fn test_long_payload_uses_multi_byte_length() {
    let codec = json_codec();
    let value = Sample::B(TypeB { y: "y".repeat(200) });

    let bytes = codec.encode_to_vec(&value).unwrap();
    // 200 chars plus JSON punctuation needs a two-byte length
    assert_eq!(bytes[1] & 0x80, 0x80);

    let (decoded, n) = codec.decode_from_slice(&bytes).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(n, bytes.len());
}

#[test]
fn test_codec_shared_across_threads() {
    let codec = Arc::new(bincode_codec());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let codec = Arc::clone(&codec);
            thread::spawn(move || {
                for j in 0..100 {
                    let value = if j % 2 == 0 {
                        Sample::A(TypeA { x: i * 1000 + j })
                    } else {
                        Sample::B(TypeB { y: format!("{}-{}", i, j) })
                    };
                    let bytes = codec.encode_to_vec(&value).unwrap();
                    let (decoded, n) = codec.decode_from_slice(&bytes).unwrap();
                    assert_eq!(decoded, value);
                    assert_eq!(n, bytes.len());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

// =============================================================================
// Error Message Tests
// =============================================================================

#[test]
fn test_errors_carry_stable_prefix() {
    let codec = bincode_codec();

    let err = codec.encode_to_vec(&Sample::C(TypeC { z: 1.0 })).unwrap_err();
    assert!(err.error.to_string().starts_with(ERROR_PREFIX));
    assert!(err.to_string().starts_with(ERROR_PREFIX));

    let err = codec.decode_from_slice(&[42]).unwrap_err();
    assert_eq!(err.error.to_string(), "typewire: unrecognized marker: 42");
}

#[test]
fn test_frame_error_display_and_source() {
    use std::error::Error as _;

    let codec = bincode_codec();
    let err = codec.decode_from_slice(&[42]).unwrap_err();

    assert_eq!(err.to_string(), "typewire: unrecognized marker: 42 (after 1 bytes)");
    let source = err.source().expect("frame error wraps the codec error");
    assert_eq!(source.to_string(), err.error.to_string());
}

#[test]
fn test_marshal_error_displays_its_cause() {
    let codec: Codec<Sample, Sample, RefusingMarshaller> =
        new_codec(RefusingMarshaller, ab_types(), ab_types()).unwrap();

    let err = codec.encode_to_vec(&Sample::A(TypeA { x: 1 })).unwrap_err();

    match err.error {
        CodecError::FailedToMarshalPayload(ref cause) => {
            assert_eq!(cause.to_string(), "marshal refused");
        }
        ref other => panic!("unexpected error: {}", other),
    }
    assert_eq!(
        err.error.to_string(),
        "typewire: failed to marshal payload: marshal refused"
    );
}
