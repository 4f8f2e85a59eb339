#![allow(missing_docs)]

mod common;

use std::io::{BufReader, Read};

use common::{Encoder, init_logging};
use hessian2json::{
    ObjectInput,
    routing::{CallMetadata, ResponseFlag, Route, route},
};
use serde_json::json;

fn generic_consumer() -> CallMetadata {
    CallMetadata::from_parameters([("generic", "true"), ("side", "consumer")])
}

fn response_with_attachments() -> Vec<u8> {
    Encoder::new()
        .int(4)
        .map()
        .string("code")
        .int(200)
        .string("items")
        .list()
        .string("x")
        .null()
        .end()
        .end()
        .map()
        .string("traceId")
        .string("abc-123")
        .string("timeout")
        .int(3000)
        .end()
        .finish()
}

#[test]
fn routed_response_reads_as_json() {
    init_logging();
    let bytes = response_with_attachments();
    let mut reader = BufReader::new(&bytes[..]);
    assert_eq!(route(&generic_consumer(), &mut reader).unwrap(), Route::Json);

    let mut input = ObjectInput::new(reader);
    let response = input.read_response().unwrap();
    assert_eq!(response.flag, ResponseFlag::ValueWithAttachments);
    assert_eq!(response.value, r#"{"code":200,"items":["x",null]}"#);
    assert_eq!(
        serde_json::Value::Object(response.attachments.unwrap()),
        json!({"traceId": "abc-123", "timeout": 3000})
    );

    let mut rest = Vec::new();
    input.into_inner().read_to_end(&mut rest).unwrap();
    assert!(rest.is_empty());
}

#[test]
fn exception_responses_stay_conventional() {
    let bytes = Encoder::new().int(0).map().end().finish();
    let mut reader = BufReader::new(&bytes[..]);
    assert_eq!(
        route(&generic_consumer(), &mut reader).unwrap(),
        Route::Conventional
    );
}

#[test]
fn field_by_field_reads() {
    let bytes = Encoder::new()
        .int(1)
        .map()
        .string("ok")
        .bool(true)
        .end()
        .map()
        .end()
        .finish();
    let mut input = ObjectInput::new(&bytes[..]);
    let flag = input.transcoder_mut().read_byte().unwrap();
    assert_eq!(ResponseFlag::from_code(i32::from(flag)), Some(ResponseFlag::Value));
    assert_eq!(input.read_object().unwrap(), r#"{"ok":true}"#);
    assert!(input.read_attachments().unwrap().is_empty());
}

#[test]
fn faulted_input_rejects_further_reads() {
    let bytes = Encoder::new()
        .int(1)
        .map()
        .string("blob")
        .raw(&[0x23, 1, 2, 3])
        .end()
        .finish();
    let mut input = ObjectInput::new(&bytes[..]);
    let err = input.read_response().unwrap_err();
    assert_eq!(err.expected(), Some("value"));
    assert_eq!(err.partial_json(), Some(r#"{"blob":"#));
    assert!(matches!(
        input.read_object(),
        Err(hessian2json::DecodeError::Faulted)
    ));
}
