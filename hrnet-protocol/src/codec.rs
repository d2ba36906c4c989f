//! Encoder and decoder for documents, envelopes and frames.

use crate::error::ProtocolError;
use crate::frame::Frame;
use crate::message::{Request, Response};
use bytes::BytesMut;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encodes any serializable value as a JSON document.
pub fn to_document<T: Serialize + ?Sized>(value: &T) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(value)?)
}

/// Decodes a JSON document into `T`.
pub fn from_document<T: DeserializeOwned>(document: &str) -> Result<T, ProtocolError> {
    Ok(serde_json::from_str(document)?)
}

/// Encodes requests and responses into frames.
pub struct Encoder;

impl Encoder {
    /// Encodes a request into a frame.
    pub fn encode_request(request: &Request) -> Result<BytesMut, ProtocolError> {
        Frame::from_text(to_document(request)?).encode()
    }

    /// Encodes a response into a frame.
    pub fn encode_response(response: &Response) -> Result<BytesMut, ProtocolError> {
        Frame::from_text(to_document(response)?).encode()
    }
}

/// Decodes the body of `frame` as a request envelope.
pub fn decode_request(frame: &Frame) -> Result<Request, ProtocolError> {
    from_document(frame.as_text()?)
}

/// Decodes the body of `frame` as a response envelope.
pub fn decode_response(frame: &Frame) -> Result<Response, ProtocolError> {
    from_document(frame.as_text()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{ErrorInfo, FieldError, FieldErrors, EMPTY_DOCUMENT};
    use proptest::prelude::*;

    fn text() -> impl Strategy<Value = String> {
        prop_oneof![
            any::<String>(),
            Just(EMPTY_DOCUMENT.to_string()),
            "[\"\\\\{}: a-zé漢\n]{0,32}",
        ]
    }

    fn through_frame_request(request: &Request) -> Request {
        let mut encoded = Encoder::encode_request(request).unwrap();
        let frame = Frame::decode(&mut encoded).unwrap().unwrap();
        assert!(encoded.is_empty());
        decode_request(&frame).unwrap()
    }

    fn through_frame_response(response: &Response) -> Response {
        let mut encoded = Encoder::encode_response(response).unwrap();
        let frame = Frame::decode(&mut encoded).unwrap().unwrap();
        assert!(encoded.is_empty());
        decode_response(&frame).unwrap()
    }

    proptest! {
        #[test]
        fn prop_request_roundtrip(manager in text(), action in text(), payload in text()) {
            let request = Request::with_document(manager.clone(), action.clone(), payload.clone());
            let decoded = through_frame_request(&request);
            prop_assert_eq!(decoded.manager(), manager.as_str());
            prop_assert_eq!(decoded.action(), action.as_str());
            prop_assert_eq!(decoded.payload(), payload.as_str());
            prop_assert_eq!(decoded, request);
        }

        #[test]
        fn prop_response_roundtrip(
            result in text(),
            message in text(),
            field in text(),
            detail in text(),
            with_fields in any::<bool>(),
        ) {
            let ok = Response::ok_with_document(result.clone());
            let decoded = through_frame_response(&ok);
            prop_assert!(decoded.is_success());
            prop_assert_eq!(decoded.result_document(), result.as_str());

            let mut info = ErrorInfo::message(message);
            if with_fields {
                let mut fields = FieldErrors::new();
                fields.insert(field, FieldError::invalid_value(detail));
                info.exceptions = Some(fields);
            }
            let failure = Response::failure(&info);
            let decoded = through_frame_response(&failure);
            prop_assert!(!decoded.is_success());
            prop_assert_eq!(decoded.error_info().unwrap(), Some(info));
            prop_assert_eq!(&decoded, &failure);
        }
    }

    #[test]
    fn test_request_roundtrip_through_frame() {
        let request = Request::with_document(
            "DesignationManager",
            "add",
            r#"{"code":0,"title":"Carpenter"}"#,
        );
        let mut encoded = Encoder::encode_request(&request).unwrap();

        let frame = Frame::decode(&mut encoded).unwrap().unwrap();
        let decoded = decode_request(&frame).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_request_roundtrip_sentinel() {
        let request = Request::new("EmployeeManager", "getall");
        let text = to_document(&request).unwrap();
        let decoded: Request = from_document(&text).unwrap();
        assert_eq!(decoded, request);
        assert_eq!(decoded.payload(), EMPTY_DOCUMENT);
    }

    #[test]
    fn test_response_roundtrip_through_frame() {
        let response = Response::failure(&ErrorInfo::message("Carpenter already exists"));
        let mut encoded = Encoder::encode_response(&response).unwrap();

        let frame = Frame::decode(&mut encoded).unwrap().unwrap();
        let decoded = decode_response(&frame).unwrap();
        assert_eq!(decoded, response);
        assert_eq!(
            decoded.error_info().unwrap().unwrap().message,
            "Carpenter already exists"
        );
    }

    #[test]
    fn test_accepts_pretty_printed_envelope() {
        // Peers may indent their JSON.
        let text = "{\n    \"manager\": \"DesignationManager\",\n    \"action\": \"getall\",\n    \"json_string\": \"{}\"\n}";
        let request: Request = from_document(text).unwrap();
        assert_eq!(request.action(), "getall");
    }

    #[test]
    fn test_malformed_document_is_decode_error() {
        let frame = Frame::from_text(r#"{"manager": "x""#);
        let err = decode_request(&frame).unwrap_err();
        assert!(err.is_decode());

        let frame = Frame::from_text(r#"{"manager": "x", "action": "y"}"#);
        let err = decode_request(&frame).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_invalid_utf8_body() {
        let frame = Frame::new(vec![0xff, 0xfe, 0xfd]);
        assert!(matches!(
            decode_response(&frame),
            Err(ProtocolError::InvalidUtf8)
        ));
    }
}
