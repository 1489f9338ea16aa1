use axum::body::Bytes;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Parse a `{id}` path segment; anything that is not an integer is an unknown drink
pub fn parse_drink_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>().map_err(|_| ApiError::resource_not_found())
}

/// Parse a request body into a JSON object.
///
/// An empty body is an empty object; anything that is not a JSON object is
/// unprocessable.
pub fn parse_json_object(body: &Bytes) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::unprocessable("Request body must be a JSON object")),
        Err(e) => Err(ApiError::unprocessable(format!("Malformed JSON: {}", e))),
    }
}

/// Look up a field, treating an explicit `null` as absent
pub fn present<'a>(body: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    body.get(field).filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_drink_id("42").unwrap(), 42);
        assert_eq!(parse_drink_id("abc").unwrap_err().status_code(), 404);
        assert_eq!(parse_drink_id("99999999999").unwrap_err().status_code(), 404);
    }

    #[test]
    fn empty_body_is_empty_object() {
        assert!(parse_json_object(&Bytes::new()).unwrap().is_empty());
        assert!(parse_json_object(&Bytes::from_static(b"  \n")).unwrap().is_empty());
    }

    #[test]
    fn non_objects_are_unprocessable() {
        for body in ["[1]", "{oops", "\"water\""] {
            let err = parse_json_object(&Bytes::from(body)).unwrap_err();
            assert_eq!(err.status_code(), 422);
        }
    }

    #[test]
    fn null_fields_are_absent() {
        let body = json!({"title": null, "recipe": []});
        let map = body.as_object().unwrap();
        assert!(present(map, "title").is_none());
        assert!(present(map, "recipe").is_some());
        assert!(present(map, "missing").is_none());
    }
}
