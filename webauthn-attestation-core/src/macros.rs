// Accessors for the loosely typed values of an attestation statement. The
// second argument names the statement field, and is reported when the value
// has an unexpected type.

macro_rules! cbor_try_map {
    (
        $v:expr
    ) => {{
        match $v {
            serde_cbor_2::Value::Map(m) => Ok(m),
            _ => Err(WebauthnError::AttestationStatementMapInvalid),
        }
    }};
}

macro_rules! cbor_try_array {
    (
        $v:expr, $field:expr
    ) => {{
        match $v {
            serde_cbor_2::Value::Array(m) => Ok(m),
            _ => Err(WebauthnError::AttestationStatementFieldInvalid($field)),
        }
    }};
}

macro_rules! cbor_try_bytes {
    (
        $v:expr, $field:expr
    ) => {{
        match $v {
            serde_cbor_2::Value::Bytes(m) => Ok(m),
            _ => Err(WebauthnError::AttestationStatementFieldInvalid($field)),
        }
    }};
}

macro_rules! cbor_try_i128 {
    (
        $v:expr, $field:expr
    ) => {{
        match $v {
            serde_cbor_2::Value::Integer(m) => Ok(*m),
            _ => Err(WebauthnError::AttestationStatementFieldInvalid($field)),
        }
    }};
}
