use axum::Json;
use serde::Serialize;

#[derive(Serialize, Debug)]
pub(crate) struct ErrorPayload<'a, D: Serialize> {
    code: &'a str,
    message: &'a str,
    data: D,
}

#[derive(Serialize, Debug)]
pub(crate) struct EmptyData {}

pub(crate) fn error_payload<'a>(code: &'a str, message: &'a str) -> Json<ErrorPayload<'a, EmptyData>> {
    Json(ErrorPayload { code, message, data: EmptyData {} })
}
