use crate::relay::RelayError;
use crate::routes::errors::ErrorStage;
use aide::OperationOutput;
use aide::generate::GenContext;
use aide::openapi::{MediaType, Operation, Response as OpenApiResponse};
use axum::body::{Body, Bytes};
use axum::response::{Html, IntoResponse};
use http::{Response, StatusCode, header};
use indexmap::IndexMap;

/// Every relay failure ends up as a 500 with a plain text explanation
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(stage: ErrorStage, err: RelayError) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: stage.describe(&err),
        }
    }

    pub fn upload(err: RelayError) -> Self {
        Self::new(ErrorStage::Upload, err)
    }

    pub fn result(err: RelayError) -> Self {
        Self::new(ErrorStage::Result, err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.detail,
        )
            .into_response()
    }
}

impl OperationOutput for ApiError {
    type Inner = ();

    fn operation_response(
        _ctx: &mut GenContext,
        _operation: &mut Operation,
    ) -> Option<OpenApiResponse> {
        Some(OpenApiResponse {
            description: "Relay failure, plain text explanation.".to_string(),
            content: IndexMap::from_iter([("text/plain".to_string(), MediaType::default())]),
            ..Default::default()
        })
    }

    fn inferred_responses(
        ctx: &mut GenContext,
        operation: &mut Operation,
    ) -> Vec<(Option<u16>, OpenApiResponse)> {
        Self::operation_response(ctx, operation)
            .map(|resp| vec![(Some(500), resp)])
            .unwrap_or_default()
    }
}

pub struct HtmlPage(pub String);

impl IntoResponse for HtmlPage {
    fn into_response(self) -> axum::response::Response {
        Html(self.0).into_response()
    }
}

impl OperationOutput for HtmlPage {
    type Inner = ();

    fn operation_response(
        _ctx: &mut GenContext,
        _operation: &mut Operation,
    ) -> Option<OpenApiResponse> {
        Some(OpenApiResponse {
            description: "HTML page.".to_string(),
            content: IndexMap::from_iter([("text/html".to_string(), MediaType::default())]),
            ..Default::default()
        })
    }

    fn inferred_responses(
        ctx: &mut GenContext,
        operation: &mut Operation,
    ) -> Vec<(Option<u16>, OpenApiResponse)> {
        Self::operation_response(ctx, operation)
            .map(|resp| vec![(Some(200), resp)])
            .unwrap_or_default()
    }
}

pub struct ImageResponse(pub Response<Body>);

impl ImageResponse {
    pub fn new(data: Bytes, mime_type: &str) -> Self {
        let length = data.len().to_string();
        let response = (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, mime_type.to_string()),
                (header::CONTENT_LENGTH, length),
            ],
            data,
        )
            .into_response();
        ImageResponse(response)
    }
}

impl IntoResponse for ImageResponse {
    fn into_response(self) -> axum::response::Response {
        self.0
    }
}

impl OperationOutput for ImageResponse {
    type Inner = ();

    fn operation_response(
        _ctx: &mut GenContext,
        _operation: &mut Operation,
    ) -> Option<OpenApiResponse> {
        Some(OpenApiResponse {
            description: "Binary image response.".to_string(),
            content: IndexMap::from_iter([(
                "image/*".to_string(),
                MediaType {
                    schema: None,
                    ..Default::default()
                },
            )]),
            ..Default::default()
        })
    }

    fn inferred_responses(
        _ctx: &mut GenContext,
        _operation: &mut Operation,
    ) -> Vec<(Option<u16>, OpenApiResponse)> {
        Vec::new()
    }
}

/// Result poll outcome: the finished image, or a page asking to come back later
pub enum PollResponse {
    Ready(ImageResponse),
    Processing(HtmlPage),
}

impl IntoResponse for PollResponse {
    fn into_response(self) -> axum::response::Response {
        match self {
            PollResponse::Ready(image) => image.into_response(),
            PollResponse::Processing(page) => page.into_response(),
        }
    }
}

impl OperationOutput for PollResponse {
    type Inner = ();

    fn operation_response(
        ctx: &mut GenContext,
        operation: &mut Operation,
    ) -> Option<OpenApiResponse> {
        let mut response = ImageResponse::operation_response(ctx, operation)?;
        if let Some(page) = HtmlPage::operation_response(ctx, operation) {
            response.content.extend(page.content);
        }
        response.description =
            "Generated image when ready, otherwise a still-processing page.".to_string();
        Some(response)
    }

    fn inferred_responses(
        ctx: &mut GenContext,
        operation: &mut Operation,
    ) -> Vec<(Option<u16>, OpenApiResponse)> {
        Self::operation_response(ctx, operation)
            .map(|resp| vec![(Some(200), resp)])
            .unwrap_or_default()
    }
}
