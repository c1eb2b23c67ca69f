use super::{AppState, ApiError, ApiResult};
use crate::core::export::{render_csv, render_xlsx, ExportDocument};
use crate::domain::model::{ProductDetails, ProductDetailsRequest, ResultSet, SearchRequest};
use crate::utils::error::GeoShopError;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "bufferedRows": state.buffer.len().await,
    }))
}

pub async fn list_geolocations(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.search.markets().all()))
}

pub async fn translate(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    let (market, translation) = state.search.translate_request(&request).await?;

    Ok(Json(json!({
        "originalQuery": translation.original_query,
        "translatedQuery": translation.translated_query,
        "targetLanguage": translation.target_language,
        "geolocation": market.code,
    })))
}

pub async fn search_multi_source(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<Json<ResultSet>> {
    let Json(request) = payload?;
    Ok(Json(state.search.search_multi_source(&request).await?))
}

pub async fn search_single_source(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<Json<ResultSet>> {
    let Json(request) = payload?;
    Ok(Json(state.search.search_single_source(&request).await?))
}

pub async fn product_details(
    State(state): State<AppState>,
    payload: Result<Json<ProductDetailsRequest>, JsonRejection>,
) -> ApiResult<Json<ProductDetails>> {
    let Json(request) = payload?;
    Ok(Json(state.search.fetch_product_details(&request).await?))
}

pub async fn save_record(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(record) = payload?;
    let total = state.buffer.append(record).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Product saved for export",
        "totalSaved": total,
    })))
}

pub async fn save_records(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(mut body) = payload?;
    let products = match body.get_mut("products").map(Value::take) {
        Some(Value::Array(products)) => products,
        _ => {
            return Err(ApiError::from(GeoShopError::validation(
                "Field 'products' must be an array",
            )))
        }
    };

    let added = products.len();
    let total = state.buffer.append_many(products).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("{} products saved for export", added),
        "totalSaved": total,
    })))
}

pub async fn export_excel(State(state): State<AppState>) -> ApiResult<Response> {
    let records = state.buffer.snapshot().await;
    let document = render_xlsx(&records, Utc::now())?;
    tracing::info!("📤 Exported {} row(s) to {}", records.len(), document.filename);
    Ok(attachment(document))
}

pub async fn export_csv(State(state): State<AppState>) -> ApiResult<Response> {
    let records = state.buffer.snapshot().await;
    let document = render_csv(&records, Utc::now())?;
    tracing::info!("📤 Exported {} row(s) to {}", records.len(), document.filename);
    Ok(attachment(document))
}

pub async fn buffer_summary(State(state): State<AppState>) -> Json<Value> {
    let data = state.buffer.summary().await;
    Json(json!({
        "count": data.len(),
        "data": data,
    }))
}

pub async fn clear_buffer(State(state): State<AppState>) -> Json<Value> {
    state.buffer.clear().await;
    Json(json!({
        "success": true,
        "message": "All buffered data cleared",
    }))
}

fn attachment(document: ExportDocument) -> Response {
    (
        [
            (header::CONTENT_TYPE, document.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.filename),
            ),
        ],
        document.bytes,
    )
        .into_response()
}
