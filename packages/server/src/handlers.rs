//! HTTP handler functions for the sinkhole map API.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use sinkhole_map_backend::{
    BackendError, PointFeaturesQuery, PredictPointRequest, parse_predict_point,
};
use sinkhole_map_server_models::{
    ApiDeleted, ApiError, ApiHealth, ApiSurveyPoint, DEFAULT_FEATURE_MONTHS, GetFeatureParams,
    LatLonParams, PointFeaturesBody, PredictRandomPointBody, RiskCirclesParams,
};
use sinkhole_map_spatial::GeoPoint;
use sinkhole_map_spatial::layer::{self, LayerOptions, PointSource, RiskPoint};
use sinkhole_map_survey::StorageError;

use crate::AppState;

/// Maps a backend failure onto the response the frontend expects.
fn backend_error(context: &str, e: BackendError) -> HttpResponse {
    match e {
        BackendError::Upstream { status, body } => {
            log::warn!("{context}: backend returned {status}");
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            HttpResponse::build(status).json(ApiError::with_detail("Backend error", body))
        }
        BackendError::Http(e) => {
            log::error!("{context}: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Cannot connect to backend"))
        }
        BackendError::Json(e) => {
            log::error!("{context}: {e}");
            HttpResponse::InternalServerError()
                .json(ApiError::with_detail("Invalid backend response", e.to_string()))
        }
    }
}

fn storage_error(e: &StorageError) -> HttpResponse {
    log::error!("Survey storage failure: {e}");
    HttpResponse::InternalServerError().json(ApiError::new("Survey storage error"))
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiError::new(message))
}

/// Validates a coordinate pair, answering 400 when out of range.
fn location(lat: f64, lon: f64) -> Result<GeoPoint, HttpResponse> {
    GeoPoint::try_new(lon, lat).map_err(|e| bad_request(&e.to_string()))
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /api/predicted-point`
///
/// Returns the latest area scan as `{file, geojson}`.
pub async fn predicted_point(state: web::Data<AppState>) -> HttpResponse {
    match state.backend.latest_geojson().await {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => backend_error("predicted-point", e),
    }
}

/// `GET /api/predict`
///
/// Returns the latest cached scan in tabular form.
pub async fn predict(state: web::Data<AppState>) -> HttpResponse {
    match state.backend.latest_map().await {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => backend_error("predict", e),
    }
}

async fn forward_point_features(state: &AppState, params: &PointFeaturesBody) -> HttpResponse {
    let (Some(lat), Some(lon), Some(end_date)) = (params.lat, params.lon, params.end_date.clone())
    else {
        return bad_request("lat, lon, end_date are required");
    };

    let query = PointFeaturesQuery {
        lat,
        lon,
        end_date,
        months: params.months.unwrap_or(DEFAULT_FEATURE_MONTHS),
    };

    match state.backend.point_features(&query).await {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => backend_error("point-features", e),
    }
}

/// `POST /api/point-features`
///
/// Body `{lat, lon, end_date, months}`; returns the feature time series.
pub async fn point_features(
    state: web::Data<AppState>,
    body: web::Json<PointFeaturesBody>,
) -> HttpResponse {
    forward_point_features(&state, &body).await
}

/// `GET /api/get-feature?lat=&lon=&end_date=&months=`
pub async fn get_feature(
    state: web::Data<AppState>,
    params: web::Query<GetFeatureParams>,
) -> HttpResponse {
    forward_point_features(&state, &params).await
}

/// `GET /api/latest-features-geojson?lat=&lon=`
///
/// Features of the nearest point in the latest scan.
pub async fn latest_features_geojson(
    state: web::Data<AppState>,
    params: web::Query<LatLonParams>,
) -> HttpResponse {
    let (Some(lat), Some(lon)) = (params.lat, params.lon) else {
        return bad_request("lat and lon are required");
    };

    match state.backend.point_features_from_scan(lat, lon).await {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => backend_error("latest-features-geojson", e),
    }
}

/// `POST /api/predict-random-point`
///
/// Requests an on-demand prediction and records it as a self-survey
/// point. The backend response is returned unchanged; a failure to record
/// it is logged but does not fail the request.
pub async fn predict_random_point(
    state: web::Data<AppState>,
    body: web::Json<PredictRandomPointBody>,
) -> HttpResponse {
    let (Some(lat), Some(lon), Some(date)) = (body.lat, body.lon, body.date.clone()) else {
        return bad_request("lat, lon, date are required");
    };
    if date.is_empty() {
        return bad_request("lat, lon, date are required");
    }

    let request = PredictPointRequest { lat, lon, date };
    let data = match state.backend.predict_point(&request).await {
        Ok(data) => data,
        Err(e) => return backend_error("predict-random-point", e),
    };

    match parse_predict_point(&data) {
        Ok(prediction) => {
            let props = &prediction.feature.properties;
            match GeoPoint::try_new(props.lon, props.lat) {
                Ok(point) => {
                    if let Err(e) = state.survey().add(point, props.risk) {
                        log::error!("Failed to record survey point: {e}");
                    }
                }
                Err(e) => log::warn!("Prediction not recorded, bad location: {e}"),
            }
        }
        Err(e) => log::warn!("Prediction not recorded, unexpected shape: {e}"),
    }

    HttpResponse::Ok().json(data)
}

/// `GET /api/survey-points[?lat=&lon=]`
///
/// Lists live self-survey points, or only those at an exact location.
pub async fn survey_points(
    state: web::Data<AppState>,
    params: web::Query<LatLonParams>,
) -> HttpResponse {
    let result = match (params.lat, params.lon) {
        (None, None) => state.survey().list_all(),
        (Some(lat), Some(lon)) => match location(lat, lon) {
            Ok(location) => state.survey().find_by_location(location),
            Err(resp) => return resp,
        },
        _ => return bad_request("lat and lon must be given together"),
    };

    match result {
        Ok(points) => {
            let api: Vec<ApiSurveyPoint> = points
                .iter()
                .map(|p| ApiSurveyPoint::from_point(p, state.breakpoints))
                .collect();
            HttpResponse::Ok().json(api)
        }
        Err(e) => storage_error(&e),
    }
}

/// `DELETE /api/survey-points?lat=&lon=`
///
/// Deletes every self-survey point at exactly this location.
pub async fn delete_survey_points(
    state: web::Data<AppState>,
    params: web::Query<LatLonParams>,
) -> HttpResponse {
    let (Some(lat), Some(lon)) = (params.lat, params.lon) else {
        return bad_request("lat and lon are required");
    };
    let location = match location(lat, lon) {
        Ok(location) => location,
        Err(resp) => return resp,
    };

    match state.survey().delete_by_location(location) {
        Ok(removed) => HttpResponse::Ok().json(ApiDeleted { removed }),
        Err(e) => storage_error(&e),
    }
}

/// `GET /api/risk-circles[?radiusKm=&segments=]`
///
/// Merges the latest backend predictions with live self-survey points and
/// returns the circle layer as a GeoJSON `FeatureCollection`.
pub async fn risk_circles(
    state: web::Data<AppState>,
    params: web::Query<RiskCirclesParams>,
) -> HttpResponse {
    let data = match state.backend.latest_geojson().await {
        Ok(data) => data,
        Err(e) => return backend_error("risk-circles", e),
    };

    let server_points = match serde_json::from_value::<geojson::GeoJson>(data["geojson"].clone()) {
        Ok(geojson) => layer::risk_points_from_geojson(&geojson, PointSource::Server),
        Err(e) => {
            log::error!("risk-circles: backend GeoJSON unreadable: {e}");
            return HttpResponse::InternalServerError()
                .json(ApiError::with_detail("Invalid backend response", e.to_string()));
        }
    };

    let survey = match state.survey().list_all() {
        Ok(points) => points,
        Err(e) => return storage_error(&e),
    };

    let points: Vec<RiskPoint> = survey
        .iter()
        .map(|p| RiskPoint {
            location: p.location,
            risk: p.risk,
            source: PointSource::LocalStorage,
        })
        .chain(server_points)
        .collect();

    let defaults = LayerOptions {
        breakpoints: state.breakpoints,
        ..LayerOptions::default()
    };
    let options = LayerOptions {
        radius_km: params.radius_km.unwrap_or(defaults.radius_km),
        segments: params.segments.unwrap_or(defaults.segments),
        ..defaults
    };

    match layer::build_circle_layer(&points, &options) {
        Ok(collection) => HttpResponse::Ok().json(collection),
        Err(e) => bad_request(&e.to_string()),
    }
}
