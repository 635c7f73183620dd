use crate::backend::{booking_not_found, member_not_found, BookingBackend};
use crate::delivery_areas::{
    delivery_day_for_area, is_known_course, Course, DeliveryRoute, COURSES, DELIVERY_ROUTES,
};
use crate::error::Error;
use crate::identity::{bearer_token, IdentityVerifier, Profile};
use crate::types::{Booking, BookingChange, Member, MemberUpdate, MemberView, PointEntry, SlotView};
use crate::validation::{first_message, parse_calendar_date, TIME_LABEL};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, Request, State};
use axum::http::{header, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, put, MethodRouter};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct AppState<T: BookingBackend> {
    pub backend: T,
    pub identity: Arc<dyn IdentityVerifier>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SlotQuery {
    date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateBookingRequest {
    #[validate(required(message = "date and timeSlot are required"))]
    date: Option<String>,
    #[validate(
        required(message = "date and timeSlot are required"),
        regex(path = *TIME_LABEL, message = "timeSlot must look like HH:MM")
    )]
    time_slot: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct UpdateBookingRequest {
    date: Option<String>,
    #[validate(regex(path = *TIME_LABEL, message = "timeSlot must look like HH:MM"))]
    time_slot: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct UpdateMemberRequest {
    #[validate(length(min = 1, max = 100, message = "displayName must be 1 to 100 characters"))]
    display_name: Option<String>,
    #[validate(url(message = "pictureUrl must be a URL"))]
    picture_url: Option<String>,
    area: Option<String>,
    courses: Option<Vec<String>>,
}

pub fn create_app<T: BookingBackend>(backend: T, identity: Arc<dyn IdentityVerifier>) -> Router {
    let state = AppState { backend, identity };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let authenticated = Router::new()
        .route("/slots", with_fallback(get(get_slots::<T>)))
        .route(
            "/bookings",
            with_fallback(get(list_bookings::<T>).post(create_booking::<T>)),
        )
        .route(
            "/bookings/:id",
            with_fallback(put(update_booking::<T>).delete(cancel_booking::<T>)),
        )
        .route(
            "/users/me",
            with_fallback(get(get_member::<T>).put(update_member::<T>)),
        )
        .route("/users/me/points", with_fallback(get(get_point_history::<T>)))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate::<T>,
        ));

    let public = Router::new()
        .route("/delivery-areas", with_fallback(get(get_delivery_areas)))
        .route("/courses", with_fallback(get(get_courses)));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn with_fallback<S: Clone + Send + Sync + 'static>(route: MethodRouter<S>) -> MethodRouter<S> {
    route.options(preflight).fallback(method_not_allowed)
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}

async fn not_found() -> Error {
    Error::NotFound("Not found".into())
}

async fn authenticate<T: BookingBackend>(
    State(state): State<AppState<T>>,
    mut request: Request,
    next: Next,
) -> Result<Response, Error> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let profile = state.identity.verify(bearer_token(authorization)).await?;
    debug!(user_id = %profile.user_id, "Authenticated request");

    request.extensions_mut().insert(profile);
    Ok(next.run(request).await)
}

/// Runs a blocking backend call off the async workers.
async fn run_backend<R, F>(call: F) -> Result<R, Error>
where
    R: Send + 'static,
    F: FnOnce() -> Result<R, Error> + Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|err| Error::Infrastructure(format!("Backend task failed: {err}")))?
}

async fn require_member<T: BookingBackend>(backend: &T, profile: &Profile) -> Result<Member, Error> {
    let backend = backend.clone();
    let line_user_id = profile.user_id.clone();
    run_backend(move || backend.find_member(&line_user_id))
        .await?
        .ok_or_else(member_not_found)
}

fn parse_json<R>(payload: Result<Json<R>, JsonRejection>) -> Result<R, Error> {
    payload
        .map(|Json(request)| request)
        .map_err(|rejection| Error::Validation(rejection.body_text()))
}

fn parse_booking_id(id: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, Error> {
    id.map(|Path(id)| id).map_err(|_| booking_not_found())
}

async fn get_slots<T: BookingBackend>(
    State(state): State<AppState<T>>,
    Extension(_profile): Extension<Profile>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Vec<SlotView>>, Error> {
    let date = query
        .date
        .as_deref()
        .filter(|date| !date.trim().is_empty())
        .ok_or_else(|| Error::Validation("date is required".into()))?;
    let date = parse_calendar_date(date)?;

    let backend = state.backend.clone();
    let slots = run_backend(move || backend.provision_slots(date)).await?;
    Ok(Json(slots.iter().map(SlotView::from).collect()))
}

async fn list_bookings<T: BookingBackend>(
    State(state): State<AppState<T>>,
    Extension(profile): Extension<Profile>,
) -> Result<Json<Vec<Booking>>, Error> {
    let member = require_member(&state.backend, &profile).await?;
    let backend = state.backend.clone();
    let bookings = run_backend(move || backend.bookings_for_user(member.id)).await?;
    Ok(Json(bookings))
}

async fn create_booking<T: BookingBackend>(
    State(state): State<AppState<T>>,
    Extension(profile): Extension<Profile>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>), Error> {
    let request = parse_json(payload)?;
    request.validate().map_err(|errors| first_message(&errors))?;
    let (Some(date), Some(time_slot)) = (request.date, request.time_slot) else {
        return Err(Error::Validation("date and timeSlot are required".into()));
    };
    let date = parse_calendar_date(&date)?;

    let member = require_member(&state.backend, &profile).await?;
    let backend = state.backend.clone();
    let booking = run_backend(move || backend.create_booking(member.id, date, &time_slot)).await?;

    info!(booking_id = %booking.id, %date, time_slot = %booking.time_slot, "Booking created");
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn update_booking<T: BookingBackend>(
    State(state): State<AppState<T>>,
    Extension(profile): Extension<Profile>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateBookingRequest>, JsonRejection>,
) -> Result<Json<Booking>, Error> {
    let booking_id = parse_booking_id(id)?;
    let request = parse_json(payload)?;
    request.validate().map_err(|errors| first_message(&errors))?;
    let change = BookingChange {
        date: request
            .date
            .as_deref()
            .map(parse_calendar_date)
            .transpose()?,
        time_slot: request.time_slot,
    };

    let member = require_member(&state.backend, &profile).await?;
    let backend = state.backend.clone();
    let booking = run_backend(move || backend.update_booking(member.id, booking_id, change)).await?;

    info!(%booking_id, date = %booking.date, time_slot = %booking.time_slot, "Booking updated");
    Ok(Json(booking))
}

async fn cancel_booking<T: BookingBackend>(
    State(state): State<AppState<T>>,
    Extension(profile): Extension<Profile>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, Error> {
    let booking_id = parse_booking_id(id)?;
    let member = require_member(&state.backend, &profile).await?;
    let backend = state.backend.clone();
    run_backend(move || backend.cancel_booking(member.id, booking_id)).await?;

    info!(%booking_id, "Booking cancelled");
    Ok(StatusCode::NO_CONTENT)
}

async fn get_member<T: BookingBackend>(
    State(state): State<AppState<T>>,
    Extension(profile): Extension<Profile>,
) -> Result<Json<MemberView>, Error> {
    let backend = state.backend.clone();
    let member = run_backend(move || backend.register_member(&profile)).await?;
    Ok(Json(member.into()))
}

async fn update_member<T: BookingBackend>(
    State(state): State<AppState<T>>,
    Extension(profile): Extension<Profile>,
    payload: Result<Json<UpdateMemberRequest>, JsonRejection>,
) -> Result<Json<MemberView>, Error> {
    let request = parse_json(payload)?;
    request.validate().map_err(|errors| first_message(&errors))?;
    if let Some(area) = &request.area {
        if delivery_day_for_area(area).is_none() {
            return Err(Error::Validation(format!("Unknown delivery area '{area}'")));
        }
    }
    let courses = request.courses.map(distinct_courses).transpose()?;

    let update = MemberUpdate {
        display_name: request.display_name,
        picture_url: request.picture_url,
        area: request.area,
        courses,
    };
    let backend = state.backend.clone();
    let member = run_backend(move || backend.update_member(&profile.user_id, update)).await?;
    Ok(Json(member.into()))
}

/// Rejects unknown course ids and drops repeats, keeping the first occurrence.
fn distinct_courses(courses: Vec<String>) -> Result<Vec<String>, Error> {
    let mut distinct: Vec<String> = Vec::with_capacity(courses.len());
    for course in courses {
        if !is_known_course(&course) {
            return Err(Error::Validation(format!("Unknown course '{course}'")));
        }
        if !distinct.contains(&course) {
            distinct.push(course);
        }
    }
    Ok(distinct)
}

async fn get_point_history<T: BookingBackend>(
    State(state): State<AppState<T>>,
    Extension(profile): Extension<Profile>,
) -> Result<Json<Vec<PointEntry>>, Error> {
    let member = require_member(&state.backend, &profile).await?;
    let backend = state.backend.clone();
    let history = run_backend(move || backend.point_history(member.id)).await?;
    Ok(Json(history))
}

async fn get_delivery_areas() -> Json<&'static [DeliveryRoute]> {
    Json(&DELIVERY_ROUTES)
}

async fn get_courses() -> Json<&'static [Course]> {
    Json(&COURSES)
}
