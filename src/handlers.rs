use crate::errors::AppError;
use crate::id::HabitId;
use crate::models::{CheckRequest, GoalRequest, LengthRequest, MonthView, NameRequest, TitleRequest};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use tracing::warn;

pub async fn get_month(State(state): State<AppState>) -> Json<MonthView> {
    Json(state.current().await)
}

pub async fn add_habit(
    State(state): State<AppState>,
    Json(payload): Json<NameRequest>,
) -> Json<MonthView> {
    Json(state.apply(|store| store.add_habit(&payload.name)).await)
}

pub async fn rename_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<NameRequest>,
) -> Json<MonthView> {
    let id = HabitId::new(id);
    Json(state.apply(|store| store.rename_habit(&id, &payload.name)).await)
}

pub async fn delete_habit(State(state): State<AppState>, Path(id): Path<String>) -> Json<MonthView> {
    let id = HabitId::new(id);
    Json(state.apply(|store| store.delete_habit(&id)).await)
}

pub async fn set_check(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CheckRequest>,
) -> Json<MonthView> {
    let id = HabitId::new(id);
    Json(
        state
            .apply(|store| match usize::try_from(payload.day) {
                Ok(day) => store.set_check(&id, day, payload.value),
                Err(_) => false,
            })
            .await,
    )
}

pub async fn set_goal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<GoalRequest>,
) -> Json<MonthView> {
    let id = HabitId::new(id);
    Json(state.apply(|store| store.set_goal(&id, payload.goal)).await)
}

pub async fn rename_month(
    State(state): State<AppState>,
    Json(payload): Json<TitleRequest>,
) -> Json<MonthView> {
    Json(state.apply(|store| store.rename_month(&payload.title)).await)
}

pub async fn set_month_length(
    State(state): State<AppState>,
    Json(payload): Json<LengthRequest>,
) -> Json<MonthView> {
    Json(
        state
            .apply(|store| match u32::try_from(payload.length) {
                Ok(length) => store.set_month_length(length),
                Err(_) => false,
            })
            .await,
    )
}

pub async fn clear_checks(State(state): State<AppState>) -> Json<MonthView> {
    Json(state.apply(|store| store.clear_all_checks()).await)
}

pub async fn reset_all(State(state): State<AppState>) -> Json<MonthView> {
    Json(state.reset_all().await)
}

pub async fn save(State(state): State<AppState>) -> Result<Json<MonthView>, AppError> {
    let view = state.save_now().await.map_err(|err| {
        warn!("manual save failed: {err}");
        AppError::from(err)
    })?;
    Ok(Json(view))
}

pub async fn reload(State(state): State<AppState>) -> Result<Json<MonthView>, AppError> {
    if let Err(err) = state.load_remote().await {
        warn!("reload failed: {err}");
        return Err(err.into());
    }
    Ok(Json(state.current().await))
}
