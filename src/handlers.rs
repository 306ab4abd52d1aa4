use crate::errors::AppError;
use crate::models::{
    CreatedResponse, Habit, HabitId, HabitLogEntry, HabitStatsResponse, LogRangeQuery,
    LogUpdateRequest, NewHabit, StatsQuery, parse_date,
};
use crate::state::AppState;
use crate::stats::{DateView, compute_stats};
use crate::storage::persist_data;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{Local, NaiveDate, Utc};
use tracing::info;

pub async fn list_habits(State(state): State<AppState>) -> Json<Vec<Habit>> {
    let data = state.data.lock().await;
    Json(data.list_habits())
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(payload): Json<NewHabit>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let mut data = state.data.lock().await;
    let id = data.add_habit(payload, Utc::now())?;
    persist_data(&state.data_path, &data).await?;

    info!(habit_id = id, "habit created");
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<HabitId>,
) -> Result<StatusCode, AppError> {
    let mut data = state.data.lock().await;
    data.delete_habit(id)?;
    persist_data(&state.data_path, &data).await?;

    info!(habit_id = id, "habit deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_logs(
    State(state): State<AppState>,
    Path(id): Path<HabitId>,
    Query(query): Query<LogRangeQuery>,
) -> Result<Json<Vec<HabitLogEntry>>, AppError> {
    let start = parse_date(&query.start)?;
    let end = parse_date(&query.end)?;
    let data = state.data.lock().await;
    Ok(Json(data.logs_between(id, start, end)?))
}

pub async fn put_log(
    State(state): State<AppState>,
    Path((id, date)): Path<(HabitId, String)>,
    Json(payload): Json<LogUpdateRequest>,
) -> Result<Json<HabitLogEntry>, AppError> {
    let date = parse_date(&date)?;
    let mut data = state.data.lock().await;
    let entry = data.upsert_log(id, date, payload.completed, payload.notes)?;
    persist_data(&state.data_path, &data).await?;

    Ok(Json(entry))
}

pub async fn get_habit_stats(
    State(state): State<AppState>,
    Path(id): Path<HabitId>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<HabitStatsResponse>, AppError> {
    let StatsWindow { today, start, end } = resolve_window(&query)?;
    let (habit, entries) = {
        let data = state.data.lock().await;
        (data.habit(id)?.clone(), data.logs_between(id, start, end)?)
    };

    Ok(Json(to_response(&habit, &entries, start, end, today)))
}

pub async fn get_all_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Vec<HabitStatsResponse>>, AppError> {
    let StatsWindow { today, start, end } = resolve_window(&query)?;
    let snapshots = {
        let data = state.data.lock().await;
        data.list_habits()
            .into_iter()
            .map(|habit| {
                let entries = data.logs_between(habit.id, start, end)?;
                Ok::<_, AppError>((habit, entries))
            })
            .collect::<Result<Vec<_>, AppError>>()?
    };

    Ok(Json(
        snapshots
            .iter()
            .map(|(habit, entries)| to_response(habit, entries, start, end, today))
            .collect(),
    ))
}

struct StatsWindow {
    today: NaiveDate,
    start: NaiveDate,
    end: NaiveDate,
}

fn resolve_window(query: &StatsQuery) -> Result<StatsWindow, AppError> {
    let view = match query.view.as_deref() {
        Some(raw) => raw.parse::<DateView>().map_err(AppError::bad_request)?,
        None => DateView::default(),
    };
    let today = match query.today.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => Local::now().date_naive(),
    };
    let (start, end) = view
        .range(today)
        .ok_or_else(|| AppError::bad_request(format!("date {today} is out of range")))?;
    Ok(StatsWindow { today, start, end })
}

fn to_response(
    habit: &Habit,
    entries: &[HabitLogEntry],
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> HabitStatsResponse {
    HabitStatsResponse {
        habit_id: habit.id,
        name: habit.name.clone(),
        frequency: habit.frequency.label().to_string(),
        start_date: start.to_string(),
        end_date: end.to_string(),
        stats: compute_stats(entries, today),
    }
}
