use axum::{
    extract::State,
    response::{Html, Response},
};

use crate::{error::AppResult, flash::IncomingFlash, render, stats, Data};

#[tracing::instrument(skip_all)]
pub async fn dashboard(State(data): State<Data>, flash: IncomingFlash) -> AppResult<Response> {
    let stats = stats::dashboard(&data.db).await?;

    Ok(flash.consume(Html(render::dashboard_page(&stats, flash.message()))))
}
