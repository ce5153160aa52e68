use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    response::{Html, Response},
    Form, Json,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    flash::{redirect_with, Flash, IncomingFlash},
    models::quotes::{VoteAction, VoteTally},
    quotes::{self, QuoteOrder},
    render, sources,
    validation::QuoteForm,
    Data,
};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VoteForm {
    pub action: String,
}

#[tracing::instrument(skip_all)]
pub async fn random_quote(State(data): State<Data>, flash: IncomingFlash) -> AppResult<Response> {
    let mut rng = StdRng::from_entropy();

    let quote = quotes::random_quote(&data.db, &mut rng).await?;
    let sources = sources::list_available(&data.db).await?;

    let page = render::random_quote_page(quote.as_ref(), &sources, flash.message());
    Ok(flash.consume(Html(page)))
}

#[tracing::instrument(skip(data, flash))]
pub async fn popular_quotes(
    State(data): State<Data>,
    Query(query): Query<PageQuery>,
    flash: IncomingFlash,
) -> AppResult<Response> {
    let (page, quotes) =
        quotes::list_page(&data.db, QuoteOrder::Popular, query.page.as_deref()).await?;

    let html = render::quote_list_page("Popular quotes", "/popular", &page, &quotes, flash.message());
    Ok(flash.consume(Html(html)))
}

#[tracing::instrument(skip(data, flash))]
pub async fn all_quotes(
    State(data): State<Data>,
    Query(query): Query<PageQuery>,
    flash: IncomingFlash,
) -> AppResult<Response> {
    let (page, quotes) =
        quotes::list_page(&data.db, QuoteOrder::Newest, query.page.as_deref()).await?;

    let html = render::quote_list_page("All quotes", "/quotes", &page, &quotes, flash.message());
    Ok(flash.consume(Html(html)))
}

/// ids that are not numbers cannot name a quote, so they are treated the same
/// as unknown ids. a body without a usable `action` only reports the counters.
#[tracing::instrument(skip(data, form))]
pub async fn vote(
    State(data): State<Data>,
    Path(id): Path<String>,
    form: Result<Form<VoteForm>, FormRejection>,
) -> AppResult<Json<VoteTally>> {
    let id: i64 = id.parse().map_err(|_| AppError::NotFound)?;

    let action = match form {
        Ok(Form(form)) => VoteAction::parse(&form.action),
        Err(e) => {
            tracing::debug!(err = %e, "vote without a readable form body");
            None
        }
    };

    let tally = quotes::vote(&data.db, id, action).await?;
    Ok(Json(tally))
}

#[tracing::instrument(skip_all)]
pub async fn add_quote(
    State(data): State<Data>,
    form: Result<Form<QuoteForm>, FormRejection>,
) -> AppResult<Response> {
    let Form(form) = match form {
        Ok(form) => form,
        Err(e) => {
            tracing::info!(err = %e, "unreadable quote form");
            return Ok(redirect_with(
                "/",
                Flash::error("Could not add quote: the form could not be read."),
            ));
        }
    };

    let new_quote = match form.validate() {
        Ok(new_quote) => new_quote,
        Err(e) => {
            tracing::info!(err = %e, "rejected quote form");
            return Ok(redirect_with("/", Flash::error(format!("Could not add quote: {e}."))));
        }
    };

    match quotes::create_quote(&data.db, new_quote).await {
        Ok(_) => Ok(redirect_with("/", Flash::success("Quote added successfully!"))),
        Err(AppError::Validation(e)) => {
            Ok(redirect_with("/", Flash::error(format!("Could not add quote: {e}."))))
        }
        Err(e) => Err(e),
    }
}
