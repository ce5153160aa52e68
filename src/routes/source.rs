use axum::{
    extract::{rejection::FormRejection, State},
    response::Response,
    Form,
};

use crate::{
    error::{AppError, AppResult},
    flash::{redirect_with, Flash},
    sources,
    validation::{SourceForm, ValidationError},
    Data,
};

fn rejection(e: &ValidationError) -> Flash {
    match e {
        ValidationError::DuplicateTitle => Flash::error("A source with this title already exists!"),
        other => Flash::error(format!("Could not add source: {other}.")),
    }
}

#[tracing::instrument(skip_all)]
pub async fn add_source(
    State(data): State<Data>,
    form: Result<Form<SourceForm>, FormRejection>,
) -> AppResult<Response> {
    let Form(form) = match form {
        Ok(form) => form,
        Err(e) => {
            tracing::info!(err = %e, "unreadable source form");
            return Ok(redirect_with(
                "/",
                Flash::error("Could not add source: the form could not be read."),
            ));
        }
    };

    let new_source = match form.validate() {
        Ok(new_source) => new_source,
        Err(e) => {
            tracing::info!(err = %e, "rejected source form");
            return Ok(redirect_with("/", rejection(&e)));
        }
    };

    match sources::create_source(&data.db, new_source).await {
        Ok(_) => Ok(redirect_with("/", Flash::success("Source added successfully!"))),
        Err(AppError::Validation(e)) => Ok(redirect_with("/", rejection(&e))),
        Err(e) => Err(e),
    }
}
