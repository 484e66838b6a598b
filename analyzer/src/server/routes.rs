use crate::server::model::{ErrorReply, PredictReply, StatusReply};
use crate::workflow::runner::Runner;
use bytes::BufMut;
use futures_util::TryStreamExt;
use retinacore::inference::MAX_UPLOAD_BYTES;
use retinacore::interface::upload::media_type_for;
use retinacore::interface::Upload;
use retinacore::prelude::{RetinaError, RetinaResult};
use retinacore::storage::KeyValueStore;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::multipart::FormData;
use warp::reply::{self, Reply, Response};
use warp::Filter;

/// Multipart bodies above this are cut off by warp before the validator sees
/// them; the slack leaves room for oversize files to get a proper answer.
const MAX_FORM_BYTES: u64 = MAX_UPLOAD_BYTES * 4;

fn with_runner<S>(
    runner: Arc<Runner<S>>,
) -> impl Filter<Extract = (Arc<Runner<S>>,), Error = Infallible> + Clone
where
    S: KeyValueStore + Send + 'static,
{
    warp::any().map(move || runner.clone())
}

pub fn routes<S>(
    runner: Arc<Runner<S>>,
) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone
where
    S: KeyValueStore + Send + 'static,
{
    let predict = warp::path!("predict")
        .and(warp::post())
        .and(warp::multipart::form().max_length(MAX_FORM_BYTES))
        .and(with_runner(runner.clone()))
        .and_then(handle_predict::<S>);

    let history = warp::path!("history")
        .and(warp::get())
        .and(with_runner(runner.clone()))
        .map(|runner: Arc<Runner<S>>| reply::json(&runner.history()).into_response());

    let clear = warp::path!("history")
        .and(warp::delete())
        .and(with_runner(runner.clone()))
        .map(|runner: Arc<Runner<S>>| match runner.clear_history() {
            Ok(()) => reply::with_status(reply::reply(), StatusCode::NO_CONTENT).into_response(),
            Err(err) => error_reply(&err),
        });

    let report = warp::path!("history" / String / "report")
        .and(warp::get())
        .and(with_runner(runner.clone()))
        .map(|id: String, runner: Arc<Runner<S>>| match runner.report(&id) {
            Some(report) => reply::with_header(
                report.text,
                "content-disposition",
                format!("attachment; filename=\"{}\"", report.file_name),
            )
            .into_response(),
            None => reply::with_status(
                reply::json(&ErrorReply {
                    error: format!("no history entry {id}"),
                }),
                StatusCode::NOT_FOUND,
            )
            .into_response(),
        });

    let status = warp::path!("status")
        .and(warp::get())
        .and(with_runner(runner))
        .map(|runner: Arc<Runner<S>>| {
            reply::json(&StatusReply {
                busy: runner.is_busy(),
                history_len: runner.history().len(),
                metrics: runner.metrics(),
            })
            .into_response()
        });

    predict.or(history).unify().or(clear).unify().or(report).unify().or(status).unify()
}

async fn handle_predict<S>(
    form: FormData,
    runner: Arc<Runner<S>>,
) -> Result<Response, Infallible>
where
    S: KeyValueStore + Send + 'static,
{
    let upload = match read_upload(form).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return Ok(error_reply(&RetinaError::NoFileSelected)),
        Err(err) => return Ok(error_reply(&err)),
    };
    match runner.analyze(upload).await {
        Ok(entry) => Ok(reply::json(&PredictReply::from(&entry)).into_response()),
        Err(err) => Ok(error_reply(&err)),
    }
}

/// Pulls the `file` field out of a multipart form.
async fn read_upload(form: FormData) -> RetinaResult<Option<Upload>> {
    futures_util::pin_mut!(form);
    while let Some(mut part) = form
        .try_next()
        .await
        .map_err(|err| RetinaError::MalformedRequest(err.to_string()))?
    {
        if part.name() != "file" {
            continue;
        }
        let name = part.filename().unwrap_or_default().to_string();
        if name.is_empty() {
            return Ok(None);
        }
        let media_type = part
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| media_type_for(&name).to_string());
        let mut bytes = Vec::new();
        while let Some(chunk) = part.data().await {
            let chunk = chunk.map_err(|err| RetinaError::MalformedRequest(err.to_string()))?;
            bytes.put(chunk);
        }
        return Ok(Some(Upload::new(name, media_type, bytes)));
    }
    Ok(None)
}

fn status_for(err: &RetinaError) -> StatusCode {
    match err {
        RetinaError::Busy => StatusCode::CONFLICT,
        RetinaError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
        RetinaError::Server { .. }
        | RetinaError::Transport(_)
        | RetinaError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
        err if err.is_validation() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_reply(err: &RetinaError) -> Response {
    reply::with_status(
        reply::json(&ErrorReply {
            error: err.to_string(),
        }),
        status_for(err),
    )
    .into_response()
}
