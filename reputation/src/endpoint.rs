use actix_web::{HttpResponse, Result as ActixResult, get, web};
use log::*;

use crate::engine::ReputationEngine;
use crate::http_error::Error;
use crate::models::{ReputationQuery, ReputationResponse};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(reputation);
}

#[get("/reputation")]
async fn reputation(engine: web::Data<ReputationEngine>, query: web::Query<ReputationQuery>) -> ActixResult<HttpResponse> {
    let url = match query.into_inner().url {
        Some(url) if !url.is_empty() => url,
        _ => {
            debug!("Rejected reputation query without url");
            return Err(Error::MissingUrl.into());
        }
    };

    let result = engine.score(&url).await.map_err(|e| {
        error!("Reputation lookup for {} failed: {}", url, e);
        Error::from(e)
    })?;
    info!("Reputation url={} score={} cached={}", url, result.score, result.cached);

    Ok(HttpResponse::Ok().json(ReputationResponse { url, score: result.score, snippet: result.snippet, cached: result.cached }))
}
