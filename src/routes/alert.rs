//! Entity alert headers consumed by the client-side notification UI.

use actix_web::HttpResponseBuilder;

pub const ALERT_HEADER: &str = "X-issuetrack-alert";
pub const PARAMS_HEADER: &str = "X-issuetrack-params";
pub const ERROR_HEADER: &str = "X-issuetrack-error";

pub fn entity_created(res: &mut HttpResponseBuilder, entity: &str, id: &str) {
    apply(res, format!("issuetrack.{}.created", entity), id);
}

pub fn entity_updated(res: &mut HttpResponseBuilder, entity: &str, id: &str) {
    apply(res, format!("issuetrack.{}.updated", entity), id);
}

pub fn entity_deleted(res: &mut HttpResponseBuilder, entity: &str, id: &str) {
    apply(res, format!("issuetrack.{}.deleted", entity), id);
}

fn apply(res: &mut HttpResponseBuilder, message: String, param: &str) {
    res.insert_header((ALERT_HEADER, message));
    res.insert_header((PARAMS_HEADER, param.to_string()));
}
