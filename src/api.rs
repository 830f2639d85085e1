use rocket::{http::Status, serde::json::Json, Catcher, Request, Route};

use crate::error::ErrorBody;

pub mod auth;
pub mod candidate;
pub mod captcha;
mod common;
pub mod election;
pub mod voting;

pub fn routes() -> Vec<Route> {
    let mut routes = routes![index];
    routes.extend(captcha::routes());
    routes.extend(election::routes());
    routes.extend(auth::routes());
    routes.extend(candidate::routes());
    routes.extend(voting::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

#[get("/")]
fn index() -> &'static str {
    "Smart Voting Backend Running"
}

/// Render anything that never reached a handler with the usual error body.
#[catch(default)]
fn default_catcher(status: Status, _req: &Request) -> (Status, Json<ErrorBody>) {
    let message = match status.code {
        404 => "Not found",
        500..=599 => "Internal server error",
        _ => status.reason().unwrap_or("Request failed"),
    };
    (status, Json(ErrorBody::new(message)))
}

#[cfg(test)]
mod tests {
    use rocket::local::asynchronous::Client;

    use super::*;

    #[backend_test]
    async fn liveness(client: Client) {
        let response = client.get(uri!(index)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
        assert_eq!(
            "Smart Voting Backend Running",
            response.into_string().await.unwrap()
        );
    }

    #[backend_test]
    async fn unknown_route_has_json_error(client: Client) {
        let response = client.get("/nowhere").dispatch().await;

        assert_eq!(Status::NotFound, response.status());
        let body = response.into_json::<ErrorBody>().await.unwrap();
        assert_eq!(body, ErrorBody::new("Not found"));
    }
}
