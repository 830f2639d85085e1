use log::info;
use rocket::{
    futures::TryStreamExt,
    http::Status,
    serde::json::{Error as JsonError, Json},
    Route,
};

use crate::error::Result;
use crate::model::{
    api::{
        candidate::{CandidateDesc, CandidateSpec},
        message::StatusMessage,
    },
    db::{Candidate, NewCandidate},
    mongodb::Coll,
};

use super::common::body_or;

pub fn routes() -> Vec<Route> {
    routes![add_candidate, get_candidates]
}

#[post("/add_candidate", data = "<body>", format = "json")]
pub async fn add_candidate(
    body: std::result::Result<Json<CandidateSpec>, JsonError<'_>>,
    candidates: Coll<NewCandidate>,
) -> Result<(Status, Json<StatusMessage>)> {
    let candidate = NewCandidate::try_from(body_or(body, "Missing candidate name")?)?;
    candidates.insert_one(&candidate, None).await?;
    info!("Added candidate {}", candidate.name);

    Ok((Status::Created, Json(StatusMessage::new("candidate added"))))
}

#[get("/candidates")]
pub async fn get_candidates(candidates: Coll<Candidate>) -> Result<Json<Vec<CandidateDesc>>> {
    let candidates = candidates
        .find(None, None)
        .await?
        .map_ok(CandidateDesc::from)
        .try_collect()
        .await?;
    Ok(Json(candidates))
}

#[cfg(test)]
mod tests {
    use rocket::{http::ContentType, local::asynchronous::Client, serde::json::serde_json::json};

    use crate::error::ErrorBody;

    use super::*;

    #[backend_test]
    async fn add_and_list(client: Client) {
        let response = client
            .post(uri!(add_candidate))
            .header(ContentType::JSON)
            .body(json!({ "name": "  John Doe ", "bio": "Candidate for City Mayor" }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Created, response.status());
        assert_eq!(
            StatusMessage::new("candidate added"),
            response.into_json::<StatusMessage>().await.unwrap()
        );

        // Bio is optional.
        let response = client
            .post(uri!(add_candidate))
            .header(ContentType::JSON)
            .body(json!({ "name": "Jane Roe" }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Created, response.status());

        let response = client.get(uri!(get_candidates)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let mut listed = response
            .into_json::<Vec<CandidateDesc>>()
            .await
            .unwrap()
            .into_iter()
            .map(|c| (c.name, c.bio))
            .collect::<Vec<_>>();
        listed.sort();
        let mut expected = vec![NewCandidate::example(), NewCandidate::example2()]
            .into_iter()
            .map(|c| (c.name, c.bio))
            .collect::<Vec<_>>();
        expected.sort();
        assert_eq!(expected, listed);
    }

    #[backend_test]
    async fn listed_ids_are_hex(client: Client, candidates: Coll<NewCandidate>) {
        let id = candidates
            .insert_one(NewCandidate::example(), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap();

        let listed = client
            .get(uri!(get_candidates))
            .dispatch()
            .await
            .into_json::<rocket::serde::json::Value>()
            .await
            .unwrap();
        assert_eq!(json!(id.to_hex()), listed[0]["id"]);
    }

    #[backend_test]
    async fn missing_name(client: Client) {
        for body in [json!({ "bio": "Nameless" }), json!({ "name": "   " })] {
            let response = client
                .post(uri!(add_candidate))
                .header(ContentType::JSON)
                .body(body.to_string())
                .dispatch()
                .await;

            assert_eq!(Status::BadRequest, response.status());
            assert_eq!(
                ErrorBody::new("Missing candidate name"),
                response.into_json::<ErrorBody>().await.unwrap()
            );
        }
    }
}
