//! Challenge lifecycle over the HTTP surface: creation between friends,
//! progress reporting, single-shot completion, and the winner's reward.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use chrono::{Duration, Utc};
use rstest::rstest;
use serde_json::{json, Value};

use support::{app, authed, Account, World};

async fn befriend<S, B>(service: &S, requester: &Account, addressee: &Account)
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: actix_web::body::MessageBody,
{
    let req = authed(
        test::TestRequest::post().uri("/api/v1/friends/requests"),
        requester,
    )
    .set_json(json!({ "addresseeId": addressee.id().to_string() }))
    .to_request();
    let pending: Value = test::call_and_read_body_json(service, req).await;
    let id = pending["id"].as_str().expect("friendship id");

    let req = authed(
        test::TestRequest::post().uri(&format!("/api/v1/friends/requests/{id}/accept")),
        addressee,
    )
    .to_request();
    let resp = test::call_service(service, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

fn challenge_body(challenged: &Account, target_value: i64, points_reward: i32) -> Value {
    let start = Utc::now();
    json!({
        "challengedId": challenged.id().to_string(),
        "challengeType": "steps",
        "targetValue": target_value,
        "pointsReward": points_reward,
        "startDate": start,
        "endDate": start + Duration::days(7),
    })
}

async fn report_progress<S, B>(service: &S, account: &Account, id: &str, value: i64) -> Value
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: actix_web::body::MessageBody,
{
    let req = authed(
        test::TestRequest::post().uri(&format!("/api/v1/challenges/{id}/progress")),
        account,
    )
    .set_json(json!({ "value": value }))
    .to_request();
    let resp = test::call_service(service, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    test::read_body_json(resp).await
}

#[rstest]
#[actix_web::test]
async fn reaching_the_target_settles_the_challenge_once() {
    let alice = Account::new("alice-token", "alice@example.com");
    let bob = Account::new("bob-token", "bob@example.com");
    let world = World::build(&[], &[&alice, &bob]);
    let service = test::init_service(app(world.state.clone())).await;

    befriend(&service, &alice, &bob).await;

    let req = authed(test::TestRequest::post().uri("/api/v1/challenges"), &alice)
        .set_json(challenge_body(&bob, 100, 50))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["status"].as_str(), Some("active"));
    let id = created["id"].as_str().expect("challenge id").to_owned();

    // Partial progress leaves the challenge active.
    let challenge = report_progress(&service, &bob, &id, 40).await;
    assert_eq!(challenge["status"].as_str(), Some("active"));
    assert_eq!(challenge["challengedProgress"].as_i64(), Some(40));

    // Reaching the target settles it and names the finisher.
    let challenge = report_progress(&service, &bob, &id, 100).await;
    assert_eq!(challenge["status"].as_str(), Some("completed"));
    assert_eq!(
        challenge["winnerId"].as_str(),
        Some(bob.id().to_string().as_str())
    );

    let entries = world.gamification_repo.ledger_entries(bob.id());
    assert!(entries.contains(&(50, format!("challenge:{id}"))));
}

#[rstest]
#[actix_web::test]
async fn completed_challenges_ignore_further_updates() {
    let alice = Account::new("alice-token", "alice@example.com");
    let bob = Account::new("bob-token", "bob@example.com");
    let world = World::build(&[], &[&alice, &bob]);
    let service = test::init_service(app(world.state.clone())).await;

    befriend(&service, &alice, &bob).await;

    let req = authed(test::TestRequest::post().uri("/api/v1/challenges"), &alice)
        .set_json(challenge_body(&bob, 100, 50))
        .to_request();
    let created: Value = test::call_and_read_body_json(&service, req).await;
    let id = created["id"].as_str().expect("challenge id").to_owned();

    report_progress(&service, &bob, &id, 100).await;
    let bob_reward = world.gamification_repo.ledger_entries(bob.id());

    // Later reports return the terminal row unchanged; neither the winner
    // nor the recorded progress moves, and no further points are credited.
    let challenge = report_progress(&service, &alice, &id, 250).await;
    assert_eq!(challenge["status"].as_str(), Some("completed"));
    assert_eq!(
        challenge["winnerId"].as_str(),
        Some(bob.id().to_string().as_str())
    );
    assert_eq!(challenge["challengerProgress"].as_i64(), Some(0));

    let challenge = report_progress(&service, &bob, &id, 300).await;
    assert_eq!(challenge["challengedProgress"].as_i64(), Some(100));
    assert_eq!(world.gamification_repo.ledger_entries(bob.id()), bob_reward);
}

#[rstest]
#[actix_web::test]
async fn challenges_require_an_accepted_friendship() {
    let alice = Account::new("alice-token", "alice@example.com");
    let bob = Account::new("bob-token", "bob@example.com");
    let world = World::build(&[], &[&alice, &bob]);
    let service = test::init_service(app(world.state.clone())).await;

    let req = authed(test::TestRequest::post().uri("/api/v1/challenges"), &alice)
        .set_json(challenge_body(&bob, 100, 50))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn creating_a_challenge_unlocks_first_challenge_for_the_issuer() {
    let alice = Account::new("alice-token", "alice@example.com");
    let bob = Account::new("bob-token", "bob@example.com");
    let world = World::build(&[], &[&alice, &bob]);
    let service = test::init_service(app(world.state.clone())).await;

    befriend(&service, &alice, &bob).await;

    let req = authed(test::TestRequest::post().uri("/api/v1/challenges"), &alice)
        .set_json(challenge_body(&bob, 100, 0))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let entries = world.gamification_repo.ledger_entries(alice.id());
    assert!(entries.contains(&(10, "first_challenge".to_owned())));
    // The challenged side unlocks nothing at creation.
    let bob_entries = world.gamification_repo.ledger_entries(bob.id());
    assert!(!bob_entries.contains(&(10, "first_challenge".to_owned())));
}

#[rstest]
#[actix_web::test]
async fn challenges_are_private_to_their_participants() {
    let alice = Account::new("alice-token", "alice@example.com");
    let bob = Account::new("bob-token", "bob@example.com");
    let carol = Account::new("carol-token", "carol@example.com");
    let world = World::build(&[], &[&alice, &bob, &carol]);
    let service = test::init_service(app(world.state.clone())).await;

    befriend(&service, &alice, &bob).await;

    let req = authed(test::TestRequest::post().uri("/api/v1/challenges"), &alice)
        .set_json(challenge_body(&bob, 100, 50))
        .to_request();
    let created: Value = test::call_and_read_body_json(&service, req).await;
    let id = created["id"].as_str().expect("challenge id").to_owned();

    let req = authed(
        test::TestRequest::get().uri(&format!("/api/v1/challenges/{id}")),
        &carol,
    )
    .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = authed(
        test::TestRequest::post().uri(&format!("/api/v1/challenges/{id}/progress")),
        &carol,
    )
    .set_json(json!({ "value": 10 }))
    .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = authed(test::TestRequest::get().uri("/api/v1/challenges"), &carol).to_request();
    let listed: Vec<Value> = test::call_and_read_body_json(&service, req).await;
    assert!(listed.is_empty());
}

#[rstest]
#[case(json!({ "targetValue": 0, "pointsReward": 50 }))]
#[case(json!({ "targetValue": 100, "pointsReward": -5 }))]
#[case(json!({ "challengeType": "" }))]
#[actix_web::test]
async fn malformed_challenge_payloads_are_rejected(#[case] overrides: Value) {
    let alice = Account::new("alice-token", "alice@example.com");
    let bob = Account::new("bob-token", "bob@example.com");
    let world = World::build(&[], &[&alice, &bob]);
    let service = test::init_service(app(world.state.clone())).await;

    befriend(&service, &alice, &bob).await;

    let mut body = challenge_body(&bob, 100, 50);
    for (field, value) in overrides.as_object().expect("override map") {
        body[field] = value.clone();
    }

    let req = authed(test::TestRequest::post().uri("/api/v1/challenges"), &alice)
        .set_json(body)
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
