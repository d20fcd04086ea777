//! Engagement Ledger Tests
//!
//! Like/unlike toggles and denormalized counter consistency across every
//! subject type.

mod common;

use axum::http::StatusCode;
use common::app;

// ===========================================================================
// Like
// ===========================================================================

#[tokio::test]
async fn like_question_increments_counter() {
    let app = app().await;
    let author = app.create_user("eng_like_q_author").await;
    let liker = app.create_user("eng_like_q_liker").await;
    let question_id = app.create_question(author.id).await;

    let resp = app
        .post_empty(
            &format!("/api/v1/question/{}/like", question_id),
            Some(&liker.token),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.code(), 200);
    assert_eq!(app.like_count("questions", question_id).await, 1);
}

#[tokio::test]
async fn double_like_is_rejected_and_counted_once() {
    let app = app().await;
    let author = app.create_user("eng_dup_author").await;
    let liker = app.create_user("eng_dup_liker").await;
    let question_id = app.create_question(author.id).await;

    let resp = app
        .post_empty(
            &format!("/api/v1/question/{}/like", question_id),
            Some(&liker.token),
        )
        .await;
    assert_eq!(resp.code(), 200);

    let resp = app
        .post_empty(
            &format!("/api/v1/question/{}/like", question_id),
            Some(&liker.token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.code(), 409);
    assert_eq!(resp.message(), "already liked");

    assert_eq!(app.like_count("questions", question_id).await, 1);
}

#[tokio::test]
async fn like_missing_subject() {
    let app = app().await;
    let user = app.create_user("eng_like_ghost").await;

    let resp = app
        .post_empty("/api/v1/question/999999999/like", Some(&user.token))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.code(), 404);
}

#[tokio::test]
async fn like_invalid_subject_id() {
    let app = app().await;
    let user = app.create_user("eng_like_badid").await;

    let resp = app
        .post_empty("/api/v1/question/abc/like", Some(&user.token))
        .await;

    assert_eq!(resp.code(), 400);
}

#[tokio::test]
async fn like_requires_auth() {
    let app = app().await;
    let author = app.create_user("eng_noauth_author").await;
    let question_id = app.create_question(author.id).await;

    let resp = app
        .post_empty(&format!("/api/v1/question/{}/like", question_id), None)
        .await;

    // Errors are in-band: transport stays 200, the envelope carries 401.
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.code(), 401);
}

#[tokio::test]
async fn note_and_post_subjects_are_likeable() {
    let app = app().await;
    let author = app.create_user("eng_subjects_author").await;
    let liker = app.create_user("eng_subjects_liker").await;
    let note_id = app.create_note(author.id).await;
    let post_id = app.create_post(author.id).await;

    let resp = app
        .post_empty(&format!("/api/v1/note/{}/like", note_id), Some(&liker.token))
        .await;
    assert_eq!(resp.code(), 200);
    assert_eq!(app.like_count("notes", note_id).await, 1);

    let resp = app
        .post_empty(&format!("/api/v1/post/{}/like", post_id), Some(&liker.token))
        .await;
    assert_eq!(resp.code(), 200);
    assert_eq!(app.like_count("posts", post_id).await, 1);
}

// ===========================================================================
// Unlike
// ===========================================================================

#[tokio::test]
async fn like_unlike_round_trip() {
    let app = app().await;
    let author = app.create_user("eng_rt_author").await;
    let liker = app.create_user("eng_rt_liker").await;
    let note_id = app.create_note(author.id).await;

    let resp = app
        .post_empty(&format!("/api/v1/note/{}/like", note_id), Some(&liker.token))
        .await;
    assert_eq!(resp.code(), 200);
    assert_eq!(app.like_count("notes", note_id).await, 1);

    let resp = app
        .post_empty(
            &format!("/api/v1/note/{}/unlike", note_id),
            Some(&liker.token),
        )
        .await;
    assert_eq!(resp.code(), 200);
    assert_eq!(app.like_count("notes", note_id).await, 0);
}

#[tokio::test]
async fn unlike_never_liked() {
    let app = app().await;
    let author = app.create_user("eng_nl_author").await;
    let user = app.create_user("eng_nl_user").await;
    let post_id = app.create_post(author.id).await;

    let resp = app
        .post_empty(
            &format!("/api/v1/post/{}/unlike", post_id),
            Some(&user.token),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.code(), 409);
    assert_eq!(resp.message(), "not liked");
    assert_eq!(app.like_count("posts", post_id).await, 0);
}

#[tokio::test]
async fn unlike_missing_subject() {
    let app = app().await;
    let user = app.create_user("eng_unlike_ghost").await;

    let resp = app
        .post_empty("/api/v1/post/999999999/unlike", Some(&user.token))
        .await;

    assert_eq!(resp.code(), 404);
}

// ===========================================================================
// Multi-actor scenario
// ===========================================================================

#[tokio::test]
async fn two_actors_like_and_unlike_one_post() {
    let app = app().await;
    let author = app.create_user("eng_multi_author").await;
    let u1 = app.create_user("eng_multi_u1").await;
    let u2 = app.create_user("eng_multi_u2").await;
    let post_id = app.create_post(author.id).await;

    let resp = app
        .post_empty(&format!("/api/v1/post/{}/like", post_id), Some(&u1.token))
        .await;
    assert_eq!(resp.code(), 200);
    assert_eq!(app.like_count("posts", post_id).await, 1);

    let resp = app
        .post_empty(&format!("/api/v1/post/{}/like", post_id), Some(&u2.token))
        .await;
    assert_eq!(resp.code(), 200);
    assert_eq!(app.like_count("posts", post_id).await, 2);

    let resp = app
        .post_empty(&format!("/api/v1/post/{}/unlike", post_id), Some(&u1.token))
        .await;
    assert_eq!(resp.code(), 200);
    assert_eq!(app.like_count("posts", post_id).await, 1);

    let resp = app
        .post_empty(&format!("/api/v1/post/{}/unlike", post_id), Some(&u1.token))
        .await;
    assert_eq!(resp.code(), 409);
    assert_eq!(app.like_count("posts", post_id).await, 1);
}

// ===========================================================================
// Concurrency
// ===========================================================================

#[tokio::test]
async fn concurrent_double_like_counts_once() {
    let app = app().await;
    let author = app.create_user("eng_race_author").await;
    let liker = app.create_user("eng_race_liker").await;
    let question_id = app.create_question(author.id).await;

    let path = format!("/api/v1/question/{}/like", question_id);
    let (a, b) = tokio::join!(
        app.post_empty(&path, Some(&liker.token)),
        app.post_empty(&path, Some(&liker.token)),
    );

    let codes = [a.code(), b.code()];
    assert!(codes.contains(&200), "one side must win: {:?}", codes);
    // The loser either hit the conflict or serialized behind the winner.
    assert_eq!(codes.iter().filter(|&&c| c == 200).count(), 1, "{:?}", codes);
    assert_eq!(app.like_count("questions", question_id).await, 1);
}
