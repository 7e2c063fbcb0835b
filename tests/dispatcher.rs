//! The REST dispatcher through the public API only.

use std::sync::{Arc, Mutex};

use mvcblog::dispatch::{ALLOW_METHODS, ALLOW_ORIGIN, Call, Cors, Dispatch, UriDispatcher};
use mvcblog::{Method, Request, Response, Status};

#[derive(Clone, Default)]
struct Seen(Arc<Mutex<Vec<(String, Vec<String>)>>>);

impl Seen {
    fn take(&self) -> Vec<(String, Vec<String>)> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

async fn read(seen: Seen, call: Call) -> Response {
    seen.0.lock().unwrap().push(("read".into(), call.params().to_vec()));
    Response::text("read")
}

async fn delete(seen: Seen, call: Call) -> Response {
    seen.0.lock().unwrap().push(("delete".into(), call.params().to_vec()));
    Response::status(Status::Ok)
}

async fn create(seen: Seen, call: Call) -> Response {
    let title = call.body().and_then(|b| b["title"].as_str()).unwrap_or("-").to_owned();
    seen.0.lock().unwrap().push(("create".into(), vec![title]));
    Response::status(Status::Created)
}

async fn user_posts(seen: Seen, call: Call) -> Response {
    seen.0.lock().unwrap().push(("user_posts".into(), call.params().to_vec()));
    Response::text("posts")
}

fn dispatcher() -> UriDispatcher<Seen> {
    UriDispatcher::new()
        .map(Method::Get, "/post/$1", read)
        .map(Method::Delete, "/post/$1", delete)
        .map(Method::Post, "/post", create)
        .map(Method::Get, "/post", read)
        .map(Method::Get, "/user/$2/posts/$1", user_posts)
}

#[tokio::test]
async fn method_and_segment_count_select_the_route() {
    let d = dispatcher();
    let seen = Seen::default();

    assert!(d.dispatch(seen.clone(), Request::new(Method::Get, "/post/42")).await.is_dispatched());
    assert!(d.dispatch(seen.clone(), Request::new(Method::Delete, "/post/42")).await.is_dispatched());
    let miss = d.dispatch(seen.clone(), Request::new(Method::Get, "/post/42/comment")).await;
    assert!(matches!(miss, Dispatch::Unmatched));

    assert_eq!(seen.take(), vec![
        ("read".to_owned(), vec!["42".to_owned()]),
        ("delete".to_owned(), vec!["42".to_owned()]),
    ]);
}

#[tokio::test]
async fn params_come_out_in_index_order() {
    let seen = Seen::default();
    dispatcher()
        .dispatch(seen.clone(), Request::new(Method::Get, "/user/alice/posts/7"))
        .await;
    assert_eq!(seen.take(), vec![("user_posts".to_owned(), vec!["7".to_owned(), "alice".to_owned()])]);
}

#[tokio::test]
async fn json_bodies_are_decoded_for_the_handler() {
    let seen = Seen::default();
    let req = Request::new(Method::Post, "/post")
        .with_header("content-type", "application/json; charset=utf-8")
        .with_body(r#"{"title":"a","content":"b"}"#);
    let res = dispatcher().dispatch(seen.clone(), req).await.into_response().unwrap();
    assert_eq!(res.status_code(), 201);
    assert_eq!(seen.take(), vec![("create".to_owned(), vec!["a".to_owned()])]);
}

#[tokio::test]
async fn preflight_answers_without_side_effects() {
    let d = dispatcher().with_cors(Cors::new("*", "Authorization, Content-Type"));
    let seen = Seen::default();

    let res = d.dispatch(seen.clone(), Request::new(Method::Options, "/post"))
        .await
        .into_response()
        .unwrap();
    assert_eq!(res.status_code(), 200);
    assert_eq!(res.header(ALLOW_METHODS), Some("POST,GET,OPTIONS"));
    assert!(seen.take().is_empty());

    let res = d.dispatch(seen.clone(), Request::new(Method::Get, "/post/1"))
        .await
        .into_response()
        .unwrap();
    assert_eq!(res.header(ALLOW_ORIGIN), Some("*"));
}

#[tokio::test]
async fn preflight_without_cors_is_unmatched() {
    let res = dispatcher().dispatch(Seen::default(), Request::new(Method::Options, "/post")).await;
    assert!(!res.is_dispatched());
}
