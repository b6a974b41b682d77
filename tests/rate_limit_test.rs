use actix_web::{test, web, App, HttpResponse, Responder};
use std::net::SocketAddr;
use std::time::Duration;

use funtrip_api::middleware::rate_limit::GuestRateLimit;

async fn ok() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

fn addr(ip: &str) -> SocketAddr {
    format!("{}:40000", ip).parse().unwrap()
}

#[actix_rt::test]
async fn quota_is_enforced_per_caller_address() {
    let app = test::init_service(
        App::new().service(
            web::scope("/guest")
                .wrap(GuestRateLimit::new(2, Duration::from_secs(60)))
                .route("/generate", web::post().to(ok)),
        ),
    )
    .await;

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/guest/generate")
            .peer_addr(addr("10.0.0.1"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    // third request inside the window goes over quota
    let req = test::TestRequest::post()
        .uri("/guest/generate")
        .peer_addr(addr("10.0.0.1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 429);

    // a different caller still has its own budget
    let req = test::TestRequest::post()
        .uri("/guest/generate")
        .peer_addr(addr("10.0.0.2"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_rt::test]
async fn window_expiry_resets_the_counter() {
    let app = test::init_service(
        App::new().service(
            web::scope("/guest")
                .wrap(GuestRateLimit::new(1, Duration::from_millis(50)))
                .route("/generate", web::post().to(ok)),
        ),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/guest/generate")
        .peer_addr(addr("10.0.0.3"))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let req = test::TestRequest::post()
        .uri("/guest/generate")
        .peer_addr(addr("10.0.0.3"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 429);

    actix_rt::time::sleep(Duration::from_millis(60)).await;

    let req = test::TestRequest::post()
        .uri("/guest/generate")
        .peer_addr(addr("10.0.0.3"))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());
}
