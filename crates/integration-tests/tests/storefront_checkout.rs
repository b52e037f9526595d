//! Cart and checkout flow across requests sharing one session cookie.

use std::time::Duration;

use reqwest::{StatusCode, header::LOCATION};
use shopfront_integration_tests::{TestServer, storefront, storefront_with_delay};

fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn post_form(server: &TestServer, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
    server
        .client
        .post(server.url(path))
        .form(form)
        .send()
        .await
        .expect("send POST")
}

async fn cart_count(server: &TestServer) -> String {
    server
        .get("/cart/count")
        .await
        .text()
        .await
        .expect("count body")
}

async fn add_beanies(server: &TestServer, quantity: &str) {
    let beanie = server.get_json("/api/products/wool-beanie").await;
    let id = beanie["id"].to_string();
    let response = post_form(
        server,
        "/cart/add",
        &[("product_id", id.as_str()), ("quantity", quantity)],
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cart");
    assert_eq!(
        response.headers().get("hx-trigger").map(|v| v.as_bytes()),
        Some(b"cart-updated".as_slice())
    );
}

const ADDRESS: [(&str, &str); 8] = [
    ("full_name", "Jordan Lee"),
    ("phone", "555-0100"),
    ("line1", "12 Harbor Street"),
    ("city", "Portland"),
    ("state", "OR"),
    ("postal_code", "97201"),
    ("country", "US"),
    ("shipping_method", "express"),
];

#[tokio::test]
async fn test_full_checkout() {
    let server = storefront().await;
    add_beanies(&server, "2").await;
    assert_eq!(cart_count(&server).await, "2");

    let response = server.get("/checkout").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/checkout/shipping");

    let response = post_form(&server, "/checkout/shipping", &ADDRESS).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/checkout/payment");

    let response = post_form(
        &server,
        "/checkout/payment",
        &[
            ("method", "credit_card"),
            ("card_holder", "Jordan Lee"),
            ("card_number", "4242 4242 4242 4242"),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/checkout/review");

    let review = server.get("/checkout/review").await;
    assert_eq!(review.status(), StatusCode::OK);
    let review = review.text().await.expect("review body");
    assert!(review.contains("Wool Beanie"));
    assert!(review.contains("Jordan Lee"));

    let response = post_form(&server, "/checkout/place-order", &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/checkout/success");

    let success = server.get("/checkout/success").await;
    assert_eq!(success.status(), StatusCode::OK);
    assert!(success.text().await.expect("success body").contains("Thank you for your order"));

    assert_eq!(cart_count(&server).await, "0");
    let response = server.get("/checkout/review").await;
    assert_eq!(location(&response), "/cart");
}

#[tokio::test]
async fn test_items_added_while_submitting_are_ordered() {
    let server = storefront_with_delay(Duration::from_millis(500)).await;
    add_beanies(&server, "2").await;
    server.get("/checkout").await;
    post_form(&server, "/checkout/shipping", &ADDRESS).await;
    post_form(
        &server,
        "/checkout/payment",
        &[("method", "paypal"), ("paypal_email", "jordan@example.test")],
    )
    .await;

    let submit = {
        let client = server.client.clone();
        let url = server.url("/checkout/place-order");
        tokio::spawn(async move { client.post(url).send().await.expect("send place-order") })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    add_beanies(&server, "1").await;

    let response = submit.await.expect("place-order task");
    assert_eq!(location(&response), "/checkout/success");

    let success = server.get("/checkout/success").await;
    let body = success.text().await.expect("success body");
    assert!(body.contains("3 items"), "{body}");
    assert_eq!(cart_count(&server).await, "0");
}

#[tokio::test]
async fn test_invalid_steps_stay_put() {
    let server = storefront().await;
    add_beanies(&server, "1").await;

    // Steps not reached yet send the shopper to the checkout entry point.
    let response = server.get("/checkout/payment").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/checkout");

    let response = server.get("/checkout").await;
    assert_eq!(location(&response), "/checkout/shipping");

    let mut missing_city = ADDRESS.to_vec();
    missing_city.retain(|(field, _)| *field != "city");
    let response = post_form(&server, "/checkout/shipping", &missing_city).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.text().await.expect("body").contains("city"));

    let response = post_form(&server, "/checkout/shipping", &ADDRESS).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = post_form(
        &server,
        "/checkout/payment",
        &[("method", "credit_card"), ("card_holder", "Jordan Lee"), ("card_number", "1234")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Placing the order without payment goes back to payment.
    let response = post_form(&server, "/checkout/place-order", &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/checkout/payment");
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let server = storefront().await;
    add_beanies(&server, "3").await;

    let stranger = TestServer {
        base_url: server.base_url.clone(),
        client: TestServer::client(),
    };
    assert_eq!(cart_count(&stranger).await, "0");
    assert_eq!(cart_count(&server).await, "3");
}

#[tokio::test]
async fn test_cart_update_and_remove() {
    let server = storefront().await;
    add_beanies(&server, "2").await;
    let id = server.get_json("/api/products/wool-beanie").await["id"].to_string();

    let response = post_form(
        &server,
        "/cart/update",
        &[("product_id", id.as_str()), ("quantity", "5")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(cart_count(&server).await, "5");

    let response = post_form(&server, "/cart/remove", &[("product_id", id.as_str())]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(cart_count(&server).await, "0");

    let response = server.get("/checkout").await;
    assert_eq!(location(&response), "/cart");
}
