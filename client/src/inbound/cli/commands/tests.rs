//! Command execution against scripted backend responses.

use super::*;
use crate::domain::ports::HttpMethod;
use crate::domain::{FlavorFamily, Intensity, Occasion, OrderType};
use crate::test_support::{AppFixture, admin_user, regular_user};
use rstest::rstest;
use serde_json::json;

async fn run(fixture: &AppFixture, command: Command) -> (Result<(), CliError>, String) {
    let mut out = Vec::new();
    let result = execute(command, fixture.app.commands(), &mut out).await;
    (result, String::from_utf8(out).expect("utf-8 output"))
}

fn order_json(id: &str, status: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "name": "Ana",
        "phone": "600123123",
        "email": "ana@test.com",
        "quantity": 2,
        "type": "premium",
        "price": 12,
        "food": [],
        "status": status
    })
}

#[rstest]
#[tokio::test]
async fn login_persists_the_session() {
    let fixture = AppFixture::new();
    fixture.app.start();
    fixture.transport.push_json(
        201,
        json!({"access_token": "t1", "user": {"id": "1", "email": "admin@test.com", "role": "admin"}}),
    );

    let (result, output) = run(
        &fixture,
        Command::Login {
            email: "admin@test.com".to_owned(),
            password: "admin123".to_owned(),
        },
    )
    .await;

    result.expect("login succeeds");
    assert_eq!(output, "logged in as admin@test.com <admin@test.com> [ADMIN]\n");
    assert!(fixture.app.session().is_authenticated());
}

#[rstest]
#[tokio::test]
async fn invalid_login_input_sends_nothing() {
    let fixture = AppFixture::new();
    fixture.app.start();

    let (result, _) = run(
        &fixture,
        Command::Login {
            email: "nope".to_owned(),
            password: "x".to_owned(),
        },
    )
    .await;

    assert!(matches!(result, Err(CliError::Invalid(_))));
    assert!(fixture.transport.requests().is_empty());
}

#[rstest]
#[case("/admin/orders", "/admin/orders -> access denied (back to /dashboard)\n")]
#[case("/login", "/login -> redirect to /dashboard\n")]
#[case("/menu", "/menu -> render /menu\n")]
#[tokio::test]
async fn route_reports_the_gate_decision_for_customers(#[case] path: &str, #[case] expected: &str) {
    let fixture = AppFixture::logged_in(regular_user());

    let (result, output) = run(
        &fixture,
        Command::Route {
            path: path.to_owned(),
        },
    )
    .await;

    result.expect("route resolves");
    assert_eq!(output, expected);
}

#[rstest]
#[tokio::test]
async fn unknown_paths_are_errors() {
    let fixture = AppFixture::new();
    fixture.app.start();

    let (result, _) = run(
        &fixture,
        Command::Route {
            path: "/nowhere".to_owned(),
        },
    )
    .await;

    assert!(matches!(result, Err(CliError::Route(_))));
}

#[rstest]
#[tokio::test]
async fn admin_commands_are_refused_for_customers_without_a_request() {
    let fixture = AppFixture::logged_in(regular_user());

    let (result, _) = run(&fixture, Command::Orders(OrdersCommand::Stats)).await;

    match result {
        Err(CliError::Denied { route, decision }) => {
            assert_eq!(route, Route::AdminOrders);
            assert_eq!(
                decision,
                RouteDecision::AccessDenied {
                    fallback: Route::Dashboard
                }
            );
        }
        other => panic!("expected denial, got {other:?}"),
    }
    assert!(fixture.transport.requests().is_empty());
}

#[rstest]
#[tokio::test]
async fn admin_order_listing_filters_locally() {
    let fixture = AppFixture::logged_in(admin_user());
    fixture.transport.push_json(
        200,
        json!([order_json("o1", "pending"), order_json("o2", "closed")]),
    );

    let (result, output) = run(
        &fixture,
        Command::Orders(OrdersCommand::List {
            status: Some(crate::domain::OrderStatus::Closed),
            search: None,
        }),
    )
    .await;

    result.expect("listing succeeds");
    assert_eq!(output.lines().count(), 1);
    assert!(output.starts_with("o2  closed"));
}

#[rstest]
#[tokio::test]
async fn close_sends_a_status_update() {
    let fixture = AppFixture::logged_in(admin_user());
    fixture.transport.push_json(200, order_json("o1", "closed"));

    let (result, _) = run(
        &fixture,
        Command::Orders(OrdersCommand::Close {
            id: "o1".to_owned(),
        }),
    )
    .await;

    result.expect("close succeeds");
    let request = fixture.transport.last_request().expect("request sent");
    assert_eq!((request.method, request.path.as_str()), (HttpMethod::Put, "/orders/o1"));
    assert_eq!(request.body.expect("body"), json!({"status": "closed"}));
}

#[rstest]
#[tokio::test]
async fn anonymous_order_creation_posts_derived_price() {
    let fixture = AppFixture::new();
    fixture.app.start();
    fixture.transport.push_json(201, order_json("o9", "pending"));

    let (result, output) = run(
        &fixture,
        Command::Orders(OrdersCommand::Create {
            name: "Ana".to_owned(),
            phone: "600123123".to_owned(),
            email: "ana@test.com".to_owned(),
            quantity: 2,
            order_type: OrderType::Premium,
            observations: None,
        }),
    )
    .await;

    result.expect("order accepted");
    assert!(output.starts_with("o9"));
    let request = fixture.transport.last_request().expect("request sent");
    assert_eq!(request.bearer, None);
    assert_eq!(request.body.expect("body")["price"], json!(12));
}

#[rstest]
#[tokio::test]
async fn catalog_list_prints_matching_items() {
    let fixture = AppFixture::new();
    fixture.app.start();
    fixture.transport.push_json(
        200,
        json!([{
            "_id": "c1",
            "name": "Cachimbas",
            "slug": "cachimbas",
            "subcategories": [{
                "name": "Clásicas",
                "items": [
                    {"name": "Love 66", "description": "Fruta de la pasión", "price": 14},
                    {"name": "Menta", "description": "Fresca", "price": 12}
                ]
            }]
        }]),
    );

    let (result, output) = run(
        &fixture,
        Command::Catalog(CatalogCommand::List {
            search: Some("love".to_owned()),
            category: None,
        }),
    )
    .await;

    result.expect("listing succeeds");
    assert_eq!(output, "Cachimbas / Clásicas: Love 66 14.00 EUR\n");
}

#[rstest]
#[tokio::test]
async fn quiz_needs_no_session_or_network() {
    let fixture = AppFixture::new();

    let (result, output) = run(
        &fixture,
        Command::Quiz {
            intensity: Intensity::Soft,
            family: FlavorFamily::Fresh,
            occasion: Occasion::Casual,
        },
    )
    .await;

    result.expect("quiz runs");
    assert!(output.starts_with("classic package (4 EUR per shisha): Menta\n"));
    assert!(fixture.transport.requests().is_empty());
}

#[rstest]
#[tokio::test]
async fn logout_clears_the_session_even_when_the_backend_fails() {
    let fixture = AppFixture::logged_in(admin_user());
    fixture.transport.push_json(500, json!({"statusCode": 500, "message": "boom"}));

    let (result, output) = run(&fixture, Command::Logout).await;

    result.expect("logout never fails");
    assert_eq!(output, "logged out\n");
    assert!(!fixture.app.session().is_authenticated());
}
