use actix_web::{test, web, App};
use eldendata::http;
use eldendata::{AppConfig, AppContext, DocumentStore};
use serde_json::{json, Value};

fn context() -> AppContext {
    AppContext::with_store(DocumentStore::open_temporary().unwrap(), AppConfig::default())
}

macro_rules! app {
    ($context:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($context))
                .configure(|cfg| http::configure(cfg, "/api/v1")),
        )
        .await
    };
}

#[actix_web::test]
async fn health_endpoints() {
    let app = app!(context());

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "development");

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"status": "healthy"}));

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "operational");
}

#[actix_web::test]
async fn weapon_crud_round() {
    let app = app!(context());

    let req = test::TestRequest::post()
        .uri("/api/v1/weapons")
        .set_json(json!({
            "name": "Uchigatana",
            "category": "Katana",
            "weight": "5.5",
            "attack": "[{'name': 'Phy', 'amount': 115}]",
            "scalesWith": "{'Str': 'd', 'Dex': 'C'}"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["scalesWith"]["strength"], "D");
    assert_eq!(created["damage_to_weight_ratio"], json!(20.91));

    let req = test::TestRequest::get().uri("/api/v1/weapons?limit=5&category=katana").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["skip"], 0);
    assert_eq!(page["limit"], 5);
    assert_eq!(page["items"][0]["name"], "Uchigatana");

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/weapons/{}", id))
        .set_json(json!({"attack": {"Phy": 120}}))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["attack"]["physical"], json!(120.0));

    let req = test::TestRequest::delete().uri(&format!("/api/v1/weapons/{}", id)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let req = test::TestRequest::get().uri(&format!("/api/v1/weapons/{}", id)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "not_found");
}

#[actix_web::test]
async fn errors_are_json() {
    let app = app!(context());

    let req = test::TestRequest::get().uri("/api/v1/bosses/not-a-valid-id").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_identifier");

    let req = test::TestRequest::get().uri("/api/v1/armors?limit=500").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::post()
        .uri("/api/v1/classes")
        .set_json(json!({"name": "Hero", "stats": {"level": 900}}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");

    let req = test::TestRequest::get().uri("/api/v1/weapons/build/sorcery").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::post()
        .uri("/api/v1/weapons/compare")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "bad_request");
}

#[actix_web::test]
async fn derived_routes_take_precedence_over_ids() {
    let app = app!(context());
    for name in ["Margit, the Fell Omen", "Godrick the Grafted"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/bosses")
            .set_json(json!({"name": name, "region": "Limgrave", "drops": "['Talisman Pouch']"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);
    }

    let req = test::TestRequest::get().uri("/api/v1/bosses/statistics").to_request();
    let stats: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats["total_bosses"], 2);

    let req = test::TestRequest::get().uri("/api/v1/bosses/drops").to_request();
    let drops: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(drops[0]["item_name"], "Talisman Pouch");
    assert_eq!(drops[0]["drop_count"], 2);

    let req = test::TestRequest::get().uri("/api/v1/bosses/region/limgrave").to_request();
    let found: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(found.as_array().unwrap().len(), 2);

    let req = test::TestRequest::get().uri("/api/v1/sorceries").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["total"], 0);
    assert_eq!(page["limit"], 20);
}
