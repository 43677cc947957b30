use serde_json::json;

use crate::common::{TestApp, routes};

mod tag_crud {
    use super::*;

    #[tokio::test]
    async fn create_and_fetch_a_tag() {
        let app = TestApp::spawn().await;

        let res = app.post(routes::TAGS, &json!({"name": "  Vegan "})).await;
        assert_eq!(res.status, 201);
        assert_eq!(res.body["name"], "Vegan");
        let id = res.id();

        let res = app.get(&routes::tag(id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!({"id": id, "name": "Vegan"}));
    }

    #[tokio::test]
    async fn list_is_ordered_by_name() {
        let app = TestApp::spawn().await;
        app.create_tag("Dessert").await;
        app.create_tag("Breakfast").await;

        let res = app.get(routes::TAGS).await;
        assert_eq!(res.status, 200);
        let names: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Breakfast", "Dessert"]);
    }

    #[tokio::test]
    async fn assigned_only_filters_unused_tags() {
        let app = TestApp::spawn().await;
        let used = app.create_tag("Dinner").await;
        app.create_tag("Unused").await;
        app.create_recipe("Stew", &[], &[used]).await;

        let res = app.get(&format!("{}?assigned_only=true", routes::TAGS)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!([{"id": used, "name": "Dinner"}]));
    }

    #[tokio::test]
    async fn patch_and_put_update_the_name() {
        let app = TestApp::spawn().await;
        let id = app.create_tag("Old").await;

        let res = app.patch(&routes::tag(id), &json!({"name": "Patched"})).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["name"], "Patched");

        let res = app.put(&routes::tag(id), &json!({"name": "Replaced"})).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["name"], "Replaced");
    }

    #[tokio::test]
    async fn empty_patch_returns_the_tag_unchanged() {
        let app = TestApp::spawn().await;
        let id = app.create_tag("Keep").await;

        let res = app.patch(&routes::tag(id), &json!({})).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["name"], "Keep");
    }

    #[tokio::test]
    async fn delete_detaches_tag_from_recipes() {
        let app = TestApp::spawn().await;
        let tag = app.create_tag("Gone").await;
        let recipe = app.create_recipe("Pie", &[], &[tag]).await;

        let res = app.delete(&routes::tag(tag)).await;
        assert_eq!(res.status, 204);

        let res = app.get(&routes::tag(tag)).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");

        let res = app.get(&routes::recipe(recipe)).await;
        assert_eq!(res.body["tags"], json!([]));
    }
}

mod tag_validation {
    use super::*;

    #[tokio::test]
    async fn missing_name_is_required() {
        let app = TestApp::spawn().await;

        let res = app.post(routes::TAGS, &json!({})).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.field_code("name"), Some("required"));
    }

    #[tokio::test]
    async fn id_is_read_only() {
        let app = TestApp::spawn().await;

        let res = app.post(routes::TAGS, &json!({"id": 5, "name": "Vegan"})).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.field_code("id"), Some("read_only"));
    }

    #[tokio::test]
    async fn put_requires_name() {
        let app = TestApp::spawn().await;
        let id = app.create_tag("Lunch").await;

        let res = app.put(&routes::tag(id), &json!({})).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.field_code("name"), Some("required"));
    }

    #[tokio::test]
    async fn non_object_body_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.post(routes::TAGS, &json!(["Vegan"])).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.body["message"], "Request body must be a JSON object");
        assert!(res.body.get("fields").is_none());
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .post(format!("http://{}{}", app.addr, routes::TAGS))
            .header("content-type", "application/json")
            .body("{\"name\": ")
            .send()
            .await
            .unwrap();

        assert_eq!(res.status().as_u16(), 400);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["message"], "Request body is not valid JSON");
    }

    #[tokio::test]
    async fn missing_tag_is_not_found_before_payload_checks() {
        let app = TestApp::spawn().await;

        let res = app.patch(&routes::tag(999), &json!({"name": 42})).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn unknown_tag_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.patch(&routes::tag(999), &json!({"name": "x"})).await;
        assert_eq!(res.status, 404);
    }
}
