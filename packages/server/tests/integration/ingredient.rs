use serde_json::json;

use crate::common::{TestApp, routes};

mod ingredient_crud {
    use super::*;

    #[tokio::test]
    async fn create_keeps_fractional_calories() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::INGREDIENTS, &json!({"name": "Olive oil", "calories": 119.5}))
            .await;
        assert_eq!(res.status, 201);
        assert_eq!(res.body["name"], "Olive oil");
        assert_eq!(res.body["calories"], 119.5);
    }

    #[tokio::test]
    async fn get_returns_all_fields() {
        let app = TestApp::spawn().await;
        let id = app.create_ingredient("Egg", 78.0).await;

        let res = app.get(&routes::ingredient(id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!({"id": id, "name": "Egg", "calories": 78.0}));
    }

    #[tokio::test]
    async fn assigned_only_filters_unused_ingredients() {
        let app = TestApp::spawn().await;
        let used = app.create_ingredient("Rice", 200.0).await;
        app.create_ingredient("Saffron", 1.0).await;
        app.create_recipe("Risotto", &[used], &[]).await;

        let res = app
            .get(&format!("{}?assigned_only=true", routes::INGREDIENTS))
            .await;
        assert_eq!(res.status, 200);
        let ids: Vec<i64> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![used as i64]);
    }

    #[tokio::test]
    async fn patch_calories_only() {
        let app = TestApp::spawn().await;
        let id = app.create_ingredient("Milk", 42.0).await;

        let res = app.patch(&routes::ingredient(id), &json!({"calories": 50})).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["name"], "Milk");
        assert_eq!(res.body["calories"], 50.0);
    }

    #[tokio::test]
    async fn delete_removes_ingredient_from_recipe_totals() {
        let app = TestApp::spawn().await;
        let bread = app.create_ingredient("Bread", 250.0).await;
        let jam = app.create_ingredient("Jam", 50.0).await;
        let recipe = app.create_recipe("Toast", &[bread, jam], &[]).await;

        let res = app.delete(&routes::ingredient(jam)).await;
        assert_eq!(res.status, 204);

        let res = app.get(&routes::recipe(recipe)).await;
        assert_eq!(res.body["total_ingredients"], 1);
        assert_eq!(res.body["total_calories"], 250.0);
    }
}

mod ingredient_validation {
    use super::*;

    #[tokio::test]
    async fn non_numeric_calories_is_a_type_mismatch() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::INGREDIENTS, &json!({"name": "Salt", "calories": "none"}))
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.field_code("calories"), Some("type_mismatch"));
    }

    #[tokio::test]
    async fn all_missing_fields_are_reported() {
        let app = TestApp::spawn().await;

        let res = app.post(routes::INGREDIENTS, &json!({})).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.field_code("name"), Some("required"));
        assert_eq!(res.field_code("calories"), Some("required"));
    }

    #[tokio::test]
    async fn id_is_read_only_on_patch() {
        let app = TestApp::spawn().await;
        let id = app.create_ingredient("Flour", 364.0).await;

        let res = app.patch(&routes::ingredient(id), &json!({"id": 77})).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.field_code("id"), Some("read_only"));
    }

    #[tokio::test]
    async fn missing_ingredient_wins_over_bad_payload() {
        let app = TestApp::spawn().await;

        let res = app
            .put(&routes::ingredient(404), &json!({"calories": "lots"}))
            .await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}
