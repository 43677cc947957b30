use axum::extract::DefaultBodyLimit;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

/// Headroom for multipart boundaries and part headers on top of the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/tags", tag_routes())
        .nest("/ingredients", ingredient_routes())
        .nest("/recipes", recipe_routes(config))
}

fn tag_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::tag::list_tags, handlers::tag::create_tag))
        .routes(routes!(
            handlers::tag::get_tag,
            handlers::tag::replace_tag,
            handlers::tag::update_tag,
            handlers::tag::delete_tag
        ))
}

fn ingredient_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::ingredient::list_ingredients,
            handlers::ingredient::create_ingredient
        ))
        .routes(routes!(
            handlers::ingredient::get_ingredient,
            handlers::ingredient::replace_ingredient,
            handlers::ingredient::update_ingredient,
            handlers::ingredient::delete_ingredient
        ))
}

fn recipe_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let crud = OpenApiRouter::new()
        .routes(routes!(
            handlers::recipe::list_recipes,
            handlers::recipe::create_recipe
        ))
        .routes(routes!(
            handlers::recipe::get_recipe,
            handlers::recipe::replace_recipe,
            handlers::recipe::update_recipe,
            handlers::recipe::delete_recipe
        ));

    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::recipe::upload_image))
        .layer(DefaultBodyLimit::max(
            config.media.max_upload_size + MULTIPART_OVERHEAD,
        ));

    crud.merge(upload)
}
