use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/datasets", dataset_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn dataset_routes() -> OpenApiRouter<AppState> {
    let crud = OpenApiRouter::new()
        .routes(routes!(handlers::dataset::list_datasets))
        .routes(routes!(handlers::dataset::get_dataset))
        .routes(routes!(handlers::dataset::generate_report));

    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::dataset::upload_dataset))
        .layer(handlers::dataset::upload_body_limit());

    crud.merge(upload)
}
