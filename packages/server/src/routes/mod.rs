use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{auth, dashboard, devices, files, links, settings};
use crate::state::AppState;

pub fn app_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(dashboard::index))
        .merge(auth_routes())
        .merge(file_routes())
        .merge(link_routes())
        .merge(device_routes())
        .routes(routes!(settings::save_settings))
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::login_page))
        .routes(routes!(auth::set_username))
        .routes(routes!(auth::logout))
}

fn file_routes() -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(files::upload_file))
        .layer(files::upload_body_limit());

    OpenApiRouter::new()
        .routes(routes!(files::download_file))
        .routes(routes!(files::delete_file))
        .merge(upload)
}

fn link_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(links::save_link))
        .routes(routes!(links::delete_link))
}

fn device_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(devices::get_connected_devices))
        .routes(routes!(devices::get_device_info))
}
