#[cfg(not(target_arch = "wasm32"))]
mod native {
    extern crate netfeed;

    use std::sync::Arc;

    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use netfeed::config::{HEADING, INDEX_CONTAINER, POSTS_CONTAINER, PROFILE_CONTAINER, PROFILE_INFO};
    use netfeed::templates::{heading, render_document, DocumentParts};
    use netfeed::{ClientConfig, FeedController, MemoryPage, Page, PageContext, ReqwestTransport, ViewError};
    use tracing::{error, info};

    struct Upstream {
        config: ClientConfig,
        transport: Arc<ReqwestTransport>,
    }

    pub async fn run() -> anyhow::Result<()> {
        let config = ClientConfig::from_env()?;
        let listen = config.listen.clone();
        info!("Previewing {} on http://{}", config.base_url, listen);

        let transport = Arc::new(
            ReqwestTransport::new(config.base_url.clone()).with_session(config.session.clone()),
        );
        let upstream = web::Data::new(Upstream { config, transport });

        HttpServer::new(move || {
            App::new()
                .app_data(upstream.clone())
                .route("/", web::get().to(index))
                .route("/profile/{id}", web::get().to(profile))
                .default_service(web::route().to(not_found))
        })
        .bind(listen)?
        .run()
        .await?;

        Ok(())
    }

    async fn index(req: HttpRequest, upstream: web::Data<Upstream>) -> HttpResponse {
        let query = match req.query_string() {
            "" => String::new(),
            q => format!("?{}", q),
        };
        let context = upstream.config.page_context().with_query(query);
        render_page(&upstream, context, MemoryPage::index(), INDEX_CONTAINER).await
    }

    async fn profile(path: web::Path<u64>, upstream: web::Data<Upstream>) -> HttpResponse {
        let context = upstream.config.page_context().with_user_id(path.into_inner());
        render_page(&upstream, context, MemoryPage::profile(), PROFILE_CONTAINER).await
    }

    async fn not_found() -> HttpResponse {
        HttpResponse::NotFound().json(serde_json::json!({"error": "No route found"}))
    }

    async fn render_page(
        upstream: &Upstream,
        context: PageContext,
        page: MemoryPage,
        container_id: &str,
    ) -> HttpResponse {
        let controller = FeedController::new(context, Arc::clone(&upstream.transport), page)
            .with_policy(upstream.config.policy);

        if let Err(err) = controller.bootstrap().await {
            error!("Preview of {} failed: {}", container_id, err);
            let status = match err {
                ViewError::MissingContext(_) => actix_web::http::StatusCode::BAD_REQUEST,
                _ => actix_web::http::StatusCode::BAD_GATEWAY,
            };
            return HttpResponse::build(status).json(serde_json::json!({"error": err.to_string()}));
        }

        let page = controller.page();
        let parts = DocumentParts {
            container_id: container_id.to_string(),
            csrf_token: controller.context().csrf_token.clone(),
            heading: page
                .html(HEADING)
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| heading("All Posts")),
            show_composer: page.has_element(&controller.context().containers.composer)
                && page.is_visible(&controller.context().containers.composer),
            profile: page.html(PROFILE_INFO).unwrap_or_default(),
            posts: page.html(POSTS_CONTAINER).unwrap_or_default(),
        };

        match render_document(&parts) {
            Ok(html) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(html),
            Err(err) => HttpResponse::InternalServerError()
                .json(serde_json::json!({"error": err.to_string()})),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    native::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
