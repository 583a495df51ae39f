#[cfg(not(target_arch = "wasm32"))]
mod native {
    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use tracing_subscriber::EnvFilter;

    mod adapter {
        use actix_web::HttpRequest;
        use spin_sdk::http::{Method, Request};

        pub fn actix_to_spin_request(
            req: &HttpRequest,
            body: actix_web::web::Bytes,
        ) -> anyhow::Result<Request> {
            let method = match req.method().as_str() {
                "GET" => Method::Get,
                "POST" => Method::Post,
                "PUT" => Method::Put,
                "DELETE" => Method::Delete,
                "HEAD" => Method::Head,
                "OPTIONS" => Method::Options,
                "PATCH" => Method::Patch,
                _ => Method::Get,
            };

            let uri = req.uri().to_string();
            let mut builder = Request::builder();
            let mut with_headers = builder.method(method).uri(&uri);
            for (name, value) in req.headers() {
                if let Ok(val_str) = value.to_str() {
                    with_headers = with_headers.header(name.as_str(), val_str);
                }
            }

            Ok(with_headers.body(body.to_vec()).build())
        }

        pub fn spin_to_actix_response(spin_resp: spin_sdk::http::Response) -> actix_web::HttpResponse {
            let status = *spin_resp.status();
            let body = spin_resp.body().to_vec();

            actix_web::HttpResponse::build(
                actix_web::http::StatusCode::from_u16(status)
                    .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR),
            )
            .body(body)
        }
    }

    async fn handle_all(req: HttpRequest, body: web::Bytes) -> HttpResponse {
        let spin_req = match adapter::actix_to_spin_request(&req, body) {
            Ok(r) => r,
            Err(_) => {
                return HttpResponse::BadRequest()
                    .json(serde_json::json!({"message": "Invalid request"}))
            }
        };

        match ripple::route(spin_req) {
            Ok(spin_resp) => adapter::spin_to_actix_response(spin_resp),
            Err(err) => {
                tracing::error!(%err, "request failed");
                HttpResponse::InternalServerError()
                    .json(serde_json::json!({"message": "Server Error"}))
            }
        }
    }

    pub async fn run() -> std::io::Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
        tracing::info!("Server listening on http://0.0.0.0:8080");

        HttpServer::new(|| App::new().default_service(web::route().to(handle_all)))
            .bind("0.0.0.0:8080")?
            .run()
            .await
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    native::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
