/// View envelopes
///
/// Template rendering happens outside this service. A rendered page is a JSON
/// envelope naming the template and its context; redirects are `303 See Other`.
use actix_web::http::{header, StatusCode};
use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::{json, Value};

pub const ADD_STORY: &str = "stories/add";
pub const STORY_INDEX: &str = "stories/index";
pub const STORY_SHOW: &str = "stories/show";
pub const STORY_EDIT: &str = "stories/edit";
pub const DASHBOARD: &str = "dashboard";

pub const DASHBOARD_PATH: &str = "/dashboard";
pub const STORIES_PATH: &str = "/stories";

#[derive(Debug, Serialize)]
pub struct ViewEnvelope<'a, C: Serialize> {
    pub view: &'a str,
    pub context: C,
}

pub struct View;

impl View {
    pub fn render<C: Serialize>(template: &str, context: C) -> HttpResponse {
        HttpResponse::Ok().json(ViewEnvelope {
            view: template,
            context,
        })
    }

    pub fn error(status: StatusCode, message: &str) -> HttpResponse {
        let template = format!("error/{}", status.as_u16());
        HttpResponse::build(status).json(ViewEnvelope {
            view: &template,
            context: json!({ "message": message }),
        })
    }

    pub fn not_found() -> HttpResponse {
        Self::error(StatusCode::NOT_FOUND, "Story not found")
    }

    pub fn redirect(location: &str) -> HttpResponse {
        HttpResponse::SeeOther()
            .insert_header((header::LOCATION, location))
            .finish()
    }

    /// Context used by the create form.
    pub fn add_form_context() -> Value {
        json!({
            "fields": {
                "title": { "required": true, "max_length": 200 },
                "body": { "required": true },
                "status": { "options": ["public", "private"], "default": "public" }
            }
        })
    }
}
