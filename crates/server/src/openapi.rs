use serde::Serialize;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct DetailDoc {
    #[schema(example = "Not found.")]
    pub detail: String,
}

/// `{"errors": {"field": ["message"]}}`
#[derive(ToSchema)]
pub struct ValidationErrorDoc { pub errors: std::collections::HashMap<String, Vec<String>> }

#[derive(ToSchema)]
pub struct TokenObtainDoc { pub username: String, pub password: String }

#[derive(ToSchema)]
pub struct TokenPairDoc { pub access: String, pub refresh: String }

#[derive(ToSchema)]
pub struct TokenRefreshDoc { pub refresh: String }

#[derive(ToSchema)]
pub struct AccessTokenDoc { pub access: String }

#[derive(ToSchema)]
pub struct TokenVerifyDoc { pub token: String }

#[derive(Serialize, ToSchema)]
pub struct ProfileDoc {
    pub id: Uuid,
    pub user: Uuid,
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    #[schema(example = "Paulista")]
    pub city: String,
    #[schema(example = "PE")]
    pub state: String,
    pub phone: Option<String>,
    pub birth_date: Option<chrono::NaiveDate>,
    pub is_vulnerable: bool,
    #[serde(rename = "cadUnico_number")]
    pub cad_unico_number: Option<String>,
}

#[derive(ToSchema)]
pub struct UserDoc {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub cpf: Option<String>,
    #[schema(example = "documents/rg.pdf")]
    pub document: Option<String>,
    #[schema(example = "citizen")]
    pub role: String,
    pub date_joined: chrono::DateTime<chrono::Utc>,
    pub profile: Option<ProfileDoc>,
}

#[derive(ToSchema)]
pub struct UserCreateDoc {
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub cpf: Option<String>,
    pub document: Option<String>,
    /// At least 8 characters. Never returned.
    pub password: Option<String>,
    pub profile: Option<ProfileDoc>,
}

#[derive(ToSchema)]
pub struct UserUpdateDoc {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub cpf: Option<String>,
    pub document: Option<String>,
    /// Staff only.
    pub role: Option<String>,
    pub password: Option<String>,
    pub profile: Option<ProfileDoc>,
}

#[derive(ToSchema)]
pub struct ServiceDoc {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub duration_minutes: i32,
    pub location: String,
}

#[derive(ToSchema)]
pub struct ServiceWriteDoc {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub location: Option<String>,
}

#[derive(ToSchema)]
pub struct AppointmentDoc {
    pub id: Uuid,
    pub user: Uuid,
    pub professional: Option<Uuid>,
    pub date: chrono::NaiveDate,
    #[schema(example = "14:00:00")]
    pub time: String,
    #[schema(example = "pending")]
    pub status: String,
    pub description: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(ToSchema)]
pub struct AppointmentWriteDoc {
    pub professional: Option<Uuid>,
    pub date: Option<chrono::NaiveDate>,
    pub time: Option<String>,
    /// pending | confirmed | cancelled | completed
    pub status: Option<String>,
    pub description: Option<String>,
}

#[derive(ToSchema)]
pub struct MessageDoc {
    pub id: Uuid,
    pub ticket: Uuid,
    pub sender: Uuid,
    pub message: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(ToSchema)]
pub struct MessageWriteDoc { pub ticket: Option<Uuid>, pub message: Option<String> }

#[derive(ToSchema)]
pub struct TicketDoc {
    pub id: Uuid,
    pub user: Uuid,
    pub subject: String,
    pub description: String,
    #[schema(example = "open")]
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub messages: Vec<MessageDoc>,
}

#[derive(ToSchema)]
pub struct TicketWriteDoc {
    pub subject: Option<String>,
    pub description: Option<String>,
    /// open | in_progress | resolved | closed
    pub status: Option<String>,
}

pub struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::obtain_token,
        crate::routes::auth::refresh_token,
        crate::routes::auth::verify_token,
        crate::routes::users::list,
        crate::routes::users::create,
        crate::routes::users::get,
        crate::routes::users::replace,
        crate::routes::users::patch,
        crate::routes::users::delete,
        crate::routes::services::list,
        crate::routes::services::create,
        crate::routes::services::get,
        crate::routes::services::replace,
        crate::routes::services::patch,
        crate::routes::services::delete,
        crate::routes::appointments::list,
        crate::routes::appointments::create,
        crate::routes::appointments::get,
        crate::routes::appointments::replace,
        crate::routes::appointments::patch,
        crate::routes::appointments::delete,
        crate::routes::support::list_tickets,
        crate::routes::support::my_tickets,
        crate::routes::support::create_ticket,
        crate::routes::support::get_ticket,
        crate::routes::support::replace_ticket,
        crate::routes::support::patch_ticket,
        crate::routes::support::delete_ticket,
        crate::routes::support::list_messages,
        crate::routes::support::create_message,
        crate::routes::support::get_message,
        crate::routes::support::replace_message,
        crate::routes::support::patch_message,
        crate::routes::support::delete_message,
    ),
    components(
        schemas(
            HealthResponse,
            DetailDoc,
            ValidationErrorDoc,
            TokenObtainDoc,
            TokenPairDoc,
            TokenRefreshDoc,
            AccessTokenDoc,
            TokenVerifyDoc,
            ProfileDoc,
            UserDoc,
            UserCreateDoc,
            UserUpdateDoc,
            ServiceDoc,
            ServiceWriteDoc,
            AppointmentDoc,
            AppointmentWriteDoc,
            MessageDoc,
            MessageWriteDoc,
            TicketDoc,
            TicketWriteDoc,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "users"),
        (name = "services"),
        (name = "appointments"),
        (name = "support")
    )
)]
pub struct ApiDoc;
