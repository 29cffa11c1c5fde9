use std::{error::Error, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use derive_more::From;
use itertools::Itertools as _;
use serde::{Deserialize, Serialize};
use tokio::{fs, net, task};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{
    layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

use reqsys::{
    api, db, demo,
    gateway::{self, Gateway, Session, TicketStore as _},
    policy, view, Config,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = fs::read_to_string("config.toml").await?;
    let config = toml::from_str::<Config>(&config)?;

    let (db_client, db_connection) = db::connect(config.db).await?;

    task::spawn(async move {
        if let Err(e) = db_connection.await {
            panic!("database connection failed: {e}");
        }
    });

    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE]);
    for origin in &config.http.cors.allowed_origins {
        cors = cors.allow_origin(origin.parse::<HeaderValue>()?);
    }

    let app = Router::new()
        .route("/tickets", get(list_tickets).post(add_ticket))
        .route(
            "/tickets/:id",
            get(get_ticket).patch(edit_ticket).delete(delete_ticket),
        )
        .route("/tickets/:id/history", get(get_history))
        .layer(cors)
        .with_state(Arc::new(AppState {
            gateway: Gateway::new(db_client),
        }));

    let listener = net::TcpListener::bind(config.http.server.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// The acting role, taken from query parameters. The surface is
/// demo-grade and unauthenticated; the dashboard's role selector plays
/// the part of a session.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RoleParam {
    Applicant,
    Approver,
    Designer,
    Lead,
}

#[derive(Deserialize)]
struct ActorInput {
    role: Option<RoleParam>,
    unit: Option<String>,
    name: Option<String>,
}

impl ActorInput {
    fn actor(self) -> Option<policy::Actor> {
        match self.role? {
            RoleParam::Applicant => {
                Some(policy::Actor::Applicant { unit: self.unit? })
            }
            RoleParam::Approver => {
                Some(policy::Actor::Approver { unit: self.unit? })
            }
            RoleParam::Designer => {
                Some(policy::Actor::Designer { name: self.name? })
            }
            RoleParam::Lead => Some(policy::Actor::Lead),
        }
    }
}

#[derive(Deserialize)]
struct ListTicketsInput {
    role: Option<RoleParam>,
    unit: Option<String>,
    name: Option<String>,
    view: Option<policy::Queue>,
    status: Option<api::ticket::Status>,
    q: Option<String>,
}

async fn list_tickets(
    State(state): State<SharedAppState>,
    Query(input): Query<ListTicketsInput>,
) -> Json<api::ticket::List> {
    let tickets = match state.gateway.store().list().await {
        Ok(tickets) => tickets,
        Err(e) => {
            tracing::warn!(
                "ticket store unreachable, serving demo data: {e}"
            );
            demo::demo_tickets()
        }
    };

    let actor = ActorInput {
        role: input.role,
        unit: input.unit,
        name: input.name,
    }
    .actor()
    .unwrap_or(policy::Actor::Lead);

    let visible = tickets
        .into_iter()
        .filter(|ticket| policy::visible(&actor, ticket))
        .collect::<Vec<_>>();
    let counts = api::ticket::Counts::tally(&visible);
    let total_count = visible.len();

    let keyword = input.q.unwrap_or_default().trim().to_lowercase();
    let tickets = visible
        .into_iter()
        .filter(|ticket| {
            input
                .view
                .map_or(true, |queue| policy::in_queue(queue, ticket))
        })
        .filter(|ticket| {
            input.status.map_or(true, |status| ticket.status == status)
        })
        .filter(|ticket| {
            keyword.is_empty() || matches_keyword(ticket, &keyword)
        })
        .sorted_by(|a, b| b.code.cmp(&a.code))
        .map(api::Ticket::from)
        .collect();

    Json(api::ticket::List {
        tickets,
        total_count,
        counts,
    })
}

fn matches_keyword(ticket: &db::Ticket, keyword: &str) -> bool {
    let haystack = [
        ticket.code.as_str(),
        ticket.unit.as_str(),
        ticket.applicant_name.as_str(),
        ticket.role_type.as_str(),
        ticket.ext.as_str(),
        ticket.purpose.as_str(),
        view::category_label(ticket.category),
        view::size_label(ticket),
        view::status_label(ticket.status),
        view::assignee_label(ticket),
        ticket.description.as_deref().unwrap_or(""),
    ]
    .join(" ")
    .to_lowercase();
    haystack.contains(keyword)
}

async fn add_ticket(
    State(state): State<SharedAppState>,
    Query(actor): Query<ActorInput>,
    Json(input): Json<gateway::CreateRequest>,
) -> Result<(StatusCode, Json<api::Ticket>), AddTicketError> {
    use AddTicketError as E;

    let actor = actor.actor().ok_or(E::UnknownActor)?;
    let mut session = Session::new();
    let outcome = state
        .gateway
        .apply(&mut session, &actor, gateway::Request::Create(input))
        .await?;

    Ok((StatusCode::CREATED, Json(require_ticket(outcome)?)))
}

#[derive(Debug, From)]
enum AddTicketError {
    #[from]
    Gateway(gateway::Error),
    UnknownActor,
}

impl IntoResponse for AddTicketError {
    fn into_response(self) -> Response {
        use gateway::Error as G;

        match self {
            Self::UnknownActor | Self::Gateway(G::PolicyViolation) => {
                StatusCode::BAD_REQUEST
            }
            Self::Gateway(G::NotFound) => StatusCode::NOT_FOUND,
            Self::Gateway(G::StoreUnavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
        .into_response()
    }
}

async fn get_ticket(
    State(state): State<SharedAppState>,
    Path(id): Path<api::ticket::Id>,
) -> Result<Json<api::Ticket>, GetTicketError> {
    use GetTicketError as E;

    let ticket = state
        .gateway
        .store()
        .get(id)
        .await?
        .ok_or(E::TicketNotFound)?;

    Ok(Json(ticket.into()))
}

#[derive(Debug, From)]
enum GetTicketError {
    #[from]
    Store(gateway::StoreError),
    TicketNotFound,
}

impl IntoResponse for GetTicketError {
    fn into_response(self) -> Response {
        match self {
            Self::TicketNotFound => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
        .into_response()
    }
}

async fn get_history(
    State(state): State<SharedAppState>,
    Path(id): Path<api::ticket::Id>,
) -> Result<Json<Vec<api::ticket::StatusChange>>, GetHistoryError> {
    let history = state.gateway.store().status_history(id).await?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}

#[derive(Debug, From)]
enum GetHistoryError {
    #[from]
    Store(gateway::StoreError),
}

impl IntoResponse for GetHistoryError {
    fn into_response(self) -> Response {
        match self {
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
        .into_response()
    }
}

async fn edit_ticket(
    State(state): State<SharedAppState>,
    Query(actor): Query<ActorInput>,
    Path(id): Path<api::ticket::Id>,
    Json(op): Json<api::ticket::EditOp>,
) -> Result<Json<api::Ticket>, EditTicketError> {
    use EditTicketError as E;

    let actor = actor.actor().ok_or(E::UnknownActor)?;
    let mut session = Session::new();
    let outcome = state
        .gateway
        .apply(&mut session, &actor, op.into_request(id))
        .await?;

    Ok(Json(require_ticket(outcome)?))
}

#[derive(Debug, From)]
enum EditTicketError {
    #[from]
    Gateway(gateway::Error),
    UnknownActor,
}

impl IntoResponse for EditTicketError {
    fn into_response(self) -> Response {
        use gateway::Error as G;

        match self {
            Self::UnknownActor | Self::Gateway(G::PolicyViolation) => {
                StatusCode::BAD_REQUEST
            }
            Self::Gateway(G::NotFound) => StatusCode::NOT_FOUND,
            Self::Gateway(G::StoreUnavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
        .into_response()
    }
}

#[derive(Serialize)]
struct Deleted {
    ok: bool,
}

async fn delete_ticket(
    State(state): State<SharedAppState>,
    Query(actor): Query<ActorInput>,
    Path(id): Path<api::ticket::Id>,
) -> Result<Json<Deleted>, EditTicketError> {
    use EditTicketError as E;

    let actor = actor.actor().ok_or(E::UnknownActor)?;
    let mut session = Session::new();
    state
        .gateway
        .apply(&mut session, &actor, gateway::Request::Delete { id })
        .await?;

    Ok(Json(Deleted { ok: true }))
}

fn require_ticket(
    outcome: gateway::Outcome,
) -> Result<api::Ticket, gateway::Error> {
    outcome
        .ticket
        .map(api::Ticket::from)
        .ok_or(gateway::Error::NotFound)
}

type SharedAppState = Arc<AppState>;

struct AppState {
    gateway: Gateway<db::Client>,
}
