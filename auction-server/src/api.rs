use {
    crate::{
        auction::api as auction_api,
        config::RunOptions,
        kernel::entities::UserId,
        server::{
            EXIT_CHECK_INTERVAL,
            SHOULD_EXIT,
        },
        state::StoreNew,
    },
    anyhow::Result,
    axum::{
        async_trait,
        extract::FromRequestParts,
        http::{
            request::Parts,
            StatusCode,
        },
        response::{
            IntoResponse,
            Response,
        },
        routing::{
            get,
            post,
        },
        Json,
        Router,
    },
    axum_extra::{
        headers::{
            authorization::Bearer,
            Authorization,
        },
        TypedHeader,
    },
    clap::crate_version,
    drivebid_api_types::{
        auction::{
            ApprovalDecision,
            ApprovalDetails,
            ApprovalRequest,
            Auction,
            AuctionStatus,
            AuctionStatusUpdate,
            CreateAuction,
            FeeDetails,
            TimeRemaining,
        },
        bid::{
            Bid,
            BidAccepted,
            BidCreate,
            BidRejectionReason,
            BidResult,
            BidStatus,
            Bids,
            SubmitBid,
        },
        ws::{
            APIResponse,
            ClientMessage,
            ClientRequest,
            ServerResultMessage,
            ServerResultResponse,
            ServerUpdateResponse,
        },
        ErrorBodyResponse,
    },
    std::sync::{
        atomic::Ordering,
        Arc,
    },
    tower_http::cors::CorsLayer,
    utoipa::OpenApi,
    utoipa_redoc::{
        Redoc,
        Servable,
    },
    uuid::Uuid,
};

pub(crate) mod ws;

async fn root() -> String {
    format!("DriveBid Auction Server API {}", crate_version!())
}

#[derive(Clone, Debug)]
pub enum RestError {
    /// The request contained invalid parameters.
    BadParameters(String),
    /// The auction was not found.
    AuctionNotFound,
    /// The caller presented no usable credential.
    Unauthorized,
    /// The caller is not allowed to perform this action.
    Forbidden,
    /// Internal error occurred during processing the request.
    TemporarilyUnavailable,
}

impl RestError {
    pub fn to_status_and_message(&self) -> (StatusCode, String) {
        match self {
            RestError::BadParameters(msg) => {
                (StatusCode::BAD_REQUEST, format!("Bad parameters: {}", msg))
            }
            RestError::AuctionNotFound => (
                StatusCode::NOT_FOUND,
                "Auction with the specified id was not found".to_string(),
            ),
            RestError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "A valid bearer credential is required".to_string(),
            ),
            RestError::Forbidden => (
                StatusCode::FORBIDDEN,
                "The caller is not allowed to perform this action".to_string(),
            ),
            RestError::TemporarilyUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "This service is temporarily unavailable".to_string(),
            ),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let (status, msg) = self.to_status_and_message();
        (status, Json(ErrorBodyResponse { error: msg })).into_response()
    }
}

pub async fn live() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// Resolved caller identity. Identity validation happens upstream at the
/// gateway; what reaches the engine is the operator token or the resolved
/// user id as the bearer credential.
#[derive(Clone, Debug)]
pub enum Auth {
    Admin,
    Authorized(UserId),
    Unauthorized,
}

impl Auth {
    pub fn require_admin(&self) -> Result<(), RestError> {
        match self {
            Auth::Admin => Ok(()),
            _ => Err(RestError::Forbidden),
        }
    }

    pub fn require_user(&self) -> Result<UserId, RestError> {
        match self {
            Auth::Authorized(user_id) => Ok(*user_id),
            _ => Err(RestError::Unauthorized),
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<StoreNew>> for Auth {
    type Rejection = RestError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<StoreNew>,
    ) -> Result<Self, Self::Rejection> {
        match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await {
            Ok(TypedHeader(Authorization(bearer))) => {
                if state.store.admin_token.as_deref() == Some(bearer.token()) {
                    return Ok(Auth::Admin);
                }
                bearer
                    .token()
                    .parse::<Uuid>()
                    .map(Auth::Authorized)
                    .map_err(|_| RestError::Unauthorized)
            }
            Err(_) => Ok(Auth::Unauthorized),
        }
    }
}

pub async fn start_api(run_options: RunOptions, store: Arc<StoreNew>) -> Result<()> {
    // Make sure functions included in the paths section have distinct names,
    // otherwise some api generators will fail.
    #[derive(OpenApi)]
    #[openapi(
    paths(
    auction_api::post_auction,
    auction_api::get_auctions,
    auction_api::get_auction,
    auction_api::post_bid,
    auction_api::get_auction_bids,
    auction_api::post_approval,
    auction_api::post_cancel,
    ),
    components(
    schemas(
    ApprovalDecision,
    ApprovalDetails,
    ApprovalRequest,
    Auction,
    AuctionStatus,
    AuctionStatusUpdate,
    Bid,
    BidAccepted,
    BidCreate,
    BidRejectionReason,
    BidResult,
    BidStatus,
    Bids,
    ClientMessage,
    ClientRequest,
    CreateAuction,
    ErrorBodyResponse,
    FeeDetails,
    ServerResultMessage,
    ServerResultResponse,
    ServerUpdateResponse,
    SubmitBid,
    TimeRemaining,
    APIResponse,
    ),
    responses(
    ErrorBodyResponse,
    Auction,
    BidResult,
    Bids,
    ),
    ),
    tags(
    (name = "DriveBid Auction Server", description = "The auction server drives vehicle auctions through their \
    lifecycle, accepts bids under the highest-bid invariant and fans real-time updates out to auction rooms.")
    )
    )]
    struct ApiDoc;

    let auction_routes = Router::new()
        .route(
            "/",
            post(auction_api::post_auction).get(auction_api::get_auctions),
        )
        .route("/:auction_id", get(auction_api::get_auction))
        .route(
            "/:auction_id/bids",
            post(auction_api::post_bid).get(auction_api::get_auction_bids),
        )
        .route("/:auction_id/approval", post(auction_api::post_approval))
        .route("/:auction_id/cancel", post(auction_api::post_cancel));

    let v1_routes = Router::new().nest(
        "/v1",
        Router::new()
            .nest("/auctions", auction_routes)
            .route("/ws", get(ws::ws_route_handler)),
    );

    let app: Router<()> = Router::new()
        .merge(Redoc::with_url("/docs", ApiDoc::openapi()))
        .merge(v1_routes)
        .route("/", get(root))
        .route("/live", get(live))
        .layer(CorsLayer::permissive())
        .with_state(store);

    let listener = tokio::net::TcpListener::bind(&run_options.server.listen_addr).await?;
    tracing::info!("API server listening on {}", run_options.server.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            while !SHOULD_EXIT.load(Ordering::Acquire) {
                tokio::time::sleep(EXIT_CHECK_INTERVAL).await;
            }
            tracing::info!("Shutting down API server...");
        })
        .await?;
    Ok(())
}
