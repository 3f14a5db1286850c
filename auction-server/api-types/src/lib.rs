use {
    serde::{
        Deserialize,
        Serialize,
    },
    utoipa::{
        ToResponse,
        ToSchema,
    },
    uuid::Uuid,
};

pub mod auction;
pub mod bid;
pub mod ws;

pub type UserId = Uuid;
pub type VehicleId = Uuid;

#[derive(ToResponse, ToSchema, Serialize, Deserialize, Clone, Debug)]
#[response(description = "An error occurred processing the request")]
pub struct ErrorBodyResponse {
    pub error: String,
}
