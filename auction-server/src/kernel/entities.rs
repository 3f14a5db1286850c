use uuid::Uuid;

pub type UserId = Uuid;
pub type VehicleId = Uuid;
