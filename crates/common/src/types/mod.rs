use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// `{"message": ...}` body returned by successful mutations.
#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub message: &'static str,
}
