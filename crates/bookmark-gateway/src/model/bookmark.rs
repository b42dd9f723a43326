use serde::Serialize;

pub const UPDATE_SUCCESS: &str = "Update was successful";
pub const DELETE_SUCCESS: &str = "Delete was successful";

/// `{"data": ...}` wrapper of single-resource responses.
#[derive(Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
