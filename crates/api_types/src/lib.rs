use serde::{Deserialize, Serialize, Serializer};

/// Plain acknowledgement, e.g. `{"message": "Deleted"}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

/// Error body returned with every non-2xx answer, e.g. `{"error": "Invalid data"}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Write whole numbers as JSON integers: `1000`, not `1000.0`.
fn whole_as_integer<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    // Beyond 2^53 not every whole f64 is exact as an integer.
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

pub mod expense {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ExpenseKind {
        Income,
        Expense,
    }

    /// A recorded entry as served by `GET /expenses`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Expense {
        pub id: i64,
        #[serde(rename = "type")]
        pub kind: ExpenseKind,
        #[serde(serialize_with = "super::whole_as_integer")]
        pub amount: f64,
        pub description: String,
    }

    /// Request body of `POST /expenses`.
    ///
    /// Fields are optional on the wire: a missing one is answered with
    /// `400 {"error": "Invalid data"}` rather than a deserialization error.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseNew {
        #[serde(rename = "type")]
        pub kind: Option<String>,
        pub amount: Option<f64>,
        pub description: Option<String>,
    }
}
