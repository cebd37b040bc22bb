use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// 页码，从 1 开始（默认 1）
    #[param(required = false)]
    #[serde(default, deserialize_with = "deserialize_optional_usize")]
    pub page: Option<usize>,
    /// 每页条数（默认 20，最大 100）
    #[param(required = false)]
    #[serde(default, deserialize_with = "deserialize_optional_usize")]
    pub page_size: Option<usize>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UsizeInput {
    Number(usize),
    Text(String),
}

fn deserialize_optional_usize<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<UsizeInput>::deserialize(deserializer)? {
        None => Ok(None),
        Some(UsizeInput::Number(n)) => Ok(Some(n)),
        Some(UsizeInput::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(UsizeInput::Text(text)) => text.trim().parse().map(Some).map_err(DeError::custom),
    }
}

impl PaginationParams {
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> usize {
        (self.page() - 1).saturating_mul(self.page_size())
    }

    /// The slice of `items` on the requested page.
    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.offset())
            .take(self.page_size())
            .cloned()
            .collect()
    }
}
